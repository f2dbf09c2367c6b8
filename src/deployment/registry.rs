//! Deployments and the live registry.
//!
//! # Responsibilities
//! - Group apps built from one config into a `Deployment`
//! - Resolve a request path to its app by context path
//! - Swap deployments atomically on redeploy
//!
//! # Design Decisions
//! - A deployment is immutable; a redeploy builds a new one
//! - `ArcSwap` gives lock-free reads; in-flight requests keep their snapshot
//! - Longest context path wins, matched on segment boundaries

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::{DispatchConfig, RouterConfig};
use crate::deployment::app::{App, BuildError};
use crate::observability::metrics;

/// All apps built from one configuration, with the dispatch settings they
/// were deployed under.
#[derive(Debug)]
pub struct Deployment {
    /// Sorted by context path length, longest first.
    apps: Vec<Arc<App>>,
    redirect_status: u16,
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Deployment {
    pub fn new(apps: Vec<App>) -> Self {
        let mut apps: Vec<Arc<App>> = apps.into_iter().map(Arc::new).collect();
        apps.sort_by(|a, b| {
            b.context_path()
                .len()
                .cmp(&a.context_path().len())
                .then_with(|| a.context_path().cmp(b.context_path()))
        });
        Self {
            apps,
            redirect_status: DispatchConfig::default().redirect_status,
        }
    }

    /// Status used for trailing-slash redirects.
    pub fn with_redirect_status(mut self, status: u16) -> Self {
        self.redirect_status = status;
        self
    }

    /// Build every app in `config`. The first failing app aborts the build.
    pub fn from_config(config: &RouterConfig) -> Result<Self, BuildError> {
        let apps = config
            .apps
            .iter()
            .map(App::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(apps).with_redirect_status(config.dispatch.redirect_status))
    }

    pub fn redirect_status(&self) -> u16 {
        self.redirect_status
    }

    /// Find the app serving `path` and the path relative to its context.
    pub fn route<'a>(&self, path: &'a str) -> Option<(&Arc<App>, &'a str)> {
        self.apps.iter().find_map(|app| {
            let rest = path.strip_prefix(app.context_path())?;
            (rest.is_empty() || rest.starts_with('/')).then_some((app, rest))
        })
    }

    pub fn apps(&self) -> impl Iterator<Item = &Arc<App>> {
        self.apps.iter()
    }

    pub fn app(&self, name: &str) -> Option<&Arc<App>> {
        self.apps.iter().find(|app| app.name() == name)
    }

    pub fn page_count(&self) -> usize {
        self.apps.iter().map(|app| app.table().len()).sum()
    }
}

/// The currently live deployment.
#[derive(Debug)]
pub struct AppRegistry {
    current: ArcSwap<Deployment>,
}

impl AppRegistry {
    pub fn new(deployment: Deployment) -> Self {
        let registry = Self {
            current: ArcSwap::from_pointee(Deployment::default()),
        };
        registry.deploy(deployment);
        registry
    }

    /// Snapshot of the live deployment.
    pub fn current(&self) -> Arc<Deployment> {
        self.current.load_full()
    }

    /// Replace the live deployment.
    pub fn deploy(&self, deployment: Deployment) {
        let apps = deployment.apps.len();
        let pages = deployment.page_count();
        self.current.store(Arc::new(deployment));
        metrics::record_deployment(pages);
        tracing::info!(apps, pages, "Deployment activated");
    }
}
