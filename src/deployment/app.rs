//! A deployed app: context path plus route table.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::{AppConfig, PageConfig};
use crate::config::validation::normalize_context_path;
use crate::page::{Page, RenderError, StaticRenderer};
use crate::routing::{Dispatch, DispatchRequest, RouteTable, TemplateError, UriTemplate};

/// Errors raised while building an app from its config.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("app '{app}': invalid context path '{path}'")]
    ContextPath { app: String, path: String },

    #[error("app '{app}': {source}")]
    Template {
        app: String,
        #[source]
        source: TemplateError,
    },

    #[error("app '{app}': page '{template}' has no content")]
    MissingContent { app: String, template: String },

    #[error("app '{app}': cannot read page file {path:?}: {source}")]
    Io {
        app: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An app mounted under a context path.
#[derive(Debug)]
pub struct App {
    name: String,
    context_path: String,
    table: RouteTable,
}

impl App {
    /// Build an app from already compiled pages.
    pub fn new(name: impl Into<String>, context_path: &str, pages: Vec<Page>) -> Result<Self, BuildError> {
        let name = name.into();
        let context_path = normalize_context_path(context_path).ok_or_else(|| BuildError::ContextPath {
            app: name.clone(),
            path: context_path.to_string(),
        })?;
        Ok(Self {
            name,
            context_path,
            table: RouteTable::new(pages),
        })
    }

    /// Compile every page of `config` and load page bodies.
    pub fn from_config(config: &AppConfig) -> Result<Self, BuildError> {
        let pages = config
            .pages
            .iter()
            .map(|page| build_page(&config.name, page))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config.name.clone(), &config.context_path, pages)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalised context path, empty for the root app.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Dispatch a path that already has the context path removed.
    pub fn dispatch(&self, path: &str, query: Option<&str>) -> Result<Dispatch, RenderError> {
        let request = DispatchRequest::new(&self.context_path, path).with_query(query);
        self.table.dispatch(&self.name, &request)
    }
}

fn build_page(app: &str, config: &PageConfig) -> Result<Page, BuildError> {
    let template = UriTemplate::compile(&config.template).map_err(|source| BuildError::Template {
        app: app.to_string(),
        source,
    })?;

    let body = match (&config.content, &config.file) {
        (Some(content), _) => content.clone(),
        (None, Some(path)) => fs::read_to_string(path).map_err(|source| BuildError::Io {
            app: app.to_string(),
            path: path.clone(),
            source,
        })?,
        (None, None) => {
            return Err(BuildError::MissingContent {
                app: app.to_string(),
                template: config.template.clone(),
            })
        }
    };

    Ok(Page::new(template, Arc::new(StaticRenderer::new(body))).with_content_type(&config.content_type))
}
