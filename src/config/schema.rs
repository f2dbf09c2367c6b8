//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::page::DEFAULT_CONTENT_TYPE;

/// Root configuration for the page router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, timeouts).
    pub listener: ListenerConfig,

    /// Dispatch behaviour shared by all apps.
    pub dispatch: DispatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Hot reload settings.
    pub reload: ReloadConfig,

    /// Deployed apps.
    pub apps: Vec<AppConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum time to answer a request.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Status used for trailing-slash redirects (301, 302, 307 or 308).
    pub redirect_status: u16,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            redirect_status: 302,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Hot reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the config file and redeploy on change.
    pub watch: bool,

    /// Poll interval for the file watcher backend, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            watch: true,
            poll_interval_secs: 2,
        }
    }
}

/// One deployed app.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// App identifier for logging/metrics.
    pub name: String,

    /// Context path the app is mounted at ("/" for the root app).
    pub context_path: String,

    /// Pages served by the app.
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

/// One page of an app.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageConfig {
    /// URI template, relative to the app's context path.
    pub template: String,

    /// Inline page body.
    #[serde(default)]
    pub content: Option<String>,

    /// Path to a file holding the page body.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Response content type.
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl PageConfig {
    /// Page with an inline body and the default content type.
    pub fn inline(template: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            content: Some(content.into()),
            file: None,
            content_type: default_content_type(),
        }
    }
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.dispatch.redirect_status, 302);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.reload.watch);
        assert!(config.apps.is_empty());
    }

    #[test]
    fn test_apps_and_pages_parse() {
        let config: RouterConfig = toml::from_str(
            r#"
            [observability]
            log_format = "json"

            [[apps]]
            name = "store"
            context_path = "/store"

            [[apps.pages]]
            template = "/products/{id}"
            content = "<h1>{id}</h1>"

            [[apps.pages]]
            template = "/index"
            file = "pages/home.html"
            content_type = "text/plain"
            "#,
        )
        .unwrap();

        assert_eq!(config.observability.log_format, LogFormat::Json);
        let app = &config.apps[0];
        assert_eq!(app.context_path, "/store");
        assert_eq!(app.pages.len(), 2);
        assert_eq!(app.pages[0].content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(app.pages[1].file.as_deref(), Some(std::path::Path::new("pages/home.html")));
        assert_eq!(app.pages[1].content_type, "text/plain");
    }
}
