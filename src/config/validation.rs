//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every page template and detect duplicates within an app
//! - Check context paths are well formed and unique
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, RouterConfig};
use crate::routing::{TemplateError, UriTemplate};

/// Redirect statuses accepted for trailing-slash correction.
pub const REDIRECT_STATUSES: [u16; 4] = [301, 302, 307, 308];

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("redirect status {0} is not one of 301, 302, 307, 308")]
    RedirectStatus(u16),

    #[error("app '{app}': invalid context path '{path}' (must be '/' or start with '/' and not end with '/')")]
    ContextPath { app: String, path: String },

    #[error("app '{app}': context path '{path}' is already used by app '{other}'")]
    DuplicateContextPath {
        app: String,
        other: String,
        path: String,
    },

    #[error("app name '{0}' is used more than once")]
    DuplicateApp(String),

    #[error("app '{app}': {source}")]
    Template {
        app: String,
        #[source]
        source: TemplateError,
    },

    #[error("app '{app}': template '{template}' duplicates '{other}'")]
    DuplicateTemplate {
        app: String,
        template: String,
        other: String,
    },

    #[error("app '{app}': page '{template}' needs exactly one of 'content' or 'file'")]
    PageContent { app: String, template: String },
}

/// Normalise a configured context path; `None` if malformed.
///
/// `/` becomes the empty string so it can be prefixed to any request path.
pub fn normalize_context_path(path: &str) -> Option<String> {
    if path == "/" {
        return Some(String::new());
    }
    let well_formed = path.starts_with('/')
        && !path.ends_with('/')
        && !path.contains("//")
        && !path.contains(['{', '}', '?', '#']);
    well_formed.then(|| path.to_string())
}

/// Validate a parsed config.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if !REDIRECT_STATUSES.contains(&config.dispatch.redirect_status) {
        errors.push(ValidationError::RedirectStatus(config.dispatch.redirect_status));
    }

    let mut names = HashSet::new();
    let mut context_paths: Vec<(String, &str)> = Vec::new();

    for app in &config.apps {
        if !names.insert(app.name.as_str()) {
            errors.push(ValidationError::DuplicateApp(app.name.clone()));
        }

        match normalize_context_path(&app.context_path) {
            Some(normalized) => {
                if let Some((_, other)) = context_paths.iter().find(|(p, _)| *p == normalized) {
                    errors.push(ValidationError::DuplicateContextPath {
                        app: app.name.clone(),
                        other: other.to_string(),
                        path: app.context_path.clone(),
                    });
                } else {
                    context_paths.push((normalized, &app.name));
                }
            }
            None => errors.push(ValidationError::ContextPath {
                app: app.name.clone(),
                path: app.context_path.clone(),
            }),
        }

        validate_pages(app, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pages(app: &AppConfig, errors: &mut Vec<ValidationError>) {
    let mut compiled: Vec<UriTemplate> = Vec::with_capacity(app.pages.len());

    for page in &app.pages {
        if page.content.is_some() == page.file.is_some() {
            errors.push(ValidationError::PageContent {
                app: app.name.clone(),
                template: page.template.clone(),
            });
        }

        match UriTemplate::compile(&page.template) {
            Ok(template) => {
                if let Some(other) = compiled.iter().find(|t| **t == template) {
                    errors.push(ValidationError::DuplicateTemplate {
                        app: app.name.clone(),
                        template: template.as_str().to_string(),
                        other: other.as_str().to_string(),
                    });
                } else {
                    compiled.push(template);
                }
            }
            Err(source) => errors.push(ValidationError::Template {
                app: app.name.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PageConfig;

    fn app(name: &str, context_path: &str, templates: &[&str]) -> AppConfig {
        AppConfig {
            name: name.into(),
            context_path: context_path.into(),
            pages: templates
                .iter()
                .map(|t| PageConfig::inline(*t, "body"))
                .collect(),
        }
    }

    fn config(apps: Vec<AppConfig>) -> RouterConfig {
        RouterConfig {
            apps,
            ..RouterConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(vec![
            app("root", "/", &["/index", "/{page}"]),
            app("store", "/store", &["/products/{id}", "/{+rest}"]),
        ]);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut cfg = config(vec![
            app("a", "/a/", &["/{"]),
            app("a", "/b", &["/x/index", "/x/"]),
        ]);
        cfg.dispatch.redirect_status = 200;
        cfg.listener.bind_address = "nope".into();

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 6, "{errors:?}");
        assert!(errors.contains(&ValidationError::RedirectStatus(200)));
        assert!(errors.contains(&ValidationError::DuplicateApp("a".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ContextPath { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Template { .. })));
        assert!(errors.contains(&ValidationError::DuplicateTemplate {
            app: "a".into(),
            template: "/x/".into(),
            other: "/x/index".into(),
        }));
    }

    #[test]
    fn test_duplicate_context_path() {
        let cfg = config(vec![app("one", "/", &[]), app("two", "/", &[])]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateContextPath {
                app: "two".into(),
                other: "one".into(),
                path: "/".into(),
            }]
        );
    }

    #[test]
    fn test_page_needs_one_content_source() {
        let mut page = PageConfig::inline("/a", "body");
        page.file = Some("a.html".into());
        let mut none = PageConfig::inline("/b", "body");
        none.content = None;
        let cfg = config(vec![AppConfig {
            name: "x".into(),
            context_path: "/x".into(),
            pages: vec![page, none],
        }]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::PageContent { .. })));
    }

    #[test]
    fn test_normalize_context_path() {
        assert_eq!(normalize_context_path("/").as_deref(), Some(""));
        assert_eq!(normalize_context_path("/store").as_deref(), Some("/store"));
        assert_eq!(normalize_context_path("/a/b").as_deref(), Some("/a/b"));
        assert_eq!(normalize_context_path(""), None);
        assert_eq!(normalize_context_path("store"), None);
        assert_eq!(normalize_context_path("/store/"), None);
        assert_eq!(normalize_context_path("/a//b"), None);
    }
}
