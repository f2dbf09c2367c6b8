//! Per-request dispatch.
//!
//! ```text
//! TryExact:     table.lookup(path)           → Matched
//! TryCorrected: table.find(toggle_slash(path)) → Redirect(context + corrected [+ ?query])
//! otherwise                                  → NotFound(path)
//! ```
//!
//! Only one correction is attempted. Redirect and not-found are outcomes,
//! not errors; the only error is a renderer failure.

use serde::Serialize;

use crate::page::{RenderContext, RenderError, RenderedPage};
use crate::routing::table::{RouteMatch, RouteTable};

/// Input for one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    /// The app's context path, empty for the root app.
    pub context_path: &'a str,
    /// Request path with the context path removed.
    pub path: &'a str,
    /// Raw query string, without the leading `?`.
    pub query: Option<&'a str>,
}

impl<'a> DispatchRequest<'a> {
    pub fn new(context_path: &'a str, path: &'a str) -> Self {
        Self {
            context_path,
            path,
            query: None,
        }
    }

    pub fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query;
        self
    }
}

/// Routing decision before rendering.
#[derive(Debug)]
pub enum Resolution<'t> {
    Matched(RouteMatch<'t>),
    Redirect(String),
    NotFound(String),
}

/// Final dispatch outcome handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Dispatch {
    Rendered(RenderedPage),
    Redirect { location: String },
    NotFound { path: String },
}

impl Dispatch {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Dispatch::Rendered(_) => "rendered",
            Dispatch::Redirect { .. } => "redirect",
            Dispatch::NotFound { .. } => "not_found",
        }
    }
}

impl RouteTable {
    /// Decide how to answer `request` without rendering anything.
    pub fn resolve(&self, request: &DispatchRequest<'_>) -> Resolution<'_> {
        if let Some(found) = self.lookup(request.path) {
            return Resolution::Matched(found);
        }

        let corrected = toggle_trailing_slash(request.path);
        if self.find(&corrected).is_some() {
            return Resolution::Redirect(redirect_target(
                request.context_path,
                &corrected,
                request.query,
            ));
        }

        Resolution::NotFound(request.path.to_string())
    }

    /// Resolve `request` and render the matched page.
    pub fn dispatch(&self, app: &str, request: &DispatchRequest<'_>) -> Result<Dispatch, RenderError> {
        match self.resolve(request) {
            Resolution::Matched(found) => {
                let ctx = RenderContext {
                    app,
                    context_path: request.context_path,
                    path: request.path,
                    variables: &found.variables,
                };
                found.page.render(&ctx).map(Dispatch::Rendered)
            }
            Resolution::Redirect(location) => Ok(Dispatch::Redirect { location }),
            Resolution::NotFound(path) => Ok(Dispatch::NotFound { path }),
        }
    }
}

fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => format!("{path}/"),
    }
}

fn redirect_target(context_path: &str, corrected: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{context_path}{corrected}?{query}"),
        _ => format!("{context_path}{corrected}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, StaticRenderer};
    use crate::routing::UriTemplate;
    use std::sync::Arc;

    fn table(templates: &[(&str, &str)]) -> RouteTable {
        templates
            .iter()
            .map(|(template, body)| {
                Page::new(
                    UriTemplate::compile(template).unwrap(),
                    Arc::new(StaticRenderer::new(*body)),
                )
            })
            .collect()
    }

    #[test]
    fn test_exact_match_renders() {
        let t = table(&[("/a/", "A")]);
        let outcome = t.dispatch("app", &DispatchRequest::new("/ctx", "/a/")).unwrap();
        assert_eq!(
            outcome,
            Dispatch::Rendered(RenderedPage {
                content_type: crate::page::DEFAULT_CONTENT_TYPE.to_string(),
                body: "A".into(),
            })
        );
    }

    #[test]
    fn test_missing_trailing_slash_redirects() {
        let t = table(&[("/a/", "A")]);
        let outcome = t.dispatch("app", &DispatchRequest::new("/ctx", "/a")).unwrap();
        assert_eq!(outcome, Dispatch::Redirect { location: "/ctx/a/".into() });
    }

    #[test]
    fn test_redirect_preserves_query() {
        let t = table(&[("/a/", "A")]);
        let request = DispatchRequest::new("/ctx", "/a").with_query(Some("x=1&y=%20"));
        match t.resolve(&request) {
            Resolution::Redirect(location) => assert_eq!(location, "/ctx/a/?x=1&y=%20"),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let t = table(&[("/a/", "A")]);
        let request = DispatchRequest::new("/ctx", "/a").with_query(Some(""));
        let outcome = t.dispatch("app", &request).unwrap();
        assert_eq!(outcome, Dispatch::Redirect { location: "/ctx/a/".into() });
    }

    #[test]
    fn test_extra_trailing_slash_redirects() {
        let t = table(&[("/a", "A")]);
        let outcome = t.dispatch("app", &DispatchRequest::new("", "/a/")).unwrap();
        assert_eq!(outcome, Dispatch::Redirect { location: "/a".into() });
    }

    #[test]
    fn test_context_root_redirects_to_slash() {
        let t = table(&[("/index", "home")]);
        let outcome = t.dispatch("app", &DispatchRequest::new("/store", "")).unwrap();
        assert_eq!(outcome, Dispatch::Redirect { location: "/store/".into() });
    }

    #[test]
    fn test_not_found_carries_path() {
        let t = table(&[("/a", "A")]);
        let outcome = t.dispatch("app", &DispatchRequest::new("", "/z")).unwrap();
        assert_eq!(outcome, Dispatch::NotFound { path: "/z".into() });
        assert_eq!(outcome.label(), "not_found");
    }

    #[test]
    fn test_only_one_correction_is_attempted() {
        let t = table(&[("/a", "A")]);
        let outcome = t.dispatch("app", &DispatchRequest::new("", "/a//")).unwrap();
        assert_eq!(outcome, Dispatch::NotFound { path: "/a//".into() });
    }

    #[test]
    fn test_rendered_page_receives_variables() {
        let t = table(&[("/p/{id}", "product {id}")]);
        match t.dispatch("shop", &DispatchRequest::new("/shop", "/p/9")).unwrap() {
            Dispatch::Rendered(page) => assert_eq!(page.body, "product 9"),
            other => panic!("expected rendered page, got {other:?}"),
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl crate::page::PageRenderer for Broken {
        fn render(&self, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
            Err(RenderError::Failed {
                template: ctx.path.to_string(),
                reason: "backend unavailable".into(),
            })
        }
    }

    #[test]
    fn test_render_failure_is_an_error_not_an_outcome() {
        let t: RouteTable = std::iter::once(Page::new(UriTemplate::compile("/x").unwrap(), Arc::new(Broken))).collect();
        let err = t.dispatch("app", &DispatchRequest::new("", "/x")).unwrap_err();
        assert!(err.to_string().contains("backend unavailable"));

        // Redirects never reach the renderer.
        let outcome = t.dispatch("app", &DispatchRequest::new("", "/x/")).unwrap();
        assert_eq!(outcome.label(), "redirect");
    }

    #[test]
    fn test_dispatch_serializes_with_outcome_tag() {
        let json = serde_json::to_value(Dispatch::Redirect { location: "/a/".into() }).unwrap();
        assert_eq!(json["outcome"], "redirect");
        assert_eq!(json["location"], "/a/");
    }
}
