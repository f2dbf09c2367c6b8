//! Pages and the renderer seam.
//!
//! # Responsibilities
//! - Pair a compiled template with an opaque renderer
//! - Define the context a renderer receives for one request
//! - Provide the built-in static renderer used by file/inline pages
//!
//! # Design Decisions
//! - Renderers are trait objects shared via `Arc`; pages are immutable once built
//! - Rendering failures are errors; not-found and redirect are not

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::routing::UriTemplate;

/// Default content type for rendered pages.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Errors raised by a page renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer could not produce output for this request.
    #[error("failed to render page '{template}': {reason}")]
    Failed { template: String, reason: String },
}

/// Everything a renderer may look at for one request.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub app: &'a str,
    pub context_path: &'a str,
    pub path: &'a str,
    pub variables: &'a HashMap<String, String>,
}

/// Produces page content. Implemented outside the routing core.
pub trait PageRenderer: Send + Sync + fmt::Debug {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, RenderError>;
}

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub content_type: String,
    pub body: String,
}

/// A routable page: a template plus the renderer that serves it.
#[derive(Debug, Clone)]
pub struct Page {
    template: UriTemplate,
    renderer: Arc<dyn PageRenderer>,
    content_type: String,
}

impl Page {
    pub fn new(template: UriTemplate, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            template,
            renderer,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Run the renderer and wrap its output.
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<RenderedPage, RenderError> {
        let body = self.renderer.render(ctx)?;
        Ok(RenderedPage {
            content_type: self.content_type.clone(),
            body,
        })
    }
}

/// Serves a fixed body, substituting `{name}` placeholders with URI variables.
///
/// Values are HTML-escaped. Placeholders without a matching variable are
/// written out unchanged.
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    body: String,
}

impl StaticRenderer {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl PageRenderer for StaticRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
        if ctx.variables.is_empty() {
            return Ok(self.body.clone());
        }

        let mut out = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let candidate = &rest[open + 1..];
            match candidate.find('}') {
                Some(close) => match ctx.variables.get(&candidate[..close]) {
                    Some(value) => {
                        escape_html_into(value, &mut out);
                        rest = &candidate[close + 1..];
                    }
                    None => {
                        out.push('{');
                        rest = candidate;
                    }
                },
                None => {
                    out.push('{');
                    rest = candidate;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn escape_html_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}
