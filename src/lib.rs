//! URI-template page router.
//!
//! Maps request paths to pages of deployed apps: templates are compiled once
//! per deployment, ordered by specificity, and matched first-match-wins, with
//! a single trailing-slash correction issued as a redirect.

pub mod config;
pub mod deployment;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod page;
pub mod routing;

pub use config::schema::RouterConfig;
pub use deployment::{App, AppRegistry, Deployment};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use page::{Page, PageRenderer, RenderContext, RenderError, RenderedPage, StaticRenderer};
pub use routing::{Dispatch, DispatchRequest, Resolution, RouteTable, TemplateError, UriTemplate};
