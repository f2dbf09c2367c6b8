//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Deployment (once per app build):
//!     page template strings
//!     → template.rs (compile: regex + variable names + comparison key)
//!     → table.rs (sort by specificity, freeze)
//!
//! Request:
//!     path without context
//!     → dispatch.rs (exact lookup, then one trailing-slash correction)
//!     → Rendered | Redirect | NotFound
//! ```
//!
//! # Design Decisions
//! - Templates compiled at deployment, tables immutable at runtime
//! - Deterministic: the comparator is a total order, so the first match is stable
//! - First match wins (ordered by specificity)
//! - Dispatch outcomes are an explicit enum, never errors

pub mod dispatch;
pub mod table;
pub mod template;

pub use dispatch::{Dispatch, DispatchRequest, Resolution};
pub use table::{RouteMatch, RouteTable};
pub use template::{TemplateError, UriTemplate};
