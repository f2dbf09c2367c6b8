//! App deployment subsystem.
//!
//! # Data Flow
//! ```text
//! RouterConfig.apps
//!     → app.rs (compile templates, load page bodies, build RouteTable)
//!     → registry.rs (Deployment: apps ordered by context path)
//!     → AppRegistry::deploy (atomic swap)
//!
//! Request path
//!     → Deployment::route (context path split)
//!     → App::dispatch
//! ```

pub mod app;
pub mod registry;

pub use app::{App, BuildError};
pub use registry::{AppRegistry, Deployment};
