//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → deployment (context path → app)
//!     → routing dispatch (Rendered | Redirect | NotFound)
//!     → 200 with page body | 3xx with Location | 404
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
