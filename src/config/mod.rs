//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, resolve page file paths)
//!     → validation.rs (context paths, template compilation, duplicates)
//!     → RouterConfig (validated, immutable)
//!     → deployment builds apps and route tables from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server builds a new Deployment
//!     → atomic swap in the AppRegistry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, DispatchConfig, ListenerConfig, LogFormat, ObservabilityConfig, PageConfig,
    ReloadConfig, RouterConfig,
};
pub use validation::ValidationError;
