//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated)
//!     → Dispatcher::from_config, EventBridge, init_logging
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Configuration is read once per page session; there is no reload

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BridgeConfig;
pub use schema::DispatchConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteManifest;
pub use validation::ValidationError;
