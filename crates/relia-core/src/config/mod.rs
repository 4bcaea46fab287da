//! # Configuration System
//!
//! Hierarchical TOML configuration for Relia.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.relia/config.toml` (global user preferences)
//! 3. **Working directory config** - `./.relia/config.toml`
//! 4. **Environment** - `RELIA_ACCESS_TOKEN`, `RELIA_USER_ID` (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.relia/config.toml
//! [backend]
//! kind = "rest"
//! base_url = "https://project.example.com"
//! api_key = "public-anon-key"
//!
//! [auth]
//! user_id = "3f1c..."
//!
//! [store]
//! reload_after_delete = true
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use relia_core::config::ReliaConfig;
//!
//! fn example() -> Result<(), relia_core::errors::ConfigError> {
//!     let config = ReliaConfig::load_hierarchy()?;
//!     let backend = config.backend.kind()?;
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

// Public API exports
pub use types::{AuthConfig, BackendConfig, BackendKind, ReliaConfig, StoreConfig};
pub use validation::{VALID_BACKENDS, validate_config};

impl ReliaConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
