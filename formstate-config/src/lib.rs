//! # formstate-config
//!
//! Process-wide settings for the formstate engine.
//!
//! Settings live in a single shared store. [`get_config`] returns a snapshot,
//! [`set_config`] applies a partial update, and [`FormsConfig::load`] reads
//! defaults, an optional `formstate.{toml,yaml,json}` file and `FORMSTATE_*`
//! environment variables through Figment.
//!
//! ```rust
//! use formstate_config::{get_config, reset_config, set_config, FormsConfigUpdate};
//!
//! set_config(FormsConfigUpdate::new().use_markdown_in_validators(false));
//! assert!(!get_config().use_markdown_in_validators);
//! reset_config();
//! ```

mod error;
mod provider;
mod types;

use std::sync::{OnceLock, RwLock};

pub use error::{ConfigError, ConfigResult};
pub use provider::{CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::{FormsConfig, FormsConfigUpdate};

/// Shared settings instance
static CONFIG: OnceLock<RwLock<FormsConfig>> = OnceLock::new();

fn store() -> &'static RwLock<FormsConfig> {
    CONFIG.get_or_init(|| RwLock::new(FormsConfig::default()))
}

/// Snapshot of the current settings.
pub fn get_config() -> FormsConfig {
    store()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Apply a partial update to the current settings.
pub fn set_config(update: FormsConfigUpdate) {
    let mut config = store()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    update.apply_to(&mut config);
    tracing::debug!(?config, "forms config updated");
}

/// Replace the current settings wholesale, e.g. with the result of [`FormsConfig::load`].
pub fn install_config(config: FormsConfig) {
    *store()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// Restore the default settings.
pub fn reset_config() {
    install_config(FormsConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_set_and_reset_config() {
        reset_config();
        assert!(get_config().use_markdown_in_validators);

        set_config(FormsConfigUpdate::new().use_markdown_in_validators(false));
        assert!(!get_config().use_markdown_in_validators);

        reset_config();
        assert!(get_config().use_markdown_in_validators);
    }

    #[test]
    #[serial]
    fn test_install_config() {
        install_config(FormsConfig {
            use_markdown_in_validators: false,
        });
        assert!(!get_config().use_markdown_in_validators);
        reset_config();
    }
}
