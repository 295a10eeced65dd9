//! Settings types shared by every form in the process

use serde::{Deserialize, Serialize};

/// Process-wide settings consulted by validators when they build messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Emit validator messages as markdown. When off, markdown markup is
    /// stripped and messages are plain text.
    pub use_markdown_in_validators: bool,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            use_markdown_in_validators: true,
        }
    }
}

/// Partial update applied with [`crate::set_config`]. Unset fields keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormsConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_markdown_in_validators: Option<bool>,
}

impl FormsConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_markdown_in_validators(mut self, enabled: bool) -> Self {
        self.use_markdown_in_validators = Some(enabled);
        self
    }

    /// Merge this update into `config`.
    pub fn apply_to(&self, config: &mut FormsConfig) {
        if let Some(enabled) = self.use_markdown_in_validators {
            config.use_markdown_in_validators = enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_markdown() {
        assert!(FormsConfig::default().use_markdown_in_validators);
    }

    #[test]
    fn test_empty_update_keeps_values() {
        let mut config = FormsConfig::default();
        FormsConfigUpdate::new().apply_to(&mut config);
        assert_eq!(config, FormsConfig::default());
    }

    #[test]
    fn test_update_overrides_markdown_flag() {
        let mut config = FormsConfig::default();
        FormsConfigUpdate::new()
            .use_markdown_in_validators(false)
            .apply_to(&mut config);
        assert!(!config.use_markdown_in_validators);
    }
}
