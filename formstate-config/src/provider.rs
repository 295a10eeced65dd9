//! Figment-backed loading of [`FormsConfig`]

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::types::FormsConfig;

/// Environment variable prefix, e.g. `FORMSTATE_USE_MARKDOWN_IN_VALIDATORS=false`
pub const ENV_PREFIX: &str = "FORMSTATE_";

/// Base name of the configuration file discovered in the working directory
pub const CONFIG_FILE_STEM: &str = "formstate";

impl FormsConfig {
    /// Load settings from all sources.
    ///
    /// Sources are merged in precedence order (later sources override earlier ones):
    /// 1. Default values
    /// 2. `formstate.toml`, `formstate.yaml` / `formstate.yml`, `formstate.json` in the working directory
    /// 3. `FORMSTATE_*` environment variables
    pub fn load() -> ConfigResult<Self> {
        Self::load_in(Path::new("."))
    }

    /// Same as [`FormsConfig::load`] but discovers files in `dir`.
    pub fn load_in(dir: &Path) -> ConfigResult<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(FormsConfig::default()))
            .merge(Toml::file(dir.join(format!("{CONFIG_FILE_STEM}.toml"))))
            .merge(Yaml::file(dir.join(format!("{CONFIG_FILE_STEM}.yaml"))))
            .merge(Yaml::file(dir.join(format!("{CONFIG_FILE_STEM}.yml"))))
            .merge(Json::file(dir.join(format!("{CONFIG_FILE_STEM}.json"))))
            .merge(Env::prefixed(ENV_PREFIX));

        let config: FormsConfig = figment.extract()?;
        debug!(
            use_markdown_in_validators = config.use_markdown_in_validators,
            dir = %dir.display(),
            "loaded forms config"
        );
        Ok(config)
    }

    /// Load settings from one explicit file layered over the defaults.
    ///
    /// The format is chosen from the file extension. Environment variables are
    /// not consulted.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let base = Figment::new().merge(Serialized::defaults(FormsConfig::default()));
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let figment = match extension.as_str() {
            "toml" => base.merge(Toml::file(path)),
            "yaml" | "yml" => base.merge(Yaml::file(path)),
            "json" => base.merge(Json::file(path)),
            other => {
                return Err(ConfigError::UnsupportedFormat {
                    format: other.to_string(),
                })
            }
        };

        trace!(path = %path.display(), "extracting forms config");
        Ok(figment.extract()?)
    }
}
