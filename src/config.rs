//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file (TOML), when a path is given
//! 3. Environment variables: `NESTSET__*` (e.g. `NESTSET__AUTO_NEST=true`)

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Descriptor, NestError, NestResult, NestingPolicy, Position};

/// Settings for building nested sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Start forests under auto-nest instead of manual renumbering
    pub auto_nest: bool,
    /// Where descendants go when no position is given: `first`, `last` or a signed offset
    pub default_position: Descriptor,
    /// Left value of a freshly stamped root
    pub start_index: i64,
    /// Level of a freshly stamped root
    pub start_level: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_nest: false,
            default_position: Descriptor::At(Position::Last),
            start_index: 0,
            start_level: 0,
        }
    }
}

/// Settings as read from a source, before the position is checked.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSettings {
    auto_nest: bool,
    default_position: toml::Value,
    start_index: i64,
    start_level: i64,
}

impl Default for RawSettings {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            auto_nest: defaults.auto_nest,
            default_position: toml::Value::String(Position::Last.as_str().to_string()),
            start_index: defaults.start_index,
            start_level: defaults.start_level,
        }
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = NestError;

    /// Position tokens are resolved here, so a loaded `Settings` only holds
    /// [`Descriptor::At`] or [`Descriptor::Offset`].
    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let default_position = match Descriptor::try_from(raw.default_position)? {
            Descriptor::Token(token) => Descriptor::At(token.parse()?),
            other => other,
        };
        Ok(Self {
            auto_nest: raw.auto_nest,
            default_position,
            start_index: raw.start_index,
            start_level: raw.start_level,
        })
    }
}

fn config_err(e: ConfigError) -> NestError {
    NestError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `path` - Optional TOML file; it must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `path`
    /// 3. Environment variables with the `NESTSET` prefix and `__` separator
    pub fn load(path: Option<&Path>) -> NestResult<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("auto_nest", defaults.auto_nest)
            .map_err(config_err)?
            .set_default("default_position", Position::Last.as_str())
            .map_err(config_err)?
            .set_default("start_index", defaults.start_index)
            .map_err(config_err)?
            .set_default("start_level", defaults.start_level)
            .map_err(config_err)?;

        if let Some(path) = path {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("NESTSET")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let raw: RawSettings = config.try_deserialize().map_err(config_err)?;
        Settings::try_from(raw)
    }

    /// Parse settings from a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// * [`NestError::Config`] if the document is not valid TOML.
    /// * [`NestError::InvalidPosition`] for a position token other than `first`/`last`.
    /// * [`NestError::InvalidArgumentKind`] for a position that is neither a string nor an integer.
    pub fn from_toml_str(content: &str) -> NestResult<Self> {
        let raw: RawSettings = toml::from_str(content).map_err(|e| NestError::Config {
            message: format!("parse: {}", e),
        })?;
        Settings::try_from(raw)
    }

    pub fn policy(&self) -> NestingPolicy {
        NestingPolicy::from(self.auto_nest)
    }
}
