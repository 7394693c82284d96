//! # Engine Settings
//!
//! Display preferences shared by every calculator. Settings never influence
//! derived quantities, only how summary rows are rendered.
//!
//! Settings live in an optional TOML file:
//!
//! ```toml
//! [format]
//! locale = "english"
//! decimals = 3
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::format::NumberLocale;
//! use calcolo_core::settings::EngineSettings;
//!
//! let settings = EngineSettings::from_toml_str("[format]\nlocale = \"english\"\n").unwrap();
//! assert_eq!(settings.format.locale, NumberLocale::English);
//! assert_eq!(settings.format.decimals, 2);
//! ```

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::FormatSettings;

/// Default settings file name looked up by front ends
pub const DEFAULT_SETTINGS_FILE: &str = "calcolo.toml";

/// Root settings container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number formatting for summary rows
    pub format: FormatSettings,
}

impl EngineSettings {
    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        Self::parse(text, "<inline>")
    }

    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalcError::config_error(&display, e.to_string()))?;
        let settings = Self::parse(&text, &display)?;
        debug!("loaded settings from {}: {:?}", display, settings);
        Ok(settings)
    }

    /// Read settings if the file exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })
    }

    fn parse(text: &str, origin: &str) -> CalcResult<Self> {
        let mut settings: EngineSettings =
            toml::from_str(text).map_err(|e| CalcError::config_error(origin, e.to_string()))?;
        settings.format.decimals = settings.format.decimals();
        Ok(settings)
    }
}
