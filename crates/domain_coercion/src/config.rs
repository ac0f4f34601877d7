//! Coercion configuration

use serde::{Deserialize, Serialize};

use core_kernel::{CoercionError, DateParser, Locale, Timezone};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// BCP-47 tag selecting the date/time grammars of the date parser
    pub locale: String,
    /// Zone local date/time values are interpreted in, by IANA name
    pub timezone: Timezone,
    /// Log level
    pub log_level: String,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            timezone: Timezone::default(),
            log_level: "info".to_string(),
        }
    }
}

impl CoercionConfig {
    /// Loads configuration from environment (`COERCE_LOCALE`, `COERCE_TIMEZONE`,
    /// `COERCE_LOG_LEVEL`)
    ///
    /// An unknown zone name is rejected here, while deserializing.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("COERCE"))
            .build()?
            .try_deserialize()
    }

    pub fn locale(&self) -> Result<Locale, CoercionError> {
        Ok(Locale::parse(&self.locale)?)
    }

    /// Builds the date parser for the configured locale and zone
    pub fn date_parser(&self) -> Result<DateParser, CoercionError> {
        Ok(DateParser::new(self.locale()?, self.timezone))
    }
}
