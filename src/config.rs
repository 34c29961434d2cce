//! Client configuration: service endpoints, memo size, timeouts, date window.

use crate::error::MuniClimaError;
use crate::types::period::DateWindow;
use bon::Builder;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_IBGE_BASE_URL: &str = "https://servicodados.ibge.gov.br";
pub const DEFAULT_POWER_BASE_URL: &str = "https://power.larc.nasa.gov";
pub const DEFAULT_CACHE_CAPACITY: usize = 32;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Settings for a [`crate::MuniClima`] client.
///
/// Every field has a default pointing at the public services, so both the
/// builder and a TOML file only need to mention what differs.
///
/// # Examples
///
/// ```
/// use municlima::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .ibge_base_url("http://localhost:8080")
///     .cache_capacity(4)
///     .build();
/// assert_eq!(config.cache_capacity, 4);
/// assert_eq!(config.power_base_url, "https://power.larc.nasa.gov");
///
/// let from_toml = ClientConfig::from_toml_str("cache_capacity = 8").unwrap();
/// assert_eq!(from_toml.cache_capacity, 8);
/// assert_eq!(from_toml.ibge_base_url, "https://servicodados.ibge.gov.br");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the IBGE services (mesh and localities).
    #[builder(into, default = DEFAULT_IBGE_BASE_URL.to_string())]
    pub ibge_base_url: String,

    /// Base URL of the NASA POWER API.
    #[builder(into, default = DEFAULT_POWER_BASE_URL.to_string())]
    pub power_base_url: String,

    /// Entries kept per memoized fetcher. Zero disables memoization.
    #[builder(default = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    #[builder(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Bounds of the date selection.
    #[builder(default)]
    pub date_window: DateWindow,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads a TOML config file.
    ///
    /// The date window must contain its own default range.
    pub fn load(path: &Path) -> Result<Self, MuniClimaError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MuniClimaError::ConfigRead(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| MuniClimaError::ConfigParse(path.to_path_buf(), e))?;
        config.date_window.default_selection()?;
        Ok(config)
    }
}
