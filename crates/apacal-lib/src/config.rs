//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApacalError, Result};
use crate::led::StripLayout;
use crate::reconnect::ReconnectConfig;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# apacal configuration\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the DisplayCAL web interface. Default: "http://localhost:8080".
    #[serde(default = "default_web_url")]
    pub web_url: String,

    /// Number of LEDs on the strip.
    #[serde(default = "default_num_pixels")]
    pub num_pixels: usize,

    /// First pixel to illuminate (0-based).
    #[serde(default)]
    pub first_pixel: usize,

    /// Pixel after the last one to illuminate. Unset = up to the end of the strip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pixel: Option<usize>,

    /// Upper bound on brightness, 0-255.
    #[serde(default = "default_intensity")]
    pub intensity: u8,

    /// SPI device node the strip is attached to.
    #[serde(default = "default_spi_device")]
    pub spi_device: String,

    /// Pause before reconnecting after a failed poll, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// TCP connect timeout in milliseconds. 0 = no timeout.
    #[serde(default)]
    pub connect_timeout_ms: u64,
}

fn default_web_url() -> String {
    "http://localhost:8080".into()
}
fn default_num_pixels() -> usize {
    1
}
fn default_intensity() -> u8 {
    80
}
fn default_spi_device() -> String {
    "/dev/spidev0.0".into()
}
fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            web_url: default_web_url(),
            num_pixels: default_num_pixels(),
            first_pixel: 0,
            last_pixel: None,
            intensity: default_intensity(),
            spi_device: default_spi_device(),
            retry_delay_ms: default_retry_delay_ms(),
            connect_timeout_ms: 0,
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `web_url` does not parse.
    InvalidUrl(String),
    /// `web_url` is not http or https.
    UnsupportedScheme(String),
    /// The pixel window does not fit the strip.
    InvalidLayout(String),
    /// `spi_device` is empty or whitespace-only.
    EmptySpiDevice,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl(e) => write!(f, "Invalid web URL: {e}"),
            ValidationError::UnsupportedScheme(s) => {
                write!(f, "Unsupported web URL scheme \"{s}\" (use http or https)")
            }
            ValidationError::InvalidLayout(e) => write!(f, "Invalid pixel range: {e}"),
            ValidationError::EmptySpiDevice => write!(f, "SPI device cannot be empty"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("apacal"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Parse `web_url`, accepting only http and https.
    pub fn web_url(&self) -> Result<Url> {
        let url = Url::parse(self.web_url.trim()).map_err(|e| {
            let invalid = ValidationError::InvalidUrl(format!("{:?}: {e}", self.web_url));
            ApacalError::Config(invalid.to_string())
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApacalError::Config(
                ValidationError::UnsupportedScheme(other.into()).to_string(),
            )),
        }
    }

    /// Pixel window described by `num_pixels`, `first_pixel` and `last_pixel`.
    pub fn layout(&self) -> Result<StripLayout> {
        StripLayout::new(self.num_pixels, self.first_pixel, self.last_pixel)
    }

    /// Fixed reconnect pause of `retry_delay_ms`.
    pub fn reconnect(&self) -> ReconnectConfig {
        ReconnectConfig::fixed(Duration::from_millis(self.retry_delay_ms))
    }

    /// `connect_timeout_ms`, with 0 meaning none.
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        match Url::parse(self.web_url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::UnsupportedScheme(url.scheme().into())),
            Err(e) => errors.push(ValidationError::InvalidUrl(e.to_string())),
        }

        if let Err(ApacalError::Layout(e)) = self.layout() {
            errors.push(ValidationError::InvalidLayout(e));
        }

        if self.spi_device.trim().is_empty() {
            errors.push(ValidationError::EmptySpiDevice);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
