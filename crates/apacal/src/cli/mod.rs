//! CLI subcommands — LED mirroring, color watching, configuration.

mod config_cmd;
mod mirror;
mod watch;

use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

pub(super) use apacal_lib::Color;
pub(super) use apacal_lib::config::{Config, ValidationError};
pub(super) use apacal_lib::error::{ApacalError, Result};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Load the config from `custom_path`, or the default location.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

/// Turn every validation problem into a single config error.
pub(super) fn check_config(config: &Config) -> Result<()> {
    config.validate().map_err(|errors| {
        let problems: Vec<String> = errors.iter().map(ValidationError::to_string).collect();
        ApacalError::Config(problems.join("; "))
    })
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub problems: Vec<String>,
}

/// Flags of `mirror` that override config values.
#[derive(Args, Debug, Default, Clone)]
pub struct MirrorArgs {
    /// Address of the DisplayCAL web interface
    #[arg(long)]
    web: Option<String>,
    /// Number of LEDs to drive
    #[arg(short = 'n', long = "pixels")]
    num_pixels: Option<usize>,
    /// First pixel to illuminate; 0 is the first pixel
    #[arg(long)]
    from: Option<usize>,
    /// Last pixel to illuminate (exclusive); default: all pixels
    #[arg(long)]
    to: Option<usize>,
    /// Upper bound on brightness (0-255)
    #[arg(short, long)]
    intensity: Option<u8>,
    /// SPI device the strip is attached to
    #[arg(long, value_name = "PATH")]
    spi: Option<String>,
}

impl MirrorArgs {
    /// Overlay the flags that were given onto `config`.
    pub(super) fn apply(&self, config: &mut Config) {
        if let Some(web) = &self.web {
            config.web_url = web.clone();
        }
        if let Some(n) = self.num_pixels {
            config.num_pixels = n;
        }
        if let Some(from) = self.from {
            config.first_pixel = from;
        }
        if self.to.is_some() {
            config.last_pixel = self.to;
        }
        if let Some(intensity) = self.intensity {
            config.intensity = intensity;
        }
        if let Some(spi) = &self.spi {
            config.spi_device = spi.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Mirror the requested color onto the LED strip
    Mirror(MirrorArgs),

    /// Print each requested color without driving any LEDs
    Watch {
        /// Address of the DisplayCAL web interface
        #[arg(long)]
        web: Option<String>,
    },

    /// Show current configuration and file path
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Write the effective settings (defaults filled in) to the config file
        #[arg(long)]
        save: bool,
    },
}

pub async fn run(
    cmd: Command,
    config_path: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<()> {
    match cmd {
        Command::Mirror(args) => mirror::cmd_mirror(&args, config_path, cancel).await,
        Command::Watch { web } => watch::cmd_watch(web, config_path, cancel).await,
        Command::Config { json, save } => config_cmd::cmd_config(json, save, config_path),
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        // Indent key needs +2 for the prefix
        let w = kv_width(&["A:"], &["Very long indent key:"]);
        // "Very long indent key:" = 21 + PADDING + 2 = 25
        assert_eq!(w, 25);
    }

    #[test]
    fn kv_width_empty_both() {
        assert_eq!(kv_width(&[], &[]), 0);
    }

    #[test]
    fn values_align_across_levels() {
        let w = kv_width(&["Top:"], &["Indent:"]);
        let top = format_kv("Top:", "V", w);
        // Simulate kv_indent output
        let indent = format!("  {:<width$}{}", "Indent:", "V", width = w - 2);
        assert_eq!(top.find('V'), indent.find('V'));
    }

    #[test]
    fn format_kv_basic() {
        assert_eq!(format_kv("Key:", "value", 10), "Key:      value");
    }
}
