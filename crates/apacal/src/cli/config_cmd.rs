//! `config` subcommand — show current configuration and file path.

use std::path::Path;

use super::{ApacalError, Config, ConfigOutput, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(json: bool, save: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    if save {
        let Some(path) = &config_path else {
            return Err(ApacalError::Config("no config directory".into()));
        };
        config.save_to(path)?;
        eprintln!("Saved settings to {}", path.display());
    }
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());
    let problems: Vec<String> = match config.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            problems,
        };
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| ApacalError::Io(std::io::Error::other(e)))?;
        println!("{text}");
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "web_url:",
            "num_pixels:",
            "first_pixel:",
            "last_pixel:",
            "intensity:",
            "spi_device:",
            "retry_delay_ms:",
            "connect_timeout_ms:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("web_url:", &config.web_url, w);
    kv_indent("num_pixels:", config.num_pixels, w);
    kv_indent("first_pixel:", config.first_pixel, w);
    match config.last_pixel {
        Some(last) => kv_indent("last_pixel:", last, w),
        None => kv_indent("last_pixel:", "(all pixels)", w),
    }
    kv_indent("intensity:", config.intensity, w);
    kv_indent("spi_device:", &config.spi_device, w);
    kv_indent("retry_delay_ms:", config.retry_delay_ms, w);
    match config.connect_timeout_ms {
        0 => kv_indent("connect_timeout_ms:", "0 (none)", w),
        ms => kv_indent("connect_timeout_ms:", ms, w),
    }

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for problem in &problems {
            println!("  {problem}");
        }
    }

    Ok(())
}
