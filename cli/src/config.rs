//! Settings for the demo binary.
//!
//! `CMDTREE_CONFIG` points at a YAML settings file; `CMDTREE_VERBOSE`
//! overrides its `verbose` key.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cmdtree_core::Settings;

pub const CONFIG_ENV: &str = "CMDTREE_CONFIG";
pub const VERBOSE_ENV: &str = "CMDTREE_VERBOSE";

/// Reads settings from the environment.
pub fn load_settings() -> Result<Settings> {
    settings_from(
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        std::env::var(VERBOSE_ENV).ok(),
    )
}

fn settings_from(config: Option<PathBuf>, verbose: Option<String>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("failed to load settings from '{}'", path.display()))?,
        None => Settings::default(),
    };

    if let Some(raw) = verbose {
        settings.verbose = parse_switch(&raw);
    }

    Ok(settings)
}

fn parse_switch(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
