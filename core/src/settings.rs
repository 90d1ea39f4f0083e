//! Resolver settings.
//!
//! Settings can be built in code or loaded from YAML:
//!
//! ```yaml
//! verbose: false
//! check_executable_name: true
//! strict_values: true
//! ```
//!
//! Missing keys fall back to [`Settings::default`].

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Knobs for a [`CommandTree`](crate::CommandTree).
///
/// # Examples
///
/// ```
/// use cmdtree_core::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.verbose);
/// assert!(settings.check_executable_name);
/// assert!(settings.strict_values);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Emit debug diagnostics. Read by the binary when it installs its
    /// log subscriber; the resolver itself only emits `tracing` events.
    pub verbose: bool,
    /// Require argv[0] to be named after the root command.
    pub check_executable_name: bool,
    /// Treat a flag value the parser rejects as a usage error. When off, the
    /// flag silently keeps its previous value.
    pub strict_values: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: false,
            check_executable_name: true,
            strict_values: true,
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::Yaml`] if it is not valid settings YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path)?;
        let settings = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be written, or
    /// [`SettingsError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}
