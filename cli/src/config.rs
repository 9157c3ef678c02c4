//! Configuration for the `schema-builder` binary.
//!
//! Every field is optional; missing sections fall back to defaults, and
//! command-line flags take precedence over the file.
//!
//! # Example YAML
//!
//! ```yaml
//! output:
//!   format: yaml
//!   compact: false
//!   echo: true
//! check:
//!   deny_duplicates: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};
use crate::output::OutputFormat;

/// How exported documents are rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Document format.
    pub format: OutputFormat,
    /// Single-line JSON instead of indented.
    pub compact: bool,
    /// Print the document after every edit, not just at the end.
    pub echo: bool,
}

/// Settings for the `check` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Fail when siblings share a key.
    pub deny_duplicates: bool,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub output: OutputConfig,
    pub check: CheckConfig,
}

impl BuilderConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CliError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| CliError::File {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}
