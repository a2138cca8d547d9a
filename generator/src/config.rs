use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::Error;

/// Settings read from a TOML file. Command line flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
    /// Layered onto the selected wool, before its own patterns
    #[serde(default)]
    pub type_patterns: Vec<TypePatternConfig>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TypePatternConfig {
    pub pattern: String,
    pub name: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies the command line on top of the file: an output path replaces the configured one,
    /// search paths are tried before the configured ones.
    pub fn merge(mut self, cli: &Cli) -> Self {
        if cli.output_path.is_some() {
            self.output_path = cli.output_path.clone();
        }
        let mut search_paths = cli.search_paths.clone();
        search_paths.append(&mut self.search_paths);
        self.search_paths = search_paths;
        self
    }
}
