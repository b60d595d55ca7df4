// Thu Jan 22 2026 - Alex

use crate::structure::walker::DEFAULT_MAX_DEPTH;
use crate::structure::AllowList;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_OUTPUT_FILE: &str = "dump.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid option: {0}")]
    Invalid(String),
}

/// The allow-list document: `{"structures": [...], "functions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub structures: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
}

impl TargetConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Problems worth reporting that do not prevent a run.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.structures.is_empty() && self.functions.is_empty() {
            warnings.push("allow-list is empty, nothing will be dumped".to_string());
        }

        for (label, names) in [("structure", &self.structures), ("function", &self.functions)] {
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(name.as_str()) {
                    warnings.push(format!("duplicate {} name: {}", label, name));
                }
                if name.trim() != name {
                    warnings.push(format!("{} name has surrounding whitespace: {:?}", label, name));
                }
            }
        }

        warnings
    }

    pub fn to_allow_list(&self) -> AllowList {
        AllowList::new(self.structures.iter().cloned(), self.functions.iter().cloned())
    }
}

/// Options for one dump run.
#[derive(Debug, Clone)]
pub struct Config {
    pub pdb_path: PathBuf,
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    pub indent: usize,
    pub max_depth: u32,
    pub show_progress: bool,
}

impl Config {
    /// Looks for the allow-list and writes the dump next to the database
    /// unless told otherwise.
    pub fn new<P: AsRef<Path>>(pdb_path: P) -> Self {
        let pdb_path = pdb_path.as_ref().to_path_buf();
        let dir = pdb_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            config_path: dir.join(DEFAULT_CONFIG_FILE),
            output_path: dir.join(DEFAULT_OUTPUT_FILE),
            pdb_path,
            indent: 1,
            max_depth: DEFAULT_MAX_DEPTH,
            show_progress: true,
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = path;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indent > 16 {
            return Err(ConfigError::Invalid(format!("indent must be at most 16, got {}", self.indent)));
        }
        if self.output_path == self.pdb_path || self.output_path == self.config_path {
            return Err(ConfigError::Invalid(format!(
                "output path {:?} would overwrite an input",
                self.output_path
            )));
        }
        Ok(())
    }
}
