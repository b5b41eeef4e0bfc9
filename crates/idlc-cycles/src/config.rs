//! Compiler configuration (idlc.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// What to do when the package graph of a definition is cyclic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleMode {
    /// Merge and split packages until the package graph is acyclic
    #[default]
    Resolve,
    /// Fail on the first package cycle
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CyclesConfig {
    #[serde(default)]
    pub mode: CycleMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print emitted JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    #[serde(default)]
    pub cycles: CyclesConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl CompilerConfig {
    /// Load the configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }
}

impl FromStr for CompilerConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CompilerConfig = "".parse().unwrap();
        assert_eq!(config, CompilerConfig::default());
        assert_eq!(config.cycles.mode, CycleMode::Resolve);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[cycles]
mode = "reject"

[output]
pretty = false
"#;
        let config: CompilerConfig = toml.parse().unwrap();
        assert_eq!(config.cycles.mode, CycleMode::Reject);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = "[cycles]\nmode = \"ignore\"\n".parse::<CompilerConfig>();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result = "[cyclez]\nmode = \"resolve\"\n".parse::<CompilerConfig>();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\npretty = false").unwrap();

        let config = CompilerConfig::from_file(file.path()).unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.cycles.mode, CycleMode::Resolve);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CompilerConfig::from_file(&dir.path().join("idlc.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
