//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.findoutlie.toml` files.

use crate::analysis::PipelineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".findoutlie.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Metric/detector steps and consensus rule.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Dataset scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of scans processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Check file hashes before analysis.
    #[serde(default)]
    pub validate: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
            validate: false,
        }
    }
}

fn default_output() -> String {
    "outliers_report.md".to_string()
}

fn default_concurrency() -> usize {
    4
}

/// Dataset scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File name prefix of functional runs.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Image extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names to skip.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            extensions: default_extensions(),
            excludes: default_excludes(),
        }
    }
}

fn default_pattern() -> String {
    "sub-".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["nii.gz", "nii"].into_iter().map(String::from).collect()
}

fn default_excludes() -> Vec<String> {
    vec!["derivatives", "sourcedata"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the per-step breakdown for each scan.
    #[serde(default = "default_true")]
    pub include_steps: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_steps: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(combination) = args.combination {
            self.pipeline.combination = combination;
        }

        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref pattern) = args.pattern {
            self.scanner.pattern = pattern.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }

        if args.validate {
            self.general.validate = true;
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.general.concurrency == 0 {
            anyhow::bail!("Concurrency must be at least 1");
        }
        if self.scanner.extensions.is_empty() {
            anyhow::bail!("At least one scanner extension is required");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CombinationRule;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.pipeline.combination, CombinationRule::Any);
        assert_eq!(config.pipeline.steps.len(), 2);
        assert!(config.scanner.extensions.contains(&"nii.gz".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
verbose = true
concurrency = 2

[pipeline]
combination = "all"

[[pipeline.steps]]
metric = "dvars"
detector = "median_detector"
detector_options = { scale = 3.0 }

[scanner]
extensions = ["nii"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.general.concurrency, 2);
        assert_eq!(config.pipeline.combination, CombinationRule::All);
        assert_eq!(config.pipeline.steps.len(), 1);
        assert_eq!(config.pipeline.steps[0].detector_options["scale"], 3.0);
        assert_eq!(config.scanner.extensions, vec!["nii"]);
        assert_eq!(config.scanner.pattern, "sub-");
    }

    #[test]
    fn test_unknown_combination_rejected() {
        let toml_content = r#"
[pipeline]
combination = "majority"
"#;
        assert!(toml::from_str::<Config>(toml_content).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[pipeline]"));
        assert!(toml_str.contains("[scanner]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "[general]\nconcurrency = 8\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.general.concurrency, 8);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str("[general]\nvalidate = false\n").unwrap();
        let args = crate::cli::Args::try_parse_from([
            "findoutlie",
            "data",
            "--validate",
            "--combination",
            "all",
            "--concurrency",
            "2",
        ])
        .unwrap();

        config.merge_with_args(&args);
        assert!(config.general.validate);
        assert_eq!(config.pipeline.combination, CombinationRule::All);
        assert_eq!(config.general.concurrency, 2);
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.general.concurrency = 0;
        assert!(config.validate().is_err());
    }
}
