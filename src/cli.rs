//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::CombinationRule;
use clap::Parser;
use std::path::PathBuf;

/// findoutlie - flag corrupted frames in 4D functional runs
///
/// Scans a data directory for functional images, computes per-timepoint
/// metrics (DVARS, coefficient of variation), applies robust outlier
/// detectors and reports the frames flagged by the consensus rule.
///
/// Examples:
///   findoutlie data
///   findoutlie data --combination all --format json -o outliers.json
///   findoutlie data --dry-run
///   findoutlie data --subject 1 --run 2
///   findoutlie data --validate
///   findoutlie --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing the functional runs
    #[arg(value_name = "DATA_DIR", required_unless_present = "init_config")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .findoutlie.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Consensus rule across metrics (any, all)
    ///
    /// "any" flags a frame when at least one metric flags it; "all" only
    /// when every metric does.
    #[arg(long, value_name = "RULE", env = "FINDOUTLIE_COMBINATION")]
    pub combination: Option<CombinationRule>,

    /// Number of scans processed concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// File name prefix of functional runs
    #[arg(long, value_name = "PREFIX")]
    pub pattern: Option<String>,

    /// Analyse only this subject (requires --run)
    #[arg(long, value_name = "ID", requires = "run")]
    pub subject: Option<u32>,

    /// Analyse only this run of --subject
    #[arg(long, value_name = "ID", requires = "subject")]
    pub run: Option<u32>,

    /// Check file hashes against group-00/hash_list.txt before analysis
    #[arg(long)]
    pub validate: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the runs that would be analysed and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 if any outlier frame is found
    ///
    /// Useful for QC gates in processing pipelines.
    #[arg(long)]
    pub fail_on_outliers: bool,

    /// Generate a default .findoutlie.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref data_dir) = self.data_dir {
            if !data_dir.exists() {
                return Err(format!(
                    "Data directory does not exist: {}",
                    data_dir.display()
                ));
            }
            if !data_dir.is_dir() {
                return Err(format!(
                    "Data path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data_dir: Some(PathBuf::from(".")),
            config: None,
            output: None,
            format: OutputFormat::Markdown,
            combination: None,
            concurrency: None,
            pattern: None,
            subject: None,
            run: None,
            validate: false,
            verbose: false,
            quiet: false,
            dry_run: false,
            fail_on_outliers: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_combination() {
        let args = Args::try_parse_from(["findoutlie", "data", "--combination", "all"]).unwrap();
        assert_eq!(args.combination, Some(CombinationRule::All));
        assert_eq!(args.data_dir, Some(PathBuf::from("data")));

        assert!(Args::try_parse_from(["findoutlie", "data", "--combination", "most"]).is_err());
    }

    #[test]
    fn test_parse_subject_and_run() {
        let args =
            Args::try_parse_from(["findoutlie", "data", "--subject", "1", "--run", "2"]).unwrap();
        assert_eq!(args.subject, Some(1));
        assert_eq!(args.run, Some(2));

        assert!(Args::try_parse_from(["findoutlie", "data", "--subject", "1"]).is_err());
        assert!(Args::try_parse_from(["findoutlie", "data", "--run", "2"]).is_err());
    }

    #[test]
    fn test_parse_validate() {
        let args = Args::try_parse_from(["findoutlie", "data", "--validate"]).unwrap();
        assert!(args.validate);
    }

    #[test]
    fn test_init_config_without_data_dir() {
        let args = Args::try_parse_from(["findoutlie", "--init-config"]).unwrap();
        assert!(args.init_config);
        assert!(Args::try_parse_from(["findoutlie"]).is_err());
    }

    #[test]
    fn test_validation_missing_directory() {
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
