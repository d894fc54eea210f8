use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show every extracted item
    Verbose,
}

/// Output format for the check result
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Human,
    /// The service response as pretty-printed JSON
    Json,
}

/// Extract and check structured data (microdata, RDFa, microformats, JSON-LD)
/// in an HTML document using the hosted validator service
#[derive(Parser, Debug, Clone)]
#[command(name = "semweb-validator")]
#[command(version)]
pub struct Cli {
    /// HTML file to check, or '-' to read from stdin
    pub document: PathBuf,

    /// API key for the validator service
    #[arg(long = "token")]
    pub token: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Service origin
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// API revision: 'v1.1' or 'legacy'
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn reads_stdin(&self) -> bool {
        self.document.as_os_str() == "-"
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.reads_stdin() && !self.document.is_file() {
            return Err(format!(
                "Document does not exist: {}",
                self.document.display()
            ));
        }
        if self.timeout == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_basic_cli_parsing() {
        let cli = Cli::try_parse_from(["semweb-validator", "page.html"]).unwrap();
        assert_eq!(cli.document, PathBuf::from("page.html"));
        assert!(cli.output_format.is_none());
        assert_eq!(cli.verbosity(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_stdin_document() {
        let cli = Cli::try_parse_from(["semweb-validator", "-"]).unwrap();
        assert!(cli.reads_stdin());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "semweb-validator",
            "--token",
            "k",
            "--base-url",
            "http://localhost:1234",
            "--api-version",
            "legacy",
            "--timeout",
            "10",
            "--format",
            "json",
            "-v",
            "page.html",
        ])
        .unwrap();
        assert_eq!(cli.token.as_deref(), Some("k"));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:1234"));
        assert_eq!(cli.api_version.as_deref(), Some("legacy"));
        assert_eq!(cli.timeout, Some(10));
        assert_eq!(cli.output_format, Some(OutputFormat::Json));
        assert_eq!(cli.verbosity(), VerbosityLevel::Verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["semweb-validator", "-v", "-q", "page.html"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = Cli::try_parse_from(["semweb-validator", "--timeout", "0", "-"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
