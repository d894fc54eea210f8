use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use semweb_validator::{
    Cli, ConfigManager, Output, OutputFormat, Validator, ValidatorError, VerbosityLevel,
};

const EXIT_REJECTED: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_FAILURE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn init_logging(verbosity: VerbosityLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        VerbosityLevel::Quiet => EnvFilter::new("semweb_validator=error"),
        VerbosityLevel::Normal => EnvFilter::new("semweb_validator=warn"),
        VerbosityLevel::Verbose => EnvFilter::new("semweb_validator=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Returns the exit code for a completed check; `Err` covers usage and
/// configuration problems.
async fn run(cli: Cli) -> Result<ExitCode> {
    if let Err(message) = cli.validate() {
        bail!(message);
    }

    let config = ConfigManager::load_config(&cli)
        .await
        .context("failed to load configuration")?;
    let Some(token) = config.token.clone() else {
        bail!("no API token given (use --token, SEMWEB_VALIDATOR_TOKEN or the config file)");
    };

    let verbosity = if config.output.quiet {
        VerbosityLevel::Quiet
    } else if config.output.verbose {
        VerbosityLevel::Verbose
    } else {
        VerbosityLevel::Normal
    };
    let output = Output::new(OutputFormat::from(config.output.format.clone()), verbosity);

    let document = read_document(&cli).await?;
    let validator = Validator::with_config(token, &config.validator)?;
    info!(
        api_version = %config.validator.api_version,
        path = validator.endpoint().path(),
        "checking document"
    );

    // A configured timeout is enforced by the HTTP client itself.
    let outcome = validator
        .check_document_until(&document, shutdown_signal())
        .await;

    match outcome {
        Ok(result) => {
            print!("{}", output.format_result(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            debug!(error = ?err, "document check failed");
            eprintln!("{}", output.format_error(&err));
            Ok(ExitCode::from(exit_code_for(&err)))
        }
    }
}

async fn read_document(cli: &Cli) -> Result<String> {
    if cli.reads_stdin() {
        let mut document = String::new();
        tokio::io::stdin()
            .read_to_string(&mut document)
            .await
            .context("failed to read document from stdin")?;
        Ok(document)
    } else {
        tokio::fs::read_to_string(&cli.document)
            .await
            .with_context(|| format!("failed to read {}", cli.document.display()))
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn exit_code_for(err: &ValidatorError) -> u8 {
    match err {
        ValidatorError::Service { .. } => EXIT_REJECTED,
        ValidatorError::InvalidUrl { .. } => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}
