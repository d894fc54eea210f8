//! # semweb-validator Library
//!
//! An async client for the hosted structured-data validator: submit an HTML
//! document and get back the microdata, RDFa, microformat and JSON-LD blocks
//! the service extracted from it.
//!
//! ```rust,no_run
//! use semweb_validator::Validator;
//!
//! # async fn run() -> semweb_validator::Result<()> {
//! let validator = Validator::new("api-key");
//! let result = validator.check_document("<html>...</html>").await?;
//! println!("{} items", result.data.total_items());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod http_client;
pub mod output;
pub mod validator;

pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{
    ApiVersion, Config, ConfigError, ConfigManager, DEFAULT_BASE_URL, EnvProvider,
    SystemEnvProvider, ValidatorConfig,
};
pub use error::{Result, ServiceError, ValidatorError};
pub use http_client::{
    HttpClientConfig, HttpTransport, Transport, TransportRequest, TransportResponse,
};
pub use output::Output;
pub use validator::{Endpoint, StructuredData, StructuredItem, ValidationResult, Validator};
