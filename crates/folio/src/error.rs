//! CLI error types.

use folio_config::ConfigError;
use folio_server::StartupError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Startup(#[from] StartupError),

    #[error("Failed to create tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
