//! `folio check` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::Config;
use folio_server::{check, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Validate configuration, default pages and template without serving.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let pages = check(&server_config_from_config(&config, version.to_owned()))?;
        output.success(&format!("OK: {pages} default page(s) loaded"));

        Ok(())
    }
}
