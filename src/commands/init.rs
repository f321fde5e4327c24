use std::path::PathBuf;

use crate::config::Config;
use crate::error::{LlmCountError, Result};

/// Options for the `init` command.
pub struct InitOptions {
    /// Where to write the config; defaults to `./llmcount.toml`.
    pub path: Option<PathBuf>,
    pub force: bool,
}

/// Result of a successful `init` operation.
#[derive(Debug)]
pub struct InitResult {
    pub config_path: PathBuf,
    pub overwritten: bool,
}

/// Run the init command: write the default config.
pub fn run(options: InitOptions) -> Result<InitResult> {
    let config_path = options
        .path
        .unwrap_or_else(|| PathBuf::from("llmcount.toml"));

    let exists = config_path.exists();
    if exists && !options.force {
        return Err(LlmCountError::config(format!(
            "config already exists at '{}' (use --force to overwrite)",
            config_path.display()
        )));
    }

    Config::default().save(&config_path)?;

    Ok(InitResult {
        config_path,
        overwritten: exists,
    })
}
