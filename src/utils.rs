//! Shared helpers used across multiple commands.

use std::io::Read;

use crate::cli::{OutputFormat, TextInput};
use crate::error::{LlmCountError, Result};
use crate::report::Format;

// ---------------------------------------------------------------------------
// Format mapping
// ---------------------------------------------------------------------------

/// Map the clap [`OutputFormat`] to the library [`Format`].
pub fn cli_format_to_output_format(fmt: &OutputFormat) -> Format {
    match fmt {
        OutputFormat::Table => Format::Table,
        OutputFormat::Json => Format::Json,
    }
}

// ---------------------------------------------------------------------------
// Text input
// ---------------------------------------------------------------------------

/// Resolve the text to analyse: `--text`, a file, or stdin.
pub fn read_text(input: &TextInput) -> Result<String> {
    if let Some(ref text) = input.text {
        return Ok(text.clone());
    }
    if let Some(ref path) = input.file {
        return std::fs::read_to_string(path)
            .map_err(|e| LlmCountError::io(format!("reading '{}'", path.display()), e));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| LlmCountError::io("reading stdin", e))?;
    Ok(text)
}

/// A multi-thread tokio runtime for commands that talk to the network.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmCountError::io("starting async runtime", e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
