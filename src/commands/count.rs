//! Handler for the `llmcount count` command: local ranking only.

use crate::cli::{OutputFormat, TextInput};
use crate::config::Config;
use crate::error::{LlmCountError, Result};
use crate::frequency::{self, RankPolicy, MAX_TOP_K};
use crate::report;
use crate::utils;

/// All inputs needed to run the count command.
#[derive(Debug)]
pub struct CountCommandOptions {
    pub input: TextInput,
    /// Overrides `ranking.top_k`.
    pub top: Option<usize>,
    /// Overrides `ranking.min_token_len`.
    pub min_len: Option<usize>,
    pub format: OutputFormat,
}

pub fn run(options: CountCommandOptions, config: &Config) -> Result<()> {
    let policy = RankPolicy {
        top_k: options.top.unwrap_or(config.ranking.top_k),
        min_len: options.min_len.unwrap_or(config.ranking.min_token_len),
    };
    if policy.top_k == 0 || policy.top_k > MAX_TOP_K {
        return Err(LlmCountError::validation(
            "--top",
            format!("must be between 1 and {MAX_TOP_K}"),
        ));
    }

    let text = utils::read_text(&options.input)?;
    let ranking = frequency::rank(&text, policy);
    let format = utils::cli_format_to_output_format(&options.format);
    print!("{}", report::render_ranking(&ranking, format)?);
    Ok(())
}
