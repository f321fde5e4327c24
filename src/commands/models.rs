//! Handler for the `llmcount models` command.

use colored::Colorize;

use crate::error::{LlmCountError, Result};
use crate::models::{self, Provider};

pub fn run(provider: Option<&str>) -> Result<()> {
    let listed = match provider {
        Some(name) => {
            let p = Provider::parse(name).ok_or_else(|| {
                LlmCountError::validation("--provider", format!("unknown provider '{name}'"))
            })?;
            models::models_by_provider(p)
        }
        None => models::all_models().iter().collect(),
    };

    for m in listed {
        println!("{:<28} {:<20} {}", m.id.bold(), m.name, m.provider.to_string().dimmed());
    }
    Ok(())
}
