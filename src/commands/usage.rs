//! Handler for the `llmcount usage` command.

use std::sync::Arc;

use colored::Colorize;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::Result;
use crate::quota::{JsonFileStore, QuotaGate};

pub fn run(reset: bool, quiet: bool, config: &Config) -> Result<()> {
    let store = JsonFileStore::new(config.usage_path());
    let gate = QuotaGate::new(
        Arc::new(SystemClock),
        Box::new(store),
        config.limits.daily_quota,
    );

    if reset {
        gate.reset()?;
        if !quiet {
            println!("{} usage reset", "ok".green().bold());
        }
        return Ok(());
    }

    let status = gate.status()?;
    println!("{}", "Usage".bold());
    println!("  date:       {}", status.date);
    println!("  used:       {}", status.count);
    println!("  limit:      {}", gate.limit());
    println!("  remaining:  {}", gate.limit().saturating_sub(status.count));
    Ok(())
}
