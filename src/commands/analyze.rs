//! Handler for the `llmcount analyze` command.
//!
//! Plays the role of the interactive client: picks the text, ranks it,
//! asks the selected model for counts (subject to the daily quota) and
//! prints the comparison.

use std::sync::Arc;

use colored::Colorize;

use crate::cli::{OutputFormat, TextInput};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::Result;
use crate::provider::{Credentials, HttpCompletionClient};
use crate::quota::JsonFileStore;
use crate::report;
use crate::service::CounterService;
use crate::session::{CountOutcome, Session};
use crate::utils;

#[derive(Debug)]
pub struct AnalyzeCommandOptions {
    pub input: TextInput,
    pub sample: bool,
    pub generate: bool,
    pub model: Option<String>,
    pub format: OutputFormat,
    pub quiet: bool,
}

pub fn run(options: AnalyzeCommandOptions, config: &Config) -> Result<()> {
    let client = HttpCompletionClient::new(&config.provider, Credentials::from_env())?;
    let service = CounterService::new(client, config.limits.clone(), config.provider.clone());
    let store = JsonFileStore::new(config.usage_path());
    let mut session = Session::new(service, config, Arc::new(SystemClock), Box::new(store))?;

    if let Some(ref model) = options.model {
        session.select_model(model)?;
    }

    let runtime = utils::runtime()?;
    if options.sample {
        let title = session.load_sample(&mut rand::thread_rng());
        if !options.quiet {
            eprintln!("{} {}", "sample:".dimmed(), title);
        }
    } else if options.generate {
        runtime.block_on(session.generate_article())?;
        if !options.quiet {
            eprintln!("{}\n", session.text());
        }
    } else {
        session.set_text(utils::read_text(&options.input)?);
    }

    let format = utils::cli_format_to_output_format(&options.format);
    let report = match runtime.block_on(session.request_counts())? {
        CountOutcome::Completed(report) => report,
        CountOutcome::Dropped => session.report(),
    };
    print!("{}", report::render_comparison(&report, format)?);

    if !options.quiet {
        let remaining = session.quota().remaining()?;
        eprintln!(
            "{}",
            format!("{remaining} of {} requests left today", session.quota().limit()).dimmed()
        );
    }
    Ok(())
}
