use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use llmcount::cli::{Cli, ColorMode, Command};
use llmcount::commands;
use llmcount::commands::analyze::AnalyzeCommandOptions;
use llmcount::commands::count::CountCommandOptions;
use llmcount::commands::init::{InitOptions, InitResult};
use llmcount::commands::serve::ServeCommandOptions;
use llmcount::config::Config;

fn main() {
    let cli = Cli::parse();

    // Configure color output
    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    // Init tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let load_config =
        || Config::discover(config_path.as_deref()).context("loading configuration");

    match cli.command {
        Command::Init { path, force } => {
            let result = commands::init::run(InitOptions { path, force })?;
            if !cli.quiet {
                print_init_result(&result);
            }
        }
        Command::Serve { host, port } => {
            commands::serve::run(ServeCommandOptions { host, port }, &load_config()?)?
        }
        Command::Count {
            input,
            top,
            min_len,
            format,
        } => commands::count::run(
            CountCommandOptions {
                input,
                top,
                min_len,
                format,
            },
            &load_config()?,
        )?,
        Command::Analyze {
            input,
            sample,
            generate,
            model,
            format,
        } => commands::analyze::run(
            AnalyzeCommandOptions {
                input,
                sample,
                generate,
                model,
                format,
                quiet: cli.quiet,
            },
            &load_config()?,
        )?,
        Command::Models { provider } => commands::models::run(provider.as_deref())?,
        Command::Sample { titles } => commands::sample::run(titles),
        Command::Usage { reset } => commands::usage::run(reset, cli.quiet, &load_config()?)?,
    }
    Ok(())
}

fn print_init_result(result: &InitResult) {
    let verb = if result.overwritten { "Overwrote" } else { "Created" };
    println!(
        "{} {verb} config at {}",
        "ok".green().bold(),
        result.config_path.display()
    );
    println!();
    println!("Next steps:");
    println!(
        "  1. Set {} (and any other provider keys you need)",
        "OPENAI_API_KEY".bold()
    );
    println!("  2. Run {} to start the API", "llmcount serve".bold());
    println!(
        "  3. Run {} to test a model",
        "llmcount analyze --sample".bold()
    );
}
