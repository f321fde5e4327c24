use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "llmcount",
    about = "Measure how accurately language models count words",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config file
    Init {
        /// Path to write config file
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Serve the HTTP API
    #[command(alias = "s")]
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Rank the most frequent words locally
    #[command(alias = "c")]
    Count {
        #[command(flatten)]
        input: TextInput,

        /// Number of words to rank
        #[arg(long)]
        top: Option<usize>,

        /// Ignore words shorter than this
        #[arg(long)]
        min_len: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Ask a model to count the top words and score its answer
    #[command(alias = "a")]
    Analyze {
        #[command(flatten)]
        input: TextInput,

        /// Use a built-in sample article
        #[arg(long, conflicts_with_all = ["file", "text", "generate"])]
        sample: bool,

        /// Have a model write the article first
        #[arg(long, conflicts_with_all = ["file", "text"])]
        generate: bool,

        /// Model id (see `llmcount models`)
        #[arg(long, short)]
        model: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List available models
    Models {
        /// Only show models from this provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Print a built-in sample article
    Sample {
        /// Print only the titles of all samples
        #[arg(long)]
        titles: bool,
    },

    /// Show or reset today's usage quota
    Usage {
        /// Reset today's count to zero
        #[arg(long)]
        reset: bool,
    },
}

/// Where the text comes from. Reads stdin when neither is given.
#[derive(clap::Args, Debug, Clone)]
pub struct TextInput {
    /// Read text from a file
    pub file: Option<PathBuf>,

    /// Use this text directly
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
