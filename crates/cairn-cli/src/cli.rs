use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cairn",
    about = "Cairn: build, traverse and verify synthetic content trees",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build, commit and traverse a single tree
    Run(RunArgs),
    /// Run every scenario of a configuration file
    Suite(SuiteArgs),
    /// Print the predicted node count of a tree
    Expect(ExpectArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Children per node
    #[arg(short, long)]
    pub branching: u32,
    /// Levels below the starting node
    #[arg(short, long)]
    pub depth: u32,
    /// Properties set on every generated node
    #[arg(short, long, default_value_t = 0)]
    pub properties: u32,
    /// Seed of the name generator
    #[arg(long)]
    pub seed: Option<u64>,
    /// Node the tree is built under; created if missing
    #[arg(long)]
    pub path: Option<String>,
    /// Configuration file supplying defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Description printed instead of the shape
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Args)]
pub struct SuiteArgs {
    /// TOML configuration; built-in scenarios are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct ExpectArgs {
    #[arg(short, long)]
    pub branching: u32,
    #[arg(short, long)]
    pub depth: u32,
    /// Count the starting node as well
    #[arg(long)]
    pub include_root: bool,
}
