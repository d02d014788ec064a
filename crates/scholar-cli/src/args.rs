use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(about = "Scholar - multi-session study assistant chat", long_about = None)]
pub struct Args {
    /// Config file to read instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where to persist sessions (overrides config and environment)
    #[arg(long, value_name = "PATH")]
    pub sessions_file: Option<PathBuf>,

    /// Assistant backend base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Model identifier sent with every request
    #[arg(long)]
    pub model: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
