use std::path::PathBuf;

use clap::Parser;

/// Commands themselves are dispatched through the command registry, so clap
/// only splits the global flags from `<command> [args...]`.
#[derive(Parser, Debug)]
#[command(name = "gator")]
#[command(about = "Command-driven RSS aggregator that polls feeds and stores new posts")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON config file (defaults to ~/.gatorconfig.json)
    #[arg(long, env = "GATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "GATOR_LOG", default_value = "warn")]
    pub log_level: String,

    /// Command to run (register, login, users, reset, agg, feeds, addfeed,
    /// follow, following, unfollow, browse)
    pub command: Option<String>,

    /// Arguments for the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
