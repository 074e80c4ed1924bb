use clap::Parser;
use tracing::debug;

use gator::cli::Cli;
use gator::commands::{Command, CommandRegistry, Session};
use gator::config::Config;
use gator::errors::GatorResult;
use gator::logging;
use gator::sources::RssFetcher;
use gator::storage::{SqliteStorage, Store};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> GatorResult<()> {
    Config::load_env_files();
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    // Load configuration
    let mut config = Config::load(cli.config)?;
    debug!(config = %config.path().display(), db = %config.db_path, "configuration loaded");

    let registry = CommandRegistry::new();
    let Some(name) = cli.command else {
        print_usage(&registry);
        return Ok(());
    };

    // Initialize storage
    let store = Store::sqlite(SqliteStorage::new(&config.db_path)?);
    let fetcher = RssFetcher::new(config.fetch_timeout)?;

    let mut session = Session::new(&store, &mut config, &fetcher);
    registry.must_run(&mut session, &Command::new(name, cli.args));
    Ok(())
}

fn print_usage(registry: &CommandRegistry) {
    println!("Usage: gator <command> [args...]\n");
    println!("Commands:");
    for name in registry.names() {
        println!("  {}", name);
    }
}
