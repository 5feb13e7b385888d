//! relalg - relational algebra workbench

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::info;
use relalg::config::{EngineConfig, JoinStrategy};
use relalg::database::Database;
use std::io::Read;
use std::path::PathBuf;

/// Evaluate relational algebra scripts
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script to run; statements are read from stdin when omitted
    script: Option<PathBuf>,

    /// Join algorithm for joins with equality keys
    #[arg(short, long, value_enum, default_value_t = JoinStrategy::Auto)]
    join_strategy: JoinStrategy,

    /// Evaluate plans exactly as written
    #[arg(long)]
    no_optimize: bool,

    /// Reject AND/OR mixed without parentheses
    #[arg(long)]
    strict_grouping: bool,

    /// Print the physical plan above every query result
    #[arg(short, long)]
    explain: bool,

    /// Snapshot to load before running
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Snapshot to write after a successful run
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = EngineConfig::default()
        .with_join_strategy(args.join_strategy)
        .with_optimize(!args.no_optimize)
        .with_strict_grouping(args.strict_grouping)
        .with_explain(args.explain);

    let database = match &args.load {
        Some(path) => {
            info!("Loading snapshot {}", path.display());
            Database::open(path, config).context("Failed to load snapshot")?
        }
        None => Database::new(config),
    };

    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .context("Failed to read stdin")?;
            script
        }
    };

    let statements = database.parse(&script)?;
    info!(
        "Running {} statements (join strategy: {})",
        statements.len(),
        database.config().join_strategy
    );
    for (i, statement) in statements.iter().enumerate() {
        let outcome = database
            .execute_statement(statement)
            .with_context(|| format!("statement {} failed", i + 1))?;
        println!("{}", outcome);
    }

    if let Some(path) = &args.save {
        database.save_snapshot(path)?;
        info!("Saved snapshot {}", path.display());
    }

    Ok(())
}
