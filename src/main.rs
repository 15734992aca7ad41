mod budget;
mod config;
mod db;
mod error;
mod logging;
mod models;
mod report;
mod run;
mod ui;

use anyhow::{bail, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    let (db_override, args) = split_db_flag(std::env::args().skip(1).collect())?;
    let config = config::Config::load(db_override)?;
    logging::init_tracing(&config.log_file)?;

    let mut db = db::Database::open(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), "fintrack started");

    if args.is_empty() {
        run::as_tui(&mut db, &config)
    } else {
        run::as_cli(&args, &mut db, &config)
    }
}

/// Pull the global `--db <path>` flag off the front of the argument list.
/// Scanning stops at the subcommand, so its own arguments pass through intact.
fn split_db_flag(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut db = None;
    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next_if(|a| a == "--db" || a.starts_with("--db=")) {
        match arg.strip_prefix("--db=") {
            Some(path) => db = Some(PathBuf::from(path)),
            None => match iter.next() {
                Some(path) => db = Some(PathBuf::from(path)),
                None => bail!("--db requires a path"),
            },
        }
    }
    Ok((db, iter.collect()))
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
