//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `blogpad_core` linkage and open the configured record database.
//! - Print a deterministic status summary for quick local sanity checks.
//!
//! Configuration comes from the environment:
//! - `BLOGPAD_DB_PATH`: record database file (default `blogpad.sqlite3`).
//! - `BLOGPAD_LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `BLOGPAD_LOG_DIR`: absolute log directory; logging stays off when unset.

use blogpad_core::db::open_db;
use blogpad_core::{default_log_level, init_logging, BlogStore, SqliteRecordRepository};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "blogpad.sqlite3";

struct CliConfig {
    db_path: PathBuf,
    log_level: String,
    log_dir: Option<String>,
}

impl CliConfig {
    fn from_env() -> Self {
        Self {
            db_path: std::env::var_os("BLOGPAD_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)),
            log_level: std::env::var("BLOGPAD_LOG_LEVEL")
                .unwrap_or_else(|_| default_log_level().to_string()),
            log_dir: std::env::var("BLOGPAD_LOG_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty()),
        }
    }
}

fn main() -> ExitCode {
    match run(CliConfig::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("blogpad: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: CliConfig) -> Result<(), Box<dyn Error>> {
    println!("blogpad_core ping={}", blogpad_core::ping());
    println!("blogpad_core version={}", blogpad_core::core_version());

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let repo = SqliteRecordRepository::try_new(&conn)?;
    let store = BlogStore::open(repo)?;
    info!("event=cli_status module=cli status=ok");

    println!("db_path={}", config.db_path.display());
    println!("accounts={}", store.accounts().len());
    println!("posts={}", store.posts().len());
    match store.session() {
        Some(session) => println!("session=authenticated name={}", session.name),
        None => println!("session=anonymous"),
    }
    Ok(())
}
