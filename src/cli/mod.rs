use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbosity of the command output.
    #[arg(long)]
    pub verbose: Option<LevelFilter>,

    /// Path to the config file.
    #[arg(
        long,
        short = 'c',
        default_value = "pg_backup.toml",
        env = "PG_BACKUP_CONF"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub action: Option<Action>,
}

/// Without an action the scheduler runs, if a schedule is configured.
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Dump the database and upload it to the object store.
    Backup,
    /// Restore the database from the most recent backup.
    Restore,
    /// Delete backups beyond the configured retention count.
    Prune,
}
