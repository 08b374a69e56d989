use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use pg_backup_lib::cli::{Action, Cli};
use pg_backup_lib::client::{Client, ClientError, PrunePolicy};
use pg_backup_lib::config::Config;
use pg_backup_lib::postgres::Postgres;
use pg_backup_lib::prompt::Terminal;
use pg_backup_lib::schedule;
use pg_backup_lib::store::S3Store;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // init logger
    env_logger::builder()
        .filter_level(cli.verbose.unwrap_or(LevelFilter::Info))
        .try_init()
        .expect("env_logger should not fail");

    let cfg = match Config::read_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!(
                "Reading the config file {} failed: {e}",
                cli.config.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let store = match S3Store::new(&cfg.s3) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Setting up the object store failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let database = Postgres::new(cfg.pg_url.clone());

    let client = match Client::new(&cfg, Box::new(database), Box::new(store), Box::new(Terminal)) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let result: Result<(), ClientError> = match cli.action {
        Some(Action::Backup) => client.backup().map(|_| ()),
        Some(Action::Restore) => client.restore(),
        Some(Action::Prune) => client.prune(PrunePolicy::Manual),
        None => match &cfg.backup.schedule {
            Some(expression) => match schedule::run(&client, expression) {
                Ok(()) => Ok(()),
                Err(e) => {
                    log::error!("{e}");
                    return ExitCode::FAILURE;
                }
            },
            None => {
                log::error!("No action given and no [backup] schedule configured");
                return ExitCode::FAILURE;
            }
        },
    };

    if let Err(e) = result {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
