//! Cron-driven backup/prune loop.

use std::thread;
use std::time::Duration;

use chrono::Local;
use croner::errors::CronError;
use croner::Cron;
use derive_more::{Display, Error, From};

use crate::client::{Client, PrunePolicy};

/// Schedule expression could not be parsed or evaluated.
#[derive(Debug, Display, Error, From)]
#[display("invalid schedule expression: {_0}")]
pub struct ScheduleError(CronError);

/// Runs a backup followed by a scheduled-policy prune on every cron tick.
///
/// A failing tick is logged and the loop carries on with the next one. Ticks
/// never overlap since everything runs on this one thread; an interrupt
/// terminates the process between operations.
pub fn run(client: &Client, expression: &str) -> Result<(), ScheduleError> {
    let cron = parse(expression)?;

    log::info!(target: "schedule", "running scheduler");
    loop {
        let now = Local::now();
        let next = cron.find_next_occurrence(&now, false)?;
        log::debug!(target: "schedule", "next backup at {next}");

        let pause = (next - now).to_std().unwrap_or(Duration::ZERO);
        thread::sleep(pause);

        match client.backup() {
            Ok(name) => log::info!(target: "schedule", "scheduled backup created {name}"),
            Err(e) => {
                log::error!(target: "schedule", "scheduled backup failed: {e}");
                continue;
            }
        }

        if let Err(e) = client.prune(PrunePolicy::Scheduled) {
            log::error!(target: "schedule", "scheduled prune failed: {e}");
        }
    }
}

/// Parses a five-field cron expression.
fn parse(expression: &str) -> Result<Cron, ScheduleError> {
    Ok(Cron::new(expression).parse()?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn accepts_a_daily_expression() {
        let cron = parse("0 9 * * *").unwrap();

        let now = Local.with_ymd_and_hms(2021, 9, 23, 14, 41, 17).unwrap();
        let next = cron.find_next_occurrence(&now, false).unwrap();
        assert_eq!(next, Local.with_ymd_and_hms(2021, 9, 24, 9, 0, 0).unwrap());
    }

    #[test]
    fn rejects_a_malformed_expression() {
        assert!(parse("not a schedule").is_err());
        assert!(parse("99 99 * * *").is_err());
    }
}
