//! Periodic [PostgreSQL] backups to any S3-compatible object store.
//!
//! A backup run dumps the database with `pg_dump`, optionally encrypts the
//! dump for a set of [age] recipients and uploads it under a time-ordered
//! name (`<prefix>_<RFC3339>.backup[.age]`). The [client] module implements
//! the backup, restore and prune lifecycle on top of the [backup] naming and
//! catalog rules; [schedule] drives it on a cron cadence.
//!
//! [PostgreSQL]: https://www.postgresql.org/
//! [age]: https://age-encryption.org/

#![forbid(unsafe_code)]

pub mod backup;
pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod postgres;
pub mod prompt;
pub mod schedule;
pub mod store;
