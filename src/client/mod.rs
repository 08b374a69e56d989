//! Backup lifecycle orchestration: backup, restore and prune.

use std::io::{self, Seek, SeekFrom};

use age::x25519::Recipient;
use chrono::Local;
use derive_more::{Display, Error, From};

use crate::backup::catalog;
use crate::backup::name::{self, NameError};
use crate::config::Config;
use crate::crypto::{self, CryptoError, Sealer};
use crate::postgres::{Database, DatabaseError};
use crate::prompt::Prompt;
use crate::store::{ObjectStore, StoreError};

/// Errors of the backup, restore and prune operations.
#[derive(Debug, Display, Error, From)]
pub enum ClientError {
    #[from]
    Name(NameError),

    #[from]
    Crypto(CryptoError),

    #[from]
    Store(StoreError),

    #[from]
    Database(DatabaseError),

    /// Deleting one object aborted the remaining prune deletions.
    #[display("deleting {name} failed: {source}")]
    DeleteFailed { name: String, source: StoreError },

    /// Restore was attempted against a bucket with no backups.
    #[display("no backups present to restore")]
    EmptyCatalog,

    #[from]
    Io(io::Error),
}

/// Which `retention == 0` semantics apply to a prune.
///
/// A zeroed retention must never make an unattended run wipe the bucket,
/// while an operator explicitly asking for a prune may, after confirming.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrunePolicy {
    /// Automatic prune after a scheduled backup; zero retention keeps everything.
    Scheduled,
    /// Operator-invoked prune; zero retention deletes everything once confirmed.
    Manual,
}

/// Composes the database, object store and encryption pipeline into the
/// backup, restore and prune operations.
///
/// Holds no state across operations; each call derives the catalog fresh from
/// a listing. At most one operation per bucket may be in flight at a time.
pub struct Client<'a> {
    cfg: &'a Config,
    database: Box<dyn Database>,
    store: Box<dyn ObjectStore>,
    prompt: Box<dyn Prompt>,
    recipients: Vec<Recipient>,
}

impl<'a> Client<'a> {
    /// Validates the configured recipient keys and assembles the client.
    pub fn new(
        cfg: &'a Config,
        database: Box<dyn Database>,
        store: Box<dyn ObjectStore>,
        prompt: Box<dyn Prompt>,
    ) -> Result<Self, ClientError> {
        let recipients = crypto::parse_recipients(&cfg.encryption.public_keys)?;

        Ok(Self {
            cfg,
            database,
            store,
            prompt,
            recipients,
        })
    }

    /// Dumps the database, optionally encrypts it and uploads the result.
    ///
    /// The name gains the encryption suffix only if encryption actually ran,
    /// and the upload starts only after the encryption trailer was written.
    pub fn backup(&self) -> Result<String, ClientError> {
        let plain = name::generate(&self.cfg.backup.prefix, Local::now())?;

        // spool through one anonymous temp file; the OS reclaims it on every
        // exit path, including panics
        let mut spool = tempfile::tempfile()?;

        let name = if self.recipients.is_empty() {
            self.database.dump(&mut spool)?;
            plain
        } else {
            let mut sealer = Sealer::new(&mut spool, &self.recipients)?;
            self.database.dump(&mut sealer)?;
            sealer.finish()?;
            name::with_encrypted_suffix(&plain)
        };

        spool.seek(SeekFrom::Start(0))?;
        self.store.put(&name, &mut spool)?;

        log::info!(target: "client", "created {name}");
        Ok(name)
    }

    /// Downloads the most recent backup and replays it into the database.
    ///
    /// Prompts for the private key when the selected backup carries the
    /// encryption suffix. Declining the final confirmation is a clean no-op,
    /// not an error.
    pub fn restore(&self) -> Result<(), ClientError> {
        let catalog = catalog::order(self.store.list()?)?;
        let latest = catalog.first().ok_or(ClientError::EmptyCatalog)?;

        let mut blob = self.store.get(latest)?;

        let mut spool = tempfile::tempfile()?;
        if name::is_encrypted(latest) {
            let key = self.prompt.secret("enter private key")?;
            let identity = crypto::parse_identity(&key)?;
            crypto::decrypt(&mut blob, &mut spool, &identity)?;
        } else {
            io::copy(&mut blob, &mut spool)?;
        }

        if !self.prompt.confirm(&format!("restore {latest}"))? {
            log::info!(target: "client", "restore of {latest} declined");
            return Ok(());
        }

        spool.seek(SeekFrom::Start(0))?;
        self.database
            .restore(&mut spool, &self.cfg.restore.schemas)?;

        log::info!(target: "client", "restored {latest}");
        Ok(())
    }

    /// Deletes backups beyond the configured retention count.
    ///
    /// See [PrunePolicy] for the two `retention == 0` behaviors.
    pub fn prune(&self, policy: PrunePolicy) -> Result<(), ClientError> {
        let retention = self.cfg.backup.retention;

        if retention == 0 {
            match policy {
                PrunePolicy::Scheduled => return Ok(()),
                PrunePolicy::Manual => {
                    let catalog = catalog::order(self.store.list()?)?;
                    if catalog.is_empty() {
                        return Ok(());
                    }

                    let message = format!("retention is 0, delete all {} backups", catalog.len());
                    if !self.prompt.confirm(&message)? {
                        return Ok(());
                    }

                    return self.delete_all(&catalog);
                }
            }
        }

        let catalog = catalog::order(self.store.list()?)?;
        self.delete_all(catalog::expired(&catalog, retention))
    }

    fn delete_all(&self, names: &[String]) -> Result<(), ClientError> {
        // object by object; a failure aborts the rest, deletions are
        // idempotent so a later run picks up whatever is left
        for name in names {
            self.store
                .delete(name)
                .map_err(|source| ClientError::DeleteFailed {
                    name: name.clone(),
                    source,
                })?;

            log::info!(target: "client", "deleted {name}");
        }

        Ok(())
    }
}
