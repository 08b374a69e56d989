//! Dump and restore through the PostgreSQL client tools.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use derive_more::{Display, Error, From};

/// Errors of the dump/restore subprocesses.
#[derive(Debug, Display, Error, From)]
pub enum DatabaseError {
    /// Subprocess exited non-zero; `diagnostics` carries its captured stderr.
    #[display("{command} failed: {diagnostics}")]
    CommandFailed {
        command: &'static str,
        diagnostics: String,
    },

    #[from]
    Io(io::Error),
}

/// Turns a database connection into a byte stream and back.
pub trait Database {
    /// Streams a full dump of the database into `out`.
    fn dump(&self, out: &mut dyn Write) -> Result<(), DatabaseError>;

    /// Replays a dump from `input`, optionally restricted to `schemas`.
    fn restore(&self, input: &mut dyn Read, schemas: &[String]) -> Result<(), DatabaseError>;
}

/// [Database] implementation shelling out to `pg_dump` and `pg_restore`.
#[derive(Debug, Clone)]
pub struct Postgres {
    url: String,
}

impl Postgres {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl Database for Postgres {
    fn dump(&self, out: &mut dyn Write) -> Result<(), DatabaseError> {
        log::debug!(target: "postgres", "Starting pg_dump");
        let mut command = Command::new("pg_dump");
        command
            .arg("-Fc") // custom format: compressed, restorable in any order
            .arg(&self.url);

        execute(command, "pg_dump", None, Some(out))?;

        log::debug!(target: "postgres", "Finished pg_dump");
        Ok(())
    }

    fn restore(&self, input: &mut dyn Read, schemas: &[String]) -> Result<(), DatabaseError> {
        log::debug!(target: "postgres", "Starting pg_restore");
        let mut command = Command::new("pg_restore");
        command
            .arg("-c") // drop objects before recreating them
            .arg("-d")
            .arg(&self.url);
        for schema in schemas {
            command.arg("-n").arg(schema);
        }

        execute(command, "pg_restore", Some(input), None)?;

        log::debug!(target: "postgres", "Finished pg_restore");
        Ok(())
    }
}

/// Runs `command`, feeding `input` into its stdin and copying its stdout into
/// `output`.
///
/// Stderr is drained on its own thread for the whole run. The pg tools emit
/// one diagnostic line per object (`pg_restore -c` on a fresh database does so
/// for every drop), and a full stderr pipe would stall the child and with it
/// the stdin/stdout copy on this thread.
fn execute(
    mut command: Command,
    name: &'static str,
    input: Option<&mut dyn Read>,
    output: Option<&mut dyn Write>,
) -> Result<String, DatabaseError> {
    command.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    command.stdout(if output.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    command.stderr(Stdio::piped());

    let mut child = command.spawn()?;

    let stderr = child.stderr.take().expect("stderr is piped");
    let drain = thread::spawn(move || read_lossy(stderr));

    if let Some(input) = input {
        let mut stdin = child.stdin.take().expect("stdin is piped");
        io::copy(input, &mut stdin)?;
        // close the pipe so the child sees EOF
        drop(stdin);
    }

    if let Some(output) = output {
        let mut stdout = child.stdout.take().expect("stdout is piped");
        io::copy(&mut stdout, output)?;
    }

    let diagnostics = drain.join().expect("no panic draining stderr")?;

    let status = child.wait()?;
    if !status.success() {
        return Err(DatabaseError::CommandFailed {
            command: name,
            diagnostics,
        });
    }

    if !diagnostics.is_empty() {
        log::warn!(target: "postgres", "{diagnostics}");
    }

    Ok(diagnostics)
}

fn read_lossy(mut source: impl Read) -> Result<String, DatabaseError> {
    let mut raw = Vec::new();
    source.read_to_end(&mut raw)?;

    Ok(String::from_utf8_lossy(&raw).trim_end().to_string())
}
