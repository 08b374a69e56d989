//! Generation and parsing of backup object names.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use derive_more::{Display, Error};

/// Extension carried by every backup object.
pub const BASE_EXTENSION: &str = "backup";

/// Suffix appended to a name once encryption finished successfully.
///
/// Its presence is the sole signal that a backup needs decryption on restore.
pub const ENCRYPTED_SUFFIX: &str = ".age";

/// Structural delimiters of a backup name: `<prefix>_<timestamp>.<ext>`.
const DELIMITERS: [char; 2] = ['_', '.'];

/// Errors of the backup naming scheme.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum NameError {
    /// Prefix contains one of the structural delimiters.
    #[display("prefix must not contain '_' or '.'")]
    InvalidPrefix,

    /// Object name does not follow the `<prefix>_<RFC3339>.<ext>` scheme.
    #[display("invalid backup name: {_0}")]
    InvalidName(#[error(ignore)] String),
}

/// Generates a fresh backup name: `<prefix>_<RFC3339(now)>.backup`.
pub fn generate(prefix: &str, now: DateTime<Local>) -> Result<String, NameError> {
    if prefix.contains(DELIMITERS) {
        return Err(NameError::InvalidPrefix);
    }

    let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, false);
    Ok(format!("{prefix}_{timestamp}.{BASE_EXTENSION}"))
}

/// Extracts the timestamp of a backup name.
///
/// Splits on the delimiters and parses the second field as RFC 3339, so any
/// number of trailing extension fields is tolerated.
pub fn parse_timestamp(name: &str) -> Result<DateTime<FixedOffset>, NameError> {
    let fields: Vec<&str> = name.split(DELIMITERS).collect();
    if fields.len() < 3 {
        return Err(NameError::InvalidName(name.to_string()));
    }

    DateTime::parse_from_rfc3339(fields[1]).map_err(|_| NameError::InvalidName(name.to_string()))
}

/// Marks a name as encrypted.
///
/// Only called after the encryption trailer was written, never speculatively.
pub fn with_encrypted_suffix(name: &str) -> String {
    format!("{name}{ENCRYPTED_SUFFIX}")
}

/// Returns whether the named backup is stored as ciphertext.
pub fn is_encrypted(name: &str) -> bool {
    name.ends_with(ENCRYPTED_SUFFIX)
}

/// Removes the encryption marker, yielding the underlying plaintext name.
pub fn strip_encrypted_suffix(name: &str) -> &str {
    name.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn generate_uses_prefix_and_extension() {
        let name = generate("pgbackup", Local::now()).unwrap();

        assert!(name.starts_with("pgbackup_"));
        assert!(name.ends_with(".backup"));
    }

    #[test]
    fn generate_rejects_delimiters_in_prefix() {
        assert_eq!(
            generate("foo_bar", Local::now()),
            Err(NameError::InvalidPrefix)
        );
        assert_eq!(
            generate("foo.bar", Local::now()),
            Err(NameError::InvalidPrefix)
        );
    }

    #[test]
    fn parse_round_trips_generated_names() {
        let now = Local::now().with_nanosecond(0).unwrap();
        let name = generate("nightly", now).unwrap();

        assert_eq!(parse_timestamp(&name).unwrap(), now);
    }

    #[test]
    fn parse_tolerates_encryption_suffix() {
        let name = "pgbackup_2021-09-23T14:41:17-05:00.backup.age";
        let want = DateTime::parse_from_rfc3339("2021-09-23T14:41:17-05:00").unwrap();

        assert_eq!(parse_timestamp(name).unwrap(), want);
    }

    #[test]
    fn parse_rejects_too_few_fields() {
        assert!(parse_timestamp("foobarinvalid.backup").is_err());
    }

    #[test]
    fn parse_rejects_non_rfc3339_timestamp() {
        assert!(parse_timestamp("foobar_07131994.backup").is_err());
    }

    #[test]
    fn encrypted_suffix_round_trip() {
        let name = "nightly_2021-09-23T14:41:17-05:00.backup";
        let encrypted = with_encrypted_suffix(name);

        assert!(is_encrypted(&encrypted));
        assert!(!is_encrypted(name));
        assert_eq!(strip_encrypted_suffix(&encrypted), name);
        assert_eq!(strip_encrypted_suffix(name), name);
    }
}
