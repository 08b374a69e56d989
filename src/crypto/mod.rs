//! Encryption pipeline wrapping backups for [age] x25519 recipients.
//!
//! Pure data transforms over readers and writers; nothing here touches the
//! object store or the filesystem.
//!
//! [age]: https://age-encryption.org/

use std::io::{self, Read, Write};
use std::iter;

use age::stream::StreamWriter;
use age::x25519::{Identity, Recipient};
use derive_more::{Display, Error, From};

/// Errors of the encryption pipeline.
#[derive(Debug, Display, Error, From)]
pub enum CryptoError {
    /// A configured public key is not a valid age recipient.
    #[display("invalid recipient public key: {_0}")]
    InvalidRecipient(#[error(ignore)] String),

    /// The entered private key is not a valid age identity.
    #[display("invalid identity private key: {_0}")]
    InvalidIdentity(#[error(ignore)] String),

    /// Ciphertext does not decrypt under the given identity.
    #[display("decryption failed (wrong key or corrupted backup): {_0}")]
    DecryptionFailed(#[error(ignore)] String),

    #[from]
    Io(io::Error),
}

impl From<age::EncryptError> for CryptoError {
    fn from(e: age::EncryptError) -> Self {
        match e {
            age::EncryptError::Io(e) => CryptoError::Io(e),
            other => CryptoError::Io(io::Error::other(other.to_string())),
        }
    }
}

/// Parses a single recipient public key.
pub fn parse_recipient(key: &str) -> Result<Recipient, CryptoError> {
    key.trim()
        .parse::<Recipient>()
        .map_err(|e| CryptoError::InvalidRecipient(e.to_string()))
}

/// Parses all configured recipient public keys, failing on the first bad one.
pub fn parse_recipients(keys: &[String]) -> Result<Vec<Recipient>, CryptoError> {
    keys.iter().map(|key| parse_recipient(key)).collect()
}

/// Parses a private key entered at restore time.
pub fn parse_identity(key: &str) -> Result<Identity, CryptoError> {
    key.trim()
        .parse::<Identity>()
        .map_err(|e| CryptoError::InvalidIdentity(e.to_string()))
}

/// Streaming encryptor writing into a sink.
///
/// The output is only valid ciphertext once [`finish`](Sealer::finish)
/// returned; consumers must not touch the sink before that.
pub struct Sealer<W: Write> {
    inner: StreamWriter<W>,
}

impl<W: Write> Sealer<W> {
    /// Starts an encryption stream for `recipients`.
    ///
    /// Any one matching identity can later decrypt the stream.
    pub fn new(sink: W, recipients: &[Recipient]) -> Result<Self, CryptoError> {
        assert!(
            !recipients.is_empty(),
            "encryption needs at least one recipient"
        );

        let recipients: Vec<Box<dyn age::Recipient + Send>> = recipients
            .iter()
            .map(|r| Box::new(r.clone()) as Box<dyn age::Recipient + Send>)
            .collect();

        let encryptor =
            age::Encryptor::with_recipients(recipients).expect("recipient list is not empty");

        let inner = encryptor.wrap_output(sink)?;
        Ok(Self { inner })
    }

    /// Writes the age trailer and hands the sink back.
    pub fn finish(self) -> Result<W, CryptoError> {
        Ok(self.inner.finish()?)
    }
}

impl<W: Write> Write for Sealer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Encrypts everything from `src` into `dst` in one pass, trailer included.
pub fn encrypt(
    src: &mut impl Read,
    dst: impl Write,
    recipients: &[Recipient],
) -> Result<(), CryptoError> {
    let mut sealer = Sealer::new(dst, recipients)?;
    io::copy(src, &mut sealer)?;
    sealer.finish()?;

    Ok(())
}

/// Decrypts everything from `src` into `dst` using `identity`.
///
/// A wrong key or tampered ciphertext surfaces as
/// [`CryptoError::DecryptionFailed`], never as a generic I/O error.
pub fn decrypt(
    src: impl Read,
    dst: &mut impl Write,
    identity: &Identity,
) -> Result<u64, CryptoError> {
    let decryptor = match age::Decryptor::new(src) {
        Ok(age::Decryptor::Recipients(d)) => d,
        Ok(age::Decryptor::Passphrase(_)) => {
            return Err(CryptoError::DecryptionFailed(
                "backup is passphrase-encrypted, not recipient-encrypted".to_string(),
            ))
        }
        Err(e) => return Err(CryptoError::DecryptionFailed(e.to_string())),
    };

    let mut reader = decryptor
        .decrypt(iter::once(identity as &dyn age::Identity))
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    // age authenticates each chunk during the copy, so corruption of the
    // payload shows up here rather than at header parse time
    io::copy(&mut reader, dst).map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
