//! Error types for conversation key derivation and envelope operations.
//!
//! Every failure here is either a caller bug, a configuration problem, or a
//! security violation. None of them are transient: retrying a deterministic
//! pure function changes nothing, so no error in this module should ever be
//! retried.

use thiserror::Error;

/// Errors from conversation key derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyDerivationError {
    /// A participant identifier was empty.
    #[error("participant identifier is empty")]
    EmptyIdentifier,

    /// The long-term secret was absent from configuration.
    ///
    /// Fatal to the process. The application must fail startup rather than
    /// fall back to a default secret.
    #[error("long-term secret not found in configuration source {config_source:?}")]
    MissingSecret {
        /// Configuration source that was consulted (e.g. environment
        /// variable name)
        config_source: String,
    },

    /// The long-term secret was present but empty.
    #[error("long-term secret is empty")]
    EmptySecret,

    /// The PBKDF2 iteration count was zero.
    #[error("derivation iteration count must be nonzero")]
    ZeroIterations,
}

/// Errors from sealing or opening envelopes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Empty plaintext or missing participant identifier. Caller bug.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What the caller got wrong
        reason: &'static str,
    },

    /// Key derivation failed (see [`KeyDerivationError`]).
    #[error("key derivation failed: {0}")]
    KeyDerivation(#[from] KeyDerivationError),

    /// The blob is not a parseable envelope. Treat as corrupt data; no
    /// partial recovery is attempted.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Decoder diagnostic
        reason: String,
    },

    /// The envelope was produced by a protocol revision this codec does not
    /// understand. Decryption was not attempted. The caller should prompt
    /// for an update rather than discard the message.
    #[error("unsupported envelope version {version} (supported: {supported})")]
    UnsupportedVersion {
        /// Version tag found in the envelope
        version: u8,
        /// Version this codec supports
        supported: u8,
    },

    /// The envelope's associated data does not match the given participant
    /// pair. Wrong conversation, substituted identifier, or tampered
    /// context.
    #[error("associated data does not match participant pair")]
    AuthenticationMismatch,

    /// AEAD tag verification failed: ciphertext, nonce, or tag was
    /// tampered with, or the key is wrong. No plaintext was produced.
    #[error("authentication tag verification failed")]
    TagVerificationFailed,
}

impl EnvelopeError {
    /// Returns true if this error indicates tampering or a wrong-key
    /// attempt.
    ///
    /// Security events must be logged and the message treated as
    /// unrecoverable. The UI should render a generic "message could not be
    /// decrypted" for these rather than the error detail, to avoid acting
    /// as a decryption oracle.
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::AuthenticationMismatch | Self::TagVerificationFailed)
    }
}
