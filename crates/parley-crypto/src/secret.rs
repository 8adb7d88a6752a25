//! Long-term secret configuration.
//!
//! The master secret is the single piece of process-wide state the codec
//! depends on. It is injected explicitly at construction time (no module
//! globals), so tests can substitute their own secret without touching the
//! environment the rest of the process sees.
//!
//! # Security
//!
//! - The secret must come from runtime configuration (environment, secret
//!   store), never from a literal in source
//! - Absent or empty configuration is a startup failure, not a fallback
//! - The secret is zeroized on drop and redacted from `Debug` output

use zeroize::Zeroize;

use crate::conversation::error::KeyDerivationError;

/// Process-wide long-term secret for conversation key derivation.
///
/// Read-only after construction. Holding it behind an `Arc` (or cloning the
/// codec that owns it) is safe for concurrent use; derivation never mutates
/// it.
#[derive(Clone)]
pub struct MasterSecret {
    bytes: Vec<u8>,
}

impl MasterSecret {
    /// Wrap raw secret bytes from a configuration source.
    ///
    /// # Errors
    ///
    /// - [`KeyDerivationError::EmptySecret`] if the secret is empty
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyDerivationError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(KeyDerivationError::EmptySecret);
        }
        Ok(Self { bytes })
    }

    /// Read the secret from an environment variable.
    ///
    /// Intended for application startup; the application must abort if this
    /// fails rather than proceed with a default.
    ///
    /// # Errors
    ///
    /// - [`KeyDerivationError::MissingSecret`] if the variable is unset or
    ///   not valid Unicode
    /// - [`KeyDerivationError::EmptySecret`] if the variable is set but
    ///   empty
    pub fn from_env(var: &str) -> Result<Self, KeyDerivationError> {
        let value = std::env::var(var)
            .map_err(|_| KeyDerivationError::MissingSecret { config_source: var.to_string() })?;
        Self::new(value.into_bytes())
    }

    /// Raw secret bytes, for key derivation only.
    pub(crate) fn expose(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSecret(..)")
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
