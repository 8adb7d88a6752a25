//! Conversation key derivation using PBKDF2-HMAC-SHA256.
//!
//! Derives a 256-bit symmetric key from two low-entropy participant
//! identifiers plus the long-term secret. The salt is computed
//! deterministically from the canonicalized pair, so both sides reproduce
//! the identical key without any coordination.
//!
//! # Security
//!
//! - Canonicalization: the pair is ordered lexicographically before
//!   derivation, so `derive(a, b) == derive(b, a)`
//! - Pair isolation: different pairs produce different salts and therefore
//!   different keys
//! - Work factor: PBKDF2 iteration count is tunable (default 100 000) to
//!   resist offline brute force of the long-term secret
//! - Identifiers are length-prefixed before hashing, so `("a:b", "c")` and
//!   `("a", "b:c")` cannot collide

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::error::KeyDerivationError;
use crate::secret::MasterSecret;

/// Domain-separation label for the per-pair salt
const SALT_LABEL: &[u8] = b"parleyConversationSaltV1";

/// Default PBKDF2 iteration count.
///
/// Tens of milliseconds on current hardware: expensive enough to resist
/// offline brute force, cheap enough to stay off the interactive critical
/// path.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Tunable work factor for conversation key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationParams {
    iterations: u32,
}

impl DerivationParams {
    /// Create params with an explicit iteration count.
    ///
    /// Tests may pass a small count to keep derivation cheap; production
    /// callers should use [`Default`].
    ///
    /// # Errors
    ///
    /// - [`KeyDerivationError::ZeroIterations`] if `iterations` is zero
    pub fn new(iterations: u32) -> Result<Self, KeyDerivationError> {
        if iterations == 0 {
            return Err(KeyDerivationError::ZeroIterations);
        }
        Ok(Self { iterations })
    }

    /// Configured PBKDF2 iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for DerivationParams {
    fn default() -> Self {
        Self { iterations: DEFAULT_ITERATIONS }
    }
}

/// A 256-bit conversation-scoped symmetric key.
///
/// Exists only in process memory for the duration of a seal/open call.
/// Never persisted, logged, or transmitted; zeroized on drop.
pub struct ConversationKey {
    key: [u8; 32],
}

impl ConversationKey {
    /// 32-byte symmetric key for XChaCha20-Poly1305 AEAD.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConversationKey(..)")
    }
}

impl Drop for ConversationKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Order a participant pair lexicographically.
///
/// Both the derivation salt and the envelope AAD are built from the ordered
/// pair, which is what makes key derivation and replay rejection
/// order-independent.
pub(crate) fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Length-prefixed encoding of an ordered pair.
///
/// Capacity: 4 (len) + first + 4 (len) + second.
pub(crate) fn encode_ordered_pair(first: &str, second: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + first.len() + second.len());
    buf.extend_from_slice(&(first.len() as u32).to_be_bytes());
    buf.extend_from_slice(first.as_bytes());
    buf.extend_from_slice(&(second.len() as u32).to_be_bytes());
    buf.extend_from_slice(second.as_bytes());
    buf
}

/// Deterministic per-pair salt: SHA-256 over label plus the ordered pair.
///
/// The salt must be reproducible by both sides without coordination, so it
/// is never random or time-based.
fn conversation_salt(first: &str, second: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SALT_LABEL);
    hasher.update(encode_ordered_pair(first, second));
    hasher.finalize().into()
}

/// Derive the conversation key for a participant pair.
///
/// Pure function of its inputs: same secret, pair, and params always
/// produce the same key, in either argument order.
///
/// # Errors
///
/// - [`KeyDerivationError::EmptyIdentifier`] if either identifier is empty
pub fn derive_conversation_key(
    secret: &MasterSecret,
    participant_a: &str,
    participant_b: &str,
    params: &DerivationParams,
) -> Result<ConversationKey, KeyDerivationError> {
    if participant_a.is_empty() || participant_b.is_empty() {
        return Err(KeyDerivationError::EmptyIdentifier);
    }

    let (first, second) = canonical_pair(participant_a, participant_b);
    let salt = conversation_salt(first, second);

    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(secret.expose(), &salt, params.iterations(), &mut key);

    Ok(ConversationKey { key })
}
