//! Parley Conversation Encryption
//!
//! Authenticated message encryption for two-party conversations. Pure
//! CPU-bound functions over an injected long-term secret; no I/O, no global
//! state, safe to call concurrently from any number of tasks.
//!
//! # Key Lifecycle
//!
//! Each conversation between two participants gets its own symmetric key,
//! derived on demand from the process-wide long-term secret. The key exists
//! only for the duration of a single seal/open call and is zeroized when
//! dropped. It is never persisted, logged, or transmitted.
//!
//! ```text
//! Long-Term Secret (configuration)
//!        │
//!        ▼
//! PBKDF2 (deterministic per-pair salt) → Conversation Key
//!        │
//!        ▼
//! XChaCha20-Poly1305 AEAD → Envelope
//! ```
//!
//! Both participants (or a trusted server) derive the identical key from the
//! same inputs, so no key material ever crosses the wire.
//!
//! # Security
//!
//! Confidentiality and Authenticity:
//! - XChaCha20-Poly1305 AEAD: tag verification is inseparable from
//!   decryption, so tampered ciphertext can never yield plaintext
//! - Fresh random 24-byte nonce per seal -> identical plaintexts produce
//!   unrelated ciphertexts
//!
//! Conversation Binding:
//! - Associated data commits the envelope to the ordered participant pair
//!   and protocol version
//! - Replaying an envelope into a different conversation fails closed
//!   before any cipher operation runs
//!
//! Key Hygiene:
//! - Conversation keys and the long-term secret are zeroized on drop
//! - The long-term secret comes from runtime configuration, never from a
//!   source literal, and startup fails hard when it is absent

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod conversation;
pub mod secret;

pub use conversation::{
    ConversationKey, DerivationParams, Envelope, EnvelopeCodec, EnvelopeError, KeyDerivationError,
    derive_conversation_key, detect_ownership,
};
pub use secret::MasterSecret;
