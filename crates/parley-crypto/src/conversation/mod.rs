//! Two-party conversation envelopes.
//!
//! A conversation is identified by an unordered pair of participant IDs.
//! [`derive_conversation_key`] turns that pair plus the long-term secret into
//! a 256-bit symmetric key, and [`EnvelopeCodec`] uses the key to seal
//! plaintext messages into versioned, self-describing [`Envelope`]s (and to
//! open them again).
//!
//! The envelope is the only artifact that leaves this module. Storage and
//! transport treat it as an opaque blob; [`detect_ownership`] lets a message
//! store decide whether a blob is one of ours without attempting decryption.
//!
//! # Security
//!
//! Key derivation canonicalizes the participant pair (lexicographic order),
//! so both sides compute the same key regardless of argument order. The
//! ordered pair is also bound into the AEAD associated data, which is what
//! makes cross-conversation replay fail before any cipher work happens.

pub mod codec;
pub mod derivation;
pub mod envelope;
pub mod error;

pub use codec::EnvelopeCodec;
pub use derivation::{ConversationKey, DerivationParams, derive_conversation_key};
pub use envelope::{Envelope, detect_ownership};
pub use error::{EnvelopeError, KeyDerivationError};
