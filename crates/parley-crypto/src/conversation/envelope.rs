//! Envelope wire format.
//!
//! A sealed message travels and rests as a CBOR-encoded [`Envelope`].
//! Downstream persistence and transport treat the encoding as an opaque
//! blob; only this module knows its shape.
//!
//! Layout (CBOR map, named fields):
//!
//! ```text
//! version    u8        protocol revision, bound into the AAD
//! nonce      [u8; 24]  XChaCha20 nonce, unique per message
//! ciphertext bytes     AEAD output without the tag
//! auth_tag   [u8; 16]  Poly1305 tag binding ciphertext + AAD
//! aad        bytes     ordered participant pair + version, in clear
//! created_at u64       epoch milliseconds, advisory only
//! ```
//!
//! `created_at` is deliberately NOT part of the authenticated data: clock
//! skew between sender and receiver must never make a valid message fail
//! verification.

use serde::{Deserialize, Serialize};

use super::error::EnvelopeError;

/// Protocol revision produced by this codec.
pub const ENVELOPE_VERSION: u8 = 1;

/// XChaCha20 nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// One sealed message.
///
/// Immutable once sealed: created by [`EnvelopeCodec::seal`], stored and
/// transported as an opaque blob, consumed by [`EnvelopeCodec::open`].
/// There is no in-between state; opening is all-or-nothing.
///
/// [`EnvelopeCodec::seal`]: super::EnvelopeCodec::seal
/// [`EnvelopeCodec::open`]: super::EnvelopeCodec::open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol revision that produced this envelope
    pub version: u8,
    /// Per-message XChaCha20 nonce
    pub nonce: [u8; NONCE_SIZE],
    /// Encrypted message bytes (tag held separately)
    pub ciphertext: Vec<u8>,
    /// Poly1305 authentication tag
    pub auth_tag: [u8; TAG_SIZE],
    /// Associated data: ordered participant pair + version, not encrypted
    pub aad: Vec<u8>,
    /// Advisory creation timestamp (epoch milliseconds), not authenticated
    pub created_at: u64,
}

impl Envelope {
    /// Encode to the CBOR wire representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.ciphertext.len() + self.aad.len());
        let Ok(()) = ciborium::ser::into_writer(self, &mut buf) else {
            unreachable!("CBOR encoding of an envelope into a Vec cannot fail");
        };
        buf
    }

    /// Decode from the CBOR wire representation.
    ///
    /// Structural parsing only; no version gating or authentication happens
    /// here. Never panics on arbitrary input.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MalformedEnvelope`] if `bytes` is not a valid
    ///   envelope encoding
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        ciborium::de::from_reader(bytes)
            .map_err(|err| EnvelopeError::MalformedEnvelope { reason: err.to_string() })
    }
}

/// Structural ownership check: was this blob produced by a parley codec?
///
/// Inspects only the non-secret envelope shape (version tag plus required
/// field presence). Returns true for any structurally valid envelope, even
/// one with a version this codec cannot open, so legacy and future formats
/// can coexist in the same message store without triggering decryption
/// attempts. Never derives keys, never touches ciphertext.
pub fn detect_ownership(bytes: &[u8]) -> bool {
    Envelope::decode(bytes).is_ok()
}
