//! Sealing and opening conversation envelopes.
//!
//! [`EnvelopeCodec`] owns the injected long-term secret and derivation
//! params; everything else is per-call. It is stateless beyond that
//! read-only configuration, so a single codec can serve any number of
//! concurrent seal/open calls without locking.
//!
//! # Security
//!
//! Gate order in [`open`](EnvelopeCodec::open) is load-bearing:
//!
//! 1. Version check (unknown revision -> no cipher work at all)
//! 2. AAD recomputation and comparison (cross-conversation replay and
//!    identifier substitution fail closed here, before the ciphertext is
//!    touched)
//! 3. Key derivation
//! 4. AEAD decrypt-and-verify (tag verification is atomic with decryption;
//!    plaintext cannot exist unless the tag checks out)
//!
//! Authentication failures are logged as security events. Key material and
//! plaintext never appear in log output.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};

use super::{
    derivation::{DerivationParams, canonical_pair, derive_conversation_key, encode_ordered_pair},
    envelope::{ENVELOPE_VERSION, Envelope, TAG_SIZE},
    error::EnvelopeError,
};
use crate::secret::MasterSecret;

/// Domain-separation label for envelope associated data
const AAD_LABEL: &[u8] = b"parleyEnvelopeAadV1";

/// Authenticated encryption codec for two-party conversation messages.
///
/// Construct once at startup with the configured [`MasterSecret`] and share
/// freely; all methods take `&self`.
#[derive(Clone)]
pub struct EnvelopeCodec {
    secret: MasterSecret,
    params: DerivationParams,
}

impl EnvelopeCodec {
    /// Create a codec with explicit derivation params.
    pub fn new(secret: MasterSecret, params: DerivationParams) -> Self {
        Self { secret, params }
    }

    /// Create a codec with the default (production) work factor.
    pub fn with_default_params(secret: MasterSecret) -> Self {
        Self::new(secret, DerivationParams::default())
    }

    /// Seal a plaintext message for the given participant pair.
    ///
    /// Every call draws a fresh random nonce from the OS CSPRNG, so sealing
    /// the same plaintext twice produces two unrelated envelopes. This is
    /// required: repeated short messages ("ok") must not leak their
    /// repetition through the ciphertext.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::InvalidInput`] on empty plaintext or identifiers
    /// - [`EnvelopeError::KeyDerivation`] propagated from derivation
    pub fn seal(
        &self,
        plaintext: &[u8],
        participant_a: &str,
        participant_b: &str,
    ) -> Result<Envelope, EnvelopeError> {
        if plaintext.is_empty() {
            return Err(EnvelopeError::InvalidInput { reason: "plaintext is empty" });
        }
        if participant_a.is_empty() || participant_b.is_empty() {
            return Err(EnvelopeError::InvalidInput { reason: "participant identifier is empty" });
        }

        let key =
            derive_conversation_key(&self.secret, participant_a, participant_b, &self.params)?;
        let aad = build_aad(ENVELOPE_VERSION, participant_a, participant_b);

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        let Ok(mut sealed) = cipher.encrypt(&nonce, Payload { msg: plaintext, aad: &aad }) else {
            unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
        };

        // The aead API appends the 16-byte tag; the envelope carries it as
        // its own field.
        let tag_start = sealed.len() - TAG_SIZE;
        let mut auth_tag = [0u8; TAG_SIZE];
        auth_tag.copy_from_slice(&sealed[tag_start..]);
        sealed.truncate(tag_start);

        Ok(Envelope {
            version: ENVELOPE_VERSION,
            nonce: nonce.into(),
            ciphertext: sealed,
            auth_tag,
            aad,
            created_at: epoch_millis_now(),
        })
    }

    /// Open a sealed envelope back into plaintext.
    ///
    /// All-or-nothing: either the full plaintext comes back, or a typed
    /// error and no plaintext bytes at all.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::InvalidInput`] on empty identifiers
    /// - [`EnvelopeError::UnsupportedVersion`] before any cipher work
    /// - [`EnvelopeError::AuthenticationMismatch`] if the AAD does not match
    ///   the participant pair (wrong conversation or tampered context)
    /// - [`EnvelopeError::TagVerificationFailed`] if nonce, ciphertext, or
    ///   tag was tampered with
    /// - [`EnvelopeError::KeyDerivation`] propagated from derivation
    pub fn open(
        &self,
        envelope: &Envelope,
        participant_a: &str,
        participant_b: &str,
    ) -> Result<Vec<u8>, EnvelopeError> {
        if participant_a.is_empty() || participant_b.is_empty() {
            return Err(EnvelopeError::InvalidInput { reason: "participant identifier is empty" });
        }

        if envelope.version != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion {
                version: envelope.version,
                supported: ENVELOPE_VERSION,
            });
        }

        let expected_aad = build_aad(envelope.version, participant_a, participant_b);
        if envelope.aad != expected_aad {
            tracing::warn!(
                participant_a,
                participant_b,
                "envelope associated data mismatch: wrong conversation or tampered context"
            );
            return Err(EnvelopeError::AuthenticationMismatch);
        }

        let key =
            derive_conversation_key(&self.secret, participant_a, participant_b, &self.params)?;
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        // Rejoin ciphertext || tag so the aead primitive verifies the tag
        // as part of decryption.
        let mut sealed = Vec::with_capacity(envelope.ciphertext.len() + TAG_SIZE);
        sealed.extend_from_slice(&envelope.ciphertext);
        sealed.extend_from_slice(&envelope.auth_tag);

        let nonce = XNonce::from_slice(&envelope.nonce);
        cipher.decrypt(nonce, Payload { msg: &sealed, aad: &envelope.aad }).map_err(|_| {
            tracing::warn!(
                participant_a,
                participant_b,
                "envelope tag verification failed: tampered message or wrong key"
            );
            EnvelopeError::TagVerificationFailed
        })
    }

    /// Decode a raw blob and open it in one step.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MalformedEnvelope`] if the blob does not parse,
    ///   plus every failure [`open`](Self::open) can return
    pub fn open_bytes(
        &self,
        bytes: &[u8],
        participant_a: &str,
        participant_b: &str,
    ) -> Result<Vec<u8>, EnvelopeError> {
        let envelope = Envelope::decode(bytes)?;
        self.open(&envelope, participant_a, participant_b)
    }

    /// Integrity check without needing the plaintext.
    ///
    /// Any failure collapses to `false`.
    pub fn verify(&self, envelope: &Envelope, participant_a: &str, participant_b: &str) -> bool {
        self.open(envelope, participant_a, participant_b).is_ok()
    }
}

/// Associated data for one envelope: label, version, ordered pair.
///
/// The version byte lives inside the AAD, so a version downgrade also fails
/// tag verification even if the gate in `open` were bypassed.
fn build_aad(version: u8, participant_a: &str, participant_b: &str) -> Vec<u8> {
    let (first, second) = canonical_pair(participant_a, participant_b);
    let pair = encode_ordered_pair(first, second);

    let mut aad = Vec::with_capacity(AAD_LABEL.len() + 1 + pair.len());
    aad.extend_from_slice(AAD_LABEL);
    aad.push(version);
    aad.extend_from_slice(&pair);
    aad
}

/// Advisory wall-clock timestamp. Clocks before the epoch report zero.
fn epoch_millis_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::envelope::NONCE_SIZE;

    fn test_codec() -> EnvelopeCodec {
        let secret = MasterSecret::new(b"test-master-secret".to_vec()).unwrap();
        EnvelopeCodec::new(secret, DerivationParams::new(8).unwrap())
    }

    #[test]
    fn seal_open_roundtrip() {
        let codec = test_codec();

        let envelope = codec.seal(b"Hello!", "u1", "u2").unwrap();
        let plaintext = codec.open(&envelope, "u1", "u2").unwrap();

        assert_eq!(plaintext, b"Hello!");
    }

    #[test]
    fn open_is_order_independent() {
        let codec = test_codec();

        let envelope = codec.seal(b"Hello!", "u1", "u2").unwrap();
        let plaintext = codec.open(&envelope, "u2", "u1").unwrap();

        assert_eq!(plaintext, b"Hello!");
    }

    #[test]
    fn repeated_seal_produces_distinct_envelopes() {
        let codec = test_codec();

        let first = codec.seal(b"ok", "u1", "u2").unwrap();
        let second = codec.seal(b"ok", "u1", "u2").unwrap();

        assert_ne!(first.nonce, second.nonce, "nonces must never repeat");
        assert_ne!(first.ciphertext, second.ciphertext, "ciphertexts must differ");
    }

    #[test]
    fn envelope_metadata_is_populated() {
        let codec = test_codec();
        let envelope = codec.seal(b"Hello!", "u1", "u2").unwrap();

        assert_eq!(envelope.version, ENVELOPE_VERSION);
        assert_eq!(envelope.nonce.len(), NONCE_SIZE);
        assert_eq!(envelope.ciphertext.len(), b"Hello!".len());
        assert!(envelope.created_at > 0);
    }

    #[test]
    fn empty_plaintext_is_rejected() {
        let codec = test_codec();
        let result = codec.seal(b"", "u1", "u2");
        assert_eq!(result.unwrap_err(), EnvelopeError::InvalidInput { reason: "plaintext is empty" });
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        let codec = test_codec();

        assert!(matches!(
            codec.seal(b"hi", "", "u2"),
            Err(EnvelopeError::InvalidInput { .. })
        ));

        let envelope = codec.seal(b"hi", "u1", "u2").unwrap();
        assert!(matches!(
            codec.open(&envelope, "u1", ""),
            Err(EnvelopeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn attacker_substitution_is_rejected() {
        let codec = test_codec();

        let envelope = codec.seal(b"for u2 only", "u1", "u2").unwrap();
        let result = codec.open(&envelope, "u1", "attacker");

        assert_eq!(result.unwrap_err(), EnvelopeError::AuthenticationMismatch);
    }

    #[test]
    fn unsupported_version_is_gated_before_decryption() {
        let codec = test_codec();

        let mut envelope = codec.seal(b"Hello!", "u1", "u2").unwrap();
        envelope.version = ENVELOPE_VERSION + 1;

        let result = codec.open(&envelope, "u1", "u2");
        assert_eq!(
            result.unwrap_err(),
            EnvelopeError::UnsupportedVersion {
                version: ENVELOPE_VERSION + 1,
                supported: ENVELOPE_VERSION
            }
        );
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let codec = test_codec();

        let mut envelope = codec.seal(b"original message", "u1", "u2").unwrap();
        envelope.ciphertext[0] ^= 0xFF;

        let result = codec.open(&envelope, "u1", "u2");
        assert_eq!(result.unwrap_err(), EnvelopeError::TagVerificationFailed);
    }

    #[test]
    fn tampered_nonce_fails() {
        let codec = test_codec();

        let mut envelope = codec.seal(b"original message", "u1", "u2").unwrap();
        envelope.nonce[0] ^= 0x01;

        let result = codec.open(&envelope, "u1", "u2");
        assert_eq!(result.unwrap_err(), EnvelopeError::TagVerificationFailed);
    }

    #[test]
    fn tampered_tag_fails() {
        let codec = test_codec();

        let mut envelope = codec.seal(b"original message", "u1", "u2").unwrap();
        envelope.auth_tag[15] ^= 0x80;

        let result = codec.open(&envelope, "u1", "u2");
        assert_eq!(result.unwrap_err(), EnvelopeError::TagVerificationFailed);
    }

    #[test]
    fn tampered_aad_fails() {
        let codec = test_codec();

        let mut envelope = codec.seal(b"original message", "u1", "u2").unwrap();
        let last = envelope.aad.len() - 1;
        envelope.aad[last] ^= 0x01;

        let result = codec.open(&envelope, "u1", "u2");
        assert_eq!(result.unwrap_err(), EnvelopeError::AuthenticationMismatch);
    }

    #[test]
    fn timestamp_is_advisory_only() {
        // Clock skew must never make a valid message fail verification.
        let codec = test_codec();

        let mut envelope = codec.seal(b"Hello!", "u1", "u2").unwrap();
        envelope.created_at = envelope.created_at.wrapping_add(86_400_000);

        assert_eq!(codec.open(&envelope, "u1", "u2").unwrap(), b"Hello!");
    }

    #[test]
    fn verify_reports_integrity() {
        let codec = test_codec();
        let envelope = codec.seal(b"Hello!", "u1", "u2").unwrap();

        assert!(codec.verify(&envelope, "u1", "u2"));
        assert!(!codec.verify(&envelope, "u1", "u3"));

        let mut tampered = envelope.clone();
        tampered.ciphertext[0] ^= 0x01;
        assert!(!codec.verify(&tampered, "u1", "u2"));
    }

    #[test]
    fn open_bytes_rejects_malformed_blob() {
        let codec = test_codec();
        let result = codec.open_bytes(b"not an envelope", "u1", "u2");
        assert!(matches!(result, Err(EnvelopeError::MalformedEnvelope { .. })));
    }

    #[test]
    fn open_bytes_roundtrips_wire_encoding() {
        let codec = test_codec();

        let blob = codec.seal(b"Hello!", "u1", "u2").unwrap().encode();
        let plaintext = codec.open_bytes(&blob, "u1", "u2").unwrap();

        assert_eq!(plaintext, b"Hello!");
    }

    #[test]
    fn unicode_payload_roundtrips() {
        let codec = test_codec();
        let message = "héllo 世界 🦀 — многоязычный текст".as_bytes();

        let envelope = codec.seal(message, "u1", "u2").unwrap();
        assert_eq!(codec.open(&envelope, "u1", "u2").unwrap(), message);
    }

    #[test]
    fn multi_kilobyte_payload_roundtrips() {
        let codec = test_codec();
        let message = vec![0x42u8; 8 * 1024];

        let envelope = codec.seal(&message, "u1", "u2").unwrap();
        assert_eq!(codec.open(&envelope, "u1", "u2").unwrap(), message);
    }

    #[test]
    fn different_secrets_cannot_open_each_other() {
        let codec_a = EnvelopeCodec::new(
            MasterSecret::new(b"secret-a".to_vec()).unwrap(),
            DerivationParams::new(8).unwrap(),
        );
        let codec_b = EnvelopeCodec::new(
            MasterSecret::new(b"secret-b".to_vec()).unwrap(),
            DerivationParams::new(8).unwrap(),
        );

        let envelope = codec_a.seal(b"Hello!", "u1", "u2").unwrap();
        let result = codec_b.open(&envelope, "u1", "u2");

        assert_eq!(result.unwrap_err(), EnvelopeError::TagVerificationFailed);
    }
}
