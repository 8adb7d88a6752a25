//! Fuzz target for EnvelopeCodec::open_bytes
//!
//! Feeds arbitrary blobs into the full open path (decode, version gate,
//! AAD comparison, AEAD decrypt). The codec must never panic, and no
//! arbitrary blob may ever yield plaintext: forging a valid envelope
//! requires a valid Poly1305 tag under the derived key.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_crypto::{DerivationParams, EnvelopeCodec, MasterSecret};

fuzz_target!(|data: &[u8]| {
    let secret = MasterSecret::new(b"fuzz-master-secret".to_vec()).expect("non-empty secret");
    let codec = EnvelopeCodec::new(secret, DerivationParams::new(4).expect("nonzero iterations"));

    let result = codec.open_bytes(data, "u1", "u2");
    assert!(result.is_err(), "arbitrary bytes must never open into plaintext");
});
