//! Fuzz target for Envelope::decode and detect_ownership
//!
//! This fuzzer tests envelope deserialization (CBOR decoding) with:
//! - Malformed CBOR data
//! - Truncated or oversized field values
//! - Type confusion (wrong CBOR types for envelope fields)
//!
//! The fuzzer should NEVER panic. All invalid inputs must return
//! MalformedEnvelope, and detect_ownership must be total.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_crypto::{Envelope, detect_ownership};

fuzz_target!(|data: &[u8]| {
    let owned = detect_ownership(data);

    match Envelope::decode(data) {
        Ok(envelope) => {
            // Structural validity and ownership must agree
            assert!(owned);

            // Anything that decodes must re-encode and decode to itself
            let reencoded = envelope.encode();
            let redecoded = Envelope::decode(&reencoded).expect("re-decode of valid envelope");
            assert_eq!(redecoded, envelope);
        },
        Err(_) => assert!(!owned),
    }
});
