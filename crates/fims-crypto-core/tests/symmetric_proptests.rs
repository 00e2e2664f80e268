#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for deterministic AES-256-GCM sealing.

use fims_crypto_core::symmetric::{open, seal, SealedData, KEY_LEN};
use proptest::prelude::*;

/// Fixed key for property tests.
const PROP_KEY: [u8; KEY_LEN] = [0xCC; KEY_LEN];

proptest! {
    /// Seal→wire→open roundtrip always recovers the original plaintext.
    #[test]
    fn seal_open_roundtrip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        aad in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let sealed = seal(&plaintext, &PROP_KEY, &aad).expect("seal should succeed");
        let restored = SealedData::from_bytes(&sealed.to_bytes()).expect("parse should succeed");
        let opened = open(&restored, &PROP_KEY, &aad).expect("open should succeed");
        prop_assert_eq!(opened.expose(), plaintext.as_slice());
    }

    /// Sealing twice yields byte-identical output.
    #[test]
    fn seal_deterministic(plaintext in proptest::collection::vec(any::<u8>(), 0..512)) {
        let a = seal(&plaintext, &PROP_KEY, &[]).unwrap();
        let b = seal(&plaintext, &PROP_KEY, &[]).unwrap();
        prop_assert_eq!(a.to_bytes(), b.to_bytes());
    }

    /// Flipping any single bit of the wire form makes open fail.
    #[test]
    fn any_bit_flip_rejected(
        plaintext in proptest::collection::vec(any::<u8>(), 1..128),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut wire = seal(&plaintext, &PROP_KEY, &[]).unwrap().to_bytes();
        let idx = position.index(wire.len());
        wire[idx] ^= 1 << bit;
        let tampered = SealedData::from_bytes(&wire).unwrap();
        prop_assert!(open(&tampered, &PROP_KEY, &[]).is_err());
    }
}
