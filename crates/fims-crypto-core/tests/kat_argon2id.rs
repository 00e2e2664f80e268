//! RFC 9106 Section 5.4 — Argon2id Known-Answer Test vector.
//!
//! The RFC vector uses a secret key and associated data, which `derive()`
//! does not expose, so the raw `argon2` crate is checked for the exact KAT
//! and our wrapper is checked for consistency with small params.

use fims_crypto_core::kdf::{derive, Argon2idParams};

#[test]
fn rfc9106_section_5_4_argon2id() {
    let password = [0x01u8; 32];
    let salt = [0x02u8; 16];
    let secret = [0x03u8; 8];
    let ad_bytes = [0x04u8; 12];

    let ad = argon2::AssociatedData::new(&ad_bytes).expect("AD should be valid");
    let mut builder = argon2::ParamsBuilder::new();
    builder.m_cost(32);
    builder.t_cost(3);
    builder.p_cost(4);
    builder.output_len(32);
    builder.data(ad);
    let params_with_ad = builder.build().expect("params with AD should be valid");

    let argon2 = argon2::Argon2::new_with_secret(
        &secret,
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params_with_ad,
    )
    .expect("argon2 with secret should be valid");

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(&password, &salt, &mut output)
        .expect("hash_password_into should succeed");

    let expected: [u8; 32] = [
        0x0d, 0x64, 0x0d, 0xf5, 0x8d, 0x78, 0x76, 0x6c, 0x08, 0xc0, 0x37, 0xa3, 0x4a, 0x8b, 0x53,
        0xc9, 0xd0, 0x1e, 0xf0, 0x45, 0x2d, 0x75, 0xb6, 0x5e, 0xb5, 0x25, 0x20, 0xe9, 0x6b, 0x01,
        0xe6, 0x59,
    ];

    assert_eq!(
        output, expected,
        "RFC 9106 Section 5.4 Argon2id KAT vector mismatch"
    );
}

#[test]
fn derive_matches_raw_argon2id() {
    let params = Argon2idParams {
        m_cost: 32,
        t_cost: 1,
        p_cost: 1,
    };
    let salt = b"fims-day-key-salt-v1";
    let password = b"fims-day-key:19675";

    let raw_params = argon2::Params::new(32, 1, 1, Some(32)).expect("params");
    let raw = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, raw_params);
    let mut expected = [0u8; 32];
    raw.hash_password_into(password, salt, &mut expected)
        .expect("raw argon2 should succeed");

    let key = derive(password, salt, &params).expect("derive should succeed");
    assert_eq!(key.expose(), &expected);
}
