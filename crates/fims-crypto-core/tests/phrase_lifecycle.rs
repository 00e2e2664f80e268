//! End-to-end tests of the phrase lifecycle: date → key → hide → reveal.

use fims_crypto_core::{
    derive_key, hide, reveal, Argon2idParams, DayKeyParams, ExtractionFailure, Secret,
};

fn fast_params() -> DayKeyParams {
    DayKeyParams {
        params: Argon2idParams {
            m_cost: 32,
            t_cost: 1,
            p_cost: 1,
        },
        ..DayKeyParams::default()
    }
}

#[test]
fn stored_on_one_instant_recovered_from_the_date_alone() {
    let secret = Secret::new("abcDEF123secret");

    // Hidden in the afternoon of 2023-11-14 (UTC).
    let store_key = derive_key(Some(1_700_000_000_000), &fast_params()).expect("derive");
    let magic = hide(&secret, &store_key, "buy two coffees").expect("hide");

    // Recovered from the date picker value "2023-11-14" (midnight UTC).
    let recover_key = derive_key(Some(1_699_920_000_000), &fast_params()).expect("derive");
    let revealed = reveal(magic.as_str(), &recover_key).expect("reveal");

    assert_eq!(revealed, secret);
}

#[test]
fn different_key_yields_extraction_failure() {
    let secret = Secret::new("abcDEF123secret");
    let key = derive_key(Some(1_700_000_000_000), &fast_params()).expect("derive");
    let magic = hide(&secret, &key, "buy two coffees").expect("hide");

    let other = derive_key(Some(1_677_628_800_000), &fast_params()).expect("derive");
    assert_eq!(
        reveal(magic.as_str(), &other).expect_err("wrong day must fail"),
        ExtractionFailure::Authentication
    );
}

#[test]
fn different_salt_yields_extraction_failure() {
    let secret = Secret::new("abcDEF123secret");
    let key = derive_key(Some(1_700_000_000_000), &fast_params()).expect("derive");
    let magic = hide(&secret, &key, "buy two coffees").expect("hide");

    let foreign = DayKeyParams {
        salt: "some-other-deployment".into(),
        ..fast_params()
    };
    let other = derive_key(Some(1_700_000_000_000), &foreign).expect("derive");
    assert!(reveal(magic.as_str(), &other).is_err());
}

#[test]
fn magic_phrase_survives_surrounding_edits() {
    let secret = Secret::new("abcDEF123secret");
    let key = derive_key(Some(1_700_000_000_000), &fast_params()).expect("derive");
    let magic = hide(&secret, &key, "buy two coffees").expect("hide");

    // Pasting into a message with extra text around it keeps the payload.
    let pasted = format!("note: {magic} (keep this)");
    assert_eq!(reveal(&pasted, &key).expect("reveal"), secret);
}

#[test]
fn long_secret_roundtrip() {
    let secret = Secret::new(&"5Kb8kLf9zgWQnogidDA76MzPL6TsZZY36hWXMssSzNydYXYB9KF".repeat(4));
    let key = derive_key(Some(1_700_000_000_000), &fast_params()).expect("derive");
    let magic = hide(&secret, &key, "the quick brown fox").expect("hide");
    assert_eq!(reveal(magic.as_str(), &key).expect("reveal"), secret);
}
