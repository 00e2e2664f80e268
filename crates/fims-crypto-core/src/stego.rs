//! Zero-width phrase steganography.
//!
//! This module provides:
//! - [`hide`] — seal a [`Secret`] under a [`DerivedKey`] and embed it in a cover phrase
//! - [`reveal`] — extract and open a secret from a candidate phrase
//! - [`insertion_point`] — locate the first `word<spaces>word` boundary in a phrase
//!
//! # Encoding
//!
//! The payload is `version (1 byte) || nonce (12) || ciphertext || tag (16)`,
//! sealed deterministically by [`crate::symmetric::seal`] with the version
//! byte as AAD. Each payload byte becomes four invisible characters, two
//! bits each, most significant first:
//!
//! | bits | char |
//! |------|----------|
//! | `00` | `U+200C` |
//! | `01` | `U+200D` |
//! | `10` | `U+2061` |
//! | `11` | `U+2062` |
//!
//! The invisible run is placed directly after the first word of the cover,
//! so the magic phrase renders exactly like the cover phrase.

use std::fmt;

use crate::day_key::DerivedKey;
use crate::error::{CryptoError, ExtractionFailure};
use crate::memory::Secret;
use crate::symmetric::{self, SealedData};

/// Payload format version, also bound as AAD.
pub const FORMAT_VERSION: u8 = 0x01;

/// Invisible symbols, indexed by their 2-bit value.
const ALPHABET: [char; 4] = ['\u{200C}', '\u{200D}', '\u{2061}', '\u{2062}'];

/// Invisible characters emitted per payload byte.
const SYMBOLS_PER_BYTE: usize = 4;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A cover phrase carrying a hidden, sealed secret.
///
/// Safe to copy, paste or send out of band: without the day key the
/// payload is an AES-256-GCM ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct MagicPhrase(String);

impl MagicPhrase {
    /// The full phrase, invisible characters included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The phrase as a human sees it (payload characters removed).
    #[must_use]
    pub fn visible_text(&self) -> String {
        strip_payload(&self.0)
    }

    /// Consume into the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MagicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MagicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MagicPhrase({:?})", self.visible_text())
    }
}

// ---------------------------------------------------------------------------
// Phrase structure
// ---------------------------------------------------------------------------

fn symbol_value(c: char) -> Option<u8> {
    match c {
        '\u{200C}' => Some(0b00),
        '\u{200D}' => Some(0b01),
        '\u{2061}' => Some(0b10),
        '\u{2062}' => Some(0b11),
        _ => None,
    }
}

/// Remove every payload character from a phrase.
#[must_use]
pub fn strip_payload(phrase: &str) -> String {
    phrase.chars().filter(|c| symbol_value(*c).is_none()).collect()
}

/// Byte offset right after the first word that is followed by one or more
/// ASCII spaces and then another word.
///
/// Returns `None` when the phrase has no such boundary, i.e. when it does
/// not contain two space-separated words. Only U+0020 counts as a
/// separator; tabs and newlines do not.
#[must_use]
pub fn insertion_point(phrase: &str) -> Option<usize> {
    let mut prev_is_word = false;
    let mut boundary: Option<usize> = None;

    for (idx, c) in phrase.char_indices() {
        if c == ' ' {
            if prev_is_word {
                boundary = Some(idx);
            }
            prev_is_word = false;
        } else if c.is_whitespace() {
            boundary = None;
            prev_is_word = false;
        } else {
            if boundary.is_some() {
                return boundary;
            }
            prev_is_word = true;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Hide / reveal
// ---------------------------------------------------------------------------

/// Hide `secret` inside `cover`, sealed under `key`.
///
/// Deterministic: the same secret, key and cover always give the same
/// magic phrase. Payload characters already present in the cover are
/// dropped first.
///
/// # Errors
///
/// Returns `CryptoError::Steganography` if the cover does not contain two
/// space-separated words, or `CryptoError::Encryption` if sealing fails.
pub fn hide(secret: &Secret, key: &DerivedKey, cover: &str) -> Result<MagicPhrase, CryptoError> {
    let cover = strip_payload(cover);
    let split = insertion_point(&cover).ok_or_else(|| {
        CryptoError::Steganography("cover phrase needs at least two space-separated words".into())
    })?;

    let sealed = symmetric::seal(secret.expose().as_bytes(), key.expose(), &[FORMAT_VERSION])?;
    let body = sealed.to_bytes();

    let hidden_len = body
        .len()
        .saturating_add(1)
        .saturating_mul(SYMBOLS_PER_BYTE * '\u{200C}'.len_utf8());
    let mut out = String::with_capacity(cover.len().saturating_add(hidden_len));
    out.push_str(&cover[..split]);
    for byte in std::iter::once(&FORMAT_VERSION).chain(body.iter()) {
        for shift in [6u32, 4, 2, 0] {
            let bits = byte.checked_shr(shift).unwrap_or(0) & 0b11;
            out.push(ALPHABET[usize::from(bits)]);
        }
    }
    out.push_str(&cover[split..]);

    Ok(MagicPhrase(out))
}

/// Extract and open the secret hidden in `candidate` using `key`.
///
/// Never panics on arbitrary input.
///
/// # Errors
///
/// - [`ExtractionFailure::NoPayload`] if the phrase carries no hidden characters
/// - [`ExtractionFailure::Malformed`] if the hidden characters do not decode
///   to a version-1 payload
/// - [`ExtractionFailure::Authentication`] if the payload does not open under `key`
/// - [`ExtractionFailure::NotUtf8`] if the opened secret is not text
pub fn reveal(candidate: &str, key: &DerivedKey) -> Result<Secret, ExtractionFailure> {
    let symbols: Vec<u8> = candidate.chars().filter_map(symbol_value).collect();
    if symbols.is_empty() {
        return Err(ExtractionFailure::NoPayload);
    }

    let chunks = symbols.chunks_exact(SYMBOLS_PER_BYTE);
    if !chunks.remainder().is_empty() {
        return Err(ExtractionFailure::Malformed);
    }
    let payload: Vec<u8> = chunks
        .map(|c| c.iter().fold(0u8, |acc, &bits| (acc << 2) | bits))
        .collect();

    let Some((&version, body)) = payload.split_first() else {
        return Err(ExtractionFailure::Malformed);
    };
    if version != FORMAT_VERSION {
        return Err(ExtractionFailure::Malformed);
    }

    let sealed = SealedData::from_bytes(body).map_err(|_| ExtractionFailure::Malformed)?;
    let opened = symmetric::open(&sealed, key.expose(), &[FORMAT_VERSION])
        .map_err(|_| ExtractionFailure::Authentication)?;

    Secret::from_utf8(opened.expose().to_vec()).map_err(|_| ExtractionFailure::NotUtf8)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
