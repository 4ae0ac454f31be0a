//! Codec boundary between canonical UTF-8 and the legacy Shift_JIS
//! encoding still used by some dictionary sources and host platforms.
//!
//! Stateless pure functions; conversion fails with a distinct error when a
//! string cannot be represented in the target encoding. Nothing else in
//! the core depends on this module.

use encoding_rs::SHIFT_JIS;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The input contains characters with no Shift_JIS representation.
    #[error("input is not representable in Shift_JIS")]
    Unrepresentable,
    /// The byte sequence is not valid Shift_JIS.
    #[error("input is not valid Shift_JIS")]
    Malformed,
}

/// Encode a UTF-8 string as Shift_JIS bytes.
pub fn utf8_to_sjis(input: &str) -> Result<Vec<u8>, EncodingError> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(input);
    if had_errors {
        return Err(EncodingError::Unrepresentable);
    }
    Ok(bytes.into_owned())
}

/// Decode Shift_JIS bytes into a UTF-8 string.
pub fn sjis_to_utf8(input: &[u8]) -> Result<String, EncodingError> {
    let (text, _, had_errors) = SHIFT_JIS.decode(input);
    if had_errors {
        return Err(EncodingError::Malformed);
    }
    Ok(text.into_owned())
}
