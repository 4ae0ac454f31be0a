//! Dictionary lookup contract and supporting storage.
//!
//! The conversion core consumes dictionaries through the narrow
//! [`DictionaryInterface`]: four lookup modes, each driving a caller
//! callback once per candidate token, plus cheap membership predicates.
//! Implementations must be read-only and safe for concurrent readers.

mod connection;
mod mem_dict;
mod suppression;

pub use connection::{Connector, DataError};
pub use mem_dict::MemoryDictionary;
pub use suppression::SuppressionDictionary;

use crate::request::ConversionRequest;

/// A dictionary token: one (reading, surface) pair with its cost model
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub key: String,
    pub value: String,
    pub cost: i16,
    pub lid: u16,
    pub rid: u16,
    pub attributes: u32,
}

impl Token {
    pub const SPELLING_CORRECTION: u32 = 1 << 0;
    pub const SYSTEM_DICTIONARY: u32 = 1 << 1;
    pub const NO_MODIFICATION: u32 = 1 << 2;
}

/// Control value returned by a lookup callback after each token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupControl {
    /// Keep emitting tokens.
    Continue,
    /// Abort the whole lookup.
    Stop,
    /// The caller rejected this token; keep emitting.
    RemoveToken,
    /// Skip the remaining tokens of the current key, move to the next key.
    RemoveAllRemaining,
}

/// Callback invoked once per candidate token with the matched key.
pub type LookupCallback<'a> = dyn FnMut(&str, &Token) -> LookupControl + 'a;

/// Read-only lookup capability the conversion core depends on.
///
/// All operations take the conversion request for feature gating (e.g. a
/// dictionary may suppress spelling corrections for some requests) and a
/// callback that bounds the work via its control returns.
pub trait DictionaryInterface: Send + Sync {
    /// Emit every token whose key is a prefix of `key`. Order unspecified.
    fn lookup_prefix(&self, key: &str, request: &ConversionRequest, callback: &mut LookupCallback);

    /// Emit tokens whose key equals `key`.
    fn lookup_exact(&self, key: &str, request: &ConversionRequest, callback: &mut LookupCallback);

    /// Emit tokens whose key has `key` as a prefix. Potentially large;
    /// callers bound it through the callback.
    fn lookup_predictive(
        &self,
        key: &str,
        request: &ConversionRequest,
        callback: &mut LookupCallback,
    );

    /// Emit tokens whose surface form is a prefix of `value`.
    fn lookup_reverse(&self, value: &str, request: &ConversionRequest, callback: &mut LookupCallback);

    fn has_key(&self, key: &str) -> bool;

    fn has_value(&self, value: &str) -> bool;
}
