use std::collections::BTreeMap;

use super::{DictionaryInterface, LookupCallback, LookupControl, Token};
use crate::request::ConversionRequest;

/// In-memory reference dictionary.
///
/// Readings are held in a `BTreeMap` so prefix and predictive lookups are
/// range scans. This is the implementation used by tests and embedders
/// without a compiled dictionary; production deployments provide their own
/// `DictionaryInterface` over mapped dictionary data.
#[derive(Debug, Default)]
pub struct MemoryDictionary {
    /// reading → tokens, tokens sorted by cost ascending.
    entries: BTreeMap<String, Vec<Token>>,
    /// surface → readings that produce it.
    values: BTreeMap<String, Vec<String>>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut dict = Self::new();
        for token in tokens {
            dict.add_token(token);
        }
        dict
    }

    pub fn add_token(&mut self, token: Token) {
        self.values
            .entry(token.value.clone())
            .or_default()
            .push(token.key.clone());
        let tokens = self.entries.entry(token.key.clone()).or_default();
        let pos = tokens.partition_point(|t| t.cost <= token.cost);
        tokens.insert(pos, token);
    }

    /// Returns (reading_count, token_count).
    pub fn stats(&self) -> (usize, usize) {
        let tokens = self.entries.values().map(Vec::len).sum();
        (self.entries.len(), tokens)
    }

    /// Emit the tokens of one key, honoring callback control.
    /// Returns `false` when the whole lookup must stop.
    fn emit_key(&self, key: &str, callback: &mut LookupCallback) -> bool {
        let Some(tokens) = self.entries.get(key) else {
            return true;
        };
        for token in tokens {
            match callback(key, token) {
                LookupControl::Continue | LookupControl::RemoveToken => {}
                LookupControl::Stop => return false,
                LookupControl::RemoveAllRemaining => break,
            }
        }
        true
    }
}

impl DictionaryInterface for MemoryDictionary {
    fn lookup_prefix(&self, key: &str, _request: &ConversionRequest, callback: &mut LookupCallback) {
        let mut end = 0;
        for c in key.chars() {
            end += c.len_utf8();
            if !self.emit_key(&key[..end], callback) {
                return;
            }
        }
    }

    fn lookup_exact(&self, key: &str, _request: &ConversionRequest, callback: &mut LookupCallback) {
        self.emit_key(key, callback);
    }

    fn lookup_predictive(
        &self,
        key: &str,
        _request: &ConversionRequest,
        callback: &mut LookupCallback,
    ) {
        for (reading, tokens) in self.entries.range(key.to_string()..) {
            if !reading.starts_with(key) {
                break;
            }
            for token in tokens {
                match callback(reading, token) {
                    LookupControl::Continue | LookupControl::RemoveToken => {}
                    LookupControl::Stop => return,
                    LookupControl::RemoveAllRemaining => break,
                }
            }
        }
    }

    fn lookup_reverse(
        &self,
        value: &str,
        _request: &ConversionRequest,
        callback: &mut LookupCallback,
    ) {
        let mut end = 0;
        for c in value.chars() {
            end += c.len_utf8();
            let surface = &value[..end];
            let Some(readings) = self.values.get(surface) else {
                continue;
            };
            for reading in readings {
                let Some(tokens) = self.entries.get(reading) else {
                    continue;
                };
                for token in tokens.iter().filter(|t| t.value == surface) {
                    match callback(surface, token) {
                        LookupControl::Continue | LookupControl::RemoveToken => {}
                        LookupControl::Stop => return,
                        LookupControl::RemoveAllRemaining => break,
                    }
                }
            }
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn has_value(&self, value: &str) -> bool {
        self.values.contains_key(value)
    }
}
