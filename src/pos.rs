//! Categorical queries over part-of-speech IDs.
//!
//! POS IDs are opaque 16-bit integers assigned by the dictionary build.
//! The matcher answers class membership questions (functional word,
//! suffix, prefix) from ID ranges supplied by the data manager, and hands
//! out the fixed IDs used for synthesized nodes. `PosGroup` collapses IDs
//! into coarse equivalence classes for candidate deduplication.

use std::ops::RangeInclusive;

/// ID-range driven POS classifier.
///
/// The ranges mirror how the dictionary build lays out its ID space:
/// functional words (particles, auxiliaries), suffixes and prefixes each
/// occupy contiguous ranges, and the synthesized-node classes (number,
/// alphabet, symbol, unknown) are single reserved IDs.
#[derive(Debug, Clone)]
pub struct PosMatcher {
    functional: RangeInclusive<u16>,
    suffix: RangeInclusive<u16>,
    prefix: RangeInclusive<u16>,
    number_id: u16,
    alphabet_id: u16,
    symbol_id: u16,
    unknown_id: u16,
}

impl PosMatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn from_ranges(
        functional: RangeInclusive<u16>,
        suffix: RangeInclusive<u16>,
        prefix: RangeInclusive<u16>,
        number_id: u16,
        alphabet_id: u16,
        symbol_id: u16,
        unknown_id: u16,
    ) -> Self {
        Self {
            functional,
            suffix,
            prefix,
            number_id,
            alphabet_id,
            symbol_id,
            unknown_id,
        }
    }

    /// Particles and auxiliary verbs: words that attach to the preceding
    /// content word and never open a phrase.
    pub fn is_functional(&self, id: u16) -> bool {
        self.functional.contains(&id)
    }

    pub fn is_suffix(&self, id: u16) -> bool {
        self.suffix.contains(&id)
    }

    pub fn is_prefix(&self, id: u16) -> bool {
        self.prefix.contains(&id)
    }

    /// POS ID for synthesized numeric-run nodes.
    pub fn number_id(&self) -> u16 {
        self.number_id
    }

    /// POS ID for synthesized alphabetic-run nodes.
    pub fn alphabet_id(&self) -> u16 {
        self.alphabet_id
    }

    pub fn symbol_id(&self) -> u16 {
        self.symbol_id
    }

    /// POS ID for single-character unknown-word fallback nodes.
    pub fn unknown_id(&self) -> u16 {
        self.unknown_id
    }
}

/// Coarse POS equivalence classes, backed by a byte table indexed by ID.
/// IDs beyond the table map to group 0.
#[derive(Debug, Clone)]
pub struct PosGroup {
    table: Vec<u8>,
}

impl PosGroup {
    pub fn new(table: Vec<u8>) -> Self {
        Self { table }
    }

    pub fn group(&self, id: u16) -> u8 {
        self.table.get(id as usize).copied().unwrap_or(0)
    }
}
