#![cfg(test)]

//! Shared mock data and converter wiring for converter tests.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::EngineConfig;
use crate::dict::{
    Connector, DictionaryInterface, LookupCallback, MemoryDictionary, SuppressionDictionary, Token,
};
use crate::pos::{PosGroup, PosMatcher};
use crate::request::ConversionRequest;
use crate::segmenter::Segmenter;

use super::ImmutableConverter;

pub(crate) const NOUN_ID: u16 = 10;
pub(crate) const VERB_ID: u16 = 20;
pub(crate) const PARTICLE_NO: u16 = 300;
pub(crate) const PARTICLE_HA: u16 = 301;
pub(crate) const AUX_DESU: u16 = 302;
pub(crate) const SUFFIX_SAN: u16 = 400;
pub(crate) const PREFIX_O: u16 = 450;

pub(crate) fn token(key: &str, value: &str, cost: i16, id: u16) -> Token {
    Token {
        key: key.to_string(),
        value: value.to_string(),
        cost,
        lid: id,
        rid: id,
        attributes: 0,
    }
}

pub(crate) fn pos_matcher() -> PosMatcher {
    PosMatcher::from_ranges(300..=399, 400..=449, 450..=499, 500, 510, 520, 530)
}

fn pos_group() -> PosGroup {
    let mut table = vec![1u8; 600];
    table[0] = 0;
    for id in 300..=399 {
        table[id] = 2;
    }
    for id in 400..=449 {
        table[id] = 3;
    }
    for id in 450..=499 {
        table[id] = 4;
    }
    for id in [500, 510, 520, 530] {
        table[id] = 5;
    }
    PosGroup::new(table)
}

/// All-zero connection matrix; the mock ID space lies out of range so
/// every transition costs 0 and word costs drive the search.
fn zero_connector() -> Connector {
    let text = format!("16 16\n{}", "0\n".repeat(16 * 16));
    Connector::from_text(&text).expect("static matrix is valid")
}

pub(crate) fn mock_dictionary() -> MemoryDictionary {
    MemoryDictionary::from_tokens([
        token("わたし", "私", 3000, NOUN_ID),
        token("なまえ", "名前", 3000, NOUN_ID),
        token("なかの", "中ノ", 4000, NOUN_ID),
        token("なかの", "中野", 4500, NOUN_ID),
        token("よろしく", "よろしく", 3000, VERB_ID),
        token("おねがい", "お願い", 3000, NOUN_ID),
        token("します", "します", 2000, VERB_ID),
        token("しょうめい", "証明", 3000, NOUN_ID),
        token("できる", "できる", 3000, VERB_ID),
        token("いで", "井手", 4000, NOUN_ID),
        token("きょう", "今日", 3000, NOUN_ID),
        token("きょう", "京", 5000, NOUN_ID),
        token("いい", "良い", 3500, VERB_ID),
        token("てんき", "天気", 4000, NOUN_ID),
        token("き", "木", 4500, NOUN_ID),
        token("い", "胃", 6000, NOUN_ID),
        token("たか", "高", 3000, NOUN_ID),
        token("まち", "町", 3000, NOUN_ID),
        token("あ", "亜", 5000, NOUN_ID),
        token("たなか", "田中", 3000, NOUN_ID),
        token("の", "の", 500, PARTICLE_NO),
        token("は", "は", 500, PARTICLE_HA),
        token("です", "です", 1000, AUX_DESU),
        token("さん", "さん", 1500, SUFFIX_SAN),
        token("お", "お", 1500, PREFIX_O),
    ])
}

/// Owns every dependency the converter borrows, the way the production
/// embedder owns mapped data blobs.
pub(crate) struct MockData {
    dictionary: MemoryDictionary,
    suppression: SuppressionDictionary,
    connector: Connector,
    segmenter: Segmenter,
    pos_matcher: PosMatcher,
    pos_group: PosGroup,
    config: EngineConfig,
}

impl MockData {
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            dictionary: mock_dictionary(),
            suppression: SuppressionDictionary::new(),
            connector: zero_connector(),
            segmenter: Segmenter::new(pos_matcher(), config.cost.segment_boundary_penalty),
            pos_matcher: pos_matcher(),
            pos_group: pos_group(),
            config,
        }
    }

    pub fn with_suppression(mut self, key: &str, value: &str) -> Self {
        self.suppression.add_entry(key, value);
        self
    }

    pub fn converter(&self) -> ImmutableConverter<'_> {
        self.converter_with(&self.dictionary)
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Build a converter around a replacement dictionary (used both as
    /// system and suffix dictionary, matching the spy-dictionary tests).
    pub fn converter_with<'a>(
        &'a self,
        dictionary: &'a dyn DictionaryInterface,
    ) -> ImmutableConverter<'a> {
        ImmutableConverter::new(
            dictionary,
            dictionary,
            &self.suppression,
            &self.connector,
            &self.segmenter,
            &self.pos_matcher,
            &self.pos_group,
            self.config.clone(),
        )
    }
}

/// Spy dictionary that records whether a predictive lookup was issued for
/// one specific query. All lookups emit nothing.
pub(crate) struct KeyCheckDictionary {
    target: String,
    received: AtomicBool,
}

impl KeyCheckDictionary {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            received: AtomicBool::new(false),
        }
    }

    pub fn received_target_query(&self) -> bool {
        self.received.load(Ordering::Relaxed)
    }
}

impl DictionaryInterface for KeyCheckDictionary {
    fn lookup_prefix(&self, _key: &str, _request: &ConversionRequest, _callback: &mut LookupCallback) {}

    fn lookup_exact(&self, _key: &str, _request: &ConversionRequest, _callback: &mut LookupCallback) {}

    fn lookup_predictive(
        &self,
        key: &str,
        _request: &ConversionRequest,
        _callback: &mut LookupCallback,
    ) {
        if key == self.target {
            self.received.store(true, Ordering::Relaxed);
        }
    }

    fn lookup_reverse(&self, _value: &str, _request: &ConversionRequest, _callback: &mut LookupCallback) {}

    fn has_key(&self, _key: &str) -> bool {
        false
    }

    fn has_value(&self, _value: &str) -> bool {
        false
    }
}
