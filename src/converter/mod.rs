//! The immutable conversion core.
//!
//! Builds a lattice over the request key (history + conversion reading),
//! runs forward Viterbi and backward A* N-best search, then projects the
//! resulting paths onto the caller's segments as ranked candidates. The
//! converter itself is stateless across calls; every dependency is a
//! read-only borrow supplied at construction.

mod build;
mod candidates;
mod lattice;
mod nbest;
mod viterbi;

#[cfg(test)]
pub(crate) mod testutil;
#[cfg(test)]
mod tests;

pub use lattice::{Lattice, Node, NodeId, NodeType, COST_SENTINEL};

use tracing::{debug, debug_span};

use crate::config::EngineConfig;
use crate::dict::{Connector, DictionaryInterface, SuppressionDictionary};
use crate::pos::{PosGroup, PosMatcher};
use crate::request::ConversionRequest;
use crate::segmenter::Segmenter;
use crate::segments::{RequestType, Segments};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Dictionary or connection data could not produce any path.
    #[error("conversion data unavailable")]
    DataUnavailable,

    /// Some position of the key has no covering lattice node. Should not
    /// occur while the unknown-word guesser is enabled.
    #[error("lattice cannot cover the input key")]
    CoverageFailure,
}

/// Stateless kana-to-kanji converter over borrowed, read-only data.
pub struct ImmutableConverter<'a> {
    dictionary: &'a dyn DictionaryInterface,
    suffix_dictionary: &'a dyn DictionaryInterface,
    suppression_dictionary: &'a SuppressionDictionary,
    connector: &'a Connector,
    segmenter: &'a Segmenter,
    pos_matcher: &'a PosMatcher,
    pos_group: &'a PosGroup,
    config: EngineConfig,
}

impl<'a> ImmutableConverter<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dictionary: &'a dyn DictionaryInterface,
        suffix_dictionary: &'a dyn DictionaryInterface,
        suppression_dictionary: &'a SuppressionDictionary,
        connector: &'a Connector,
        segmenter: &'a Segmenter,
        pos_matcher: &'a PosMatcher,
        pos_group: &'a PosGroup,
        config: EngineConfig,
    ) -> Self {
        Self {
            dictionary,
            suffix_dictionary,
            suppression_dictionary,
            connector,
            segmenter,
            pos_matcher,
            pos_group,
            config,
        }
    }

    /// Convert with default per-call options.
    pub fn convert(&self, segments: &mut Segments) -> Result<(), ConvertError> {
        self.convert_for_request(&ConversionRequest::default(), segments)
    }

    /// Convert `segments` in place: conversion segments are repopulated
    /// with ranked candidates, history segments are consumed as context.
    pub fn convert_for_request(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
    ) -> Result<(), ConvertError> {
        let _span = debug_span!(
            "convert",
            request_type = ?segments.request_type(),
            conversion_segments = segments.conversion_segments_size()
        )
        .entered();

        self.validate(segments)?;
        self.drop_overlong_history(segments);

        let mut key = String::new();
        for segment in segments.history_segments() {
            key.push_str(segment.key());
        }
        for segment in segments.conversion_segments() {
            key.push_str(segment.key());
        }

        let mut lattice = Lattice::new();
        lattice.set_key(key);
        self.make_lattice(request, segments, &mut lattice)?;
        self.viterbi(segments, &mut lattice);

        if lattice.node(lattice.eos()).cost >= COST_SENTINEL {
            return Err(ConvertError::DataUnavailable);
        }

        let nbest_size = match segments.request_type() {
            RequestType::Conversion | RequestType::ReverseConversion => {
                self.config.limits.default_conversion_candidates
            }
            _ => segments.max_prediction_candidates_size().max(1),
        };
        self.make_segments(request, segments, &lattice, nbest_size)?;

        debug!(
            segments_out = segments.segments_size(),
            best_cost = lattice.node(lattice.eos()).cost
        );
        Ok(())
    }

    fn validate(&self, segments: &Segments) -> Result<(), ConvertError> {
        if segments.conversion_segments_size() == 0 {
            return Err(ConvertError::InvalidInput("no conversion segments"));
        }
        for segment in segments.conversion_segments() {
            if segment.key().is_empty() {
                return Err(ConvertError::InvalidInput("empty conversion key"));
            }
        }
        Ok(())
    }

    /// History context is dropped wholesale once its concatenated reading
    /// exceeds the configured limit; a huge history costs more than it
    /// helps.
    fn drop_overlong_history(&self, segments: &mut Segments) {
        let history_bytes: usize = segments
            .history_segments()
            .iter()
            .map(|s| s.key().len())
            .sum();
        if history_bytes > self.config.limits.max_history_key_bytes {
            debug!(history_bytes, "dropping over-long history");
            segments.clear_history_segments();
        }
    }

    /// Total byte length of the history part of the lattice key.
    fn history_key_len(&self, segments: &Segments) -> usize {
        segments
            .history_segments()
            .iter()
            .map(|s| s.key().len())
            .sum()
    }
}
