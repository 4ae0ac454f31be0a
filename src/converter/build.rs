//! Lattice construction: dictionary-driven node generation, unknown-word
//! synthesis, history seating and predictive-node injection.

use tracing::{debug, debug_span};

use crate::dict::{LookupControl, Token};
use crate::request::ConversionRequest;
use crate::segments::{RequestType, SegmentType, Segments};
use crate::unicode;

use super::lattice::{Lattice, Node, NodeType, COST_SENTINEL};
use super::{ConvertError, ImmutableConverter};

/// Script class of a character, used to collapse unknown runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Alpha,
    Other,
}

fn char_class(c: char) -> CharClass {
    if unicode::is_digit(c) {
        CharClass::Digit
    } else if unicode::is_ascii_alpha(c) {
        CharClass::Alpha
    } else {
        CharClass::Other
    }
}

impl ImmutableConverter<'_> {
    /// Populate `lattice` for `segments`. The lattice key must already be
    /// set to the concatenated history + conversion reading.
    pub(crate) fn make_lattice(
        &self,
        request: &ConversionRequest,
        segments: &Segments,
        lattice: &mut Lattice,
    ) -> Result<(), ConvertError> {
        let _span = debug_span!("make_lattice", key_len = lattice.len()).entered();
        if lattice.is_empty() {
            return Err(ConvertError::InvalidInput("lattice key is not set"));
        }

        let history_len = self.history_key_len(segments);
        self.make_lattice_nodes_for_history_segments(segments, lattice);
        self.make_lattice_nodes_for_conversion_segments(request, segments, history_len, lattice);

        if matches!(
            segments.request_type(),
            RequestType::Prediction | RequestType::Suggestion
        ) {
            self.make_lattice_nodes_for_predictive_nodes(segments, request, lattice);
        }

        // Every conversion position must be covered; the unknown-word
        // guesser guarantees this unless node generation was starved.
        let key = lattice.key();
        for (rel, _) in key[history_len..].char_indices() {
            if lattice.begin_nodes(history_len + rel).is_empty() {
                return Err(ConvertError::CoverageFailure);
            }
        }

        debug!(nodes = lattice.node_count());
        Ok(())
    }

    /// Seat each history segment as one fixed-cost node chained from BOS.
    fn make_lattice_nodes_for_history_segments(&self, segments: &Segments, lattice: &mut Lattice) {
        let mut offset = 0;
        let mut prev = lattice.bos();
        for segment in segments.history_segments() {
            let (value, lid, rid) = if segment.candidates_size() > 0 {
                let c = segment.candidate(0);
                (c.value.clone(), c.lid, c.rid)
            } else {
                (segment.key().to_string(), 0, 0)
            };
            let node = Node {
                begin: offset,
                end: offset + segment.key().len(),
                key: segment.key().to_string(),
                value,
                lid,
                rid,
                wcost: 0,
                node_type: NodeType::History,
                attributes: 0,
                cost: 0,
                prev: Some(prev),
            };
            offset = node.end;
            prev = lattice.insert(node);
        }
    }

    /// Prefix lookups (reverse lookups for reverse conversion) at every
    /// character position of the conversion region, with unknown-word
    /// fallbacks, plus constrained nodes for value-locked segments.
    fn make_lattice_nodes_for_conversion_segments(
        &self,
        request: &ConversionRequest,
        segments: &Segments,
        history_len: usize,
        lattice: &mut Lattice,
    ) {
        let key = lattice.key().to_string();
        let reverse = segments.request_type() == RequestType::ReverseConversion;
        let budget = self.config.limits.max_nodes_per_lookup;

        for (rel, _) in key[history_len..].char_indices() {
            let pos = history_len + rel;
            let suffix = &key[pos..];
            let mut covered_single = false;
            let mut count = 0;
            {
                let mut on_token = |matched: &str, token: &Token| -> LookupControl {
                    if self
                        .suppression_dictionary
                        .suppress_entry(&token.key, &token.value)
                    {
                        return LookupControl::RemoveToken;
                    }
                    let node = if reverse {
                        // The surface is what the lattice consumes; the
                        // reading becomes the output value.
                        Node {
                            begin: pos,
                            end: pos + matched.len(),
                            key: matched.to_string(),
                            value: token.key.clone(),
                            lid: token.lid,
                            rid: token.rid,
                            wcost: token.cost,
                            node_type: NodeType::Normal,
                            attributes: token.attributes,
                            cost: COST_SENTINEL,
                            prev: None,
                        }
                    } else {
                        Node::from_token(pos, token)
                    };
                    if node.key_char_len() == 1 {
                        covered_single = true;
                    }
                    lattice.insert(node);
                    count += 1;
                    if count >= budget {
                        LookupControl::Stop
                    } else {
                        LookupControl::Continue
                    }
                };
                if reverse {
                    self.dictionary.lookup_reverse(suffix, request, &mut on_token);
                } else {
                    self.dictionary.lookup_prefix(suffix, request, &mut on_token);
                }
            }
            self.add_unknown_nodes(&key, pos, covered_single, lattice);
        }

        self.add_constrained_nodes(segments, history_len, lattice);
    }

    /// Rule-based unknown-word guesses at `pos`: collapsed numeric and
    /// alphabetic runs, and a single-character fallback that guarantees
    /// lattice connectivity.
    fn add_unknown_nodes(
        &self,
        key: &str,
        pos: usize,
        mut covered_single: bool,
        lattice: &mut Lattice,
    ) {
        let suffix = &key[pos..];
        let first = suffix.chars().next().expect("pos is a char start");
        let class = char_class(first);
        let unknown_cost = self.config.cost.unknown_word_cost;

        let run_start = key[..pos]
            .chars()
            .next_back()
            .map_or(true, |prev| char_class(prev) != class);

        if class != CharClass::Other && run_start {
            let run_len: usize = suffix
                .chars()
                .take_while(|&c| char_class(c) == class)
                .map(char::len_utf8)
                .sum();
            let run = &suffix[..run_len];
            let (pos_id, variant) = match class {
                CharClass::Digit => {
                    let variant = if run.chars().all(|c| c.is_ascii_digit()) {
                        unicode::digits_to_fullwidth(run)
                    } else {
                        unicode::digits_to_halfwidth(run)
                    };
                    (self.pos_matcher.number_id(), Some(variant))
                }
                CharClass::Alpha => (self.pos_matcher.alphabet_id(), None),
                CharClass::Other => unreachable!(),
            };
            lattice.insert(self.unknown_node(pos, run, run, pos_id, unknown_cost));
            if let Some(variant) = variant {
                if variant != run {
                    lattice.insert(self.unknown_node(
                        pos,
                        run,
                        &variant,
                        pos_id,
                        unknown_cost.saturating_add(1),
                    ));
                }
            }
            if run_len == first.len_utf8() {
                covered_single = true;
            }
        }

        if !covered_single {
            let single = &suffix[..first.len_utf8()];
            lattice.insert(self.unknown_node(
                pos,
                single,
                single,
                self.pos_matcher.unknown_id(),
                unknown_cost,
            ));
        }
    }

    fn unknown_node(&self, pos: usize, key: &str, value: &str, pos_id: u16, wcost: i16) -> Node {
        Node {
            begin: pos,
            end: pos + key.len(),
            key: key.to_string(),
            value: value.to_string(),
            lid: pos_id,
            rid: pos_id,
            wcost,
            node_type: NodeType::Unknown,
            attributes: 0,
            cost: COST_SENTINEL,
            prev: None,
        }
    }

    /// Value-locked segments contribute one zero-cost constrained node
    /// spanning the whole segment, so the locked surface wins its span.
    fn add_constrained_nodes(&self, segments: &Segments, history_len: usize, lattice: &mut Lattice) {
        let mut offset = history_len;
        for segment in segments.conversion_segments() {
            let begin = offset;
            offset += segment.key().len();
            if segment.segment_type() != SegmentType::FixedValue
                || segment.candidates_size() == 0
            {
                continue;
            }
            let c = segment.candidate(0);
            lattice.insert(Node {
                begin,
                end: offset,
                key: segment.key().to_string(),
                value: c.value.clone(),
                lid: c.lid,
                rid: c.rid,
                wcost: 0,
                node_type: NodeType::Constrained,
                attributes: 0,
                cost: COST_SENTINEL,
                prev: None,
            });
        }
    }

    /// Inject predictive nodes for the unconsumed tail of the last
    /// conversion segment. Positions strictly inside history are never
    /// queried.
    pub(crate) fn make_lattice_nodes_for_predictive_nodes(
        &self,
        segments: &Segments,
        request: &ConversionRequest,
        lattice: &mut Lattice,
    ) {
        let key = lattice.key().to_string();
        let mut start = self.history_key_len(segments);
        let n = segments.conversion_segments_size();
        for i in 0..n.saturating_sub(1) {
            start += segments.conversion_segment(i).key().len();
        }
        if start >= key.len() {
            return;
        }

        let budget = self.config.limits.max_nodes_per_lookup;
        for (rel, _) in key[start..].char_indices() {
            let pos = start + rel;
            let suffix = &key[pos..];
            let mut count = 0;
            let mut on_token = |_matched: &str, token: &Token| -> LookupControl {
                if self
                    .suppression_dictionary
                    .suppress_entry(&token.key, &token.value)
                {
                    return LookupControl::RemoveToken;
                }
                let mut node = Node::from_token(pos, token);
                node.attributes |= Node::PREDICTIVE;
                lattice.insert(node);
                count += 1;
                if count >= budget {
                    LookupControl::Stop
                } else {
                    LookupControl::Continue
                }
            };
            self.dictionary.lookup_predictive(suffix, request, &mut on_token);
            self.suffix_dictionary
                .lookup_predictive(suffix, request, &mut on_token);
        }
    }
}
