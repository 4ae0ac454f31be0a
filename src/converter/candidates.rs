//! Projection of N-best lattice paths onto output segments, candidate
//! synthesis (inner-segment boundaries, partial candidates) and the
//! dummy-candidate fill.

use std::collections::HashSet;
use std::ops::Range;

use tracing::{debug, debug_span};

use crate::request::ConversionRequest;
use crate::segments::{Candidate, RequestType, Segment, SegmentType, Segments};
use crate::unicode;

use super::lattice::{Lattice, NodeId, NodeType};
use super::nbest::NBestGenerator;
use super::{ConvertError, ImmutableConverter};

/// One deduplicated N-best path restricted to its conversion-region nodes.
struct Path {
    nodes: Vec<NodeId>,
    cost: i32,
}

impl ImmutableConverter<'_> {
    /// Enumerate N-best paths and project them onto the caller's segments.
    pub(crate) fn make_segments(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
        lattice: &Lattice,
        nbest_size: usize,
    ) -> Result<(), ConvertError> {
        let _span = debug_span!("make_segments", nbest_size).entered();

        let budget = (self.config.limits.nbest_expansion_factor * nbest_size).clamp(1000, 20000);
        let generator = NBestGenerator::new(lattice, self.connector, self.segmenter, budget);

        let mut paths: Vec<Path> = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for (nodes, cost) in generator {
            let conversion_nodes: Vec<NodeId> = nodes
                .into_iter()
                .filter(|&id| lattice.node(id).node_type != NodeType::History)
                .collect();
            if conversion_nodes.is_empty() {
                continue;
            }
            let key: String = conversion_nodes
                .iter()
                .map(|&id| lattice.node(id).key.as_str())
                .collect();
            let value: String = conversion_nodes
                .iter()
                .map(|&id| lattice.node(id).value.as_str())
                .collect();
            if self.suppression_dictionary.suppress_entry(&key, &value) {
                continue;
            }
            if seen.insert((key, value)) {
                paths.push(Path {
                    nodes: conversion_nodes,
                    cost,
                });
            }
            if paths.len() >= nbest_size {
                break;
            }
        }
        debug!(paths = paths.len());
        if paths.is_empty() {
            return Err(ConvertError::DataUnavailable);
        }

        match segments.request_type() {
            RequestType::Conversion | RequestType::ReverseConversion => {
                self.make_conversion_segments(segments, lattice, &paths)
            }
            _ => {
                self.make_prediction_segment(request, segments, lattice, &paths, nbest_size);
                Ok(())
            }
        }
    }

    /// CONVERSION: one output segment per user conversion segment, keys
    /// preserved. Candidates are the aligned sub-paths of the N-best
    /// pool; inner-segment boundaries stay empty.
    fn make_conversion_segments(
        &self,
        segments: &mut Segments,
        lattice: &Lattice,
        paths: &[Path],
    ) -> Result<(), ConvertError> {
        let history_len = self.history_key_len(segments);
        let mut spans = Vec::new();
        let mut offset = history_len;
        for segment in segments.conversion_segments() {
            spans.push(offset..offset + segment.key().len());
            offset += segment.key().len();
        }

        let cap = self.config.limits.default_conversion_candidates;
        let mut replacement = Vec::with_capacity(spans.len());
        for span in &spans {
            let mut segment = Segment::default();
            segment.set_segment_type(SegmentType::Free);
            segment.set_key(&lattice.key()[span.clone()]);

            let mut seen_values: HashSet<String> = HashSet::new();
            let mut seen_groups: HashSet<(String, String, u8, u8)> = HashSet::new();
            for path in paths {
                let Some(run) = aligned_run(lattice, &path.nodes, span.start, span.end) else {
                    continue;
                };
                let candidate = self.candidate_from_nodes(lattice, run, path.cost, false);
                if self
                    .suppression_dictionary
                    .suppress_entry(&candidate.key, &candidate.value)
                {
                    continue;
                }
                if !seen_values.insert(candidate.value.clone()) {
                    continue;
                }
                // Same stem and POS groups: a spelling variant of an
                // already-ranked candidate.
                let signature = (
                    candidate.content_key.clone(),
                    candidate.content_value.clone(),
                    self.pos_group.group(candidate.lid),
                    self.pos_group.group(candidate.rid),
                );
                if !seen_groups.insert(signature) {
                    continue;
                }
                segment.push_candidate(candidate);
                if segment.candidates_size() >= cap {
                    break;
                }
            }

            if segment.candidates_size() == 0 {
                return Err(ConvertError::DataUnavailable);
            }
            replacement.push(segment);
        }

        segments.replace_conversion_segments(replacement);
        Ok(())
    }

    /// PREDICTION and friends: a single output segment spanning the full
    /// remaining key. Whole paths become candidates with inner-segment
    /// boundaries; partial-key candidates are appended when requested.
    fn make_prediction_segment(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
        lattice: &Lattice,
        paths: &[Path],
        nbest_size: usize,
    ) {
        let history_len = self.history_key_len(segments);
        let conversion_key = &lattice.key()[history_len..];

        let partials = if request.create_partial_candidates
            && segments.request_type() == RequestType::Prediction
            && segments.conversion_segments_size() == 1
        {
            self.partial_candidates(lattice, paths, conversion_key)
        } else {
            Vec::new()
        };

        let mut segment = Segment::default();
        segment.set_segment_type(SegmentType::Free);
        segment.set_key(conversion_key);

        // Keep a little room for partial candidates so full paths cannot
        // crowd them out of the quota.
        let reserved = partials.len().min(2);
        for path in paths.iter().take(nbest_size.saturating_sub(reserved).max(1)) {
            let candidate = self.candidate_from_nodes(lattice, &path.nodes, path.cost, true);
            segment.push_candidate(candidate);
        }
        for partial in partials {
            if segment.candidates_size() >= nbest_size {
                break;
            }
            segment.push_candidate(partial);
        }

        self.insert_dummy_candidates(&mut segment, nbest_size);
        segments.replace_conversion_segments(vec![segment]);
    }

    /// Prefixes of N-best paths ending on a phrase boundary, flagged as
    /// partially consuming the key.
    fn partial_candidates(
        &self,
        lattice: &Lattice,
        paths: &[Path],
        conversion_key: &str,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for path in paths {
            let groups = self.phrase_groups(lattice, &path.nodes);
            for k in 1..groups.len() {
                let prefix = &path.nodes[..groups[k].start];
                let key_len: usize = prefix
                    .iter()
                    .map(|&id| lattice.node(id).key.len())
                    .sum();
                if key_len >= conversion_key.len() {
                    continue;
                }
                let mut candidate = self.candidate_from_nodes(lattice, prefix, path.cost, true);
                candidate.attributes |= Candidate::PARTIALLY_KEY_CONSUMED;
                if self
                    .suppression_dictionary
                    .suppress_entry(&candidate.key, &candidate.value)
                {
                    continue;
                }
                if seen.insert((candidate.key.clone(), candidate.value.clone())) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Group a path's nodes into phrases at segmenter boundaries.
    fn phrase_groups(&self, lattice: &Lattice, nodes: &[NodeId]) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        if nodes.is_empty() {
            return groups;
        }
        let mut start = 0;
        for i in 1..nodes.len() {
            if self
                .segmenter
                .is_boundary(lattice.node(nodes[i - 1]), lattice.node(nodes[i]))
            {
                groups.push(start..i);
                start = i;
            }
        }
        groups.push(start..nodes.len());
        groups
    }

    /// Build one candidate from a run of path nodes.
    fn candidate_from_nodes(
        &self,
        lattice: &Lattice,
        nodes: &[NodeId],
        path_cost: i32,
        with_inner_boundary: bool,
    ) -> Candidate {
        let mut candidate = Candidate {
            cost: path_cost,
            ..Default::default()
        };

        for (i, &id) in nodes.iter().enumerate() {
            let node = lattice.node(id);
            candidate.key.push_str(&node.key);
            candidate.value.push_str(&node.value);
            candidate.wcost += i32::from(node.wcost);
            if i > 0 {
                let prev = lattice.node(nodes[i - 1]);
                candidate.structure_cost += self.connector.cost(prev.rid, node.lid);
            }
            if node.attributes & super::Node::SPELLING_CORRECTION != 0 {
                candidate.attributes |= Candidate::SPELLING_CORRECTION;
            }
            if node.attributes & super::Node::NO_MODIFICATION != 0 {
                candidate.attributes |= Candidate::NO_MODIFICATION;
            }
        }
        candidate.lid = lattice.node(nodes[0]).lid;
        candidate.rid = lattice.node(nodes[nodes.len() - 1]).rid;

        let content_end = self.strip_functional_tail(lattice, nodes);
        for &id in &nodes[..content_end] {
            let node = lattice.node(id);
            candidate.content_key.push_str(&node.key);
            candidate.content_value.push_str(&node.value);
        }

        if with_inner_boundary {
            for group in self.phrase_groups(lattice, nodes) {
                let members = &nodes[group];
                let key_len: usize = members.iter().map(|&id| lattice.node(id).key.len()).sum();
                let value_len: usize =
                    members.iter().map(|&id| lattice.node(id).value.len()).sum();
                let content_end = self.strip_functional_tail(lattice, members);
                let content_key_len: usize = members[..content_end]
                    .iter()
                    .map(|&id| lattice.node(id).key.len())
                    .sum();
                let content_value_len: usize = members[..content_end]
                    .iter()
                    .map(|&id| lattice.node(id).value.len())
                    .sum();
                candidate.push_back_inner_segment_boundary(
                    key_len,
                    value_len,
                    content_key_len,
                    content_value_len,
                );
            }
        }

        candidate
    }

    /// Index after the last content node: trailing functional words are
    /// excluded from the content portion. A run that is functional
    /// throughout keeps itself whole.
    fn strip_functional_tail(&self, lattice: &Lattice, nodes: &[NodeId]) -> usize {
        let mut end = nodes.len();
        while end > 1 && self.pos_matcher.is_functional(lattice.node(nodes[end - 1]).lid) {
            end -= 1;
        }
        end
    }

    /// Pad `segment` up to `desired_size` with low-confidence variants of
    /// the reading: full-width katakana, the hiragana reading itself and
    /// half-width katakana. Each dummy costs strictly more than everything
    /// before it and carries no inner-segment boundary.
    pub fn insert_dummy_candidates(&self, segment: &mut Segment, desired_size: usize) {
        if segment.candidates_size() == 0 || segment.candidates_size() >= desired_size {
            return;
        }

        let reading = if segment.key().is_empty() {
            segment.candidate(0).key.clone()
        } else {
            segment.key().to_string()
        };
        let (lid, rid) = {
            let top = segment.candidate(0);
            (top.lid, top.rid)
        };

        let katakana = unicode::hiragana_to_katakana(&reading);
        let halfwidth = unicode::katakana_to_halfwidth(&katakana);
        let forms = [katakana, reading.clone(), halfwidth];

        let mut wcost = segment
            .candidates()
            .iter()
            .map(|c| c.wcost)
            .max()
            .unwrap_or(0);
        for form in forms {
            if segment.candidates_size() >= desired_size {
                break;
            }
            if form.is_empty() || segment.candidates().iter().any(|c| c.value == form) {
                continue;
            }
            wcost += 1;
            segment.push_candidate(Candidate {
                key: reading.clone(),
                value: form.clone(),
                content_key: reading.clone(),
                content_value: form,
                lid,
                rid,
                wcost,
                cost: wcost,
                structure_cost: 0,
                attributes: 0,
                inner_segment_boundary: Vec::new(),
            });
        }
    }
}

/// Contiguous run of `nodes` exactly covering `[begin, end)`, if the path
/// has boundaries at both ends of the span.
fn aligned_run<'n>(
    lattice: &Lattice,
    nodes: &'n [NodeId],
    begin: usize,
    end: usize,
) -> Option<&'n [NodeId]> {
    let start = nodes
        .iter()
        .position(|&id| lattice.node(id).begin == begin)?;
    for i in start..nodes.len() {
        let node_end = lattice.node(nodes[i]).end;
        if node_end == end {
            return Some(&nodes[start..=i]);
        }
        if node_end > end {
            return None;
        }
    }
    None
}
