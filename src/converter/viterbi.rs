//! Forward Viterbi over the lattice.

use tracing::{debug, debug_span};

use crate::segments::{RequestType, Segments};

use super::lattice::{Lattice, NodeId, NodeType, COST_SENTINEL};
use super::ImmutableConverter;

/// Winning relaxation for one right node, with the fields needed for
/// deterministic tie-breaking.
struct Relaxation {
    cost: i32,
    prev: NodeId,
    left_wcost: i16,
    left_key_len: usize,
}

impl ImmutableConverter<'_> {
    /// Byte position → segment index, over history and conversion
    /// segments alike.
    pub(crate) fn make_group(&self, segments: &Segments) -> Vec<u16> {
        let mut group = Vec::new();
        for (i, segment) in segments
            .history_segments()
            .iter()
            .chain(segments.conversion_segments())
            .enumerate()
        {
            group.extend(std::iter::repeat(i as u16).take(segment.key().len()));
        }
        group
    }

    /// Byte positions no node may cross: boundaries between conversion
    /// segments, honored for conversion-style requests. Prediction runs
    /// over a single free segment and has none.
    fn hard_boundaries(&self, segments: &Segments) -> Vec<usize> {
        if !matches!(
            segments.request_type(),
            RequestType::Conversion | RequestType::ReverseConversion
        ) {
            return Vec::new();
        }
        let group = self.make_group(segments);
        let history_count = segments.history_segments_size() as u16;
        let mut boundaries = Vec::new();
        for p in 1..group.len() {
            if group[p] != group[p - 1] && group[p - 1] >= history_count {
                boundaries.push(p);
            }
        }
        boundaries
    }

    /// Single forward pass: relax every (end node, begin node) pair at
    /// each position. History nodes are pre-seated and never re-relaxed;
    /// nodes spanning a hard segment boundary keep `prev == None`.
    ///
    /// Ties on relaxed cost break deterministically: lower predecessor
    /// word cost, then longer predecessor key, then insertion order.
    pub(crate) fn viterbi(&self, segments: &Segments, lattice: &mut Lattice) {
        let _span = debug_span!("viterbi", key_len = lattice.len()).entered();
        let boundaries = self.hard_boundaries(segments);

        for pos in 0..=lattice.len() {
            let rights = lattice.begin_nodes(pos).to_vec();
            if rights.is_empty() {
                continue;
            }
            let lefts = lattice.end_nodes(pos).to_vec();

            for right_id in rights {
                {
                    let right = lattice.node(right_id);
                    if matches!(right.node_type, NodeType::Bos | NodeType::History) {
                        continue;
                    }
                    if boundaries
                        .iter()
                        .any(|&p| right.begin < p && p < right.end)
                    {
                        continue;
                    }
                }

                let mut best: Option<Relaxation> = None;
                for &left_id in &lefts {
                    let left = lattice.node(left_id);
                    if left.cost >= COST_SENTINEL {
                        continue;
                    }
                    let right = lattice.node(right_id);
                    let cost = left.cost
                        + self.connector.cost(left.rid, right.lid)
                        + self.segmenter.boundary_penalty(left, right)
                        + i32::from(right.wcost);

                    let better = match &best {
                        None => true,
                        Some(b) => {
                            cost < b.cost
                                || (cost == b.cost
                                    && (left.wcost, std::cmp::Reverse(left.key.len()))
                                        < (b.left_wcost, std::cmp::Reverse(b.left_key_len)))
                        }
                    };
                    if better {
                        best = Some(Relaxation {
                            cost,
                            prev: left_id,
                            left_wcost: left.wcost,
                            left_key_len: left.key.len(),
                        });
                    }
                }

                if let Some(b) = best {
                    let right = lattice.node_mut(right_id);
                    right.cost = b.cost;
                    right.prev = Some(b.prev);
                }
            }
        }

        debug!(eos_cost = lattice.node(lattice.eos()).cost);
    }
}
