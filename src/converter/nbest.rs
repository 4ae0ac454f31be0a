//! Backward A* enumeration of N-best paths.
//!
//! Runs after forward Viterbi: each node's forward cost is an admissible
//! (and consistent) lower bound on completing a partial path from that
//! node to BOS, so paths pop off the queue in true cost order. Partial
//! paths form shared-tail linked lists:
//!
//! `QueueItem -> PathLink (EOS) -> PathLink (n-1) -> ... -> PathLink (BOS)`

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::dict::Connector;
use crate::segmenter::Segmenter;

use super::lattice::{Lattice, NodeId, NodeType, COST_SENTINEL};

/// A partial path under exploration, linked from the current node toward
/// EOS.
struct PathLink {
    node: NodeId,
    next: Option<Rc<PathLink>>,
    /// Cost from EOS back to (and including) this node's word cost.
    backward_cost: i32,
}

struct QueueItem {
    path: Rc<PathLink>,
    /// f(x) = g(x) + h(x): backward cost so far plus the node's forward
    /// cost.
    priority: i32,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for QueueItem {}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted to make BinaryHeap a min-heap
        other.priority.cmp(&self.priority)
    }
}

/// Iterator over complete lattice paths in ascending cost order.
///
/// `budget` bounds the number of queue pops so adversarial lattices
/// terminate; exhausting it simply ends the iteration.
pub(crate) struct NBestGenerator<'a> {
    lattice: &'a Lattice,
    connector: &'a Connector,
    segmenter: &'a Segmenter,
    queue: BinaryHeap<QueueItem>,
    pops: usize,
    budget: usize,
}

impl<'a> NBestGenerator<'a> {
    pub fn new(
        lattice: &'a Lattice,
        connector: &'a Connector,
        segmenter: &'a Segmenter,
        budget: usize,
    ) -> Self {
        let mut queue = BinaryHeap::new();
        let eos = lattice.node(lattice.eos());
        if eos.cost < COST_SENTINEL {
            queue.push(QueueItem {
                priority: eos.cost,
                path: Rc::new(PathLink {
                    node: lattice.eos(),
                    next: None,
                    backward_cost: 0,
                }),
            });
        }
        Self {
            lattice,
            connector,
            segmenter,
            queue,
            pops: 0,
            budget,
        }
    }

    fn collect_path(&self, bos_path: &Rc<PathLink>) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut link = Some(Rc::clone(bos_path));
        while let Some(l) = link {
            if !self.lattice.node(l.node).is_sentinel() {
                nodes.push(l.node);
            }
            link = l.next.clone();
        }
        nodes
    }
}

impl Iterator for NBestGenerator<'_> {
    /// Node ids from BOS side to EOS side (sentinels excluded) and the
    /// total path cost.
    type Item = (Vec<NodeId>, i32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.queue.pop() {
            if self.pops >= self.budget {
                return None;
            }
            self.pops += 1;

            let current = self.lattice.node(item.path.node);
            if current.node_type == NodeType::Bos {
                return Some((self.collect_path(&item.path), item.priority));
            }

            for &left_id in self.lattice.end_nodes(current.begin) {
                let left = self.lattice.node(left_id);
                if left.cost >= COST_SENTINEL {
                    continue;
                }
                let backward_cost = item.path.backward_cost
                    + self.connector.cost(left.rid, current.lid)
                    + self.segmenter.boundary_penalty(left, current)
                    + i32::from(current.wcost);
                self.queue.push(QueueItem {
                    priority: backward_cost + left.cost,
                    path: Rc::new(PathLink {
                        node: left_id,
                        next: Some(Rc::clone(&item.path)),
                        backward_cost,
                    }),
                });
            }
        }
        None
    }
}
