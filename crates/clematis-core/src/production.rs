//! Production attempts for working stations.
//!
//! A working station draws once from the random source, and on success
//! moves material out of its own buffer into the least occupied successor,
//! or into the finished-goods total when it has no successors.

use crate::classify::BufferView;
use crate::fixed::Fixed64;
use crate::id::NodeId;
use crate::rng::RandomSource;
use crate::topology::Topology;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one production attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionOutcome {
    /// The draw fell at or below the failure rate. Nothing moved.
    Failed,
    /// Production succeeded. `delivered_to` is `None` for finished goods.
    Produced {
        quantity: Fixed64,
        delivered_to: Option<NodeId>,
    },
}

impl ProductionOutcome {
    /// Units produced (zero on failure).
    pub fn quantity(&self) -> Fixed64 {
        match *self {
            ProductionOutcome::Failed => Fixed64::ZERO,
            ProductionOutcome::Produced { quantity, .. } => quantity,
        }
    }

    /// Units that left the network as finished goods.
    pub fn finished_goods(&self) -> Fixed64 {
        match *self {
            ProductionOutcome::Produced {
                quantity,
                delivered_to: None,
            } => quantity,
            _ => Fixed64::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Allocation rules
// ---------------------------------------------------------------------------

/// Whether a draw counts as a failure. A zero failure rate never fails.
#[inline]
pub fn is_failure(draw: Fixed64, failure_rate: Fixed64) -> bool {
    failure_rate > Fixed64::ZERO && draw <= failure_rate
}

/// Quantity a station can produce this tick.
///
/// Capped by the station's own buffer when it consumes material, and by the
/// largest free space among its successors (not their sum).
pub fn producible_quantity(topology: &Topology, node: NodeId, levels: &[Fixed64]) -> Fixed64 {
    let mut quantity = topology.attrs(node).production_rate;

    if !topology.predecessors(node).is_empty() {
        quantity = quantity.min(levels[node.index()]);
    }

    let max_free = topology
        .successors(node)
        .iter()
        .map(|&s| {
            BufferView {
                level: levels[s.index()],
                capacity: topology.attrs(s).buffer_capacity,
            }
            .free()
        })
        .max();
    if let Some(free) = max_free {
        quantity = quantity.min(free);
    }

    quantity
}

/// The successor with the lowest buffer level. Ties go to the first in
/// successor order.
pub fn least_occupied_successor(
    topology: &Topology,
    node: NodeId,
    levels: &[Fixed64],
) -> Option<NodeId> {
    let mut best: Option<NodeId> = None;
    for &s in topology.successors(node) {
        match best {
            Some(b) if levels[s.index()] >= levels[b.index()] => {}
            _ => best = Some(s),
        }
    }
    best
}

/// Run one production attempt for a station already classified working.
///
/// Consumes exactly one draw. On success the station's buffer is reduced by
/// the produced quantity (if it has predecessors) and the chosen successor's
/// buffer is raised, clamped at its capacity.
pub fn attempt_production<R: RandomSource + ?Sized>(
    topology: &Topology,
    node: NodeId,
    levels: &mut [Fixed64],
    rng: &mut R,
) -> ProductionOutcome {
    let draw = rng.next_uniform();
    if is_failure(draw, topology.attrs(node).failure_rate) {
        return ProductionOutcome::Failed;
    }

    let quantity = producible_quantity(topology, node, levels);

    if !topology.predecessors(node).is_empty() {
        levels[node.index()] -= quantity;
    }

    let delivered_to = least_occupied_successor(topology, node, levels);
    if let Some(dest) = delivered_to {
        let capacity = topology.attrs(dest).buffer_capacity;
        let level = &mut levels[dest.index()];
        *level = level.saturating_add(quantity).min(capacity);
    }

    ProductionOutcome::Produced {
        quantity,
        delivered_to,
    }
}
