//! Per-tick station classification and the per-step summary.
//!
//! [`classify`] is a pure function of the buffer snapshot the engine hands
//! it. The snapshot may already contain deliveries from nodes visited
//! earlier in the same tick.

use crate::fixed::Fixed64;
use crate::id::ProductionStep;

// ---------------------------------------------------------------------------
// Node state
// ---------------------------------------------------------------------------

/// Classification of a station for one tick.
///
/// The discriminants are the numeric codes used in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum NodeState {
    /// Has predecessors but no material in its buffer.
    Starved = 0,
    /// Has successors and every one of them is full.
    Blocked = 1,
    /// Eligible to attempt production (the attempt may still fail).
    Working = 2,
}

impl NodeState {
    /// Numeric report code: 0 starved, 1 blocked, 2 working.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeState::Starved => "starved",
            NodeState::Blocked => "blocked",
            NodeState::Working => "working",
        }
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Buffer level and capacity of a neighbouring station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferView {
    pub level: Fixed64,
    pub capacity: Fixed64,
}

impl BufferView {
    pub fn is_full(&self) -> bool {
        self.level >= self.capacity
    }

    /// Free space left in the buffer, never negative.
    pub fn free(&self) -> Fixed64 {
        (self.capacity - self.level).max(Fixed64::ZERO)
    }
}

/// Classify a station.
///
/// Precedence: blocked (every successor full) is checked first, so a station
/// with an empty buffer can still be blocked. Stations without predecessors
/// draw from an unlimited supply and are never starved.
pub fn classify(
    own_level: Fixed64,
    has_predecessors: bool,
    successors: impl IntoIterator<Item = BufferView>,
) -> NodeState {
    let mut any_successor = false;
    let mut all_full = true;
    for view in successors {
        any_successor = true;
        if !view.is_full() {
            all_full = false;
            break;
        }
    }

    if any_successor && all_full {
        NodeState::Blocked
    } else if !has_predecessors {
        NodeState::Working
    } else if own_level == Fixed64::ZERO {
        NodeState::Starved
    } else {
        NodeState::Working
    }
}

// ---------------------------------------------------------------------------
// Step aggregate
// ---------------------------------------------------------------------------

/// One summarized state per production step, rebuilt every tick.
///
/// Entries start as `Working`. A blocked station downgrades its step to
/// `Blocked` only while the step is still `Working`; a starved station
/// downgrades it to `Starved` unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepAggregate {
    steps: Vec<NodeState>,
}

impl StepAggregate {
    pub fn new(step_count: usize) -> Self {
        Self {
            steps: vec![NodeState::Working; step_count],
        }
    }

    /// Fold one station's state into its step.
    pub fn observe(&mut self, step: ProductionStep, state: NodeState) {
        let Some(entry) = self.steps.get_mut(step as usize) else {
            return;
        };
        match state {
            NodeState::Starved => *entry = NodeState::Starved,
            NodeState::Blocked if *entry == NodeState::Working => *entry = NodeState::Blocked,
            _ => {}
        }
    }

    pub fn get(&self, step: ProductionStep) -> Option<NodeState> {
        self.steps.get(step as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn as_slice(&self) -> &[NodeState] {
        &self.steps
    }

    /// Numeric codes, one per step.
    pub fn codes(&self) -> Vec<u8> {
        self.steps.iter().map(|s| s.code()).collect()
    }
}
