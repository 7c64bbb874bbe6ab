//! The simulation clock and the digest used to compare two runs.

use std::hash::Hasher;

use crate::classify::NodeState;
use crate::fixed::{Fixed64, Ticks};

/// Clock owned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Completed ticks. Grows by exactly 1 per step.
    pub tick: Ticks,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True before the first tick has run.
    pub fn is_initial(&self) -> bool {
        self.tick == 0
    }

    /// Move the clock forward one tick and return the new tick number.
    pub fn advance(&mut self) -> Ticks {
        self.tick += 1;
        self.tick
    }
}

/// 64-bit FNV-1a digest of engine state. Deterministic across platforms,
/// not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDigest {
    value: u64,
}

const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0100_0000_01b3;

impl StateDigest {
    pub fn new() -> Self {
        Self {
            value: OFFSET_BASIS,
        }
    }

    /// Fold in one station: its exact buffer level, then its state code.
    pub fn station(&mut self, level: Fixed64, state: NodeState) {
        self.write_i64(level.to_bits());
        self.write_u8(state.code());
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl Default for StateDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for StateDigest {
    fn write(&mut self, bytes: &[u8]) {
        self.value = bytes.iter().fold(self.value, |acc, &byte| {
            (acc ^ u64::from(byte)).wrapping_mul(PRIME)
        });
    }

    // Fixed little-endian encoding so digests agree across platforms.
    fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.write(&v.to_le_bytes());
    }

    fn finish(&self) -> u64 {
        self.value
    }
}
