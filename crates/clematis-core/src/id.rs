use serde::{Deserialize, Serialize};

/// Identifies a work station in a topology.
///
/// Ids are dense and assigned in insertion order, so a `NodeId` doubles as
/// an index into per-node storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The id as a storage index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A production step (stage index). Step 0 is the first stage.
pub type ProductionStep = u32;
