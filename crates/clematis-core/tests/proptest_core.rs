//! Property-based tests for the Clematis core engine.
//!
//! Uses proptest to generate random attributed DAGs, then verifies the
//! structural invariants hold on every tick.

use clematis_core::classify::NodeState;
use clematis_core::engine::Engine;
use clematis_core::fixed::Fixed64;
use clematis_core::id::NodeId;
use clematis_core::test_utils::*;
use clematis_core::topology::{NodeAttributes, Topology, TopologyBuilder};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Attributes on a quarter-unit grid so arithmetic stays exact.
fn arb_attributes() -> impl Strategy<Value = NodeAttributes> {
    (0..=12u32, 0..=4u32, 1..=16u32, 0..4u32).prop_map(|(rate, failure, cap, step)| {
        NodeAttributes::new(
            Fixed64::from_num(rate) / 4,
            Fixed64::from_num(failure) / 4,
            Fixed64::from_num(cap) / 4,
            step,
        )
    })
}

/// A random DAG: edges only run from lower to higher ids.
fn arb_topology(max_nodes: usize) -> impl Strategy<Value = Topology> {
    (1..=max_nodes).prop_flat_map(|n| {
        (
            proptest::collection::vec(arb_attributes(), n),
            proptest::collection::vec((0..n, 0..n), 0..=n * 2),
        )
            .prop_map(|(nodes, pairs)| {
                let mut builder = TopologyBuilder::new();
                for attrs in nodes {
                    builder.add_node(attrs);
                }
                for (a, b) in pairs {
                    if a < b {
                        builder.connect(NodeId(a as u32), NodeId(b as u32));
                    }
                }
                builder.build().expect("forward edges cannot form a cycle")
            })
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every buffer stays within [0, capacity] after every tick.
    #[test]
    fn buffers_stay_in_bounds(topo in arb_topology(12), seed in any::<u64>()) {
        let mut engine = Engine::new(topo.clone(), seed);
        for _ in 0..40 {
            engine.step();
            for (id, attrs) in topo.nodes() {
                let level = engine.buffer_level(id).unwrap();
                prop_assert!(level >= Fixed64::ZERO, "{id} below zero: {level}");
                prop_assert!(level <= attrs.buffer_capacity, "{id} over capacity: {level}");
            }
        }
    }

    /// Every edge source precedes its destination in the visitation order.
    #[test]
    fn order_respects_edges(topo in arb_topology(16)) {
        let order = topo.topological_order();
        prop_assert_eq!(order.len(), topo.node_count());
        let mut position = vec![0usize; topo.node_count()];
        for (pos, id) in order.iter().enumerate() {
            position[id.index()] = pos;
        }
        for (from, to) in topo.edges() {
            prop_assert!(position[from.index()] < position[to.index()]);
        }
    }

    /// Counts cover every station and the step summary has one entry per step.
    #[test]
    fn counts_cover_all_stations(topo in arb_topology(12), seed in any::<u64>()) {
        let mut engine = Engine::new(topo.clone(), seed);
        for _ in 0..20 {
            let report = engine.step();
            prop_assert_eq!(report.counts.total() as usize, topo.node_count());
            prop_assert_eq!(report.step_aggregate.len(), topo.step_count());
        }
    }

    /// Exactly one draw per working station per tick.
    #[test]
    fn one_draw_per_working_station(topo in arb_topology(12)) {
        let mut engine = Engine::with_rng(topo, ScriptedRng::new(&[0.1, 0.6, 0.35, 0.9]));
        let mut expected = 0usize;
        for _ in 0..20 {
            let report = engine.step();
            expected += report.counts.working as usize;
            prop_assert_eq!(engine.rng().draws_taken(), expected);
        }
    }

    /// Stations without predecessors are never starved.
    #[test]
    fn sources_never_starved(topo in arb_topology(12), seed in any::<u64>()) {
        let mut engine = Engine::new(topo.clone(), seed);
        for _ in 0..20 {
            engine.step();
            for (id, _) in topo.nodes() {
                if topo.predecessors(id).is_empty() {
                    prop_assert_ne!(engine.node_state(id), Some(NodeState::Starved));
                }
            }
        }
    }

    /// Same topology and seed give identical report sequences.
    #[test]
    fn same_seed_same_reports(topo in arb_topology(10), seed in any::<u64>()) {
        let mut a = Engine::new(topo.clone(), seed);
        let mut b = Engine::new(topo, seed);
        for _ in 0..30 {
            prop_assert_eq!(a.step(), b.step());
        }
        prop_assert_eq!(a.state_hash(), b.state_hash());
    }
}
