//! Clematis Core -- a discrete-time simulator for material flow through
//! acyclic manufacturing networks.
//!
//! Work stations produce at a fixed rate, fail stochastically, and hold a
//! bounded input buffer. The engine shows how starvation and blocking
//! propagate through serial and parallel factory layouts.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] visits every station once, in the
//! topological order cached by the [`topology::Topology`]:
//!
//! 1. **Classify** -- blocked, then source exemption, then starved, else working.
//! 2. **Aggregate** -- update state counts and the per-step summary.
//! 3. **Produce** -- working stations draw from the random source and move
//!    material into their least occupied successor (or out as finished goods).
//!
//! ```rust
//! use clematis_core::engine::Engine;
//! use clematis_core::fixed::Fixed64;
//! use clematis_core::topology::{NodeAttributes, TopologyBuilder};
//!
//! let one = Fixed64::from_num(1);
//! let mut builder = TopologyBuilder::new();
//! let src = builder.add_node(NodeAttributes::new(one, Fixed64::ZERO, one, 0));
//! let sink = builder.add_node(NodeAttributes::new(one, Fixed64::ZERO, one, 1));
//! builder.connect(src, sink);
//!
//! let mut engine = Engine::new(builder.build().unwrap(), 42);
//! let report = engine.step();
//! assert_eq!(report.total_production, one);
//! ```
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Owns per-station state and the random source.
//! - [`topology::Topology`] -- Immutable attributed DAG with cached order.
//! - [`classify::NodeState`] -- Starved, Blocked or Working.
//! - [`report::TickReport`] -- Per-tick production, counts and step summary.
//! - [`rng::RandomSource`] -- Uniform draws in `[0, 1)`; [`rng::SimRng`] by default.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod classify;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod engine;
pub mod fixed;
pub mod id;
pub mod production;
pub mod query;
pub mod replicate;
pub mod report;
pub mod rng;
pub mod sim;
pub mod topology;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
