//! Production network generators for Clematis.
//!
//! Both generators lay stations out in production steps and connect every
//! station of a step to every station of the next one:
//!
//! - [`SerialityGenerator`] derives the number of steps from a seriality
//!   fraction in `[0, 1]`.
//! - [`StepGenerator`] takes the number of steps directly, optionally fixes
//!   the size of the first and last steps, and shapes production rates with a
//!   [`ProductionLevel`].
//!
//! Generation is seeded, so the same parameters and seed always give the same
//! network.
//!
//! ```rust
//! use clematis_gen::SerialityGenerator;
//!
//! let network = SerialityGenerator::new(10, 0.5).generate(42).unwrap();
//! assert_eq!(network.step_count(), 5);
//! assert_eq!(network.topology.node_count(), 10);
//! ```

pub mod error;
pub mod network;
pub mod seriality;
pub mod steps;

pub use error::GeneratorError;
pub use network::GeneratedNetwork;
pub use seriality::SerialityGenerator;
pub use steps::{ProductionLevel, StepGenerator};
