//! Generator driven by a single seriality parameter.
//!
//! Seriality 1 lays every station out in one chain; seriality 0 puts them all
//! in parallel in a single step. In between, `floor(n * s)` steps are created
//! and every station runs at `steps / n`, so the nominal capacity of each
//! layout is the same.

use clematis_core::fixed::{Fixed64, f64_to_fixed64};
use clematis_core::id::ProductionStep;

use crate::error::GeneratorError;
use crate::network::GeneratedNetwork;
use crate::steps::{ProductionLevel, StepGenerator};

#[derive(Debug, Clone, PartialEq)]
pub struct SerialityGenerator {
    pub node_count: u32,
    /// Fraction in `[0, 1]`.
    pub seriality: f64,
    pub failure_rate: Fixed64,
    pub buffer_capacity: Fixed64,
}

impl SerialityGenerator {
    /// Generator with failure rate 0.1 and unit buffers.
    pub fn new(node_count: u32, seriality: f64) -> Self {
        Self {
            node_count,
            seriality,
            failure_rate: f64_to_fixed64(0.1),
            buffer_capacity: Fixed64::ONE,
        }
    }

    /// Number of production steps: `max(1, floor(n * s))`.
    pub fn step_count(&self) -> Result<ProductionStep, GeneratorError> {
        if !(0.0..=1.0).contains(&self.seriality) {
            return Err(GeneratorError::InvalidSeriality(self.seriality));
        }
        let steps = (f64::from(self.node_count) * self.seriality).floor() as u32;
        Ok(steps.max(1))
    }

    /// The equivalent step generator: no fixed steps, constant level at
    /// `steps / n`.
    pub fn to_step_generator(&self) -> Result<StepGenerator, GeneratorError> {
        if self.node_count == 0 {
            return Err(GeneratorError::ZeroNodes);
        }
        let step_count = self.step_count()?;
        let production_rate =
            f64_to_fixed64(f64::from(step_count) / f64::from(self.node_count));
        Ok(StepGenerator {
            failure_rate: self.failure_rate,
            buffer_capacity: self.buffer_capacity,
            production_rate,
            production_level: ProductionLevel::Constant,
            ..StepGenerator::new(self.node_count, step_count)
        })
    }

    pub fn generate(&self, seed: u64) -> Result<GeneratedNetwork, GeneratorError> {
        self.to_step_generator()?.generate(seed)
    }
}
