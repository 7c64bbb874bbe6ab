//! Generator for a network with a given number of production steps.
//!
//! Every step receives one station (or a fixed number for the first and last
//! steps), then the remaining stations are scattered uniformly over the steps
//! that are not fixed. Production rates follow a [`ProductionLevel`] profile.

use clematis_core::fixed::{Fixed64, f64_to_fixed64};
use clematis_core::id::ProductionStep;
use clematis_core::rng::SimRng;
use clematis_core::topology::NodeAttributes;

use crate::error::GeneratorError;
use crate::network::{GeneratedNetwork, assemble};

/// How the base production rate is distributed over steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProductionLevel {
    /// Every station produces at the base rate.
    Constant,
    /// Every step produces at the base rate in total, split evenly among its
    /// stations.
    Uniform,
    /// Step capacity falls linearly from `rate * (1 + delta)` at the first
    /// step to `rate` at the last, split evenly among each step's stations.
    Decrescent { delta: Fixed64 },
}

/// Parameters for [`StepGenerator::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepGenerator {
    pub node_count: u32,
    pub step_count: ProductionStep,
    /// Fixed number of stations in the first step.
    pub first_step_machines: Option<u32>,
    /// Fixed number of stations in the last step.
    pub last_step_machines: Option<u32>,
    pub failure_rate: Fixed64,
    pub buffer_capacity: Fixed64,
    pub production_rate: Fixed64,
    pub production_level: ProductionLevel,
}

impl StepGenerator {
    /// Generator with failure rate 0.1, unit buffers, unit production rate and
    /// a constant production level.
    pub fn new(node_count: u32, step_count: ProductionStep) -> Self {
        Self {
            node_count,
            step_count,
            first_step_machines: None,
            last_step_machines: None,
            failure_rate: f64_to_fixed64(0.1),
            buffer_capacity: Fixed64::ONE,
            production_rate: Fixed64::ONE,
            production_level: ProductionLevel::Constant,
        }
    }

    /// Stations a step receives before scattering.
    fn seeded_machines(&self, step: ProductionStep) -> u32 {
        let first = self.first_step_machines.filter(|_| step == 0);
        let last = self
            .last_step_machines
            .filter(|_| step == self.step_count - 1);
        first.or(last).unwrap_or(1)
    }

    /// Half-open range of steps that accept scattered stations.
    fn scatter_range(&self) -> (ProductionStep, ProductionStep) {
        let low = u32::from(self.first_step_machines.is_some());
        let high = if self.last_step_machines.is_some() {
            self.step_count - 1
        } else {
            self.step_count
        };
        (low, high)
    }

    fn validate(&self) -> Result<(), GeneratorError> {
        if self.node_count == 0 {
            return Err(GeneratorError::ZeroNodes);
        }
        if self.step_count == 0 {
            return Err(GeneratorError::ZeroSteps);
        }
        if self.first_step_machines == Some(0) {
            return Err(GeneratorError::EmptyFixedStep { step: 0 });
        }
        if self.last_step_machines == Some(0) {
            return Err(GeneratorError::EmptyFixedStep {
                step: self.step_count - 1,
            });
        }
        if matches!(self.production_level, ProductionLevel::Decrescent { .. })
            && self.step_count < 2
        {
            return Err(GeneratorError::DecrescentNeedsMultipleSteps);
        }
        Ok(())
    }

    /// Assign every station to a step. Entry `i` is the step of station `i`.
    fn assign_steps(&self, rng: &mut SimRng) -> Result<Vec<ProductionStep>, GeneratorError> {
        let required: u64 = (0..self.step_count)
            .map(|step| u64::from(self.seeded_machines(step)))
            .sum();
        if required > u64::from(self.node_count) {
            return Err(GeneratorError::NotEnoughNodes {
                required,
                available: self.node_count,
            });
        }

        let mut assignment = Vec::with_capacity(self.node_count as usize);
        for step in 0..self.step_count {
            let machines = self.seeded_machines(step) as usize;
            assignment.extend(std::iter::repeat_n(step, machines));
        }

        let remaining = self.node_count - required as u32;
        if remaining == 0 {
            return Ok(assignment);
        }
        let (low, high) = self.scatter_range();
        if low >= high {
            return Err(GeneratorError::NoScatterTarget { remaining });
        }
        for _ in 0..remaining {
            assignment.push(low + rng.next_below(high - low));
        }
        Ok(assignment)
    }

    /// Per-station production rate for a step holding `machines` stations.
    fn step_rate(&self, step: ProductionStep, machines: usize) -> Fixed64 {
        let machines = machines.max(1) as i64;
        match self.production_level {
            ProductionLevel::Constant => self.production_rate,
            ProductionLevel::Uniform => self.production_rate / machines,
            ProductionLevel::Decrescent { delta } => {
                let base = self.production_rate.saturating_mul(Fixed64::ONE + delta);
                let drop = base - self.production_rate;
                let last = i64::from(self.step_count - 1);
                let rate = base - drop * i64::from(step) / last;
                rate / machines
            }
        }
    }

    /// Generate a network, scattering stations with a [`SimRng`] seeded by
    /// `seed`.
    pub fn generate(&self, seed: u64) -> Result<GeneratedNetwork, GeneratorError> {
        self.validate()?;
        let mut rng = SimRng::new(seed);
        let assignment = self.assign_steps(&mut rng)?;

        let mut machines = vec![0usize; self.step_count as usize];
        for &step in &assignment {
            machines[step as usize] += 1;
        }
        log::debug!("stations per step: {machines:?}");

        assemble(&assignment, self.step_count, |step| {
            NodeAttributes::new(
                self.step_rate(step, machines[step as usize]),
                self.failure_rate,
                self.buffer_capacity,
                step,
            )
        })
    }
}
