//! Per-tick reporting: the value returned to callers and the optional
//! record stream written to a sink.

use crate::classify::{NodeState, StepAggregate};
use crate::fixed::{Fixed64, Ticks, fixed64_to_f64};
use std::io::Write;

/// Header line written once before the first record.
pub const CSV_HEADER: &str = "time,starved,blocked,working";

// ---------------------------------------------------------------------------
// Counts and reports
// ---------------------------------------------------------------------------

/// Number of stations in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateCounts {
    pub starved: u32,
    pub blocked: u32,
    pub working: u32,
}

impl StateCounts {
    pub fn add(&mut self, state: NodeState) {
        match state {
            NodeState::Starved => self.starved += 1,
            NodeState::Blocked => self.blocked += 1,
            NodeState::Working => self.working += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.starved + self.blocked + self.working
    }
}

/// What one tick returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TickReport {
    /// Tick number, 1 for the first tick.
    pub tick: Ticks,
    /// Finished goods produced by sink stations this tick.
    pub total_production: Fixed64,
    pub counts: StateCounts,
    /// Stations whose classification differs from the previous tick.
    pub changed_state: u32,
    pub step_aggregate: StepAggregate,
}

impl TickReport {
    /// The externally visible per-tick record.
    pub fn record(&self) -> TickRecord {
        TickRecord {
            tick: self.tick,
            starved: self.counts.starved,
            blocked: self.counts.blocked,
            working: self.counts.working,
        }
    }

    pub fn total_production_f64(&self) -> f64 {
        fixed64_to_f64(self.total_production)
    }
}

/// One line of the per-tick record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TickRecord {
    pub tick: Ticks,
    pub starved: u32,
    pub blocked: u32,
    pub working: u32,
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Errors raised while writing tick records.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write tick record: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for per-tick records.
pub trait TickSink {
    /// Called once, before the first record, when the engine is at tick 0.
    fn write_header(&mut self) -> Result<(), SinkError>;

    fn write_record(&mut self, record: &TickRecord) -> Result<(), SinkError>;
}

/// Writes records as CSV lines: `time,starved,blocked,working`.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TickSink for CsvSink<W> {
    fn write_header(&mut self) -> Result<(), SinkError> {
        writeln!(self.out, "{CSV_HEADER}")?;
        Ok(())
    }

    fn write_record(&mut self, record: &TickRecord) -> Result<(), SinkError> {
        writeln!(
            self.out,
            "{},{},{},{}",
            record.tick, record.starved, record.blocked, record.working
        )?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub headers_written: usize,
    pub records: Vec<TickRecord>,
}

impl TickSink for VecSink {
    fn write_header(&mut self) -> Result<(), SinkError> {
        self.headers_written += 1;
        Ok(())
    }

    fn write_record(&mut self, record: &TickRecord) -> Result<(), SinkError> {
        self.records.push(*record);
        Ok(())
    }
}
