//! Statistics reported by a decimation run.

use std::fmt;

/// Why a decimation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The continuation policy (default rule or callback) declined the next step.
    PolicyHalted,
    /// The configured step limit was reached.
    MaxSteps,
    /// The remaining primitive count reached the configured floor.
    MinPrimitives,
    /// No eligible short edge was left.
    NoCandidates,
    /// The mesh had no primitives or no measurable extent.
    NothingToDo,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::PolicyHalted => "continuation policy halted",
            StopReason::MaxSteps => "step limit reached",
            StopReason::MinPrimitives => "primitive floor reached",
            StopReason::NoCandidates => "no short edges left",
            StopReason::NothingToDo => "nothing to decimate",
        };
        f.write_str(s)
    }
}

/// Result of one `decimate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimationStats {
    /// Primitive count before decimation.
    pub original_primitives: usize,
    /// Primitive count after decimation.
    pub final_primitives: usize,
    /// Candidate steps evaluated against the continuation policy.
    pub steps: usize,
    /// Edge collapses performed.
    pub collapses_performed: usize,
    /// Candidates rejected by topology, flip or floor checks.
    pub collapses_rejected: usize,
    /// Longest edge length eligible for removal.
    pub feature_length: f32,
    /// Error of the last step handed to the continuation policy.
    pub last_error: Option<f32>,
    pub stop_reason: StopReason,
}

impl DecimationStats {
    pub(crate) fn new(original_primitives: usize) -> Self {
        Self {
            original_primitives,
            final_primitives: original_primitives,
            steps: 0,
            collapses_performed: 0,
            collapses_rejected: 0,
            feature_length: 0.0,
            last_error: None,
            stop_reason: StopReason::NothingToDo,
        }
    }

    /// Fraction of primitives kept (final / original).
    pub fn retained_ratio(&self) -> f64 {
        if self.original_primitives == 0 {
            1.0
        } else {
            self.final_primitives as f64 / self.original_primitives as f64
        }
    }

    pub fn was_decimated(&self) -> bool {
        self.collapses_performed > 0
    }
}

impl fmt::Display for DecimationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} primitives ({:.1}% kept, {} collapses, {} rejected; {})",
            self.original_primitives,
            self.final_primitives,
            self.retained_ratio() * 100.0,
            self.collapses_performed,
            self.collapses_rejected,
            self.stop_reason
        )
    }
}
