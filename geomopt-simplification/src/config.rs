//! Serializable settings for [`ShortEdgeOp`](crate::ShortEdgeOp).

use serde::{Deserialize, Serialize};

/// Scalar and boolean settings of a short edge decimation.
///
/// Missing fields take the operator defaults, so a config file only needs
/// to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortEdgeConfig {
    /// Target fraction of the original primitive count to keep
    pub sample_ratio: f32,
    /// Error ceiling beyond which decimation stops
    pub maximum_error: f32,
    /// Longest removable edge as a fraction of the smallest bounding-box dimension
    pub max_feature: f32,
    pub max_steps: usize,
    pub min_primitives: usize,
    pub tri_strip: bool,
    pub smoothing: bool,
    pub ignore_boundaries: bool,
}

impl Default for ShortEdgeConfig {
    fn default() -> Self {
        Self {
            sample_ratio: 1.0,
            maximum_error: f32::MAX,
            max_feature: 0.1,
            max_steps: usize::MAX,
            min_primitives: 1,
            tri_strip: true,
            smoothing: true,
            ignore_boundaries: false,
        }
    }
}
