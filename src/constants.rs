//! Numerical constants shared across the crate.

/// Two floating-point values closer than this are treated as equal.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

/// Cascade stages whose combination coefficient falls below this cutoff
/// are excluded from the aggregated exploration distribution.
pub const COEFFICIENT_CUTOFF: f64 = 0.01;

/// Edges are clipped into `[-1 + EDGE_CLIP, 1 - EDGE_CLIP]`
/// before computing a confidence weight,
/// so a perfect hypothesis does not produce an infinite weight.
pub const EDGE_CLIP: f64 = 1e-9;

/// The minimal number of usable rollout rows to train a policy stage.
/// A generated batch at most this size is skipped with a warning.
pub const MIN_ROLLOUT_ROWS: usize = 2;
