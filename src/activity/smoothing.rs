//! Temporal smoothing of confidence vectors
//!
//! Exponential decay: `smoothed[c] = smoothed[c] * (1 - factor) + raw[c] * factor`,
//! applied to every category on every classified frame. Categories that score 0
//! this frame decay toward 0 rather than being skipped.

use crate::activity::types::{ActivityCategory, ConfidenceVector};

/// Blend `raw` into `state` and return the new state
pub fn smooth_step(
    state: &ConfidenceVector,
    raw: &ConfidenceVector,
    factor: f64,
) -> ConfidenceVector {
    let mut next = ConfidenceVector::default();
    for category in ActivityCategory::ALL {
        let blended = state.get(category) * (1.0 - factor) + raw.get(category) * factor;
        next.set(category, blended);
    }
    next
}
