//! Real-time activity classification module
//!
//! Turns a stream of landmark frames into a stable activity label per frame.
//!
//! Pipeline: LandmarkFrame → ConfidenceEstimator → smooth_step → gate_step → ClassifiedActivity

pub mod classifier;
pub mod confidence;
pub mod geometry;
pub mod smoothing;
pub mod stability;
pub mod types;

pub use classifier::ActivityClassifier;
pub use confidence::{ConfidenceEstimator, MotionSnapshot, SubScores};
pub use smoothing::smooth_step;
pub use stability::{gate_step, ActivityHistory, GateDecision, StabilityState};
pub use types::{
    ActivityCategory, ClassificationOutput, ClassifiedActivity, ClassifierConfig,
    ConfidenceVector, Landmark, LandmarkFrame,
};
