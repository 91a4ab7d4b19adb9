//! WorkPulse - On-device activity classification and workplace performance scoring
//!
//! WorkPulse turns camera-derived body, hand and face landmarks into a stable
//! per-frame activity label, and turns accumulated per-activity minutes into
//! performance scores, a grade and rule-based insights.
//!
//! ## Modules
//!
//! - **Activity**: landmark frame → confidence estimation → temporal smoothing
//!   → stability gate → activity label, one session per tracked subject
//! - **Performance**: time metrics → validation → scoring → insights → report

pub mod activity;
pub mod error;
pub mod performance;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;

// Activity exports
pub use activity::{
    ActivityCategory, ActivityClassifier, ClassificationOutput, ClassifiedActivity,
    ClassifierConfig, ConfidenceVector, Landmark, LandmarkFrame,
};

// Performance exports
pub use performance::{
    evaluate_performance, score_time_metrics_json, PerformanceGrade, PerformanceProcessor,
    PerformanceReport, PerformanceScores, TimeMetrics,
};

/// WorkPulse version embedded in all reports
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "workpulse";
