//! Performance scoring module
//!
//! Validates an accumulated time record and derives productivity, engagement
//! and efficiency scores, an overall score, a grade and rule-based insights.
//!
//! Pipeline: TimeMetrics → Validator → Scorer → Insights → Encoder → Report JSON

pub mod encoder;
pub mod insights;
pub mod pipeline;
pub mod scorer;
pub mod types;
pub mod validator;

pub use encoder::ReportEncoder;
pub use insights::generate_insights;
pub use pipeline::{evaluate_performance, score_time_metrics_json, PerformanceProcessor};
pub use scorer::PerformanceScorer;
pub use types::{
    Breakdown, PerformanceGrade, PerformanceReport, PerformanceScores, ReportEnvelope,
    ReportProducer, TimeMetrics,
};
pub use validator::TimeMetricsValidator;
