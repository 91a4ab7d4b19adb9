//! Performance pipeline orchestration
//!
//! This module provides the public API for performance scoring. It runs
//! validation → scoring → insight generation and optionally encodes the result.

use log::debug;

use crate::error::ComputeError;
use crate::performance::encoder::ReportEncoder;
use crate::performance::insights::generate_insights;
use crate::performance::scorer::PerformanceScorer;
use crate::performance::types::{PerformanceReport, TimeMetrics};

/// Score one period's time metrics (stateless)
///
/// Fails with `InvalidTimeMetrics` listing every out-of-range field, or with
/// `ZeroTotalTime` when all fields are valid but sum to zero.
pub fn evaluate_performance(metrics: &TimeMetrics) -> Result<PerformanceReport, ComputeError> {
    let scores = PerformanceScorer::score(metrics)?;
    let insights = generate_insights(&scores);
    debug!(
        "scored {} minutes: overall={} grade={}",
        scores.total_time, scores.overall_score, scores.performance_grade
    );
    Ok(PerformanceReport { scores, insights })
}

/// Convert a scoring request JSON into a report envelope JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = score_time_metrics_json(r#"{"workingTime": 420, ...}"#.to_string())?;
/// ```
pub fn score_time_metrics_json(request_json: String) -> Result<String, ComputeError> {
    let metrics = parse_time_metrics(&request_json)?;
    let report = evaluate_performance(&metrics)?;
    ReportEncoder::new().encode_to_json(report, metrics.date)
}

/// Parse a scoring request
pub fn parse_time_metrics(json: &str) -> Result<TimeMetrics, ComputeError> {
    serde_json::from_str(json).map_err(ComputeError::JsonError)
}

/// Processor that keeps one encoder identity across many reports
pub struct PerformanceProcessor {
    encoder: ReportEncoder,
    reports_generated: u64,
}

impl Default for PerformanceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceProcessor {
    pub fn new() -> Self {
        Self {
            encoder: ReportEncoder::new(),
            reports_generated: 0,
        }
    }

    /// Score a request JSON and return the encoded envelope JSON
    pub fn process(&mut self, request_json: &str) -> Result<String, ComputeError> {
        let metrics = parse_time_metrics(request_json)?;
        self.process_metrics(&metrics)
    }

    /// Score already-parsed metrics and return the encoded envelope JSON
    pub fn process_metrics(&mut self, metrics: &TimeMetrics) -> Result<String, ComputeError> {
        let report = evaluate_performance(metrics)?;
        self.reports_generated += 1;
        self.encoder.encode_to_json(report, metrics.date)
    }

    pub fn instance_id(&self) -> &str {
        self.encoder.instance_id()
    }

    /// Number of reports successfully produced by this processor
    pub fn reports_generated(&self) -> u64 {
        self.reports_generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::types::PerformanceGrade;
    use pretty_assertions::assert_eq;

    fn sample_request_json() -> &'static str {
        r#"{
            "workingTime": 240,
            "idleTime": 120,
            "absentTime": 60,
            "distractedTime": 60,
            "date": "2024-03-11"
        }"#
    }

    #[test]
    fn test_evaluate_performance() {
        let report = evaluate_performance(&TimeMetrics::new(360, 0, 0, 0)).unwrap();
        assert_eq!(report.scores.performance_grade, PerformanceGrade::APlus);
        assert_eq!(report.scores.overall_score, 100.0);
        assert!(!report.insights.is_empty());
    }

    #[test]
    fn test_score_time_metrics_json() {
        let json = score_time_metrics_json(sample_request_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        let report = &payload["report"];
        assert_eq!(report["totalTime"], 480);
        assert_eq!(report["productivityScore"], 43.13);
        assert_eq!(report["engagementScore"], 46.25);
        assert_eq!(report["efficiencyScore"], 50.0);
        assert_eq!(report["overallScore"], 45.94);
        assert_eq!(report["performanceGrade"], "F");
        assert_eq!(report["breakdown"]["working"], 50);
        assert_eq!(report["breakdown"]["absent"], 13);
        assert!(report["insights"].as_array().unwrap().len() >= 1);
        assert_eq!(payload["period"], "2024-03-11");
    }

    #[test]
    fn test_zero_total_request() {
        let json = r#"{"workingTime": 0, "idleTime": 0, "absentTime": 0, "distractedTime": 0}"#;
        let result = score_time_metrics_json(json.to_string());
        assert!(matches!(result, Err(ComputeError::ZeroTotalTime)));
    }

    #[test]
    fn test_invalid_request() {
        let json = r#"{"workingTime": -5, "idleTime": 10, "absentTime": 5, "distractedTime": 5}"#;
        let err = score_time_metrics_json(json.to_string()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Working time cannot be negative"
        );
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            score_time_metrics_json("not valid json".to_string()),
            Err(ComputeError::JsonError(_))
        ));
    }

    #[test]
    fn test_processor_counts_only_successes() {
        let mut processor = PerformanceProcessor::new();
        processor.process(sample_request_json()).unwrap();
        processor.process(sample_request_json()).unwrap();
        assert!(processor
            .process(r#"{"workingTime": 0, "idleTime": 0, "absentTime": 0, "distractedTime": 0}"#)
            .is_err());

        assert_eq!(processor.reports_generated(), 2);
    }

    #[test]
    fn test_processor_keeps_instance_id() {
        let mut processor = PerformanceProcessor::new();
        let first: serde_json::Value =
            serde_json::from_str(&processor.process(sample_request_json()).unwrap()).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&processor.process(sample_request_json()).unwrap()).unwrap();

        assert_eq!(first["producer"]["instanceId"], processor.instance_id());
        assert_eq!(first["producer"]["instanceId"], second["producer"]["instanceId"]);
        assert_eq!(first["report"], second["report"]);
    }
}
