//! Performance report encoder
//!
//! Wraps a performance report in an envelope carrying producer metadata and
//! the computation timestamp, and serializes it to JSON.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::performance::types::{PerformanceReport, ReportEnvelope, ReportProducer};
use crate::{PRODUCER_NAME, PULSE_VERSION};

/// Report encoder with a stable per-instance identifier
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a report in an envelope
    pub fn encode(&self, report: PerformanceReport, period: Option<NaiveDate>) -> ReportEnvelope {
        ReportEnvelope {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PULSE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            period,
            report,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        report: PerformanceReport,
        period: Option<NaiveDate>,
    ) -> Result<String, ComputeError> {
        let envelope = self.encode(report, period);
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::pipeline::evaluate_performance;
    use crate::performance::types::TimeMetrics;

    #[test]
    fn test_envelope_carries_producer_metadata() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = evaluate_performance(&TimeMetrics::new(360, 0, 0, 0)).unwrap();
        let period = NaiveDate::from_ymd_opt(2024, 3, 11);

        let json = encoder.encode_to_json(report, period).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["producer"]["instanceId"], "test-instance");
        assert_eq!(value["period"], "2024-03-11");
        assert_eq!(value["report"]["performanceGrade"], "A+");
        assert!(value["computedAtUtc"].is_string());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        assert_ne!(ReportEncoder::new().instance_id(), ReportEncoder::new().instance_id());
    }

    #[test]
    fn test_period_omitted_when_absent() {
        let encoder = ReportEncoder::new();
        let report = evaluate_performance(&TimeMetrics::new(100, 0, 0, 0)).unwrap();
        let value = serde_json::to_value(encoder.encode(report, None)).unwrap();
        assert!(value.get("period").is_none());
    }
}
