//! Performance scoring data types
//!
//! This module defines the accumulated time record handed in by the
//! time-bucketing collaborator and the scores, grade and report derived from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum minutes in one reporting day
pub const MAX_MINUTES_PER_DAY: i64 = 1440;

/// Accumulated minutes per activity bucket for one reporting period
///
/// Fields are signed so that malformed input can be reported by the validator
/// instead of failing to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMetrics {
    pub working_time: i64,
    pub idle_time: i64,
    pub absent_time: i64,
    pub distracted_time: i64,
    /// Day the minutes were accumulated for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl TimeMetrics {
    pub fn new(working_time: i64, idle_time: i64, absent_time: i64, distracted_time: i64) -> Self {
        Self {
            working_time,
            idle_time,
            absent_time,
            distracted_time,
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sum of all four buckets, saturating at the `i64` bounds
    pub fn total(&self) -> i64 {
        self.working_time
            .saturating_add(self.idle_time)
            .saturating_add(self.absent_time)
            .saturating_add(self.distracted_time)
    }
}

/// Letter grade derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl PerformanceGrade {
    /// Thresholds are checked highest first; the first match wins
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 95.0 {
            PerformanceGrade::APlus
        } else if overall >= 90.0 {
            PerformanceGrade::A
        } else if overall >= 80.0 {
            PerformanceGrade::B
        } else if overall >= 70.0 {
            PerformanceGrade::C
        } else if overall >= 60.0 {
            PerformanceGrade::D
        } else {
            PerformanceGrade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceGrade::APlus => "A+",
            PerformanceGrade::A => "A",
            PerformanceGrade::B => "B",
            PerformanceGrade::C => "C",
            PerformanceGrade::D => "D",
            PerformanceGrade::F => "F",
        }
    }
}

impl std::fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of total time per bucket, each rounded on its own
///
/// The four values need not sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub working: u32,
    pub idle: u32,
    pub absent: u32,
    pub distracted: u32,
}

/// Scores derived from one period's time metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceScores {
    pub total_time: i64,
    pub productivity_score: f64,
    pub engagement_score: f64,
    pub efficiency_score: f64,
    pub overall_score: f64,
    pub performance_grade: PerformanceGrade,
    pub breakdown: Breakdown,
}

/// Scores plus the rule-based observations generated from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    #[serde(flatten)]
    pub scores: PerformanceScores,
    pub insights: Vec<String>,
}

/// Producer metadata attached to encoded reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Encoded report as handed to the dashboard layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvelope {
    pub producer: ReportProducer,
    /// When the report was computed (RFC3339)
    pub computed_at_utc: String,
    /// Day the metrics cover, when the request named one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<NaiveDate>,
    pub report: PerformanceReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_metrics_deserialization() {
        let json = r#"{
            "workingTime": 240,
            "idleTime": 120,
            "absentTime": 60,
            "distractedTime": 60,
            "date": "2024-03-11"
        }"#;

        let metrics: TimeMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.working_time, 240);
        assert_eq!(metrics.total(), 480);
        assert_eq!(metrics.date, NaiveDate::from_ymd_opt(2024, 3, 11));
    }

    #[test]
    fn test_negative_minutes_deserialize() {
        let json = r#"{"workingTime": -5, "idleTime": 10, "absentTime": 5, "distractedTime": 5}"#;
        let metrics: TimeMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.working_time, -5);
        assert_eq!(metrics.date, None);
    }

    #[test]
    fn test_total_saturates_on_extreme_values() {
        assert_eq!(TimeMetrics::new(i64::MAX, 1, 0, 0).total(), i64::MAX);
        assert_eq!(TimeMetrics::new(i64::MIN, -1, 0, 0).total(), i64::MIN);
        assert_eq!(TimeMetrics::new(240, 120, 60, 60).total(), 480);
    }

    #[test]
    fn test_grade_serialization() {
        assert_eq!(serde_json::to_string(&PerformanceGrade::APlus).unwrap(), "\"A+\"");
        let parsed: PerformanceGrade = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(parsed, PerformanceGrade::C);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(PerformanceGrade::from_overall(95.0), PerformanceGrade::APlus);
        assert_eq!(PerformanceGrade::from_overall(94.99), PerformanceGrade::A);
        assert_eq!(PerformanceGrade::from_overall(90.0), PerformanceGrade::A);
        assert_eq!(PerformanceGrade::from_overall(80.0), PerformanceGrade::B);
        assert_eq!(PerformanceGrade::from_overall(70.0), PerformanceGrade::C);
        assert_eq!(PerformanceGrade::from_overall(60.0), PerformanceGrade::D);
        assert_eq!(PerformanceGrade::from_overall(59.99), PerformanceGrade::F);
        assert_eq!(PerformanceGrade::from_overall(0.0), PerformanceGrade::F);
    }
}
