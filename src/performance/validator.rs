//! Time metrics validation
//!
//! Range-checks an accumulated time record before scoring. Every violation is
//! collected rather than failing on the first one. A record that passes the
//! range checks but sums to zero is rejected separately.

use log::warn;

use crate::error::ComputeError;
use crate::performance::types::{TimeMetrics, MAX_MINUTES_PER_DAY};

/// Validator for time metrics
pub struct TimeMetricsValidator;

impl TimeMetricsValidator {
    /// Validate `metrics` and return the total minutes
    pub fn validate(metrics: &TimeMetrics) -> Result<i64, ComputeError> {
        let violations = Self::violations(metrics);
        if !violations.is_empty() {
            warn!("time metrics rejected: {}", violations.join(", "));
            return Err(ComputeError::InvalidTimeMetrics(violations));
        }

        let total = metrics.total();
        if total == 0 {
            warn!("time metrics rejected: zero total time");
            return Err(ComputeError::ZeroTotalTime);
        }

        Ok(total)
    }

    /// Every range violation, in field order
    pub fn violations(metrics: &TimeMetrics) -> Vec<String> {
        let fields = [
            ("Working", metrics.working_time),
            ("Idle", metrics.idle_time),
            ("Absent", metrics.absent_time),
            ("Distracted", metrics.distracted_time),
        ];

        let mut violations = Vec::new();
        for (name, minutes) in fields {
            if minutes < 0 {
                violations.push(format!("{name} time cannot be negative"));
            }
            if minutes > MAX_MINUTES_PER_DAY {
                violations.push(format!(
                    "{name} time cannot exceed {MAX_MINUTES_PER_DAY} minutes (24 hours)"
                ));
            }
        }
        violations
    }
}
