//! Performance score derivation
//!
//! Turns validated time metrics into productivity, engagement and efficiency
//! sub-scores, a weighted overall score, a letter grade and a percentage
//! breakdown. All clamping is silent saturation.

use crate::error::ComputeError;
use crate::performance::types::{
    Breakdown, PerformanceGrade, PerformanceScores, TimeMetrics,
};
use crate::performance::validator::TimeMetricsValidator;

/// Working ratio above which engagement earns a bonus
const ENGAGEMENT_BONUS_RATIO: f64 = 0.7;
const ENGAGEMENT_BONUS: f64 = 5.0;

/// Working and total windows (minutes) that earn the efficiency bonus
const EFFICIENCY_BONUS_WORKING: (i64, i64) = (360, 480);
const EFFICIENCY_BONUS_TOTAL: (i64, i64) = (480, 600);
const EFFICIENCY_BONUS: f64 = 10.0;

/// Scorer for time metrics
pub struct PerformanceScorer;

impl PerformanceScorer {
    /// Validate `metrics`, then score them
    pub fn score(metrics: &TimeMetrics) -> Result<PerformanceScores, ComputeError> {
        let total = TimeMetricsValidator::validate(metrics)?;
        Ok(compute_scores(metrics, total))
    }
}

/// Score metrics whose `total` has already been validated as positive
fn compute_scores(metrics: &TimeMetrics, total: i64) -> PerformanceScores {
    let total_f = total as f64;
    let working_ratio = metrics.working_time as f64 / total_f;
    let idle_ratio = metrics.idle_time as f64 / total_f;
    let absent_ratio = metrics.absent_time as f64 / total_f;
    let distracted_ratio = metrics.distracted_time as f64 / total_f;

    let productivity = round2(compute_productivity(working_ratio, idle_ratio, absent_ratio));
    let engagement = round2(compute_engagement(working_ratio, distracted_ratio));
    let efficiency = round2(compute_efficiency(metrics, total));

    let overall = compute_overall(productivity, engagement, efficiency);

    PerformanceScores {
        total_time: total,
        productivity_score: productivity,
        engagement_score: engagement,
        efficiency_score: efficiency,
        overall_score: overall,
        performance_grade: PerformanceGrade::from_overall(overall),
        breakdown: Breakdown {
            working: percentage(metrics.working_time, total),
            idle: percentage(metrics.idle_time, total),
            absent: percentage(metrics.absent_time, total),
            distracted: percentage(metrics.distracted_time, total),
        },
    }
}

/// Formula: `100 * working - 15 * idle - 25 * absent` (ratios of total)
fn compute_productivity(working_ratio: f64, idle_ratio: f64, absent_ratio: f64) -> f64 {
    clamp_score(100.0 * working_ratio - 15.0 * idle_ratio - 25.0 * absent_ratio)
}

/// Formula: `100 * working - 30 * distracted`, plus 5 when working exceeds 70%
fn compute_engagement(working_ratio: f64, distracted_ratio: f64) -> f64 {
    let bonus = if working_ratio > ENGAGEMENT_BONUS_RATIO {
        ENGAGEMENT_BONUS
    } else {
        0.0
    };
    clamp_score(100.0 * working_ratio - 30.0 * distracted_ratio + bonus)
}

/// Share of time not lost to idle, distraction or absence, plus 10 for a
/// full working day (6-8h working within an 8-10h tracked day)
fn compute_efficiency(metrics: &TimeMetrics, total: i64) -> f64 {
    let productive = total - metrics.idle_time - metrics.distracted_time - metrics.absent_time;
    let in_window = |value: i64, (low, high): (i64, i64)| (low..=high).contains(&value);
    let bonus = if in_window(metrics.working_time, EFFICIENCY_BONUS_WORKING)
        && in_window(total, EFFICIENCY_BONUS_TOTAL)
    {
        EFFICIENCY_BONUS
    } else {
        0.0
    };
    clamp_score(100.0 * productive as f64 / total as f64 + bonus)
}

/// Weighted blend of the sub-scores, rounded to 2 decimals
///
/// ```text
/// Overall = 0.40 * productivity + 0.35 * engagement + 0.25 * efficiency
/// ```
pub fn compute_overall(productivity: f64, engagement: f64, efficiency: f64) -> f64 {
    round2(productivity * 0.4 + engagement * 0.35 + efficiency * 0.25)
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(minutes: i64, total: i64) -> u32 {
    (100.0 * minutes as f64 / total as f64).round() as u32
}
