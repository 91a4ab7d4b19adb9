//! Rule-based insight generation
//!
//! Exactly one overall-band message always fires, followed by every matching
//! independent rule in a fixed order.

use crate::performance::types::PerformanceScores;

/// Sub-score below which an improvement note is added
const LOW_SCORE: f64 = 70.0;

/// Sub-score at or above which a strength note is added
const HIGH_SCORE: f64 = 85.0;

const HIGH_DISTRACTED_PCT: u32 = 20;
const HIGH_IDLE_PCT: u32 = 15;
const LOW_WORKING_PCT: u32 = 60;

/// Generate ordered observations for a set of scores
pub fn generate_insights(scores: &PerformanceScores) -> Vec<String> {
    let mut insights = vec![overall_insight(scores.overall_score).to_string()];
    let breakdown = &scores.breakdown;

    if scores.productivity_score < LOW_SCORE {
        insights.push(
            "Productivity is below target. Focus on increasing active working time.".to_string(),
        );
    }

    if scores.engagement_score < LOW_SCORE {
        insights.push(
            "Engagement is low. Reducing distractions will help maintain focus.".to_string(),
        );
    }

    if breakdown.distracted > HIGH_DISTRACTED_PCT {
        insights.push(format!(
            "High distraction level detected ({}% of tracked time). Consider silencing notifications and limiting phone use.",
            breakdown.distracted
        ));
    }

    if breakdown.idle > HIGH_IDLE_PCT {
        insights.push(format!(
            "Idle time is significant ({}% of tracked time). Structured breaks may work better than unplanned pauses.",
            breakdown.idle
        ));
    }

    if breakdown.working < LOW_WORKING_PCT {
        insights.push(format!(
            "Working time is {}% of tracked time, below the 60% target.",
            breakdown.working
        ));
    }

    if scores.productivity_score >= HIGH_SCORE {
        insights.push("Strong productivity. Time on task is consistently high.".to_string());
    }

    if scores.engagement_score >= HIGH_SCORE {
        insights.push("High engagement maintained throughout the period.".to_string());
    }

    insights
}

fn overall_insight(overall: f64) -> &'static str {
    if overall >= 90.0 {
        "Excellent performance! Keep up the outstanding work."
    } else if overall >= 80.0 {
        "Good performance with room for minor improvements."
    } else if overall >= 70.0 {
        "Average performance. Reducing idle and distracted time would raise the score."
    } else {
        "Performance needs improvement. Review work habits and minimize distractions."
    }
}
