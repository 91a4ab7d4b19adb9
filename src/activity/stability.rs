//! Stability gate
//!
//! Turns the smoothed confidence vector plus a bounded label history into one
//! emitted activity per frame. A low-confidence frame holds the previously
//! emitted label (hysteresis), and the most frequent label in the history
//! overrides a dissenting candidate (majority vote). There is no minimum dwell
//! time: the vote is re-evaluated on every frame.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::activity::types::{
    ActivityCategory, ConfidenceVector, DEFAULT_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY,
};

/// Bounded FIFO of recent per-frame candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityHistory {
    labels: VecDeque<ActivityCategory>,
    capacity: usize,
}

impl Default for ActivityHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ActivityHistory {
    /// Capacity is clamped to `[1, MAX_HISTORY_CAPACITY]`
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY_CAPACITY);
        Self {
            labels: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a label, evicting the oldest beyond capacity
    pub fn push(&mut self, label: ActivityCategory) {
        self.labels.push_back(label);
        while self.labels.len() > self.capacity {
            self.labels.pop_front();
        }
    }

    /// Most frequent label; ties go to the category earliest in key order
    pub fn majority(&self) -> Option<ActivityCategory> {
        if self.labels.is_empty() {
            return None;
        }

        let mut counts = [0usize; ActivityCategory::ALL.len()];
        for label in &self.labels {
            counts[label.index()] += 1;
        }

        let mut best: Option<(ActivityCategory, usize)> = None;
        for category in ActivityCategory::ALL {
            let count = counts[category.index()];
            if count > 0 && best.map_or(true, |(_, top)| count > top) {
                best = Some((category, count));
            }
        }
        best.map(|(category, _)| category)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityCategory> {
        self.labels.iter()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}

/// Everything the gate remembers between frames
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityState {
    pub history: ActivityHistory,
    /// Label emitted on the previous classified frame
    pub last_emitted: Option<ActivityCategory>,
}

impl StabilityState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: ActivityHistory::new(capacity),
            last_emitted: None,
        }
    }
}

/// Outcome of one gate step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    /// Candidate after the hysteresis hold
    pub candidate: ActivityCategory,
    /// Label emitted for this frame
    pub emitted: ActivityCategory,
    /// Whether the majority vote replaced the candidate
    pub overridden: bool,
}

/// Advance the gate by one frame without touching `state`
pub fn gate_step(
    state: &StabilityState,
    smoothed: &ConfidenceVector,
    confidence_threshold: f64,
) -> (StabilityState, GateDecision) {
    let (mut candidate, confidence) = smoothed.argmax();

    if confidence < confidence_threshold {
        if let Some(previous) = state.last_emitted {
            candidate = previous;
        }
    }

    let mut next = state.clone();
    next.history.push(candidate);

    let emitted = next.history.majority().unwrap_or(candidate);
    next.last_emitted = Some(emitted);

    let decision = GateDecision {
        candidate,
        emitted,
        overridden: emitted != candidate,
    };
    (next, decision)
}
