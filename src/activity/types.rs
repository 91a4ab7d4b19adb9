//! Activity classification data types
//!
//! This module defines the landmark frames consumed by the classifier, the
//! activity labels it emits and the per-category confidence vectors that flow
//! between the estimator, smoother and stability gate.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Default weight of the newest frame in exponential smoothing
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.3;

/// Default confidence below which the previous label is held
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Default number of labels kept for the majority vote
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Largest accepted history capacity
pub const MAX_HISTORY_CAPACITY: usize = 1024;

/// Default wrist displacement (normalized units) treated as movement
pub const DEFAULT_MOVEMENT_THRESHOLD: f64 = 0.008;

/// A single landmark point in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    /// Grows downward, as in image coordinates
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Detector visibility estimate, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }
}

/// One sample from the landmark detector
///
/// Every collection may be empty. An empty pose means the subject could not be
/// located and the frame is classified as [`ClassifiedActivity::NoData`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default, alias = "poseLandmarks")]
    pub pose: Vec<Landmark>,
    #[serde(default, alias = "leftHand", alias = "leftHandLandmarks")]
    pub left_hand: Vec<Landmark>,
    #[serde(default, alias = "rightHand", alias = "rightHandLandmarks")]
    pub right_hand: Vec<Landmark>,
    #[serde(default, alias = "faceLandmarks")]
    pub face: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Whether the pose collection carries any points
    pub fn has_pose(&self) -> bool {
        !self.pose.is_empty()
    }

    /// Parse a frame from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        serde_json::from_str(json).map_err(|e| ComputeError::ParseError(e.to_string()))
    }
}

/// The seven classifiable activities, in canonical key order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Typing,
    Writing,
    Reading,
    Phone,
    Meeting,
    Presenting,
    Idle,
}

impl ActivityCategory {
    /// All categories in key order. Tie-breaking everywhere follows this order.
    pub const ALL: [ActivityCategory; 7] = [
        ActivityCategory::Typing,
        ActivityCategory::Writing,
        ActivityCategory::Reading,
        ActivityCategory::Phone,
        ActivityCategory::Meeting,
        ActivityCategory::Presenting,
        ActivityCategory::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Typing => "typing",
            ActivityCategory::Writing => "writing",
            ActivityCategory::Reading => "reading",
            ActivityCategory::Phone => "phone",
            ActivityCategory::Meeting => "meeting",
            ActivityCategory::Presenting => "presenting",
            ActivityCategory::Idle => "idle",
        }
    }

    /// Position of this category in key order
    pub fn index(&self) -> usize {
        match self {
            ActivityCategory::Typing => 0,
            ActivityCategory::Writing => 1,
            ActivityCategory::Reading => 2,
            ActivityCategory::Phone => 3,
            ActivityCategory::Meeting => 4,
            ActivityCategory::Presenting => 5,
            ActivityCategory::Idle => 6,
        }
    }
}

/// Per-frame classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifiedActivity {
    Typing,
    Writing,
    Reading,
    Phone,
    Meeting,
    Presenting,
    Idle,
    /// Pose was missing; the frame could not be classified
    NoData,
}

impl ClassifiedActivity {
    pub fn as_str(&self) -> &'static str {
        match self.category() {
            Some(category) => category.as_str(),
            None => "no_data",
        }
    }

    /// The underlying category, or `None` for `NoData`
    pub fn category(&self) -> Option<ActivityCategory> {
        match self {
            ClassifiedActivity::Typing => Some(ActivityCategory::Typing),
            ClassifiedActivity::Writing => Some(ActivityCategory::Writing),
            ClassifiedActivity::Reading => Some(ActivityCategory::Reading),
            ClassifiedActivity::Phone => Some(ActivityCategory::Phone),
            ClassifiedActivity::Meeting => Some(ActivityCategory::Meeting),
            ClassifiedActivity::Presenting => Some(ActivityCategory::Presenting),
            ClassifiedActivity::Idle => Some(ActivityCategory::Idle),
            ClassifiedActivity::NoData => None,
        }
    }
}

impl From<ActivityCategory> for ClassifiedActivity {
    fn from(category: ActivityCategory) -> Self {
        match category {
            ActivityCategory::Typing => ClassifiedActivity::Typing,
            ActivityCategory::Writing => ClassifiedActivity::Writing,
            ActivityCategory::Reading => ClassifiedActivity::Reading,
            ActivityCategory::Phone => ClassifiedActivity::Phone,
            ActivityCategory::Meeting => ClassifiedActivity::Meeting,
            ActivityCategory::Presenting => ClassifiedActivity::Presenting,
            ActivityCategory::Idle => ClassifiedActivity::Idle,
        }
    }
}

impl std::fmt::Display for ClassifiedActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score in [0, 1] per activity category
///
/// Not a probability distribution: the entries need not sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceVector {
    pub typing: f64,
    pub writing: f64,
    pub reading: f64,
    pub phone: f64,
    pub meeting: f64,
    pub presenting: f64,
    pub idle: f64,
}

impl ConfidenceVector {
    pub fn get(&self, category: ActivityCategory) -> f64 {
        match category {
            ActivityCategory::Typing => self.typing,
            ActivityCategory::Writing => self.writing,
            ActivityCategory::Reading => self.reading,
            ActivityCategory::Phone => self.phone,
            ActivityCategory::Meeting => self.meeting,
            ActivityCategory::Presenting => self.presenting,
            ActivityCategory::Idle => self.idle,
        }
    }

    pub fn set(&mut self, category: ActivityCategory, value: f64) {
        let slot = match category {
            ActivityCategory::Typing => &mut self.typing,
            ActivityCategory::Writing => &mut self.writing,
            ActivityCategory::Reading => &mut self.reading,
            ActivityCategory::Phone => &mut self.phone,
            ActivityCategory::Meeting => &mut self.meeting,
            ActivityCategory::Presenting => &mut self.presenting,
            ActivityCategory::Idle => &mut self.idle,
        };
        *slot = value;
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (ActivityCategory, f64)> + '_ {
        ActivityCategory::ALL.iter().map(move |&c| (c, self.get(c)))
    }

    /// Highest-scoring category; ties resolve to the earliest in key order
    pub fn argmax(&self) -> (ActivityCategory, f64) {
        let mut best = (ActivityCategory::Typing, self.typing);
        for (category, value) in self.iter().skip(1) {
            if value > best.1 {
                best = (category, value);
            }
        }
        best
    }
}

/// Tunable parameters for the classifier session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Weight of the newest raw vector in the exponential blend
    pub smoothing_factor: f64,
    /// Below this smoothed confidence the previous label is held
    pub confidence_threshold: f64,
    /// Number of labels kept for the majority vote
    pub history_capacity: usize,
    /// Wrist displacement counted as movement
    pub movement_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
        }
    }
}

impl ClassifierConfig {
    /// Load and validate a configuration from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: ClassifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(ComputeError::InvalidConfig(format!(
                "smoothing_factor must be in (0, 1], got {}",
                self.smoothing_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ComputeError::InvalidConfig(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(1..=MAX_HISTORY_CAPACITY).contains(&self.history_capacity) {
            return Err(ComputeError::InvalidConfig(format!(
                "history_capacity must be in [1, {MAX_HISTORY_CAPACITY}], got {}",
                self.history_capacity
            )));
        }
        if self.movement_threshold <= 0.0 || !self.movement_threshold.is_finite() {
            return Err(ComputeError::InvalidConfig(format!(
                "movement_threshold must be positive, got {}",
                self.movement_threshold
            )));
        }
        Ok(())
    }
}

/// Serializable per-frame classification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationOutput {
    /// Zero-based index of the frame within the session
    pub frame: u64,
    pub activity: ClassifiedActivity,
    /// Smoothed confidence of the emitted category; absent for `no_data`
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_serialization() {
        let json = serde_json::to_string(&ClassifiedActivity::NoData).unwrap();
        assert_eq!(json, "\"no_data\"");

        let parsed: ClassifiedActivity = serde_json::from_str("\"presenting\"").unwrap();
        assert_eq!(parsed, ClassifiedActivity::Presenting);
    }

    #[test]
    fn test_as_str_matches_serde() {
        for category in ActivityCategory::ALL {
            let activity = ClassifiedActivity::from(category);
            let json = serde_json::to_string(&activity).unwrap();
            assert_eq!(json, format!("\"{}\"", activity.as_str()));
            assert_eq!(activity.category(), Some(category));
        }
    }

    #[test]
    fn test_argmax_tie_prefers_key_order() {
        let mut vector = ConfidenceVector::default();
        vector.set(ActivityCategory::Meeting, 0.5);
        vector.set(ActivityCategory::Reading, 0.5);
        assert_eq!(vector.argmax(), (ActivityCategory::Reading, 0.5));

        assert_eq!(ConfidenceVector::default().argmax().0, ActivityCategory::Typing);
    }

    #[test]
    fn test_frame_accepts_camel_case_aliases() {
        let json = r#"{
            "poseLandmarks": [{"x": 0.5, "y": 0.4}],
            "leftHand": [{"x": 0.4, "y": 0.7, "z": 0.0}]
        }"#;

        let frame = LandmarkFrame::from_json(json).unwrap();
        assert!(frame.has_pose());
        assert_eq!(frame.left_hand.len(), 1);
        assert!(frame.right_hand.is_empty());
        assert!(frame.face.is_empty());
    }

    #[test]
    fn test_malformed_frame_is_parse_error() {
        assert!(matches!(
            LandmarkFrame::from_json(r#"{"pose": "nope"}"#),
            Err(ComputeError::ParseError(_))
        ));
    }

    #[test]
    fn test_config_defaults_fill_missing_keys() {
        let config = ClassifierConfig::from_json(r#"{"history_capacity": 5}"#).unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.smoothing_factor, DEFAULT_SMOOTHING_FACTOR);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(ClassifierConfig::from_json(r#"{"smoothing_factor": 0.0}"#).is_err());
        assert!(ClassifierConfig::from_json(r#"{"confidence_threshold": 1.5}"#).is_err());
        assert!(ClassifierConfig::from_json(r#"{"history_capacity": 0}"#).is_err());
        assert!(ClassifierConfig::from_json(r#"{"movement_threshold": -1.0}"#).is_err());
    }

    #[test]
    fn test_config_rejects_oversized_history() {
        let json = format!(r#"{{"history_capacity": {}}}"#, usize::MAX);
        assert!(matches!(
            ClassifierConfig::from_json(&json),
            Err(ComputeError::InvalidConfig(_))
        ));

        let config = ClassifierConfig {
            history_capacity: MAX_HISTORY_CAPACITY + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClassifierConfig {
            history_capacity: MAX_HISTORY_CAPACITY,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
