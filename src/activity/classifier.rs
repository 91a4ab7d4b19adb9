//! Activity classifier session
//!
//! Owns the smoothing and stability state for exactly one tracked subject and
//! runs estimator → smoother → stability gate for every frame. A session must
//! not be shared between subjects; call [`ActivityClassifier::reset`] when a new
//! monitoring session starts.

use log::{debug, trace};

use crate::activity::confidence::{ConfidenceEstimator, MotionSnapshot};
use crate::activity::smoothing::smooth_step;
use crate::activity::stability::{gate_step, StabilityState};
use crate::activity::types::{
    ClassificationOutput, ClassifiedActivity, ClassifierConfig, ConfidenceVector, LandmarkFrame,
};
use crate::error::ComputeError;

/// Frame-in, label-out classifier for one subject
#[derive(Debug, Clone)]
pub struct ActivityClassifier {
    config: ClassifierConfig,
    smoothed: ConfidenceVector,
    stability: StabilityState,
    motion: MotionSnapshot,
    frames_seen: u64,
}

impl Default for ActivityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityClassifier {
    /// Create a classifier with default tuning
    pub fn new() -> Self {
        Self::build(ClassifierConfig::default())
    }

    /// Create a classifier with custom tuning
    pub fn with_config(config: ClassifierConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ClassifierConfig) -> Self {
        let stability = StabilityState::with_capacity(config.history_capacity);
        Self {
            config,
            smoothed: ConfidenceVector::default(),
            stability,
            motion: MotionSnapshot::default(),
            frames_seen: 0,
        }
    }

    /// Classify one frame
    pub fn classify(&mut self, frame: &LandmarkFrame) -> ClassifiedActivity {
        self.classify_frame(frame).activity
    }

    /// Classify one frame and report its index and the emitted label's confidence
    pub fn classify_frame(&mut self, frame: &LandmarkFrame) -> ClassificationOutput {
        let index = self.frames_seen;
        self.frames_seen += 1;

        if !frame.has_pose() {
            trace!("frame {index}: no pose, skipping");
            return ClassificationOutput {
                frame: index,
                activity: ClassifiedActivity::NoData,
                confidence: None,
            };
        }

        let raw =
            ConfidenceEstimator::estimate(frame, &self.motion, self.config.movement_threshold);
        let smoothed = smooth_step(&self.smoothed, &raw, self.config.smoothing_factor);
        let (stability, decision) =
            gate_step(&self.stability, &smoothed, self.config.confidence_threshold);

        if self.stability.last_emitted != Some(decision.emitted) {
            debug!(
                "frame {index}: activity {:?} -> {}",
                self.stability.last_emitted.map(|c| c.as_str()),
                decision.emitted.as_str()
            );
        }
        trace!(
            "frame {index}: candidate={} emitted={} overridden={}",
            decision.candidate.as_str(),
            decision.emitted.as_str(),
            decision.overridden
        );

        self.smoothed = smoothed;
        self.stability = stability;
        self.motion = MotionSnapshot::capture(frame);

        ClassificationOutput {
            frame: index,
            activity: decision.emitted.into(),
            confidence: Some(smoothed.get(decision.emitted)),
        }
    }

    /// Clear all per-subject state. Call at the start of every monitoring session.
    pub fn reset(&mut self) {
        debug!("classifier reset after {} frames", self.frames_seen);
        self.smoothed = ConfidenceVector::default();
        self.stability = StabilityState::with_capacity(self.config.history_capacity);
        self.motion = MotionSnapshot::default();
        self.frames_seen = 0;
    }

    /// Current smoothed confidence (diagnostics only)
    pub fn smoothed_confidence(&self) -> &ConfidenceVector {
        &self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::confidence::tests::{hand_at, seated_pose};
    use crate::activity::types::ActivityCategory;
    use pretty_assertions::assert_eq;

    fn hands_free_frame() -> LandmarkFrame {
        LandmarkFrame {
            pose: seated_pose(),
            ..Default::default()
        }
    }

    fn typing_frame(offset: f64) -> LandmarkFrame {
        LandmarkFrame {
            pose: seated_pose(),
            left_hand: hand_at(0.55 + offset, 0.75),
            right_hand: hand_at(0.45 - offset, 0.75),
            face: vec![],
        }
    }

    #[test]
    fn test_missing_pose_is_no_data() {
        let mut classifier = ActivityClassifier::new();
        assert_eq!(
            classifier.classify(&LandmarkFrame::default()),
            ClassifiedActivity::NoData
        );
    }

    #[test]
    fn test_no_data_leaves_state_untouched() {
        let mut classifier = ActivityClassifier::new();
        classifier.classify(&hands_free_frame());

        let smoothed = classifier.smoothed;
        let stability = classifier.stability.clone();
        let motion = classifier.motion;

        let output = classifier.classify_frame(&LandmarkFrame::default());
        assert_eq!(output.activity, ClassifiedActivity::NoData);
        assert_eq!(output.confidence, None);
        assert_eq!(classifier.smoothed, smoothed);
        assert_eq!(classifier.stability, stability);
        assert_eq!(classifier.motion, motion);
    }

    #[test]
    fn test_missing_hands_never_typing_or_writing() {
        let mut classifier = ActivityClassifier::new();
        for _ in 0..5 {
            let activity = classifier.classify(&hands_free_frame());
            assert_ne!(activity, ClassifiedActivity::Typing);
            assert_ne!(activity, ClassifiedActivity::Writing);
        }
    }

    #[test]
    fn test_hands_on_desk_classified_as_typing() {
        let mut classifier = ActivityClassifier::new();
        let mut last = ClassifiedActivity::NoData;
        for i in 0..12 {
            let offset = if i % 2 == 0 { 0.0 } else { 0.01 };
            last = classifier.classify(&typing_frame(offset));
        }
        assert_eq!(last, ClassifiedActivity::Typing);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = ClassifierConfig {
            history_capacity: 3,
            ..Default::default()
        };
        let mut classifier = ActivityClassifier::with_config(config).unwrap();
        for _ in 0..10 {
            classifier.classify(&hands_free_frame());
        }
        assert_eq!(classifier.stability.history.len(), 3);
        assert_eq!(classifier.frames_seen, 10);
    }

    #[test]
    fn test_reset_clears_session_state() {
        let mut classifier = ActivityClassifier::new();
        for _ in 0..5 {
            classifier.classify(&typing_frame(0.0));
        }
        assert!(classifier.smoothed.typing > 0.0);

        classifier.reset();

        assert_eq!(classifier.smoothed, ConfidenceVector::default());
        assert!(classifier.stability.history.is_empty());
        assert_eq!(classifier.stability.last_emitted, None);
        assert_eq!(classifier.motion, MotionSnapshot::default());

        let output = classifier.classify_frame(&hands_free_frame());
        assert_eq!(output.frame, 0);
        assert_eq!(output.activity, ClassifiedActivity::Meeting);
    }

    #[test]
    fn test_confidence_reports_emitted_category() {
        let mut classifier = ActivityClassifier::new();
        let output = classifier.classify_frame(&hands_free_frame());
        let category = output.activity.category().unwrap();
        assert_eq!(category, ActivityCategory::Meeting);
        assert_eq!(
            output.confidence,
            Some(classifier.smoothed_confidence().get(category))
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ClassifierConfig {
            smoothing_factor: 1.5,
            ..Default::default()
        };
        assert!(ActivityClassifier::with_config(config).is_err());
    }
}
