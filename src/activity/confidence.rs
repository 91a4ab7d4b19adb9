//! Per-frame confidence estimation
//!
//! Maps one landmark frame to a confidence vector over the seven activity
//! categories. Each category is a fixed weighted sum of sub-scores, and every
//! sub-score is clamped to [0, 1] before it is combined. Missing hand data
//! forces hand-dependent sub-scores to 0.

use serde::{Deserialize, Serialize};

use crate::activity::geometry::{
    self, band_proximity, clamp01, distance, hand, head_drop, head_pitch, head_yaw, midpoint,
    point, pose, shoulder_mid, shoulder_tilt, shoulder_width, shoulder_y, torso_lean,
};
use crate::activity::types::{ConfidenceVector, Landmark, LandmarkFrame};

/// Desk band centre, measured down from the shoulder line
const DESK_OFFSET: f64 = 0.25;

/// Desk band half-width for typing and resting hands
const DESK_HALF_WIDTH: f64 = 0.15;

/// Writing hands sit slightly lower and in a narrower band
const WRITING_OFFSET: f64 = 0.05;
const WRITING_HALF_WIDTH: f64 = 0.10;

/// Shoulder tilt plus torso lean at which posture stops counting as upright
const MAX_POSTURE_DEVIATION: f64 = 0.2;

/// Nose-above-shoulder height at which a forward lean no longer registers
const MAX_HEAD_DROP: f64 = 0.25;

/// Nose-above-shoulder height of a relaxed, slightly lowered head
const RELAXED_HEAD_DROP: f64 = 0.15;
const RELAXED_TOLERANCE: f64 = 0.15;

/// Wrist-to-nose distance beyond which a hand is not "near the face"
const FACE_REACH: f64 = 0.25;

/// Wrist height above the desk band for a full gesture score
const GESTURE_RISE: f64 = 0.25;

/// Anchor points remembered between frames for movement sub-scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSnapshot {
    pub left_wrist: Option<Landmark>,
    pub right_wrist: Option<Landmark>,
    /// Midpoint of nose and shoulders
    pub body: Option<Landmark>,
}

impl MotionSnapshot {
    /// Record the anchors of `frame` for the next frame's comparison
    pub fn capture(frame: &LandmarkFrame) -> Self {
        Self {
            left_wrist: point(&frame.left_hand, hand::WRIST),
            right_wrist: point(&frame.right_hand, hand::WRIST),
            body: body_anchor(&frame.pose),
        }
    }
}

/// Individual sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub hand_position: f64,
    pub writing_position: f64,
    pub hand_movement: f64,
    pub upright_posture: f64,
    pub leaning_posture: f64,
    pub relaxed_posture: f64,
    pub head_angle: f64,
    pub reading_hands: f64,
    pub hand_near_face: f64,
    pub head_down: f64,
    pub isolated_movement: f64,
    pub head_straight: f64,
    pub body_stillness: f64,
    pub gesture: f64,
    pub open_posture: f64,
    pub expressive_movement: f64,
    pub hands_still: f64,
}

/// A hand that is present in the current frame
struct TrackedHand {
    wrist: Landmark,
    movement: f64,
}

/// Confidence estimator for landmark frames
pub struct ConfidenceEstimator;

impl ConfidenceEstimator {
    /// Estimate per-category confidence for one frame
    ///
    /// `previous` holds the anchors of the last classified frame; use
    /// `MotionSnapshot::default()` on the first frame, which treats every
    /// present wrist as moving.
    pub fn estimate(
        frame: &LandmarkFrame,
        previous: &MotionSnapshot,
        movement_threshold: f64,
    ) -> ConfidenceVector {
        let scores = Self::sub_scores(frame, previous, movement_threshold);
        Self::combine(&scores)
    }

    /// Apply the fixed per-category weights
    pub fn combine(s: &SubScores) -> ConfidenceVector {
        ConfidenceVector {
            typing: clamp01(
                0.4 * s.hand_position + 0.4 * s.hand_movement + 0.2 * s.upright_posture,
            ),
            writing: clamp01(
                0.5 * s.writing_position + 0.3 * s.hand_movement + 0.2 * s.leaning_posture,
            ),
            reading: clamp01(0.4 * s.head_angle + 0.3 * s.reading_hands + 0.3 * s.relaxed_posture),
            phone: clamp01(0.5 * s.hand_near_face + 0.3 * s.head_down + 0.2 * s.isolated_movement),
            meeting: clamp01(
                0.4 * s.head_straight + 0.3 * s.upright_posture + 0.3 * s.body_stillness,
            ),
            presenting: clamp01(
                0.4 * s.gesture + 0.3 * s.open_posture + 0.3 * s.expressive_movement,
            ),
            idle: clamp01(0.4 * s.hands_still + 0.3 * s.body_stillness + 0.3 * s.relaxed_posture),
        }
    }

    /// Compute every sub-score for one frame
    pub fn sub_scores(
        frame: &LandmarkFrame,
        previous: &MotionSnapshot,
        movement_threshold: f64,
    ) -> SubScores {
        let pose_points = &frame.pose;
        let hands = tracked_hands(frame, previous, movement_threshold);
        let desk_y = shoulder_y(pose_points).map(|y| y + DESK_OFFSET);
        let pitch = head_pitch(pose_points, &frame.face);

        let hand_position = desk_y
            .map(|desk| max_over(&hands, |h| band_proximity(h.wrist.y, desk, DESK_HALF_WIDTH)))
            .unwrap_or(0.0);

        let writing_position = desk_y
            .map(|desk| {
                max_over(&hands, |h| {
                    band_proximity(h.wrist.y, desk + WRITING_OFFSET, WRITING_HALF_WIDTH)
                })
            })
            .unwrap_or(0.0);

        let reading_hands = desk_y
            .map(|desk| {
                max_over(&hands, |h| {
                    band_proximity(h.wrist.y, desk, DESK_HALF_WIDTH) * (1.0 - h.movement)
                })
            })
            .unwrap_or(0.0);

        let gesture = desk_y
            .map(|desk| max_over(&hands, |h| clamp01((desk - h.wrist.y) / GESTURE_RISE)))
            .unwrap_or(0.0);

        let hand_movement = max_over(&hands, |h| h.movement);

        let face_anchor = point(&frame.face, geometry::face::NOSE_TIP)
            .or_else(|| point(pose_points, pose::NOSE));
        let hand_near_face = face_anchor
            .map(|nose| max_over(&hands, |h| clamp01(1.0 - distance(&h.wrist, &nose) / FACE_REACH)))
            .unwrap_or(0.0);

        let isolated_movement = match hands.as_slice() {
            [a, b] => clamp01((a.movement - b.movement).abs()),
            [only] => clamp01(only.movement * 0.5),
            _ => 0.0,
        };

        let expressive_movement = if hands.is_empty() {
            0.0
        } else {
            clamp01(hands.iter().map(|h| h.movement).sum::<f64>() / hands.len() as f64)
        };

        let hands_still = if hands.is_empty() {
            0.0
        } else {
            clamp01(1.0 - hand_movement)
        };

        let head_straight = pitch
            .map(|p| clamp01(1.0 - (p.abs() + head_yaw(pose_points).unwrap_or(0.0).abs())))
            .unwrap_or(0.0);

        SubScores {
            hand_position,
            writing_position,
            hand_movement,
            upright_posture: upright_posture(pose_points),
            leaning_posture: head_drop(pose_points)
                .map(|drop| clamp01(1.0 - drop / MAX_HEAD_DROP))
                .unwrap_or(0.0),
            relaxed_posture: head_drop(pose_points)
                .map(|drop| band_proximity(drop, RELAXED_HEAD_DROP, RELAXED_TOLERANCE))
                .unwrap_or(0.0),
            head_angle: pitch.map(|p| clamp01(p.abs())).unwrap_or(0.0),
            reading_hands,
            hand_near_face,
            head_down: pitch.map(clamp01).unwrap_or(0.0),
            isolated_movement,
            head_straight,
            body_stillness: body_stillness(pose_points, previous, movement_threshold),
            gesture,
            open_posture: open_posture(pose_points),
            expressive_movement,
            hands_still,
        }
    }
}

fn tracked_hands(
    frame: &LandmarkFrame,
    previous: &MotionSnapshot,
    movement_threshold: f64,
) -> Vec<TrackedHand> {
    [
        (point(&frame.left_hand, hand::WRIST), previous.left_wrist),
        (point(&frame.right_hand, hand::WRIST), previous.right_wrist),
    ]
    .into_iter()
    .filter_map(|(current, prior)| {
        current.map(|wrist| TrackedHand {
            wrist,
            movement: movement_score(&wrist, prior.as_ref(), movement_threshold),
        })
    })
    .collect()
}

/// Displacement against the previous position, saturating at the threshold.
/// No previous position counts as moving.
fn movement_score(current: &Landmark, previous: Option<&Landmark>, threshold: f64) -> f64 {
    match previous {
        Some(prior) => clamp01(distance(current, prior) / threshold),
        None => 1.0,
    }
}

fn max_over(hands: &[TrackedHand], score: impl Fn(&TrackedHand) -> f64) -> f64 {
    hands.iter().map(|h| clamp01(score(h))).fold(0.0, f64::max)
}

fn body_anchor(pose_points: &[Landmark]) -> Option<Landmark> {
    if pose_points.is_empty() {
        return None;
    }
    midpoint(point(pose_points, pose::NOSE), shoulder_mid(pose_points))
}

fn upright_posture(pose_points: &[Landmark]) -> f64 {
    match shoulder_tilt(pose_points) {
        Some(tilt) => {
            let lean = torso_lean(pose_points).unwrap_or(0.0);
            clamp01(1.0 - (tilt + lean) / MAX_POSTURE_DEVIATION)
        }
        None => 0.0,
    }
}

/// Body movement is judged at twice the wrist threshold
fn body_stillness(pose_points: &[Landmark], previous: &MotionSnapshot, threshold: f64) -> f64 {
    match (body_anchor(pose_points), previous.body) {
        (Some(now), Some(before)) => clamp01(1.0 - distance(&now, &before) / (threshold * 2.0)),
        _ => 0.0,
    }
}

/// Spread of the pose wrists relative to shoulder width
fn open_posture(pose_points: &[Landmark]) -> f64 {
    let (Some(width), Some(left), Some(right)) = (
        shoulder_width(pose_points),
        point(pose_points, pose::LEFT_WRIST),
        point(pose_points, pose::RIGHT_WRIST),
    ) else {
        return 0.0;
    };
    if width <= f64::EPSILON {
        return 0.0;
    }
    clamp01((left.x - right.x).abs() / (2.0 * width))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::activity::types::{ActivityCategory, DEFAULT_MOVEMENT_THRESHOLD};

    /// Seated subject facing the camera, upright, hands out of view
    pub(crate) fn seated_pose() -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.6, 0.0); 33];
        points[pose::NOSE] = Landmark::new(0.5, 0.30, 0.0);
        points[pose::LEFT_EAR] = Landmark::new(0.56, 0.30, 0.0);
        points[pose::RIGHT_EAR] = Landmark::new(0.44, 0.30, 0.0);
        points[pose::LEFT_SHOULDER] = Landmark::new(0.65, 0.50, 0.0);
        points[pose::RIGHT_SHOULDER] = Landmark::new(0.35, 0.50, 0.0);
        points[pose::LEFT_WRIST] = Landmark::new(0.55, 0.75, 0.0);
        points[pose::RIGHT_WRIST] = Landmark::new(0.45, 0.75, 0.0);
        points[pose::LEFT_HIP] = Landmark::new(0.60, 0.90, 0.0);
        points[pose::RIGHT_HIP] = Landmark::new(0.40, 0.90, 0.0);
        points
    }

    pub(crate) fn hand_at(x: f64, y: f64) -> Vec<Landmark> {
        vec![Landmark::new(x, y, 0.0); 21]
    }

    fn frame(pose: Vec<Landmark>, left: Vec<Landmark>, right: Vec<Landmark>) -> LandmarkFrame {
        LandmarkFrame {
            pose,
            left_hand: left,
            right_hand: right,
            face: vec![],
        }
    }

    #[test]
    fn test_missing_hands_zero_hand_scores() {
        let f = frame(seated_pose(), vec![], vec![]);
        let s = ConfidenceEstimator::sub_scores(
            &f,
            &MotionSnapshot::default(),
            DEFAULT_MOVEMENT_THRESHOLD,
        );

        assert_eq!(s.hand_position, 0.0);
        assert_eq!(s.writing_position, 0.0);
        assert_eq!(s.hand_movement, 0.0);
        assert_eq!(s.reading_hands, 0.0);
        assert_eq!(s.hand_near_face, 0.0);
        assert_eq!(s.isolated_movement, 0.0);
        assert_eq!(s.gesture, 0.0);
        assert_eq!(s.expressive_movement, 0.0);
        assert_eq!(s.hands_still, 0.0);
    }

    #[test]
    fn test_first_frame_counts_as_moving() {
        let f = frame(seated_pose(), hand_at(0.55, 0.75), vec![]);
        let s = ConfidenceEstimator::sub_scores(
            &f,
            &MotionSnapshot::default(),
            DEFAULT_MOVEMENT_THRESHOLD,
        );
        assert_eq!(s.hand_movement, 1.0);
        assert_eq!(s.hands_still, 0.0);
    }

    #[test]
    fn test_movement_threshold() {
        let before = frame(seated_pose(), hand_at(0.55, 0.75), vec![]);
        let snapshot = MotionSnapshot::capture(&before);

        let still = frame(seated_pose(), hand_at(0.55, 0.75), vec![]);
        let s = ConfidenceEstimator::sub_scores(&still, &snapshot, DEFAULT_MOVEMENT_THRESHOLD);
        assert_eq!(s.hand_movement, 0.0);
        assert_eq!(s.hands_still, 1.0);

        let moved = frame(seated_pose(), hand_at(0.56, 0.75), vec![]);
        let s = ConfidenceEstimator::sub_scores(&moved, &snapshot, DEFAULT_MOVEMENT_THRESHOLD);
        assert_eq!(s.hand_movement, 1.0);
    }

    #[test]
    fn test_hands_on_desk_favor_typing() {
        let f = frame(seated_pose(), hand_at(0.55, 0.75), hand_at(0.45, 0.75));
        let vector = ConfidenceEstimator::estimate(
            &f,
            &MotionSnapshot::default(),
            DEFAULT_MOVEMENT_THRESHOLD,
        );

        // position 1.0, movement 1.0, upright 1.0
        assert!((vector.typing - 1.0).abs() < 1e-9);
        assert_eq!(vector.argmax().0, ActivityCategory::Typing);
    }

    #[test]
    fn test_hand_near_face_favors_phone() {
        let previous = MotionSnapshot::capture(&frame(
            seated_pose(),
            hand_at(0.52, 0.33),
            hand_at(0.45, 0.75),
        ));
        let f = frame(seated_pose(), hand_at(0.52, 0.34), hand_at(0.45, 0.75));
        let s = ConfidenceEstimator::sub_scores(&f, &previous, DEFAULT_MOVEMENT_THRESHOLD);

        assert!(s.hand_near_face > 0.8);
        assert_eq!(s.isolated_movement, 1.0);
    }

    #[test]
    fn test_all_scores_in_unit_range() {
        let f = frame(seated_pose(), hand_at(0.9, 0.1), hand_at(0.1, 1.4));
        let vector = ConfidenceEstimator::estimate(
            &f,
            &MotionSnapshot::default(),
            DEFAULT_MOVEMENT_THRESHOLD,
        );
        for (_, value) in vector.iter() {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_empty_frame_never_panics() {
        let vector = ConfidenceEstimator::estimate(
            &LandmarkFrame::default(),
            &MotionSnapshot::default(),
            DEFAULT_MOVEMENT_THRESHOLD,
        );
        assert_eq!(vector, ConfidenceVector::default());
    }
}
