//! Landmark geometry helpers
//!
//! The detector contract only guarantees three things about a point: whether it
//! is present, its y-coordinate and its 3D distance to another point. Everything
//! the confidence estimator needs is built from those.

use crate::activity::types::Landmark;

/// Pose topology indices (33-point body model)
pub mod pose {
    pub const NOSE: usize = 0;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
}

/// Hand topology indices (21-point hand model)
pub mod hand {
    pub const WRIST: usize = 0;
}

/// Face mesh indices (468-point model)
pub mod face {
    pub const NOSE_TIP: usize = 1;
    pub const FOREHEAD: usize = 10;
    pub const CHIN: usize = 152;
}

/// Where the nose tip sits between forehead and chin when looking straight ahead
const NEUTRAL_NOSE_RATIO: f64 = 0.55;

/// Clamp to [0, 1]; NaN collapses to 0
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Point at `index`, if the collection has it
pub fn point(points: &[Landmark], index: usize) -> Option<Landmark> {
    points.get(index).copied()
}

/// Euclidean distance in 3D
pub fn distance(a: &Landmark, b: &Landmark) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

/// Midpoint of two optional points; falls back to whichever one exists
pub fn midpoint(a: Option<Landmark>, b: Option<Landmark>) -> Option<Landmark> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Landmark::new(
            (a.x + b.x) / 2.0,
            (a.y + b.y) / 2.0,
            (a.z + b.z) / 2.0,
        )),
        (Some(p), None) | (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

/// Closeness of `y` to a horizontal band: 1 at the centre, 0 at or beyond the edge
pub fn band_proximity(y: f64, centre: f64, half_width: f64) -> f64 {
    if half_width <= 0.0 {
        return 0.0;
    }
    clamp01(1.0 - (y - centre).abs() / half_width)
}

/// Mean y of the shoulders present
pub fn shoulder_y(pose_points: &[Landmark]) -> Option<f64> {
    shoulder_mid(pose_points).map(|p| p.y)
}

pub fn shoulder_mid(pose_points: &[Landmark]) -> Option<Landmark> {
    midpoint(
        point(pose_points, pose::LEFT_SHOULDER),
        point(pose_points, pose::RIGHT_SHOULDER),
    )
}

pub fn shoulder_width(pose_points: &[Landmark]) -> Option<f64> {
    let left = point(pose_points, pose::LEFT_SHOULDER)?;
    let right = point(pose_points, pose::RIGHT_SHOULDER)?;
    Some((left.x - right.x).abs())
}

/// Vertical offset between the two shoulders
pub fn shoulder_tilt(pose_points: &[Landmark]) -> Option<f64> {
    let left = point(pose_points, pose::LEFT_SHOULDER)?;
    let right = point(pose_points, pose::RIGHT_SHOULDER)?;
    Some((left.y - right.y).abs())
}

/// Horizontal offset of the shoulder midpoint from the hip midpoint
pub fn torso_lean(pose_points: &[Landmark]) -> Option<f64> {
    let shoulders = shoulder_mid(pose_points)?;
    let hips = midpoint(
        point(pose_points, pose::LEFT_HIP),
        point(pose_points, pose::RIGHT_HIP),
    )?;
    Some((shoulders.x - hips.x).abs())
}

/// How far the nose sits above the shoulder line (shrinks as the head drops)
pub fn head_drop(pose_points: &[Landmark]) -> Option<f64> {
    let nose = point(pose_points, pose::NOSE)?;
    Some(shoulder_y(pose_points)? - nose.y)
}

/// Signed head pitch in [-1, 1]; positive means looking down
///
/// Uses the face mesh when it is available, otherwise the nose against the ear
/// line of the pose.
pub fn head_pitch(pose_points: &[Landmark], face_points: &[Landmark]) -> Option<f64> {
    if let (Some(nose), Some(forehead), Some(chin)) = (
        point(face_points, face::NOSE_TIP),
        point(face_points, face::FOREHEAD),
        point(face_points, face::CHIN),
    ) {
        let span = chin.y - forehead.y;
        if span > f64::EPSILON {
            let ratio = (nose.y - forehead.y) / span;
            return Some(((ratio - NEUTRAL_NOSE_RATIO) * 4.0).clamp(-1.0, 1.0));
        }
    }

    let nose = point(pose_points, pose::NOSE)?;
    let left_ear = point(pose_points, pose::LEFT_EAR)?;
    let right_ear = point(pose_points, pose::RIGHT_EAR)?;
    let ear_width = (left_ear.x - right_ear.x).abs();
    if ear_width <= f64::EPSILON {
        return None;
    }
    let ear_y = (left_ear.y + right_ear.y) / 2.0;
    Some(((nose.y - ear_y) / ear_width * 2.0).clamp(-1.0, 1.0))
}

/// Signed head yaw in [-1, 1] from the nose against the ear midpoint
pub fn head_yaw(pose_points: &[Landmark]) -> Option<f64> {
    let nose = point(pose_points, pose::NOSE)?;
    let left_ear = point(pose_points, pose::LEFT_EAR)?;
    let right_ear = point(pose_points, pose::RIGHT_EAR)?;
    let ear_width = (left_ear.x - right_ear.x).abs();
    if ear_width <= f64::EPSILON {
        return None;
    }
    let ear_x = (left_ear.x + right_ear.x) / 2.0;
    Some(((nose.x - ear_x) / ear_width * 2.0).clamp(-1.0, 1.0))
}
