//! Orientation-tracking stereo camera rig.
//!
//! The rig is a fixed four-level hierarchy. Each tracked node owns a single
//! rotation axis, so writing one angle never disturbs the frames of the
//! others and no Euler angles ever need to be recovered from a composed
//! matrix:
//!
//! ```text
//! Yaw (rotation about y)
//! └── Pitch (rotation about z)
//!     └── Roll (rotation about x)
//!         └── StereoPair (static baseline rotation, raised to eye height)
//!             ├── left eye  (-offset/2 along x)
//!             └── right eye (+offset/2 along x)
//! ```

use crate::attitude::AttitudeSample;
use crate::config::RigConfig;
use crate::matrix_operations::*;
use crate::orientation::OrientationOffset;
use crate::point_of_view::EyeView;
use cgmath::{Matrix4, Point3, Transform, Vector3};
use log::trace;

pub const DEFAULT_FIELD_OF_VIEW_Y: f64 = std::f64::consts::FRAC_PI_3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }
}

/// One of the two virtual cameras. Only its parent nodes ever move it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeCamera {
    pub horizontal_offset: f32,
    pub near_clip: f64,
    pub far_clip: f64,
    pub field_of_view_y: f64,
}

impl EyeCamera {
    fn new(horizontal_offset: f32, far_clip: f64) -> Self {
        EyeCamera {
            horizontal_offset,
            near_clip: crate::config::DEFAULT_NEAR_CLIP,
            far_clip,
            field_of_view_y: DEFAULT_FIELD_OF_VIEW_Y,
        }
    }

    pub fn local_transform(&self) -> Matrix4<f64> {
        translate_matrix_3d(self.horizontal_offset as f64, 0.0, 0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StereoPairNode {
    pub height: f64,
    /// Static mounting rotation, applied once when the rig is built.
    pub baseline: Vector3<f64>,
    pub eyes: [EyeCamera; 2],
}

impl StereoPairNode {
    fn local_transform(&self) -> Matrix4<f64> {
        translate_matrix_3d(0.0, self.height, 0.0) * euler_matrix_3d(self.baseline)
    }

    fn inverse_local_transform(&self) -> Matrix4<f64> {
        inverse_euler_matrix_3d(self.baseline) * translate_matrix_3d(0.0, -self.height, 0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RollNode {
    pub rotation_x: f64,
    pub stereo_pair: StereoPairNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PitchNode {
    pub rotation_z: f64,
    pub roll: RollNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YawNode {
    pub rotation_y: f64,
    pub pitch: PitchNode,
}

/// The only way to obtain a rig is [`CameraRig::initialize`], so a rig can
/// never be updated before its hierarchy exists.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRig {
    yaw: YawNode,
    last_sample: Option<AttitudeSample>,
}

impl CameraRig {
    pub fn initialize(interocular_offset: f32, far_clip: f64, baseline: OrientationOffset) -> Self {
        let half = interocular_offset / 2.0;
        CameraRig {
            yaw: YawNode {
                rotation_y: 0.0,
                pitch: PitchNode {
                    rotation_z: 0.0,
                    roll: RollNode {
                        rotation_x: 0.0,
                        stereo_pair: StereoPairNode {
                            height: 0.0,
                            baseline: baseline.baseline_angles(),
                            eyes: [EyeCamera::new(-half, far_clip), EyeCamera::new(half, far_clip)],
                        },
                    },
                },
            },
            last_sample: None,
        }
    }

    pub fn from_config(config: &RigConfig, baseline: OrientationOffset) -> Self {
        let mut rig = Self::initialize(config.interocular_offset, config.far_clip, baseline);
        let pair = rig.stereo_pair_mut();
        pair.height = config.eye_height;
        for eye in &mut pair.eyes {
            eye.near_clip = config.near_clip;
            eye.field_of_view_y = config.field_of_view_y;
        }
        rig
    }

    /// Writes all three tracked axes from one sample.
    pub fn update(&mut self, sample: &AttitudeSample, offset: &OrientationOffset) {
        let roll = offset.apply_roll(sample.roll);
        self.yaw.pitch.roll.rotation_x = roll;
        self.yaw.pitch.rotation_z = sample.pitch;
        self.yaw.rotation_y = sample.yaw;
        self.last_sample = Some(*sample);
        trace!(
            "rig pose roll={:.4} pitch={:.4} yaw={:.4} at {:?}",
            roll,
            sample.pitch,
            sample.yaw,
            sample.timestamp
        );
    }

    pub fn yaw_rotation_y(&self) -> f64 {
        self.yaw.rotation_y
    }

    pub fn pitch_rotation_z(&self) -> f64 {
        self.yaw.pitch.rotation_z
    }

    pub fn roll_rotation_x(&self) -> f64 {
        self.yaw.pitch.roll.rotation_x
    }

    pub fn stereo_pair(&self) -> &StereoPairNode {
        &self.yaw.pitch.roll.stereo_pair
    }

    fn stereo_pair_mut(&mut self) -> &mut StereoPairNode {
        &mut self.yaw.pitch.roll.stereo_pair
    }

    pub fn eye_camera(&self, eye: Eye) -> &EyeCamera {
        &self.stereo_pair().eyes[eye.index()]
    }

    /// Sample most recently written into the rig.
    pub fn last_sample(&self) -> Option<&AttitudeSample> {
        self.last_sample.as_ref()
    }

    pub fn interocular_offset(&self) -> f64 {
        let [left, right] = self.stereo_pair().eyes;
        (right.horizontal_offset - left.horizontal_offset) as f64
    }

    fn tracked_rotation(&self) -> Matrix4<f64> {
        rotation_matrix_3d_y(self.yaw_rotation_y())
            * rotation_matrix_3d_z(self.pitch_rotation_z())
            * rotation_matrix_3d_x(self.roll_rotation_x())
    }

    fn inverse_tracked_rotation(&self) -> Matrix4<f64> {
        rotation_matrix_3d_x(-self.roll_rotation_x())
            * rotation_matrix_3d_z(-self.pitch_rotation_z())
            * rotation_matrix_3d_y(-self.yaw_rotation_y())
    }

    /// World transform of the stereo pair pivot.
    pub fn pivot_world_transform(&self) -> Matrix4<f64> {
        self.tracked_rotation() * self.stereo_pair().local_transform()
    }

    pub fn eye_world_transform(&self, eye: Eye) -> Matrix4<f64> {
        self.pivot_world_transform() * self.eye_camera(eye).local_transform()
    }

    /// Inverse of [`Self::eye_world_transform`], built from inverted parts.
    pub fn eye_view_matrix(&self, eye: Eye) -> Matrix4<f64> {
        let offset = self.eye_camera(eye).horizontal_offset as f64;
        translate_matrix_3d(-offset, 0.0, 0.0)
            * self.stereo_pair().inverse_local_transform()
            * self.inverse_tracked_rotation()
    }

    pub fn eye_world_position(&self, eye: Eye) -> Point3<f64> {
        self.eye_world_transform(eye)
            .transform_point(Point3::new(0.0, 0.0, 0.0))
    }

    pub fn eye_view(&self, eye: Eye) -> EyeView {
        let camera = self.eye_camera(eye);
        EyeView {
            eye,
            world_transform: self.eye_world_transform(eye),
            view_matrix: self.eye_view_matrix(eye),
            horizontal_offset: camera.horizontal_offset,
            near_clip: camera.near_clip,
            far_clip: camera.far_clip,
            field_of_view_y: camera.field_of_view_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::{resolve, DisplayOrientation};
    use cgmath::MetricSpace;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::time::Duration;

    fn sample(roll: f64, pitch: f64, yaw: f64) -> AttitudeSample {
        AttitudeSample::new(roll, pitch, yaw, Duration::from_millis(16))
    }

    fn portrait_rig() -> CameraRig {
        CameraRig::initialize(5.0, 400.0, resolve(DisplayOrientation::Portrait))
    }

    #[test]
    fn eyes_are_placed_symmetrically() {
        let rig = portrait_rig();
        assert_eq!(rig.eye_camera(Eye::Left).horizontal_offset, -2.5);
        assert_eq!(rig.eye_camera(Eye::Right).horizontal_offset, 2.5);
        assert_eq!(rig.eye_camera(Eye::Left).far_clip, 400.0);
        assert_eq!(rig.interocular_offset(), 5.0);
    }

    #[test]
    fn separation_survives_any_attitude() {
        let angles = [-3.0, -1.7, -0.4, 0.0, 0.25, 1.3, 2.9, 6.1];
        for eye_height in [0.0, 10.0] {
            let config = RigConfig {
                eye_height,
                ..RigConfig::with_defaults()
            };
            let mut rig = CameraRig::from_config(&config, resolve(DisplayOrientation::Portrait));
            for &roll in &angles {
                for &pitch in &angles {
                    for &yaw in &angles {
                        for orientation in DisplayOrientation::ALL {
                            rig.update(&sample(roll, pitch, yaw), &resolve(orientation));
                            let d = rig
                                .eye_world_position(Eye::Left)
                                .distance(rig.eye_world_position(Eye::Right));
                            assert!(
                                (d - 5.0).abs() < 1e-9,
                                "separation {d} at height {eye_height}, {roll},{pitch},{yaw}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn level_portrait_sample_leaves_axes_at_zero() {
        let mut rig = portrait_rig();
        rig.update(&sample(0.0, 0.0, 0.0), &resolve(DisplayOrientation::Portrait));
        assert_eq!(rig.yaw_rotation_y(), 0.0);
        assert_eq!(rig.pitch_rotation_z(), 0.0);
        assert_eq!(rig.roll_rotation_x(), 0.0);
        assert_eq!(rig.stereo_pair().baseline, Vector3::new(-FRAC_PI_2, 0.0, 0.0));
    }

    #[test]
    fn landscape_right_roll_is_mirrored() {
        let offset = resolve(DisplayOrientation::LandscapeRight);
        let mut rig = CameraRig::initialize(5.0, 400.0, offset);
        rig.update(&sample(0.2, 0.0, 0.0), &offset);
        assert!((rig.roll_rotation_x() - 3.3416).abs() < 1e-4);
        assert_eq!(rig.roll_rotation_x(), -(-PI - 0.2));
    }

    #[test]
    fn each_axis_lands_on_its_own_node() {
        let mut rig = portrait_rig();
        rig.update(&sample(0.1, 0.2, 0.3), &resolve(DisplayOrientation::Portrait));
        assert_eq!(rig.roll_rotation_x(), 0.1);
        assert_eq!(rig.pitch_rotation_z(), 0.2);
        assert_eq!(rig.yaw_rotation_y(), 0.3);
    }

    #[test]
    fn update_never_touches_the_baseline() {
        let offset = resolve(DisplayOrientation::LandscapeLeft);
        let mut rig = CameraRig::initialize(5.0, 400.0, offset);
        let before = rig.stereo_pair().clone();
        rig.update(&sample(0.7, -0.3, 2.0), &resolve(DisplayOrientation::LandscapeRight));
        assert_eq!(rig.stereo_pair(), &before);
    }

    #[test]
    fn update_is_idempotent() {
        let offset = resolve(DisplayOrientation::LandscapeLeft);
        let s = sample(0.31, -0.12, 1.4);

        let mut once = CameraRig::initialize(5.0, 400.0, offset);
        once.update(&s, &offset);
        let mut twice = CameraRig::initialize(5.0, 400.0, offset);
        twice.update(&s, &offset);
        twice.update(&s, &offset);

        assert_eq!(once, twice);
        for eye in Eye::BOTH {
            assert_eq!(once.eye_world_transform(eye), twice.eye_world_transform(eye));
        }
    }

    #[test]
    fn view_matrix_inverts_world_transform() {
        let offset = resolve(DisplayOrientation::LandscapeRight);
        let mut rig = CameraRig::initialize(5.0, 400.0, offset);
        rig.stereo_pair_mut().height = 10.0;
        rig.update(&sample(0.4, 0.9, -2.2), &offset);
        for eye in Eye::BOTH {
            let product = rig.eye_world_transform(eye) * rig.eye_view_matrix(eye);
            assert_matrix_close(product, identity_matrix(), 1e-9);
        }
    }

    #[test]
    fn yaw_swings_the_pivot_around_the_vertical_axis() {
        let mut rig = portrait_rig();
        let before = rig.eye_world_position(Eye::Right);
        rig.update(&sample(0.0, 0.0, PI), &resolve(DisplayOrientation::Portrait));
        let after = rig.eye_world_position(Eye::Right);
        assert!((after.y - before.y).abs() < 1e-9);
        assert!((after.x + before.x).abs() < 1e-9);
        assert!((after.z + before.z).abs() < 1e-9);
    }

    #[test]
    fn config_sets_height_and_clip_planes() {
        let config = RigConfig {
            eye_height: 10.0,
            near_clip: 0.5,
            far_clip: 250.0,
            ..RigConfig::default()
        };
        let rig = CameraRig::from_config(&config, resolve(DisplayOrientation::Portrait));
        assert_eq!(rig.stereo_pair().height, 10.0);
        for eye in Eye::BOTH {
            assert_eq!(rig.eye_camera(eye).near_clip, 0.5);
            assert_eq!(rig.eye_camera(eye).far_clip, 250.0);
        }
        let pivot = rig.pivot_world_transform().transform_point(Point3::new(0.0, 0.0, 0.0));
        assert!((pivot.y - 10.0).abs() < 1e-12);
    }
}
