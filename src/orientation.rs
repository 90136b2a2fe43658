use cgmath::Vector3;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Rig baseline: the stereo pair is tipped a quarter turn so that a device
/// held in landscape looks at the horizon.
pub const BASE_YAW: f64 = -FRAC_PI_2;

/// Landscape-right is the landscape-left mount turned a half turn about the
/// viewing axis. Roll measured in that mount is mirrored through this angle.
pub const LANDSCAPE_RIGHT_MIRROR: f64 = PI;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    #[default]
    Unknown,
}

impl DisplayOrientation {
    pub const ALL: [DisplayOrientation; 5] = [
        DisplayOrientation::Portrait,
        DisplayOrientation::PortraitUpsideDown,
        DisplayOrientation::LandscapeLeft,
        DisplayOrientation::LandscapeRight,
        DisplayOrientation::Unknown,
    ];

    fn to_u8(self) -> u8 {
        match self {
            DisplayOrientation::Portrait => 1,
            DisplayOrientation::PortraitUpsideDown => 2,
            DisplayOrientation::LandscapeLeft => 3,
            DisplayOrientation::LandscapeRight => 4,
            DisplayOrientation::Unknown => 0,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => DisplayOrientation::Portrait,
            2 => DisplayOrientation::PortraitUpsideDown,
            3 => DisplayOrientation::LandscapeLeft,
            4 => DisplayOrientation::LandscapeRight,
            _ => DisplayOrientation::Unknown,
        }
    }
}

impl fmt::Display for DisplayOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayOrientation::Portrait => "portrait",
            DisplayOrientation::PortraitUpsideDown => "portrait-upside-down",
            DisplayOrientation::LandscapeLeft => "landscape-left",
            DisplayOrientation::LandscapeRight => "landscape-right",
            DisplayOrientation::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Mounting correction for one display orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationOffset {
    pub base_yaw: f64,
    pub secondary_offset: Option<f64>,
    pub roll_sign_flip: bool,
    /// Half turn about the stereo pair's viewing axis for mirrored mounts.
    pub mounting_twist: f64,
}

const DEFAULT_ROW: OrientationOffset = OrientationOffset {
    base_yaw: BASE_YAW,
    secondary_offset: None,
    roll_sign_flip: false,
    mounting_twist: 0.0,
};

impl Default for OrientationOffset {
    fn default() -> Self {
        DEFAULT_ROW
    }
}

impl OrientationOffset {
    /// Euler triple for the stereo pair's static rotation (x, y, z).
    pub fn baseline_angles(&self) -> Vector3<f64> {
        Vector3::new(
            self.base_yaw,
            self.secondary_offset.unwrap_or(0.0),
            self.mounting_twist,
        )
    }

    /// Roll to write into the roll node for a raw sensor roll.
    pub fn apply_roll(&self, roll: f64) -> f64 {
        if self.roll_sign_flip {
            corrected_roll(roll)
        } else {
            roll
        }
    }
}

/// Orientation-mirroring compensation for the landscape-right mount.
///
/// Reflecting the raw roll through `-π` and negating keeps "up" pointing the
/// same way it does in the other orientations.
pub fn corrected_roll(roll: f64) -> f64 {
    -(-LANDSCAPE_RIGHT_MIRROR - roll)
}

/// Offset table keyed on display orientation. Anything not listed falls back
/// to the uncorrected row.
pub fn resolve(orientation: DisplayOrientation) -> OrientationOffset {
    match orientation {
        DisplayOrientation::PortraitUpsideDown => OrientationOffset {
            secondary_offset: Some(-FRAC_PI_2),
            ..DEFAULT_ROW
        },
        DisplayOrientation::LandscapeLeft => OrientationOffset {
            secondary_offset: Some(FRAC_PI_2),
            ..DEFAULT_ROW
        },
        DisplayOrientation::LandscapeRight => OrientationOffset {
            secondary_offset: Some(0.0),
            roll_sign_flip: true,
            mounting_twist: LANDSCAPE_RIGHT_MIRROR,
            ..DEFAULT_ROW
        },
        DisplayOrientation::Portrait | DisplayOrientation::Unknown => DEFAULT_ROW,
    }
}

/// Guess the orientation from a window's pixel size.
pub fn orientation_for_size(width: u32, height: u32) -> DisplayOrientation {
    if width == 0 || height == 0 || width == height {
        DisplayOrientation::Unknown
    } else if width > height {
        DisplayOrientation::LandscapeLeft
    } else {
        DisplayOrientation::Portrait
    }
}

/// Synchronous read of the platform's current display orientation.
pub trait DisplayOrientationSource {
    fn current(&self) -> DisplayOrientation;
}

impl DisplayOrientationSource for DisplayOrientation {
    fn current(&self) -> DisplayOrientation {
        *self
    }
}

/// Orientation cell written by the windowing layer and read every frame.
#[derive(Clone, Debug, Default)]
pub struct SharedDisplayOrientation {
    raw: Arc<AtomicU8>,
}

impl SharedDisplayOrientation {
    pub fn new(initial: DisplayOrientation) -> Self {
        SharedDisplayOrientation {
            raw: Arc::new(AtomicU8::new(initial.to_u8())),
        }
    }

    pub fn set(&self, orientation: DisplayOrientation) {
        self.raw.store(orientation.to_u8(), Ordering::Release);
    }
}

impl DisplayOrientationSource for SharedDisplayOrientation {
    fn current(&self) -> DisplayOrientation {
        DisplayOrientation::from_u8(self.raw.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_mounting_corrections() {
        let upside_down = resolve(DisplayOrientation::PortraitUpsideDown);
        assert_eq!(upside_down.secondary_offset, Some(-FRAC_PI_2));
        assert!(!upside_down.roll_sign_flip);

        let left = resolve(DisplayOrientation::LandscapeLeft);
        assert_eq!(left.secondary_offset, Some(FRAC_PI_2));
        assert!(!left.roll_sign_flip);

        let right = resolve(DisplayOrientation::LandscapeRight);
        assert_eq!(right.secondary_offset, Some(0.0));
        assert!(right.roll_sign_flip);
        assert_eq!(right.mounting_twist, PI);

        for orientation in [DisplayOrientation::Portrait, DisplayOrientation::Unknown] {
            let row = resolve(orientation);
            assert_eq!(row.secondary_offset, None);
            assert!(!row.roll_sign_flip);
            assert_eq!(row.mounting_twist, 0.0);
        }

        for orientation in DisplayOrientation::ALL {
            assert_eq!(resolve(orientation).base_yaw, -FRAC_PI_2);
        }
    }

    #[test]
    fn resolve_is_bit_identical_across_calls() {
        for orientation in [
            DisplayOrientation::Portrait,
            DisplayOrientation::LandscapeLeft,
            DisplayOrientation::LandscapeRight,
        ] {
            let a = resolve(orientation);
            let b = resolve(orientation);
            assert_eq!(a.base_yaw.to_bits(), b.base_yaw.to_bits());
            assert_eq!(
                a.secondary_offset.map(f64::to_bits),
                b.secondary_offset.map(f64::to_bits)
            );
            assert_eq!(a.roll_sign_flip, b.roll_sign_flip);
            assert_eq!(a.mounting_twist.to_bits(), b.mounting_twist.to_bits());
        }
    }

    #[test]
    fn corrected_roll_matches_mirror_formula() {
        let roll = 0.5;
        assert_eq!(corrected_roll(roll), -(-PI - 0.5));
        assert!((corrected_roll(roll) - (PI + 0.5)).abs() < 1e-15);
    }

    #[test]
    fn roll_is_only_corrected_for_landscape_right() {
        for orientation in DisplayOrientation::ALL {
            let applied = resolve(orientation).apply_roll(0.2);
            if orientation == DisplayOrientation::LandscapeRight {
                assert!((applied - 3.3416).abs() < 1e-4, "got {applied}");
            } else {
                assert_eq!(applied, 0.2);
            }
        }
    }

    #[test]
    fn baseline_angles_default_missing_secondary_to_zero() {
        let angles = resolve(DisplayOrientation::Portrait).baseline_angles();
        assert_eq!(angles, Vector3::new(-FRAC_PI_2, 0.0, 0.0));
        let angles = resolve(DisplayOrientation::LandscapeRight).baseline_angles();
        assert_eq!(angles, Vector3::new(-FRAC_PI_2, 0.0, PI));
    }

    #[test]
    fn window_aspect_picks_orientation() {
        assert_eq!(orientation_for_size(1920, 1080), DisplayOrientation::LandscapeLeft);
        assert_eq!(orientation_for_size(1080, 1920), DisplayOrientation::Portrait);
        assert_eq!(orientation_for_size(800, 800), DisplayOrientation::Unknown);
        assert_eq!(orientation_for_size(0, 600), DisplayOrientation::Unknown);
    }

    #[test]
    fn shared_orientation_round_trips_every_value() {
        let shared = SharedDisplayOrientation::new(DisplayOrientation::Portrait);
        let reader = shared.clone();
        for orientation in DisplayOrientation::ALL {
            shared.set(orientation);
            assert_eq!(reader.current(), orientation);
        }
    }
}
