use std::time::Duration;

/// Frame the motion service reports attitude against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttitudeReferenceFrame {
    /// Z points along gravity, X is wherever the device faced when updates started.
    #[default]
    XArbitraryZVertical,
    /// Same as above, with X corrected against the magnetometer.
    XArbitraryCorrectedZVertical,
}

/// One attitude reading from the motion service.
///
/// Angles are radians. `timestamp` is measured from when the producing
/// service started updates, so two samples with the same timestamp are the
/// same reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttitudeSample {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub timestamp: Duration,
}

impl AttitudeSample {
    pub const fn new(roll: f64, pitch: f64, yaw: f64, timestamp: Duration) -> Self {
        AttitudeSample {
            roll,
            pitch,
            yaw,
            timestamp,
        }
    }

    /// Level, facing the reference direction.
    pub const fn level(timestamp: Duration) -> Self {
        Self::new(0.0, 0.0, 0.0, timestamp)
    }

    pub fn is_finite(&self) -> bool {
        self.roll.is_finite() && self.pitch.is_finite() && self.yaw.is_finite()
    }
}
