use crate::error::{Result, RigError};
use crate::motion::DEFAULT_SAMPLE_INTERVAL;
use crate::orientation::DisplayOrientation;
use crate::rig::DEFAULT_FIELD_OF_VIEW_Y;
use std::time::Duration;

pub const DEFAULT_INTEROCULAR_OFFSET: f32 = 5.0;
pub const DEFAULT_EYE_HEIGHT: f64 = 10.0;
pub const DEFAULT_NEAR_CLIP: f64 = 0.1;
// Renderers commonly default to a far plane of 100, which clips most of a
// 200-unit room.
pub const DEFAULT_FAR_CLIP: f64 = 400.0;
pub const DEFAULT_STATS_INTERVAL_FRAMES: u64 = 300;
const MIN_SAMPLE_HZ: f64 = 1.0;
const MAX_SAMPLE_HZ: f64 = 1000.0;
const MIN_FRAME_HZ: f64 = 1.0;
const MAX_FRAME_HZ: f64 = 1000.0;

/// Frame period for a headless render rate.
pub fn frame_interval_for_hz(hz: f64) -> Result<Duration> {
    if !hz.is_finite() || !(MIN_FRAME_HZ..=MAX_FRAME_HZ).contains(&hz) {
        return Err(invalid(
            "frame_hz",
            format!("{hz} Hz is outside {MIN_FRAME_HZ}..={MAX_FRAME_HZ} Hz"),
        ));
    }
    Ok(Duration::from_secs_f64(1.0 / hz))
}

#[derive(Clone, Debug, PartialEq)]
pub struct RigConfig {
    pub interocular_offset: f32,
    pub eye_height: f64,
    pub near_clip: f64,
    pub far_clip: f64,
    pub field_of_view_y: f64,
    pub sample_interval: Duration,
    pub stats_interval_frames: u64,
    pub initial_orientation: DisplayOrientation,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RigConfig {
    pub fn with_defaults() -> Self {
        Self {
            interocular_offset: DEFAULT_INTEROCULAR_OFFSET,
            eye_height: DEFAULT_EYE_HEIGHT,
            near_clip: DEFAULT_NEAR_CLIP,
            far_clip: DEFAULT_FAR_CLIP,
            field_of_view_y: DEFAULT_FIELD_OF_VIEW_Y,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            stats_interval_frames: DEFAULT_STATS_INTERVAL_FRAMES,
            initial_orientation: DisplayOrientation::LandscapeLeft,
        }
    }

    pub fn sample_hz(&self) -> f64 {
        1.0 / self.sample_interval.as_secs_f64()
    }

    pub fn set_sample_hz(&mut self, hz: f64) -> Result<()> {
        if !hz.is_finite() || !(MIN_SAMPLE_HZ..=MAX_SAMPLE_HZ).contains(&hz) {
            return Err(invalid(
                "sample_interval",
                format!("{hz} Hz is outside {MIN_SAMPLE_HZ}..={MAX_SAMPLE_HZ} Hz"),
            ));
        }
        self.sample_interval = Duration::from_secs_f64(1.0 / hz);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let offset = self.interocular_offset;
        if !offset.is_finite() || offset <= 0.0 {
            return Err(invalid("interocular_offset", format!("{offset} must be positive")));
        }
        if !self.eye_height.is_finite() {
            return Err(invalid("eye_height", format!("{} is not finite", self.eye_height)));
        }
        if !self.near_clip.is_finite() || self.near_clip <= 0.0 {
            return Err(invalid("near_clip", format!("{} must be positive", self.near_clip)));
        }
        if !self.far_clip.is_finite() || self.far_clip <= self.near_clip {
            return Err(invalid(
                "far_clip",
                format!("{} must exceed near_clip {}", self.far_clip, self.near_clip),
            ));
        }
        let fov = self.field_of_view_y;
        if !fov.is_finite() || fov <= 0.0 || fov >= std::f64::consts::PI {
            return Err(invalid("field_of_view_y", format!("{fov} rad is not in (0, pi)")));
        }
        if self.sample_interval.is_zero() {
            return Err(invalid("sample_interval", "must be non-zero".to_string()));
        }
        let hz = self.sample_hz();
        if !(MIN_SAMPLE_HZ..=MAX_SAMPLE_HZ).contains(&hz) {
            return Err(invalid(
                "sample_interval",
                format!("{hz:.1} Hz is outside {MIN_SAMPLE_HZ}..={MAX_SAMPLE_HZ} Hz"),
            ));
        }
        if self.stats_interval_frames == 0 {
            return Err(invalid("stats_interval_frames", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> RigError {
    RigError::InvalidConfig { field, reason }
}
