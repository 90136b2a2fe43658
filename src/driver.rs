//! Per-frame glue between the motion feed and the rig.
//!
//! The driver lives on the render context. The motion sampler only ever
//! writes into its sample slot; every rig write happens here, inside
//! [`StereoFrameDriver::frame`], so no transform is ever mutated from the
//! sensor's thread.

use crate::attitude::AttitudeSample;
use crate::config::RigConfig;
use crate::motion::{LatestSample, MotionSampler};
use crate::orientation::{resolve, DisplayOrientation, DisplayOrientationSource};
use crate::point_of_view::{StereoFrame, StereoRenderer};
use crate::rig::{CameraRig, Eye};
use log::{debug, info, warn};
use std::thread::{self, ThreadId};
use std::time::Duration;

/// Read side of the motion feed.
pub trait MotionFeed {
    fn latest(&self) -> Option<AttitudeSample>;

    /// Total samples published so far, if the feed counts them.
    fn published_count(&self) -> Option<u64> {
        None
    }
}

impl MotionFeed for LatestSample {
    fn latest(&self) -> Option<AttitudeSample> {
        LatestSample::latest(self)
    }

    fn published_count(&self) -> Option<u64> {
        Some(LatestSample::published_count(self))
    }
}

impl MotionFeed for MotionSampler {
    fn latest(&self) -> Option<AttitudeSample> {
        MotionSampler::latest(self)
    }

    fn published_count(&self) -> Option<u64> {
        Some(self.slot().published_count())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A sample newer than the previous frame's was written into the rig.
    Updated,
    /// The sensor has not produced anything new since the last frame.
    Reused,
    /// No usable sample; the rig kept its previous pose.
    Held,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub updates: u64,
    pub reused: u64,
    pub held: u64,
    /// Samples with non-finite angles, dropped before reaching the rig.
    pub rejected: u64,
    /// Samples overwritten in the slot before any frame read them.
    pub skipped_samples: u64,
}

pub struct StereoFrameDriver<M, D> {
    rig: CameraRig,
    motion: M,
    display: D,
    render_thread: ThreadId,
    last_orientation: Option<DisplayOrientation>,
    last_applied: Option<Duration>,
    last_published: u64,
    stats: FrameStats,
    stats_interval_frames: u64,
    next_index: u64,
}

impl<M: MotionFeed, D: DisplayOrientationSource> StereoFrameDriver<M, D> {
    /// Must be called on the render context; frames are only accepted there.
    pub fn new(rig: CameraRig, motion: M, display: D) -> Self {
        StereoFrameDriver {
            rig,
            motion,
            display,
            render_thread: thread::current().id(),
            last_orientation: None,
            last_applied: None,
            last_published: 0,
            stats: FrameStats::default(),
            stats_interval_frames: crate::config::DEFAULT_STATS_INTERVAL_FRAMES,
            next_index: 0,
        }
    }

    /// Builds the rig with the baseline of whatever orientation the display
    /// reports now. An unknown orientation gets the uncorrected row.
    pub fn from_config(config: &RigConfig, motion: M, display: D) -> Self {
        let orientation = display.current();
        info!("rig baseline set for {orientation} display");
        let rig = CameraRig::from_config(config, resolve(orientation));
        let mut driver = Self::new(rig, motion, display);
        driver.stats_interval_frames = config.stats_interval_frames.max(1);
        driver
    }

    pub fn frame(&mut self, time: Duration) -> StereoFrame {
        assert_eq!(
            thread::current().id(),
            self.render_thread,
            "rig transforms must be written from the render context"
        );

        let outcome = self.apply_latest_sample();
        self.stats.frames += 1;
        match outcome {
            FrameOutcome::Updated => self.stats.updates += 1,
            FrameOutcome::Reused => self.stats.reused += 1,
            FrameOutcome::Held => self.stats.held += 1,
        }
        if self.stats.frames % self.stats_interval_frames == 0 {
            debug!("rig frame stats: {:?}", self.stats);
        }

        let index = self.next_index;
        self.next_index += 1;
        StereoFrame {
            index,
            time,
            outcome,
            left: self.rig.eye_view(Eye::Left),
            right: self.rig.eye_view(Eye::Right),
        }
    }

    /// Runs one frame and hands both points of view to the renderer.
    pub fn render<R: StereoRenderer + ?Sized>(
        &mut self,
        time: Duration,
        renderer: &mut R,
    ) -> FrameOutcome {
        let frame = self.frame(time);
        renderer.render(&frame);
        frame.outcome
    }

    fn apply_latest_sample(&mut self) -> FrameOutcome {
        let Some(sample) = self.motion.latest() else {
            return FrameOutcome::Held;
        };
        if !sample.is_finite() {
            self.stats.rejected += 1;
            if let Some(published) = self.motion.published_count() {
                self.last_published = published;
            }
            warn!("dropping non-finite attitude sample at {:?}", sample.timestamp);
            return FrameOutcome::Held;
        }

        let orientation = self.display.current();
        if self.last_orientation != Some(orientation) {
            if let Some(previous) = self.last_orientation {
                info!("display orientation changed: {previous} -> {orientation}");
            }
            self.last_orientation = Some(orientation);
        }
        let offset = resolve(orientation);
        self.rig.update(&sample, &offset);

        let fresh = self.last_applied != Some(sample.timestamp);
        self.last_applied = Some(sample.timestamp);
        if let Some(published) = self.motion.published_count() {
            if fresh && self.last_published > 0 {
                let arrived = published.saturating_sub(self.last_published);
                self.stats.skipped_samples += arrived.saturating_sub(1);
            }
            self.last_published = published;
        }

        if fresh {
            FrameOutcome::Updated
        } else {
            FrameOutcome::Reused
        }
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn motion_mut(&mut self) -> &mut M {
        &mut self.motion
    }
}
