//! Test doubles shared by the unit tests.

use crate::attitude::{AttitudeReferenceFrame, AttitudeSample};
use crate::motion::MotionSource;
use crate::point_of_view::{StereoFrame, StereoRenderer};
use std::thread;
use std::time::{Duration, Instant};

/// Motion service that reports the same reading for as long as it runs.
#[derive(Debug)]
pub(crate) struct FixedMotionSource {
    sample: AttitudeSample,
    running: bool,
}

impl FixedMotionSource {
    pub(crate) fn new(sample: AttitudeSample) -> Self {
        FixedMotionSource {
            sample,
            running: false,
        }
    }
}

impl MotionSource for FixedMotionSource {
    fn start_updates(&mut self, _interval: Duration, _reference: AttitudeReferenceFrame) -> bool {
        self.running = true;
        true
    }

    fn latest_sample(&mut self) -> Option<AttitudeSample> {
        self.running.then_some(self.sample)
    }

    fn stop_updates(&mut self) {
        self.running = false;
    }
}

/// Motion service whose driver crashes as soon as updates start.
#[derive(Debug)]
pub(crate) struct PanickingMotionSource;

impl MotionSource for PanickingMotionSource {
    fn start_updates(&mut self, _interval: Duration, _reference: AttitudeReferenceFrame) -> bool {
        panic!("motion driver crashed");
    }

    fn latest_sample(&mut self) -> Option<AttitudeSample> {
        None
    }

    fn stop_updates(&mut self) {}
}

#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) frames: Vec<StereoFrame>,
}

impl StereoRenderer for RecordingRenderer {
    fn render(&mut self, frame: &StereoFrame) {
        self.frames.push(*frame);
    }
}

/// Polls `condition` until it holds or `timeout` passes.
pub(crate) fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
