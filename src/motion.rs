//! Motion sampling.
//!
//! The motion service produces attitude samples on its own cadence. Samples
//! land in a [`LatestSample`] slot that the frame driver reads once per frame.
//! The slot is deliberately lossy: a newer sample overwrites an unread one,
//! and a frame that runs faster than the sensor reads the same sample again.

use crate::attitude::{AttitudeReferenceFrame, AttitudeSample};
use crate::error::{Result, RigError};
use log::{debug, info, warn};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use web_time::Instant;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

#[derive(Debug, Default)]
struct Slot {
    sample: Option<AttitudeSample>,
    published: u64,
}

/// Single-slot, last-write-wins holder for the newest attitude sample.
///
/// Not a queue: there is no history and no backpressure.
#[derive(Clone, Debug, Default)]
pub struct LatestSample {
    slot: Arc<Mutex<Slot>>,
}

impl LatestSample {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // A publisher that panicked mid-write cannot leave a torn sample
        // behind, the slot is replaced whole.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, sample: AttitudeSample) {
        let mut slot = self.lock();
        slot.sample = Some(sample);
        slot.published += 1;
    }

    pub fn latest(&self) -> Option<AttitudeSample> {
        self.lock().sample
    }

    /// Number of samples ever published, including overwritten ones.
    pub fn published_count(&self) -> u64 {
        self.lock().published
    }

    pub fn clear(&self) {
        self.lock().sample = None;
    }
}

/// Platform motion service.
pub trait MotionSource: Send {
    /// Returns `false` if the device has no usable motion service.
    fn start_updates(&mut self, interval: Duration, reference: AttitudeReferenceFrame) -> bool;
    fn latest_sample(&mut self) -> Option<AttitudeSample>;
    fn stop_updates(&mut self);
}

struct SamplerWorker {
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<Box<dyn MotionSource>>,
}

/// Polls a [`MotionSource`] on a background thread and publishes every new
/// reading into a [`LatestSample`].
pub struct MotionSampler {
    slot: LatestSample,
    reference: AttitudeReferenceFrame,
    source: Option<Box<dyn MotionSource>>,
    worker: Option<SamplerWorker>,
}

impl MotionSampler {
    pub fn new(source: Box<dyn MotionSource>) -> Self {
        MotionSampler {
            slot: LatestSample::new(),
            reference: AttitudeReferenceFrame::default(),
            source: Some(source),
            worker: None,
        }
    }

    pub fn with_reference_frame(mut self, reference: AttitudeReferenceFrame) -> Self {
        self.reference = reference;
        self
    }

    /// Handle for push-based platforms that deliver samples via callback.
    pub fn slot(&self) -> LatestSample {
        self.slot.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn start(&mut self, interval: Duration) -> Result<()> {
        if self.worker.is_some() {
            return Err(RigError::SamplerAlreadyRunning);
        }
        let Some(mut source) = self.source.take() else {
            return Err(RigError::SamplerSourceLost);
        };

        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();
        let slot = self.slot.clone();
        let reference = self.reference;

        let spawned = thread::Builder::new()
            .name("motion-sampler".to_string())
            .spawn(move || {
                if !source.start_updates(interval, reference) {
                    warn!("motion service unavailable; rig keeps its default pose");
                    return source;
                }
                let mut last_timestamp = None;
                while !thread_shutdown.load(Ordering::Acquire) {
                    if let Some(sample) = source.latest_sample() {
                        if last_timestamp != Some(sample.timestamp) {
                            last_timestamp = Some(sample.timestamp);
                            slot.publish(sample);
                        }
                    }
                    thread::park_timeout(interval);
                }
                source.stop_updates();
                source
            });

        match spawned {
            Ok(handle) => {
                info!(
                    "motion sampler started at {:.1} Hz ({:?})",
                    1.0 / interval.as_secs_f64(),
                    reference
                );
                self.worker = Some(SamplerWorker { shutdown, handle });
                Ok(())
            }
            Err(error) => Err(RigError::SamplerThread(error)),
        }
    }

    pub fn latest(&self) -> Option<AttitudeSample> {
        self.slot.latest()
    }

    /// Releases the sensor. Frames after this see no sample.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.shutdown.store(true, Ordering::Release);
        worker.handle.thread().unpark();
        match worker.handle.join() {
            Ok(source) => self.source = Some(source),
            Err(_) => warn!("motion sampler thread panicked; source dropped"),
        }
        self.slot.clear();
        debug!("motion sampler stopped");
    }
}

impl Drop for MotionSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A device with no motion hardware.
#[derive(Debug, Default)]
pub struct UnavailableMotionSource;

impl MotionSource for UnavailableMotionSource {
    fn start_updates(&mut self, _interval: Duration, _reference: AttitudeReferenceFrame) -> bool {
        false
    }

    fn latest_sample(&mut self) -> Option<AttitudeSample> {
        None
    }

    fn stop_updates(&mut self) {}
}

/// Deterministic head sway: a slow look-around with a small nod and tilt.
#[derive(Debug)]
pub struct SimulatedMotionSource {
    started: Option<Instant>,
    yaw_amplitude: f64,
    yaw_period_secs: f64,
    pitch_amplitude: f64,
    pitch_period_secs: f64,
    roll_amplitude: f64,
    roll_period_secs: f64,
}

impl Default for SimulatedMotionSource {
    fn default() -> Self {
        SimulatedMotionSource {
            started: None,
            yaw_amplitude: 0.9,
            yaw_period_secs: 12.0,
            pitch_amplitude: 0.2,
            pitch_period_secs: 5.0,
            roll_amplitude: 0.08,
            roll_period_secs: 7.0,
        }
    }
}

impl SimulatedMotionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_at(&self, elapsed: Duration) -> AttitudeSample {
        let t = elapsed.as_secs_f64();
        let wave = |amplitude: f64, period: f64| amplitude * (TAU * t / period).sin();
        AttitudeSample::new(
            wave(self.roll_amplitude, self.roll_period_secs),
            wave(self.pitch_amplitude, self.pitch_period_secs),
            wave(self.yaw_amplitude, self.yaw_period_secs),
            elapsed,
        )
    }
}

impl MotionSource for SimulatedMotionSource {
    fn start_updates(&mut self, _interval: Duration, _reference: AttitudeReferenceFrame) -> bool {
        self.started = Some(Instant::now());
        true
    }

    fn latest_sample(&mut self) -> Option<AttitudeSample> {
        let started = self.started?;
        Some(self.sample_at(started.elapsed()))
    }

    fn stop_updates(&mut self) {
        self.started = None;
    }
}
