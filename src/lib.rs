pub mod attitude;
pub mod config;
pub mod driver;
pub mod error;
pub mod matrix_operations;
pub mod motion;
pub mod orientation;
pub mod point_of_view;
pub mod rig;
#[cfg(test)]
mod testkit;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use log::info;
use web_time::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

pub use attitude::{AttitudeReferenceFrame, AttitudeSample};
pub use config::RigConfig;
pub use driver::{FrameOutcome, FrameStats, MotionFeed, StereoFrameDriver};
pub use error::{Result, RigError};
pub use motion::{LatestSample, MotionSampler, MotionSource, SimulatedMotionSource, UnavailableMotionSource};
pub use orientation::{
    corrected_roll, orientation_for_size, resolve, DisplayOrientation, DisplayOrientationSource,
    OrientationOffset, SharedDisplayOrientation,
};
pub use point_of_view::{EyeUniform, EyeView, LogRenderer, StereoFrame, StereoRenderer};
pub use rig::{CameraRig, Eye, EyeCamera};

pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            let _ = console_log::init_with_level(log::Level::Debug);
        } else {
            let _ = env_logger::try_init();
        }
    }
}

/// Keeps whichever platform producer feeds the slot alive.
struct MotionHandle {
    slot: LatestSample,
    #[cfg(not(target_arch = "wasm32"))]
    sampler: MotionSampler,
    #[cfg(target_arch = "wasm32")]
    listener: Option<web::DeviceOrientationListener>,
}

impl MotionHandle {
    #[cfg(not(target_arch = "wasm32"))]
    fn start(config: &RigConfig, source: Box<dyn MotionSource>) -> Result<Self> {
        let mut sampler = MotionSampler::new(source);
        sampler.start(config.sample_interval)?;
        Ok(MotionHandle {
            slot: sampler.slot(),
            sampler,
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn start(_config: &RigConfig, _source: Box<dyn MotionSource>) -> Result<Self> {
        let slot = LatestSample::new();
        let listener = web::attach_device_orientation(slot.clone());
        if listener.is_none() {
            log::warn!("device orientation events unavailable; rig keeps its default pose");
        }
        Ok(MotionHandle { slot, listener })
    }

    fn stop(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        self.sampler.stop();
        #[cfg(target_arch = "wasm32")]
        self.listener.take();
        self.slot.clear();
    }
}

fn aspect_of(width: u32, height: u32) -> f64 {
    // Each eye gets half the window.
    (width.max(1) as f64 / 2.0) / height.max(1) as f64
}

/// Opens a window and drives the rig from its redraw callback.
pub fn run_windowed(config: RigConfig, source: Box<dyn MotionSource>) -> Result<()> {
    config.validate()?;

    let event_loop = EventLoop::new().map_err(|e| RigError::EventLoop(e.to_string()))?;
    let window = WindowBuilder::new()
        .with_title("cardboard-rig")
        .build(&event_loop)
        .map_err(|e| RigError::EventLoop(e.to_string()))?;

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::WindowExtWebSys;
        let appended = web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| {
                let body = doc.body()?;
                let canvas = web_sys::Element::from(window.canvas()?);
                body.append_child(&canvas).ok()?;
                Some(())
            });
        if appended.is_none() {
            log::warn!("couldn't append canvas to document body");
        }
    }

    let size = window.inner_size();
    let display = SharedDisplayOrientation::new(orientation_for_size(size.width, size.height));
    let mut motion = MotionHandle::start(&config, source)?;
    let mut driver = StereoFrameDriver::from_config(&config, motion.slot.clone(), display.clone());
    let mut renderer = LogRenderer::new(config.stats_interval_frames);
    renderer.set_aspect(aspect_of(size.width, size.height));

    let start_time = Instant::now();
    info!("rig running in a {}x{} window", size.width, size.height);

    event_loop
        .run(move |event, target| match event {
            Event::AboutToWait => window.request_redraw(),
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(new_size) => {
                    display.set(orientation_for_size(new_size.width, new_size.height));
                    renderer.set_aspect(aspect_of(new_size.width, new_size.height));
                }
                WindowEvent::RedrawRequested => {
                    driver.render(start_time.elapsed(), &mut renderer);
                }
                WindowEvent::CloseRequested => {
                    motion.stop();
                    info!("final rig frame stats: {:?}", driver.stats());
                    target.exit();
                }
                _ => {}
            },
            _ => {}
        })
        .map_err(|e| RigError::EventLoop(e.to_string()))
}

/// Offset of frame `index` from the start of a fixed-rate loop.
fn frame_due(frame_interval: std::time::Duration, index: u64) -> std::time::Duration {
    std::time::Duration::try_from_secs_f64(frame_interval.as_secs_f64() * index as f64)
        .unwrap_or(std::time::Duration::MAX)
}

/// Fixed-rate frame loop without a window. Returns the frame statistics.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_headless(
    config: RigConfig,
    source: Box<dyn MotionSource>,
    frames: u64,
    frame_interval: std::time::Duration,
) -> Result<FrameStats> {
    config.validate()?;

    let mut sampler = MotionSampler::new(source);
    sampler.start(config.sample_interval)?;
    let mut driver = StereoFrameDriver::from_config(&config, sampler, config.initial_orientation);
    let mut renderer = LogRenderer::new(config.stats_interval_frames);

    let start_time = Instant::now();
    for frame in 0..frames {
        let due = frame_due(frame_interval, frame);
        if let Some(wait) = due.checked_sub(start_time.elapsed()) {
            std::thread::sleep(wait);
        }
        driver.render(start_time.elapsed(), &mut renderer);
    }

    driver.motion_mut().stop();
    let stats = driver.stats();
    info!("headless run finished: {stats:?}");
    Ok(stats)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn run() {
    init_logging();
    if let Err(error) = run_windowed(RigConfig::default(), Box::new(SimulatedMotionSource::new())) {
        log::error!("{error}");
    }
}
