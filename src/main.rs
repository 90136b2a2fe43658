use cardboard_rig::config::frame_interval_for_hz;
use cardboard_rig::{
    init_logging, DisplayOrientation, MotionSource, RigConfig, RigError, SimulatedMotionSource,
    UnavailableMotionSource,
};
use clap::{Parser, ValueEnum};
use std::time::Duration;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrientationArg {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl From<OrientationArg> for DisplayOrientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => DisplayOrientation::Portrait,
            OrientationArg::PortraitUpsideDown => DisplayOrientation::PortraitUpsideDown,
            OrientationArg::LandscapeLeft => DisplayOrientation::LandscapeLeft,
            OrientationArg::LandscapeRight => DisplayOrientation::LandscapeRight,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Head-tracked stereo camera rig")]
struct Args {
    /// Distance between the two eye cameras
    #[arg(long, default_value_t = 5.0)]
    interocular: f32,

    /// Height of the stereo pair above the rig origin
    #[arg(long, default_value_t = 10.0)]
    eye_height: f64,

    /// Far clip plane for both eyes
    #[arg(long, default_value_t = 400.0)]
    far_clip: f64,

    /// Motion sampling rate in Hz
    #[arg(long, default_value_t = 60.0)]
    sample_hz: f64,

    /// Display orientation to assume when the window can't tell
    #[arg(long, value_enum, default_value_t = OrientationArg::LandscapeLeft)]
    orientation: OrientationArg,

    /// Run a fixed number of frames without opening a window
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Frame rate in headless mode
    #[arg(long, default_value_t = 90.0)]
    frame_hz: f64,

    /// Behave like a device without a motion sensor
    #[arg(long)]
    no_motion: bool,
}

impl Args {
    fn to_config(&self) -> Result<RigConfig, RigError> {
        let mut config = RigConfig {
            interocular_offset: self.interocular,
            eye_height: self.eye_height,
            far_clip: self.far_clip,
            initial_orientation: self.orientation.into(),
            ..RigConfig::with_defaults()
        };
        config.set_sample_hz(self.sample_hz)?;
        config.validate()?;
        Ok(config)
    }

    fn motion_source(&self) -> Box<dyn MotionSource> {
        if self.no_motion {
            Box::new(UnavailableMotionSource)
        } else {
            Box::new(SimulatedMotionSource::new())
        }
    }

    fn frame_interval(&self) -> Result<Duration, RigError> {
        frame_interval_for_hz(self.frame_hz)
    }
}

fn run(args: &Args) -> Result<(), RigError> {
    let config = args.to_config()?;
    if args.headless {
        cfg_if::cfg_if! {
            if #[cfg(target_arch = "wasm32")] {
                return Err(RigError::EventLoop("headless mode needs threads".to_string()));
            } else {
                let stats = cardboard_rig::run_headless(
                    config,
                    args.motion_source(),
                    args.frames,
                    args.frame_interval()?,
                )?;
                println!(
                    "{} frames: {} updated, {} reused, {} held, {} samples skipped",
                    stats.frames, stats.updates, stats.reused, stats.held, stats.skipped_samples
                );
                return Ok(());
            }
        }
    }
    cardboard_rig::run_windowed(config, args.motion_source())
}

fn main() {
    let args = Args::parse();
    init_logging();
    if let Err(error) = run(&args) {
        log::error!("{error}");
        eprintln!("cardboard-rig: {error}");
        std::process::exit(1);
    }
}
