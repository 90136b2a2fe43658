//! Browser motion feed: `deviceorientation` events publish straight into the
//! sample slot, no sampler thread involved.

use crate::attitude::AttitudeSample;
use crate::motion::LatestSample;
use log::info;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::DeviceOrientationEvent;
use web_time::Instant;

const EVENT_NAME: &str = "deviceorientation";

pub struct DeviceOrientationListener {
    window: web_sys::Window,
    closure: Closure<dyn FnMut(DeviceOrientationEvent)>,
}

/// Browsers report beta about x, gamma about y and alpha about z, in degrees.
fn sample_from_event(event: &DeviceOrientationEvent, started: Instant) -> Option<AttitudeSample> {
    let alpha = event.alpha()?;
    let beta = event.beta()?;
    let gamma = event.gamma()?;
    Some(AttitudeSample::new(
        gamma.to_radians(),
        beta.to_radians(),
        alpha.to_radians(),
        started.elapsed(),
    ))
}

pub fn attach_device_orientation(slot: LatestSample) -> Option<DeviceOrientationListener> {
    let window = web_sys::window()?;
    let started = Instant::now();
    let closure = Closure::<dyn FnMut(DeviceOrientationEvent)>::new(
        move |event: DeviceOrientationEvent| {
            if let Some(sample) = sample_from_event(&event, started) {
                slot.publish(sample);
            }
        },
    );
    window
        .add_event_listener_with_callback(EVENT_NAME, closure.as_ref().unchecked_ref())
        .ok()?;
    info!("listening for {EVENT_NAME} events");
    Some(DeviceOrientationListener { window, closure })
}

impl Drop for DeviceOrientationListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback(EVENT_NAME, self.closure.as_ref().unchecked_ref());
    }
}
