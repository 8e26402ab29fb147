mod errors;
mod types;
mod command;
mod controller;
mod telemetry;
mod tasks;
mod reporter;
mod options;
mod mission;
mod pilot;
mod sim;
mod camera;
mod sim_camera;
mod depth;
mod preview;
#[cfg(feature = "display")]
mod display;
pub mod logging;

pub use errors::{PilotError, Result};
pub use types::*;
pub use command::FlightCommand;
pub use controller::{FlightController, TelemetryReceiver, TelemetrySender, make_telemetry_channel};
pub use telemetry::{TelemetrySnapshot, StatusReport};
pub use tasks::TaskSet;
pub use reporter::{TelemetryReporter, StatusSender, StatusReceiver};
pub use options::{PilotOptions, DEFAULT_SYSTEM_ADDRESS};
pub use mission::{Mission, Waypoint};
pub use pilot::{Pilot, Disconnected, Connected, Armed, Offboard, FlightOutcome, fly_mission};
pub use sim::{SimulatedDrone, SimOptions};
pub use camera::{
    CameraOptions, CameraSession, CameraStatus, DepthMode, FrameSet, RawDepth, RawImage,
    Resolution, StereoCamera, Unit, View,
};
pub use sim_camera::{SimulatedStereoCamera, SimCameraOptions};
pub use depth::{DepthMap, normalize_depth, jet, colorize, render_depth};
pub use preview::{PreviewSink, PreviewStats, run_preview};
#[cfg(feature = "display")]
pub use display::SdlPreview;
