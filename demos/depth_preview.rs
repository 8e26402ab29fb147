//////////////////////////////////////////////////////////////////////////////
//
// Live left / right / depth preview from the simulated stereo camera.
//
// Depth is log-scaled and shown as a heat map, near = red, far = blue.
// Press 'q' (or Esc, or close a window) to exit.
//
// Needs SDL2: cargo run --example depth_preview --features display
//
//////////////////////////////////////////////////////////////////////////////

extern crate offboard_pilot;

use offboard_pilot::{
    logging, run_preview, CameraOptions, CameraSession, SdlPreview, SimulatedStereoCamera,
};

fn main() -> anyhow::Result<()> {
    logging::init();

    let options = CameraOptions::default();
    let mut session = match CameraSession::open(SimulatedStereoCamera::default(), options) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    // SDL must run on the main thread
    let (width, height) = options.resolution.dimensions();
    let mut windows = SdlPreview::new(width, height)?;

    println!("Press 'q' to exit.");
    let stats = run_preview(&mut session, &mut windows)?;
    println!("{} frames shown, {} failed grabs", stats.frames_shown, stats.grab_failures);

    Ok(())
}
