//////////////////////////////////////////////////////////////////////////////
//
// Take off to 5 m, fly a 2 m square and land, against the simulated drone.
//
// A status line is logged twice a second once position and attitude are
// known. Set RUST_LOG=debug to see every command and task cancellation.
//
//////////////////////////////////////////////////////////////////////////////

extern crate offboard_pilot;

use offboard_pilot::{
    fly_mission, logging, CameraOptions, CameraSession, FlightOutcome, Mission, PilotOptions,
    SimulatedDrone, SimulatedStereoCamera,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // the camera is opened alongside the flight, but its frames are not used
    let _camera = match CameraSession::open(SimulatedStereoCamera::default(), CameraOptions::default()) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let drone = SimulatedDrone::default();
    let mission = Mission::default();

    match fly_mission(drone.clone(), &mission, PilotOptions::default()).await? {
        FlightOutcome::Landed { waypoints_flown } => {
            println!("landing after {waypoints_flown} waypoints");
        }
        FlightOutcome::OffboardRejected { reason } => {
            println!("could not start offboard: {reason}");
        }
    }

    for command in drone.commands() {
        println!("  {command}");
    }

    Ok(())
}
