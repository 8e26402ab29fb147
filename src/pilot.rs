use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::controller::FlightController;
use crate::errors::{PilotError, Result};
use crate::mission::{Mission, Waypoint};
use crate::options::PilotOptions;
use crate::reporter::TelemetryReporter;
use crate::tasks::TaskSet;
use crate::telemetry::{start_listeners, TelemetrySnapshot};
use crate::types::PositionNedYaw;

// states
#[derive(Debug)]
pub struct Disconnected;

#[derive(Debug)]
pub struct Connected {
    session: Session,
}

#[derive(Debug)]
pub struct Armed {
    session: Session,
}

#[derive(Debug)]
pub struct Offboard {
    session: Session,
}

/// What lives from connection until landing: options, the shared snapshot
/// and the background tasks feeding or reading it.
#[derive(Debug)]
struct Session {
    options: PilotOptions,
    snapshot: Arc<TelemetrySnapshot>,
    tasks: TaskSet,
}

impl Session {
    async fn cancel_tasks(&mut self) {
        let grace = self.options.cancel_grace;
        let total = self.tasks.len();
        let stopped = self.tasks.cancel_all(grace).await;
        info!("[Pilot] cancelled background tasks ({stopped}/{total} stopped)");
    }
}

/// Flight sequencer driving a [`FlightController`] through
/// connect → arm → offboard → waypoints → land.
#[derive(Debug)]
pub struct Pilot<C, S = Disconnected> {
    controller: C,
    state: S,
}

impl<C: FlightController> Pilot<C, Disconnected> {
    pub fn new(controller: C) -> Self {
        Self { controller, state: Disconnected }
    }

    pub async fn connect(self) -> Result<Pilot<C, Connected>> {
        self.connect_with(PilotOptions::default()).await
    }

    /// Connects, waits for the link and a first position fix, then starts
    /// listening to position and attitude telemetry.
    pub async fn connect_with(self, options: PilotOptions) -> Result<Pilot<C, Connected>> {
        let controller = self.controller;
        let address = options.system_address.clone();

        info!("[Pilot] CONNECT {address}");
        controller.connect(&address).await?;

        info!("[Pilot] waiting for drone to connect...");
        let mut connection = controller.connection_state();
        loop {
            match connection.recv().await {
                Some(state) if state.is_connected => break,
                Some(_) => continue,
                None => return Err(PilotError::TelemetryEnded { stream: "connection state" }),
            }
        }

        info!("[Pilot] waiting for position lock...");
        controller
            .position()
            .recv()
            .await
            .ok_or(PilotError::TelemetryEnded { stream: "position" })?;

        let snapshot = TelemetrySnapshot::new();
        let mut tasks = TaskSet::new();
        start_listeners(
            controller.position_velocity_ned(),
            controller.attitude_euler(),
            &snapshot,
            &mut tasks,
        );

        info!("[Pilot] CONNECTED");

        let session = Session { options, snapshot, tasks };
        Ok(Pilot { controller, state: Connected { session } })
    }
}

impl<C: FlightController> Pilot<C, Connected> {
    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        Arc::clone(&self.state.session.snapshot)
    }

    pub async fn arm(self) -> Result<Pilot<C, Armed>> {
        info!("[Pilot] Arming...");
        self.controller.arm().await?;
        Ok(Pilot { controller: self.controller, state: Armed { session: self.state.session } })
    }
}

impl<C: FlightController> Pilot<C, Armed> {
    /// Sends the priming setpoint, lets it settle, then asks for offboard
    /// control.
    ///
    /// If the vehicle refuses, it is disarmed, the background tasks are
    /// cancelled and [`PilotError::OffboardRejected`] is returned. Any other
    /// error is passed straight through.
    pub async fn start_offboard(self, priming: PositionNedYaw) -> Result<Pilot<C, Offboard>> {
        let Pilot { controller, state: Armed { mut session } } = self;

        // offboard will not start without a setpoint already in place
        controller.set_position_ned(priming).await?;
        sleep(session.options.settle_interval).await;

        match controller.start_offboard().await {
            Ok(()) => {}
            Err(PilotError::OffboardRejected { reason }) => {
                warn!("[Pilot] could not start offboard - {reason}");
                controller.disarm().await?;
                session.cancel_tasks().await;
                return Err(PilotError::OffboardRejected { reason });
            }
            Err(err) => return Err(err),
        }

        info!("[Pilot] OFFBOARD");
        Ok(Pilot { controller, state: Offboard { session } })
    }
}

impl<C: FlightController> Pilot<C, Offboard> {
    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        Arc::clone(&self.state.session.snapshot)
    }

    pub fn start_reporter(&mut self) {
        let session = &mut self.state.session;
        TelemetryReporter::start(
            Arc::clone(&session.snapshot),
            session.options.report_interval,
            session.options.status_sender.clone(),
        )
        .register(&mut session.tasks);
    }

    pub async fn dwell(&self, duration: Duration) {
        sleep(duration).await;
    }

    /// Sends the waypoint's setpoint and holds it for its dwell time.
    pub async fn fly_to(&self, waypoint: &Waypoint) -> Result<()> {
        info!("[Pilot] {} ({})", waypoint.label, waypoint.target);
        self.controller.set_position_ned(waypoint.target).await?;
        self.dwell(waypoint.dwell).await;
        Ok(())
    }

    /// Cancels the background tasks, leaves offboard mode and lands.
    ///
    /// Returns once the land command is accepted, not once on the ground.
    pub async fn land(self) -> Result<()> {
        let Pilot { controller, state: Offboard { mut session } } = self;

        session.cancel_tasks().await;

        info!("[Pilot] LAND");
        controller.stop_offboard().await?;
        controller.land().await?;
        Ok(())
    }
}

/// How a mission ended, when it ended without an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightOutcome {
    Landed { waypoints_flown: usize },
    OffboardRejected { reason: String },
}

/// Flies `mission` from connection to the land command.
pub async fn fly_mission<C: FlightController>(
    controller: C,
    mission: &Mission,
    options: PilotOptions,
) -> Result<FlightOutcome> {
    mission.validate()?;

    let drone = Pilot::new(controller).connect_with(options).await?;
    let drone = drone.arm().await?;

    info!("[Pilot] Takeoff to {} m", mission.takeoff_altitude_m);
    let mut drone = match drone.start_offboard(mission.takeoff_setpoint()).await {
        Ok(drone) => drone,
        Err(PilotError::OffboardRejected { reason }) => {
            return Ok(FlightOutcome::OffboardRejected { reason })
        }
        Err(err) => return Err(err),
    };

    drone.start_reporter();
    drone.dwell(mission.takeoff_dwell).await;

    for waypoint in &mission.waypoints {
        drone.fly_to(waypoint).await?;
    }

    info!("[Pilot] Stop offboard and land");
    drone.land().await?;

    Ok(FlightOutcome::Landed { waypoints_flown: mission.waypoints.len() })
}
