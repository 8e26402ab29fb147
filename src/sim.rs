//! An in-process simulated drone implementing [`FlightController`].
//!
//! Kinematics only: the vehicle moves straight towards its setpoint at a
//! capped speed, tilts in the direction of travel and slews its yaw. Good
//! enough to exercise a mission end to end without a real autopilot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::command::FlightCommand;
use crate::controller::*;
use crate::errors::{PilotError, Result};
use crate::types::*;

const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Tilt per m/s of ground speed, in degrees.
const TILT_PER_M_S: f32 = 5.0;

/// Simulated vehicle parameters.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub home_latitude_deg: f64,
    pub home_longitude_deg: f64,
    pub home_altitude_m: f32,
    pub horizontal_speed_m_s: f32,
    pub vertical_speed_m_s: f32,
    pub landing_speed_m_s: f32,
    pub yaw_rate_deg_s: f32,
    /// Physics step and telemetry period.
    pub tick: Duration,
    /// Refuse every offboard start request.
    pub reject_offboard: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            home_latitude_deg: 47.397742,
            home_longitude_deg: 8.545594,
            home_altitude_m: 488.0,
            horizontal_speed_m_s: 2.0,
            vertical_speed_m_s: 1.5,
            landing_speed_m_s: 0.7,
            yaw_rate_deg_s: 45.0,
            tick: Duration::from_millis(50),
            reject_offboard: false,
        }
    }
}

#[derive(Debug, Default)]
struct Subscribers {
    connection: Vec<TelemetrySender<ConnectionState>>,
    position: Vec<TelemetrySender<GlobalPosition>>,
    position_velocity: Vec<TelemetrySender<PositionVelocityNed>>,
    attitude: Vec<TelemetrySender<EulerAngle>>,
}

fn publish<T: Copy>(subscribers: &mut Vec<TelemetrySender<T>>, value: T) {
    subscribers.retain(|tx| tx.send(value).is_ok());
}

#[derive(Debug, Default)]
struct SimState {
    address: Option<String>,
    armed: bool,
    offboard: bool,
    landing: bool,
    setpoint: Option<PositionNedYaw>,
    position: PositionNed,
    velocity: VelocityNed,
    attitude: EulerAngle,
    elapsed_us: u64,
    commands: Vec<FlightCommand>,
    subscribers: Subscribers,
}

impl SimState {
    fn require_connection(&self) -> Result<()> {
        match self.address {
            Some(_) => Ok(()),
            None => Err(PilotError::NotConnected),
        }
    }

    fn step(&mut self, options: &SimOptions, dt: f32) {
        let before = self.position;

        if self.armed && self.landing {
            self.position.down_m += options.landing_speed_m_s * dt;
            if self.position.down_m >= 0.0 {
                info!("[Sim] touchdown, disarming");
                self.position.down_m = 0.0;
                self.landing = false;
                self.armed = false;
            }
        } else if self.armed && self.offboard {
            if let Some(target) = self.setpoint {
                self.approach(&target, options, dt);
            }
        }

        self.velocity = VelocityNed {
            north_m_s: (self.position.north_m - before.north_m) / dt,
            east_m_s: (self.position.east_m - before.east_m) / dt,
            down_m_s: (self.position.down_m - before.down_m) / dt,
        };
        self.tilt();
        self.elapsed_us += (dt * 1e6) as u64;
        self.attitude.timestamp_us = self.elapsed_us;

        self.publish_telemetry(options);
    }

    fn approach(&mut self, target: &PositionNedYaw, options: &SimOptions, dt: f32) {
        let p = &mut self.position;

        let dn = target.north_m - p.north_m;
        let de = target.east_m - p.east_m;
        let horizontal = (dn * dn + de * de).sqrt();
        let max_step = options.horizontal_speed_m_s * dt;
        if horizontal <= max_step {
            p.north_m = target.north_m;
            p.east_m = target.east_m;
        } else {
            p.north_m += dn / horizontal * max_step;
            p.east_m += de / horizontal * max_step;
        }

        let dd = target.down_m - p.down_m;
        let max_step = options.vertical_speed_m_s * dt;
        p.down_m += dd.clamp(-max_step, max_step);

        let yaw_error = wrap_degrees(target.yaw_deg - self.attitude.yaw_deg);
        let max_step = options.yaw_rate_deg_s * dt;
        self.attitude.yaw_deg = wrap_degrees(self.attitude.yaw_deg + yaw_error.clamp(-max_step, max_step));
    }

    fn tilt(&mut self) {
        let yaw = self.attitude.yaw_deg.to_radians();
        let v = &self.velocity;
        let forward = v.north_m_s * yaw.cos() + v.east_m_s * yaw.sin();
        let right = -v.north_m_s * yaw.sin() + v.east_m_s * yaw.cos();
        self.attitude.pitch_deg = -forward * TILT_PER_M_S;
        self.attitude.roll_deg = right * TILT_PER_M_S;
    }

    fn global_position(&self, options: &SimOptions) -> GlobalPosition {
        let lat = options.home_latitude_deg.to_radians();
        let north = f64::from(self.position.north_m);
        let east = f64::from(self.position.east_m);
        GlobalPosition {
            latitude_deg: options.home_latitude_deg + (north / EARTH_RADIUS_M).to_degrees(),
            longitude_deg: options.home_longitude_deg
                + (east / (EARTH_RADIUS_M * lat.cos())).to_degrees(),
            absolute_altitude_m: options.home_altitude_m - self.position.down_m,
            relative_altitude_m: -self.position.down_m,
        }
    }

    fn publish_telemetry(&mut self, options: &SimOptions) {
        let global = self.global_position(options);
        let position_velocity = PositionVelocityNed { position: self.position, velocity: self.velocity };
        let attitude = self.attitude;

        let subs = &mut self.subscribers;
        publish(&mut subs.position, global);
        publish(&mut subs.position_velocity, position_velocity);
        publish(&mut subs.attitude, attitude);
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

#[derive(Debug, Default)]
struct PhysicsTask {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for PhysicsTask {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
    }
}

/// Simulated drone. Clones share the same vehicle.
#[derive(Debug, Clone)]
pub struct SimulatedDrone {
    options: SimOptions,
    state: Arc<Mutex<SimState>>,
    physics: Arc<PhysicsTask>,
}

impl Default for SimulatedDrone {
    fn default() -> Self {
        Self::new(SimOptions::default())
    }
}

impl SimulatedDrone {
    pub fn new(options: SimOptions) -> Self {
        Self {
            options,
            state: Arc::new(Mutex::new(SimState::default())),
            physics: Arc::new(PhysicsTask::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every command received so far, in order.
    pub fn commands(&self) -> Vec<FlightCommand> {
        self.lock().commands.clone()
    }

    pub fn position_ned(&self) -> PositionNed {
        self.lock().position
    }

    pub fn is_armed(&self) -> bool {
        self.lock().armed
    }

    pub fn in_offboard(&self) -> bool {
        self.lock().offboard
    }

    fn start_physics(&self) {
        let mut slot = self.physics.task.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }

        let state = Arc::clone(&self.state);
        let options = self.options.clone();
        *slot = Some(tokio::spawn(async move {
            let dt = options.tick.as_secs_f32();
            let mut ticker = interval(options.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                state.lock().unwrap_or_else(PoisonError::into_inner).step(&options, dt);
            }
        }));
    }

    fn record(&self, command: FlightCommand) -> Result<MutexGuard<'_, SimState>> {
        let mut state = self.lock();
        state.require_connection()?;
        debug!("[Sim] {command}");
        state.commands.push(command);
        Ok(state)
    }
}

#[async_trait]
impl FlightController for SimulatedDrone {
    async fn connect(&self, address: &str) -> Result<()> {
        if !address.starts_with("udp://") {
            return Err(PilotError::Connection {
                address: address.to_string(),
                msg: "only udp:// endpoints are supported".to_string(),
            });
        }

        {
            let mut state = self.lock();
            state.address = Some(address.to_string());
            publish(&mut state.subscribers.connection, ConnectionState { is_connected: true });
        }
        info!("[Sim] listening on {address}");

        self.start_physics();
        Ok(())
    }

    fn connection_state(&self) -> TelemetryReceiver<ConnectionState> {
        let (tx, rx) = make_telemetry_channel();
        let mut state = self.lock();
        if state.address.is_some() {
            let _ = tx.send(ConnectionState { is_connected: true });
        }
        state.subscribers.connection.push(tx);
        rx
    }

    fn position(&self) -> TelemetryReceiver<GlobalPosition> {
        let (tx, rx) = make_telemetry_channel();
        self.lock().subscribers.position.push(tx);
        rx
    }

    fn position_velocity_ned(&self) -> TelemetryReceiver<PositionVelocityNed> {
        let (tx, rx) = make_telemetry_channel();
        self.lock().subscribers.position_velocity.push(tx);
        rx
    }

    fn attitude_euler(&self) -> TelemetryReceiver<EulerAngle> {
        let (tx, rx) = make_telemetry_channel();
        self.lock().subscribers.attitude.push(tx);
        rx
    }

    async fn arm(&self) -> Result<()> {
        let mut state = self.record(FlightCommand::Arm)?;
        state.armed = true;
        Ok(())
    }

    async fn disarm(&self) -> Result<()> {
        let mut state = self.record(FlightCommand::Disarm)?;
        state.armed = false;
        state.offboard = false;
        state.landing = false;
        Ok(())
    }

    async fn set_position_ned(&self, setpoint: PositionNedYaw) -> Result<()> {
        let mut state = self.record(FlightCommand::SetPositionNed(setpoint))?;
        state.setpoint = Some(setpoint);
        Ok(())
    }

    async fn start_offboard(&self) -> Result<()> {
        let mut state = self.record(FlightCommand::StartOffboard)?;
        if self.options.reject_offboard {
            return Err(PilotError::OffboardRejected { reason: "COMMAND_DENIED".to_string() });
        }
        if state.setpoint.is_none() {
            return Err(PilotError::OffboardRejected { reason: "NO_SETPOINT_SET".to_string() });
        }
        state.offboard = true;
        state.landing = false;
        Ok(())
    }

    async fn stop_offboard(&self) -> Result<()> {
        let mut state = self.record(FlightCommand::StopOffboard)?;
        state.offboard = false;
        Ok(())
    }

    async fn land(&self) -> Result<()> {
        let mut state = self.record(FlightCommand::Land)?;
        if !state.armed {
            return Err(PilotError::Command { action: "land", msg: "not armed".to_string() });
        }
        state.offboard = false;
        state.landing = true;
        Ok(())
    }
}
