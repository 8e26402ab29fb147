#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use offboard_pilot::*;

#[derive(Debug, Default)]
struct MockState {
    connected_to: Option<String>,
    commands: Vec<FlightCommand>,
    // kept so the streams stay open for the whole flight
    keep_alive_position: Vec<TelemetrySender<PositionVelocityNed>>,
    keep_alive_attitude: Vec<TelemetrySender<EulerAngle>>,
    keep_alive_fix: Vec<TelemetrySender<GlobalPosition>>,
}

/// Flight controller double that accepts everything (unless told
/// otherwise) and records the commands it receives.
#[derive(Debug, Clone, Default)]
pub struct MockController {
    state: Arc<Mutex<MockState>>,
    position_sample: Option<PositionVelocityNed>,
    attitude_sample: Option<EulerAngle>,
    reject_offboard: bool,
    fail_arm: bool,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers exactly one position and one attitude update to each
    /// subscriber.
    pub fn with_one_telemetry_update(mut self) -> Self {
        self.position_sample = Some(PositionVelocityNed {
            position: PositionNed { north_m: 0.1, east_m: -0.2, down_m: -0.05 },
            ..Default::default()
        });
        self.attitude_sample = Some(EulerAngle { yaw_deg: 1.5, ..Default::default() });
        self
    }

    pub fn rejecting_offboard(mut self) -> Self {
        self.reject_offboard = true;
        self
    }

    pub fn failing_arm(mut self) -> Self {
        self.fail_arm = true;
        self
    }

    pub fn commands(&self) -> Vec<FlightCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn connected_to(&self) -> Option<String> {
        self.state.lock().unwrap().connected_to.clone()
    }

    fn record(&self, command: FlightCommand) {
        self.state.lock().unwrap().commands.push(command);
    }
}

#[async_trait]
impl FlightController for MockController {
    async fn connect(&self, address: &str) -> Result<()> {
        self.state.lock().unwrap().connected_to = Some(address.to_string());
        Ok(())
    }

    fn connection_state(&self) -> TelemetryReceiver<ConnectionState> {
        let (tx, rx) = make_telemetry_channel();
        tx.send(ConnectionState { is_connected: false }).unwrap();
        if self.state.lock().unwrap().connected_to.is_some() {
            tx.send(ConnectionState { is_connected: true }).unwrap();
        }
        rx
    }

    fn position(&self) -> TelemetryReceiver<GlobalPosition> {
        let (tx, rx) = make_telemetry_channel();
        tx.send(GlobalPosition { latitude_deg: 47.4, longitude_deg: 8.5, ..Default::default() })
            .unwrap();
        self.state.lock().unwrap().keep_alive_fix.push(tx);
        rx
    }

    fn position_velocity_ned(&self) -> TelemetryReceiver<PositionVelocityNed> {
        let (tx, rx) = make_telemetry_channel();
        if let Some(sample) = self.position_sample {
            tx.send(sample).unwrap();
        }
        self.state.lock().unwrap().keep_alive_position.push(tx);
        rx
    }

    fn attitude_euler(&self) -> TelemetryReceiver<EulerAngle> {
        let (tx, rx) = make_telemetry_channel();
        if let Some(sample) = self.attitude_sample {
            tx.send(sample).unwrap();
        }
        self.state.lock().unwrap().keep_alive_attitude.push(tx);
        rx
    }

    async fn arm(&self) -> Result<()> {
        if self.fail_arm {
            return Err(PilotError::Command { action: "arm", msg: "COMMAND_DENIED".to_string() });
        }
        self.record(FlightCommand::Arm);
        Ok(())
    }

    async fn disarm(&self) -> Result<()> {
        self.record(FlightCommand::Disarm);
        Ok(())
    }

    async fn set_position_ned(&self, setpoint: PositionNedYaw) -> Result<()> {
        self.record(FlightCommand::SetPositionNed(setpoint));
        Ok(())
    }

    async fn start_offboard(&self) -> Result<()> {
        self.record(FlightCommand::StartOffboard);
        if self.reject_offboard {
            return Err(PilotError::OffboardRejected { reason: "NO_SETPOINT_SET".to_string() });
        }
        Ok(())
    }

    async fn stop_offboard(&self) -> Result<()> {
        self.record(FlightCommand::StopOffboard);
        Ok(())
    }

    async fn land(&self) -> Result<()> {
        self.record(FlightCommand::Land);
        Ok(())
    }
}

pub fn setpoint(north_m: f32, east_m: f32, down_m: f32, yaw_deg: f32) -> FlightCommand {
    FlightCommand::SetPositionNed(PositionNedYaw::new(north_m, east_m, down_m, yaw_deg))
}

/// Commands issued by a successful flight of the default square mission.
pub fn square_flight_log() -> Vec<FlightCommand> {
    vec![
        FlightCommand::Arm,
        setpoint(0.0, 0.0, -5.0, 0.0),
        FlightCommand::StartOffboard,
        setpoint(2.0, 0.0, -5.0, 0.0),
        setpoint(2.0, 2.0, -5.0, 0.0),
        setpoint(0.0, 2.0, -5.0, 0.0),
        setpoint(0.0, 0.0, -5.0, 0.0),
        FlightCommand::StopOffboard,
        FlightCommand::Land,
    ]
}
