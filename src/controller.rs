use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::*;

pub type TelemetrySender<T> = mpsc::UnboundedSender<T>;

/// Receiving end of a telemetry subscription. `None` from `recv` means the
/// stream has ended; it cannot be restarted.
pub type TelemetryReceiver<T> = mpsc::UnboundedReceiver<T>;

pub fn make_telemetry_channel<T>() -> (TelemetrySender<T>, TelemetryReceiver<T>) {
    mpsc::unbounded_channel()
}

/// The flight-control SDK as seen by the sequencer.
///
/// Implementations own transport, state estimation and low-level control.
/// Subscriptions are independent of each other and of the command calls.
#[async_trait]
pub trait FlightController: Send + Sync {
    /// Opens the link to the vehicle, eg `udp://:14540`.
    async fn connect(&self, address: &str) -> Result<()>;

    fn connection_state(&self) -> TelemetryReceiver<ConnectionState>;
    fn position(&self) -> TelemetryReceiver<GlobalPosition>;
    fn position_velocity_ned(&self) -> TelemetryReceiver<PositionVelocityNed>;
    fn attitude_euler(&self) -> TelemetryReceiver<EulerAngle>;

    async fn arm(&self) -> Result<()>;
    async fn disarm(&self) -> Result<()>;

    async fn set_position_ned(&self, setpoint: PositionNedYaw) -> Result<()>;

    /// Switches to offboard control.
    ///
    /// A refusal by the vehicle must be reported as
    /// [`PilotError::OffboardRejected`](crate::PilotError::OffboardRejected).
    async fn start_offboard(&self) -> Result<()>;
    async fn stop_offboard(&self) -> Result<()>;

    async fn land(&self) -> Result<()>;
}
