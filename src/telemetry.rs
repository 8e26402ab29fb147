use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::{spawn, task};
use tracing::{debug, warn};

use crate::controller::TelemetryReceiver;
use crate::tasks::TaskSet;
use crate::types::{EulerAngle, PositionVelocityNed};

/// The most recent telemetry received from the drone.
///
/// Both slots start empty and are refreshed independently, so readers must
/// cope with either one missing.
#[derive(Debug, Default)]
pub struct TelemetrySnapshot {
    position: Mutex<Option<PositionVelocityNed>>,
    attitude: Mutex<Option<EulerAngle>>,
}

impl TelemetrySnapshot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn position(&self) -> Option<PositionVelocityNed> {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn attitude(&self) -> Option<EulerAngle> {
        *self.attitude.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_position(&self, position: PositionVelocityNed) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
    }

    pub fn set_attitude(&self, attitude: EulerAngle) {
        *self.attitude.lock().unwrap_or_else(PoisonError::into_inner) = Some(attitude);
    }

    /// A status report, once both position and attitude have arrived.
    pub fn report(&self) -> Option<StatusReport> {
        let position = self.position()?;
        let attitude = self.attitude()?;
        Some(StatusReport { position, attitude })
    }
}

/// Position and attitude pair emitted by the reporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub position: PositionVelocityNed,
    pub attitude: EulerAngle,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.position.position;
        let a = &self.attitude;
        write!(
            f,
            "Position - N: {:.2}m, E: {:.2}m, D: {:.2}m | Attitude - Roll: {:.2}°, Pitch: {:.2}°, Yaw: {:.2}°",
            p.north_m, p.east_m, p.down_m, a.roll_deg, a.pitch_deg, a.yaw_deg
        )
    }
}

/// Drains one telemetry stream into the shared snapshot.
#[derive(Debug)]
pub(crate) struct TelemetryListener {
    name: &'static str,
    task: task::JoinHandle<()>,
}

impl TelemetryListener {
    pub(crate) fn start_listening<T, F>(
        name: &'static str,
        mut receiver: TelemetryReceiver<T>,
        snapshot: Arc<TelemetrySnapshot>,
        apply: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(&TelemetrySnapshot, T) + Send + 'static,
    {
        debug!("[{name}] START LISTENING");

        let task = spawn(async move {
            while let Some(update) = receiver.recv().await {
                apply(&snapshot, update);
            }
            // snapshot keeps the last value received
            warn!("[{name}] telemetry stream ended");
        });

        Self { name, task }
    }

    pub(crate) fn register(self, tasks: &mut TaskSet) {
        tasks.push(self.name, self.task);
    }
}

/// Starts the position/velocity and attitude listeners feeding `snapshot`.
pub(crate) fn start_listeners(
    position: TelemetryReceiver<PositionVelocityNed>,
    attitude: TelemetryReceiver<EulerAngle>,
    snapshot: &Arc<TelemetrySnapshot>,
    tasks: &mut TaskSet,
) {
    TelemetryListener::start_listening("position", position, Arc::clone(snapshot), |s, p| {
        s.set_position(p)
    })
    .register(tasks);

    TelemetryListener::start_listening("attitude", attitude, Arc::clone(snapshot), |s, a| {
        s.set_attitude(a)
    })
    .register(tasks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::make_telemetry_channel;
    use crate::types::PositionNed;

    fn sample_position(north_m: f32) -> PositionVelocityNed {
        PositionVelocityNed {
            position: PositionNed { north_m, east_m: 2.0, down_m: -5.0 },
            ..Default::default()
        }
    }

    #[test]
    fn report_needs_both_slots() {
        let snapshot = TelemetrySnapshot::new();
        assert!(snapshot.report().is_none());

        snapshot.set_position(sample_position(1.0));
        assert!(snapshot.report().is_none());

        snapshot.set_attitude(EulerAngle { yaw_deg: 90.0, ..Default::default() });
        let report = snapshot.report().unwrap();
        assert_eq!(report.position, sample_position(1.0));
        assert_eq!(report.attitude.yaw_deg, 90.0);
    }

    #[test]
    fn report_line_format() {
        let report = StatusReport {
            position: sample_position(1.0),
            attitude: EulerAngle { roll_deg: 0.5, pitch_deg: -1.25, yaw_deg: 90.0, timestamp_us: 0 },
        };
        assert_eq!(
            report.to_string(),
            "Position - N: 1.00m, E: 2.00m, D: -5.00m | Attitude - Roll: 0.50°, Pitch: -1.25°, Yaw: 90.00°"
        );
    }

    #[tokio::test]
    async fn listener_keeps_latest_value_after_stream_ends() {
        let snapshot = TelemetrySnapshot::new();
        let (tx, rx) = make_telemetry_channel();
        let listener =
            TelemetryListener::start_listening("position", rx, Arc::clone(&snapshot), |s, p| {
                s.set_position(p)
            });

        tx.send(sample_position(1.0)).unwrap();
        tx.send(sample_position(3.0)).unwrap();
        drop(tx);

        listener.task.await.unwrap();
        assert_eq!(snapshot.position(), Some(sample_position(3.0)));
        assert_eq!(snapshot.attitude(), None);
    }
}
