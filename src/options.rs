use tokio::time::Duration;

use crate::reporter::*;

pub const DEFAULT_SYSTEM_ADDRESS: &str = "udp://:14540";

/// Flight sequencer connection and timing options.
#[derive(Debug, Clone)]
pub struct PilotOptions {
    /// Where the flight controller is listening.
    pub system_address: String,
    /// Pause between the priming setpoint and the offboard start request.
    pub settle_interval: Duration,
    /// How often the telemetry reporter checks the snapshot.
    pub report_interval: Duration,
    /// How long cancelled background tasks get to stop before landing.
    pub cancel_grace: Duration,
    pub(crate) status_sender: Option<StatusSender>,
}

impl Default for PilotOptions {
    fn default() -> Self {
        Self {
            system_address: DEFAULT_SYSTEM_ADDRESS.to_string(),
            settle_interval: Duration::from_millis(100),
            report_interval: Duration::from_millis(500),
            cancel_grace: Duration::from_millis(100),
            status_sender: None,
        }
    }
}

impl PilotOptions {
    /// Request the status reports the reporter logs during the flight.
    ///
    /// Returns the receiver end of the channel used to pass them on
    ///
    pub fn with_status(&mut self) -> StatusReceiver {
        let (tx, rx) = make_status_channel();
        self.status_sender = Some(tx);
        rx
    }
}
