use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio::{spawn, task};
use tracing::info;

use crate::tasks::TaskSet;
use crate::telemetry::{StatusReport, TelemetrySnapshot};

pub type StatusSender = mpsc::UnboundedSender<StatusReport>;
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusReport>;

pub fn make_status_channel() -> (StatusSender, StatusReceiver) {
    mpsc::unbounded_channel()
}

/// Periodically logs the telemetry snapshot, once it is complete.
#[derive(Debug)]
pub struct TelemetryReporter {
    task: task::JoinHandle<()>,
}

impl TelemetryReporter {
    pub fn start(
        snapshot: Arc<TelemetrySnapshot>,
        period: Duration,
        sender: Option<StatusSender>,
    ) -> Self {
        let task = spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(report) = snapshot.report() else { continue };
                info!("{report}");
                if let Some(tx) = &sender {
                    // nobody listening any more is fine, keep logging
                    let _ = tx.send(report);
                }
            }
        });

        Self { task }
    }

    pub(crate) fn register(self, tasks: &mut TaskSet) {
        tasks.push("reporter", self.task);
    }
}
