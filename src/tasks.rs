use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Duration, Instant};
use tracing::{debug, warn};

/// Background tasks owned by the sequencer, cancelled together at the end
/// of a flight.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, task: JoinHandle<()>) {
        self.tasks.push((name, task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Aborts every task, then waits up to `grace` for all of them to stop.
    ///
    /// Returns how many tasks were confirmed stopped within the grace period.
    pub async fn cancel_all(&mut self, grace: Duration) -> usize {
        for (name, task) in &self.tasks {
            debug!("[{name}] CANCEL");
            task.abort();
        }

        let deadline = Instant::now() + grace;
        let mut stopped = 0;
        for (name, task) in self.tasks.drain(..) {
            match timeout_at(deadline, task).await {
                Ok(_) => stopped += 1,
                Err(_) => warn!("[{name}] did not stop within {grace:?}"),
            }
        }
        stopped
    }
}

impl Drop for TaskSet {
    fn drop(&mut self) {
        for (_, task) in &self.tasks {
            task.abort();
        }
    }
}
