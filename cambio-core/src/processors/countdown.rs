//! Countdown task.
//!
//! Ticks the state machine once per real second until the guarantee
//! expires, the checkout closes, or shutdown is signaled.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state_machine::{SharedStateMachine, Tick};

const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Countdown {
    machine: SharedStateMachine,
}

impl Countdown {
    pub fn new(machine: SharedStateMachine) -> Self {
        Self { machine }
    }

    pub fn spawn(self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown_rx))
    }

    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        debug!("Countdown started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        debug!("Countdown received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    if !self.tick_once().await {
                        break;
                    }
                }
            }
        }

        debug!("Countdown stopped");
    }

    /// Returns whether the countdown should keep running.
    ///
    /// The session is written on the blocking pool after the machine lock
    /// is released.
    async fn tick_once(&self) -> bool {
        let (keep_running, save) = {
            let mut machine = self.machine.lock().unwrap_or_else(|e| e.into_inner());
            match machine.tick() {
                Ok(Tick::Running(_)) => (true, Some(machine.pending_save())),
                Ok(Tick::Expired) => {
                    info!("Countdown reached zero");
                    (false, Some(machine.pending_save()))
                }
                Ok(Tick::AlreadyExpired) | Err(_) => (false, None),
            }
        };

        if let Some(save) = save {
            match tokio::task::spawn_blocking(move || save.write()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "Failed to persist countdown tick"),
                Err(e) => warn!(error = %e, "Countdown save task failed"),
            }
        }
        keep_running
    }
}
