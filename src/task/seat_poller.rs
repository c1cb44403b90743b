//! Background task that runs seat check passes on a fixed interval.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::error;
use log::info;
use log::warn;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::seat_check_service::PassOutcome;
use crate::service::seat_check_service::SeatCheckService;

/// Task that periodically checks watched classes for seat changes.
pub struct SeatPoller {
    service: Arc<SeatCheckService>,
    poll_interval: Duration,
    running: AtomicBool,
    check_loop: Mutex<Option<JoinHandle<()>>>,
}

impl SeatPoller {
    /// Creates a new poller with the given interval.
    pub fn new(service: Arc<SeatCheckService>, poll_interval: Duration) -> Arc<Self> {
        info!("Initializing SeatPoller with poll interval {poll_interval:?}");
        Arc::new(Self {
            service,
            poll_interval,
            running: AtomicBool::new(false),
            check_loop: Mutex::new(None),
        })
    }

    /// Starts the polling loop.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("Starting SeatPoller check loop.");
            self.spawn_check_loop();
        }
        Ok(())
    }

    /// Stops the polling loop, cancelling a pass in progress.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Stopping SeatPoller check loop.");
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.take_check_loop() {
            handle.abort();
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn take_check_loop(&self) -> Option<JoinHandle<()>> {
        self.check_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn spawn_check_loop(self: Arc<Self>) {
        if let Some(previous) = self.take_check_loop() {
            previous.abort();
        }
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let poller = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !poller.running.load(Ordering::SeqCst) {
                    info!("Stopping check loop.");
                    break;
                }
                poller.tick().await;
            }
        });
        *self.check_loop.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    async fn tick(&self) {
        match self.service.run_pass().await {
            Ok(PassOutcome::Completed(summary)) => info!(
                "Seat check done: {} groups, {} classes, {} changed, {} notified, {} without data, {} failed.",
                summary.groups,
                summary.classes,
                summary.changed,
                summary.notified,
                summary.not_found,
                summary.failures
            ),
            Ok(PassOutcome::AlreadyRunning) => {
                warn!("Previous seat check is still running. Skipping this tick.")
            }
            Err(e) => error!("Error checking seats: {e}"),
        }
    }
}
