//! Background expiry sweeper.
//!
//! The `expires_at` deadline is data, not a timer: nothing fires when it
//! passes. This task wakes on a fixed interval and forces every overdue
//! `WAITING_PAYMENT` transaction through the expiry transition.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::lifecycle::LifecycleService;

pub struct Sweeper {
    service: LifecycleService,
    period: Duration,
}

impl Sweeper {
    pub fn new(service: LifecycleService, period: Duration) -> Self {
        Self { service, period }
    }

    /// Runs forever. Each pass is independent; a failing pass is logged and
    /// the next tick proceeds normally.
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(e) = self.service.sweep_expired().await {
                tracing::error!(error = ?e, "Expiry sweep failed");
            }
        }
    }
}
