// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic tracking refresh.
//!
//! One supervised tokio task per tracking view. Each tick fans out a poll
//! round on its own task, so a slow backend never delays the timer.

use crate::services::tracking::{BusTracker, ViewMount};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to the running poll loop. Stops the loop when dropped.
pub struct TrackingPoller {
    handle: JoinHandle<()>,
    period: Duration,
}

impl TrackingPoller {
    /// Start polling `tracker` every `period`, first tick after one period.
    pub fn start(tracker: BusTracker, period: Duration) -> Self {
        Self::start_for(tracker, period, ViewMount::new())
    }

    /// Start polling on behalf of a view. Rounds completing after `mount`
    /// is released store nothing.
    pub fn start_for(tracker: BusTracker, period: Duration, mount: ViewMount) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let tracker = tracker.clone();
                let mount = mount.clone();
                tokio::spawn(async move {
                    let outcomes = tracker.poll_once_for(&mount).await;
                    tracing::debug!(polled = outcomes.len(), "Poll round finished");
                });
            }
        });

        tracing::info!(period_secs = period.as_secs_f64(), "Tracking poller started");
        Self { handle, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the poll loop. Poll rounds already spawned run to completion.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for TrackingPoller {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::info!("Tracking poller stopped");
    }
}
