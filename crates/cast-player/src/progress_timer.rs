//! Recurring progress tick owned by the coordinator.

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

/// Scheduled progress tick. Dropping the handle cancels the schedule; no
/// background thread outlives it.
#[derive(Debug)]
pub struct ProgressTimer {
    ticks: Receiver<Instant>,
}

impl ProgressTimer {
    pub fn start(interval: Duration) -> Self {
        Self {
            ticks: crossbeam_channel::tick(interval),
        }
    }

    pub fn ticks(&self) -> &Receiver<Instant> {
        &self.ticks
    }
}
