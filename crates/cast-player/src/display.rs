//! Display snapshot channel between the coordinator and the view.

use cast_player_types::DisplayModel;
use crossbeam_channel::{Receiver, Sender, TrySendError};

const DISPLAY_CAPACITY: usize = 64;

/// Bounded channel of [`DisplayModel`] snapshots.
///
/// When the view falls behind, the oldest queued snapshot is discarded so the
/// view always ends on the latest state. Meant for a single view; cloned
/// receivers share one queue.
#[derive(Clone)]
pub struct DisplayBus {
    sender: Sender<DisplayModel>,
    receiver: Receiver<DisplayModel>,
}

impl DisplayBus {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(DISPLAY_CAPACITY);
        Self { sender, receiver }
    }

    /// Receiver for the rendering side.
    pub fn subscribe(&self) -> Receiver<DisplayModel> {
        self.receiver.clone()
    }

    pub fn publish(&self, mut model: DisplayModel) {
        loop {
            match self.sender.try_send(model) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    tracing::trace!("display: view lagging, oldest snapshot dropped");
                    let _ = self.receiver.try_recv();
                    model = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl Default for DisplayBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_keeps_latest_when_full() {
        let bus = DisplayBus::new();
        let rx = bus.subscribe();
        for index in 0..DISPLAY_CAPACITY + 5 {
            bus.publish(DisplayModel {
                media_index: index,
                ..DisplayModel::default()
            });
        }
        assert_eq!(rx.len(), DISPLAY_CAPACITY);
        assert_eq!(rx.try_recv().unwrap().media_index, 5);
        let last = rx.try_iter().last().unwrap();
        assert_eq!(last.media_index, DISPLAY_CAPACITY + 4);
    }
}
