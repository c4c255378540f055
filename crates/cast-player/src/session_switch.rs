//! Local/remote target switching.
//!
//! Watches the remote connection and moves playback between the two
//! adapters, carrying the position and pause state across the handoff.

use std::sync::Arc;

use cast_player_types::{PlaybackState, PlaybackTarget};

use crate::adapter::PlaybackAdapter;
use crate::coordinator::PlaybackCoordinator;
use crate::error::RemoteError;
use crate::local_adapter::LocalMediaEvent;
use crate::remote_service::{RemoteEvent, RemoteService, SessionState};

pub struct SessionSwitchController {
    active: PlaybackTarget,
    /// The adapter not currently installed in the coordinator.
    standby: Option<Box<dyn PlaybackAdapter>>,
    service: Arc<dyn RemoteService>,
}

impl SessionSwitchController {
    /// Start with the local adapter active and `remote` on standby.
    pub fn new(remote: Box<dyn PlaybackAdapter>, service: Arc<dyn RemoteService>) -> Self {
        Self {
            active: PlaybackTarget::Local,
            standby: Some(remote),
            service,
        }
    }

    pub fn active(&self) -> PlaybackTarget {
        self.active
    }

    /// Ask the service for a session; the switch happens on the connection event.
    pub fn connect(&self) -> Result<(), RemoteError> {
        tracing::info!("session: requesting remote session");
        self.service.request_session()
    }

    pub fn disconnect(&self) {
        tracing::info!("session: ending remote session");
        self.service.end_session(true);
    }

    pub fn on_remote_event(&mut self, coordinator: &mut PlaybackCoordinator, event: RemoteEvent) {
        match event {
            RemoteEvent::ConnectionChanged { connected } => {
                self.on_connection_changed(coordinator, connected)
            }
            event if self.active == PlaybackTarget::Remote => coordinator.on_remote_event(event),
            event => tracing::debug!(?event, "session: remote event ignored while local"),
        }
    }

    pub fn on_local_event(&mut self, coordinator: &mut PlaybackCoordinator, event: LocalMediaEvent) {
        if self.active == PlaybackTarget::Local {
            coordinator.on_local_event(event);
        } else {
            tracing::debug!(?event, "session: local event ignored while remote");
        }
    }

    pub fn on_connection_changed(&mut self, coordinator: &mut PlaybackCoordinator, connected: bool) {
        match (connected, self.active) {
            (true, PlaybackTarget::Local) => self.switch_to_remote(coordinator),
            (false, PlaybackTarget::Remote) => self.switch_to_local(coordinator),
            _ => tracing::debug!(connected, active = ?self.active, "session: connection unchanged"),
        }
    }

    fn switch_to_remote(&mut self, coordinator: &mut PlaybackCoordinator) {
        let was_paused = coordinator.state() == PlaybackState::Paused;
        coordinator.refresh_position();
        let elapsed = coordinator.current_time();

        let Some(local) = self.swap(coordinator, PlaybackTarget::Remote) else {
            return;
        };
        self.standby = Some(local);

        if self.service.session_state() == SessionState::Resumed && coordinator.adapter_has_media()
        {
            coordinator.adopt_remote_session();
        } else {
            tracing::info!(elapsed, was_paused, "session: handing playback to receiver");
            coordinator.handoff_load(elapsed, !was_paused);
        }
    }

    fn switch_to_local(&mut self, coordinator: &mut PlaybackCoordinator) {
        coordinator.refresh_position();
        let elapsed = coordinator.current_time();

        let Some(remote) = self.swap(coordinator, PlaybackTarget::Local) else {
            return;
        };
        self.standby = Some(remote);

        tracing::info!(elapsed, "session: resuming playback locally");
        coordinator.resume_locally(elapsed);
    }

    /// Pause the active adapter, install the standby one, and return the
    /// adapter that was active.
    fn swap(
        &mut self,
        coordinator: &mut PlaybackCoordinator,
        to: PlaybackTarget,
    ) -> Option<Box<dyn PlaybackAdapter>> {
        let Some(next) = self.standby.take() else {
            tracing::warn!(?to, "session: no standby adapter to switch to");
            return None;
        };
        coordinator.stop_progress_timer();
        coordinator.pause_active_adapter();
        self.active = to;
        Some(coordinator.swap_adapter(next))
    }
}
