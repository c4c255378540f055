//! Single-threaded event loop driving the coordinator.

use std::ops::ControlFlow;

use anyhow::Result;
use cast_player_types::FeatureMode;
use crossbeam_channel::{Receiver, select};

use crate::coordinator::PlaybackCoordinator;
use crate::local_adapter::LocalMediaEvent;
use crate::remote_service::RemoteEvent;
use crate::session_switch::SessionSwitchController;

/// User intents accepted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    SelectMedia { index: usize },
    Play,
    Pause,
    Stop,
    Seek { seconds: f64 },
    SeekToPosition { pixel: f64 },
    SetVolume { level: f64 },
    SetVolumeFromSlider { pixel: f64 },
    Mute,
    UnMute,
    Fullscreen { enabled: bool },
    SkipAd,
    SetFeatureMode { mode: FeatureMode },
    Connect,
    Disconnect,
    /// Re-publish the current display snapshot.
    Refresh,
    Quit,
}

pub struct PlayerRuntime {
    coordinator: PlaybackCoordinator,
    switch: SessionSwitchController,
    inputs: Receiver<InputCommand>,
    remote_events: Receiver<RemoteEvent>,
    local_events: Receiver<LocalMediaEvent>,
}

impl PlayerRuntime {
    pub fn new(
        coordinator: PlaybackCoordinator,
        switch: SessionSwitchController,
        inputs: Receiver<InputCommand>,
        remote_events: Receiver<RemoteEvent>,
        local_events: Receiver<LocalMediaEvent>,
    ) -> Self {
        Self {
            coordinator,
            switch,
            inputs,
            remote_events,
            local_events,
        }
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    pub fn switch(&self) -> &SessionSwitchController {
        &self.switch
    }

    /// Run until `Quit` arrives or the input channel closes.
    pub fn run(&mut self) -> Result<()> {
        self.coordinator.publish();
        loop {
            let inputs = self.inputs.clone();
            let remote_events = self.remote_events.clone();
            let local_events = self.local_events.clone();
            let ticks = self
                .coordinator
                .progress_ticks()
                .cloned()
                .unwrap_or_else(crossbeam_channel::never);
            select! {
                recv(inputs) -> msg => match msg {
                    Ok(command) => {
                        if self.handle_input(command).is_break() {
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::info!("runtime: input closed");
                        break;
                    }
                },
                recv(remote_events) -> msg => match msg {
                    Ok(event) => self.handle_remote_event(event),
                    Err(_) => {
                        tracing::warn!("runtime: remote event stream closed");
                        self.remote_events = crossbeam_channel::never();
                    }
                },
                recv(local_events) -> msg => match msg {
                    Ok(event) => self.handle_local_event(event),
                    Err(_) => {
                        tracing::warn!("runtime: local event stream closed");
                        self.local_events = crossbeam_channel::never();
                    }
                },
                recv(ticks) -> _ => self.coordinator.on_progress_tick(),
            }
        }
        tracing::info!("runtime: stopped");
        Ok(())
    }

    pub fn handle_remote_event(&mut self, event: RemoteEvent) {
        self.switch.on_remote_event(&mut self.coordinator, event);
    }

    pub fn handle_local_event(&mut self, event: LocalMediaEvent) {
        self.switch.on_local_event(&mut self.coordinator, event);
    }

    pub fn handle_input(&mut self, command: InputCommand) -> ControlFlow<()> {
        tracing::debug!(?command, "runtime: input");
        let coordinator = &mut self.coordinator;
        match command {
            InputCommand::SelectMedia { index } => {
                if let Err(err) = coordinator.select_media(index) {
                    tracing::warn!(error = %err, "runtime: select rejected");
                }
            }
            InputCommand::Play => coordinator.play(),
            InputCommand::Pause => coordinator.pause(),
            InputCommand::Stop => coordinator.stop(),
            InputCommand::Seek { seconds } => {
                if let Err(reason) = coordinator.seek_to(seconds) {
                    tracing::debug!(seconds, %reason, "runtime: seek not applied");
                }
            }
            InputCommand::SeekToPosition { pixel } => {
                if let Err(reason) = coordinator.seek_to_position(pixel) {
                    tracing::debug!(pixel, %reason, "runtime: seek not applied");
                }
            }
            InputCommand::SetVolume { level } => coordinator.set_volume(level),
            InputCommand::SetVolumeFromSlider { pixel } => coordinator.set_volume_from_slider(pixel),
            InputCommand::Mute => coordinator.mute(),
            InputCommand::UnMute => coordinator.un_mute(),
            InputCommand::Fullscreen { enabled: true } => {
                coordinator.request_fullscreen();
            }
            InputCommand::Fullscreen { enabled: false } => {
                coordinator.exit_fullscreen();
            }
            InputCommand::SkipAd => coordinator.skip_ad(),
            InputCommand::SetFeatureMode { mode } => coordinator.set_feature_mode(mode),
            InputCommand::Connect => {
                if let Err(err) = self.switch.connect() {
                    tracing::warn!(error = %err, "runtime: connect failed");
                }
            }
            InputCommand::Disconnect => self.switch.disconnect(),
            InputCommand::Refresh => coordinator.publish(),
            InputCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}
