//! In-memory element and receiver used by unit tests.

use std::sync::{Arc, Mutex, MutexGuard};

use cast_player_types::{MediaItem, StreamType};

use crate::error::RemoteError;
use crate::local_adapter::MediaElement;
use crate::remote_service::{
    LoadRequest, RemoteEvent, RemoteMediaInfo, RemotePlayerSnapshot, RemotePlayerState,
    RemoteService, SessionState,
};

pub fn media_item(url: &str, duration: Option<f64>) -> MediaItem {
    MediaItem {
        title: url.rsplit('/').next().unwrap_or(url).to_string(),
        subtitle: String::new(),
        content_url: url.to_string(),
        content_type: "video/mp4".to_string(),
        thumbnail: None,
        duration,
    }
}

#[derive(Debug)]
pub struct FakeElementState {
    pub source: Option<String>,
    pub load_tokens: Vec<u64>,
    pub paused: bool,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen: bool,
}

impl Default for FakeElementState {
    fn default() -> Self {
        Self {
            source: None,
            load_tokens: Vec::new(),
            paused: true,
            play_calls: 0,
            pause_calls: 0,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            fullscreen: false,
        }
    }
}

/// Shared-state media element; clones observe the same state.
#[derive(Clone, Default)]
pub struct FakeElement {
    inner: Arc<Mutex<FakeElementState>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeElementState> {
        self.inner.lock().unwrap()
    }
}

impl MediaElement for FakeElement {
    fn source(&self) -> Option<String> {
        self.state().source.clone()
    }

    fn load_source(&mut self, url: &str, token: u64) {
        let mut state = self.state();
        state.source = Some(url.to_string());
        state.load_tokens.push(token);
        state.paused = true;
        state.current_time = 0.0;
    }

    fn play(&mut self) {
        let mut state = self.state();
        state.paused = false;
        state.play_calls += 1;
    }

    fn pause(&mut self) {
        let mut state = self.state();
        state.paused = true;
        state.pause_calls += 1;
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }

    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn set_current_time(&mut self, time: f64) {
        self.state().current_time = time;
    }

    fn duration(&self) -> Option<f64> {
        self.state().duration
    }

    fn set_volume(&mut self, level: f64) {
        self.state().volume = level;
    }

    fn volume(&self) -> f64 {
        self.state().volume
    }

    fn set_muted(&mut self, muted: bool) {
        self.state().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.state().muted
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> bool {
        self.state().fullscreen = fullscreen;
        fullscreen
    }

    fn is_fullscreen(&self) -> bool {
        self.state().fullscreen
    }
}

/// Scriptable receiver recording every command it gets.
#[derive(Default)]
pub struct FakeRemote {
    snapshot: Mutex<RemotePlayerSnapshot>,
    session: Mutex<SessionState>,
    commands: Mutex<Vec<String>>,
    loads: Mutex<Vec<LoadRequest>>,
}

impl FakeRemote {
    pub fn connected() -> Arc<Self> {
        let remote = Self::default();
        {
            let mut snapshot = remote.snapshot.lock().unwrap();
            snapshot.is_connected = true;
            snapshot.receiver_name = Some("Living Room".to_string());
            snapshot.volume_level = 1.0;
        }
        *remote.session.lock().unwrap() = SessionState::Started;
        Arc::new(remote)
    }

    pub fn disconnected() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn update(&self, apply: impl FnOnce(&mut RemotePlayerSnapshot)) {
        apply(&mut self.snapshot.lock().unwrap());
    }

    pub fn set_session_state(&self, state: SessionState) {
        *self.session.lock().unwrap() = state;
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<LoadRequest> {
        self.loads.lock().unwrap().clone()
    }

    /// Apply the latest load to the snapshot and return its completion event.
    pub fn complete_last_load(&self) -> RemoteEvent {
        let request = self
            .loads
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no load submitted");
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.media_info = Some(RemoteMediaInfo {
            content_id: request.media.content_id.clone(),
            content_type: request.media.content_type.clone(),
            stream_type: request.media.stream_type,
            title: request.media.metadata.title.clone(),
            subtitle: request.media.metadata.subtitle.clone(),
            duration: request.media.duration,
            live: cast_player_types::LiveStreamMetadata {
                section_start_absolute_time: request.media.metadata.section_start_absolute_time,
                section_start_time_in_media: request.media.metadata.section_start_time_in_media,
                section_duration: request.media.metadata.section_duration,
            },
            breaks: request.media.breaks.clone(),
            break_clips: request.media.break_clips.clone(),
        });
        snapshot.duration = request.media.duration;
        snapshot.can_seek = request.media.stream_type == StreamType::Buffered
            && request.media.duration.is_some();
        snapshot.current_time = request.current_time;
        snapshot.is_paused = !request.autoplay;
        snapshot.player_state = if request.autoplay {
            RemotePlayerState::Playing
        } else {
            RemotePlayerState::Paused
        };
        RemoteEvent::LoadFinished {
            request_id: request.request_id,
            result: Ok(()),
        }
    }

    fn record(&self, command: impl Into<String>) {
        self.commands.lock().unwrap().push(command.into());
    }

    fn require_connection(&self) -> Result<(), RemoteError> {
        if self.snapshot.lock().unwrap().is_connected {
            Ok(())
        } else {
            Err(RemoteError::NotConnected)
        }
    }
}

impl RemoteService for FakeRemote {
    fn request_session(&self) -> Result<(), RemoteError> {
        self.record("request_session");
        Ok(())
    }

    fn end_session(&self, stop_media: bool) {
        self.record(format!("end_session:{stop_media}"));
        self.snapshot.lock().unwrap().is_connected = false;
        *self.session.lock().unwrap() = SessionState::Ended;
    }

    fn session_state(&self) -> SessionState {
        *self.session.lock().unwrap()
    }

    fn snapshot(&self) -> RemotePlayerSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn load_media(&self, request: LoadRequest) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record("load");
        self.loads.lock().unwrap().push(request);
        Ok(())
    }

    fn play(&self) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record("play");
        self.update(|s| {
            s.is_paused = false;
            s.player_state = RemotePlayerState::Playing;
        });
        Ok(())
    }

    fn pause(&self) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record("pause");
        self.update(|s| {
            s.is_paused = true;
            s.player_state = RemotePlayerState::Paused;
        });
        Ok(())
    }

    fn stop(&self) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record("stop");
        self.update(|s| {
            s.media_info = None;
            s.player_state = RemotePlayerState::Idle;
        });
        Ok(())
    }

    fn seek(&self, media_time: f64) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record(format!("seek:{media_time}"));
        self.update(|s| s.current_time = media_time);
        Ok(())
    }

    fn set_volume(&self, level: f64) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record(format!("volume:{level}"));
        self.update(|s| s.volume_level = level);
        Ok(())
    }

    fn set_muted(&self, muted: bool) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record(if muted { "mute" } else { "unmute" });
        self.update(|s| s.is_muted = muted);
        Ok(())
    }

    fn skip_ad(&self) -> Result<(), RemoteError> {
        self.require_connection()?;
        self.record("skip_ad");
        Ok(())
    }
}
