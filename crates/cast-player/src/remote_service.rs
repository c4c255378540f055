//! Contract for the external remote session service.
//!
//! Discovery and the session transport live outside this crate. The core only
//! sees the command surface below plus the [`RemoteEvent`] stream the service
//! emits when receiver-side state changes.

use cast_player_types::{AdBreak, BreakClip, LiveStreamMetadata, SeekableRange, StreamType};
use serde::Serialize;

use crate::error::{CastErrorCode, RemoteError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    NoSession,
    Starting,
    Started,
    /// Reconnected to a session that was already running on the receiver.
    Resumed,
    Ended,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemotePlayerState {
    #[default]
    Idle,
    Buffering,
    Playing,
    Paused,
}

/// Media currently loaded on the receiver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteMediaInfo {
    pub content_id: String,
    pub content_type: String,
    pub stream_type: StreamType,
    pub title: String,
    pub subtitle: String,
    pub duration: Option<f64>,
    pub live: LiveStreamMetadata,
    pub breaks: Vec<AdBreak>,
    pub break_clips: Vec<BreakClip>,
}

impl RemoteMediaInfo {
    pub fn is_live(&self) -> bool {
        self.stream_type == StreamType::Live
    }
}

/// Point-in-time view of the remote player.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemotePlayerSnapshot {
    pub is_connected: bool,
    pub receiver_name: Option<String>,
    pub player_state: RemotePlayerState,
    pub media_info: Option<RemoteMediaInfo>,
    /// Raw receiver media time (absolute for live streams).
    pub current_time: f64,
    pub duration: Option<f64>,
    pub can_seek: bool,
    pub is_paused: bool,
    pub is_muted: bool,
    pub volume_level: f64,
    pub is_playing_break: bool,
    pub when_skippable: Option<f64>,
    pub current_break_clip_time: Option<f64>,
    pub break_clip_id: Option<String>,
    pub live_seekable_range: Option<SeekableRange>,
}

impl RemotePlayerSnapshot {
    /// `true` when the receiver has any non-idle media session.
    pub fn is_media_loaded(&self) -> bool {
        self.media_info.is_some() && self.player_state != RemotePlayerState::Idle
    }
}

/// Change notifications emitted by the remote service.
#[derive(Clone, Debug, PartialEq)]
pub enum RemoteEvent {
    ConnectionChanged { connected: bool },
    MediaInfoChanged(Option<RemoteMediaInfo>),
    CanSeekChanged(bool),
    PausedChanged(bool),
    MutedChanged(bool),
    VolumeChanged(f64),
    PlayingBreakChanged(bool),
    WhenSkippableChanged(Option<f64>),
    BreakClipTimeChanged(Option<f64>),
    BreakClipIdChanged(Option<String>),
    LiveSeekableRangeChanged(Option<SeekableRange>),
    /// Resolution of a [`RemoteService::load_media`] call.
    LoadFinished {
        request_id: u64,
        result: Result<(), CastErrorCode>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_start_absolute_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_start_time_in_media: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_duration: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInformation {
    pub content_id: String,
    pub content_type: String,
    pub stream_type: StreamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub metadata: MediaMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breaks: Vec<AdBreak>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub break_clips: Vec<BreakClip>,
}

/// Load request submitted to the receiver.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    /// Request epoch echoed back in [`RemoteEvent::LoadFinished`].
    pub request_id: u64,
    pub media: MediaInformation,
    pub autoplay: bool,
    pub current_time: f64,
}

impl LoadRequest {
    /// JSON payload as sent over the session channel.
    pub fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
        let mut payload = serde_json::to_value(self)?;
        payload["type"] = "LOAD".into();
        Ok(payload)
    }
}

/// Command surface of the remote session service.
///
/// Commands return once submitted; their effects arrive later as
/// [`RemoteEvent`]s.
pub trait RemoteService {
    /// Ask the service to start (or join) a session.
    fn request_session(&self) -> Result<(), RemoteError>;
    /// Leave the session, optionally stopping receiver playback.
    fn end_session(&self, stop_media: bool);
    fn session_state(&self) -> SessionState;
    fn snapshot(&self) -> RemotePlayerSnapshot;
    fn load_media(&self, request: LoadRequest) -> Result<(), RemoteError>;
    fn play(&self) -> Result<(), RemoteError>;
    fn pause(&self) -> Result<(), RemoteError>;
    fn stop(&self) -> Result<(), RemoteError>;
    fn seek(&self, media_time: f64) -> Result<(), RemoteError>;
    fn set_volume(&self, level: f64) -> Result<(), RemoteError>;
    fn set_muted(&self, muted: bool) -> Result<(), RemoteError>;
    fn skip_ad(&self) -> Result<(), RemoteError>;
}
