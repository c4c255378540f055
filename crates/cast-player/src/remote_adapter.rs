//! Playback on a remote receiver through the session service.

use std::sync::Arc;

use cast_player_types::{
    AdBreak, DisplayModel, MediaItem, PlaybackState, PlaybackTarget, StreamType,
};
use time::UtcOffset;

use crate::adapter::{LoadContext, LoadExtras, PlaybackAdapter};
use crate::error::{LoadError, RemoteError};
use crate::remote_service::{
    LoadRequest, MediaInformation, MediaMetadata, RemotePlayerSnapshot, RemotePlayerState,
    RemoteService,
};
use crate::time_format::{format_clock_time, format_media_time, format_optional_media_time};

pub struct RemoteAdapter {
    service: Arc<dyn RemoteService>,
    clock_offset: UtcOffset,
}

impl RemoteAdapter {
    pub fn new(service: Arc<dyn RemoteService>, clock_offset: UtcOffset) -> Self {
        Self {
            service,
            clock_offset,
        }
    }

    fn snapshot(&self) -> RemotePlayerSnapshot {
        self.service.snapshot()
    }

    fn log_command(command: &str, result: Result<(), RemoteError>) {
        if let Err(err) = result {
            tracing::warn!(command, error = %err, "remote: command failed");
        }
    }
}

/// Build the receiver load request for a coordinator load.
pub fn build_load_request(context: &LoadContext) -> LoadRequest {
    let (item, stream_type, live) = match &context.extras {
        LoadExtras::Live(live) => (&live.item, StreamType::Live, Some(live.metadata)),
        _ => (&context.item, StreamType::Buffered, None),
    };
    let (breaks, break_clips) = match &context.extras {
        LoadExtras::Ads { breaks, clips } => (breaks.clone(), clips.clone()),
        _ => (Vec::new(), Vec::new()),
    };
    let live = live.unwrap_or_default();
    LoadRequest {
        request_id: context.epoch,
        media: MediaInformation {
            content_id: item.content_url.clone(),
            content_type: item.content_type.clone(),
            stream_type,
            duration: item.duration,
            metadata: MediaMetadata {
                title: item.title.clone(),
                subtitle: item.subtitle.clone(),
                images: item.thumbnail.iter().cloned().collect(),
                section_start_absolute_time: live.section_start_absolute_time,
                section_start_time_in_media: live.section_start_time_in_media,
                section_duration: live.section_duration,
            },
            breaks,
            break_clips,
        },
        autoplay: context.autoplay,
        current_time: context.start_time,
    }
}

impl PlaybackAdapter for RemoteAdapter {
    fn target(&self) -> PlaybackTarget {
        PlaybackTarget::Remote
    }

    fn play(&mut self) {
        if self.snapshot().is_paused {
            Self::log_command("play", self.service.play());
        }
    }

    fn pause(&mut self) {
        let snapshot = self.snapshot();
        if snapshot.is_media_loaded() && !snapshot.is_paused {
            Self::log_command("pause", self.service.pause());
        }
    }

    fn stop(&mut self) {
        if self.snapshot().is_media_loaded() {
            Self::log_command("stop", self.service.stop());
        }
    }

    fn load(&mut self, context: LoadContext) -> Result<(), LoadError> {
        let request = build_load_request(&context);
        tracing::info!(
            content_id = %request.media.content_id,
            request_id = request.request_id,
            current_time = request.current_time,
            autoplay = request.autoplay,
            "remote: submitting load request"
        );
        self.service.load_media(request).map_err(LoadError::Submit)
    }

    fn is_media_loaded(&self, _item: Option<&MediaItem>) -> bool {
        // The receiver is authoritative: whatever it plays counts as loaded.
        self.snapshot().is_media_loaded()
    }

    fn current_media_time(&self) -> f64 {
        let snapshot = self.snapshot();
        let section_start = snapshot
            .media_info
            .as_ref()
            .filter(|info| info.is_live())
            .and_then(|info| info.live.section_start_time_in_media);
        match section_start {
            Some(start) => snapshot.current_time - start,
            None => snapshot.current_time,
        }
    }

    fn media_duration(&self) -> Option<f64> {
        let snapshot = self.snapshot();
        match snapshot.media_info.as_ref() {
            Some(info) if info.is_live() => info.live.section_duration,
            _ => snapshot.duration.filter(|duration| *duration > 0.0),
        }
    }

    fn can_seek(&self) -> bool {
        self.snapshot().can_seek
    }

    fn seek_to(&mut self, time: f64) {
        Self::log_command("seek", self.service.seek(time));
    }

    fn set_volume(&mut self, level: f64) {
        Self::log_command("volume", self.service.set_volume(level));
    }

    fn volume(&self) -> f64 {
        self.snapshot().volume_level
    }

    fn mute(&mut self) {
        if !self.snapshot().is_muted {
            Self::log_command("mute", self.service.set_muted(true));
        }
    }

    fn un_mute(&mut self) {
        if self.snapshot().is_muted {
            Self::log_command("unmute", self.service.set_muted(false));
        }
    }

    fn is_muted(&self) -> bool {
        self.snapshot().is_muted
    }

    fn reported_state(&self) -> Option<PlaybackState> {
        let snapshot = self.snapshot();
        if !snapshot.is_connected {
            return None;
        }
        Some(match snapshot.player_state {
            RemotePlayerState::Idle => PlaybackState::Idle,
            RemotePlayerState::Buffering => PlaybackState::Buffering,
            RemotePlayerState::Playing => PlaybackState::Playing,
            RemotePlayerState::Paused => PlaybackState::Paused,
        })
    }

    fn content_url(&self) -> Option<String> {
        self.snapshot().media_info.map(|info| info.content_id)
    }

    fn is_live(&self) -> bool {
        self.snapshot()
            .media_info
            .is_some_and(|info| info.is_live())
    }

    fn live_section_start(&self) -> Option<f64> {
        self.snapshot()
            .media_info
            .filter(|info| info.is_live())
            .and_then(|info| info.live.section_start_time_in_media)
    }

    fn ad_breaks(&self) -> Vec<AdBreak> {
        self.snapshot()
            .media_info
            .map(|info| info.breaks)
            .unwrap_or_default()
    }

    fn skip_ad(&mut self) {
        Self::log_command("skip_ad", self.service.skip_ad());
    }

    fn update_display(&self, display: &mut DisplayModel) {
        let snapshot = self.snapshot();
        display.target = PlaybackTarget::Remote;
        display.fullscreen_available = false;
        display.fullscreen = false;
        display.receiver_name = snapshot.receiver_name;
        if let Some(info) = snapshot.media_info {
            // Receiver metadata wins; it may be playing something we did not load.
            display.title = info.title;
            display.subtitle = info.subtitle;
        }
    }

    fn update_current_time_display(&self, current_time: f64, display: &mut DisplayModel) {
        let absolute_start = self
            .snapshot()
            .media_info
            .filter(|info| info.is_live())
            .and_then(|info| info.live.section_start_absolute_time);
        display.current_time = Some(match absolute_start {
            Some(start) => format_clock_time(start + current_time, self.clock_offset),
            None => format_media_time(current_time),
        });
    }

    fn update_duration_display(&self, duration: Option<f64>, display: &mut DisplayModel) {
        display.duration = format_optional_media_time(duration);
    }
}
