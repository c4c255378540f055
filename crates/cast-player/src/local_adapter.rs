//! In-page playback through a local media element.

use cast_player_types::{DisplayModel, MediaItem, PlaybackState, PlaybackTarget};

use crate::adapter::{LoadContext, PlaybackAdapter};
use crate::error::LoadError;
use crate::time_format::{format_media_time, format_optional_media_time};

/// Events raised by the media element.
#[derive(Clone, Debug, PartialEq)]
pub enum LocalMediaEvent {
    /// The source set with `token` finished loading.
    Loaded { token: u64 },
    /// The source set with `token` failed to load.
    Failed { token: u64, message: String },
    Ended,
}

/// Minimal surface of an on-page video element.
pub trait MediaElement {
    fn source(&self) -> Option<String>;
    /// Replace the source and start buffering; completion is reported as a
    /// [`LocalMediaEvent`] tagged with `token`.
    fn load_source(&mut self, url: &str, token: u64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, time: f64);
    fn duration(&self) -> Option<f64>;
    fn set_volume(&mut self, level: f64);
    fn volume(&self) -> f64;
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
    fn set_fullscreen(&mut self, fullscreen: bool) -> bool;
    fn is_fullscreen(&self) -> bool;
}

pub struct LocalAdapter {
    element: Box<dyn MediaElement>,
}

impl LocalAdapter {
    pub fn new(element: Box<dyn MediaElement>) -> Self {
        Self { element }
    }
}

impl PlaybackAdapter for LocalAdapter {
    fn target(&self) -> PlaybackTarget {
        PlaybackTarget::Local
    }

    fn play(&mut self) {
        self.element.play();
    }

    fn pause(&mut self) {
        if !self.element.is_paused() {
            self.element.pause();
        }
    }

    fn stop(&mut self) {
        self.pause();
        self.element.set_current_time(0.0);
    }

    fn load(&mut self, context: LoadContext) -> Result<(), LoadError> {
        tracing::debug!(
            url = %context.item.content_url,
            epoch = context.epoch,
            "local: loading source"
        );
        self.element.load_source(&context.item.content_url, context.epoch);
        Ok(())
    }

    fn is_media_loaded(&self, item: Option<&MediaItem>) -> bool {
        match (self.element.source(), item) {
            (Some(source), Some(item)) => source == item.content_url,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn current_media_time(&self) -> f64 {
        self.element.current_time()
    }

    fn media_duration(&self) -> Option<f64> {
        self.element
            .duration()
            .filter(|duration| duration.is_finite() && *duration > 0.0)
    }

    fn can_seek(&self) -> bool {
        self.media_duration().is_some()
    }

    fn seek_to(&mut self, time: f64) {
        self.element.set_current_time(time);
    }

    fn set_volume(&mut self, level: f64) {
        self.element.set_volume(level);
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn mute(&mut self) {
        self.element.set_muted(true);
    }

    fn un_mute(&mut self) {
        self.element.set_muted(false);
    }

    fn is_muted(&self) -> bool {
        self.element.is_muted()
    }

    fn reported_state(&self) -> Option<PlaybackState> {
        self.element.source()?;
        Some(if self.element.is_paused() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        })
    }

    fn content_url(&self) -> Option<String> {
        self.element.source()
    }

    fn is_live(&self) -> bool {
        false
    }

    fn live_section_start(&self) -> Option<f64> {
        None
    }

    fn supports_fullscreen(&self) -> bool {
        true
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> bool {
        self.element.set_fullscreen(fullscreen)
    }

    fn update_display(&self, display: &mut DisplayModel) {
        display.target = PlaybackTarget::Local;
        display.fullscreen_available = true;
        display.fullscreen = self.element.is_fullscreen();
        display.receiver_name = None;
    }

    fn update_current_time_display(&self, current_time: f64, display: &mut DisplayModel) {
        display.current_time = Some(format_media_time(current_time));
    }

    fn update_duration_display(&self, duration: Option<f64>, display: &mut DisplayModel) {
        display.duration = format_optional_media_time(duration);
    }
}
