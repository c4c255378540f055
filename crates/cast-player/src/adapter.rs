//! Playback backend abstraction.
//!
//! Implementations translate coordinator intents into local element or remote
//! session commands. The coordinator only ever talks to this trait.

use cast_player_types::{
    AdBreak, BreakClip, DisplayModel, MediaItem, PlaybackState, PlaybackTarget,
};

use crate::catalog::LiveStream;
use crate::error::LoadError;

/// Optional metadata attached to a load, chosen by the feature mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadExtras {
    #[default]
    None,
    Ads {
        breaks: Vec<AdBreak>,
        clips: Vec<BreakClip>,
    },
    Live(LiveStream),
}

/// Everything an adapter needs to start loading one item.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadContext {
    /// Request epoch; completions carrying another epoch are stale.
    pub epoch: u64,
    pub index: usize,
    pub item: MediaItem,
    /// Position to resume at, in media-relative seconds.
    pub start_time: f64,
    pub autoplay: bool,
    pub extras: LoadExtras,
}

pub trait PlaybackAdapter {
    fn target(&self) -> PlaybackTarget;

    fn play(&mut self);
    /// Must be a no-op when already paused.
    fn pause(&mut self);
    fn stop(&mut self);
    /// Start loading; readiness is reported asynchronously with `context.epoch`.
    fn load(&mut self, context: LoadContext) -> Result<(), LoadError>;
    /// With `Some(item)`, whether that item is the loaded one; with `None`,
    /// whether anything is loaded.
    fn is_media_loaded(&self, item: Option<&MediaItem>) -> bool;

    /// Current position in media-relative seconds.
    fn current_media_time(&self) -> f64;
    /// `None` when unknown or unbounded.
    fn media_duration(&self) -> Option<f64>;
    fn can_seek(&self) -> bool;
    /// Seek to absolute media time.
    fn seek_to(&mut self, time: f64);

    fn set_volume(&mut self, level: f64);
    fn volume(&self) -> f64;
    fn mute(&mut self);
    fn un_mute(&mut self);
    fn is_muted(&self) -> bool;

    /// Playback state as the backend itself reports it.
    fn reported_state(&self) -> Option<PlaybackState>;
    fn content_url(&self) -> Option<String>;
    fn is_live(&self) -> bool;
    /// Media time at the start of the live section, when known.
    fn live_section_start(&self) -> Option<f64>;

    fn ad_breaks(&self) -> Vec<AdBreak> {
        Vec::new()
    }

    fn skip_ad(&mut self) {}

    fn supports_fullscreen(&self) -> bool {
        false
    }

    /// Returns the resulting fullscreen state.
    fn set_fullscreen(&mut self, _fullscreen: bool) -> bool {
        false
    }

    /// Fill in target-specific fields of the display snapshot.
    fn update_display(&self, display: &mut DisplayModel);
    fn update_current_time_display(&self, current_time: f64, display: &mut DisplayModel);
    fn update_duration_display(&self, duration: Option<f64>, display: &mut DisplayModel);
}
