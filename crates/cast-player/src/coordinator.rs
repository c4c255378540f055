//! Playback coordinator.
//!
//! Owns the playback state machine for the active target and drives it
//! through a [`PlaybackAdapter`]. All state changes happen on the caller's
//! thread; asynchronous completions come back as events carrying the load
//! epoch they belong to.

use std::sync::Arc;
use std::time::Instant;

use cast_player_types::{
    DisplayModel, FeatureMode, LiveIndicator, PlayAffordance, PlaybackState, PlaybackTarget,
    SkipButton,
};
use crossbeam_channel::Receiver;

use crate::ad_breaks::{AdPlayback, marker_offsets};
use crate::adapter::{LoadContext, LoadExtras, PlaybackAdapter};
use crate::catalog::Catalog;
use crate::config::PlayerOptions;
use crate::display::DisplayBus;
use crate::error::{CoordinatorError, LoadError, SeekRejected};
use crate::live_range::LiveRangeTracker;
use crate::local_adapter::LocalMediaEvent;
use crate::progress_timer::ProgressTimer;
use crate::remote_service::{RemoteEvent, RemoteMediaInfo};

/// Mutable playback state for the selected item.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub state: PlaybackState,
    pub current_media_index: usize,
    /// Last known position in media-relative seconds.
    pub current_time: f64,
    pub duration: Option<f64>,
    pub is_live_content: bool,
    pub live: LiveRangeTracker,
    pub ads: AdPlayback,
    /// User-facing message for the last failed load.
    pub error: Option<String>,
}

impl PlaybackSession {
    fn new(live_edge_tolerance: f64) -> Self {
        Self {
            state: PlaybackState::Idle,
            current_media_index: 0,
            current_time: 0.0,
            duration: None,
            is_live_content: false,
            live: LiveRangeTracker::new(live_edge_tolerance),
            ads: AdPlayback::default(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingLoad {
    epoch: u64,
    start_time: f64,
    autoplay: bool,
}

pub struct PlaybackCoordinator {
    catalog: Arc<Catalog>,
    options: PlayerOptions,
    adapter: Box<dyn PlaybackAdapter>,
    session: PlaybackSession,
    feature_mode: FeatureMode,
    epoch: u64,
    pending_load: Option<PendingLoad>,
    progress_timer: Option<ProgressTimer>,
    display: DisplayBus,
}

impl PlaybackCoordinator {
    pub fn new(
        catalog: Arc<Catalog>,
        options: PlayerOptions,
        adapter: Box<dyn PlaybackAdapter>,
        display: DisplayBus,
    ) -> Self {
        let session = PlaybackSession::new(options.live_edge_tolerance);
        Self {
            catalog,
            feature_mode: options.feature_mode,
            options,
            adapter,
            session,
            epoch: 0,
            pending_load: None,
            progress_timer: None,
            display,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn current_time(&self) -> f64 {
        self.session.current_time
    }

    pub fn current_media_index(&self) -> usize {
        self.session.current_media_index
    }

    pub fn target(&self) -> PlaybackTarget {
        self.adapter.target()
    }

    pub fn feature_mode(&self) -> FeatureMode {
        self.feature_mode
    }

    /// Epoch of the most recent load request.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_progress_timer(&self) -> bool {
        self.progress_timer.is_some()
    }

    pub fn progress_ticks(&self) -> Option<&Receiver<Instant>> {
        self.progress_timer.as_ref().map(ProgressTimer::ticks)
    }

    /// Play the selected item, loading it first when the adapter does not
    /// have it.
    pub fn play(&mut self) {
        if self.session.state == PlaybackState::Buffering {
            tracing::debug!("coordinator: play ignored while loading");
            return;
        }
        let index = self.session.current_media_index;
        let Some(item) = self.catalog.item(index) else {
            tracing::warn!(index, "coordinator: play without a valid selection");
            return;
        };
        if self.session.state == PlaybackState::Idle || !self.adapter.is_media_loaded(Some(item)) {
            let start_time = self.session.current_time;
            self.load_with(index, start_time, true);
            return;
        }
        self.adapter.play();
        self.set_state(PlaybackState::Playing);
        self.publish();
    }

    pub fn pause(&mut self) {
        if !matches!(
            self.session.state,
            PlaybackState::Playing | PlaybackState::Loaded
        ) {
            tracing::debug!(state = ?self.session.state, "coordinator: pause ignored");
            return;
        }
        self.adapter.pause();
        self.session.current_time = self.adapter.current_media_time();
        self.set_state(PlaybackState::Paused);
        self.publish();
    }

    pub fn stop(&mut self) {
        self.adapter.stop();
        self.invalidate_pending_load();
        self.session.current_time = 0.0;
        self.session.ads = AdPlayback::default();
        self.set_state(PlaybackState::Idle);
        self.publish();
    }

    /// Load catalog entry `index` on the active target and autoplay it from
    /// the current position.
    pub fn load(&mut self, index: usize) -> Result<(), CoordinatorError> {
        self.check_index(index)?;
        let start_time = if index == self.session.current_media_index {
            self.session.current_time
        } else {
            0.0
        };
        self.load_with(index, start_time, true);
        Ok(())
    }

    /// Load the selected item on a freshly activated target.
    pub fn handoff_load(&mut self, start_time: f64, autoplay: bool) {
        let index = self.session.current_media_index;
        if self.catalog.item(index).is_none() {
            tracing::warn!(index, "coordinator: nothing to hand off");
            self.set_state(PlaybackState::Idle);
            self.publish();
            return;
        }
        self.session.current_time = start_time;
        self.load_with(index, start_time, autoplay);
    }

    fn load_with(&mut self, index: usize, start_time: f64, autoplay: bool) {
        let Some(item) = self.catalog.item(index).cloned() else {
            return;
        };
        self.epoch += 1;
        let epoch = self.epoch;
        self.session.current_media_index = index;
        self.session.error = None;
        self.session.ads = AdPlayback::default();
        self.set_state(PlaybackState::Buffering);
        self.pending_load = Some(PendingLoad {
            epoch,
            start_time,
            autoplay,
        });
        let context = LoadContext {
            epoch,
            index,
            item,
            start_time,
            autoplay,
            extras: self.load_extras(),
        };
        tracing::info!(
            index,
            epoch,
            start_time,
            autoplay,
            target = ?self.adapter.target(),
            "coordinator: load requested"
        );
        if let Err(err) = self.adapter.load(context) {
            self.fail_load(err);
            return;
        }
        self.publish();
    }

    fn load_extras(&self) -> LoadExtras {
        match self.feature_mode {
            FeatureMode::None => LoadExtras::None,
            FeatureMode::Ads => LoadExtras::Ads {
                breaks: self.catalog.breaks().to_vec(),
                clips: self.catalog.clips().to_vec(),
            },
            FeatureMode::Live => match self.catalog.live() {
                Some(live) => LoadExtras::Live(live.clone()),
                None => {
                    tracing::warn!("coordinator: live mode without a configured stream");
                    LoadExtras::None
                }
            },
        }
    }

    /// Resolve the load tagged `epoch`.
    pub fn on_load_finished(&mut self, epoch: u64, result: Result<(), LoadError>) {
        let Some(pending) = self.pending_load.filter(|pending| pending.epoch == epoch) else {
            tracing::warn!(
                epoch,
                current = self.epoch,
                "coordinator: ignoring stale load completion"
            );
            return;
        };
        self.pending_load = None;
        match result {
            Ok(()) => self.prepare_to_play(pending),
            Err(err) => self.fail_load(err),
        }
    }

    fn prepare_to_play(&mut self, pending: PendingLoad) {
        self.session.duration = self.adapter.media_duration();
        self.session.is_live_content = self.adapter.is_live();
        self.set_state(PlaybackState::Loaded);
        tracing::info!(
            epoch = pending.epoch,
            duration = ?self.session.duration,
            live = self.session.is_live_content,
            "coordinator: media loaded"
        );

        if pending.start_time > 0.0 && self.adapter.target() == PlaybackTarget::Local {
            // The receiver starts at the requested position itself.
            let absolute = pending.start_time + self.section_start();
            self.adapter.seek_to(absolute);
        }
        self.session.current_time = pending.start_time;

        if pending.autoplay {
            self.adapter.play();
            self.set_state(PlaybackState::Playing);
        } else {
            self.adapter.pause();
            self.set_state(PlaybackState::Paused);
        }
        self.publish();
    }

    fn fail_load(&mut self, err: LoadError) {
        tracing::warn!(error = %err, target = ?self.adapter.target(), "coordinator: load failed");
        self.pending_load = None;
        self.session.error = Some(err.user_message());
        self.set_state(PlaybackState::Idle);
        self.publish();
    }

    pub fn seek_to(&mut self, time: f64) -> Result<(), SeekRejected> {
        if !time.is_finite() {
            tracing::debug!(time, "coordinator: seek rejected, time not finite");
            return Err(SeekRejected::InvalidTarget);
        }
        if let Some(reason) = self.seek_blocker() {
            tracing::debug!(time, %reason, "coordinator: seek rejected");
            return Err(reason);
        }
        let duration = self.adapter.media_duration().unwrap_or(0.0);
        let target = time.clamp(0.0, duration);
        self.adapter.seek_to(target + self.section_start());
        self.session.current_time = target;
        self.publish();
        Ok(())
    }

    /// Seek to a horizontal click position on the progress bar.
    pub fn seek_to_position(&mut self, pixel: f64) -> Result<(), SeekRejected> {
        if !pixel.is_finite() {
            tracing::debug!(pixel, "coordinator: seek rejected, position not finite");
            return Err(SeekRejected::InvalidTarget);
        }
        let Some(duration) = self.adapter.media_duration() else {
            tracing::debug!(pixel, "coordinator: seek rejected, duration unknown");
            return Err(SeekRejected::UnknownDuration);
        };
        let fraction = (pixel / self.options.timeline_width).clamp(0.0, 1.0);
        self.seek_to(fraction * duration)
    }

    fn seek_blocker(&self) -> Option<SeekRejected> {
        if !matches!(
            self.session.state,
            PlaybackState::Playing | PlaybackState::Paused
        ) {
            return Some(SeekRejected::NotActive);
        }
        if !self.adapter.media_duration().is_some_and(|d| d > 0.0) {
            return Some(SeekRejected::UnknownDuration);
        }
        if !self.adapter.can_seek() {
            return Some(SeekRejected::NotSeekable);
        }
        if self.session.ads.blocks_seeking() {
            return Some(SeekRejected::PlayingBreak);
        }
        if self.session.is_live_content && !self.session.live.has_range() {
            return Some(SeekRejected::NoSeekableRange);
        }
        None
    }

    fn section_start(&self) -> f64 {
        if self.session.is_live_content {
            self.adapter.live_section_start().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    pub fn set_volume(&mut self, level: f64) {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.adapter.set_volume(level);
        self.publish();
    }

    /// Set volume from a vertical slider position.
    pub fn set_volume_from_slider(&mut self, pixel: f64) {
        self.set_volume(pixel / self.options.volume_slider_height);
    }

    pub fn mute(&mut self) {
        self.adapter.mute();
        self.publish();
    }

    pub fn un_mute(&mut self) {
        self.adapter.un_mute();
        self.publish();
    }

    /// Returns whether fullscreen is now active.
    pub fn request_fullscreen(&mut self) -> bool {
        self.change_fullscreen(true)
    }

    pub fn exit_fullscreen(&mut self) -> bool {
        self.change_fullscreen(false)
    }

    fn change_fullscreen(&mut self, fullscreen: bool) -> bool {
        if !self.adapter.supports_fullscreen() {
            tracing::debug!(target = ?self.adapter.target(), "coordinator: fullscreen unavailable");
            return false;
        }
        let active = self.adapter.set_fullscreen(fullscreen);
        self.publish();
        active
    }

    pub fn skip_ad(&mut self) {
        if self.session.ads.skip_button() != SkipButton::Visible {
            tracing::debug!("coordinator: skip ignored, clip not skippable yet");
            return;
        }
        self.adapter.skip_ad();
    }

    /// Applies to loads issued after this call.
    pub fn set_feature_mode(&mut self, mode: FeatureMode) {
        if mode == FeatureMode::Live && self.catalog.live().is_none() {
            tracing::warn!("coordinator: live mode selected without a live stream");
        }
        tracing::info!(?mode, "coordinator: feature mode changed");
        self.feature_mode = mode;
    }

    /// Make `index` the selected item without loading it.
    pub fn prepare_media(&mut self, index: usize) -> Result<(), CoordinatorError> {
        self.check_index(index)?;
        self.invalidate_pending_load();
        self.session.current_media_index = index;
        self.session.current_time = 0.0;
        self.session.duration = None;
        self.session.is_live_content = false;
        self.session.live.clear();
        self.session.ads = AdPlayback::default();
        self.session.error = None;
        self.set_state(PlaybackState::Idle);
        self.publish();
        Ok(())
    }

    pub fn select_media(&mut self, index: usize) -> Result<(), CoordinatorError> {
        self.prepare_media(index)?;
        self.play();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), CoordinatorError> {
        if index < self.catalog.len() {
            Ok(())
        } else {
            Err(CoordinatorError::UnknownMedia {
                index,
                len: self.catalog.len(),
            })
        }
    }

    pub fn on_progress_tick(&mut self) {
        if self.session.state != PlaybackState::Playing {
            self.stop_progress_timer();
            return;
        }
        let current = self.adapter.current_media_time();
        let duration = self.adapter.media_duration();
        self.session.current_time = current;
        self.session.duration = duration;
        if !self.session.is_live_content
            && let Some(duration) = duration
            && current >= duration
        {
            self.on_media_ended();
            return;
        }
        self.publish();
    }

    fn on_media_ended(&mut self) {
        if !self.session.state.has_media() {
            return;
        }
        tracing::info!(
            index = self.session.current_media_index,
            "coordinator: playback reached end of media"
        );
        self.session.current_time = 0.0;
        self.set_state(PlaybackState::Idle);
        self.publish();
    }

    pub fn on_local_event(&mut self, event: LocalMediaEvent) {
        match event {
            LocalMediaEvent::Loaded { token } => self.on_load_finished(token, Ok(())),
            LocalMediaEvent::Failed { token, message } => {
                self.on_load_finished(token, Err(LoadError::Local(message)))
            }
            LocalMediaEvent::Ended => self.on_media_ended(),
        }
    }

    pub fn on_remote_event(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::ConnectionChanged { connected } => {
                tracing::debug!(connected, "coordinator: connection change left to switch");
                return;
            }
            RemoteEvent::LoadFinished { request_id, result } => {
                self.on_load_finished(request_id, result.map_err(LoadError::Remote));
                return;
            }
            RemoteEvent::MediaInfoChanged(info) => self.on_remote_media_info(info),
            RemoteEvent::PausedChanged(paused) => self.on_remote_paused(paused),
            RemoteEvent::PlayingBreakChanged(playing) => {
                self.session.ads.playing_break = playing;
                if !playing {
                    self.session.ads = AdPlayback::default();
                }
            }
            RemoteEvent::WhenSkippableChanged(when) => self.session.ads.when_skippable = when,
            RemoteEvent::BreakClipTimeChanged(time) => self.session.ads.break_clip_time = time,
            RemoteEvent::BreakClipIdChanged(id) => self.session.ads.break_clip_id = id,
            RemoteEvent::LiveSeekableRangeChanged(range) => self.session.live.update(range),
            RemoteEvent::CanSeekChanged(_)
            | RemoteEvent::MutedChanged(_)
            | RemoteEvent::VolumeChanged(_) => {}
        }
        self.publish();
    }

    fn on_remote_media_info(&mut self, info: Option<RemoteMediaInfo>) {
        match info {
            None => {
                if self.pending_load.is_none() && self.session.state.has_media() {
                    tracing::info!("coordinator: receiver media session ended");
                    self.session.current_time = 0.0;
                    self.session.ads = AdPlayback::default();
                    self.set_state(PlaybackState::Idle);
                }
            }
            Some(info) => {
                self.session.is_live_content = info.is_live();
                self.session.duration = self.adapter.media_duration();
                if self.pending_load.is_none()
                    && let Some(index) = self.catalog.index_of_url(&info.content_id)
                {
                    self.session.current_media_index = index;
                }
            }
        }
    }

    fn on_remote_paused(&mut self, paused: bool) {
        if !self.session.state.has_media() {
            tracing::debug!(paused, state = ?self.session.state, "coordinator: pause change ignored");
            return;
        }
        self.session.current_time = self.adapter.current_media_time();
        if paused {
            self.set_state(PlaybackState::Paused);
        } else {
            self.set_state(PlaybackState::Playing);
        }
    }

    /// Take over whatever a resumed remote session is already playing.
    pub fn adopt_remote_session(&mut self) {
        self.invalidate_pending_load();
        if let Some(index) = self
            .adapter
            .content_url()
            .and_then(|url| self.catalog.index_of_url(&url))
        {
            self.session.current_media_index = index;
        }
        self.session.is_live_content = self.adapter.is_live();
        self.session.duration = self.adapter.media_duration();
        self.session.current_time = self.adapter.current_media_time();
        let state = match self.adapter.reported_state() {
            // Mid-stream buffering on the receiver still means playback intent.
            Some(PlaybackState::Buffering) => PlaybackState::Playing,
            Some(state) => state,
            None => PlaybackState::Idle,
        };
        tracing::info!(
            ?state,
            index = self.session.current_media_index,
            current_time = self.session.current_time,
            "coordinator: adopted resumed remote session"
        );
        self.set_state(state);
        self.publish();
    }

    /// Capture the active adapter's position while it still has media.
    pub fn refresh_position(&mut self) {
        if self.session.state.has_media() {
            self.session.current_time = self.adapter.current_media_time();
        }
    }

    pub fn pause_active_adapter(&mut self) {
        self.adapter.pause();
    }

    /// Whether the active adapter has any media, regardless of catalog.
    pub fn adapter_has_media(&self) -> bool {
        self.adapter.is_media_loaded(None)
    }

    /// Install `adapter` as the active target and return the previous one.
    pub fn swap_adapter(&mut self, adapter: Box<dyn PlaybackAdapter>) -> Box<dyn PlaybackAdapter> {
        self.invalidate_pending_load();
        self.stop_progress_timer();
        let previous = std::mem::replace(&mut self.adapter, adapter);
        tracing::info!(
            from = ?previous.target(),
            to = ?self.adapter.target(),
            "coordinator: active target swapped"
        );
        previous
    }

    /// Reset to idle at `current_time` on a freshly activated local target and
    /// resume when there is a position to resume from.
    pub fn resume_locally(&mut self, current_time: f64) {
        self.session.current_time = current_time;
        self.session.is_live_content = false;
        self.session.live.clear();
        self.session.ads = AdPlayback::default();
        self.set_state(PlaybackState::Idle);
        if current_time > 0.0 {
            self.play();
        } else {
            self.publish();
        }
    }

    pub fn stop_progress_timer(&mut self) {
        if self.progress_timer.take().is_some() {
            tracing::trace!("coordinator: progress timer stopped");
        }
    }

    fn start_progress_timer(&mut self) {
        if self.progress_timer.is_none() {
            self.progress_timer = Some(ProgressTimer::start(self.options.progress_interval));
        }
    }

    fn invalidate_pending_load(&mut self) {
        if let Some(pending) = self.pending_load.take() {
            tracing::debug!(epoch = pending.epoch, "coordinator: pending load abandoned");
        }
    }

    /// The progress timer runs exactly while playing.
    fn set_state(&mut self, state: PlaybackState) {
        if self.session.state != state {
            tracing::debug!(from = ?self.session.state, to = ?state, "coordinator: state change");
        }
        self.session.state = state;
        if state == PlaybackState::Playing {
            self.start_progress_timer();
        } else {
            self.stop_progress_timer();
        }
    }

    pub fn publish(&self) {
        self.display.publish(self.display_model());
    }

    /// Snapshot of everything the view shows.
    pub fn display_model(&self) -> DisplayModel {
        let session = &self.session;
        let width = self.options.timeline_width;
        let duration = session.duration;
        let mut display = DisplayModel {
            state: session.state,
            media_index: session.current_media_index,
            play_affordance: if session.state == PlaybackState::Playing {
                PlayAffordance::Pause
            } else {
                PlayAffordance::Play
            },
            error: session.error.clone(),
            ..DisplayModel::default()
        };
        if let Some(item) = self.catalog.item(session.current_media_index) {
            display.title = item.title.clone();
            display.subtitle = item.subtitle.clone();
        }
        self.adapter.update_display(&mut display);
        self.adapter
            .update_current_time_display(session.current_time, &mut display);
        self.adapter.update_duration_display(duration, &mut display);

        display.progress_width = match duration {
            Some(duration) if duration > 0.0 => {
                (session.current_time / duration).clamp(0.0, 1.0) * width
            }
            _ => 0.0,
        };
        if duration.is_some() {
            display.ad_markers = marker_offsets(&self.adapter.ad_breaks(), duration, width);
            display.skip_button = session.ads.skip_button();
        }
        if session.is_live_content {
            let section_start = self.adapter.live_section_start().unwrap_or(0.0);
            display.live_indicator = if session.live.has_range() {
                session.live.indicator(session.current_time + section_start)
            } else {
                LiveIndicator::Inactive
            };
            display.live_timeline = Some(session.live.timeline(duration, section_start, width));
        }
        display.seek_enabled = self.seek_blocker().is_none();
        display.volume = self.adapter.volume();
        display.muted = self.adapter.is_muted();
        display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_adapter::LocalAdapter;
    use crate::remote_adapter::RemoteAdapter;
    use crate::remote_service::RemotePlayerState;
    use crate::test_support::{FakeElement, FakeRemote, media_item};
    use cast_player_types::{AdBreak, BreakPosition, LiveStreamMetadata, SeekableRange, StreamType};
    use std::time::Duration;
    use time::UtcOffset;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![
            media_item("http://media.example/a.mp4", Some(120.0)),
            media_item("http://media.example/b.mp4", Some(300.0)),
        ]))
    }

    fn options() -> PlayerOptions {
        PlayerOptions {
            progress_interval: Duration::from_millis(10),
            ..PlayerOptions::default()
        }
    }

    fn local_coordinator() -> (PlaybackCoordinator, FakeElement) {
        let element = FakeElement::new();
        let coordinator = PlaybackCoordinator::new(
            catalog(),
            options(),
            Box::new(LocalAdapter::new(Box::new(element.clone()))),
            DisplayBus::new(),
        );
        (coordinator, element)
    }

    fn remote_coordinator(remote: Arc<FakeRemote>) -> PlaybackCoordinator {
        PlaybackCoordinator::new(
            catalog(),
            options(),
            Box::new(RemoteAdapter::new(remote, UtcOffset::UTC)),
            DisplayBus::new(),
        )
    }

    /// Select item 0 and complete its local load with a known duration.
    fn playing_locally() -> (PlaybackCoordinator, FakeElement) {
        let (mut coordinator, element) = local_coordinator();
        coordinator.select_media(0).unwrap();
        element.state().duration = Some(120.0);
        coordinator.on_local_event(LocalMediaEvent::Loaded {
            token: coordinator.epoch(),
        });
        (coordinator, element)
    }

    #[test]
    fn select_media_loads_and_plays_on_completion() {
        let (mut coordinator, element) = local_coordinator();
        coordinator.select_media(1).unwrap();
        assert_eq!(coordinator.state(), PlaybackState::Buffering);
        assert!(!coordinator.has_progress_timer());

        element.state().duration = Some(300.0);
        coordinator.on_local_event(LocalMediaEvent::Loaded {
            token: coordinator.epoch(),
        });
        assert_eq!(coordinator.state(), PlaybackState::Playing);
        assert!(coordinator.has_progress_timer());
        assert!(!element.state().paused);
        assert_eq!(coordinator.current_media_index(), 1);
    }

    #[test]
    fn select_media_rejects_unknown_index() {
        let (mut coordinator, _element) = local_coordinator();
        assert_eq!(
            coordinator.select_media(5),
            Err(CoordinatorError::UnknownMedia { index: 5, len: 2 })
        );
        assert_eq!(coordinator.state(), PlaybackState::Idle);
    }

    #[test]
    fn progress_timer_runs_only_while_playing() {
        let (mut coordinator, _element) = playing_locally();
        assert!(coordinator.has_progress_timer());

        coordinator.pause();
        assert_eq!(coordinator.state(), PlaybackState::Paused);
        assert!(!coordinator.has_progress_timer());

        coordinator.play();
        assert_eq!(coordinator.state(), PlaybackState::Playing);
        assert!(coordinator.has_progress_timer());

        coordinator.stop();
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(!coordinator.has_progress_timer());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let (mut coordinator, _element) = local_coordinator();
        coordinator.select_media(0).unwrap();
        let first = coordinator.epoch();
        coordinator.select_media(1).unwrap();
        let second = coordinator.epoch();
        assert_ne!(first, second);

        coordinator.on_local_event(LocalMediaEvent::Loaded { token: first });
        assert_eq!(coordinator.state(), PlaybackState::Buffering);

        coordinator.on_local_event(LocalMediaEvent::Loaded { token: second });
        assert_eq!(coordinator.state(), PlaybackState::Playing);
        assert_eq!(coordinator.current_media_index(), 1);
    }

    #[test]
    fn failed_load_resets_to_idle_with_message() {
        let (mut coordinator, _element) = local_coordinator();
        coordinator.select_media(0).unwrap();
        coordinator.on_local_event(LocalMediaEvent::Failed {
            token: coordinator.epoch(),
            message: "decode error".to_string(),
        });
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(!coordinator.has_progress_timer());
        assert_eq!(
            coordinator.display_model().error.as_deref(),
            Some("Local playback failed: decode error")
        );
    }

    #[test]
    fn remote_submit_failure_resets_to_idle() {
        let mut coordinator = remote_coordinator(FakeRemote::disconnected());
        coordinator.select_media(0).unwrap();
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(coordinator.session().error.is_some());
    }

    #[test]
    fn remote_error_code_surfaces_user_message() {
        let remote = FakeRemote::connected();
        let mut coordinator = remote_coordinator(remote.clone());
        coordinator.select_media(0).unwrap();
        coordinator.on_remote_event(RemoteEvent::LoadFinished {
            request_id: coordinator.epoch(),
            result: Err(crate::error::CastErrorCode::Timeout),
        });
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert_eq!(
            coordinator.session().error.as_deref(),
            Some("The operation timed out.")
        );
    }

    #[test]
    fn seek_requires_known_duration() {
        let (mut coordinator, element) = playing_locally();
        element.state().duration = None;
        assert_eq!(coordinator.seek_to(10.0), Err(SeekRejected::UnknownDuration));
        assert_eq!(
            coordinator.seek_to_position(100.0),
            Err(SeekRejected::UnknownDuration)
        );
        assert_eq!(element.state().current_time, 0.0);
    }

    #[test]
    fn non_finite_seek_targets_are_rejected() {
        let (mut coordinator, element) = playing_locally();
        element.state().current_time = 30.0;
        coordinator.on_progress_tick();

        assert_eq!(coordinator.seek_to(f64::NAN), Err(SeekRejected::InvalidTarget));
        assert_eq!(
            coordinator.seek_to(f64::INFINITY),
            Err(SeekRejected::InvalidTarget)
        );
        assert_eq!(
            coordinator.seek_to_position(f64::NAN),
            Err(SeekRejected::InvalidTarget)
        );
        assert_eq!(coordinator.current_time(), 30.0);
        assert_eq!(element.state().current_time, 30.0);
        assert!(coordinator.display_model().progress_width.is_finite());
    }

    #[test]
    fn prepare_media_selects_without_loading() {
        let (mut coordinator, element) = playing_locally();
        let loads = element.state().load_tokens.len();

        coordinator.prepare_media(1).unwrap();
        assert_eq!(coordinator.current_media_index(), 1);
        assert_eq!(coordinator.current_time(), 0.0);
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(!coordinator.has_progress_timer());
        assert_eq!(element.state().load_tokens.len(), loads);
    }

    #[test]
    fn lagging_view_still_receives_final_state() {
        let element = FakeElement::new();
        let display = DisplayBus::new();
        let updates = display.subscribe();
        let mut coordinator = PlaybackCoordinator::new(
            catalog(),
            options(),
            Box::new(LocalAdapter::new(Box::new(element.clone()))),
            display,
        );
        for step in 0..70 {
            coordinator.set_volume(step as f64 / 70.0);
        }
        coordinator.select_media(0).unwrap();
        element.state().duration = Some(120.0);
        coordinator.on_local_event(LocalMediaEvent::Loaded {
            token: coordinator.epoch(),
        });
        coordinator.pause();

        let last = updates.try_iter().last().unwrap();
        assert_eq!(last.state, PlaybackState::Paused);
    }

    #[test]
    fn pause_while_paused_is_a_no_op() {
        let (mut coordinator, element) = playing_locally();
        coordinator.pause();
        assert_eq!(coordinator.state(), PlaybackState::Paused);
        let pauses = element.state().pause_calls;

        coordinator.pause();
        assert_eq!(coordinator.state(), PlaybackState::Paused);
        assert_eq!(element.state().pause_calls, pauses);
        assert!(!coordinator.has_progress_timer());
    }

    #[test]
    fn seek_is_ignored_when_idle() {
        let (mut coordinator, element) = local_coordinator();
        element.state().duration = Some(120.0);
        assert_eq!(coordinator.seek_to(10.0), Err(SeekRejected::NotActive));
    }

    #[test]
    fn seek_position_maps_pixels_to_time() {
        let (mut coordinator, element) = playing_locally();
        coordinator.seek_to_position(350.0).unwrap();
        assert_eq!(element.state().current_time, 60.0);
        assert_eq!(coordinator.current_time(), 60.0);
    }

    #[test]
    fn seek_blocked_during_ad_break() {
        let remote = FakeRemote::connected();
        let mut coordinator = remote_coordinator(remote.clone());
        coordinator.select_media(0).unwrap();
        let event = remote.complete_last_load();
        coordinator.on_remote_event(event);
        assert_eq!(coordinator.state(), PlaybackState::Playing);

        coordinator.on_remote_event(RemoteEvent::PlayingBreakChanged(true));
        assert_eq!(coordinator.seek_to(30.0), Err(SeekRejected::PlayingBreak));
        assert!(!coordinator.display_model().seek_enabled);
        assert!(!remote.commands().iter().any(|c| c.starts_with("seek")));

        coordinator.on_remote_event(RemoteEvent::PlayingBreakChanged(false));
        assert_eq!(coordinator.seek_to(30.0), Ok(()));
    }

    #[test]
    fn progress_tick_tolerates_unknown_duration() {
        let (mut coordinator, element) = playing_locally();
        element.state().duration = None;
        element.state().current_time = 12.0;
        coordinator.on_progress_tick();
        let display = coordinator.display_model();
        assert_eq!(display.progress_width, 0.0);
        assert!(display.ad_markers.is_empty());
        assert_eq!(display.skip_button, SkipButton::Hidden);
        assert_eq!(coordinator.state(), PlaybackState::Playing);
    }

    #[test]
    fn progress_tick_detects_end_of_media() {
        let (mut coordinator, element) = playing_locally();
        element.state().current_time = 120.0;
        coordinator.on_progress_tick();
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(!coordinator.has_progress_timer());
        assert_eq!(coordinator.display_model().play_affordance, PlayAffordance::Play);
    }

    #[test]
    fn progress_width_tracks_position() {
        let (mut coordinator, element) = playing_locally();
        element.state().current_time = 30.0;
        coordinator.on_progress_tick();
        let display = coordinator.display_model();
        assert_eq!(display.progress_width, 175.0);
        assert_eq!(display.current_time.as_deref(), Some("00:00:30"));
        assert_eq!(display.duration.as_deref(), Some("00:02:00"));
    }

    #[test]
    fn play_during_buffering_is_ignored() {
        let (mut coordinator, element) = local_coordinator();
        coordinator.select_media(0).unwrap();
        let epoch = coordinator.epoch();
        coordinator.play();
        assert_eq!(coordinator.epoch(), epoch);
        assert_eq!(element.state().load_tokens.len(), 1);
    }

    #[test]
    fn volume_slider_clamps_to_unit_range() {
        let (mut coordinator, element) = local_coordinator();
        coordinator.set_volume_from_slider(50.0);
        assert_eq!(element.state().volume, 0.5);
        coordinator.set_volume_from_slider(250.0);
        assert_eq!(element.state().volume, 1.0);
        coordinator.set_volume(-3.0);
        assert_eq!(element.state().volume, 0.0);
    }

    #[test]
    fn fullscreen_only_on_local_target() {
        let (mut coordinator, element) = local_coordinator();
        assert!(coordinator.request_fullscreen());
        assert!(element.state().fullscreen);
        assert!(!coordinator.exit_fullscreen());

        let mut remote = remote_coordinator(FakeRemote::connected());
        assert!(!remote.request_fullscreen());
        assert!(!remote.display_model().fullscreen_available);
    }

    #[test]
    fn ads_mode_attaches_catalog_breaks() {
        let remote = FakeRemote::connected();
        let catalog = Catalog::new(vec![media_item("http://media.example/a.mp4", Some(100.0))])
            .with_ads(
                vec![AdBreak {
                    id: "mid".to_string(),
                    break_clip_ids: vec!["bumper".to_string()],
                    position: BreakPosition::Offset(50.0),
                    is_embedded: false,
                    is_watched: false,
                }],
                Vec::new(),
            );
        let mut coordinator = PlaybackCoordinator::new(
            Arc::new(catalog),
            options(),
            Box::new(RemoteAdapter::new(remote.clone(), UtcOffset::UTC)),
            DisplayBus::new(),
        );
        coordinator.set_feature_mode(FeatureMode::Ads);
        coordinator.select_media(0).unwrap();
        assert_eq!(remote.loads()[0].media.breaks.len(), 1);

        let event = remote.complete_last_load();
        coordinator.on_remote_event(event);
        assert_eq!(coordinator.display_model().ad_markers, vec![350.0]);
    }

    #[test]
    fn skip_only_forwarded_once_skippable() {
        let remote = FakeRemote::connected();
        let mut coordinator = remote_coordinator(remote.clone());
        coordinator.on_remote_event(RemoteEvent::PlayingBreakChanged(true));
        coordinator.on_remote_event(RemoteEvent::WhenSkippableChanged(Some(5.0)));
        coordinator.on_remote_event(RemoteEvent::BreakClipTimeChanged(Some(2.0)));
        coordinator.skip_ad();
        assert!(remote.commands().is_empty());

        coordinator.on_remote_event(RemoteEvent::BreakClipTimeChanged(Some(6.0)));
        coordinator.skip_ad();
        assert_eq!(remote.commands(), vec!["skip_ad".to_string()]);
    }

    #[test]
    fn live_content_tracks_seekable_window() {
        let remote = FakeRemote::connected();
        let mut coordinator = remote_coordinator(remote.clone());
        coordinator.select_media(0).unwrap();
        let event = remote.complete_last_load();
        remote.update(|s| {
            let info = s.media_info.as_mut().unwrap();
            info.stream_type = StreamType::Live;
            info.live = LiveStreamMetadata {
                section_start_absolute_time: None,
                section_start_time_in_media: Some(1000.0),
                section_duration: Some(120.0),
            };
            s.current_time = 1080.0;
            s.can_seek = true;
        });
        coordinator.on_remote_event(event);
        assert!(coordinator.session().is_live_content);
        assert_eq!(coordinator.seek_to(10.0), Err(SeekRejected::NoSeekableRange));

        coordinator.on_remote_event(RemoteEvent::LiveSeekableRangeChanged(Some(SeekableRange {
            start: 1000.0,
            end: 1090.0,
        })));
        coordinator.on_progress_tick();
        let display = coordinator.display_model();
        assert_eq!(display.live_indicator, LiveIndicator::Active);
        assert_eq!(
            display.live_timeline.unwrap().seekable_width,
            (1090.0 - 1000.0) / 120.0 * 700.0
        );

        coordinator.seek_to(10.0).unwrap();
        assert_eq!(remote.commands().last().map(String::as_str), Some("seek:1010"));
    }

    #[test]
    fn remote_pause_change_drives_state() {
        let remote = FakeRemote::connected();
        let mut coordinator = remote_coordinator(remote.clone());
        coordinator.select_media(0).unwrap();
        let event = remote.complete_last_load();
        coordinator.on_remote_event(event);

        remote.update(|s| {
            s.is_paused = true;
            s.player_state = RemotePlayerState::Paused;
            s.current_time = 33.0;
        });
        coordinator.on_remote_event(RemoteEvent::PausedChanged(true));
        assert_eq!(coordinator.state(), PlaybackState::Paused);
        assert_eq!(coordinator.current_time(), 33.0);
        assert!(!coordinator.has_progress_timer());

        coordinator.on_remote_event(RemoteEvent::MediaInfoChanged(None));
        assert_eq!(coordinator.state(), PlaybackState::Idle);
    }

    #[test]
    fn display_is_published_on_change() {
        let element = FakeElement::new();
        let bus = DisplayBus::new();
        let updates = bus.subscribe();
        let mut coordinator = PlaybackCoordinator::new(
            catalog(),
            options(),
            Box::new(LocalAdapter::new(Box::new(element))),
            bus,
        );
        coordinator.select_media(1).unwrap();
        let last = updates.try_iter().last().unwrap();
        assert_eq!(last.state, PlaybackState::Buffering);
        assert_eq!(last.media_index, 1);
        assert_eq!(last.title, "b.mp4");
    }
}
