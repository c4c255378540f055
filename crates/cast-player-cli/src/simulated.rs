//! Wall-clock simulations of the local element and a remote receiver.
//!
//! Both report completions through the same event channels a real
//! integration would use, so the runtime cannot tell them apart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use cast_player::{
    CastErrorCode, Catalog, LoadRequest, LocalMediaEvent, MediaElement, RemoteError, RemoteEvent,
    RemoteMediaInfo, RemotePlayerSnapshot, RemotePlayerState, RemoteService, SessionState,
};
use cast_player_types::{BreakPosition, SeekableRange, StreamType};
use crossbeam_channel::Sender;

const RECEIVER_TICK: Duration = Duration::from_millis(250);
const LIVE_RANGE_EVERY: u32 = 4;
/// Width of the simulated live DVR window, in seconds.
const LIVE_WINDOW_SECS: f64 = 90.0;
const DEFAULT_CLIP_SECS: f64 = 10.0;

/// Position that advances with wall time while running.
#[derive(Debug, Clone, Copy, Default)]
struct WallClock {
    position: f64,
    running_since: Option<Instant>,
}

impl WallClock {
    fn at(position: f64) -> Self {
        Self {
            position,
            running_since: None,
        }
    }

    fn now(&self) -> f64 {
        match self.running_since {
            Some(since) => self.position + since.elapsed().as_secs_f64(),
            None => self.position,
        }
    }

    fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.position = self.now();
        self.running_since = None;
    }

    fn set(&mut self, position: f64) {
        self.position = position;
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct ElementState {
    source: Option<String>,
    duration: Option<f64>,
    clock: WallClock,
    volume: f64,
    muted: bool,
    fullscreen: bool,
}

/// In-process stand-in for an on-page video element.
pub struct SimulatedElement {
    durations: HashMap<String, f64>,
    state: Mutex<ElementState>,
    events: Sender<LocalMediaEvent>,
}

impl SimulatedElement {
    pub fn new(catalog: &Catalog, events: Sender<LocalMediaEvent>) -> Self {
        let durations = catalog
            .items()
            .iter()
            .filter_map(|item| Some((item.content_url.clone(), item.duration?)))
            .collect();
        Self {
            durations,
            state: Mutex::new(ElementState {
                volume: 1.0,
                ..ElementState::default()
            }),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, ElementState> {
        lock(&self.state)
    }
}

impl MediaElement for SimulatedElement {
    fn source(&self) -> Option<String> {
        self.state().source.clone()
    }

    fn load_source(&mut self, url: &str, token: u64) {
        let mut state = self.state();
        state.source = Some(url.to_string());
        state.duration = self.durations.get(url).copied();
        state.clock = WallClock::default();
        drop(state);

        let event = if url.starts_with("http://") || url.starts_with("https://") {
            LocalMediaEvent::Loaded { token }
        } else {
            LocalMediaEvent::Failed {
                token,
                message: format!("unsupported source {url}"),
            }
        };
        if self.events.send(event).is_err() {
            tracing::warn!("element: event channel closed");
        }
    }

    fn play(&mut self) {
        self.state().clock.start();
    }

    fn pause(&mut self) {
        self.state().clock.stop();
    }

    fn is_paused(&self) -> bool {
        self.state().clock.running_since.is_none()
    }

    fn current_time(&self) -> f64 {
        let state = self.state();
        let now = state.clock.now();
        match state.duration {
            Some(duration) => now.min(duration),
            None => now,
        }
    }

    fn set_current_time(&mut self, time: f64) {
        self.state().clock.set(time.max(0.0));
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

#[derive(Debug, Clone)]
struct ActiveBreak {
    clip_id: String,
    clock: WallClock,
    duration: f64,
    when_skippable: Option<f64>,
}

#[derive(Debug)]
struct ReceiverState {
    connected: bool,
    session: SessionState,
    media: Option<RemoteMediaInfo>,
    player_state: RemotePlayerState,
    clock: WallClock,
    volume: f64,
    muted: bool,
    active_break: Option<ActiveBreak>,
    live_since: Option<Instant>,
}

impl ReceiverState {
    fn is_live(&self) -> bool {
        self.media.as_ref().is_some_and(RemoteMediaInfo::is_live)
    }

    fn section_start(&self) -> f64 {
        self.media
            .as_ref()
            .and_then(|info| info.live.section_start_time_in_media)
            .unwrap_or(0.0)
    }

    fn live_range(&self) -> Option<SeekableRange> {
        let since = self.live_since?;
        let section_start = self.section_start();
        let end = section_start + LIVE_WINDOW_SECS + since.elapsed().as_secs_f64();
        Some(SeekableRange {
            start: (end - LIVE_WINDOW_SECS).max(section_start),
            end,
        })
    }

    fn position(&self) -> f64 {
        let now = self.clock.now();
        if let Some(range) = self.live_range() {
            return now.min(range.end);
        }
        match self.media.as_ref().and_then(|info| info.duration) {
            Some(duration) => now.min(duration),
            None => now,
        }
    }

    fn is_paused(&self) -> bool {
        self.player_state == RemotePlayerState::Paused
    }
}

/// Receiver reachable through [`RemoteService`], advancing on wall time.
pub struct SimulatedReceiver {
    name: String,
    state: Mutex<ReceiverState>,
    events: Sender<RemoteEvent>,
}

impl SimulatedReceiver {
    /// Create the receiver and its background clock thread. The thread exits
    /// once the receiver is dropped.
    pub fn start(name: String, events: Sender<RemoteEvent>) -> Arc<Self> {
        let receiver = Arc::new(Self {
            name,
            state: Mutex::new(ReceiverState {
                connected: false,
                session: SessionState::NoSession,
                media: None,
                player_state: RemotePlayerState::Idle,
                clock: WallClock::default(),
                volume: 1.0,
                muted: false,
                active_break: None,
                live_since: None,
            }),
            events,
        });
        let weak = Arc::downgrade(&receiver);
        std::thread::spawn(move || receiver_clock(weak));
        receiver
    }

    fn state(&self) -> MutexGuard<'_, ReceiverState> {
        lock(&self.state)
    }

    fn emit(&self, event: RemoteEvent) -> bool {
        if self.events.send(event).is_err() {
            tracing::debug!(receiver = %self.name, "receiver: event channel closed");
            return false;
        }
        true
    }

    fn connected_state(&self) -> Result<MutexGuard<'_, ReceiverState>, RemoteError> {
        let state = self.state();
        if state.connected {
            Ok(state)
        } else {
            Err(RemoteError::NotConnected)
        }
    }

    fn media_state(&self) -> Result<MutexGuard<'_, ReceiverState>, RemoteError> {
        let state = self.connected_state()?;
        if state.media.is_some() {
            Ok(state)
        } else {
            Err(RemoteError::NoMediaSession)
        }
    }

    /// Advance break and live-window state; returns `false` once the event
    /// channel is gone.
    fn tick(&self, tick: u32) -> bool {
        let mut events = Vec::new();
        {
            let mut state = self.state();
            if let Some(active) = state.active_break.clone() {
                let elapsed = active.clock.now();
                if elapsed >= active.duration {
                    end_break(&mut state, &mut events);
                } else {
                    events.push(RemoteEvent::BreakClipTimeChanged(Some(elapsed)));
                }
            } else if state.player_state == RemotePlayerState::Playing
                && !state.is_live()
                && let Some(duration) = state.media.as_ref().and_then(|info| info.duration)
                && state.clock.now() >= duration
            {
                tracing::info!(receiver = %self.name, "receiver: media finished");
                state.media = None;
                state.player_state = RemotePlayerState::Idle;
                state.clock = WallClock::at(duration);
                events.push(RemoteEvent::MediaInfoChanged(None));
            }
            if tick % LIVE_RANGE_EVERY == 0
                && let Some(range) = state.live_range()
            {
                events.push(RemoteEvent::LiveSeekableRangeChanged(Some(range)));
            }
        }
        events.into_iter().all(|event| self.emit(event))
    }
}

fn receiver_clock(receiver: Weak<SimulatedReceiver>) {
    let mut tick: u32 = 0;
    loop {
        std::thread::sleep(RECEIVER_TICK);
        let Some(receiver) = receiver.upgrade() else {
            break;
        };
        tick = tick.wrapping_add(1);
        if !receiver.tick(tick) {
            break;
        }
    }
}

fn end_break(state: &mut ReceiverState, events: &mut Vec<RemoteEvent>) {
    let Some(active) = state.active_break.take() else {
        return;
    };
    tracing::info!(clip = %active.clip_id, "receiver: break finished");
    if let Some(media) = state.media.as_mut() {
        for ad_break in media.breaks.iter_mut() {
            if ad_break.break_clip_ids.contains(&active.clip_id) {
                ad_break.is_watched = true;
            }
        }
    }
    if state.player_state == RemotePlayerState::Playing {
        state.clock.start();
    }
    events.push(RemoteEvent::PlayingBreakChanged(false));
    events.push(RemoteEvent::BreakClipTimeChanged(None));
    events.push(RemoteEvent::BreakClipIdChanged(None));
    events.push(RemoteEvent::WhenSkippableChanged(None));
}

/// First unwatched pre-roll clip of `info`, if any.
fn pre_roll(info: &RemoteMediaInfo) -> Option<ActiveBreak> {
    let ad_break = info.breaks.iter().find(|ad_break| {
        !ad_break.is_watched && matches!(ad_break.position, BreakPosition::Offset(p) if p <= 0.0)
    })?;
    let clip_id = ad_break.break_clip_ids.first()?;
    let clip = info.break_clips.iter().find(|clip| &clip.id == clip_id);
    Some(ActiveBreak {
        clip_id: clip_id.clone(),
        clock: WallClock::default(),
        duration: clip.and_then(|clip| clip.duration).unwrap_or(DEFAULT_CLIP_SECS),
        when_skippable: clip.and_then(|clip| clip.when_skippable),
    })
}

fn media_info_from_request(request: &LoadRequest) -> RemoteMediaInfo {
    let media = &request.media;
    RemoteMediaInfo {
        content_id: media.content_id.clone(),
        content_type: media.content_type.clone(),
        stream_type: media.stream_type,
        title: media.metadata.title.clone(),
        subtitle: media.metadata.subtitle.clone(),
        duration: media.duration,
        live: cast_player_types::LiveStreamMetadata {
            section_start_absolute_time: media.metadata.section_start_absolute_time,
            section_start_time_in_media: media.metadata.section_start_time_in_media,
            section_duration: media.metadata.section_duration,
        },
        breaks: media.breaks.clone(),
        break_clips: media.break_clips.clone(),
    }
}

impl RemoteService for SimulatedReceiver {
    fn request_session(&self) -> Result<(), RemoteError> {
        {
            let mut state = self.state();
            if state.connected {
                return Ok(());
            }
            state.connected = true;
            state.session = if state.media.is_some() {
                SessionState::Resumed
            } else {
                SessionState::Started
            };
            tracing::info!(receiver = %self.name, session = ?state.session, "receiver: session up");
        }
        self.emit(RemoteEvent::ConnectionChanged { connected: true });
        Ok(())
    }

    fn end_session(&self, stop_media: bool) {
        {
            let mut state = self.state();
            if !state.connected {
                return;
            }
            state.connected = false;
            state.session = SessionState::Ended;
            let position = state.position();
            state.clock = WallClock::at(position);
            if stop_media {
                state.media = None;
                state.player_state = RemotePlayerState::Idle;
                state.active_break = None;
                state.live_since = None;
            } else if state.player_state == RemotePlayerState::Playing {
                state.clock.start();
            }
            tracing::info!(receiver = %self.name, stop_media, "receiver: session ended");
        }
        self.emit(RemoteEvent::ConnectionChanged { connected: false });
    }

    fn session_state(&self) -> SessionState {
        self.state().session
    }

    fn snapshot(&self) -> RemotePlayerSnapshot {
        let state = self.state();
        let active_break = state.active_break.as_ref();
        RemotePlayerSnapshot {
            is_connected: state.connected,
            receiver_name: Some(self.name.clone()),
            player_state: state.player_state,
            media_info: state.media.clone(),
            current_time: state.position(),
            duration: state.media.as_ref().and_then(|info| info.duration),
            can_seek: state.media.is_some() && active_break.is_none(),
            is_paused: state.is_paused(),
            is_muted: state.muted,
            volume_level: state.volume,
            is_playing_break: active_break.is_some(),
            when_skippable: active_break.and_then(|active| active.when_skippable),
            current_break_clip_time: active_break.map(|active| active.clock.now()),
            break_clip_id: active_break.map(|active| active.clip_id.clone()),
            live_seekable_range: state.live_range(),
        }
    }

    fn load_media(&self, request: LoadRequest) -> Result<(), RemoteError> {
        let mut state = self.connected_state()?;
        let content_id = &request.media.content_id;
        if !(content_id.starts_with("http://") || content_id.starts_with("https://")) {
            drop(state);
            tracing::warn!(%content_id, "receiver: rejecting unsupported content");
            self.emit(RemoteEvent::LoadFinished {
                request_id: request.request_id,
                result: Err(CastErrorCode::InvalidParameter),
            });
            return Ok(());
        }

        let info = media_info_from_request(&request);
        let live = info.stream_type == StreamType::Live;
        state.media = Some(info.clone());
        state.live_since = live.then(Instant::now);
        state.active_break = pre_roll(&info);
        let start = if live {
            let edge = state.live_range().map(|range| range.end).unwrap_or(0.0);
            if request.current_time > 0.0 {
                (state.section_start() + request.current_time).min(edge)
            } else {
                edge
            }
        } else {
            request.current_time
        };
        state.clock = WallClock::at(start);
        state.player_state = if request.autoplay {
            RemotePlayerState::Playing
        } else {
            RemotePlayerState::Paused
        };
        if request.autoplay {
            match state.active_break.as_mut() {
                Some(active) => active.clock.start(),
                None => state.clock.start(),
            }
        }
        let active_break = state.active_break.clone();
        let paused = state.is_paused();
        let range = state.live_range();
        drop(state);

        tracing::info!(
            receiver = %self.name,
            content_id = %info.content_id,
            start,
            autoplay = request.autoplay,
            "receiver: media loaded"
        );
        self.emit(RemoteEvent::LoadFinished {
            request_id: request.request_id,
            result: Ok(()),
        });
        self.emit(RemoteEvent::MediaInfoChanged(Some(info)));
        self.emit(RemoteEvent::CanSeekChanged(active_break.is_none()));
        self.emit(RemoteEvent::PausedChanged(paused));
        if let Some(active) = active_break {
            self.emit(RemoteEvent::PlayingBreakChanged(true));
            self.emit(RemoteEvent::BreakClipIdChanged(Some(active.clip_id)));
            self.emit(RemoteEvent::WhenSkippableChanged(active.when_skippable));
            self.emit(RemoteEvent::BreakClipTimeChanged(Some(0.0)));
        }
        if range.is_some() {
            self.emit(RemoteEvent::LiveSeekableRangeChanged(range));
        }
        Ok(())
    }

    fn play(&self) -> Result<(), RemoteError> {
        {
            let mut state = self.media_state()?;
            state.player_state = RemotePlayerState::Playing;
            match state.active_break.as_mut() {
                Some(active) => active.clock.start(),
                None => state.clock.start(),
            }
        }
        self.emit(RemoteEvent::PausedChanged(false));
        Ok(())
    }

    fn pause(&self) -> Result<(), RemoteError> {
        {
            let mut state = self.media_state()?;
            state.player_state = RemotePlayerState::Paused;
            state.clock.stop();
            if let Some(active) = state.active_break.as_mut() {
                active.clock.stop();
            }
        }
        self.emit(RemoteEvent::PausedChanged(true));
        Ok(())
    }

    fn stop(&self) -> Result<(), RemoteError> {
        {
            let mut state = self.media_state()?;
            state.media = None;
            state.player_state = RemotePlayerState::Idle;
            state.clock = WallClock::default();
            state.active_break = None;
            state.live_since = None;
        }
        self.emit(RemoteEvent::MediaInfoChanged(None));
        Ok(())
    }

    fn seek(&self, media_time: f64) -> Result<(), RemoteError> {
        let mut state = self.media_state()?;
        if state.active_break.is_some() {
            return Err(RemoteError::Rejected(CastErrorCode::InvalidParameter));
        }
        let target = match state.live_range() {
            Some(range) => media_time.clamp(range.start, range.end),
            None => media_time.max(0.0),
        };
        state.clock.set(target);
        tracing::debug!(target, "receiver: seek");
        Ok(())
    }

    fn set_volume(&self, level: f64) -> Result<(), RemoteError> {
        self.connected_state()?.volume = level;
        self.emit(RemoteEvent::VolumeChanged(level));
        Ok(())
    }

    fn set_muted(&self, muted: bool) -> Result<(), RemoteError> {
        self.connected_state()?.muted = muted;
        self.emit(RemoteEvent::MutedChanged(muted));
        Ok(())
    }

    fn skip_ad(&self) -> Result<(), RemoteError> {
        let mut events = Vec::new();
        {
            let mut state = self.media_state()?;
            let skippable = state.active_break.as_ref().is_some_and(|active| {
                active
                    .when_skippable
                    .is_some_and(|when| active.clock.now() >= when)
            });
            if !skippable {
                return Err(RemoteError::Rejected(CastErrorCode::InvalidParameter));
            }
            end_break(&mut state, &mut events);
        }
        for event in events {
            self.emit(event);
        }
        Ok(())
    }
}
