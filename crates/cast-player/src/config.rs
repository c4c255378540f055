//! Configuration loading and parsing.
//!
//! Defines the player config schema, validates it, and resolves defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cast_player_types::{AdBreak, BreakClip, FeatureMode, LiveStreamMetadata, MediaItem};
use serde::Deserialize;
use time::UtcOffset;

use crate::catalog::{Catalog, LiveStream};

const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1000;
const DEFAULT_TIMELINE_WIDTH: f64 = 700.0;
const DEFAULT_VOLUME_SLIDER_HEIGHT: f64 = 100.0;
const DEFAULT_LIVE_EDGE_TOLERANCE_SECS: f64 = 30.0;

/// Top-level player configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerConfig {
    /// Transport and timeline settings.
    #[serde(default)]
    pub player: PlayerSettings,
    /// Media catalog, in display order.
    #[serde(default)]
    pub media: Vec<MediaItem>,
    /// Ad content referenced by breaks.
    #[serde(default)]
    pub break_clips: Vec<BreakClip>,
    /// Ad insertion points attached to loads in ads mode.
    #[serde(default)]
    pub breaks: Vec<AdBreak>,
    /// Live stream loaded in live mode.
    pub live: Option<LiveStreamConfig>,
}

/// `[player]` table; every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerSettings {
    /// Progress tick interval in milliseconds (default: 1000).
    pub progress_interval_ms: Option<u64>,
    /// Timeline width in pixels (default: 700).
    pub timeline_width: Option<f64>,
    /// Volume slider height in pixels (default: 100).
    pub volume_slider_height: Option<f64>,
    /// Distance from the live edge still shown as "live" (default: 30s).
    pub live_edge_tolerance_secs: Option<f64>,
    /// Offset applied to wall-clock labels, in minutes east of UTC.
    pub clock_utc_offset_minutes: Option<i32>,
    /// Attach ad breaks to remote loads.
    pub ads_enabled: Option<bool>,
    /// Load the live stream on the remote receiver.
    pub live_enabled: Option<bool>,
}

/// `[live]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveStreamConfig {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub content_url: String,
    pub content_type: Option<String>,
    pub thumbnail: Option<String>,
    pub section_start_absolute_time: Option<f64>,
    pub section_start_time_in_media: Option<f64>,
    pub section_duration: Option<f64>,
}

/// Resolved runtime options with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    pub progress_interval: Duration,
    pub timeline_width: f64,
    pub volume_slider_height: f64,
    pub live_edge_tolerance: f64,
    pub clock_offset: UtcOffset,
    pub feature_mode: FeatureMode,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
            timeline_width: DEFAULT_TIMELINE_WIDTH,
            volume_slider_height: DEFAULT_VOLUME_SLIDER_HEIGHT,
            live_edge_tolerance: DEFAULT_LIVE_EDGE_TOLERANCE_SECS,
            clock_offset: UtcOffset::UTC,
            feature_mode: FeatureMode::None,
        }
    }
}

impl PlayerConfig {
    /// Load and validate configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = Self::parse(&raw).with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(raw: &str) -> Result<Self> {
        let cfg = toml::from_str::<PlayerConfig>(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.media.is_empty() {
            bail!("at least one [[media]] entry is required");
        }
        for (index, item) in self.media.iter().enumerate() {
            if item.content_url.trim().is_empty() {
                bail!("media entry {index} ({}) has an empty content_url", item.title);
            }
        }
        for ad_break in &self.breaks {
            for clip_id in &ad_break.break_clip_ids {
                if !self.break_clips.iter().any(|clip| &clip.id == clip_id) {
                    bail!("break {} references unknown clip {clip_id}", ad_break.id);
                }
            }
        }
        self.feature_mode()?;
        if self.player.progress_interval_ms == Some(0) {
            bail!("progress_interval_ms must be positive");
        }
        for (key, value) in [
            ("timeline_width", self.player.timeline_width),
            ("volume_slider_height", self.player.volume_slider_height),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    bail!("{key} must be a positive number");
                }
            }
        }
        if let Some(tolerance) = self.player.live_edge_tolerance_secs {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                bail!("live_edge_tolerance_secs must be a non-negative number");
            }
        }
        Ok(())
    }

    /// Feature mode selected by the mutually exclusive flags.
    pub fn feature_mode(&self) -> Result<FeatureMode> {
        let ads = self.player.ads_enabled.unwrap_or(false);
        let live = self.player.live_enabled.unwrap_or(false);
        match (ads, live) {
            (true, true) => bail!("ads_enabled and live_enabled are mutually exclusive"),
            (true, false) => Ok(FeatureMode::Ads),
            (false, true) => {
                if self.live.is_none() {
                    bail!("live_enabled requires a [live] section");
                }
                Ok(FeatureMode::Live)
            }
            (false, false) => Ok(FeatureMode::None),
        }
    }

    /// Resolve runtime options, applying defaults.
    pub fn options(&self) -> Result<PlayerOptions> {
        let settings = &self.player;
        let offset_minutes = settings.clock_utc_offset_minutes.unwrap_or(0);
        let clock_offset = UtcOffset::from_whole_seconds(offset_minutes.saturating_mul(60))
            .with_context(|| format!("clock_utc_offset_minutes {offset_minutes} out of range"))?;
        Ok(PlayerOptions {
            progress_interval: Duration::from_millis(
                settings
                    .progress_interval_ms
                    .unwrap_or(DEFAULT_PROGRESS_INTERVAL_MS),
            ),
            timeline_width: settings.timeline_width.unwrap_or(DEFAULT_TIMELINE_WIDTH),
            volume_slider_height: settings
                .volume_slider_height
                .unwrap_or(DEFAULT_VOLUME_SLIDER_HEIGHT),
            live_edge_tolerance: settings
                .live_edge_tolerance_secs
                .unwrap_or(DEFAULT_LIVE_EDGE_TOLERANCE_SECS),
            clock_offset,
            feature_mode: self.feature_mode()?,
        })
    }

    /// Build the read-only catalog from the configured entries.
    pub fn catalog(&self) -> Catalog {
        let catalog = Catalog::new(self.media.clone())
            .with_ads(self.breaks.clone(), self.break_clips.clone());
        match self.live.as_ref() {
            Some(live) => catalog.with_live(live_stream_from_config(live)),
            None => catalog,
        }
    }
}

fn live_stream_from_config(cfg: &LiveStreamConfig) -> LiveStream {
    LiveStream {
        item: MediaItem {
            title: cfg.title.clone(),
            subtitle: cfg.subtitle.clone(),
            content_url: cfg.content_url.clone(),
            content_type: cfg
                .content_type
                .clone()
                .unwrap_or_else(|| "application/x-mpegurl".to_string()),
            thumbnail: cfg.thumbnail.clone(),
            duration: None,
        },
        metadata: LiveStreamMetadata {
            section_start_absolute_time: cfg.section_start_absolute_time,
            section_start_time_in_media: cfg.section_start_time_in_media,
            section_duration: cfg.section_duration,
        },
    }
}
