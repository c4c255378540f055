use serde::{Deserialize, Serialize};

/// Playback state owned by the coordinator.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing loaded, or playback ended/failed.
    #[default]
    Idle,
    /// A load request is in flight.
    Buffering,
    /// Media is ready but has not started yet.
    Loaded,
    /// Media is playing.
    Playing,
    /// Media is paused.
    Paused,
}

impl PlaybackState {
    /// `true` for states where a media session exists on the active target.
    pub fn has_media(self) -> bool {
        matches!(self, Self::Loaded | Self::Playing | Self::Paused)
    }
}

/// Which backend currently receives playback commands.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackTarget {
    #[default]
    Local,
    Remote,
}

/// Optional metadata attached to load requests. Ads and live are exclusive.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    #[default]
    None,
    Ads,
    Live,
}

impl std::str::FromStr for FeatureMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "ads" => Ok(Self::Ads),
            "live" => Ok(Self::Live),
            other => Err(format!("unknown feature mode: {other}")),
        }
    }
}

/// Immutable catalog record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub content_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Nominal duration in seconds, when the catalog knows it.
    #[serde(default)]
    pub duration: Option<f64>,
}

fn default_content_type() -> String {
    "video/mp4".to_string()
}

/// One piece of ad content playable at a break.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct BreakClip {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Seconds into the clip after which it may be skipped. Negative or absent
    /// means the clip is never skippable.
    #[serde(default)]
    pub when_skippable: Option<f64>,
}

/// Where a break sits on the content timeline.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawBreakPosition", into = "f64")]
pub enum BreakPosition {
    /// Seconds from the start of content.
    Offset(f64),
    /// Plays after the content ends.
    PostRoll,
}

/// Receiver-side sentinel for a post-roll break.
pub const POST_ROLL_POSITION: f64 = -1.0;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBreakPosition {
    Seconds(f64),
    Label(String),
}

impl TryFrom<RawBreakPosition> for BreakPosition {
    type Error = String;

    fn try_from(raw: RawBreakPosition) -> Result<Self, Self::Error> {
        match raw {
            RawBreakPosition::Seconds(secs) if secs == POST_ROLL_POSITION => Ok(Self::PostRoll),
            RawBreakPosition::Seconds(secs) if secs.is_finite() && secs >= 0.0 => {
                Ok(Self::Offset(secs))
            }
            RawBreakPosition::Seconds(secs) => Err(format!("invalid break position: {secs}")),
            RawBreakPosition::Label(label) => match label.as_str() {
                "end" | "post_roll" | "postroll" => Ok(Self::PostRoll),
                other => Err(format!("invalid break position: {other}")),
            },
        }
    }
}

impl From<BreakPosition> for f64 {
    fn from(position: BreakPosition) -> Self {
        match position {
            BreakPosition::Offset(secs) => secs,
            BreakPosition::PostRoll => POST_ROLL_POSITION,
        }
    }
}

/// An ad insertion point on the content timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AdBreak {
    pub id: String,
    pub break_clip_ids: Vec<String>,
    pub position: BreakPosition,
    /// Server-embedded breaks are part of the content stream itself.
    #[serde(default)]
    pub is_embedded: bool,
    #[serde(default)]
    pub is_watched: bool,
}

/// Section metadata for a live stream.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LiveStreamMetadata {
    /// Wall-clock (unix seconds) at the start of the current section.
    pub section_start_absolute_time: Option<f64>,
    /// Media time at the start of the current section.
    pub section_start_time_in_media: Option<f64>,
    /// Length of the current section in seconds.
    pub section_duration: Option<f64>,
}

/// Backend-reported seekable window of a live stream, in media time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeekableRange {
    pub start: f64,
    pub end: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamType {
    #[default]
    Buffered,
    Live,
}

/// Play/pause affordance shown by the view.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayAffordance {
    #[default]
    Play,
    Pause,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LiveIndicator {
    #[default]
    Hidden,
    Active,
    Inactive,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipButton {
    #[default]
    Hidden,
    /// Whole seconds until the clip becomes skippable.
    Countdown { seconds: u32 },
    Visible,
}

/// Seekable window and unseekable overlay widths on the timeline.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LiveTimeline {
    pub seekable_width: f64,
    pub unseekable_width: f64,
}

/// Render-ready snapshot published by the coordinator after every change.
///
/// `None` labels mean the element is hidden.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DisplayModel {
    pub target: PlaybackTarget,
    pub state: PlaybackState,
    pub media_index: usize,
    pub title: String,
    pub subtitle: String,
    pub play_affordance: PlayAffordance,
    pub current_time: Option<String>,
    pub duration: Option<String>,
    pub progress_width: f64,
    pub ad_markers: Vec<f64>,
    pub live_indicator: LiveIndicator,
    pub live_timeline: Option<LiveTimeline>,
    pub skip_button: SkipButton,
    pub seek_enabled: bool,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen_available: bool,
    pub fullscreen: bool,
    pub receiver_name: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        breaks: Vec<AdBreak>,
    }

    #[test]
    fn break_position_accepts_sentinels() {
        let raw = r#"
            [[breaks]]
            id = "pre"
            break_clip_ids = ["a"]
            position = 0

            [[breaks]]
            id = "post"
            break_clip_ids = ["a"]
            position = -1

            [[breaks]]
            id = "post-label"
            break_clip_ids = ["a"]
            position = "end"
            is_embedded = true
        "#;
        let parsed: Wrapper = toml::from_str(raw).unwrap();
        assert_eq!(parsed.breaks[0].position, BreakPosition::Offset(0.0));
        assert_eq!(parsed.breaks[1].position, BreakPosition::PostRoll);
        assert_eq!(parsed.breaks[2].position, BreakPosition::PostRoll);
        assert!(parsed.breaks[2].is_embedded);
    }

    #[test]
    fn break_position_rejects_other_negatives() {
        let raw = r#"
            [[breaks]]
            id = "bad"
            break_clip_ids = []
            position = -5
        "#;
        assert!(toml::from_str::<Wrapper>(raw).is_err());
    }

    #[test]
    fn post_roll_serializes_to_receiver_sentinel() {
        let value = serde_json::to_value(BreakPosition::PostRoll).unwrap();
        assert_eq!(value, serde_json::json!(-1.0));
    }

    #[test]
    fn feature_mode_parses_case_insensitively() {
        assert_eq!("ADS".parse::<FeatureMode>(), Ok(FeatureMode::Ads));
        assert_eq!("live".parse::<FeatureMode>(), Ok(FeatureMode::Live));
        assert!("both".parse::<FeatureMode>().is_err());
    }
}
