//! Ad-break markers and skip-button state.

use cast_player_types::{AdBreak, BreakPosition, SkipButton};

/// Break playback state reported by the receiver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdPlayback {
    pub playing_break: bool,
    pub when_skippable: Option<f64>,
    pub break_clip_time: Option<f64>,
    pub break_clip_id: Option<String>,
}

impl AdPlayback {
    pub fn skip_button(&self) -> SkipButton {
        skip_button(self.playing_break, self.when_skippable, self.break_clip_time)
    }

    /// Seeking is disabled for the whole duration of a break.
    pub fn blocks_seeking(&self) -> bool {
        self.playing_break
    }
}

/// Horizontal marker offsets for `breaks` on a timeline `width` pixels wide.
///
/// Unknown duration hides every marker. Embedded breaks past the end of
/// content never play and are dropped; stitched ones are pinned to the end.
pub fn marker_offsets(breaks: &[AdBreak], duration: Option<f64>, width: f64) -> Vec<f64> {
    let Some(duration) = duration else {
        return Vec::new();
    };
    breaks
        .iter()
        .filter_map(|ad_break| match ad_break.position {
            BreakPosition::PostRoll => Some(width),
            BreakPosition::Offset(position) if position > duration && ad_break.is_embedded => {
                None
            }
            BreakPosition::Offset(_) if duration <= 0.0 => Some(width),
            BreakPosition::Offset(position) => Some((position / duration).min(1.0) * width),
        })
        .collect()
}

/// Skip-button state for the current break clip.
pub fn skip_button(
    playing_break: bool,
    when_skippable: Option<f64>,
    break_clip_time: Option<f64>,
) -> SkipButton {
    if !playing_break {
        return SkipButton::Hidden;
    }
    let Some(threshold) = when_skippable.filter(|t| t.is_finite() && *t >= 0.0) else {
        return SkipButton::Hidden;
    };
    let elapsed = break_clip_time.unwrap_or(0.0);
    if elapsed >= threshold {
        SkipButton::Visible
    } else {
        SkipButton::Countdown {
            seconds: (threshold - elapsed).ceil() as u32,
        }
    }
}
