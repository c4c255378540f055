//! Seekable-window tracking for live content.

use cast_player_types::{LiveIndicator, LiveTimeline, SeekableRange};

/// Last seekable range reported by the receiver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveRangeTracker {
    range: Option<SeekableRange>,
    edge_tolerance: f64,
}

impl LiveRangeTracker {
    pub fn new(edge_tolerance: f64) -> Self {
        Self {
            range: None,
            edge_tolerance,
        }
    }

    pub fn update(&mut self, range: Option<SeekableRange>) {
        self.range = range.filter(|r| r.start.is_finite() && r.end.is_finite());
    }

    pub fn clear(&mut self) {
        self.range = None;
    }

    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }

    /// Whether an absolute media position is close enough to the live edge.
    pub fn is_at_live_edge(&self, absolute_position: f64) -> bool {
        self.range
            .is_some_and(|range| range.end - absolute_position <= self.edge_tolerance)
    }

    pub fn indicator(&self, absolute_position: f64) -> LiveIndicator {
        if self.is_at_live_edge(absolute_position) {
            LiveIndicator::Active
        } else {
            LiveIndicator::Inactive
        }
    }

    /// Seekable window and unseekable overlay widths.
    ///
    /// Without a range, or without a usable duration, the whole timeline is
    /// unseekable.
    pub fn timeline(&self, duration: Option<f64>, section_start: f64, width: f64) -> LiveTimeline {
        let fully_unseekable = LiveTimeline {
            seekable_width: 0.0,
            unseekable_width: width,
        };
        let (Some(range), Some(duration)) = (self.range, duration) else {
            return fully_unseekable;
        };
        if duration <= 0.0 {
            return fully_unseekable;
        }
        let scale = |position: f64| {
            let relative = position.max(section_start) - section_start;
            (relative / duration * width).clamp(0.0, width)
        };
        LiveTimeline {
            seekable_width: scale(range.end),
            unseekable_width: scale(range.start),
        }
    }
}
