//! Read-only media and ad-break catalog.

use cast_player_types::{AdBreak, BreakClip, LiveStreamMetadata, MediaItem};

/// Live stream substituted for catalog content when live mode is on.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveStream {
    pub item: MediaItem,
    pub metadata: LiveStreamMetadata,
}

/// Static configuration data consumed by the coordinator.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<MediaItem>,
    breaks: Vec<AdBreak>,
    clips: Vec<BreakClip>,
    live: Option<LiveStream>,
}

impl Catalog {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn with_ads(mut self, breaks: Vec<AdBreak>, clips: Vec<BreakClip>) -> Self {
        self.breaks = breaks;
        self.clips = clips;
        self
    }

    pub fn with_live(mut self, live: LiveStream) -> Self {
        self.live = Some(live);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Find the catalog index for a content URL reported by a backend.
    pub fn index_of_url(&self, url: &str) -> Option<usize> {
        self.items.iter().position(|item| item.content_url == url)
    }

    pub fn breaks(&self) -> &[AdBreak] {
        &self.breaks
    }

    pub fn clips(&self) -> &[BreakClip] {
        &self.clips
    }

    pub fn live(&self) -> Option<&LiveStream> {
        self.live.as_ref()
    }
}
