//! Dual-target playback core.
//!
//! A [`PlaybackCoordinator`] drives either a local media element or a remote
//! receiver session through one [`PlaybackAdapter`] interface, while the
//! [`SessionSwitchController`] hands playback between the two as the remote
//! connection comes and goes.

pub mod ad_breaks;
pub mod adapter;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod live_range;
pub mod local_adapter;
pub mod progress_timer;
pub mod remote_adapter;
pub mod remote_service;
pub mod runtime;
pub mod session_switch;
pub mod time_format;

#[cfg(test)]
mod test_support;

pub use adapter::{LoadContext, LoadExtras, PlaybackAdapter};
pub use catalog::{Catalog, LiveStream};
pub use config::{PlayerConfig, PlayerOptions};
pub use coordinator::{PlaybackCoordinator, PlaybackSession};
pub use display::DisplayBus;
pub use error::{CastErrorCode, CoordinatorError, LoadError, RemoteError, SeekRejected};
pub use local_adapter::{LocalAdapter, LocalMediaEvent, MediaElement};
pub use remote_adapter::RemoteAdapter;
pub use remote_service::{
    LoadRequest, RemoteEvent, RemoteMediaInfo, RemotePlayerSnapshot, RemotePlayerState,
    RemoteService, SessionState,
};
pub use runtime::{InputCommand, PlayerRuntime};
pub use session_switch::SessionSwitchController;
