//! Error taxonomy for playback operations.
//!
//! Every failure here is recoverable: callers log it, reset to idle where
//! needed, and keep running.

use std::fmt;

/// Error codes reported by the remote session service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CastErrorCode {
    ApiNotInitialized,
    Cancel,
    ChannelError,
    ExtensionMissing,
    InvalidParameter,
    ReceiverUnavailable,
    SessionError,
    Timeout,
    /// Any code this client does not recognize, kept verbatim.
    Other(String),
}

impl CastErrorCode {
    /// Parse a raw backend code such as `session_error`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "api_not_initialized" => Self::ApiNotInitialized,
            "cancel" => Self::Cancel,
            "channel_error" => Self::ChannelError,
            "extension_missing" => Self::ExtensionMissing,
            "invalid_parameter" => Self::InvalidParameter,
            "receiver_unavailable" => Self::ReceiverUnavailable,
            "session_error" => Self::SessionError,
            "timeout" => Self::Timeout,
            _ => Self::Other(code.to_string()),
        }
    }

    /// Human-readable message shown to the user.
    pub fn user_message(&self) -> String {
        let fixed = match self {
            Self::ApiNotInitialized => "The API is not initialized.",
            Self::Cancel => "The operation was canceled by the user.",
            Self::ChannelError => "A channel to the receiver is not available.",
            Self::ExtensionMissing => "The Cast extension is not available.",
            Self::InvalidParameter => "The parameters to the operation were not valid.",
            Self::ReceiverUnavailable => "No receiver was compatible with the session request.",
            Self::SessionError => "A session could not be created, or a session was invalid.",
            Self::Timeout => "The operation timed out.",
            Self::Other(raw) => return format!("Unknown error: {raw}"),
        };
        fixed.to_string()
    }
}

impl fmt::Display for CastErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Why a load request did not produce playable media.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The remote service rejected the request.
    Remote(CastErrorCode),
    /// The local element could not load the source.
    Local(String),
    /// The request could not be submitted at all.
    Submit(RemoteError),
}

impl LoadError {
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Remote(code) => code.user_message(),
            LoadError::Local(message) => format!("Local playback failed: {message}"),
            LoadError::Submit(err) => err.to_string(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for LoadError {}

/// Synchronous failures when talking to the remote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteError {
    /// No session is connected.
    NotConnected,
    /// No media session exists for a media command.
    NoMediaSession,
    /// The service rejected the command.
    Rejected(CastErrorCode),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::NotConnected => f.write_str("remote session is not connected"),
            RemoteError::NoMediaSession => f.write_str("remote media session is not available"),
            RemoteError::Rejected(code) => write!(f, "remote command rejected: {code}"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Reasons a seek request is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekRejected {
    /// Not playing or paused.
    NotActive,
    /// Duration unknown or zero.
    UnknownDuration,
    /// The backend reports the content as not seekable.
    NotSeekable,
    /// An ad break is playing.
    PlayingBreak,
    /// Live content without a reported seekable range.
    NoSeekableRange,
    /// The requested time or click position is not a finite number.
    InvalidTarget,
}

impl fmt::Display for SeekRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SeekRejected::NotActive => "media is not playing or paused",
            SeekRejected::UnknownDuration => "duration is unknown",
            SeekRejected::NotSeekable => "content is not seekable",
            SeekRejected::PlayingBreak => "an ad break is playing",
            SeekRejected::NoSeekableRange => "no live seekable range reported",
            SeekRejected::InvalidTarget => "seek target is not a finite number",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for SeekRejected {}

/// Invalid coordinator requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Media index outside the catalog.
    UnknownMedia { index: usize, len: usize },
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::UnknownMedia { index, len } => {
                write!(f, "media index {index} out of range (catalog has {len} items)")
            }
        }
    }
}

impl std::error::Error for CoordinatorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_fixed_messages() {
        assert_eq!(
            CastErrorCode::from_code("receiver_unavailable").user_message(),
            "No receiver was compatible with the session request."
        );
        assert_eq!(CastErrorCode::from_code("TIMEOUT"), CastErrorCode::Timeout);
    }

    #[test]
    fn unknown_code_falls_back_to_raw_text() {
        let code = CastErrorCode::from_code("load_failed_42");
        assert_eq!(code, CastErrorCode::Other("load_failed_42".to_string()));
        assert_eq!(code.user_message(), "Unknown error: load_failed_42");
    }

    #[test]
    fn load_error_messages_cover_every_source() {
        assert_eq!(
            LoadError::Remote(CastErrorCode::Cancel).to_string(),
            "The operation was canceled by the user."
        );
        assert_eq!(
            LoadError::Local("unsupported source".into()).to_string(),
            "Local playback failed: unsupported source"
        );
        assert_eq!(
            LoadError::Submit(RemoteError::NotConnected).to_string(),
            "remote session is not connected"
        );
    }
}
