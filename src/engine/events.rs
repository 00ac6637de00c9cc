use crate::catalog::{AuthorId, PlaybackPosition};

/// Normalized input forwarded by the shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum InputEvent {
    /// Horizontal tap position within the story surface, 0.0 = left edge.
    Tap(f64),
    KeyLeft,
    KeyRight,
    KeySpace,
    KeyEscape,
    MediaReady,
    /// Load failures are handled exactly like `MediaReady`.
    MediaError,
    Pause,
    Resume,
}

/// Notifications produced by the engine, drained by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineEvent {
    PositionChanged(PlaybackPosition),
    /// Emitted once per author, the first time it enters the viewed set.
    AuthorViewed(AuthorId),
    /// Terminal; nothing follows it.
    Closed,
}
