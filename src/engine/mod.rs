//! Story playback state machine.
//!
//! The engine owns the current position, the progress clock and the pause
//! state. It never touches the terminal, the network or the filesystem: the
//! shell forwards normalized input, calls [`PlaybackEngine::tick`] on a fixed
//! interval and reports media readiness, then drains [`EngineEvent`]s.
//!
//! Timer ownership is structural. The engine holds at most one
//! [`ProgressClock`] in an `Option`; every transition clears it before doing
//! anything else and only a ready, unpaused position acquires a new one.
//! Dropping the engine drops the clock, so nothing can fire after teardown.

mod clock;
mod error;
mod events;
mod progress;
mod viewed;


use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::{Catalog, PlaybackPosition};

pub(crate) use clock::{Clock, SystemClock};
pub(crate) use error::EngineError;
pub(crate) use events::{EngineEvent, InputEvent};
pub(crate) use viewed::ViewedSet;

use self::progress::ProgressClock;

/// Interval at which the shell is expected to call [`PlaybackEngine::tick`].
pub(crate) const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Snapshot of what the shell needs to render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlaybackState {
    pub(crate) position: PlaybackPosition,
    pub(crate) progress: f64,
    pub(crate) is_loading: bool,
    pub(crate) is_paused: bool,
}

pub(crate) struct PlaybackEngine<C: Clock = SystemClock> {
    catalog: Arc<Catalog>,
    time: C,
    position: PlaybackPosition,
    progress: f64,
    is_loading: bool,
    is_paused: bool,
    clock: Option<ProgressClock>,
    viewed: ViewedSet,
    events: VecDeque<EngineEvent>,
    generation: u64,
    closed: bool,
}

impl<C: Clock> PlaybackEngine<C> {
    /// Opens the viewer on the first story of `start_author`.
    ///
    /// `viewed` carries the session's viewed set across viewer openings; get
    /// it back with [`PlaybackEngine::into_viewed`].
    pub(crate) fn open(
        catalog: Arc<Catalog>,
        start_author: usize,
        viewed: ViewedSet,
        time: C,
    ) -> Result<Self, EngineError> {
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        let position = catalog
            .first_story_of(start_author)
            .map_err(|_| EngineError::AuthorOutOfRange {
                index: start_author,
                len: catalog.len(),
            })?;
        info!(author = %catalog.author_at(position).id, "viewer opened");

        Ok(Self {
            catalog,
            time,
            position,
            progress: 0.0,
            is_loading: true,
            is_paused: false,
            clock: None,
            viewed,
            events: VecDeque::new(),
            generation: 0,
            closed: false,
        })
    }

    pub(crate) fn state(&self) -> PlaybackState {
        PlaybackState {
            position: self.position,
            progress: self.progress,
            is_loading: self.is_loading,
            is_paused: self.is_paused,
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[cfg(test)]
    pub(crate) fn viewed(&self) -> &ViewedSet {
        &self.viewed
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bumped on every position change; lets the shell drop media results
    /// that belong to a position it already left.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn has_running_clock(&self) -> bool {
        self.clock.is_some()
    }

    pub(crate) fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn into_viewed(self) -> ViewedSet {
        self.viewed
    }

    pub(crate) fn handle(&mut self, input: InputEvent) {
        match input {
            InputEvent::Tap(x_fraction) => self.handle_tap(x_fraction),
            InputEvent::KeyLeft => self.retreat(),
            InputEvent::KeyRight | InputEvent::KeySpace => self.advance(),
            InputEvent::KeyEscape => self.request_close(),
            InputEvent::MediaReady | InputEvent::MediaError => self.on_media_ready(),
            InputEvent::Pause => self.set_paused(true),
            InputEvent::Resume => self.set_paused(false),
        }
    }

    pub(crate) fn on_media_ready(&mut self) {
        if self.closed || !self.is_loading {
            return;
        }
        self.is_loading = false;
        debug!(position = %self.position, "media ready");
        self.start_clock();
    }

    pub(crate) fn advance(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_clock();

        let position = self.position;
        if !self.catalog.is_last_story(position) {
            self.move_to(position.author_index(), position.story_index() + 1);
            return;
        }

        self.mark_viewed(position);
        if self.catalog.is_last_author(position) {
            self.close();
        } else {
            self.move_to(position.author_index() + 1, 0);
        }
    }

    pub(crate) fn retreat(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_clock();

        let position = self.position;
        if position.story_index() > 0 {
            self.move_to(position.author_index(), position.story_index() - 1);
        } else if position.author_index() > 0 {
            let previous = position.author_index() - 1;
            let last_story = self
                .catalog
                .get(previous)
                .map(|author| author.last_story_index())
                .unwrap_or_default();
            self.move_to(previous, last_story);
        } else {
            self.close();
        }
    }

    /// Explicit dismissal. Counts the author as viewed only when the viewer is
    /// already on that author's last story.
    pub(crate) fn request_close(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_clock();
        if self.catalog.is_last_story(self.position) {
            self.mark_viewed(self.position);
        }
        self.close();
    }

    /// Left half of the surface goes back, right half goes forward.
    pub(crate) fn handle_tap(&mut self, x_fraction: f64) {
        if self.closed {
            return;
        }
        if !x_fraction.is_finite() {
            debug!(x_fraction, "ignoring tap with non-finite coordinate");
            return;
        }
        self.cancel_clock();
        if x_fraction.clamp(0.0, 1.0) < 0.5 {
            self.retreat();
        } else {
            self.advance();
        }
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        if self.closed || self.is_paused == paused {
            return;
        }
        self.sample();
        self.cancel_clock();
        self.is_paused = paused;
        debug!(paused, progress = self.progress, "pause state changed");
        self.start_clock();
    }

    /// Samples the running clock; on expiry releases it and advances once.
    pub(crate) fn tick(&mut self) {
        if self.closed || self.clock.is_none() {
            return;
        }
        self.sample();
        if self.progress >= 1.0 {
            self.cancel_clock();
            debug!(position = %self.position, "story timer expired");
            self.advance();
        }
    }

    fn sample(&mut self) {
        if let Some(clock) = &self.clock {
            self.progress = clock.fraction(self.time.now());
        }
    }

    fn start_clock(&mut self) {
        if self.closed || self.is_loading || self.is_paused {
            return;
        }
        let now = self.time.now();
        let duration = self.catalog.story_at(self.position).display_duration();
        let clock = ProgressClock::start(now, duration, self.progress);
        debug!(
            position = %self.position,
            remaining_ms = clock.remaining(now).as_millis() as u64,
            "story timer started"
        );
        self.clock = Some(clock);
    }

    fn cancel_clock(&mut self) {
        self.clock = None;
    }

    fn move_to(&mut self, author_index: usize, story_index: usize) {
        let Some(position) = self.catalog.position(author_index, story_index) else {
            debug!(author_index, story_index, "refusing out-of-range move");
            return;
        };
        self.cancel_clock();
        self.position = position;
        self.progress = 0.0;
        self.is_loading = true;
        self.generation += 1;
        debug!(%position, "position changed");
        self.events.push_back(EngineEvent::PositionChanged(position));
    }

    fn mark_viewed(&mut self, position: PlaybackPosition) {
        let id = self.catalog.author_at(position).id.clone();
        if self.viewed.insert(id.clone()) {
            info!(author = %id, "author fully viewed");
            self.events.push_back(EngineEvent::AuthorViewed(id));
        }
    }

    fn close(&mut self) {
        self.cancel_clock();
        self.closed = true;
        info!(viewed = self.viewed.len(), "viewer closed");
        self.events.push_back(EngineEvent::Closed);
    }
}
