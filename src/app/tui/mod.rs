mod actions;
mod media;
mod render;
mod session;

use std::io;
use std::sync::{Arc, mpsc};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::info;

use crate::catalog::Catalog;
use crate::engine::{
    EngineEvent, InputEvent, PlaybackEngine, SystemClock, TICK_INTERVAL, ViewedSet,
};

use self::actions::{
    ListAction, ViewerAction, list_action, status_error, status_info, tap_fraction, viewer_action,
};
use self::media::{
    MediaLoadResult, MediaStatus, MediaTicket, drain_media_results, spawn_media_load,
};
use self::render::{draw_list, draw_viewer};
use self::session::TuiSession;

const VIEWER_HINT: &str = "←/→ or click to navigate  Space next  p pause  Esc close";

struct ViewerScreen {
    engine: PlaybackEngine,
    media: MediaStatus,
    ticket: MediaTicket,
}

impl ViewerScreen {
    fn open(
        catalog: &Arc<Catalog>,
        author_index: usize,
        viewed: ViewedSet,
        session: u64,
    ) -> Result<Self> {
        let engine = PlaybackEngine::open(
            Arc::clone(catalog),
            author_index,
            viewed,
            SystemClock::new(),
        )
        .with_context(|| format!("cannot open viewer at author {author_index}"))?;
        let ticket = MediaTicket {
            session,
            generation: engine.generation(),
        };
        Ok(Self {
            engine,
            media: MediaStatus::Loading,
            ticket,
        })
    }

    fn request_media(&mut self, tx: &mpsc::Sender<MediaLoadResult>) {
        let state = self.engine.state();
        let image = self.engine.catalog().story_at(state.position).image.clone();
        self.ticket.generation = self.engine.generation();
        self.media = MediaStatus::Loading;
        spawn_media_load(self.ticket, image, tx);
    }

    fn apply_media_results(&mut self, rx: &mpsc::Receiver<MediaLoadResult>) {
        let Some(outcome) = drain_media_results(rx, self.ticket) else {
            return;
        };
        match outcome {
            Ok(media) => {
                self.media = MediaStatus::Ready(media);
                self.engine.handle(InputEvent::MediaReady);
            }
            Err(reason) => {
                self.media = MediaStatus::Failed(reason);
                self.engine.handle(InputEvent::MediaError);
            }
        }
    }
}

pub(crate) fn run_tui(catalog: Arc<Catalog>, start_author: Option<usize>) -> Result<()> {
    let mut viewed = ViewedSet::new();
    let mut viewer_session = 0_u64;
    // Fail before touching the terminal when the requested author is bogus.
    let mut viewer = match start_author {
        Some(index) => {
            viewer_session += 1;
            Some(ViewerScreen::open(
                &catalog,
                index,
                viewed.clone(),
                viewer_session,
            )?)
        }
        None => None,
    };

    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let (media_tx, media_rx) = mpsc::channel::<MediaLoadResult>();
    let mut selected = start_author.unwrap_or(0);
    let mut story_area = Rect::default();
    let mut spinner = 0_usize;
    let mut status = status_info("Ready. Enter opens the selected author.");

    if let Some(screen) = viewer.as_mut() {
        session.on_viewer_open()?;
        screen.request_media(&media_tx);
        status = status_info(VIEWER_HINT);
    }

    loop {
        if let Some(screen) = viewer.as_mut() {
            screen.apply_media_results(&media_rx);
        }
        spinner = spinner.wrapping_add(1);

        terminal.draw(|frame| match viewer.as_ref() {
            Some(screen) => {
                story_area = draw_viewer(
                    frame,
                    screen.engine.catalog(),
                    screen.engine.state(),
                    &screen.media,
                    &status,
                    spinner,
                );
            }
            None => draw_list(frame, &catalog, &viewed, selected, &status),
        })?;

        if event::poll(TICK_INTERVAL)? {
            let input = event::read()?;
            if let Some(screen) = viewer.as_mut() {
                if handle_viewer_event(screen, &input, story_area) == ViewerAction::Quit {
                    break;
                }
            } else if let Event::Key(key) = input
                && key.kind == KeyEventKind::Press
            {
                match list_action(&key) {
                    ListAction::Quit => break,
                    ListAction::Previous => selected = selected.saturating_sub(1),
                    ListAction::Next => {
                        selected = (selected + 1).min(catalog.len().saturating_sub(1));
                    }
                    ListAction::Open => {
                        viewer_session += 1;
                        match ViewerScreen::open(&catalog, selected, viewed.clone(), viewer_session)
                        {
                            Ok(mut screen) => {
                                session.on_viewer_open()?;
                                screen.request_media(&media_tx);
                                viewer = Some(screen);
                                status = status_info(VIEWER_HINT);
                            }
                            Err(err) => status = status_error(&format!("{err:#}")),
                        }
                    }
                    ListAction::None => {}
                }
            }
        }

        let Some(screen) = viewer.as_mut() else {
            continue;
        };
        screen.engine.tick();

        for engine_event in screen.engine.drain_events() {
            match engine_event {
                EngineEvent::PositionChanged(_) => screen.request_media(&media_tx),
                EngineEvent::AuthorViewed(id) => {
                    let name = screen
                        .engine
                        .catalog()
                        .authors()
                        .iter()
                        .find(|author| author.id == id)
                        .map_or_else(|| id.to_string(), |author| author.display_name.clone());
                    status = status_info(&format!("Viewed all stories from {name}."));
                }
                EngineEvent::Closed => {}
            }
        }

        if screen.engine.is_closed()
            && let Some(screen) = viewer.take()
        {
            selected = screen.engine.state().position.author_index();
            viewed = screen.engine.into_viewed();
            session.on_viewer_close()?;
            if status == status_info(VIEWER_HINT) {
                status = status_info("Viewer closed.");
            }
            info!(viewed = viewed.len(), "returned to author list");
        }
    }

    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}

/// Forwards viewer input to the engine. Returns `Quit` when the whole app
/// should exit.
fn handle_viewer_event(screen: &mut ViewerScreen, input: &Event, story_area: Rect) -> ViewerAction {
    match input {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let action = viewer_action(key, screen.engine.state().is_paused);
            if let ViewerAction::Input(input) = action {
                screen.engine.handle(input);
            }
            action
        }
        Event::Mouse(mouse) => {
            if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                && let Some(x) = tap_fraction(mouse.column, mouse.row, story_area)
            {
                screen.engine.handle(InputEvent::Tap(x));
            }
            ViewerAction::None
        }
        _ => ViewerAction::None,
    }
}
