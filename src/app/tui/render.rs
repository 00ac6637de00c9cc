use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap};

use crate::catalog::{Author, Catalog};
use crate::engine::{PlaybackState, ViewedSet};

use super::super::format::{
    format_byte_size, format_posted_age, initials, segment_ratio, truncate, visible_window,
};
use super::media::MediaStatus;

const CARD_WIDTH: u16 = 14;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED: Color = Color::Rgb(185, 195, 210);
const UNVIEWED_RING: Color = Color::Rgb(255, 120, 170);
const VIEWED_RING: Color = Color::Rgb(95, 102, 115);

pub(super) fn draw_list(
    frame: &mut Frame,
    catalog: &Catalog,
    viewed: &ViewedSet,
    selected: usize,
    status: &str,
) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "STORYREEL",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} authors", catalog.len()),
            Style::default().fg(MUTED),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            if viewed.is_empty() {
                "nothing viewed yet".to_string()
            } else {
                format!("{} viewed", viewed.len())
            },
            Style::default().fg(MUTED),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Stories"));
    frame.render_widget(header, chunks[0]);

    draw_thumbnail_row(frame, chunks[1], catalog, viewed, selected);

    let details = match catalog.get(selected) {
        Some(author) => author_details(author, viewed.contains(&author.id)),
        None => "No authors loaded.".to_string(),
    };
    let details = Paragraph::new(details)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .wrap(Wrap { trim: true })
        .block(panel_block("Selected"));
    frame.render_widget(details, chunks[2]);

    let controls = Paragraph::new(Line::from(Span::styled(
        "←/→ move  Enter open  q quit",
        Style::default().fg(MUTED),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(controls, chunks[3]);

    render_status(frame, chunks[4], status);
}

fn draw_thumbnail_row(
    frame: &mut Frame,
    area: Rect,
    catalog: &Catalog,
    viewed: &ViewedSet,
    selected: usize,
) {
    let block = panel_block("Authors");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let capacity = usize::from(inner.width / CARD_WIDTH).max(1);
    let (start, end) = visible_window(selected, catalog.len(), capacity);
    let constraints = vec![Constraint::Length(CARD_WIDTH); end - start];
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (slot, index) in slots.iter().zip(start..end) {
        let Some(author) = catalog.get(index) else {
            continue;
        };
        let ring = if viewed.contains(&author.id) {
            VIEWED_RING
        } else {
            UNVIEWED_RING
        };
        let mut name_style = Style::default().fg(Color::Rgb(230, 235, 242));
        if index == selected {
            name_style = name_style.bg(ACCENT).fg(Color::Black).add_modifier(Modifier::BOLD);
        }
        let avatar = Paragraph::new(vec![
            Line::from(Span::styled(
                initials(&author.display_name),
                Style::default().fg(ring).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate(&author.display_name, usize::from(CARD_WIDTH) - 2),
                name_style,
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ring)),
        );
        frame.render_widget(avatar, *slot);
    }
}

fn author_details(author: &Author, is_viewed: bool) -> String {
    let count = author.stories.len();
    format!(
        "Name\n{}\n\nID\n{}\n\nAvatar\n{}\n\nStories\n{} {}\n\nPosted\n{}\n\nStatus\n{}",
        truncate(&author.display_name, 40),
        truncate(author.id.as_str(), 28),
        author.thumbnail_image().map_or_else(|| "-".to_string(), |image| truncate(image, 60)),
        count,
        if count == 1 { "story" } else { "stories" },
        format_posted_age(author.posted_at, Utc::now()),
        if is_viewed { "viewed" } else { "new" },
    )
}

/// Draws the open viewer and returns the story surface, which is where taps
/// are hit-tested.
pub(super) fn draw_viewer(
    frame: &mut Frame,
    catalog: &Catalog,
    state: PlaybackState,
    media: &MediaStatus,
    status: &str,
    spinner: usize,
) -> Rect {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let author = catalog.author_at(state.position);
    draw_segments(frame, chunks[0], author, state);

    let mut header = vec![
        Span::styled(
            format!(" {} ", initials(&author.display_name)),
            Style::default()
                .bg(UNVIEWED_RING)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", Style::default()),
        Span::styled(
            truncate(&author.display_name, 32),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", Style::default()),
        Span::styled(
            format_posted_age(author.posted_at, Utc::now()),
            Style::default().fg(MUTED),
        ),
    ];
    if state.is_paused {
        header.push(Span::styled("   PAUSED", Style::default().fg(Color::Yellow)));
    }
    let header = Paragraph::new(Line::from(header)).block(panel_block("Author"));
    frame.render_widget(header, chunks[1]);

    let story_block = panel_block("Story");
    let story_area = story_block.inner(chunks[2]);
    let story_text = story_body(catalog, state, media, spinner);
    let body = Paragraph::new(story_text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(story_block);
    frame.render_widget(body, chunks[2]);

    render_status(frame, chunks[3], status);
    story_area
}

fn draw_segments(frame: &mut Frame, area: Rect, author: &Author, state: PlaybackState) {
    let count = author.stories.len().max(1);
    let constraints = vec![Constraint::Ratio(1, count as u32); count];
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints(constraints)
        .split(area);
    for (index, slot) in slots.iter().enumerate() {
        let ratio = segment_ratio(index, state.position.story_index(), state.progress);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::White).bg(VIEWED_RING))
            .label("")
            .ratio(ratio);
        frame.render_widget(gauge, *slot);
    }
}

fn story_body(
    catalog: &Catalog,
    state: PlaybackState,
    media: &MediaStatus,
    spinner: usize,
) -> Vec<Line<'static>> {
    let author = catalog.author_at(state.position);
    let story = catalog.story_at(state.position);
    let counter = format!(
        "story {} of {}",
        state.position.story_index() + 1,
        author.stories.len()
    );
    let mut lines = vec![Line::from(""), Line::from("")];
    match media {
        MediaStatus::Loading => lines.push(Line::from(Span::styled(
            format!("{} loading", SPINNER[spinner % SPINNER.len()]),
            Style::default().fg(ACCENT),
        ))),
        MediaStatus::Ready(loaded) => lines.push(Line::from(Span::styled(
            format!("[{} image, {}]", loaded.kind, format_byte_size(loaded.bytes)),
            Style::default().fg(Color::Rgb(140, 220, 160)),
        ))),
        MediaStatus::Failed(reason) => {
            lines.push(Line::from(Span::styled(
                "image unavailable",
                Style::default()
                    .fg(Color::Rgb(255, 145, 120))
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                truncate(reason, 60),
                Style::default().fg(MUTED),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        truncate(&story.image, 70),
        Style::default().fg(MUTED),
    )));
    lines.push(Line::from(Span::styled(counter, Style::default().fg(MUTED))));
    lines
}

fn render_status(frame: &mut Frame, area: Rect, status: &str) {
    let status_widget = Paragraph::new(status.to_string())
        .style(status_style(status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, area);
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}
