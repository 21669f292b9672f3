//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::{TimeField, UiSettings};
use crate::playback::{PlaybackMode, PlayerPhase, PlayerSnapshot};

const CONTROLS: [(&str, &str); 11] = [
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("enter", "play selected"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("H/L", "seek -/+"),
    ("0-9", "seek to n0%"),
    ("s", "stop"),
    ("f", "like"),
    ("K", "details"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the time text (elapsed/total/remaining) per `UiSettings`.
fn time_text(elapsed: Duration, total: Duration, ui: &UiSettings) -> String {
    ui.time_fields
        .iter()
        .map(|f| match f {
            TimeField::Elapsed => format_mmss(elapsed),
            TimeField::Total => format_mmss(total),
            TimeField::Remaining => format!("-{}", format_mmss(total.saturating_sub(elapsed))),
        })
        .collect::<Vec<String>>()
        .join(&ui.time_separator)
}

fn phase_label(phase: PlayerPhase) -> &'static str {
    match phase {
        PlayerPhase::Idle => "Stopped",
        PlayerPhase::Loading => "Loading…",
        PlayerPhase::PlayingReal | PlayerPhase::PlayingSimulated => "Playing",
        PlayerPhase::PausedReal | PlayerPhase::PausedSimulated => "Paused",
    }
}

fn mode_label(mode: Option<PlaybackMode>) -> Option<&'static str> {
    match mode? {
        PlaybackMode::Real => Some("audio"),
        PlaybackMode::Simulated => Some("preview unavailable, simulated"),
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn now_playing_lines(app: &App, snapshot: Option<&PlayerSnapshot>) -> Vec<Line<'static>> {
    let Some(snap) = snapshot else {
        return vec![Line::from("Player not running")];
    };
    if snap.phase == PlayerPhase::Idle {
        let mut lines = vec![Line::from("Stopped")];
        if let Some(src) = &app.source_label {
            lines.push(Line::from(format!("Catalog: {src}")).dim());
        }
        return lines;
    }

    let np = &snap.now_playing;
    let mut status = vec![phase_label(snap.phase).to_string()];
    if let Some(mode) = mode_label(snap.state.mode) {
        status.push(mode.to_string());
    }
    if app.is_liked(snap.state.track_index) {
        status.push("♥".to_string());
    }

    vec![
        Line::from(format!("{} - {}", np.title, np.artist)).bold(),
        Line::from(status.join(" • ")),
        Line::from(format!("Cover: {}", np.cover)).dim(),
    ]
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, snapshot: Option<&PlayerSnapshot>, ui: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" catify ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let mut lines = now_playing_lines(app, snapshot);
    if let Some(msg) = &app.message {
        lines.push(Line::from(msg.clone()).italic());
    }
    let now_playing = Paragraph::new(lines)
        .block(left_padded(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[1]);

    // Progress
    let (percent, label) = match snapshot.map(|s| &s.state) {
        Some(state) if state.mode.is_some() => (
            state.progress_percent(),
            time_text(state.current_time, state.duration, ui),
        ),
        _ => (0.0, time_text(Duration::ZERO, Duration::ZERO, ui)),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    // Track list
    {
        let playing = snapshot
            .filter(|s| s.phase != PlayerPhase::Idle)
            .map(|s| s.state.track_index);

        let mut items: Vec<ListItem> = Vec::with_capacity(app.tracks.len());
        let mut selected_row = 0usize;
        for (i, track) in app.tracks.iter().enumerate() {
            if let Some(heading) = app.section_heading(i) {
                items.push(ListItem::new(Line::from(heading).underlined().dim()));
            }
            if i == app.selected {
                selected_row = items.len();
            }
            let marker = if playing == Some(i) { "▶ " } else { "  " };
            let heart = if app.is_liked(i) { " ♥" } else { "" };
            items.push(ListItem::new(format!("{marker}{}{heart}", track.display())));
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if app.has_tracks() {
            state.select(Some(selected_row));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    // Overlay details popup (keeps list visible under it)
    if app.details_window {
        let list_area = chunks[3];
        let popup_area = centered_rect_sized(72, 9, list_area);
        frame.render_widget(Clear, popup_area);

        let details = match app.selected_track() {
            Some(track) => format!(
                "Title: {}\nArtist: {}\nCover: {}\nSource: {}\nLiked: {}",
                track.title,
                track.artist,
                track.cover_path,
                track.declared_source.as_deref().unwrap_or("-"),
                if app.is_liked(app.selected) { "yes" } else { "no" },
            ),
            None => "No track selected".to_string(),
        };
        let details_paragraph = Paragraph::new(details)
            .block(left_padded(" details (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(details_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text())
        .block(left_padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
