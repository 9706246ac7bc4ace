//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the read-only playback snapshot using `ratatui`;
//! it holds no state of its own.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::config::UiSettings;
use crate::player::{PlayerState, Snapshot};

const CONTROLS_TEXT: &str =
    "[space/p] play/pause | [h/l or arrows] prev/next | [k/j or arrows] volume | [o] directory | [q] quit";

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn state_text(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Empty => "No tracks",
        PlayerState::Ready => "Stopped",
        PlayerState::Playing => "Playing",
        PlayerState::Paused => "Paused",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the entire UI for one frame from the playback `snapshot`.
pub fn draw(frame: &mut Frame, snapshot: &Snapshot, dir_prompt: Option<&str>, ui: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header: banner text plus the directory the catalog came from.
    let header = Paragraph::new(format!(
        "{}\nDir: {}",
        ui.header_text,
        snapshot.directory.display()
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" minim ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Now playing: current track, state and progress.
    {
        let block = Block::default().borders(Borders::ALL).title(" now playing ");
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let line = match &snapshot.current_track_name {
            Some(name) => format!(
                " {} [{}]  {} / {}",
                name,
                state_text(snapshot.state),
                format_mmss(snapshot.elapsed),
                format_mmss(snapshot.total),
            ),
            None => " No tracks loaded".to_string(),
        };
        frame.render_widget(Paragraph::new(line), rows[0]);

        let ratio = if snapshot.total.is_zero() {
            0.0
        } else {
            (snapshot.elapsed.as_secs_f64() / snapshot.total.as_secs_f64()).clamp(0.0, 1.0)
        };
        let progress = Gauge::default().ratio(ratio).label("");
        frame.render_widget(progress, rows[1]);
    }

    // Volume gauge and the transient feedback line next to it.
    {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let percent = (f64::from(snapshot.volume) * 100.0).round() as u16;
        let volume = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" volume "))
            .percent(percent.min(100));
        frame.render_widget(volume, halves[0]);

        let feedback = Paragraph::new(snapshot.feedback.as_deref().unwrap_or(""))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" feedback ")
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    }),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(feedback, halves[1]);
    }

    // Track list with the current track highlighted.
    {
        let items: Vec<ListItem> = snapshot
            .track_names
            .iter()
            .map(|name| ListItem::new(name.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        state.select(snapshot.current_index);
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    let footer = Paragraph::new(CONTROLS_TEXT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    // Directory prompt popup (kept inside the list area).
    if let Some(input) = dir_prompt {
        let popup_area = centered_rect_sized(60, 3, chunks[3]);
        frame.render_widget(Clear, popup_area);
        let prompt = Paragraph::new(format!("{input}_")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" change directory (enter confirms, esc cancels) ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        );
        frame.render_widget(prompt, popup_area);
    }
}
