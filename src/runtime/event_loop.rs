use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::audio::Output;
use crate::config;
use crate::player::{Command, Player};
use crate::ui;

/// Main terminal event loop: ticks the player once per frame, draws the
/// snapshot and translates key presses into player commands. Returns
/// `Ok(())` when shutdown is requested.
pub fn run<O: Output>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    player: &mut Player<O>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.ui.tick_ms);
    // Text buffer of the in-TUI directory prompt, when open.
    let mut dir_prompt: Option<String> = None;

    loop {
        if let Err(err) = player.tick(Instant::now()) {
            warn!(error = %err, "auto-advance failed");
        }

        let snapshot = player.snapshot();
        terminal.draw(|f| ui::draw(f, &snapshot, dir_prompt.as_deref(), &settings.ui))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if let Some(buffer) = dir_prompt.as_mut() {
                    match key.code {
                        KeyCode::Esc => {
                            dir_prompt = None;
                        }
                        KeyCode::Backspace => {
                            buffer.pop();
                        }
                        KeyCode::Enter => {
                            let path = buffer.trim().to_string();
                            dir_prompt = None;
                            if !path.is_empty() {
                                dispatch(player, Command::ChangeDirectory(path.into()));
                            }
                        }
                        KeyCode::Char(c) if !c.is_control() => buffer.push(c),
                        _ => {}
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') | KeyCode::Char('p') => {
                        dispatch(player, Command::TogglePlayPause);
                    }
                    KeyCode::Right | KeyCode::Char('l') => dispatch(player, Command::Next),
                    KeyCode::Left | KeyCode::Char('h') => dispatch(player, Command::Previous),
                    KeyCode::Up | KeyCode::Char('k') => dispatch(player, Command::VolumeUp),
                    KeyCode::Down | KeyCode::Char('j') => dispatch(player, Command::VolumeDown),
                    KeyCode::Char('o') => dir_prompt = Some(String::new()),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn dispatch<O: Output>(player: &mut Player<O>, cmd: Command) {
    if let Err(err) = player.apply(cmd, Instant::now()) {
        warn!(error = %err, "command failed");
    }
}
