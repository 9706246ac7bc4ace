use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tempfile::{TempDir, tempdir};

use super::*;
use crate::audio::{DecodedTrack, Output, OutputError, OutputHandle};
use crate::audio::tests::wav_bytes;
use crate::config::LibrarySettings;

const RATE: u32 = 8_000;

#[derive(Default)]
struct Shared {
    starts: usize,
    position: Duration,
    paused: bool,
    volume: f32,
}

/// Test double for the audio device: playback position is set by hand.
#[derive(Clone, Default)]
struct FakeOutput {
    shared: Rc<RefCell<Shared>>,
}

struct FakeHandle {
    shared: Rc<RefCell<Shared>>,
}

impl Output for FakeOutput {
    type Handle = FakeHandle;

    fn start(&mut self, _decoded: DecodedTrack, volume: f32) -> Result<FakeHandle, OutputError> {
        let mut shared = self.shared.borrow_mut();
        shared.starts += 1;
        shared.position = Duration::ZERO;
        shared.paused = false;
        shared.volume = volume;
        Ok(FakeHandle {
            shared: self.shared.clone(),
        })
    }
}

impl OutputHandle for FakeHandle {
    fn play(&mut self) {
        self.shared.borrow_mut().paused = false;
    }

    fn pause(&mut self) {
        self.shared.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.shared.borrow().paused
    }

    fn set_volume(&mut self, volume: f32) {
        self.shared.borrow_mut().volume = volume;
    }

    fn position(&self) -> Duration {
        self.shared.borrow().position
    }
}

fn wav_settings() -> LibrarySettings {
    LibrarySettings {
        extensions: vec!["wav".into()],
        ..LibrarySettings::default()
    }
}

fn write_track(dir: &Path, name: &str, secs: u64) {
    let frames = (RATE as u64 * secs) as usize;
    fs::write(dir.join(name), wav_bytes(RATE, 1, frames)).unwrap();
}

/// Directory holding one-channel WAVs with the given names and lengths.
/// The walk order of the resulting catalog is filesystem-defined.
fn fixture(tracks: &[(&str, u64)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, secs) in tracks {
        write_track(dir.path(), name, *secs);
    }
    dir
}

fn player_over(dir: &Path, output: FakeOutput, volume: f32) -> Player<FakeOutput> {
    Player::new(output, dir, wav_settings(), volume).unwrap()
}

fn assert_volume(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "volume {actual} != expected {expected}"
    );
}

#[test]
fn empty_directory_yields_empty_state() {
    let dir = tempdir().unwrap();
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);

    assert_eq!(player.state(), PlayerState::Empty);
    assert_eq!(player.current_index(), None);
    assert_eq!(player.snapshot().current_track_name, None);

    // Navigation and play/pause are no-ops, not errors.
    player.next().unwrap();
    player.previous().unwrap();
    player.toggle_play_pause();
    player.tick(Instant::now()).unwrap();
    assert_eq!(player.current_index(), None);
}

#[test]
fn new_selects_first_track_without_decoding() {
    let dir = fixture(&[("a.wav", 1)]);
    let player = player_over(dir.path(), FakeOutput::default(), 1.0);

    assert_eq!(player.state(), PlayerState::Ready);
    assert_eq!(player.current_index(), Some(0));
    // Undecoded tracks report zero duration.
    assert_eq!(player.snapshot().total, Duration::ZERO);
}

#[test]
fn select_decodes_and_starts_playing() {
    let dir = fixture(&[("a.wav", 2)]);
    let output = FakeOutput::default();
    let shared = output.shared.clone();
    let mut player = player_over(dir.path(), output, 1.0);

    player.select(0).unwrap();
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(shared.borrow().starts, 1);

    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_track_name.as_deref(), Some("a.wav"));
    assert!((snapshot.total.as_secs_f64() - 2.0).abs() < 0.01);
    assert_eq!(snapshot.elapsed, Duration::ZERO);
}

#[test]
fn next_composed_len_times_returns_to_start() {
    let dir = fixture(&[("a.wav", 1), ("b.wav", 1), ("c.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);
    player.select(0).unwrap();

    for _ in 0..3 {
        player.next().unwrap();
    }
    assert_eq!(player.current_index(), Some(0));
    assert_eq!(player.state(), PlayerState::Playing);
}

#[test]
fn previous_is_the_inverse_of_next() {
    let dir = fixture(&[("a.wav", 1), ("b.wav", 1), ("c.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);
    player.select(1).unwrap();

    player.next().unwrap();
    player.previous().unwrap();
    assert_eq!(player.current_index(), Some(1));
}

#[test]
fn previous_from_first_wraps_to_last() {
    let dir = fixture(&[("a.wav", 1), ("b.wav", 1), ("c.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);
    player.select(0).unwrap();

    player.previous().unwrap();
    assert_eq!(player.current_index(), Some(2));
}

#[test]
fn toggle_play_pause_flips_between_playing_and_paused() {
    let dir = fixture(&[("a.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);
    player.select(0).unwrap();

    player.toggle_play_pause();
    assert_eq!(player.state(), PlayerState::Paused);
    player.toggle_play_pause();
    assert_eq!(player.state(), PlayerState::Playing);
}

#[test]
fn toggle_play_pause_is_noop_when_ready() {
    let dir = fixture(&[("a.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);

    player.toggle_play_pause();
    assert_eq!(player.state(), PlayerState::Ready);
}

#[test]
fn volume_stays_clamped_over_any_command_sequence() {
    let dir = fixture(&[("a.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 0.5);
    let now = Instant::now();

    for _ in 0..20 {
        player.apply(Command::VolumeUp, now).unwrap();
        assert!((0.0..=1.0).contains(&player.volume()));
    }
    assert_volume(player.volume(), 1.0);

    for _ in 0..30 {
        player.apply(Command::VolumeDown, now).unwrap();
        assert!((0.0..=1.0).contains(&player.volume()));
    }
    assert_volume(player.volume(), 0.0);
}

#[test]
fn volume_up_at_095_clamps_to_full_and_emits_feedback() {
    let dir = fixture(&[("a.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 0.95);
    let now = Instant::now();

    player.apply(Command::VolumeUp, now).unwrap();
    assert_volume(player.volume(), 1.0);
    assert_eq!(player.snapshot().feedback.as_deref(), Some("Volume: 100%"));

    // Still visible just before expiry, gone at the expiry instant.
    player.tick(now + FEEDBACK_TTL - Duration::from_millis(1)).unwrap();
    assert!(player.snapshot().feedback.is_some());
    player.tick(now + FEEDBACK_TTL).unwrap();
    assert_eq!(player.snapshot().feedback, None);
}

#[test]
fn volume_change_applies_to_the_live_handle() {
    let dir = fixture(&[("a.wav", 1)]);
    let output = FakeOutput::default();
    let shared = output.shared.clone();
    let mut player = player_over(dir.path(), output, 1.0);
    player.select(0).unwrap();

    player.apply(Command::VolumeDown, Instant::now()).unwrap();
    assert_volume(shared.borrow().volume, 0.9);
}

#[test]
fn tick_auto_advances_at_end_of_track() {
    // Two tracks of different lengths, playing the first with elapsed == total.
    let dir = fixture(&[("a.wav", 2), ("b.wav", 3)]);
    let output = FakeOutput::default();
    let shared = output.shared.clone();
    let mut player = player_over(dir.path(), output, 1.0);
    player.select(0).unwrap();

    // Walk order is filesystem-defined; derive expectations from the catalog.
    let names = player.snapshot().track_names;
    let secs_of = |name: &str| if name == "a.wav" { 2.0 } else { 3.0 };

    shared.borrow_mut().position = player.snapshot().total;
    player.tick(Instant::now()).unwrap();

    assert_eq!(player.current_index(), Some(1));
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(shared.borrow().starts, 2);

    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_track_name.as_deref(), Some(names[1].as_str()));
    assert_eq!(snapshot.elapsed, Duration::ZERO);
    assert!((snapshot.total.as_secs_f64() - secs_of(&names[1])).abs() < 0.01);
}

#[test]
fn tick_wraps_from_last_track_to_first() {
    let dir = fixture(&[("a.wav", 1), ("b.wav", 1)]);
    let output = FakeOutput::default();
    let shared = output.shared.clone();
    let mut player = player_over(dir.path(), output, 1.0);
    player.select(1).unwrap();

    shared.borrow_mut().position = Duration::from_secs(5);
    player.tick(Instant::now()).unwrap();

    assert_eq!(player.current_index(), Some(0));
    assert_eq!(player.state(), PlayerState::Playing);
}

#[test]
fn tick_does_not_advance_while_paused() {
    let dir = fixture(&[("a.wav", 1), ("b.wav", 1)]);
    let output = FakeOutput::default();
    let shared = output.shared.clone();
    let mut player = player_over(dir.path(), output, 1.0);
    player.select(0).unwrap();
    player.toggle_play_pause();

    shared.borrow_mut().position = Duration::from_secs(10);
    player.tick(Instant::now()).unwrap();
    assert_eq!(player.current_index(), Some(0));
    assert_eq!(player.state(), PlayerState::Paused);
}

#[test]
fn reload_resets_to_first_track_of_new_directory() {
    let first = fixture(&[("a.wav", 1), ("b.wav", 1)]);
    let second = fixture(&[("x.wav", 1)]);
    let mut player = player_over(first.path(), FakeOutput::default(), 1.0);
    player.select(1).unwrap();

    player
        .apply(
            Command::ChangeDirectory(second.path().to_path_buf()),
            Instant::now(),
        )
        .unwrap();

    assert_eq!(player.current_index(), Some(0));
    assert_eq!(player.state(), PlayerState::Playing);
    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_track_name.as_deref(), Some("x.wav"));
    assert_eq!(snapshot.track_names, vec!["x.wav".to_string()]);
}

#[test]
fn reload_into_empty_directory_goes_empty() {
    let first = fixture(&[("a.wav", 1)]);
    let empty = tempdir().unwrap();
    let mut player = player_over(first.path(), FakeOutput::default(), 1.0);
    player.select(0).unwrap();

    player.reload(empty.path()).unwrap();

    assert_eq!(player.state(), PlayerState::Empty);
    assert_eq!(player.current_index(), None);
    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_track_name, None);
    assert!(snapshot.track_names.is_empty());
}

#[test]
fn failed_reload_leaves_player_untouched() {
    let dir = fixture(&[("a.wav", 1), ("b.wav", 1)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);
    player.select(1).unwrap();
    let before = player.snapshot();

    let result = player.reload(Path::new("/definitely/not/a/real/dir"));
    assert!(matches!(result, Err(PlayerError::Catalog(_))));

    let after = player.snapshot();
    assert_eq!(after.current_index, before.current_index);
    assert_eq!(after.track_names, before.track_names);
    assert_eq!(after.directory, before.directory);
    assert_eq!(player.state(), PlayerState::Playing);
}

#[test]
fn decode_failure_degrades_to_ready_keeping_the_index() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.wav"), b"not a wav at all").unwrap();
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);

    let result = player.select(0);
    assert!(matches!(result, Err(PlayerError::Decode(_))));
    assert_eq!(player.state(), PlayerState::Ready);
    assert_eq!(player.current_index(), Some(0));
    assert_eq!(player.snapshot().elapsed, Duration::ZERO);
}

#[test]
fn duration_is_recomputed_on_every_successful_select() {
    let dir = fixture(&[("a.wav", 2)]);
    let mut player = player_over(dir.path(), FakeOutput::default(), 1.0);

    player.select(0).unwrap();
    let first = player.snapshot().total;
    player.select(0).unwrap();
    assert_eq!(player.snapshot().total, first);
}
