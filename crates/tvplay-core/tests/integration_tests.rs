//! Integration tests for tvplay Core

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tvplay_core::{
    navigation::transition,
    sim::{CommandKind, PrimitiveCommand},
    ContentSource, FocusTarget, FormFactor, ManualClock, PlaybackPrimitive, PlaybackReducer,
    PlaybackUpdate, PlayerConfig, PlayerDriver, PlayerSession, PositionStore, PrimitiveStatus, RemoteEvent,
    RemoteKey, SessionInput, SessionRunner, SimulatedPrimitive, StatusEvent,
};

const MP4: &str = "https://cdn.example/feature.mp4";
const HLS: &str = "https://x/hls.m3u8";

fn clock_store() -> (PositionStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    (PositionStore::with_clock(clock.clone()), clock)
}

fn driver(
    content: ContentSource,
    form_factor: FormFactor,
    positions: PositionStore,
) -> (PlayerDriver<SimulatedPrimitive>, SimulatedPrimitive) {
    let sim = SimulatedPrimitive::with_duration(3600.0);
    let driver = PlayerDriver::new(
        sim.clone(),
        content,
        form_factor,
        PlayerConfig::default(),
        positions,
    );
    (driver, sim)
}

// =============================================================================
// Reducer Tests
// =============================================================================

#[test]
fn test_reducer_untouched_fields_survive() {
    let mut reducer = PlaybackReducer::new();
    reducer.update(PlaybackUpdate::new().duration(120.0).current_time(30.0));
    reducer.update(PlaybackUpdate::new().playing(true));
    reducer.update(PlaybackUpdate::new().current_time(31.0));

    let state = reducer.state();
    assert_eq!(state.duration, 120.0);
    assert_eq!(state.current_time, 31.0);
    assert!(state.is_playing);
    assert!(state.is_loading);
    assert_eq!(state.error, None);
}

// =============================================================================
// Position Store Tests
// =============================================================================

#[test]
fn test_position_threshold() {
    let (store, _) = clock_store();
    store.save("id", 25.0);
    assert_eq!(store.get("id"), 0.0);

    store.save("id", 45.0);
    assert_eq!(store.get("id"), 45.0);
}

#[test]
fn test_position_expires_after_a_day() {
    let (store, clock) = clock_store();
    store.save("id", 45.0);
    clock.advance(Duration::from_secs(24 * 60 * 60 + 1));
    assert_eq!(store.get("id"), 0.0);
}

// =============================================================================
// Navigation Tests
// =============================================================================

#[test]
fn test_left_presses_clamp_at_back() {
    let mut focus = FocusTarget::PlayPause;
    let mut seen = Vec::new();
    for _ in 0..3 {
        focus = transition(focus, &RemoteEvent::press(RemoteKey::Left)).focus;
        seen.push(focus);
    }
    assert_eq!(
        seen,
        vec![FocusTarget::SeekBackward, FocusTarget::Back, FocusTarget::Back]
    );
}

#[test]
fn test_down_then_up() {
    let focus = transition(FocusTarget::Back, &RemoteEvent::press(RemoteKey::Down)).focus;
    assert_eq!(focus, FocusTarget::Progress);
    let focus = transition(focus, &RemoteEvent::press(RemoteKey::Up)).focus;
    assert_eq!(focus, FocusTarget::PlayPause);
}

// =============================================================================
// Driver Scenario Tests
// =============================================================================

#[test]
fn test_missing_direct_url_off_tv() {
    let (positions, _) = clock_store();
    let (mut driver, sim) = driver(ContentSource::new("v", "", HLS), FormFactor::Handheld, positions);
    driver.initialize(Instant::now());

    assert_eq!(driver.state().error.as_deref(), Some("No valid video URL provided"));
    assert!(!driver.state().is_loading);
    assert!(sim.commands().is_empty());
}

#[test]
fn test_two_rapid_seeks_commit_once() {
    let (positions, _) = clock_store();
    let (mut driver, sim) = driver(ContentSource::new("v", MP4, HLS), FormFactor::Handheld, positions);
    let now = Instant::now();
    driver.initialize(now);
    driver.handle_status(&StatusEvent::new(PrimitiveStatus::ReadyToPlay), now);

    driver.seek(10.0, now);
    driver.seek(20.0, now + Duration::from_millis(50));
    driver.advance(now + Duration::from_secs(2));

    assert_eq!(sim.seeks(), vec![20.0]);
}

#[test]
fn test_two_rapid_scrubs_commit_once() {
    let (positions, _) = clock_store();
    let (mut driver, sim) = driver(ContentSource::new("v", MP4, HLS), FormFactor::Handheld, positions);
    let now = Instant::now();
    driver.initialize(now);

    driver.scrub(10.0, now);
    driver.scrub(20.0, now + Duration::from_millis(200));
    driver.advance(now + Duration::from_secs(2));

    assert_eq!(sim.seeks(), vec![20.0]);
}

#[test]
fn test_ready_resumes_saved_position() {
    let (positions, _) = clock_store();
    positions.save("v", 120.0);
    let (mut driver, sim) = driver(ContentSource::new("v", MP4, HLS), FormFactor::Handheld, positions);

    let now = Instant::now();
    driver.initialize(now);
    driver.handle_status(&StatusEvent::new(PrimitiveStatus::Loading), now);
    driver.handle_status(&StatusEvent::new(PrimitiveStatus::ReadyToPlay), now);
    let playing_before = driver.state().is_playing;

    driver.advance(now + Duration::from_secs(1));

    assert_eq!(sim.current_time(), 120.0);
    assert_eq!(driver.state().is_playing, playing_before);
    assert!(!sim.commands().contains(&PrimitiveCommand::Play));
}

#[test]
fn test_idle_twice_is_idempotent() {
    let (positions, _) = clock_store();
    let (mut driver, _) = driver(ContentSource::new("v", MP4, HLS), FormFactor::Handheld, positions);
    let now = Instant::now();
    driver.initialize(now);
    driver.play_pause();

    let idle = StatusEvent::new(PrimitiveStatus::Idle);
    driver.handle_status(&idle, now);
    let after_first = driver.state().clone();
    driver.handle_status(&idle, now);
    assert_eq!(driver.state(), &after_first);
}

#[test]
fn test_duplicate_ready_is_idempotent() {
    let (positions, _) = clock_store();
    let (mut driver, _) = driver(ContentSource::new("v", MP4, HLS), FormFactor::Handheld, positions);
    let now = Instant::now();
    driver.initialize(now);

    let ready = StatusEvent::new(PrimitiveStatus::ReadyToPlay);
    driver.handle_status(&ready, now);
    let after_first = driver.state().clone();
    driver.handle_status(&ready, now);
    assert_eq!(driver.state(), &after_first);
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_error_then_retry_from_remote() {
    let (positions, _) = clock_store();
    let sim = SimulatedPrimitive::with_duration(600.0);
    let mut session = PlayerSession::new(
        sim.clone(),
        ContentSource::new("v", MP4, HLS),
        FormFactor::Tv,
        PlayerConfig::default(),
        positions,
    );
    let now = Instant::now();
    session.open(None, now);
    sim.emit_error("boom");
    session.handle_status(&StatusEvent::error(None), now);
    assert!(session.state().has_error());

    sim.fail(CommandKind::ReplaceSource);
    session.handle_remote(&RemoteEvent::press(RemoteKey::Select), now);
    assert_eq!(
        session.state().error.as_deref(),
        Some("Failed to retry video playback")
    );

    sim.succeed(CommandKind::ReplaceSource);
    session.handle_remote(&RemoteEvent::press(RemoteKey::Select), now);
    assert!(session.state().error.is_none());
    assert_eq!(sim.source().unwrap().as_str(), MP4);
}

#[tokio::test(start_paused = true)]
async fn test_runner_checkpoints_while_playing() {
    let (positions, _) = clock_store();
    let sim = SimulatedPrimitive::with_duration(600.0);
    let session = PlayerSession::new(
        sim.clone(),
        ContentSource::new("v", MP4, HLS),
        FormFactor::Handheld,
        PlayerConfig::default(),
        positions.clone(),
    );
    let (runner, handle) = SessionRunner::open(session);
    let task = tokio::spawn(runner.run());

    sim.emit_status(PrimitiveStatus::ReadyToPlay);
    handle.press(RemoteKey::Select).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    sim.set_position(40.0);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(positions.get("v"), 40.0);

    handle.send(SessionInput::HardwareBack).await.unwrap();
    let outcome = task.await.unwrap();
    assert_eq!(outcome.snapshot.playback.current_time, 40.0);
}
