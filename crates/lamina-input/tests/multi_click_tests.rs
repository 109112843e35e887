//! Multi-click detection scenarios.
//!
//! Presses are timestamped explicitly so the thresholds can be exercised
//! without sleeping.

use std::time::{Duration, Instant};

use glam::IVec2;
use lamina_input::{ClickHistory, ClickKind, ClickRecord, MouseButton};

fn press(at: Instant, button: MouseButton) -> ClickRecord {
    ClickRecord {
        at,
        button,
        pos: IVec2::new(40, 40),
    }
}

#[test]
fn test_double_then_triple_click() {
    let mut history = ClickHistory::default();
    let t0 = Instant::now();

    assert_eq!(history.record(press(t0, MouseButton::Left)), ClickKind::Single);

    history.record(press(t0 + Duration::from_millis(200), MouseButton::Left));
    assert!(history.has_double_clicked());
    assert!(!history.has_triple_clicked());

    history.record(press(t0 + Duration::from_millis(500), MouseButton::Left));
    assert!(history.has_double_clicked());
    assert!(history.has_triple_clicked());
}

#[test]
fn test_slow_second_press_is_single() {
    let mut history = ClickHistory::default();
    let t0 = Instant::now();

    history.record(press(t0, MouseButton::Left));
    history.record(press(t0 + Duration::from_millis(600), MouseButton::Left));

    assert!(!history.has_double_clicked());
    assert!(!history.has_triple_clicked());
}

#[test]
fn test_different_button_is_single() {
    let mut history = ClickHistory::default();
    let t0 = Instant::now();

    history.record(press(t0, MouseButton::Left));
    let kind = history.record(press(t0 + Duration::from_millis(100), MouseButton::Right));

    assert_eq!(kind, ClickKind::Single);
}

#[test]
fn test_triple_needs_first_press_within_window() {
    let mut history = ClickHistory::default();
    let t0 = Instant::now();

    history.record(press(t0, MouseButton::Left));
    history.record(press(t0 + Duration::from_millis(700), MouseButton::Left));
    // double with the second press, but the first is 1.1s old
    let kind = history.record(press(t0 + Duration::from_millis(1100), MouseButton::Left));

    assert_eq!(kind, ClickKind::Double);
}

#[test]
fn test_custom_thresholds() {
    let mut history = ClickHistory::new(Duration::from_millis(100), Duration::from_millis(150));
    let t0 = Instant::now();

    history.record(press(t0, MouseButton::Middle));
    let kind = history.record(press(t0 + Duration::from_millis(120), MouseButton::Middle));

    assert_eq!(kind, ClickKind::Single);
}
