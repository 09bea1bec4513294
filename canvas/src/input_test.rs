#![allow(clippy::float_cmp)]

use super::*;

fn drawing() -> Gesture {
    Gesture::Drawing { stroke: Stroke { path: vec![Point::new(1.0, 1.0)], ..Stroke::default() } }
}

fn dragging() -> Gesture {
    Gesture::Dragging { id: "a".to_owned(), start_screen: Point::new(0.0, 0.0), orig_x: 0.0, orig_y: 0.0 }
}

// =============================================================
// Mode
// =============================================================

#[test]
fn mode_default_is_select() {
    assert_eq!(Mode::default(), Mode::Select);
}

#[test]
fn stroke_mode_only_for_freehand_modes() {
    assert_eq!(Mode::Draw.stroke_mode(), Some(StrokeMode::Draw));
    assert_eq!(Mode::Erase.stroke_mode(), Some(StrokeMode::Erase));
    assert_eq!(Mode::Move.stroke_mode(), None);
    assert_eq!(Mode::Text.stroke_mode(), None);
}

#[test]
fn creation_modes() {
    for mode in [Mode::Text, Mode::Image, Mode::Audio, Mode::Location, Mode::Circle, Mode::Rectangle] {
        assert!(mode.is_creation(), "{mode:?} should create");
    }
    for mode in [Mode::Select, Mode::View, Mode::Draw, Mode::Erase, Mode::Move, Mode::Resize, Mode::Rotate, Mode::Delete] {
        assert!(!mode.is_creation(), "{mode:?} should not create");
    }
}

// =============================================================
// Settings
// =============================================================

#[test]
fn settings_defaults() {
    let s = Settings::default();
    assert_eq!(s.mode, Mode::Select);
    assert_eq!(s.zoom, 100.0);
    assert_eq!(s.size, 33.0);
    assert_eq!(s.color, "#000000");
    assert_eq!(s.font_size, 16.0);
    assert!(s.font_family.starts_with("Inter"));
}

#[test]
fn reduce_sets_each_field() {
    let s = Settings::default()
        .reduce(SettingsAction::SetMode(Mode::Draw))
        .reduce(SettingsAction::SetZoom(150.0))
        .reduce(SettingsAction::SetSize(4.0))
        .reduce(SettingsAction::SetColor("#ff0000".into()))
        .reduce(SettingsAction::SetFontSize(24.0))
        .reduce(SettingsAction::SetFontFamily("serif".into()));
    assert_eq!(s.mode, Mode::Draw);
    assert_eq!(s.zoom, 150.0);
    assert_eq!(s.size, 4.0);
    assert_eq!(s.color, "#ff0000");
    assert_eq!(s.font_size, 24.0);
    assert_eq!(s.font_family, "serif");
}

#[test]
fn reduce_leaves_other_fields_untouched() {
    let before = Settings::default();
    let after = before.clone().reduce(SettingsAction::SetColor("#123456".into()));
    assert_eq!(after.mode, before.mode);
    assert_eq!(after.zoom, before.zoom);
    assert_eq!(after.font_family, before.font_family);
}

#[test]
fn reduce_clamps_zoom() {
    assert_eq!(Settings::default().reduce(SettingsAction::SetZoom(0.0)).zoom, 10.0);
    assert_eq!(Settings::default().reduce(SettingsAction::SetZoom(-50.0)).zoom, 10.0);
    assert_eq!(Settings::default().reduce(SettingsAction::SetZoom(10_000.0)).zoom, 500.0);
}

#[test]
fn reduce_ignores_non_finite_zoom() {
    assert_eq!(Settings::default().reduce(SettingsAction::SetZoom(f64::NAN)).zoom, 100.0);
}

#[test]
fn style_actions() {
    assert!(SettingsAction::SetColor("#fff".into()).is_style());
    assert!(SettingsAction::SetFontSize(12.0).is_style());
    assert!(SettingsAction::SetFontFamily("mono".into()).is_style());
    assert!(!SettingsAction::SetZoom(100.0).is_style());
    assert!(!SettingsAction::SetMode(Mode::Draw).is_style());
    assert!(!SettingsAction::SetSize(3.0).is_style());
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
    assert!(!InputState::default().is_active());
}

#[test]
fn start_activates_from_idle() {
    let mut state = InputState::Idle;
    assert!(state.start(drawing()));
    assert!(state.is_active());
}

#[test]
fn start_refuses_while_active() {
    let mut state = InputState::Idle;
    assert!(state.start(drawing()));
    assert!(!state.start(dragging()));
    assert_eq!(state, InputState::Active(drawing()));
}

#[test]
fn finish_returns_gesture_once() {
    let mut state = InputState::Idle;
    state.start(dragging());
    assert_eq!(state.finish(), Some(dragging()));
    assert_eq!(state.finish(), None);
    assert_eq!(state, InputState::Idle);
}

#[test]
fn active_mut_allows_in_place_updates() {
    let mut state = InputState::Idle;
    state.start(drawing());
    if let Some(Gesture::Drawing { stroke }) = state.active_mut() {
        stroke.path.push(Point::new(2.0, 2.0));
    }
    let Some(Gesture::Drawing { stroke }) = state.finish() else {
        panic!("expected drawing gesture");
    };
    assert_eq!(stroke.path.len(), 2);
}

#[test]
fn active_mut_is_none_when_idle() {
    let mut state = InputState::Idle;
    assert!(state.active_mut().is_none());
}
