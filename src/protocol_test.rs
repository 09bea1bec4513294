use canvas::camera::Point;
use canvas::doc::{DrawPoint, ObjectKind, OverlayObject, Stroke, StrokeMode};
use serde_json::json;

use super::*;

fn circle() -> OverlayObject {
    OverlayObject {
        id: "c1".into(),
        x: 10.0,
        y: 20.0,
        width: 150.0,
        height: 100.0,
        kind: ObjectKind::Circle { color: "#f00".into(), stroke_width: 2.0, rotation: 0.0 },
    }
}

#[test]
fn draw_progress_becomes_draw() {
    let point = DrawPoint { x: 1.0, y: 2.0, mode: StrokeMode::Erase, color: "#000".into(), size: 4.0, begin: true };
    let message = action_to_message(&Action::DrawProgress(point)).expect("encode");
    assert_eq!(message.kind, "draw");
    assert_eq!(
        message.payload,
        json!({"x": 1.0, "y": 2.0, "mode": "erase", "color": "#000", "size": 4.0, "begin": true})
    );
}

#[test]
fn finished_stroke_becomes_stroke_add() {
    let stroke = Stroke {
        mode: StrokeMode::Draw,
        color: "#000".into(),
        size: 4.0,
        path: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
    };
    let message = action_to_message(&Action::StrokeAdded(stroke)).expect("encode");
    assert_eq!(message.kind, "stroke-add");
    assert_eq!(message.payload["path"], json!([{"x": 0.0, "y": 0.0}, {"x": 10.0, "y": 10.0}]));
}

#[test]
fn object_actions_carry_whole_object() {
    let add = action_to_message(&Action::ObjectAdded(circle())).expect("encode");
    assert_eq!(add.kind, "object-add");
    assert_eq!(add.payload["type"], "circle");
    assert_eq!(add.payload["strokeWidth"], 2.0);

    let update = action_to_message(&Action::ObjectUpdated(circle())).expect("encode");
    assert_eq!(update.kind, "object-update");
    assert!(update.carries_object_type());
}

#[test]
fn delete_carries_only_id() {
    let message = action_to_message(&Action::ObjectDeleted("c1".into())).expect("encode");
    assert_eq!(message.kind, "object-delete");
    assert_eq!(message.payload, json!({"id": "c1"}));
}
