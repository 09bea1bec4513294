#![allow(clippy::float_cmp)]

use super::*;

fn rect() -> Rect {
    Rect { left: 100.0, top: 100.0, width: 200.0, height: 100.0 }
}

#[test]
fn corner_when_near_two_sides() {
    let handle = ResizeHandle::nearest(&rect(), Point::new(295.0, 195.0), 20.0);
    assert_eq!(handle, ResizeHandle { horizontal: Some(HSide::Right), vertical: Some(VSide::Bottom) });
}

#[test]
fn top_left_corner() {
    let handle = ResizeHandle::nearest(&rect(), Point::new(90.0, 110.0), 20.0);
    assert_eq!(handle, ResizeHandle { horizontal: Some(HSide::Left), vertical: Some(VSide::Top) });
}

#[test]
fn edge_when_near_one_side() {
    let handle = ResizeHandle::nearest(&rect(), Point::new(299.0, 150.0), 20.0);
    assert_eq!(handle, ResizeHandle { horizontal: Some(HSide::Right), vertical: None });
}

#[test]
fn bottom_edge_only() {
    let handle = ResizeHandle::nearest(&rect(), Point::new(200.0, 210.0), 20.0);
    assert_eq!(handle, ResizeHandle { horizontal: None, vertical: Some(VSide::Bottom) });
}

#[test]
fn threshold_is_inclusive() {
    let handle = ResizeHandle::nearest(&rect(), Point::new(280.0, 150.0), 20.0);
    assert_eq!(handle.horizontal, Some(HSide::Right));
}

#[test]
fn interior_point_falls_back_to_nearest_side() {
    // 40px from the left edge, 50px from top and bottom.
    let handle = ResizeHandle::nearest(&rect(), Point::new(140.0, 150.0), 20.0);
    assert_eq!(handle, ResizeHandle { horizontal: Some(HSide::Left), vertical: None });
}

#[test]
fn interior_point_prefers_vertical_when_closer() {
    // 70px from the left edge, 30px from the top.
    let handle = ResizeHandle::nearest(&rect(), Point::new(170.0, 130.0), 20.0);
    assert_eq!(handle, ResizeHandle { horizontal: None, vertical: Some(VSide::Top) });
}

#[test]
fn side_signs() {
    assert_eq!(HSide::Left.sign(), -1.0);
    assert_eq!(HSide::Right.sign(), 1.0);
    assert_eq!(VSide::Top.sign(), -1.0);
    assert_eq!(VSide::Bottom.sign(), 1.0);
}
