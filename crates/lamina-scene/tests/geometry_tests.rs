//! Geometry tests: absolute rects, clip windows, origins and locks.

mod common;

use common::{at, leaf, panel, scene, signals_of};
use lamina_core::{Edge, ISize, Location, Pos, Rect};
use lamina_scene::{Color, Coord, LockFlags, NodeBuilder, OriginSpec, OriginUpdate, Signal, Surface};

#[test]
fn test_abs_rect_follows_parent() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let container = panel(&mut scene, root, 10, 20, 100, 100, Color::WHITE);
    let child = leaf(&mut scene, container, 5, 5, 10, 10, Color::RED);

    assert_eq!(scene.node(child).unwrap().abs_rect(), Rect::new(15, 25, 10, 10));

    scene.move_by(container, 10, 0).unwrap();
    let view = scene.node(child).unwrap();
    assert_eq!(view.rect(), Rect::new(5, 5, 10, 10));
    assert_eq!(view.abs_rect(), Rect::new(25, 25, 10, 10));
    assert_eq!(view.abs_hitbox(), view.hitbox().offset(Pos::new(20, 20)));
}

#[test]
fn test_hitbox_clipped_by_window() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let node = leaf(&mut scene, root, 0, 0, 50, 50, Color::RED);

    scene.set_window(node, Some(Rect::new(10, 10, 20, 20)), true).unwrap();
    assert_eq!(scene.node(node).unwrap().hitbox(), Rect::new(10, 10, 20, 20));
    assert_eq!(scene.node(node).unwrap().auto_hitbox(), Rect::new(10, 10, 20, 20));

    scene.move_by(node, 5, 5).unwrap();
    assert_eq!(scene.node(node).unwrap().hitbox(), Rect::new(15, 15, 20, 20));

    scene.set_window(node, Some(Rect::new(15, 15, 20, 20)), false).unwrap();
    scene.move_by(node, 20, 20).unwrap();
    let view = scene.node(node).unwrap();
    assert_eq!(view.hitbox(), Rect::new(25, 25, 10, 10));
    assert!(view.rect().contains(&view.hitbox()));
}

#[test]
fn test_window_change_emits_signals() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let node = leaf(&mut scene, root, 0, 0, 40, 40, Color::RED);
    scene.drain_signals();

    scene.set_window(node, Some(Rect::new(10, 0, 10, 40)), false).unwrap();
    let signals = signals_of(&scene, node);
    assert!(signals.contains(&Signal::Motion { dx: 10, dy: 0 }));
    assert!(signals.contains(&Signal::Resize {
        old: ISize::new(40, 40)
    }));
}

#[test]
fn test_percent_origin_tracks_parent_resize() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 200, 100, Color::WHITE);
    let child = scene
        .create(
            NodeBuilder::new(container, Surface::new(ISize::new(10, 10)))
                .origin(OriginSpec::at(Coord::Percent(50), Coord::Percent(50))),
        )
        .unwrap();
    assert_eq!(scene.node(child).unwrap().rect().topleft(), Pos::new(100, 50));

    scene.drain_signals();
    scene.resize(container, ISize::new(300, 100)).unwrap();
    assert_eq!(scene.node(child).unwrap().rect().topleft(), Pos::new(150, 50));
    assert!(signals_of(&scene, child).contains(&Signal::Motion { dx: 50, dy: 0 }));
    assert!(signals_of(&scene, container).contains(&Signal::Resize {
        old: ISize::new(200, 100)
    }));
}

#[test]
fn test_centered_origin_keeps_anchor_on_resize() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let node = scene
        .create(
            NodeBuilder::new(root, Surface::new(ISize::new(20, 20)))
                .origin(at(100, 100).location(Location::Center)),
        )
        .unwrap();
    assert_eq!(scene.node(node).unwrap().rect(), Rect::new(90, 90, 20, 20));

    scene.resize(node, ISize::new(40, 10)).unwrap();
    assert_eq!(scene.node(node).unwrap().rect(), Rect::new(80, 95, 40, 10));
}

#[test]
fn test_sibling_reference_follows_motion() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let a = leaf(&mut scene, root, 10, 10, 20, 20, Color::RED);
    let b = scene
        .create(
            NodeBuilder::new(root, Surface::new(ISize::new(5, 5))).origin(
                at(5, 0)
                    .reference(a)
                    .reference_location(Location::TopRight),
            ),
        )
        .unwrap();
    assert_eq!(scene.node(b).unwrap().rect().topleft(), Pos::new(35, 10));

    scene.move_by(a, 10, 0).unwrap();
    assert_eq!(scene.node(b).unwrap().rect().topleft(), Pos::new(45, 10));
    assert_eq!(scene.node(b).unwrap().origin().asked_pos(), [Coord::Px(5), Coord::Px(0)]);
}

#[test]
fn test_moved_node_keeps_position_when_parent_resizes() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let node = leaf(&mut scene, root, 10, 10, 20, 20, Color::RED);

    scene.move_by(node, 10, 0).unwrap();
    let origin = *scene.node(node).unwrap().origin();
    assert_eq!(origin.asked_pos(), [Coord::Px(20), Coord::Px(10)]);

    scene.resize(root, ISize::new(500, 400)).unwrap();
    assert_eq!(scene.node(node).unwrap().rect().topleft(), Pos::new(20, 10));
}

#[test]
fn test_moved_percent_node_is_not_pulled_back() {
    let mut scene = scene(200, 200);
    let root = scene.root();
    let node = scene
        .create(
            NodeBuilder::new(root, Surface::new(ISize::new(10, 10)))
                .origin(OriginSpec::at(Coord::Percent(50), Coord::Px(0))),
        )
        .unwrap();
    scene.move_by(node, 7, 0).unwrap();
    assert_eq!(scene.origin_target(node).unwrap(), Some(Pos::new(107, 0)));

    scene.resize(root, ISize::new(300, 200)).unwrap();
    assert_eq!(scene.node(node).unwrap().rect().topleft(), Pos::new(107, 0));
}

#[test]
fn test_reference_cycle_settles() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let a = leaf(&mut scene, root, 0, 0, 10, 10, Color::RED);
    let b = scene
        .create(
            NodeBuilder::new(root, Surface::new(ISize::new(10, 10)))
                .origin(at(30, 0).reference(a)),
        )
        .unwrap();
    scene
        .configure_origin(a, OriginUpdate::default().pos(Coord::Px(-30), Coord::Px(0)).reference(Some(b)))
        .unwrap();
    assert_eq!(scene.node(a).unwrap().rect().topleft(), Pos::new(0, 0));

    scene.move_by(a, 10, 0).unwrap();
    assert_eq!(scene.node(a).unwrap().rect().topleft(), Pos::new(10, 0));
    assert_eq!(scene.node(b).unwrap().rect().topleft(), Pos::new(40, 0));
}

#[test]
fn test_reference_must_not_be_self_or_descendant() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 100, 100, Color::WHITE);
    let child = leaf(&mut scene, container, 0, 0, 10, 10, Color::RED);

    let err = scene
        .configure_origin(container, OriginUpdate::default().reference(Some(child)))
        .unwrap_err();
    assert!(err.is_invariant());
    let err = scene
        .configure_origin(child, OriginUpdate::default().reference(Some(child)))
        .unwrap_err();
    assert!(err.is_invariant());
}

#[test]
fn test_killed_reference_falls_back_to_parent() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let a = leaf(&mut scene, root, 50, 50, 10, 10, Color::RED);
    let b = scene
        .create(NodeBuilder::new(root, Surface::new(ISize::new(5, 5))).origin(at(5, 5).reference(a)))
        .unwrap();
    assert_eq!(scene.node(b).unwrap().rect().topleft(), Pos::new(55, 55));

    scene.kill(a).unwrap();
    let view = scene.node(b).unwrap();
    assert_eq!(view.origin().reference(), None);
    assert_eq!(Some(view.rect().topleft()), scene.origin_target(b).unwrap());
}

#[test]
fn test_locked_origin_refuses_moves() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let node = leaf(&mut scene, root, 10, 10, 10, 10, Color::RED);
    scene.set_lock(node, LockFlags::ORIGIN, true).unwrap();

    let err = scene.move_by(node, 5, 5).unwrap_err();
    assert!(err.is_not_permitted());
    assert_eq!(scene.node(node).unwrap().rect().topleft(), Pos::new(10, 10));

    // a zero move never fails
    scene.move_by(node, 0, 0).unwrap();

    scene
        .configure_origin(node, OriginUpdate::default().locked(false).pos(Coord::Px(30), Coord::Px(30)))
        .unwrap();
    assert_eq!(scene.node(node).unwrap().rect().topleft(), Pos::new(30, 30));
    assert!(!scene.node(node).unwrap().locks().origin());
}

#[test]
fn test_move_to_and_move_edge() {
    let mut scene = scene(400, 300);
    let root = scene.root();
    let node = leaf(&mut scene, root, 0, 0, 20, 10, Color::RED);

    scene.move_to(node, Location::Center, Pos::new(100, 100)).unwrap();
    assert_eq!(scene.node(node).unwrap().rect(), Rect::new(90, 95, 20, 10));

    scene.move_edge(node, Edge::Right, 50).unwrap();
    assert_eq!(scene.node(node).unwrap().rect().right(), 50);
    scene.move_edge(node, Edge::Bottom, 40).unwrap();
    assert_eq!(scene.node(node).unwrap().rect(), Rect::new(30, 30, 20, 10));
}

#[test]
fn test_root_cannot_move() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    assert!(scene.move_by(root, 1, 1).is_err());
}
