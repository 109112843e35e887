//! Damage tracking and compositing tests.

mod common;

use std::any::Any;

use common::{leaf, panel, pixel, scene, Fill};
use lamina_core::{ISize, Pos, Rect};
use lamina_scene::{
    Border, Color, DirtyState, Level, NodeBuilder, Paintable, Scene, Surface, Widget,
};

/// Settles the initial damage so tests start from a clean scene.
fn settled(scene: &mut Scene) {
    scene.render_frame().unwrap();
}

#[test]
fn test_recomposite_blits_changed_child() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 50, 50, Color::WHITE);
    let child = leaf(&mut scene, container, 5, 5, 10, 10, Color::RED);
    settled(&mut scene);
    assert_eq!(pixel(&scene, container, 7, 7), Some(Color::RED));

    scene
        .set_surface(child, Surface::filled(ISize::new(10, 10), Color::BLUE))
        .unwrap();
    scene.request_repaint(container, Rect::new(5, 5, 10, 10)).unwrap();
    let repainted = scene.recomposite(container).unwrap();

    assert_eq!(repainted, Some(Rect::new(5, 5, 10, 10)));
    assert_eq!(pixel(&scene, container, 7, 7), Some(Color::BLUE));
    assert_eq!(pixel(&scene, container, 20, 20), Some(Color::WHITE));
    assert_eq!(scene.node(container).unwrap().pending_repaint(), None);
    assert_eq!(
        scene.node(root).unwrap().pending_repaint(),
        Some(Rect::new(5, 5, 10, 10))
    );
}

#[test]
fn test_recomposite_without_damage_is_noop() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 50, 50, Color::WHITE);
    settled(&mut scene);
    assert_eq!(scene.recomposite(container).unwrap(), None);
}

#[test]
fn test_repaint_requests_union_in_any_order() {
    let rects = [Rect::new(0, 0, 5, 5), Rect::new(20, 10, 5, 5)];
    let mut pending = Vec::new();
    for order in [[0, 1], [1, 0]] {
        let mut scene = scene(100, 100);
        let root = scene.root();
        let container = panel(&mut scene, root, 0, 0, 50, 50, Color::WHITE);
        settled(&mut scene);
        for index in order {
            scene.request_repaint(container, rects[index]).unwrap();
        }
        pending.push(scene.node(container).unwrap().pending_repaint());
    }
    assert_eq!(pending[0], pending[1]);
    assert_eq!(pending[0], Some(Rect::new(0, 0, 25, 15)));
}

#[test]
fn test_repaint_outside_hitbox_is_dropped() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 50, 50, Color::WHITE);
    scene
        .set_window(container, Some(Rect::new(0, 0, 20, 20)), false)
        .unwrap();
    settled(&mut scene);

    scene.request_repaint(container, Rect::new(30, 30, 5, 5)).unwrap();
    assert_eq!(scene.node(container).unwrap().pending_repaint(), None);

    scene.request_repaint(container, Rect::new(15, 15, 10, 10)).unwrap();
    assert_eq!(
        scene.node(container).unwrap().pending_repaint(),
        Some(Rect::new(15, 15, 5, 5))
    );
}

#[test]
fn test_damage_bubbles_to_display() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let outer = panel(&mut scene, root, 10, 10, 60, 60, Color::WHITE);
    let inner = panel(&mut scene, outer, 5, 5, 30, 30, Color::WHITE);
    let node = leaf(&mut scene, inner, 1, 1, 4, 4, Color::RED);
    let first = scene.render_frame().unwrap();
    assert!(first.contains(&Rect::new(0, 0, 100, 100)));
    assert_eq!(scene.display_surface().get(Pos::new(17, 17)), Some(Color::RED));

    scene
        .set_surface(node, Surface::filled(ISize::new(4, 4), Color::GREEN))
        .unwrap();
    let damaged = scene.render_frame().unwrap();
    assert_eq!(damaged, vec![Rect::new(16, 16, 4, 4)]);
    assert_eq!(scene.display_surface().get(Pos::new(17, 17)), Some(Color::GREEN));
    assert_eq!(scene.display_surface().get(Pos::new(21, 21)), Some(Color::WHITE));
}

#[test]
fn test_moving_a_node_repaints_both_places() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let node = leaf(&mut scene, root, 0, 0, 10, 10, Color::RED);
    settled(&mut scene);

    scene.move_by(node, 20, 0).unwrap();
    let damaged = scene.render_frame().unwrap();
    assert_eq!(damaged, vec![Rect::new(0, 0, 30, 10)]);
    assert_eq!(scene.display_surface().get(Pos::new(5, 5)), Some(Color::WHITE));
    assert_eq!(scene.display_surface().get(Pos::new(25, 5)), Some(Color::RED));
}

#[test]
fn test_hidden_container_keeps_damage() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 50, 50, Color::GRAY);
    settled(&mut scene);
    assert_eq!(scene.display_surface().get(Pos::new(5, 5)), Some(Color::GRAY));

    scene.hide(container).unwrap();
    scene.request_repaint(container, Rect::new(0, 0, 10, 10)).unwrap();
    assert_eq!(scene.recomposite(container).unwrap(), None);
    assert_eq!(
        scene.node(container).unwrap().pending_repaint(),
        Some(Rect::new(0, 0, 10, 10))
    );
    let damaged = scene.render_frame().unwrap();
    assert_eq!(scene.display_surface().get(Pos::new(5, 5)), Some(Color::WHITE));
    assert!(damaged.contains(&Rect::new(0, 0, 50, 50)));
}

#[test]
fn test_paintable_widgets_paint_once() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let node = scene
        .create(NodeBuilder::new(root, Surface::new(ISize::new(10, 10))).widget(Fill::new(Color::BLUE)))
        .unwrap();
    assert_eq!(scene.node(node).unwrap().dirty_state(), DirtyState::RepaintOnce);

    settled(&mut scene);
    settled(&mut scene);
    assert_eq!(scene.widget_as::<Fill>(node).unwrap().unwrap().paints, 1);
    assert_eq!(scene.node(node).unwrap().dirty_state(), DirtyState::Clean);
    assert_eq!(scene.display_surface().get(Pos::new(3, 3)), Some(Color::BLUE));

    scene.widget_mut::<Fill>(node).unwrap().unwrap().color = Color::GREEN;
    scene.request_paint(node).unwrap();
    settled(&mut scene);
    assert_eq!(scene.display_surface().get(Pos::new(3, 3)), Some(Color::GREEN));
}

#[test]
fn test_always_repaint_node_paints_every_frame() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let node = scene
        .create(
            NodeBuilder::new(root, Surface::new(ISize::new(10, 10)))
                .widget(Fill::new(Color::BLUE))
                .dirty(DirtyState::AlwaysRepaint),
        )
        .unwrap();
    for _ in 0..3 {
        let damaged = scene.render_frame().unwrap();
        assert!(!damaged.is_empty());
    }
    assert_eq!(scene.widget_as::<Fill>(node).unwrap().unwrap().paints, 3);

    scene.set_dirty(node, DirtyState::Clean).unwrap();
    assert!(scene.render_frame().unwrap().is_empty());
}

#[test]
fn test_always_repaint_container_ignores_requests() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 50, 50, Color::WHITE);
    scene.set_dirty(container, DirtyState::AlwaysRepaint).unwrap();
    settled(&mut scene);

    scene.request_repaint(container, Rect::new(0, 0, 5, 5)).unwrap();
    assert_eq!(scene.node(container).unwrap().pending_repaint(), None);
    let damaged = scene.render_frame().unwrap();
    assert_eq!(damaged, vec![Rect::new(0, 0, 50, 50)]);
}

#[test]
fn test_foreground_paints_over_mainground() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    scene
        .create(
            NodeBuilder::new(root, Surface::filled(ISize::new(10, 10), Color::RED))
                .level(Level::Foreground),
        )
        .unwrap();
    leaf(&mut scene, root, 0, 0, 10, 10, Color::BLUE);
    settled(&mut scene);
    assert_eq!(scene.display_surface().get(Pos::new(5, 5)), Some(Color::RED));
}

#[test]
fn test_background_and_border() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let container = panel(&mut scene, root, 0, 0, 20, 20, Color::WHITE);
    scene
        .set_border(
            container,
            Some(Border {
                color: Color::BLACK,
                width: 2,
            }),
        )
        .unwrap();
    scene.set_background(container, Color::GRAY).unwrap();
    settled(&mut scene);
    assert_eq!(pixel(&scene, container, 1, 1), Some(Color::BLACK));
    assert_eq!(pixel(&scene, container, 10, 10), Some(Color::GRAY));
}

#[test]
fn test_frozen_scene_renders_nothing() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    leaf(&mut scene, root, 0, 0, 10, 10, Color::RED);
    scene.freeze();
    assert!(scene.render_frame().unwrap().is_empty());
    scene.thaw();
    assert!(!scene.render_frame().unwrap().is_empty());
}

/// Swaps in an undersized surface on its first paint, the way a widget
/// racing a resize would.
struct Shrinking {
    painted: u32,
}

impl Widget for Shrinking {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_paintable(&mut self) -> Option<&mut dyn Paintable> {
        Some(self)
    }
}

impl Paintable for Shrinking {
    fn paint(&mut self, surface: &mut Surface) {
        self.painted += 1;
        if self.painted == 1 {
            *surface = Surface::filled(ISize::new(6, 6), Color::RED);
        } else {
            surface.fill(Color::GREEN);
        }
    }
}

#[test]
fn test_out_of_sync_surface_recovers() {
    let mut scene = scene(100, 100);
    let root = scene.root();
    let node = scene
        .create(
            NodeBuilder::new(root, Surface::new(ISize::new(10, 10)))
                .origin(common::at(20, 20))
                .widget(Shrinking { painted: 0 }),
        )
        .unwrap();

    scene.render_frame().unwrap();
    let view = scene.node(node).unwrap();
    assert_eq!(view.rect(), Rect::new(20, 20, 6, 6));
    assert_eq!(view.dirty_state(), DirtyState::RepaintOnce);

    scene.render_frame().unwrap();
    assert_eq!(scene.widget_as::<Shrinking>(node).unwrap().unwrap().painted, 2);
    assert_eq!(scene.display_surface().get(Pos::new(22, 22)), Some(Color::GREEN));
    assert_eq!(scene.display_surface().get(Pos::new(27, 27)), Some(Color::WHITE));
}
