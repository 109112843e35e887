//! Helpers shared by the scene integration tests.

#![allow(dead_code)]

use std::any::Any;

use glam::IVec2;
use lamina_core::{ISize, Pos};
use lamina_scene::input::{KeyCode, Modifiers};
use lamina_scene::{
    Color, ContainerStyle, Coord, Focusable, Hoverable, KeyResponse, Linkable, NodeBuilder, NodeId,
    OriginSpec, Paintable, Scene, SceneLifecycle, Signal, Surface, Widget,
};

pub fn scene(width: i32, height: i32) -> Scene {
    Scene::new(ISize::new(width, height))
}

pub fn at(x: i32, y: i32) -> OriginSpec {
    OriginSpec::at(Coord::Px(x), Coord::Px(y))
}

pub fn leaf(scene: &mut Scene, parent: NodeId, x: i32, y: i32, w: i32, h: i32, color: Color) -> NodeId {
    scene
        .create(NodeBuilder::new(parent, Surface::filled(ISize::new(w, h), color)).origin(at(x, y)))
        .unwrap()
}

pub fn panel(scene: &mut Scene, parent: NodeId, x: i32, y: i32, w: i32, h: i32, color: Color) -> NodeId {
    scene
        .create(
            NodeBuilder::container(parent, ISize::new(w, h), ContainerStyle::new(color))
                .origin(at(x, y)),
        )
        .unwrap()
}

pub fn probe(scene: &mut Scene, parent: NodeId, x: i32, y: i32, probe: Probe) -> NodeId {
    scene
        .create(
            NodeBuilder::new(parent, Surface::new(ISize::new(10, 10)))
                .origin(at(x, y))
                .widget(probe),
        )
        .unwrap()
}

pub fn pixel(scene: &Scene, node: NodeId, x: i32, y: i32) -> Option<Color> {
    scene.node(node).unwrap().surface().get(Pos::new(x, y))
}

pub fn signals_of(scene: &Scene, node: NodeId) -> Vec<Signal> {
    scene.signals().for_node(node).collect()
}

/// Paints its whole surface with one color.
pub struct Fill {
    pub color: Color,
    pub paints: u32,
}

impl Fill {
    pub fn new(color: Color) -> Self {
        Self { color, paints: 0 }
    }
}

impl Widget for Fill {
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

impl Paintable for Fill {
    fn paint(&mut self, surface: &mut Surface) {
        self.paints += 1;
        surface.fill(self.color);
    }
}

/// Widget with switchable capabilities that records every callback.
#[derive(Default)]
pub struct Probe {
    pub hover: bool,
    pub focus: bool,
    pub link: bool,
    pub listen: bool,
    pub handle_keys: bool,
    pub hovers: u32,
    pub unhovers: u32,
    pub focused: bool,
    pub linked: bool,
    pub motion: IVec2,
    pub keys: Vec<KeyCode>,
    pub opened: u32,
    pub closed: u32,
}

impl Probe {
    pub fn hoverable() -> Self {
        Self {
            hover: true,
            ..Self::default()
        }
    }

    pub fn focusable() -> Self {
        Self {
            focus: true,
            ..Self::default()
        }
    }

    pub fn linkable() -> Self {
        Self {
            link: true,
            ..Self::default()
        }
    }

    pub fn listener() -> Self {
        Self {
            listen: true,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            hover: true,
            focus: true,
            link: true,
            ..Self::default()
        }
    }
}

impl Widget for Probe {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_hoverable(&mut self) -> Option<&mut dyn Hoverable> {
        if self.hover { Some(self) } else { None }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        if self.focus { Some(self) } else { None }
    }

    fn as_linkable(&mut self) -> Option<&mut dyn Linkable> {
        if self.link { Some(self) } else { None }
    }

    fn as_scene_listener(&mut self) -> Option<&mut dyn SceneLifecycle> {
        if self.listen { Some(self) } else { None }
    }
}

impl Hoverable for Probe {
    fn on_hover(&mut self) {
        self.hovers += 1;
    }

    fn on_unhover(&mut self) {
        self.unhovers += 1;
    }
}

impl Focusable for Probe {
    fn on_focus(&mut self) {
        self.focused = true;
    }

    fn on_defocus(&mut self) {
        self.focused = false;
    }

    fn on_key_down(&mut self, code: KeyCode, _modifiers: Modifiers) -> KeyResponse {
        self.keys.push(code);
        if self.handle_keys {
            KeyResponse::Handled
        } else {
            KeyResponse::Ignored
        }
    }
}

impl Linkable for Probe {
    fn on_link(&mut self) {
        self.linked = true;
    }

    fn on_link_motion(&mut self, rel: IVec2) {
        self.motion += rel;
    }

    fn on_unlink(&mut self) {
        self.linked = false;
    }
}

impl SceneLifecycle for Probe {
    fn on_scene_open(&mut self) {
        self.opened += 1;
    }

    fn on_scene_close(&mut self) {
        self.closed += 1;
    }
}
