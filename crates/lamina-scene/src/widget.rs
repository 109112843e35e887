//! Capability traits for node behaviour.
//!
//! Every node carries a `Box<dyn Widget>`. The scene never inspects concrete
//! types: it asks the widget for optional capabilities and dispatches through
//! whatever comes back, in the same way a layout engine asks a widget
//! whether it is a container.
//!
//! ```ignore
//! struct Handle { grabbed: bool }
//!
//! impl Widget for Handle {
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//!     fn as_linkable(&mut self) -> Option<&mut dyn Linkable> { Some(self) }
//! }
//!
//! impl Linkable for Handle {
//!     fn on_link(&mut self) { self.grabbed = true; }
//!     fn on_unlink(&mut self) { self.grabbed = false; }
//! }
//! ```

use std::any::Any;

use glam::IVec2;
use lamina_input::{KeyCode, Modifiers};

use crate::surface::Surface;

pub trait Widget: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Widgets that draw their own surface.
    fn as_paintable(&mut self) -> Option<&mut dyn Paintable> {
        None
    }

    fn as_hoverable(&mut self) -> Option<&mut dyn Hoverable> {
        None
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }

    fn as_linkable(&mut self) -> Option<&mut dyn Linkable> {
        None
    }

    /// Widgets notified when their scene opens or closes.
    fn as_scene_listener(&mut self) -> Option<&mut dyn SceneLifecycle> {
        None
    }
}

pub trait Paintable {
    /// Redraws the node surface. The surface size matches the node rect.
    fn paint(&mut self, surface: &mut Surface);
}

pub trait Hoverable {
    fn on_hover(&mut self) {}
    fn on_unhover(&mut self) {}
}

/// Whether a focused widget consumed a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Handled,
    Ignored,
}

pub trait Focusable {
    fn on_focus(&mut self) {}
    fn on_defocus(&mut self) {}

    /// Returning [`KeyResponse::Ignored`] lets the scene apply its default
    /// focus navigation keys.
    fn on_key_down(&mut self, _code: KeyCode, _modifiers: Modifiers) -> KeyResponse {
        KeyResponse::Ignored
    }

    fn on_key_up(&mut self, _code: KeyCode) {}
}

pub trait Linkable {
    fn on_link(&mut self) {}
    fn on_link_motion(&mut self, _rel: IVec2) {}
    fn on_unlink(&mut self) {}
}

pub trait SceneLifecycle {
    fn on_scene_open(&mut self) {}
    fn on_scene_close(&mut self) {}
}

/// Behaviourless widget used for plain nodes and containers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Inert;

impl Widget for Inert {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
