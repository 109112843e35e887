use glam::IVec2;
use lamina_core::alloc::HashSet;

use crate::event::{MouseButton, PointerEvent};

/// Last known pointer position and held buttons.
#[derive(Debug, Default)]
pub struct PointerState {
    pos: Option<IVec2>,
    pressed: HashSet<MouseButton>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position before any event has been seen is unknown.
    pub fn position(&self) -> Option<IVec2> {
        self.pos
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    pub fn any_pressed(&self) -> bool {
        !self.pressed.is_empty()
    }

    /// Applies `event` and returns the pointer displacement it caused.
    ///
    /// A button-up for a button that is not held returns `None` and leaves
    /// the state untouched.
    pub fn on_event(&mut self, event: &PointerEvent) -> Option<IVec2> {
        match *event {
            PointerEvent::Move { pos } => Some(self.relocate(pos)),
            PointerEvent::ButtonDown { button, pos } => {
                let rel = self.relocate(pos);
                self.pressed.insert(button);
                Some(rel)
            }
            PointerEvent::ButtonUp { button, pos } => {
                if !self.pressed.remove(&button) {
                    tracing::warn!(?button, "button released without a matching press");
                    return None;
                }
                Some(self.relocate(pos))
            }
            PointerEvent::Scroll { .. } => Some(IVec2::ZERO),
        }
    }

    fn relocate(&mut self, pos: IVec2) -> IVec2 {
        let rel = self.pos.map_or(IVec2::ZERO, |old| pos - old);
        self.pos = Some(pos);
        rel
    }

    /// Forgets held buttons and returns them.
    pub fn release_all(&mut self) -> Vec<MouseButton> {
        self.pressed.drain().collect()
    }
}
