use lamina_core::alloc::HashSet;

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// Pressed keys and the current modifier mask.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    modifiers: Modifiers,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event. Returns `false` when the event should be dropped:
    /// a key-up whose key-down was never observed.
    pub fn on_event(&mut self, event: &KeyEvent) -> bool {
        match *event {
            KeyEvent::KeyDown { code, modifiers } => {
                self.modifiers = modifiers;
                if let Some(bit) = code.modifier() {
                    self.modifiers.insert(bit);
                }
                self.pressed.insert(code);
                true
            }
            KeyEvent::KeyUp { code } => {
                if !self.pressed.remove(&code) {
                    tracing::debug!(?code, "key released without a matching press");
                    return false;
                }
                if let Some(bit) = code.modifier() {
                    self.modifiers.remove(bit);
                }
                true
            }
        }
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.pressed.iter().copied()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Forgets every pressed key and returns the ones that were held.
    pub fn release_all(&mut self) -> Vec<KeyCode> {
        self.modifiers = Modifiers::empty();
        self.pressed.drain().collect()
    }
}
