use bitflags::bitflags;
use glam::IVec2;

/// Pointer buttons. Wheel motion is reported through [`PointerEvent::Scroll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// The button that starts links and moves focus.
    pub const PRIMARY: MouseButton = MouseButton::Left;

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,
    F(u8),
    Char(char),
}

impl KeyCode {
    /// The modifier bit this key drives, if it is a modifier key.
    pub fn modifier(self) -> Option<Modifiers> {
        Some(match self {
            KeyCode::ShiftLeft => Modifiers::LSHIFT,
            KeyCode::ShiftRight => Modifiers::RSHIFT,
            KeyCode::ControlLeft => Modifiers::LCTRL,
            KeyCode::ControlRight => Modifiers::RCTRL,
            KeyCode::AltLeft => Modifiers::LALT,
            KeyCode::AltRight => Modifiers::RALT,
            KeyCode::SuperLeft => Modifiers::LSUPER,
            KeyCode::SuperRight => Modifiers::RSUPER,
            _ => return None,
        })
    }
}

bitflags! {
    /// Modifier keys held while a key event was produced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const LSHIFT = 1 << 0;
        const RSHIFT = 1 << 1;
        const LCTRL = 1 << 2;
        const RCTRL = 1 << 3;
        const LALT = 1 << 4;
        const RALT = 1 << 5;
        const LSUPER = 1 << 6;
        const RSUPER = 1 << 7;

        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
        const CTRL = Self::LCTRL.bits() | Self::RCTRL.bits();
        const ALT = Self::LALT.bits() | Self::RALT.bits();
        const SUPER = Self::LSUPER.bits() | Self::RSUPER.bits();
    }
}

impl Modifiers {
    #[inline]
    pub fn shift(self) -> bool {
        self.intersects(Self::SHIFT)
    }

    #[inline]
    pub fn ctrl(self) -> bool {
        self.intersects(Self::CTRL)
    }

    #[inline]
    pub fn alt(self) -> bool {
        self.intersects(Self::ALT)
    }

    /// Command on macOS, the Windows/Super key elsewhere.
    #[inline]
    pub fn cmd(self) -> bool {
        self.intersects(Self::SUPER)
    }
}

/// Raw pointer events, positions in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Move { pos: IVec2 },
    ButtonDown { button: MouseButton, pos: IVec2 },
    ButtonUp { button: MouseButton, pos: IVec2 },
    Scroll { direction: ScrollDirection },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    KeyDown { code: KeyCode, modifiers: Modifiers },
    KeyUp { code: KeyCode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}

/// Outcome of feeding one event to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleStatus {
    pub handled: bool,
    pub consumed: bool,
}

impl HandleStatus {
    pub const fn consumed() -> Self {
        Self {
            handled: true,
            consumed: true,
        }
    }

    pub const fn handled() -> Self {
        Self {
            handled: true,
            consumed: false,
        }
    }

    pub const fn ignored() -> Self {
        Self {
            handled: false,
            consumed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_groups() {
        let mods = Modifiers::RSHIFT | Modifiers::LCTRL;
        assert!(mods.shift());
        assert!(mods.ctrl());
        assert!(!mods.alt());
        assert!(!mods.cmd());
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(KeyCode::AltRight.modifier(), Some(Modifiers::RALT));
        assert_eq!(KeyCode::Tab.modifier(), None);
        assert_eq!(KeyCode::Char('a').modifier(), None);
    }

    #[test]
    fn test_primary_button() {
        assert!(MouseButton::Left.is_primary());
        assert!(!MouseButton::Right.is_primary());
    }
}
