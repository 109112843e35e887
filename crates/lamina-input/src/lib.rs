//! Raw input vocabulary for Lamina.
//!
//! The environment (a window system, a test harness, a replay file) feeds
//! [`InputEvent`]s one at a time into a scene. This crate holds the event
//! types plus the small pieces of input state that do not depend on the
//! scene tree: pressed keys and modifiers, pressed buttons and pointer
//! position, and the multi-click history.

pub mod click;
pub mod event;
pub mod keyboard;
pub mod pointer;

pub use click::{ClickHistory, ClickKind, ClickRecord};
pub use event::{
    HandleStatus, InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, PointerEvent,
    ScrollDirection,
};
pub use keyboard::KeyboardState;
pub use pointer::PointerState;
