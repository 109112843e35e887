//! Node-level notifications produced by the scene.
//!
//! Every mutation that the widget layer may care about appends a
//! [`SignalEvent`] to the scene's queue. Consumers drain the queue after
//! feeding input or mutating geometry; an undrained queue keeps only the
//! newest signals.

use std::collections::VecDeque;

use glam::IVec2;
use lamina_core::ISize;
use lamina_input::{KeyCode, Modifiers, ScrollDirection};

use crate::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The local rect (or, for a window change, the hitbox) moved.
    Motion { dx: i32, dy: i32 },
    /// The size changed; carries the previous size.
    Resize { old: ISize },
    Show,
    Hide,
    Sleep,
    Wake,
    Kill,
    Enable,
    Disable,
    Hover,
    Unhover,
    Focus,
    Defocus,
    Link,
    LinkMotion { rel: IVec2 },
    Unlink,
    KeyDown { code: KeyCode, modifiers: Modifiers },
    KeyUp { code: KeyCode },
    Scroll { direction: ScrollDirection },
    SceneOpen,
    SceneClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    pub node: NodeId,
    pub signal: Signal,
}

/// Signals kept by a scene's queue unless configured otherwise.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 4096;

/// Bounded queue of signals awaiting a consumer.
///
/// Once `capacity` events are queued the oldest one is dropped for every
/// new one. The [`Compositor`](crate::Compositor) drains the queue on each
/// tick; a scene driven by hand should call
/// [`Scene::drain_signals`](crate::Scene::drain_signals) once per frame.
#[derive(Debug)]
pub struct SignalQueue {
    events: VecDeque<SignalEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for SignalQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SIGNAL_CAPACITY)
    }
}

impl SignalQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn push(&mut self, node: NodeId, signal: Signal) {
        tracing::trace!(%node, ?signal, "signal");
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            if self.dropped == 0 {
                tracing::warn!(capacity = self.capacity, "signal queue full, dropping oldest signals");
            }
            self.dropped += 1;
        }
        self.events.push_back(SignalEvent { node, signal });
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalEvent> + '_ {
        self.events.iter()
    }

    /// Takes every queued signal, oldest first.
    pub fn drain(&mut self) -> Vec<SignalEvent> {
        if self.dropped > 0 {
            tracing::debug!(dropped = self.dropped, "signals lost since last drain");
            self.dropped = 0;
        }
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Signals evicted since the last drain.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Signals received by `node`, oldest first.
    pub fn for_node(&self, node: NodeId) -> impl Iterator<Item = Signal> + '_ {
        self.events
            .iter()
            .filter(move |event| event.node == node)
            .map(|event| event.signal)
    }
}
