//! Repaint and lock state of a node.

use bitflags::bitflags;

/// How often a node's own surface needs repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DirtyState {
    /// Surface is up to date.
    #[default]
    Clean,
    /// Repaint on the next frame, then fall back to `Clean`.
    RepaintOnce,
    /// Repaint on every frame.
    AlwaysRepaint,
}

impl DirtyState {
    #[inline]
    pub fn needs_paint(self) -> bool {
        self != DirtyState::Clean
    }
}

bitflags! {
    /// Mutators guarded by a lock. A locked mutator fails with a
    /// not-permitted error instead of changing the node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LockFlags: u8 {
        const ORIGIN = 1 << 0;
        const WIDTH = 1 << 1;
        const HEIGHT = 1 << 2;
        const VISIBILITY = 1 << 3;

        const SIZE = Self::WIDTH.bits() | Self::HEIGHT.bits();
    }
}

impl LockFlags {
    #[inline]
    pub fn origin(self) -> bool {
        self.contains(Self::ORIGIN)
    }

    #[inline]
    pub fn width(self) -> bool {
        self.contains(Self::WIDTH)
    }

    #[inline]
    pub fn height(self) -> bool {
        self.contains(Self::HEIGHT)
    }

    /// Both dimensions locked.
    #[inline]
    pub fn size(self) -> bool {
        self.contains(Self::SIZE)
    }

    #[inline]
    pub fn visibility(self) -> bool {
        self.contains(Self::VISIBILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_state_default() {
        assert_eq!(DirtyState::default(), DirtyState::Clean);
        assert!(!DirtyState::Clean.needs_paint());
        assert!(DirtyState::RepaintOnce.needs_paint());
        assert!(DirtyState::AlwaysRepaint.needs_paint());
    }

    #[test]
    fn test_size_lock_is_both_axes() {
        let locks = LockFlags::SIZE;
        assert!(locks.width());
        assert!(locks.height());
        assert!(locks.size());
        assert!(!(LockFlags::WIDTH).size());
    }
}
