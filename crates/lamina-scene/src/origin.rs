//! Anchor-based positioning.
//!
//! An origin places one of the owner's nine anchor points at an offset from
//! an anchor point of a reference node (the parent unless stated otherwise).
//! Offsets are either pixels or a percentage of the reference size. The
//! scene re-resolves an origin whenever its reference resizes, or moves
//! when the reference is not the parent.

use std::fmt;
use std::str::FromStr;

use lamina_core::{IPos, IRect, ISize, Location, Pos, Size};

use crate::node::NodeId;

/// One axis of an asked position or size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coord {
    Px(i32),
    /// Percentage of the reference extent on the same axis.
    Percent(i32),
}

impl Coord {
    /// Resolves against `extent`, truncating toward zero.
    pub fn resolve(self, extent: i32) -> i32 {
        match self {
            Coord::Px(px) => px,
            Coord::Percent(percent) => (extent as i64 * percent as i64 / 100) as i32,
        }
    }

    pub fn is_relative(self) -> bool {
        matches!(self, Coord::Percent(_))
    }
}

impl Default for Coord {
    fn default() -> Self {
        Coord::Px(0)
    }
}

impl From<i32> for Coord {
    fn from(px: i32) -> Self {
        Coord::Px(px)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coord::Px(px) => write!(f, "{px}"),
            Coord::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {0:?}, expected pixels or \"N%\"")]
pub struct InvalidCoord(pub String);

impl FromStr for Coord {
    type Err = InvalidCoord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_suffix('%') {
            Some(percent) => percent.trim().parse().map(Coord::Percent),
            None => s.parse().map(Coord::Px),
        };
        parsed.map_err(|_| InvalidCoord(s.to_owned()))
    }
}

/// Position request supplied when a node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginSpec {
    pub pos: [Coord; 2],
    /// Anchor of the owner placed at the resolved point.
    pub location: Location,
    /// `None` means the parent.
    pub reference: Option<NodeId>,
    pub reference_location: Location,
    /// Resolve against the reference hitbox instead of its rect.
    pub from_hitbox: bool,
    pub locked: bool,
}

impl Default for OriginSpec {
    fn default() -> Self {
        Self {
            pos: [Coord::Px(0), Coord::Px(0)],
            location: Location::TopLeft,
            reference: None,
            reference_location: Location::TopLeft,
            from_hitbox: false,
            locked: false,
        }
    }
}

impl OriginSpec {
    pub fn at(x: impl Into<Coord>, y: impl Into<Coord>) -> Self {
        Self {
            pos: [x.into(), y.into()],
            ..Self::default()
        }
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn reference(mut self, reference: NodeId) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn reference_location(mut self, location: Location) -> Self {
        self.reference_location = location;
        self
    }

    pub fn from_hitbox(mut self, from_hitbox: bool) -> Self {
        self.from_hitbox = from_hitbox;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// Partial reconfiguration of an existing origin. Unset fields are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OriginUpdate {
    pub pos: Option<[Coord; 2]>,
    pub location: Option<Location>,
    /// `Some(None)` resets the reference to the parent.
    pub reference: Option<Option<NodeId>>,
    pub reference_location: Option<Location>,
    pub from_hitbox: Option<bool>,
    pub locked: Option<bool>,
}

impl OriginUpdate {
    pub fn pos(mut self, x: impl Into<Coord>, y: impl Into<Coord>) -> Self {
        self.pos = Some([x.into(), y.into()]);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn reference(mut self, reference: Option<NodeId>) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn reference_location(mut self, location: Location) -> Self {
        self.reference_location = Some(location);
        self
    }

    pub fn from_hitbox(mut self, from_hitbox: bool) -> Self {
        self.from_hitbox = Some(from_hitbox);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }
}

/// Resolved origin state stored on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub(crate) asked: [Coord; 2],
    pub(crate) location: Location,
    pub(crate) reference: Option<NodeId>,
    pub(crate) reference_location: Location,
    pub(crate) from_hitbox: bool,
}

impl Origin {
    pub(crate) fn from_spec(spec: &OriginSpec) -> Self {
        Self {
            asked: spec.pos,
            location: spec.location,
            reference: spec.reference,
            reference_location: spec.reference_location,
            from_hitbox: spec.from_hitbox,
        }
    }

    pub(crate) fn apply(&mut self, update: &OriginUpdate) {
        if let Some(pos) = update.pos {
            self.asked = pos;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(reference) = update.reference {
            self.reference = reference;
        }
        if let Some(location) = update.reference_location {
            self.reference_location = location;
        }
        if let Some(from_hitbox) = update.from_hitbox {
            self.from_hitbox = from_hitbox;
        }
    }

    pub fn asked_pos(&self) -> [Coord; 2] {
        self.asked
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Explicit reference, `None` when positioned against the parent.
    pub fn reference(&self) -> Option<NodeId> {
        self.reference
    }

    pub fn reference_location(&self) -> Location {
        self.reference_location
    }

    pub fn from_hitbox(&self) -> bool {
        self.from_hitbox
    }
}

/// Resolves `asked` into parent space.
///
/// `frame` is the reference rect (or hitbox) in scene coordinates and
/// `parent_abs` the scene position of the owner's parent.
pub(crate) fn resolve(
    asked: [Coord; 2],
    frame: IRect,
    reference_location: Location,
    parent_abs: IPos,
) -> IPos {
    let anchor = frame.point_at(reference_location);
    Pos::new(
        anchor.x + asked[0].resolve(frame.width) - parent_abs.x,
        anchor.y + asked[1].resolve(frame.height) - parent_abs.y,
    )
}

/// Size request relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub width: Coord,
    pub height: Coord,
}

impl SizeSpec {
    pub fn new(width: impl Into<Coord>, height: impl Into<Coord>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    pub fn is_relative(&self) -> bool {
        self.width.is_relative() || self.height.is_relative()
    }

    pub fn resolve(&self, parent: ISize) -> ISize {
        Size::new(
            self.width.resolve(parent.width).max(0),
            self.height.resolve(parent.height).max(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::Rect;

    #[test]
    fn test_coord_parsing() {
        assert_eq!("50%".parse::<Coord>(), Ok(Coord::Percent(50)));
        assert_eq!(" -12 ".parse::<Coord>(), Ok(Coord::Px(-12)));
        assert!("half".parse::<Coord>().is_err());
        assert!("%".parse::<Coord>().is_err());
        assert_eq!(Coord::Percent(25).to_string(), "25%");
    }

    #[test]
    fn test_percent_truncates() {
        assert_eq!(Coord::Percent(50).resolve(201), 100);
        assert_eq!(Coord::Percent(-50).resolve(201), -100);
        assert_eq!(Coord::Px(7).resolve(1000), 7);
    }

    #[test]
    fn test_resolve_against_parent() {
        let parent = Rect::new(30, 40, 200, 100);
        let pos = resolve(
            [Coord::Percent(50), Coord::Percent(50)],
            parent,
            Location::TopLeft,
            parent.topleft(),
        );
        assert_eq!(pos, Pos::new(100, 50));
    }

    #[test]
    fn test_resolve_against_sibling_anchor() {
        let parent_abs = Pos::new(10, 10);
        let sibling = Rect::new(60, 10, 40, 20);
        let pos = resolve(
            [Coord::Px(5), Coord::Px(0)],
            sibling,
            Location::TopRight,
            parent_abs,
        );
        assert_eq!(pos, Pos::new(95, 0));
    }

    #[test]
    fn test_size_spec() {
        let spec = SizeSpec::new(Coord::Percent(50), 20);
        assert!(spec.is_relative());
        assert_eq!(spec.resolve(Size::new(300, 10)), Size::new(150, 20));
    }
}
