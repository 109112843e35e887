//! Axis-aligned integer geometry.
//!
//! Every coordinate in the scene graph is an `i32` with the origin at the
//! top-left of a surface and `y` growing downward. [`Rect`], [`Size`] and
//! [`Pos`] stay generic so they can be cast for display backends, but all of
//! the clipping and anchoring helpers live on the `i32` instantiation.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

pub type IRect = Rect<i32>;
pub type ISize = Size<i32>;
pub type IPos = Pos<i32>;

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

impl ISize {
    pub const ZERO: ISize = Size::new(0, 0);

    /// Number of pixels covered, zero for degenerate sizes.
    pub fn area(&self) -> usize {
        if self.width <= 0 || self.height <= 0 {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}

impl<T> Pos<T> {
    pub const fn new(x: T, y: T) -> Self {
        Pos { x, y }
    }
}

impl IPos {
    pub const ZERO: IPos = Pos::new(0, 0);
}

impl<T: Add<Output = T>> Add for Pos<T> {
    type Output = Pos<T>;

    fn add(self, rhs: Self) -> Self::Output {
        Pos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Pos<T> {
    type Output = Pos<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        Pos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<IPos> for mint::Point2<i32> {
    fn from(pos: IPos) -> Self {
        mint::Point2 { x: pos.x, y: pos.y }
    }
}

impl From<mint::Point2<i32>> for IPos {
    fn from(point: mint::Point2<i32>) -> Self {
        Pos::new(point.x, point.y)
    }
}

impl From<glam::IVec2> for IPos {
    fn from(v: glam::IVec2) -> Self {
        Pos::new(v.x, v.y)
    }
}

impl From<IPos> for glam::IVec2 {
    fn from(pos: IPos) -> Self {
        glam::IVec2::new(pos.x, pos.y)
    }
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl IRect {
    pub const ZERO: IRect = Rect::new(0, 0, 0, 0);

    pub fn from_pos_size(pos: IPos, size: ISize) -> Self {
        Rect::new(pos.x, pos.y, size.width, size.height)
    }

    /// A rect of `size` anchored at the origin.
    pub fn from_size(size: ISize) -> Self {
        Rect::new(0, 0, size.width, size.height)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn topleft(&self) -> IPos {
        Pos::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> ISize {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn translate(&self, dx: i32, dy: i32) -> IRect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn offset(&self, by: IPos) -> IRect {
        self.translate(by.x, by.y)
    }

    pub fn with_size(&self, size: ISize) -> IRect {
        Rect::new(self.x, self.y, size.width, size.height)
    }

    pub fn with_topleft(&self, pos: IPos) -> IRect {
        Rect::new(pos.x, pos.y, self.width, self.height)
    }

    /// Overlapping region of both rects, if they share any pixel.
    pub fn intersection(&self, other: &IRect) -> Option<IRect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Like [`IRect::intersection`], but a disjoint pair yields an empty
    /// rect positioned at `self`'s top-left instead of `None`.
    pub fn clip(&self, other: &IRect) -> IRect {
        self.intersection(other)
            .unwrap_or_else(|| Rect::new(self.x, self.y, 0, 0))
    }

    /// Smallest rect containing both. Empty operands are ignored.
    pub fn union(&self, other: &IRect) -> IRect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn collides(&self, other: &IRect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn contains_point(&self, pos: IPos) -> bool {
        pos.x >= self.left() && pos.x < self.right() && pos.y >= self.top() && pos.y < self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &IRect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn point_at(&self, location: Location) -> IPos {
        let (fx, fy) = location.factors();
        Pos::new(
            self.x + fx * self.width / 2,
            self.y + fy * self.height / 2,
        )
    }

    /// Returns a copy moved so that the anchor `location` sits on `pos`.
    pub fn with_point_at(&self, location: Location, pos: IPos) -> IRect {
        let current = self.point_at(location);
        self.translate(pos.x - current.x, pos.y - current.y)
    }

    pub fn edge(&self, edge: Edge) -> i32 {
        match edge {
            Edge::Left => self.left(),
            Edge::Top => self.top(),
            Edge::Right => self.right(),
            Edge::Bottom => self.bottom(),
            Edge::CenterX => self.x + self.width / 2,
            Edge::CenterY => self.y + self.height / 2,
        }
    }

    /// Returns a copy moved along one axis so that `edge` equals `value`.
    pub fn with_edge(&self, edge: Edge, value: i32) -> IRect {
        let delta = value - self.edge(edge);
        match edge {
            Edge::Left | Edge::Right | Edge::CenterX => self.translate(delta, 0),
            Edge::Top | Edge::Bottom | Edge::CenterY => self.translate(0, delta),
        }
    }
}

impl fmt::Display for IRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// One of the nine named points of a rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    #[default]
    TopLeft,
    MidTop,
    TopRight,
    MidLeft,
    Center,
    MidRight,
    BottomLeft,
    MidBottom,
    BottomRight,
}

impl Location {
    pub const ALL: [Location; 9] = [
        Location::TopLeft,
        Location::MidTop,
        Location::TopRight,
        Location::MidLeft,
        Location::Center,
        Location::MidRight,
        Location::BottomLeft,
        Location::MidBottom,
        Location::BottomRight,
    ];

    /// Half-extent multipliers: 0 = near edge, 1 = middle, 2 = far edge.
    const fn factors(self) -> (i32, i32) {
        match self {
            Location::TopLeft => (0, 0),
            Location::MidTop => (1, 0),
            Location::TopRight => (2, 0),
            Location::MidLeft => (0, 1),
            Location::Center => (1, 1),
            Location::MidRight => (2, 1),
            Location::BottomLeft => (0, 2),
            Location::MidBottom => (1, 2),
            Location::BottomRight => (2, 2),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Location::TopLeft => "topleft",
            Location::MidTop => "midtop",
            Location::TopRight => "topright",
            Location::MidLeft => "midleft",
            Location::Center => "center",
            Location::MidRight => "midright",
            Location::BottomLeft => "bottomleft",
            Location::MidBottom => "midbottom",
            Location::BottomRight => "bottomright",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocation(pub String);

impl fmt::Display for UnknownLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rect location: {:?}", self.0)
    }
}

impl std::error::Error for UnknownLocation {}

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "topleft" => Location::TopLeft,
            "midtop" | "top" => Location::MidTop,
            "topright" => Location::TopRight,
            "midleft" | "left" => Location::MidLeft,
            "center" => Location::Center,
            "midright" | "right" => Location::MidRight,
            "bottomleft" => Location::BottomLeft,
            "midbottom" | "bottom" => Location::MidBottom,
            "bottomright" => Location::BottomRight,
            other => return Err(UnknownLocation(other.to_owned())),
        })
    }
}

/// A single-axis coordinate of a rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    CenterX,
    CenterY,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_and_clip() {
        let a = Rect::new(0, 0, 50, 50);
        let b = Rect::new(25, 30, 50, 50);
        assert_eq!(a.intersection(&b), Some(Rect::new(25, 30, 25, 20)));

        let far = Rect::new(100, 100, 10, 10);
        assert_eq!(a.intersection(&far), None);
        assert_eq!(a.clip(&far), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn test_touching_rects_do_not_collide() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.collides(&b));
        assert!(a.collides(&Rect::new(9, 9, 1, 1)));
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = Rect::new(5, 5, 10, 10);
        assert_eq!(a.union(&IRect::ZERO), a);
        assert_eq!(IRect::ZERO.union(&a), a);
        assert_eq!(
            a.union(&Rect::new(20, 0, 5, 5)),
            Rect::new(5, 0, 20, 15)
        );
    }

    #[test]
    fn test_point_at_locations() {
        let r = Rect::new(10, 20, 101, 50);
        assert_eq!(r.point_at(Location::TopLeft), Pos::new(10, 20));
        assert_eq!(r.point_at(Location::Center), Pos::new(60, 45));
        assert_eq!(r.point_at(Location::BottomRight), Pos::new(111, 70));
        assert_eq!(r.point_at(Location::MidBottom), Pos::new(60, 70));
    }

    #[test]
    fn test_with_point_at_roundtrip() {
        let r = Rect::new(0, 0, 40, 30);
        for location in Location::ALL {
            let moved = r.with_point_at(location, Pos::new(7, -3));
            assert_eq!(moved.point_at(location), Pos::new(7, -3));
            assert_eq!(moved.size(), r.size());
        }
    }

    #[test]
    fn test_location_parsing_aliases() {
        assert_eq!("left".parse::<Location>(), Ok(Location::MidLeft));
        assert_eq!("bottom".parse::<Location>(), Ok(Location::MidBottom));
        assert_eq!("center".parse::<Location>(), Ok(Location::Center));
        assert!("middle".parse::<Location>().is_err());
        for location in Location::ALL {
            assert_eq!(location.name().parse::<Location>(), Ok(location));
        }
    }

    #[test]
    fn test_edges() {
        let r = Rect::new(10, 10, 20, 40);
        assert_eq!(r.edge(Edge::CenterY), 30);
        assert_eq!(r.with_edge(Edge::Right, 100).left(), 80);
        assert_eq!(r.with_edge(Edge::Bottom, 0).top(), -40);
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(Pos::new(0, 0)));
        assert!(r.contains_point(Pos::new(9, 9)));
        assert!(!r.contains_point(Pos::new(10, 5)));
    }
}
