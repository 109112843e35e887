//! Owned RGBA pixel buffers.

use lamina_core::{IPos, IRect, ISize, Pos, Rect};

use crate::error::SurfaceError;

/// An 8-bit RGBA color, laid out so pixel rows can be handed to a display
/// backend as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from a 24-bit RGB hex value (e.g. `0xFF8800`).
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Source-over compositing of `self` onto `dst`.
    fn over(self, dst: Color) -> Color {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let a = a as u32;
                let inv = 255 - a;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv) / 255) as u8;
                Color {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: (a + dst.a as u32 * inv / 255) as u8,
                }
            }
        }
    }
}

/// A pixel buffer owned by exactly one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    size: ISize,
    pixels: Vec<Color>,
}

impl Surface {
    /// A fully transparent surface. Negative extents are clamped to zero.
    pub fn new(size: ISize) -> Self {
        Self::filled(size, Color::TRANSPARENT)
    }

    pub fn filled(size: ISize, color: Color) -> Self {
        let size = ISize::new(size.width.max(0), size.height.max(0));
        Self {
            size,
            pixels: vec![color; size.area()],
        }
    }

    #[inline]
    pub fn size(&self) -> ISize {
        self.size
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn bounds(&self) -> IRect {
        Rect::from_size(self.size)
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.size.width as usize + x as usize
    }

    pub fn get(&self, pos: IPos) -> Option<Color> {
        self.bounds()
            .contains_point(pos)
            .then(|| self.pixels[self.offset(pos.x, pos.y)])
    }

    pub fn set(&mut self, pos: IPos, color: Color) {
        if self.bounds().contains_point(pos) {
            let offset = self.offset(pos.x, pos.y);
            self.pixels[offset] = color;
        }
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Overwrites `rect` (clipped to the surface) with `color`.
    pub fn fill_rect(&mut self, rect: IRect, color: Color) {
        let Some(area) = rect.intersection(&self.bounds()) else {
            return;
        };
        for y in area.top()..area.bottom() {
            let start = self.offset(area.left(), y);
            self.pixels[start..start + area.width as usize].fill(color);
        }
    }

    /// Draws a frame `width` pixels thick along the inside of the edges.
    pub fn draw_border(&mut self, color: Color, width: i32) {
        if width <= 0 {
            return;
        }
        let (w, h) = (self.size.width, self.size.height);
        self.fill_rect(Rect::new(0, 0, w, width), color);
        self.fill_rect(Rect::new(0, h - width, w, width), color);
        self.fill_rect(Rect::new(0, 0, width, h), color);
        self.fill_rect(Rect::new(w - width, 0, width, h), color);
    }

    /// Borrows the sub-region `area`, which must lie inside the surface.
    pub fn view(&self, area: IRect) -> Result<SurfaceView<'_>, SurfaceError> {
        if area.width < 0 || area.height < 0 || !self.bounds().contains(&area) {
            return Err(SurfaceError {
                area,
                size: self.size,
            });
        }
        Ok(SurfaceView {
            surface: self,
            area,
        })
    }

    pub fn full_view(&self) -> SurfaceView<'_> {
        SurfaceView {
            surface: self,
            area: self.bounds(),
        }
    }

    /// Composites `src` with its top-left at `dest`, clipped to this surface.
    pub fn blit(&mut self, src: &SurfaceView<'_>, dest: IPos) {
        let target = Rect::from_pos_size(dest, src.area.size());
        let Some(clipped) = target.intersection(&self.bounds()) else {
            return;
        };
        for y in clipped.top()..clipped.bottom() {
            let sy = src.area.y + (y - dest.y);
            for x in clipped.left()..clipped.right() {
                let sx = src.area.x + (x - dest.x);
                let color = src.surface.pixels[src.surface.offset(sx, sy)];
                let offset = self.offset(x, y);
                self.pixels[offset] = color.over(self.pixels[offset]);
            }
        }
    }

    /// A copy of this surface at a new size, keeping the overlapping pixels.
    pub fn resized(&self, size: ISize) -> Surface {
        let mut out = Surface::new(size);
        out.blit(&self.full_view(), Pos::new(0, 0));
        out
    }

    /// Pixel data in row-major RGBA order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// A borrowed rectangular region of a [`Surface`].
#[derive(Debug, Clone, Copy)]
pub struct SurfaceView<'a> {
    surface: &'a Surface,
    area: IRect,
}

impl SurfaceView<'_> {
    pub fn area(&self) -> IRect {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut surface = Surface::filled(ISize::new(10, 10), Color::WHITE);
        surface.fill_rect(Rect::new(8, 8, 10, 10), Color::RED);
        assert_eq!(surface.get(Pos::new(9, 9)), Some(Color::RED));
        assert_eq!(surface.get(Pos::new(7, 7)), Some(Color::WHITE));
        assert_eq!(surface.get(Pos::new(10, 10)), None);
    }

    #[test]
    fn test_view_out_of_bounds() {
        let surface = Surface::new(ISize::new(4, 4));
        assert!(surface.view(Rect::new(0, 0, 4, 4)).is_ok());
        let err = surface.view(Rect::new(2, 2, 4, 4)).unwrap_err();
        assert_eq!(err.size, ISize::new(4, 4));
    }

    #[test]
    fn test_blit_sub_region() {
        let mut src = Surface::filled(ISize::new(4, 4), Color::BLUE);
        src.set(Pos::new(3, 3), Color::RED);
        let mut dst = Surface::filled(ISize::new(8, 8), Color::WHITE);
        let view = src.view(Rect::new(2, 2, 2, 2)).unwrap();
        dst.blit(&view, Pos::new(6, 6));
        assert_eq!(dst.get(Pos::new(6, 6)), Some(Color::BLUE));
        assert_eq!(dst.get(Pos::new(7, 7)), Some(Color::RED));
        assert_eq!(dst.get(Pos::new(5, 5)), Some(Color::WHITE));
    }

    #[test]
    fn test_transparent_pixels_keep_destination() {
        let src = Surface::new(ISize::new(2, 2));
        let mut dst = Surface::filled(ISize::new(2, 2), Color::GREEN);
        dst.blit(&src.full_view(), Pos::new(0, 0));
        assert_eq!(dst.get(Pos::new(1, 1)), Some(Color::GREEN));
    }

    #[test]
    fn test_half_alpha_blend() {
        let src = Surface::filled(ISize::new(1, 1), Color::rgba(255, 255, 255, 128));
        let mut dst = Surface::filled(ISize::new(1, 1), Color::BLACK);
        dst.blit(&src.full_view(), Pos::new(0, 0));
        let px = dst.get(Pos::new(0, 0)).unwrap();
        assert_eq!(px.r, 128);
        assert_eq!(px.a, 255);
    }

    #[test]
    fn test_border() {
        let mut surface = Surface::filled(ISize::new(6, 6), Color::WHITE);
        surface.draw_border(Color::BLACK, 1);
        assert_eq!(surface.get(Pos::new(0, 3)), Some(Color::BLACK));
        assert_eq!(surface.get(Pos::new(5, 5)), Some(Color::BLACK));
        assert_eq!(surface.get(Pos::new(2, 2)), Some(Color::WHITE));
    }

    #[test]
    fn test_resized_keeps_overlap() {
        let surface = Surface::filled(ISize::new(2, 2), Color::RED);
        let bigger = surface.resized(ISize::new(3, 3));
        assert_eq!(bigger.get(Pos::new(1, 1)), Some(Color::RED));
        assert_eq!(bigger.get(Pos::new(2, 2)), Some(Color::TRANSPARENT));
        assert_eq!(surface.as_bytes().len(), 16);
    }
}
