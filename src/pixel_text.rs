//! Text for raster output.
//!
//! plotters is built without a font engine, and its bitmap backend panics when
//! asked to draw text. [`PixelTextBackend`] wraps a backend and draws text
//! itself with a built-in 5x7 pixel font. Everything else passes straight
//! through to the wrapped backend.

use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};

const GLYPH_HEIGHT: i32 = 7;
const SPACE_WIDTH: i32 = 3;

/// Rows top to bottom; the leftmost column is the highest of `width` bits.
/// Lower-case letters share the upper-case shapes.
fn glyph(ch: char) -> Option<(u8, [u8; 7])> {
    Some(match ch.to_ascii_uppercase() {
        'A' => (5, [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
        'B' => (5, [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E]),
        'C' => (5, [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E]),
        'D' => (5, [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E]),
        'E' => (5, [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
        'F' => (5, [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
        'G' => (5, [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F]),
        'H' => (5, [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
        'I' => (3, [0x07, 0x02, 0x02, 0x02, 0x02, 0x02, 0x07]),
        'J' => (5, [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C]),
        'K' => (5, [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
        'L' => (5, [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
        'M' => (5, [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
        'N' => (5, [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11]),
        'O' => (5, [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
        'P' => (5, [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
        'Q' => (5, [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D]),
        'R' => (5, [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
        'S' => (5, [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
        'T' => (5, [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
        'U' => (5, [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
        'V' => (5, [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
        'W' => (5, [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]),
        'X' => (5, [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11]),
        'Y' => (5, [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04]),
        'Z' => (5, [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F]),
        '0' => (5, [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
        '1' => (3, [0x02, 0x06, 0x02, 0x02, 0x02, 0x02, 0x07]),
        '2' => (5, [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
        '3' => (5, [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
        '4' => (5, [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
        '5' => (5, [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
        '6' => (5, [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
        '7' => (5, [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
        '8' => (5, [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
        '9' => (5, [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
        '-' => (3, [0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00]),
        '+' => (5, [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00]),
        '/' => (3, [0x01, 0x01, 0x02, 0x02, 0x02, 0x04, 0x04]),
        ':' => (1, [0x00, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]),
        '.' => (1, [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]),
        ',' => (2, [0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02]),
        '(' => (3, [0x01, 0x02, 0x04, 0x04, 0x04, 0x02, 0x01]),
        ')' => (3, [0x04, 0x02, 0x01, 0x01, 0x01, 0x02, 0x04]),
        '\'' => (1, [0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]),
        _ => return None,
    })
}

/// Horizontal advance of `ch` in font units, including one column of spacing.
fn advance(ch: char) -> i32 {
    glyph(ch).map_or(SPACE_WIDTH, |(width, _)| i32::from(width) + 1)
}

/// Size of `text` in font units.
pub fn text_extent(text: &str) -> (i32, i32) {
    (text.chars().map(advance).sum(), GLYPH_HEIGHT)
}

/// Device pixels per font unit for a font size in pixels. Capitals are
/// about 70% of the em.
pub fn pixel_scale(font_px: f64) -> i32 {
    (font_px * 0.7 / f64::from(GLYPH_HEIGHT)).round().max(1.0) as i32
}

pub struct PixelTextBackend<DB> {
    inner: DB,
}

impl<DB> PixelTextBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self { inner }
    }

    fn fill_block(
        &mut self,
        (x, y): BackendCoord,
        scale: i32,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>>
    where
        DB: DrawingBackend,
    {
        for dy in 0..scale {
            for dx in 0..scale {
                self.inner.draw_pixel((x + dx, y + dy), color)?;
            }
        }
        Ok(())
    }
}

impl<DB: DrawingBackend> DrawingBackend for PixelTextBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.fill_polygon(vert, style)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        size: (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, size, src)
    }

    /// Rotation and font family are ignored.
    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let color = style.color();
        if color.alpha == 0.0 || text.trim().is_empty() {
            return Ok(());
        }

        let scale = pixel_scale(style.size());
        let (w, h) = text_extent(text);
        let (w, h) = (w * scale, h * scale);
        let anchor = style.anchor();
        let left = pos.0
            - match anchor.h_pos {
                HPos::Left => 0,
                HPos::Center => w / 2,
                HPos::Right => w,
            };
        let top = pos.1
            - match anchor.v_pos {
                VPos::Top => 0,
                VPos::Center => h / 2,
                VPos::Bottom => h,
            };

        let mut x = left;
        for ch in text.chars() {
            if let Some((width, rows)) = glyph(ch) {
                for (row, &bits) in rows.iter().enumerate() {
                    for col in 0..width {
                        if (bits >> (width - 1 - col)) & 1 == 1 {
                            let at = (x + i32::from(col) * scale, top + row as i32 * scale);
                            self.fill_block(at, scale, color)?;
                        }
                    }
                }
            }
            x += advance(ch) * scale;
        }
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let scale = pixel_scale(style.size());
        let (w, h) = text_extent(text);
        Ok(((w * scale).max(0) as u32, (h * scale) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;

    #[test]
    fn test_every_glyph_fits_its_width() {
        for ch in (' '..='~').filter(|c| glyph(*c).is_some()) {
            let (width, rows) = glyph(ch).unwrap();
            assert!(rows.iter().all(|r| u32::from(*r) < 1 << width), "{ch:?} overflows");
        }
    }

    #[test]
    fn test_text_extent() {
        // 1 -> 3+1, space -> 3, k and m -> 5+1 each
        assert_eq!(text_extent("1 km"), (19, 7));
        assert_eq!(text_extent("km"), text_extent("KM"));
        // Unknown characters advance like a space.
        assert_eq!(text_extent("é").0, SPACE_WIDTH);
    }

    #[test]
    fn test_pixel_scale() {
        assert_eq!(pixel_scale(4.0), 1);
        assert_eq!(pixel_scale(10.0), 1);
        assert_eq!(pixel_scale(30.0), 3);
        assert_eq!(pixel_scale(100.0), 10);
    }

    #[test]
    fn test_text_reaches_the_bitmap() {
        let (w, h) = (40u32, 12u32);
        let mut buf = vec![255u8; (w * h * 3) as usize];
        {
            let root = PixelTextBackend::new(BitMapBackend::with_buffer(&mut buf, (w, h)))
                .into_drawing_area();
            let font = FontDesc::new(FontFamily::SansSerif, 10.0, FontStyle::Normal).color(&BLACK);
            root.draw(&Text::new("1 km", (2, 2), font)).unwrap();
            root.present().unwrap();
        }
        let dark = buf.chunks(3).filter(|px| px == &[0, 0, 0]).count();
        // "1" alone has 10 lit cells; k and m add more.
        assert!(dark > 20, "only {dark} dark pixels");
        // Nothing drawn left of the anchor.
        for y in 0..h as usize {
            for x in 0..2usize {
                let i = (y * w as usize + x) * 3;
                assert_eq!(&buf[i..i + 3], &[255, 255, 255]);
            }
        }
    }

    #[test]
    fn test_non_text_drawing_passes_through() {
        let (w, h) = (10u32, 10u32);
        let mut buf = vec![255u8; (w * h * 3) as usize];
        {
            let root = PixelTextBackend::new(BitMapBackend::with_buffer(&mut buf, (w, h)))
                .into_drawing_area();
            root.fill(&RED).unwrap();
            root.present().unwrap();
        }
        assert!(buf.chunks(3).all(|px| px == [255, 0, 0]));
    }
}
