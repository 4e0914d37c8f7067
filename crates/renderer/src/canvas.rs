//! Raster canvas with the drawing primitives the choropleth pipeline needs.
//!
//! Pixels are RGBA, row-major. Text uses an embedded 5x7 bitmap font so
//! the crate ships without font assets.

use choro_common::Rgba;

use crate::png::{self, PngError};

/// Character cell: 6px wide (5 + 1 spacing), 9px tall (7 + 2 spacing).
pub const CHAR_W: u32 = 6;
pub const CHAR_H: u32 = 9;

/// Each glyph: 7 rows, each row's lower 5 bits = pixels (MSB = left).
/// ASCII 32..=126.
#[rustfmt::skip]
const FONT_5X7: [[u8; 7]; 95] = [
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00], // 32 ' '
    [0x04,0x04,0x04,0x04,0x04,0x00,0x04], // 33 '!'
    [0x0A,0x0A,0x0A,0x00,0x00,0x00,0x00], // 34 '"'
    [0x0A,0x0A,0x1F,0x0A,0x1F,0x0A,0x0A], // 35 '#'
    [0x04,0x0F,0x14,0x0E,0x05,0x1E,0x04], // 36 '$'
    [0x18,0x19,0x02,0x04,0x08,0x13,0x03], // 37 '%'
    [0x0C,0x12,0x14,0x08,0x15,0x12,0x0D], // 38 '&'
    [0x04,0x04,0x08,0x00,0x00,0x00,0x00], // 39 '''
    [0x02,0x04,0x08,0x08,0x08,0x04,0x02], // 40 '('
    [0x08,0x04,0x02,0x02,0x02,0x04,0x08], // 41 ')'
    [0x00,0x04,0x15,0x0E,0x15,0x04,0x00], // 42 '*'
    [0x00,0x04,0x04,0x1F,0x04,0x04,0x00], // 43 '+'
    [0x00,0x00,0x00,0x00,0x00,0x04,0x08], // 44 ','
    [0x00,0x00,0x00,0x1F,0x00,0x00,0x00], // 45 '-'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x04], // 46 '.'
    [0x00,0x01,0x02,0x04,0x08,0x10,0x00], // 47 '/'
    [0x0E,0x11,0x13,0x15,0x19,0x11,0x0E], // 48 '0'
    [0x04,0x0C,0x04,0x04,0x04,0x04,0x0E], // 49 '1'
    [0x0E,0x11,0x01,0x02,0x04,0x08,0x1F], // 50 '2'
    [0x1F,0x02,0x04,0x02,0x01,0x11,0x0E], // 51 '3'
    [0x02,0x06,0x0A,0x12,0x1F,0x02,0x02], // 52 '4'
    [0x1F,0x10,0x1E,0x01,0x01,0x11,0x0E], // 53 '5'
    [0x06,0x08,0x10,0x1E,0x11,0x11,0x0E], // 54 '6'
    [0x1F,0x01,0x02,0x04,0x08,0x08,0x08], // 55 '7'
    [0x0E,0x11,0x11,0x0E,0x11,0x11,0x0E], // 56 '8'
    [0x0E,0x11,0x11,0x0F,0x01,0x02,0x0C], // 57 '9'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x00], // 58 ':'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x08], // 59 ';'
    [0x02,0x04,0x08,0x10,0x08,0x04,0x02], // 60 '<'
    [0x00,0x00,0x1F,0x00,0x1F,0x00,0x00], // 61 '='
    [0x08,0x04,0x02,0x01,0x02,0x04,0x08], // 62 '>'
    [0x0E,0x11,0x01,0x02,0x04,0x00,0x04], // 63 '?'
    [0x0E,0x11,0x17,0x15,0x17,0x10,0x0E], // 64 '@'
    [0x0E,0x11,0x11,0x1F,0x11,0x11,0x11], // 65 'A'
    [0x1E,0x11,0x11,0x1E,0x11,0x11,0x1E], // 66 'B'
    [0x0E,0x11,0x10,0x10,0x10,0x11,0x0E], // 67 'C'
    [0x1C,0x12,0x11,0x11,0x11,0x12,0x1C], // 68 'D'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x1F], // 69 'E'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x10], // 70 'F'
    [0x0E,0x11,0x10,0x17,0x11,0x11,0x0F], // 71 'G'
    [0x11,0x11,0x11,0x1F,0x11,0x11,0x11], // 72 'H'
    [0x0E,0x04,0x04,0x04,0x04,0x04,0x0E], // 73 'I'
    [0x07,0x02,0x02,0x02,0x02,0x12,0x0C], // 74 'J'
    [0x11,0x12,0x14,0x18,0x14,0x12,0x11], // 75 'K'
    [0x10,0x10,0x10,0x10,0x10,0x10,0x1F], // 76 'L'
    [0x11,0x1B,0x15,0x15,0x11,0x11,0x11], // 77 'M'
    [0x11,0x11,0x19,0x15,0x13,0x11,0x11], // 78 'N'
    [0x0E,0x11,0x11,0x11,0x11,0x11,0x0E], // 79 'O'
    [0x1E,0x11,0x11,0x1E,0x10,0x10,0x10], // 80 'P'
    [0x0E,0x11,0x11,0x11,0x15,0x12,0x0D], // 81 'Q'
    [0x1E,0x11,0x11,0x1E,0x14,0x12,0x11], // 82 'R'
    [0x0F,0x10,0x10,0x0E,0x01,0x01,0x1E], // 83 'S'
    [0x1F,0x04,0x04,0x04,0x04,0x04,0x04], // 84 'T'
    [0x11,0x11,0x11,0x11,0x11,0x11,0x0E], // 85 'U'
    [0x11,0x11,0x11,0x11,0x11,0x0A,0x04], // 86 'V'
    [0x11,0x11,0x11,0x15,0x15,0x1B,0x11], // 87 'W'
    [0x11,0x11,0x0A,0x04,0x0A,0x11,0x11], // 88 'X'
    [0x11,0x11,0x0A,0x04,0x04,0x04,0x04], // 89 'Y'
    [0x1F,0x01,0x02,0x04,0x08,0x10,0x1F], // 90 'Z'
    [0x0E,0x08,0x08,0x08,0x08,0x08,0x0E], // 91 '['
    [0x00,0x10,0x08,0x04,0x02,0x01,0x00], // 92 '\'
    [0x0E,0x02,0x02,0x02,0x02,0x02,0x0E], // 93 ']'
    [0x04,0x0A,0x11,0x00,0x00,0x00,0x00], // 94 '^'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x1F], // 95 '_'
    [0x08,0x04,0x02,0x00,0x00,0x00,0x00], // 96 '`'
    [0x00,0x00,0x0E,0x01,0x0F,0x11,0x0F], // 97 'a'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x1E], // 98 'b'
    [0x00,0x00,0x0E,0x10,0x10,0x11,0x0E], // 99 'c'
    [0x01,0x01,0x0D,0x13,0x11,0x11,0x0F], // 100 'd'
    [0x00,0x00,0x0E,0x11,0x1F,0x10,0x0E], // 101 'e'
    [0x06,0x09,0x08,0x1C,0x08,0x08,0x08], // 102 'f'
    [0x00,0x00,0x0F,0x11,0x0F,0x01,0x0E], // 103 'g'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x11], // 104 'h'
    [0x04,0x00,0x0C,0x04,0x04,0x04,0x0E], // 105 'i'
    [0x02,0x00,0x06,0x02,0x02,0x12,0x0C], // 106 'j'
    [0x10,0x10,0x12,0x14,0x18,0x14,0x12], // 107 'k'
    [0x0C,0x04,0x04,0x04,0x04,0x04,0x0E], // 108 'l'
    [0x00,0x00,0x1A,0x15,0x15,0x11,0x11], // 109 'm'
    [0x00,0x00,0x16,0x19,0x11,0x11,0x11], // 110 'n'
    [0x00,0x00,0x0E,0x11,0x11,0x11,0x0E], // 111 'o'
    [0x00,0x00,0x1E,0x11,0x1E,0x10,0x10], // 112 'p'
    [0x00,0x00,0x0D,0x13,0x0F,0x01,0x01], // 113 'q'
    [0x00,0x00,0x16,0x19,0x10,0x10,0x10], // 114 'r'
    [0x00,0x00,0x0E,0x10,0x0E,0x01,0x1E], // 115 's'
    [0x08,0x08,0x1C,0x08,0x08,0x09,0x06], // 116 't'
    [0x00,0x00,0x11,0x11,0x11,0x13,0x0D], // 117 'u'
    [0x00,0x00,0x11,0x11,0x11,0x0A,0x04], // 118 'v'
    [0x00,0x00,0x11,0x11,0x15,0x15,0x0A], // 119 'w'
    [0x00,0x00,0x11,0x0A,0x04,0x0A,0x11], // 120 'x'
    [0x00,0x00,0x11,0x11,0x0F,0x01,0x0E], // 121 'y'
    [0x00,0x00,0x1F,0x02,0x04,0x08,0x1F], // 122 'z'
    [0x02,0x04,0x04,0x08,0x04,0x04,0x02], // 123 '{'
    [0x04,0x04,0x04,0x04,0x04,0x04,0x04], // 124 '|'
    [0x08,0x04,0x04,0x02,0x04,0x04,0x08], // 125 '}'
    [0x00,0x00,0x08,0x15,0x02,0x00,0x00], // 126 '~'
];

/// An RGBA pixel buffer with drawing primitives.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[background.r, background.g, background.b, background.a]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at a pixel, if it lies on the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some(Rgba::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    /// Source-over blend of `color` onto one pixel. Out-of-bounds writes
    /// are dropped.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if color.a == 0 || x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let out = if color.a == 255 {
            color
        } else {
            let dst = Rgba::new(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            );
            color.over(dst)
        };
        self.pixels[idx] = out.r;
        self.pixels[idx + 1] = out.g;
        self.pixels[idx + 2] = out.b;
        self.pixels[idx + 3] = out.a;
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgba) {
        for dy in 0..h as i64 {
            for dx in 0..w as i64 {
                self.blend_pixel(x + dx, y + dy, color);
            }
        }
    }

    pub fn draw_hline(&mut self, x: i64, y: i64, w: u32, color: Rgba) {
        for dx in 0..w as i64 {
            self.blend_pixel(x + dx, y, color);
        }
    }

    pub fn draw_vline(&mut self, x: i64, y: i64, h: u32, color: Rgba) {
        for dy in 0..h as i64 {
            self.blend_pixel(x, y + dy, color);
        }
    }

    /// One-pixel line between two points.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        let mut last = None;
        for i in 0..=steps as u64 {
            let t = i as f64 / steps;
            let px = (x0 + dx * t).round() as i64;
            let py = (y0 + dy * t).round() as i64;
            if last != Some((px, py)) {
                self.blend_pixel(px, py, color);
                last = Some((px, py));
            }
        }
    }

    /// Fill a simple polygon with even-odd scanlines sampled at pixel
    /// centers. Rings may close explicitly or implicitly.
    pub fn fill_polygon(&mut self, pts: &[(f64, f64)], color: Rgba) {
        if pts.len() < 3 {
            return;
        }

        let min_y = pts.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = pts.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let y_start = (min_y.floor().max(0.0)) as i64;
        let y_end = (max_y.ceil().min(self.height as f64 - 1.0)) as i64;

        let n = pts.len();
        let mut crossings: Vec<f64> = Vec::new();
        for py in y_start..=y_end {
            let yc = py as f64 + 0.5;
            crossings.clear();
            for i in 0..n {
                let (px0, py0) = pts[i];
                let (px1, py1) = pts[(i + 1) % n];
                if (py0 <= yc && py1 > yc) || (py1 <= yc && py0 > yc) {
                    let t = (yc - py0) / (py1 - py0);
                    crossings.push(px0 + t * (px1 - px0));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks(2) {
                if let [x0, x1] = pair {
                    let start = (x0 - 0.5).ceil() as i64;
                    let end = (x1 - 0.5).floor() as i64;
                    for px in start..=end {
                        self.blend_pixel(px, py, color);
                    }
                }
            }
        }
    }

    /// One-pixel outline of a polygon, closing the ring if needed.
    pub fn stroke_polygon(&mut self, pts: &[(f64, f64)], color: Rgba) {
        if pts.len() < 2 {
            return;
        }
        let n = pts.len();
        for i in 0..n {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % n];
            self.draw_line(x0, y0, x1, y1, color);
        }
    }

    pub fn draw_char(&mut self, x: i64, y: i64, ch: char, color: Rgba) {
        let code = ch as u32;
        if !(32..=126).contains(&code) {
            return;
        }
        let glyph = &FONT_5X7[(code - 32) as usize];
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..5i64 {
                if bits & (0x10 >> col) != 0 {
                    self.blend_pixel(x + col, y + row as i64, color);
                }
            }
        }
    }

    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Rgba) {
        for (i, ch) in text.chars().enumerate() {
            self.draw_char(x + i as i64 * CHAR_W as i64, y, ch, color);
        }
    }

    /// Pixel width of `text` in the embedded font.
    pub fn text_width(text: &str) -> u32 {
        text.chars().count() as u32 * CHAR_W
    }

    /// Encode the canvas as a PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, PngError> {
        png::encode_auto(&self.pixels, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_polygon_covers_interior() {
        let mut canvas = Canvas::new(10, 10, Rgba::WHITE);
        let square = [(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)];
        canvas.fill_polygon(&square, Rgba::opaque(255, 0, 0));

        assert_eq!(canvas.pixel(5, 5), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(9, 9), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_polygon_respects_closing_point() {
        // explicitly closed ring draws the same as the implicit one
        let mut a = Canvas::new(10, 10, Rgba::WHITE);
        let mut b = Canvas::new(10, 10, Rgba::WHITE);
        let open = [(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)];
        let closed = [(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0), (1.0, 1.0)];
        a.fill_polygon(&open, Rgba::BLACK);
        b.fill_polygon(&closed, Rgba::BLACK);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_blend_is_clipped() {
        let mut canvas = Canvas::new(4, 4, Rgba::WHITE);
        canvas.blend_pixel(-1, 0, Rgba::BLACK);
        canvas.blend_pixel(0, 99, Rgba::BLACK);
        assert!(canvas.pixels().chunks(4).all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn test_translucent_fill_blends_with_background() {
        let mut canvas = Canvas::new(4, 4, Rgba::WHITE);
        canvas.fill_rect(0, 0, 4, 4, Rgba::new(0, 0, 0, 128));
        let p = canvas.pixel(1, 1).unwrap();
        assert!(p.r > 100 && p.r < 150);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut canvas = Canvas::new(30, 12, Rgba::WHITE);
        canvas.draw_text(1, 1, "1.5", Rgba::BLACK);
        let dark = canvas
            .pixels()
            .chunks(4)
            .filter(|p| p[0] == 0 && p[3] == 255)
            .count();
        assert!(dark > 0);
        assert_eq!(Canvas::text_width("1.5"), 18);
    }
}
