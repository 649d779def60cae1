// Window + software drawing utilities.
// 1) A window that shows the canvas with the skeleton overlay on top.
// 2) Round-capped thick lines and circle outlines (the overlay primitives).
// 3) A tiny 5x7 bitmap font for the status line under the canvas.

use crate::error::Error;
use crate::types::{FrameBuffer, Point};
use image::GrayImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window of the given size.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Poll input without pushing a new frame.
    pub fn idle(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current mouse position in window pixel coordinates (clamped to the window).
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| Point::new(x.max(0.0) as i32, y.max(0.0) as i32))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// True on the frame a key goes down (no auto-repeat).
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Like `pressed_once` but repeats while held (sliders).
    pub fn pressed_repeat(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::Yes)
    }
}

/* ---------- Drawing surface used by the overlay renderer ---------- */

/// Where the overlay renderer puts its output. `FrameBuffer` rasterizes;
/// tests can record calls instead.
pub trait Surface {
    /// Copy a grayscale raster to the origin, pixel for pixel.
    fn blit_gray(&mut self, img: &GrayImage);
    /// Round-capped line of the given stroke width.
    fn line(&mut self, a: Point, b: Point, width: f32, color: u32);
    /// Circle outline centered at `center`.
    fn circle(&mut self, center: Point, radius: f32, width: f32, color: u32);
}

impl Surface for FrameBuffer {
    fn blit_gray(&mut self, img: &GrayImage) {
        let w = (img.width() as usize).min(self.width);
        let h = (img.height() as usize).min(self.height);
        for y in 0..h {
            for x in 0..w {
                let v = img.get_pixel(x as u32, y as u32)[0] as u32;
                self.pixels[y * self.width + x] = (v << 16) | (v << 8) | v;
            }
        }
    }

    fn line(&mut self, a: Point, b: Point, width: f32, color: u32) {
        let (w, h) = (self.width as i32, self.height as i32);
        fill_capsule(w, h, a, b, stroke_radius(width), |x, y| put_pixel(self, x, y, color));
    }

    fn circle(&mut self, center: Point, radius: f32, width: f32, color: u32) {
        let (w, h) = (self.width as i32, self.height as i32);
        stroke_ring(w, h, center, radius, stroke_radius(width), |x, y| put_pixel(self, x, y, color));
    }
}

/// Half the stroke width, never thinner than a single pixel.
#[inline]
pub fn stroke_radius(width: f32) -> f32 {
    if width.is_finite() { (width * 0.5).max(0.5) } else { 0.5 }
}

/// Visit every in-bounds pixel whose center lies within `radius` of the
/// segment `a`–`b`. With `a == b` this is a filled disc (a round dot).
pub fn fill_capsule(
    width: i32,
    height: i32,
    a: Point,
    b: Point,
    radius: f32,
    mut plot: impl FnMut(i32, i32),
) {
    let r = radius.max(0.0);
    let Some((x_lo, x_hi)) = clip_span(a.x.min(b.x), a.x.max(b.x), r, width) else {
        return;
    };
    let Some((y_lo, y_hi)) = clip_span(a.y.min(b.y), a.y.max(b.y), r, height) else {
        return;
    };

    // Scan just the bounding box; a small epsilon keeps exact half-pixel
    // distances inside.
    let limit = r + 1e-3;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if crate::simplify::perp_distance(Point::new(x, y), a, b) <= limit {
                plot(x, y);
            }
        }
    }
}

/// Visit every in-bounds pixel within `half_width` of the circle of
/// `radius` around `center`.
pub fn stroke_ring(
    width: i32,
    height: i32,
    center: Point,
    radius: f32,
    half_width: f32,
    mut plot: impl FnMut(i32, i32),
) {
    let outer = radius.max(0.0) + half_width;
    let Some((x_lo, x_hi)) = clip_span(center.x, center.x, outer, width) else {
        return;
    };
    let Some((y_lo, y_hi)) = clip_span(center.y, center.y, outer, height) else {
        return;
    };
    let limit = half_width + 1e-3;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let dx = x as f32 - center.x as f32;
            let dy = y as f32 - center.y as f32;
            let d = (dx * dx + dy * dy).sqrt();
            if (d - radius).abs() <= limit {
                plot(x, y);
            }
        }
    }
}

/// `[lo - pad, hi + pad]` clipped to `0..len`, computed in f32 so huge
/// radii can't overflow. `None` when nothing is on screen.
fn clip_span(lo: i32, hi: i32, pad: f32, len: i32) -> Option<(i32, i32)> {
    if len <= 0 || pad.is_nan() {
        return None;
    }
    let lo = (lo as f32 - pad).floor().max(0.0);
    let hi = (hi as f32 + pad).ceil().min((len - 1) as f32);
    if lo > hi {
        return None;
    }
    Some((lo as i32, hi as i32))
}

/* ---------- Software drawing: pixels, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Fill a horizontal band of rows, e.g. the status strip under the canvas.
pub fn fill_rows(fb: &mut FrameBuffer, y0: usize, y1: usize, color: u32) {
    let y1 = y1.min(fb.height);
    if y0 >= y1 {
        return;
    }
    fb.pixels[y0 * fb.width..y1 * fb.width].fill(color);
}

/* ---------- 5x7 bitmap font (uppercase, digits, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Lowercase maps onto uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; unknown characters leave a gap.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
