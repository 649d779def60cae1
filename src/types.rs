// Core types shared by the canvas, the overlay and the window.

use image::GrayImage;

/// Intensity of untouched canvas pixels.
pub const BACKGROUND: u8 = 255;
/// Intensity the pen paints with.
pub const FOREGROUND: u8 = 0;

pub const EDGE_COLOR: u32 = 0x00_87_CE_EB; // skyblue
pub const NODE_COLOR: u32 = 0x00_CD_5C_5C; // indianred
pub const HUD_COLOR: u32 = 0x00_30_30_30;

/// Integer canvas coordinate (x to the right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

/// Foreground/background mask handed to the skeleton extractor.
/// `true` = foreground (anything darker than pure white).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub fg: Vec<bool>, // row-major, length = width * height
}

impl Mask {
    /// Threshold a grayscale snapshot as `sample < 255`.
    pub fn from_grayscale(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        let fg = img.as_raw().iter().map(|&s| s < BACKGROUND).collect();
        Self { width: w as usize, height: h as usize, fg }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.fg[y as usize * self.width + x as usize]
    }
}
