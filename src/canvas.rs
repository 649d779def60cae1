//! The drawable raster: one grayscale layer plus an optional skeleton graph
//! computed from it.
//!
//! Every raster edit bumps `revision` and marks the view dirty. Any raster
//! edit drops the attached graph, since the overlay only describes the
//! raster it was computed from.

use image::{GrayImage, Luma};
use log::{debug, trace};

use crate::draw::{fill_capsule, stroke_radius};
use crate::graph::SkeletonGraph;
use crate::types::{BACKGROUND, FOREGROUND, Point};

pub const DEFAULT_PEN_WIDTH: u32 = 3;
pub const MIN_PEN_WIDTH: u32 = 1;
pub const MAX_PEN_WIDTH: u32 = 30;

pub struct RasterCanvas {
    pixels: GrayImage,
    pen_width: u32,
    anchor: Option<Point>, // last stroke point while the button is held
    graph: Option<SkeletonGraph>,
    revision: u64,
    dirty: bool,
}

impl RasterCanvas {
    /// A canvas filled with background (white).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::from_pixel(width, height, Luma([BACKGROUND])),
            pen_width: DEFAULT_PEN_WIDTH,
            anchor: None,
            graph: None,
            revision: 0,
            dirty: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Start a stroke at `p` and stamp a single round dot there.
    pub fn begin_stroke(&mut self, p: Point) {
        self.anchor = Some(p);
        self.stamp_segment(p, p);
    }

    /// Draw from the last stroke point to `p`. Without a prior
    /// `begin_stroke` this behaves like one.
    pub fn extend_stroke(&mut self, p: Point) {
        match self.anchor {
            Some(last) => {
                self.stamp_segment(last, p);
                self.anchor = Some(p);
            }
            None => {
                debug!("extend_stroke without anchor at ({}, {}); starting a new stroke", p.x, p.y);
                self.begin_stroke(p);
            }
        }
    }

    pub fn end_stroke(&mut self) {
        self.anchor = None;
    }

    pub fn is_stroking(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn pen_width(&self) -> u32 {
        self.pen_width
    }

    /// Clamped to `MIN_PEN_WIDTH..=MAX_PEN_WIDTH`.
    pub fn set_pen_width(&mut self, width: i64) {
        self.pen_width = width.clamp(MIN_PEN_WIDTH as i64, MAX_PEN_WIDTH as i64) as u32;
    }

    pub fn clear(&mut self) {
        let raw: &mut [u8] = &mut self.pixels;
        raw.fill(BACKGROUND);
        self.touch();
    }

    /// 8-bit complement of every sample.
    pub fn invert(&mut self) {
        let raw: &mut [u8] = &mut self.pixels;
        for s in raw {
            *s = 255 - *s;
        }
        self.touch();
    }

    /// Immutable copy of the raster, the sole input to skeleton extraction.
    pub fn export_grayscale(&self) -> GrayImage {
        self.pixels.clone()
    }

    /// Borrow the raster for compositing without copying.
    pub fn raster(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn attach_graph(&mut self, graph: SkeletonGraph) {
        debug!(
            "attaching graph: {} nodes, {} edges",
            graph.nodes().len(),
            graph.edges().len()
        );
        self.graph = Some(graph);
        self.dirty = true;
    }

    /// Attach only if the raster hasn't changed since `revision` was read.
    /// Returns whether the graph was attached.
    pub fn attach_graph_if_current(&mut self, revision: u64, graph: SkeletonGraph) -> bool {
        if revision != self.revision {
            debug!("discarding stale graph (rev {revision}, canvas at {})", self.revision);
            return false;
        }
        self.attach_graph(graph);
        true
    }

    pub fn clear_graph(&mut self) {
        if self.graph.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn graph(&self) -> Option<&SkeletonGraph> {
        self.graph.as_ref()
    }

    /// Counter of raster edits; extraction results are tagged with it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Request a redraw without touching the raster (overlay settings changed).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether a redraw is pending; resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Whether `p` lies on the raster.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width() && (p.y as u32) < self.height()
    }

    fn stamp_segment(&mut self, a: Point, b: Point) {
        trace!("segment ({}, {}) -> ({}, {}) w={}", a.x, a.y, b.x, b.y, self.pen_width);
        let (w, h) = (self.pixels.width() as i32, self.pixels.height() as i32);
        let radius = stroke_radius(self.pen_width as f32);
        let pixels = &mut self.pixels;
        fill_capsule(w, h, a, b, radius, |x, y| {
            pixels.put_pixel(x as u32, y as u32, Luma([FOREGROUND]));
        });
        self.touch();
    }

    fn touch(&mut self) {
        self.graph = None;
        self.revision += 1;
        self.dirty = true;
    }
}

/// Turns per-frame button/cursor samples into stroke calls.
/// Samples outside the raster (e.g. over a status strip) never paint.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pointer {
    was_down: bool,
    last: Option<Point>,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's sample: down starts a stroke, drag extends it, up ends it.
    pub fn update(&mut self, canvas: &mut RasterCanvas, down: bool, pos: Option<Point>) {
        let pos = pos.filter(|&p| canvas.contains(p));
        match (self.was_down, down, pos) {
            (false, true, Some(p)) => canvas.begin_stroke(p),
            (true, true, Some(p)) if self.last != Some(p) => canvas.extend_stroke(p),
            (true, false, _) => canvas.end_stroke(),
            _ => {}
        }
        self.was_down = down;
        self.last = pos;
    }
}
