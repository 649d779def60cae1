//! Composites the raster with the skeleton overlay.
//!
//! Edge paths are simplified first and then drawn segment by segment.
//! Segment `i` of the *simplified* path takes `edge.time[i]` as its stroke
//! width. When simplification leaves the two sequences with different
//! lengths they are zipped to the shorter one: segments without a time
//! value are skipped and surplus time values are ignored.

use image::GrayImage;
use log::trace;

use crate::draw::Surface;
use crate::graph::SkeletonGraph;
use crate::simplify::simplify;
use crate::types::{EDGE_COLOR, NODE_COLOR};

pub const THIN_EDGE_WIDTH: f32 = 2.0;
pub const NODE_OUTLINE_WIDTH: f32 = 2.0;
pub const MAX_SIMPLIFY_TOLERANCE: f32 = 30.0;

/// Overlay settings, passed by value into every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    simplify_tolerance: f32,
    pub thick_lines: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { simplify_tolerance: 0.0, thick_lines: true }
    }
}

impl OverlayConfig {
    pub fn new(simplify_tolerance: f32, thick_lines: bool) -> Self {
        let mut cfg = Self { simplify_tolerance: 0.0, thick_lines };
        cfg.set_simplify_tolerance(simplify_tolerance);
        cfg
    }

    pub fn simplify_tolerance(&self) -> f32 {
        self.simplify_tolerance
    }

    /// Clamped to `0..=MAX_SIMPLIFY_TOLERANCE`; NaN becomes 0.
    pub fn set_simplify_tolerance(&mut self, tolerance: f32) {
        self.simplify_tolerance = if tolerance.is_nan() {
            0.0
        } else {
            tolerance.clamp(0.0, MAX_SIMPLIFY_TOLERANCE)
        };
    }
}

/// What one render pass drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub segments: usize,
    /// Simplified segments left undrawn for lack of a time value.
    pub skipped_segments: usize,
    pub nodes: usize,
}

/// Draw `raster` at the origin, then (if present) the graph's edges and
/// finally its node markers on top. Reads only; nothing is mutated but
/// `surface`.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    raster: &GrayImage,
    graph: Option<&SkeletonGraph>,
    config: OverlayConfig,
) -> RenderStats {
    surface.blit_gray(raster);

    let mut stats = RenderStats::default();
    let Some(graph) = graph else {
        return stats;
    };

    for edge in graph.edges() {
        let path = simplify(&edge.path, config.simplify_tolerance);
        let seg_count = path.len().saturating_sub(1);

        for (seg, &t) in path.windows(2).zip(edge.time.iter()) {
            let width = if config.thick_lines { t } else { THIN_EDGE_WIDTH };
            surface.line(seg[0], seg[1], width, EDGE_COLOR);
            stats.segments += 1;
        }

        let missing = seg_count.saturating_sub(edge.time.len());
        if missing > 0 {
            trace!(
                "edge ({}, {})-({}, {}): {missing} segment(s) without time",
                edge.a.x, edge.a.y, edge.b.x, edge.b.y
            );
            stats.skipped_segments += missing;
        }
    }

    for node in graph.nodes() {
        surface.circle(node.pos, node.time, NODE_OUTLINE_WIDTH, NODE_COLOR);
        stats.nodes += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};
    use crate::types::{FrameBuffer, Point};
    use image::Luma;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Blit(u32, u32),
        Line(Point, Point, f32, u32),
        Circle(Point, f32, f32, u32),
    }

    #[derive(Default)]
    struct Recorder(Vec<Op>);

    impl Surface for Recorder {
        fn blit_gray(&mut self, img: &GrayImage) {
            self.0.push(Op::Blit(img.width(), img.height()));
        }
        fn line(&mut self, a: Point, b: Point, width: f32, color: u32) {
            self.0.push(Op::Line(a, b, width, color));
        }
        fn circle(&mut self, center: Point, radius: f32, width: f32, color: u32) {
            self.0.push(Op::Circle(center, radius, width, color));
        }
    }

    fn graph(path: &[(i32, i32)], time: &[f32], node_time: f32) -> SkeletonGraph {
        let path: Vec<Point> = path.iter().copied().map(Point::from).collect();
        let (a, b) = (path[0], *path.last().unwrap());
        SkeletonGraph::new(
            vec![Node { pos: a, time: node_time }, Node { pos: b, time: node_time }],
            vec![Edge { a, b, path, time: time.to_vec() }],
        )
        .unwrap()
    }

    #[test]
    fn no_graph_draws_raster_only() {
        let raster = GrayImage::from_pixel(4, 4, Luma([255]));
        let mut rec = Recorder::default();
        let stats = render(&mut rec, &raster, None, OverlayConfig::default());
        assert_eq!(rec.0, vec![Op::Blit(4, 4)]);
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn edges_before_nodes_with_thick_widths() {
        let g = graph(&[(0, 0), (50, 0), (100, 0)], &[2.0, 3.0], 4.0);
        let raster = GrayImage::new(128, 128);
        let mut rec = Recorder::default();
        render(&mut rec, &raster, Some(&g), OverlayConfig::new(0.0, true));

        assert_eq!(rec.0[0], Op::Blit(128, 128));
        assert_eq!(rec.0[1], Op::Line(Point::new(0, 0), Point::new(50, 0), 2.0, EDGE_COLOR));
        assert_eq!(rec.0[2], Op::Line(Point::new(50, 0), Point::new(100, 0), 3.0, EDGE_COLOR));
        assert!(matches!(rec.0[3], Op::Circle(_, r, w, c) if r == 4.0 && w == NODE_OUTLINE_WIDTH && c == NODE_COLOR));
        assert_eq!(rec.0.len(), 5);
    }

    #[test]
    fn thin_lines_use_fixed_width() {
        let g = graph(&[(0, 0), (10, 10), (20, 0)], &[9.0, 9.0], 1.0);
        let mut rec = Recorder::default();
        render(&mut rec, &GrayImage::new(1, 1), Some(&g), OverlayConfig::new(0.0, false));
        let widths: Vec<f32> = rec
            .0
            .iter()
            .filter_map(|op| match op {
                Op::Line(_, _, w, _) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![THIN_EDGE_WIDTH, THIN_EDGE_WIDTH]);
    }

    #[test]
    fn simplified_path_consumes_leading_time_values() {
        // Collinear middle vertex goes away; one segment remains and it
        // takes the first time value.
        let g = graph(&[(0, 0), (5, 0), (10, 0)], &[7.0, 1.0], 1.0);
        let mut rec = Recorder::default();
        let stats = render(&mut rec, &GrayImage::new(1, 1), Some(&g), OverlayConfig::new(1.0, true));
        assert_eq!(stats.segments, 1);
        assert_eq!(rec.0[1], Op::Line(Point::new(0, 0), Point::new(10, 0), 7.0, EDGE_COLOR));
    }

    #[test]
    fn short_time_sequence_skips_trailing_segments() {
        let g = graph(&[(0, 0), (10, 0), (10, 10), (0, 10)], &[3.0], 1.0);
        let mut rec = Recorder::default();
        let stats = render(&mut rec, &GrayImage::new(1, 1), Some(&g), OverlayConfig::default());
        assert_eq!(stats.segments, 1);
        assert_eq!(stats.skipped_segments, 2);
        assert_eq!(stats.nodes, 2);
    }

    #[test]
    fn tolerance_is_clamped() {
        let mut cfg = OverlayConfig::default();
        cfg.set_simplify_tolerance(-4.0);
        assert_eq!(cfg.simplify_tolerance(), 0.0);
        cfg.set_simplify_tolerance(400.0);
        assert_eq!(cfg.simplify_tolerance(), MAX_SIMPLIFY_TOLERANCE);
        cfg.set_simplify_tolerance(f32::NAN);
        assert_eq!(cfg.simplify_tolerance(), 0.0);
    }

    #[test]
    fn framebuffer_render_leaves_far_pixels_alone() {
        let g = graph(&[(2, 2), (10, 2)], &[1.0], 1.0);
        let raster = GrayImage::from_pixel(32, 32, Luma([255]));
        let mut fb = FrameBuffer::new(32, 32);
        render(&mut fb, &raster, Some(&g), OverlayConfig::default());
        assert_eq!(fb.get(6, 2), Some(EDGE_COLOR));
        assert_eq!(fb.get(30, 30), Some(0x00FF_FFFF));
    }

    #[test]
    fn huge_thickness_values_render_without_overflow() {
        let raster = GrayImage::from_pixel(32, 32, Luma([255]));

        // node markers far larger than the frame: nothing of the ring is visible
        let rings = SkeletonGraph::new(vec![Node { pos: Point::new(4, 4), time: 1e10 }], vec![]).unwrap();
        let mut fb = FrameBuffer::new(32, 32);
        let stats = render(&mut fb, &raster, Some(&rings), OverlayConfig::default());
        assert_eq!(stats.nodes, 1);
        assert!(fb.pixels.iter().all(|&p| p == 0x00FF_FFFF));

        // an edge that wide covers the whole frame
        let g = graph(&[(2, 2), (10, 2)], &[1e10], 1.0);
        let mut fb = FrameBuffer::new(32, 32);
        render(&mut fb, &raster, Some(&g), OverlayConfig::new(0.0, true));
        assert_eq!(fb.get(31, 31), Some(EDGE_COLOR));
        assert_eq!(fb.get(0, 31), Some(EDGE_COLOR));
    }
}
