use image::{GrayImage, Luma};
use skeleton_sketch::canvas::RasterCanvas;
use skeleton_sketch::draw::Surface;
use skeleton_sketch::extract::{SkeletonExtractor, ThinningExtractor};
use skeleton_sketch::graph::{Edge, Node, SkeletonGraph};
use skeleton_sketch::overlay::{OverlayConfig, render};
use skeleton_sketch::types::{FrameBuffer, Mask, NODE_COLOR, Point};

/// Records primitive calls instead of rasterizing them.
#[derive(Default)]
struct Recording {
    blits: usize,
    lines: Vec<(Point, Point, f32)>,
    circles: Vec<(Point, f32)>,
}

impl Surface for Recording {
    fn blit_gray(&mut self, _img: &GrayImage) {
        self.blits += 1;
    }
    fn line(&mut self, a: Point, b: Point, width: f32, _color: u32) {
        self.lines.push((a, b, width));
    }
    fn circle(&mut self, center: Point, radius: f32, _width: f32, _color: u32) {
        self.circles.push((center, radius));
    }
}

#[cfg(test)]
mod overlay_tests {
    use super::*;

    fn scenario_graph() -> SkeletonGraph {
        let path = vec![Point::new(0, 0), Point::new(50, 0), Point::new(100, 0)];
        SkeletonGraph::new(
            vec![
                Node { pos: Point::new(0, 0), time: 1.0 },
                Node { pos: Point::new(100, 100), time: 4.0 },
                Node { pos: Point::new(100, 0), time: 1.0 },
            ],
            vec![Edge { a: Point::new(0, 0), b: Point::new(100, 0), path, time: vec![2.0, 2.0] }],
        )
        .unwrap()
    }

    #[test]
    fn test_two_segments_and_one_radius_four_circle() {
        let raster = GrayImage::from_pixel(512, 512, Luma([255]));
        let g = scenario_graph();
        let mut rec = Recording::default();
        render(&mut rec, &raster, Some(&g), OverlayConfig::new(0.0, true));

        assert_eq!(rec.blits, 1);
        assert_eq!(
            rec.lines,
            vec![
                (Point::new(0, 0), Point::new(50, 0), 2.0),
                (Point::new(50, 0), Point::new(100, 0), 2.0),
            ]
        );
        assert!(rec.circles.contains(&(Point::new(100, 100), 4.0)));
    }

    #[test]
    fn test_marker_radius_is_node_time() {
        let g = scenario_graph();
        for cfg in [OverlayConfig::new(0.0, true), OverlayConfig::new(25.0, false)] {
            let mut rec = Recording::default();
            render(&mut rec, &GrayImage::new(1, 1), Some(&g), cfg);
            let expected: Vec<(Point, f32)> = g.nodes().iter().map(|n| (n.pos, n.time)).collect();
            assert_eq!(rec.circles, expected);
        }
    }

    #[test]
    fn test_render_does_not_mutate_inputs() {
        let raster = GrayImage::from_pixel(128, 128, Luma([200]));
        let g = scenario_graph();
        let (raster_before, g_before) = (raster.clone(), g.clone());
        let mut fb = FrameBuffer::new(128, 128);
        render(&mut fb, &raster, Some(&g), OverlayConfig::new(3.0, true));
        assert_eq!(raster, raster_before);
        assert_eq!(g, g_before);
        assert_eq!(fb.get(100, 96), Some(NODE_COLOR));
    }

    #[test]
    fn test_cleared_canvas_renders_raster_only() {
        let mut canvas = RasterCanvas::new(64, 64);
        canvas.attach_graph(scenario_graph());
        canvas.clear();
        let mut rec = Recording::default();
        render(&mut rec, canvas.raster(), canvas.graph(), OverlayConfig::default());
        assert_eq!(rec.blits, 1);
        assert!(rec.lines.is_empty());
        assert!(rec.circles.is_empty());
    }

    #[test]
    fn test_drawn_stroke_round_trips_through_extraction() {
        let mut canvas = RasterCanvas::new(120, 60);
        canvas.set_pen_width(7);
        canvas.begin_stroke(Point::new(15, 30));
        canvas.extend_stroke(Point::new(100, 30));
        canvas.end_stroke();

        let rev = canvas.revision();
        let mask = Mask::from_grayscale(&canvas.export_grayscale());
        let graph = ThinningExtractor.extract(&mask).unwrap();
        assert!(!graph.edges().is_empty());
        assert!(canvas.attach_graph_if_current(rev, graph));

        let mut rec = Recording::default();
        render(&mut rec, canvas.raster(), canvas.graph(), OverlayConfig::new(2.0, true));
        assert!(!rec.lines.is_empty());
        assert!(rec.lines.iter().all(|&(_, _, w)| w > 0.0));
        assert_eq!(rec.circles.len(), canvas.graph().map_or(0, |g| g.nodes().len()));
    }
}
