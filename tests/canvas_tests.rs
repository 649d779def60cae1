use skeleton_sketch::canvas::RasterCanvas;
use skeleton_sketch::graph::{Node, SkeletonGraph};
use skeleton_sketch::types::{BACKGROUND, FOREGROUND, Point};

#[cfg(test)]
mod canvas_tests {
    use super::*;

    fn scribble(canvas: &mut RasterCanvas) {
        canvas.set_pen_width(4);
        canvas.begin_stroke(Point::new(20, 20));
        for p in [(60, 25), (90, 80), (40, 120), (41, 121)] {
            canvas.extend_stroke(Point::from(p));
        }
        canvas.end_stroke();
    }

    #[test]
    fn test_single_dot_scenario() {
        let mut canvas = RasterCanvas::new(512, 512);
        canvas.set_pen_width(5);
        canvas.begin_stroke(Point::new(10, 10));
        canvas.end_stroke();

        let img = canvas.export_grayscale();
        assert_ne!(img.get_pixel(10, 10)[0], BACKGROUND);
        assert_eq!(img.get_pixel(500, 500)[0], BACKGROUND);
    }

    #[test]
    fn test_strokes_leave_untouched_pixels_white() {
        let mut canvas = RasterCanvas::new(200, 200);
        scribble(&mut canvas);
        let img = canvas.export_grayscale();

        // Everything right of x=100 or below y=130 is far from the stroke.
        for (x, y, p) in img.enumerate_pixels() {
            if x > 100 || y > 130 {
                assert_eq!(p[0], BACKGROUND, "pixel ({x}, {y}) was touched");
            }
        }
        assert_eq!(img.get_pixel(60, 25)[0], FOREGROUND);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let mut canvas = RasterCanvas::new(64, 64);
        canvas.begin_stroke(Point::new(5, 5));
        canvas.extend_stroke(Point::new(50, 30));
        let before = canvas.export_grayscale();

        canvas.invert();
        assert_ne!(canvas.export_grayscale(), before);
        canvas.invert();
        assert_eq!(canvas.export_grayscale(), before);
    }

    #[test]
    fn test_clear_matches_fresh_canvas() {
        let mut canvas = RasterCanvas::new(128, 64);
        scribble(&mut canvas);
        canvas.attach_graph(
            SkeletonGraph::new(vec![Node { pos: Point::new(1, 1), time: 2.0 }], vec![]).unwrap(),
        );

        canvas.clear();
        assert_eq!(canvas.export_grayscale(), RasterCanvas::new(128, 64).export_grayscale());
        assert!(canvas.graph().is_none());
    }

    #[test]
    fn test_clear_then_invert_is_all_foreground() {
        let mut canvas = RasterCanvas::new(512, 512);
        canvas.clear();
        canvas.invert();
        let img = canvas.export_grayscale();
        assert!(img.pixels().all(|p| p[0] == FOREGROUND));
    }

    #[test]
    fn test_export_is_read_only() {
        let mut canvas = RasterCanvas::new(64, 64);
        scribble(&mut canvas);
        let rev = canvas.revision();
        let first = canvas.export_grayscale();
        for _ in 0..5 {
            let _ = canvas.export_grayscale();
        }
        assert_eq!(canvas.export_grayscale(), first);
        assert_eq!(canvas.revision(), rev);
    }
}
