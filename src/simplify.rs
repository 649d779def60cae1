// Douglas–Peucker polyline simplification for overlay edges.

use crate::types::Point;

/// Drop every vertex whose deviation from the chord between its retained
/// neighbours is `<= tolerance`. Endpoints always survive.
///
/// A tolerance of zero (or below, or NaN) returns the path unchanged, so
/// collinear vertices are kept too.
pub fn simplify(points: &[Point], tolerance: f32) -> Vec<Point> {
    if points.len() <= 2 || !(tolerance > 0.0) {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    mark_section(points, 0, points.len() - 1, tolerance, &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn mark_section(points: &[Point], i: usize, j: usize, tolerance: f32, keep: &mut [bool]) {
    if j <= i + 1 {
        return;
    }

    let mut max_dist = -1.0f32;
    let mut max_idx = i;
    for k in (i + 1)..j {
        let d = perp_distance(points[k], points[i], points[j]);
        if d > max_dist {
            max_dist = d;
            max_idx = k;
        }
    }

    if max_dist <= tolerance {
        return; // everything between i and j is dropped
    }

    keep[max_idx] = true;
    mark_section(points, i, max_idx, tolerance, keep);
    mark_section(points, max_idx, j, tolerance, keep);
}

/// Distance from `p` to the segment `a`–`b` (point distance when `a == b`).
pub(crate) fn perp_distance(p: Point, a: Point, b: Point) -> f32 {
    let (px, py) = (p.x as f32, p.y as f32);
    let (ax, ay) = (a.x as f32, a.y as f32);
    let (bx, by) = (b.x as f32, b.y as f32);
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
