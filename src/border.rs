//! Border topology extraction: turns the per-tile ownership grid into
//! polyline contours per faction, using marching-squares cell
//! classification, segment chaining, and optional corner rounding.
//!
//! Coordinates are in vertex space: vertex (vx, vy) is the corner shared by
//! tiles (vx-1, vy-1) .. (vx, vy), and every emitted point lies on a
//! mid-edge, so all coordinates are multiples of 0.5.

use std::collections::{HashMap, HashSet};

use crate::faction::FactionId;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

/// An ordered border polyline for one faction. Open contours terminate
/// against the map edge.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Default corner-rounding radius and arc resolution.
pub const SMOOTH_RADIUS: f64 = 0.18;
pub const SMOOTH_ARC_STEPS: u32 = 5;

/// Canonical integer key for a point: both coordinates are multiples of
/// 0.5, so doubling yields exact integers; packing them into one u64 gives
/// collision-free, allocation-free hashing.
fn point_key(p: Point) -> u64 {
    let x = (p.x * 2.0).round() as i32;
    let y = (p.y * 2.0).round() as i32;
    ((x as u32 as u64) << 32) | y as u32 as u64
}

/// Canonical key for an undirected segment.
pub fn segment_key(s: &Segment) -> (u64, u64) {
    let ka = point_key(s.a);
    let kb = point_key(s.b);
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// A grid vertex counts as owned when any of its up-to-four adjacent tiles
/// belongs to the faction.
fn vertex_owned(world: &World, id: FactionId, vx: i64, vy: i64) -> bool {
    [(vx - 1, vy - 1), (vx, vy - 1), (vx - 1, vy), (vx, vy)]
        .iter()
        .any(|&(x, y)| world.in_bounds(x, y) && world.owner[world.idx(x as u32, y as u32)] == Some(id))
}

/// Mid-edge segment endpoints per 4-bit corner mask. Edge indices: 0 top,
/// 1 right, 2 bottom, 3 left. Masks 5 and 10 (the saddle cases) emit a
/// fixed two-segment pair, independent of neighbor context.
const MASK_SEGMENTS: [&[(u8, u8)]; 16] = [
    &[],
    &[(3, 0)],
    &[(0, 1)],
    &[(3, 1)],
    &[(1, 2)],
    &[(3, 2), (0, 1)],
    &[(0, 2)],
    &[(3, 2)],
    &[(2, 3)],
    &[(2, 0)],
    &[(0, 3), (1, 2)],
    &[(1, 2)],
    &[(1, 3)],
    &[(0, 1)],
    &[(3, 0)],
    &[],
];

/// Raw unordered border segments for one faction.
pub fn boundary_segments(world: &World, id: FactionId) -> Vec<Segment> {
    let mut segments = Vec::new();
    for y in 0..world.height() as i64 {
        for x in 0..world.width() as i64 {
            let tl = vertex_owned(world, id, x, y) as u8;
            let tr = vertex_owned(world, id, x + 1, y) as u8;
            let br = vertex_owned(world, id, x + 1, y + 1) as u8;
            let bl = vertex_owned(world, id, x, y + 1) as u8;
            let mask = (tl | (tr << 1) | (br << 2) | (bl << 3)) as usize;
            if mask == 0 || mask == 15 {
                continue;
            }
            let (fx, fy) = (x as f64, y as f64);
            let edges = [
                Point::new(fx + 0.5, fy),
                Point::new(fx + 1.0, fy + 0.5),
                Point::new(fx + 0.5, fy + 1.0),
                Point::new(fx, fy + 0.5),
            ];
            for &(e0, e1) in MASK_SEGMENTS[mask] {
                segments.push(Segment {
                    a: edges[e0 as usize],
                    b: edges[e1 as usize],
                });
            }
        }
    }
    segments
}

/// Chain an unordered segment set into maximal polylines by extending from
/// both ends at matching endpoints. A polyline whose ends meet is closed;
/// unmatched ends mean an open border against the map edge.
pub fn chain_segments(segments: &[Segment]) -> Vec<Contour> {
    let mut by_endpoint: HashMap<u64, Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        by_endpoint.entry(point_key(s.a)).or_default().push(i);
        by_endpoint.entry(point_key(s.b)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut points = vec![segments[start].a, segments[start].b];

        // Grow forward from the tail, then backward from the head.
        loop {
            let tail = points[points.len() - 1];
            match next_unused(segments, &by_endpoint, &used, tail) {
                Some((i, p)) => {
                    used[i] = true;
                    points.push(p);
                }
                None => break,
            }
        }
        loop {
            let head = points[0];
            match next_unused(segments, &by_endpoint, &used, head) {
                Some((i, p)) => {
                    used[i] = true;
                    points.insert(0, p);
                }
                None => break,
            }
        }

        let closed = points.len() > 2 && point_key(points[0]) == point_key(points[points.len() - 1]);
        if closed {
            points.pop();
        }
        contours.push(Contour { points, closed });
    }
    contours
}

fn next_unused(
    segments: &[Segment],
    by_endpoint: &HashMap<u64, Vec<usize>>,
    used: &[bool],
    at: Point,
) -> Option<(usize, Point)> {
    let key = point_key(at);
    for &i in by_endpoint.get(&key)? {
        if used[i] {
            continue;
        }
        let s = &segments[i];
        if point_key(s.a) == key {
            return Some((i, s.b));
        }
        if point_key(s.b) == key {
            return Some((i, s.a));
        }
    }
    None
}

/// Trace the territory boundary of one faction as chained contours.
pub fn trace_borders(world: &World, id: FactionId) -> Vec<Contour> {
    chain_segments(&boundary_segments(world, id))
}

/// Canonical segment-key set for one faction's current border; pair with
/// `added_segments` to diff the border across an ownership change.
pub fn segment_keys(world: &World, id: FactionId) -> HashSet<(u64, u64)> {
    boundary_segments(world, id)
        .iter()
        .map(segment_key)
        .collect()
}

/// Border segments present now but absent from a previously captured key
/// set -- the pieces gained by an annexation or conquest.
pub fn added_segments(
    world: &World,
    id: FactionId,
    before: &HashSet<(u64, u64)>,
) -> Vec<Segment> {
    boundary_segments(world, id)
        .into_iter()
        .filter(|s| !before.contains(&segment_key(s)))
        .collect()
}

fn direction(from: Point, to: Point) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON {
        Point::new(0.0, 0.0)
    } else {
        Point::new(dx / len, dy / len)
    }
}

/// A vertex is a smoothable corner when consecutive directions are neither
/// colinear nor exactly reversed.
fn is_corner(d0: Point, d1: Point) -> bool {
    let dot = d0.x * d1.x + d0.y * d1.y;
    dot.abs() < 1.0 - 1e-6
}

impl Contour {
    /// Replace each sharp interior turn with a short circular arc of the
    /// given radius. Endpoints are preserved.
    pub fn smoothed(&self, radius: f64, arc_steps: u32) -> Contour {
        if self.points.len() < 3 {
            return self.clone();
        }
        let r = radius.max(0.001);
        let steps = arc_steps.max(2);
        let mut out = Vec::with_capacity(self.points.len());
        out.push(self.points[0]);
        for i in 1..self.points.len() - 1 {
            let p0 = self.points[i - 1];
            let p1 = self.points[i];
            let p2 = self.points[i + 1];
            let d0 = direction(p0, p1);
            let d1 = direction(p1, p2);
            if !is_corner(d0, d1) {
                out.push(p1);
                continue;
            }
            let in_pt = Point::new(p1.x - d0.x * r, p1.y - d0.y * r);
            let out_pt = Point::new(p1.x + d1.x * r, p1.y + d1.y * r);
            let cx = p1.x + (-d0.x + d1.x) * r;
            let cy = p1.y + (-d0.y + d1.y) * r;
            let start_ang = (-d0.y).atan2(-d0.x);
            let end_ang = d1.y.atan2(d1.x);
            let mut diff = end_ang - start_ang;
            if diff > std::f64::consts::PI {
                diff -= 2.0 * std::f64::consts::PI;
            }
            if diff < -std::f64::consts::PI {
                diff += 2.0 * std::f64::consts::PI;
            }
            let step = diff / steps as f64;
            out.push(in_pt);
            for s in 1..steps {
                let a = start_ang + step * s as f64;
                out.push(Point::new(cx + a.cos() * r, cy + a.sin() * r));
            }
            out.push(out_pt);
        }
        out.push(self.points[self.points.len() - 1]);
        Contour {
            points: out,
            closed: self.closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saddle_masks_emit_two_segments() {
        assert_eq!(MASK_SEGMENTS[5].len(), 2);
        assert_eq!(MASK_SEGMENTS[10].len(), 2);
        for (mask, edges) in MASK_SEGMENTS.iter().enumerate() {
            let expected = match mask {
                0 | 15 => 0,
                5 | 10 => 2,
                _ => 1,
            };
            assert_eq!(edges.len(), expected, "mask {mask}");
        }
    }

    #[test]
    fn point_keys_merge_floating_coincidences() {
        let a = Point::new(1.5, 2.0);
        let b = Point::new(1.5 + 1e-12, 2.0 - 1e-12);
        assert_eq!(point_key(a), point_key(b));
        assert_ne!(point_key(a), point_key(Point::new(2.0, 1.5)));
    }

    #[test]
    fn smoothing_preserves_endpoints_and_straight_runs() {
        let contour = Contour {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 1.0),
            ],
            closed: false,
        };
        let smoothed = contour.smoothed(SMOOTH_RADIUS, SMOOTH_ARC_STEPS);
        assert_eq!(smoothed.points[0], contour.points[0]);
        assert_eq!(*smoothed.points.last().unwrap(), contour.points[3]);
        // The colinear middle vertex survives untouched; the corner gains
        // arc points.
        assert!(smoothed.points.contains(&Point::new(1.0, 0.0)));
        assert!(smoothed.points.len() > contour.points.len());
    }
}
