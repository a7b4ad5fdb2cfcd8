//! Extruded text geometry: ear-clipped caps plus side walls.

use glam::{Vec2, Vec3};

use crate::model::font::{signed_area, Font, Shape};
use crate::utils::Mesh;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { size: 1.0, depth: 0.2, curve_segments: 12 }
    }
}

/// Extrude `text` set in `font` from z = 0 to z = `options.depth`.
pub fn text_geometry(font: &Font, text: &str, options: TextOptions) -> Mesh {
    let shapes = font.generate_shapes(text, options.size, options.curve_segments);
    let mesh = extrude_shapes(&shapes, options.depth);
    tracing::debug!(text, shapes = shapes.len(), triangles = mesh.triangle_count(), "built text geometry");
    mesh
}

pub fn extrude_shapes(shapes: &[Shape], depth: f32) -> Mesh {
    let mut mesh = Mesh::empty();
    for shape in shapes {
        extrude_shape(&mut mesh, shape, depth);
    }
    mesh
}

fn extrude_shape(mesh: &mut Mesh, shape: &Shape, depth: f32) {
    if shape.contour.len() < 3 {
        return;
    }
    let contour = oriented(&shape.contour, true);
    let holes: Vec<Vec<Vec2>> = shape
        .holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| oriented(h, false))
        .collect();

    let (points, triangles) = triangulate(&contour, &holes);
    let at = |p: Vec2, z: f32| Vec3::new(p.x, p.y, z);
    for [a, b, c] in triangles {
        let (a, b, c) = (points[a], points[b], points[c]);
        mesh.push_triangle(at(a, depth), at(b, depth), at(c, depth), Vec3::Z);
        mesh.push_triangle(at(a, 0.0), at(c, 0.0), at(b, 0.0), Vec3::NEG_Z);
    }

    for ring in std::iter::once(&contour).chain(holes.iter()) {
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
            let d = b - a;
            // Right-hand normal: outward for a CCW contour, into the hole for a CW hole.
            let normal = Vec3::new(d.y, -d.x, 0.0).normalize_or_zero();
            mesh.push_quad(at(a, 0.0), at(b, 0.0), at(b, depth), at(a, depth), normal);
        }
    }
}

fn oriented(ring: &[Vec2], ccw: bool) -> Vec<Vec2> {
    let mut ring = ring.to_vec();
    if (signed_area(&ring) > 0.0) != ccw {
        ring.reverse();
    }
    ring
}

/// Triangulate a polygon with holes.
///
/// Holes are bridged into the contour first, so the returned point list is the
/// merged outline (bridge endpoints appear twice) and each triangle indexes it.
/// Triangles wind counter-clockwise.
pub fn triangulate(contour: &[Vec2], holes: &[Vec<Vec2>]) -> (Vec<Vec2>, Vec<[usize; 3]>) {
    let mut polygon = oriented(contour, true);
    let mut holes: Vec<Vec<Vec2>> = holes.iter().filter(|h| h.len() >= 3).map(|h| oriented(h, false)).collect();

    // Rightmost holes first, so later bridges never cross earlier ones.
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));
    for (i, hole) in holes.iter().enumerate() {
        polygon = bridge_hole(&polygon, hole, &holes[i + 1..]);
    }

    let triangles = ear_clip(&polygon);
    (polygon, triangles)
}

fn max_x(ring: &[Vec2]) -> f32 {
    ring.iter().map(|p| p.x).fold(f32::MIN, f32::max)
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn ring_blocks(ring: &[Vec2], from: Vec2, to: Vec2) -> bool {
    (0..ring.len()).any(|i| {
        let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
        segments_cross(from, to, a, b)
    })
}

/// Whether the direction from `polygon[i]` toward `q` starts inside the polygon.
fn in_cone(polygon: &[Vec2], i: usize, q: Vec2) -> bool {
    let n = polygon.len();
    let p = polygon[i];
    let prev = polygon[(i + n - 1) % n];
    let next = polygon[(i + 1) % n];
    if cross(p, next, prev) >= 0.0 {
        cross(p, q, prev) > 0.0 && cross(q, p, next) > 0.0
    } else {
        !(cross(p, q, next) >= 0.0 && cross(q, p, prev) >= 0.0)
    }
}

/// Splice `hole` into `polygon` through a zero-width slit from the hole's
/// rightmost vertex to the nearest polygon vertex it can see.
fn bridge_hole(polygon: &[Vec2], hole: &[Vec2], pending: &[Vec<Vec2>]) -> Vec<Vec2> {
    let m = hole
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.x.total_cmp(&b.1.x))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let anchor = hole[m];

    let mut candidates: Vec<usize> = (0..polygon.len()).collect();
    candidates.sort_by(|&a, &b| polygon[a].distance_squared(anchor).total_cmp(&polygon[b].distance_squared(anchor)));

    let visible = candidates.iter().copied().find(|&i| {
        let target = polygon[i];
        in_cone(polygon, i, anchor)
            && !ring_blocks(polygon, anchor, target)
            && !ring_blocks(hole, anchor, target)
            && !pending.iter().any(|h| ring_blocks(h, anchor, target))
    });
    let bridge = visible.unwrap_or_else(|| {
        tracing::debug!("no visible bridge vertex, using nearest");
        candidates[0]
    });

    let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=bridge]);
    merged.extend(hole[m..].iter().chain(hole[..=m].iter()).copied());
    merged.extend_from_slice(&polygon[bridge..]);
    merged
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

const AREA_EPSILON: f32 = 1e-12;

fn ear_clip(points: &[Vec2]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));
    let mut i = 0;
    let mut misses = 0;

    while remaining.len() > 3 {
        let len = remaining.len();
        let (ia, ib, ic) = (remaining[(i + len - 1) % len], remaining[i % len], remaining[(i + 1) % len]);
        let (a, b, c) = (points[ia], points[ib], points[ic]);
        let turn = cross(a, b, c);

        if turn.abs() <= AREA_EPSILON {
            // Collinear or doubled-back vertex: drop it without a triangle.
            remaining.remove(i % len);
            misses = 0;
        } else if turn > 0.0 && is_ear(points, &remaining, (ia, ib, ic)) {
            triangles.push([ia, ib, ic]);
            remaining.remove(i % len);
            misses = 0;
        } else {
            misses += 1;
            if misses > len {
                // Self-intersecting input; clip anyway rather than spin.
                triangles.push([ia, ib, ic]);
                remaining.remove(i % len);
                misses = 0;
            } else {
                i += 1;
            }
        }
        if !remaining.is_empty() {
            i %= remaining.len();
        }
    }

    if let [ia, ib, ic] = remaining[..] {
        if cross(points[ia], points[ib], points[ic]).abs() > AREA_EPSILON {
            triangles.push([ia, ib, ic]);
        }
    }
    triangles
}

fn is_ear(points: &[Vec2], remaining: &[usize], (ia, ib, ic): (usize, usize, usize)) -> bool {
    let (a, b, c) = (points[ia], points[ib], points[ic]);
    remaining.iter().all(|&r| {
        if r == ia || r == ib || r == ic {
            return true;
        }
        let q = points[r];
        // Bridge duplicates share a position with the ear's corners.
        if q == a || q == b || q == c {
            return true;
        }
        !point_in_triangle(q, a, b, c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_area(points: &[Vec2], tris: &[[usize; 3]]) -> f32 {
        tris.iter().map(|&[a, b, c]| cross(points[a], points[b], points[c]) * 0.5).sum()
    }

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        rect(min, min, max, max)
    }

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Vec2> {
        vec![Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x1, y1), Vec2::new(x0, y1)]
    }

    #[test]
    fn concave_polygon_yields_n_minus_two_triangles() {
        // U shape, listed clockwise to exercise reorientation.
        let u: Vec<Vec2> = [(0.0, 0.0), (0.0, 7.0), (1.5, 7.0), (1.5, 1.5), (4.5, 1.5), (4.5, 7.0), (6.0, 7.0), (6.0, 0.0)]
            .into_iter()
            .map(Vec2::from)
            .collect();
        let (points, tris) = triangulate(&u, &[]);
        assert_eq!(tris.len(), u.len() - 2);
        assert!((triangle_area(&points, &tris) - 25.5).abs() < 1e-4);
        for &[a, b, c] in &tris {
            assert!(cross(points[a], points[b], points[c]) > 0.0);
        }
    }

    #[test]
    fn hole_is_excluded_from_area() {
        let (points, tris) = triangulate(&square(0.0, 10.0), &[rect(2.0, 3.0, 5.0, 7.0)]);
        assert_eq!(points.len(), 4 + 4 + 2);
        assert!((triangle_area(&points, &tris) - 88.0).abs() < 1e-3);
    }

    #[test]
    fn two_holes_are_both_bridged() {
        let holes = vec![rect(1.0, 2.0, 3.0, 4.0), rect(6.0, 5.0, 9.0, 7.0)];
        let (points, tris) = triangulate(&square(0.0, 10.0), &holes);
        assert_eq!(points.len(), 4 + 8 + 4);
        assert!((triangle_area(&points, &tris) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn collinear_points_add_no_slivers() {
        let ring = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0), Vec2::new(0.0, 2.0)];
        let (points, tris) = triangulate(&ring, &[]);
        assert!((triangle_area(&points, &tris) - 4.0).abs() < 1e-5);
        assert!(tris.iter().all(|&[a, b, c]| cross(points[a], points[b], points[c]).abs() > 0.0));
    }

    #[test]
    fn extruded_square_is_closed_box() {
        let shape = Shape { contour: square(0.0, 1.0), holes: Vec::new() };
        let mesh = extrude_shapes(&[shape], 0.2);
        // 2 cap triangles each side + 4 walls of 2 triangles
        assert_eq!(mesh.triangle_count(), 2 + 2 + 8);
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::ZERO);
        assert_eq!(hi, Vec3::new(1.0, 1.0, 0.2));
    }

    #[test]
    fn walls_face_away_from_solid() {
        let shape = Shape { contour: square(0.0, 4.0), holes: vec![square(1.0, 3.0)] };
        let mesh = extrude_shapes(&[shape], 1.0);
        let centre = Vec2::splat(2.0);
        for tri in mesh.indices.chunks(3) {
            let v = &mesh.vertices[tri[0] as usize];
            let (pos, normal) = (Vec3::from_array(v.pos), Vec3::from_array(v.normal));
            if normal.z != 0.0 {
                continue;
            }
            let from_centre = pos.truncate() - centre;
            let outer_wall = from_centre.abs().max_element() > 1.5;
            let facing_out = normal.truncate().dot(from_centre) > 0.0;
            // Outer walls face away from the centre, hole walls face toward it.
            assert_eq!(outer_wall, facing_out, "{pos:?} {normal:?}");
        }
    }

    #[test]
    fn caps_wind_toward_their_normals() {
        let shape = Shape { contour: square(0.0, 1.0), holes: vec![rect(0.25, 0.3, 0.6, 0.8)] };
        let mesh = extrude_shapes(&[shape], 0.5);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.vertices[i as usize].pos));
            let normal = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(normal) > 0.0);
        }
    }
}
