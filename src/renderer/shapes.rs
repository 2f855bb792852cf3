//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in pixel coordinates
//! (origin top-left, y down).

use glam::Vec2;

use super::vertex::Vertex;

fn quad(corners: [Vec2; 4], colors: [[f32; 4]; 4]) -> [Vertex; 6] {
    let v = |i: usize| Vertex::new(corners[i].x, corners[i].y, colors[i]);
    [v(0), v(1), v(2), v(2), v(3), v(0)]
}

/// Axis-aligned filled rectangle from its top-left corner
pub fn rect(origin: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let corners = [
        origin,
        origin + Vec2::new(size.x, 0.0),
        origin + size,
        origin + Vec2::new(0.0, size.y),
    ];
    quad(corners, [color; 4]).to_vec()
}

/// Rectangle filled with a top-to-bottom color ramp
pub fn vertical_gradient(origin: Vec2, size: Vec2, top: [f32; 4], bottom: [f32; 4]) -> Vec<Vertex> {
    let corners = [
        origin,
        origin + Vec2::new(size.x, 0.0),
        origin + size,
        origin + Vec2::new(0.0, size.y),
    ];
    quad(corners, [top, top, bottom, bottom]).to_vec()
}

/// Rectangle given in a local frame (top-left `offset` from `pivot`),
/// rotated by `angle` radians around `pivot`
pub fn rotated_rect(
    pivot: Vec2,
    angle: f32,
    offset: Vec2,
    size: Vec2,
    color: [f32; 4],
) -> Vec<Vertex> {
    let rot = Vec2::from_angle(angle);
    let local = [
        offset,
        offset + Vec2::new(size.x, 0.0),
        offset + size,
        offset + Vec2::new(0.0, size.y),
    ];
    quad(local.map(|p| pivot + rot.rotate(p)), [color; 4]).to_vec()
}

/// Outline of a rotated rectangle, `thickness` wide, drawn inside its edges
pub fn rotated_outline(
    pivot: Vec2,
    angle: f32,
    offset: Vec2,
    size: Vec2,
    thickness: f32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let t = thickness.min(size.x / 2.0).min(size.y / 2.0);
    let mut vertices = Vec::with_capacity(24);
    // Top, bottom, left, right
    vertices.extend(rotated_rect(pivot, angle, offset, Vec2::new(size.x, t), color));
    vertices.extend(rotated_rect(
        pivot,
        angle,
        offset + Vec2::new(0.0, size.y - t),
        Vec2::new(size.x, t),
        color,
    ));
    vertices.extend(rotated_rect(
        pivot,
        angle,
        offset + Vec2::new(0.0, t),
        Vec2::new(t, size.y - 2.0 * t),
        color,
    ));
    vertices.extend(rotated_rect(
        pivot,
        angle,
        offset + Vec2::new(size.x - t, t),
        Vec2::new(t, size.y - 2.0 * t),
        color,
    ));
    vertices
}

pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Horizontal arrow centered on `center`, pointing right for positive `direction`
pub fn arrow(center: Vec2, length: f32, direction: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = if direction < 0.0 { -1.0 } else { 1.0 };
    let half = length / 2.0;
    let head = length * 0.4;
    let shaft = 2.0;

    let tail_x = center.x - dir * half;
    let neck_x = center.x + dir * (half - head);
    let tip = Vec2::new(center.x + dir * half, center.y);

    let mut vertices = rect(
        Vec2::new(tail_x.min(neck_x), center.y - shaft),
        Vec2::new((neck_x - tail_x).abs(), shaft * 2.0),
        color,
    );
    vertices.extend(triangle(
        Vec2::new(neck_x, center.y - head / 2.0),
        tip,
        Vec2::new(neck_x, center.y + head / 2.0),
        color,
    ));
    vertices
}

/// Shift every vertex by `offset`
pub fn translate(vertices: &mut [Vertex], offset: Vec2) {
    for v in vertices {
        v.position[0] += offset.x;
        v.position[1] += offset.y;
    }
}
