//! Shape generation for 2D primitives
//!
//! Everything is emitted as a plain triangle list in table coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

fn push_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));

    out.push(Vertex::new(c.x, c.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(d.x, d.y, color));
}

/// Axis-aligned rectangle from its top-left corner
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: [f32; 4]) {
    let max = min + size;
    push_quad(
        out,
        min,
        Vec2::new(max.x, min.y),
        Vec2::new(min.x, max.y),
        max,
        color,
    );
}

/// Filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    out.reserve((segments * 3) as usize);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Hollow circle; every other segment is skipped when `dashed`
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
    dashed: bool,
) {
    for i in 0..segments {
        if dashed && i % 2 == 1 {
            continue;
        }
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let (s1, c1) = theta1.sin_cos();
        let (s2, c2) = theta2.sin_cos();

        push_quad(
            out,
            center + Vec2::new(c1, s1) * inner_radius,
            center + Vec2::new(c1, s1) * outer_radius,
            center + Vec2::new(c2, s2) * inner_radius,
            center + Vec2::new(c2, s2) * outer_radius,
            color,
        );
    }
}

/// Thick line segment
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    push_quad(out, from + perp, from - perp, to + perp, to - perp, color);
}

/// Line split into `dash`-long pieces separated by equal gaps
pub fn dashed_line(
    out: &mut Vec<Vertex>,
    from: Vec2,
    to: Vec2,
    width: f32,
    dash: f32,
    color: [f32; 4],
) {
    let length = from.distance(to);
    if length <= 0.0 || dash <= 0.0 {
        return;
    }
    let dir = (to - from) / length;
    let mut t = 0.0;
    while t < length {
        let end = (t + dash).min(length);
        line(out, from + dir * t, from + dir * end, width, color);
        t += dash * 2.0;
    }
}

/// Horizontal band across a circle, clipped to it (the stripe of a striped ball)
pub fn circle_band(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radius: f32,
    half_height: f32,
    color: [f32; 4],
    segments: u32,
) {
    let h = half_height.min(radius);
    // Slice the band into vertical strips whose top and bottom follow the circle
    for i in 0..segments {
        let x1 = -radius + 2.0 * radius * i as f32 / segments as f32;
        let x2 = -radius + 2.0 * radius * (i + 1) as f32 / segments as f32;
        let y1 = (radius * radius - x1 * x1).max(0.0).sqrt().min(h);
        let y2 = (radius * radius - x2 * x2).max(0.0).sqrt().min(h);
        push_quad(
            out,
            center + Vec2::new(x1, -y1),
            center + Vec2::new(x2, -y2),
            center + Vec2::new(x1, y1),
            center + Vec2::new(x2, y2),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_circle_vertex_count() {
        let mut out = Vec::new();
        circle(&mut out, Vec2::ZERO, 10.0, RED, 16);
        assert_eq!(out.len(), 48);
    }

    #[test]
    fn test_dashed_ring_has_half_the_segments() {
        let mut solid = Vec::new();
        let mut dashed = Vec::new();
        ring(&mut solid, Vec2::ZERO, 14.0, 16.0, RED, 24, false);
        ring(&mut dashed, Vec2::ZERO, 14.0, 16.0, RED, 24, true);
        assert_eq!(dashed.len() * 2, solid.len());
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let mut out = Vec::new();
        line(&mut out, Vec2::ONE, Vec2::ONE, 2.0, RED);
        assert!(out.is_empty());
    }

    #[test]
    fn test_dashed_line_pieces() {
        let mut out = Vec::new();
        dashed_line(&mut out, Vec2::ZERO, Vec2::new(20.0, 0.0), 2.0, 5.0, RED);
        // dashes at 0..5 and 10..15
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_band_stays_inside_circle() {
        let mut out = Vec::new();
        circle_band(&mut out, Vec2::ZERO, 10.0, 5.0, RED, 8);
        assert!(out.iter().all(|v| {
            let p = Vec2::from(v.position);
            p.length() <= 10.0 + 1e-4 && p.y.abs() <= 5.0 + 1e-4
        }));
    }
}
