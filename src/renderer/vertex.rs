//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// `#rrggbb` to linear-ish RGBA (no gamma correction; the surface is sRGB)
pub const fn hex(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Colors for table elements
pub mod colors {
    use super::hex;

    pub const FELT: [f32; 4] = hex(0x15803d);
    pub const RAIL: [f32; 4] = hex(0x451a03);
    pub const POCKET: [f32; 4] = hex(0x000000);
    pub const CUE_STICK: [f32; 4] = hex(0xf59e0b);
    pub const CUE_TIP: [f32; 4] = hex(0xfde047);
    pub const GUIDE_LINE: [f32; 4] = [1.0, 1.0, 1.0, 0.5];
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.3];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.06, 0.09, 0.16, 1.0];

    /// Ball colors by number; stripes reuse the solid of number - 8
    pub const BALLS: [[f32; 4]; 16] = [
        hex(0xffffff),
        hex(0xfbbf24),
        hex(0x2563eb),
        hex(0xdc2626),
        hex(0x7e22ce),
        hex(0xf97316),
        hex(0x16a34a),
        hex(0x881337),
        hex(0x000000),
        hex(0xfbbf24),
        hex(0x2563eb),
        hex(0xdc2626),
        hex(0x7e22ce),
        hex(0xf97316),
        hex(0x16a34a),
        hex(0x881337),
    ];

    pub fn ball(id: u8) -> [f32; 4] {
        BALLS.get(id as usize).copied().unwrap_or(WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(colors::ball(9), colors::ball(1));
        assert_eq!(colors::ball(42), colors::WHITE);
    }
}
