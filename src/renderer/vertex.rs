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

/// `0xRRGGBB` to linear-ish RGBA floats
pub const fn rgb(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Colors for game elements
pub mod colors {
    use super::rgb;

    pub const SKY_TOP: [f32; 4] = rgb(0x87CEEB);
    pub const SKY_BOTTOM: [f32; 4] = rgb(0xE0F6FF);
    pub const HC_SKY_TOP: [f32; 4] = rgb(0x000000);
    pub const HC_SKY_BOTTOM: [f32; 4] = rgb(0x222222);

    pub const PLATFORM: [f32; 4] = rgb(0x8B4513);
    pub const CRANE: [f32; 4] = rgb(0x666666);
    pub const HOOK: [f32; 4] = rgb(0xFFD700);
    pub const WIND: [f32; 4] = rgb(0x87CEEB);
    /// Everything structural in high contrast mode
    pub const HC_STRUCTURE: [f32; 4] = rgb(0xFFFFFF);
    pub const HC_BORDER: [f32; 4] = rgb(0x000000);

    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.2];
    pub const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.3];
    pub const BORDER: [f32; 4] = [0.0, 0.0, 0.0, 0.2];
}
