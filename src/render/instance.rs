use bytemuck::{Pod, Zeroable};

/// Instance samples the atlas.
pub const MODE_TEXTURED: u32 = 0;
/// Instance is a flat colour.
pub const MODE_SOLID: u32 = 1;

/// Per-instance data uploaded to GPU each frame.
/// Stride = 40 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left corner in screen pixels.
    pub position: [f32; 2],
    /// Size in screen pixels.
    pub size: [f32; 2],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    /// RGBA color packed as u32 (used by solid instances).
    pub color: u32,
    pub mode: u32,
}

impl SpriteInstance {
    pub fn textured(position: [f32; 2], size: [f32; 2], uv_min: [f32; 2], uv_max: [f32; 2]) -> Self {
        Self {
            position,
            size,
            uv_min,
            uv_max,
            color: 0xFFFFFFFF,
            mode: MODE_TEXTURED,
        }
    }

    pub fn solid(position: [f32; 2], size: [f32; 2], color: u32) -> Self {
        Self {
            position,
            size,
            uv_min: [0.0; 2],
            uv_max: [0.0; 2],
            color,
            mode: MODE_SOLID,
        }
    }
}
