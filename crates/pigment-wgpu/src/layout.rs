use pigment_shading::{ModeVertex, PackedVertex, Vertex};

/// Attribute locations shared by every shader module.
pub mod location {
    pub const POSITION: u32 = 0;
    pub const UV: u32 = 1;
    pub const COLOR: u32 = 2;
    pub const MODE: u32 = 3;
}

const POS_OFFSET: wgpu::BufferAddress = 0;
const UV_OFFSET: wgpu::BufferAddress = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;
const COLOR_OFFSET: wgpu::BufferAddress = (std::mem::size_of::<[f32; 2]>() * 2) as wgpu::BufferAddress;

/// GPU buffer layout of a vertex record.
///
/// Field order, formats and locations here are the binary contract with the WGSL inputs.
pub trait VertexLayout: bytemuck::Pod {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }
}

impl VertexLayout for Vertex {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        wgpu::VertexAttribute {
            offset: POS_OFFSET,
            shader_location: location::POSITION,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: UV_OFFSET,
            shader_location: location::UV,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: COLOR_OFFSET,
            shader_location: location::COLOR,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];
}

impl VertexLayout for PackedVertex {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        wgpu::VertexAttribute {
            offset: POS_OFFSET,
            shader_location: location::POSITION,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: UV_OFFSET,
            shader_location: location::UV,
            format: wgpu::VertexFormat::Float32x2,
        },
        // Read as integers, not normalized: the passthrough stage keeps the raw bits.
        wgpu::VertexAttribute {
            offset: COLOR_OFFSET,
            shader_location: location::COLOR,
            format: wgpu::VertexFormat::Uint8x4,
        },
    ];
}

impl VertexLayout for ModeVertex {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        wgpu::VertexAttribute {
            offset: POS_OFFSET,
            shader_location: location::POSITION,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: UV_OFFSET,
            shader_location: location::UV,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: COLOR_OFFSET,
            shader_location: location::COLOR,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: COLOR_OFFSET + std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
            shader_location: location::MODE,
            format: wgpu::VertexFormat::Uint32,
        },
    ];
}
