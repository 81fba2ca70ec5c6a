use pigment_shading::{ModeVertex, PackedVertex, Vertex};

use crate::config::RendererConfig;
use crate::layout::VertexLayout;
use crate::shader::{create_shader_module, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};

/// Vertex buffer layout consumed by the configured variant.
pub fn vertex_layout(config: &RendererConfig) -> wgpu::VertexBufferLayout<'static> {
    if config.variant.packed_color() {
        PackedVertex::layout()
    } else if config.variant.has_mode() {
        ModeVertex::layout()
    } else {
        Vertex::layout()
    }
}

/// Bind group layout for the texture + sampler pair (group 0).
pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Pigment Texture Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Build the render pipeline for `config.variant`.
///
/// `texture_layout` must be provided exactly when the variant samples a texture.
pub fn create_pipeline(
    device: &wgpu::Device,
    config: &RendererConfig,
    texture_layout: Option<&wgpu::BindGroupLayout>,
) -> wgpu::RenderPipeline {
    let shader = create_shader_module(device, config.variant);

    let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = texture_layout.into_iter().collect();
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Pigment Pipeline Layout"),
        bind_group_layouts: &bind_group_layouts,
        push_constant_ranges: &[],
    });

    let label = format!("Pigment {} Pipeline", config.variant.name());
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(VERTEX_ENTRY_POINT),
            buffers: &[vertex_layout(config)],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(FRAGMENT_ENTRY_POINT),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.output_format,
                blend: config.blend_state(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
