use pigment_shading::{
    ClippedMesh, DrawCall, FragmentVariant, GeometryBuilder, ModeVertex, PackedVertex,
    RenderMode, ScreenDescriptor, TextureId, TextureKind, TexturesDelta, Vertex,
};

use crate::config::RendererConfig;
use crate::error::Error;
use crate::pipeline::create_pipeline;
use crate::texture::TextureManager;

/// What the last [`Renderer::render`] call submitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: usize,
    pub vertices: usize,
    pub indices: usize,
    /// Draws dropped because their texture was not resident.
    pub skipped_draws: usize,
}

/// Draws GUI meshes with one of the pixel-stage variants.
pub struct Renderer {
    config: RendererConfig,
    pipeline: wgpu::RenderPipeline,
    textures: TextureManager,
    builder: GeometryBuilder,
    packed_builder: GeometryBuilder<PackedVertex>,

    vertex_bytes: Vec<u8>,
    buffers: FrameBuffers,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, config: RendererConfig) -> Self {
        config.warn_on_mismatch();

        let textures = TextureManager::new(device, &config);
        let texture_layout = config
            .variant
            .samples_texture()
            .then(|| textures.bind_group_layout());
        let pipeline = create_pipeline(device, &config, texture_layout);

        log::debug!(
            "created {} renderer targeting {:?}",
            config.variant.name(),
            config.output_format
        );

        Self {
            buffers: FrameBuffers::new(device, &config),
            vertex_bytes: Vec::new(),
            builder: GeometryBuilder::new(),
            packed_builder: GeometryBuilder::new(),
            pipeline,
            textures,
            config,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// Apply the `set` half of a texture delta. Call before [`Self::render`].
    ///
    /// Every entry is attempted; the first failure is returned after the rest are applied.
    pub fn update_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        delta: &TexturesDelta,
    ) -> Result<(), Error> {
        let mut first_error = None;
        for (id, image_delta) in &delta.set {
            if let Err(err) = self.textures.update(device, queue, *id, image_delta) {
                log::warn!("texture update for {:?} failed: {err}", id);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Apply the `free` half of a texture delta. Call after the frame is submitted.
    pub fn free_textures(&mut self, delta: &TexturesDelta) {
        for id in &delta.free {
            self.textures.free(*id);
        }
    }

    /// Record one render pass drawing `meshes` into `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        meshes: &[ClippedMesh],
        screen: &ScreenDescriptor,
    ) -> RenderStats {
        let variant = self.config.variant;
        let textures = &self.textures;
        let geometry = self.builder.build(meshes, screen, |id| {
            textures
                .kind(id)
                .map_or(RenderMode::Textured, TextureKind::render_mode)
        });
        encode_vertices(variant, &geometry.vertices, &mut self.vertex_bytes);

        let frame = Frame {
            vertex_bytes: &self.vertex_bytes,
            vertex_count: geometry.vertices.len(),
            indices: &geometry.indices,
            draws: &geometry.draws,
        };
        self.buffers.upload(device, queue, &frame, vertex_stride(variant));
        record_pass(
            &self.config,
            &self.pipeline,
            &self.buffers,
            &self.textures,
            encoder,
            target,
            &frame,
        )
    }

    /// Like [`Self::render`], for integer-color meshes drawn by the passthrough variant.
    ///
    /// Colors reach the target bit for bit, without a round trip through floats. Other
    /// variants record nothing.
    pub fn render_packed(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        meshes: &[ClippedMesh<PackedVertex>],
        screen: &ScreenDescriptor,
    ) -> RenderStats {
        if !self.config.variant.packed_color() {
            log::warn!(
                "packed meshes need the passthrough variant, this renderer is {}",
                self.config.variant.name()
            );
            return RenderStats::default();
        }

        let geometry = self.packed_builder.build_packed(meshes, screen);
        self.vertex_bytes.clear();
        self.vertex_bytes
            .extend_from_slice(bytemuck::cast_slice(&geometry.vertices));

        let frame = Frame {
            vertex_bytes: &self.vertex_bytes,
            vertex_count: geometry.vertices.len(),
            indices: &geometry.indices,
            draws: &geometry.draws,
        };
        self.buffers
            .upload(device, queue, &frame, std::mem::size_of::<PackedVertex>());
        record_pass(
            &self.config,
            &self.pipeline,
            &self.buffers,
            &self.textures,
            encoder,
            target,
            &frame,
        )
    }
}

/// One frame's encoded geometry, independent of the vertex record type.
struct Frame<'a> {
    vertex_bytes: &'a [u8],
    vertex_count: usize,
    indices: &'a [u32],
    draws: &'a [DrawCall],
}

struct FrameBuffers {
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,
}

impl FrameBuffers {
    fn new(device: &wgpu::Device, config: &RendererConfig) -> Self {
        let vertex_capacity = config.initial_vertex_capacity.max(1);
        let index_capacity = config.initial_index_capacity.max(1);
        Self {
            vertex_buffer: create_vertex_buffer(
                device,
                vertex_capacity * vertex_stride(config.variant),
            ),
            vertex_capacity,
            index_buffer: create_index_buffer(device, index_capacity),
            index_capacity,
        }
    }

    /// Grow to the next power of two when too small, then write the frame.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &Frame, stride: usize) {
        if frame.vertex_count > self.vertex_capacity {
            self.vertex_capacity = (frame.vertex_count * 2).next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity * stride);
            log::debug!("grew vertex buffer to {} vertices", self.vertex_capacity);
        }
        if frame.indices.len() > self.index_capacity {
            self.index_capacity = (frame.indices.len() * 2).next_power_of_two();
            self.index_buffer = create_index_buffer(device, self.index_capacity);
            log::debug!("grew index buffer to {} indices", self.index_capacity);
        }

        if !frame.indices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, frame.vertex_bytes);
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(frame.indices));
        }
    }
}

fn record_pass(
    config: &RendererConfig,
    pipeline: &wgpu::RenderPipeline,
    buffers: &FrameBuffers,
    textures: &TextureManager,
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    frame: &Frame,
) -> RenderStats {
    let mut stats = RenderStats {
        vertices: frame.vertex_count,
        indices: frame.indices.len(),
        ..Default::default()
    };

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Pigment Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: config.load_op(),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    if frame.draws.is_empty() {
        return stats;
    }

    render_pass.set_pipeline(pipeline);
    render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
    render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

    let samples_texture = config.variant.samples_texture();
    let mut bound: Option<TextureId> = None;
    for draw in frame.draws {
        if samples_texture && bound != Some(draw.texture) {
            let Some(bind_group) = textures.bind_group(draw.texture) else {
                log::warn!("skipping draw with unknown texture {:?}", draw.texture);
                stats.skipped_draws += 1;
                continue;
            };
            render_pass.set_bind_group(0, bind_group, &[]);
            bound = Some(draw.texture);
        }

        let s = draw.scissor;
        render_pass.set_scissor_rect(s.x, s.y, s.width, s.height);
        render_pass.draw_indexed(draw.index_range.clone(), 0, 0..1);
        stats.draw_calls += 1;
    }

    stats
}

fn create_vertex_buffer(device: &wgpu::Device, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Pigment Vertex Buffer"),
        size: size as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Pigment Index Buffer"),
        size: (capacity * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub(crate) fn vertex_stride(variant: FragmentVariant) -> usize {
    if variant.packed_color() {
        std::mem::size_of::<PackedVertex>()
    } else if variant.has_mode() {
        std::mem::size_of::<ModeVertex>()
    } else {
        std::mem::size_of::<Vertex>()
    }
}

/// Re-encode batched vertices in the record layout `variant` consumes.
pub(crate) fn encode_vertices(variant: FragmentVariant, vertices: &[ModeVertex], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(vertices.len() * vertex_stride(variant));

    if variant.packed_color() {
        for v in vertices {
            out.extend_from_slice(bytemuck::bytes_of(&PackedVertex::from(*v)));
        }
    } else if variant.has_mode() {
        out.extend_from_slice(bytemuck::cast_slice(vertices));
    } else {
        for v in vertices {
            out.extend_from_slice(bytemuck::bytes_of(&Vertex::from(*v)));
        }
    }
}
