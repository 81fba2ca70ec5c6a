//! Headless demo: renders one egui frame offscreen, then picks a widget through an ID pass.

use anyhow::Context as _;
use pigment_shading::{
    ClippedMesh, ImageData, Mesh, PackedColor, PackedVertex, Rect, ScreenDescriptor, TextureId,
    TextureKind,
};
use pigment_wgpu::egui::{meshes_from_egui, textures_delta_from_egui};
use pigment_wgpu::{PickTarget, Renderer, RendererConfig};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const PIXELS_PER_POINT: f32 = 1.0;
const CHECKER_ID: u64 = 1;
const CHECKER_SIZE: u32 = 8;

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuState {
    async fn new() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create device")?;

        Ok(Self { device, queue })
    }
}

fn build_ui(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("pigment");
        ui.label("Text draws through the coverage path of the mode-branch pipeline.");
        let _ = ui.button("Pick me");
        ui.image((
            egui::TextureId::User(CHECKER_ID),
            egui::vec2(64.0, 64.0),
        ));
    });
}

/// Host-owned color texture, sRGB bytes with opaque alpha.
fn checker_image() -> anyhow::Result<ImageData> {
    let pixels = (0..CHECKER_SIZE * CHECKER_SIZE)
        .flat_map(|i| {
            let on = (i % CHECKER_SIZE + i / CHECKER_SIZE) % 2 == 0;
            if on {
                [230, 120, 40, 255]
            } else {
                [30, 30, 30, 255]
            }
        })
        .collect();
    Ok(ImageData::new(
        [CHECKER_SIZE, CHECKER_SIZE],
        TextureKind::Color,
        pixels,
    )?)
}

fn render_gui(gpu: &GpuState) -> anyhow::Result<()> {
    let ctx = egui::Context::default();
    let raw_input = egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(WIDTH as f32, HEIGHT as f32) / PIXELS_PER_POINT,
        )),
        ..Default::default()
    };
    let output = ctx.run(raw_input, build_ui);
    let primitives = ctx.tessellate(output.shapes, output.pixels_per_point);

    let textures = textures_delta_from_egui(&output.textures_delta);
    let meshes = meshes_from_egui(primitives);

    let config = RendererConfig {
        clear_color: Some(wgpu::Color::BLACK),
        ..Default::default()
    };
    let target = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("GUI Target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.output_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut renderer = Renderer::new(&gpu.device, config);
    renderer.update_textures(&gpu.device, &gpu.queue, &textures)?;

    // A host that versions its own image uploads once; repeat calls are no-ops.
    let checker = checker_image()?;
    for _ in 0..2 {
        let uploaded = renderer.textures_mut().update_if_needed(
            &gpu.device,
            &gpu.queue,
            TextureId::User(CHECKER_ID),
            1,
            &checker,
        )?;
        log::debug!("checker texture uploaded: {}", uploaded);
    }

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("GUI Encoder"),
        });
    let screen = ScreenDescriptor::new([WIDTH, HEIGHT], output.pixels_per_point);
    let stats = renderer.render(
        &gpu.device,
        &gpu.queue,
        &mut encoder,
        &view,
        &meshes,
        &screen,
    );
    gpu.queue.submit(Some(encoder.finish()));
    renderer.free_textures(&textures);

    log::info!(
        "GUI frame: {} meshes, {} draw calls, {} vertices, {} indices, {} skipped",
        meshes.len(),
        stats.draw_calls,
        stats.vertices,
        stats.indices,
        stats.skipped_draws
    );
    Ok(())
}

/// Quad whose pixels carry `id` verbatim through the integer pipeline.
fn id_quad(rect: Rect, id: u32) -> ClippedMesh<PackedVertex> {
    let color = PackedColor::from_u32(id);
    let [x0, y0] = rect.min;
    let [x1, y1] = rect.max;
    let v = |pos, uv| PackedVertex { pos, uv, color };

    let mut mesh = Mesh::new(TextureId::default());
    mesh.add_quad([
        v([x0, y0], [0.0, 0.0]),
        v([x1, y0], [1.0, 0.0]),
        v([x1, y1], [1.0, 1.0]),
        v([x0, y1], [0.0, 1.0]),
    ]);
    ClippedMesh::new(Rect::EVERYTHING, mesh)
}

fn pick(gpu: &GpuState) -> anyhow::Result<()> {
    let widgets = [
        (Rect::from_min_size([40.0, 40.0], [200.0, 80.0]), 0x0000_0101),
        (Rect::from_min_size([320.0, 200.0], [120.0, 120.0]), 0x80ab_cdef),
    ];
    let meshes: Vec<_> = widgets.iter().map(|&(rect, id)| id_quad(rect, id)).collect();

    let mut renderer = Renderer::new(&gpu.device, RendererConfig::id_buffer());
    let target = PickTarget::new(&gpu.device, WIDTH, HEIGHT);

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pick Encoder"),
        });
    let screen = ScreenDescriptor::new([WIDTH, HEIGHT], PIXELS_PER_POINT);
    renderer.render_packed(
        &gpu.device,
        &gpu.queue,
        &mut encoder,
        target.view(),
        &meshes,
        &screen,
    );
    gpu.queue.submit(Some(encoder.finish()));

    for (x, y) in [(100, 60), (380, 260), (10, 10)] {
        let result = target.read_pixel(&gpu.device, &gpu.queue, x, y)?;
        if result.is_hit() {
            log::info!("({x}, {y}) -> widget {:#010x}", result.id);
        } else {
            log::info!("({x}, {y}) -> nothing");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let gpu = pollster::block_on(GpuState::new())?;
    render_gui(&gpu)?;
    pick(&gpu)?;
    Ok(())
}
