//! Conversions from egui's tessellated output.

use pigment_shading::{
    retain_drawable, AddressMode, ClippedMesh, FilterMode, ImageData, ImageDelta, Mesh, Rect,
    TextureId, TextureKind, TexturesDelta, Vertex,
};

use crate::config::RendererConfig;

pub fn texture_id_from_egui(id: egui::TextureId) -> TextureId {
    match id {
        egui::TextureId::Managed(id) => TextureId::Managed(id),
        egui::TextureId::User(id) => TextureId::User(id),
    }
}

/// Convert tessellated primitives into meshes, in paint order.
///
/// Paint callbacks have no counterpart here and are dropped, as are empty or malformed meshes.
pub fn meshes_from_egui(primitives: Vec<egui::ClippedPrimitive>) -> Vec<ClippedMesh> {
    let mut meshes = Vec::with_capacity(primitives.len());
    for egui::ClippedPrimitive {
        clip_rect,
        primitive,
    } in primitives
    {
        let egui::epaint::Primitive::Mesh(mesh) = primitive else {
            log::debug!("dropping paint callback");
            continue;
        };

        let vertices = mesh
            .vertices
            .iter()
            .map(|v| Vertex {
                pos: [v.pos.x, v.pos.y],
                uv: [v.uv.x, v.uv.y],
                color: egui::Rgba::from(v.color).to_array(),
            })
            .collect();

        meshes.push(ClippedMesh::new(
            Rect::new(
                [clip_rect.min.x, clip_rect.min.y],
                [clip_rect.max.x, clip_rect.max.y],
            ),
            Mesh {
                vertices,
                indices: mesh.indices,
                texture: texture_id_from_egui(mesh.texture_id),
            },
        ));
    }
    retain_drawable(meshes)
}

/// Sampler settings egui asks for, in pigment terms. Magnification decides the filter.
pub fn sampler_from_egui(options: &egui::TextureOptions) -> (FilterMode, AddressMode) {
    let filter = match options.magnification {
        egui::TextureFilter::Nearest => FilterMode::Nearest,
        egui::TextureFilter::Linear => FilterMode::Linear,
    };
    let address_mode = match options.wrap_mode {
        egui::TextureWrapMode::ClampToEdge => AddressMode::ClampToEdge,
        egui::TextureWrapMode::Repeat => AddressMode::Repeat,
        egui::TextureWrapMode::MirroredRepeat => AddressMode::MirrorRepeat,
    };
    (filter, address_mode)
}

/// egui's font atlas: white texels whose alpha is glyph coverage.
pub const FONT_TEXTURE: egui::TextureId = egui::TextureId::Managed(0);

/// Convert egui's texture delta.
///
/// The font atlas becomes a [`TextureKind::Coverage`] image built from its alpha channel, so
/// text takes the coverage path. Every other image becomes sRGB [`TextureKind::Color`] data.
pub fn textures_delta_from_egui(delta: &egui::TexturesDelta) -> TexturesDelta {
    let mut out = TexturesDelta::default();

    for (egui_id, image_delta) in &delta.set {
        let id = texture_id_from_egui(*egui_id);
        #[allow(unreachable_patterns)]
        let image = match &image_delta.image {
            egui::ImageData::Color(image) if *egui_id == FONT_TEXTURE => coverage_image(image),
            egui::ImageData::Color(image) => color_image(image),
            _ => {
                log::warn!("unsupported egui image data for {:?}", id);
                continue;
            }
        };
        // One sampler serves every texture; per-texture options are not honored.
        let defaults = RendererConfig::default();
        let sampler = sampler_from_egui(&image_delta.options);
        if sampler != (defaults.filter, defaults.address_mode) {
            log::debug!(
                "{:?} asks for sampler {:?}; ignored, textures share the renderer sampler",
                id,
                sampler
            );
        }

        let pos = image_delta.pos.map(|[x, y]| [x as u32, y as u32]);
        out.set.push((id, ImageDelta { image, pos }));
    }

    out.free = delta.free.iter().copied().map(texture_id_from_egui).collect();
    out
}

fn coverage_image(image: &egui::ColorImage) -> ImageData {
    let [width, height] = image.size;
    ImageData {
        size: [width as u32, height as u32],
        kind: TextureKind::Coverage,
        pixels: image.pixels.iter().map(|c| c.a()).collect(),
    }
}

fn color_image(image: &egui::ColorImage) -> ImageData {
    let [width, height] = image.size;
    let pixels = image
        .pixels
        .iter()
        .flat_map(|c| c.to_array())
        .collect();
    ImageData {
        size: [width as u32, height as u32],
        kind: TextureKind::Color,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_ids_keep_namespace() {
        assert_eq!(
            texture_id_from_egui(egui::TextureId::Managed(3)),
            TextureId::Managed(3)
        );
        assert_eq!(
            texture_id_from_egui(egui::TextureId::User(3)),
            TextureId::User(3)
        );
    }

    #[test]
    fn test_mesh_conversion_linearizes_color() {
        let mut mesh = egui::Mesh::default();
        mesh.colored_vertex(egui::pos2(1.0, 2.0), egui::Color32::from_gray(128));
        mesh.colored_vertex(egui::pos2(3.0, 2.0), egui::Color32::WHITE);
        mesh.colored_vertex(egui::pos2(3.0, 4.0), egui::Color32::WHITE);
        mesh.add_triangle(0, 1, 2);

        let clip = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(10.0, 10.0));
        let meshes = meshes_from_egui(vec![egui::ClippedPrimitive {
            clip_rect: clip,
            primitive: egui::epaint::Primitive::Mesh(mesh),
        }]);

        assert_eq!(meshes.len(), 1);
        let converted = &meshes[0];
        assert_eq!(converted.clip_rect, Rect::new([0.0, 0.0], [10.0, 10.0]));
        assert_eq!(converted.mesh.indices, vec![0, 1, 2]);
        assert_eq!(converted.mesh.vertices[0].pos, [1.0, 2.0]);
        // sRGB 128 is roughly 0.216 linear.
        let r = converted.mesh.vertices[0].color[0];
        assert!((r - 0.216).abs() < 0.01, "{r}");
        assert!(converted.mesh.vertices[1]
            .color
            .iter()
            .all(|c| (c - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_mesh_conversion_drops_undrawable() {
        let mut good = egui::Mesh::default();
        good.colored_vertex(egui::pos2(0.0, 0.0), egui::Color32::WHITE);
        good.colored_vertex(egui::pos2(1.0, 0.0), egui::Color32::WHITE);
        good.colored_vertex(egui::pos2(1.0, 1.0), egui::Color32::WHITE);
        good.add_triangle(0, 1, 2);

        let mut dangling = good.clone();
        dangling.add_triangle(0, 1, 9);

        let clip = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(10.0, 10.0));
        let primitive = |mesh| egui::ClippedPrimitive {
            clip_rect: clip,
            primitive: egui::epaint::Primitive::Mesh(mesh),
        };
        let meshes = meshes_from_egui(vec![
            primitive(egui::Mesh::default()),
            primitive(dangling),
            primitive(good),
        ]);

        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_texture_delta_conversion() {
        let image = egui::ColorImage::from_rgba_unmultiplied([2, 1], &[255, 0, 0, 255, 0, 0, 255, 255]);
        let delta = egui::TexturesDelta {
            set: vec![(
                egui::TextureId::Managed(7),
                egui::epaint::ImageDelta::partial(
                    [4, 5],
                    image,
                    egui::TextureOptions::LINEAR,
                ),
            )],
            free: vec![egui::TextureId::User(9)],
        };

        let converted = textures_delta_from_egui(&delta);
        let (id, image_delta) = &converted.set[0];
        assert_eq!(*id, TextureId::Managed(7));
        assert_eq!(image_delta.pos, Some([4, 5]));
        assert_eq!(image_delta.image.size, [2, 1]);
        assert_eq!(image_delta.image.kind, TextureKind::Color);
        assert_eq!(image_delta.image.pixels, vec![255, 0, 0, 255, 0, 0, 255, 255]);
        assert_eq!(converted.free, vec![TextureId::User(9)]);
    }

    #[test]
    fn test_sampler_options_map_to_pigment() {
        assert_eq!(
            sampler_from_egui(&egui::TextureOptions::LINEAR),
            (FilterMode::Linear, AddressMode::ClampToEdge)
        );
        assert_eq!(
            sampler_from_egui(&egui::TextureOptions::NEAREST_REPEAT),
            (FilterMode::Nearest, AddressMode::Repeat)
        );
    }

    #[test]
    fn test_font_atlas_becomes_coverage() {
        let image = egui::ColorImage::from_rgba_premultiplied(
            [3, 1],
            &[255, 255, 255, 255, 128, 128, 128, 128, 0, 0, 0, 0],
        );
        let delta = egui::TexturesDelta {
            set: vec![(
                FONT_TEXTURE,
                egui::epaint::ImageDelta::full(image, egui::TextureOptions::LINEAR),
            )],
            free: vec![],
        };

        let converted = textures_delta_from_egui(&delta);
        let (_, image_delta) = &converted.set[0];
        assert_eq!(image_delta.image.kind, TextureKind::Coverage);
        assert_eq!(image_delta.image.pixels, vec![255, 128, 0]);
        assert!(image_delta.image.check_size().is_ok());
    }

    #[test]
    fn test_egui_frame_draws_text_with_coverage() {
        let ctx = egui::Context::default();
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(200.0, 100.0),
            )),
            ..Default::default()
        };
        let output = ctx.run(raw_input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("hello");
            });
        });

        let converted = textures_delta_from_egui(&output.textures_delta);
        let font = converted
            .set
            .iter()
            .find(|(id, _)| *id == TextureId::Managed(0))
            .map(|(_, delta)| delta.image.kind);
        assert_eq!(font, Some(TextureKind::Coverage));
    }
}
