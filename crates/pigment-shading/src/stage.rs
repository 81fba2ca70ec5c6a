//! CPU reference of the vertex and pixel stages.
//!
//! Each function here corresponds to one entry point in the backend's WGSL modules and is
//! kept line-for-line comparable to it. Useful for tests and for checking shader edits.

use glam::{Vec2, Vec4};

use crate::color::PackedColor;
use crate::gamma::{gamma_encode_rgb, gamma_encode_rgba};
use crate::sampler::TextureSampler;
use crate::vertex::{ModeVertex, PackedVertex, RenderMode, Vertex};

/// The four pixel-stage variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FragmentVariant {
    /// Integer color in, same bits out. For ID buffers and raw output.
    Passthrough,
    /// Gamma-encode RGB, alpha untouched.
    Gamma,
    /// Gamma-encode RGB, alpha scaled by a coverage texture's red channel.
    Coverage,
    /// Coverage path for mode 0, full-color textured path otherwise.
    #[default]
    ModeBranch,
}

impl FragmentVariant {
    pub const ALL: [Self; 4] = [
        Self::Passthrough,
        Self::Gamma,
        Self::Coverage,
        Self::ModeBranch,
    ];

    #[inline]
    pub const fn samples_texture(self) -> bool {
        matches!(self, Self::Coverage | Self::ModeBranch)
    }

    #[inline]
    pub const fn has_mode(self) -> bool {
        matches!(self, Self::ModeBranch)
    }

    #[inline]
    pub const fn packed_color(self) -> bool {
        matches!(self, Self::Passthrough)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Gamma => "gamma",
            Self::Coverage => "coverage",
            Self::ModeBranch => "mode_branch",
        }
    }
}

/// Output of the vertex stage, interpolated across the primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment<C = Vec4> {
    /// Clip-space position. Consumed by rasterization, never read by the pixel stage.
    pub position: Vec4,
    pub color: C,
    pub uv: Vec2,
    pub mode: u32,
}

/// A vertex record the vertex stage can consume.
pub trait VertexInput {
    type Color;

    fn vertex_stage(&self) -> Fragment<Self::Color>;
}

#[inline]
fn clip_position(pos: [f32; 2]) -> Vec4 {
    Vec4::new(pos[0], pos[1], 0.0, 1.0)
}

impl VertexInput for Vertex {
    type Color = Vec4;

    fn vertex_stage(&self) -> Fragment {
        Fragment {
            position: clip_position(self.pos),
            color: Vec4::from_array(self.color),
            uv: Vec2::from_array(self.uv),
            mode: RenderMode::COVERAGE_RAW,
        }
    }
}

impl VertexInput for PackedVertex {
    type Color = PackedColor;

    fn vertex_stage(&self) -> Fragment<PackedColor> {
        Fragment {
            position: clip_position(self.pos),
            color: self.color,
            uv: Vec2::from_array(self.uv),
            mode: RenderMode::COVERAGE_RAW,
        }
    }
}

impl VertexInput for ModeVertex {
    type Color = Vec4;

    fn vertex_stage(&self) -> Fragment {
        Fragment {
            position: clip_position(self.pos),
            color: Vec4::from_array(self.color),
            uv: Vec2::from_array(self.uv),
            mode: self.mode,
        }
    }
}

pub fn fs_passthrough(input: &Fragment<PackedColor>) -> PackedColor {
    input.color
}

pub fn fs_gamma(input: &Fragment) -> Vec4 {
    gamma_encode_rgb(input.color)
}

pub fn fs_coverage(input: &Fragment, texture: &dyn TextureSampler) -> Vec4 {
    let coverage = texture.sample(input.uv).x;
    let color = gamma_encode_rgb(input.color);
    Vec4::new(color.x, color.y, color.z, input.color.w * coverage)
}

pub fn fs_mode_branch(input: &Fragment, texture: &dyn TextureSampler) -> Vec4 {
    match RenderMode::from_raw(input.mode) {
        RenderMode::Coverage => fs_coverage(input, texture),
        RenderMode::Textured => gamma_encode_rgba(texture.sample(input.uv) * input.color),
    }
}

/// Run a float-color fragment through the given variant.
///
/// Returns `None` for [`FragmentVariant::Passthrough`], which only takes packed colors.
pub fn shade(
    variant: FragmentVariant,
    input: &Fragment,
    texture: &dyn TextureSampler,
) -> Option<Vec4> {
    match variant {
        FragmentVariant::Passthrough => None,
        FragmentVariant::Gamma => Some(fs_gamma(input)),
        FragmentVariant::Coverage => Some(fs_coverage(input, texture)),
        FragmentVariant::ModeBranch => Some(fs_mode_branch(input, texture)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::gamma::gamma_encode;
    use crate::sampler::CpuTexture;
    use crate::texture::{ImageData, TextureKind};

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-6
    }

    #[test]
    fn test_vertex_stage_embeds_at_depth_zero() {
        let v = ModeVertex {
            pos: [-0.5, 0.25],
            uv: [0.1, 0.9],
            color: [0.2, 0.4, 0.6, 0.8],
            mode: 3,
        };
        let f = v.vertex_stage();
        assert_eq!(f.position, Vec4::new(-0.5, 0.25, 0.0, 1.0));
        assert_eq!(f.color, Vec4::new(0.2, 0.4, 0.6, 0.8));
        assert_eq!(f.uv, Vec2::new(0.1, 0.9));
        assert_eq!(f.mode, 3);
    }

    #[test]
    fn test_passthrough_preserves_every_bit() {
        for id in [0u32, 1, 0x7F, 0x80, 0xFF, 0x0102_0304, 0x8000_0000, u32::MAX] {
            let v = PackedVertex {
                pos: [0.0, 0.0],
                uv: [0.0, 0.0],
                color: PackedColor::from_u32(id),
            };
            let out = fs_passthrough(&v.vertex_stage());
            assert_eq!(out.to_u32(), id);
        }
    }

    #[test]
    fn test_gamma_variant_leaves_alpha() {
        let f = Vertex::new([0.0, 0.0], [0.0, 0.0], Rgba::new(0.5, 0.25, 0.0, 0.7)).vertex_stage();
        let out = fs_gamma(&f);
        assert_eq!(out.w, 0.7);
        assert!((out.x - gamma_encode(0.5)).abs() < 1e-6);
        assert_eq!(out.z, 0.0);
    }

    #[test]
    fn test_coverage_alpha_is_exact_product() {
        // Every representable coverage value.
        let pixels: Vec<u8> = (0..=255).collect();
        let image = ImageData::new([256, 1], TextureKind::Coverage, pixels).unwrap();
        let texture = CpuTexture::from_image(&image).unwrap();

        for alpha in [0.0f32, 0.3, 0.5, 1.0] {
            for x in 0..256u32 {
                let uv = [(x as f32 + 0.5) / 256.0, 0.5];
                let f = Vertex::new([0.0, 0.0], uv, Rgba::new(1.0, 0.5, 0.25, alpha)).vertex_stage();
                let sampled = texture.sample(f.uv).x;
                let out = fs_coverage(&f, &texture);
                assert_eq!(out.w, alpha * sampled);
                assert_eq!(out.x, 1.0);
            }
        }
    }

    #[test]
    fn test_mode_zero_matches_coverage_path() {
        let texture = Vec4::new(0.6, 0.1, 0.2, 0.3);
        let f = ModeVertex {
            pos: [0.0, 0.0],
            uv: [0.5, 0.5],
            color: [0.3, 0.6, 0.9, 0.5],
            mode: RenderMode::COVERAGE_RAW,
        }
        .vertex_stage();
        assert_eq!(fs_mode_branch(&f, &texture), fs_coverage(&f, &texture));
        assert_eq!(fs_mode_branch(&f, &texture).w, 0.5 * 0.6);
    }

    #[test]
    fn test_nonzero_mode_modulates_then_encodes_all_channels() {
        let texture = Vec4::new(0.5, 1.0, 0.25, 0.8);
        let color = Vec4::new(0.5, 0.5, 1.0, 0.5);
        for mode in [1, 2, 99] {
            let f = ModeVertex {
                pos: [0.0, 0.0],
                uv: [0.0, 0.0],
                color: color.to_array(),
                mode,
            }
            .vertex_stage();
            let expected = (texture * color).powf(crate::gamma::GAMMA_EXPONENT);
            assert!(approx(fs_mode_branch(&f, &texture), expected));
        }
    }

    #[test]
    fn test_shade_dispatches_by_variant() {
        let f = Vertex::new([0.0, 0.0], [0.0, 0.0], Rgba::new(0.5, 0.5, 0.5, 1.0)).vertex_stage();
        let tex = Vec4::new(0.5, 0.0, 0.0, 1.0);
        assert_eq!(shade(FragmentVariant::Passthrough, &f, &tex), None);
        assert_eq!(shade(FragmentVariant::Gamma, &f, &tex), Some(fs_gamma(&f)));
        assert_eq!(shade(FragmentVariant::Coverage, &f, &tex).unwrap().w, 0.5);
    }

    #[test]
    fn test_variant_capabilities() {
        assert!(FragmentVariant::Passthrough.packed_color());
        assert!(!FragmentVariant::Gamma.samples_texture());
        assert!(FragmentVariant::Coverage.samples_texture());
        assert!(!FragmentVariant::Coverage.has_mode());
        assert!(FragmentVariant::ModeBranch.has_mode());
    }
}
