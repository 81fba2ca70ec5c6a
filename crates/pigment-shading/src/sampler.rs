//! CPU stand-in for a bound texture + sampler pair.
//!
//! Mirrors what the GPU sampler does for the two texture kinds the pipelines bind:
//! coverage masks read back as `(v, 0, 0, 1)` like an `R8Unorm` view, color images as full
//! RGBA. Used by the reference pixel stages and by tests.

use glam::{Vec2, Vec4};

use crate::error::Error;
use crate::texture::{ImageData, TextureKind};

/// How texture coordinates outside [0, 1] are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

impl AddressMode {
    /// Map an integer texel coordinate onto `0..size`.
    fn resolve(self, i: i64, size: u32) -> u32 {
        let n = size as i64;
        let wrapped = match self {
            Self::ClampToEdge => i.clamp(0, n - 1),
            Self::Repeat => i.rem_euclid(n),
            Self::MirrorRepeat => {
                let period = i.rem_euclid(2 * n);
                if period < n {
                    period
                } else {
                    2 * n - 1 - period
                }
            }
        };
        wrapped as u32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Anything the pixel stage can sample at a UV.
pub trait TextureSampler {
    fn sample(&self, uv: Vec2) -> Vec4;
}

/// A texture sampled with a constant color everywhere. Handy for untextured draws.
impl TextureSampler for Vec4 {
    fn sample(&self, _uv: Vec2) -> Vec4 {
        *self
    }
}

/// Normalized texels plus the sampler state used to read them.
#[derive(Clone, Debug)]
pub struct CpuTexture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
    pub address_mode: AddressMode,
    pub filter: FilterMode,
}

impl CpuTexture {
    pub fn from_image(image: &ImageData) -> Result<Self, Error> {
        image.check_size()?;
        let [width, height] = image.size;
        let texels = match image.kind {
            TextureKind::Coverage => image
                .pixels
                .iter()
                .map(|&v| Vec4::new(v as f32 / 255.0, 0.0, 0.0, 1.0))
                .collect(),
            TextureKind::Color => image
                .pixels
                .chunks_exact(4)
                .map(|p| {
                    Vec4::new(
                        p[0] as f32 / 255.0,
                        p[1] as f32 / 255.0,
                        p[2] as f32 / 255.0,
                        p[3] as f32 / 255.0,
                    )
                })
                .collect(),
        };

        Ok(Self {
            width,
            height,
            texels,
            address_mode: AddressMode::default(),
            filter: FilterMode::default(),
        })
    }

    pub fn with_address_mode(mut self, address_mode: AddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    #[inline]
    pub const fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    fn texel(&self, x: i64, y: i64) -> Vec4 {
        let x = self.address_mode.resolve(x, self.width);
        let y = self.address_mode.resolve(y, self.height);
        self.texels[(y * self.width + x) as usize]
    }
}

impl TextureSampler for CpuTexture {
    fn sample(&self, uv: Vec2) -> Vec4 {
        if self.texels.is_empty() {
            return Vec4::ZERO;
        }

        let p = uv * Vec2::new(self.width as f32, self.height as f32);
        match self.filter {
            FilterMode::Nearest => self.texel(p.x.floor() as i64, p.y.floor() as i64),
            FilterMode::Linear => {
                // Texel centers sit at half-integer coordinates.
                let p = p - Vec2::splat(0.5);
                let base = p.floor();
                let t = p - base;
                let (x0, y0) = (base.x as i64, base.y as i64);

                let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), t.x);
                let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), t.x);
                top.lerp(bottom, t.y)
            }
        }
    }
}
