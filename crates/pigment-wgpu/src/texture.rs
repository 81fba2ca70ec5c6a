//! GPU-side texture storage keyed by [`TextureId`].
//!
//! Coverage images live in `R8Unorm` textures, so sampling yields `(v, 0, 0, 1)`. Color images
//! are sRGB-encoded bytes and live in `Rgba8UnormSrgb` textures, so sampling yields linear
//! values the pixel stage can multiply with linear vertex colors.

use std::collections::HashMap;

use pigment_shading::{ImageData, ImageDelta, TextureId, TextureKind};

use crate::config::{to_wgpu_address_mode, to_wgpu_filter, RendererConfig};
use crate::error::Error;
use crate::pipeline::create_texture_bind_group_layout;

pub(crate) fn texture_format(kind: TextureKind) -> wgpu::TextureFormat {
    match kind {
        TextureKind::Coverage => wgpu::TextureFormat::R8Unorm,
        TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

/// Validate a partial update against the texture it patches.
pub(crate) fn check_partial_update(
    id: TextureId,
    texture_size: [u32; 2],
    texture_kind: TextureKind,
    pos: [u32; 2],
    image: &ImageData,
) -> Result<(), Error> {
    if image.kind != texture_kind {
        return Err(Error::TextureKindMismatch {
            id,
            expected: texture_kind,
            actual: image.kind,
        });
    }

    let fits = |axis: usize| {
        pos[axis]
            .checked_add(image.size[axis])
            .is_some_and(|end| end <= texture_size[axis])
    };
    if !(fits(0) && fits(1)) {
        return Err(Error::UpdateOutOfBounds {
            id,
            pos,
            size: image.size,
            texture_size,
        });
    }
    Ok(())
}

/// Version of the image last uploaded through `update_if_needed`.
///
/// Any other write leaves the contents unversioned, so the next versioned upload goes through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct UploadVersion(Option<u64>);

impl UploadVersion {
    pub(crate) fn needs_upload(self, version: u64) -> bool {
        self.0 != Some(version)
    }

    pub(crate) fn record(&mut self, version: u64) {
        self.0 = Some(version);
    }

    pub(crate) fn invalidate(&mut self) {
        self.0 = None;
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: [u32; 2],
    kind: TextureKind,
    version: UploadVersion,
}

/// Owns every texture a frame can bind, plus the shared sampler.
pub struct TextureManager {
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: HashMap<TextureId, GpuTexture>,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device, config: &RendererConfig) -> Self {
        let address_mode = to_wgpu_address_mode(config.address_mode);
        let filter = to_wgpu_filter(config.filter);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Pigment Texture Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            bind_group_layout: create_texture_bind_group_layout(device),
            sampler,
            textures: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.textures.get(&id).map(|t| &t.bind_group)
    }

    pub fn kind(&self, id: TextureId) -> Option<TextureKind> {
        self.textures.get(&id).map(|t| t.kind)
    }

    pub fn size(&self, id: TextureId) -> Option<[u32; 2]> {
        self.textures.get(&id).map(|t| t.size)
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Apply one texture delta: create/replace on a whole image, patch on a partial one.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: TextureId,
        delta: &ImageDelta,
    ) -> Result<(), Error> {
        delta.image.check_size()?;

        match delta.pos {
            None => {
                self.create(device, queue, id, &delta.image)?;
            }
            Some(pos) => {
                let existing = self
                    .textures
                    .get_mut(&id)
                    .ok_or(Error::MissingTexture(id))?;
                check_partial_update(id, existing.size, existing.kind, pos, &delta.image)?;
                write_pixels(queue, &existing.texture, pos, &delta.image);
                existing.version.invalidate();
                log::trace!(
                    "patched {:?} at {:?} with {:?}",
                    id,
                    pos,
                    delta.image.size
                );
            }
        }
        Ok(())
    }

    /// Upload `image` unless the same `version` is already resident.
    ///
    /// Returns whether an upload happened. Hosts that track a version counter for their atlas
    /// (rather than emitting deltas) can call this every frame.
    pub fn update_if_needed(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: TextureId,
        version: u64,
        image: &ImageData,
    ) -> Result<bool, Error> {
        let resident = self
            .textures
            .get(&id)
            .map(|t| t.version)
            .unwrap_or_default();
        if !resident.needs_upload(version) {
            log::trace!("{:?} already at version {}", id, version);
            return Ok(false);
        }

        image.check_size()?;
        self.create(device, queue, id, image)?;
        if let Some(texture) = self.textures.get_mut(&id) {
            texture.version.record(version);
        }
        Ok(true)
    }

    /// Release a texture. Returns whether it existed.
    pub fn free(&mut self, id: TextureId) -> bool {
        let existed = self.textures.remove(&id).is_some();
        if existed {
            log::debug!("freed texture {:?}", id);
        }
        existed
    }

    fn create(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: TextureId,
        image: &ImageData,
    ) -> Result<(), Error> {
        let [width, height] = image.size;
        if width == 0 || height == 0 {
            return Err(Error::EmptyTexture(id));
        }

        // Reuse the existing texture when only the contents change.
        if let Some(existing) = self.textures.get_mut(&id) {
            if existing.size == image.size && existing.kind == image.kind {
                write_pixels(queue, &existing.texture, [0, 0], image);
                existing.version.invalidate();
                return Ok(());
            }
        }

        let label = format!("Pigment Texture {:?}", id);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(image.kind),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_pixels(queue, &texture, [0, 0], image);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::debug!(
            "created {:?} texture {:?} ({}x{})",
            image.kind,
            id,
            width,
            height
        );

        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
                size: image.size,
                kind: image.kind,
                version: UploadVersion::default(),
            },
        );
        Ok(())
    }
}

fn write_pixels(queue: &wgpu::Queue, texture: &wgpu::Texture, pos: [u32; 2], image: &ImageData) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: pos[0],
                y: pos[1],
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height()),
        },
        wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
    );
}
