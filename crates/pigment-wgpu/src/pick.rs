//! Integer ID target for the passthrough variant, plus single-pixel readback.
//!
//! Widgets are drawn with [`PackedColor::from_u32`] vertex colors through the passthrough
//! pipeline; the target then holds the exact bytes, and a pixel read decodes the ID under
//! the cursor. `0` means nothing was drawn there.

use std::sync::mpsc;

use pigment_shading::PackedColor;

use crate::error::Error;

/// ID read back from the pick target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickResult {
    pub id: u32,
}

impl PickResult {
    pub fn is_hit(&self) -> bool {
        self.id != 0
    }
}

/// Offscreen `Rgba8Uint` texture and a readback buffer for one pixel.
pub struct PickTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl PickTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Uint;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (texture, view) = create_id_texture(device, width, height);

        // `bytes_per_row` must be 256-byte aligned even for a 1x1 copy, so the buffer holds a
        // full aligned row and only the first 4 bytes are read.
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pigment Pick Readback Buffer"),
            size: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            staging,
            width,
            height,
        }
    }

    /// Render target view for the passthrough pipeline.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if self.width == width && self.height == height {
            return;
        }

        let (texture, view) = create_id_texture(device, width, height);
        self.texture = texture;
        self.view = view;
        self.width = width;
        self.height = height;
    }

    /// Copy the pixel at `(x, y)` into the readback buffer. Coordinates are clamped.
    pub fn encode_read_pixel(&self, encoder: &mut wgpu::CommandEncoder, x: u32, y: u32) {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Decode the readback buffer. It must currently be mapped for reading.
    pub fn read_mapped(&self) -> PickResult {
        let data = self.staging.slice(..).get_mapped_range();
        PickResult {
            id: decode_pixel(&data),
        }
    }

    pub fn staging_buffer(&self) -> &wgpu::Buffer {
        &self.staging
    }

    /// Copy, map and decode one pixel, blocking until the GPU is done.
    pub fn read_pixel(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        x: u32,
        y: u32,
    ) -> Result<PickResult, Error> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pigment Pick Readback Encoder"),
        });
        self.encode_read_pixel(&mut encoder, x, y);
        queue.submit(Some(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        self.staging
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;

        rx.try_recv().map_err(|_| Error::ReadbackPending)??;
        let result = self.read_mapped();
        self.staging.unmap();

        log::trace!("picked {:?} at ({x}, {y})", result);
        Ok(result)
    }
}

fn create_id_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Pigment Pick Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: PickTarget::FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn decode_pixel(data: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[..4]);
    PackedColor(bytes).to_u32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_matches_packed_color() {
        let id = 0x0a0b_0c0d;
        let mut row = vec![0u8; wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize];
        row[..4].copy_from_slice(&PackedColor::from_u32(id).0);
        assert_eq!(decode_pixel(&row), id);
    }

    #[test]
    fn test_zero_is_a_miss() {
        assert!(!PickResult { id: 0 }.is_hit());
        assert!(PickResult { id: 7 }.is_hit());
    }
}
