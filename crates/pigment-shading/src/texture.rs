use crate::error::Error;
use crate::vertex::RenderMode;

/// Identifies a texture bound by a draw.
///
/// `Managed` textures are created and freed through [`TexturesDelta`]; `User` ids belong to
/// textures the host registers itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureId {
    Managed(u64),
    User(u64),
}

impl Default for TextureId {
    fn default() -> Self {
        Self::Managed(0)
    }
}

/// Pixel layout of an image, and with it the pixel-stage path that samples it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// One byte of coverage per pixel (glyph masks).
    Coverage,
    /// Four bytes per pixel, sRGB-encoded RGBA with premultiplied alpha.
    Color,
}

impl TextureKind {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Coverage => 1,
            Self::Color => 4,
        }
    }

    #[inline]
    pub const fn render_mode(self) -> RenderMode {
        match self {
            Self::Coverage => RenderMode::Coverage,
            Self::Color => RenderMode::Textured,
        }
    }
}

/// CPU-side pixels, rows packed top to bottom with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub size: [u32; 2],
    pub kind: TextureKind,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(size: [u32; 2], kind: TextureKind, pixels: Vec<u8>) -> Result<Self, Error> {
        let image = Self { size, kind, pixels };
        image.check_size()?;
        Ok(image)
    }

    /// Fill an image with a single byte value.
    pub fn filled(size: [u32; 2], kind: TextureKind, value: u8) -> Self {
        let len = size[0] as usize * size[1] as usize * kind.bytes_per_pixel();
        Self {
            size,
            kind,
            pixels: vec![value; len],
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.size[0]
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.size[1]
    }

    #[inline]
    pub const fn bytes_per_row(&self) -> u32 {
        self.size[0] * self.kind.bytes_per_pixel() as u32
    }

    pub fn check_size(&self) -> Result<(), Error> {
        let expected =
            self.size[0] as usize * self.size[1] as usize * self.kind.bytes_per_pixel();
        if self.pixels.len() != expected {
            return Err(Error::ImageSizeMismatch {
                width: self.size[0],
                height: self.size[1],
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// A full or partial texture upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageDelta {
    pub image: ImageData,
    /// `None` replaces the whole texture, `Some([x, y])` patches a region at that offset.
    pub pos: Option<[u32; 2]>,
}

impl ImageDelta {
    pub fn full(image: ImageData) -> Self {
        Self { image, pos: None }
    }

    pub fn partial(pos: [u32; 2], image: ImageData) -> Self {
        Self {
            image,
            pos: Some(pos),
        }
    }

    #[inline]
    pub fn is_whole(&self) -> bool {
        self.pos.is_none()
    }
}

/// Texture changes to apply before drawing a frame, and frees to apply after it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TexturesDelta {
    pub set: Vec<(TextureId, ImageDelta)>,
    pub free: Vec<TextureId>,
}

impl TexturesDelta {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.free.is_empty()
    }

    pub fn append(&mut self, mut other: Self) {
        self.set.append(&mut other.set);
        self.free.append(&mut other.free);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_check_rejects_short_buffer() {
        let err = ImageData::new([2, 2], TextureKind::Color, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            Error::ImageSizeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_kind_selects_mode() {
        assert_eq!(TextureKind::Coverage.render_mode(), RenderMode::Coverage);
        assert_eq!(TextureKind::Color.render_mode(), RenderMode::Textured);
    }

    #[test]
    fn test_filled_has_matching_length() {
        let image = ImageData::filled([3, 2], TextureKind::Color, 255);
        assert!(image.check_size().is_ok());
        assert_eq!(image.bytes_per_row(), 12);
    }
}
