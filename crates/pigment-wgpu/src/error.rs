use pigment_shading::{TextureId, TextureKind};

/// Errors that can occur in the wgpu backend.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A partial update targeted a texture that was never created.
    #[error("partial update of {0:?}, which does not exist")]
    MissingTexture(TextureId),

    /// A partial update carried pixels of a different kind than the texture.
    #[error("texture {id:?} holds {expected:?} pixels, update has {actual:?}")]
    TextureKindMismatch {
        id: TextureId,
        expected: TextureKind,
        actual: TextureKind,
    },

    /// A partial update does not fit inside the texture.
    #[error("update of {size:?} at {pos:?} does not fit texture {id:?} of {texture_size:?}")]
    UpdateOutOfBounds {
        id: TextureId,
        pos: [u32; 2],
        size: [u32; 2],
        texture_size: [u32; 2],
    },

    /// Textures must be at least one pixel in each direction.
    #[error("texture {0:?} would have zero size")]
    EmptyTexture(TextureId),

    /// Image data failed validation.
    #[error(transparent)]
    Shading(#[from] pigment_shading::Error),

    /// Mapping a readback buffer failed.
    #[error("failed to map readback buffer")]
    BufferAsync(#[from] wgpu::BufferAsyncError),

    /// The device finished polling without resolving the readback map.
    #[error("readback buffer was not mapped after waiting on the device")]
    ReadbackPending,

    /// Waiting on the device failed.
    #[error("failed to poll device")]
    Poll(#[from] wgpu::PollError),
}
