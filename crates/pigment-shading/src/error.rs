/// Errors raised while validating host-side frame data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pixel buffer length disagrees with the declared image size.
    #[error("image of {width}x{height} needs {expected} bytes, got {actual}")]
    ImageSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Index count is not a whole number of triangles.
    #[error("mesh has {0} indices, which is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// An index points past the end of the vertex list.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
