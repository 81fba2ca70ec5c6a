//! # pigment-shading
//!
//! Graphics backend agnostic shading contract for immediate-mode GUI rendering.
//!
//! This crate holds the vertex records and texture data a GUI frame is made of, the
//! host-side work a backend needs before drawing (clip-space conversion, scissor rects,
//! draw batching), and a CPU reference of the vertex and pixel stages. Rendering is handled
//! by backend crates like `pigment-wgpu`.

mod batch;
mod clip;
mod color;
mod error;
pub mod gamma;
mod mesh;
mod sampler;
mod screen;
pub mod stage;
mod texture;
mod vertex;

pub use batch::*;
pub use clip::*;
pub use color::*;
pub use error::*;
pub use mesh::*;
pub use sampler::*;
pub use screen::*;
pub use stage::FragmentVariant;
pub use texture::*;
pub use vertex::*;
