//! # pigment-wgpu
//!
//! WGPU rendering backend for pigment.
//!
//! Each [`FragmentVariant`](pigment_shading::FragmentVariant) maps to one WGSL module with a
//! `vs_main`/`fs_main` pair. A [`Renderer`] owns the pipeline for one variant, the textures
//! it samples and the per-frame vertex and index buffers.

mod config;
mod error;
mod layout;
mod pick;
mod pipeline;
mod renderer;
mod shader;
mod texture;

#[cfg(feature = "egui")]
pub mod egui;

pub use config::*;
pub use error::*;
pub use layout::*;
pub use pick::*;
pub use pipeline::*;
pub use renderer::*;
pub use shader::*;
pub use texture::TextureManager;

pub use pigment_shading;
pub use wgpu;
