//! Linear-to-display gamma encoding used by the floating-color pixel stages.

use glam::Vec4;

/// Exponent applied by the shaders, an approximation of `1.0 / 2.2`.
pub const GAMMA_EXPONENT: f32 = 0.4545;

/// The exact display-gamma exponent that [`GAMMA_EXPONENT`] approximates.
pub const EXACT_GAMMA_EXPONENT: f32 = 1.0 / 2.2;

/// Encode a single linear channel.
#[inline]
pub fn gamma_encode(c: f32) -> f32 {
    c.powf(GAMMA_EXPONENT)
}

/// Encode the RGB channels, leaving alpha untouched.
#[inline]
pub fn gamma_encode_rgb(color: Vec4) -> Vec4 {
    color
        .truncate()
        .powf(GAMMA_EXPONENT)
        .extend(color.w)
}

/// Encode all four channels, alpha included.
///
/// Only the full-color textured path does this.
#[inline]
pub fn gamma_encode_rgba(color: Vec4) -> Vec4 {
    color.powf(GAMMA_EXPONENT)
}
