use crate::color::{PackedColor, Rgba};

/// Selects the pixel-stage path of the mode-branching pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Single-channel coverage mask (glyph atlases). Raw value `0`.
    #[default]
    Coverage,
    /// Full-color texture modulated by the vertex color. Any nonzero raw value.
    Textured,
}

impl RenderMode {
    pub const COVERAGE_RAW: u32 = 0;
    pub const TEXTURED_RAW: u32 = 1;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        if raw == Self::COVERAGE_RAW {
            Self::Coverage
        } else {
            Self::Textured
        }
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Coverage => Self::COVERAGE_RAW,
            Self::Textured => Self::TEXTURED_RAW,
        }
    }
}

/// Access to the position every vertex record carries.
///
/// Draw batching rewrites positions into clip space without caring about the other fields.
pub trait VertexRecord: Copy {
    fn pos(&self) -> [f32; 2];
    fn with_pos(self, pos: [f32; 2]) -> Self;
}

/// Vertex with a linear floating-point color.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(pos: [f32; 2], uv: [f32; 2], color: Rgba) -> Self {
        Self {
            pos,
            uv,
            color: color.to_array(),
        }
    }
}

/// Vertex with an 8-bit-per-channel integer color, as used by ID buffers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct PackedVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: PackedColor,
}

/// Vertex carrying the raw mode selector for the mode-branching pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct ModeVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub mode: u32,
}

impl ModeVertex {
    pub const fn from_vertex(v: Vertex, mode: RenderMode) -> Self {
        Self {
            pos: v.pos,
            uv: v.uv,
            color: v.color,
            mode: mode.to_raw(),
        }
    }

    #[inline]
    pub const fn render_mode(&self) -> RenderMode {
        RenderMode::from_raw(self.mode)
    }
}

impl From<ModeVertex> for Vertex {
    fn from(v: ModeVertex) -> Self {
        Self {
            pos: v.pos,
            uv: v.uv,
            color: v.color,
        }
    }
}

impl From<ModeVertex> for PackedVertex {
    fn from(v: ModeVertex) -> Self {
        Self {
            pos: v.pos,
            uv: v.uv,
            color: Rgba::from(v.color).to_packed(),
        }
    }
}

macro_rules! impl_vertex_record {
    ($($ty:ty),*) => {
        $(
            impl VertexRecord for $ty {
                #[inline]
                fn pos(&self) -> [f32; 2] {
                    self.pos
                }

                #[inline]
                fn with_pos(mut self, pos: [f32; 2]) -> Self {
                    self.pos = pos;
                    self
                }
            }
        )*
    };
}

impl_vertex_record!(Vertex, PackedVertex, ModeVertex);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes_have_no_padding() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::size_of::<PackedVertex>(), 20);
        assert_eq!(std::mem::size_of::<ModeVertex>(), 36);
    }

    #[test]
    fn test_any_nonzero_mode_is_textured() {
        assert_eq!(RenderMode::from_raw(0), RenderMode::Coverage);
        for raw in [1, 2, 7, u32::MAX] {
            assert_eq!(RenderMode::from_raw(raw), RenderMode::Textured);
        }
    }

    #[test]
    fn test_mode_round_trips_through_vertex() {
        let v = Vertex::new([1.0, 2.0], [0.5, 0.5], Rgba::WHITE);
        let mv = ModeVertex::from_vertex(v, RenderMode::Textured);
        assert_eq!(mv.render_mode(), RenderMode::Textured);
        assert_eq!(Vertex::from(mv), v);
    }
}
