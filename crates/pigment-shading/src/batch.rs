//! Flattening clipped meshes into one vertex/index stream plus a list of draw calls.

use std::ops::Range;

use crate::clip::ScissorRect;
use crate::mesh::ClippedMesh;
use crate::screen::ScreenDescriptor;
use crate::texture::TextureId;
use crate::vertex::{ModeVertex, PackedVertex, RenderMode, Vertex, VertexRecord};

/// One indexed draw sharing a scissor rect and a texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub scissor: ScissorRect,
    pub texture: TextureId,
    pub index_range: Range<u32>,
}

/// Everything a backend uploads and issues for one frame.
///
/// Vertex positions are already in clip space and indices are absolute into `vertices`.
#[derive(Clone, Debug)]
pub struct FrameGeometry<V = ModeVertex> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
    pub draws: Vec<DrawCall>,
}

impl<V> Default for FrameGeometry<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            draws: Vec::new(),
        }
    }
}

impl<V> FrameGeometry<V> {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draws.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// Reusable builder for [`FrameGeometry`].
///
/// Keeps its allocations between frames.
#[derive(Debug)]
pub struct GeometryBuilder<V = ModeVertex> {
    geometry: FrameGeometry<V>,
}

impl<V> Default for GeometryBuilder<V> {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
        }
    }
}

impl<V: VertexRecord> GeometryBuilder<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self) -> &FrameGeometry<V> {
        &self.geometry
    }

    /// Build the frame geometry for `meshes` in paint order.
    ///
    /// `per_mesh` runs once per mesh with its texture, and `convert` turns each source vertex
    /// into the output record using that result. Positions are rewritten into clip space
    /// afterwards. Meshes whose clip rect misses the framebuffer, and meshes that are not
    /// drawable, are skipped.
    pub fn build_with<'a, S, I, P, C, F>(
        &mut self,
        meshes: I,
        screen: &ScreenDescriptor,
        mut per_mesh: P,
        convert: F,
    ) -> &FrameGeometry<V>
    where
        S: VertexRecord + 'a,
        I: IntoIterator<Item = &'a ClippedMesh<S>>,
        P: FnMut(TextureId) -> C,
        C: Copy,
        F: Fn(S, C) -> V,
    {
        let geometry = &mut self.geometry;
        geometry.clear();

        for clipped in meshes {
            let mesh = &clipped.mesh;
            let Some(scissor) = ScissorRect::from_clip_rect(clipped.clip_rect, screen) else {
                continue;
            };
            if !mesh.is_drawable() {
                continue;
            }

            let context = per_mesh(mesh.texture);
            let base = geometry.vertices.len() as u32;
            geometry.vertices.extend(
                mesh.vertices
                    .iter()
                    .map(|v| convert(*v, context).with_pos(screen.to_clip_space(v.pos()))),
            );

            let index_start = geometry.indices.len() as u32;
            geometry
                .indices
                .extend(mesh.indices.iter().map(|&i| base + i));
            let index_end = geometry.indices.len() as u32;

            // Extend the previous draw when nothing about the pipeline state changes.
            match geometry.draws.last_mut() {
                Some(last)
                    if last.scissor == scissor
                        && last.texture == mesh.texture
                        && last.index_range.end == index_start =>
                {
                    last.index_range.end = index_end;
                }
                _ => geometry.draws.push(DrawCall {
                    scissor,
                    texture: mesh.texture,
                    index_range: index_start..index_end,
                }),
            }
        }

        &self.geometry
    }
}

impl GeometryBuilder<ModeVertex> {
    /// Build float-color geometry, tagging each mesh with the mode `mode_for` picks for its
    /// texture.
    pub fn build<'a, I, F>(
        &mut self,
        meshes: I,
        screen: &ScreenDescriptor,
        mode_for: F,
    ) -> &FrameGeometry
    where
        I: IntoIterator<Item = &'a ClippedMesh<Vertex>>,
        F: FnMut(TextureId) -> RenderMode,
    {
        self.build_with(meshes, screen, mode_for, ModeVertex::from_vertex)
    }
}

impl GeometryBuilder<PackedVertex> {
    /// Build integer-color geometry. Colors are copied bit for bit.
    pub fn build_packed<'a, I>(
        &mut self,
        meshes: I,
        screen: &ScreenDescriptor,
    ) -> &FrameGeometry<PackedVertex>
    where
        I: IntoIterator<Item = &'a ClippedMesh<PackedVertex>>,
    {
        self.build_with(meshes, screen, |_| (), |v, ()| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{PackedColor, Rgba};
    use crate::mesh::{Mesh, Rect};

    fn square(texture: TextureId, origin: [f32; 2]) -> Mesh {
        let mut mesh = Mesh::new(texture);
        let v = |dx: f32, dy: f32| {
            Vertex::new([origin[0] + dx, origin[1] + dy], [dx, dy], Rgba::WHITE)
        };
        mesh.add_quad([v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)]);
        mesh
    }

    fn screen() -> ScreenDescriptor {
        ScreenDescriptor::new([100, 100], 1.0)
    }

    const FONT: TextureId = TextureId::Managed(0);
    const IMAGE: TextureId = TextureId::User(1);

    fn mode_for(id: TextureId) -> RenderMode {
        if id == FONT {
            RenderMode::Coverage
        } else {
            RenderMode::Textured
        }
    }

    #[test]
    fn test_merges_same_state_draws() {
        let clip = Rect::new([0.0, 0.0], [50.0, 50.0]);
        let meshes = vec![
            ClippedMesh::new(clip, square(FONT, [0.0, 0.0])),
            ClippedMesh::new(clip, square(FONT, [10.0, 0.0])),
        ];

        let mut builder = GeometryBuilder::<ModeVertex>::new();
        let geometry = builder.build(&meshes, &screen(), mode_for);

        assert_eq!(geometry.draws.len(), 1);
        assert_eq!(geometry.draws[0].index_range, 0..12);
        assert_eq!(geometry.vertices.len(), 8);
        // Second mesh's indices are rebased past the first mesh's vertices.
        assert_eq!(&geometry.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_splits_on_texture_or_scissor_change() {
        let a = Rect::new([0.0, 0.0], [50.0, 50.0]);
        let b = Rect::new([0.0, 0.0], [20.0, 20.0]);
        let meshes = vec![
            ClippedMesh::new(a, square(FONT, [0.0, 0.0])),
            ClippedMesh::new(a, square(IMAGE, [0.0, 0.0])),
            ClippedMesh::new(b, square(IMAGE, [0.0, 0.0])),
            ClippedMesh::new(b, square(IMAGE, [5.0, 5.0])),
        ];

        let mut builder = GeometryBuilder::<ModeVertex>::new();
        let geometry = builder.build(&meshes, &screen(), mode_for);

        let ranges: Vec<_> = geometry.draws.iter().map(|d| d.index_range.clone()).collect();
        assert_eq!(ranges, vec![0..6, 6..12, 12..24]);
        assert_eq!(geometry.draws[1].texture, IMAGE);
        assert_eq!(geometry.draws[2].scissor.width, 20);
    }

    #[test]
    fn test_assigns_mode_and_clip_space_positions() {
        let meshes = vec![
            ClippedMesh::new(Rect::EVERYTHING, square(FONT, [50.0, 50.0])),
            ClippedMesh::new(Rect::EVERYTHING, square(IMAGE, [0.0, 0.0])),
        ];

        let mut builder = GeometryBuilder::<ModeVertex>::new();
        let geometry = builder.build(&meshes, &screen(), mode_for);

        assert_eq!(geometry.vertices[0].pos, [0.0, 0.0]);
        assert_eq!(geometry.vertices[0].mode, RenderMode::COVERAGE_RAW);
        assert_eq!(geometry.vertices[4].pos, [-1.0, 1.0]);
        assert_eq!(geometry.vertices[4].mode, RenderMode::TEXTURED_RAW);
        // UV and color pass through untouched.
        assert_eq!(geometry.vertices[6].uv, [1.0, 1.0]);
        assert_eq!(geometry.vertices[6].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_skips_offscreen_and_malformed_meshes() {
        let mut broken = square(IMAGE, [0.0, 0.0]);
        broken.indices.push(0);
        let meshes = vec![
            ClippedMesh::new(Rect::new([200.0, 200.0], [300.0, 300.0]), square(FONT, [0.0, 0.0])),
            ClippedMesh::new(Rect::EVERYTHING, broken),
            ClippedMesh::new(Rect::EVERYTHING, Mesh::new(FONT)),
        ];

        let mut builder = GeometryBuilder::<ModeVertex>::new();
        let geometry = builder.build(&meshes, &screen(), mode_for);

        assert!(geometry.is_empty());
        assert!(geometry.vertices.is_empty());
    }

    #[test]
    fn test_rebuild_clears_previous_frame() {
        let meshes = vec![ClippedMesh::new(Rect::EVERYTHING, square(FONT, [0.0, 0.0]))];
        let mut builder = GeometryBuilder::<ModeVertex>::new();
        builder.build(&meshes, &screen(), mode_for);
        let geometry = builder.build(&meshes, &screen(), mode_for);
        assert_eq!(geometry.indices.len(), 6);
        assert_eq!(geometry.draws.len(), 1);
    }

    #[test]
    fn test_packed_build_keeps_color_bits() {
        let color = PackedColor::from_u32(0x8001_7fff);
        let v = |x: f32, y: f32| PackedVertex {
            pos: [x, y],
            uv: [0.0, 0.0],
            color,
        };
        let mut mesh = Mesh::new(IMAGE);
        mesh.add_quad([v(0.0, 0.0), v(100.0, 0.0), v(100.0, 100.0), v(0.0, 100.0)]);
        let meshes = vec![ClippedMesh::new(Rect::EVERYTHING, mesh)];

        let mut builder = GeometryBuilder::<PackedVertex>::new();
        let geometry = builder.build_packed(&meshes, &screen());

        assert_eq!(geometry.draws.len(), 1);
        assert!(geometry.vertices.iter().all(|v| v.color == color));
        assert_eq!(geometry.vertices[2].pos, [1.0, -1.0]);
    }
}
