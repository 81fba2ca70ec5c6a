use crate::error::Error;
use crate::texture::TextureId;
use crate::vertex::Vertex;

/// Axis-aligned rectangle in logical points, `min` inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub const EVERYTHING: Self = Self {
        min: [f32::NEG_INFINITY, f32::NEG_INFINITY],
        max: [f32::INFINITY, f32::INFINITY],
    };

    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: [f32; 2], size: [f32; 2]) -> Self {
        Self::new(min, [min[0] + size[0], min[1] + size[1]])
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }
}

/// Indexed triangle list sampling a single texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh<V = Vertex> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
    pub texture: TextureId,
}

impl<V> Mesh<V> {
    pub fn new(texture: TextureId) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            texture,
        }
    }

    pub fn with_capacity(texture: TextureId, vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
            texture,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Check that indices form whole triangles and stay inside the vertex list.
    pub fn validate(&self) -> Result<(), Error> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::IncompleteTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Non-empty and valid. Malformed meshes are logged at debug level.
    pub fn is_drawable(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        match self.validate() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("mesh for {:?} is not drawable: {err}", self.texture);
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

impl<V: Copy> Mesh<V> {
    /// Append a quad as two counter-clockwise triangles.
    pub fn add_quad(&mut self, corners: [V; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// A mesh together with the rectangle it is clipped to.
#[derive(Clone, Debug, PartialEq)]
pub struct ClippedMesh<V = Vertex> {
    pub clip_rect: Rect,
    pub mesh: Mesh<V>,
}

impl<V> ClippedMesh<V> {
    pub fn new(clip_rect: Rect, mesh: Mesh<V>) -> Self {
        Self { clip_rect, mesh }
    }
}

/// Drop meshes that are empty or malformed.
pub fn retain_drawable<V>(mut meshes: Vec<ClippedMesh<V>>) -> Vec<ClippedMesh<V>> {
    meshes.retain(|clipped| clipped.mesh.is_drawable());
    meshes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new(TextureId::Managed(0));
        let v = |x, y| Vertex::new([x, y], [0.0, 0.0], Rgba::WHITE);
        mesh.add_quad([v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)]);
        mesh
    }

    #[test]
    fn test_quad_is_drawable() {
        let mesh = quad();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(mesh.is_drawable());
    }

    #[test]
    fn test_partial_triangle_is_rejected() {
        let mut mesh = quad();
        mesh.indices.pop();
        assert_eq!(mesh.validate(), Err(Error::IncompleteTriangle(5)));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut mesh = quad();
        mesh.indices[4] = 4;
        assert_eq!(
            mesh.validate(),
            Err(Error::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_empty_mesh_validates_but_is_not_drawable() {
        let mesh: Mesh = Mesh::new(TextureId::User(1));
        assert!(mesh.validate().is_ok());
        assert!(!mesh.is_drawable());
    }

    #[test]
    fn test_retain_drawable_keeps_order() {
        let clip = Rect::new([0.0, 0.0], [10.0, 10.0]);
        let mut broken = quad();
        broken.indices.truncate(4);
        let mut second = quad();
        second.texture = TextureId::User(7);

        let kept = retain_drawable(vec![
            ClippedMesh::new(clip, quad()),
            ClippedMesh::new(clip, Mesh::new(TextureId::Managed(0))),
            ClippedMesh::new(clip, broken),
            ClippedMesh::new(clip, second),
        ]);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].mesh.texture, TextureId::Managed(0));
        assert_eq!(kept[1].mesh.texture, TextureId::User(7));
    }
}
