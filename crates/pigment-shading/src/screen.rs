/// Size and scale of the render target a frame is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenDescriptor {
    /// Framebuffer size in physical pixels.
    pub size_in_pixels: [u32; 2],
    /// Physical pixels per logical point.
    pub pixels_per_point: f32,
}

impl ScreenDescriptor {
    pub fn new(size_in_pixels: [u32; 2], pixels_per_point: f32) -> Self {
        Self {
            size_in_pixels,
            pixels_per_point,
        }
    }

    pub fn size_in_points(&self) -> [f32; 2] {
        [
            self.size_in_pixels[0] as f32 / self.pixels_per_point,
            self.size_in_pixels[1] as f32 / self.pixels_per_point,
        ]
    }

    /// Map a position in points (origin top-left, y down) to normalized device coordinates.
    ///
    /// The vertex stage applies no projection, so this runs on the host for every vertex.
    #[inline]
    pub fn to_clip_space(&self, pos: [f32; 2]) -> [f32; 2] {
        let w = self.size_in_pixels[0].max(1) as f32;
        let h = self.size_in_pixels[1].max(1) as f32;
        let ppp = self.pixels_per_point;
        [
            2.0 * pos[0] * ppp / w - 1.0,
            1.0 - 2.0 * pos[1] * ppp / h,
        ]
    }
}
