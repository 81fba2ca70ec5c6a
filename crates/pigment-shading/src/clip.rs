use crate::mesh::Rect;
use crate::screen::ScreenDescriptor;

/// Scissor rectangle in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    /// The whole framebuffer.
    pub fn full(screen: &ScreenDescriptor) -> Self {
        Self {
            x: 0,
            y: 0,
            width: screen.size_in_pixels[0],
            height: screen.size_in_pixels[1],
        }
    }

    /// Convert a clip rect in points to pixels, clamped to the framebuffer.
    ///
    /// Rounds outward so partially covered pixels stay visible. Returns `None` when nothing
    /// of the rect lands on screen.
    pub fn from_clip_rect(clip_rect: Rect, screen: &ScreenDescriptor) -> Option<Self> {
        let ppp = screen.pixels_per_point;
        let [screen_w, screen_h] = screen.size_in_pixels;

        let min_x = (clip_rect.min[0] * ppp).max(0.0).floor();
        let min_y = (clip_rect.min[1] * ppp).max(0.0).floor();
        let max_x = (clip_rect.max[0] * ppp).min(screen_w as f32).ceil();
        let max_y = (clip_rect.max[1] * ppp).min(screen_h as f32).ceil();

        // NaN compares false, so a degenerate rect falls out here too.
        if !(max_x > min_x && max_y > min_y) {
            return None;
        }

        Some(Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x) as u32,
            height: (max_y - min_y) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenDescriptor {
        ScreenDescriptor::new([100, 50], 1.0)
    }

    #[test]
    fn test_rounds_outward() {
        let sc = ScissorRect::from_clip_rect(Rect::new([10.5, 5.2], [20.1, 9.9]), &screen());
        assert_eq!(
            sc,
            Some(ScissorRect {
                x: 10,
                y: 5,
                width: 11,
                height: 5
            })
        );
    }

    #[test]
    fn test_clamps_to_framebuffer() {
        let sc = ScissorRect::from_clip_rect(Rect::new([-30.0, -1.0], [500.0, 60.0]), &screen());
        assert_eq!(sc, Some(ScissorRect::full(&screen())));
        assert_eq!(
            ScissorRect::from_clip_rect(Rect::EVERYTHING, &screen()),
            Some(ScissorRect::full(&screen()))
        );
    }

    #[test]
    fn test_offscreen_and_empty_are_rejected() {
        let s = screen();
        assert_eq!(ScissorRect::from_clip_rect(Rect::new([120.0, 0.0], [130.0, 10.0]), &s), None);
        assert_eq!(ScissorRect::from_clip_rect(Rect::new([5.0, 5.0], [5.0, 20.0]), &s), None);
        assert_eq!(ScissorRect::from_clip_rect(Rect::new([5.0, 5.0], [1.0, 1.0]), &s), None);
    }

    #[test]
    fn test_scales_by_pixels_per_point() {
        let s = ScreenDescriptor::new([200, 100], 2.0);
        let sc = ScissorRect::from_clip_rect(Rect::new([10.0, 10.0], [20.0, 20.0]), &s).unwrap();
        assert_eq!((sc.x, sc.y, sc.width, sc.height), (20, 20, 20, 20));
    }
}
