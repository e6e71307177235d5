/// Drawable extent in framebuffer pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn shorter_side(self) -> f32 {
        self.width.min(self.height)
    }

    #[inline]
    pub fn center(self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_side_and_center() {
        let v = Viewport::new(640.0, 480.0);
        assert_eq!(v.shorter_side(), 480.0);
        assert_eq!(v.center(), (320.0, 240.0));
        assert_eq!(Viewport::default().shorter_side(), 0.0);
    }
}
