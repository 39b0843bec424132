use glam::Vec2;

/// The uniforms every fragment shader effect receives once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShaderUniformSet {
    /// Seconds since the animation started.
    pub time: f32,
    /// Drawing buffer size in pixels.
    pub resolution: Vec2,
    /// Pointer position in pixels, origin top-left.
    pub pointer: Vec2,
    /// Effect-specific intensity, typically hover or pointer energy.
    pub intensity: f32,
}

impl ShaderUniformSet {
    /// Returns the pointer in normalized device space with `y` up, scaled so
    /// the shorter viewport side spans `-1.0..=1.0`.
    pub fn pointer_ndc(&self) -> Vec2 {
        let min = self.resolution.x.min(self.resolution.y).max(1.0);
        let p = (self.pointer * 2.0 - self.resolution) / min;
        Vec2::new(p.x, -p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_ndc() {
        let uniforms = ShaderUniformSet {
            resolution: Vec2::new(200.0, 100.0),
            pointer: Vec2::new(100.0, 0.0),
            ..Default::default()
        };
        assert_eq!(uniforms.pointer_ndc(), Vec2::new(0.0, 1.0));
    }
}
