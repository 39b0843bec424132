/// An 8-bit RGB color with a floating point alpha channel.
///
/// Alpha is kept as `f32` because canvas trails and glows routinely use
/// opacities well below `1/255`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub a: f32,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    /// Constructs a new color.
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Constructs an opaque color from a 24-bit `0xRRGGBB` value.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Returns the same color with the given opacity.
    pub fn alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Constructs an opaque color from hue (degrees), saturation and
    /// lightness (both percentages).
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - chroma / 2.0;
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        Self::rgb(to_channel(r + m), to_channel(g + m), to_channel(b + m))
    }

    /// Returns hue (degrees), saturation and lightness (both percentages).
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let [r, g, b] = self.to_vec3();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let chroma = max - min;
        if chroma == 0.0 {
            return (0.0, 0.0, l * 100.0);
        }

        let s = chroma / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            ((g - b) / chroma).rem_euclid(6.0)
        } else if max == g {
            (b - r) / chroma + 2.0
        } else {
            (r - g) / chroma + 4.0
        };
        (h * 60.0, s * 100.0, l * 100.0)
    }

    /// Rotates the hue by `degrees`, keeping saturation, lightness and
    /// opacity.
    pub fn rotate_hue(self, degrees: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::hsl(h + degrees, s, l).alpha(self.a)
    }

    /// Linearly interpolates towards `other` by `t` in `0.0..=1.0`.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| to_channel((a as f32 + (b as f32 - a as f32) * t) / 255.0);
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Converts the color to a CSS `rgba()` string.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// Returns the color channels normalized to `0.0..=1.0`.
    pub fn to_vec3(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgba::hex(0xff6030), Rgba::rgb(0xff, 0x60, 0x30));
        assert_eq!(Rgba::hex(0x1b3984), Rgba::rgb(0x1b, 0x39, 0x84));
    }

    #[test]
    fn test_hsl() {
        [
            ((0.0, 100.0, 50.0), Rgba::rgb(255, 0, 0)),
            ((120.0, 100.0, 50.0), Rgba::rgb(0, 255, 0)),
            ((240.0, 100.0, 50.0), Rgba::rgb(0, 0, 255)),
            ((180.0, 100.0, 50.0), Rgba::rgb(0, 255, 255)),
            ((0.0, 0.0, 100.0), Rgba::WHITE),
            ((720.0, 100.0, 50.0), Rgba::rgb(255, 0, 0)),
        ]
        .into_iter()
        .for_each(|((h, s, l), expected)| assert_eq!(expected, Rgba::hsl(h, s, l)));
    }

    #[test]
    fn test_rotate_hue() {
        assert_eq!(Rgba::rgb(255, 0, 0).rotate_hue(120.0), Rgba::rgb(0, 255, 0));
        assert_eq!(Rgba::rgb(0, 0, 255).rotate_hue(-240.0), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::WHITE.rotate_hue(90.0), Rgba::WHITE);

        let faded = Rgba::hex(0x1b3984).alpha(0.25);
        assert_eq!(faded.rotate_hue(0.0), faded);
        assert_eq!(faded.rotate_hue(360.0), faded);
    }

    #[test]
    fn test_lerp_and_css() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE.alpha(0.0), 0.5);
        assert_eq!(mid.to_css(), "rgba(128, 128, 128, 0.5)");
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 2.0), Rgba::WHITE);
    }
}
