//! Color values exchanged with the parameter sink

/// RGBA color with components in the 0.0-1.0 range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Rgba = Rgba::rgb(0.0, 0.0, 1.0);
    pub const CYAN: Rgba = Rgba::rgb(0.0, 1.0, 1.0);

    /// Per-channel linear interpolation from `self` toward `other`.
    ///
    /// `t` is not clamped: at 0 this returns exactly `self`, at 1 exactly
    /// `other`, and outside that range it extrapolates, which can push
    /// channels out of gamut.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let mix = |a: f32, b: f32| a * (1.0 - t) + b * t;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}
