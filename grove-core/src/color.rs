use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color.
///
/// Shading works in HSV space with percent factors: [`Color::darker`]
/// divides the value channel, [`Color::lighter`] multiplies it and spills
/// any overflow into reduced saturation. A factor below `100` on one of
/// them behaves like the other one with the reciprocal factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from unit-range channels, truncating like a `* 255` cast.
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Returns a darker color; `factor` is a percentage, `200` halves the value.
    ///
    /// ### Parameters
    /// - `factor` - Darkening percentage. `<= 0` returns the color unchanged,
    ///   values below `100` lighten by `10000 / factor`.
    pub fn darker(self, factor: i32) -> Self {
        if factor <= 0 {
            return self;
        }
        if factor < 100 {
            return self.lighter(10000 / factor);
        }
        let (h, s, v) = self.to_hsv();
        Self::from_hsv(h, s, v * 100 / factor)
    }

    /// Returns a lighter color; `factor` is a percentage, `150` is 50% brighter.
    ///
    /// When the value would exceed 255 it is capped and the excess is
    /// taken off the saturation, pushing the color toward white.
    pub fn lighter(self, factor: i32) -> Self {
        if factor <= 0 {
            return self;
        }
        if factor < 100 {
            return self.darker(10000 / factor);
        }
        let (h, mut s, mut v) = self.to_hsv();
        v = v * factor / 100;
        if v > 255 {
            s = (s - (v - 255) as f32).max(0.0);
            v = 255;
        }
        Self::from_hsv(h, s, v)
    }

    /// Hue in degrees, saturation in `0..=255`, integer value in `0..=255`.
    fn to_hsv(self) -> (f32, f32, i32) {
        let (r, g, b) = (self.r as f32, self.g as f32, self.b as f32);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let s = if max == 0.0 { 0.0 } else { delta * 255.0 / max };
        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        (h, s, max as i32)
    }

    fn from_hsv(h: f32, s: f32, v: i32) -> Self {
        let v = v.clamp(0, 255) as f32;
        let c = v * s.clamp(0.0, 255.0) / 255.0;
        let hp = h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |c: f32| (c + m).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(140, 107, 76)
    }
}
