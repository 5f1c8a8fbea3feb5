use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color with channels in `[0, 1]`.
///
/// Deserializes from `"#RRGGBB"`, `"#RRGGBBAA"`, `{ "r", "g", "b", "a"? }` or `[r, g, b, a?]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Build a color from straight-alpha channels.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a packed `0xRRGGBB` value and an alpha in `[0, 1]`.
    pub fn from_rgb_u32(rgb: u32, alpha: f64) -> Self {
        let ch = |shift: u32| f64::from(((rgb >> shift) & 0xff) as u8) / 255.0;
        Self::rgba(ch(16), ch(8), ch(0), alpha)
    }

    /// Return `true` when every channel is a finite number.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Quantize to straight RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Brighten toward white. `amount` of `0` is the identity.
    pub fn lighten(self, amount: f64) -> Self {
        let a = amount * 0.5;
        let f = |c: f64| (c * (1.0 + 0.5 * a) + a).min(1.0);
        Self::rgba(f(self.r), f(self.g), f(self.b), self.a)
    }

    /// Darken by dividing channels by `1 + amount` (never brightens).
    pub fn darken(self, amount: f64) -> Self {
        let scalar = (1.0 + amount).max(1.0);
        let f = |c: f64| (c / scalar).min(1.0);
        Self::rgba(f(self.r), f(self.g), f(self.b), self.a)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "color array must be [r,g,b] or [r,g,b,a]",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    let byte = |i: usize| -> Result<f64, String> {
        let pair = &s[i..i + 2];
        u8::from_str_radix(pair, 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|_| format!("invalid hex byte \"{pair}\""))
    };

    match s.len() {
        6 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, 1.0)),
        8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => Err("hex color must be #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
