use crate::foundation::error::{FlexError, FlexResult};

pub use kurbo::{Affine, Point, Rect, RoundedRect, Size, Vec2};

/// Resolved pixel rectangle of a node after a layout pass.
///
/// `left`/`top` are relative to the parent's box.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComputedBox {
    /// Offset from the parent's left edge.
    pub left: f32,
    /// Offset from the parent's top edge.
    pub top: f32,
    /// Resolved width.
    pub width: f32,
    /// Resolved height.
    pub height: f32,
}

impl ComputedBox {
    /// Return `true` when the paint-relevant size differs from `other`.
    ///
    /// Position is deliberately ignored: moves never trigger a redraw.
    pub fn size_differs(&self, other: &ComputedBox) -> bool {
        self.width != other.width || self.height != other.height
    }

    /// Local-space rectangle `(0, 0, width, height)`.
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Offset of the box inside its parent.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(f64::from(self.left), f64::from(self.top))
    }

    /// Box size as a kurbo [`Size`].
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> FlexResult<Self> {
        if den == 0 {
            return Err(FlexError::config("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FlexError::config("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds, the time unit tweens run on.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
