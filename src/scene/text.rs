use std::borrow::Cow;

use crate::foundation::error::{FlexError, FlexResult};

/// Font settings of a text block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height as a multiple of the font size. Shaping measurers use font metrics instead.
    pub line_height: f32,
    /// Wrap at the layout width. When `false` the text is measured on its natural lines.
    pub word_wrap: bool,
    /// Registered family to use; `None` means the measurer's default.
    pub font_family: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 1.25,
            word_wrap: false,
            font_family: None,
        }
    }
}

/// Natural size of a measured text block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Widest line.
    pub width: f32,
    /// Sum of line heights.
    pub height: f32,
}

/// Text measurement boundary of the renderer.
pub trait TextMeasurer {
    /// Measure `text` laid out with `style`, wrapping at `wrap_width` when given.
    fn measure(
        &mut self,
        text: &str,
        style: &TextStyle,
        wrap_width: Option<f32>,
    ) -> FlexResult<TextMetrics>;
}

fn check_style(style: &TextStyle) -> FlexResult<()> {
    if !style.font_size.is_finite() || style.font_size <= 0.0 {
        return Err(FlexError::measurement("font_size must be finite and > 0"));
    }
    if !style.line_height.is_finite() || style.line_height <= 0.0 {
        return Err(FlexError::measurement("line_height must be finite and > 0"));
    }
    Ok(())
}

/// Deterministic fixed-advance measurer with greedy word wrap.
///
/// Every character advances `font_size * advance_ratio`; every line is
/// `font_size * line_height` tall. Empty text still occupies one line.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMeasurer {
    /// Advance of one character relative to the font size.
    pub advance_ratio: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl MonospaceMeasurer {
    fn wrap_line(line: &str, cap: usize) -> Vec<usize> {
        let mut widths = Vec::new();
        let mut cur = 0usize;
        for word in line.split_whitespace() {
            let n = word.chars().count();
            if cur == 0 {
                cur = n;
            } else if cur + 1 + n <= cap {
                cur += 1 + n;
            } else {
                widths.push(cur);
                cur = n;
            }
        }
        widths.push(cur);
        widths
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(
        &mut self,
        text: &str,
        style: &TextStyle,
        wrap_width: Option<f32>,
    ) -> FlexResult<TextMetrics> {
        check_style(style)?;
        let advance = style.font_size * self.advance_ratio;
        if !advance.is_finite() || advance <= 0.0 {
            return Err(FlexError::measurement("advance must be finite and > 0"));
        }

        let cap = match wrap_width {
            Some(w) if !w.is_finite() || w < 0.0 => {
                return Err(FlexError::measurement("wrap width must be finite and >= 0"));
            }
            Some(w) => Some(((w / advance).floor() as usize).max(1)),
            None => None,
        };

        let mut lines = Vec::<usize>::new();
        for line in text.split('\n') {
            match cap {
                Some(cap) => lines.extend(Self::wrap_line(line, cap)),
                None => lines.push(line.chars().count()),
            }
        }

        let widest = lines.iter().copied().max().unwrap_or(0);
        Ok(TextMetrics {
            width: widest as f32 * advance,
            height: lines.len().max(1) as f32 * style.font_size * style.line_height,
        })
    }
}

/// Shaping measurer backed by Parley, fed with caller-provided font bytes.
pub struct ParleyMeasurer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    default_family: String,
}

impl std::fmt::Debug for ParleyMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyMeasurer")
            .field("default_family", &self.default_family)
            .finish_non_exhaustive()
    }
}

impl ParleyMeasurer {
    /// Build a measurer whose default family comes from `font_bytes`.
    pub fn from_font_bytes(font_bytes: &[u8]) -> FlexResult<Self> {
        let mut me = Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            default_family: String::new(),
        };
        me.default_family = me.register_font(font_bytes)?;
        Ok(me)
    }

    /// Register another font and return its family name.
    pub fn register_font(&mut self, font_bytes: &[u8]) -> FlexResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| FlexError::measurement("no font families registered from font bytes"))?;

        Ok(self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FlexError::measurement("registered font family has no name"))?
            .to_string())
    }
}

impl TextMeasurer for ParleyMeasurer {
    fn measure(
        &mut self,
        text: &str,
        style: &TextStyle,
        wrap_width: Option<f32>,
    ) -> FlexResult<TextMetrics> {
        check_style(style)?;
        let family = style
            .font_family
            .clone()
            .unwrap_or_else(|| self.default_family.clone());

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.font_size));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(wrap_width);

        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for line in layout.lines() {
            let m = line.metrics();
            width = width.max(m.advance);
            height += m.ascent + m.descent + m.leading;
        }
        Ok(TextMetrics { width, height })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/text.rs"]
mod tests;
