use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::color::Color;

/// Length in resolved pixels, a percentage of the parent, or `auto`.
///
/// Serializes as a number (pixels), `"auto"` or `"NN%"`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrString", into = "NumberOrString")]
pub enum Dimension {
    /// Let the solver decide.
    Auto,
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the containing block, `50.0` meaning half.
    Percent(f32),
}

impl Dimension {
    /// Pixel value, if this is an absolute length.
    pub fn as_px(self) -> Option<f32> {
        match self {
            Self::Px(v) => Some(v),
            Self::Auto | Self::Percent(_) => None,
        }
    }

    pub(crate) fn is_finite(self) -> bool {
        match self {
            Self::Auto => true,
            Self::Px(v) | Self::Percent(v) => v.is_finite(),
        }
    }

    pub(crate) fn is_negative(self) -> bool {
        match self {
            Self::Auto => false,
            Self::Px(v) | Self::Percent(v) => v < 0.0,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Px(v) => write!(f, "{v}"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| format!("invalid dimension \"{s}\""))
        };
        if let Some(p) = s.strip_suffix('%') {
            return parse(p).map(Self::Percent);
        }
        parse(s.strip_suffix("px").unwrap_or(s)).map(Self::Px)
    }
}

/// `aspect-ratio`: either unset or `width / height`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrString", into = "NumberOrString")]
pub enum AspectRatio {
    /// No preferred ratio.
    Auto,
    /// Preferred `width / height`.
    Ratio(f32),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Num(f32),
    Str(String),
}

impl TryFrom<NumberOrString> for Dimension {
    type Error = String;

    fn try_from(v: NumberOrString) -> Result<Self, Self::Error> {
        match v {
            NumberOrString::Num(n) => Ok(Self::Px(n)),
            NumberOrString::Str(s) => s.parse(),
        }
    }
}

impl From<Dimension> for NumberOrString {
    fn from(d: Dimension) -> Self {
        match d {
            Dimension::Px(v) => Self::Num(v),
            other => Self::Str(other.to_string()),
        }
    }
}

impl TryFrom<NumberOrString> for AspectRatio {
    type Error = String;

    fn try_from(v: NumberOrString) -> Result<Self, Self::Error> {
        match v {
            NumberOrString::Num(n) => Ok(Self::Ratio(n)),
            NumberOrString::Str(s) if s.trim().eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            NumberOrString::Str(s) => Err(format!("invalid aspect ratio \"{s}\"")),
        }
    }
}

impl From<AspectRatio> for NumberOrString {
    fn from(a: AspectRatio) -> Self {
        match a {
            AspectRatio::Auto => Self::Str("auto".to_owned()),
            AspectRatio::Ratio(r) => Self::Num(r),
        }
    }
}

/// Cross-axis / multi-line alignment values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Align {
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Main-axis distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Justify {
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Main axis of a flex container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

/// Line wrapping of flex items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Wrap {
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Whether the node takes part in layout at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Display {
    Flex,
    None,
}

/// Content overflow policy. `Hidden` activates the node's clip mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

/// Positioning scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum PositionType {
    Static,
    Relative,
    Absolute,
}

/// Which box `width`/`height` measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum BoxSizing {
    BorderBox,
    ContentBox,
}

/// Box edge selector for margin and padding. `Start`/`End` resolve left-to-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
    Horizontal,
    Vertical,
    All,
}

impl Edge {
    // Physical sides written, as left/top/right/bottom bits.
    fn sides(self) -> u8 {
        match self {
            Self::Left | Self::Start => 0b0001,
            Self::Top => 0b0010,
            Self::Right | Self::End => 0b0100,
            Self::Bottom => 0b1000,
            Self::Horizontal => 0b0101,
            Self::Vertical => 0b1010,
            Self::All => 0b1111,
        }
    }
}

/// Gap selector: `Column` is the gap between columns, `Row` between rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Gutter {
    Column,
    Row,
    All,
}

impl Gutter {
    fn axes(self) -> u8 {
        match self {
            Self::Column => 0b01,
            Self::Row => 0b10,
            Self::All => 0b11,
        }
    }
}

/// One margin or padding write.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeValue {
    /// Edge(s) written.
    pub edge: Edge,
    /// Value written.
    pub value: Dimension,
}

/// One gap write.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapValue {
    /// Gutter(s) written.
    pub gutter: Gutter,
    /// Gap length; `auto` resolves to zero.
    pub length: Dimension,
}

/// Border stroke painted inside the node's box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke color.
    #[serde(default)]
    pub color: Color,
    /// Stroke width in pixels.
    #[serde(default)]
    pub width: f64,
}

/// One attribute write with its typed payload.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum StyleAttr {
    AlignContent(Align),
    AlignItems(Align),
    AlignSelf(Align),
    AspectRatio(AspectRatio),
    Display(Display),
    Flex(f32),
    FlexBasis(Dimension),
    FlexDirection(FlexDirection),
    FlexGrow(f32),
    FlexShrink(f32),
    FlexWrap(Wrap),
    Gap(GapValue),
    Height(Dimension),
    JustifyContent(Justify),
    Margin(EdgeValue),
    MaxHeight(Dimension),
    MaxWidth(Dimension),
    MinHeight(Dimension),
    MinWidth(Dimension),
    Overflow(Overflow),
    Padding(EdgeValue),
    Position(PositionType),
    BoxSizing(BoxSizing),
    Width(Dimension),
    BackgroundColor(Color),
    BorderRadius(f64),
    Border(StrokeStyle),
}

impl StyleAttr {
    /// Attribute name as it appears in serialized patches.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AlignContent(_) => "alignContent",
            Self::AlignItems(_) => "alignItems",
            Self::AlignSelf(_) => "alignSelf",
            Self::AspectRatio(_) => "aspectRatio",
            Self::Display(_) => "display",
            Self::Flex(_) => "flex",
            Self::FlexBasis(_) => "flexBasis",
            Self::FlexDirection(_) => "flexDirection",
            Self::FlexGrow(_) => "flexGrow",
            Self::FlexShrink(_) => "flexShrink",
            Self::FlexWrap(_) => "flexWrap",
            Self::Gap(_) => "gap",
            Self::Height(_) => "height",
            Self::JustifyContent(_) => "justifyContent",
            Self::Margin(_) => "margin",
            Self::MaxHeight(_) => "maxHeight",
            Self::MaxWidth(_) => "maxWidth",
            Self::MinHeight(_) => "minHeight",
            Self::MinWidth(_) => "minWidth",
            Self::Overflow(_) => "overflow",
            Self::Padding(_) => "padding",
            Self::Position(_) => "position",
            Self::BoxSizing(_) => "boxSizing",
            Self::Width(_) => "width",
            Self::BackgroundColor(_) => "backgroundColor",
            Self::BorderRadius(_) => "borderRadius",
            Self::Border(_) => "border",
        }
    }

    /// Tween registry key. Gap gutters animate independently.
    pub fn tween_key(&self) -> &'static str {
        match self {
            Self::Gap(GapValue {
                gutter: Gutter::Column,
                ..
            }) => "columnGap",
            Self::Gap(GapValue {
                gutter: Gutter::Row,
                ..
            }) => "rowGap",
            other => other.name(),
        }
    }

    /// `true` for attributes consumed at redraw time instead of by the solver.
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            Self::BackgroundColor(_) | Self::BorderRadius(_) | Self::Border(_)
        )
    }

    /// Numeric target when this write can be tweened: pixel width/height/gap and corner radius.
    pub fn tween_target(&self) -> Option<f64> {
        match self {
            Self::Width(Dimension::Px(v)) | Self::Height(Dimension::Px(v)) => Some(f64::from(*v)),
            Self::Gap(GapValue {
                length: Dimension::Px(v),
                ..
            }) => Some(f64::from(*v)),
            Self::BorderRadius(r) => Some(*r),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

// Edge and gap writes accept a single object or a list applied in order.
fn one_or_many<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(d)? {
        OneOrMany::One(v) => vec![v],
        OneOrMany::Many(v) => v,
    })
}

/// Partial style: every attribute independently optional, absent meaning "leave as is".
///
/// `margin`, `padding` and `gap` hold one entry per distinct edge or gutter written, in write
/// order; a write drops earlier entries it fully covers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct StyleAttributeSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_content: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_items: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_self: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_basis: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_direction: Option<FlexDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_grow: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_shrink: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_wrap: Option<Wrap>,
    #[serde(
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub gap: Vec<GapValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<Justify>,
    #[serde(
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub margin: Vec<EdgeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow: Option<Overflow>,
    #[serde(
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub padding: Vec<EdgeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_sizing: Option<BoxSizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<StrokeStyle>,
}

impl StyleAttributeSet {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `true` when no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.attrs().is_empty()
    }

    /// Add one attribute, replacing any previous value for it.
    pub fn with(mut self, attr: StyleAttr) -> Self {
        self.set(attr);
        self
    }

    /// Present attributes in application order.
    ///
    /// `flex` comes before `flexGrow`/`flexShrink`/`flexBasis` so explicit longhands in the same
    /// patch override the shorthand.
    pub fn attrs(&self) -> Vec<StyleAttr> {
        let mut out = Vec::new();
        out.extend(self.display.map(StyleAttr::Display));
        out.extend(self.position.map(StyleAttr::Position));
        out.extend(self.box_sizing.map(StyleAttr::BoxSizing));
        out.extend(self.overflow.map(StyleAttr::Overflow));
        out.extend(self.flex_direction.map(StyleAttr::FlexDirection));
        out.extend(self.flex_wrap.map(StyleAttr::FlexWrap));
        out.extend(self.flex.map(StyleAttr::Flex));
        out.extend(self.flex_grow.map(StyleAttr::FlexGrow));
        out.extend(self.flex_shrink.map(StyleAttr::FlexShrink));
        out.extend(self.flex_basis.map(StyleAttr::FlexBasis));
        out.extend(self.align_content.map(StyleAttr::AlignContent));
        out.extend(self.align_items.map(StyleAttr::AlignItems));
        out.extend(self.align_self.map(StyleAttr::AlignSelf));
        out.extend(self.justify_content.map(StyleAttr::JustifyContent));
        out.extend(self.aspect_ratio.map(StyleAttr::AspectRatio));
        out.extend(self.width.map(StyleAttr::Width));
        out.extend(self.height.map(StyleAttr::Height));
        out.extend(self.min_width.map(StyleAttr::MinWidth));
        out.extend(self.min_height.map(StyleAttr::MinHeight));
        out.extend(self.max_width.map(StyleAttr::MaxWidth));
        out.extend(self.max_height.map(StyleAttr::MaxHeight));
        out.extend(self.margin.iter().copied().map(StyleAttr::Margin));
        out.extend(self.padding.iter().copied().map(StyleAttr::Padding));
        out.extend(self.gap.iter().copied().map(StyleAttr::Gap));
        out.extend(self.background_color.map(StyleAttr::BackgroundColor));
        out.extend(self.border_radius.map(StyleAttr::BorderRadius));
        out.extend(self.border.map(StyleAttr::Border));
        out
    }

    /// Record one attribute write.
    pub fn set(&mut self, attr: StyleAttr) {
        match attr {
            StyleAttr::AlignContent(v) => self.align_content = Some(v),
            StyleAttr::AlignItems(v) => self.align_items = Some(v),
            StyleAttr::AlignSelf(v) => self.align_self = Some(v),
            StyleAttr::AspectRatio(v) => self.aspect_ratio = Some(v),
            StyleAttr::Display(v) => self.display = Some(v),
            StyleAttr::Flex(v) => self.flex = Some(v),
            StyleAttr::FlexBasis(v) => self.flex_basis = Some(v),
            StyleAttr::FlexDirection(v) => self.flex_direction = Some(v),
            StyleAttr::FlexGrow(v) => self.flex_grow = Some(v),
            StyleAttr::FlexShrink(v) => self.flex_shrink = Some(v),
            StyleAttr::FlexWrap(v) => self.flex_wrap = Some(v),
            StyleAttr::Gap(v) => {
                self.gap.retain(|g| g.gutter.axes() & !v.gutter.axes() != 0);
                self.gap.push(v);
            }
            StyleAttr::Height(v) => self.height = Some(v),
            StyleAttr::JustifyContent(v) => self.justify_content = Some(v),
            StyleAttr::Margin(v) => {
                self.margin.retain(|e| e.edge.sides() & !v.edge.sides() != 0);
                self.margin.push(v);
            }
            StyleAttr::MaxHeight(v) => self.max_height = Some(v),
            StyleAttr::MaxWidth(v) => self.max_width = Some(v),
            StyleAttr::MinHeight(v) => self.min_height = Some(v),
            StyleAttr::MinWidth(v) => self.min_width = Some(v),
            StyleAttr::Overflow(v) => self.overflow = Some(v),
            StyleAttr::Padding(v) => {
                self.padding.retain(|e| e.edge.sides() & !v.edge.sides() != 0);
                self.padding.push(v);
            }
            StyleAttr::Position(v) => self.position = Some(v),
            StyleAttr::BoxSizing(v) => self.box_sizing = Some(v),
            StyleAttr::Width(v) => self.width = Some(v),
            StyleAttr::BackgroundColor(v) => self.background_color = Some(v),
            StyleAttr::BorderRadius(v) => self.border_radius = Some(v),
            StyleAttr::Border(v) => self.border = Some(v),
        }
    }

    /// Gap length last written for `gutter`; `All` reads the column gutter.
    pub fn gap_for(&self, gutter: Gutter) -> Option<Dimension> {
        let want = match gutter {
            Gutter::All => Gutter::Column,
            g => g,
        }
        .axes();
        self.gap
            .iter()
            .rev()
            .find(|g| g.gutter.axes() & want != 0)
            .map(|g| g.length)
    }

    /// Merge every attribute present in `patch` into `self`.
    pub fn merge(&mut self, patch: &StyleAttributeSet) {
        for attr in patch.attrs() {
            self.set(attr);
        }
    }

    /// Split into attributes applied at once and tweenable ones with their numeric targets.
    pub fn split_animatable(&self) -> (StyleAttributeSet, Vec<StyleAttr>) {
        let mut immediate = StyleAttributeSet::new();
        let mut animated = Vec::new();
        for attr in self.attrs() {
            if attr.tween_target().is_some() {
                animated.push(attr);
            } else {
                immediate.set(attr);
            }
        }
        (immediate, animated)
    }
}

impl FromIterator<StyleAttr> for StyleAttributeSet {
    fn from_iter<I: IntoIterator<Item = StyleAttr>>(iter: I) -> Self {
        let mut set = Self::new();
        for attr in iter {
            set.set(attr);
        }
        set
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/attrs.rs"]
mod tests;
