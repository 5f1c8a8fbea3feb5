use taffy::style as ts;

use crate::{
    foundation::{
        color::Color,
        error::{FlexError, FlexResult},
    },
    style::attrs::{
        Align, AspectRatio, BoxSizing, Dimension, Display, Edge, FlexDirection, Gutter, Justify,
        Overflow, PositionType, StrokeStyle, StyleAttr, StyleAttributeSet, Wrap,
    },
};

/// Paint attributes kept on the node and consumed at redraw time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodePaint {
    /// Background fill.
    pub fill: Color,
    /// Border stroke.
    pub border: StrokeStyle,
    /// Corner radius shared by background, border and clip.
    pub radius: f64,
}

/// Per-node resolver: validates patches, writes solver attributes, and keeps the merged style.
///
/// It never runs layout itself, so a multi-attribute patch costs exactly one pass at the caller.
#[derive(Clone, Debug, Default)]
pub struct StyleResolver {
    persisted: StyleAttributeSet,
    paint: NodePaint,
}

impl StyleResolver {
    /// Merged style of every patch applied so far.
    pub fn persisted(&self) -> &StyleAttributeSet {
        &self.persisted
    }

    /// Current paint attributes.
    pub fn paint(&self) -> &NodePaint {
        &self.paint
    }

    /// Overflow as last written, `Visible` when never set.
    pub fn overflow(&self) -> Overflow {
        self.persisted.overflow.unwrap_or_default()
    }

    /// Validate `patch` and apply it to `style`. On error nothing is written.
    pub fn apply(&mut self, style: &mut ts::Style, patch: &StyleAttributeSet) -> FlexResult<()> {
        let attrs = patch.attrs();
        for attr in &attrs {
            validate(attr)?;
        }
        for attr in &attrs {
            apply_attr(style, &mut self.paint, attr);
            self.persisted.set(*attr);
        }
        Ok(())
    }
}

fn validate(attr: &StyleAttr) -> FlexResult<()> {
    let bad = |why: &str| Err(FlexError::style(format!("{}: {why}", attr.name())));
    match attr {
        StyleAttr::Width(d)
        | StyleAttr::Height(d)
        | StyleAttr::MinWidth(d)
        | StyleAttr::MinHeight(d)
        | StyleAttr::MaxWidth(d)
        | StyleAttr::MaxHeight(d)
        | StyleAttr::FlexBasis(d) => {
            if !d.is_finite() {
                return bad("value must be finite");
            }
            if d.is_negative() {
                return bad("value must be >= 0");
            }
        }
        StyleAttr::Margin(ev) => {
            if !ev.value.is_finite() {
                return bad("value must be finite");
            }
        }
        StyleAttr::Padding(ev) => {
            if !ev.value.is_finite() || ev.value.is_negative() {
                return bad("value must be finite and >= 0");
            }
        }
        StyleAttr::Gap(g) => {
            if !g.length.is_finite() || g.length.is_negative() {
                return bad("length must be finite and >= 0");
            }
        }
        StyleAttr::Flex(v) => {
            if !v.is_finite() {
                return bad("value must be finite");
            }
        }
        StyleAttr::FlexGrow(v) | StyleAttr::FlexShrink(v) => {
            if !v.is_finite() || *v < 0.0 {
                return bad("value must be finite and >= 0");
            }
        }
        StyleAttr::AspectRatio(AspectRatio::Ratio(r)) => {
            if !r.is_finite() || *r <= 0.0 {
                return bad("ratio must be finite and > 0");
            }
        }
        StyleAttr::BorderRadius(r) => {
            if !r.is_finite() || *r < 0.0 {
                return bad("radius must be finite and >= 0");
            }
        }
        StyleAttr::Border(s) => {
            if !s.width.is_finite() || s.width < 0.0 || !s.color.is_finite() {
                return bad("stroke must have a finite color and width >= 0");
            }
        }
        StyleAttr::BackgroundColor(c) => {
            if !c.is_finite() {
                return bad("color channels must be finite");
            }
        }
        StyleAttr::AspectRatio(AspectRatio::Auto)
        | StyleAttr::AlignContent(_)
        | StyleAttr::AlignItems(_)
        | StyleAttr::AlignSelf(_)
        | StyleAttr::Display(_)
        | StyleAttr::FlexDirection(_)
        | StyleAttr::FlexWrap(_)
        | StyleAttr::JustifyContent(_)
        | StyleAttr::Overflow(_)
        | StyleAttr::Position(_)
        | StyleAttr::BoxSizing(_) => {}
    }
    Ok(())
}

/// Write one attribute: solver attributes into `style`, paint attributes into `paint`.
pub(crate) fn apply_attr(style: &mut ts::Style, paint: &mut NodePaint, attr: &StyleAttr) {
    match *attr {
        StyleAttr::AlignContent(a) => style.align_content = align_content(a),
        StyleAttr::AlignItems(a) => style.align_items = align_items(a),
        StyleAttr::AlignSelf(a) => style.align_self = align_items(a),
        StyleAttr::AspectRatio(r) => {
            style.aspect_ratio = match r {
                AspectRatio::Auto => None,
                AspectRatio::Ratio(v) => Some(v),
            }
        }
        StyleAttr::Display(d) => {
            style.display = match d {
                Display::Flex => ts::Display::Flex,
                Display::None => ts::Display::None,
            }
        }
        StyleAttr::Flex(f) => {
            if f > 0.0 {
                style.flex_grow = f;
                style.flex_shrink = 1.0;
                style.flex_basis = ts::Dimension::length(0.0);
            } else if f == 0.0 {
                style.flex_grow = 0.0;
                style.flex_shrink = 1.0;
                style.flex_basis = ts::Dimension::length(0.0);
            } else {
                style.flex_grow = 0.0;
                style.flex_shrink = -f;
                style.flex_basis = ts::Dimension::auto();
            }
        }
        StyleAttr::FlexBasis(d) => style.flex_basis = to_dimension(d),
        StyleAttr::FlexDirection(d) => {
            style.flex_direction = match d {
                FlexDirection::Row => ts::FlexDirection::Row,
                FlexDirection::RowReverse => ts::FlexDirection::RowReverse,
                FlexDirection::Column => ts::FlexDirection::Column,
                FlexDirection::ColumnReverse => ts::FlexDirection::ColumnReverse,
            }
        }
        StyleAttr::FlexGrow(v) => style.flex_grow = v,
        StyleAttr::FlexShrink(v) => style.flex_shrink = v,
        StyleAttr::FlexWrap(w) => {
            style.flex_wrap = match w {
                Wrap::NoWrap => ts::FlexWrap::NoWrap,
                Wrap::Wrap => ts::FlexWrap::Wrap,
                Wrap::WrapReverse => ts::FlexWrap::WrapReverse,
            }
        }
        StyleAttr::Gap(g) => {
            let v = to_length_percentage(g.length);
            match g.gutter {
                Gutter::Column => style.gap.width = v,
                Gutter::Row => style.gap.height = v,
                Gutter::All => {
                    style.gap.width = v;
                    style.gap.height = v;
                }
            }
        }
        StyleAttr::Height(d) => style.size.height = to_dimension(d),
        StyleAttr::JustifyContent(j) => style.justify_content = Some(justify(j)),
        StyleAttr::Margin(ev) => set_edges(&mut style.margin, ev.edge, to_lpa(ev.value)),
        StyleAttr::MaxHeight(d) => style.max_size.height = to_dimension(d),
        StyleAttr::MaxWidth(d) => style.max_size.width = to_dimension(d),
        StyleAttr::MinHeight(d) => style.min_size.height = to_dimension(d),
        StyleAttr::MinWidth(d) => style.min_size.width = to_dimension(d),
        StyleAttr::Overflow(o) => {
            let o = match o {
                Overflow::Visible => ts::Overflow::Visible,
                Overflow::Hidden => ts::Overflow::Hidden,
                Overflow::Scroll => ts::Overflow::Scroll,
            };
            style.overflow = taffy::geometry::Point { x: o, y: o };
        }
        StyleAttr::Padding(ev) => set_edges(
            &mut style.padding,
            ev.edge,
            to_length_percentage(ev.value),
        ),
        StyleAttr::Position(p) => {
            style.position = match p {
                PositionType::Static | PositionType::Relative => ts::Position::Relative,
                PositionType::Absolute => ts::Position::Absolute,
            }
        }
        StyleAttr::BoxSizing(b) => {
            style.box_sizing = match b {
                BoxSizing::BorderBox => ts::BoxSizing::BorderBox,
                BoxSizing::ContentBox => ts::BoxSizing::ContentBox,
            }
        }
        StyleAttr::Width(d) => style.size.width = to_dimension(d),
        StyleAttr::BackgroundColor(c) => paint.fill = c,
        StyleAttr::BorderRadius(r) => paint.radius = r,
        StyleAttr::Border(s) => paint.border = s,
    }
}

pub(crate) fn to_dimension(d: Dimension) -> ts::Dimension {
    match d {
        Dimension::Auto => ts::Dimension::auto(),
        Dimension::Px(v) => ts::Dimension::length(v),
        Dimension::Percent(p) => ts::Dimension::percent(p / 100.0),
    }
}

// Padding and gap cannot be `auto`; it resolves to zero.
fn to_length_percentage(d: Dimension) -> ts::LengthPercentage {
    match d {
        Dimension::Auto => ts::LengthPercentage::length(0.0),
        Dimension::Px(v) => ts::LengthPercentage::length(v),
        Dimension::Percent(p) => ts::LengthPercentage::percent(p / 100.0),
    }
}

fn to_lpa(d: Dimension) -> ts::LengthPercentageAuto {
    match d {
        Dimension::Auto => ts::LengthPercentageAuto::auto(),
        Dimension::Px(v) => ts::LengthPercentageAuto::length(v),
        Dimension::Percent(p) => ts::LengthPercentageAuto::percent(p / 100.0),
    }
}

fn set_edges<T: Copy>(rect: &mut taffy::geometry::Rect<T>, edge: Edge, v: T) {
    match edge {
        Edge::Left | Edge::Start => rect.left = v,
        Edge::Right | Edge::End => rect.right = v,
        Edge::Top => rect.top = v,
        Edge::Bottom => rect.bottom = v,
        Edge::Horizontal => {
            rect.left = v;
            rect.right = v;
        }
        Edge::Vertical => {
            rect.top = v;
            rect.bottom = v;
        }
        Edge::All => {
            rect.left = v;
            rect.right = v;
            rect.top = v;
            rect.bottom = v;
        }
    }
}

// Distribution values have no meaning for item alignment and fall back to the solver default.
fn align_items(a: Align) -> Option<ts::AlignItems> {
    match a {
        Align::FlexStart => Some(ts::AlignItems::FlexStart),
        Align::Center => Some(ts::AlignItems::Center),
        Align::FlexEnd => Some(ts::AlignItems::FlexEnd),
        Align::Stretch => Some(ts::AlignItems::Stretch),
        Align::Baseline => Some(ts::AlignItems::Baseline),
        Align::Auto | Align::SpaceBetween | Align::SpaceAround | Align::SpaceEvenly => None,
    }
}

fn align_content(a: Align) -> Option<ts::AlignContent> {
    match a {
        Align::FlexStart => Some(ts::AlignContent::FlexStart),
        Align::Center => Some(ts::AlignContent::Center),
        Align::FlexEnd => Some(ts::AlignContent::FlexEnd),
        Align::Stretch => Some(ts::AlignContent::Stretch),
        Align::SpaceBetween => Some(ts::AlignContent::SpaceBetween),
        Align::SpaceAround => Some(ts::AlignContent::SpaceAround),
        Align::SpaceEvenly => Some(ts::AlignContent::SpaceEvenly),
        Align::Auto | Align::Baseline => None,
    }
}

fn justify(j: Justify) -> ts::JustifyContent {
    match j {
        Justify::FlexStart => ts::JustifyContent::FlexStart,
        Justify::Center => ts::JustifyContent::Center,
        Justify::FlexEnd => ts::JustifyContent::FlexEnd,
        Justify::SpaceBetween => ts::JustifyContent::SpaceBetween,
        Justify::SpaceAround => ts::JustifyContent::SpaceAround,
        Justify::SpaceEvenly => ts::JustifyContent::SpaceEvenly,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/resolve.rs"]
mod tests;
