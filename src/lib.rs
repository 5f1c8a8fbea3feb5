//! flexscene binds a flexbox solver to a retained scene graph.
//!
//! Every layout-bound node owns one solver node and one group of visuals, kept in lockstep by a
//! [`Stage`]:
//!
//! - style patches go through a validating resolver, then the nearest root is re-laid-out
//! - each node redraws only when its computed size changes
//! - fill and flow nodes feed their content size back into the solver
//! - tweens animate pixel styles, driven by an external [`FrameDriver`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub mod config;
pub(crate) mod layout;
pub(crate) mod node;
pub(crate) mod scene;
pub(crate) mod style;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Affine, ComputedBox, Fps, Point, Rect, RoundedRect, Size, Vec2};
pub use crate::foundation::error::{FlexError, FlexResult};
pub use crate::foundation::ids::{NodeId, VisualId};

pub use crate::animation::driver::{Animated, FrameDriver};
pub use crate::animation::ease::Ease;
pub use crate::animation::tween::{
    AnimationOptions, DEFAULT_DURATION_MS, TweenCallback, TweenRegistry, TweenSpec,
};
pub use crate::config::{NodeSpec, NodeSpecKind, StageOpts, TreeSpec};
pub use crate::node::{
    AnchorMode, CompositeOptions, DEFAULT_REFERENCE, FillOptions, FitMode, NodeVisuals,
    RefreshTrace, Stage, TraceEntry,
};
pub use crate::scene::graph::{DrawItem, Drawable, Scene, Visual};
pub use crate::scene::text::{
    MonospaceMeasurer, ParleyMeasurer, TextMeasurer, TextMetrics, TextStyle,
};
pub use crate::style::attrs::{
    Align, AspectRatio, BoxSizing, Dimension, Display, Edge, EdgeValue, FlexDirection, GapValue,
    Gutter, Justify, Overflow, PositionType, StrokeStyle, StyleAttr, StyleAttributeSet, Wrap,
};
pub use crate::style::resolve::{NodePaint, StyleResolver};
