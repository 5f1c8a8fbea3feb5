use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::{ComputedBox, Size, Vec2},
        error::{FlexError, FlexResult},
        ids::NodeId,
    },
    scene::graph::Drawable,
    style::attrs::StyleAttributeSet,
};

use super::stage::{NodeKind, Stage};

/// How fixed-aspect content is scaled into the node's box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    /// Uniform scale covering the whole box; overflow is cropped by the box's clip.
    #[default]
    Cover,
    /// Uniform scale fitting entirely inside the box.
    Contain,
    /// Independent per-axis scale filling the box exactly.
    Stretch,
}

/// Point of the content that lands on the matching point of the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum AnchorMode {
    Top,
    #[default]
    Center,
    Bottom,
    TopLeft,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomRight,
}

impl AnchorMode {
    /// Anchor as fractions of width and height.
    pub fn fraction(self) -> Vec2 {
        let (x, y) = match self {
            Self::Top => (0.5, 0.0),
            Self::Center => (0.5, 0.5),
            Self::Bottom => (0.5, 1.0),
            Self::TopLeft => (0.0, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::CenterLeft => (0.0, 0.5),
            Self::CenterRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Vec2::new(x, y)
    }
}

/// Asset and placement policy of a fill node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillOptions {
    /// Natural size of the asset.
    pub asset: Size,
    /// Scaling policy.
    pub fit: FitMode,
    /// Placement policy.
    pub anchor: AnchorMode,
}

impl FillOptions {
    /// `cover`/`center` placement of an asset of the given size.
    pub fn new(asset: Size) -> Self {
        Self {
            asset,
            fit: FitMode::default(),
            anchor: AnchorMode::default(),
        }
    }

    /// Read the asset size from an image file header.
    pub fn from_image(path: impl AsRef<Path>) -> FlexResult<Self> {
        let path = path.as_ref();
        let (w, h) = image::image_dimensions(path).map_err(|e| {
            FlexError::measurement(format!("read image size of {}: {e}", path.display()))
        })?;
        Ok(Self::new(Size::new(f64::from(w), f64::from(h))))
    }

    /// Override the fit mode.
    pub fn fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    /// Override the anchor.
    pub fn anchor(mut self, anchor: AnchorMode) -> Self {
        self.anchor = anchor;
        self
    }
}

pub(super) struct FillState {
    pub(super) opts: FillOptions,
}

/// Per-axis scale of `asset` inside a `width` x `height` box.
pub(super) fn fit_scale(fit: FitMode, asset: Size, width: f64, height: f64) -> Vec2 {
    let sx = width / asset.width;
    let sy = height / asset.height;
    match fit {
        FitMode::Cover => Vec2::new(sx.max(sy), sx.max(sy)),
        FitMode::Contain => Vec2::new(sx.min(sy), sx.min(sy)),
        FitMode::Stretch => Vec2::new(sx, sy),
    }
}

impl Stage {
    /// Create a node showing a fixed-aspect asset scaled into its box. It never lays out children.
    pub fn create_fill(
        &mut self,
        label: Option<&str>,
        styles: &StyleAttributeSet,
        opts: FillOptions,
    ) -> FlexResult<NodeId> {
        let Size { width, height } = opts.asset;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FlexError::measurement(format!(
                "asset size must be positive, got {width}x{height}"
            )));
        }
        self.spawn(
            label,
            styles,
            NodeKind::Fill(FillState { opts }),
            Some(Drawable::Sprite { size: opts.asset }),
        )
    }

    /// Change the fit and anchor of a fill node and re-fit its asset.
    pub fn set_fit(&mut self, id: NodeId, fit: FitMode, anchor: AnchorMode) -> FlexResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Fill(state) => {
                state.opts.fit = fit;
                state.opts.anchor = anchor;
            }
            _ => {
                return Err(FlexError::topology(format!("{id:?} is not a fill node")));
            }
        }
        let computed = self.computed_box(id)?;
        self.fit_fill(id, computed)
    }

    /// Scale and anchor the sprite of fill node `id` into box `b`.
    pub(super) fn fit_fill(&mut self, id: NodeId, b: ComputedBox) -> FlexResult<()> {
        let node = self.node(id)?;
        let NodeKind::Fill(state) = &node.kind else {
            return Ok(());
        };
        let Some(sprite) = node.visuals.content else {
            return Ok(());
        };
        let FillOptions { asset, fit, anchor } = state.opts;
        let size = b.size();
        let scale = fit_scale(fit, asset, size.width, size.height);
        let a = anchor.fraction();

        self.scene.set_scale(sprite, scale)?;
        self.scene.set_anchor(sprite, a)?;
        self.scene
            .set_position(sprite, Vec2::new(a.x * size.width, a.y * size.height))?;
        tracing::trace!(?id, sx = scale.x, sy = scale.y, ?anchor, "fill fitted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/fill.rs"]
mod tests;
