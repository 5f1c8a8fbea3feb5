use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::{ComputedBox, Size, Vec2},
        error::{FlexError, FlexResult},
        ids::{NodeId, VisualId},
    },
    scene::graph::Drawable,
    style::attrs::StyleAttributeSet,
};

use super::stage::{NodeKind, Stage};

/// Reference resolution the embedded sub-scene is authored at.
pub const DEFAULT_REFERENCE: Size = Size::new(640.0, 480.0);

/// Scaling policy of a composite node's sub-scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositeOptions {
    /// Resolution the uniform scale is computed against.
    pub reference: Size,
    /// Extent of the sub-scene used for centering; defaults to `reference`.
    pub content: Option<Size>,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            reference: DEFAULT_REFERENCE,
            content: None,
        }
    }
}

pub(super) struct CompositeState {
    pub(super) opts: CompositeOptions,
}

impl Stage {
    /// Create a layout node embedding an independently scaled sub-scene.
    ///
    /// Attach visuals to [`Stage::composite_content`]; flex children are laid out as usual.
    pub fn create_composite(
        &mut self,
        label: Option<&str>,
        styles: &StyleAttributeSet,
        opts: CompositeOptions,
    ) -> FlexResult<NodeId> {
        let Size { width, height } = opts.reference;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FlexError::config(format!(
                "composite reference must be positive, got {width}x{height}"
            )));
        }
        self.spawn(
            label,
            styles,
            NodeKind::Composite(CompositeState { opts }),
            Some(Drawable::Group),
        )
    }

    /// Group hosting the sub-scene of composite node `id`.
    pub fn composite_content(&self, id: NodeId) -> FlexResult<VisualId> {
        let node = self.node(id)?;
        match (&node.kind, node.visuals.content) {
            (NodeKind::Composite(_), Some(v)) => Ok(v),
            _ => Err(FlexError::topology(format!(
                "{id:?} is not a composite node"
            ))),
        }
    }

    /// Uniformly scale the sub-scene to the box and center it.
    pub(super) fn place_composite(&mut self, id: NodeId, b: ComputedBox) -> FlexResult<()> {
        let node = self.node(id)?;
        let NodeKind::Composite(state) = &node.kind else {
            return Ok(());
        };
        let Some(group) = node.visuals.content else {
            return Ok(());
        };
        let CompositeOptions { reference, content } = state.opts;
        let content = content.unwrap_or(reference);
        let size = b.size();

        let scale = (size.width / reference.width).min(size.height / reference.height);
        let offset = Vec2::new(
            (size.width - content.width * scale) / 2.0,
            (size.height - content.height * scale) / 2.0,
        );
        self.scene.set_scale(group, Vec2::new(scale, scale))?;
        self.scene.set_position(group, offset)?;
        tracing::trace!(?id, scale, x = offset.x, y = offset.y, "composite placed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/composite.rs"]
mod tests;
