use taffy::prelude::{AvailableSpace, Size};

use crate::{
    foundation::{
        core::ComputedBox,
        error::{FlexError, FlexResult},
        ids::NodeId,
    },
    style::attrs::Dimension,
    style::resolve::to_dimension,
};

pub(crate) type SolverNode = taffy::NodeId;

/// Stage-owned Taffy bridge.
///
/// Exposes only the calls the node protocol needs: create/release, per-node style writes,
/// index-based child edits that fail fast on inconsistent topology, and root layout passes.
#[derive(Debug)]
pub(crate) struct Solver {
    taffy: taffy::TaffyTree<NodeId>,
    available: Size<AvailableSpace>,
    passes: u64,
}

impl Solver {
    pub(crate) fn new(available_width: Option<f32>, available_height: Option<f32>) -> Self {
        let space = |v: Option<f32>| v.map_or(AvailableSpace::MaxContent, AvailableSpace::Definite);
        Self {
            taffy: taffy::TaffyTree::new(),
            available: Size {
                width: space(available_width),
                height: space(available_height),
            },
            passes: 0,
        }
    }

    pub(crate) fn create(&mut self, owner: NodeId, style: taffy::Style) -> FlexResult<SolverNode> {
        Ok(self.taffy.new_leaf_with_context(style, owner)?)
    }

    pub(crate) fn release(&mut self, node: SolverNode) -> FlexResult<()> {
        self.taffy.remove(node)?;
        Ok(())
    }

    pub(crate) fn style(&self, node: SolverNode) -> FlexResult<&taffy::Style> {
        Ok(self.taffy.style(node)?)
    }

    /// Read-modify-write of one node's style.
    pub(crate) fn update_style<R>(
        &mut self,
        node: SolverNode,
        f: impl FnOnce(&mut taffy::Style) -> R,
    ) -> FlexResult<R> {
        let mut style = self.taffy.style(node)?.clone();
        let out = f(&mut style);
        self.taffy.set_style(node, style)?;
        Ok(out)
    }

    pub(crate) fn set_width(&mut self, node: SolverNode, width: Dimension) -> FlexResult<()> {
        self.update_style(node, |s| s.size.width = to_dimension(width))
    }

    pub(crate) fn set_height(&mut self, node: SolverNode, height: Dimension) -> FlexResult<()> {
        self.update_style(node, |s| s.size.height = to_dimension(height))
    }

    pub(crate) fn children(&self, parent: SolverNode) -> FlexResult<Vec<SolverNode>> {
        Ok(self.taffy.children(parent)?)
    }

    pub(crate) fn parent(&self, child: SolverNode) -> Option<SolverNode> {
        self.taffy.parent(child)
    }

    pub(crate) fn insert_child(
        &mut self,
        parent: SolverNode,
        index: usize,
        child: SolverNode,
    ) -> FlexResult<()> {
        if let Some(existing) = self.parent(child) {
            return Err(FlexError::topology(format!(
                "solver node {child:?} already has parent {existing:?}"
            )));
        }
        let count = self.taffy.children(parent)?.len();
        if index > count {
            return Err(FlexError::topology(format!(
                "insert index {index} out of range for {count} children"
            )));
        }
        self.taffy.insert_child_at_index(parent, index, child)?;
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, parent: SolverNode, child: SolverNode) -> FlexResult<()> {
        if self.parent(child) != Some(parent) {
            return Err(FlexError::topology(format!(
                "solver node {child:?} is not a child of {parent:?}"
            )));
        }
        self.taffy.remove_child(parent, child)?;
        Ok(())
    }

    /// Run a full layout pass from `root`. Callers must only pass layout roots.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn compute(&mut self, root: SolverNode) -> FlexResult<()> {
        self.taffy.compute_layout(root, self.available)?;
        self.passes += 1;
        Ok(())
    }

    pub(crate) fn computed_box(&self, node: SolverNode) -> FlexResult<ComputedBox> {
        let l = self.taffy.layout(node)?;
        Ok(ComputedBox {
            left: l.location.x,
            top: l.location.y,
            width: l.size.width,
            height: l.size.height,
        })
    }

    /// Total layout passes run so far.
    pub(crate) fn passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/solver.rs"]
mod tests;
