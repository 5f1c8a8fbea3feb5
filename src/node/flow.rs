use crate::{
    foundation::{
        core::Size,
        error::{FlexError, FlexResult},
        ids::NodeId,
    },
    scene::{
        graph::Drawable,
        text::{TextMetrics, TextStyle},
    },
    style::attrs::{Dimension, StyleAttr, StyleAttributeSet},
};

use super::stage::{NodeKind, RefreshTrace, Stage};

pub(super) struct FlowState {
    pub(super) text: String,
    pub(super) style: TextStyle,
    // Content changed since the last measurement.
    pub(super) stale: bool,
    // Layout passes spent during recalculation `epoch`.
    epoch: u64,
    passes: u32,
}

impl Stage {
    /// Create a node whose height follows its text content. It never shrinks (`flexShrink: 0`)
    /// and never lays out children.
    pub fn create_flow(
        &mut self,
        label: Option<&str>,
        styles: &StyleAttributeSet,
        text: &str,
        style: TextStyle,
    ) -> FlexResult<NodeId> {
        let styles = styles.clone().with(StyleAttr::FlexShrink(0.0));
        let content = Drawable::Text {
            content: text.to_owned(),
            style: style.clone(),
            wrap_width: None,
            size: Size::ZERO,
        };
        let state = FlowState {
            text: text.to_owned(),
            style,
            stale: true,
            epoch: 0,
            passes: 0,
        };
        self.spawn(label, &styles, NodeKind::Flow(state), Some(content))
    }

    /// Replace the text of a flow node and re-measure it.
    ///
    /// On a measurement error the node keeps its last box and stays marked for re-measurement.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> FlexResult<()> {
        let state = self.flow_state_mut(id)?;
        state.text = text.to_owned();
        state.stale = true;
        self.recalculate(id)?;
        Ok(())
    }

    /// Replace the text style of a flow node and re-measure it.
    pub fn set_text_style(&mut self, id: NodeId, style: TextStyle) -> FlexResult<()> {
        let state = self.flow_state_mut(id)?;
        state.style = style;
        state.stale = true;
        self.recalculate(id)?;
        Ok(())
    }

    /// Current text of a flow node.
    pub fn text(&self, id: NodeId) -> FlexResult<&str> {
        match &self.node(id)?.kind {
            NodeKind::Flow(state) => Ok(&state.text),
            _ => Err(FlexError::topology(format!("{id:?} is not a flow node"))),
        }
    }

    fn flow_state_mut(&mut self, id: NodeId) -> FlexResult<&mut FlowState> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Flow(state) => Ok(state),
            _ => Err(FlexError::topology(format!("{id:?} is not a flow node"))),
        }
    }

    // Charge `needed` layout passes to the node's budget for the current recalculation.
    fn take_flow_passes(&mut self, id: NodeId, needed: u32) -> FlexResult<bool> {
        let (epoch, cap) = (self.epoch, self.opts.flow_pass_cap);
        let state = self.flow_state_mut(id)?;
        if state.epoch != epoch {
            state.epoch = epoch;
            state.passes = 0;
        }
        if state.passes + needed > cap {
            return Ok(false);
        }
        state.passes += needed;
        Ok(true)
    }

    /// Feed the measured text size back into the solver and settle the box.
    ///
    /// * no word wrap: natural size, one pass;
    /// * word wrap at a pixel width: height measured at that width, one pass;
    /// * word wrap otherwise: one pass to resolve the width, one for the measured height.
    ///
    /// The node redraws when the settled box differs from the cached one. When it differs from
    /// the box that triggered feedback, the root is refreshed once more so ancestors and
    /// siblings settle too.
    pub(super) fn flow_feedback(&mut self, id: NodeId) -> FlexResult<()> {
        let root = self.root_of(id)?;
        let (handle, content, text, style, width) = {
            let node = self.node(id)?;
            let NodeKind::Flow(state) = &node.kind else {
                return Ok(());
            };
            (
                node.handle,
                node.visuals.content,
                state.text.clone(),
                state.style.clone(),
                node.resolver.persisted().width,
            )
        };

        // Box the enclosing refresh walk has already laid out around.
        let before = self.solver.computed_box(handle)?;

        let needed = match (style.word_wrap, width) {
            (true, None | Some(Dimension::Auto | Dimension::Percent(_))) => 2,
            _ => 1,
        };
        if !self.take_flow_passes(id, needed)? {
            tracing::warn!(
                ?id,
                cap = self.opts.flow_pass_cap,
                "flow pass cap reached; drawing the unmeasured box"
            );
            let computed = self.solver.computed_box(handle)?;
            return self.redraw_box(id, computed);
        }

        let (wrap_width, metrics): (Option<f32>, TextMetrics) = match (style.word_wrap, width) {
            (false, width) => {
                let m = self.measurer.measure(&text, &style, None)?;
                let w = width.unwrap_or(Dimension::Px(m.width));
                self.solver.set_width(handle, w)?;
                self.solver.set_height(handle, Dimension::Px(m.height))?;
                self.layout_pass(root)?;
                (None, m)
            }
            (true, Some(Dimension::Px(w))) => {
                let m = self.measurer.measure(&text, &style, Some(w))?;
                self.solver.set_width(handle, Dimension::Px(w))?;
                self.solver.set_height(handle, Dimension::Px(m.height))?;
                self.layout_pass(root)?;
                (Some(w), m)
            }
            (true, width) => {
                self.solver
                    .set_width(handle, width.unwrap_or(Dimension::Auto))?;
                self.layout_pass(root)?;
                let resolved = self.solver.computed_box(handle)?.width;
                let m = self.measurer.measure(&text, &style, Some(resolved))?;
                self.solver.set_height(handle, Dimension::Px(m.height))?;
                self.layout_pass(root)?;
                (Some(resolved), m)
            }
        };
        tracing::trace!(
            ?id,
            ?wrap_width,
            width = metrics.width,
            height = metrics.height,
            "flow measured"
        );
        self.flow_state_mut(id)?.stale = false;

        if let Some(v) = content {
            self.scene.redraw(
                v,
                Drawable::Text {
                    content: text,
                    style,
                    wrap_width,
                    size: Size::new(f64::from(metrics.width), f64::from(metrics.height)),
                },
            )?;
        }

        let settled = self.solver.computed_box(handle)?;
        let cached = self.node(id)?.cached;
        if cached.is_none_or(|c| c.size_differs(&settled)) {
            self.redraw_box(id, settled)?;
        }
        if settled.size_differs(&before) {
            let mut nested = RefreshTrace::default();
            self.refresh(root, 0, &mut nested)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/flow.rs"]
mod tests;
