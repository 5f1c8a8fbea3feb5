//! Stage options and JSON tree descriptions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    animation::tween::DEFAULT_DURATION_MS,
    foundation::{
        core::Size,
        error::{FlexError, FlexResult},
        ids::NodeId,
    },
    node::{AnchorMode, CompositeOptions, DEFAULT_REFERENCE, FillOptions, FitMode, Stage},
    scene::text::{TextMeasurer, TextStyle},
    style::attrs::StyleAttributeSet,
};

/// Options shared by every node of a [`Stage`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StageOpts {
    /// Width available to root layout passes; `None` lays roots out at max-content.
    pub available_width: Option<f32>,
    /// Height available to root layout passes; `None` lays roots out at max-content.
    pub available_height: Option<f32>,
    /// Tween duration when an animated write gives none, in milliseconds.
    pub tween_duration_ms: f64,
    /// Layout passes a flow node may spend per recalculation.
    pub flow_pass_cap: u32,
}

impl Default for StageOpts {
    fn default() -> Self {
        Self {
            available_width: None,
            available_height: None,
            tween_duration_ms: DEFAULT_DURATION_MS,
            flow_pass_cap: 2,
        }
    }
}

impl StageOpts {
    /// Check value ranges.
    pub fn validate(&self) -> FlexResult<()> {
        for (name, v) in [
            ("availableWidth", self.available_width),
            ("availableHeight", self.available_height),
        ] {
            if let Some(v) = v {
                if !v.is_finite() || v < 0.0 {
                    return Err(FlexError::config(format!(
                        "{name} must be finite and >= 0"
                    )));
                }
            }
        }
        if !self.tween_duration_ms.is_finite() || self.tween_duration_ms < 0.0 {
            return Err(FlexError::config("tweenDurationMs must be finite and >= 0"));
        }
        // A wrapping flow node with a relative width needs two passes.
        if self.flow_pass_cap < 2 {
            return Err(FlexError::config("flowPassCap must be >= 2"));
        }
        Ok(())
    }
}

/// Variant of a described node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeSpecKind {
    /// Plain flex container.
    Container,
    /// Fixed-aspect asset, sized explicitly or from an image header.
    Fill {
        /// Natural asset size.
        #[serde(default)]
        asset: Option<Size>,
        /// Image whose header gives the asset size.
        #[serde(default)]
        image: Option<PathBuf>,
        /// Scaling policy.
        #[serde(default)]
        fit: FitMode,
        /// Placement policy.
        #[serde(default)]
        anchor: AnchorMode,
    },
    /// Text block.
    Flow {
        /// Content.
        #[serde(default)]
        text: String,
        /// Font settings.
        #[serde(default, rename = "textStyle")]
        text_style: TextStyle,
    },
    /// Independently scaled sub-scene.
    Composite {
        /// Reference resolution; defaults to 640x480.
        #[serde(default)]
        reference: Option<Size>,
        /// Sub-scene extent used for centering; defaults to the reference.
        #[serde(default)]
        content: Option<Size>,
    },
}

/// One described node and its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Debug label, also used by the CLI to find nodes.
    #[serde(default)]
    pub label: Option<String>,
    /// Initial style.
    #[serde(default)]
    pub styles: StyleAttributeSet,
    /// Variant.
    #[serde(flatten)]
    pub kind: NodeSpecKind,
    /// Flex children, in order.
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// JSON description of a stage with one root tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    /// Stage options.
    #[serde(default)]
    pub stage: StageOpts,
    /// Root node.
    pub root: NodeSpec,
}

impl TreeSpec {
    /// Parse a tree description.
    pub fn from_json(json: &str) -> FlexResult<Self> {
        serde_json::from_str(json).map_err(|e| FlexError::config(format!("tree spec: {e}")))
    }

    /// Build a stage and the whole tree. Returns the stage and the root node.
    pub fn build(&self, measurer: impl TextMeasurer + 'static) -> FlexResult<(Stage, NodeId)> {
        let mut stage = Stage::new(self.stage, measurer)?;
        let root = build_node(&mut stage, &self.root)?;
        Ok((stage, root))
    }
}

fn build_node(stage: &mut Stage, spec: &NodeSpec) -> FlexResult<NodeId> {
    let label = spec.label.as_deref();
    let id = match &spec.kind {
        NodeSpecKind::Container => stage.create_container(label, &spec.styles)?,
        NodeSpecKind::Fill {
            asset,
            image,
            fit,
            anchor,
        } => {
            let opts = match (asset, image) {
                (Some(size), _) => FillOptions::new(*size),
                (None, Some(path)) => FillOptions::from_image(path)?,
                (None, None) => {
                    return Err(FlexError::config(format!(
                        "fill node {label:?} needs an asset size or an image"
                    )));
                }
            };
            stage.create_fill(label, &spec.styles, opts.fit(*fit).anchor(*anchor))?
        }
        NodeSpecKind::Flow { text, text_style } => {
            stage.create_flow(label, &spec.styles, text, text_style.clone())?
        }
        NodeSpecKind::Composite { reference, content } => {
            let options = CompositeOptions {
                reference: reference.unwrap_or(DEFAULT_REFERENCE),
                content: *content,
            };
            stage.create_composite(label, &spec.styles, options)?
        }
    };
    if !spec.children.is_empty() {
        let children = spec
            .children
            .iter()
            .map(|c| build_node(stage, c))
            .collect::<FlexResult<Vec<_>>>()?;
        stage.add_flex_children(id, &children)?;
    }
    Ok(id)
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
