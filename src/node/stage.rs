use std::fmt;

use crate::{
    animation::{
        driver::Animated,
        tween::{AnimationOptions, TweenRegistry, TweenSpec},
    },
    config::StageOpts,
    foundation::{
        color::Color,
        core::{ComputedBox, Rect, RoundedRect},
        error::{FlexError, FlexResult},
        ids::{NodeId, VisualId},
    },
    layout::solver::{Solver, SolverNode},
    scene::{
        graph::{Drawable, Scene, Visual},
        text::{MonospaceMeasurer, TextMeasurer},
    },
    style::{
        attrs::{Dimension, GapValue, StrokeStyle, StyleAttr, StyleAttributeSet},
        resolve::{NodePaint, StyleResolver},
    },
};

use super::{composite::CompositeState, fill::FillState, flow::FlowState};

pub(super) enum NodeKind {
    Container,
    Fill(FillState),
    Flow(FlowState),
    Composite(CompositeState),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum KindTag {
    Container,
    Fill,
    Flow,
    Composite,
}

impl NodeKind {
    pub(super) fn tag(&self) -> KindTag {
        match self {
            Self::Container => KindTag::Container,
            Self::Fill(_) => KindTag::Fill,
            Self::Flow(_) => KindTag::Flow,
            Self::Composite(_) => KindTag::Composite,
        }
    }
}

impl KindTag {
    fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Fill => "fill",
            Self::Flow => "flow",
            Self::Composite => "composite",
        }
    }

    // Fill and flow nodes size themselves from their content.
    fn manages_children(self) -> bool {
        matches!(self, Self::Container | Self::Composite)
    }
}

/// Scene visuals owned by one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeVisuals {
    /// Group carrying the node's position and the layout marker.
    pub group: VisualId,
    /// Background fill, first child of the group.
    pub background: VisualId,
    /// Border stroke, kept above every other child.
    pub border: VisualId,
    /// Clip shape, attached only while overflow is hidden.
    pub mask: VisualId,
    /// Sprite, text or sub-scene group of the content variants.
    pub content: Option<VisualId>,
}

pub(super) struct LayoutNode {
    pub(super) handle: SolverNode,
    pub(super) visuals: NodeVisuals,
    pub(super) cached: Option<ComputedBox>,
    pub(super) resolver: StyleResolver,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) label: Option<String>,
    pub(super) kind: NodeKind,
}

/// One node visited by a refresh walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    /// Visited node.
    pub node: NodeId,
    /// Distance from the layout root.
    pub depth: usize,
    /// Label, or `#<index>` for unlabelled nodes.
    pub label: String,
}

/// Nodes visited by one refresh walk, in visit order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshTrace {
    /// Visited nodes.
    pub entries: Vec<TraceEntry>,
}

impl RefreshTrace {
    /// Visited node ids in order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|e| e.node).collect()
    }
}

impl fmt::Display for RefreshTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}{}", "\t".repeat(e.depth), e.label)?;
        }
        Ok(())
    }
}

/// Owner of the solver tree, the scene graph, and every layout-bound node.
pub struct Stage {
    pub(super) solver: Solver,
    pub(super) scene: Scene,
    nodes: Vec<Option<LayoutNode>>,
    free: Vec<u32>,
    tweens: TweenRegistry<NodeId, Stage>,
    pub(super) measurer: Box<dyn TextMeasurer>,
    pub(super) opts: StageOpts,
    pub(super) epoch: u64,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("nodes", &self.node_ids().len())
            .field("visuals", &self.scene.len())
            .field("tweens", &self.tweens)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

fn empty_shape() -> RoundedRect {
    RoundedRect::from_rect(Rect::ZERO, 0.0)
}

fn unknown(id: NodeId) -> FlexError {
    FlexError::topology(format!("unknown node {id:?}"))
}

// Rebuild an animatable write with an interpolated pixel value.
fn retarget(attr: StyleAttr, v: f64) -> StyleAttr {
    let v = v.max(0.0);
    let px = Dimension::Px(v as f32);
    match attr {
        StyleAttr::Width(_) => StyleAttr::Width(px),
        StyleAttr::Height(_) => StyleAttr::Height(px),
        StyleAttr::Gap(g) => StyleAttr::Gap(GapValue { length: px, ..g }),
        StyleAttr::BorderRadius(_) => StyleAttr::BorderRadius(v),
        other => other,
    }
}

impl Stage {
    /// Empty stage using `measurer` for flow nodes.
    pub fn new(opts: StageOpts, measurer: impl TextMeasurer + 'static) -> FlexResult<Self> {
        opts.validate()?;
        Ok(Self::with_parts(opts, Box::new(measurer)))
    }

    /// Empty stage with default options and the fixed-advance text measurer.
    pub fn headless() -> Self {
        Self::with_parts(StageOpts::default(), Box::new(MonospaceMeasurer::default()))
    }

    // `opts` must already be valid.
    fn with_parts(opts: StageOpts, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            solver: Solver::new(opts.available_width, opts.available_height),
            scene: Scene::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            tweens: TweenRegistry::new(),
            measurer,
            opts,
            epoch: 0,
        }
    }

    /// Create a plain flex container.
    pub fn create_container(
        &mut self,
        label: Option<&str>,
        styles: &StyleAttributeSet,
    ) -> FlexResult<NodeId> {
        self.spawn(label, styles, NodeKind::Container, None)
    }

    /// Allocate a node in both trees, apply its initial style and lay it out as its own root.
    pub(super) fn spawn(
        &mut self,
        label: Option<&str>,
        styles: &StyleAttributeSet,
        kind: NodeKind,
        content: Option<Drawable>,
    ) -> FlexResult<NodeId> {
        let mut resolver = StyleResolver::default();
        let mut style = taffy::Style::default();
        resolver.apply(&mut style, styles)?;

        let id = match self.free.pop() {
            Some(slot) => NodeId(slot),
            None => {
                self.nodes.push(None);
                NodeId((self.nodes.len() - 1) as u32)
            }
        };
        let handle = match self.solver.create(id, style) {
            Ok(h) => h,
            Err(err) => {
                self.free.push(id.0);
                return Err(err);
            }
        };

        let group = self.scene.create_group(label);
        self.scene.set_layout_node(group, Some(id))?;
        let background = self.scene.create(Drawable::Fill {
            shape: empty_shape(),
            color: Color::TRANSPARENT,
        });
        self.scene.attach(group, background)?;
        let content = match content {
            Some(drawable) => {
                let v = self.scene.create(drawable);
                self.scene.attach(group, v)?;
                Some(v)
            }
            None => None,
        };
        let border = self.scene.create(Drawable::Stroke {
            shape: empty_shape(),
            stroke: StrokeStyle::default(),
        });
        self.scene.attach(group, border)?;
        let mask = self.scene.create(Drawable::Mask {
            shape: empty_shape(),
        });

        let tag = kind.tag();
        self.nodes[id.index()] = Some(LayoutNode {
            handle,
            visuals: NodeVisuals {
                group,
                background,
                border,
                mask,
                content,
            },
            cached: None,
            resolver,
            parent: None,
            children: Vec::new(),
            label: label.map(str::to_owned),
            kind,
        });
        tracing::debug!(?id, kind = tag.name(), ?label, "node created");

        if let Err(err) = self.recalculate(id) {
            self.destroy(id)?;
            return Err(err);
        }
        Ok(id)
    }

    pub(super) fn node(&self, id: NodeId) -> FlexResult<&LayoutNode> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| unknown(id))
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> FlexResult<&mut LayoutNode> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| unknown(id))
    }

    /// Return `true` if `id` names a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Live nodes in allocation order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// First live node carrying `label`.
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.node_ids()
            .into_iter()
            .find(|&id| self.label(id).ok().flatten() == Some(label))
    }

    /// Nearest layout root: the last node reached walking parents upward.
    pub fn root_of(&self, id: NodeId) -> FlexResult<NodeId> {
        let mut cur = id;
        while let Some(p) = self.node(cur)?.parent {
            cur = p;
        }
        Ok(cur)
    }

    /// Append `children` to `id` in both trees, keep the border on top, and re-lay-out the root.
    ///
    /// Fill and flow nodes ignore the call. A child that already has a parent (or hosts `id`) is
    /// rejected before anything is modified.
    pub fn add_flex_children(&mut self, id: NodeId, children: &[NodeId]) -> FlexResult<()> {
        let tag = self.node(id)?.kind.tag();
        if !tag.manages_children() {
            tracing::debug!(?id, kind = tag.name(), "add_flex_children ignored");
            return Ok(());
        }
        let root = self.root_of(id)?;
        for (i, &child) in children.iter().enumerate() {
            let c = self.node(child)?;
            if child == root {
                return Err(FlexError::topology(format!(
                    "adding {child:?} under {id:?} would create a cycle"
                )));
            }
            if let Some(p) = c.parent {
                return Err(FlexError::topology(format!(
                    "{child:?} is already a child of {p:?}"
                )));
            }
            if self.scene.visual(c.visuals.group)?.parent().is_some() {
                return Err(FlexError::topology(format!(
                    "{child:?} is hosted by a scene visual; detach it first"
                )));
            }
            if children[..i].contains(&child) {
                return Err(FlexError::topology(format!("{child:?} listed twice")));
            }
        }

        let (handle, group, border) = {
            let n = self.node(id)?;
            (n.handle, n.visuals.group, n.visuals.border)
        };
        let base = self.solver.children(handle)?.len();
        for (i, &child) in children.iter().enumerate() {
            let (child_handle, child_group) = {
                let c = self.node(child)?;
                (c.handle, c.visuals.group)
            };
            self.solver.insert_child(handle, base + i, child_handle)?;
            self.scene.attach(group, child_group)?;
            self.node_mut(child)?.parent = Some(id);
            self.node_mut(id)?.children.push(child);
        }
        self.scene.raise_to_top(border)?;
        self.recalculate(id)?;
        Ok(())
    }

    /// Remove `child` from `id` in both trees. The child becomes its own root; both roots are
    /// re-laid-out.
    pub fn remove_flex_child(&mut self, id: NodeId, child: NodeId) -> FlexResult<()> {
        let tag = self.node(id)?.kind.tag();
        if !tag.manages_children() {
            tracing::debug!(?id, kind = tag.name(), "remove_flex_child ignored");
            return Ok(());
        }
        if self.node(child)?.parent != Some(id) {
            return Err(FlexError::topology(format!(
                "{child:?} is not a child of {id:?}"
            )));
        }
        let handle = self.node(id)?.handle;
        let (child_handle, child_group) = {
            let c = self.node(child)?;
            (c.handle, c.visuals.group)
        };
        self.solver.remove_child(handle, child_handle)?;
        self.scene.detach(child_group)?;
        self.node_mut(child)?.parent = None;
        self.node_mut(id)?.children.retain(|&c| c != child);
        self.recalculate(id)?;
        self.recalculate(child)?;
        Ok(())
    }

    /// Host the layout root `id` under an arbitrary non-layout visual. It stays a layout root.
    pub fn attach_root(&mut self, id: NodeId, host: VisualId) -> FlexResult<()> {
        let node = self.node(id)?;
        if node.parent.is_some() {
            return Err(FlexError::topology(format!("{id:?} is not a layout root")));
        }
        if self.scene.visual(host)?.layout_node().is_some() {
            return Err(FlexError::topology(
                "layout nodes must be nested with add_flex_children",
            ));
        }
        let group = node.visuals.group;
        self.scene.attach(host, group)?;
        self.recalculate(id)?;
        Ok(())
    }

    /// Create a detached non-layout visual, e.g. to host roots or fill a composite sub-scene.
    pub fn create_visual(&mut self, drawable: Drawable) -> VisualId {
        self.scene.create(drawable)
    }

    /// Attach a non-layout visual under `parent`.
    pub fn attach_visual(&mut self, parent: VisualId, child: VisualId) -> FlexResult<()> {
        if self.scene.visual(child)?.layout_node().is_some() {
            return Err(FlexError::topology(format!(
                "{child:?} belongs to a layout node"
            )));
        }
        self.scene.attach(parent, child)
    }

    /// Destroy `id` and its subtree: solver nodes, visuals and tweens. The former root is re-laid-out.
    pub fn destroy(&mut self, id: NodeId) -> FlexResult<()> {
        let (parent, handle, group) = {
            let n = self.node(id)?;
            (n.parent, n.handle, n.visuals.group)
        };
        let root = self.root_of(id)?;
        if let Some(p) = parent {
            let parent_handle = self.node(p)?.handle;
            self.solver.remove_child(parent_handle, handle)?;
            self.node_mut(p)?.children.retain(|&c| c != id);
        }

        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            doomed.extend(self.node(doomed[i])?.children.iter().copied());
            i += 1;
        }
        for &n in &doomed {
            let (handle, mask) = {
                let node = self.node(n)?;
                (node.handle, node.visuals.mask)
            };
            self.tweens.cancel_owner(n);
            self.solver.release(handle)?;
            if self.scene.get(mask).is_some_and(|m| m.parent().is_none()) {
                self.scene.remove(mask)?;
            }
        }
        self.scene.remove(group)?;
        for &n in &doomed {
            self.nodes[n.index()] = None;
            self.free.push(n.0);
        }
        tracing::debug!(?id, removed = doomed.len(), "node destroyed");

        if parent.is_some() {
            self.recalculate(root)?;
        }
        Ok(())
    }

    /// Write `patch` to the node and re-lay-out from its root.
    ///
    /// With `animation`, pixel `width`/`height`/`gap` and `borderRadius` are tweened from their
    /// current values and everything else is applied at once. Tween updates write one attribute
    /// each, without animation.
    #[tracing::instrument(level = "debug", skip(self, patch, animation))]
    pub fn set_styles(
        &mut self,
        id: NodeId,
        patch: &StyleAttributeSet,
        animation: Option<AnimationOptions>,
    ) -> FlexResult<()> {
        let Some(animation) = animation else {
            self.apply_patch(id, patch)?;
            self.recalculate(id)?;
            return Ok(());
        };

        // Reject the whole patch before starting anything.
        StyleResolver::default().apply(&mut taffy::Style::default(), patch)?;
        let (immediate, animated) = patch.split_animatable();
        self.set_styles(id, &immediate, None)?;

        for attr in animated {
            let Some(to) = attr.tween_target() else {
                continue;
            };
            let from = self.tween_start(id, &attr)?;
            let spec = TweenSpec {
                from,
                to,
                duration: animation.duration.or(Some(self.opts.tween_duration_ms)),
                easing: animation.easing,
            };
            self.tweens.start(id, attr.tween_key(), spec, move |stage: &mut Stage, v| {
                let step = StyleAttributeSet::new().with(retarget(attr, v));
                stage.set_styles(id, &step, None)
            });
        }
        Ok(())
    }

    fn tween_start(&self, id: NodeId, attr: &StyleAttr) -> FlexResult<f64> {
        let node = self.node(id)?;
        Ok(match attr {
            StyleAttr::Width(_) => f64::from(self.solver.computed_box(node.handle)?.width),
            StyleAttr::Height(_) => f64::from(self.solver.computed_box(node.handle)?.height),
            StyleAttr::Gap(g) => node
                .resolver
                .persisted()
                .gap_for(g.gutter)
                .and_then(Dimension::as_px)
                .map_or(0.0, f64::from),
            StyleAttr::BorderRadius(_) => node.resolver.paint().radius,
            other => {
                return Err(FlexError::style(format!(
                    "{} cannot be animated",
                    other.name()
                )));
            }
        })
    }

    fn apply_patch(&mut self, id: NodeId, patch: &StyleAttributeSet) -> FlexResult<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| unknown(id))?;
        let handle = node.handle;
        let resolver = &mut node.resolver;
        self.solver
            .update_style(handle, |style| resolver.apply(style, patch))??;

        // Paint and clip changes must repaint even when the size stays put.
        if patch
            .attrs()
            .iter()
            .any(|a| a.is_paint() || matches!(a, StyleAttr::Overflow(_)))
        {
            node.cached = None;
        }
        Ok(())
    }

    /// Lay out the nearest root of `id` and refresh its whole subtree.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn recalculate(&mut self, id: NodeId) -> FlexResult<RefreshTrace> {
        let root = self.root_of(id)?;
        self.epoch += 1;
        self.layout_pass(root)?;
        let mut trace = RefreshTrace::default();
        self.refresh(root, 0, &mut trace)?;
        Ok(trace)
    }

    pub(super) fn layout_pass(&mut self, root: NodeId) -> FlexResult<()> {
        let handle = self.node(root)?.handle;
        self.solver.compute(handle)
    }

    pub(super) fn refresh(
        &mut self,
        id: NodeId,
        depth: usize,
        trace: &mut RefreshTrace,
    ) -> FlexResult<()> {
        let (handle, group, cached, tag, stale) = {
            let n = self.node(id)?;
            trace.entries.push(TraceEntry {
                node: id,
                depth,
                label: n.label.clone().unwrap_or_else(|| format!("#{}", id.index())),
            });
            let stale = matches!(&n.kind, NodeKind::Flow(s) if s.stale);
            (n.handle, n.visuals.group, n.cached, n.kind.tag(), stale)
        };
        let computed = self.solver.computed_box(handle)?;
        self.scene.set_position(group, computed.offset())?;

        if stale || cached.is_none_or(|c| c.size_differs(&computed)) {
            match tag {
                KindTag::Container => self.redraw_box(id, computed)?,
                KindTag::Fill => {
                    self.redraw_box(id, computed)?;
                    self.fit_fill(id, computed)?;
                }
                KindTag::Flow => self.flow_feedback(id)?,
                KindTag::Composite => {
                    self.redraw_box(id, computed)?;
                    self.place_composite(id, computed)?;
                }
            }
        }

        let children: Vec<NodeId> = self
            .scene
            .children(group)
            .iter()
            .filter_map(|&v| self.scene.get(v).and_then(Visual::layout_node))
            .collect();
        for child in children {
            self.refresh(child, depth + 1, trace)?;
        }
        Ok(())
    }

    /// Regenerate background, border and clip for box `b`, toggle the clip per overflow, cache `b`.
    pub(super) fn redraw_box(&mut self, id: NodeId, b: ComputedBox) -> FlexResult<()> {
        let (handle, visuals, paint) = {
            let n = self.node(id)?;
            (n.handle, n.visuals, *n.resolver.paint())
        };
        let NodePaint {
            fill,
            border,
            radius,
        } = paint;
        let clip = self.solver.style(handle)?.overflow.x == taffy::style::Overflow::Hidden;
        let rect = b.local_rect();
        let shape = RoundedRect::from_rect(rect, radius);

        self.scene.redraw(
            visuals.background,
            Drawable::Fill { shape, color: fill },
        )?;
        self.scene.redraw(
            visuals.border,
            Drawable::Stroke {
                shape,
                stroke: border,
            },
        )?;
        self.scene.redraw(visuals.mask, Drawable::Mask { shape })?;
        self.scene.set_bounds(visuals.group, Some(rect))?;
        self.scene
            .set_mask(visuals.group, clip.then_some(visuals.mask))?;
        self.node_mut(id)?.cached = Some(b);
        tracing::debug!(?id, width = b.width, height = b.height, clip, "redraw");
        Ok(())
    }

    /// Box from the last layout pass.
    pub fn computed_box(&self, id: NodeId) -> FlexResult<ComputedBox> {
        self.solver.computed_box(self.node(id)?.handle)
    }

    /// Box the visuals were last drawn for.
    pub fn cached_box(&self, id: NodeId) -> FlexResult<Option<ComputedBox>> {
        Ok(self.node(id)?.cached)
    }

    /// Merged style of every patch applied to the node.
    pub fn styles(&self, id: NodeId) -> FlexResult<&StyleAttributeSet> {
        Ok(self.node(id)?.resolver.persisted())
    }

    /// Current paint attributes.
    pub fn paint(&self, id: NodeId) -> FlexResult<NodePaint> {
        Ok(*self.node(id)?.resolver.paint())
    }

    /// Layout children in order.
    pub fn children(&self, id: NodeId) -> FlexResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Layout parent.
    pub fn parent(&self, id: NodeId) -> FlexResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Debug label.
    pub fn label(&self, id: NodeId) -> FlexResult<Option<&str>> {
        Ok(self.node(id)?.label.as_deref())
    }

    /// Scene visuals owned by the node.
    pub fn visuals(&self, id: NodeId) -> FlexResult<NodeVisuals> {
        Ok(self.node(id)?.visuals)
    }

    /// Owners of the solver children of `id`, in solver order.
    pub fn solver_children(&self, id: NodeId) -> FlexResult<Vec<NodeId>> {
        let handle = self.node(id)?.handle;
        let owners = self
            .solver
            .children(handle)?
            .into_iter()
            .map(|h| {
                self.nodes
                    .iter()
                    .position(|n| n.as_ref().is_some_and(|n| n.handle == h))
                    .map(|i| NodeId(i as u32))
                    .ok_or_else(|| FlexError::topology(format!("orphan solver node {h:?}")))
            })
            .collect::<FlexResult<Vec<_>>>()?;
        Ok(owners)
    }

    /// Read-only scene graph.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// In-flight tweens.
    pub fn tweens(&self) -> &TweenRegistry<NodeId, Stage> {
        &self.tweens
    }

    /// Stage options.
    pub fn opts(&self) -> &StageOpts {
        &self.opts
    }

    /// Total layout passes run by the solver.
    pub fn layout_passes(&self) -> u64 {
        self.solver.passes()
    }
}

impl Animated for Stage {
    /// Tick every tween once. Tweens started by callbacks join the registry after the tick.
    fn advance(&mut self, dt_ms: f64) -> FlexResult<()> {
        let mut tweens = std::mem::take(&mut self.tweens);
        let result = tweens.tick(self, dt_ms);
        let started = std::mem::replace(&mut self.tweens, tweens);
        self.tweens.absorb(started);
        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/stage.rs"]
mod tests;
