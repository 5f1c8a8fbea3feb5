use crate::{
    foundation::{
        color::Color,
        core::{Affine, Rect, RoundedRect, Size, Vec2},
        error::{FlexError, FlexResult},
        ids::{NodeId, VisualId},
    },
    scene::text::TextStyle,
    style::attrs::StrokeStyle,
};

/// What a visual draws.
#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    /// Draws nothing itself; only hosts children.
    Group,
    /// Filled rounded rectangle.
    Fill {
        /// Outline in local space.
        shape: RoundedRect,
        /// Fill color.
        color: Color,
    },
    /// Rounded rectangle stroked inside its outline.
    Stroke {
        /// Outline in local space.
        shape: RoundedRect,
        /// Stroke paint.
        stroke: StrokeStyle,
    },
    /// Clip-mask shape. Never drawn; used through [`Scene::set_mask`].
    Mask {
        /// Clip outline in local space.
        shape: RoundedRect,
    },
    /// Fixed-size image placed through position/scale/anchor.
    Sprite {
        /// Unscaled asset size.
        size: Size,
    },
    /// Text block.
    Text {
        /// Content.
        content: String,
        /// Font settings.
        style: TextStyle,
        /// Wrap width, when wrapping.
        wrap_width: Option<f32>,
        /// Last measured size.
        size: Size,
    },
}

impl Drawable {
    /// Natural (unscaled) size of the drawable content, used to resolve the anchor.
    pub fn content_size(&self) -> Size {
        match self {
            Self::Group => Size::ZERO,
            Self::Fill { shape, .. } | Self::Stroke { shape, .. } | Self::Mask { shape } => {
                shape.rect().size()
            }
            Self::Sprite { size } | Self::Text { size, .. } => *size,
        }
    }
}

/// One node of the scene graph.
#[derive(Clone, Debug)]
pub struct Visual {
    parent: Option<VisualId>,
    children: Vec<VisualId>,
    position: Vec2,
    scale: Vec2,
    anchor: Vec2,
    drawable: Drawable,
    mask: Option<VisualId>,
    bounds: Option<Rect>,
    layout: Option<NodeId>,
    label: Option<String>,
    redraws: u64,
}

impl Visual {
    fn new(drawable: Drawable) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
            drawable,
            mask: None,
            bounds: None,
            layout: None,
            label: None,
            redraws: 0,
        }
    }

    /// Parent visual, if attached.
    pub fn parent(&self) -> Option<VisualId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[VisualId] {
        &self.children
    }

    /// Offset from the parent's origin.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Per-axis scale.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Anchor as a fraction of the content size.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Current drawable.
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    /// Active clip mask.
    pub fn mask(&self) -> Option<VisualId> {
        self.mask
    }

    /// Hit/cull bounds in local space.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Layout node driving this visual. `Some` marks a layout participant.
    pub fn layout_node(&self) -> Option<NodeId> {
        self.layout
    }

    /// Debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// How many times the drawable was regenerated.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

/// One entry of a flattened scene, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    /// Source visual.
    pub visual: VisualId,
    /// Local-to-world transform, anchor included.
    pub transform: Affine,
    /// What to draw.
    pub drawable: Drawable,
    /// Active clip in world space (bounding box of every mask on the ancestor chain).
    pub clip: Option<Rect>,
}

/// Arena-backed retained scene graph.
#[derive(Debug, Default)]
pub struct Scene {
    visuals: Vec<Option<Visual>>,
    free: Vec<u32>,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached visual.
    pub fn create(&mut self, drawable: Drawable) -> VisualId {
        let visual = Visual::new(drawable);
        if let Some(slot) = self.free.pop() {
            self.visuals[slot as usize] = Some(visual);
            VisualId(slot)
        } else {
            self.visuals.push(Some(visual));
            VisualId((self.visuals.len() - 1) as u32)
        }
    }

    /// Create a detached labelled group.
    pub fn create_group(&mut self, label: Option<&str>) -> VisualId {
        let id = self.create(Drawable::Group);
        if let Some(v) = self.visuals[id.index()].as_mut() {
            v.label = label.map(str::to_owned);
        }
        id
    }

    /// Look up a live visual.
    pub fn get(&self, id: VisualId) -> Option<&Visual> {
        self.visuals.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a live visual or fail.
    pub fn visual(&self, id: VisualId) -> FlexResult<&Visual> {
        self.get(id)
            .ok_or_else(|| FlexError::topology(format!("unknown visual {id:?}")))
    }

    fn visual_mut(&mut self, id: VisualId) -> FlexResult<&mut Visual> {
        self.visuals
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| FlexError::topology(format!("unknown visual {id:?}")))
    }

    /// Number of live visuals.
    pub fn len(&self) -> usize {
        self.visuals.iter().filter(|v| v.is_some()).count()
    }

    /// Return `true` when the scene holds no visuals.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children of `id` (empty for unknown ids).
    pub fn children(&self, id: VisualId) -> &[VisualId] {
        self.get(id).map(Visual::children).unwrap_or(&[])
    }

    /// Return `true` if `ancestor` is `id` or on its parent chain.
    pub fn is_ancestor(&self, ancestor: VisualId, id: VisualId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.get(c).and_then(Visual::parent);
        }
        false
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, parent: VisualId, child: VisualId) -> FlexResult<()> {
        self.visual(parent)?;
        self.visual(child)?;
        if self.is_ancestor(child, parent) {
            return Err(FlexError::topology(format!(
                "attaching {child:?} under {parent:?} would create a cycle"
            )));
        }
        self.detach(child)?;
        self.visual_mut(parent)?.children.push(child);
        self.visual_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from its parent. Detached visuals are left alone.
    pub fn detach(&mut self, child: VisualId) -> FlexResult<()> {
        let Some(parent) = self.visual(child)?.parent else {
            return Ok(());
        };
        self.visual_mut(parent)?.children.retain(|&c| c != child);
        self.visual_mut(child)?.parent = None;
        Ok(())
    }

    /// Move `child` to the end of its parent's children (drawn last).
    pub fn raise_to_top(&mut self, child: VisualId) -> FlexResult<()> {
        match self.visual(child)?.parent {
            Some(parent) => self.attach(parent, child),
            None => Ok(()),
        }
    }

    /// Remove `id` and its whole subtree.
    pub fn remove(&mut self, id: VisualId) -> FlexResult<()> {
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(v) = self.visuals.get_mut(cur.index()).and_then(Option::take) {
                stack.extend(v.children);
                // Masks are owned by the masked visual even while detached.
                if let Some(m) = v.mask {
                    if self.get(m).is_some_and(|mv| mv.parent.is_none()) {
                        stack.push(m);
                    }
                }
                self.free.push(cur.0);
            }
        }
        Ok(())
    }

    /// Set the offset from the parent origin.
    pub fn set_position(&mut self, id: VisualId, position: Vec2) -> FlexResult<()> {
        self.visual_mut(id)?.position = position;
        Ok(())
    }

    /// Set the per-axis scale.
    pub fn set_scale(&mut self, id: VisualId, scale: Vec2) -> FlexResult<()> {
        self.visual_mut(id)?.scale = scale;
        Ok(())
    }

    /// Set the anchor as a fraction of the content size.
    pub fn set_anchor(&mut self, id: VisualId, anchor: Vec2) -> FlexResult<()> {
        self.visual_mut(id)?.anchor = anchor;
        Ok(())
    }

    /// Set local bounds.
    pub fn set_bounds(&mut self, id: VisualId, bounds: Option<Rect>) -> FlexResult<()> {
        self.visual_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// Set the debug label.
    pub fn set_label(&mut self, id: VisualId, label: Option<&str>) -> FlexResult<()> {
        self.visual_mut(id)?.label = label.map(str::to_owned);
        Ok(())
    }

    pub(crate) fn set_layout_node(&mut self, id: VisualId, node: Option<NodeId>) -> FlexResult<()> {
        self.visual_mut(id)?.layout = node;
        Ok(())
    }

    /// Replace the drawable, counting a redraw.
    pub fn redraw(&mut self, id: VisualId, drawable: Drawable) -> FlexResult<()> {
        let v = self.visual_mut(id)?;
        v.drawable = drawable;
        v.redraws += 1;
        Ok(())
    }

    /// Activate (`Some`) or deactivate (`None`) a clip mask on `id`.
    ///
    /// An active mask is attached as a child of `id` so it follows its transform; a deactivated
    /// one is detached but kept alive for reuse.
    pub fn set_mask(&mut self, id: VisualId, mask: Option<VisualId>) -> FlexResult<()> {
        let previous = self.visual(id)?.mask;
        match mask {
            Some(m) => {
                if !matches!(self.visual(m)?.drawable, Drawable::Mask { .. }) {
                    return Err(FlexError::topology(format!("{m:?} is not a mask shape")));
                }
                if let Some(p) = previous.filter(|&p| p != m) {
                    self.detach(p)?;
                }
                if self.visual(m)?.parent != Some(id) {
                    self.attach(id, m)?;
                }
            }
            None => {
                if let Some(p) = previous {
                    self.detach(p)?;
                }
            }
        }
        self.visual_mut(id)?.mask = mask;
        Ok(())
    }

    /// Local transform of a visual: translate, scale, then shift by the anchor.
    pub fn local_transform(&self, id: VisualId) -> FlexResult<Affine> {
        let v = self.visual(id)?;
        let size = v.drawable.content_size();
        let anchor = Vec2::new(-v.anchor.x * size.width, -v.anchor.y * size.height);
        Ok(Affine::translate(v.position)
            * Affine::scale_non_uniform(v.scale.x, v.scale.y)
            * Affine::translate(anchor))
    }

    /// World transform of a visual (product of local transforms up to the scene root).
    pub fn world_transform(&self, id: VisualId) -> FlexResult<Affine> {
        let mut t = self.local_transform(id)?;
        let mut cur = self.visual(id)?.parent;
        while let Some(p) = cur {
            t = self.local_transform(p)? * t;
            cur = self.visual(p)?.parent;
        }
        Ok(t)
    }

    /// Flatten the subtree at `root` into paint order. Mask shapes are not emitted.
    pub fn display_list(&self, root: VisualId) -> FlexResult<Vec<DrawItem>> {
        let parent_world = match self.visual(root)?.parent {
            Some(p) => self.world_transform(p)?,
            None => Affine::IDENTITY,
        };
        let mut out = Vec::new();
        self.flatten(root, parent_world, None, &mut out)?;
        Ok(out)
    }

    fn flatten(
        &self,
        id: VisualId,
        parent_world: Affine,
        parent_clip: Option<Rect>,
        out: &mut Vec<DrawItem>,
    ) -> FlexResult<()> {
        let v = self.visual(id)?;
        if matches!(v.drawable, Drawable::Mask { .. }) {
            return Ok(());
        }
        let world = parent_world * self.local_transform(id)?;

        let mut clip = parent_clip;
        if let Some(m) = v.mask {
            if let Drawable::Mask { shape } = &self.visual(m)?.drawable {
                let node_world = parent_world
                    * Affine::translate(v.position)
                    * Affine::scale_non_uniform(v.scale.x, v.scale.y);
                let r = node_world.transform_rect_bbox(shape.rect());
                clip = Some(clip.map_or(r, |c| c.intersect(r)));
            }
        }

        if !matches!(v.drawable, Drawable::Group) {
            out.push(DrawItem {
                visual: id,
                transform: world,
                drawable: v.drawable.clone(),
                clip,
            });
        }
        for &c in &v.children {
            self.flatten(c, world, clip, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
