/// Handle to a layout-bound node owned by a [`crate::Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a visual in a [`crate::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub(crate) u32);

impl VisualId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
