//! Retained scene graph and text measurement: the drawing side of a layout-bound node.

pub(crate) mod graph;
pub(crate) mod text;
