//! Layout-bound nodes.
//!
//! A [`Stage`] owns the solver tree, the scene graph and every node that binds the two. All
//! hierarchy edits go through the stage so both trees always change together.

mod composite;
mod fill;
mod flow;
mod stage;

pub use composite::{CompositeOptions, DEFAULT_REFERENCE};
pub use fill::{AnchorMode, FillOptions, FitMode};
pub use stage::{NodeVisuals, RefreshTrace, Stage, TraceEntry};
