//! Style attributes and the resolver that writes them into the layout solver.

pub(crate) mod attrs;
pub(crate) mod resolve;
