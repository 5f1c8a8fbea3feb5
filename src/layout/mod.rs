//! Box-layout solver bridge (Taffy).

pub(crate) mod solver;
