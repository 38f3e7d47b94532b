//! Background fluid velocity grids and grain–fluid coupling.

pub mod drag;
pub mod grid;

pub use drag::apply_layer_drag;
pub use grid::{BoundaryCondition, BoundaryConditions, FluidGrid, FluidLayer};
