//! Error types for the pack_ice engine.
//!
//! This module provides a unified error type [`SimError`] and a convenient
//! [`Result`] alias. Every variant is fatal: a physically inconsistent
//! state cannot be safely continued, so the run aborts at the first error.

use std::fmt;

use crate::fluid::FluidLayer;

/// Main error type for the engine.
///
/// All fallible simulation phases return this error type, reporting the
/// offending grains or parameter values.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A new contact was found but the grain has no empty neighbor slot left.
    ContactCapacityExceeded { grain: usize, nc_max: usize },
    /// Contact resolution was invoked on a pair whose gap is positive,
    /// indicating a search/resolve desynchronization bug.
    ContactLost { i: usize, j: usize, gap: f64 },
    /// A stiffness/damping combination outside the supported rheology cases.
    InvalidRheology {
        context: &'static str,
        stiffness: f64,
        damping: f64,
    },
    /// Drag was requested for a fluid layer with no configured grid.
    MissingFluidGrid { layer: FluidLayer },
    /// Velocity component arrays do not match the grid geometry.
    FieldShapeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ContactCapacityExceeded { grain, nc_max } => write!(
                f,
                "grain {grain} exceeded its contact capacity (nc_max = {nc_max})"
            ),
            Self::ContactLost { i, j, gap } => write!(
                f,
                "contact resolution requested for separated grains {i} and {j} (gap = {gap})"
            ),
            Self::InvalidRheology {
                context,
                stiffness,
                damping,
            } => write!(
                f,
                "unsupported {context} rheology: stiffness = {stiffness}, damping = {damping}"
            ),
            Self::MissingFluidGrid { layer } => {
                write!(f, "{layer} drag requested but no {layer} grid is configured")
            }
            Self::FieldShapeMismatch { expected, actual } => write!(
                f,
                "velocity field shape mismatch: expected {expected} values, got {actual}"
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenient Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
