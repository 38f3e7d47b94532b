//! pack_ice – a discrete-element engine for sea-ice floes.
//!
//! This crate time-steps collections of disk-shaped rigid grains that
//! interact through spring-dashpot contact mechanics with Coulomb-limited
//! friction, and optionally couple to background ocean and atmosphere
//! velocity grids through quadratic drag laws. The engine is
//! single-threaded, synchronous, and deterministic for fixed inputs.

pub mod config;
pub mod contact;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod fluid;
pub mod simulation;
pub mod utils;

pub use glam::DVec2;

pub use crate::contact::{find_contacts_all_pairs, find_contacts_in_grid, resolve_contacts};
pub use crate::core::{Grain, GrainStore};
pub use crate::dynamics::{IntegrationScheme, Integrator};
pub use crate::error::{Result, SimError};
pub use crate::fluid::{BoundaryCondition, BoundaryConditions, FluidGrid, FluidLayer};
pub use crate::simulation::{OutputWriter, RunOptions, Simulation};
pub use crate::utils::math::harmonic_mean;
