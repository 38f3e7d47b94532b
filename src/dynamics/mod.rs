//! Kinematic time integration.

pub mod integrator;

pub use integrator::{IntegrationScheme, Integrator};
