use serde::{Deserialize, Serialize};

use crate::core::{Grain, GrainStore};

/// Temporal integration scheme for grain kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationScheme {
    /// Truncated Taylor expansion with a backward-difference acceleration
    /// gradient. Explicit and conditionally stable: the time step must be
    /// chosen against stiffness and mass to avoid divergence.
    #[default]
    ThreeTermTaylor,
}

/// Integrator advancing grain position, orientation and velocity from the
/// accumulated force and torque.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub dt: f64,
    pub scheme: IntegrationScheme,
}

impl Integrator {
    pub fn new(dt: f64, scheme: IntegrationScheme) -> Self {
        Self { dt, scheme }
    }

    /// Advances every enabled, non-fixed grain by one time step.
    pub fn step(&self, store: &mut GrainStore) {
        for grain in store.iter_mut() {
            if !grain.enabled || grain.fixed {
                continue;
            }
            match self.scheme {
                IntegrationScheme::ThreeTermTaylor => self.update_three_term_taylor(grain),
            }
        }
    }

    fn update_three_term_taylor(&self, grain: &mut Grain) {
        let dt = self.dt;

        // Temporal acceleration gradient from backward differences.
        let lin_acc = grain.force / grain.mass;
        let d_lin_acc_dt = (lin_acc - grain.lin_acc) / dt;
        grain.lin_acc = lin_acc;

        grain.lin_pos +=
            grain.lin_vel * dt + 0.5 * grain.lin_acc * dt * dt + d_lin_acc_dt * dt.powi(3) / 6.0;
        grain.lin_vel += grain.lin_acc * dt + 0.5 * d_lin_acc_dt * dt * dt;

        if !grain.rotating {
            return;
        }
        let ang_acc = grain.torque / grain.moment_of_inertia;
        let d_ang_acc_dt = (ang_acc - grain.ang_acc) / dt;
        grain.ang_acc = ang_acc;

        grain.ang_pos +=
            grain.ang_vel * dt + 0.5 * grain.ang_acc * dt * dt + d_ang_acc_dt * dt.powi(3) / 6.0;
        grain.ang_vel += grain.ang_acc * dt + 0.5 * d_ang_acc_dt * dt * dt;
    }
}
