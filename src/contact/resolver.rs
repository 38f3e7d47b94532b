//! Per-contact force and torque resolution.

use glam::DVec2;

use crate::config::RHEOLOGY_EPS;
use crate::core::GrainStore;
use crate::error::{Result, SimError};
use crate::utils::math::{approx_zero, harmonic_mean};

/// Resolves every occupied neighbor slot in the store, accumulating
/// contact forces, torques and mean pressure into both grains of each
/// pair. `time_step` advances the tangential spring memory.
pub fn resolve_contacts(store: &mut GrainStore, time_step: f64) -> Result<()> {
    for i in 0..store.len() {
        let slot_count = store.get(i).map(|g| g.contacts.len()).unwrap_or(0);
        for slot in 0..slot_count {
            let Some(j) = store.get(i).and_then(|g| g.contacts[slot]) else {
                continue;
            };
            resolve_contact_pair(store, i, j, slot, time_step)?;
        }
    }
    Ok(())
}

/// Applies the contact law to one pair: grain `i` owns slot `slot`
/// holding grain `j` (`i < j` by construction of the search pass).
///
/// Invoking this on a non-overlapping pair indicates that search and
/// resolution have desynchronized and is a fatal invariant violation.
fn resolve_contact_pair(
    store: &mut GrainStore,
    i: usize,
    j: usize,
    slot: usize,
    time_step: f64,
) -> Result<()> {
    let (gi, gj) = store.pair_mut(i, j);

    let position_ij = gi.lin_pos - gj.lin_pos;
    let dist = position_ij.length();
    let delta_n = dist - (gi.contact_radius + gj.contact_radius);
    if delta_n > 0.0 {
        return Err(SimError::ContactLost { i, j, gap: delta_n });
    }

    // Contact frame: unit normal from j toward i, tangent its perpendicular.
    let n = position_ij / dist;
    let t = DVec2::new(-n.y, n.x);

    let vel_lin = gi.lin_vel - gj.lin_vel;
    let vel_n = vel_lin.dot(n);
    // Tangential relative velocity includes the rim sliding speed from the
    // two spins, weighted by the harmonic-mean radius.
    let vel_t = vel_lin.dot(t)
        - harmonic_mean(gi.contact_radius, gj.contact_radius) * (gi.ang_vel + gj.ang_vel);

    // Rotate the stored spring into the current frame (drop the component
    // along the new normal) and accumulate this step's sliding.
    let delta_t0 = gi.contact_displacement[slot];
    let mut delta_t = delta_t0 - n * delta_t0.dot(n) + t * (vel_t * time_step);

    // Effective contact radius, shrunk by half the overlap depth.
    let r_ij = harmonic_mean(gi.contact_radius, gj.contact_radius) - delta_n.abs() / 2.0;

    // Macroscopic elastic parameters override the micromechanical
    // stiffnesses when both grains carry a positive Young's modulus.
    let (k_n, k_t) = if gi.youngs_modulus > 0.0 && gj.youngs_modulus > 0.0 {
        let e = harmonic_mean(gi.youngs_modulus, gj.youngs_modulus);
        let nu = harmonic_mean(gi.poissons_ratio, gj.poissons_ratio);
        let area = r_ij * gi.thickness.min(gj.thickness);
        let k_n = e * area / r_ij;
        let k_t = k_n * 2.0 * (1.0 - nu * nu) / ((2.0 - nu) * (1.0 + nu));
        (k_n, k_t)
    } else {
        (
            harmonic_mean(gi.contact_stiffness_normal, gj.contact_stiffness_normal),
            harmonic_mean(
                gi.contact_stiffness_tangential,
                gj.contact_stiffness_tangential,
            ),
        )
    };
    let gamma_n = harmonic_mean(gi.contact_viscosity_normal, gj.contact_viscosity_normal);
    let gamma_t = harmonic_mean(
        gi.contact_viscosity_tangential,
        gj.contact_viscosity_tangential,
    );
    let mu_d = gi.contact_dynamic_friction.min(gj.contact_dynamic_friction);

    let force_n = if approx_zero(k_n, RHEOLOGY_EPS) && approx_zero(gamma_n, RHEOLOGY_EPS) {
        0.0
    } else if k_n > 0.0 && approx_zero(gamma_n, RHEOLOGY_EPS) {
        -k_n * delta_n
    } else if k_n > 0.0 && gamma_n > 0.0 {
        // Spring-dashpot, clamped repulsive: no tensile normal force.
        (-k_n * delta_n - gamma_n * vel_n).max(0.0)
    } else {
        return Err(SimError::InvalidRheology {
            context: "normal",
            stiffness: k_n,
            damping: gamma_n,
        });
    };

    let force_t = if approx_zero(k_t, RHEOLOGY_EPS) && approx_zero(gamma_t, RHEOLOGY_EPS) {
        0.0
    } else if approx_zero(k_t, RHEOLOGY_EPS) && gamma_t > 0.0 {
        // Pure viscous sliding, capped at the Coulomb limit, opposing the
        // relative tangential motion.
        let magnitude = (gamma_t * vel_t).abs().min(mu_d * force_n.abs());
        if vel_t > 0.0 {
            -magnitude
        } else {
            magnitude
        }
    } else if k_t > 0.0 {
        let mut force_t = -k_t * delta_t.dot(t) - gamma_t * vel_t;
        let coulomb_limit = mu_d * force_n.abs();
        if force_t.abs() > coulomb_limit {
            // Clamp to the limit and back-solve the spring so the stored
            // displacement stays consistent with the applied force.
            force_t = coulomb_limit * force_t.signum();
            delta_t = t * (-(force_t + gamma_t * vel_t) / k_t);
        }
        force_t
    } else {
        return Err(SimError::InvalidRheology {
            context: "tangential",
            stiffness: k_t,
            damping: gamma_t,
        });
    };

    let force = force_n * n + force_t * t;
    gi.force += force;
    gj.force -= force;

    // Tangential traction at the shared contact point drives both grains
    // toward reduced relative spin: same torque sign on both.
    gi.torque += -force_t * r_ij;
    gj.torque += -force_t * r_ij;

    gi.pressure += force_n / gi.side_surface_area;
    gj.pressure += force_n / gj.side_surface_area;

    gi.contact_displacement[slot] = delta_t;
    Ok(())
}
