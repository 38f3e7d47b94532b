use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_NC_MAX, ICE_DENSITY};
use crate::utils::math::approx_eq;

/// Rigid 2-D disk body (models an ice floe) with translational and
/// rotational state, contact-rheology parameters, fluid-drag coefficients,
/// per-step accumulators, and a fixed-capacity neighbor list.
///
/// Grains are owned by [`crate::core::GrainStore`] and addressed by index;
/// they are appended at setup time and never removed during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grain {
    // Kinematic state, mutated by the integrator only.
    pub lin_pos: DVec2,
    pub lin_vel: DVec2,
    pub lin_acc: DVec2,
    pub ang_pos: f64,
    pub ang_vel: f64,
    pub ang_acc: f64,

    // Geometry, derived at creation and immutable thereafter.
    /// Radius used for overlap and contact-force geometry.
    pub contact_radius: f64,
    /// Radius of the physical footprint, used for mass and fluid drag.
    pub areal_radius: f64,
    pub thickness: f64,
    pub side_surface_area: f64,
    pub horizontal_surface_area: f64,

    // Mass properties.
    pub density: f64,
    pub mass: f64,
    pub moment_of_inertia: f64,

    // Contact-mechanical parameters.
    pub contact_stiffness_normal: f64,
    pub contact_stiffness_tangential: f64,
    pub contact_viscosity_normal: f64,
    pub contact_viscosity_tangential: f64,
    pub contact_dynamic_friction: f64,
    /// When positive on both grains of a pair, the macroscopic elastic
    /// parameters override the explicit contact stiffnesses.
    pub youngs_modulus: f64,
    pub poissons_ratio: f64,

    // Fluid-drag coefficients per layer.
    pub ocean_drag_coeff_vert: f64,
    pub ocean_drag_coeff_horiz: f64,
    pub atmosphere_drag_coeff_vert: f64,
    pub atmosphere_drag_coeff_horiz: f64,

    // Per-step accumulators, reset by the loop controller.
    pub force: DVec2,
    pub torque: f64,
    /// Mean contact pressure over the grain's side surface.
    pub pressure: f64,
    pub ocean_stress: DVec2,
    pub atmosphere_stress: DVec2,
    /// Constant body force carried into every step's accumulator reset.
    pub external_body_force: DVec2,

    // Flags.
    pub enabled: bool,
    pub fixed: bool,
    pub rotating: bool,

    /// Neighbor slots: `Some(j)` holds the higher grain index of a contact
    /// owned by this grain, `None` is an empty slot. Fixed capacity
    /// `nc_max`; overflowing it is fatal.
    pub contacts: Vec<Option<usize>>,
    /// Tangential spring displacement per slot, persisting across steps
    /// while the slot stays occupied.
    pub contact_displacement: Vec<DVec2>,

    /// Cell containing this grain in the ocean grid, refreshed each step.
    pub ocean_grid_cell: Option<(usize, usize)>,
    /// Cell containing this grain in the atmosphere grid.
    pub atmosphere_grid_cell: Option<(usize, usize)>,
}

impl Grain {
    /// Creates a cylindrical grain at `lin_pos` with the given contact
    /// radius and thickness, deriving mass properties from the default ice
    /// density. Material parameters start from typical sea-ice values and
    /// can be adjusted through the public fields before the grain is added
    /// to a simulation.
    pub fn cylindrical(lin_pos: DVec2, contact_radius: f64, thickness: f64) -> Self {
        let mut grain = Self {
            lin_pos,
            lin_vel: DVec2::ZERO,
            lin_acc: DVec2::ZERO,
            ang_pos: 0.0,
            ang_vel: 0.0,
            ang_acc: 0.0,
            contact_radius,
            areal_radius: contact_radius,
            thickness,
            side_surface_area: 0.0,
            horizontal_surface_area: 0.0,
            density: ICE_DENSITY,
            mass: 0.0,
            moment_of_inertia: 0.0,
            contact_stiffness_normal: 1e7,
            contact_stiffness_tangential: 0.0,
            contact_viscosity_normal: 0.0,
            contact_viscosity_tangential: 0.0,
            contact_dynamic_friction: 0.4,
            youngs_modulus: 2e7,
            poissons_ratio: 0.185,
            ocean_drag_coeff_vert: 0.85,
            ocean_drag_coeff_horiz: 5e-4,
            atmosphere_drag_coeff_vert: 0.4,
            atmosphere_drag_coeff_horiz: 2.5e-4,
            force: DVec2::ZERO,
            torque: 0.0,
            pressure: 0.0,
            ocean_stress: DVec2::ZERO,
            atmosphere_stress: DVec2::ZERO,
            external_body_force: DVec2::ZERO,
            enabled: true,
            fixed: false,
            rotating: true,
            contacts: vec![None; DEFAULT_NC_MAX],
            contact_displacement: vec![DVec2::ZERO; DEFAULT_NC_MAX],
            ocean_grid_cell: None,
            atmosphere_grid_cell: None,
        };
        grain.update_derived_geometry();
        grain
    }

    /// Recomputes footprint, surface areas, mass and moment of inertia from
    /// the current areal radius, thickness and density.
    pub fn update_derived_geometry(&mut self) {
        let r = self.areal_radius;
        self.horizontal_surface_area = std::f64::consts::PI * r * r;
        self.side_surface_area = 2.0 * std::f64::consts::PI * r * self.thickness;
        let volume = self.horizontal_surface_area * self.thickness;
        self.mass = volume * self.density;
        self.moment_of_inertia = 0.5 * self.mass * r * r;
    }

    /// Resizes the neighbor list to `nc_max` slots. Called when the grain is
    /// added to a simulation whose capacity differs from the default.
    pub fn resize_contact_slots(&mut self, nc_max: usize) {
        self.contacts.resize(nc_max, None);
        self.contact_displacement.resize(nc_max, DVec2::ZERO);
    }

    /// Resets the per-step accumulators, carrying the external body force.
    pub fn zero_accumulators(&mut self) {
        self.force = self.external_body_force;
        self.torque = 0.0;
        self.pressure = 0.0;
        self.ocean_stress = DVec2::ZERO;
        self.atmosphere_stress = DVec2::ZERO;
    }

    /// Number of occupied neighbor slots.
    pub fn contact_count(&self) -> usize {
        self.contacts.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns the slot index holding a contact with grain `j`, if any.
    pub fn find_contact_slot(&self, j: usize) -> Option<usize> {
        self.contacts.iter().position(|slot| *slot == Some(j))
    }

    /// Clears a neighbor slot and its stored tangential displacement.
    pub fn clear_contact_slot(&mut self, slot: usize) {
        self.contacts[slot] = None;
        self.contact_displacement[slot] = DVec2::ZERO;
    }

    /// Field-by-field comparison with tolerance `tol` on floating values.
    /// Covers the full grain state so two restart snapshots compare unequal
    /// whenever any kinematic field, material parameter, accumulator or
    /// contact-history slot differs.
    pub fn approx_eq(&self, other: &Grain, tol: f64) -> bool {
        self.lin_pos.abs_diff_eq(other.lin_pos, tol)
            && self.lin_vel.abs_diff_eq(other.lin_vel, tol)
            && self.lin_acc.abs_diff_eq(other.lin_acc, tol)
            && approx_eq(self.ang_pos, other.ang_pos, tol)
            && approx_eq(self.ang_vel, other.ang_vel, tol)
            && approx_eq(self.ang_acc, other.ang_acc, tol)
            && approx_eq(self.contact_radius, other.contact_radius, tol)
            && approx_eq(self.areal_radius, other.areal_radius, tol)
            && approx_eq(self.thickness, other.thickness, tol)
            && approx_eq(self.side_surface_area, other.side_surface_area, tol)
            && approx_eq(
                self.horizontal_surface_area,
                other.horizontal_surface_area,
                tol,
            )
            && approx_eq(self.density, other.density, tol)
            && approx_eq(self.mass, other.mass, tol)
            && approx_eq(self.moment_of_inertia, other.moment_of_inertia, tol)
            && approx_eq(
                self.contact_stiffness_normal,
                other.contact_stiffness_normal,
                tol,
            )
            && approx_eq(
                self.contact_stiffness_tangential,
                other.contact_stiffness_tangential,
                tol,
            )
            && approx_eq(
                self.contact_viscosity_normal,
                other.contact_viscosity_normal,
                tol,
            )
            && approx_eq(
                self.contact_viscosity_tangential,
                other.contact_viscosity_tangential,
                tol,
            )
            && approx_eq(
                self.contact_dynamic_friction,
                other.contact_dynamic_friction,
                tol,
            )
            && approx_eq(self.youngs_modulus, other.youngs_modulus, tol)
            && approx_eq(self.poissons_ratio, other.poissons_ratio, tol)
            && approx_eq(self.ocean_drag_coeff_vert, other.ocean_drag_coeff_vert, tol)
            && approx_eq(
                self.ocean_drag_coeff_horiz,
                other.ocean_drag_coeff_horiz,
                tol,
            )
            && approx_eq(
                self.atmosphere_drag_coeff_vert,
                other.atmosphere_drag_coeff_vert,
                tol,
            )
            && approx_eq(
                self.atmosphere_drag_coeff_horiz,
                other.atmosphere_drag_coeff_horiz,
                tol,
            )
            && self.force.abs_diff_eq(other.force, tol)
            && approx_eq(self.torque, other.torque, tol)
            && approx_eq(self.pressure, other.pressure, tol)
            && self.ocean_stress.abs_diff_eq(other.ocean_stress, tol)
            && self.atmosphere_stress.abs_diff_eq(other.atmosphere_stress, tol)
            && self
                .external_body_force
                .abs_diff_eq(other.external_body_force, tol)
            && self.enabled == other.enabled
            && self.fixed == other.fixed
            && self.rotating == other.rotating
            && self.contacts == other.contacts
            && self.contact_displacement.len() == other.contact_displacement.len()
            && self
                .contact_displacement
                .iter()
                .zip(&other.contact_displacement)
                .all(|(a, b)| a.abs_diff_eq(*b, tol))
    }
}

impl Default for Grain {
    fn default() -> Self {
        Self::cylindrical(DVec2::ZERO, 1.0, 1.0)
    }
}
