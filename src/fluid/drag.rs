//! Drag force and vorticity torque from a fluid layer on the grains.

use crate::config::{ATMOSPHERE_DENSITY, FREEBOARD_RATIO, OCEAN_DENSITY};
use crate::core::{Grain, GrainStore};

use super::grid::{FluidGrid, FluidLayer};

/// Applies quadratic-law drag force and vorticity torque from `grid` to
/// every enabled grain with a cached cell in that grid, accumulating into
/// the grain's force/torque exactly like contact forces. `time` selects the
/// stored velocity samples to interpolate between.
pub fn apply_layer_drag(store: &mut GrainStore, grid: &FluidGrid, layer: FluidLayer, time: f64) {
    for grain in store.iter_mut() {
        if !grain.enabled {
            continue;
        }
        let cell = match layer {
            FluidLayer::Ocean => grain.ocean_grid_cell,
            FluidLayer::Atmosphere => grain.atmosphere_grid_cell,
        };
        let Some(cell) = cell else {
            continue;
        };

        let fluid_vel = grid.interpolate_velocity(cell, grain.lin_pos, time);
        let curl = grid.interpolate_curl(cell, grain.lin_pos, time);
        apply_drag_to_grain(grain, layer, fluid_vel, curl);
    }
}

/// Drag on a single grain from the local fluid velocity and curl.
///
/// The force is quadratic in the relative velocity, acting over the
/// submerged (ocean) or emergent (atmosphere) frontal area plus the
/// horizontal footprint; the torque is quadratic in the deficit between
/// the grain's spin and half the local vorticity.
pub fn apply_drag_to_grain(grain: &mut Grain, layer: FluidLayer, fluid_vel: glam::DVec2, curl: f64) {
    let freeboard = FREEBOARD_RATIO * grain.thickness;
    let (density, coeff_vert, coeff_horiz, exposed_height) = match layer {
        FluidLayer::Ocean => (
            OCEAN_DENSITY,
            grain.ocean_drag_coeff_vert,
            grain.ocean_drag_coeff_horiz,
            grain.thickness - freeboard,
        ),
        FluidLayer::Atmosphere => (
            ATMOSPHERE_DENSITY,
            grain.atmosphere_drag_coeff_vert,
            grain.atmosphere_drag_coeff_horiz,
            freeboard,
        ),
    };

    let width = 2.0 * grain.areal_radius;
    let length = 2.0 * grain.areal_radius;

    let relative = fluid_vel - grain.lin_vel;
    let drag_force = density
        * (0.5 * coeff_vert * width * exposed_height + coeff_horiz * length * width)
        * relative
        * relative.length();
    grain.force += drag_force;

    let r = grain.areal_radius;
    let spin_deficit = 0.5 * curl - grain.ang_vel;
    grain.torque += std::f64::consts::PI
        * r.powi(4)
        * density
        * (r / 5.0 * coeff_vert + exposed_height * coeff_horiz)
        * spin_deficit.abs()
        * spin_deficit;

    let stress = drag_force / grain.horizontal_surface_area;
    match layer {
        FluidLayer::Ocean => grain.ocean_stress = stress,
        FluidLayer::Atmosphere => grain.atmosphere_stress = stress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn drifting_grain() -> Grain {
        let mut grain = Grain::cylindrical(DVec2::new(5.0, 5.0), 2.0, 1.0);
        grain.zero_accumulators();
        grain
    }

    #[test]
    fn drag_force_opposes_relative_motion() {
        let mut grain = drifting_grain();
        grain.lin_vel = DVec2::new(1.0, 0.0);
        // Still fluid: the drag must decelerate the grain.
        apply_drag_to_grain(&mut grain, FluidLayer::Ocean, DVec2::ZERO, 0.0);
        assert!(grain.force.x < 0.0);
        assert_eq!(grain.force.y, 0.0);
        assert!(grain.ocean_stress.x < 0.0);
    }

    #[test]
    fn drag_force_is_quadratic_in_relative_speed() {
        let mut slow = drifting_grain();
        let mut fast = drifting_grain();
        apply_drag_to_grain(&mut slow, FluidLayer::Ocean, DVec2::new(1.0, 0.0), 0.0);
        apply_drag_to_grain(&mut fast, FluidLayer::Ocean, DVec2::new(2.0, 0.0), 0.0);
        assert!((fast.force.x / slow.force.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn vorticity_spins_grain_toward_half_curl() {
        let mut grain = drifting_grain();
        apply_drag_to_grain(&mut grain, FluidLayer::Ocean, DVec2::ZERO, 2.0);
        assert!(grain.torque > 0.0);

        let mut grain = drifting_grain();
        grain.ang_vel = 1.0;
        // Spin already matches half the curl: no torque.
        apply_drag_to_grain(&mut grain, FluidLayer::Ocean, DVec2::ZERO, 2.0);
        assert_eq!(grain.torque, 0.0);
    }

    #[test]
    fn atmosphere_drag_is_much_weaker_than_ocean() {
        let mut in_water = drifting_grain();
        let mut in_air = drifting_grain();
        apply_drag_to_grain(&mut in_water, FluidLayer::Ocean, DVec2::new(1.0, 0.0), 0.0);
        apply_drag_to_grain(&mut in_air, FluidLayer::Atmosphere, DVec2::new(1.0, 0.0), 0.0);
        assert!(in_water.force.x > in_air.force.x * 10.0);
    }
}
