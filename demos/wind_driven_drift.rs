use glam::DVec2;
use pack_ice::*;

fn main() {
    let mut sim = Simulation::new("wind_driven_drift");
    sim.time_step = 0.1;
    sim.time_total = 1800.0;

    // Still ocean and a steady 10 m/s westerly wind on collocated grids.
    let ocean = FluidGrid::regular(8, 8, 800.0, 800.0);
    let mut atmosphere = FluidGrid::regular(8, 8, 800.0, 800.0);
    atmosphere.set_uniform_velocity(DVec2::new(10.0, 0.0));
    sim.ocean = Some(ocean);
    sim.atmosphere = Some(atmosphere);

    let floe = sim.add_grain(Grain::cylindrical(DVec2::new(100.0, 400.0), 20.0, 1.0));

    if let Err(err) = sim.run(RunOptions::default()) {
        eprintln!("run aborted: {err}");
        return;
    }

    let floe = sim.grains.get(floe).expect("floe exists");
    println!(
        "floe drifted {:.1} m east in {:.0} s (terminal speed {:.3} m/s)",
        floe.lin_pos.x - 100.0,
        sim.time,
        floe.lin_vel.x
    );
}
