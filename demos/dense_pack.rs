use glam::DVec2;
use pack_ice::*;

fn main() {
    let mut sim = Simulation::new("dense_pack");
    sim.time_step = 5e-3;
    sim.time_total = 5.0;
    sim.ocean = Some(FluidGrid::regular(10, 10, 100.0, 100.0));

    // 6x6 pack of floes with slight initial overlap between neighbors.
    for j in 0..6 {
        for i in 0..6 {
            let mut floe = Grain::cylindrical(
                DVec2::new(30.0 + i as f64 * 7.8, 30.0 + j as f64 * 7.8),
                4.0,
                1.0,
            );
            floe.lin_vel = DVec2::new(0.05 * (i as f64 - 2.5), 0.05 * (j as f64 - 2.5));
            sim.add_grain(floe);
        }
    }

    if let Err(err) = sim.run(RunOptions::default()) {
        eprintln!("run aborted: {err}");
        return;
    }

    let mean_speed: f64 =
        sim.grains.iter().map(|g| g.lin_vel.length()).sum::<f64>() / sim.grains.len() as f64;
    println!(
        "{} grains after {} iterations, mean drift speed {:.4} m/s",
        sim.grains.len(),
        sim.iteration,
        mean_speed
    );
}
