use glam::DVec2;
use pack_ice::*;

fn drifting_sim() -> Simulation {
    let mut sim = Simulation::new("drift");
    sim.time_step = 0.5;
    sim.time_total = 10.0;

    let mut a = Grain::cylindrical(DVec2::new(0.0, 0.0), 1.0, 1.0);
    a.lin_vel = DVec2::new(0.1, 0.0);
    let mut b = Grain::cylindrical(DVec2::new(100.0, 0.0), 1.0, 1.0);
    b.lin_vel = DVec2::new(-0.1, 0.05);
    sim.add_grain(a);
    sim.add_grain(b);
    sim
}

#[test]
fn single_step_advances_exactly_one_iteration() {
    let mut sim = drifting_sim();
    sim.time = sim.time_total; // already at the bound
    let total_before = sim.time_total;

    sim.run(RunOptions {
        single_step: true,
        verbose: false,
        ..RunOptions::default()
    })
    .expect("single step");

    assert_eq!(sim.iteration, 1);
    assert_eq!(sim.time_total, total_before + sim.time_step);
    assert_eq!(sim.time, total_before + sim.time_step);
}

#[test]
fn isolated_grains_keep_their_velocity() {
    let mut sim = drifting_sim();
    sim.run(RunOptions {
        verbose: false,
        ..RunOptions::default()
    })
    .expect("run");

    assert!(sim.is_done());
    // No contacts and no fluid grids: nothing may touch the velocities.
    assert_eq!(sim.grains.get(0).unwrap().lin_vel, DVec2::new(0.1, 0.0));
    assert_eq!(sim.grains.get(1).unwrap().lin_vel, DVec2::new(-0.1, 0.05));
    // Positions drifted ballistically.
    let expected_x = 0.1 * sim.time;
    assert!((sim.grains.get(0).unwrap().lin_pos.x - expected_x).abs() < 1e-9);
}

#[test]
fn identical_runs_produce_identical_state() {
    let mut a = drifting_sim();
    let mut b = drifting_sim();
    let options = || RunOptions {
        verbose: false,
        ..RunOptions::default()
    };
    a.run(options()).expect("run a");
    b.run(options()).expect("run b");
    assert!(a.approx_eq(&b, 0.0), "deterministic runs must agree exactly");
}

#[test]
fn colliding_grains_repel() {
    let mut sim = Simulation::new("bounce");
    sim.time_step = 1e-3;
    sim.time_total = 0.2;

    let mut a = Grain::cylindrical(DVec2::new(0.0, 0.0), 10.0, 1.0);
    a.lin_vel = DVec2::new(0.5, 0.0);
    let b = Grain::cylindrical(DVec2::new(19.5, 0.0), 10.0, 1.0);
    sim.add_grain(a);
    sim.add_grain(b);

    sim.run(RunOptions {
        verbose: false,
        ..RunOptions::default()
    })
    .expect("run");

    // The pair overlapped at start; the contact must push them apart.
    assert!(sim.grains.get(1).unwrap().lin_vel.x > 0.0);
    let gap = (sim.grains.get(1).unwrap().lin_pos - sim.grains.get(0).unwrap().lin_pos).length();
    assert!(gap >= 19.5);
}

#[test]
fn fixed_grain_acts_as_an_anchor() {
    let mut sim = Simulation::new("anchor");
    sim.time_step = 1e-3;
    sim.time_total = 0.1;

    let mut wall = Grain::cylindrical(DVec2::new(0.0, 0.0), 10.0, 1.0);
    wall.fixed = true;
    let mut mover = Grain::cylindrical(DVec2::new(19.0, 0.0), 10.0, 1.0);
    mover.lin_vel = DVec2::new(-1.0, 0.0);
    sim.add_grain(wall);
    sim.add_grain(mover);

    sim.run(RunOptions {
        verbose: false,
        ..RunOptions::default()
    })
    .expect("run");

    assert_eq!(sim.grains.get(0).unwrap().lin_pos, DVec2::ZERO);
    // Momentum went into reversing the mover, not into the anchor.
    assert!(sim.grains.get(1).unwrap().lin_vel.x > -1.0);
}

#[test]
fn disabling_a_grain_retires_its_active_contact() {
    let mut sim = Simulation::new("disable");
    sim.time_step = 1e-3;

    sim.add_grain(Grain::cylindrical(DVec2::new(0.0, 0.0), 10.0, 1.0));
    sim.add_grain(Grain::cylindrical(DVec2::new(18.0, 0.0), 10.0, 1.0));

    let one_step = || RunOptions {
        single_step: true,
        verbose: false,
        ..RunOptions::default()
    };

    // The pair overlaps, so the first step establishes the contact.
    sim.run(one_step()).expect("first step");
    assert!(sim.grains.get(1).unwrap().force.x > 0.0);

    // Still overlapping, but one grain is now disabled: the next sweep
    // must retire the slot so no force reaches either grain.
    sim.grains.get_mut(1).unwrap().enabled = false;
    sim.run(one_step()).expect("second step");
    assert_eq!(sim.grains.get(1).unwrap().force, DVec2::ZERO);
    assert_eq!(sim.grains.get(0).unwrap().force, DVec2::ZERO);
    assert_eq!(sim.grains.get(0).unwrap().contact_count(), 0);
}

struct CountingWriter {
    snapshots: std::rc::Rc<std::cell::RefCell<usize>>,
}

impl OutputWriter for CountingWriter {
    fn write_snapshot(&mut self, _sim: &Simulation) {
        *self.snapshots.borrow_mut() += 1;
    }
}

#[test]
fn snapshots_fire_at_the_configured_interval() {
    let mut sim = drifting_sim();
    sim.file_time_step = 2.5; // every 5 iterations of 0.5 s

    let count = std::rc::Rc::new(std::cell::RefCell::new(0));
    sim.run(RunOptions {
        verbose: false,
        write_snapshots: true,
        writer: Some(Box::new(CountingWriter {
            snapshots: count.clone(),
        })),
        ..RunOptions::default()
    })
    .expect("run");

    // 21 iterations of 0.5 s, one snapshot per 2.5 s of simulated time.
    assert_eq!(*count.borrow(), 4);
}

#[test]
fn external_body_force_accelerates_grains() {
    let mut sim = Simulation::new("forced");
    sim.time_step = 0.1;
    sim.time_total = 1.0;
    let mut grain = Grain::cylindrical(DVec2::ZERO, 1.0, 1.0);
    grain.external_body_force = DVec2::new(grain.mass, 0.0); // 1 m/s² east
    sim.add_grain(grain);

    sim.run(RunOptions {
        verbose: false,
        ..RunOptions::default()
    })
    .expect("run");
    assert!(sim.grains.get(0).unwrap().lin_vel.x > 0.9);
}
