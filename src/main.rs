use std::time::Instant;

use intersection_sim::{IntersectionAttributes, Settings, SignalMode, Simulation};

fn main() {
    let settings = Settings::default().with_car_spawn_rate(20.0);
    let mut sim = Simulation::new(&IntersectionAttributes::default(), settings);

    println!("Simulating...");
    let num_frames = 1000;
    for mode in [SignalMode::Fixed, SignalMode::Adaptive].into_iter().cycle() {
        let start = Instant::now();
        for _ in 0..num_frames {
            sim.tick(0.05, mode, &settings);
        }
        let frame = start.elapsed() / num_frames;
        println!(
            "{:?}: avg. frame {:?} --> {:.0}x speedup ({} vehs, {} completed, phase {})",
            mode,
            frame,
            0.05 / frame.as_secs_f32(),
            sim.vehicle_count(),
            sim.completed_count(),
            sim.controller().phase(),
        );
    }
}
