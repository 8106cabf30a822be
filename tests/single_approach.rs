//! Tests that drive vehicles through the intersection via the public simulation API.

use intersection_sim::{
    Direction, IntersectionAttributes, Lane, Pair, Phase, Route, Settings, SignalMode,
    Simulation, VehicleId, VehicleState,
};
use std::cell::RefCell;
use std::rc::Rc;

const DT: f64 = 0.05;

/// Settings with spawning disabled and a green long enough to never end on its own.
fn quiet_settings() -> Settings {
    Settings::default()
        .with_car_spawn_rate(0.0)
        .with_green_duration(1000.0)
}

fn quiet_sim() -> Simulation {
    Simulation::with_seed(&IntersectionAttributes::default(), quiet_settings(), 7)
}

fn route(from: Direction, to: Direction) -> Route {
    Route::new(from, to).unwrap()
}

/// Steps the simulation until `done` holds for the vehicle, panicking if it never does.
fn step_until(sim: &mut Simulation, id: VehicleId, done: impl Fn(VehicleState, Lane) -> bool) {
    for _ in 0..5000 {
        let vehicle = sim.get_vehicle(id).expect("vehicle was removed");
        if done(vehicle.state(), vehicle.lane()) {
            return;
        }
        sim.step(DT);
    }
    panic!("condition never reached");
}

/// Test that a vehicle's position increases monotonically along its approach.
#[test]
fn vehicle_drives_forward() {
    let mut sim = quiet_sim();
    let veh = sim.add_vehicle(route(Direction::West, Direction::East), Lane::Left).unwrap();

    let mut x = sim.get_vehicle(veh).unwrap().position().x;
    for _ in 0..100 {
        sim.step(0.1);
        let next_x = sim.get_vehicle(veh).unwrap().position().x;
        assert!(next_x > x);
        x = next_x;
    }
}

/// Test that a vehicle facing a red light stops before the stop line, and that its
/// wait time stops growing as soon as the light turns green.
#[test]
fn vehicle_waits_at_red_light() {
    let mut sim = quiet_sim();
    sim.force_phase(Phase::new(0));
    let veh = sim.add_vehicle(route(Direction::North, Direction::South), Lane::Left).unwrap();

    for _ in 0..1000 {
        let vehicle = sim.get_vehicle(veh).unwrap();
        let to_line = sim
            .intersection()
            .distance_to_stop_line(Direction::North, vehicle.position());
        assert!(to_line >= 0.0, "crossed the stop line on red");
        if vehicle.is_waiting() {
            break;
        }
        sim.step(DT);
    }
    assert!(sim.get_vehicle(veh).unwrap().is_waiting());

    let mut wait = sim.get_vehicle(veh).unwrap().wait_time();
    for _ in 0..40 {
        sim.step(DT);
        let next = sim.get_vehicle(veh).unwrap().wait_time();
        assert!(next >= wait);
        wait = next;
    }
    assert!(wait > 1.5);
    assert_eq!(sim.waiting_vehicles(Direction::North).count(), 1);
    assert_eq!(sim.sensor_snapshot().cars_waiting(Direction::North), 1);

    sim.force_phase(Phase::green(Pair::NorthSouth));
    sim.step(DT);
    let vehicle = sim.get_vehicle(veh).unwrap();
    assert_eq!(vehicle.wait_time(), wait);
    assert_eq!(vehicle.state(), VehicleState::Approaching);
    for _ in 0..20 {
        sim.step(DT);
        assert_eq!(sim.get_vehicle(veh).unwrap().wait_time(), wait);
    }
}

/// Test that left turns exit into the right lane and right turns into the left lane.
#[test]
fn turns_cross_lanes() {
    let mut sim = quiet_sim();
    sim.force_phase(Phase::green(Pair::NorthSouth));
    let left = sim.add_vehicle(route(Direction::North, Direction::West), Lane::Left).unwrap();
    let right = sim.add_vehicle(route(Direction::South, Direction::West), Lane::Right).unwrap();

    step_until(&mut sim, left, |state, _| state == VehicleState::Exiting);
    assert_eq!(sim.get_vehicle(left).unwrap().lane(), Lane::Right);
    step_until(&mut sim, right, |state, _| state == VehicleState::Exiting);
    assert_eq!(sim.get_vehicle(right).unwrap().lane(), Lane::Left);
}

/// Test that a turning vehicle spawned in the wrong lane changes lanes before the intersection.
#[test]
fn vehicle_changes_lane_for_turn() {
    let mut sim = quiet_sim();
    sim.force_phase(Phase::green(Pair::NorthSouth));
    let veh = sim.add_vehicle(route(Direction::North, Direction::West), Lane::Right).unwrap();

    step_until(&mut sim, veh, |state, _| state == VehicleState::LaneChanging);
    step_until(&mut sim, veh, |state, lane| {
        assert_ne!(state, VehicleState::Turning, "turned from the wrong lane");
        lane == Lane::Left
    });
    let vehicle = sim.get_vehicle(veh).unwrap();
    assert!(!sim.intersection().contains(vehicle.position()));
    assert_eq!(vehicle.lateral_offset(), -0.5);
}

/// Test that straight vehicles never change lanes.
#[test]
fn straight_vehicles_keep_lane() {
    let mut sim = quiet_sim();
    let veh = sim.add_vehicle(route(Direction::East, Direction::West), Lane::Right).unwrap();
    step_until(&mut sim, veh, |state, lane| {
        assert_eq!(lane, Lane::Right);
        assert_ne!(state, VehicleState::LaneChanging);
        state == VehicleState::Exiting
    });
}

/// Test that the completion callback fires once per vehicle as it is removed.
#[test]
fn completion_callback() {
    let mut sim = quiet_sim();
    let completed = Rc::new(RefCell::new(vec![]));
    let log = completed.clone();
    sim.on_car_completed(move |vehicle| log.borrow_mut().push(vehicle.id()));

    let a = sim.add_vehicle(route(Direction::West, Direction::East), Lane::Left).unwrap();
    let b = sim.add_vehicle(route(Direction::East, Direction::West), Lane::Right).unwrap();
    for _ in 0..2000 {
        if sim.vehicle_count() == 0 {
            break;
        }
        sim.step(DT);
    }
    assert_eq!(sim.vehicle_count(), 0);
    assert_eq!(sim.completed_count(), 2);
    let mut ids = completed.borrow().clone();
    ids.sort();
    assert_eq!(ids, vec![a, b]);
}

/// Test that resetting twice is the same as resetting once.
#[test]
fn reset_is_idempotent() {
    let settings = Settings::default().with_car_spawn_rate(20.0);
    let mut sim = Simulation::with_seed(&IntersectionAttributes::default(), settings, 3);
    for _ in 0..600 {
        sim.tick(DT, SignalMode::Adaptive, &settings);
    }
    assert!(sim.vehicle_count() > 0);

    sim.reset();
    let once = (
        sim.controller().phase(),
        sim.controller().phase_timer(),
        sim.light_states(),
        sim.vehicle_count(),
        sim.time(),
        sim.frame(),
        sim.completed_count(),
        *sim.sensor_snapshot(),
    );
    sim.reset();
    let twice = (
        sim.controller().phase(),
        sim.controller().phase_timer(),
        sim.light_states(),
        sim.vehicle_count(),
        sim.time(),
        sim.frame(),
        sim.completed_count(),
        *sim.sensor_snapshot(),
    );
    assert_eq!(once, twice);
    assert_eq!(once.0, Phase::new(0));
    assert_eq!(once.1, 0.0);
    assert_eq!(once.3, 0);
}

/// Test that vehicle IDs keep increasing, including across resets.
#[test]
fn vehicle_ids_are_never_reused() {
    let settings = Settings::default().with_car_spawn_rate(40.0);
    let mut sim = Simulation::with_seed(&IntersectionAttributes::default(), settings, 11);
    let mut max_seen = None;
    for round in 0..2 {
        for _ in 0..1000 {
            sim.step(DT);
            for vehicle in sim.iter_vehicles() {
                let id = Some(vehicle.id());
                if id > max_seen {
                    max_seen = id;
                }
            }
            let mut ids: Vec<_> = sim.iter_vehicles().map(|v| v.id()).collect();
            let len = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), len);
        }
        if round == 0 {
            let before = max_seen;
            sim.reset();
            sim.step(1.0);
            sim.step(1.0);
            let first = sim.iter_vehicles().map(|v| Some(v.id())).min();
            assert!(first.flatten() > before);
        }
    }
}

/// Test that the two pairs are never open at the same time over a busy run.
#[test]
fn pairs_never_open_together() {
    let settings = Settings::default().with_car_spawn_rate(30.0);
    let mut sim = Simulation::with_seed(&IntersectionAttributes::default(), settings, 5);
    for mode in [SignalMode::Fixed, SignalMode::Adaptive] {
        for _ in 0..2000 {
            sim.tick(DT, mode, &settings);
            let states = sim.light_states();
            assert!(!(states.is_open(Pair::NorthSouth) && states.is_open(Pair::WestEast)));
        }
    }
}

/// Test that the adaptive controller serves a queue on the competing pair.
#[test]
fn adaptive_serves_waiting_queue() {
    let mut sim = Simulation::with_seed(&IntersectionAttributes::default(), quiet_settings(), 1);
    sim.set_mode(SignalMode::Adaptive);
    let veh = sim.add_vehicle(route(Direction::South, Direction::North), Lane::Left).unwrap();
    for _ in 0..2000 {
        if sim.get_vehicle(veh).is_none() {
            break;
        }
        sim.step(DT);
    }
    assert!(sim.get_vehicle(veh).is_none());
    assert_eq!(sim.completed_count(), 1);
}

#[cfg(feature = "serde")]
#[test]
fn settings_use_external_keys() {
    let json = r#"{ "CAR_SPAWN_RATE": 8, "GREEN_DURATION": 12.5 }"#;
    let settings: Settings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.car_spawn_rate, 8.0);
    assert_eq!(settings.green_duration, 12.5);
    assert_eq!(settings.car_speed, Settings::default().car_speed);

    let value = serde_json::to_value(Settings::default()).unwrap();
    assert_eq!(value["MIN_GREEN_TIME"], 5.0);
    assert_eq!(value["DETECTOR_DISTANCE"], 150.0);
}
