use crate::intersection::{Intersection, IntersectionAttributes};
use crate::light::{LightStates, Phase, SignalController, SignalMode};
use crate::routing::{Router, Scenario};
use crate::sensor::{SensorSnapshot, SensorSystem};
use crate::vehicle::{Occupancy, VEHICLE_COLORS};
use crate::{Direction, Lane, Route, Settings, Vehicle, VehicleId, VehicleSnapshot};
use cgmath::MetricSpace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// New vehicles are not spawned while another vehicle in the same lane is this close
/// to the spawn point.
const SPAWN_CLEARANCE: f64 = 60.0;

/// Called with each vehicle as it is removed on completion.
type CompletionCallback = Box<dyn FnMut(&Vehicle)>;

/// A simulation of a single signalised intersection.
pub struct Simulation {
    /// The intersection geometry.
    intersection: Intersection,
    /// The current settings.
    settings: Settings,
    /// The traffic signals.
    lights: SignalController,
    /// The vehicle detectors.
    sensors: SensorSystem,
    /// Chooses routes for new vehicles.
    router: Router,
    /// The routing scenario used for spawned vehicles.
    scenario: Scenario,
    /// The vehicles being simulated, in spawn order.
    vehicles: Vec<Vehicle>,
    /// The ID of the next vehicle to be added.
    next_id: u64,
    /// The time since the last spawn in s.
    spawn_timer: f64,
    /// The total simulated time in s.
    time: f64,
    /// The current frame of simulation.
    frame: usize,
    /// The number of vehicles removed since the last reset.
    completed: usize,
    /// Called as each completed vehicle is removed.
    on_completed: Option<CompletionCallback>,
    /// The source of randomness for spawning and routing.
    rng: StdRng,
}

impl Simulation {
    /// Creates a new simulation seeded from the operating system.
    pub fn new(attributes: &IntersectionAttributes, settings: Settings) -> Self {
        Self::with_rng(attributes, settings, StdRng::from_entropy())
    }

    /// Creates a new simulation with a fixed seed, so runs are reproducible.
    pub fn with_seed(attributes: &IntersectionAttributes, settings: Settings, seed: u64) -> Self {
        Self::with_rng(attributes, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(attributes: &IntersectionAttributes, settings: Settings, rng: StdRng) -> Self {
        Self {
            intersection: Intersection::new(attributes),
            settings,
            lights: SignalController::new(SignalMode::default()),
            sensors: SensorSystem::new(),
            router: Router::new(),
            scenario: Scenario::default(),
            vehicles: vec![],
            next_id: 1,
            spawn_timer: 0.0,
            time: 0.0,
            frame: 0,
            completed: 0,
            on_completed: None,
            rng,
        }
    }

    /// Advances the simulation by `dt` seconds with the given mode and settings.
    pub fn tick(&mut self, dt: f64, mode: SignalMode, settings: &Settings) {
        self.settings = *settings;
        self.lights.set_mode(mode);
        self.step(dt);
    }

    /// Advances the simulation by `dt` seconds with the current mode and settings.
    ///
    /// The lights are resolved before any vehicle moves, using the detector
    /// readings from the end of the previous frame.
    pub fn step(&mut self, dt: f64) {
        if !(dt.is_finite() && dt >= 0.0) {
            log::warn!("ignoring invalid time step {}", dt);
            return;
        }
        self.time += dt;
        self.frame += 1;

        self.lights.step(dt, &self.settings, self.sensors.snapshot());
        self.update_vehicles(dt);
        self.remove_completed();
        self.spawn(dt);
        self.sensors.update(
            &self.intersection,
            self.settings.detector_distance,
            &self.vehicles,
        );
    }

    /// Moves every vehicle against the positions of the others at the start of the frame.
    fn update_vehicles(&mut self, dt: f64) {
        let lights = self.lights.states();
        let occupancy = Occupancy::new(&self.vehicles);
        for vehicle in &mut self.vehicles {
            vehicle.set_max_speed(self.settings.car_speed);
            vehicle.update(dt, self.time, &lights, &self.intersection, &occupancy);
        }
    }

    /// Removes vehicles which have left the playfield.
    fn remove_completed(&mut self) {
        let callback = &mut self.on_completed;
        let mut removed = 0;
        self.vehicles.retain(|vehicle| {
            if !vehicle.is_completed() {
                return true;
            }
            log::debug!(
                "vehicle {} completed after waiting {:.2}s",
                vehicle.id(),
                vehicle.wait_time()
            );
            if let Some(callback) = callback.as_mut() {
                callback(vehicle);
            }
            removed += 1;
            false
        });
        self.completed += removed;
    }

    /// Spawns a vehicle on a random approach once the spawn interval has elapsed.
    fn spawn(&mut self, dt: f64) {
        let Some(interval) = self.settings.spawn_interval() else {
            return;
        };
        self.spawn_timer += dt;
        if self.spawn_timer < interval {
            return;
        }
        self.spawn_timer = 0.0;

        let from = Direction::from_index(self.rng.gen_range(0..4));
        let route = self.router.route_for_scenario(
            self.scenario,
            from,
            self.settings.turn_rate,
            &mut self.rng,
        );
        let lane = match route.turn_type().required_lane() {
            Some(lane) => lane,
            None if self.rng.gen_bool(0.5) => Lane::Left,
            None => Lane::Right,
        };
        if self.add_vehicle(route, lane).is_none() {
            log::debug!("spawn from {} skipped, {:?} lane is occupied", from, lane);
        }
    }

    /// Checks that no vehicle in a lane is near its spawn point.
    fn is_clear(&self, direction: Direction, lane: Lane) -> bool {
        let spawn = self.intersection.spawn_point(direction, lane);
        !self.vehicles.iter().any(|vehicle| {
            vehicle.from_direction() == direction
                && vehicle.lane() == lane
                && vehicle.position().distance(spawn) < SPAWN_CLEARANCE
        })
    }

    /// Adds a vehicle at the spawn point of a lane, unless another vehicle is too close.
    pub fn add_vehicle(&mut self, route: Route, lane: Lane) -> Option<VehicleId> {
        if !self.is_clear(route.from(), lane) {
            return None;
        }
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        let color = VEHICLE_COLORS[self.rng.gen_range(0..VEHICLE_COLORS.len())];
        let vehicle = Vehicle::new(
            id,
            route,
            lane,
            self.settings.car_speed,
            color,
            &self.intersection,
        );
        log::debug!("spawned vehicle {} {} -> {} in {:?} lane", id, route.from(), route.to(), lane);
        self.vehicles.push(vehicle);
        Some(id)
    }

    /// Removes every vehicle and restarts the lights and clock.
    /// Vehicle IDs carry on from where they were, so they are never reused.
    pub fn reset(&mut self) {
        self.vehicles.clear();
        self.spawn_timer = 0.0;
        self.time = 0.0;
        self.frame = 0;
        self.completed = 0;
        self.lights.reset();
        self.sensors.reset();
    }

    /// Sets the callback fired with each vehicle as it is removed on completion,
    /// replacing any previous one.
    pub fn on_car_completed(&mut self, callback: impl FnMut(&Vehicle) + 'static) {
        self.on_completed = Some(Box::new(callback));
    }

    /// The colour shown to each approach.
    pub fn light_states(&self) -> LightStates {
        self.lights.states()
    }

    /// Copies of the parts of every vehicle needed to draw them.
    pub fn vehicle_snapshots(&self) -> Vec<VehicleSnapshot> {
        self.vehicles.iter().map(Vehicle::snapshot).collect()
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id() == vehicle_id)
    }

    /// The number of vehicles in the simulation.
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// The vehicles waiting on an approach.
    pub fn waiting_vehicles(&self, direction: Direction) -> impl Iterator<Item = &Vehicle> {
        self.vehicles
            .iter()
            .filter(move |vehicle| vehicle.from_direction() == direction && vehicle.is_waiting())
    }

    /// The number of vehicles removed on completion since the last reset.
    pub fn completed_count(&self) -> usize {
        self.completed
    }

    /// Changes the signal mode, restarting the cycle if it differs.
    pub fn set_mode(&mut self, mode: SignalMode) {
        self.lights.set_mode(mode);
    }

    /// The current signal mode.
    pub fn mode(&self) -> SignalMode {
        self.lights.mode()
    }

    /// Replaces the settings.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// The current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sets the routing scenario used for spawned vehicles.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    /// The routing scenario used for spawned vehicles.
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Sets the relative likelihood of each turn type for random routes.
    /// Only the left:right ratio changes which routes are drawn.
    pub fn update_turn_probabilities(&mut self, straight: f64, left: f64, right: f64) {
        self.router.update_turn_probabilities(straight, left, right);
    }

    /// The router used for spawned vehicles.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Jumps the lights straight to a phase.
    pub fn force_phase(&mut self, phase: Phase) {
        self.lights.force_phase(phase);
    }

    /// The signal controller.
    pub fn controller(&self) -> &SignalController {
        &self.lights
    }

    /// The detector readings from the end of the last frame.
    pub fn sensor_snapshot(&self) -> &SensorSnapshot {
        self.sensors.snapshot()
    }

    /// The vehicle detectors.
    pub fn sensors(&self) -> &SensorSystem {
        &self.sensors
    }

    /// Mutable access to the vehicle detectors, for resetting their counts.
    pub fn sensors_mut(&mut self) -> &mut SensorSystem {
        &mut self.sensors
    }

    /// The intersection geometry.
    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    /// The total simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }
}
