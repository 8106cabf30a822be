use self::acceleration::{APPROACH, LANE_CHANGE, TURNING};
use crate::intersection::{Intersection, Trajectory};
use crate::light::{LightColor, LightStates};
use crate::math::{heading_vector, lerp, Point2d};
use crate::{Direction, Lane, Route, TurnType, VehicleId};
pub use following::TrafficView;
pub(crate) use following::Occupancy;

mod acceleration;
mod following;

/// Stop for a red light when at most this far before the stop line.
const STOPPING_MARGIN: f64 = 30.0;

/// Stop when the vehicle ahead is closer than this, whatever the light shows.
const FOLLOWING_GAP: f64 = 35.0;

/// Lane changes are considered once the vehicle is within this distance of the intersection box...
const LANE_CHANGE_DISTANCE: f64 = 100.0;

/// ...but not once it is this close.
const LANE_CHANGE_CUTOFF: f64 = 50.0;

/// Duration of a lane change in s.
const LANE_CHANGE_DURATION: f64 = 0.5;

/// Fraction of a trajectory covered per second.
const TRAJECTORY_RATE: f64 = 0.8;

/// How far beyond the playfield a vehicle must travel before it is completed.
const EXIT_MARGIN: f64 = 50.0;

/// The colours vehicles are painted in.
pub const VEHICLE_COLORS: [[u8; 3]; 8] = [
    [0xe7, 0x4c, 0x3c],
    [0x34, 0x98, 0xdb],
    [0x2e, 0xcc, 0x71],
    [0xf3, 0x9c, 0x12],
    [0x9b, 0x59, 0xb6],
    [0x1a, 0xbc, 0x9c],
    [0xec, 0xf0, 0xf1],
    [0x34, 0x49, 0x5e],
];

/// The behavioural state of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VehicleState {
    Approaching,
    LaneChanging,
    Waiting,
    Turning,
    Exiting,
    Completed,
}

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    id: VehicleId,
    /// Where the vehicle came from and is going.
    route: Route,
    /// The turn type of the route.
    turn_type: TurnType,
    /// The lane the vehicle is in.
    lane: Lane,
    /// The lane the vehicle is heading for.
    target_lane: Lane,
    /// The in-progress lane change, if there is one.
    lane_change: Option<LaneChange>,
    /// Whether the vehicle has already decided whether to change lanes.
    lane_change_checked: bool,
    /// Lane-centre-relative lateral offset, in `[-0.5, 0.5]`.
    lateral_offset: f64,
    /// The world space coordinates of the vehicle.
    pos: Point2d,
    /// The heading in radians.
    heading: f64,
    /// The speed in units/s.
    speed: f64,
    /// The maximum speed in units/s.
    max_speed: f64,
    /// The current behavioural state.
    state: VehicleState,
    /// The simulation time at which the current wait started.
    wait_start: Option<f64>,
    /// The time spent waiting in all previous waits, in s.
    past_waits: f64,
    /// The duration of the current wait, in s.
    current_wait: f64,
    /// The path through the intersection, while turning.
    trajectory: Option<Trajectory>,
    /// How far along `trajectory` the vehicle is, in `[0, 1]`.
    trajectory_progress: f64,
    /// Whether a trajectory has been assigned.
    trajectory_started: bool,
    /// Whether the vehicle was in the intersection box after its last update.
    in_intersection: bool,
    /// The paint color.
    color: [u8; 3],
}

/// Represents an in-progress lane change.
#[derive(Clone, Copy, Debug)]
struct LaneChange {
    /// The world space lateral coordinate of the lane being left.
    from: f64,
    /// The world space lateral coordinate of the lane being entered.
    to: f64,
    /// Progress through the lane change, in `[0, 1]`.
    progress: f64,
}

/// A copy of the parts of a vehicle needed to draw it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub position: Point2d,
    pub heading: f64,
    pub turn_type: TurnType,
    pub lane: Lane,
    pub lateral_offset: f64,
    pub color: [u8; 3],
    pub state: VehicleState,
    pub waiting: bool,
    pub completed: bool,
}

impl Vehicle {
    /// Creates a new vehicle at the spawn point of its lane.
    pub(crate) fn new(
        id: VehicleId,
        route: Route,
        lane: Lane,
        max_speed: f64,
        color: [u8; 3],
        intersection: &Intersection,
    ) -> Self {
        let from = route.from();
        Self {
            id,
            route,
            turn_type: route.turn_type(),
            lane,
            target_lane: lane,
            lane_change: None,
            lane_change_checked: false,
            lateral_offset: lane.lateral_offset(),
            pos: intersection.spawn_point(from, lane),
            heading: from.inbound_heading(),
            speed: 0.0,
            max_speed,
            state: VehicleState::Approaching,
            wait_start: None,
            past_waits: 0.0,
            current_wait: 0.0,
            trajectory: None,
            trajectory_progress: 0.0,
            trajectory_started: false,
            in_intersection: false,
            color,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's route.
    pub fn route(&self) -> Route {
        self.route
    }

    /// The direction the vehicle entered from.
    pub fn from_direction(&self) -> Direction {
        self.route.from()
    }

    /// The direction the vehicle is leaving towards.
    pub fn to_direction(&self) -> Direction {
        self.route.to()
    }

    /// The turn type of the vehicle's route.
    pub fn turn_type(&self) -> TurnType {
        self.turn_type
    }

    /// The lane the vehicle is in.
    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// The lane the vehicle is heading for.
    pub fn target_lane(&self) -> Lane {
        self.target_lane
    }

    /// The lane-centre-relative lateral offset, in `[-0.5, 0.5]`.
    pub fn lateral_offset(&self) -> f64 {
        self.lateral_offset
    }

    /// The coordinates in world space of the vehicle.
    pub fn position(&self) -> Point2d {
        self.pos
    }

    /// The vehicle's heading in radians.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The vehicle's speed in units/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The vehicle's maximum speed in units/s.
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// The current behavioural state.
    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// The vehicle's paint color.
    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    /// Whether the vehicle is waiting.
    pub fn is_waiting(&self) -> bool {
        self.state == VehicleState::Waiting
    }

    /// Whether the vehicle has left the playfield.
    pub fn is_completed(&self) -> bool {
        self.state == VehicleState::Completed
    }

    /// The total time the vehicle has spent waiting, in s.
    pub fn wait_time(&self) -> f64 {
        self.past_waits + self.current_wait
    }

    /// The duration of the vehicle's current wait in s, or zero if it isn't waiting.
    pub fn current_wait(&self) -> f64 {
        self.current_wait
    }

    /// The path the vehicle is following through the intersection.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// How far along its trajectory the vehicle is, in `[0, 1]`.
    pub fn trajectory_progress(&self) -> f64 {
        self.trajectory_progress
    }

    /// Whether the vehicle was in the intersection box after its last update.
    pub fn in_intersection(&self) -> bool {
        self.in_intersection
    }

    /// Takes a copy of the parts of the vehicle needed to draw it.
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id,
            position: self.pos,
            heading: self.heading,
            turn_type: self.turn_type,
            lane: self.lane,
            lateral_offset: self.lateral_offset,
            color: self.color,
            state: self.state,
            waiting: self.is_waiting(),
            completed: self.is_completed(),
        }
    }

    /// Sets the vehicle's maximum speed.
    pub(crate) fn set_max_speed(&mut self, max_speed: f64) {
        self.max_speed = max_speed;
    }

    /// Advances the vehicle by one frame.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    /// * `now` - The simulation time at the end of this step
    /// * `lights` - The light shown to each approach
    /// * `intersection` - The intersection geometry
    /// * `traffic` - The other vehicles, as they were at the start of the frame
    pub fn update(
        &mut self,
        dt: f64,
        now: f64,
        lights: &LightStates,
        intersection: &Intersection,
        traffic: &(impl TrafficView + ?Sized),
    ) {
        if !self.lane_change_checked && self.in_lane_change_band(intersection) {
            self.lane_change_checked = true;
            self.prepare_lane_change(intersection);
        }

        let prev_state = self.state;
        match self.state {
            VehicleState::Approaching => {
                self.update_approaching(dt, now, lights, intersection, traffic)
            }
            VehicleState::LaneChanging => {
                self.update_lane_changing(dt, now, lights, intersection, traffic)
            }
            VehicleState::Waiting => self.update_waiting(now, lights),
            VehicleState::Turning => self.update_turning(dt),
            VehicleState::Exiting => self.update_exiting(intersection),
            VehicleState::Completed => {}
        }
        if self.state != prev_state {
            log::trace!("vehicle {} {:?} -> {:?}", self.id, prev_state, self.state);
        }

        if self.state == VehicleState::Turning {
            self.follow_trajectory(dt);
        } else if self.speed > 0.0 {
            self.pos += self.speed * dt * heading_vector(self.heading);
        }

        self.in_intersection = intersection.contains(self.pos);
    }

    /// Whether the vehicle is close enough to the intersection to prepare for its turn.
    fn in_lane_change_band(&self, intersection: &Intersection) -> bool {
        let dist = intersection.distance_to_box(self.from_direction(), self.pos);
        dist > LANE_CHANGE_CUTOFF && dist <= LANE_CHANGE_DISTANCE
    }

    /// Starts a lane change if the vehicle is not in the lane its turn requires.
    fn prepare_lane_change(&mut self, intersection: &Intersection) {
        let Some(required) = self.turn_type.required_lane() else {
            return;
        };
        if required == self.lane || self.lane_change.is_some() {
            return;
        }
        let from = self.from_direction();
        let lateral = |p: Point2d| if from.is_vertical() { p.x } else { p.y };
        self.target_lane = required;
        self.lane_change = Some(LaneChange {
            from: lateral(intersection.spawn_point(from, self.lane)),
            to: lateral(intersection.spawn_point(from, required)),
            progress: 0.0,
        });
        // A waiting vehicle picks the lane change up once it moves off
        if self.state == VehicleState::Approaching {
            self.state = VehicleState::LaneChanging;
        }
    }

    /// Whether the vehicle must stop before its stop line, either for a red light
    /// or because the vehicle ahead is too close.
    fn must_stop(
        &self,
        lights: &LightStates,
        intersection: &Intersection,
        traffic: &(impl TrafficView + ?Sized),
    ) -> bool {
        let from = self.from_direction();
        let to_stop_line = intersection.distance_to_stop_line(from, self.pos);
        let at_stop_line = (0.0..=STOPPING_MARGIN).contains(&to_stop_line);
        let blocked = traffic
            .gap_ahead(self)
            .map_or(false, |gap| gap < FOLLOWING_GAP);
        blocked || (at_stop_line && lights[from] == LightColor::Red)
    }

    fn update_approaching(
        &mut self,
        dt: f64,
        now: f64,
        lights: &LightStates,
        intersection: &Intersection,
        traffic: &(impl TrafficView + ?Sized),
    ) {
        // Resume a lane change which was interrupted by a stop
        if self.lane_change.is_some() {
            self.state = VehicleState::LaneChanging;
            return self.update_lane_changing(dt, now, lights, intersection, traffic);
        }

        if self.must_stop(lights, intersection, traffic) {
            self.begin_wait(now);
            return;
        }

        self.speed = APPROACH.accelerate(self.speed, self.max_speed, dt);

        if self.in_intersection && !self.trajectory_started {
            self.start_turning(intersection);
        }
    }

    fn update_lane_changing(
        &mut self,
        dt: f64,
        now: f64,
        lights: &LightStates,
        intersection: &Intersection,
        traffic: &(impl TrafficView + ?Sized),
    ) {
        let Some(mut lc) = self.lane_change else {
            self.state = VehicleState::Approaching;
            return;
        };

        lc.progress += dt / LANE_CHANGE_DURATION;
        if lc.progress >= 1.0 || self.in_intersection {
            self.finish_lane_change(lc);
        } else {
            self.lane_change = Some(lc);
            self.set_lateral(lerp(lc.from, lc.to, lc.progress));
            self.lateral_offset = lerp(
                self.lane.lateral_offset(),
                self.target_lane.lateral_offset(),
                lc.progress,
            );
        }

        self.speed = LANE_CHANGE.accelerate(self.speed, self.max_speed, dt);

        if self.must_stop(lights, intersection, traffic) {
            self.begin_wait(now);
        } else if self.in_intersection && !self.trajectory_started {
            self.start_turning(intersection);
        }
    }

    /// Commits the target lane and returns to approaching.
    fn finish_lane_change(&mut self, lc: LaneChange) {
        self.set_lateral(lc.to);
        self.lane = self.target_lane;
        self.lateral_offset = self.lane.lateral_offset();
        self.lane_change = None;
        self.state = VehicleState::Approaching;
    }

    /// Sets the world space coordinate perpendicular to the approach.
    fn set_lateral(&mut self, value: f64) {
        if self.from_direction().is_vertical() {
            self.pos.x = value;
        } else {
            self.pos.y = value;
        }
    }

    fn begin_wait(&mut self, now: f64) {
        self.state = VehicleState::Waiting;
        self.speed = 0.0;
        self.wait_start = Some(now);
        self.current_wait = 0.0;
    }

    fn update_waiting(&mut self, now: f64, lights: &LightStates) {
        self.speed = 0.0;
        if lights[self.from_direction()] != LightColor::Red {
            self.past_waits += self.current_wait;
            self.current_wait = 0.0;
            self.wait_start = None;
            self.state = VehicleState::Approaching;
        } else if let Some(start) = self.wait_start {
            self.current_wait = now - start;
        }
    }

    fn start_turning(&mut self, intersection: &Intersection) {
        let (from, to) = (self.from_direction(), self.to_direction());
        let trajectory = intersection
            .trajectory(from, to, self.turn_type)
            .unwrap_or_else(|| {
                log::warn!(
                    "no {:?} trajectory from {} to {}, going straight",
                    self.turn_type,
                    from,
                    to
                );
                intersection.straight_trajectory(from, to)
            });
        self.state = VehicleState::Turning;
        self.trajectory = Some(trajectory);
        self.trajectory_progress = 0.0;
        self.trajectory_started = true;
    }

    fn update_turning(&mut self, dt: f64) {
        self.speed = TURNING.accelerate(self.speed, self.max_speed, dt);

        if self.trajectory_progress >= 1.0 {
            self.trajectory = None;
            self.state = VehicleState::Exiting;
            self.heading = self.to_direction().outbound_heading();
            self.lane = self.turn_type.exit_lane(self.lane);
            self.target_lane = self.lane;
            self.lateral_offset = self.lane.lateral_offset();
        }
    }

    fn update_exiting(&mut self, intersection: &Intersection) {
        self.speed = self.max_speed;
        if intersection.is_beyond_playfield(self.pos, EXIT_MARGIN) {
            self.state = VehicleState::Completed;
        }
    }

    /// Moves the vehicle along its trajectory.
    fn follow_trajectory(&mut self, dt: f64) {
        let Some(trajectory) = &self.trajectory else {
            return;
        };
        self.trajectory_progress = f64::min(self.trajectory_progress + TRAJECTORY_RATE * dt, 1.0);
        self.pos = trajectory.sample(self.trajectory_progress);
        if let Some(heading) = trajectory.heading_at(self.trajectory_progress) {
            self.heading = heading;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::intersection::IntersectionAttributes;
    use crate::light::Phase;
    use assert_approx_eq::assert_approx_eq;

    const DT: f64 = 0.05;

    fn setup() -> Intersection {
        Intersection::new(&IntersectionAttributes::default())
    }

    fn vehicle(id: u64, from: Direction, to: Direction, lane: Lane, ix: &Intersection) -> Vehicle {
        let route = Route::new(from, to).unwrap();
        Vehicle::new(VehicleId(id), route, lane, 60.0, VEHICLE_COLORS[0], ix)
    }

    /// Steps a lone vehicle until `done` returns true, returning the number of steps taken.
    fn run_until(
        veh: &mut Vehicle,
        lights: &LightStates,
        ix: &Intersection,
        now: &mut f64,
        mut done: impl FnMut(&Vehicle) -> bool,
    ) -> usize {
        let nobody: &[Vehicle] = &[];
        for step in 0..5000 {
            if done(veh) {
                return step;
            }
            *now += DT;
            veh.update(DT, *now, lights, ix, nobody);
        }
        panic!("condition never reached; vehicle is {:?}", veh.state());
    }

    #[test]
    fn stops_at_red_light() {
        let ix = setup();
        let red = Phase::new(0).light_states();
        let mut veh = vehicle(1, Direction::North, Direction::South, Lane::Left, &ix);
        let mut now = 0.0;
        run_until(&mut veh, &red, &ix, &mut now, |v| v.is_waiting());
        let to_line = ix.distance_to_stop_line(Direction::North, veh.position());
        assert!((0.0..=STOPPING_MARGIN).contains(&to_line));
        assert_eq!(veh.speed(), 0.0);

        let mut last_wait = veh.wait_time();
        for _ in 0..40 {
            now += DT;
            veh.update(DT, now, &red, &ix, &[] as &[Vehicle]);
            assert!(veh.wait_time() >= last_wait);
            assert!(veh.is_waiting());
            last_wait = veh.wait_time();
        }
        assert_approx_eq!(veh.wait_time(), 40.0 * DT, 1e-9);
    }

    #[test]
    fn yellow_light_permits_proceeding() {
        let ix = setup();
        let yellow = Phase::new(5).light_states();
        let mut veh = vehicle(1, Direction::South, Direction::North, Lane::Right, &ix);
        let mut now = 0.0;
        run_until(&mut veh, &yellow, &ix, &mut now, |v| {
            v.state() == VehicleState::Turning
        });
        assert_eq!(veh.wait_time(), 0.0);
    }

    #[test]
    fn follows_vehicle_ahead() {
        let ix = setup();
        let green = Phase::new(0).light_states();
        let leader = vehicle(1, Direction::West, Direction::East, Lane::Left, &ix);
        let mut follower = vehicle(2, Direction::West, Direction::East, Lane::Left, &ix);
        let traffic = [leader];
        follower.update(DT, DT, &green, &ix, &traffic[..]);
        // The leader is level with the follower, so not strictly ahead
        assert_eq!(follower.state(), VehicleState::Approaching);

        let mut leader = traffic[0].clone();
        leader.pos.x += 20.0;
        let traffic = [leader];
        follower.update(DT, 2.0 * DT, &green, &ix, &traffic[..]);
        assert!(follower.is_waiting());
        assert_eq!(follower.speed(), 0.0);
    }

    #[test]
    fn other_lane_does_not_block() {
        let ix = setup();
        let green = Phase::new(0).light_states();
        let mut leader = vehicle(1, Direction::West, Direction::East, Lane::Right, &ix);
        leader.pos.x += 10.0;
        let mut follower = vehicle(2, Direction::West, Direction::East, Lane::Left, &ix);
        follower.update(DT, DT, &green, &ix, &[leader][..]);
        assert_eq!(follower.state(), VehicleState::Approaching);
        assert!(follower.speed() > 0.0);
    }

    #[test]
    fn changes_lane_before_turning() {
        let ix = setup();
        let green = Phase::new(4).light_states();
        let mut veh = vehicle(1, Direction::North, Direction::West, Lane::Right, &ix);
        let start_x = veh.position().x;
        let mut now = 0.0;
        run_until(&mut veh, &green, &ix, &mut now, |v| {
            v.state() == VehicleState::LaneChanging
        });
        assert_eq!(veh.target_lane(), Lane::Left);
        run_until(&mut veh, &green, &ix, &mut now, |v| v.lane() == Lane::Left);
        assert_eq!(veh.state(), VehicleState::Approaching);
        assert_approx_eq!(veh.position().x, start_x - ix.lane_width());
        assert_approx_eq!(veh.lateral_offset(), -0.5);
        assert!(ix.distance_to_stop_line(Direction::North, veh.position()) > 0.0);
    }

    /// Steps every vehicle against a snapshot of the others.
    fn step_all(
        vehicles: &mut [Vehicle],
        lights: &LightStates,
        ix: &Intersection,
        now: &mut f64,
    ) {
        *now += DT;
        let others = vehicles.to_vec();
        for veh in vehicles.iter_mut() {
            veh.update(DT, *now, lights, ix, &others[..]);
        }
    }

    #[test]
    fn queue_interrupts_lane_change() {
        let ix = setup();
        let red = Phase::new(0).light_states();
        let green = Phase::new(4).light_states();
        let mut turner = vehicle(3, Direction::North, Direction::West, Lane::Right, &ix);
        let mut now = 0.0;
        run_until(&mut turner, &red, &ix, &mut now, |v| {
            v.state() == VehicleState::LaneChanging
        });

        // Two stopped vehicles in the turner's lane, the nearer one blocking it
        let lane_x = ix.spawn_point(Direction::North, Lane::Right).x;
        let stop_y = ix.stop_line(Direction::North).midpoint().y;
        let mut front = vehicle(1, Direction::North, Direction::South, Lane::Right, &ix);
        front.pos = Point2d::new(lane_x, stop_y - 15.0);
        front.begin_wait(now);
        let mut behind = vehicle(2, Direction::North, Direction::South, Lane::Right, &ix);
        behind.pos = Point2d::new(lane_x, turner.position().y + 20.0);
        behind.begin_wait(now);
        let mut vehicles = vec![front, behind, turner];

        step_all(&mut vehicles, &red, &ix, &mut now);
        let offset = vehicles[2].lateral_offset();
        assert!(offset > -0.5 && offset < 0.5);
        let mut wait = 0.0;
        for _ in 0..100 {
            step_all(&mut vehicles, &red, &ix, &mut now);
            let turner = &vehicles[2];
            assert!(turner.is_waiting());
            assert!(turner.lane_change.is_some());
            assert_eq!(turner.lane(), Lane::Right);
            assert_eq!(turner.target_lane(), Lane::Left);
            assert_eq!(turner.lateral_offset(), offset);
            assert!(turner.current_wait() > wait);
            wait = turner.current_wait();
        }

        let mut turned = false;
        for _ in 0..2000 {
            step_all(&mut vehicles, &green, &ix, &mut now);
            let turner = &vehicles[2];
            if turner.state() == VehicleState::Turning {
                assert_eq!(turner.lane(), Lane::Left, "turned from the wrong lane");
                assert!(turner.lane_change.is_none());
                turned = true;
            }
            if turner.state() == VehicleState::Exiting {
                break;
            }
        }
        assert!(turned);
        assert_eq!(vehicles[2].state(), VehicleState::Exiting);
        assert_eq!(vehicles[2].lane(), Lane::Right);
    }

    #[test]
    fn straight_vehicles_keep_their_lane() {
        let ix = setup();
        let green = Phase::new(0).light_states();
        let mut veh = vehicle(1, Direction::East, Direction::West, Lane::Right, &ix);
        let mut now = 0.0;
        run_until(&mut veh, &green, &ix, &mut now, |v| {
            v.state() == VehicleState::Turning
        });
        assert_eq!(veh.lane(), Lane::Right);
    }

    #[test]
    fn left_turn_exits_into_right_lane() {
        let ix = setup();
        let green = Phase::new(4).light_states();
        let mut veh = vehicle(1, Direction::North, Direction::West, Lane::Left, &ix);
        let mut now = 0.0;
        run_until(&mut veh, &green, &ix, &mut now, |v| {
            v.state() == VehicleState::Turning
        });

        let mut progress = veh.trajectory_progress();
        run_until(&mut veh, &green, &ix, &mut now, |v| {
            assert!(v.trajectory_progress() >= progress);
            progress = v.trajectory_progress();
            v.state() == VehicleState::Exiting
        });
        assert_eq!(veh.lane(), Lane::Right);
        assert_approx_eq!(veh.lateral_offset(), 0.5);
        assert_approx_eq!(veh.heading(), Direction::West.outbound_heading());

        run_until(&mut veh, &green, &ix, &mut now, |v| v.is_completed());
        assert!(veh.position().x < -EXIT_MARGIN);
    }

    #[test]
    fn right_turn_exits_into_left_lane() {
        let ix = setup();
        let green = Phase::new(0).light_states();
        let mut veh = vehicle(1, Direction::West, Direction::North, Lane::Right, &ix);
        let mut now = 0.0;
        run_until(&mut veh, &green, &ix, &mut now, |v| {
            v.state() == VehicleState::Exiting
        });
        assert_eq!(veh.lane(), Lane::Left);
        assert_eq!(veh.trajectory_progress(), 1.0);
        assert!(veh.trajectory().is_none());
    }
}
