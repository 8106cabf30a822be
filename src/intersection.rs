use crate::math::{
    vector_heading, CubicBezier2d, LineSegment2d, ParametricCurve2d, Point2d, Vector2d,
};
use crate::util::Interval;
use crate::{Direction, Lane, TurnType};
use arrayvec::ArrayVec;

/// The number of segments a trajectory through the intersection is divided into.
pub const TRAJECTORY_SEGMENTS: usize = 20;

/// The number of sample points in a trajectory.
pub const TRAJECTORY_POINTS: usize = TRAJECTORY_SEGMENTS + 1;

/// Distance of the stop lines beyond the edge of the intersection box.
const STOP_LINE_SETBACK: f64 = 5.0;

/// How far ahead along a trajectory to look when computing a heading.
const HEADING_LOOKAHEAD: f64 = 0.05;

/// The static geometry of a four-way intersection.
#[derive(Clone, Debug)]
pub struct Intersection {
    /// The centre of the intersection.
    centre: Point2d,
    /// The extents of the playfield.
    bounds: [Interval<f64>; 2],
    /// The size of the intersection box.
    size: f64,
    /// The total width of each road.
    road_width: f64,
    /// The width of a single lane.
    lane_width: f64,
    /// The stop line on each approach.
    stop_lines: [LineSegment2d; 4],
    /// The spawn point of each lane on each approach.
    spawn_points: [[Point2d; 2]; 4],
}

/// The attributes of an intersection.
#[derive(Clone, Copy, Debug)]
pub struct IntersectionAttributes {
    /// The centre of the intersection.
    pub centre: Point2d,
    /// The width of the playfield.
    pub width: f64,
    /// The height of the playfield.
    pub height: f64,
    /// The size of the intersection box.
    pub size: f64,
    /// The total width of each road.
    pub road_width: f64,
    /// The width of a single lane.
    pub lane_width: f64,
}

/// A sampled path through the intersection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trajectory {
    points: ArrayVec<Point2d, TRAJECTORY_POINTS>,
}

impl Default for IntersectionAttributes {
    fn default() -> Self {
        let (width, height) = (1200.0, 800.0);
        Self {
            centre: Point2d::new(0.5 * width, 0.5 * height),
            width,
            height,
            size: 120.0,
            road_width: 120.0,
            lane_width: 30.0,
        }
    }
}

impl Intersection {
    /// Creates the geometry of an intersection.
    pub fn new(attributes: &IntersectionAttributes) -> Self {
        let IntersectionAttributes {
            centre,
            width,
            height,
            size,
            road_width,
            lane_width,
        } = *attributes;
        let (cx, cy) = (centre.x, centre.y);
        let half_road = 0.5 * road_width;
        let lane_offset = 0.5 * lane_width;
        let setback = 0.5 * size + STOP_LINE_SETBACK;

        let stop_lines = Direction::ALL.map(|direction| {
            let (start, end) = match direction {
                Direction::North => (
                    Point2d::new(cx - half_road, cy - setback),
                    Point2d::new(cx + half_road, cy - setback),
                ),
                Direction::East => (
                    Point2d::new(cx + setback, cy - half_road),
                    Point2d::new(cx + setback, cy + half_road),
                ),
                Direction::South => (
                    Point2d::new(cx - half_road, cy + setback),
                    Point2d::new(cx + half_road, cy + setback),
                ),
                Direction::West => (
                    Point2d::new(cx - setback, cy - half_road),
                    Point2d::new(cx - setback, cy + half_road),
                ),
            };
            LineSegment2d::from_ends(start, end)
        });

        let spawn_points = Direction::ALL.map(|direction| {
            Lane::ALL.map(|lane| {
                let sign = match lane {
                    Lane::Left => -1.0,
                    Lane::Right => 1.0,
                };
                match direction {
                    Direction::North => Point2d::new(cx + sign * lane_offset, 0.0),
                    Direction::East => Point2d::new(width, cy + sign * lane_offset),
                    Direction::South => Point2d::new(cx - sign * lane_offset, height),
                    Direction::West => Point2d::new(0.0, cy - sign * lane_offset),
                }
            })
        });

        Self {
            centre,
            bounds: [Interval::new(0.0, width), Interval::new(0.0, height)],
            size,
            road_width,
            lane_width,
            stop_lines,
            spawn_points,
        }
    }

    /// The centre of the intersection.
    pub fn centre(&self) -> Point2d {
        self.centre
    }

    /// The size of the intersection box.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// The total width of each road.
    pub fn road_width(&self) -> f64 {
        self.road_width
    }

    /// The width of a single lane.
    pub fn lane_width(&self) -> f64 {
        self.lane_width
    }

    /// The horizontal and vertical extents of the playfield.
    pub fn bounds(&self) -> [Interval<f64>; 2] {
        self.bounds
    }

    /// The stop line on the given approach.
    pub fn stop_line(&self, direction: Direction) -> LineSegment2d {
        self.stop_lines[direction.index()]
    }

    /// The point at the edge of the playfield where vehicles in the given lane enter.
    pub fn spawn_point(&self, direction: Direction, lane: Lane) -> Point2d {
        self.spawn_points[direction.index()][lane.index()]
    }

    /// The point at the edge of the playfield where vehicles in the given lane leave.
    pub fn exit_point(&self, direction: Direction, lane: Lane) -> Point2d {
        self.spawn_point(direction, lane)
    }

    /// Where the traffic light for the given approach is drawn.
    pub fn light_position(&self, direction: Direction) -> Point2d {
        let (cx, cy) = (self.centre.x, self.centre.y);
        let half_size = 0.5 * self.size;
        match direction {
            Direction::North => Point2d::new(cx - 25.0, cy - half_size - 40.0),
            Direction::East => Point2d::new(cx + half_size + 15.0, cy - 25.0),
            Direction::South => Point2d::new(cx + 25.0, cy + half_size + 15.0),
            Direction::West => Point2d::new(cx - half_size - 40.0, cy + 25.0),
        }
    }

    /// Checks whether a point lies within the intersection box.
    pub fn contains(&self, point: Point2d) -> bool {
        let half_road = 0.5 * self.road_width;
        Interval::disc(self.centre.x, half_road).contains(point.x)
            && Interval::disc(self.centre.y, half_road).contains(point.y)
    }

    /// Checks whether a point is further than `margin` outside the playfield.
    pub fn is_beyond_playfield(&self, point: Point2d, margin: f64) -> bool {
        let [x, y] = self.bounds.map(|b| b.expand(margin));
        !x.contains(point.x) || !y.contains(point.y)
    }

    /// The signed distance from `point` to the stop line of the given approach,
    /// measured along the direction of travel. Positive before the line.
    pub fn distance_to_stop_line(&self, direction: Direction, point: Point2d) -> f64 {
        let line = self.stop_line(direction);
        cgmath::dot(line.start - point, direction.travel_vector())
    }

    /// The signed distance from `point` to the edge of the intersection box on the
    /// given approach, measured along the direction of travel. Positive before the box.
    pub fn distance_to_box(&self, direction: Direction, point: Point2d) -> f64 {
        let travel = direction.travel_vector();
        let edge = self.centre - 0.5 * self.size * travel;
        cgmath::dot(edge - point, travel)
    }

    /// Generates the path through the intersection for a movement.
    ///
    /// Returns `None` if the entry and exit cannot be resolved to distinct points,
    /// in which case callers fall back to [Self::straight_trajectory].
    pub fn trajectory(
        &self,
        from: Direction,
        to: Direction,
        turn_type: TurnType,
    ) -> Option<Trajectory> {
        if from == to {
            return None;
        }
        let entry = self.path_entry_point(from);
        let exit = self.path_exit_point(to, turn_type);
        match turn_type {
            TurnType::Straight => Some(Trajectory::from_curve(
                &LineSegment2d::from_ends(entry, exit),
            )),
            TurnType::Left | TurnType::Right => {
                let [cp1, cp2] = self.control_points(from, turn_type)?;
                let curve = CubicBezier2d::new(&[entry, cp1, cp2, exit]);
                Some(Trajectory::from_curve(&curve))
            }
        }
    }

    /// Generates a straight path between the entry and exit of a movement.
    pub fn straight_trajectory(&self, from: Direction, to: Direction) -> Trajectory {
        let entry = self.path_entry_point(from);
        let exit = self.path_exit_point(to, TurnType::Straight);
        Trajectory::from_curve(&LineSegment2d::from_ends(entry, exit))
    }

    /// Where trajectories from the given approach enter the intersection box.
    pub fn path_entry_point(&self, direction: Direction) -> Point2d {
        let (cx, cy) = (self.centre.x, self.centre.y);
        let half_road = 0.5 * self.road_width;
        let lane_offset = 0.5 * self.lane_width;
        match direction {
            Direction::North => Point2d::new(cx - lane_offset, cy - half_road),
            Direction::East => Point2d::new(cx + half_road, cy - lane_offset),
            Direction::South => Point2d::new(cx + lane_offset, cy + half_road),
            Direction::West => Point2d::new(cx - half_road, cy + lane_offset),
        }
    }

    /// Where trajectories towards the given direction leave the intersection box.
    pub fn path_exit_point(&self, direction: Direction, turn_type: TurnType) -> Point2d {
        let (cx, cy) = (self.centre.x, self.centre.y);
        let half_road = 0.5 * self.road_width;
        let offset = match turn_type {
            TurnType::Left => -0.5 * self.lane_width,
            TurnType::Straight | TurnType::Right => 0.5 * self.lane_width,
        };
        match direction {
            Direction::North => Point2d::new(cx + offset, cy - half_road),
            Direction::East => Point2d::new(cx + half_road, cy + offset),
            Direction::South => Point2d::new(cx - offset, cy + half_road),
            Direction::West => Point2d::new(cx - half_road, cy - offset),
        }
    }

    /// The two inner control points of the bezier curve for a turn.
    /// Both sit on the same diagonal corner, a third of the intersection size from the centre.
    fn control_points(&self, from: Direction, turn_type: TurnType) -> Option<[Point2d; 2]> {
        let r = self.size / 3.0;
        let (dx, dy) = match (turn_type, from) {
            (TurnType::Straight, _) => return None,
            (TurnType::Left, Direction::North) => (-r, -r),
            (TurnType::Left, Direction::East) => (r, -r),
            (TurnType::Left, Direction::South) => (r, r),
            (TurnType::Left, Direction::West) => (-r, r),
            (TurnType::Right, Direction::North) => (r, -r),
            (TurnType::Right, Direction::East) => (r, r),
            (TurnType::Right, Direction::South) => (-r, r),
            (TurnType::Right, Direction::West) => (-r, -r),
        };
        let cp = self.centre + Vector2d::new(dx, dy);
        Some([cp, cp])
    }
}

impl Trajectory {
    /// Samples a curve at evenly spaced parameter values.
    /// The first and last points are exactly the ends of the curve.
    fn from_curve(curve: &impl ParametricCurve2d) -> Self {
        let bounds = curve.bounds();
        let points = (0..TRAJECTORY_POINTS)
            .map(|i| {
                let t = i as f64 / TRAJECTORY_SEGMENTS as f64;
                curve.sample(bounds.min + t * bounds.length())
            })
            .collect::<ArrayVec<_, TRAJECTORY_POINTS>>();
        let mut trajectory = Self { points };
        trajectory.points[0] = curve.sample(bounds.min);
        trajectory.points[TRAJECTORY_SEGMENTS] = curve.sample(bounds.max);
        trajectory
    }

    /// The sample points.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// The first sample point.
    pub fn start(&self) -> Point2d {
        self.points[0]
    }

    /// The last sample point.
    pub fn end(&self) -> Point2d {
        self.points[TRAJECTORY_SEGMENTS]
    }

    /// Samples the trajectory at `progress` in `[0, 1]` by interpolating
    /// between the two bracketing sample points.
    pub fn sample(&self, progress: f64) -> Point2d {
        let x = progress.clamp(0.0, 1.0) * TRAJECTORY_SEGMENTS as f64;
        let idx = usize::min(x as usize, TRAJECTORY_SEGMENTS);
        let next = usize::min(idx + 1, TRAJECTORY_SEGMENTS);
        if idx == next {
            return self.points[idx];
        }
        let a = self.points[idx];
        let b = self.points[next];
        a + (x - idx as f64) * (b - a)
    }

    /// The heading in radians of a vehicle at `progress` along the trajectory.
    ///
    /// Looks slightly ahead along the trajectory, or at the end point once within
    /// the final stretch. Returns `None` where no direction can be determined.
    pub fn heading_at(&self, progress: f64) -> Option<f64> {
        let here = self.sample(progress);
        let ahead = if progress < 1.0 - HEADING_LOOKAHEAD {
            self.sample(progress + HEADING_LOOKAHEAD)
        } else {
            self.end()
        };
        vector_heading(ahead - here)
    }
}
