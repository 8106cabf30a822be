use crate::math::Vector2d;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

/// One of the four approaches to the intersection.
///
/// The declaration order is significant: turn types and route templates
/// are derived from cyclic offsets over `[North, East, South, West]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// The error returned when a string does not name a [Direction].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDirectionError(String);

/// Classification of a route relative to the direction it entered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TurnType {
    Straight,
    Left,
    Right,
}

/// A logical lane within one direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Lane {
    Left,
    Right,
}

/// Two opposing directions which share a green window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pair {
    NorthSouth,
    WestEast,
}

/// The entry and exit directions of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    from: Direction,
    to: Direction,
}

impl Direction {
    /// All directions, in their cyclic order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The position of the direction within [Direction::ALL].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Gets the direction at `index` within [Direction::ALL], wrapping around.
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Gets the direction `steps` places further around the cycle.
    pub const fn offset(self, steps: usize) -> Self {
        Self::from_index(self.index() + steps)
    }

    /// The direction on the other side of the intersection.
    pub const fn opposite(self) -> Self {
        self.offset(2)
    }

    /// The signal pair this direction belongs to.
    pub const fn pair(self) -> Pair {
        match self {
            Direction::North | Direction::South => Pair::NorthSouth,
            Direction::East | Direction::West => Pair::WestEast,
        }
    }

    /// Whether vehicles on this approach travel along the y axis.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// The heading in radians of a vehicle entering the intersection from this direction.
    pub fn inbound_heading(self) -> f64 {
        match self {
            Direction::North => FRAC_PI_2,
            Direction::East => PI,
            Direction::South => -FRAC_PI_2,
            Direction::West => 0.0,
        }
    }

    /// The heading in radians of a vehicle leaving the intersection towards this direction.
    pub fn outbound_heading(self) -> f64 {
        self.opposite().inbound_heading()
    }

    /// A unit vector along the direction of travel of vehicles entering from this direction.
    pub fn travel_vector(self) -> Vector2d {
        match self {
            Direction::North => Vector2d::new(0.0, 1.0),
            Direction::East => Vector2d::new(-1.0, 0.0),
            Direction::South => Vector2d::new(0.0, -1.0),
            Direction::West => Vector2d::new(1.0, 0.0),
        }
    }

    /// The lowercase name used by the rendering and UI layers.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    /// Parses a direction name, logging a diagnostic and returning `None` if it is invalid.
    pub fn parse_lenient(name: &str) -> Option<Self> {
        match name.parse() {
            Ok(direction) => Some(direction),
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDirectionError(s.to_owned()))
    }
}

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid direction {:?}", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl TurnType {
    /// Derives the turn type from the cyclic distance between two directions.
    ///
    /// A zero distance is degenerate and classified as straight.
    pub const fn between(from: Direction, to: Direction) -> Self {
        match (to.index() + 4 - from.index()) % 4 {
            1 => TurnType::Right,
            3 => TurnType::Left,
            _ => TurnType::Straight,
        }
    }

    /// The lane a vehicle must occupy to make this turn, if any.
    pub const fn required_lane(self) -> Option<Lane> {
        match self {
            TurnType::Straight => None,
            TurnType::Left => Some(Lane::Left),
            TurnType::Right => Some(Lane::Right),
        }
    }

    /// The lane a vehicle ends up in on the exit road after making this turn.
    ///
    /// Left turns land in the right lane and right turns in the left lane
    /// of the new direction's numbering; straight movements keep their lane.
    pub const fn exit_lane(self, lane: Lane) -> Lane {
        match self {
            TurnType::Straight => lane,
            TurnType::Left => Lane::Right,
            TurnType::Right => Lane::Left,
        }
    }
}

impl Lane {
    /// Both lanes.
    pub const ALL: [Lane; 2] = [Lane::Left, Lane::Right];

    /// The position of the lane within [Lane::ALL].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The lane-centre-relative lateral offset of this lane, in `[-0.5, 0.5]`.
    pub const fn lateral_offset(self) -> f64 {
        match self {
            Lane::Left => -0.5,
            Lane::Right => 0.5,
        }
    }

    /// The other lane.
    pub const fn other(self) -> Self {
        match self {
            Lane::Left => Lane::Right,
            Lane::Right => Lane::Left,
        }
    }
}

impl Pair {
    /// The two directions in the pair.
    pub const fn directions(self) -> [Direction; 2] {
        match self {
            Pair::NorthSouth => [Direction::North, Direction::South],
            Pair::WestEast => [Direction::West, Direction::East],
        }
    }

    /// The competing pair.
    pub const fn other(self) -> Self {
        match self {
            Pair::NorthSouth => Pair::WestEast,
            Pair::WestEast => Pair::NorthSouth,
        }
    }
}

impl Route {
    /// Creates a route, or returns `None` if it would leave the way it came.
    pub fn new(from: Direction, to: Direction) -> Option<Self> {
        (from != to).then_some(Self { from, to })
    }

    /// Creates a route from a fixed cyclic offset, which is never zero.
    pub(crate) fn from_template(from: Direction, to: Direction) -> Self {
        debug_assert_ne!(from, to);
        Self { from, to }
    }

    /// The direction the vehicle enters from.
    pub fn from(&self) -> Direction {
        self.from
    }

    /// The direction the vehicle leaves towards.
    pub fn to(&self) -> Direction {
        self.to
    }

    /// The turn type of the route.
    pub fn turn_type(&self) -> TurnType {
        TurnType::between(self.from, self.to)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::heading_vector;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn turn_types() {
        use Direction::*;
        assert_eq!(TurnType::between(North, South), TurnType::Straight);
        assert_eq!(TurnType::between(North, East), TurnType::Right);
        assert_eq!(TurnType::between(North, West), TurnType::Left);
        assert_eq!(TurnType::between(West, North), TurnType::Right);
        assert_eq!(TurnType::between(West, South), TurnType::Left);
        assert_eq!(TurnType::between(East, East), TurnType::Straight);
    }

    #[test]
    fn exit_lane_convention() {
        for lane in Lane::ALL {
            assert_eq!(TurnType::Left.exit_lane(lane), Lane::Right);
            assert_eq!(TurnType::Right.exit_lane(lane), Lane::Left);
            assert_eq!(TurnType::Straight.exit_lane(lane), lane);
        }
    }

    #[test]
    fn travel_vector_matches_heading() {
        for d in Direction::ALL {
            let v = heading_vector(d.inbound_heading());
            assert_approx_eq!(v.x, d.travel_vector().x);
            assert_approx_eq!(v.y, d.travel_vector().y);
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("north".parse(), Ok(Direction::North));
        assert_eq!(" West ".parse(), Ok(Direction::West));
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(Direction::parse_lenient("sideways"), None);
        for d in Direction::ALL {
            assert_eq!(Direction::parse_lenient(&d.to_string()), Some(d));
        }
    }

    #[test]
    fn routes_never_loop_back() {
        for d in Direction::ALL {
            assert!(Route::new(d, d).is_none());
            assert_eq!(Route::new(d, d.opposite()).unwrap().turn_type(), TurnType::Straight);
        }
    }

    #[test]
    fn pairs() {
        for d in Direction::ALL {
            assert!(d.pair().directions().contains(&d));
            assert!(!d.pair().other().directions().contains(&d));
        }
    }
}
