use crate::{Direction, Route, TurnType};
use rand::Rng;

/// The probability of a vehicle travelling straight through the intersection,
/// before any adjustment.
pub const BASE_STRAIGHT_PROBABILITY: f64 = 0.6;

/// The relative likelihood of each turn type.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnProbabilities {
    pub straight: f64,
    pub left: f64,
    pub right: f64,
}

/// A predefined routing scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scenario {
    /// Routes are drawn at random.
    #[default]
    Random,
    /// Every vehicle goes straight.
    AllStraight,
    /// Every vehicle turns left.
    AllLeft,
    /// Every vehicle turns right.
    AllRight,
}

/// Chooses routes for new vehicles.
#[derive(Clone, Debug)]
pub struct Router {
    /// The destination of each turn type, for each source direction.
    templates: [RouteTemplate; 4],
    /// The current turn probabilities.
    probabilities: TurnProbabilities,
}

/// The destinations reachable from one source direction.
#[derive(Clone, Copy, Debug)]
struct RouteTemplate {
    straight: Direction,
    left: Direction,
    right: Direction,
}

impl Default for TurnProbabilities {
    fn default() -> Self {
        let turn = 0.5 * (1.0 - BASE_STRAIGHT_PROBABILITY);
        Self {
            straight: BASE_STRAIGHT_PROBABILITY,
            left: turn,
            right: turn,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new router with the default turn probabilities.
    pub fn new() -> Self {
        let templates = Direction::ALL.map(|from| RouteTemplate {
            straight: Self::straight_destination(from),
            left: Self::left_destination(from),
            right: Self::right_destination(from),
        });
        Self {
            templates,
            probabilities: TurnProbabilities::default(),
        }
    }

    /// The destination of a vehicle going straight.
    pub const fn straight_destination(from: Direction) -> Direction {
        from.offset(2)
    }

    /// The destination of a vehicle turning left.
    pub const fn left_destination(from: Direction) -> Direction {
        from.offset(3)
    }

    /// The destination of a vehicle turning right.
    pub const fn right_destination(from: Direction) -> Direction {
        from.offset(1)
    }

    /// Gets the route from `from` with the given turn type.
    pub fn route(&self, from: Direction, turn_type: TurnType) -> Route {
        let template = &self.templates[from.index()];
        let to = match turn_type {
            TurnType::Straight => template.straight,
            TurnType::Left => template.left,
            TurnType::Right => template.right,
        };
        Route::from_template(from, to)
    }

    /// Draws a random route for a vehicle entering from `from`.
    ///
    /// `turn_rate` is the probability mass given to turning movements, split between
    /// left and right in the ratio of the turn probabilities (evenly by default). The
    /// straight threshold follows on from the turning ones; any draw which is not
    /// covered by the thresholds defaults to straight.
    pub fn generate_route(&self, from: Direction, turn_rate: f64, rng: &mut impl Rng) -> Route {
        let turn_rate = if turn_rate.is_finite() {
            turn_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let TurnProbabilities {
            straight,
            left,
            right,
        } = self.probabilities;
        let left_share = if left + right > 0.0 {
            left / (left + right)
        } else {
            0.5
        };

        let draw: f64 = rng.gen();
        let left_end = turn_rate * left_share;
        let right_end = turn_rate;
        let straight_end = right_end + straight;
        if straight_end < 1.0 && draw >= straight_end {
            log::trace!("route draw {:.3} beyond thresholds, going straight", draw);
        }

        let turn_type = if draw < left_end {
            TurnType::Left
        } else if draw < right_end {
            TurnType::Right
        } else {
            TurnType::Straight
        };
        self.route(from, turn_type)
    }

    /// Gets a route according to a predefined scenario.
    pub fn route_for_scenario(
        &self,
        scenario: Scenario,
        from: Direction,
        turn_rate: f64,
        rng: &mut impl Rng,
    ) -> Route {
        match scenario {
            Scenario::Random => self.generate_route(from, turn_rate, rng),
            Scenario::AllStraight => self.route(from, TurnType::Straight),
            Scenario::AllLeft => self.route(from, TurnType::Left),
            Scenario::AllRight => self.route(from, TurnType::Right),
        }
    }

    /// Sets the turn probabilities, normalising them to sum to one.
    /// Weights which are negative, not finite, or sum to zero are ignored.
    ///
    /// Only the left:right ratio affects [`Router::generate_route`]; the share of
    /// straight routes comes from the turn rate. The straight weight is stored so it
    /// can be read back.
    pub fn update_turn_probabilities(&mut self, straight: f64, left: f64, right: f64) {
        let weights = [straight, left, right];
        let total: f64 = weights.iter().sum();
        if !(total > 0.0 && total.is_finite()) || weights.iter().any(|w| *w < 0.0) {
            log::warn!(
                "ignoring turn probabilities {:?}: weights must be non-negative with a positive sum",
                weights
            );
            return;
        }
        self.probabilities = TurnProbabilities {
            straight: straight / total,
            left: left / total,
            right: right / total,
        };
    }

    /// The current turn probabilities.
    pub fn turn_probabilities(&self) -> TurnProbabilities {
        self.probabilities
    }
}
