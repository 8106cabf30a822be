use crate::sensor::SensorSnapshot;
use crate::{Direction, Pair, Settings};
use std::fmt;
use std::ops::Index;

/// The duration of the all-red transition between the two pairs, in s.
pub const TRANSITION_DURATION: f64 = 2.0;

/// How much higher the competing pair's priority must be before an adaptive
/// controller cuts the active green short.
pub const PRIORITY_THRESHOLD: f64 = 10.0;

/// The colour shown by a traffic light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

/// How the signal controller decides when to end a green.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SignalMode {
    /// Every sub-phase runs for a fixed duration.
    #[default]
    Fixed,
    /// Greens end when the active pair clears or the competing pair builds up a queue.
    Adaptive,
}

/// One of the eight phases of the signal cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phase(u8);

/// The part of a pair's window a phase belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubPhase {
    Green,
    Yellow,
    Red,
    AllRed,
}

/// The colour shown to each approach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LightStates([LightColor; 4]);

/// Cycles the lights through the eight phases.
#[derive(Clone, Debug, Default)]
pub struct SignalController {
    /// The current mode.
    mode: SignalMode,
    /// The current phase.
    phase: Phase,
    /// The time since the current phase was entered, in s.
    timer: f64,
}

/// The colours of each phase, in the order of [Direction::ALL].
const PHASE_COLORS: [[LightColor; 4]; 8] = {
    use LightColor::*;
    [
        [Red, Green, Red, Green],
        [Red, Yellow, Red, Yellow],
        [Red, Red, Red, Red],
        [Red, Red, Red, Red],
        [Green, Red, Green, Red],
        [Yellow, Red, Yellow, Red],
        [Red, Red, Red, Red],
        [Red, Red, Red, Red],
    ]
};

impl Phase {
    /// The number of phases in a cycle.
    pub const COUNT: u8 = 8;

    /// Gets the phase with the given index, wrapping around.
    pub const fn new(index: u8) -> Self {
        Self(index % Self::COUNT)
    }

    /// The index of the phase, in `0..8`.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The following phase.
    pub const fn next(self) -> Self {
        Self::new(self.0 + 1)
    }

    /// The pair whose window this phase belongs to.
    pub const fn pair(self) -> Pair {
        if self.0 < 4 {
            Pair::WestEast
        } else {
            Pair::NorthSouth
        }
    }

    /// Where in its pair's window this phase falls.
    pub const fn sub_phase(self) -> SubPhase {
        match self.0 % 4 {
            0 => SubPhase::Green,
            1 => SubPhase::Yellow,
            2 => SubPhase::Red,
            _ => SubPhase::AllRed,
        }
    }

    /// The first phase of a pair's window.
    pub const fn green(pair: Pair) -> Self {
        match pair {
            Pair::WestEast => Self(0),
            Pair::NorthSouth => Self(4),
        }
    }

    /// The colours shown during this phase.
    pub fn light_states(self) -> LightStates {
        LightStates(PHASE_COLORS[self.0 as usize])
    }

    /// How long this phase lasts when it runs on a timer.
    pub fn duration(self, settings: &Settings) -> f64 {
        match self.sub_phase() {
            SubPhase::Green => settings.green_duration,
            SubPhase::Yellow => settings.yellow_duration,
            SubPhase::Red => settings.red_duration,
            SubPhase::AllRed => TRANSITION_DURATION,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pair = match self.pair() {
            Pair::NorthSouth => "NS",
            Pair::WestEast => "WE",
        };
        write!(f, "{} {} {:?}", self.0, pair, self.sub_phase())
    }
}

impl LightStates {
    /// The colours as an array, in the order of [Direction::ALL].
    pub fn colors(&self) -> [LightColor; 4] {
        self.0
    }

    /// Iterates over the colour of each approach.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, LightColor)> + '_ {
        Direction::ALL.into_iter().zip(self.0)
    }

    /// Checks whether the given pair is showing anything other than red.
    pub fn is_open(&self, pair: Pair) -> bool {
        pair.directions().iter().any(|d| self[*d] != LightColor::Red)
    }
}

impl Index<Direction> for LightStates {
    type Output = LightColor;

    fn index(&self, direction: Direction) -> &LightColor {
        &self.0[direction.index()]
    }
}

impl SignalController {
    /// Creates a controller at the start of the west-east green.
    pub fn new(mode: SignalMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Returns to the start of the west-east green.
    pub fn reset(&mut self) {
        self.phase = Phase::default();
        self.timer = 0.0;
    }

    /// Changes mode, restarting the cycle if the mode is different.
    pub fn set_mode(&mut self, mode: SignalMode) {
        if mode != self.mode {
            log::debug!("signal mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.reset();
        }
    }

    /// The current mode.
    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The time spent in the current phase, in s.
    pub fn phase_timer(&self) -> f64 {
        self.timer
    }

    /// The pair whose window the current phase belongs to.
    pub fn active_pair(&self) -> Pair {
        self.phase.pair()
    }

    /// The colour shown to each approach.
    pub fn states(&self) -> LightStates {
        self.phase.light_states()
    }

    /// Whether the light for the given approach is red.
    pub fn is_red(&self, direction: Direction) -> bool {
        self.states()[direction] == LightColor::Red
    }

    /// Whether vehicles on the given approach may proceed.
    pub fn can_proceed(&self, direction: Direction) -> bool {
        !self.is_red(direction)
    }

    /// Jumps straight to a phase and restarts its timer.
    pub fn force_phase(&mut self, phase: Phase) {
        log::debug!("forcing phase {}", phase);
        self.phase = phase;
        self.timer = 0.0;
    }

    /// The queue pressure on a pair: the sum over its directions of the number of
    /// vehicles waiting multiplied by the wait time. Missing readings count as zero.
    pub fn priority(pair: Pair, sensors: &SensorSnapshot) -> f64 {
        pair.directions()
            .iter()
            .filter_map(|d| sensors.reading(*d))
            .map(|r| r.cars_waiting as f64 * r.wait_time)
            .sum()
    }

    /// Checks whether no vehicles are waiting on either direction of a pair.
    fn is_cleared(pair: Pair, sensors: &SensorSnapshot) -> bool {
        pair.directions()
            .iter()
            .all(|d| sensors.cars_waiting(*d) == 0)
    }

    /// Advances the controller by one frame.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    /// * `settings` - The phase durations
    /// * `sensors` - The detector readings from the previous frame
    pub fn step(&mut self, dt: f64, settings: &Settings, sensors: &SensorSnapshot) {
        self.timer += dt;
        let advance = match (self.mode, self.phase.sub_phase()) {
            (SignalMode::Adaptive, SubPhase::Green) => self.green_should_end(settings, sensors),
            _ => self.timer >= self.phase.duration(settings),
        };
        if advance {
            self.advance();
        }
    }

    /// Decides whether an adaptive green should end.
    fn green_should_end(&self, settings: &Settings, sensors: &SensorSnapshot) -> bool {
        let active = self.active_pair();
        if Self::is_cleared(active, sensors) {
            return true;
        }
        let pressure =
            Self::priority(active.other(), sensors) - Self::priority(active, sensors);
        self.timer >= settings.min_green_time && pressure > PRIORITY_THRESHOLD
    }

    /// Moves to the next phase.
    fn advance(&mut self) {
        let next = self.phase.next();
        log::debug!("phase {} -> {} after {:.2}s", self.phase, next, self.timer);
        self.phase = next;
        self.timer = 0.0;
    }
}
