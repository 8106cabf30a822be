//! Runtime settings supplied by the caller on every frame.

/// The length of the window `car_spawn_rate` is measured over, in s.
pub const SPAWN_RATE_WINDOW: f64 = 10.0;

/// The tunable parameters of a simulation.
///
/// Values are replaced wholesale rather than mutated: each `with_*` method
/// returns a new value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE", default)
)]
pub struct Settings {
    /// Vehicles spawned per 10 s. Zero disables spawning.
    pub car_spawn_rate: f64,
    /// The maximum speed of vehicles, in units/s.
    pub car_speed: f64,
    /// The probability of a spawned vehicle turning rather than going straight.
    pub turn_rate: f64,
    /// How far the detection zones extend back from the stop lines.
    pub detector_distance: f64,
    /// The duration of a fixed-time green, in s.
    pub green_duration: f64,
    /// The duration of a yellow, in s.
    pub yellow_duration: f64,
    /// The minimum green before an adaptive controller may switch on priority, in s.
    pub min_green_time: f64,
    /// The duration of the red which follows a yellow, in s.
    pub red_duration: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            car_spawn_rate: 5.0,
            car_speed: 60.0,
            turn_rate: 0.4,
            detector_distance: 150.0,
            green_duration: 10.0,
            yellow_duration: 3.0,
            min_green_time: 5.0,
            red_duration: 2.0,
        }
    }
}

impl Settings {
    /// The time between spawns in s, or `None` if spawning is disabled.
    pub fn spawn_interval(&self) -> Option<f64> {
        (self.car_spawn_rate.is_finite() && self.car_spawn_rate > 0.0)
            .then(|| SPAWN_RATE_WINDOW / self.car_spawn_rate)
    }

    /// Returns a copy with a different spawn rate, in vehicles per 10 s.
    pub fn with_car_spawn_rate(self, car_spawn_rate: f64) -> Self {
        Self {
            car_spawn_rate,
            ..self
        }
    }

    /// Returns a copy with a different maximum vehicle speed.
    pub fn with_car_speed(self, car_speed: f64) -> Self {
        Self { car_speed, ..self }
    }

    /// Returns a copy with a different turning probability.
    pub fn with_turn_rate(self, turn_rate: f64) -> Self {
        Self { turn_rate, ..self }
    }

    /// Returns a copy with a different detection zone length.
    pub fn with_detector_distance(self, detector_distance: f64) -> Self {
        Self {
            detector_distance,
            ..self
        }
    }

    /// Returns a copy with a different fixed-time green.
    pub fn with_green_duration(self, green_duration: f64) -> Self {
        Self {
            green_duration,
            ..self
        }
    }

    /// Returns a copy with a different yellow.
    pub fn with_yellow_duration(self, yellow_duration: f64) -> Self {
        Self {
            yellow_duration,
            ..self
        }
    }

    /// Returns a copy with a different adaptive minimum green.
    pub fn with_min_green_time(self, min_green_time: f64) -> Self {
        Self {
            min_green_time,
            ..self
        }
    }

    /// Returns a copy with a different post-yellow red.
    pub fn with_red_duration(self, red_duration: f64) -> Self {
        Self {
            red_duration,
            ..self
        }
    }
}
