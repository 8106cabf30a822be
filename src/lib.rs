pub use cgmath;
pub use direction::{Direction, Lane, Pair, ParseDirectionError, Route, TurnType};
pub use intersection::{Intersection, IntersectionAttributes, Trajectory};
pub use light::{LightColor, LightStates, Phase, SignalController, SignalMode, SubPhase};
pub use routing::{Router, Scenario, TurnProbabilities};
pub use sensor::{DetectionZone, DirectionSensor, SensorSnapshot, SensorSystem};
pub use settings::Settings;
pub use simulation::Simulation;
pub use util::Interval;
pub use vehicle::{TrafficView, Vehicle, VehicleSnapshot, VehicleState, VEHICLE_COLORS};

mod direction;
mod intersection;
mod light;
pub mod math;
mod routing;
mod sensor;
mod settings;
mod simulation;
mod util;
mod vehicle;

/// Unique ID of a [Vehicle].
///
/// IDs are handed out in increasing order and are never reused within a [Simulation].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(pub(crate) u64);

impl VehicleId {
    /// The numeric value of the ID.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
