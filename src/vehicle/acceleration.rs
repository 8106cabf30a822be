/// A linear speed ramp towards a fraction of the vehicle's maximum speed.
#[derive(Clone, Copy, Debug)]
pub struct AccelerationModel {
    /// The acceleration in units/s<sup>2</sup>.
    rate: f64,
    /// The fraction of the maximum speed the ramp tops out at.
    speed_factor: f64,
}

/// Acceleration while approaching the intersection.
pub const APPROACH: AccelerationModel = AccelerationModel::new(30.0, 1.0);

/// Acceleration while changing lanes, which is gentler and capped lower.
pub const LANE_CHANGE: AccelerationModel = AccelerationModel::new(20.0, 0.8);

/// Acceleration while turning, which may briefly exceed the maximum speed.
pub const TURNING: AccelerationModel = AccelerationModel::new(35.0, 1.1);

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub const fn new(rate: f64, speed_factor: f64) -> Self {
        Self { rate, speed_factor }
    }

    /// The speed after accelerating for `dt` seconds.
    ///
    /// # Arguments
    /// * `speed` - The current speed (units/s).
    /// * `max_speed` - The vehicle's maximum speed (units/s).
    /// * `dt` - The time step (s).
    pub fn accelerate(&self, speed: f64, max_speed: f64, dt: f64) -> f64 {
        f64::min(self.speed_factor * max_speed, speed + self.rate * dt)
    }
}
