use crate::intersection::Intersection;
use crate::math::Point2d;
use crate::util::Interval;
use crate::{Direction, Vehicle, VehicleId};
use std::collections::HashSet;

/// The aggregate detector reading for one approach.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionSensor {
    /// The number of waiting vehicles inside the detection zone.
    pub cars_waiting: usize,
    /// How long the waiting vehicle closest to the stop line has been waiting, in s.
    pub wait_time: f64,
    /// The number of vehicles which have entered the detection zone since the last reset.
    pub total_cars_detected: u64,
}

/// The detector readings for every approach at the end of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSnapshot {
    readings: [Option<DirectionSensor>; 4],
}

/// The rectangle on an approach in which vehicles are detected.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionZone {
    pub x: Interval<f64>,
    pub y: Interval<f64>,
}

/// Detects vehicles waiting on each approach.
#[derive(Clone, Debug, Default)]
pub struct SensorSystem {
    /// The detection zone of each approach.
    zones: [Option<DetectionZone>; 4],
    /// The latest readings.
    snapshot: SensorSnapshot,
    /// The vehicles which were inside a zone at the last update.
    in_zone: HashSet<VehicleId>,
    /// The number of vehicles counted on each approach since the count was last reset.
    counts: [u64; 4],
}

impl SensorSnapshot {
    /// Returns a copy of the snapshot with the reading for `direction` replaced.
    pub fn with(mut self, direction: Direction, reading: DirectionSensor) -> Self {
        self.readings[direction.index()] = Some(reading);
        self
    }

    /// The reading for an approach, if there is one.
    pub fn reading(&self, direction: Direction) -> Option<&DirectionSensor> {
        self.readings[direction.index()].as_ref()
    }

    /// The number of vehicles waiting on an approach, or zero if there is no reading.
    pub fn cars_waiting(&self, direction: Direction) -> usize {
        self.reading(direction).map_or(0, |r| r.cars_waiting)
    }

    /// The wait time on an approach, or zero if there is no reading.
    pub fn wait_time(&self, direction: Direction) -> f64 {
        self.reading(direction).map_or(0.0, |r| r.wait_time)
    }
}

impl DetectionZone {
    /// The zone on an approach, running `distance` back from the stop line.
    pub fn new(intersection: &Intersection, direction: Direction, distance: f64) -> Self {
        let start = intersection.stop_line(direction).start;
        let centre = intersection.centre();
        let half_road = 0.5 * intersection.road_width();
        let across_x = Interval::disc(centre.x, half_road);
        let across_y = Interval::disc(centre.y, half_road);
        match direction {
            Direction::North => Self {
                x: across_x,
                y: Interval::new(start.y - distance, start.y),
            },
            Direction::East => Self {
                x: Interval::new(start.x, start.x + distance),
                y: across_y,
            },
            Direction::South => Self {
                x: across_x,
                y: Interval::new(start.y, start.y + distance),
            },
            Direction::West => Self {
                x: Interval::new(start.x - distance, start.x),
                y: across_y,
            },
        }
    }

    /// Checks whether a point lies inside the zone, boundary included.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}

impl SensorSystem {
    /// Creates a sensor system with no readings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all readings, counts, and zone memberships.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The readings from the last update.
    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    /// The detection zone on an approach, as of the last update.
    pub fn zone(&self, direction: Direction) -> Option<DetectionZone> {
        self.zones[direction.index()]
    }

    /// The number of vehicles counted on an approach since its count was last reset.
    pub fn count(&self, direction: Direction) -> u64 {
        self.counts[direction.index()]
    }

    /// Resets the displayed count for an approach.
    pub fn reset_count(&mut self, direction: Direction) {
        self.counts[direction.index()] = 0;
    }

    /// Resets the displayed counts for every approach.
    pub fn reset_all_counts(&mut self) {
        self.counts = [0; 4];
    }

    /// Rebuilds the readings from the live vehicles.
    ///
    /// # Parameters
    /// * `intersection` - The intersection geometry
    /// * `detector_distance` - How far the zones extend back from the stop lines
    /// * `vehicles` - Every live vehicle
    pub fn update<'a>(
        &mut self,
        intersection: &Intersection,
        detector_distance: f64,
        vehicles: impl IntoIterator<Item = &'a Vehicle>,
    ) {
        let zones = Direction::ALL.map(|d| DetectionZone::new(intersection, d, detector_distance));
        self.zones = zones.map(Some);

        let mut readings = Direction::ALL.map(|d| DirectionSensor {
            total_cars_detected: self
                .snapshot
                .reading(d)
                .map_or(0, |r| r.total_cars_detected),
            ..Default::default()
        });
        // The distance to the stop line of the closest waiting vehicle on each approach
        let mut closest = [f64::INFINITY; 4];
        let mut in_zone = HashSet::with_capacity(self.in_zone.len());

        for vehicle in vehicles {
            let direction = vehicle.from_direction();
            let idx = direction.index();
            let pos = vehicle.position();
            if !zones[idx].contains(pos) {
                continue;
            }

            in_zone.insert(vehicle.id());
            if !self.in_zone.contains(&vehicle.id()) {
                self.counts[idx] += 1;
                readings[idx].total_cars_detected += 1;
            }

            if vehicle.is_waiting() {
                readings[idx].cars_waiting += 1;
                let dist = intersection.distance_to_stop_line(direction, pos).abs();
                if dist < closest[idx] {
                    closest[idx] = dist;
                    readings[idx].wait_time = vehicle.current_wait();
                }
            }
        }

        self.in_zone = in_zone;
        self.snapshot = SensorSnapshot {
            readings: readings.map(Some),
        };
    }
}
