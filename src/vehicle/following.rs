use super::Vehicle;
use crate::math::{project_local, rot90, Point2d};
use crate::{Direction, Lane, VehicleId};
use smallvec::SmallVec;

/// A read-only view over the vehicles in a simulation, used for car following.
pub trait TrafficView {
    /// Gets the distance to the closest vehicle strictly ahead of `vehicle`
    /// which entered from the same direction and occupies the same lane.
    fn gap_ahead(&self, vehicle: &Vehicle) -> Option<f64>;
}

/// The positions of all vehicles at the start of a frame, grouped by approach and lane.
#[derive(Default)]
pub(crate) struct Occupancy {
    lanes: [[SmallVec<[(VehicleId, Point2d); 8]>; 2]; 4],
}

impl Occupancy {
    /// Records the current positions of the given vehicles.
    pub fn new<'a>(vehicles: impl IntoIterator<Item = &'a Vehicle>) -> Self {
        let mut occupancy = Self::default();
        for vehicle in vehicles {
            occupancy
                .lane_mut(vehicle.from_direction(), vehicle.lane())
                .push((vehicle.id(), vehicle.position()));
        }
        occupancy
    }

    fn lane_mut(
        &mut self,
        direction: Direction,
        lane: Lane,
    ) -> &mut SmallVec<[(VehicleId, Point2d); 8]> {
        &mut self.lanes[direction.index()][lane.index()]
    }
}

impl TrafficView for Occupancy {
    fn gap_ahead(&self, vehicle: &Vehicle) -> Option<f64> {
        let lane = &self.lanes[vehicle.from_direction().index()][vehicle.lane().index()];
        closest_ahead(vehicle, lane.iter().copied())
    }
}

impl TrafficView for [Vehicle] {
    fn gap_ahead(&self, vehicle: &Vehicle) -> Option<f64> {
        let others = self
            .iter()
            .filter(|v| {
                v.from_direction() == vehicle.from_direction() && v.lane() == vehicle.lane()
            })
            .map(|v| (v.id(), v.position()));
        closest_ahead(vehicle, others)
    }
}

/// Finds the smallest positive longitudinal distance from `vehicle` to any of `others`.
fn closest_ahead(
    vehicle: &Vehicle,
    others: impl Iterator<Item = (VehicleId, Point2d)>,
) -> Option<f64> {
    let forward = vehicle.from_direction().travel_vector();
    others
        .filter(|(id, _)| *id != vehicle.id())
        .map(|(_, pos)| project_local(pos, vehicle.position(), rot90(forward), forward).y)
        .filter(|dist| *dist > 0.0)
        .min_by(f64::total_cmp)
}
