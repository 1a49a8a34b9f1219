use chrono::NaiveTime;

use crate::domain::types::{PackageId, VehicleId};
use crate::utils::travel_time;

/// Static part of a vehicle: when it leaves and what it is loaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehiclePlan {
    pub id: VehicleId,
    pub departs_at: NaiveTime,
    pub manifest: Vec<PackageId>,
}

impl VehiclePlan {
    pub fn new(id: VehicleId, departs_at: NaiveTime, manifest: impl Into<Vec<PackageId>>) -> Self {
        Self {
            id,
            departs_at,
            manifest: manifest.into(),
        }
    }
}

/// Fleet-wide constants plus every vehicle's plan, in replay order.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetPlan {
    pub hub: String,
    pub speed_mph: f64,
    pub capacity: usize,
    pub vehicles: Vec<VehiclePlan>,
}

impl FleetPlan {
    pub fn vehicle(&self, id: VehicleId) -> Option<&VehiclePlan> {
        self.vehicles.iter().find(|v| v.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: VehicleId,
    departs_at: NaiveTime,
    hub: String,
    speed_mph: f64,
    manifest: Vec<PackageId>,
    delivered: Vec<PackageId>,
    location: String,
    miles: f64,
    clock: NaiveTime,
}

impl Vehicle {
    pub fn from_plan(plan: &VehiclePlan, hub: &str, speed_mph: f64) -> Self {
        Self {
            id: plan.id,
            departs_at: plan.departs_at,
            hub: hub.to_string(),
            speed_mph,
            manifest: plan.manifest.clone(),
            delivered: Vec::new(),
            location: hub.to_string(),
            miles: 0.0,
            clock: plan.departs_at,
        }
    }

    /// Back to the plan's manifest, parked at the hub with a clean odometer.
    pub fn reset(&mut self, plan: &VehiclePlan) {
        debug_assert_eq!(self.id, plan.id, "vehicle reset with another vehicle's plan");
        self.departs_at = plan.departs_at;
        self.manifest.clone_from(&plan.manifest);
        self.delivered.clear();
        self.location.clone_from(&self.hub);
        self.miles = 0.0;
        self.clock = plan.departs_at;
    }

    /// Drive `miles`: accumulate distance and move the clock by the travel
    /// time at the fleet's average speed.
    pub fn advance_to(&mut self, miles: f64) {
        self.miles += miles;
        self.clock += travel_time(miles, self.speed_mph);
    }

    /// Clock after a hop of `miles`, or `None` if it would run past midnight.
    pub fn arrival_after(&self, miles: f64) -> Option<NaiveTime> {
        let (arrival, wrapped) = self
            .clock
            .overflowing_add_signed(travel_time(miles, self.speed_mph));
        (wrapped == 0).then_some(arrival)
    }

    pub fn relocate(&mut self, address: &str) {
        if self.location != address {
            self.location = address.to_string();
        }
    }

    /// Move `package` from the manifest to the delivered list.
    pub fn mark_delivered(&mut self, package: PackageId) -> bool {
        let Some(position) = self.manifest.iter().position(|&id| id == package) else {
            return false;
        };
        self.manifest.remove(position);
        self.delivered.push(package);
        true
    }

    pub fn load(&mut self, package: PackageId) {
        if !self.manifest.contains(&package) {
            self.manifest.push(package);
        }
    }

    pub fn unload(&mut self, package: PackageId) {
        self.manifest.retain(|&id| id != package);
    }

    pub fn carries(&self, package: PackageId) -> bool {
        self.manifest.contains(&package)
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn departs_at(&self) -> NaiveTime {
        self.departs_at
    }

    pub fn hub(&self) -> &str {
        &self.hub
    }

    pub fn is_at_hub(&self) -> bool {
        self.location == self.hub
    }

    pub fn manifest(&self) -> &[PackageId] {
        &self.manifest
    }

    pub fn delivered(&self) -> &[PackageId] {
        &self.delivered
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn miles(&self) -> f64 {
        self.miles
    }

    pub fn clock(&self) -> NaiveTime {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hms;
    use rstest::{fixture, rstest};

    #[fixture]
    fn plan() -> VehiclePlan {
        VehiclePlan::new(1, hms(8, 0, 0), vec![4, 5, 6])
    }

    #[fixture]
    fn vehicle(plan: VehiclePlan) -> Vehicle {
        Vehicle::from_plan(&plan, "Hub", 18.0)
    }

    #[rstest]
    fn starts_at_hub_on_departure(vehicle: Vehicle) {
        assert!(vehicle.is_at_hub());
        assert_eq!(vehicle.clock(), hms(8, 0, 0));
        assert_eq!(vehicle.miles(), 0.0);
        assert_eq!(vehicle.manifest(), &[4, 5, 6]);
    }

    #[rstest]
    fn advance_accumulates_miles_and_time(mut vehicle: Vehicle) {
        vehicle.advance_to(9.0);
        vehicle.advance_to(4.5);
        assert!((vehicle.miles() - 13.5).abs() < 1e-9);
        assert_eq!(vehicle.clock(), hms(8, 45, 0));
    }

    #[rstest]
    fn arrival_preview_does_not_commit(vehicle: Vehicle) {
        assert_eq!(vehicle.arrival_after(1.8), Some(hms(8, 6, 0)));
        assert_eq!(vehicle.clock(), hms(8, 0, 0));
        assert_eq!(vehicle.miles(), 0.0);
    }

    #[rstest]
    fn arrival_past_midnight_is_rejected(vehicle: Vehicle) {
        assert_eq!(vehicle.arrival_after(18.0 * 17.0), None);
    }

    #[rstest]
    fn delivery_moves_package_between_lists(mut vehicle: Vehicle) {
        assert!(vehicle.mark_delivered(5));
        assert!(!vehicle.mark_delivered(5));
        assert_eq!(vehicle.manifest(), &[4, 6]);
        assert_eq!(vehicle.delivered(), &[5]);
    }

    #[rstest]
    fn reset_restores_plan(plan: VehiclePlan, mut vehicle: Vehicle) {
        vehicle.load(9);
        vehicle.mark_delivered(4);
        vehicle.advance_to(3.6);
        vehicle.relocate("Elsewhere");

        vehicle.reset(&plan);
        let fresh = Vehicle::from_plan(&plan, "Hub", 18.0);
        assert_eq!(vehicle, fresh);
    }
}
