use chrono::NaiveTime;
use serde::Serialize;

use crate::domain::types::{
    Deadline, Destination, Package, PackageId, PackageStatus, Progress, VehicleId,
};
use crate::domain::vehicle::Vehicle;
use crate::setup::rules::DispatchRules;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageReport {
    pub id: PackageId,
    pub destination: Destination,
    pub deadline: Deadline,
    pub weight_kg: u32,
    pub notes: String,
    pub vehicle: Option<VehicleId>,
    pub departed_at: Option<NaiveTime>,
    pub delivered_at: Option<NaiveTime>,
    pub status: PackageStatus,
    pub on_time: Option<bool>,
}

impl PackageReport {
    pub fn new(package: &Package, rules: &DispatchRules, at: NaiveTime) -> Self {
        let delivered_at = package.progress.delivered_at();
        Self {
            id: package.id,
            destination: package.destination.clone(),
            deadline: package.deadline,
            weight_kg: package.weight_kg,
            notes: package.special_notes.clone(),
            vehicle: package.progress.vehicle(),
            departed_at: package.progress.departed_at(),
            delivered_at,
            status: status_at(package, rules, at),
            on_time: delivered_at.map(|time| package.deadline.is_met_by(time)),
        }
    }
}

/// Status of `package` as of `at`, given the state a replay left it in.
pub fn status_at(package: &Package, rules: &DispatchRules, at: NaiveTime) -> PackageStatus {
    match package.progress {
        Progress::Delivered { .. } => PackageStatus::Delivered,
        Progress::Loaded { .. } => PackageStatus::EnRoute,
        Progress::Waiting if !rules.is_available(package.id, at) => PackageStatus::Delayed,
        Progress::Waiting => PackageStatus::AtHub,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleReport {
    pub id: VehicleId,
    pub departs_at: NaiveTime,
    pub clock: NaiveTime,
    pub location: String,
    pub miles: f64,
    pub pending: Vec<PackageId>,
    pub delivered: Vec<PackageId>,
}

impl From<&Vehicle> for VehicleReport {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id(),
            departs_at: vehicle.departs_at(),
            clock: vehicle.clock(),
            location: vehicle.location().to_string(),
            miles: vehicle.miles(),
            pending: vehicle.manifest().to_vec(),
            delivered: vehicle.delivered().to_vec(),
        }
    }
}

/// Package and vehicle state as of one query time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub at: NaiveTime,
    pub packages: Vec<PackageReport>,
    pub vehicles: Vec<VehicleReport>,
}

impl Snapshot {
    pub fn package(&self, id: PackageId) -> Option<&PackageReport> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleReport> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn total_miles(&self) -> f64 {
        self.vehicles.iter().map(|v| v.miles).sum()
    }

    pub fn count(&self, status: PackageStatus) -> usize {
        self.packages.iter().filter(|p| p.status == status).count()
    }

    /// Packages delivered after their deadline.
    pub fn late(&self) -> Vec<PackageId> {
        self.packages
            .iter()
            .filter(|p| p.on_time == Some(false))
            .map(|p| p.id)
            .collect()
    }
}
