//! Dataset-specific dispatch rules, expressed as lookup tables so the route
//! simulator itself never mentions a package id.

use std::collections::BTreeMap;

use chrono::NaiveTime;

use crate::domain::types::{Deadline, Destination, PackageId, VehicleId};

/// A package that reaches the hub late, possibly with a corrected address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedRelease {
    pub ready_at: NaiveTime,
    pub correction: Option<AddressCorrection>,
}

impl DelayedRelease {
    pub const fn at(ready_at: NaiveTime) -> Self {
        Self {
            ready_at,
            correction: None,
        }
    }

    pub fn with_correction(mut self, effective_at: NaiveTime, destination: Destination) -> Self {
        self.correction = Some(AddressCorrection {
            effective_at,
            destination,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCorrection {
    pub effective_at: NaiveTime,
    pub destination: Destination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchRules {
    /// Earliest load time per package.
    pub delayed: BTreeMap<PackageId, DelayedRelease>,
    /// Anchor package -> companions delivered in the same stop.
    pub groups: BTreeMap<PackageId, Vec<PackageId>>,
    /// Package -> the only vehicle allowed to carry it.
    pub pins: BTreeMap<PackageId, VehicleId>,
    /// Scheduling deadlines that replace the real one when ordering stops.
    pub priority_overrides: BTreeMap<PackageId, NaiveTime>,
    /// Vehicles, in order of preference, for delayed packages that are on no
    /// manifest.
    pub loading_preference: Vec<VehicleId>,
}

impl DispatchRules {
    pub fn release(&self, package: PackageId) -> Option<&DelayedRelease> {
        self.delayed.get(&package)
    }

    pub fn correction(&self, package: PackageId) -> Option<&AddressCorrection> {
        self.delayed
            .get(&package)
            .and_then(|release| release.correction.as_ref())
    }

    /// Whether the package may be loaded or delivered once the clock reads
    /// `now`.
    pub fn is_available(&self, package: PackageId, now: NaiveTime) -> bool {
        self.release(package).map_or(true, |release| {
            release.ready_at <= now
                && release
                    .correction
                    .as_ref()
                    .map_or(true, |c| c.effective_at <= now)
        })
    }

    pub fn pinned_vehicle(&self, package: PackageId) -> Option<VehicleId> {
        self.pins.get(&package).copied()
    }

    pub fn allows(&self, package: PackageId, vehicle: VehicleId) -> bool {
        self.pinned_vehicle(package).map_or(true, |pinned| pinned == vehicle)
    }

    pub fn companions(&self, anchor: PackageId) -> &[PackageId] {
        self.groups
            .get(&anchor)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The anchor a companion travels with, if any.
    pub fn anchor_of(&self, package: PackageId) -> Option<PackageId> {
        self.groups
            .iter()
            .find(|(_, companions)| companions.contains(&package))
            .map(|(&anchor, _)| anchor)
    }

    /// Deadline used to order stops; the real deadline unless overridden.
    pub fn scheduling_deadline(&self, package: PackageId, deadline: Deadline) -> Deadline {
        self.priority_overrides
            .get(&package)
            .map_or(deadline, |&time| Deadline::By(time))
    }
}
