//! Constraint-aware nearest-neighbour route simulation for one vehicle.
//!
//! The vehicle repeatedly drives to the eligible package with the earliest
//! scheduling deadline, breaking ties by distance from where it stands (then
//! by id), until nothing is eligible or the next arrival would pass the
//! horizon. Once the manifest is empty it heads back to the hub.

use std::cmp::Ordering;

use chrono::NaiveTime;
use tracing::{debug, error, info, span, trace, warn, Level};

use crate::distance::DistanceIndex;
use crate::domain::store::PackageStore;
use crate::domain::types::{Deadline, PackageId, Progress, VehicleId};
use crate::domain::vehicle::Vehicle;
use crate::error::DispatchError;
use crate::setup::rules::DispatchRules;
use crate::utils::format_clock;

/// A candidate next stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub package: PackageId,
    pub deadline: Deadline,
    pub miles: f64,
}

impl Stop {
    /// Earliest deadline first, then nearest, then lowest id.
    pub fn priority(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then_with(|| self.miles.total_cmp(&other.miles))
            .then_with(|| self.package.cmp(&other.package))
    }
}

/// What one vehicle managed before the horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: usize,
    pub late: Vec<PackageId>,
    pub returned_to_hub: bool,
}

pub struct RouteSimulator<'a> {
    distances: &'a DistanceIndex,
    rules: &'a DispatchRules,
    horizon: NaiveTime,
}

impl<'a> RouteSimulator<'a> {
    pub fn new(
        distances: &'a DistanceIndex,
        rules: &'a DispatchRules,
        horizon: NaiveTime,
    ) -> Self {
        Self {
            distances,
            rules,
            horizon,
        }
    }

    pub fn horizon(&self) -> NaiveTime {
        self.horizon
    }

    /// Advance `vehicle` through its manifest up to the horizon.
    ///
    /// `floating` lists delayed packages that are on no manifest but were
    /// routed to this vehicle; they are loaded at departure.
    pub fn run(
        &self,
        vehicle: &mut Vehicle,
        packages: &mut PackageStore,
        floating: &[PackageId],
    ) -> Result<RunSummary, DispatchError> {
        let span = span!(Level::DEBUG, "vehicle", id = vehicle.id());
        let _guard = span.enter();

        let mut summary = RunSummary::default();
        if vehicle.departs_at() > self.horizon {
            debug!(
                "Vehicle {} departs at {}, after {}",
                vehicle.id(),
                format_clock(vehicle.departs_at()),
                format_clock(self.horizon)
            );
            return Ok(summary);
        }

        self.load_floating(vehicle, packages, floating);
        self.load_manifest(vehicle, packages)?;

        while let Some(stop) = self.next_stop(vehicle, packages)? {
            let Some(arrival) = vehicle
                .arrival_after(stop.miles)
                .filter(|arrival| *arrival <= self.horizon)
            else {
                trace!(
                    "Vehicle {} would reach package {} after {}, stopping",
                    vehicle.id(),
                    stop.package,
                    format_clock(self.horizon)
                );
                break;
            };
            self.deliver(vehicle, packages, stop, arrival, &mut summary)?;
        }

        if vehicle.manifest().is_empty() {
            summary.returned_to_hub = self.return_to_hub(vehicle)?;
        } else {
            trace!(
                "Vehicle {} still holds {:?} at {}",
                vehicle.id(),
                vehicle.manifest(),
                format_clock(vehicle.clock())
            );
        }

        Ok(summary)
    }

    fn load_floating(
        &self,
        vehicle: &mut Vehicle,
        packages: &PackageStore,
        floating: &[PackageId],
    ) {
        for &package in floating {
            let waiting = packages
                .get(package)
                .is_some_and(|p| p.progress == Progress::Waiting);
            if waiting && self.rules.is_available(package, vehicle.departs_at()) {
                info!("Vehicle {} picks up delayed package {}", vehicle.id(), package);
                vehicle.load(package);
            }
        }
    }

    /// Stamp vehicle and departure time on every package the vehicle carries.
    fn load_manifest(
        &self,
        vehicle: &mut Vehicle,
        packages: &mut PackageStore,
    ) -> Result<(), DispatchError> {
        let vehicle_id = vehicle.id();
        let departed_at = vehicle.departs_at();

        for package_id in vehicle.manifest().to_vec() {
            if !self.rules.allows(package_id, vehicle_id) {
                warn!(
                    "Package {} is pinned to vehicle {:?}, not loading it on vehicle {}",
                    package_id,
                    self.rules.pinned_vehicle(package_id),
                    vehicle_id
                );
                vehicle.unload(package_id);
                continue;
            }

            let package = packages
                .get_mut(package_id)
                .ok_or(DispatchError::PackageNotFound {
                    vehicle: vehicle_id,
                    package: package_id,
                })?;
            match package.progress.vehicle() {
                None => {
                    package.progress = Progress::Loaded {
                        vehicle: vehicle_id,
                        departed_at,
                    };
                }
                Some(owner) if owner == vehicle_id => {}
                Some(owner) => {
                    debug_assert_eq!(
                        owner, vehicle_id,
                        "package {package_id} is loaded on two vehicles"
                    );
                    error!(
                        "Package {} already belongs to vehicle {}, dropping it from vehicle {}",
                        package_id,
                        owner,
                        vehicle_id
                    );
                    vehicle.unload(package_id);
                }
            }
        }
        Ok(())
    }

    /// Best eligible stop from the vehicle's current position, if any.
    pub fn next_stop(
        &self,
        vehicle: &Vehicle,
        packages: &PackageStore,
    ) -> Result<Option<Stop>, DispatchError> {
        let now = vehicle.clock();
        let mut best: Option<Stop> = None;

        for &package_id in vehicle.manifest() {
            if !self.rules.is_available(package_id, now) {
                continue;
            }
            if self
                .rules
                .anchor_of(package_id)
                .is_some_and(|anchor| vehicle.carries(anchor))
            {
                continue;
            }
            // The whole group leaves at once, so the anchor waits on its slowest companion.
            if let Some(&held) = self
                .rules
                .companions(package_id)
                .iter()
                .find(|&&c| vehicle.carries(c) && !self.rules.is_available(c, now))
            {
                trace!(
                    "Package {} held back until companion {} is available",
                    package_id,
                    held
                );
                continue;
            }

            let package = packages
                .get(package_id)
                .ok_or(DispatchError::PackageNotFound {
                    vehicle: vehicle.id(),
                    package: package_id,
                })?;
            let miles = match self
                .distances
                .distance(vehicle.location(), &package.destination.street)
            {
                Ok(miles) => miles,
                Err(err) => {
                    warn!("No route to package {}: {}", package_id, err);
                    continue;
                }
            };

            let candidate = Stop {
                package: package_id,
                deadline: self.rules.scheduling_deadline(package_id, package.deadline),
                miles,
            };
            if best.map_or(true, |current| candidate.priority(&current).is_lt()) {
                best = Some(candidate);
            }
        }

        Ok(best)
    }

    fn deliver(
        &self,
        vehicle: &mut Vehicle,
        packages: &mut PackageStore,
        stop: Stop,
        arrival: NaiveTime,
        summary: &mut RunSummary,
    ) -> Result<(), DispatchError> {
        vehicle.advance_to(stop.miles);
        debug_assert_eq!(vehicle.clock(), arrival);

        let (vehicle_id, departed_at) = (vehicle.id(), vehicle.departs_at());
        let street = self.stamp(vehicle_id, departed_at, packages, stop.package, arrival, summary)?;
        vehicle.relocate(&street);
        vehicle.mark_delivered(stop.package);
        debug!(
            "Vehicle {} delivered package {} to {} at {} ({:.1} mi, {:.1} mi total)",
            vehicle.id(),
            stop.package,
            street,
            format_clock(arrival),
            stop.miles,
            vehicle.miles()
        );

        for &companion in self.rules.companions(stop.package) {
            if !vehicle.carries(companion) {
                continue;
            }
            self.stamp(vehicle_id, departed_at, packages, companion, arrival, summary)?;
            vehicle.mark_delivered(companion);
            debug!(
                "Vehicle {} delivered package {} with package {}",
                vehicle.id(),
                companion,
                stop.package
            );
        }
        Ok(())
    }

    /// Mark a package delivered and return the street it was delivered to.
    fn stamp(
        &self,
        vehicle: VehicleId,
        departed_at: NaiveTime,
        packages: &mut PackageStore,
        package_id: PackageId,
        at: NaiveTime,
        summary: &mut RunSummary,
    ) -> Result<String, DispatchError> {
        let package = packages
            .get_mut(package_id)
            .ok_or(DispatchError::PackageNotFound {
                vehicle,
                package: package_id,
            })?;
        package.progress = Progress::Delivered {
            vehicle,
            departed_at,
            delivered_at: at,
        };
        summary.delivered += 1;

        if !package.deadline.is_met_by(at) {
            warn!(
                "Package {} delivered at {}, after its {} deadline",
                package_id,
                format_clock(at),
                package.deadline
            );
            summary.late.push(package_id);
        }
        Ok(package.destination.street.clone())
    }

    /// Drive back to the hub if the hop finishes by the horizon.
    fn return_to_hub(&self, vehicle: &mut Vehicle) -> Result<bool, DispatchError> {
        if vehicle.is_at_hub() {
            return Ok(false);
        }

        let miles = self.distances.distance(vehicle.location(), vehicle.hub())?;
        if vehicle
            .arrival_after(miles)
            .is_some_and(|arrival| arrival <= self.horizon)
        {
            let hub = vehicle.hub().to_string();
            vehicle.advance_to(miles);
            vehicle.relocate(&hub);
            debug!(
                "Vehicle {} back at the hub at {} ({:.1} mi total)",
                vehicle.id(),
                format_clock(vehicle.clock()),
                vehicle.miles()
            );
            return Ok(true);
        }
        Ok(false)
    }
}
