use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::distance::DistanceIndex;
use crate::domain::types::{Package, PackageId, VehicleId};
use crate::domain::vehicle::FleetPlan;
use crate::error::ScenarioError;
use crate::setup::rules::DispatchRules;

/// Everything about a delivery day that does not change while replaying it.
///
/// Built once and validated up front; replays borrow it immutably, so one
/// scenario can back any number of independent dispatchers.
#[derive(Debug, Clone)]
pub struct Scenario {
    distances: DistanceIndex,
    packages: Vec<Package>,
    fleet: FleetPlan,
    rules: DispatchRules,
    floating: BTreeMap<VehicleId, Vec<PackageId>>,
}

impl Scenario {
    pub fn new(
        distances: DistanceIndex,
        mut packages: Vec<Package>,
        fleet: FleetPlan,
        rules: DispatchRules,
    ) -> Result<Self, ScenarioError> {
        packages.sort_by_key(|p| p.id);
        for pair in packages.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(ScenarioError::DuplicatePackage(pair[0].id));
            }
        }
        for package in &mut packages {
            package.reset();
        }

        let known: HashSet<PackageId> = packages.iter().map(|p| p.id).collect();
        validate_fleet(&fleet, &rules, &known)?;
        validate_rules(&rules, &fleet, &known)?;
        warn_about_addresses(&distances, &packages, &fleet, &rules);

        let floating = assign_floating(&fleet, &rules);

        info!(
            "Scenario ready: {} packages, {} vehicles, {} addresses",
            packages.len(),
            fleet.vehicles.len(),
            distances.len()
        );

        Ok(Self {
            distances,
            packages,
            fleet,
            rules,
            floating,
        })
    }

    pub fn distances(&self) -> &DistanceIndex {
        &self.distances
    }

    /// Start-of-day package records, ordered by id.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn fleet(&self) -> &FleetPlan {
        &self.fleet
    }

    pub fn rules(&self) -> &DispatchRules {
        &self.rules
    }

    /// Delayed packages that are on no manifest, keyed by the vehicle that
    /// picks them up.
    pub fn floating_for(&self, vehicle: VehicleId) -> &[PackageId] {
        self.floating
            .get(&vehicle)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Vehicles only move by driving, so every manifest package must already be
/// available when its vehicle leaves the hub.
fn validate_fleet(
    fleet: &FleetPlan,
    rules: &DispatchRules,
    known: &HashSet<PackageId>,
) -> Result<(), ScenarioError> {
    if !(fleet.speed_mph.is_finite() && fleet.speed_mph > 0.0) {
        return Err(ScenarioError::InvalidSpeed(fleet.speed_mph.to_string()));
    }

    let mut vehicles = HashSet::new();
    let mut owner: HashMap<PackageId, VehicleId> = HashMap::new();
    for plan in &fleet.vehicles {
        if !vehicles.insert(plan.id) {
            return Err(ScenarioError::DuplicateVehicle(plan.id));
        }
        if plan.manifest.len() > fleet.capacity {
            warn!(
                "Vehicle {} is planned with {} packages, over its capacity of {}",
                plan.id,
                plan.manifest.len(),
                fleet.capacity
            );
        }
        for &package in &plan.manifest {
            if !known.contains(&package) {
                return Err(ScenarioError::UnknownPackage {
                    table: "vehicle manifest",
                    package,
                });
            }
            if !rules.is_available(package, plan.departs_at) {
                return Err(ScenarioError::NotReadyAtDeparture {
                    package,
                    vehicle: plan.id,
                    departs_at: plan.departs_at,
                });
            }
            if let Some(first) = owner.insert(package, plan.id) {
                return Err(ScenarioError::DuplicateAssignment {
                    package,
                    first,
                    second: plan.id,
                });
            }
        }
    }
    Ok(())
}

fn validate_rules(
    rules: &DispatchRules,
    fleet: &FleetPlan,
    known: &HashSet<PackageId>,
) -> Result<(), ScenarioError> {
    let check_package = |table: &'static str, package: PackageId| {
        if known.contains(&package) {
            Ok(())
        } else {
            Err(ScenarioError::UnknownPackage { table, package })
        }
    };
    let check_vehicle = |table: &'static str, vehicle: VehicleId| {
        if fleet.vehicle(vehicle).is_some() {
            Ok(())
        } else {
            Err(ScenarioError::UnknownVehicle { table, vehicle })
        }
    };

    for &package in rules.delayed.keys() {
        check_package("delayed-availability table", package)?;
    }
    for (&anchor, companions) in &rules.groups {
        check_package("grouping table", anchor)?;
        for &companion in companions {
            check_package("grouping table", companion)?;
        }
    }
    for (&package, &vehicle) in &rules.pins {
        check_package("hard-pin table", package)?;
        check_vehicle("hard-pin table", vehicle)?;
    }
    for &package in rules.priority_overrides.keys() {
        check_package("priority-override table", package)?;
    }
    for &vehicle in &rules.loading_preference {
        check_vehicle("loading preference", vehicle)?;
    }
    Ok(())
}

fn warn_about_addresses(
    distances: &DistanceIndex,
    packages: &[Package],
    fleet: &FleetPlan,
    rules: &DispatchRules,
) {
    if !distances.contains(&fleet.hub) {
        warn!("Hub address {:?} is not in the distance table", fleet.hub);
    }
    for package in packages {
        let street = rules
            .correction(package.id)
            .map_or(&package.destination.street, |c| &c.destination.street);
        if !distances.contains(street) {
            warn!(
                "Package {} is addressed to {:?}, which is not in the distance table",
                package.id, street
            );
        }
    }
}

/// Route each delayed package that is on no manifest to the first vehicle it
/// may ride: its pinned vehicle if any, otherwise the loading preference in
/// order. A vehicle qualifies when the package is available by its departure
/// and it still has room.
fn assign_floating(
    fleet: &FleetPlan,
    rules: &DispatchRules,
) -> BTreeMap<VehicleId, Vec<PackageId>> {
    let manifested: HashSet<PackageId> = fleet
        .vehicles
        .iter()
        .flat_map(|plan| plan.manifest.iter().copied())
        .collect();
    let mut load: HashMap<VehicleId, usize> = fleet
        .vehicles
        .iter()
        .map(|plan| (plan.id, plan.manifest.len()))
        .collect();

    let mut floating: BTreeMap<VehicleId, Vec<PackageId>> = BTreeMap::new();
    for &package in rules.delayed.keys() {
        if manifested.contains(&package) {
            continue;
        }

        let candidates = match rules.pinned_vehicle(package) {
            Some(vehicle) => vec![vehicle],
            None => rules.loading_preference.clone(),
        };
        let target = candidates.into_iter().find(|id| {
            fleet.vehicle(*id).is_some_and(|plan| {
                rules.is_available(package, plan.departs_at)
                    && load.get(id).copied().unwrap_or_default() < fleet.capacity
            })
        });

        match target {
            Some(vehicle) => {
                *load.entry(vehicle).or_default() += 1;
                floating.entry(vehicle).or_default().push(package);
                debug!("Delayed package {} will ride vehicle {}", package, vehicle);
            }
            None => warn!(
                "No vehicle can carry delayed package {}; it will stay at the hub",
                package
            ),
        }
    }
    floating
}
