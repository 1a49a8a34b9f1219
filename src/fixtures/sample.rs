//! A small hand-checked delivery day.
//!
//! Six addresses, eight packages and three vehicles. Every leg is a multiple
//! of 0.9 mi, so at 18 mph each hop lands on a whole minute:
//!
//! | from \ to | Hub | Alder | Birch | Cedar | Dogwood | Elm |
//! |-----------|-----|-------|-------|-------|---------|-----|
//! | Hub       | 0   | 1.8   | 3.6   | 0.9   | 5.4     | 2.7 |
//! | Alder     |     | 0     | 1.8   | 2.7   | 3.6     | 4.5 |
//! | Birch     |     |       | 0     | 4.5   | 1.8     | 2.7 |
//! | Cedar     |     |       |       | 0     | 6.3     | 1.8 |
//! | Dogwood   |     |       |       |       | 0       | 3.6 |
//!
//! Replayed to the end of the day, vehicle 1 drives 9.0 mi, vehicle 2 drives
//! 10.8 mi (picking up delayed package 8 on the way out) and vehicle 3 drives
//! 5.4 mi with the corrected address for package 7.

use std::collections::BTreeMap;

use crate::distance::DistanceIndex;
use crate::domain::types::{Deadline, Destination, Package};
use crate::domain::vehicle::{FleetPlan, VehiclePlan};
use crate::setup::rules::{DelayedRelease, DispatchRules};
use crate::setup::scenario::Scenario;
use crate::utils::hms;

pub const HUB: &str = "100 Depot Rd";
pub const ALDER: &str = "1 Alder St";
pub const BIRCH: &str = "2 Birch St";
pub const CEDAR: &str = "3 Cedar St";
pub const DOGWOOD: &str = "4 Dogwood St";
pub const ELM: &str = "5 Elm St";
/// Where package 7 is addressed until its correction comes in.
pub const WRONG_ADDRESS: &str = "9 Wrong Way";

pub const SPEED_MPH: f64 = 18.0;
pub const CAPACITY: usize = 16;

pub fn destination(street: &str) -> Destination {
    Destination {
        street: street.to_string(),
        city: "Sampleton".to_string(),
        state: "UT".to_string(),
        zip_code: "84000".to_string(),
    }
}

pub fn distances() -> DistanceIndex {
    let addresses = [HUB, ALDER, BIRCH, CEDAR, DOGWOOD, ELM]
        .map(str::to_string)
        .to_vec();
    let lower = [
        vec![0.0],
        vec![1.8, 0.0],
        vec![3.6, 1.8, 0.0],
        vec![0.9, 2.7, 4.5, 0.0],
        vec![5.4, 3.6, 1.8, 6.3, 0.0],
        vec![2.7, 4.5, 2.7, 1.8, 3.6, 0.0],
    ];
    let matrix = lower
        .into_iter()
        .map(|mut row| {
            row.resize(addresses.len(), 0.0);
            row
        })
        .collect();
    // The shape is fixed above, so construction cannot fail.
    DistanceIndex::new(addresses, matrix).unwrap_or_else(|err| panic!("sample distances: {err}"))
}

pub fn packages() -> Vec<Package> {
    let by = |h, m| Deadline::By(hms(h, m, 0));
    vec![
        Package::new(1, destination(ALDER), by(9, 0), 5, "Deliver with 2"),
        Package::new(2, destination(BIRCH), Deadline::EndOfDay, 3, ""),
        Package::new(3, destination(CEDAR), by(10, 30), 8, ""),
        Package::new(4, destination(DOGWOOD), Deadline::EndOfDay, 2, "Vehicle 2 only"),
        Package::new(5, destination(ELM), Deadline::EndOfDay, 4, ""),
        Package::new(6, destination(DOGWOOD), Deadline::EndOfDay, 6, "Arrives 9:05"),
        Package::new(7, destination(WRONG_ADDRESS), Deadline::EndOfDay, 1, "Wrong address listed"),
        Package::new(8, destination(BIRCH), Deadline::EndOfDay, 7, "Arrives 9:00"),
    ]
}

pub fn fleet() -> FleetPlan {
    FleetPlan {
        hub: HUB.to_string(),
        speed_mph: SPEED_MPH,
        capacity: CAPACITY,
        vehicles: vec![
            VehiclePlan::new(1, hms(8, 0, 0), vec![1, 2, 3, 5]),
            VehiclePlan::new(2, hms(9, 15, 0), vec![4, 6]),
            VehiclePlan::new(3, hms(9, 30, 0), vec![7]),
        ],
    }
}

pub fn rules() -> DispatchRules {
    DispatchRules {
        delayed: BTreeMap::from([
            (6, DelayedRelease::at(hms(9, 5, 0))),
            (
                7,
                DelayedRelease::at(hms(9, 20, 0)).with_correction(hms(9, 20, 0), destination(ELM)),
            ),
            (8, DelayedRelease::at(hms(9, 0, 0))),
        ]),
        groups: BTreeMap::from([(1, vec![2])]),
        pins: BTreeMap::from([(4, 2)]),
        priority_overrides: BTreeMap::new(),
        loading_preference: vec![2, 3],
    }
}

/// Build a scenario from the sample pieces, letting callers tweak any of them.
pub fn scenario_with(
    fleet: FleetPlan,
    rules: DispatchRules,
) -> Result<Scenario, crate::error::ScenarioError> {
    Scenario::new(distances(), packages(), fleet, rules)
}

pub fn scenario() -> Scenario {
    scenario_with(fleet(), rules()).unwrap_or_else(|err| panic!("sample scenario: {err}"))
}
