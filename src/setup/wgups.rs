//! Built-in fleet plan and dispatch rules for the WGUPS delivery day.

use std::collections::BTreeMap;

use crate::config::constant::{HUB_ADDRESS, VEHICLE_CAPACITY};
use crate::domain::types::Destination;
use crate::domain::vehicle::{FleetPlan, VehiclePlan};
use crate::setup::rules::{DelayedRelease, DispatchRules};
use crate::utils::hms;

pub fn fleet(speed_mph: f64) -> FleetPlan {
    FleetPlan {
        hub: HUB_ADDRESS.to_string(),
        speed_mph,
        capacity: VEHICLE_CAPACITY,
        vehicles: vec![
            VehiclePlan::new(
                1,
                hms(8, 5, 0),
                vec![1, 7, 8, 13, 14, 15, 16, 19, 20, 29, 30, 31, 34, 37, 40],
            ),
            VehiclePlan::new(
                2,
                hms(9, 15, 0),
                vec![3, 5, 6, 10, 11, 12, 17, 18, 21, 22, 23, 24, 25, 28, 36, 38],
            ),
            VehiclePlan::new(3, hms(10, 25, 0), vec![2, 4, 9, 26, 27, 32, 33, 35, 39]),
        ],
    }
}

pub fn rules() -> DispatchRules {
    // Flights land at 9:05; the corrected address for 9 arrives at 10:20.
    let flight = DelayedRelease::at(hms(9, 5, 0));
    let corrected = Destination {
        street: "410 S State St".to_string(),
        city: "Salt Lake City".to_string(),
        state: "UT".to_string(),
        zip_code: "84111".to_string(),
    };

    DispatchRules {
        delayed: BTreeMap::from([
            (6, flight.clone()),
            (25, flight.clone()),
            (28, flight.clone()),
            (32, flight),
            (
                9,
                DelayedRelease::at(hms(10, 20, 0)).with_correction(hms(10, 20, 0), corrected),
            ),
        ]),
        groups: BTreeMap::from([(15, vec![13, 14, 16, 19, 20])]),
        pins: BTreeMap::from([(3, 2), (18, 2), (36, 2), (38, 2)]),
        priority_overrides: BTreeMap::new(),
        loading_preference: vec![2, 3],
    }
}
