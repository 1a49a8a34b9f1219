//! Single-depot, multi-vehicle package delivery simulator.
//!
//! A [`Scenario`] holds the static description of a delivery day. A
//! [`Dispatcher`] replays that day up to any clock time and reports where
//! every package and vehicle stood at that moment.

pub mod config;
pub mod distance;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod setup;
pub mod solver;
pub mod utils;

pub use config::Settings;
pub use distance::DistanceIndex;
pub use domain::{
    Deadline, Destination, FleetPlan, Package, PackageId, PackageStatus, PackageStore, Progress,
    Vehicle, VehicleId, VehiclePlan,
};
pub use error::{DispatchError, DistanceError, LoadError, ScenarioError, TimeParseError};
pub use setup::{load_scenario, DispatchRules, Scenario};
pub use solver::{Dispatcher, PackageReport, Snapshot, VehicleReport};
pub use utils::parse_clock;
