use std::path::PathBuf;

use chrono::NaiveTime;

use thiserror::Error;

use crate::domain::types::{PackageId, VehicleId};

/// Errors from [`crate::distance::matrix::DistanceIndex::distance`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// The address does not appear in the distance table.
    #[error("address {0:?} is not in the distance index")]
    UnknownAddress(String),
    /// Both addresses are known but neither matrix cell holds a distance.
    #[error("no distance recorded between {from:?} and {to:?}")]
    MissingEntry { from: String, to: String },
}

/// A caller supplied a clock time the parser does not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time {input:?}: expected HH:MM:SS or HH:MM (24-hour)")]
pub struct TimeParseError {
    pub input: String,
}

/// Failures raised while simulating a single vehicle.
///
/// These never abort a replay: the controller logs them and moves on to the
/// next vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("vehicle {vehicle} references package {package} which is not in the store")]
    PackageNotFound {
        vehicle: VehicleId,
        package: PackageId,
    },
    #[error(transparent)]
    Distance(#[from] DistanceError),
}

/// Structural problems with a scenario's static configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("package {0} appears more than once in the package list")]
    DuplicatePackage(PackageId),
    #[error("vehicle {0} is declared more than once")]
    DuplicateVehicle(VehicleId),
    #[error("package {package} is listed on vehicles {first} and {second}")]
    DuplicateAssignment {
        package: PackageId,
        first: VehicleId,
        second: VehicleId,
    },
    #[error("{table} references unknown package {package}")]
    UnknownPackage {
        table: &'static str,
        package: PackageId,
    },
    #[error("{table} references unknown vehicle {vehicle}")]
    UnknownVehicle {
        table: &'static str,
        vehicle: VehicleId,
    },
    #[error("package {package} is not ready when vehicle {vehicle} departs at {departs_at}")]
    NotReadyAtDeparture {
        package: PackageId,
        vehicle: VehicleId,
        departs_at: NaiveTime,
    },
    #[error("average speed must be positive, got {0}")]
    InvalidSpeed(String),
}

/// Errors from reading the package and distance files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path:?} line {line}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("distance table has {rows} rows but {addresses} addresses")]
    MatrixShape { rows: usize, addresses: usize },
    #[error("hub address {0:?} is not in the distance table")]
    UnknownHub(String),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
