pub mod store;
pub mod types;
pub mod vehicle;

pub use store::PackageStore;
pub use types::*;
pub use vehicle::{FleetPlan, Vehicle, VehiclePlan};
