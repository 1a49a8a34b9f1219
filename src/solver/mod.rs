pub mod nearest_neighbor;
pub mod replay;
pub mod snapshot;

pub use nearest_neighbor::{RouteSimulator, RunSummary, Stop};
pub use replay::Dispatcher;
pub use snapshot::{status_at, PackageReport, Snapshot, VehicleReport};
