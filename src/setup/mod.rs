pub mod init;
pub mod loader;
pub mod rules;
pub mod scenario;
pub mod wgups;

pub use init::load_scenario;
pub use rules::{AddressCorrection, DelayedRelease, DispatchRules};
pub use scenario::Scenario;
