use tracing::info;

use crate::config::Settings;
use crate::error::LoadError;
use crate::setup::loader::{load_distances, load_packages};
use crate::setup::scenario::Scenario;
use crate::setup::wgups;

/// Load the package and distance files named by `settings` and pair them
/// with the built-in WGUPS fleet plan and dispatch rules.
pub fn load_scenario(settings: &Settings) -> Result<Scenario, LoadError> {
    info!(
        "Loading scenario from {:?} and {:?}",
        settings.package_csv, settings.distance_csv
    );

    let distances = load_distances(&settings.distance_csv)?;
    let packages = load_packages(&settings.package_csv)?;
    let fleet = wgups::fleet(settings.speed_mph);
    if !distances.contains(&fleet.hub) {
        return Err(LoadError::UnknownHub(fleet.hub));
    }

    Ok(Scenario::new(distances, packages, fleet, wgups::rules())?)
}
