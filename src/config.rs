use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

pub mod constant {
    pub const AVERAGE_SPEED_MPH: f64 = 18.0;
    pub const VEHICLE_CAPACITY: usize = 16;
    pub const HUB_ADDRESS: &str = "4001 South 700 East";
    pub const PACKAGE_CSV_PATH: &str = "data/packages.csv";
    pub const DISTANCE_CSV_PATH: &str = "data/distances.csv";
    /// Deadline token meaning "any time before the day ends".
    pub const END_OF_DAY_TOKEN: &str = "EOD";
    /// Latest horizon the CLI uses when asked for an end-of-day report.
    pub const END_OF_DAY_HORIZON: &str = "17:00:00";
}

const PACKAGES_ENV: &str = "WGUPS_PACKAGES";
const DISTANCES_ENV: &str = "WGUPS_DISTANCES";
const SPEED_ENV: &str = "WGUPS_SPEED_MPH";

/// Runtime settings resolved from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub package_csv: PathBuf,
    pub distance_csv: PathBuf,
    pub speed_mph: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package_csv: PathBuf::from(constant::PACKAGE_CSV_PATH),
            distance_csv: PathBuf::from(constant::DISTANCE_CSV_PATH),
            speed_mph: constant::AVERAGE_SPEED_MPH,
        }
    }
}

impl Settings {
    /// Read settings from the process environment, falling back to the
    /// compiled defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let package_csv = lookup(PACKAGES_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.package_csv);
        let distance_csv = lookup(DISTANCES_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.distance_csv);

        let speed_mph = match lookup(SPEED_ENV) {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(speed) if speed.is_finite() && speed > 0.0 => speed,
                _ => {
                    warn!(
                        "{} = {:?} is not a positive number, using {} mph",
                        SPEED_ENV, raw, defaults.speed_mph
                    );
                    defaults.speed_mph
                }
            },
            None => defaults.speed_mph,
        };

        info!(
            "Settings: packages={}, distances={}, speed={} mph",
            package_csv.display(),
            distance_csv.display(),
            speed_mph
        );

        Self {
            package_csv,
            distance_csv,
            speed_mph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn falls_back_to_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
    }

    #[rstest]
    #[case("24", 24.0)]
    #[case(" 30.5 ", 30.5)]
    #[case("-3", constant::AVERAGE_SPEED_MPH)]
    #[case("fast", constant::AVERAGE_SPEED_MPH)]
    #[case("NaN", constant::AVERAGE_SPEED_MPH)]
    fn speed_override_is_validated(#[case] raw: &str, #[case] expected: f64) {
        let settings = Settings::from_lookup(|key| (key == SPEED_ENV).then(|| raw.to_string()));
        assert_eq!(settings.speed_mph, expected);
    }

    #[rstest]
    fn paths_come_from_environment() {
        let settings = Settings::from_lookup(|key| match key {
            PACKAGES_ENV => Some("/tmp/p.csv".to_string()),
            DISTANCES_ENV => Some("/tmp/d.csv".to_string()),
            _ => None,
        });
        assert_eq!(settings.package_csv, PathBuf::from("/tmp/p.csv"));
        assert_eq!(settings.distance_csv, PathBuf::from("/tmp/d.csv"));
    }
}
