use std::path::Path;

use chrono::NaiveTime;
use rstest::{fixture, rstest};

use wgups::{load_scenario, parse_clock, PackageStatus, Scenario, Settings};

fn at(raw: &str) -> NaiveTime {
    parse_clock(raw).expect("valid clock time")
}

#[fixture]
fn scenario() -> Scenario {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let settings = Settings {
        package_csv: root.join("data/packages.csv"),
        distance_csv: root.join("data/distances.csv"),
        ..Settings::default()
    };
    load_scenario(&settings).expect("bundled data loads")
}

#[rstest]
fn loads_forty_packages_and_three_vehicles(scenario: Scenario) {
    assert_eq!(scenario.packages().len(), 40);
    assert_eq!(scenario.fleet().vehicles.len(), 3);
    assert_eq!(scenario.distances().len(), 27);
}

#[rstest]
fn nothing_moves_before_the_first_departure(scenario: Scenario) {
    let snapshot = scenario.snapshot_at(at("08:00"));

    assert_eq!(snapshot.total_miles(), 0.0);
    for report in &snapshot.packages {
        let expected = if [6, 9, 25, 28, 32].contains(&report.id) {
            PackageStatus::Delayed
        } else {
            PackageStatus::AtHub
        };
        assert_eq!(report.status, expected, "package {}", report.id);
    }
}

#[rstest]
fn every_package_is_delivered_on_time_by_end_of_day(scenario: Scenario) {
    let snapshot = scenario.snapshot_at(at("17:00"));

    assert_eq!(snapshot.count(PackageStatus::Delivered), 40);
    assert!(snapshot.late().is_empty(), "late: {:?}", snapshot.late());
    assert!(snapshot.total_miles() < 140.0, "{}", snapshot.total_miles());
    assert!(snapshot.vehicles.iter().all(|v| v.pending.is_empty()));
}

#[rstest]
fn pinned_packages_ride_vehicle_two(scenario: Scenario) {
    let snapshot = scenario.snapshot_at(at("17:00"));
    for id in [3, 18, 36, 38] {
        assert_eq!(snapshot.package(id).and_then(|p| p.vehicle), Some(2), "package {id}");
    }
}

#[rstest]
fn grouped_packages_are_delivered_together(scenario: Scenario) {
    let snapshot = scenario.snapshot_at(at("17:00"));
    let times: Vec<Option<NaiveTime>> = [13, 14, 15, 16, 19, 20]
        .iter()
        .map(|&id| snapshot.package(id).and_then(|p| p.delivered_at))
        .collect();

    assert!(times[0].is_some());
    assert!(times.iter().all(|t| *t == times[0]), "{times:?}");
}

#[rstest]
#[case("10:00", "300 State St", PackageStatus::Delayed)]
#[case("10:20", "410 S State St", PackageStatus::AtHub)]
#[case("17:00", "410 S State St", PackageStatus::Delivered)]
fn wrong_address_is_corrected_at_ten_twenty(
    scenario: Scenario,
    #[case] time: &str,
    #[case] street: &str,
    #[case] status: PackageStatus,
) {
    let snapshot = scenario.snapshot_at(at(time));
    let report = snapshot.package(9).expect("package 9");
    assert_eq!(report.destination.street, street);
    assert_eq!(report.status, status);
}

#[rstest]
fn progress_never_goes_backwards(scenario: Scenario) {
    let times: Vec<NaiveTime> = (8..=13)
        .flat_map(|hour| [0, 20, 40].map(move |minute| NaiveTime::from_hms_opt(hour, minute, 0)))
        .flatten()
        .collect();
    let snapshots = scenario.snapshots_at(&times);

    for pair in snapshots.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        assert!(later.total_miles() >= earlier.total_miles());
        for report in &earlier.packages {
            if report.status == PackageStatus::Delivered {
                let again = later.package(report.id).expect("same packages");
                assert_eq!(again.delivered_at, report.delivered_at);
            }
        }
    }
}
