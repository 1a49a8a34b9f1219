use chrono::NaiveTime;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::constant::{AVERAGE_SPEED_MPH, VEHICLE_CAPACITY};
use crate::distance::DistanceIndex;
use crate::domain::types::{Deadline, Destination, Package, PackageId, VehicleId};
use crate::domain::vehicle::{FleetPlan, VehiclePlan};
use crate::error::LoadError;
use crate::setup::rules::{DelayedRelease, DispatchRules};
use crate::setup::scenario::Scenario;
use crate::utils::hms;

const HUB: &str = "0 Hub Plaza";
const DEPARTURES: [(u32, u32); 3] = [(8, 0), (9, 5), (10, 20)];
const LATE_ARRIVAL: (u32, u32) = (9, 5);

fn street(index: usize) -> String {
    if index == 0 {
        HUB.to_string()
    } else {
        format!("{index} Generated Ave")
    }
}

fn destination(street: String) -> Destination {
    Destination {
        street,
        city: "Randomville".to_string(),
        state: "UT".to_string(),
        zip_code: "84000".to_string(),
    }
}

/// Lower-triangular matrix of distances between 0.1 and 9.9 miles, rounded to
/// a tenth like the real table.
fn random_distances(rng: &mut ChaCha8Rng, address_count: usize) -> Vec<Vec<f64>> {
    (0..address_count)
        .map(|row| {
            (0..address_count)
                .map(|column| match column.cmp(&row) {
                    std::cmp::Ordering::Less => f64::from(rng.gen_range(1..100_u32)) / 10.0,
                    _ => 0.0,
                })
                .collect()
        })
        .collect()
}

fn random_deadline(rng: &mut ChaCha8Rng) -> Deadline {
    match rng.gen_range(0..4) {
        0 => Deadline::By(hms(9, 0, 0)),
        1 => Deadline::By(hms(10, 30, 0)),
        _ => Deadline::EndOfDay,
    }
}

fn departure(index: usize) -> NaiveTime {
    let (hour, minute) = DEPARTURES[index % DEPARTURES.len()];
    hms(hour, minute, 0)
}

/// Build a seeded random delivery day.
///
/// Packages are spread over three vehicles without exceeding capacity; the
/// rest float at the hub as late arrivals. A few packages on the later
/// vehicles are delayed until 9:05, one of them with an address correction,
/// and each vehicle may carry one delivery group and one pinned package.
pub fn generate_random_scenario(
    seed: u64,
    package_count: usize,
    address_count: usize,
) -> Result<Scenario, LoadError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let address_count = address_count.max(2);

    let addresses: Vec<String> = (0..address_count).map(street).collect();
    let matrix = random_distances(&mut rng, address_count);

    let packages: Vec<Package> = (1..=package_count as PackageId)
        .map(|id| {
            let target = rng.gen_range(1..address_count);
            Package::new(
                id,
                destination(street(target)),
                random_deadline(&mut rng),
                rng.gen_range(1..=50),
                "",
            )
        })
        .collect();

    let mut order: Vec<PackageId> = packages.iter().map(|p| p.id).collect();
    order.shuffle(&mut rng);

    let mut manifests: Vec<Vec<PackageId>> = vec![Vec::new(); DEPARTURES.len()];
    let mut floating = Vec::new();
    for (slot, id) in order.into_iter().enumerate() {
        let vehicle = slot % DEPARTURES.len();
        if manifests[vehicle].len() < VEHICLE_CAPACITY && rng.gen_bool(0.9) {
            manifests[vehicle].push(id);
        } else {
            floating.push(id);
        }
    }

    let mut rules = DispatchRules {
        loading_preference: vec![2, 3],
        ..DispatchRules::default()
    };
    let (hour, minute) = LATE_ARRIVAL;
    let late = DelayedRelease::at(hms(hour, minute, 0));

    for &id in &floating {
        rules.delayed.insert(id, late.clone());
    }
    for (index, manifest) in manifests.iter().enumerate().skip(1) {
        let vehicle = (index + 1) as VehicleId;
        if let Some(&first) = manifest.first() {
            if rng.gen_bool(0.5) {
                let corrected = destination(street(rng.gen_range(1..address_count)));
                let release = late.clone().with_correction(late.ready_at, corrected);
                rules.delayed.insert(first, release);
            } else {
                rules.delayed.insert(first, late.clone());
            }
        }
        if let Some(&pinned) = manifest.get(1) {
            rules.pins.insert(pinned, vehicle);
        }
    }
    for manifest in &manifests {
        if manifest.len() >= 4 && rng.gen_bool(0.5) {
            rules.groups.insert(manifest[2], manifest[3..4].to_vec());
        }
    }

    debug!("Generated manifests {:?}, floating {:?}", manifests, floating);

    let fleet = FleetPlan {
        hub: HUB.to_string(),
        speed_mph: AVERAGE_SPEED_MPH,
        capacity: VEHICLE_CAPACITY,
        vehicles: manifests
            .into_iter()
            .enumerate()
            .map(|(index, manifest)| {
                VehiclePlan::new((index + 1) as VehicleId, departure(index), manifest)
            })
            .collect(),
    };

    info!(
        "Generated scenario: seed {}, {} packages, {} addresses",
        seed, package_count, address_count
    );

    let distances = DistanceIndex::new(addresses, matrix)?;
    Ok(Scenario::new(distances, packages, fleet, rules)?)
}
