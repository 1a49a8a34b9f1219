//! Replay controller: answers "as of T" questions by resetting the day and
//! re-simulating every vehicle up to T.

use chrono::NaiveTime;
use rayon::prelude::*;
use tracing::{debug, error, info, span, Level};

use crate::domain::store::PackageStore;
use crate::domain::types::{PackageId, PackageStatus};
use crate::domain::vehicle::Vehicle;
use crate::setup::scenario::Scenario;
use crate::solver::nearest_neighbor::RouteSimulator;
use crate::solver::snapshot::{PackageReport, Snapshot, VehicleReport};
use crate::utils::format_clock;

/// Mutable run state for one scenario.
///
/// Queries take `&mut self`, so a single dispatcher answers one query at a
/// time. Independent queries can run side by side on separate dispatchers
/// (see [`Scenario::snapshots_at`]).
#[derive(Debug, Clone)]
pub struct Dispatcher<'s> {
    scenario: &'s Scenario,
    packages: PackageStore,
    vehicles: Vec<Vehicle>,
}

impl<'s> Dispatcher<'s> {
    pub fn new(scenario: &'s Scenario) -> Self {
        let fleet = scenario.fleet();
        Self {
            scenario,
            packages: scenario.packages().iter().cloned().collect(),
            vehicles: fleet
                .vehicles
                .iter()
                .map(|plan| Vehicle::from_plan(plan, &fleet.hub, fleet.speed_mph))
                .collect(),
        }
    }

    pub fn scenario(&self) -> &'s Scenario {
        self.scenario
    }

    pub fn packages(&self) -> &PackageStore {
        &self.packages
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Put every package and vehicle back to its start-of-day state.
    pub fn reset(&mut self) {
        self.packages.reset();
        for (vehicle, plan) in self.vehicles.iter_mut().zip(&self.scenario.fleet().vehicles) {
            vehicle.reset(plan);
        }
    }

    /// Replay the day up to `at` and report every package and vehicle.
    pub fn query_state(&mut self, at: NaiveTime) -> Snapshot {
        let span = span!(Level::INFO, "replay", at = %format_clock(at));
        let _guard = span.enter();

        self.reset();
        self.apply_corrections(at);

        let scenario = self.scenario;
        let simulator = RouteSimulator::new(scenario.distances(), scenario.rules(), at);
        for vehicle in &mut self.vehicles {
            let floating = scenario.floating_for(vehicle.id());
            match simulator.run(vehicle, &mut self.packages, floating) {
                Ok(summary) => debug!(
                    "Vehicle {}: {} delivered, {} late, {:.1} mi",
                    vehicle.id(),
                    summary.delivered,
                    summary.late.len(),
                    vehicle.miles()
                ),
                Err(err) => error!("Vehicle {} stopped early: {}", vehicle.id(), err),
            }
        }

        let snapshot = self.snapshot(at);
        info!(
            "Replayed to {}: {} packages delivered, {:.1} mi driven",
            format_clock(at),
            snapshot.count(PackageStatus::Delivered),
            snapshot.total_miles()
        );
        snapshot
    }

    /// Fleet mileage as of `at`.
    pub fn total_miles(&mut self, at: NaiveTime) -> f64 {
        self.query_state(at).total_miles()
    }

    /// One package's report as of `at`, or `None` for an unknown id.
    pub fn package_at(&mut self, id: PackageId, at: NaiveTime) -> Option<PackageReport> {
        if !self.packages.contains(id) {
            return None;
        }
        self.query_state(at).package(id).cloned()
    }

    /// Address corrections become known at the hub once their time passes.
    fn apply_corrections(&mut self, at: NaiveTime) {
        for (&id, release) in &self.scenario.rules().delayed {
            let Some(correction) = release.correction.as_ref() else {
                continue;
            };
            if correction.effective_at > at {
                continue;
            }
            if let Some(package) = self.packages.get_mut(id) {
                debug!(
                    "Package {} corrected to {} as of {}",
                    id,
                    correction.destination,
                    format_clock(correction.effective_at)
                );
                package.destination = correction.destination.clone();
            }
        }
    }

    fn snapshot(&self, at: NaiveTime) -> Snapshot {
        let rules = self.scenario.rules();
        Snapshot {
            at,
            packages: self
                .packages
                .sorted()
                .into_iter()
                .map(|package| PackageReport::new(package, rules, at))
                .collect(),
            vehicles: self.vehicles.iter().map(VehicleReport::from).collect(),
        }
    }
}

impl Scenario {
    /// Replay on a private dispatcher, leaving no shared state behind.
    pub fn snapshot_at(&self, at: NaiveTime) -> Snapshot {
        Dispatcher::new(self).query_state(at)
    }

    /// Answer several independent queries in parallel, each on its own copy
    /// of the run state. Results keep the order of `times`.
    pub fn snapshots_at(&self, times: &[NaiveTime]) -> Vec<Snapshot> {
        times.par_iter().map(|&at| self.snapshot_at(at)).collect()
    }
}
