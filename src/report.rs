//! Plain-text rendering of snapshots for the terminal.

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use itertools::Itertools;

use crate::domain::types::PackageStatus;
use crate::solver::snapshot::{PackageReport, Snapshot};
use crate::utils::format_clock;

fn status_label(status: PackageStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        PackageStatus::Delivered => label.green(),
        PackageStatus::EnRoute => label.cyan(),
        PackageStatus::AtHub => label.normal(),
        PackageStatus::Delayed => label.yellow(),
    }
}

fn delivery_note(report: &PackageReport) -> String {
    match (report.delivered_at, report.on_time) {
        (Some(at), Some(false)) => format!("{} {}", format_clock(at), "LATE".red().bold()),
        (Some(at), _) => format_clock(at),
        (None, _) => "-".to_string(),
    }
}

fn package_line(report: &PackageReport) -> String {
    format!(
        "{:>3}  {:<40} {:>8}  {:>3} kg  {:<9} {}  {}",
        report.id,
        report.destination.to_string(),
        report.deadline.to_string(),
        report.weight_kg,
        status_label(report.status),
        report
            .vehicle
            .map_or_else(|| "-".to_string(), |v| format!("vehicle {v}")),
        delivery_note(report)
    )
}

/// One line per package, ordered by id, followed by status totals.
pub fn render_packages(snapshot: &Snapshot) -> String {
    let mut out = format!("Packages as of {}\n", format_clock(snapshot.at).bold());
    for report in &snapshot.packages {
        let _ = writeln!(out, "{}", package_line(report));
    }

    let totals = snapshot
        .packages
        .iter()
        .counts_by(|p| p.status)
        .into_iter()
        .sorted()
        .map(|(status, count)| format!("{status}: {count}"))
        .join(", ");
    let _ = writeln!(out, "{totals}");
    out
}

/// Detail view of one package.
pub fn render_package(report: &PackageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Package {}", report.id.to_string().bold());
    let _ = writeln!(out, "  Address:   {}", report.destination);
    let _ = writeln!(out, "  Deadline:  {}", report.deadline);
    let _ = writeln!(out, "  Weight:    {} kg", report.weight_kg);
    if !report.notes.is_empty() {
        let _ = writeln!(out, "  Notes:     {}", report.notes);
    }
    let _ = writeln!(out, "  Status:    {}", status_label(report.status));
    if let Some(vehicle) = report.vehicle {
        let _ = writeln!(out, "  Vehicle:   {vehicle}");
    }
    if let Some(departed) = report.departed_at {
        let _ = writeln!(out, "  Departed:  {}", format_clock(departed));
    }
    let _ = writeln!(out, "  Delivered: {}", delivery_note(report));
    out
}

/// Per-vehicle mileage and position, then the fleet total.
pub fn render_fleet(snapshot: &Snapshot) -> String {
    let mut out = format!("Fleet as of {}\n", format_clock(snapshot.at).bold());
    for vehicle in &snapshot.vehicles {
        let _ = writeln!(
            out,
            "Vehicle {}: {:.1} mi, at {} ({}), delivered [{}], pending [{}]",
            vehicle.id,
            vehicle.miles,
            vehicle.location,
            format_clock(vehicle.clock),
            vehicle.delivered.iter().join(", "),
            vehicle.pending.iter().join(", ")
        );
    }
    let _ = writeln!(out, "Total mileage: {:.1} mi", snapshot.total_miles());

    let late = snapshot.late();
    if !late.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            "Late deliveries:".red(),
            late.iter().join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample;
    use crate::utils::hms;

    #[test]
    fn package_table_lists_every_package_and_totals() {
        let snapshot = sample::scenario().snapshot_at(hms(8, 10, 0));
        let text = render_packages(&snapshot);

        assert!(text.contains("08:10:00"));
        assert_eq!(text.lines().count(), 1 + 8 + 1);
        assert!(text.contains("DELIVERED: 2"));
        assert!(text.contains("EN_ROUTE: 2"));
        assert!(text.contains("DELAYED: 3"));
    }

    #[test]
    fn single_package_shows_corrected_address() {
        let snapshot = sample::scenario().snapshot_at(hms(17, 0, 0));
        let report = snapshot.package(7).expect("package 7");
        let text = render_package(report);

        assert!(text.contains("5 Elm St"));
        assert!(text.contains("Wrong address listed"));
        assert!(text.contains("09:39:00"));
        assert!(text.contains("Vehicle:   3"));
    }

    #[test]
    fn fleet_summary_reports_total_mileage() {
        let snapshot = sample::scenario().snapshot_at(hms(17, 0, 0));
        let text = render_fleet(&snapshot);

        assert!(text.contains("Vehicle 1: 9.0 mi"));
        assert!(text.contains("Vehicle 2: 10.8 mi"));
        assert!(text.contains("Total mileage: 25.2 mi"));
        assert!(!text.contains("Late deliveries"));
    }
}
