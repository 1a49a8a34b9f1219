use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;
use tracing::warn;

use crate::config::constant::END_OF_DAY_TOKEN;
use crate::utils::format_clock;

pub type PackageId = u32;
pub type VehicleId = u32;

/// When a package must be delivered by.
///
/// Variant order matters: every explicit time sorts before `EndOfDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deadline {
    By(NaiveTime),
    EndOfDay,
}

impl Deadline {
    /// Parse a deadline cell: `EOD`, `HH:MM:SS`, `HH:MM` or `H:MM AM`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(END_OF_DAY_TOKEN)
            || trimmed.eq_ignore_ascii_case("end of day")
        {
            return Some(Self::EndOfDay);
        }
        ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
            .map(Self::By)
    }

    /// Like [`Deadline::parse`], but a malformed value degrades to end of day.
    pub fn parse_or_end_of_day(raw: &str, package: PackageId) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            warn!(
                "Package {} has malformed deadline {:?}, treating as end of day",
                package, raw
            );
            Self::EndOfDay
        })
    }

    pub fn is_met_by(self, time: NaiveTime) -> bool {
        match self {
            Self::By(limit) => time <= limit,
            Self::EndOfDay => true,
        }
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::By(time) => f.write_str(&format_clock(*time)),
            Self::EndOfDay => f.write_str(END_OF_DAY_TOKEN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Destination {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.zip_code
        )
    }
}

/// Where a package is in its day. Replaces "max time" and "None" sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Progress {
    #[default]
    Waiting,
    Loaded {
        vehicle: VehicleId,
        departed_at: NaiveTime,
    },
    Delivered {
        vehicle: VehicleId,
        departed_at: NaiveTime,
        delivered_at: NaiveTime,
    },
}

impl Progress {
    pub const fn vehicle(self) -> Option<VehicleId> {
        match self {
            Self::Waiting => None,
            Self::Loaded { vehicle, .. } | Self::Delivered { vehicle, .. } => Some(vehicle),
        }
    }

    pub const fn departed_at(self) -> Option<NaiveTime> {
        match self {
            Self::Waiting => None,
            Self::Loaded { departed_at, .. } | Self::Delivered { departed_at, .. } => {
                Some(departed_at)
            }
        }
    }

    pub const fn delivered_at(self) -> Option<NaiveTime> {
        match self {
            Self::Delivered { delivered_at, .. } => Some(delivered_at),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: PackageId,
    /// Address as loaded; restored on every reset.
    pub origin: Destination,
    /// Address the package is currently routed to (may be corrected mid-day).
    pub destination: Destination,
    pub deadline: Deadline,
    pub weight_kg: u32,
    pub special_notes: String,
    pub progress: Progress,
}

impl Package {
    pub fn new(
        id: PackageId,
        destination: Destination,
        deadline: Deadline,
        weight_kg: u32,
        special_notes: impl Into<String>,
    ) -> Self {
        Self {
            id,
            origin: destination.clone(),
            destination,
            deadline,
            weight_kg,
            special_notes: special_notes.into(),
            progress: Progress::Waiting,
        }
    }

    /// Return every mutable field to its start-of-day value.
    pub fn reset(&mut self) {
        if self.destination != self.origin {
            self.destination = self.origin.clone();
        }
        self.progress = Progress::Waiting;
    }
}

/// Reported status of a package at a query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    Delayed,
    AtHub,
    EnRoute,
    Delivered,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Delayed => "DELAYED",
            Self::AtHub => "AT_HUB",
            Self::EnRoute => "EN_ROUTE",
            Self::Delivered => "DELIVERED",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hms;
    use rstest::rstest;

    fn destination(street: &str) -> Destination {
        Destination {
            street: street.to_string(),
            city: "Salt Lake City".to_string(),
            state: "UT".to_string(),
            zip_code: "84111".to_string(),
        }
    }

    #[rstest]
    #[case("EOD", Some(Deadline::EndOfDay))]
    #[case("eod", Some(Deadline::EndOfDay))]
    #[case("End of Day", Some(Deadline::EndOfDay))]
    #[case("10:30 AM", Some(Deadline::By(hms(10, 30, 0))))]
    #[case("9:00 AM", Some(Deadline::By(hms(9, 0, 0))))]
    #[case("1:15 PM", Some(Deadline::By(hms(13, 15, 0))))]
    #[case("10:30:00", Some(Deadline::By(hms(10, 30, 0))))]
    #[case("10:30", Some(Deadline::By(hms(10, 30, 0))))]
    #[case("soon", None)]
    fn parses_deadlines(#[case] raw: &str, #[case] expected: Option<Deadline>) {
        assert_eq!(Deadline::parse(raw), expected);
    }

    #[rstest]
    fn malformed_deadline_degrades_to_end_of_day() {
        assert_eq!(Deadline::parse_or_end_of_day("??", 1), Deadline::EndOfDay);
    }

    #[rstest]
    fn explicit_deadlines_sort_before_end_of_day() {
        let early = Deadline::By(hms(9, 0, 0));
        let late = Deadline::By(hms(23, 59, 59));
        assert!(early < late);
        assert!(late < Deadline::EndOfDay);
    }

    #[rstest]
    #[case(Deadline::By(hms(10, 30, 0)), hms(10, 30, 0), true)]
    #[case(Deadline::By(hms(10, 30, 0)), hms(10, 30, 1), false)]
    #[case(Deadline::EndOfDay, hms(23, 0, 0), true)]
    fn deadline_is_met(#[case] deadline: Deadline, #[case] at: NaiveTime, #[case] met: bool) {
        assert_eq!(deadline.is_met_by(at), met);
    }

    #[rstest]
    fn reset_restores_original_address_and_progress() {
        let mut package = Package::new(9, destination("300 State St"), Deadline::EndOfDay, 2, "");
        package.destination = destination("410 S State St");
        package.progress = Progress::Delivered {
            vehicle: 3,
            departed_at: hms(10, 25, 0),
            delivered_at: hms(10, 40, 0),
        };

        package.reset();

        assert_eq!(package.destination.street, "300 State St");
        assert_eq!(package.progress, Progress::Waiting);
    }

    #[rstest]
    fn progress_accessors() {
        let loaded = Progress::Loaded {
            vehicle: 2,
            departed_at: hms(9, 15, 0),
        };
        assert_eq!(loaded.vehicle(), Some(2));
        assert_eq!(loaded.departed_at(), Some(hms(9, 15, 0)));
        assert_eq!(loaded.delivered_at(), None);
        assert_eq!(Progress::Waiting.vehicle(), None);
    }
}
