use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::distance::DistanceIndex;
use crate::domain::types::{Deadline, Destination, Package, PackageId};
use crate::error::LoadError;

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Read the package file: `id,address,city,state,zip,deadline,weight,notes`.
///
/// Rows whose first cell is not a package id (headers, titles, blank lines)
/// are skipped. An unreadable deadline is treated as end of day.
pub fn load_packages(path: &Path) -> Result<Vec<Package>, LoadError> {
    let mut reader = open(path)?;
    let mut packages = Vec::new();

    for row in reader.records() {
        let record = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(id) = record.get(0).and_then(|raw| raw.parse::<PackageId>().ok()) else {
            debug!("Skipping non-package row at line {}", line_of(&record));
            continue;
        };
        packages.push(parse_package(path, id, &record)?);
    }

    info!("Loaded {} packages from {:?}", packages.len(), path);
    Ok(packages)
}

fn parse_package(path: &Path, id: PackageId, record: &StringRecord) -> Result<Package, LoadError> {
    let malformed = |reason: String| LoadError::MalformedRow {
        path: path.to_path_buf(),
        line: line_of(record),
        reason,
    };

    if record.len() < 7 {
        return Err(malformed(format!(
            "package {id} has {} fields, expected at least 7",
            record.len()
        )));
    }
    let field = |index: usize| record.get(index).unwrap_or_default();

    let destination = Destination {
        street: field(1).to_string(),
        city: field(2).to_string(),
        state: field(3).to_string(),
        zip_code: field(4).to_string(),
    };
    let deadline = Deadline::parse_or_end_of_day(field(5), id);
    let weight_kg = field(6)
        .parse::<u32>()
        .map_err(|err| malformed(format!("package {id} weight {:?}: {err}", field(6))))?;
    // Notes may contain commas; anything past the eighth column belongs to them.
    let notes = record.iter().skip(7).collect::<Vec<_>>().join(",");

    Ok(Package::new(id, destination, deadline, weight_kg, notes))
}

/// Read the distance table.
///
/// The first row lists the addresses as column headers and is skipped; each
/// following row starts with its address and holds the lower triangle of the
/// matrix. Empty cells read as zero, meaning "look in the mirrored cell".
pub fn load_distances(path: &Path) -> Result<DistanceIndex, LoadError> {
    let mut reader = open(path)?;
    let mut addresses = Vec::new();
    let mut matrix = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let record = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if index == 0 {
            continue;
        }
        let Some(address) = record.get(0).filter(|a| !a.is_empty()) else {
            warn!("Distance row at line {} has no address, skipping", line_of(&record));
            continue;
        };

        let mut distances = Vec::with_capacity(record.len().saturating_sub(1));
        for cell in record.iter().skip(1) {
            if cell.is_empty() {
                distances.push(0.0);
                continue;
            }
            let miles = cell.parse::<f64>().map_err(|err| LoadError::MalformedRow {
                path: path.to_path_buf(),
                line: line_of(&record),
                reason: format!("distance {cell:?} from {address:?}: {err}"),
            })?;
            distances.push(miles);
        }

        addresses.push(address.to_string());
        matrix.push(distances);
    }

    let width = addresses.len();
    for row in &mut matrix {
        row.resize(width, 0.0);
    }

    info!("Loaded {} distance rows from {:?}", width, path);
    DistanceIndex::new(addresses, matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn reads_packages_and_skips_titles() {
        let file = write(
            "Package File,,,,,,,\n\
             ID,Address,City,State,Zip,Deadline,Weight,Notes\n\
             1,195 W Oakland Ave,Salt Lake City,UT,84115,10:30 AM,21,\n\
             14,4300 S 1300 E,Millcreek,UT,84117,10:30 AM,88,\"Must be delivered with 15, 19\"\n\
             2,2530 S 500 E,Salt Lake City,UT,84106,EOD,44,\n",
        );

        let packages = load_packages(file.path()).expect("packages load");

        assert_eq!(packages.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 14, 2]);
        assert_eq!(packages[1].special_notes, "Must be delivered with 15, 19");
        assert_eq!(packages[1].destination.city, "Millcreek");
        assert_eq!(packages[2].deadline, Deadline::EndOfDay);
        assert_eq!(packages[0].weight_kg, 21);
    }

    #[test]
    fn unreadable_deadline_becomes_end_of_day() {
        let file = write("5,1 Main St,Town,UT,84000,whenever,3,\n");
        let packages = load_packages(file.path()).expect("packages load");
        assert_eq!(packages[0].deadline, Deadline::EndOfDay);
    }

    #[test]
    fn bad_weight_is_a_malformed_row() {
        let file = write("5,1 Main St,Town,UT,84000,EOD,heavy,\n");
        let err = load_packages(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { line: 1, .. }), "{err}");
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let err = load_packages(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn reads_lower_triangular_distances() {
        let file = write(
            "address,Hub,1 Alder St,2 Birch St\n\
             Hub,0.0,,\n\
             1 Alder St,1.8,0.0,\n\
             2 Birch St,3.6,1.8,0.0\n",
        );

        let index = load_distances(file.path()).expect("distances load");

        assert_eq!(index.len(), 3);
        assert_eq!(index.distance("Hub", "2 Birch St"), Ok(3.6));
        assert_eq!(index.distance("2 Birch St", "Hub"), Ok(3.6));
        assert_eq!(index.distance("1 Alder St", "1 Alder St"), Ok(0.0));
    }

    #[test]
    fn short_rows_are_padded() {
        let file = write("address,Hub,1 Alder St\nHub,0.0\n1 Alder St,2.5,0.0\n");
        let index = load_distances(file.path()).expect("distances load");
        assert_eq!(index.distance("Hub", "1 Alder St"), Ok(2.5));
    }

    #[test]
    fn non_numeric_distance_is_rejected() {
        let file = write("address,Hub,A\nHub,0.0,\nA,far,0.0\n");
        let err = load_distances(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { line: 3, .. }), "{err}");
    }
}
