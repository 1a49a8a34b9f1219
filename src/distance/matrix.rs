use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::{DistanceError, LoadError};
use crate::utils::normalize_address;

/// Symmetric distance lookup over a triangular matrix.
///
/// Only one direction of each pair needs to be populated; `distance` reads
/// `(a, b)` and falls back to `(b, a)`. Rows may be ragged, missing cells read
/// as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceIndex {
    addresses: Vec<String>,
    positions: HashMap<String, usize>,
    matrix: Vec<Vec<f64>>,
}

impl DistanceIndex {
    pub fn new(addresses: Vec<String>, matrix: Vec<Vec<f64>>) -> Result<Self, LoadError> {
        if addresses.len() != matrix.len() {
            return Err(LoadError::MatrixShape {
                rows: matrix.len(),
                addresses: addresses.len(),
            });
        }

        let addresses: Vec<String> = addresses.iter().map(|a| normalize_address(a)).collect();
        let mut positions = HashMap::with_capacity(addresses.len());
        for (position, address) in addresses.iter().enumerate() {
            if positions.insert(address.clone(), position).is_some() {
                warn!(
                    "Address {:?} appears twice in the distance table, using row {}",
                    address, position
                );
            }
        }

        info!(
            "Built distance index over {} addresses",
            addresses.len()
        );

        Ok(Self {
            addresses,
            positions,
            matrix,
        })
    }

    pub fn position(&self, address: &str) -> Option<usize> {
        self.positions.get(&normalize_address(address)).copied()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.position(address).is_some()
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Recorded driving distance between two addresses, in miles.
    pub fn distance(&self, from: &str, to: &str) -> Result<f64, DistanceError> {
        let a = self
            .position(from)
            .ok_or_else(|| DistanceError::UnknownAddress(from.to_string()))?;
        let b = self
            .position(to)
            .ok_or_else(|| DistanceError::UnknownAddress(to.to_string()))?;

        if a == b {
            return Ok(0.0);
        }

        let forward = self.cell(a, b);
        let miles = if forward != 0.0 { forward } else { self.cell(b, a) };
        if miles == 0.0 {
            return Err(DistanceError::MissingEntry {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(miles)
    }

    fn cell(&self, row: usize, column: usize) -> f64 {
        self.matrix
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn index() -> DistanceIndex {
        DistanceIndex::new(
            vec!["Hub".into(), "A St".into(), "B  St".into(), "C St".into()],
            vec![
                vec![0.0],
                vec![1.8, 0.0],
                vec![3.6, 1.8, 0.0],
                vec![0.9, 0.0, 4.5, 0.0],
            ],
        )
        .expect("valid index")
    }

    #[rstest]
    #[case("Hub", "A St", 1.8)]
    #[case("A St", "Hub", 1.8)]
    #[case("B St", "C St", 4.5)]
    #[case("C St", "Hub", 0.9)]
    fn reads_either_triangle(
        index: DistanceIndex,
        #[case] a: &str,
        #[case] b: &str,
        #[case] miles: f64,
    ) {
        assert_eq!(index.distance(a, b), Ok(miles));
        assert_eq!(index.distance(b, a), Ok(miles));
    }

    #[rstest]
    fn self_distance_is_zero(index: DistanceIndex) {
        assert_eq!(index.distance("B St", "B St"), Ok(0.0));
    }

    #[rstest]
    fn unknown_address_is_an_error(index: DistanceIndex) {
        assert_eq!(
            index.distance("Hub", "Nowhere"),
            Err(DistanceError::UnknownAddress("Nowhere".to_string()))
        );
    }

    #[rstest]
    fn unrecorded_pair_is_an_error(index: DistanceIndex) {
        assert!(matches!(
            index.distance("A St", "C St"),
            Err(DistanceError::MissingEntry { .. })
        ));
    }

    #[rstest]
    fn addresses_match_after_whitespace_normalisation(index: DistanceIndex) {
        assert_eq!(index.position(" B St "), Some(2));
        assert!(index.contains("A  St"));
    }

    #[rstest]
    fn shape_mismatch_is_rejected() {
        let err = DistanceIndex::new(vec!["Hub".into()], vec![]).expect_err("shape error");
        assert!(matches!(err, LoadError::MatrixShape { rows: 0, addresses: 1 }));
    }
}
