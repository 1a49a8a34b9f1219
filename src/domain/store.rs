//! Package store: a separately chained table keyed by package id.
//!
//! Buckets grow to `2n + 1` and every record is rehashed once the load factor
//! reaches [`MAX_LOAD_FACTOR`]. Reset walks the records in place, so replaying
//! a day never reallocates the table.

use crate::domain::types::{Package, PackageId};

const INITIAL_BUCKETS: usize = 41;
const MAX_LOAD_FACTOR: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct PackageStore {
    buckets: Vec<Vec<Package>>,
    len: usize,
}

impl Default for PackageStore {
    fn default() -> Self {
        Self::with_buckets(INITIAL_BUCKETS)
    }
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_buckets(count: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); count.max(1)],
            len: 0,
        }
    }

    fn bucket_of(&self, id: PackageId) -> usize {
        id as usize % self.buckets.len()
    }

    /// Insert `package`, replacing (and returning) any record with the same id.
    pub fn insert_or_update(&mut self, package: Package) -> Option<Package> {
        let index = self.bucket_of(package.id);
        if let Some(slot) = self.buckets[index].iter_mut().find(|p| p.id == package.id) {
            return Some(std::mem::replace(slot, package));
        }

        if (self.len + 1) as f64 / self.buckets.len() as f64 >= MAX_LOAD_FACTOR {
            self.grow();
        }
        let index = self.bucket_of(package.id);
        self.buckets[index].push(package);
        self.len += 1;
        None
    }

    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.buckets[self.bucket_of(id)].iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PackageId) -> Option<&mut Package> {
        let index = self.bucket_of(id);
        self.buckets[index].iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PackageId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every record, ordered by id.
    pub fn sorted(&self) -> Vec<&Package> {
        let mut packages: Vec<&Package> = self.buckets.iter().flatten().collect();
        packages.sort_unstable_by_key(|p| p.id);
        packages
    }

    pub fn ids(&self) -> Vec<PackageId> {
        self.sorted().into_iter().map(|p| p.id).collect()
    }

    /// Restore every record's mutable fields to their start-of-day values.
    pub fn reset(&mut self) {
        self.buckets
            .iter_mut()
            .flatten()
            .for_each(Package::reset);
    }

    fn grow(&mut self) {
        let count = self.buckets.len() * 2 + 1;
        let old = std::mem::replace(&mut self.buckets, vec![Vec::new(); count]);
        for package in old.into_iter().flatten() {
            let index = self.bucket_of(package.id);
            self.buckets[index].push(package);
        }
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl FromIterator<Package> for PackageStore {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let mut store = Self::new();
        for package in iter {
            store.insert_or_update(package);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Deadline, Destination, Progress};
    use crate::utils::hms;
    use rstest::rstest;

    fn package(id: PackageId) -> Package {
        Package::new(
            id,
            Destination {
                street: format!("{id} Main St"),
                city: "Salt Lake City".to_string(),
                state: "UT".to_string(),
                zip_code: "84115".to_string(),
            },
            Deadline::EndOfDay,
            id,
            "",
        )
    }

    #[rstest]
    fn insert_then_get() {
        let mut store = PackageStore::new();
        assert!(store.insert_or_update(package(7)).is_none());
        assert_eq!(store.get(7).map(|p| p.weight_kg), Some(7));
        assert!(store.get(8).is_none());
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    fn update_overwrites_without_growing_count() {
        let mut store = PackageStore::new();
        store.insert_or_update(package(3));
        let mut heavier = package(3);
        heavier.weight_kg = 99;

        let previous = store.insert_or_update(heavier).expect("previous record");

        assert_eq!(previous.weight_kg, 3);
        assert_eq!(store.get(3).map(|p| p.weight_kg), Some(99));
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    fn colliding_ids_share_a_bucket() {
        let mut store = PackageStore::new();
        store.insert_or_update(package(1));
        store.insert_or_update(package(1 + INITIAL_BUCKETS as PackageId));
        assert!(store.contains(1));
        assert!(store.contains(1 + INITIAL_BUCKETS as PackageId));
    }

    #[rstest]
    fn grows_past_load_factor_and_keeps_every_record() {
        let store: PackageStore = (1..=100).map(package).collect();

        assert!(store.bucket_count() > INITIAL_BUCKETS);
        assert_eq!(store.len(), 100);
        assert_eq!(store.ids(), (1..=100).collect::<Vec<_>>());
        assert!((1..=100).all(|id| store.get(id).is_some_and(|p| p.id == id)));
    }

    #[rstest]
    fn reset_is_idempotent() {
        let mut store: PackageStore = (1..=5).map(package).collect();
        if let Some(p) = store.get_mut(2) {
            p.destination.street = "elsewhere".to_string();
            p.progress = Progress::Loaded {
                vehicle: 1,
                departed_at: hms(8, 0, 0),
            };
        }

        store.reset();
        let once: Vec<Package> = store.sorted().into_iter().cloned().collect();
        store.reset();
        let twice: Vec<Package> = store.sorted().into_iter().cloned().collect();

        assert_eq!(once, twice);
        assert_eq!(once[1].destination.street, "2 Main St");
        assert_eq!(once[1].progress, Progress::Waiting);
    }
}
