//! Street directory published by a municipality.

use std::collections::{BTreeMap, HashMap};
use std::mem;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::model::Fraction;

/// Normalize a street name for comparison.
///
/// Trims, collapses inner whitespace runs to a single space and case-folds.
#[must_use]
pub fn normalize_street(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One canonical street and the weekdays each stream is collected on.
pub struct StreetEntry {
    /// Street name as published, original casing.
    pub name: String,
    /// Collection weekdays per stream.
    pub schedule: BTreeMap<Fraction, Vec<Weekday>>,
}

impl StreetEntry {
    /// Street whose streams are all collected on the same weekdays.
    #[must_use]
    pub fn uniform<S: Into<String>>(name: S, weekdays: &[Weekday]) -> Self {
        let mut days = Vec::with_capacity(weekdays.len());
        for day in weekdays {
            if !days.contains(day) {
                days.push(*day);
            }
        }
        let schedule = Fraction::ALL
            .into_iter()
            .map(|fraction| (fraction, days.clone()))
            .collect();
        Self {
            name: name.into(),
            schedule,
        }
    }

    /// Weekdays on which `fraction` is collected; empty if the stream is not served.
    #[must_use]
    pub fn collection_days(&self, fraction: Fraction) -> &[Weekday] {
        self.schedule
            .get(&fraction)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Street name to [`StreetEntry`] mapping, keyed by normalized name.
///
/// Iterates in first-insertion order. Re-inserting a street replaces the
/// earlier entry in place, so the last occurrence wins while the position of
/// the first is kept.
pub struct Directory {
    entries: Vec<(String, StreetEntry)>,
    index: HashMap<String, usize>,
}

impl Directory {
    /// Empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the entry it replaced if the normalized
    /// name was already present.
    pub fn insert(&mut self, entry: StreetEntry) -> Option<StreetEntry> {
        let key = normalize_street(&entry.name);
        if let Some(slot) = self
            .index
            .get(&key)
            .and_then(|&position| self.entries.get_mut(position))
        {
            return Some(mem::replace(&mut slot.1, entry));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, entry));
        None
    }

    /// Look up a street by any spelling that normalizes to its key.
    #[must_use]
    pub fn get(&self, street: &str) -> Option<&StreetEntry> {
        self.index
            .get(&normalize_street(street))
            .and_then(|&position| self.entries.get(position))
            .map(|(_key, entry)| entry)
    }

    /// Iterate `(normalized key, entry)` pairs in directory order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StreetEntry)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of distinct streets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory holds no streets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<StreetEntry> for Directory {
    fn from_iter<I: IntoIterator<Item = StreetEntry>>(iter: I) -> Self {
        let mut directory = Self::new();
        for entry in iter {
            directory.insert(entry);
        }
        directory
    }
}
