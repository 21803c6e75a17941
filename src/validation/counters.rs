//! Running statistics shared by concurrent validations.
//!
//! Counters are atomics and per-name tallies live in maps guarded by a
//! `RwLock`, so validations running on several threads update them without
//! losing increments. A poisoned lock is recovered rather than propagated:
//! the tallies are plain integers and stay consistent.

use crate::error::{EntryViolation, ViolationCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

const CATEGORY_COUNT: usize = ViolationCategory::ALL.len();

/// Counters and per-name tallies accumulated across validations.
#[derive(Debug)]
pub(crate) struct ValidationCounters {
    entries_examined: AtomicU64,
    invalid_entries: AtomicU64,
    by_category: [AtomicU64; CATEGORY_COUNT],
    by_name: [RwLock<HashMap<String, AtomicU64>>; CATEGORY_COUNT],
}

impl Default for ValidationCounters {
    fn default() -> Self {
        Self {
            entries_examined: AtomicU64::new(0),
            invalid_entries: AtomicU64::new(0),
            by_category: std::array::from_fn(|_| AtomicU64::new(0)),
            by_name: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }
}

impl ValidationCounters {
    /// Record the outcome of one entry. Each category and each named subject
    /// counts at most once per entry.
    pub(crate) fn record(&self, violations: &[EntryViolation]) {
        self.entries_examined.fetch_add(1, Ordering::Relaxed);
        if violations.is_empty() {
            return;
        }
        self.invalid_entries.fetch_add(1, Ordering::Relaxed);

        let mut categories = HashSet::new();
        let mut subjects = HashSet::new();
        for violation in violations {
            let category = violation.category();
            if categories.insert(category) {
                self.by_category[category.index()].fetch_add(1, Ordering::Relaxed);
            }
            if let Some(subject) = violation.subject() {
                let key = subject.to_ascii_lowercase();
                if subjects.insert((category, key.clone())) {
                    self.increment_tally(category, key);
                }
            }
        }
    }

    fn increment_tally(&self, category: ViolationCategory, key: String) {
        let tallies = &self.by_name[category.index()];
        {
            let read = tallies.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(count) = read.get(&key) {
                count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        let mut write = tallies.write().unwrap_or_else(PoisonError::into_inner);
        write
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn entries_examined(&self) -> u64 {
        self.entries_examined.load(Ordering::Relaxed)
    }

    pub(crate) fn invalid_entries(&self) -> u64 {
        self.invalid_entries.load(Ordering::Relaxed)
    }

    pub(crate) fn category(&self, category: ViolationCategory) -> u64 {
        self.by_category[category.index()].load(Ordering::Relaxed)
    }

    /// Copy of the per-name tally for one category.
    pub(crate) fn tally(&self, category: ViolationCategory) -> BTreeMap<String, u64> {
        self.by_name[category.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, count)| (name.clone(), count.load(Ordering::Relaxed)))
            .collect()
    }

    pub(crate) fn reset(&self) {
        self.entries_examined.store(0, Ordering::Relaxed);
        self.invalid_entries.store(0, Ordering::Relaxed);
        for counter in &self.by_category {
            counter.store(0, Ordering::Relaxed);
        }
        for tallies in &self.by_name {
            tallies.write().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    pub(crate) fn snapshot(&self) -> ValidationStatistics {
        let categories = ViolationCategory::ALL
            .into_iter()
            .map(|c| (c.name().to_string(), self.category(c)))
            .collect();
        let tallies = ViolationCategory::ALL
            .into_iter()
            .map(|c| (c.name().to_string(), self.tally(c)))
            .filter(|(_, tally)| !tally.is_empty())
            .collect();
        ValidationStatistics {
            entries_examined: self.entries_examined(),
            invalid_entries: self.invalid_entries(),
            categories,
            tallies,
        }
    }
}

/// A point-in-time copy of the validator statistics.
///
/// Category and tally keys are the snake_case category names, for example
/// `missing_attribute`; tally names are lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub entries_examined: u64,
    pub invalid_entries: u64,
    /// Number of entries with at least one violation in each category
    pub categories: BTreeMap<String, u64>,
    /// Number of entries each attribute or object class name was reported for
    pub tallies: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ValidationStatistics {
    pub fn category(&self, category: ViolationCategory) -> u64 {
        self.categories.get(category.name()).copied().unwrap_or_default()
    }

    pub fn tally(&self, category: ViolationCategory) -> Option<&BTreeMap<String, u64>> {
        self.tallies.get(category.name())
    }

    /// Render the statistics as summary lines, one per non-empty category,
    /// each with its share of the entries examined.
    ///
    /// With `detailed`, each tallied category is followed by one indented line
    /// per name, most frequent first.
    pub fn summary_lines(&self, detailed: bool) -> Vec<String> {
        let examined = self.entries_examined;
        let mut lines = vec![format!(
            "{} of {} entries examined ({}) did not conform to the schema",
            self.invalid_entries,
            examined,
            percentage(self.invalid_entries, examined)
        )];

        for category in ViolationCategory::ALL {
            let count = self.category(category);
            if count == 0 {
                continue;
            }
            lines.push(format!(
                "{count} entries ({}) {}",
                percentage(count, examined),
                describe(category)
            ));
            if !detailed {
                continue;
            }
            if let Some(tally) = self.tally(category) {
                let mut names: Vec<(&String, &u64)> = tally.iter().collect();
                names.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
                for (name, count) in names {
                    lines.push(format!(
                        "    {name}: {count} entries ({})",
                        percentage(*count, examined)
                    ));
                }
            }
        }
        lines
    }
}

fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", count as f64 * 100.0 / total as f64)
}

fn describe(category: ViolationCategory) -> &'static str {
    match category {
        ViolationCategory::MalformedDn => "had a malformed DN",
        ViolationCategory::NoObjectClasses => "had no object classes",
        ViolationCategory::UndefinedObjectClass => "had undefined object classes",
        ViolationCategory::MissingSuperiorObjectClass => "were missing superior object classes",
        ViolationCategory::ProhibitedObjectClass => "had prohibited object classes",
        ViolationCategory::NoStructuralClass => "had no structural object class",
        ViolationCategory::MultipleStructuralClasses => "had multiple structural object classes",
        ViolationCategory::MissingAttribute => "were missing required attributes",
        ViolationCategory::UndefinedAttribute => "had undefined attributes",
        ViolationCategory::ProhibitedAttribute => "had prohibited attributes",
        ViolationCategory::SingleValueViolation => {
            "had several values for single-valued attributes"
        }
        ViolationCategory::AttributeSyntax => "had values violating the attribute syntax",
        ViolationCategory::NameForm => "had RDNs violating a name form",
        ViolationCategory::MissingRdnValue => "were missing RDN values among their attributes",
    }
}
