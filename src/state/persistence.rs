use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::{FoodKey, FoodRecord, Tastiness};

/// Keep the last record per case-insensitive name, at the position of its
/// first occurrence.
fn dedupe(records: Vec<FoodRecord>) -> Vec<FoodRecord> {
    let mut index: HashMap<FoodKey, usize> = HashMap::new();
    let mut unique: Vec<FoodRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&record.key()) {
            Some(&pos) => unique[pos] = record,
            None => {
                index.insert(record.key(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}

/// Load food records from a JSON file.
///
/// Deduplicates by lowercase name (last occurrence wins).
pub fn load_foods<P: AsRef<Path>>(path: P) -> Result<Vec<FoodRecord>> {
    let content = fs::read_to_string(path)?;
    let records: Vec<FoodRecord> = serde_json::from_str(&content)?;
    Ok(dedupe(records))
}

/// Save food records to a JSON file.
///
/// Deduplicates by lowercase name before saving.
pub fn save_foods<P: AsRef<Path>>(path: P, records: &[FoodRecord]) -> Result<()> {
    let deduped = dedupe(records.to_vec());
    let json = serde_json::to_string_pretty(&deduped)?;
    fs::write(path, json)?;
    Ok(())
}

/// Integrity problems found in a set of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataIssues {
    /// Names that appear more than once (case-insensitive).
    pub duplicates: BTreeSet<String>,
    /// Names whose tastiness is off the preference scale.
    pub invalid_tastiness: BTreeSet<String>,
    /// Names in the stomach or on hand that are still unrated.
    pub unknown_tastiness: BTreeSet<String>,
}

impl DataIssues {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
            && self.invalid_tastiness.is_empty()
            && self.unknown_tastiness.is_empty()
    }

    /// Plain-text report, one section per non-empty category.
    pub fn report(&self) -> String {
        if self.is_empty() {
            return "No data issues found.\n".to_string();
        }

        let mut out = String::new();
        let sections = [
            ("[WARN] Duplicate names in food state:", &self.duplicates),
            ("[WARN] Invalid tastiness values in food state:", &self.invalid_tastiness),
            ("[INFO] Foods with unknown tastiness (99):", &self.unknown_tastiness),
        ];
        for (title, names) in sections {
            if names.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{title}");
            for name in names {
                let _ = writeln!(out, "  - {name}");
            }
            out.push('\n');
        }
        out
    }
}

/// Check raw records for duplicates, bad ratings and unrated foods in use.
pub fn audit_records(records: &[FoodRecord]) -> DataIssues {
    let mut issues = DataIssues::default();
    let mut seen: BTreeSet<FoodKey> = BTreeSet::new();

    for record in records {
        if !seen.insert(record.key()) {
            issues.duplicates.insert(record.name.clone());
        }
        if !Tastiness::is_valid(record.tastiness) {
            issues.invalid_tastiness.insert(record.name.clone());
        } else if record.tastiness == i64::from(Tastiness::UNKNOWN.value())
            && (record.stomach > 0 || record.available > 0)
        {
            issues.unknown_tastiness.insert(record.name.clone());
        }
    }

    for name in &issues.duplicates {
        warn!("Duplicate food name: {name}");
    }
    for name in &issues.invalid_tastiness {
        warn!("Invalid tastiness for {name}");
    }
    if !issues.unknown_tastiness.is_empty() {
        info!(
            "{} foods in use have unknown tastiness",
            issues.unknown_tastiness.len()
        );
    }
    issues
}

/// Overwrite `path` with the text report for `issues`.
pub fn write_issue_report<P: AsRef<Path>>(path: P, issues: &DataIssues) -> Result<()> {
    fs::write(path, issues.report())?;
    Ok(())
}
