use std::collections::HashMap;
use std::fmt::Debug;

use chrono::{Local, NaiveDateTime};
use log::{debug, info};

use crate::config::{AttendanceErrors, CorrectionEntry};
use crate::names::normalize_name;

/// The source of the current time, used to stamp the corrections.
pub trait Clock: Debug {
    fn now(&self) -> NaiveDateTime;
}

/// The local wall clock.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that always returns the same time.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// The append-only record of the manual merges of names.
///
/// The corrections are not a chain of renames: each entry is a direct override of
/// one normalized name, and the latest entry for a given name wins. Renaming A to B
/// and then B to C does not rename A to C.
#[derive(Debug)]
pub struct CorrectionLog {
    clock: Box<dyn Clock>,
    entries: Vec<CorrectionEntry>,
}

impl Default for CorrectionLog {
    fn default() -> Self {
        CorrectionLog::new()
    }
}

impl CorrectionLog {
    pub fn new() -> CorrectionLog {
        CorrectionLog::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> CorrectionLog {
        CorrectionLog {
            clock,
            entries: Vec::new(),
        }
    }

    /// The time given by the clock of the log.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Appends a correction, stamped with the current time.
    ///
    /// Both names are trimmed. They must be non-empty and distinct, otherwise the log
    /// is left untouched.
    pub fn apply(
        &mut self,
        from_name: &str,
        to_name: &str,
        affected_count: usize,
    ) -> Result<CorrectionEntry, AttendanceErrors> {
        let from = from_name.trim();
        let to = to_name.trim();
        if from.is_empty() || to.is_empty() || from == to {
            return Err(AttendanceErrors::InvalidCorrection {
                from: from_name.to_string(),
                to: to_name.to_string(),
            });
        }
        let entry = CorrectionEntry {
            timestamp: self.clock.now(),
            from_name: from.to_string(),
            to_name: to.to_string(),
            affected_count,
        };
        info!(
            "Correction #{}: {:?} -> {:?} ({} records)",
            self.entries.len() + 1,
            entry.from_name,
            entry.to_name,
            affected_count
        );
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Removes all the corrections. Returns the number of removed entries.
    pub fn reset(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        info!("Corrections reset: {} entries removed", cleared);
        cleared
    }

    /// The corrections, in the order they were applied.
    pub fn entries(&self) -> &[CorrectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current override for each normalized name.
    pub fn effective_mapping(&self) -> HashMap<String, String> {
        let mut mapping: HashMap<String, String> = HashMap::new();
        for entry in self.entries.iter() {
            mapping.insert(normalize_name(&entry.from_name), entry.to_name.clone());
        }
        mapping
    }
}

/// Computes the name displayed for a record from its raw name.
///
/// The resolver borrows the state it was built from, so it cannot outlive a change
/// of the corrections: a new resolver must be created after every mutation.
#[derive(Debug)]
pub struct CanonicalNameResolver<'a> {
    base_names: &'a HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl<'a> CanonicalNameResolver<'a> {
    pub fn new(
        base_names: &'a HashMap<String, String>,
        corrections: &CorrectionLog,
    ) -> CanonicalNameResolver<'a> {
        let overrides = corrections.effective_mapping();
        debug!(
            "CanonicalNameResolver: {} base names, {} overrides",
            base_names.len(),
            overrides.len()
        );
        CanonicalNameResolver {
            base_names,
            overrides,
        }
    }

    /// The normalized form of a raw name, before corrections.
    pub fn normalized(&self, raw_name: &str) -> String {
        match self.base_names.get(raw_name) {
            Some(normalized) => normalized.clone(),
            None => normalize_name(raw_name),
        }
    }

    /// The effective name of a record. `None` when the name is missing or blank.
    pub fn resolve(&self, raw_name: Option<&str>) -> Option<String> {
        let normalized = self.normalized(raw_name?);
        if normalized.is_empty() {
            return None;
        }
        match self.overrides.get(&normalized) {
            Some(corrected) => Some(corrected.clone()),
            None => Some(normalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock() -> Box<dyn Clock> {
        let at = NaiveDate::from_ymd_opt(2024, 1, 22)
            .and_then(|d| d.and_hms_opt(20, 15, 0))
            .unwrap();
        Box::new(FixedClock(at))
    }

    fn base(names: &[&str]) -> HashMap<String, String> {
        names
            .iter()
            .map(|n| (n.to_string(), normalize_name(n)))
            .collect()
    }

    #[test]
    fn rejects_empty_or_identical_names() {
        let mut log = CorrectionLog::with_clock(clock());
        assert!(log.apply("", "Ana", 1).is_err());
        assert!(log.apply("Ana", "   ", 1).is_err());
        assert_eq!(
            log.apply("Ana", "Ana", 1),
            Err(AttendanceErrors::InvalidCorrection {
                from: "Ana".to_string(),
                to: "Ana".to_string()
            })
        );
        assert!(log.is_empty());
    }

    #[test]
    fn entries_keep_insertion_order_and_time() {
        let mut log = CorrectionLog::with_clock(clock());
        let e = log.apply("Joao Silva", "João Silva", 3).unwrap();
        assert_eq!(e.affected_count, 3);
        assert_eq!(e.timestamp, clock().now());
        log.apply("Ze", "José", 0).unwrap();
        let names: Vec<&str> = log.entries().iter().map(|e| e.from_name.as_str()).collect();
        assert_eq!(names, vec!["Joao Silva", "Ze"]);
    }

    #[test]
    fn latest_correction_wins() {
        let base_names = base(&["joao silva", "JOAO SILVA", "Maria"]);
        let mut log = CorrectionLog::with_clock(clock());
        log.apply("joao silva", "João Silva", 3).unwrap();
        log.apply("joao silva", "J. Silva", 3).unwrap();
        let resolver = CanonicalNameResolver::new(&base_names, &log);
        assert_eq!(resolver.resolve(Some("joao silva")), Some("J. Silva".to_string()));
        assert_eq!(resolver.resolve(Some("JOAO SILVA")), Some("J. Silva".to_string()));
        assert_eq!(resolver.resolve(Some("Maria")), Some("Maria".to_string()));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let base_names = base(&["ana  souza"]);
        let mut log = CorrectionLog::with_clock(clock());
        log.apply("Ana Souza", "Ana de Souza", 1).unwrap();
        let once = CanonicalNameResolver::new(&base_names, &log).resolve(Some("ana  souza"));
        log.apply("Ana Souza", "Ana de Souza", 1).unwrap();
        let twice = CanonicalNameResolver::new(&base_names, &log).resolve(Some("ana  souza"));
        assert_eq!(once, twice);
        assert_eq!(once, Some("Ana de Souza".to_string()));
    }

    #[test]
    fn corrections_do_not_chain() {
        let base_names = base(&["Ana", "Bia"]);
        let mut log = CorrectionLog::with_clock(clock());
        log.apply("Ana", "Bia", 1).unwrap();
        log.apply("Bia", "Carla", 2).unwrap();
        let resolver = CanonicalNameResolver::new(&base_names, &log);
        assert_eq!(resolver.resolve(Some("Ana")), Some("Bia".to_string()));
        assert_eq!(resolver.resolve(Some("Bia")), Some("Carla".to_string()));
    }

    #[test]
    fn reset_restores_normalized_names() {
        let base_names = base(&["maria  santos", "joão silva"]);
        let mut log = CorrectionLog::with_clock(clock());
        log.apply("Maria Santos", "M. Santos", 1).unwrap();
        log.apply("João Silva", "Joao", 1).unwrap();
        assert_eq!(log.reset(), 2);
        assert_eq!(log.reset(), 0);
        let resolver = CanonicalNameResolver::new(&base_names, &log);
        for (raw, normalized) in base_names.iter() {
            assert_eq!(resolver.resolve(Some(raw)).as_ref(), Some(normalized));
        }
    }

    #[test]
    fn missing_and_unknown_names() {
        let base_names = base(&[]);
        let log = CorrectionLog::with_clock(clock());
        let resolver = CanonicalNameResolver::new(&base_names, &log);
        assert_eq!(resolver.resolve(None), None);
        assert_eq!(resolver.resolve(Some("  ")), None);
        // Not seen at ingestion: normalized on the fly.
        assert_eq!(resolver.resolve(Some("carla  DOS reis")), Some("Carla dos Reis".to_string()));
    }
}
