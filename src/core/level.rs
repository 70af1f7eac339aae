//! Severity levels and the level table
//!
//! Priorities follow the syslog convention: a lower number is more severe.
//! A sink with threshold `info` admits `error`, `warn` and `info` records and
//! rejects anything with a larger priority.

use super::error::{LoggerError, Result};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level {
    name: &'static str,
    priority: u8,
}

impl Level {
    pub const ERROR: Level = Level::new("error", 0);
    pub const WARN: Level = Level::new("warn", 1);
    pub const INFO: Level = Level::new("info", 2);
    pub const HTTP: Level = Level::new("http", 3);
    pub const AUDIT: Level = Level::new("audit", 4);
    pub const VERBOSE: Level = Level::new("verbose", 5);
    pub const DEBUG: Level = Level::new("debug", 6);

    pub const fn new(name: &'static str, priority: u8) -> Self {
        Self { name, priority }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Whether a threshold of `self` lets a record at `record` through
    #[inline]
    pub fn admits(&self, record: Level) -> bool {
        record.priority <= self.priority
    }

    #[inline]
    pub fn is_more_severe_than(&self, other: Level) -> bool {
        self.priority < other.priority
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Levels every table must register; the sink factory addresses these tiers
pub const REQUIRED_LEVELS: [&str; 3] = ["error", "info", "debug"];

/// Immutable set of levels known to a logger
///
/// # Example
///
/// ```
/// use rust_log_router::{Level, LevelTable};
///
/// let table = LevelTable::standard();
/// assert_eq!(table.get("audit").unwrap(), Level::AUDIT);
/// assert!(table.get("loud").is_err());
/// assert_eq!(table.most_permissive(), Level::DEBUG);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    levels: Vec<Level>,
}

impl LevelTable {
    /// Build a table, sorted by priority
    ///
    /// # Errors
    ///
    /// Fails on an empty table, a repeated name or priority, or when one of
    /// [`REQUIRED_LEVELS`] is missing.
    pub fn new(levels: &[Level]) -> Result<Self> {
        if levels.is_empty() {
            return Err(LoggerError::config("LevelTable", "at least one level is required"));
        }

        let mut sorted = levels.to_vec();
        sorted.sort_by_key(|level| level.priority);

        for pair in sorted.windows(2) {
            if pair[0].priority == pair[1].priority {
                return Err(LoggerError::DuplicateLevel {
                    field: "priority",
                    value: pair[0].priority.to_string(),
                });
            }
        }
        for (i, level) in sorted.iter().enumerate() {
            if sorted[i + 1..]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(level.name))
            {
                return Err(LoggerError::DuplicateLevel {
                    field: "name",
                    value: level.name.to_string(),
                });
            }
        }

        let table = Self { levels: sorted };
        for name in REQUIRED_LEVELS {
            if table.find(name).is_none() {
                return Err(LoggerError::config(
                    "LevelTable",
                    format!("required level '{}' is not registered", name),
                ));
            }
        }
        Ok(table)
    }

    /// error, warn, info, http, audit, verbose, debug
    pub fn standard() -> Self {
        Self {
            levels: vec![
                Level::ERROR,
                Level::WARN,
                Level::INFO,
                Level::HTTP,
                Level::AUDIT,
                Level::VERBOSE,
                Level::DEBUG,
            ],
        }
    }

    fn find(&self, name: &str) -> Option<Level> {
        self.levels
            .iter()
            .copied()
            .find(|level| level.name.eq_ignore_ascii_case(name))
    }

    /// Look up a level by name (case-insensitive)
    pub fn get(&self, name: &str) -> Result<Level> {
        self.find(name).ok_or_else(|| LoggerError::unknown_level(name))
    }

    /// The registered level carrying `level`'s name
    ///
    /// Levels are identified by name; the table's priority wins, so the
    /// built-in constants follow a renumbered table.
    pub fn resolve(&self, level: Level) -> Option<Level> {
        if self.contains(level) {
            return Some(level);
        }
        self.find(level.name)
    }

    pub fn contains(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    pub fn most_severe(&self) -> Level {
        self.levels[0]
    }

    /// The threshold that admits every registered level
    pub fn most_permissive(&self) -> Level {
        self.levels[self.levels.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_valid() {
        let standard = LevelTable::standard();
        let rebuilt = LevelTable::new(&standard.iter().collect::<Vec<_>>()).unwrap();
        assert_eq!(standard, rebuilt);
        assert_eq!(standard.most_severe(), Level::ERROR);
        assert_eq!(standard.most_permissive(), Level::DEBUG);
    }

    #[test]
    fn test_admits() {
        assert!(Level::INFO.admits(Level::ERROR));
        assert!(Level::INFO.admits(Level::INFO));
        assert!(!Level::INFO.admits(Level::DEBUG));
        assert!(Level::DEBUG.admits(Level::AUDIT));
        assert!(Level::ERROR.is_more_severe_than(Level::WARN));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = LevelTable::standard();
        assert_eq!(table.get("AUDIT").unwrap(), Level::AUDIT);
        assert!(matches!(
            table.get("fatal"),
            Err(LoggerError::UnknownLevel { .. })
        ));
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let err = LevelTable::new(&[
            Level::ERROR,
            Level::INFO,
            Level::DEBUG,
            Level::new("notice", 2),
        ])
        .unwrap_err();
        assert!(matches!(err, LoggerError::DuplicateLevel { field: "priority", .. }));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = LevelTable::new(&[
            Level::ERROR,
            Level::INFO,
            Level::DEBUG,
            Level::new("info", 9),
        ])
        .unwrap_err();
        assert!(matches!(err, LoggerError::DuplicateLevel { field: "name", .. }));
    }

    #[test]
    fn test_duplicate_name_ignores_case() {
        let err = LevelTable::new(&[
            Level::ERROR,
            Level::INFO,
            Level::DEBUG,
            Level::new("INFO", 9),
        ])
        .unwrap_err();
        assert!(matches!(err, LoggerError::DuplicateLevel { field: "name", .. }));
    }

    #[test]
    fn test_resolve_by_name() {
        let table = LevelTable::new(&[
            Level::new("error", 10),
            Level::new("info", 20),
            Level::new("debug", 30),
        ])
        .unwrap();

        assert_eq!(table.resolve(Level::ERROR), Some(Level::new("error", 10)));
        assert_eq!(table.resolve(Level::DEBUG), Some(Level::new("debug", 30)));
        assert_eq!(table.resolve(Level::new("info", 20)), Some(Level::new("info", 20)));
        assert_eq!(table.resolve(Level::WARN), None);
        assert!(!table.contains(Level::ERROR));
    }

    #[test]
    fn test_required_levels_enforced() {
        let err = LevelTable::new(&[Level::ERROR, Level::INFO]).unwrap_err();
        assert!(err.to_string().contains("'debug'"));

        assert!(LevelTable::new(&[]).is_err());
    }

    #[test]
    fn test_custom_table_sorted() {
        let table = LevelTable::new(&[
            Level::new("trace", 9),
            Level::DEBUG,
            Level::ERROR,
            Level::INFO,
        ])
        .unwrap();
        let names: Vec<_> = table.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["error", "info", "debug", "trace"]);
        assert_eq!(table.most_permissive().name(), "trace");
    }

    #[test]
    fn test_level_serializes_as_name() {
        let json = serde_json::to_string(&Level::AUDIT).unwrap();
        assert_eq!(json, "\"audit\"");
        assert_eq!(Level::VERBOSE.to_string(), "verbose");
    }
}
