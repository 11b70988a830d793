//! Given-name equivalence across Finnish/Swedish/Latin spelling variants.
//!
//! The relation is symmetric, reflexive, and transitive: it partitions
//! given-name strings into equivalence classes ("Matti", "Mathias", "Matts"
//! are the same name written in Finnish, Latin, and Swedish respectively).
//! Loaded once at startup; read-only thereafter for the duration of a
//! resolver run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

/// The embedded default equivalence table, one class per non-empty,
/// non-comment line, names comma-separated.
const DEFAULT_TABLE: &str = include_str!("default_table.txt");

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameTableError {
    #[error("failed to read name equivalence table at {path}: {reason}")]
    Io { path: String, reason: String },
}

fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A read-only given-name equivalence relation.
#[derive(Debug, Clone)]
pub struct NameEquivalence {
    class_of: Arc<HashMap<String, usize>>,
    classes: Arc<Vec<Vec<String>>>,
}

impl NameEquivalence {
    /// Parse an equivalence table from its textual representation.
    pub fn from_table(table: &str) -> Self {
        let mut classes: Vec<Vec<String>> = Vec::new();
        let mut class_of: HashMap<String, usize> = HashMap::new();

        for line in table.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let names: Vec<String> = line
                .split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect();
            if names.is_empty() {
                continue;
            }
            let class_id = classes.len();
            for name in &names {
                class_of.insert(normalize_key(name), class_id);
            }
            classes.push(names);
        }

        Self {
            class_of: Arc::new(class_of),
            classes: Arc::new(classes),
        }
    }

    /// Load the equivalence relation from the embedded default table.
    pub fn load_default() -> Self {
        Self::from_table(DEFAULT_TABLE)
    }

    /// Load the equivalence relation from an external file, replacing the
    /// embedded default entirely.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, NameTableError> {
        let path_ref = path.as_ref();
        let contents = std::fs::read_to_string(path_ref).map_err(|e| NameTableError::Io {
            path: path_ref.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_table(&contents))
    }

    /// The set of strings equivalent to `name`, including `name` itself.
    /// A name absent from every class is its own singleton class.
    pub fn equivalents(&self, name: &str) -> HashSet<String> {
        let key = normalize_key(name);
        match self.class_of.get(&key) {
            Some(&class_id) => self.classes[class_id].iter().cloned().collect(),
            None => {
                let mut set = HashSet::new();
                set.insert(name.trim().to_string());
                set
            }
        }
    }

    /// `true` iff `a` and `b` share an equivalence class (case-insensitive,
    /// whitespace-trimmed).
    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        let key_a = normalize_key(a);
        let key_b = normalize_key(b);
        if key_a == key_b {
            return true;
        }
        match (self.class_of.get(&key_a), self.class_of.get(&key_b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }
}

impl Default for NameEquivalence {
    fn default() -> Self {
        Self::load_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_table_without_panicking() {
        let eq = NameEquivalence::load_default();
        assert!(eq.are_equivalent("Matti", "matti"));
    }

    #[test]
    fn cross_spelling_equivalence() {
        let eq = NameEquivalence::from_table("Matti, Mathias, Matts\nMaria, Maija, Marja");
        assert!(eq.are_equivalent("Matti", "Mathias"));
        assert!(eq.are_equivalent("maija", "Marja"));
        assert!(!eq.are_equivalent("Matti", "Maria"));
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let eq = NameEquivalence::from_table("Matti, Mathias");
        assert!(eq.are_equivalent("  matti ", "MATHIAS"));
    }

    #[test]
    fn unknown_name_is_its_own_singleton_class() {
        let eq = NameEquivalence::from_table("Matti, Mathias");
        let equivalents = eq.equivalents("Zacharias");
        assert_eq!(equivalents.len(), 1);
        assert!(equivalents.contains("Zacharias"));
    }

    #[test]
    fn equivalents_includes_self() {
        let eq = NameEquivalence::from_table("Matti, Mathias, Matts");
        let set = eq.equivalents("Matts");
        assert!(set.contains("Matts"));
        assert!(set.contains("Matti"));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let eq = NameEquivalence::from_table("# comment\n\nMatti, Mathias\n");
        assert!(eq.are_equivalent("Matti", "Mathias"));
    }
}
