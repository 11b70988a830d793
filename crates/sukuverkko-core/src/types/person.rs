//! The `Person` value type and its derived properties.

use serde::{Deserialize, Serialize};

use crate::ids::FamilyId;

/// The literal display name used for a present-but-unknown spouse slot on a
/// [`crate::types::Couple`]. Never appears in a `Couple`'s `children`.
pub const UNKNOWN_PLACEHOLDER_NAME: &str = "Unknown";

/// A natural person appearing in a family record.
///
/// `Person` is immutable once constructed by the extractor adapter; the
/// resolver only ever augments a [`crate::types::FamilyNetwork`]'s maps, it
/// never mutates a `Person` or the `Family` that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Given name, possibly multi-word.
    pub name: String,
    /// Optional "father's son/daughter" suffix token, e.g. `"-np."`, `"-nt."`.
    pub patronymic: Option<String>,
    /// Partial birth date string, see `sukuverkko-dates`.
    pub birth_date: Option<String>,
    /// Partial death date string.
    pub death_date: Option<String>,
    /// Two-digit-year shorthand marriage date, e.g. `"78"`.
    pub marriage_date: Option<String>,
    /// Full-form marriage date, e.g. `"03.06.1778"`.
    pub full_marriage_date: Option<String>,
    /// The spouse's name as literally written in this record.
    pub spouse: Option<String>,
    /// Reference to the family in which this person appears as a child.
    pub as_child: Option<FamilyId>,
    /// Reference to the family in which this person appears as a parent.
    pub as_parent: Option<FamilyId>,
    /// Opaque external database identifier.
    pub external_id: Option<String>,
    /// Ordered multiset of note-marker tokens (asterisks only, per the
    /// extractor adapter's normalization rules) referring to definitions
    /// in the enclosing family's `note_definitions`.
    pub note_markers: Vec<String>,
}

impl Person {
    /// A present-but-unknown spouse placeholder: `name = "Unknown"`, every
    /// other field empty. Required so a widow/widower family still carries
    /// the missing spouse's slot in a `Couple`.
    pub fn unknown_placeholder() -> Self {
        Self {
            name: UNKNOWN_PLACEHOLDER_NAME.to_string(),
            patronymic: None,
            birth_date: None,
            death_date: None,
            marriage_date: None,
            full_marriage_date: None,
            spouse: None,
            as_child: None,
            as_parent: None,
            external_id: None,
            note_markers: Vec::new(),
        }
    }

    /// `true` if this is the `Unknown` placeholder spouse.
    pub fn is_unknown_placeholder(&self) -> bool {
        self.name == UNKNOWN_PLACEHOLDER_NAME
    }

    /// `name` with optional patronymic joined by a single space.
    pub fn display_name(&self) -> String {
        match &self.patronymic {
            Some(p) if !p.is_empty() => format!("{} {}", self.name, p),
            _ => self.name.clone(),
        }
    }

    /// `"{name}|{birthDate}"` if a birth date is present, else bare `name`.
    /// Not globally unique, but the primary lookup key within a family
    /// network.
    pub fn person_key(&self) -> String {
        match &self.birth_date {
            Some(b) if !b.is_empty() => format!("{}|{}", self.name, b),
            _ => self.name.clone(),
        }
    }

    /// `true` if this person carries a non-empty `spouse` (i.e. is married).
    pub fn is_married(&self) -> bool {
        self.spouse.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_with_patronymic() {
        let p = Person {
            patronymic: Some("-np.".to_string()),
            ..Person::unknown_placeholder()
        };
        assert_eq!(p.display_name(), "Unknown -np.");
    }

    #[test]
    fn display_name_without_patronymic() {
        let p = Person {
            name: "Maria".to_string(),
            ..Person::unknown_placeholder()
        };
        assert_eq!(p.display_name(), "Maria");
    }

    #[test]
    fn person_key_uses_birth_date_when_present() {
        let p = Person {
            name: "Maria".to_string(),
            birth_date: Some("1730".to_string()),
            ..Person::unknown_placeholder()
        };
        assert_eq!(p.person_key(), "Maria|1730");
    }

    #[test]
    fn person_key_falls_back_to_name() {
        let p = Person {
            name: "Maria".to_string(),
            ..Person::unknown_placeholder()
        };
        assert_eq!(p.person_key(), "Maria");
    }

    #[test]
    fn unknown_placeholder_is_detected() {
        assert!(Person::unknown_placeholder().is_unknown_placeholder());
    }
}
