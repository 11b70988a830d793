//! The `Couple` and `Family` value types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::FamilyId;
use crate::types::person::Person;

/// A marriage within a family record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Couple {
    /// The husband. May be the `Unknown` placeholder (see
    /// [`Person::unknown_placeholder`]) when only the wife's side of a
    /// widow/widower family is known.
    pub husband: Person,
    /// The wife. Same placeholder rule as `husband`.
    pub wife: Person,
    /// Two-digit-year shorthand marriage date.
    pub marriage_date: Option<String>,
    /// Full-form marriage date.
    pub full_marriage_date: Option<String>,
    /// Ordered sequence of children. Never contains an `Unknown`
    /// placeholder.
    pub children: Vec<Person>,
    /// Count of children who died in infancy, if recorded.
    pub children_died_infancy: Option<u32>,
    /// Ordered sequence of free-text notes scoped to this couple.
    pub couple_notes: Vec<String>,
}

impl Couple {
    /// Children that carry a non-empty `spouse`.
    pub fn married_children(&self) -> impl Iterator<Item = &Person> {
        self.children.iter().filter(|c| c.is_married())
    }
}

/// A single parish record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    /// Canonical identifier, `<CLAN> [<ROMAN>] <SUFFIX>`.
    pub family_id: FamilyId,
    /// Ordered sequence of page-number strings this record spans.
    pub page_references: Vec<String>,
    /// Non-empty ordered sequence of couples. The first is the primary
    /// couple; subsequent couples represent remarriages of one surviving
    /// member of the primary couple.
    pub couples: Vec<Couple>,
    /// Ordered sequence of free-text notes from the record.
    pub notes: Vec<String>,
    /// Marker token (asterisks only, no surrounding punctuation) to
    /// free-text definition. Keys match `note_markers` on persons.
    pub note_definitions: BTreeMap<String, String>,
}

impl Family {
    /// The first couple: `couples[0]`. Panics if `couples` is empty, which
    /// the extractor adapter's schema validation never allows to happen.
    pub fn primary_couple(&self) -> &Couple {
        &self.couples[0]
    }

    /// Couples after the primary one, i.e. remarriages.
    pub fn additional_couples(&self) -> &[Couple] {
        if self.couples.is_empty() {
            &[]
        } else {
            &self.couples[1..]
        }
    }

    /// Parents across all couples, each exactly once (by identity of
    /// position, not by matcher equality — a person appearing as a spouse
    /// in two couples of the same family, e.g. a remarriage, is listed
    /// twice, once per couple, since they are written twice in the
    /// source).
    pub fn all_parents(&self) -> Vec<&Person> {
        let mut out = Vec::with_capacity(self.couples.len() * 2);
        for couple in &self.couples {
            out.push(&couple.husband);
            out.push(&couple.wife);
        }
        out
    }

    /// Children across all couples that carry a non-empty `spouse`.
    pub fn married_children(&self) -> Vec<&Person> {
        self.couples
            .iter()
            .flat_map(|c| c.married_children())
            .collect()
    }
}
