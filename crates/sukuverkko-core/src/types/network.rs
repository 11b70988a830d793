//! `FamilyNetwork`: a resolved graph anchored at one family.
//!
//! Every map here stores the same logical neighbor under several string
//! keys (see "key replication" in the matcher's documentation) so that a
//! citation or resolver lookup can find a neighbor regardless of which
//! spelling variant of a name it has on hand. Lookup retries the keys in
//! order: `displayName`, bare `name`, trimmed `name`, `personKey`, then
//! falls back to a case-insensitive scan and a first-name prefix scan.
//!
//! `as_child_families` and `as_parent_families` are deliberately separate
//! maps. A parent of the main family is installed into `as_parent_families`
//! (keyed to the *main* family, since the parent is a parent there) before
//! as-child resolution runs, and then — if as-child resolution for that
//! same parent succeeds — into `as_child_families` (keyed to the parent's
//! *birth* family). The same key therefore resolves to two different
//! `Family` values depending on which map it is looked up in. This is
//! intentional: callers must not cross the maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::family::Family;
use crate::types::person::Person;

/// A small multi-key map from name-ish strings to a shared `Family`.
///
/// Internally this stores at most one `Family` per logical neighbor but
/// indexes it under every key variant produced by `install`, matching the
/// "≤ 1 family per logical neighbor, k ≤ 4 extra pointers" budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyedFamilyMap {
    entries: BTreeMap<String, Family>,
}

impl KeyedFamilyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `family` under every key-replication variant of `person`:
    /// `displayName`, bare `name`, trimmed `name`, `personKey`.
    pub fn install(&mut self, person: &Person, family: &Family) {
        let keys = [
            person.display_name(),
            person.name.clone(),
            person.name.trim().to_string(),
            person.person_key(),
        ];
        for key in keys {
            if !key.is_empty() {
                self.entries.insert(key, family.clone());
            }
        }
    }

    /// Install `family` under an arbitrary explicit key (used for the
    /// resolver's third spouse key: `firstName(spouse) + " " +
    /// surname(mainFamily.familyId)`).
    pub fn install_key(&mut self, key: impl Into<String>, family: &Family) {
        let key = key.into();
        if !key.is_empty() {
            self.entries.insert(key, family.clone());
        }
    }

    /// Look up a neighbor by name. Tries an exact key match first, then a
    /// case-insensitive scan, then a first-name-prefix scan.
    pub fn get(&self, name: &str) -> Option<&Family> {
        if let Some(f) = self.entries.get(name) {
            return Some(f);
        }
        let lower = name.to_lowercase();
        if let Some((_, f)) = self.entries.iter().find(|(k, _)| k.to_lowercase() == lower) {
            return Some(f);
        }
        let first_token = name.split_whitespace().next().unwrap_or(name);
        self.entries
            .iter()
            .find(|(k, _)| {
                let k_first = k.split_whitespace().next().unwrap_or(k.as_str());
                k_first.eq_ignore_ascii_case(first_token)
            })
            .map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// A resolved graph anchored at one family: the requested family plus its
/// one-hop as-child, as-parent, and spouse-as-child neighbors. Non-recursive
/// — neighbor families' own cross-references are never followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyNetwork {
    pub main_family: Family,
    /// Keyed by each parent of `main_family`: the family in which that
    /// parent appears as a child.
    pub as_child_families: KeyedFamilyMap,
    /// Keyed by each married child (and each discovered spouse) of
    /// `main_family`: the family in which that child appears as a parent.
    /// Also pre-populated with `main_family` itself under every parent's
    /// keys (see module docs).
    pub as_parent_families: KeyedFamilyMap,
    /// Keyed by each spouse name (in multiple spellings): the family in
    /// which that spouse appears as a child.
    pub spouse_as_child_families: KeyedFamilyMap,
}

impl FamilyNetwork {
    pub fn new(main_family: Family) -> Self {
        Self {
            main_family,
            as_child_families: KeyedFamilyMap::new(),
            as_parent_families: KeyedFamilyMap::new(),
            spouse_as_child_families: KeyedFamilyMap::new(),
        }
    }

    pub fn get_as_child_family(&self, person: &Person) -> Option<&Family> {
        self.as_child_families
            .get(&person.display_name())
            .or_else(|| self.as_child_families.get(&person.name))
            .or_else(|| self.as_child_families.get(&person.person_key()))
    }

    pub fn get_as_parent_family(&self, person: &Person) -> Option<&Family> {
        self.as_parent_families
            .get(&person.display_name())
            .or_else(|| self.as_parent_families.get(&person.name))
            .or_else(|| self.as_parent_families.get(&person.person_key()))
    }

    pub fn get_spouse_as_child_family(&self, spouse_name: &str) -> Option<&Family> {
        self.spouse_as_child_families.get(spouse_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn minimal_family(id: &str) -> Family {
        Family {
            family_id: crate::ids::FamilyId::new(id),
            page_references: vec![],
            couples: vec![crate::types::family::Couple {
                husband: Person::unknown_placeholder(),
                wife: Person::unknown_placeholder(),
                marriage_date: None,
                full_marriage_date: None,
                children: vec![],
                children_died_infancy: None,
                couple_notes: vec![],
            }],
            notes: vec![],
            note_definitions: Map::new(),
        }
    }

    #[test]
    fn install_replicates_across_four_keys() {
        let mut map = KeyedFamilyMap::new();
        let person = Person {
            name: "Maria".to_string(),
            patronymic: Some("-tr.".to_string()),
            birth_date: Some("1735".to_string()),
            ..Person::unknown_placeholder()
        };
        let family = minimal_family("KORPI 6");
        map.install(&person, &family);
        assert!(map.get("Maria -tr.").is_some());
        assert!(map.get("Maria").is_some());
        assert!(map.get("Maria|1735").is_some());
    }

    #[test]
    fn get_falls_back_to_case_insensitive_then_first_token() {
        let mut map = KeyedFamilyMap::new();
        let family = minimal_family("KORPI 6");
        map.install_key("Maria Korpela", &family);
        assert!(map.get("maria korpela").is_some());
        assert!(map.get("Maria").is_some());
    }

    #[test]
    fn as_parent_and_as_child_maps_are_independent() {
        let mut net = FamilyNetwork::new(minimal_family("KORPI 6"));
        let parent = Person {
            name: "Matti".to_string(),
            ..Person::unknown_placeholder()
        };
        let as_parent_family = minimal_family("KORPI 6");
        let as_child_family = minimal_family("KORPI 3");
        net.as_parent_families.install(&parent, &as_parent_family);
        net.as_child_families.install(&parent, &as_child_family);

        assert_eq!(
            net.get_as_parent_family(&parent).unwrap().family_id,
            crate::ids::FamilyId::new("KORPI 6")
        );
        assert_eq!(
            net.get_as_child_family(&parent).unwrap().family_id,
            crate::ids::FamilyId::new("KORPI 3")
        );
    }
}
