//! `resolve_family_network`: the as-child, as-parent, spouse-as-child
//! resolution passes, in that order, one hop only.

use sukuverkko_cache::FamilyCache;
use sukuverkko_core::types::{Family, Person};
use sukuverkko_core::{FamilyId, FamilyNetwork};
use sukuverkko_extract::StructuredExtractor;
use sukuverkko_names::NameEquivalence;
use sukuverkko_text::SourceText;

use crate::matcher::{install_keys, persons_equal, spouse_matches};
use crate::stats::ResolutionStats;

/// A birth-date-based fallback search over all parsed families. Ships as a
/// documented stub (spec Open Question) — real implementations can supply
/// their own via [`ResolverContext::with_birth_date_resolver`].
pub type BirthDateResolver<'a> = dyn Fn(&Person) -> Option<FamilyId> + Send + Sync + 'a;

fn no_birth_date_search(_person: &Person) -> Option<FamilyId> {
    None
}

/// The collaborators the resolver needs, bundled so `resolve_family_network`
/// stays a free function over borrowed references rather than an object
/// that owns its own I/O handles.
pub struct ResolverContext<'a> {
    pub source: &'a SourceText,
    pub extractor: &'a dyn StructuredExtractor,
    pub names: &'a NameEquivalence,
    pub cache: &'a FamilyCache,
    birth_date_resolver: Box<BirthDateResolver<'a>>,
}

impl<'a> ResolverContext<'a> {
    pub fn new(
        source: &'a SourceText,
        extractor: &'a dyn StructuredExtractor,
        names: &'a NameEquivalence,
        cache: &'a FamilyCache,
    ) -> Self {
        Self {
            source,
            extractor,
            names,
            cache,
            birth_date_resolver: Box::new(no_birth_date_search),
        }
    }

    /// Substitutes the birth-date-search fallback (unimplemented by
    /// default per the spec's Open Question).
    pub fn with_birth_date_resolver(mut self, resolver: Box<BirthDateResolver<'a>>) -> Self {
        self.birth_date_resolver = resolver;
        self
    }
}

/// Builds `main`'s `FamilyNetwork` by resolving its as-child, as-parent,
/// and spouse-as-child neighbors, one hop only, leaves-first.
pub async fn resolve_family_network(main: Family, ctx: &ResolverContext<'_>) -> (FamilyNetwork, ResolutionStats) {
    let mut network = FamilyNetwork::new(main.clone());
    let mut stats = ResolutionStats::new();

    // Step 1: pre-populate every parent's as-parent entry with the main family.
    for parent in main.all_parents() {
        install_keys(&mut network.as_parent_families, parent, &main);
    }

    // Step 2: as-child resolution for each parent.
    for parent in main.all_parents() {
        if let Some(reference) = &parent.as_child {
            match resolve_neighbor(ctx, reference).await {
                Some(candidate) if family_contains_as_child(&candidate, parent, ctx.names) => {
                    install_keys(&mut network.as_child_families, parent, &candidate);
                    stats.record_resolved_by_family_id();
                }
                _ => match (ctx.birth_date_resolver)(parent) {
                    Some(alt_reference) => match resolve_neighbor(ctx, &alt_reference).await {
                        Some(candidate) if family_contains_as_child(&candidate, parent, ctx.names) => {
                            install_keys(&mut network.as_child_families, parent, &candidate);
                            stats.record_resolved_by_birth_date();
                        }
                        _ => stats.record_unresolved(),
                    },
                    None => stats.record_unresolved(),
                },
            }
        }
    }

    // Step 3: as-parent resolution for each married child.
    let married_children: Vec<Person> = main.married_children().into_iter().cloned().collect();
    let mut resolved_child_as_parent: Vec<(Person, Family)> = Vec::new();
    for child in &married_children {
        if let Some(reference) = &child.as_parent {
            match resolve_neighbor(ctx, reference).await {
                Some(candidate) if family_contains_as_parent(&candidate, child, ctx.names) => {
                    install_keys(&mut network.as_parent_families, child, &candidate);
                    stats.record_resolved_by_family_id();
                    resolved_child_as_parent.push((child.clone(), candidate));
                }
                _ => match (ctx.birth_date_resolver)(child) {
                    Some(alt_reference) => match resolve_neighbor(ctx, &alt_reference).await {
                        Some(candidate) if family_contains_as_parent(&candidate, child, ctx.names) => {
                            install_keys(&mut network.as_parent_families, child, &candidate);
                            stats.record_resolved_by_birth_date();
                        }
                        _ => stats.record_unresolved(),
                    },
                    None => stats.record_unresolved(),
                },
            }
        }
    }

    // Step 4: spouse-as-child resolution for each resolved married child.
    for (child, as_parent_family) in &resolved_child_as_parent {
        let Some(spouse_person) = find_spouse_in_family(as_parent_family, child, ctx.names) else {
            continue;
        };

        install_keys(&mut network.as_parent_families, &spouse_person, as_parent_family);

        let spouse_reference = spouse_person
            .as_child
            .clone()
            .or_else(|| (ctx.birth_date_resolver)(&spouse_person));

        let Some(reference) = spouse_reference else {
            stats.record_unresolved();
            continue;
        };

        match resolve_neighbor(ctx, &reference).await {
            Some(spouse_as_child_family) => {
                stats.record_resolved_by_family_id();
                network
                    .spouse_as_child_families
                    .install_key(spouse_person.display_name(), &spouse_as_child_family);
                if spouse_person.name != spouse_person.display_name() {
                    network
                        .spouse_as_child_families
                        .install_key(spouse_person.name.clone(), &spouse_as_child_family);
                }
                let surname_key = format!("{} {}", first_name(&spouse_person), main.family_id.surname());
                network
                    .spouse_as_child_families
                    .install_key(surname_key, &spouse_as_child_family);
            }
            None => stats.record_unresolved(),
        }
    }

    (network, stats)
}

/// Looks up `reference` in the cache first (returning the cached network's
/// nuclear family, never recursing into its own neighbors); on a miss,
/// segments the source text and calls the extractor adapter directly.
async fn resolve_neighbor(ctx: &ResolverContext<'_>, reference: &FamilyId) -> Option<Family> {
    if let Some(cached) = ctx.cache.get(reference) {
        return Some(cached.network.main_family);
    }

    let segment = ctx.source.segment(reference)?;
    let raw = ctx.extractor.extract(reference, segment).await.ok()?;
    sukuverkko_extract::normalize_response(reference, &raw).ok()
}

fn family_contains_as_child(family: &Family, parent: &Person, names: &NameEquivalence) -> bool {
    family
        .couples
        .iter()
        .flat_map(|c| c.children.iter())
        .any(|child| persons_equal(child, parent, names))
}

fn family_contains_as_parent(family: &Family, child: &Person, names: &NameEquivalence) -> bool {
    family
        .all_parents()
        .into_iter()
        .any(|parent| persons_equal(parent, child, names))
}

/// Finds the spouse of `child` inside `child`'s resolved as-parent family:
/// the couple containing a person equal to `child`, returning the other
/// half of that couple. Falls back to a relaxed spouse-string match against
/// every parent in the family if no couple matches by strict equality.
fn find_spouse_in_family(family: &Family, child: &Person, names: &NameEquivalence) -> Option<Person> {
    for couple in &family.couples {
        if persons_equal(&couple.husband, child, names) {
            return Some(couple.wife.clone());
        }
        if persons_equal(&couple.wife, child, names) {
            return Some(couple.husband.clone());
        }
    }

    let spouse_str = child.spouse.as_deref()?;
    family
        .all_parents()
        .into_iter()
        .find(|candidate| spouse_matches(spouse_str, candidate, names))
        .cloned()
}

fn first_name(person: &Person) -> &str {
    person.name.split_whitespace().next().unwrap_or(&person.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukuverkko_core::types::Couple;
    use std::collections::BTreeMap;

    fn placeholder_couple(husband_name: &str, wife_name: &str) -> Couple {
        Couple {
            husband: Person {
                name: husband_name.to_string(),
                ..Person::unknown_placeholder()
            },
            wife: Person {
                name: wife_name.to_string(),
                ..Person::unknown_placeholder()
            },
            marriage_date: None,
            full_marriage_date: None,
            children: vec![],
            children_died_infancy: None,
            couple_notes: vec![],
        }
    }

    fn family_with_child(id: &str, parent_birth_date: Option<&str>) -> Family {
        let mut couple = placeholder_couple("Antti", "Liisa");
        couple.children.push(Person {
            name: "Matti".to_string(),
            birth_date: parent_birth_date.map(str::to_string),
            ..Person::unknown_placeholder()
        });
        Family {
            family_id: FamilyId::new(id),
            page_references: vec![],
            couples: vec![couple],
            notes: vec![],
            note_definitions: BTreeMap::new(),
        }
    }

    #[test]
    fn family_contains_as_child_matches_by_birth_date() {
        let names = NameEquivalence::load_default();
        let family = family_with_child("KORPI 3", Some("1700"));
        let parent = Person {
            name: "Matti".to_string(),
            birth_date: Some("1700".to_string()),
            ..Person::unknown_placeholder()
        };
        assert!(family_contains_as_child(&family, &parent, &names));
    }

    #[test]
    fn find_spouse_in_family_returns_the_other_half_of_the_couple() {
        let names = NameEquivalence::load_default();
        let family = Family {
            family_id: FamilyId::new("KORPI 7"),
            page_references: vec![],
            couples: vec![placeholder_couple("Matti", "Maria")],
            notes: vec![],
            note_definitions: BTreeMap::new(),
        };
        let child = Person {
            name: "Matti".to_string(),
            ..Person::unknown_placeholder()
        };
        let spouse = find_spouse_in_family(&family, &child, &names).unwrap();
        assert_eq!(spouse.name, "Maria");
    }
}
