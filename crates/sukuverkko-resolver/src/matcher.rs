//! Person and spouse-string equality, and the key-replication helper
//! shared by every pass of the resolver.

use sukuverkko_core::types::{Family, KeyedFamilyMap, Person};
use sukuverkko_names::NameEquivalence;

/// Strict person-equality ladder. The first matching rule wins; rule 1
/// never falls through to name matching once both persons carry a birth
/// date, even if the dates disagree.
pub fn persons_equal(a: &Person, b: &Person, names: &NameEquivalence) -> bool {
    match (&a.birth_date, &b.birth_date) {
        (Some(da), Some(db)) => {
            if da == db {
                return true;
            }
            let pa = sukuverkko_dates::parse(da);
            let pb = sukuverkko_dates::parse(db);
            let ya = sukuverkko_dates::year_of(&pa, None);
            let yb = sukuverkko_dates::year_of(&pb, None);
            matches!((ya, yb), (Some(x), Some(y)) if x == y)
        }
        _ => {
            let a_name = a.name.trim().to_lowercase();
            let b_name = b.name.trim().to_lowercase();
            if a_name == b_name {
                return true;
            }
            names.are_equivalent(&a.name, &b.name)
        }
    }
}

/// Relaxed ladder used to find a known spouse name string among a
/// resolved as-parent family's parents: exact lowercased name equality,
/// `displayName` containment either direction, first-token containment,
/// or first-token equality.
pub fn spouse_matches(spouse_str: &str, candidate: &Person, _names: &NameEquivalence) -> bool {
    let spouse_lower = spouse_str.trim().to_lowercase();
    if spouse_lower.is_empty() {
        return false;
    }
    let candidate_name = candidate.name.trim().to_lowercase();
    if spouse_lower == candidate_name {
        return true;
    }

    let candidate_display = candidate.display_name().to_lowercase();
    if candidate_display.contains(&spouse_lower) || spouse_lower.contains(&candidate_display) {
        return true;
    }

    let spouse_first = spouse_lower.split_whitespace().next().unwrap_or(&spouse_lower);
    let candidate_first = candidate_name
        .split_whitespace()
        .next()
        .unwrap_or(candidate_name.as_str());

    candidate_name.contains(spouse_first)
        || spouse_lower.contains(candidate_first)
        || candidate_first == spouse_first
}

/// Installs `family` into `map` under every key-replication variant of
/// `person`: `displayName`, bare `name`, trimmed `name`, `personKey`.
pub fn install_keys(map: &mut KeyedFamilyMap, person: &Person, family: &Family) {
    map.install(person, family);
}
