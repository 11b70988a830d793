//! A minimal person-identity check local to the citation generator.
//!
//! This deliberately does not reuse the resolver's strict matcher ladder
//! (that would make this crate depend on `sukuverkko-resolver`, inverting
//! the intended dependency direction — the resolver builds the network
//! this crate only reads). Citation only ever needs "is this the
//! caller-supplied target", which tolerates a looser rule.

use sukuverkko_core::types::Person;
use sukuverkko_names::NameEquivalence;

pub(crate) fn is_target(person: &Person, target: Option<&Person>, names: Option<&NameEquivalence>) -> bool {
    let Some(target) = target else {
        return false;
    };
    if person.birth_date.is_some() && target.birth_date.is_some() {
        return person.birth_date == target.birth_date && names_match(&person.name, &target.name, names);
    }
    names_match(&person.name, &target.name, names)
}

fn names_match(a: &str, b: &str, names: Option<&NameEquivalence>) -> bool {
    if a.trim().eq_ignore_ascii_case(b.trim()) {
        return true;
    }
    names.is_some_and(|n| n.are_equivalent(a, b))
}
