//! Pure citation-string generator over a `Family` and its resolved
//! `FamilyNetwork` (spec §4.9). No I/O, no logging — callers log the
//! outcome, the formatter itself stays a pure function of its inputs.

mod lines;
mod matching;
mod notes;

use sukuverkko_core::{Couple, Family, FamilyNetwork, Person};
use sukuverkko_names::NameEquivalence;

/// Generates the citation string for `family`. `target`, when given,
/// marks one parent or child whose line is prefixed with `→ ` and, for a
/// married child with a resolved as-parent family, triggers the enhanced
/// child-line rendering and its "Additional information:" footer entry.
/// `network` supplies the as-parent lookups the enhancement needs;
/// without it every child line renders in baseline form.
pub fn generate_citation(
    family: &Family,
    target: Option<&Person>,
    network: Option<&FamilyNetwork>,
    names: Option<&NameEquivalence>,
) -> String {
    let mut out = String::new();
    let primary = family.primary_couple();
    let context_birth_year = birth_year_of(&primary.husband);

    out.push_str(&format!("Information on {} includes:\n", family.page_references.join(", ")));
    out.push_str(&lines::parent_line(&primary.husband, matching::is_target(&primary.husband, target, names), None));
    out.push('\n');
    out.push_str(&lines::parent_line(&primary.wife, matching::is_target(&primary.wife, target, names), None));
    out.push('\n');

    if let Some(m) = couple_marriage_date(primary, context_birth_year) {
        out.push_str(&format!("m. {m}\n"));
    }

    let mut enhancement_lines = Vec::new();

    if !primary.children.is_empty() {
        out.push_str("Children:\n");
        for child in &primary.children {
            let is_child_target = matching::is_target(child, target, names);
            let enhanced = is_child_target
                .then(|| network.and_then(|net| net.get_as_parent_family(child)))
                .flatten()
                .filter(|_| child.spouse.is_some())
                .and_then(|as_parent| find_person_and_couple(as_parent, child, names).map(|pc| (as_parent, pc)));

            match enhanced {
                Some((as_parent, (as_parent_person, as_parent_couple))) => {
                    let spouse_name = child.spouse.clone().unwrap_or_default();
                    let result = lines::child_line_enhanced(
                        child,
                        &spouse_name,
                        as_parent_person.death_date.as_deref(),
                        (as_parent_person.full_marriage_date.as_deref(), as_parent_person.marriage_date.as_deref()),
                        (as_parent_couple.full_marriage_date.as_deref(), as_parent_couple.marriage_date.as_deref()),
                        is_child_target,
                    );
                    out.push_str(&result.line);
                    out.push('\n');
                    if let Some(footer) = enhancement_footer_line(child, as_parent, result.marriage_enhanced, result.death_enhanced) {
                        enhancement_lines.push(footer);
                    }
                }
                None => {
                    out.push_str(&lines::child_line_baseline(child, is_child_target));
                    out.push('\n');
                }
            }
        }
    }

    for (index, couple) in family.additional_couples().iter().enumerate() {
        out.push_str("Additional spouse:\n");
        let new_spouse = new_spouse_of(couple, primary);
        match notes::widow_antecedent(&family.notes, index) {
            Some(antecedent) => {
                let dates = lines::dates_fragment(new_spouse);
                if dates.is_empty() {
                    out.push_str(&format!("{}, widow of {}\n", new_spouse.display_name(), antecedent));
                } else {
                    out.push_str(&format!("{}, widow of {}, {}\n", new_spouse.display_name(), antecedent, dates));
                }
            }
            None => {
                out.push_str(&lines::parent_line(new_spouse, matching::is_target(new_spouse, target, names), None));
                out.push('\n');
            }
        }
        if let Some(m) = couple_marriage_date(couple, context_birth_year) {
            out.push_str(&format!("m. {m}\n"));
        }
    }

    let infancy_total: u32 = family.couples.iter().filter_map(|c| c.children_died_infancy).sum();
    let general_notes = notes::general_notes(&family.notes);
    if !general_notes.is_empty() || !family.note_definitions.is_empty() || infancy_total > 0 {
        out.push_str("Note:\n");
        for note in &general_notes {
            out.push_str(note);
            out.push('\n');
        }
        for (marker, definition) in &family.note_definitions {
            out.push_str(&format!("{marker} {definition}\n"));
        }
        if infancy_total > 0 {
            out.push_str(&format!("{infancy_total} child(ren) died in infancy\n"));
        }
    }

    if !enhancement_lines.is_empty() {
        out.push_str("Additional information:\n");
        for line in &enhancement_lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

fn enhancement_footer_line(child: &Person, as_parent: &Family, marriage_enhanced: bool, death_enhanced: bool) -> Option<String> {
    let what = match (marriage_enhanced, death_enhanced) {
        (true, true) => "marriage and death dates are",
        (true, false) => "marriage date is",
        (false, true) => "death date is",
        (false, false) => return None,
    };
    Some(format!("{}'s {what} on {}", child.display_name(), as_parent.page_references.join(", ")))
}

fn find_person_and_couple<'a>(family: &'a Family, target: &Person, names: Option<&NameEquivalence>) -> Option<(&'a Person, &'a Couple)> {
    family.couples.iter().find_map(|couple| {
        if matching::is_target(&couple.husband, Some(target), names) {
            Some((&couple.husband, couple))
        } else if matching::is_target(&couple.wife, Some(target), names) {
            Some((&couple.wife, couple))
        } else {
            None
        }
    })
}

/// The half of `couple` that is not a continuing member of `primary`
/// (i.e. the newly-introduced spouse of a remarriage).
fn new_spouse_of<'a>(couple: &'a Couple, primary: &Couple) -> &'a Person {
    let husband_is_continuing = same_name(&couple.husband, &primary.husband) || same_name(&couple.husband, &primary.wife);
    if husband_is_continuing {
        &couple.wife
    } else {
        &couple.husband
    }
}

fn same_name(a: &Person, b: &Person) -> bool {
    a.name.trim().eq_ignore_ascii_case(b.name.trim())
}

fn couple_marriage_date(couple: &Couple, contextual_birth_year: Option<i32>) -> Option<String> {
    if let Some(full) = &couple.full_marriage_date {
        return Some(sukuverkko_dates::format_str(full, contextual_birth_year));
    }
    couple
        .marriage_date
        .as_deref()
        .and_then(|s| sukuverkko_dates::extract_marriage_year(s, contextual_birth_year))
}

fn birth_year_of(person: &Person) -> Option<i32> {
    person
        .birth_date
        .as_deref()
        .map(sukuverkko_dates::parse)
        .and_then(|parsed| sukuverkko_dates::year_of(&parsed, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukuverkko_core::FamilyId;

    fn couple(husband_birth: &str, wife_birth: &str, marriage: &str) -> Couple {
        Couple {
            husband: Person {
                name: "Matti".to_string(),
                birth_date: Some(husband_birth.to_string()),
                ..Person::unknown_placeholder()
            },
            wife: Person {
                name: "Maria".to_string(),
                birth_date: Some(wife_birth.to_string()),
                ..Person::unknown_placeholder()
            },
            marriage_date: None,
            full_marriage_date: Some(marriage.to_string()),
            children: vec![],
            children_died_infancy: None,
            couple_notes: vec![],
        }
    }

    #[test]
    fn scenario_a_plain_extract_and_citation() {
        let mut primary = couple("05.11.1730", "12.03.1735", "08.1755");
        primary.children = vec![Person {
            name: "Liisa".to_string(),
            birth_date: Some("1756".to_string()),
            ..Person::unknown_placeholder()
        }];
        let family = Family {
            family_id: FamilyId::new("KORPI 6"),
            page_references: vec!["120".to_string()],
            couples: vec![primary],
            notes: vec![],
            note_definitions: Default::default(),
        };

        let citation = generate_citation(&family, None, None, None);
        assert!(citation.starts_with("Information on 120 includes:\n"));
        assert!(citation.contains("Matti, 5 November 1730"), "citation was:\n{citation}");
    }

    #[test]
    fn scenario_b_century_inference_from_context() {
        let mut primary = couple("1730", "1735", "1755");
        primary.full_marriage_date = None;
        primary.children = vec![Person {
            name: "Liisa".to_string(),
            birth_date: Some("1760".to_string()),
            marriage_date: Some("78".to_string()),
            spouse: Some("Antti Korvela".to_string()),
            ..Person::unknown_placeholder()
        }];
        let family = Family {
            family_id: FamilyId::new("KORPI 6"),
            page_references: vec!["120".to_string()],
            couples: vec![primary],
            notes: vec![],
            note_definitions: Default::default(),
        };

        let citation = generate_citation(&family, None, None, None);
        assert!(citation.contains(", m. Antti Korvela 1778"), "citation was:\n{citation}");
    }

    #[test]
    fn scenario_d_widow_annotation() {
        let primary = couple("1700", "1705", "1725");
        let mut second = couple("1700", "1710", "1783");
        second.husband = Person {
            name: "Matti".to_string(),
            ..Person::unknown_placeholder()
        };
        let family = Family {
            family_id: FamilyId::new("KORPI 6"),
            page_references: vec!["120".to_string()],
            couples: vec![primary, second],
            notes: vec!["Maria Matint. leski 1782 lähtien.".to_string()],
            note_definitions: Default::default(),
        };

        let citation = generate_citation(&family, None, None, None);
        assert!(citation.contains("widow of Maria Matint."), "citation was:\n{citation}");
    }

    #[test]
    fn placeholder_spouse_renders_literal_unknown() {
        let mut primary = couple("1700", "1705", "1725");
        primary.wife = Person::unknown_placeholder();
        let family = Family {
            family_id: FamilyId::new("KORPI 6"),
            page_references: vec!["120".to_string()],
            couples: vec![primary],
            notes: vec![],
            note_definitions: Default::default(),
        };

        let citation = generate_citation(&family, None, None, None);
        assert!(citation.contains("Unknown"), "citation was:\n{citation}");
    }

    #[test]
    fn note_block_includes_sorted_marker_definitions_and_infancy_count() {
        let mut primary = couple("1700", "1705", "1725");
        primary.children_died_infancy = Some(2);
        let mut note_definitions = std::collections::BTreeMap::new();
        note_definitions.insert("*".to_string(), "second marriage".to_string());
        note_definitions.insert("**".to_string(), "emigrated".to_string());
        let family = Family {
            family_id: FamilyId::new("KORPI 6"),
            page_references: vec!["120".to_string()],
            couples: vec![primary],
            notes: vec!["Perhe muutti Ouluun 1790.".to_string()],
            note_definitions,
        };

        let citation = generate_citation(&family, None, None, None);
        assert!(citation.contains("Note:\n"));
        assert!(citation.contains("Perhe muutti Ouluun 1790.\n"));
        assert!(citation.contains("* second marriage\n"));
        assert!(citation.contains("2 child(ren) died in infancy\n"));
    }
}
