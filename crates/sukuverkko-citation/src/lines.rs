//! Per-line rendering rules (spec §4.9).

use sukuverkko_core::types::Person;

/// `"<displayName>, <birth> - <death><markers>"`, or the `b.`/`d.`-prefixed
/// single-date forms, or the bare name when neither date is known.
/// `→ ` is prepended when `is_target` is set.
pub(crate) fn parent_line(person: &Person, is_target: bool, contextual_birth_year: Option<i32>) -> String {
    let birth = person.birth_date.as_deref().map(|d| sukuverkko_dates::format_str(d, None));
    let death = person
        .death_date
        .as_deref()
        .map(|d| sukuverkko_dates::format_str(d, contextual_birth_year));
    let markers = marker_suffix(&person.note_markers);

    let body = match (birth, death) {
        (Some(b), Some(d)) => format!("{}, {} - {}{}", person.display_name(), b, d, markers),
        (Some(b), None) => format!("{}, b. {}{}", person.display_name(), b, markers),
        (None, Some(d)) => format!("{}, d. {}{}", person.display_name(), d, markers),
        (None, None) => format!("{}{}", person.display_name(), markers),
    };

    if is_target {
        format!("→ {body}")
    } else {
        body
    }
}

/// The birth/death date fragment alone (no name), used by the widow
/// annotation: `"<birth> - <death>"`, `"b. <birth>"`, `"d. <death>"`, or
/// empty when neither is known.
pub(crate) fn dates_fragment(person: &Person) -> String {
    let birth = person.birth_date.as_deref().map(|d| sukuverkko_dates::format_str(d, None));
    let death = person.death_date.as_deref().map(|d| sukuverkko_dates::format_str(d, None));
    match (birth, death) {
        (Some(b), Some(d)) => format!("{b} - {d}"),
        (Some(b), None) => format!("b. {b}"),
        (None, Some(d)) => format!("d. {d}"),
        (None, None) => String::new(),
    }
}

/// The child line, baseline form: `"<name>, b. <birth>, m. <spouse>
/// <marriage>, d. <death> <markers>"` with each segment present only if
/// its data is. `marriage` renders via century inference against the
/// child's own birth year when only a two-digit year is on hand.
pub(crate) fn child_line_baseline(child: &Person, is_target: bool) -> String {
    let birth_year = sukuverkko_dates::year_of(&sukuverkko_dates::parse(child.birth_date.as_deref().unwrap_or("")), None);
    let mut segments = vec![child.display_name()];

    if let Some(b) = &child.birth_date {
        segments.push(format!("b. {}", sukuverkko_dates::format_str(b, None)));
    }
    if let Some(spouse) = &child.spouse {
        let marriage = marriage_string(child.full_marriage_date.as_deref(), child.marriage_date.as_deref(), birth_year);
        match marriage {
            Some(m) => segments.push(format!("m. {spouse} {m}")),
            None => segments.push(format!("m. {spouse}")),
        }
    }
    if let Some(d) = &child.death_date {
        segments.push(format!("d. {}", sukuverkko_dates::format_str(d, birth_year)));
    }

    let body = segments.join(", ") + &marker_suffix(&child.note_markers);
    if is_target {
        format!("→ {body}")
    } else {
        body
    }
}

/// The enhanced child line: `"<name>, <birth> - <death>, m. <spouse>
/// <marriage>"`, using dates sourced from the child's own as-parent
/// family per spec §4.9's enhancement rules. Returns the line plus which
/// fields were actually enhanced, for the "Additional information:" footer.
pub(crate) struct EnhancedChildLine {
    pub line: String,
    pub death_enhanced: bool,
    pub marriage_enhanced: bool,
}

pub(crate) fn child_line_enhanced(
    child: &Person,
    spouse_name: &str,
    as_parent_death_date: Option<&str>,
    as_parent_person_marriage: (Option<&str>, Option<&str>),
    as_parent_couple_marriage: (Option<&str>, Option<&str>),
    is_target: bool,
) -> EnhancedChildLine {
    let birth_year = sukuverkko_dates::year_of(&sukuverkko_dates::parse(child.birth_date.as_deref().unwrap_or("")), None);

    let death_enhanced = child.death_date.is_none() && as_parent_death_date.is_some();
    let death_date = child
        .death_date
        .as_deref()
        .or(as_parent_death_date)
        .map(|d| sukuverkko_dates::format_str(d, birth_year));

    let (marriage, marriage_enhanced) = resolve_marriage(
        as_parent_person_marriage,
        as_parent_couple_marriage,
        (child.full_marriage_date.as_deref(), child.marriage_date.as_deref()),
        birth_year,
    );

    let birth = child.birth_date.as_deref().map(|d| sukuverkko_dates::format_str(d, None));
    let mut segments = vec![child.display_name()];
    match (birth, death_date) {
        (Some(b), Some(d)) => segments.push(format!("{b} - {d}")),
        (Some(b), None) => segments.push(format!("b. {b}")),
        (None, Some(d)) => segments.push(format!("d. {d}")),
        (None, None) => {}
    }
    match marriage {
        Some(m) => segments.push(format!("m. {spouse_name} {m}")),
        None => segments.push(format!("m. {spouse_name}")),
    }

    let line = segments.join(", ");
    EnhancedChildLine {
        line: if is_target { format!("→ {line}") } else { line },
        death_enhanced,
        marriage_enhanced,
    }
}

/// First non-null of: as-parent person full/2-digit marriage date,
/// as-parent couple full/2-digit marriage date, nuclear date.
fn resolve_marriage(
    person_marriage: (Option<&str>, Option<&str>),
    couple_marriage: (Option<&str>, Option<&str>),
    nuclear_marriage: (Option<&str>, Option<&str>),
    contextual_birth_year: Option<i32>,
) -> (Option<String>, bool) {
    if let Some(m) = marriage_string(person_marriage.0, person_marriage.1, contextual_birth_year) {
        return (Some(m), true);
    }
    if let Some(m) = marriage_string(couple_marriage.0, couple_marriage.1, contextual_birth_year) {
        return (Some(m), true);
    }
    (marriage_string(nuclear_marriage.0, nuclear_marriage.1, contextual_birth_year), false)
}

fn marriage_string(full: Option<&str>, short: Option<&str>, contextual_birth_year: Option<i32>) -> Option<String> {
    if let Some(full) = full {
        return Some(sukuverkko_dates::format_str(full, contextual_birth_year));
    }
    short.and_then(|s| sukuverkko_dates::extract_marriage_year(s, contextual_birth_year))
}

fn marker_suffix(markers: &[String]) -> String {
    if markers.is_empty() {
        String::new()
    } else {
        format!(" {}", markers.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukuverkko_core::types::Person;

    #[test]
    fn parent_line_with_both_dates() {
        let p = Person {
            name: "Matti".to_string(),
            birth_date: Some("05.11.1730".to_string()),
            death_date: Some("1790".to_string()),
            ..Person::unknown_placeholder()
        };
        assert_eq!(parent_line(&p, false, None), "Matti, 5 November 1730 - 1790");
    }

    #[test]
    fn parent_line_birth_only() {
        let p = Person {
            name: "Matti".to_string(),
            birth_date: Some("1730".to_string()),
            ..Person::unknown_placeholder()
        };
        assert_eq!(parent_line(&p, false, None), "Matti, b. 1730");
    }

    #[test]
    fn target_indicator_is_prepended() {
        let p = Person {
            name: "Matti".to_string(),
            ..Person::unknown_placeholder()
        };
        assert_eq!(parent_line(&p, true, None), "→ Matti");
    }

    #[test]
    fn child_line_baseline_derives_marriage_year_from_context() {
        let child = Person {
            name: "Liisa".to_string(),
            birth_date: Some("1760".to_string()),
            marriage_date: Some("78".to_string()),
            spouse: Some("Antti Korvela".to_string()),
            ..Person::unknown_placeholder()
        };
        let line = child_line_baseline(&child, false);
        assert!(line.contains("m. Antti Korvela 1778"), "line was: {line}");
    }
}
