//! The widow annotation and the general "Note:" block (spec §4.9).

/// Finds the `i`-th note (0-based, among notes containing the token
/// `leski` case-insensitively) and splits it at `" leski"`, returning the
/// antecedent spouse's name (the text before that token).
pub(crate) fn widow_antecedent(notes: &[String], index: usize) -> Option<String> {
    notes
        .iter()
        .filter(|n| n.to_lowercase().contains("leski"))
        .nth(index)
        .and_then(|note| {
            let lower = note.to_lowercase();
            lower.find(" leski").map(|pos| note[..pos].trim().to_string())
        })
}

/// Notes with the widow-annotation notes filtered out, in original order.
pub(crate) fn general_notes(notes: &[String]) -> Vec<&str> {
    notes
        .iter()
        .filter(|n| !n.to_lowercase().contains("leski"))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widow_antecedent_splits_at_leski_token() {
        let notes = vec!["Maria Matint. leski 1782 lähtien.".to_string()];
        assert_eq!(widow_antecedent(&notes, 0).as_deref(), Some("Maria Matint."));
    }

    #[test]
    fn general_notes_excludes_widow_notes() {
        let notes = vec![
            "Maria Matint. leski 1782 lähtien.".to_string(),
            "Perhe muutti Ouluun 1790.".to_string(),
        ];
        let general = general_notes(&notes);
        assert_eq!(general, vec!["Perhe muutti Ouluun 1790."]);
    }
}
