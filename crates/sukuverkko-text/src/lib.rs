//! Source-file loading and family-record segmentation.
//!
//! Given a normalized family id, returns the exact substring of the source
//! file containing that family's record: header through the blank line
//! preceding the next family header (or end-of-file for the last record).

use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use sukuverkko_core::{FamilyId, SukuverkkoError};

/// Matches a family-record header line: a non-comma run ending in a digit
/// suffix (optionally letter-qualified), followed by a comma and page
/// references. Anchored to the start of a line.
fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^([^\n,]{2,60}?\s\d+[A-Za-z]?)[ \t]*,").expect("valid header regex")
    })
}

/// A loaded source compendium, indexed by family header for O(1)-ish
/// segmentation and file-order iteration.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    /// (id, byte offset of the header line's start), in file order.
    headers: Vec<(FamilyId, usize)>,
    ids: Vec<FamilyId>,
}

impl SourceText {
    /// Load and index a source file. Line endings are normalized to `\n`
    /// internally; segment boundaries are computed against the normalized
    /// text.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SukuverkkoError> {
        let path_ref = path.as_ref();
        let raw = std::fs::read_to_string(path_ref).map_err(|e| {
            SukuverkkoError::SourceUnavailable(format!("{}: {e}", path_ref.display()))
        })?;
        let text = raw.replace("\r\n", "\n");
        let source = Self::from_string(text);
        info!(
            path = %path_ref.display(),
            bytes = source.text.len(),
            families = source.ids.len(),
            "loaded source compendium"
        );
        Ok(source)
    }

    /// Build a `SourceText` directly from an in-memory string (used by
    /// tests and by callers that already have the compendium in memory).
    pub fn from_string(text: String) -> Self {
        let mut headers = Vec::new();
        for caps in header_pattern().captures_iter(&text) {
            let whole = caps.get(0).expect("capture group 0 always present");
            let id_raw = caps.get(1).expect("capture group 1 always present").as_str();
            headers.push((FamilyId::new(id_raw), whole.start()));
        }
        headers.sort_by_key(|(_, offset)| *offset);
        let ids = headers.iter().map(|(id, _)| id.clone()).collect();
        Self { text, headers, ids }
    }

    /// The exact substring containing `family_id`'s record, or `None` if
    /// no header for it was found.
    pub fn segment(&self, family_id: &FamilyId) -> Option<&str> {
        let index = self.headers.iter().position(|(id, _)| id == family_id)?;
        let start = self.headers[index].1;
        let end = self
            .headers
            .get(index + 1)
            .map(|(_, offset)| *offset)
            .unwrap_or(self.text.len());
        Some(&self.text[start..end])
    }

    /// All family ids in file order.
    pub fn all_family_ids(&self) -> &[FamilyId] {
        &self.ids
    }

    /// The next family id in file order after `after`, or `None` if
    /// `after` is the last family or is not present.
    pub fn next_family_id(&self, after: &FamilyId) -> Option<&FamilyId> {
        let index = self.ids.iter().position(|id| id == after)?;
        self.ids.get(index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
KORPI 6, p. 120\nMatti Korpi, b. 05.11.1730\nMaria Korpenoja, b. 12.03.1735\n\nKORPI 7, p. 121\nAntti Korpi, b. 1700\n\nSIKALA II 12A, p. 200\nHeikki Sikala, b. 1690\n";

    #[test]
    fn segments_each_family_up_to_next_header() {
        let source = SourceText::from_string(SAMPLE.to_string());
        let korpi6 = source.segment(&FamilyId::new("KORPI 6")).unwrap();
        assert!(korpi6.starts_with("KORPI 6, p. 120"));
        assert!(korpi6.contains("Maria Korpenoja"));
        assert!(!korpi6.contains("KORPI 7"));
    }

    #[test]
    fn last_family_runs_to_end_of_file() {
        let source = SourceText::from_string(SAMPLE.to_string());
        let last = source.segment(&FamilyId::new("SIKALA II 12A")).unwrap();
        assert!(last.contains("Heikki Sikala"));
    }

    #[test]
    fn unknown_family_returns_none() {
        let source = SourceText::from_string(SAMPLE.to_string());
        assert!(source.segment(&FamilyId::new("NOPE 1")).is_none());
    }

    #[test]
    fn all_family_ids_preserves_file_order() {
        let source = SourceText::from_string(SAMPLE.to_string());
        let ids: Vec<String> = source
            .all_family_ids()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["KORPI 6", "KORPI 7", "SIKALA II 12A"]);
    }

    #[test]
    fn next_family_id_walks_file_order() {
        let source = SourceText::from_string(SAMPLE.to_string());
        let next = source.next_family_id(&FamilyId::new("KORPI 6")).unwrap();
        assert_eq!(next.as_str(), "KORPI 7");
        assert!(source.next_family_id(&FamilyId::new("SIKALA II 12A")).is_none());
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let source = SourceText::from_string(crlf.replace("\r\n", "\n"));
        assert!(source.segment(&FamilyId::new("KORPI 7")).is_some());
    }

    #[test]
    fn load_missing_file_reports_source_unavailable() {
        let err = SourceText::load("/nonexistent/path/does-not-exist.txt").unwrap_err();
        assert!(matches!(err, SukuverkkoError::SourceUnavailable(_)));
    }
}
