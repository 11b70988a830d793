//! Canonical family identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized family identifier of the form `<CLAN> [<ROMAN>] <SUFFIX>`,
/// e.g. `"KORPI 6"` or `"SIKALA II 12A"`.
///
/// Normalization is uppercase, trimmed, with internal whitespace runs
/// collapsed to a single space. It is idempotent:
/// `FamilyId::normalize(FamilyId::normalize(s)) == FamilyId::normalize(s)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(String);

impl FamilyId {
    /// Construct a `FamilyId` from a raw, possibly unnormalized string.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(Self::normalize(raw.as_ref()))
    }

    /// Normalize a raw family identifier string without constructing a
    /// `FamilyId`. Exposed so callers that only need the canonical string
    /// (e.g. cache keys) don't have to round-trip through the newtype.
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();
        let mut out = String::with_capacity(trimmed.len());
        let mut last_was_space = false;
        for ch in trimmed.chars() {
            if ch.is_whitespace() {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            } else {
                out.extend(ch.to_uppercase());
                last_was_space = false;
            }
        }
        out
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip surrounding `{}` and whitespace from a cross-reference string
    /// before normalizing it into a `FamilyId`. Any reference string in the
    /// source may arrive wrapped in braces.
    pub fn from_reference(raw: &str) -> Self {
        let stripped = raw.trim().trim_start_matches('{').trim_end_matches('}').trim();
        Self::new(stripped)
    }

    /// The clan component: the first whitespace-delimited token,
    /// capitalized first-letter/lowercase-rest. Splits on whitespace and
    /// takes the first token, so family IDs beginning with a prepositional
    /// prefix are mis-surnamed — the source data accepts this and this
    /// implementation preserves that behavior rather than correcting it.
    pub fn surname(&self) -> String {
        let first = self.0.split(' ').next().unwrap_or("");
        let mut chars = first.chars();
        match chars.next() {
            Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            None => String::new(),
        }
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FamilyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FamilyId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
