//! Response normalization and schema validation (spec §4.4).
//!
//! Applied in order:
//! 1. Strip surrounding fenced-code markers; trim to the first `{` and last `}`.
//! 2. Decode as a generic key/value document.
//! 3. Enforce schema (couples array; husband/wife objects; a name per person).
//! 4. Normalize spouse strings (strip leading marriage-number prefixes).
//! 5. Normalize note markers (strip trailing `)`; asterisks only).
//! 6. Preserve the approximate-date prefix `n ` exactly.
//! 7. Reject (not coerce) a null `husband`/`wife`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use sukuverkko_core::types::{Couple, Family, Person};
use sukuverkko_core::{FamilyId, SukuverkkoError};

/// Normalize and validate a raw extractor response into a `Family` whose
/// `family_id` equals `family_id` (the normalized input identifier — never
/// whatever the response itself claims).
pub fn normalize_response(family_id: &FamilyId, raw: &str) -> Result<Family, SukuverkkoError> {
    let json_slice = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(json_slice)
        .map_err(|e| SukuverkkoError::ExtractionFailed(format!("invalid JSON: {e}")))?;
    let root = value
        .as_object()
        .ok_or_else(|| SukuverkkoError::SchemaInvalid("top-level document is not an object".into()))?;

    let couples_value = root
        .get("couples")
        .ok_or_else(|| SukuverkkoError::SchemaInvalid("missing `couples`".into()))?;
    let couples_array = couples_value
        .as_array()
        .ok_or_else(|| SukuverkkoError::SchemaInvalid("`couples` must be an array".into()))?;
    if couples_array.is_empty() {
        return Err(SukuverkkoError::SchemaInvalid("`couples` must not be empty".into()));
    }

    let couples = couples_array
        .iter()
        .map(parse_couple)
        .collect::<Result<Vec<_>, _>>()?;

    let page_references = opt_str_array(root, "pageReferences");
    let notes = opt_str_array(root, "notes");
    let note_definitions = parse_note_definitions(root)?;

    Ok(Family {
        family_id: family_id.clone(),
        page_references,
        couples,
        notes,
        note_definitions,
    })
}

/// Step 1: strip fenced-code markers and trim to the outermost `{...}`.
fn extract_json_object(raw: &str) -> Result<&str, SukuverkkoError> {
    let trimmed = raw.trim();
    let unfenced = if let Some(after_open) = trimmed.strip_prefix("```") {
        let after_lang = after_open
            .strip_prefix("json")
            .unwrap_or(after_open)
            .trim_start_matches('\n');
        match after_lang.rfind("```") {
            Some(idx) => &after_lang[..idx],
            None => after_lang,
        }
    } else {
        trimmed
    };

    let start = unfenced
        .find('{')
        .ok_or_else(|| SukuverkkoError::ExtractionFailed("no JSON object found in response".into()))?;
    let end = unfenced
        .rfind('}')
        .ok_or_else(|| SukuverkkoError::ExtractionFailed("no JSON object found in response".into()))?;
    if end < start {
        return Err(SukuverkkoError::ExtractionFailed("malformed braces in response".into()));
    }
    Ok(&unfenced[start..=end])
}

fn parse_couple(value: &Value) -> Result<Couple, SukuverkkoError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SukuverkkoError::SchemaInvalid("couple is not an object".into()))?;

    let husband_value = require_person_field(obj, "husband")?;
    let wife_value = require_person_field(obj, "wife")?;
    let husband = parse_person(husband_value, true)?;
    let wife = parse_person(wife_value, true)?;

    let children = obj
        .get("children")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(|v| parse_person(v, false)).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    Ok(Couple {
        husband,
        wife,
        marriage_date: opt_str(obj, "marriageDate"),
        full_marriage_date: opt_str(obj, "fullMarriageDate"),
        children,
        children_died_infancy: obj.get("childrenDiedInfancy").and_then(Value::as_u64).map(|n| n as u32),
        couple_notes: opt_str_array(obj, "coupleNotes"),
    })
}

/// Step 7: a couple must carry a `husband`/`wife` key, and the value must
/// not be explicit JSON `null` — both are schema violations, not silently
/// coerced into a placeholder.
fn require_person_field<'a>(couple: &'a Map<String, Value>, key: &str) -> Result<&'a Value, SukuverkkoError> {
    match couple.get(key) {
        None => Err(SukuverkkoError::SchemaInvalid(format!("couple missing `{key}`"))),
        Some(Value::Null) => Err(SukuverkkoError::SchemaInvalid(format!("couple.{key} is null"))),
        Some(v) => Ok(v),
    }
}

/// Step 3/4/5/6: parse one person object. `allow_unknown_placeholder`
/// permits a missing/null `name` to default to `"Unknown"` only for
/// husband/wife slots — never for children.
fn parse_person(value: &Value, allow_unknown_placeholder: bool) -> Result<Person, SukuverkkoError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SukuverkkoError::SchemaInvalid("person is not an object".into()))?;

    let name = match obj.get("name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | None if allow_unknown_placeholder => "Unknown".to_string(),
        _ => return Err(SukuverkkoError::SchemaInvalid("person missing `name`".into())),
    };

    let spouse = opt_str(obj, "spouse").map(|s| normalize_spouse(&s));
    let note_markers = obj
        .get("noteMarkers")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(normalize_marker)
                .filter(|m| !m.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Person {
        name,
        patronymic: opt_str(obj, "patronymic"),
        birth_date: opt_str(obj, "birthDate"),
        death_date: opt_str(obj, "deathDate"),
        marriage_date: opt_str(obj, "marriageDate"),
        full_marriage_date: opt_str(obj, "fullMarriageDate"),
        spouse,
        as_child: opt_str(obj, "asChild").map(|s| FamilyId::from_reference(&s)),
        as_parent: opt_str(obj, "asParent").map(|s| FamilyId::from_reference(&s)),
        external_id: opt_str(obj, "externalId"),
        note_markers,
    })
}

/// Step 4: strip a leading marriage-number prefix like `"2. "` from a
/// spouse string as literally written in the record.
fn normalize_spouse(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(0);
    if digits_end > 0 {
        let rest = &trimmed[digits_end..];
        if let Some(after_dot) = rest.strip_prefix('.') {
            let after_space = after_dot.trim_start_matches(' ');
            if after_space.len() < after_dot.len() || after_dot.starts_with(' ') {
                return after_space.to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Step 5: a marker token is stored as asterisks only — any trailing `)`
/// or other surrounding punctuation is dropped.
fn normalize_marker(raw: &str) -> String {
    raw.chars().filter(|c| *c == '*').collect()
}

fn parse_note_definitions(root: &Map<String, Value>) -> Result<BTreeMap<String, String>, SukuverkkoError> {
    let mut out = BTreeMap::new();
    if let Some(defs) = root.get("noteDefinitions") {
        let obj = defs
            .as_object()
            .ok_or_else(|| SukuverkkoError::SchemaInvalid("`noteDefinitions` must be an object".into()))?;
        for (marker, definition) in obj {
            let def_str = definition
                .as_str()
                .ok_or_else(|| SukuverkkoError::SchemaInvalid("note definition value must be a string".into()))?;
            let key = normalize_marker(marker);
            if !key.is_empty() {
                out.insert(key, def_str.to_string());
            }
        }
    }
    Ok(out)
}

fn opt_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn opt_str_array(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}
