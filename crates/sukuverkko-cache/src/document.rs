//! On-disk cache document: `{ schemaVersion, families }`, written
//! atomically (temp file + rename) and schema-migrated on load.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sukuverkko_core::SukuverkkoError;

use crate::CachedFamily;

const CURRENT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CacheDocument {
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    pub families: BTreeMap<String, CachedFamily>,
}

impl CacheDocument {
    /// Loads the document at `path`. A missing file yields an empty
    /// document (first run, not an error). A document whose
    /// `schemaVersion` doesn't match the current one is discarded and
    /// rebuilt from empty, except a document with no `schemaVersion` key
    /// at all, which is treated as version 1 and migrated in place (the
    /// family records themselves need no field changes between v1 and v2).
    pub fn load(path: &Path) -> Result<Self, SukuverkkoError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    schema_version: CURRENT_SCHEMA_VERSION,
                    families: BTreeMap::new(),
                })
            }
            Err(e) => {
                return Err(SukuverkkoError::CachePersistenceWarning(format!(
                    "{}: {e}",
                    path.display()
                )))
            }
        };

        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            SukuverkkoError::CachePersistenceWarning(format!("malformed cache document: {e}"))
        })?;

        let schema_version = value.get("schemaVersion").and_then(serde_json::Value::as_u64);

        match schema_version {
            None => {
                tracing::info!("cache document has no schemaVersion, migrating from v1");
                let families: BTreeMap<String, CachedFamily> = value
                    .get("families")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|e| {
                        SukuverkkoError::CachePersistenceWarning(format!("cannot migrate v1 document: {e}"))
                    })?
                    .unwrap_or_default();
                Ok(Self {
                    schema_version: CURRENT_SCHEMA_VERSION,
                    families,
                })
            }
            Some(v) if v as u32 == CURRENT_SCHEMA_VERSION => {
                serde_json::from_value(value).map_err(|e| {
                    SukuverkkoError::CachePersistenceWarning(format!("malformed cache document: {e}"))
                })
            }
            Some(v) => {
                tracing::warn!(found = v, expected = CURRENT_SCHEMA_VERSION, "cache schema mismatch, discarding");
                Ok(Self {
                    schema_version: CURRENT_SCHEMA_VERSION,
                    families: BTreeMap::new(),
                })
            }
        }
    }

    /// Atomically persists `families` to `path`: writes to a sibling temp
    /// file, then renames over the destination.
    pub fn save(path: &Path, families: BTreeMap<String, CachedFamily>) -> Result<(), SukuverkkoError> {
        let document = Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            families,
        };
        let json = serde_json::to_string_pretty(&document).map_err(|e| {
            SukuverkkoError::CachePersistenceWarning(format!("cannot serialize cache document: {e}"))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SukuverkkoError::CachePersistenceWarning(format!("{}: {e}", parent.display()))
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| SukuverkkoError::CachePersistenceWarning(format!("{}: {e}", tmp_path.display())))?;
        std::fs::rename(&tmp_path, path)
            .map_err(|e| SukuverkkoError::CachePersistenceWarning(format!("{}: {e}", path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sukuverkko_core::types::{Couple, Family, Person};
    use sukuverkko_core::{FamilyId, FamilyNetwork};

    fn sample_family() -> CachedFamily {
        let family = Family {
            family_id: FamilyId::new("KORPI 6"),
            page_references: vec!["120".to_string()],
            couples: vec![Couple {
                husband: Person {
                    name: "Matti".to_string(),
                    ..Person::unknown_placeholder()
                },
                wife: Person::unknown_placeholder(),
                marriage_date: None,
                full_marriage_date: None,
                children: vec![],
                children_died_infancy: None,
                couple_notes: vec![],
            }],
            notes: vec![],
            note_definitions: Default::default(),
        };
        CachedFamily {
            network: FamilyNetwork::new(family),
            cached_at: Utc::now(),
            extraction_time_seconds: 1.5,
        }
    }

    #[test]
    fn missing_file_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("families.json");
        let doc = CacheDocument::load(&path).unwrap();
        assert!(doc.families.is_empty());
        assert_eq!(doc.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("families.json");
        let mut families = BTreeMap::new();
        families.insert("KORPI 6".to_string(), sample_family());
        CacheDocument::save(&path, families).unwrap();

        let loaded = CacheDocument::load(&path).unwrap();
        assert_eq!(loaded.families.len(), 1);
        assert!(loaded.families.contains_key("KORPI 6"));
    }

    #[test]
    fn document_missing_schema_version_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("families.json");
        std::fs::write(&path, r#"{"families": {}}"#).unwrap();
        let doc = CacheDocument::load(&path).unwrap();
        assert_eq!(doc.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn document_with_mismatched_schema_version_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("families.json");
        let mut families = BTreeMap::new();
        families.insert("KORPI 6".to_string(), sample_family());
        let stale = CacheDocument {
            schema_version: 999,
            families,
        };
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let doc = CacheDocument::load(&path).unwrap();
        assert!(doc.families.is_empty());
    }
}
