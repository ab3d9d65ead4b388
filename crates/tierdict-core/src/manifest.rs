//! Package manifest (`packages.json`).
//!
//! The manifest is held as a JSON document so fields this crate does not
//! know about survive a rewrite untouched and in their original order.
//! Only `entries`, `hash` and `publishedAt` of packages matching a
//! produced tier are ever modified.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{TierError, TierResult};

const PACKAGES_KEY: &str = "packages";

/// Typed, read-only view of one package entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPackage {
    pub id: Option<String>,
    /// Location the importer fetches the package from.
    pub path: Option<String>,
    pub entries: Option<u64>,
    pub hash: Option<String>,
    pub published_at: Option<String>,
}

impl ManifestPackage {
    fn from_value(value: &Value) -> Self {
        let str_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: str_field("id"),
            path: str_field("path"),
            entries: value.get("entries").and_then(Value::as_u64),
            hash: str_field("hash"),
            published_at: str_field("publishedAt"),
        }
    }
}

/// New metadata for the package with id `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUpdate {
    pub id: String,
    pub entries: usize,
    pub hash: String,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    document: Value,
    origin: PathBuf,
}

impl PackageManifest {
    /// Parse a manifest. `origin` only labels errors.
    pub fn from_slice(bytes: &[u8], origin: impl Into<PathBuf>) -> TierResult<Self> {
        let origin = origin.into();
        let document: Value = serde_json::from_slice(bytes).map_err(|e| TierError::Manifest {
            path: origin.clone(),
            message: e.to_string(),
        })?;

        let has_packages = document
            .get(PACKAGES_KEY)
            .map(Value::is_array)
            .unwrap_or(false);
        if !has_packages {
            return Err(TierError::Manifest {
                path: origin,
                message: "missing 'packages' array".into(),
            });
        }

        Ok(Self { document, origin })
    }

    pub fn load(path: impl AsRef<Path>) -> TierResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| TierError::io(path, e))?;
        Self::from_slice(&bytes, path)
    }

    /// Overwrite `path` with the pretty-printed document.
    pub fn save(&self, path: impl AsRef<Path>) -> TierResult<()> {
        let path = path.as_ref();
        let bytes = self.to_pretty_bytes()?;
        std::fs::write(path, bytes).map_err(|e| TierError::io(path, e))?;
        info!(path = %path.display(), "saved manifest");
        Ok(())
    }

    /// Two-space indented JSON, non-ASCII written literally.
    pub fn to_pretty_bytes(&self) -> TierResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.document)?)
    }

    pub fn packages(&self) -> Vec<ManifestPackage> {
        self.package_values()
            .map(|values| values.iter().map(ManifestPackage::from_value).collect())
            .unwrap_or_default()
    }

    fn package_values(&self) -> Option<&Vec<Value>> {
        self.document.get(PACKAGES_KEY).and_then(Value::as_array)
    }

    fn package_objects_mut(&mut self) -> impl Iterator<Item = &mut Map<String, Value>> {
        self.document
            .get_mut(PACKAGES_KEY)
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object_mut)
    }

    /// Apply updates to every package whose id matches one of them.
    ///
    /// Returns the ids of the packages that were changed, in manifest order.
    /// Updates with no matching package are ignored.
    pub fn apply_updates(&mut self, updates: &[PackageUpdate]) -> Vec<String> {
        let origin = self.origin.clone();
        let mut applied = Vec::new();

        for package in self.package_objects_mut() {
            let Some(id) = package.get("id").and_then(Value::as_str).map(str::to_string) else {
                warn!(manifest = %origin.display(), "package without string id left unchanged");
                continue;
            };

            let Some(update) = updates.iter().find(|u| u.id == id) else {
                debug!(package = %id, "no tier produced for package");
                continue;
            };

            package.insert("entries".into(), Value::from(update.entries));
            package.insert("hash".into(), Value::from(update.hash.clone()));
            package.insert("publishedAt".into(), Value::from(update.published_at.clone()));

            info!(
                package = %id,
                entries = update.entries,
                hash = %update.hash,
                "updated manifest package"
            );
            applied.push(id);
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "version": 2,
  "packages": [
    {
      "id": "core-3000",
      "level": 3000,
      "path": "assets/dictionary/core-3000.jsonl",
      "entries": 0,
      "hash": "",
      "publishedAt": "2025-12-01"
    },
    {
      "id": "phrases",
      "title": "常用短语",
      "entries": 12,
      "hash": "abc",
      "publishedAt": "2025-01-01"
    }
  ]
}"#;

    fn update(id: &str, entries: usize) -> PackageUpdate {
        PackageUpdate {
            id: id.into(),
            entries,
            hash: "f00d".into(),
            published_at: "2026-01-08".into(),
        }
    }

    #[test]
    fn updates_only_matching_packages() {
        let mut manifest = PackageManifest::from_slice(MANIFEST.as_bytes(), "packages.json").unwrap();
        let applied = manifest.apply_updates(&[update("core-3000", 3), update("plus-5000", 9)]);
        assert_eq!(applied, vec!["core-3000"]);

        let packages = manifest.packages();
        assert_eq!(packages[0].entries, Some(3));
        assert_eq!(packages[0].hash.as_deref(), Some("f00d"));
        assert_eq!(packages[0].published_at.as_deref(), Some("2026-01-08"));
        assert_eq!(packages[0].path.as_deref(), Some("assets/dictionary/core-3000.jsonl"));
        assert_eq!(packages[1].entries, Some(12));
        assert_eq!(packages[1].path, None);
        assert_eq!(packages[1].hash.as_deref(), Some("abc"));
    }

    #[test]
    fn untouched_manifest_round_trips_byte_for_byte() {
        let manifest = PackageManifest::from_slice(MANIFEST.as_bytes(), "packages.json").unwrap();
        let bytes = manifest.to_pretty_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), MANIFEST);
    }

    #[test]
    fn numbers_outside_u64_survive_a_rewrite() {
        let raw = r#"{
  "packages": [
    {
      "id": "core-3000",
      "entries": 0,
      "size": 123456789012345678901234567890,
      "ratio": 0.10000000000000000001,
      "weight": 1.0
    }
  ]
}"#;
        let mut manifest = PackageManifest::from_slice(raw.as_bytes(), "m.json").unwrap();
        let text = String::from_utf8(manifest.to_pretty_bytes().unwrap()).unwrap();
        assert_eq!(text, raw);

        manifest.apply_updates(&[update("core-3000", 2)]);
        let text = String::from_utf8(manifest.to_pretty_bytes().unwrap()).unwrap();
        assert!(text.contains("\"size\": 123456789012345678901234567890"), "{}", text);
        assert!(text.contains("\"ratio\": 0.10000000000000000001"), "{}", text);
        assert!(text.contains("\"weight\": 1.0"), "{}", text);
        assert_eq!(manifest.packages()[0].entries, Some(2));
    }

    #[test]
    fn preserves_key_order_and_unknown_fields() {
        let mut manifest = PackageManifest::from_slice(MANIFEST.as_bytes(), "packages.json").unwrap();
        manifest.apply_updates(&[update("core-3000", 1)]);
        let text = String::from_utf8(manifest.to_pretty_bytes().unwrap()).unwrap();

        let version = text.find("\"version\"").unwrap();
        let packages = text.find("\"packages\"").unwrap();
        assert!(version < packages);
        let path = text.find("\"path\"").unwrap();
        let entries = text.find("\"entries\": 1").unwrap();
        assert!(path < entries, "entries must stay in place: {}", text);
        assert!(text.contains("常用短语"), "non-ASCII must stay literal");
    }

    #[test]
    fn missing_packages_array_is_an_error() {
        let err = PackageManifest::from_slice(br#"{"pkgs": []}"#, "m.json").unwrap_err();
        assert!(matches!(err, TierError::Manifest { .. }));
        assert!(err.to_string().contains("packages"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = PackageManifest::from_slice(b"{not json", "m.json").unwrap_err();
        assert!(matches!(err, TierError::Manifest { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn packages_without_id_are_skipped() {
        let raw = br#"{"packages": [{"entries": 1}, {"id": "core-3000"}]}"#;
        let mut manifest = PackageManifest::from_slice(raw, "m.json").unwrap();
        let applied = manifest.apply_updates(&[update("core-3000", 5)]);
        assert_eq!(applied, vec!["core-3000"]);
        assert_eq!(manifest.packages()[0], ManifestPackage {
            entries: Some(1),
            ..ManifestPackage::default()
        });
        // absent fields are added
        assert_eq!(manifest.packages()[1].published_at.as_deref(), Some("2026-01-08"));
    }
}
