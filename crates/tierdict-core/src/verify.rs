//! Manifest verification: re-hash tier files and compare with the manifest.
//!
//! This is the check a package importer runs before trusting a tier file,
//! done ahead of publishing. Only packages produced by the tier plan are
//! checked. A package's file is looked up in the output directory by the
//! file name of its `path`, or `<id>.jsonl` when it has none.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{TierConfig, TierSpec};
use crate::digest::sha256_file;
use crate::error::{TierError, TierResult};
use crate::manifest::{ManifestPackage, PackageManifest};
use crate::ndjson::read_entries;

/// Result of checking one manifest package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackageStatus {
    Ok,
    HashMismatch { expected: String, actual: String },
    EntriesMismatch { expected: Option<u64>, actual: u64 },
    /// The tier file does not exist.
    Missing,
    /// A line of the tier file is not a valid entry.
    Malformed { message: String },
    /// Package has no id, or no tier of the plan produces it.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCheck {
    pub id: Option<String>,
    pub file: Option<PathBuf>,
    #[serde(flatten)]
    pub status: PackageStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub packages: Vec<PackageCheck>,
}

impl VerifyReport {
    /// True when no package is mismatched, missing or malformed.
    pub fn is_clean(&self) -> bool {
        self.packages
            .iter()
            .all(|p| matches!(p.status, PackageStatus::Ok | PackageStatus::Skipped))
    }

    pub fn failures(&self) -> impl Iterator<Item = &PackageCheck> {
        self.packages
            .iter()
            .filter(|p| !matches!(p.status, PackageStatus::Ok | PackageStatus::Skipped))
    }
}

/// Verify every package of the manifest at `manifest_path` that `config`
/// produces against the tier files in `out_dir`.
pub fn verify_manifest(
    manifest_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &TierConfig,
) -> TierResult<VerifyReport> {
    let manifest = PackageManifest::load(manifest_path)?;
    verify_packages(&manifest, out_dir.as_ref(), config)
}

pub fn verify_packages(
    manifest: &PackageManifest,
    out_dir: &Path,
    config: &TierConfig,
) -> TierResult<VerifyReport> {
    let mut report = VerifyReport::default();
    for package in manifest.packages() {
        report.packages.push(check_package(&package, out_dir, config)?);
    }
    Ok(report)
}

fn check_package(
    package: &ManifestPackage,
    out_dir: &Path,
    config: &TierConfig,
) -> TierResult<PackageCheck> {
    let skipped = |id: Option<String>| PackageCheck {
        id,
        file: None,
        status: PackageStatus::Skipped,
    };

    let Some(id) = package.id.clone() else {
        return Ok(skipped(None));
    };
    let Some(spec) = config.tiers.iter().find(|t| t.id == id) else {
        debug!(package = %id, "package not produced by the tier plan");
        return Ok(skipped(Some(id)));
    };

    let file = out_dir.join(tier_file_name(package, spec));
    let status = check_file(package, &file)?;
    match &status {
        PackageStatus::Ok => debug!(package = %id, "package verified"),
        other => warn!(package = %id, status = ?other, "package verification failed"),
    }

    Ok(PackageCheck {
        id: Some(id),
        file: Some(file),
        status,
    })
}

/// File name the importer would fetch: the last component of `path`, else
/// the tier's own file name.
fn tier_file_name(package: &ManifestPackage, spec: &TierSpec) -> String {
    package
        .path
        .as_deref()
        .and_then(|p| p.rsplit(|c: char| c == '/' || c == '\\').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| spec.file_name())
}

fn check_file(package: &ManifestPackage, file: &Path) -> TierResult<PackageStatus> {
    if !file.is_file() {
        return Ok(PackageStatus::Missing);
    }

    let actual = sha256_file(file)?;
    let expected = package
        .hash
        .as_deref()
        .map(|h| h.trim().to_lowercase())
        .unwrap_or_default();
    if expected != actual {
        return Ok(PackageStatus::HashMismatch { expected, actual });
    }

    let reader = BufReader::new(File::open(file).map_err(|e| TierError::io(file, e))?);
    let entries = match read_entries(reader) {
        Ok(entries) => entries.len() as u64,
        Err(TierError::Json { message }) => return Ok(PackageStatus::Malformed { message }),
        Err(other) => return Err(other),
    };
    if package.entries != Some(entries) {
        return Ok(PackageStatus::EntriesMismatch {
            expected: package.entries,
            actual: entries,
        });
    }

    Ok(PackageStatus::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha256_hex_bytes;

    const LINE: &str = "{\"id\": \"w_a\", \"cn\": \"甲\", \"en\": \"a\", \"level\": 3000}\n";

    fn manifest(packages: &str) -> PackageManifest {
        PackageManifest::from_slice(format!(r#"{{"packages": {}}}"#, packages).as_bytes(), "m.json")
            .unwrap()
    }

    #[test]
    fn clean_when_hash_and_count_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("core-3000.jsonl"), LINE).unwrap();
        let hash = sha256_hex_bytes(LINE.as_bytes());
        let m = manifest(&format!(
            r#"[{{"id": "core-3000", "entries": 1, "hash": "{}"}}, {{"title": "no id"}}]"#,
            hash.to_uppercase()
        ));

        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.packages[0].status, PackageStatus::Ok);
        assert_eq!(report.packages[1].status, PackageStatus::Skipped);
    }

    #[test]
    fn detects_hash_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("core-3000.jsonl"), LINE).unwrap();
        let m = manifest(r#"[{"id": "core-3000", "entries": 1, "hash": "deadbeef"}]"#);

        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert!(!report.is_clean());
        assert!(matches!(
            report.packages[0].status,
            PackageStatus::HashMismatch { ref expected, .. } if expected == "deadbeef"
        ));
    }

    #[test]
    fn detects_entry_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("core-3000.jsonl"), LINE).unwrap();
        let hash = sha256_hex_bytes(LINE.as_bytes());
        let m = manifest(&format!(r#"[{{"id": "core-3000", "entries": 7, "hash": "{}"}}]"#, hash));

        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert_eq!(
            report.packages[0].status,
            PackageStatus::EntriesMismatch {
                expected: Some(7),
                actual: 1
            }
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let m = manifest(r#"[{"id": "plus-2000"}]"#);
        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert_eq!(report.packages[0].status, PackageStatus::Missing);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn malformed_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let body = "not json\n";
        std::fs::write(dir.path().join("plus-5000.jsonl"), body).unwrap();
        let m = manifest(&format!(
            r#"[{{"id": "plus-5000", "entries": 1, "hash": "{}"}}]"#,
            sha256_hex_bytes(body.as_bytes())
        ));
        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert!(matches!(report.packages[0].status, PackageStatus::Malformed { .. }));
    }

    #[test]
    fn packages_outside_the_plan_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let m = manifest(
            r#"[{"id": "idioms", "path": "assets/dictionary/idioms.jsonl", "entries": 42, "hash": "keep-me"}]"#,
        );
        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.packages[0].id.as_deref(), Some("idioms"));
        assert_eq!(report.packages[0].status, PackageStatus::Skipped);
    }

    #[test]
    fn file_is_resolved_from_package_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("core.jsonl"), LINE).unwrap();
        let m = manifest(&format!(
            r#"[{{"id": "core-3000", "path": "assets/dictionary/core.jsonl", "entries": 1, "hash": "{}"}}]"#,
            sha256_hex_bytes(LINE.as_bytes())
        ));

        let report = verify_packages(&m, dir.path(), &TierConfig::default()).unwrap();
        assert_eq!(report.packages[0].status, PackageStatus::Ok);
        assert_eq!(report.packages[0].file, Some(dir.path().join("core.jsonl")));
    }

    #[test]
    fn tier_file_name_falls_back_to_id() {
        let spec = TierSpec::ranked("plus-2000", 5000, 2000);
        let with_path = |path: &str| ManifestPackage {
            path: Some(path.to_string()),
            ..ManifestPackage::default()
        };
        assert_eq!(tier_file_name(&ManifestPackage::default(), &spec), "plus-2000.jsonl");
        assert_eq!(tier_file_name(&with_path("a/b/p2.jsonl"), &spec), "p2.jsonl");
        assert_eq!(tier_file_name(&with_path("a\\p2.jsonl"), &spec), "p2.jsonl");
        assert_eq!(tier_file_name(&with_path("dir/"), &spec), "plus-2000.jsonl");
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let report = VerifyReport {
            packages: vec![PackageCheck {
                id: Some("core-3000".into()),
                file: None,
                status: PackageStatus::Missing,
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["packages"][0]["status"], "missing");
        assert_eq!(json["packages"][0]["id"], "core-3000");
    }
}
