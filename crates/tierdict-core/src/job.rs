//! The dictionary tiering job: source table in, tier files and manifest out.
//!
//! Steps run strictly in order: read table, fill tiers, write every tier
//! file, hash the written files, rewrite the manifest. A failure aborts the
//! run; files written before the failure stay on disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::TierConfig;
use crate::digest::sha256_file;
use crate::error::{TierError, TierResult};
use crate::manifest::{PackageManifest, PackageUpdate};
use crate::ndjson::write_entries;
use crate::source::{load_records, WordRecord};
use crate::tiering::{build_tiers, Tier};

pub const DEFAULT_INPUT: &str = "ecdict_temp.csv";
pub const DEFAULT_MANIFEST: &str = "packages.json";

/// Where the job reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub input: PathBuf,
    pub manifest: PathBuf,
    /// Directory receiving the tier files.
    pub out_dir: PathBuf,
}

impl Default for JobPaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            out_dir: PathBuf::from("."),
        }
    }
}

/// Outcome for one written tier file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSummary {
    pub id: String,
    pub file_name: String,
    pub path: PathBuf,
    pub entries: usize,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub tiers: Vec<TierSummary>,
    /// Manifest packages that received new metadata.
    pub updated_packages: Vec<String>,
    pub manifest: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DictionaryTieringJob {
    config: TierConfig,
    paths: JobPaths,
}

impl DictionaryTieringJob {
    pub fn new(config: TierConfig, paths: JobPaths) -> TierResult<Self> {
        config.validate()?;
        Ok(Self { config, paths })
    }

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    pub fn paths(&self) -> &JobPaths {
        &self.paths
    }

    /// Read the source table from disk and run.
    pub fn run(&self) -> TierResult<JobSummary> {
        let records = load_records(&self.paths.input)?;
        info!(
            input = %self.paths.input.display(),
            rows = records.len(),
            "loaded source table"
        );
        self.run_with_records(&records)
    }

    /// Run on rows already in memory.
    pub fn run_with_records(&self, records: &[WordRecord]) -> TierResult<JobSummary> {
        let tiers = build_tiers(records, &self.config);

        let mut written = Vec::with_capacity(tiers.len());
        for tier in &tiers {
            written.push(self.write_tier(tier)?);
        }

        let mut summaries = Vec::with_capacity(written.len());
        for (tier, path) in tiers.iter().zip(written) {
            let hash = sha256_file(&path)?;
            summaries.push(TierSummary {
                id: tier.spec.id.clone(),
                file_name: tier.file_name(),
                path,
                entries: tier.len(),
                hash,
            });
        }

        let published_at = self.config.published_at_string();
        let updates: Vec<PackageUpdate> = summaries
            .iter()
            .map(|s| PackageUpdate {
                id: s.id.clone(),
                entries: s.entries,
                hash: s.hash.clone(),
                published_at: published_at.clone(),
            })
            .collect();

        let mut manifest = PackageManifest::load(&self.paths.manifest)?;
        let updated_packages = manifest.apply_updates(&updates);
        manifest.save(&self.paths.manifest)?;

        Ok(JobSummary {
            tiers: summaries,
            updated_packages,
            manifest: self.paths.manifest.clone(),
        })
    }

    fn write_tier(&self, tier: &Tier) -> TierResult<PathBuf> {
        let path = self.paths.out_dir.join(tier.file_name());
        write_tier_file(&path, tier)?;
        info!(path = %path.display(), entries = tier.len(), "wrote tier file");
        Ok(path)
    }
}

fn write_tier_file(path: &Path, tier: &Tier) -> TierResult<()> {
    let file = File::create(path).map_err(|e| TierError::io(path, e))?;
    write_entries(BufWriter::new(file), &tier.entries).map_err(|e| TierError::io(path, e))
}
