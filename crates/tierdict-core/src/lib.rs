//! Leveled word lists from a frequency-ranked vocabulary table.
//!
//! [`DictionaryTieringJob`] reads the source CSV, fills the tiers of a
//! [`TierConfig`] plan, writes each tier as NDJSON and records entry
//! counts and SHA-256 hashes in the package manifest.
//! [`verify_manifest`] checks the published files against the manifest.

pub mod config;
pub mod digest;
pub mod error;
pub mod job;
pub mod manifest;
pub mod ndjson;
pub mod source;
pub mod tiering;
pub mod verify;

// Convenience re-exports
pub use config::{Selection, TierConfig, TierSpec};
pub use error::{TierError, TierResult};
pub use job::{DictionaryTieringJob, JobPaths, JobSummary, TierSummary};
pub use manifest::{ManifestPackage, PackageManifest, PackageUpdate};
pub use source::{load_records, read_records, WordRecord};
pub use tiering::{build_tiers, SeenWords, Tier, TierEntry};
pub use verify::{verify_manifest, PackageCheck, PackageStatus, VerifyReport};
