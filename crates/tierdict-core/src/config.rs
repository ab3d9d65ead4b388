//! Tier plan configuration.
//!
//! The built-in plan produces the three published packages:
//!
//! | id          | selection       | capacity  | level |
//! |-------------|-----------------|-----------|-------|
//! | `core-3000` | flag `"1"`      | unbounded | 3000  |
//! | `plus-2000` | ranked by `bnc` | 2000      | 5000  |
//! | `plus-5000` | ranked by `bnc` | 5000      | 10000 |
//!
//! A YAML file may override any of it:
//!
//! ```yaml
//! rank_cutoff: 20000
//! published_at: 2026-01-08
//! tiers:
//!   - id: core-3000
//!     level: 3000
//!     selection: { type: flagged }
//!   - id: plus-2000
//!     level: 5000
//!     selection: { type: ranked, capacity: 2000 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{TierError, TierResult};

/// Highest frequency rank still eligible for a ranked tier.
pub const DEFAULT_RANK_CUTOFF: i64 = 20_000;

/// Flag value marking top-tier membership.
pub const DEFAULT_FLAG_VALUE: &str = "1";

/// File extension of every tier file.
pub const TIER_FILE_EXTENSION: &str = "jsonl";

fn default_rank_cutoff() -> i64 {
    DEFAULT_RANK_CUTOFF
}

fn default_flag_value() -> String {
    DEFAULT_FLAG_VALUE.to_string()
}

fn default_published_at() -> NaiveDate {
    // Fixed release date; the job never reads the clock.
    NaiveDate::from_ymd_opt(2026, 1, 8).unwrap_or_default()
}

fn default_tiers() -> Vec<TierSpec> {
    vec![
        TierSpec::flagged("core-3000", 3000),
        TierSpec::ranked("plus-2000", 5000, 2000),
        TierSpec::ranked("plus-5000", 10000, 5000),
    ]
}

/// Full tier plan for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    /// Ranks in `(0, rank_cutoff]` are candidates for ranked tiers.
    #[serde(default = "default_rank_cutoff")]
    pub rank_cutoff: i64,

    /// Value of the `oxford` column that selects a row for flagged tiers.
    #[serde(default = "default_flag_value")]
    pub flag_value: String,

    /// Date stamped into `publishedAt` of every updated package.
    #[serde(default = "default_published_at")]
    pub published_at: NaiveDate,

    /// Tiers in priority order. Earlier tiers claim words first.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierSpec>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            rank_cutoff: default_rank_cutoff(),
            flag_value: default_flag_value(),
            published_at: default_published_at(),
            tiers: default_tiers(),
        }
    }
}

/// One output tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TierSpec {
    /// Package id; the tier is written to `<id>.jsonl`.
    pub id: String,
    /// Level stamped on every entry.
    pub level: u32,
    pub selection: Selection,
}

/// How a tier picks its rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Selection {
    /// Every row carrying the flag value, in input order.
    Flagged,
    /// The lowest-ranked unclaimed candidates, up to `capacity`.
    Ranked { capacity: usize },
}

impl TierSpec {
    pub fn flagged(id: impl Into<String>, level: u32) -> Self {
        Self {
            id: id.into(),
            level,
            selection: Selection::Flagged,
        }
    }

    pub fn ranked(id: impl Into<String>, level: u32, capacity: usize) -> Self {
        Self {
            id: id.into(),
            level,
            selection: Selection::Ranked { capacity },
        }
    }

    /// File name of this tier inside the output directory.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, TIER_FILE_EXTENSION)
    }
}

impl TierConfig {
    /// Load and validate a YAML tier plan.
    pub fn load(path: impl AsRef<Path>) -> TierResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TierError::io(path, e))?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            TierError::Config { message } => TierError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Parse and validate a YAML tier plan.
    pub fn from_yaml_str(content: &str) -> TierResult<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| TierError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TierResult<()> {
        if self.tiers.is_empty() {
            return Err(TierError::Config {
                message: "at least one tier is required".into(),
            });
        }
        if self.rank_cutoff <= 0 {
            return Err(TierError::Config {
                message: format!("rank_cutoff must be positive, got {}", self.rank_cutoff),
            });
        }

        let mut seen_ids = HashSet::new();
        for tier in &self.tiers {
            if tier.id.trim().is_empty() {
                return Err(TierError::Config {
                    message: "tier id must not be empty".into(),
                });
            }
            if tier.id.contains(['/', '\\']) {
                return Err(TierError::Config {
                    message: format!("tier id '{}' must be a plain file stem", tier.id),
                });
            }
            if !seen_ids.insert(tier.id.as_str()) {
                return Err(TierError::Config {
                    message: format!("duplicate tier id '{}'", tier.id),
                });
            }
        }
        Ok(())
    }

    /// Date string written to `publishedAt`.
    pub fn published_at_string(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_published_packages() {
        let config = TierConfig::default();
        config.validate().unwrap();

        let files: Vec<_> = config.tiers.iter().map(TierSpec::file_name).collect();
        assert_eq!(
            files,
            vec!["core-3000.jsonl", "plus-2000.jsonl", "plus-5000.jsonl"]
        );
        assert_eq!(config.tiers[1].selection, Selection::Ranked { capacity: 2000 });
        assert_eq!(config.tiers[2].level, 10000);
        assert_eq!(config.rank_cutoff, 20_000);
        assert_eq!(config.published_at_string(), "2026-01-08");
    }

    #[test]
    fn yaml_overrides_date_and_keeps_other_defaults() {
        let config = TierConfig::from_yaml_str("published_at: 2026-03-01\n").unwrap();
        assert_eq!(config.published_at_string(), "2026-03-01");
        assert_eq!(config.tiers, TierConfig::default().tiers);
        assert_eq!(config.flag_value, "1");
    }

    #[test]
    fn yaml_tier_list_replaces_defaults() {
        let yaml = r#"
tiers:
  - id: core
    level: 3000
    selection: { type: flagged }
  - id: extra
    level: 5000
    selection: { type: ranked, capacity: 10 }
"#;
        let config = TierConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.tiers.len(), 2);
        assert_eq!(config.tiers[1], TierSpec::ranked("extra", 5000, 10));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = TierConfig::from_yaml_str("rank_limit: 5\n").unwrap_err();
        assert!(matches!(err, TierError::Config { .. }));
        assert!(err.to_string().contains("unknown field"), "{}", err);
    }

    #[test]
    fn rejects_duplicate_tier_ids() {
        let config = TierConfig {
            tiers: vec![
                TierSpec::flagged("core", 3000),
                TierSpec::ranked("core", 5000, 1),
            ],
            ..TierConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate tier id 'core'"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_empty_plan_and_bad_cutoff() {
        let empty = TierConfig {
            tiers: Vec::new(),
            ..TierConfig::default()
        };
        assert!(empty.validate().is_err());

        let bad_cutoff = TierConfig {
            rank_cutoff: 0,
            ..TierConfig::default()
        };
        assert!(bad_cutoff.validate().is_err());
    }

    #[test]
    fn rejects_path_like_ids() {
        let config = TierConfig {
            tiers: vec![TierSpec::flagged("../core", 3000)],
            ..TierConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
