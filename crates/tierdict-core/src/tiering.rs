//! Partitioning of source rows into leveled tiers.
//!
//! Tiers are filled in plan order. Each tier only takes words that no
//! earlier tier claimed (compared lowercased), so a word lands in at most
//! one tier. Duplicate rows of the same word inside one tier are kept.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Selection, TierConfig, TierSpec};
use crate::source::WordRecord;

/// Prefix of every entry id.
pub const ENTRY_ID_PREFIX: &str = "w_";

/// One line of a tier file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TierEntry {
    pub id: String,
    pub cn: String,
    pub en: String,
    pub level: u32,
}

impl TierEntry {
    pub fn from_record(record: &WordRecord, level: u32) -> Self {
        Self {
            id: entry_id(&record.word),
            cn: clean_translation(&record.translation),
            en: record.word.clone(),
            level,
        }
    }
}

/// `w_` + word with spaces as underscores, lowercased.
pub fn entry_id(word: &str) -> String {
    format!("{}{}", ENTRY_ID_PREFIX, word.replace(' ', "_").to_lowercase())
}

/// Collapse line breaks (`\r\n`, `\r` or `\n`) to spaces, then trim
/// whitespace, then trim double quotes.
pub fn clean_translation(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace(['\r', '\n'], " ")
        .trim()
        .trim_matches('"')
        .to_string()
}

/// A filled tier, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub spec: TierSpec,
    pub entries: Vec<TierEntry>,
}

impl Tier {
    pub fn file_name(&self) -> String {
        self.spec.file_name()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Words already claimed by an earlier tier.
#[derive(Debug, Clone, Default)]
pub struct SeenWords {
    keys: HashSet<String>,
}

impl SeenWords {
    pub fn contains(&self, record: &WordRecord) -> bool {
        self.keys.contains(&record.key())
    }

    pub fn claim(&mut self, record: &WordRecord) {
        self.keys.insert(record.key());
    }
}

/// A row eligible for ranked tiers, with its parsed rank.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    rank: i64,
    record: &'a WordRecord,
}

/// Rows with flag value set, in input order, not yet claimed.
fn select_flagged<'a>(
    records: &'a [WordRecord],
    flag_value: &str,
    seen: &SeenWords,
) -> Vec<&'a WordRecord> {
    records
        .iter()
        .filter(|r| !r.word.is_empty())
        .filter(|r| r.oxford == flag_value)
        .filter(|r| !seen.contains(r))
        .collect()
}

/// Unclaimed rows with rank in `(0, cutoff]`, stably sorted by rank.
fn ranked_pool<'a>(records: &'a [WordRecord], cutoff: i64, seen: &SeenWords) -> Vec<Candidate<'a>> {
    let mut pool: Vec<Candidate<'a>> = records
        .iter()
        .filter(|r| !r.word.is_empty() && !seen.contains(r))
        .map(|record| Candidate {
            rank: record.rank(),
            record,
        })
        .filter(|c| c.rank > 0 && c.rank <= cutoff)
        .collect();
    pool.sort_by_key(|c| c.rank);
    pool
}

/// Fill every tier of the plan from the source rows.
///
/// The ranked candidate pool is built once, against the words claimed when
/// the first ranked tier is reached. Every later ranked tier re-filters the
/// whole pool against the words claimed so far, instead of slicing past the
/// previous tier's prefix, so a word repeated further down the pool never
/// reappears in a later tier.
pub fn build_tiers(records: &[WordRecord], config: &TierConfig) -> Vec<Tier> {
    let mut seen = SeenWords::default();
    let mut pool: Option<Vec<Candidate<'_>>> = None;
    let mut tiers = Vec::with_capacity(config.tiers.len());

    for spec in &config.tiers {
        let picked: Vec<&WordRecord> = match spec.selection {
            Selection::Flagged => select_flagged(records, &config.flag_value, &seen),
            Selection::Ranked { capacity } => {
                let pool = pool.get_or_insert_with(|| {
                    let pool = ranked_pool(records, config.rank_cutoff, &seen);
                    debug!(candidates = pool.len(), "built ranked candidate pool");
                    pool
                });
                pool.iter()
                    .filter(|c| !seen.contains(c.record))
                    .take(capacity)
                    .map(|c| c.record)
                    .collect()
            }
        };

        for record in &picked {
            seen.claim(record);
        }

        let entries: Vec<TierEntry> = picked
            .into_iter()
            .map(|r| TierEntry::from_record(r, spec.level))
            .collect();

        info!(tier = %spec.id, level = spec.level, entries = entries.len(), "filled tier");
        tiers.push(Tier {
            spec: spec.clone(),
            entries,
        });
    }

    tiers
}
