//! Source vocabulary table.
//!
//! The table is a headered CSV with at least `word`, `translation`,
//! `oxford` and `bnc` columns. Lookups are by header name; a missing
//! column or a short row reads as an empty field.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{TierError, TierResult};

/// Rank assigned to rows whose `bnc` field is not an integer.
pub const MISSING_RANK: i64 = 999_999;

/// One row of the source table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub translation: String,
    pub oxford: String,
    /// Raw frequency rank; `None` when the column is absent.
    pub bnc: Option<String>,
}

impl WordRecord {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn with_oxford(mut self, flag: impl Into<String>) -> Self {
        self.oxford = flag.into();
        self
    }

    pub fn with_bnc(mut self, rank: impl Into<String>) -> Self {
        self.bnc = Some(rank.into());
        self
    }

    /// Case-insensitive key used for cross-tier dedup.
    pub fn key(&self) -> String {
        self.word.to_lowercase()
    }

    /// Parsed frequency rank.
    ///
    /// An absent field counts as `0` (never a candidate); anything that is
    /// not an integer maps to [`MISSING_RANK`].
    pub fn rank(&self) -> i64 {
        match self.bnc.as_deref() {
            None => 0,
            Some(raw) => raw.trim().parse::<i64>().unwrap_or(MISSING_RANK),
        }
    }
}

/// Header positions of the columns the job reads.
#[derive(Debug, Clone, Copy, Default)]
struct Columns {
    word: Option<usize>,
    translation: Option<usize>,
    oxford: Option<usize>,
    bnc: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            word: position("word"),
            translation: position("translation"),
            oxford: position("oxford"),
            bnc: position("bnc"),
        }
    }

    fn record(&self, row: &csv::StringRecord) -> WordRecord {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i));
        WordRecord {
            word: field(self.word).unwrap_or_default().to_string(),
            translation: field(self.translation).unwrap_or_default().to_string(),
            oxford: field(self.oxford).unwrap_or_default().to_string(),
            bnc: self.bnc.map(|i| row.get(i).unwrap_or_default().to_string()),
        }
    }
}

/// Read every row of a headered CSV table.
///
/// `origin` only labels errors.
pub fn read_records<R: Read>(reader: R, origin: &Path) -> TierResult<Vec<WordRecord>> {
    let csv_err = |source: csv::Error| TierError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers().map_err(csv_err)?);
    if columns.word.is_none() {
        debug!(path = %origin.display(), "source table has no 'word' column");
    }

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();
    while reader.read_record(&mut row).map_err(csv_err)? {
        records.push(columns.record(&row));
    }

    debug!(path = %origin.display(), rows = records.len(), "read source table");
    Ok(records)
}

/// Open and read a source table from disk.
pub fn load_records(path: impl AsRef<Path>) -> TierResult<Vec<WordRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| TierError::io(path, e))?;
    read_records(std::io::BufReader::new(file), path)
}
