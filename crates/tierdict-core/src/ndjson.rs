//! NDJSON (Newline Delimited JSON) utilities for tier files.
//!
//! # Format
//!
//! One entry per line, each line terminated by `\n`:
//! ```text
//! {"id": "w_apple", "cn": "n. 苹果", "en": "apple", "level": 3000}
//! ```
//!
//! Members are separated by `", "` and keys from values by `": "`, the
//! layout the published packages have always used, so rebuilding from an
//! unchanged table reproduces the published hashes. Non-ASCII text is
//! written literally.

use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::{TierError, TierResult};
use crate::tiering::TierEntry;

/// Compact JSON with a space after `,` and `:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}

/// Serialize one value on a single line, without the trailing newline.
pub fn to_line<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write entries as NDJSON, one per line.
pub fn write_entries<W: Write>(mut writer: W, entries: &[TierEntry]) -> io::Result<()> {
    for entry in entries {
        let line = to_line(entry).map_err(io::Error::from)?;
        writer.write_all(&line)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Read all entries, skipping blank lines.
pub fn read_entries<R: BufRead>(reader: R) -> TierResult<Vec<TierEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| TierError::Json {
            message: format!("io error reading line {}: {}", idx + 1, e),
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = serde_json::from_str::<TierEntry>(line).map_err(|e| TierError::Json {
            message: format!("invalid entry at line {}: {}", idx + 1, e),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
