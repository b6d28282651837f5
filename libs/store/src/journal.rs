//! Append-only mutation journal
//!
//! Every mutation of the document is written here as one JSON line before
//! it is applied in memory. On open, records newer than the snapshot are
//! replayed; a checkpoint truncates the file.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::{Activity, User};
use crate::error::{StoreError, StoreResult};

/// A single store mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalEntry {
    InsertUser { user: User },
    UpdateUser { user: User },
    InsertActivity { activity: Activity },
    ClearUsers,
    ClearActivities,
}

/// Journal line: a mutation tagged with its sequence number
#[derive(Debug, Clone, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub entry: JournalEntry,
}

#[derive(Serialize)]
struct RecordRef<'a> {
    seq: u64,
    entry: &'a JournalEntry,
}

/// Records recovered from a journal file
#[derive(Debug, Default)]
pub struct Replay {
    pub records: Vec<JournalRecord>,
    /// The last line was cut short by an interrupted append
    pub torn_tail: bool,
}

/// Open journal file
#[derive(Debug)]
pub struct Journal {
    file: File,
}

impl Journal {
    /// Open the journal for appending, creating it if needed
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Append one record and force it to disk
    pub fn append(&mut self, seq: u64, entry: &JournalEntry) -> StoreResult<()> {
        let mut line = serde_json::to_vec(&RecordRef { seq, entry })?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Drop every record
    pub fn truncate(&mut self) -> StoreResult<()> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// Read every record from a journal file.
///
/// A missing file yields no records. An unparsable final line without a
/// trailing newline is treated as an interrupted append and skipped; any
/// other unparsable line is corruption.
pub fn read_records(path: &Path) -> StoreResult<Replay> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Replay::default()),
        Err(e) => return Err(e.into()),
    };

    let complete = contents.ends_with('\n');
    let lines: Vec<&str> = contents.lines().collect();
    let mut replay = Replay::default();

    for (number, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalRecord>(line) {
            Ok(record) => replay.records.push(record),
            Err(e) if number + 1 == lines.len() && !complete => {
                warn!(
                    "Ignoring torn journal tail in {} at line {}: {}",
                    path.display(),
                    number + 1,
                    e
                );
                replay.torn_tail = true;
            }
            Err(e) => {
                return Err(StoreError::Corruption {
                    path: path.to_path_buf(),
                    reason: format!("line {}: {}", number + 1, e),
                });
            }
        }
    }

    Ok(replay)
}
