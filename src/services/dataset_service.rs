//! Append-only CSV dataset of price observations

use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::{DatasetRow, PriceRecord};
use crate::utils::errors::StorageError;

/// Dataset header, in column order
pub const HEADER: [&str; 3] = ["commodity", "price", "timestamp"];

/// Result of reading the whole dataset
#[derive(Debug, Default)]
pub struct DatasetContents {
    /// Valid records in file order
    pub records: Vec<PriceRecord>,
    /// Rows that could not be parsed
    pub skipped_rows: usize,
}

/// Append `records` to the dataset at `path`, creating it with a header if needed
///
/// Existing bytes are never rewritten. The file is flushed and synced before
/// returning. Returns the number of rows written.
pub fn append(records: &[PriceRecord], path: &Path) -> Result<usize, StorageError> {
    if records.is_empty() {
        debug!("Nothing to append to {}", path.display());
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // An empty file has no header yet and no history to stay ahead of
    let has_history = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    let last_timestamp = if has_history {
        read_dataset(path)?
            .records
            .iter()
            .map(|r| r.timestamp)
            .max()
    } else {
        None
    };
    let records = clamp_timestamps(records, last_timestamp);

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let write_err = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let needs_header = file.metadata().map_err(write_err)?.len() == 0;
    if !needs_header && !ends_with_newline(&mut file).map_err(write_err)? {
        file.write_all(b"\n").map_err(write_err)?;
    }

    let csv_err = |source: csv::Error| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(HEADER).map_err(csv_err)?;
    }
    for record in &records {
        writer.serialize(DatasetRow::from(record)).map_err(csv_err)?;
    }

    writer.flush().map_err(write_err)?;
    let file = writer
        .into_inner()
        .map_err(|e| write_err(std::io::Error::new(e.error().kind(), e.to_string())))?;
    file.sync_all().map_err(write_err)?;

    info!("Appended {} row(s) to {}", records.len(), path.display());
    Ok(records.len())
}

/// Keep the log monotonic when the clock reads earlier than the last row
fn clamp_timestamps(records: &[PriceRecord], last: Option<DateTime<Utc>>) -> Vec<PriceRecord> {
    records
        .iter()
        .map(|record| match last {
            Some(last) if record.timestamp < last => {
                warn!(
                    "Capture time {} is before last dataset entry {}; using {}",
                    record.timestamp, last, last
                );
                PriceRecord {
                    timestamp: last,
                    ..record.clone()
                }
            }
            _ => record.clone(),
        })
        .collect()
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Read every parseable record of the dataset at `path`
///
/// Malformed rows are skipped and counted. A missing file, unreadable file or
/// unexpected header is a `StorageError`.
pub fn read_dataset(path: &Path) -> Result<DatasetContents, StorageError> {
    let file = File::open(path).map_err(|source| StorageError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| StorageError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let header_fields: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    if header_fields != HEADER {
        return Err(StorageError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("unexpected header '{}'", headers.iter().collect::<Vec<_>>().join(",")),
        });
    }

    let mut contents = DatasetContents::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let line = idx + 2;

        let row = match result {
            Ok(record) if record.len() == HEADER.len() => match record.deserialize::<DatasetRow>(None) {
                Ok(row) => row,
                Err(e) => {
                    warn!("{}:{}: CSV parse error: {}", path.display(), line, e);
                    contents.skipped_rows += 1;
                    continue;
                }
            },
            Ok(record) => {
                warn!("{}:{}: expected 3 fields, found {}", path.display(), line, record.len());
                contents.skipped_rows += 1;
                continue;
            }
            Err(e) => {
                warn!("{}:{}: CSV parse error: {}", path.display(), line, e);
                contents.skipped_rows += 1;
                continue;
            }
        };

        match PriceRecord::try_from(row) {
            Ok(record) => contents.records.push(record),
            Err(reason) => {
                warn!("{}:{}: skipping row: {}", path.display(), line, reason);
                contents.skipped_rows += 1;
            }
        }
    }

    debug!(
        "Read {} record(s) from {} ({} skipped)",
        contents.records.len(),
        path.display(),
        contents.skipped_rows
    );
    Ok(contents)
}
