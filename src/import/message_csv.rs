//! CSV bulk loader.
//!
//! Expected layout, one header line then one message per row:
//!
//! ```text
//! id,name,email,text,time
//! 2C7BCEC7-CD14-D6E5-3FBF-F9551375429A,Alex Mustermann,fake@site.biz,hello,2017-12-14T06:20:33-08:00
//! ```
//!
//! Rows are committed in batches; a bad row stops the import but leaves the
//! batches committed before it in place.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;

use crate::message::{parse_timestamp, Message};
use crate::store::MessageStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: u64,
    pub batches: u64,
    pub min_time: Option<i64>,
    pub max_time: Option<i64>,
}

impl ImportStats {
    fn record(&mut self, time: i64) {
        self.rows += 1;
        self.min_time = Some(self.min_time.map_or(time, |min| min.min(time)));
        self.max_time = Some(self.max_time.map_or(time, |max| max.max(time)));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnIndices {
    id: usize,
    name: usize,
    email: usize,
    text: usize,
    time: usize,
}

impl ColumnIndices {
    const POSITIONAL: ColumnIndices = ColumnIndices {
        id: 0,
        name: 1,
        email: 2,
        text: 3,
        time: 4,
    };

    /// Columns named by the header, or the positional layout when the header
    /// does not name all five.
    fn from_headers(headers: &StringRecord) -> Self {
        let lookup = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };
        match (
            lookup("id"),
            lookup("name"),
            lookup("email"),
            lookup("text"),
            lookup("time"),
        ) {
            (Some(id), Some(name), Some(email), Some(text), Some(time)) => Self {
                id,
                name,
                email,
                text,
                time,
            },
            _ => Self::POSITIONAL,
        }
    }
}

/// Load a CSV file (gzip-compressed when the name ends in `.gz`) into `store`.
pub fn load_csv(store: &MessageStore, path: &Path, batch_size: usize) -> Result<ImportStats> {
    let reader = open_input(path)?;
    let stats = load_csv_reader(store, reader, batch_size)
        .with_context(|| format!("import {}", path.display()))?;
    log::info!(
        "imported {} messages from {} in {} batches",
        stats.rows,
        path.display(),
        stats.batches
    );
    Ok(stats)
}

pub fn load_csv_reader<R: Read>(
    store: &MessageStore,
    reader: R,
    batch_size: usize,
) -> Result<ImportStats> {
    if batch_size == 0 {
        bail!("batch size must be greater than zero");
    }

    let mut csv = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let indices = ColumnIndices::from_headers(csv.headers()?);

    let mut stats = ImportStats::default();
    let mut batch = Vec::with_capacity(batch_size);
    for record in csv.records() {
        let record = record?;
        let message = parse_row(&record, &indices)?;
        stats.record(message.time);
        batch.push(message);

        if batch.len() == batch_size {
            commit_batch(store, &mut batch, &mut stats)?;
        }
    }
    if !batch.is_empty() {
        commit_batch(store, &mut batch, &mut stats)?;
    }
    Ok(stats)
}

fn commit_batch(
    store: &MessageStore,
    batch: &mut Vec<Message>,
    stats: &mut ImportStats,
) -> Result<()> {
    let len = batch.len();
    store
        .insert_batch(batch.drain(..))
        .context("commit message batch")?;
    stats.batches += 1;
    log::debug!("committed batch {} ({} messages)", stats.batches, len);
    Ok(())
}

fn parse_row(record: &StringRecord, indices: &ColumnIndices) -> Result<Message> {
    let line = record.position().map_or(0, |pos| pos.line());

    let timestamp = field(record, indices.time, "time", line)?;
    let (time, tz_offset) =
        parse_timestamp(timestamp).with_context(|| format!("line {line}: bad time"))?;

    Ok(Message::new(
        field(record, indices.id, "id", line)?,
        field(record, indices.name, "name", line)?,
        field(record, indices.email, "email", line)?,
        field(record, indices.text, "text", line)?,
        time,
        tz_offset,
    ))
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str, line: u64) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or_else(|| anyhow!("line {line}: missing column {name}"))
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    if path.extension().and_then(|ext| ext.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_select_columns() {
        let headers = StringRecord::from(vec!["time", "text", "id", "email", "name"]);
        let indices = ColumnIndices::from_headers(&headers);
        assert_eq!(
            indices,
            ColumnIndices {
                id: 2,
                name: 4,
                email: 3,
                text: 1,
                time: 0,
            }
        );
    }

    #[test]
    fn unknown_header_falls_back_to_positional() {
        let headers = StringRecord::from(vec!["uuid", "author", "mail", "body", "sent"]);
        assert_eq!(ColumnIndices::from_headers(&headers), ColumnIndices::POSITIONAL);
    }

    #[test]
    fn stats_track_time_bounds() {
        let mut stats = ImportStats::default();
        for time in [5, -3, 12] {
            stats.record(time);
        }
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.min_time, Some(-3));
        assert_eq!(stats.max_time, Some(12));
    }
}
