//! Provenance of every merge: which input points each surviving point
//! absorbed, directly or through chained merges.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use crate::aggregate::PointId;
use crate::error::{Error, Result};

pub const CSV_HEADER: [&str; 4] = ["pointID", "startNumMeasures", "endNumMeasures", "mergedIDs"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeLogEntry {
    pub start_measures: usize,
    pub end_measures: usize,
    pub merged: BTreeSet<PointId>,
}

/// Keyed by arena index so that duplicate input IDs stay distinct; IDs are
/// resolved only when records are produced.
#[derive(Debug, Clone, Default)]
pub struct MergeLog {
    entries: BTreeMap<PointId, MergeLogEntry>,
}

/// One resolved log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRecord {
    pub point_id: String,
    pub start_measures: usize,
    pub end_measures: usize,
    /// Sorted.
    pub merged_ids: Vec<String>,
}

impl MergeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `absorbed` were merged into `source` in one step.
    ///
    /// Entries previously logged under an absorbed point move into the
    /// source's entry, so a point never appears both as a key and inside
    /// another entry.
    pub fn record(
        &mut self,
        source: PointId,
        start_measures: usize,
        end_measures: usize,
        absorbed: &[PointId],
    ) {
        if absorbed.is_empty() {
            return;
        }

        let mut merged = BTreeSet::new();
        for &candidate in absorbed {
            debug_assert_ne!(candidate, source);
            if let Some(previous) = self.entries.remove(&candidate) {
                merged.extend(previous.merged);
            }
            merged.insert(candidate);
        }

        let entry = self.entries.entry(source).or_insert_with(|| MergeLogEntry {
            start_measures,
            end_measures,
            merged: BTreeSet::new(),
        });
        entry.end_measures = end_measures;
        entry.merged.append(&mut merged);
    }

    pub fn get(&self, id: PointId) -> Option<&MergeLogEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, &MergeLogEntry)> {
        self.entries.iter().map(|(&id, entry)| (id, entry))
    }

    /// Every point ID absorbed by any entry.
    pub fn absorbed(&self) -> impl Iterator<Item = PointId> {
        self.entries.values().flat_map(|e| e.merged.iter().copied())
    }

    /// Resolve arena indices to output IDs (`names[id.0]`).
    pub fn records(&self, names: &[String]) -> Vec<MergeRecord> {
        self.entries
            .iter()
            .map(|(id, entry)| {
                let mut merged_ids: Vec<String> =
                    entry.merged.iter().map(|m| names[m.0].clone()).collect();
                merged_ids.sort();
                MergeRecord {
                    point_id: names[id.0].clone(),
                    start_measures: entry.start_measures,
                    end_measures: entry.end_measures,
                    merged_ids,
                }
            })
            .collect()
    }

    pub fn write_csv_to<W: Write>(records: &[MergeRecord], writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADER)?;
        for record in records {
            let start = record.start_measures.to_string();
            let end = record.end_measures.to_string();
            let merged = record.merged_ids.join(" ");
            csv_writer.write_record([
                record.point_id.as_str(),
                start.as_str(),
                end.as_str(),
                merged.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv(records: &[MergeRecord], path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::write_csv_to(records, std::io::BufWriter::new(file)).map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })
    }
}
