//! Writing compression results to disk or any writer.
//!
//! - CSV: one row per segment, for spreadsheets
//! - JSON: the full outcome, written atomically

use crate::types::{CompressionOutcome, Segment};
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    session_id: &'a str,
    order: u32,
    segment_id: &'a str,
    kind: &'static str,
    exercises: String,
    sets: String,
    work_seconds: u32,
    rest_seconds: u32,
    total_seconds: u32,
}

impl<'a> CsvRow<'a> {
    fn new(session_id: &'a str, segment: &'a Segment) -> Self {
        let exercises = segment.exercises();
        let timing = segment.timing();
        CsvRow {
            session_id,
            order: segment.order(),
            segment_id: segment.id(),
            kind: segment.kind().as_str(),
            exercises: exercises
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(" | "),
            sets: exercises
                .iter()
                .map(|e| e.sets.len().to_string())
                .collect::<Vec<_>>()
                .join(" | "),
            work_seconds: timing.work_seconds,
            rest_seconds: timing.rest_seconds,
            total_seconds: timing.total_seconds,
        }
    }
}

/// Write every segment of every session as CSV, returning the row count
pub fn write_segments_csv<W: Write>(outcome: &CompressionOutcome, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for session in &outcome.sessions {
        for segment in &session.segments {
            csv_writer.serialize(CsvRow::new(&session.summary.session_id, segment))?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    tracing::debug!("Wrote {} segment rows as CSV", rows);
    Ok(rows)
}

/// Write the CSV export to a file
pub fn save_segments_csv(outcome: &CompressionOutcome, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_segments_csv(outcome, std::io::BufWriter::new(file))
}

/// Save the outcome as pretty JSON
///
/// Atomically writes by:
/// 1. Writing to a temp file in the target directory
/// 2. Syncing to disk
/// 3. Renaming over the destination
pub fn save_outcome_json(outcome: &CompressionOutcome, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, outcome)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved compression outcome to {:?}", path);
    Ok(())
}
