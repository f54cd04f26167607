//! MOT ground-truth reader (`gt/gt.txt`).
//!
//! Each line is `frame,track,x,y,w,h,...`; trailing columns (confidence,
//! class, visibility) are ignored. Malformed rows are dropped one by one so
//! a single bad line never costs the whole sequence.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use super::bbox::PixelBox;
use crate::error::Mot2YoloError;

/// Minimum number of columns a usable row carries.
const MIN_FIELDS: usize = 6;

/// One valid ground-truth row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GtRow {
    pub frame_id: u32,
    pub track_id: i64,
    pub bbox: PixelBox,
}

/// All valid rows of a ground-truth file, in file order.
#[derive(Clone, Debug, Default)]
pub struct GroundTruth {
    pub rows: Vec<GtRow>,
    /// Rows that were present but malformed or degenerate.
    pub skipped_rows: usize,
}

/// Read a ground-truth file.
///
/// # Errors
/// Returns [`Mot2YoloError::GroundTruthRead`] if the file cannot be opened.
/// Row-level problems never fail the read.
pub fn read_ground_truth(path: &Path) -> Result<GroundTruth, Mot2YoloError> {
    let file = File::open(path).map_err(|source| Mot2YoloError::GroundTruthRead {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    Ok(parse_ground_truth(BufReader::new(file), path))
}

/// Parse ground-truth rows from any reader. `origin` is only used in log
/// messages.
pub fn parse_ground_truth<R: Read>(reader: R, origin: &Path) -> GroundTruth {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut gt = GroundTruth::default();
    let mut record = csv::StringRecord::new();

    loop {
        match csv_reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                debug!("{}: unreadable row: {}", origin.display(), err);
                if matches!(err.kind(), csv::ErrorKind::Io(_)) {
                    break;
                }
                gt.skipped_rows += 1;
                continue;
            }
        }

        match parse_gt_record(&record) {
            Some(row) => gt.rows.push(row),
            None => {
                let line = record.position().map_or(0, |pos| pos.line());
                debug!("{}:{}: discarded row {:?}", origin.display(), line, record);
                gt.skipped_rows += 1;
            }
        }
    }

    gt
}

/// Validate and convert a single record. `None` for any malformed or
/// degenerate row.
fn parse_gt_record(record: &csv::StringRecord) -> Option<GtRow> {
    if record.len() < MIN_FIELDS {
        return None;
    }

    let frame_id = record.get(0)?.parse::<u32>().ok()?;
    let track_id = record.get(1)?.parse::<i64>().ok()?;

    let mut geometry = [0.0f64; 4];
    for (slot, idx) in geometry.iter_mut().zip(2..MIN_FIELDS) {
        let value = record.get(idx)?.parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value;
    }

    let [x, y, w, h] = geometry;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }

    Some(GtRow {
        frame_id,
        track_id,
        bbox: PixelBox::new(x, y, w, h),
    })
}

/// Fuzz-only entrypoint for ground-truth parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_ground_truth(input: &[u8]) -> usize {
    parse_ground_truth(input, Path::new("<fuzz>")).rows.len()
}
