//! Building and writing YOLO label files for a sequence.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::warn;

use super::bbox::NormalizedBox;
use super::class::{ClassCounts, ObjectClass, SequenceClasses};
use super::frame::FrameDimensions;
use super::gt::GtRow;

/// One line of a label file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRecord {
    pub class: ObjectClass,
    pub bbox: NormalizedBox,
}

/// Label records per frame id. Lines within a frame keep ground-truth order.
pub type LabelSet = BTreeMap<u32, Vec<LabelRecord>>;

/// What happened to the rows fed into [`build_label_set`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelStats {
    /// Boxes kept, per class.
    pub classes: ClassCounts,
    /// Rows dropped because their frame had no usable image.
    pub dropped_no_image: usize,
    /// Rows dropped because their box collapsed after clamping.
    pub dropped_degenerate: usize,
}

/// Classify and normalize ground-truth rows into per-frame label records.
pub fn build_label_set(
    rows: &[GtRow],
    dims: &mut FrameDimensions,
    classes: &SequenceClasses,
) -> (LabelSet, LabelStats) {
    let mut labels = LabelSet::new();
    let mut stats = LabelStats::default();

    for row in rows {
        let Some((width, height)) = dims.get(row.frame_id) else {
            stats.dropped_no_image += 1;
            continue;
        };

        let Some(bbox) = row.bbox.normalize_clamped(width as f64, height as f64) else {
            stats.dropped_degenerate += 1;
            continue;
        };

        let class = classes.resolve(row.track_id);
        stats.classes.add(class);
        labels
            .entry(row.frame_id)
            .or_default()
            .push(LabelRecord { class, bbox });
    }

    (labels, stats)
}

/// `<sequence>_<frame:06>.txt`
pub fn label_file_name(sequence: &str, frame_id: u32) -> String {
    format!("{sequence}_{frame_id:06}.txt")
}

/// `"<class> <cx> <cy> <w> <h>\n"` with six decimals.
pub fn format_label_line(record: &LabelRecord) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}\n",
        record.class.index(),
        record.bbox.cx,
        record.bbox.cy,
        record.bbox.w,
        record.bbox.h
    )
}

/// Write one label file.
pub fn write_label_file(path: &Path, records: &[LabelRecord]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for record in records {
        writer.write_all(format_label_line(record).as_bytes())?;
    }
    writer.flush()
}

/// Outcome of writing a [`LabelSet`].
#[derive(Clone, Debug, Default)]
pub struct LabelWriteSummary {
    /// Files written, keyed by frame id.
    pub written: BTreeMap<u32, PathBuf>,
    pub failed: usize,
}

/// Write one label file per frame into `dir`. Frames without records get
/// no file. A failed write is logged and skipped.
pub fn write_sequence_labels(dir: &Path, sequence: &str, labels: &LabelSet) -> LabelWriteSummary {
    let mut summary = LabelWriteSummary::default();

    for (&frame_id, records) in labels {
        if records.is_empty() {
            continue;
        }

        let path = dir.join(label_file_name(sequence, frame_id));
        match write_label_file(&path, records) {
            Ok(()) => {
                summary.written.insert(frame_id, path);
            }
            Err(err) => {
                warn!("failed to write label file {}: {}", path.display(), err);
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::bbox::PixelBox;
    use crate::mot::class::{ClassTable, TrackClassResolver};
    use crate::mot::frame::list_frames;
    use crate::test_support::bmp_bytes;

    fn row(frame_id: u32, track_id: i64, x: f64, y: f64, w: f64, h: f64) -> GtRow {
        GtRow {
            frame_id,
            track_id,
            bbox: PixelBox::new(x, y, w, h),
        }
    }

    #[test]
    fn label_line_uses_six_decimals() {
        let record = LabelRecord {
            class: ObjectClass::Player,
            bbox: NormalizedBox::new(0.125, 0.48, 0.05, 0.16),
        };
        assert_eq!(
            format_label_line(&record),
            "0 0.125000 0.480000 0.050000 0.160000\n"
        );
    }

    #[test]
    fn label_file_name_is_prefixed_and_padded() {
        assert_eq!(label_file_name("SNMOT-116", 5), "SNMOT-116_000005.txt");
    }

    #[test]
    fn build_label_set_classifies_and_drops() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("000005.jpg"), bmp_bytes(1000, 500)).expect("write image");

        let mut table = ClassTable::new();
        table.insert(
            "SNMOT-200".to_string(),
            BTreeMap::from([(ObjectClass::Ball, vec![9])]),
        );
        let resolver = TrackClassResolver::new(&table);
        let classes = resolver.for_sequence("SNMOT-200");

        let rows = vec![
            row(5, 7, 100.0, 200.0, 50.0, 80.0),
            row(5, 9, 10.0, 10.0, 4.0, 4.0),
            // Frame 6 has no image.
            row(6, 7, 0.0, 0.0, 10.0, 10.0),
            // Smallest subnormal width underflows to zero once divided.
            row(5, 7, 0.0, 0.0, f64::from_bits(1), 10.0),
        ];

        let frames = list_frames(temp.path(), "jpg").expect("list frames");
        let mut dims = FrameDimensions::new(&frames);
        let (labels, stats) = build_label_set(&rows, &mut dims, classes);

        assert_eq!(stats.dropped_no_image, 1);
        assert_eq!(stats.dropped_degenerate, 1);
        assert_eq!(stats.classes.player, 1);
        assert_eq!(stats.classes.ball, 1);

        let frame5 = &labels[&5];
        assert_eq!(frame5.len(), 2);
        assert_eq!(
            format_label_line(&frame5[0]),
            "0 0.125000 0.480000 0.050000 0.160000\n"
        );
        assert_eq!(frame5[1].class, ObjectClass::Ball);
        assert!(!labels.contains_key(&6));
    }

    #[test]
    fn write_sequence_labels_writes_one_file_per_frame() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let record = LabelRecord {
            class: ObjectClass::Referee,
            bbox: NormalizedBox::new(0.5, 0.5, 0.25, 0.25),
        };

        let mut labels = LabelSet::new();
        labels.insert(1, vec![record, record]);
        labels.insert(3, vec![record]);
        labels.insert(4, vec![]);

        let summary = write_sequence_labels(temp.path(), "SNMOT-1", &labels);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.written.len(), 2);

        let content =
            fs::read_to_string(temp.path().join("SNMOT-1_000001.txt")).expect("read label");
        assert_eq!(
            content,
            "2 0.500000 0.500000 0.250000 0.250000\n2 0.500000 0.500000 0.250000 0.250000\n"
        );
        assert!(temp.path().join("SNMOT-1_000003.txt").is_file());
        assert!(!temp.path().join("SNMOT-1_000004.txt").exists());
    }

    #[test]
    fn write_failure_is_counted_not_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let missing_dir = temp.path().join("does-not-exist");

        let mut labels = LabelSet::new();
        labels.insert(
            1,
            vec![LabelRecord {
                class: ObjectClass::Player,
                bbox: NormalizedBox::new(0.5, 0.5, 0.1, 0.1),
            }],
        );

        let summary = write_sequence_labels(&missing_dir, "S", &labels);
        assert_eq!(summary.failed, 1);
        assert!(summary.written.is_empty());
    }
}
