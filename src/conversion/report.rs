//! Run report types: what happened to each sequence, plus run totals.
//!
//! The report is the only user-facing record of skips and per-file
//! failures, so every outcome is kept here rather than only logged.

use serde::Serialize;
use std::fmt;

use crate::mot::{ClassCounts, ObjectClass};
use crate::split::SplitCounts;

/// Why a sequence was not converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingGameInfo,
    MissingGroundTruth,
    MissingImageDir,
    ImageDirUnreadable,
    NoImages,
    GroundTruthUnreadable,
    OutputUnwritable,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::MissingGameInfo => "missing gameinfo.ini",
            SkipReason::MissingGroundTruth => "missing gt/gt.txt",
            SkipReason::MissingImageDir => "missing img1 directory",
            SkipReason::ImageDirUnreadable => "img1 directory could not be listed",
            SkipReason::NoImages => "no images found",
            SkipReason::GroundTruthUnreadable => "gt/gt.txt could not be read",
            SkipReason::OutputUnwritable => "output directories could not be created",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Counters for one converted sequence.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SequenceReport {
    pub sequence: String,
    pub game_id: String,
    /// Tracks with a class from the class table; the rest are players.
    pub tracks_classified: usize,
    /// Images found in the sequence.
    pub frames: usize,
    /// Frames per split as planned.
    pub splits: SplitCounts,
    pub images_copied: usize,
    pub image_copy_failures: usize,
    /// Label files written to staging.
    pub labels_written: usize,
    pub label_write_failures: usize,
    /// Staged labels moved into their split directory.
    pub labels_placed: usize,
    pub label_move_failures: usize,
    /// Staged labels with no matching image; discarded.
    pub orphan_labels: usize,
    /// Valid ground-truth rows.
    pub rows_read: usize,
    /// Malformed ground-truth rows.
    pub rows_skipped: usize,
    /// Boxes written, per class.
    pub boxes: ClassCounts,
    /// Boxes dropped because their frame image was missing or undecodable.
    pub boxes_without_image: usize,
    /// Boxes dropped because they collapsed after clamping.
    pub boxes_degenerate: usize,
    /// Frames referenced by ground truth whose size could not be read.
    pub frames_unavailable: usize,
    pub gameinfo_copied: bool,
    pub data_yaml_written: bool,
    pub elapsed_secs: f64,
}

impl SequenceReport {
    /// Per-file failures recorded for this sequence.
    pub fn failure_count(&self) -> usize {
        self.image_copy_failures + self.label_write_failures + self.label_move_failures
    }
}

/// What happened to one sequence.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SequenceOutcome {
    Converted(SequenceReport),
    Skipped { sequence: String, reason: SkipReason },
}

impl SequenceOutcome {
    pub fn sequence(&self) -> &str {
        match self {
            SequenceOutcome::Converted(report) => &report.sequence,
            SequenceOutcome::Skipped { sequence, .. } => sequence,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, SequenceOutcome::Converted(_))
    }
}

/// Totals across all sequences of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunTotals {
    pub sequences_converted: usize,
    pub sequences_skipped: usize,
    pub frames: usize,
    pub splits: SplitCounts,
    pub images_copied: usize,
    pub labels_placed: usize,
    pub boxes: ClassCounts,
    pub rows_skipped: usize,
    pub failures: usize,
}

/// The report of a whole conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub source: String,
    pub target: String,
    pub policy: String,
    pub sequences: Vec<SequenceOutcome>,
    pub totals: RunTotals,
}

impl RunReport {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        policy: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            policy: policy.into(),
            ..Default::default()
        }
    }

    /// Record a sequence outcome and fold it into the totals.
    pub fn push(&mut self, outcome: SequenceOutcome) {
        match &outcome {
            SequenceOutcome::Converted(seq) => {
                let totals = &mut self.totals;
                totals.sequences_converted += 1;
                totals.frames += seq.frames;
                totals.splits.merge(&seq.splits);
                totals.images_copied += seq.images_copied;
                totals.labels_placed += seq.labels_placed;
                totals.boxes.merge(&seq.boxes);
                totals.rows_skipped += seq.rows_skipped;
                totals.failures += seq.failure_count();
            }
            SequenceOutcome::Skipped { .. } => self.totals.sequences_skipped += 1,
        }
        self.sequences.push(outcome);
    }

    pub fn converted(&self) -> impl Iterator<Item = &SequenceReport> {
        self.sequences.iter().filter_map(|outcome| match outcome {
            SequenceOutcome::Converted(report) => Some(report),
            SequenceOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, SkipReason)> {
        self.sequences.iter().filter_map(|outcome| match outcome {
            SequenceOutcome::Skipped { sequence, reason } => Some((sequence.as_str(), *reason)),
            SequenceOutcome::Converted(_) => None,
        })
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Converted {} -> {}", self.source, self.target)?;
        writeln!(f, "  split policy: {}", self.policy)?;
        writeln!(f)?;

        for outcome in &self.sequences {
            match outcome {
                SequenceOutcome::Converted(seq) => {
                    writeln!(
                        f,
                        "  OK    {} (game {}): {} frames [train {}, valid {}, test {}], {} images, {} labels, {} boxes",
                        seq.sequence,
                        seq.game_id,
                        seq.frames,
                        seq.splits.train,
                        seq.splits.valid,
                        seq.splits.test,
                        seq.images_copied,
                        seq.labels_placed,
                        seq.boxes.total()
                    )?;
                    if seq.failure_count() > 0 {
                        writeln!(f, "        {} file operation(s) failed", seq.failure_count())?;
                    }
                }
                SequenceOutcome::Skipped { sequence, reason } => {
                    writeln!(f, "  SKIP  {}: {}", sequence, reason)?;
                }
            }
        }

        let t = &self.totals;
        writeln!(f)?;
        writeln!(
            f,
            "Sequences: {} converted, {} skipped",
            t.sequences_converted, t.sequences_skipped
        )?;
        writeln!(
            f,
            "Frames: {} (train {}, valid {}, test {})",
            t.frames, t.splits.train, t.splits.valid, t.splits.test
        )?;
        writeln!(
            f,
            "Images copied: {}, labels placed: {}",
            t.images_copied, t.labels_placed
        )?;
        write!(f, "Boxes:")?;
        for class in ObjectClass::ALL {
            write!(f, " {} {}", class, t.boxes.get(class))?;
        }
        writeln!(f)?;
        if t.rows_skipped > 0 {
            writeln!(f, "Malformed ground-truth rows skipped: {}", t.rows_skipped)?;
        }
        if t.failures > 0 {
            writeln!(f, "File operations failed: {}", t.failures)?;
        }

        Ok(())
    }
}
