//! Sequence-by-sequence conversion into the YOLO output tree.
//!
//! For each sequence directory under the source root:
//!
//! 1. check that `gameinfo.ini`, `gt/gt.txt` and `img1/` exist,
//! 2. read the game id,
//! 3. write normalized labels into a per-sequence staging directory,
//! 4. plan the split over the sorted frame list,
//! 5. copy each image and move its staged label into the frame's split,
//! 6. copy `gameinfo.ini` and write `data.yaml` next to the splits.
//!
//! Only configuration errors abort a run. A sequence that cannot be
//! converted is skipped, and a file that cannot be copied or moved is
//! logged and counted; both end up in the [`RunReport`].

pub mod report;

pub use report::{RunReport, RunTotals, SequenceOutcome, SequenceReport, SkipReason};

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};
use walkdir::WalkDir;

use crate::config::ConvertConfig;
use crate::error::Mot2YoloError;
use crate::mot::frame::{list_frames, Frame};
use crate::mot::gameinfo::read_game_id;
use crate::mot::gt::read_ground_truth;
use crate::mot::label::{build_label_set, label_file_name, write_sequence_labels};
use crate::mot::{FrameDimensions, ObjectClass, TrackClassResolver};
use crate::split::{plan_splits, Split, SplitPolicy};

pub const GAMEINFO_FILE: &str = "gameinfo.ini";
pub const IMAGE_DIR: &str = "img1";
pub const IMAGES_SUBDIR: &str = "images";
pub const LABELS_SUBDIR: &str = "labels";
pub const DATA_YAML_FILE: &str = "data.yaml";

/// Per-game scratch directory for labels before they are placed.
const STAGING_DIR: &str = ".staging";

/// Input paths of one sequence directory.
#[derive(Clone, Debug)]
pub struct SequencePaths {
    pub name: String,
    pub gameinfo: PathBuf,
    pub ground_truth: PathBuf,
    pub images: PathBuf,
}

impl SequencePaths {
    pub fn new(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.to_string_lossy().into_owned());

        Self {
            name,
            gameinfo: dir.join(GAMEINFO_FILE),
            ground_truth: dir.join("gt").join("gt.txt"),
            images: dir.join(IMAGE_DIR),
        }
    }

    /// The first missing input, if any.
    fn missing(&self) -> Option<SkipReason> {
        if !self.gameinfo.is_file() {
            Some(SkipReason::MissingGameInfo)
        } else if !self.ground_truth.is_file() {
            Some(SkipReason::MissingGroundTruth)
        } else if !self.images.is_dir() {
            Some(SkipReason::MissingImageDir)
        } else {
            None
        }
    }
}

/// Convert every sequence under `config.source` into `config.target`.
///
/// # Errors
/// Fails only before processing starts: invalid split ratios, a missing
/// source directory, or an uncreatable target root.
pub fn convert_dataset(config: &ConvertConfig) -> Result<RunReport, Mot2YoloError> {
    config.validate()?;
    fs::create_dir_all(&config.target)?;

    let resolver = TrackClassResolver::new(&config.classes);
    let sequences = discover_sequences(&config.source)?;

    info!(
        "found {} sequence(s) in {}, writing to {}",
        sequences.len(),
        config.source.display(),
        config.target.display()
    );
    info!("split policy: {}", config.policy);

    let mut report = RunReport::new(
        config.source.display().to_string(),
        config.target.display().to_string(),
        config.policy.to_string(),
    );

    let started = Instant::now();
    for dir in &sequences {
        let outcome = convert_sequence(dir, config, &resolver);
        report.push(outcome);
    }

    let totals = &report.totals;
    info!(
        "done in {:.2}s: {} converted, {} skipped, {} images, {} labels",
        started.elapsed().as_secs_f64(),
        totals.sequences_converted,
        totals.sequences_skipped,
        totals.images_copied,
        totals.labels_placed
    );

    Ok(report)
}

/// Immediate subdirectories of `source`, sorted by name.
pub fn discover_sequences(source: &Path) -> Result<Vec<PathBuf>, Mot2YoloError> {
    let mut dirs = Vec::new();

    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            Mot2YoloError::Io(err.into_io_error().unwrap_or_else(|| {
                io::Error::other(format!("failed to traverse {}", source.display()))
            }))
        })?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    Ok(dirs)
}

/// Convert one sequence. Never fails; problems become a skip or a counter.
pub fn convert_sequence(
    dir: &Path,
    config: &ConvertConfig,
    resolver: &TrackClassResolver,
) -> SequenceOutcome {
    let started = Instant::now();
    let paths = SequencePaths::new(dir);
    let name = paths.name.clone();
    info!("processing {}", name);

    let skip = |reason: SkipReason| {
        warn!("skipping {} ({})", name, reason);
        SequenceOutcome::Skipped {
            sequence: name.clone(),
            reason,
        }
    };

    if let Some(reason) = paths.missing() {
        return skip(reason);
    }

    let game_id = read_game_id(&paths.gameinfo);

    let frames = match list_frames(&paths.images, &config.image_extension) {
        Ok(frames) => frames,
        Err(err) => {
            warn!("{}: {}", paths.images.display(), err);
            return skip(SkipReason::ImageDirUnreadable);
        }
    };
    if frames.is_empty() {
        return skip(SkipReason::NoImages);
    }

    let gt = match read_ground_truth(&paths.ground_truth) {
        Ok(gt) => gt,
        Err(err) => {
            warn!("{}", err);
            return skip(SkipReason::GroundTruthUnreadable);
        }
    };

    let game_dir = config.target.join(&game_id);
    let staging_dir = game_dir.join(STAGING_DIR).join(&name);
    if let Err(err) = create_output_dirs(&game_dir, &config.policy.splits())
        .and_then(|()| fs::create_dir_all(&staging_dir))
    {
        warn!("{}: {}", game_dir.display(), err);
        return skip(SkipReason::OutputUnwritable);
    }

    let mut seq = SequenceReport {
        sequence: name.clone(),
        game_id: game_id.clone(),
        frames: frames.len(),
        rows_read: gt.rows.len(),
        rows_skipped: gt.skipped_rows,
        ..Default::default()
    };

    // Labels first, into staging.
    let classes = resolver.for_sequence(&name);
    seq.tracks_classified = classes.len();
    if resolver.knows(&name) {
        info!("  {} track(s) with a class override", classes.len());
    } else {
        info!("  no class overrides for {}; every track is a player", name);
    }
    let mut dims = FrameDimensions::new(&frames);
    let (labels, stats) = build_label_set(&gt.rows, &mut dims, classes);
    let written = write_sequence_labels(&staging_dir, &name, &labels);

    seq.boxes = stats.classes;
    seq.boxes_without_image = stats.dropped_no_image;
    seq.boxes_degenerate = stats.dropped_degenerate;
    seq.frames_unavailable = dims.unavailable_count();
    seq.labels_written = written.written.len();
    seq.label_write_failures = written.failed;
    info!(
        "  generated {} label file(s) for {} frame(s)",
        seq.labels_written,
        labels.len()
    );

    // Then place images and labels split by split.
    let plan = plan_splits(frames.len(), &config.policy);
    seq.splits = plan.counts();

    let mut staged = written.written;
    for (frame, split) in frames.iter().zip(plan.iter()) {
        place_frame(frame, split, &name, &game_dir, &mut staged, &mut seq);
    }
    info!(
        "  copied {} image(s), placed {} label(s) [train {}, valid {}, test {}]",
        seq.images_copied, seq.labels_placed, seq.splits.train, seq.splits.valid, seq.splits.test
    );

    seq.orphan_labels = staged.len();
    for path in staged.values() {
        warn!("  discarding label without image: {}", path.display());
    }
    cleanup_staging(&game_dir, &staging_dir);

    seq.gameinfo_copied = match fs::copy(&paths.gameinfo, game_dir.join(GAMEINFO_FILE)) {
        Ok(_) => true,
        Err(err) => {
            warn!("  failed to copy {}: {}", paths.gameinfo.display(), err);
            false
        }
    };

    seq.data_yaml_written = match write_data_yaml(&game_dir, &config.policy) {
        Ok(()) => true,
        Err(err) => {
            warn!("  failed to write {}: {}", DATA_YAML_FILE, err);
            false
        }
    };

    seq.elapsed_secs = started.elapsed().as_secs_f64();
    info!(
        "processed {} -> game {} in {:.2}s",
        name, game_id, seq.elapsed_secs
    );

    SequenceOutcome::Converted(seq)
}

/// Copy one frame's image and move its staged label, if any, into `split`.
fn place_frame(
    frame: &Frame,
    split: Split,
    sequence: &str,
    game_dir: &Path,
    staged: &mut BTreeMap<u32, PathBuf>,
    seq: &mut SequenceReport,
) {
    let split_dir = game_dir.join(split.dir_name());

    let image_target = split_dir
        .join(IMAGES_SUBDIR)
        .join(format!("{}_{}", sequence, frame.file_name));
    match fs::copy(&frame.path, &image_target) {
        Ok(_) => seq.images_copied += 1,
        Err(err) => {
            warn!("  failed to copy image {}: {}", frame.path.display(), err);
            seq.image_copy_failures += 1;
        }
    }

    let Some(staged_label) = frame.frame_id.and_then(|id| staged.remove_entry(&id)) else {
        return;
    };
    let (frame_id, source) = staged_label;
    let label_target = split_dir
        .join(LABELS_SUBDIR)
        .join(label_file_name(sequence, frame_id));

    match move_file(&source, &label_target) {
        Ok(()) => seq.labels_placed += 1,
        Err(err) => {
            warn!("  failed to move label {}: {}", source.display(), err);
            seq.label_move_failures += 1;
        }
    }
}

/// `<game>/<split>/{images,labels}` for every split the policy produces.
fn create_output_dirs(game_dir: &Path, splits: &[Split]) -> io::Result<()> {
    for split in splits {
        let split_dir = game_dir.join(split.dir_name());
        fs::create_dir_all(split_dir.join(IMAGES_SUBDIR))?;
        fs::create_dir_all(split_dir.join(LABELS_SUBDIR))?;
    }
    Ok(())
}

/// Rename, falling back to copy + remove across file systems.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

fn cleanup_staging(game_dir: &Path, staging_dir: &Path) {
    if let Err(err) = fs::remove_dir_all(staging_dir) {
        warn!(
            "  failed to remove staging directory {}: {}",
            staging_dir.display(),
            err
        );
    }
    // Only succeeds once no other sequence of this game is staged.
    let _ = fs::remove_dir(game_dir.join(STAGING_DIR));
}

/// Write an Ultralytics-style `data.yaml` listing the policy's splits and
/// the class names.
pub fn write_data_yaml(game_dir: &Path, policy: &SplitPolicy) -> io::Result<()> {
    let mut yaml = String::new();
    for split in policy.splits() {
        let key = match split {
            Split::Train => "train",
            Split::Valid => "val",
            Split::Test => "test",
        };
        yaml.push_str(&format!("{}: {}/{}\n", key, split.dir_name(), IMAGES_SUBDIR));
    }

    yaml.push_str(&format!("nc: {}\n", ObjectClass::ALL.len()));
    yaml.push_str("names:\n");
    for class in ObjectClass::ALL {
        yaml.push_str(&format!(
            "  {}: {}\n",
            class.index(),
            yaml_single_quoted(class.name())
        ));
    }

    fs::write(game_dir.join(DATA_YAML_FILE), yaml)
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::SplitRatios;

    #[test]
    fn sequence_paths_follow_mot_layout() {
        let paths = SequencePaths::new(Path::new("/data/test/SNMOT-116"));
        assert_eq!(paths.name, "SNMOT-116");
        assert_eq!(paths.gameinfo, Path::new("/data/test/SNMOT-116/gameinfo.ini"));
        assert_eq!(paths.ground_truth, Path::new("/data/test/SNMOT-116/gt/gt.txt"));
        assert_eq!(paths.images, Path::new("/data/test/SNMOT-116/img1"));
    }

    #[test]
    fn missing_inputs_are_reported_in_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = temp.path().join("SNMOT-1");
        fs::create_dir_all(&dir).expect("mkdir");

        let paths = SequencePaths::new(&dir);
        assert_eq!(paths.missing(), Some(SkipReason::MissingGameInfo));

        fs::write(dir.join(GAMEINFO_FILE), "gameID=1\n").expect("write gameinfo");
        assert_eq!(paths.missing(), Some(SkipReason::MissingGroundTruth));

        fs::create_dir_all(dir.join("gt")).expect("mkdir gt");
        fs::write(dir.join("gt/gt.txt"), "").expect("write gt");
        assert_eq!(paths.missing(), Some(SkipReason::MissingImageDir));

        fs::create_dir_all(dir.join(IMAGE_DIR)).expect("mkdir img1");
        assert_eq!(paths.missing(), None);
    }

    #[test]
    fn discover_sequences_lists_sorted_directories_only() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(temp.path().join("SNMOT-2")).expect("mkdir");
        fs::create_dir_all(temp.path().join("SNMOT-1/img1")).expect("mkdir");
        fs::write(temp.path().join("README.txt"), "x").expect("write");

        let dirs = discover_sequences(temp.path()).expect("discover");
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["SNMOT-1", "SNMOT-2"]);
    }

    #[test]
    fn move_file_relocates_contents() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let from = temp.path().join("a.txt");
        let to = temp.path().join("b.txt");
        fs::write(&from, "0 0.5 0.5 0.1 0.1\n").expect("write");

        move_file(&from, &to).expect("move");
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "0 0.5 0.5 0.1 0.1\n");
    }

    #[test]
    fn data_yaml_lists_policy_splits_and_classes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let policy = SplitPolicy::Shuffle {
            ratios: SplitRatios::new(0.8, 0.2, 0.0),
            seed: 42,
        };
        write_data_yaml(temp.path(), &policy).expect("write data.yaml");

        let yaml = fs::read_to_string(temp.path().join(DATA_YAML_FILE)).expect("read");
        assert!(yaml.contains("train: train/images\n"));
        assert!(yaml.contains("val: valid/images\n"));
        assert!(!yaml.contains("test:"));
        assert!(yaml.contains("nc: 4\n"));
        assert!(yaml.contains("  3: 'ball'\n"));
    }

    #[test]
    fn create_output_dirs_builds_split_tree() {
        let temp = tempfile::tempdir().expect("create temp dir");
        create_output_dirs(temp.path(), &[Split::Test]).expect("create dirs");
        assert!(temp.path().join("test/images").is_dir());
        assert!(temp.path().join("test/labels").is_dir());
        assert!(!temp.path().join("train").exists());
    }
}
