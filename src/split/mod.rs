//! Train/valid/test split planning.
//!
//! A plan assigns every frame of a sequence to exactly one split. Three
//! policies are supported:
//!
//! - [`SplitPolicy::Single`]: everything into one split, e.g. an
//!   evaluation-only `test` set.
//! - [`SplitPolicy::Shuffle`]: seeded shuffle, then `floor(N * train)` frames
//!   to train and the rest to valid.
//! - [`SplitPolicy::Chronological`]: frame order kept; train, valid and test
//!   take consecutive segments, with the remainder going to test so no frame
//!   is lost to rounding.

use std::fmt;

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Mot2YoloError;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Allowed slack when checking that ratios sum to one.
const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// Guards `floor(N * ratio)` against binary rounding (0.29 * 100 is
/// 28.999999999999996).
const FLOOR_EPSILON: f64 = 1e-9;

/// A dataset split. The lowercase name is also the output directory name.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Fractions of a sequence's frames per split.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub valid: f64,
    #[serde(default)]
    pub test: f64,
}

impl SplitRatios {
    pub fn new(train: f64, valid: f64, test: f64) -> Self {
        Self { train, valid, test }
    }

    /// Each ratio must lie in `[0, 1]` and together they must sum to 1.
    pub fn validate(&self) -> Result<(), Mot2YoloError> {
        for (name, value) in [
            ("train", self.train),
            ("valid", self.valid),
            ("test", self.test),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Mot2YoloError::InvalidConfig {
                    message: format!("{name} ratio must be within [0, 1], got {value}"),
                });
            }
        }

        let sum = self.train + self.valid + self.test;
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(Mot2YoloError::InvalidConfig {
                message: format!(
                    "split ratios must sum to 1.0, got {} + {} + {} = {}",
                    self.train, self.valid, self.test, sum
                ),
            });
        }

        Ok(())
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self::new(0.7, 0.1, 0.2)
    }
}

/// How frames of a sequence are distributed across splits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitPolicy {
    Single { split: Split },
    Shuffle { ratios: SplitRatios, seed: u64 },
    Chronological { ratios: SplitRatios },
}

impl SplitPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SplitPolicy::Single { .. } => "single",
            SplitPolicy::Shuffle { .. } => "shuffle",
            SplitPolicy::Chronological { .. } => "chronological",
        }
    }

    /// Check the policy before any frame is touched.
    pub fn validate(&self) -> Result<(), Mot2YoloError> {
        match self {
            SplitPolicy::Single { .. } => Ok(()),
            SplitPolicy::Shuffle { ratios, .. } => {
                ratios.validate()?;
                if ratios.test != 0.0 {
                    return Err(Mot2YoloError::InvalidConfig {
                        message: format!(
                            "shuffle policy splits into train/valid only; test ratio must be 0, got {}",
                            ratios.test
                        ),
                    });
                }
                Ok(())
            }
            SplitPolicy::Chronological { ratios } => ratios.validate(),
        }
    }

    /// The splits this policy can assign frames to, in directory order.
    pub fn splits(&self) -> Vec<Split> {
        match self {
            SplitPolicy::Single { split } => vec![*split],
            SplitPolicy::Shuffle { .. } => vec![Split::Train, Split::Valid],
            SplitPolicy::Chronological { .. } => Split::ALL.to_vec(),
        }
    }
}

impl Default for SplitPolicy {
    fn default() -> Self {
        SplitPolicy::Chronological {
            ratios: SplitRatios::default(),
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitPolicy::Single { split } => write!(f, "single ({split})"),
            SplitPolicy::Shuffle { ratios, seed } => write!(
                f,
                "shuffle (train {:.2} / valid {:.2}, seed {})",
                ratios.train, ratios.valid, seed
            ),
            SplitPolicy::Chronological { ratios } => write!(
                f,
                "chronological (train {:.2} / valid {:.2} / test {:.2})",
                ratios.train, ratios.valid, ratios.test
            ),
        }
    }
}

/// Per-frame split assignment, indexed like the frame list it was planned
/// for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitAssignment {
    splits: Vec<Split>,
}

impl SplitAssignment {
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Splits in frame order.
    pub fn iter(&self) -> impl Iterator<Item = Split> + '_ {
        self.splits.iter().copied()
    }

    pub fn count(&self, split: Split) -> usize {
        self.splits.iter().filter(|&&s| s == split).count()
    }

    /// Frame indices assigned to `split`, ascending.
    pub fn indices(&self, split: Split) -> Vec<usize> {
        self.splits
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == split)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn counts(&self) -> SplitCounts {
        SplitCounts {
            train: self.count(Split::Train),
            valid: self.count(Split::Valid),
            test: self.count(Split::Test),
        }
    }
}

/// Frame counts per split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: usize,
    pub valid: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.train + self.valid + self.test
    }

    pub fn merge(&mut self, other: &SplitCounts) {
        self.train += other.train;
        self.valid += other.valid;
        self.test += other.test;
    }
}

/// Assign `n` frames (in frame order) to splits.
///
/// The policy is assumed to be validated; see [`SplitPolicy::validate`].
pub fn plan_splits(n: usize, policy: &SplitPolicy) -> SplitAssignment {
    let splits = match policy {
        SplitPolicy::Single { split } => vec![*split; n],
        SplitPolicy::Shuffle { ratios, seed } => plan_shuffle(n, ratios.train, *seed),
        SplitPolicy::Chronological { ratios } => plan_chronological(n, ratios),
    };
    SplitAssignment { splits }
}

fn plan_shuffle(n: usize, train_ratio: f64, seed: u64) -> Vec<Split> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let n_train = segment_len(n, train_ratio);
    let mut splits = vec![Split::Valid; n];
    for &index in &order[..n_train] {
        splits[index] = Split::Train;
    }
    splits
}

fn plan_chronological(n: usize, ratios: &SplitRatios) -> Vec<Split> {
    let n_train = segment_len(n, ratios.train);
    let n_valid = segment_len(n, ratios.valid).min(n - n_train);

    let mut splits = Vec::with_capacity(n);
    splits.extend(std::iter::repeat_n(Split::Train, n_train));
    splits.extend(std::iter::repeat_n(Split::Valid, n_valid));
    splits.resize(n, Split::Test);
    splits
}

/// `floor(n * ratio)`, capped at `n`.
fn segment_len(n: usize, ratio: f64) -> usize {
    let raw = (n as f64 * ratio + FLOOR_EPSILON).floor();
    (raw.max(0.0) as usize).min(n)
}
