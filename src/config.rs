//! Run configuration: the optional YAML config file, CLI overrides, and the
//! resolved [`ConvertConfig`].
//!
//! Precedence is CLI flag, then config file, then built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Mot2YoloError;
use crate::mot::ClassTable;
use crate::split::{Split, SplitPolicy, SplitRatios, DEFAULT_SEED};

/// Image extension used by SoccerNet-MOT frames.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Train/valid ratios used by the shuffle policy when none are given.
const DEFAULT_SHUFFLE_RATIOS: SplitRatios = SplitRatios {
    train: 0.8,
    valid: 0.2,
    test: 0.0,
};

/// Split policy names accepted in config files and on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Every frame into one split.
    Single,
    /// Seeded shuffle into train/valid.
    Shuffle,
    /// Frame order kept; train, valid, test segments.
    Chronological,
}

/// The `split:` section of a config file. Also used for CLI overrides.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitSection {
    pub policy: Option<PolicyKind>,
    pub train: Option<f64>,
    pub valid: Option<f64>,
    pub test: Option<f64>,
    pub seed: Option<u64>,
    /// Target split for the single policy.
    pub split: Option<Split>,
}

impl SplitSection {
    /// Fields set in `overrides` win over fields set in `self`.
    pub fn merged(self, overrides: SplitSection) -> SplitSection {
        SplitSection {
            policy: overrides.policy.or(self.policy),
            train: overrides.train.or(self.train),
            valid: overrides.valid.or(self.valid),
            test: overrides.test.or(self.test),
            seed: overrides.seed.or(self.seed),
            split: overrides.split.or(self.split),
        }
    }

    /// Resolve to a concrete policy, filling in defaults.
    ///
    /// When no ratio is given the policy defaults apply. Otherwise a single
    /// missing ratio takes the remainder and any other missing ratio is 0.
    /// The result is not validated here.
    pub fn into_policy(self) -> SplitPolicy {
        let given = [self.train, self.valid, self.test];
        let any_given = given.iter().any(Option::is_some);

        match self.policy.unwrap_or(PolicyKind::Chronological) {
            PolicyKind::Single => SplitPolicy::Single {
                split: self.split.unwrap_or(Split::Test),
            },
            PolicyKind::Shuffle => SplitPolicy::Shuffle {
                ratios: if any_given {
                    fill_ratios([self.train, self.valid, self.test.or(Some(0.0))])
                } else {
                    DEFAULT_SHUFFLE_RATIOS
                },
                seed: self.seed.unwrap_or(DEFAULT_SEED),
            },
            PolicyKind::Chronological => SplitPolicy::Chronological {
                ratios: if any_given {
                    fill_ratios(given)
                } else {
                    SplitRatios::default()
                },
            },
        }
    }
}

fn fill_ratios(given: [Option<f64>; 3]) -> SplitRatios {
    let missing = given.iter().filter(|r| r.is_none()).count();
    let fill = if missing == 1 {
        1.0 - given.iter().flatten().sum::<f64>()
    } else {
        0.0
    };

    let [train, valid, test] = given.map(|r| r.unwrap_or(fill));
    SplitRatios::new(train, valid, test)
}

/// Contents of a YAML config file. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub split: SplitSection,
    pub image_extension: Option<String>,
    /// `sequence-id -> class -> track ids`.
    #[serde(default)]
    pub classes: ClassTable,
}

/// Load a YAML config file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, Mot2YoloError> {
    let data = fs::read_to_string(path).map_err(|source| Mot2YoloError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&data, path)
}

fn parse_config(data: &str, path: &Path) -> Result<ConfigFile, Mot2YoloError> {
    // An empty file is a valid, empty config.
    if data.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(data).map_err(|source| Mot2YoloError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Fully resolved settings for one conversion run.
#[derive(Clone, Debug)]
pub struct ConvertConfig {
    /// Directory holding one subdirectory per sequence.
    pub source: PathBuf,
    /// Output root; one subdirectory per game id.
    pub target: PathBuf,
    pub policy: SplitPolicy,
    /// Frame image extension, without the dot.
    pub image_extension: String,
    pub classes: ClassTable,
}

impl ConvertConfig {
    /// A config with default policy, extension and an empty class table.
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            policy: SplitPolicy::default(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            classes: ClassTable::new(),
        }
    }

    /// Build from a config file plus CLI overrides.
    pub fn from_parts(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        file: ConfigFile,
        split_overrides: SplitSection,
        image_extension: Option<String>,
    ) -> Self {
        let extension = image_extension
            .or(file.image_extension)
            .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());

        Self {
            source: source.into(),
            target: target.into(),
            policy: file.split.merged(split_overrides).into_policy(),
            image_extension: extension.trim_start_matches('.').to_string(),
            classes: file.classes,
        }
    }

    pub fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_classes(mut self, classes: ClassTable) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_image_extension(mut self, extension: impl Into<String>) -> Self {
        self.image_extension = extension.into();
        self
    }

    /// Checks that must pass before any sequence is processed.
    pub fn validate(&self) -> Result<(), Mot2YoloError> {
        self.policy.validate()?;

        if self.image_extension.is_empty() {
            return Err(Mot2YoloError::InvalidConfig {
                message: "image extension must not be empty".to_string(),
            });
        }

        if !self.source.is_dir() {
            return Err(Mot2YoloError::SourceNotFound {
                path: self.source.clone(),
            });
        }

        Ok(())
    }
}
