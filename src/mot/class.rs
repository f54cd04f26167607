//! Object classes and the track-id to class resolver.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed detection taxonomy. Discriminants are the YOLO class ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Player = 0,
    Goalkeeper = 1,
    Referee = 2,
    Ball = 3,
}

impl ObjectClass {
    /// All classes in class-id order.
    pub const ALL: [ObjectClass; 4] = [
        ObjectClass::Player,
        ObjectClass::Goalkeeper,
        ObjectClass::Referee,
        ObjectClass::Ball,
    ];

    /// The class id written to label files.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectClass::Player => "player",
            ObjectClass::Goalkeeper => "goalkeeper",
            ObjectClass::Referee => "referee",
            ObjectClass::Ball => "ball",
        }
    }

    /// Tie-break rank when a track is listed under several classes.
    /// Higher wins: ball > referee > goalkeeper > player.
    fn priority(self) -> u8 {
        match self {
            ObjectClass::Player => 0,
            ObjectClass::Goalkeeper => 1,
            ObjectClass::Referee => 2,
            ObjectClass::Ball => 3,
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Object counts per class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub player: usize,
    pub goalkeeper: usize,
    pub referee: usize,
    pub ball: usize,
}

impl ClassCounts {
    pub fn add(&mut self, class: ObjectClass) {
        *self.slot(class) += 1;
    }

    pub fn get(&self, class: ObjectClass) -> usize {
        match class {
            ObjectClass::Player => self.player,
            ObjectClass::Goalkeeper => self.goalkeeper,
            ObjectClass::Referee => self.referee,
            ObjectClass::Ball => self.ball,
        }
    }

    pub fn total(&self) -> usize {
        self.player + self.goalkeeper + self.referee + self.ball
    }

    pub fn merge(&mut self, other: &ClassCounts) {
        for class in ObjectClass::ALL {
            *self.slot(class) += other.get(class);
        }
    }

    fn slot(&mut self, class: ObjectClass) -> &mut usize {
        match class {
            ObjectClass::Player => &mut self.player,
            ObjectClass::Goalkeeper => &mut self.goalkeeper,
            ObjectClass::Referee => &mut self.referee,
            ObjectClass::Ball => &mut self.ball,
        }
    }
}

/// Curated per-sequence class lists, as loaded from configuration.
///
/// `sequence-id -> class -> track ids`. Tracks not listed anywhere are
/// players.
pub type ClassTable = BTreeMap<String, BTreeMap<ObjectClass, Vec<i64>>>;

/// Resolves `(sequence, track)` pairs to an [`ObjectClass`].
///
/// The reverse index is built once, so lookups never rescan the class
/// lists.
#[derive(Clone, Debug, Default)]
pub struct TrackClassResolver {
    sequences: HashMap<String, SequenceClasses>,
    unmapped: SequenceClasses,
}

/// The reverse index for a single sequence.
#[derive(Clone, Debug, Default)]
pub struct SequenceClasses {
    by_track: HashMap<i64, ObjectClass>,
}

impl TrackClassResolver {
    pub fn new(table: &ClassTable) -> Self {
        let sequences = table
            .iter()
            .map(|(sequence, classes)| (sequence.clone(), SequenceClasses::new(classes)))
            .collect();
        Self {
            sequences,
            unmapped: SequenceClasses::default(),
        }
    }

    /// Resolve a single track. Unknown sequences and unlisted tracks are
    /// players.
    pub fn resolve(&self, sequence: &str, track_id: i64) -> ObjectClass {
        self.sequences
            .get(sequence)
            .map(|classes| classes.resolve(track_id))
            .unwrap_or(ObjectClass::Player)
    }

    /// The index for one sequence, taken once per sequence so per-row
    /// lookups skip the sequence-id hash. Empty when the sequence has no
    /// entry.
    pub fn for_sequence(&self, sequence: &str) -> &SequenceClasses {
        self.sequences.get(sequence).unwrap_or(&self.unmapped)
    }

    /// Whether the table has an entry for `sequence`.
    pub fn knows(&self, sequence: &str) -> bool {
        self.sequences.contains_key(sequence)
    }
}

impl SequenceClasses {
    fn new(classes: &BTreeMap<ObjectClass, Vec<i64>>) -> Self {
        let mut by_track: HashMap<i64, ObjectClass> = HashMap::new();
        for (&class, track_ids) in classes {
            for &track_id in track_ids {
                by_track
                    .entry(track_id)
                    .and_modify(|existing| {
                        if class.priority() > existing.priority() {
                            *existing = class;
                        }
                    })
                    .or_insert(class);
            }
        }
        Self { by_track }
    }

    #[inline]
    pub fn resolve(&self, track_id: i64) -> ObjectClass {
        self.by_track
            .get(&track_id)
            .copied()
            .unwrap_or(ObjectClass::Player)
    }

    /// Number of tracks with an explicit (non-default) mapping.
    pub fn len(&self) -> usize {
        self.by_track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_track.is_empty()
    }
}
