//! Frame discovery and memoized frame-size lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::Mot2YoloError;

/// One image of a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame number parsed from the file stem (`000042.jpg` → 42). `None`
    /// when the stem is not a number; such frames are placed but never
    /// labelled.
    pub frame_id: Option<u32>,
    pub path: PathBuf,
    pub file_name: String,
}

/// List the images directly inside `img_dir` with the given extension
/// (compared case-insensitively), in frame-id order. Frames without a
/// numeric id come last, by file name.
pub fn list_frames(img_dir: &Path, extension: &str) -> Result<Vec<Frame>, Mot2YoloError> {
    let mut frames = Vec::new();

    for entry in WalkDir::new(img_dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|err| {
            Mot2YoloError::Io(err.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("failed to traverse {}", img_dir.display()))
            }))
        })?;

        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let frame_id = entry
            .path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<u32>().ok());

        frames.push(Frame {
            frame_id,
            path: entry.path().to_path_buf(),
            file_name,
        });
    }

    frames.sort_by(|a, b| {
        (a.frame_id.is_none(), a.frame_id, &a.file_name).cmp(&(
            b.frame_id.is_none(),
            b.frame_id,
            &b.file_name,
        ))
    });
    Ok(frames)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Frame sizes for one sequence, decoded at most once per frame.
///
/// Lookups go through the listed frames, so a frame id resolves to the
/// same file that gets copied into the split. A frame whose image is
/// missing or undecodable is remembered as unavailable and never retried.
#[derive(Debug)]
pub struct FrameDimensions {
    paths: HashMap<u32, PathBuf>,
    cache: HashMap<u32, Option<(u32, u32)>>,
}

impl FrameDimensions {
    /// Index `frames` by frame id. When two files share an id, the first
    /// in list order wins.
    pub fn new(frames: &[Frame]) -> Self {
        let mut paths = HashMap::with_capacity(frames.len());
        for frame in frames {
            if let Some(id) = frame.frame_id {
                paths.entry(id).or_insert_with(|| frame.path.clone());
            }
        }

        Self {
            paths,
            cache: HashMap::new(),
        }
    }

    /// `(width, height)` of the frame image, or `None` if unavailable.
    pub fn get(&mut self, frame_id: u32) -> Option<(u32, u32)> {
        if let Some(&cached) = self.cache.get(&frame_id) {
            return cached;
        }

        let dims = match self.paths.get(&frame_id) {
            Some(path) => {
                let dims = read_dimensions(path);
                if dims.is_none() {
                    debug!("frame {} has no usable image at {}", frame_id, path.display());
                }
                dims
            }
            None => {
                debug!("frame {} has no image", frame_id);
                None
            }
        };

        self.cache.insert(frame_id, dims);
        dims
    }

    /// Number of distinct frames looked up whose size was unavailable.
    pub fn unavailable_count(&self) -> usize {
        self.cache.values().filter(|dims| dims.is_none()).count()
    }
}

fn read_dimensions(path: &Path) -> Option<(u32, u32)> {
    if !path.is_file() {
        return None;
    }

    let size = imagesize::size(path).ok()?;
    let width = u32::try_from(size.width).ok()?;
    let height = u32::try_from(size.height).ok()?;

    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}
