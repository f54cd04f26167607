#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

/// Write a BMP image. The size sniffer goes by content, so the file may be
/// named `.jpg`.
pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Builder for a synthetic SoccerNet-MOT sequence directory.
pub struct SequenceBuilder {
    dir: PathBuf,
    game_id: Option<String>,
    gt: Option<String>,
    frames: u32,
    width: u32,
    height: u32,
    with_img_dir: bool,
}

impl SequenceBuilder {
    pub fn new(source: &Path, name: &str) -> Self {
        Self {
            dir: source.join(name),
            game_id: Some("1".to_string()),
            gt: Some(String::new()),
            frames: 0,
            width: 100,
            height: 50,
            with_img_dir: true,
        }
    }

    pub fn game_id(mut self, id: &str) -> Self {
        self.game_id = Some(id.to_string());
        self
    }

    pub fn without_gameinfo(mut self) -> Self {
        self.game_id = None;
        self
    }

    pub fn without_gt(mut self) -> Self {
        self.gt = None;
        self
    }

    pub fn without_img_dir(mut self) -> Self {
        self.with_img_dir = false;
        self
    }

    pub fn gt(mut self, rows: &str) -> Self {
        self.gt = Some(rows.to_string());
        self
    }

    /// `count` frames named `000001.jpg..`, all `width`x`height`.
    pub fn frames(mut self, count: u32, width: u32, height: u32) -> Self {
        self.frames = count;
        self.width = width;
        self.height = height;
        self
    }

    pub fn build(self) -> PathBuf {
        fs::create_dir_all(&self.dir).expect("create sequence dir");

        if let Some(id) = &self.game_id {
            fs::write(
                self.dir.join("gameinfo.ini"),
                format!("[Sequence]\nname=test\ngameID={id}\nnum_tracklets=2\n"),
            )
            .expect("write gameinfo");
        }

        if let Some(rows) = &self.gt {
            fs::create_dir_all(self.dir.join("gt")).expect("create gt dir");
            fs::write(self.dir.join("gt/gt.txt"), rows).expect("write gt");
        }

        if self.with_img_dir {
            let img_dir = self.dir.join("img1");
            fs::create_dir_all(&img_dir).expect("create img1");
            for frame in 1..=self.frames {
                write_bmp(
                    &img_dir.join(format!("{frame:06}.jpg")),
                    self.width,
                    self.height,
                );
            }
        }

        self.dir
    }
}

/// Sorted file names directly inside `dir`; empty if it does not exist.
pub fn list_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
