//! SoccerNet-MOT sequence inputs and YOLO label outputs.
//!
//! A sequence directory looks like:
//!
//! ```text
//! SNMOT-116/
//!   gameinfo.ini      # gameID=<id>
//!   gt/gt.txt         # frame,track,x,y,w,h,...
//!   img1/000001.jpg   # one image per frame
//! ```
//!
//! The modules here read those pieces and turn them into normalized,
//! classified label records. Directory layout and split placement live in
//! [`crate::conversion`].
//!
//! # Example
//!
//! ```
//! use mot2yolo::mot::{label, LabelRecord, ObjectClass, PixelBox};
//!
//! let bbox = PixelBox::new(100.0, 200.0, 50.0, 80.0)
//!     .normalize_clamped(1000.0, 500.0)
//!     .expect("box inside frame");
//! let line = label::format_label_line(&LabelRecord { class: ObjectClass::Player, bbox });
//! assert_eq!(line, "0 0.125000 0.480000 0.050000 0.160000\n");
//! ```

mod bbox;
pub mod class;
pub mod frame;
pub mod gameinfo;
pub mod gt;
pub mod label;
mod space;

pub use bbox::{BBoxCXCYWH, BBoxXYWH, NormalizedBox, PixelBox};
pub use class::{ClassCounts, ClassTable, ObjectClass, SequenceClasses, TrackClassResolver};
pub use frame::{Frame, FrameDimensions};
pub use gt::{GroundTruth, GtRow};
pub use label::{LabelRecord, LabelSet};
pub use space::{Normalized, Pixel};
