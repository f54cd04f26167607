//! Coordinate space markers for bounding boxes.
//!
//! Ground-truth rows arrive in absolute pixels while label files hold
//! fractions of the frame size. The markers keep the two apart at compile
//! time so a pixel box can never be written to a label file by accident.

use std::fmt;

/// Absolute pixel coordinates, origin at the top-left corner of the frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates expressed as fractions of the frame width/height.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
