//! Logical and physical window geometry.

use crate::scale::ScaleFactor;
use serde::{Deserialize, Serialize};

/// Content size in CSS pixels as reported by the embedded UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A size counts as known once both dimensions are non-zero.
    pub fn is_known(&self) -> bool {
        self.width != 0.0 && self.height != 0.0 && !self.width.is_nan() && !self.height.is_nan()
    }

    /// `round(logical * scale)` per axis, floored at one pixel.
    pub fn to_physical(self, scale: ScaleFactor) -> PhysicalSize {
        PhysicalSize {
            width: scale_axis(self.width, scale.get()),
            height: scale_axis(self.height, scale.get()),
        }
    }
}

fn scale_axis(logical: f64, scale: f64) -> u32 {
    let scaled = (logical * scale).round();
    if scaled.is_nan() || scaled < 1.0 {
        1
    } else if scaled >= u32::MAX as f64 {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Native window content size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Last reported logical size; empty until the first report.
#[derive(Debug, Clone, Default)]
pub struct LogicalSizeStore {
    last: Option<LogicalSize>,
}

impl LogicalSizeStore {
    /// Latest report wins, including degenerate sizes.
    pub fn report(&mut self, size: LogicalSize) {
        self.last = Some(size);
    }

    pub fn get(&self) -> Option<LogicalSize> {
        self.last
    }

    /// The stored size, if it is usable for a resize.
    pub fn known(&self) -> Option<LogicalSize> {
        self.last.filter(LogicalSize::is_known)
    }
}

/// Screen-space rectangle, as returned by bounds queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Screen-space point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Region of the window shown in the taskbar thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
