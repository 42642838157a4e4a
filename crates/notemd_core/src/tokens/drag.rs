//! One pointer drag of one token chip.

use super::geometry::{Offset, Rect};
use super::Zone;

/// Drag state from gesture start to release.
///
/// The chip's on-screen bounds are its bounds at gesture start translated by
/// the accumulated pointer offset. Hit tests use the center of those bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    token: String,
    from: Zone,
    start_bounds: Rect,
    offset: Offset,
}

impl DragGesture {
    pub fn start(token: impl Into<String>, from: Zone, start_bounds: Rect) -> Self {
        Self {
            token: token.into(),
            from,
            start_bounds,
            offset: Offset::ZERO,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Zone the chip was picked up from.
    pub fn from(&self) -> Zone {
        self.from
    }

    /// Zone a successful drop would move the chip into.
    pub fn target(&self) -> Zone {
        self.from.opposite()
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn current_bounds(&self) -> Rect {
        self.start_bounds.translate(self.offset)
    }

    /// Accumulates a pointer delta and reports whether the chip now hovers `target`.
    pub fn drag_by(&mut self, delta: Offset, target: Option<Rect>) -> bool {
        self.offset += delta;
        self.is_over(target)
    }

    /// Center-in-rectangle test against the target's last measured bounds.
    ///
    /// An unmeasured target (`None`) is never hit.
    pub fn is_over(&self, target: Option<Rect>) -> bool {
        target.is_some_and(|bounds| bounds.contains(self.current_bounds().center()))
    }
}
