//! Token board: sorter plus drag plumbing.
//!
//! # Responsibility
//! - Remember the last measured bounds of both zones.
//! - Route drag start/move/end/cancel events into [`DragGesture`]s.
//! - Apply hits to the [`TokenSorter`] and keep zone highlight flags.
//!
//! # Invariants
//! - At most one active gesture per token.
//! - Ending or cancelling a drag always clears its offset and the highlight.

use super::drag::DragGesture;
use super::geometry::{Offset, Rect};
use super::sorter::TokenSorter;
use super::Zone;
use log::debug;
use std::collections::HashMap;

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The chip's center was inside the target zone; the token moved.
    Transferred { token: String, to: Zone },
    /// Released outside the target zone; the chip snaps back.
    Missed { token: String },
    /// No active drag for that token.
    NoGesture,
}

#[derive(Debug, Clone, Default)]
pub struct TokenBoard {
    sorter: TokenSorter,
    tray_bounds: Option<Rect>,
    drop_bounds: Option<Rect>,
    tray_highlighted: bool,
    drop_highlighted: bool,
    gestures: HashMap<String, DragGesture>,
}

impl TokenBoard {
    pub fn new(sorter: TokenSorter) -> Self {
        Self {
            sorter,
            tray_bounds: None,
            drop_bounds: None,
            tray_highlighted: false,
            drop_highlighted: false,
            gestures: HashMap::new(),
        }
    }

    pub fn sorter(&self) -> &TokenSorter {
        &self.sorter
    }

    /// Records the latest layout bounds of `zone`.
    pub fn measure_zone(&mut self, zone: Zone, bounds: Rect) {
        match zone {
            Zone::Tray => self.tray_bounds = Some(bounds),
            Zone::Dropped => self.drop_bounds = Some(bounds),
        }
    }

    pub fn zone_bounds(&self, zone: Zone) -> Option<Rect> {
        match zone {
            Zone::Tray => self.tray_bounds,
            Zone::Dropped => self.drop_bounds,
        }
    }

    /// Whether `zone` should render its hover highlight.
    pub fn is_highlighted(&self, zone: Zone) -> bool {
        match zone {
            Zone::Tray => self.tray_highlighted,
            Zone::Dropped => self.drop_highlighted,
        }
    }

    /// Visual offset to apply to a chip; zero when it is not being dragged.
    pub fn drag_offset(&self, token: &str) -> Offset {
        self.gestures
            .get(token)
            .map_or(Offset::ZERO, DragGesture::offset)
    }

    /// Starts dragging `token` whose chip currently occupies `chip_bounds`.
    ///
    /// Returns `false` for unknown tokens or a token that is already being dragged.
    pub fn begin_drag(&mut self, token: &str, chip_bounds: Rect) -> bool {
        let Some(from) = self.sorter.zone_of(token) else {
            return false;
        };
        if self.gestures.contains_key(token) {
            return false;
        }
        self.set_highlight(from.opposite(), false);
        self.gestures
            .insert(token.to_string(), DragGesture::start(token, from, chip_bounds));
        true
    }

    /// Applies a pointer delta; returns whether the chip hovers the opposite zone.
    pub fn drag_by(&mut self, token: &str, delta: Offset) -> Option<bool> {
        let (target, hovering) = {
            let gesture = self.gestures.get_mut(token)?;
            let target = gesture.target();
            let bounds = match target {
                Zone::Tray => self.tray_bounds,
                Zone::Dropped => self.drop_bounds,
            };
            (target, gesture.drag_by(delta, bounds))
        };
        self.set_highlight(target, hovering);
        Some(hovering)
    }

    /// Releases the drag and transfers the token on a hit.
    pub fn end_drag(&mut self, token: &str) -> DragOutcome {
        let Some(gesture) = self.gestures.remove(token) else {
            return DragOutcome::NoGesture;
        };
        let target = gesture.target();
        self.set_highlight(target, false);

        if gesture.is_over(self.zone_bounds(target)) && self.sorter.move_to(token, target) {
            debug!("event=token_drop module=tokens status=hit to={target:?}");
            DragOutcome::Transferred {
                token: token.to_string(),
                to: target,
            }
        } else {
            debug!("event=token_drop module=tokens status=miss to={target:?}");
            DragOutcome::Missed {
                token: token.to_string(),
            }
        }
    }

    /// Aborts the drag without moving the token.
    pub fn cancel_drag(&mut self, token: &str) -> bool {
        match self.gestures.remove(token) {
            Some(gesture) => {
                self.set_highlight(gesture.target(), false);
                true
            }
            None => false,
        }
    }

    /// A tap on a dropped chip sends it back to the tray.
    pub fn tap_dropped(&mut self, token: &str) -> bool {
        if self.gestures.contains_key(token) {
            return false;
        }
        self.sorter.move_to_tray(token)
    }

    /// Returns every token to the tray and drops in-flight gestures.
    pub fn reset(&mut self) {
        self.gestures.clear();
        self.tray_highlighted = false;
        self.drop_highlighted = false;
        self.sorter.reset();
    }

    fn set_highlight(&mut self, zone: Zone, on: bool) {
        match zone {
            Zone::Tray => self.tray_highlighted = on,
            Zone::Dropped => self.drop_highlighted = on,
        }
    }
}
