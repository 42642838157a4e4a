//! Drag-and-drop token practice.
//!
//! # Responsibility
//! - Keep a fixed token set split between the tray and the drop zone.
//! - Decide drops with pure rectangle geometry, independent of any UI toolkit.
//! - Derive a SHA-1 digest of the drop-zone contents.
//!
//! # Invariants
//! - Every initial token is in exactly one zone at all times.
//! - The tray keeps original order; the drop zone is sorted case-insensitively.

pub mod board;
pub mod digest;
pub mod drag;
pub mod geometry;
pub mod sorter;

/// Tokens offered when no custom set is supplied.
pub const DEFAULT_TOKENS: [&str; 12] = [
    "orbit", "ember", "solstice", "lumen", "grove", "delta", "radial", "cinder", "kepler",
    "breeze", "cobalt", "zenith",
];

/// The two zones a token can sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Tray,
    Dropped,
}

impl Zone {
    pub fn opposite(self) -> Self {
        match self {
            Self::Tray => Self::Dropped,
            Self::Dropped => Self::Tray,
        }
    }
}
