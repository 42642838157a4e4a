//! Tray / drop-zone state machine.
//!
//! # Invariants
//! - `tray ∩ dropped = ∅` and `tray ∪ dropped = initial set` after any sequence
//!   of moves and resets.
//! - The tray is always in original index order.
//! - The drop zone is sorted case-insensitively; ties keep original order.

use super::digest::{normalized_text, tokens_digest};
use super::Zone;
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    DuplicateToken(String),
    EmptyToken,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateToken(token) => write!(f, "token `{token}` appears more than once"),
            Self::EmptyToken => write!(f, "tokens must not be empty"),
        }
    }
}

impl Error for TokenError {}

/// Token collection split between the tray and the drop zone.
#[derive(Debug, Clone)]
pub struct TokenSorter {
    initial: Vec<String>,
    order: HashMap<String, usize>,
    tray: Vec<String>,
    dropped: Vec<String>,
}

impl TokenSorter {
    /// Starts with every token in the tray.
    ///
    /// # Errors
    /// - `EmptyToken` for a blank label.
    /// - `DuplicateToken` when a label repeats; zones are keyed by label.
    pub fn new<I, S>(tokens: I) -> Result<Self, TokenError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let initial: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut order = HashMap::with_capacity(initial.len());
        for (index, token) in initial.iter().enumerate() {
            if token.trim().is_empty() {
                return Err(TokenError::EmptyToken);
            }
            if order.insert(token.clone(), index).is_some() {
                return Err(TokenError::DuplicateToken(token.clone()));
            }
        }
        Ok(Self {
            tray: initial.clone(),
            initial,
            order,
            dropped: Vec::new(),
        })
    }

    /// Sorter over [`super::DEFAULT_TOKENS`].
    pub fn with_defaults() -> Self {
        let initial: Vec<String> = super::DEFAULT_TOKENS.iter().map(|t| t.to_string()).collect();
        let order = initial
            .iter()
            .enumerate()
            .map(|(index, token)| (token.clone(), index))
            .collect();
        Self {
            tray: initial.clone(),
            initial,
            order,
            dropped: Vec::new(),
        }
    }

    pub fn initial(&self) -> &[String] {
        &self.initial
    }

    pub fn tray(&self) -> &[String] {
        &self.tray
    }

    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Zone currently holding `token`; `None` for unknown labels.
    pub fn zone_of(&self, token: &str) -> Option<Zone> {
        if self.dropped.iter().any(|t| t == token) {
            Some(Zone::Dropped)
        } else if self.tray.iter().any(|t| t == token) {
            Some(Zone::Tray)
        } else {
            None
        }
    }

    /// Moves `token` from the tray into the drop zone.
    ///
    /// Returns `false` (no change) if it is not in the tray or already dropped.
    pub fn move_to_dropped(&mut self, token: &str) -> bool {
        if self.dropped.iter().any(|t| t == token) {
            return false;
        }
        let Some(position) = self.tray.iter().position(|t| t == token) else {
            return false;
        };
        let moved = self.tray.remove(position);
        self.dropped.push(moved);
        self.sort_dropped();
        debug!(
            "event=token_move module=tokens status=ok to=dropped tray={} dropped={}",
            self.tray.len(),
            self.dropped.len()
        );
        true
    }

    /// Moves `token` back into the tray at its original position.
    ///
    /// Returns `false` (no change) if it is not in the drop zone.
    pub fn move_to_tray(&mut self, token: &str) -> bool {
        let Some(position) = self.dropped.iter().position(|t| t == token) else {
            return false;
        };
        let moved = self.dropped.remove(position);
        let rank = self.rank(&moved);
        let insert_at = self.tray.partition_point(|t| self.rank(t) < rank);
        self.tray.insert(insert_at, moved);
        debug!(
            "event=token_move module=tokens status=ok to=tray tray={} dropped={}",
            self.tray.len(),
            self.dropped.len()
        );
        true
    }

    /// Moves `token` into `zone`; `false` when nothing changed.
    pub fn move_to(&mut self, token: &str, zone: Zone) -> bool {
        match zone {
            Zone::Dropped => self.move_to_dropped(token),
            Zone::Tray => self.move_to_tray(token),
        }
    }

    /// Puts every token back into the tray in original order.
    pub fn reset(&mut self) {
        self.tray = self.initial.clone();
        self.dropped.clear();
    }

    /// True when nothing has been moved, i.e. a reset would change nothing.
    pub fn is_pristine(&self) -> bool {
        self.dropped.is_empty() && self.tray.len() == self.initial.len()
    }

    /// Space-joined, lowercased, sorted drop-zone text.
    pub fn normalized_text(&self) -> String {
        normalized_text(&self.dropped)
    }

    /// SHA-1 hex of [`Self::normalized_text`]; `None` while the drop zone is empty.
    pub fn digest(&self) -> Option<String> {
        tokens_digest(&self.dropped)
    }

    fn rank(&self, token: &str) -> usize {
        self.order.get(token).copied().unwrap_or(usize::MAX)
    }

    fn sort_dropped(&mut self) {
        let order = &self.order;
        // Equal lowercase keys fall back to original index.
        self.dropped.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| order.get(a).cmp(&order.get(b)))
        });
    }
}

impl Default for TokenSorter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenError, TokenSorter};
    use crate::tokens::digest::sha1_hex;
    use crate::tokens::Zone;
    use std::collections::BTreeSet;

    fn assert_partition(sorter: &TokenSorter) {
        let tray: BTreeSet<_> = sorter.tray().iter().collect();
        let dropped: BTreeSet<_> = sorter.dropped().iter().collect();
        let all: BTreeSet<_> = sorter.initial().iter().collect();
        assert!(tray.is_disjoint(&dropped));
        assert_eq!(tray.union(&dropped).copied().collect::<BTreeSet<_>>(), all);
        assert_eq!(sorter.tray().len() + sorter.dropped().len(), all.len());
    }

    #[test]
    fn rejects_duplicates_and_blanks() {
        assert_eq!(
            TokenSorter::new(["a", "b", "a"]).unwrap_err(),
            TokenError::DuplicateToken("a".to_string())
        );
        assert_eq!(
            TokenSorter::new(["a", " "]).unwrap_err(),
            TokenError::EmptyToken
        );
    }

    #[test]
    fn drop_is_idempotent() {
        let mut sorter = TokenSorter::new(["a", "b"]).unwrap();
        assert!(sorter.move_to_dropped("a"));
        assert!(!sorter.move_to_dropped("a"));
        assert!(!sorter.move_to_dropped("missing"));
        assert_eq!(sorter.dropped(), ["a"]);
        assert_eq!(sorter.tray(), ["b"]);
        assert_partition(&sorter);
    }

    #[test]
    fn returning_token_restores_original_position() {
        let mut sorter = TokenSorter::with_defaults();
        sorter.move_to_dropped("lumen");
        sorter.move_to_dropped("orbit");
        sorter.move_to_dropped("zenith");
        sorter.move_to_tray("lumen");
        sorter.move_to_tray("zenith");
        sorter.move_to_tray("orbit");
        assert_eq!(sorter.tray(), sorter.initial());
        assert!(sorter.is_pristine());
    }

    #[test]
    fn dropped_zone_sorts_case_insensitively() {
        let mut sorter = TokenSorter::new(["delta", "Bravo", "alpha", "Charlie"]).unwrap();
        for token in ["delta", "Charlie", "alpha", "Bravo"] {
            sorter.move_to_dropped(token);
        }
        assert_eq!(sorter.dropped(), ["alpha", "Bravo", "Charlie", "delta"]);
        assert_eq!(sorter.normalized_text(), "alpha bravo charlie delta");
    }

    #[test]
    fn digest_is_independent_of_transfer_order() {
        let mut first = TokenSorter::new(["b", "A", "c"]).unwrap();
        first.move_to("b", Zone::Dropped);
        first.move_to("A", Zone::Dropped);

        let mut second = TokenSorter::new(["b", "A", "c"]).unwrap();
        second.move_to("A", Zone::Dropped);
        second.move_to("b", Zone::Dropped);

        assert_eq!(first.normalized_text(), "a b");
        assert_eq!(first.digest(), Some(sha1_hex("a b")));
        assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn empty_drop_zone_has_no_digest() {
        let mut sorter = TokenSorter::with_defaults();
        assert_eq!(sorter.digest(), None);
        sorter.move_to_dropped("ember");
        assert!(sorter.digest().is_some());
        sorter.reset();
        assert_eq!(sorter.digest(), None);
        assert!(sorter.is_pristine());
    }

    #[test]
    fn partition_holds_over_mixed_sequence() {
        let mut sorter = TokenSorter::with_defaults();
        let script = [
            ("kepler", Zone::Dropped),
            ("orbit", Zone::Dropped),
            ("kepler", Zone::Dropped),
            ("orbit", Zone::Tray),
            ("orbit", Zone::Tray),
            ("zenith", Zone::Dropped),
            ("nope", Zone::Dropped),
            ("cobalt", Zone::Dropped),
            ("kepler", Zone::Tray),
        ];
        for (step, (token, zone)) in script.iter().enumerate() {
            sorter.move_to(token, *zone);
            assert_partition(&sorter);
            if step == 5 {
                sorter.reset();
                assert_partition(&sorter);
            }
        }
        assert_eq!(sorter.zone_of("cobalt"), Some(Zone::Dropped));
        assert_eq!(sorter.zone_of("nope"), None);
    }
}
