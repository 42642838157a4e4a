use notemd_core::tokens::digest::sha1_hex;
use notemd_core::{DragOutcome, Offset, Rect, TokenBoard, TokenSorter, Zone, DEFAULT_TOKENS};
use std::collections::BTreeSet;

fn laid_out_board() -> TokenBoard {
    let mut board = TokenBoard::new(TokenSorter::with_defaults());
    board.measure_zone(Zone::Tray, Rect::from_origin_size(Offset::ZERO, 360.0, 120.0));
    board.measure_zone(
        Zone::Dropped,
        Rect::from_origin_size(Offset::new(0.0, 140.0), 360.0, 200.0),
    );
    board
}

fn chip_at(x: f32, y: f32) -> Rect {
    Rect::from_origin_size(Offset::new(x, y), 60.0, 24.0)
}

fn drag_into_drop_zone(board: &mut TokenBoard, token: &str) -> DragOutcome {
    board.begin_drag(token, chip_at(8.0, 8.0));
    board.drag_by(token, Offset::new(10.0, 80.0));
    board.drag_by(token, Offset::new(10.0, 80.0));
    board.end_drag(token)
}

#[test]
fn default_board_starts_pristine_without_digest() {
    let board = laid_out_board();
    assert_eq!(board.sorter().tray(), DEFAULT_TOKENS);
    assert!(board.sorter().is_pristine());
    assert_eq!(board.sorter().digest(), None);
}

#[test]
fn drag_drop_updates_digest_of_sorted_tokens() {
    let mut board = laid_out_board();
    assert!(matches!(
        drag_into_drop_zone(&mut board, "zenith"),
        DragOutcome::Transferred { to: Zone::Dropped, .. }
    ));
    assert_eq!(drag_into_drop_zone(&mut board, "Orbit"), DragOutcome::NoGesture);
    assert!(matches!(
        drag_into_drop_zone(&mut board, "ember"),
        DragOutcome::Transferred { .. }
    ));
    assert_eq!(board.sorter().dropped(), ["ember", "zenith"]);
    assert_eq!(board.sorter().normalized_text(), "ember zenith");
    assert_eq!(board.sorter().digest(), Some(sha1_hex("ember zenith")));
}

#[test]
fn round_trip_restores_tray_order() {
    let mut board = laid_out_board();
    drag_into_drop_zone(&mut board, "grove");
    drag_into_drop_zone(&mut board, "orbit");
    assert_eq!(board.sorter().tray().len(), DEFAULT_TOKENS.len() - 2);

    board.begin_drag("grove", chip_at(8.0, 200.0));
    board.drag_by("grove", Offset::new(0.0, -150.0));
    board.end_drag("grove");
    board.tap_dropped("orbit");

    assert_eq!(board.sorter().tray(), DEFAULT_TOKENS);
}

#[test]
fn partition_invariant_holds_under_random_walk() {
    let mut sorter = TokenSorter::with_defaults();
    let all: BTreeSet<String> = DEFAULT_TOKENS.iter().map(|t| t.to_string()).collect();
    // Fixed LCG keeps the walk reproducible.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    for _ in 0..500 {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let token = DEFAULT_TOKENS[(seed >> 33) as usize % DEFAULT_TOKENS.len()];
        match (seed >> 20) % 7 {
            0 => sorter.reset(),
            1..=3 => {
                sorter.move_to(token, Zone::Dropped);
            }
            _ => {
                sorter.move_to(token, Zone::Tray);
            }
        }

        let tray: BTreeSet<String> = sorter.tray().iter().cloned().collect();
        let dropped: BTreeSet<String> = sorter.dropped().iter().cloned().collect();
        assert!(tray.is_disjoint(&dropped));
        assert_eq!(&tray | &dropped, all);
        assert_eq!(tray.len() + dropped.len(), all.len());

        let tray_indices: Vec<usize> = sorter
            .tray()
            .iter()
            .map(|t| DEFAULT_TOKENS.iter().position(|d| *d == t.as_str()).unwrap())
            .collect();
        assert!(tray_indices.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn digest_of_b_and_upper_a_matches_a_b() {
    let mut forward = TokenSorter::new(["b", "A"]).unwrap();
    forward.move_to_dropped("b");
    forward.move_to_dropped("A");
    let mut backward = TokenSorter::new(["b", "A"]).unwrap();
    backward.move_to_dropped("A");
    backward.move_to_dropped("b");

    assert_eq!(forward.normalized_text(), "a b");
    assert_eq!(forward.digest(), backward.digest());
    assert_eq!(forward.digest(), Some(sha1_hex("a b")));
}
