use flapgen::anim::flap::{BoardParams, FlapBoard, GlyphPhase};
use flapgen::foundation::core::FrameIndex;

#[test]
fn default_board_has_promo_shape() {
    let board = FlapBoard::new(BoardParams::default()).unwrap();
    assert_eq!(board.params().total_frames(), 120);
    // DOWNLOAD + NOW
    assert_eq!(board.cards().len(), 11);
    let targets: String = board.cards().iter().map(|c| c.target).collect();
    assert_eq!(targets, "DOWNLOADNOW");
}

#[test]
fn frame_zero_glyph_sequence_is_reproducible() {
    let a = FlapBoard::new(BoardParams::default()).unwrap();
    let b = FlapBoard::new(BoardParams::default()).unwrap();
    let seq_a: Vec<char> = (0..a.cards().len())
        .map(|c| a.card_state(FrameIndex(0), c).glyph)
        .collect();
    let seq_b: Vec<char> = (0..b.cards().len())
        .map(|c| b.card_state(FrameIndex(0), c).glyph)
        .collect();
    assert_eq!(seq_a, seq_b);
}

#[test]
fn all_cards_settle_on_their_targets() {
    let board = FlapBoard::new(BoardParams::default()).unwrap();
    let total = board.params().total_frames();
    let last = FrameIndex(total - 1);
    for (i, card) in board.cards().iter().enumerate() {
        let state = board.card_state(last, i);
        assert_eq!(state.phase, GlyphPhase::Settled, "card {i}");
        assert_eq!(state.glyph, card.target, "card {i}");
    }
}

#[test]
fn changing_the_seed_changes_the_flutter() {
    let a = FlapBoard::new(BoardParams::default()).unwrap();
    let b = FlapBoard::new(BoardParams {
        seed: 43,
        ..BoardParams::default()
    })
    .unwrap();
    let stream = |board: &FlapBoard| -> Vec<char> {
        (0..30)
            .flat_map(|f| {
                (0..board.cards().len())
                    .map(|c| board.card_state(FrameIndex(f), c).glyph)
                    .collect::<Vec<_>>()
            })
            .collect()
    };
    assert_ne!(stream(&a), stream(&b));
}
