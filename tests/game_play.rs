// tests/game_play.rs
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use click_chess::{Board, CastleSide, Color, Game, GameEvent, LoadPolicy, MoveNotification, Piece, PieceKind, Square};

fn sq(row: u8, col: u8) -> Square { Square::new(row, col) }

/// Plays each pair through both selection phases, panicking on the first rejection.
fn play(game: &mut Game, moves: &[((u8, u8), (u8, u8))]) {
    for &((fr, fc), (tr, tc)) in moves {
        let (from, to) = (sq(fr, fc), sq(tr, tc));
        assert!(game.try_select_origin(from), "bad selection {:?}", from);
        assert!(game.is_legal_destination(from, to), "illegal {:?} -> {:?}", from, to);
        let was_white = game.is_white_turn();
        assert!(game.commit_move(from, to), "commit failed {:?} -> {:?}", from, to);
        assert_ne!(game.is_white_turn(), was_white);
    }
}

fn record_moves(game: &mut Game) -> Rc<RefCell<Vec<MoveNotification>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    game.subscribe(Box::new(move |event| {
        if let GameEvent::Moved(n) = event {
            sink.borrow_mut().push(n.clone());
        }
    }));
    seen
}

fn game_from(pieces: &[(PieceKind, Color, u8, u8)], white_turn: bool) -> Game {
    let board = Board::from_pieces(pieces.iter().map(|&(k, c, r, col)| Piece::new(k, c, sq(r, col))));
    Game::from_board(board, white_turn)
}

#[test]
fn fools_mate_reports_checkmate() {
    let mut game = Game::new();
    let seen = record_moves(&mut game);
    play(&mut game, &[
        ((6, 5), (5, 5)), // f3
        ((1, 4), (3, 4)), // e5
        ((6, 6), (4, 6)), // g4
        ((0, 3), (4, 7)), // Qh4#
    ]);
    let seen = seen.borrow();
    let last = seen.last().unwrap();
    assert!(last.gives_check);
    assert!(last.is_checkmate);
    assert_eq!(last.glyph, "\u{265B}");
    assert!(seen[..3].iter().all(|n| !n.is_checkmate));
    assert!(game.is_checkmate(Color::White));
}

#[test]
fn check_that_can_be_blocked_is_not_mate() {
    let mut game = Game::new();
    let seen = record_moves(&mut game);
    play(&mut game, &[
        ((6, 5), (4, 5)), // f4
        ((1, 4), (3, 4)), // e5
        ((6, 4), (4, 4)), // e4
        ((0, 3), (4, 7)), // Qh4+, g3 or Ke2 still available
    ]);
    let last = seen.borrow().last().cloned().unwrap();
    assert!(last.gives_check);
    assert!(!last.is_checkmate);
    assert!(game.is_in_check(Color::White));
    // Only moves that resolve the check are offered.
    assert!(!game.is_legal_destination(sq(6, 0), sq(5, 0)));
    assert!(game.is_legal_destination(sq(6, 6), sq(5, 6)));
    assert!(game.is_legal_destination(sq(7, 4), sq(6, 4)));
}

#[test]
fn opening_sequence_ending_in_long_castle() {
    let mut game = Game::new();
    let seen = record_moves(&mut game);
    play(&mut game, &[
        ((7, 1), (5, 0)), ((1, 0), (3, 0)),
        ((6, 1), (4, 1)), ((1, 1), (3, 1)),
        ((7, 2), (6, 1)), ((1, 2), (3, 2)),
        ((6, 2), (4, 2)), ((1, 3), (3, 3)),
        ((7, 3), (6, 2)), ((1, 4), (3, 4)),
        ((7, 4), (7, 0)), // king onto rook
    ]);
    let castle = seen.borrow().last().cloned().unwrap();
    assert!(castle.is_castle);
    assert_eq!(castle.king_after, Some(sq(7, 2)));
    assert_eq!(castle.rook_after, Some(sq(7, 3)));
    assert_eq!(castle.glyph, "");
    assert_eq!(game.piece_glyph_at(sq(7, 2)), "\u{2654}");
    assert_eq!(game.piece_glyph_at(sq(7, 3)), "\u{2656}");
    assert_eq!(game.piece_glyph_at(sq(7, 0)), "");
    assert!(!game.is_white_turn());
}

#[test]
fn castling_out_of_check_is_rejected() {
    let mut game = game_from(&[
        (PieceKind::King, Color::White, 7, 4),
        (PieceKind::Rook, Color::White, 7, 7),
        (PieceKind::Rook, Color::Black, 2, 4),
        (PieceKind::King, Color::Black, 0, 0),
    ], true);
    assert!(game.is_in_check(Color::White));
    assert!(game.castle_plan(sq(7, 4), sq(7, 7)).is_none());
    assert!(!game.is_legal_destination(sq(7, 4), sq(7, 7)));
    let before = game.save();
    assert!(!game.commit_move(sq(7, 4), sq(7, 7)));
    assert_eq!(game.save(), before);
    // Stepping off the file is fine.
    assert!(game.commit_move(sq(7, 4), sq(7, 3)));
}

#[test]
fn pawn_captures_trade_material() {
    let mut game = Game::new();
    play(&mut game, &[
        ((6, 3), (4, 3)), ((1, 4), (3, 4)),
        ((4, 3), (3, 4)), // dxe5
        ((1, 3), (3, 3)),
        ((3, 4), (2, 4)),
        ((1, 5), (2, 4)), // fxe6
    ]);
    let board = game.board();
    assert_eq!(board.squares_of(Color::White).len(), 15);
    assert_eq!(board.squares_of(Color::Black).len(), 15);
    assert_eq!(game.piece_at(sq(2, 4)).map(|p| p.color()), Some(Color::Black));
    assert!(board.is_consistent());
}

#[test]
fn pawn_walks_to_last_rank_and_becomes_queen() {
    let mut game = Game::new();
    let seen = record_moves(&mut game);
    play(&mut game, &[
        ((6, 2), (4, 2)), ((1, 1), (3, 1)),
        ((4, 2), (3, 1)), ((0, 1), (2, 2)),
        ((3, 1), (2, 1)), ((1, 0), (3, 0)),
        ((2, 1), (1, 1)), ((3, 0), (4, 0)),
        ((1, 1), (0, 1)), // b8=Q
    ]);
    let queen = game.piece_at(sq(0, 1)).unwrap();
    assert_eq!((queen.kind(), queen.color()), (PieceKind::Queen, Color::White));
    assert!(queen.has_moved());
    assert_eq!(seen.borrow().last().unwrap().glyph, "\u{2655}");
    assert!(game.board().squares_of(Color::White).contains(&sq(0, 1)));
    assert!(game.board().is_consistent());
    assert!(game.save().contains("\n0 1 Q true\n"));
}

#[test]
fn black_pawn_promotes_on_row_seven() {
    let mut game = game_from(&[
        (PieceKind::Pawn, Color::Black, 6, 1),
        (PieceKind::King, Color::Black, 0, 0),
        (PieceKind::King, Color::White, 4, 7),
    ], false);
    let seen = record_moves(&mut game);
    play(&mut game, &[((6, 1), (7, 1))]);
    let queen = game.piece_at(sq(7, 1)).unwrap();
    assert_eq!((queen.kind(), queen.color()), (PieceKind::Queen, Color::Black));
    assert_eq!(seen.borrow().last().unwrap().glyph, "\u{265B}");
    assert!(game.board().is_consistent());
    assert!(game.save().contains("\n7 1 Q false\n"));
}

#[test]
fn black_short_castle_with_rook_clicked_first() {
    let mut game = game_from(&[
        (PieceKind::King, Color::Black, 0, 4),
        (PieceKind::Rook, Color::Black, 0, 7),
        (PieceKind::King, Color::White, 7, 4),
    ], false);
    let seen = record_moves(&mut game);
    let plan = game.castle_plan(sq(0, 7), sq(0, 4)).expect("castle available");
    assert_eq!(plan.side, CastleSide::Short);
    play(&mut game, &[((0, 7), (0, 4))]);

    let castle = seen.borrow().last().cloned().unwrap();
    assert!(castle.is_castle);
    assert_eq!(castle.king_after, Some(sq(0, 6)));
    assert_eq!(castle.rook_after, Some(sq(0, 5)));
    assert_eq!(game.piece_glyph_at(sq(0, 6)), "\u{265A}");
    assert_eq!(game.piece_glyph_at(sq(0, 5)), "\u{265C}");
    assert!(game.is_white_turn());
}

#[test]
fn rook_is_blocked_until_the_file_opens() {
    let mut game = Game::new();
    assert!(!game.is_legal_destination(sq(7, 7), sq(5, 7)));
    play(&mut game, &[((6, 7), (4, 7)), ((1, 0), (2, 0))]);
    assert!(game.is_legal_destination(sq(7, 7), sq(5, 7)));
    assert!(game.is_legal_destination(sq(7, 7), sq(6, 7)));
    assert!(!game.is_legal_destination(sq(7, 7), sq(4, 7))); // own pawn
    assert!(!game.is_legal_destination(sq(7, 7), sq(3, 7))); // past it
}

#[test]
fn saved_game_loads_back_to_the_same_position() {
    let mut game = Game::new();
    play(&mut game, &[((6, 4), (4, 4)), ((1, 4), (3, 4)), ((7, 6), (5, 5))]);
    let text = game.save();
    assert!(text.starts_with("false\n"));

    let mut restored = Game::new();
    let resets = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&resets);
    restored.subscribe(Box::new(move |event| if *event == GameEvent::Reset { *counter.borrow_mut() += 1 }));
    restored.load(Some(Cursor::new(text.as_bytes())), true).unwrap();

    assert_eq!(*resets.borrow(), 1);
    assert_eq!(restored.save(), text);
    assert!(!restored.is_white_turn());
    // Move history is not part of the format.
    assert!(!restored.piece_at(sq(4, 4)).unwrap().has_moved());
    assert!(restored.board().is_consistent());
    assert!(restored.commit_move(sq(0, 6), sq(2, 5)));
}

#[test]
fn lenient_load_skips_junk_and_strict_load_refuses_it() {
    let text = "true\n\n7 4 K true\n0 4 K false\n3 3 Dragon true\n1 2 3\n6 0 P true\n";
    let mut lenient = Game::new();
    lenient.load_str(text).unwrap();
    assert_eq!(lenient.board().piece_count(), 3);
    assert!(lenient.is_white_turn());

    let mut strict = Game::new();
    strict.set_load_policy(LoadPolicy::Strict);
    let before = strict.save();
    assert!(strict.load_str(text).is_err());
    assert_eq!(strict.save(), before);
}

// --- Randomized self-check property ---

fn all_legal_moves(game: &Game) -> Vec<(Square, Square)> {
    let side = game.side_to_move();
    let origins: Vec<Square> = game.board().squares_of(side).iter().copied().collect();
    origins
        .into_iter()
        .flat_map(|from| game.legal_destinations_from(from).into_iter().map(move |to| (from, to)))
        .collect()
}

#[test]
fn random_games_never_leave_the_mover_in_check() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    for seed in 0..6u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        let seen = record_moves(&mut game);

        for _ in 0..40 {
            let moves = all_legal_moves(&game);
            if moves.is_empty() {
                break;
            }
            let mover = game.side_to_move();

            // A random square pair that is not legal must bounce off untouched.
            let from = Square::new(rng.random_range(0..8), rng.random_range(0..8));
            let to = Square::new(rng.random_range(0..8), rng.random_range(0..8));
            if !moves.contains(&(from, to)) {
                let before = game.save();
                assert!(!game.commit_move(from, to), "seed {} accepted {:?} -> {:?}", seed, from, to);
                assert_eq!(game.save(), before);
                assert_eq!(game.side_to_move(), mover);
            }

            let (from, to) = moves[rng.random_range(0..moves.len())];
            let notified = seen.borrow().len();
            assert!(game.commit_move(from, to), "seed {} rejected {:?} -> {:?}", seed, from, to);
            assert_eq!(seen.borrow().len(), notified + 1);
            assert_eq!(game.side_to_move(), mover.opponent());
            assert!(!game.is_in_check(mover), "seed {}: {:?} left in check\n{}", seed, mover, game);
            assert!(game.board().is_consistent());
            assert!(game.board().king_square(mover).is_some());

            let last = seen.borrow().last().cloned().unwrap();
            assert_eq!(last.gives_check, game.is_in_check(mover.opponent()));
            if last.is_checkmate {
                assert!(all_legal_moves(&game).is_empty());
                break;
            }
        }
    }
}
