//! Board tests - piece lifecycle, pops and special triggers through the facade

use match3_rules::core::grid::Grid;
use match3_rules::core::presenter::PresenterCall;
use match3_rules::core::{
    Board, CatalogSpecials, EventHub, HeadlessPresenter, SpecialEffect, TypeCatalog,
};
use match3_rules::types::{GameMode, Match3Config, Match3Event, Position, EMPTY};

fn p(row: usize, column: usize) -> Position {
    Position::new(row, column)
}

fn catalog() -> TypeCatalog {
    TypeCatalog::for_mode(GameMode::Test)
}

fn make_board(rows: Vec<Vec<u8>>) -> (Board, match3_rules::core::presenter::Journal) {
    let (presenter, journal) = HeadlessPresenter::with_journal();
    let config = Match3Config {
        mode: GameMode::Test,
        ..Match3Config::default()
    };
    let board = Board::from_grid(
        Grid::from_rows(rows),
        &config,
        catalog(),
        Box::new(CatalogSpecials::new(catalog())),
        Box::new(presenter),
        EventHub::new(),
    );
    (board, journal)
}

#[test]
fn test_every_piece_mirrors_its_cell() {
    let (board, journal) = make_board(vec![vec![1, 2, 3], vec![0, 3, 1], vec![2, 1, 2]]);

    assert_eq!(board.piece_count(), 8);
    assert!(board.piece_at(p(1, 0)).is_none());
    for piece in board.pieces() {
        assert_eq!(board.piece_at(piece.position()).map(|x| x.id), Some(piece.id));
        assert_eq!(board.grid().type_at(piece.position()), piece.kind);
    }

    let spawns = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, PresenterCall::Spawn { .. }))
        .count();
    assert_eq!(spawns, 8);
}

#[tokio::test]
async fn test_pop_many_emits_one_event_per_piece() {
    let (mut board, journal) = make_board(vec![vec![1, 1, 1], vec![2, 3, 2], vec![3, 2, 3]]);
    let mut events = board.subscribe();

    let records = board.pop_many(&[p(0, 0), p(0, 1), p(0, 2)], 1, false).await;
    assert_eq!(records.len(), 3);
    assert_eq!(board.grid().to_rows()[0], vec![EMPTY, EMPTY, EMPTY]);

    let mut popped = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            Match3Event::Pop(pop) => {
                assert_eq!(pop.kind, 1);
                assert_eq!(pop.round, 1);
                popped.push(pop.piece.position());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!(popped, vec![p(0, 0), p(0, 1), p(0, 2)]);

    // Every pop animation started before any piece was disposed.
    let calls = journal.lock().unwrap();
    let last_pop = calls
        .iter()
        .rposition(|c| matches!(c, PresenterCall::Pop { .. }))
        .unwrap();
    let first_dispose = calls
        .iter()
        .position(|c| matches!(c, PresenterCall::Dispose { .. }))
        .unwrap();
    assert!(last_pop < first_dispose);
}

#[tokio::test]
async fn test_blast_special_clears_neighbourhood() {
    let blast = catalog().special_code(SpecialEffect::Blast);
    let (mut board, _journal) = make_board(vec![
        vec![1, 2, 3, 1],
        vec![2, blast, 1, 2],
        vec![3, 1, 2, 3],
        vec![1, 2, 3, 1],
    ]);
    let mut events = board.subscribe();

    let records = board.pop_at(p(1, 1), 0, false).await;
    assert_eq!(records.len(), 9);
    assert!(records[0].is_special);

    let rows = board.grid().to_rows();
    assert_eq!(rows[0], vec![0, 0, 0, 1]);
    assert_eq!(rows[1], vec![0, 0, 0, 2]);
    assert_eq!(rows[2], vec![0, 0, 0, 3]);
    assert_eq!(rows[3], vec![1, 2, 3, 1]);

    let mut caused = 0;
    while let Ok(Match3Event::Pop(pop)) = events.try_recv() {
        if pop.caused_by_special {
            caused += 1;
        }
    }
    assert_eq!(caused, 8);
}

#[tokio::test]
async fn test_pop_on_empty_cell_is_a_no_op() {
    let (mut board, _journal) = make_board(vec![vec![1, 0, 2], vec![2, 3, 1], vec![3, 1, 2]]);
    let mut events = board.subscribe();

    assert!(board.pop_at(p(0, 1), 1, false).await.is_empty());
    assert!(events.try_recv().is_err());
    assert_eq!(board.piece_count(), 8);
}

#[test]
#[should_panic(expected = "outside the 3x3 grid")]
fn test_pop_outside_grid_panics() {
    let (mut board, _journal) = make_board(vec![vec![1, 2, 3], vec![2, 3, 1], vec![3, 1, 2]]);
    tokio_test::block_on(board.pop_at(p(5, 0), 1, false));
}
