//! Board module - grid ownership and piece lifecycle
//!
//! The [`Board`] is the only owner of the grid and of the live pieces. Pieces
//! live in a pool indexed by [`PieceId`]; a per-cell index maps positions to
//! the piece occupying them, so lookups never walk the collection and pieces
//! never hold references back to the board.
//!
//! # Coordinates
//!
//! View coordinates are centred on `(0, 0)`: the middle of the grid sits at
//! the origin and each cell is `tile_size` wide and tall. Rows grow downward.
//!
//! # Popping
//!
//! [`Board::pop_many`] resolves in waves. Within a wave every cell is cleared
//! synchronously (grid set to empty, piece removed, pop event emitted) before
//! any removal animation starts; the wave completes once all of its
//! animations have finished and the pieces are disposed. Special pieces
//! popped in a wave then fire their [`SpecialPolicy`] trigger, and the cells
//! it returns form the next wave, flagged as caused by a special.

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace};

use crate::catalog::TypeCatalog;
use crate::events::EventHub;
use crate::grid::{create_grid, generate_refill, Grid};
use crate::presenter::{Animation, Presenter};
use crate::rng::SimpleRng;
use crate::special::SpecialPolicy;
use crate::types::{
    Match3Config, Match3Event, Piece, PieceId, PopEvent, Position, TypeCode, ViewPoint, EMPTY,
};

/// How a relocated piece travels to its new cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Player swap
    Slide,
    /// Gravity or refill
    Fall,
}

/// One completed pop, as reported by [`Board::pop_many`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopRecord {
    /// The piece as it was when removed
    pub piece: Piece,
    pub round: u32,
    pub is_special: bool,
    pub caused_by_special: bool,
}

pub struct Board {
    grid: Grid,
    catalog: TypeCatalog,
    tile_size: f32,
    /// View position of cell (0, 0)
    origin: ViewPoint,
    /// Piece pool; `None` slots are free or awaiting disposal
    pieces: Vec<Option<Piece>>,
    free: Vec<PieceId>,
    /// Piece occupying each cell, row-major
    index: Vec<Option<PieceId>>,
    /// Popped pieces whose removal animation has not completed yet
    pending_dispose: Vec<PieceId>,
    interactive: bool,
    rng: SimpleRng,
    policy: Box<dyn SpecialPolicy>,
    presenter: Box<dyn Presenter>,
    events: EventHub,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("grid", &self.grid)
            .field("mode", &self.catalog.mode())
            .field("pieces", &self.piece_count())
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Build a board with a fresh match-free grid drawn from the catalog's
    /// common types, one piece per cell.
    pub fn new(
        config: &Match3Config,
        catalog: TypeCatalog,
        policy: Box<dyn SpecialPolicy>,
        presenter: Box<dyn Presenter>,
        events: EventHub,
    ) -> Self {
        Self::build(None, config, catalog, policy, presenter, events)
    }

    /// Build a board over an existing grid (fixtures, restored games).
    ///
    /// Every non-empty cell gets a piece. Dimensions come from `grid`; the
    /// rest of `config` applies as usual.
    pub fn from_grid(
        grid: Grid,
        config: &Match3Config,
        catalog: TypeCatalog,
        policy: Box<dyn SpecialPolicy>,
        presenter: Box<dyn Presenter>,
        events: EventHub,
    ) -> Self {
        Self::build(Some(grid), config, catalog, policy, presenter, events)
    }

    fn build(
        grid: Option<Grid>,
        config: &Match3Config,
        catalog: TypeCatalog,
        policy: Box<dyn SpecialPolicy>,
        presenter: Box<dyn Presenter>,
        events: EventHub,
    ) -> Self {
        let mut board = Self {
            grid: Grid::new(0, 0),
            catalog,
            tile_size: config.tile_size,
            origin: ViewPoint::default(),
            pieces: Vec::new(),
            free: Vec::new(),
            index: Vec::new(),
            pending_dispose: Vec::new(),
            interactive: true,
            rng: SimpleRng::new(config.seed),
            policy,
            presenter,
            events,
        };
        board.populate(grid, config);
        board
    }

    /// Replace the whole board: every live piece is disposed, then `grid`
    /// (or a fresh match-free grid) is laid out. Presenter and subscribers
    /// are kept.
    pub fn rebuild(
        &mut self,
        config: &Match3Config,
        catalog: TypeCatalog,
        policy: Box<dyn SpecialPolicy>,
        grid: Option<Grid>,
    ) {
        self.settle();
        let live: Vec<PieceId> = self.pieces().map(|piece| piece.id).collect();
        for id in live {
            self.presenter.dispose(id);
        }

        self.catalog = catalog;
        self.policy = policy;
        self.tile_size = config.tile_size;
        self.rng = SimpleRng::new(config.seed);
        self.interactive = true;
        self.populate(grid, config);
    }

    fn populate(&mut self, grid: Option<Grid>, config: &Match3Config) {
        let grid = grid.unwrap_or_else(|| {
            create_grid(config.rows, config.columns, self.catalog.common(), &mut self.rng)
        });
        let cells = grid.rows() * grid.columns();

        self.origin = ViewPoint::new(
            -(grid.columns().saturating_sub(1) as f32) * self.tile_size / 2.0,
            -(grid.rows().saturating_sub(1) as f32) * self.tile_size / 2.0,
        );
        self.grid = Grid::new(grid.rows(), grid.columns());
        self.pieces = Vec::with_capacity(cells);
        self.free.clear();
        self.index = vec![None; cells];
        self.pending_dispose.clear();

        for pos in grid.positions() {
            let kind = grid.type_at(pos);
            if kind != EMPTY {
                self.create_piece(pos, kind);
            }
        }

        debug!(
            rows = self.grid.rows(),
            columns = self.grid.columns(),
            mode = %self.catalog.mode(),
            pieces = self.piece_count(),
            "board ready"
        );
    }

    // ---- accessors ----

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &dyn SpecialPolicy {
        self.policy.as_ref()
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// The live piece bound to `pos`, or `None` (empty cell, gap between a
    /// pop and its refill, or a position outside the grid).
    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        let cell = self.cell_checked(pos)?;
        self.index[cell].and_then(|id| self.piece(id))
    }

    /// Live pieces in pool order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().flatten()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// A piece is locked while it is animating or while the board is not
    /// accepting input. Empty cells report unlocked.
    pub fn is_locked(&self, pos: Position) -> bool {
        match self.piece_at(pos) {
            Some(piece) => piece.locked || !self.interactive,
            None => false,
        }
    }

    // ---- coordinates ----

    /// Centre of `pos` in view space
    pub fn view_position(&self, pos: Position) -> ViewPoint {
        ViewPoint::new(
            self.origin.x + pos.column as f32 * self.tile_size,
            self.origin.y + pos.row as f32 * self.tile_size,
        )
    }

    /// Centre of the slot `slots_above` rows above the top of `column`
    pub fn spawn_point(&self, column: usize, slots_above: usize) -> ViewPoint {
        ViewPoint::new(
            self.origin.x + column as f32 * self.tile_size,
            self.origin.y - slots_above as f32 * self.tile_size,
        )
    }

    /// Cell under a view-space point, if any
    pub fn grid_position(&self, point: ViewPoint) -> Option<Position> {
        let column = ((point.x - self.origin.x) / self.tile_size).round();
        let row = ((point.y - self.origin.y) / self.tile_size).round();
        if !(column >= 0.0 && row >= 0.0) {
            return None;
        }
        let pos = Position::new(row as usize, column as usize);
        self.grid.contains(pos).then_some(pos)
    }

    fn cell_checked(&self, pos: Position) -> Option<usize> {
        self.grid
            .contains(pos)
            .then(|| pos.row * self.grid.columns() + pos.column)
    }

    fn cell(&self, pos: Position) -> usize {
        match self.cell_checked(pos) {
            Some(cell) => cell,
            None => panic!(
                "position {} is outside the {}x{} grid",
                pos,
                self.grid.rows(),
                self.grid.columns()
            ),
        }
    }

    // ---- lifecycle ----

    /// Create a piece at its resting place
    pub fn create_piece(&mut self, pos: Position, kind: TypeCode) -> PieceId {
        let start = self.view_position(pos);
        self.create_piece_from(pos, kind, start)
    }

    /// Create a piece bound to `pos` whose sprite starts at `start`.
    ///
    /// Sets the grid cell to `kind`. Panics if the cell already holds a piece.
    pub fn create_piece_from(&mut self, pos: Position, kind: TypeCode, start: ViewPoint) -> PieceId {
        let cell = self.cell(pos);
        assert!(kind != EMPTY, "cannot create a piece of the empty type");
        assert!(
            self.index[cell].is_none(),
            "cell {} already holds a piece",
            pos
        );

        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                self.pieces.push(None);
                PieceId((self.pieces.len() - 1) as u32)
            }
        };
        let piece = Piece {
            id,
            kind,
            row: pos.row,
            column: pos.column,
            locked: false,
        };
        self.pieces[id.0 as usize] = Some(piece);
        self.index[cell] = Some(id);
        self.grid.set_type(pos, kind);
        self.presenter.spawn(&piece, start);
        id
    }

    /// Move a piece's logical cell and start its animation.
    ///
    /// Only the piece and the position index change; the grid's type array
    /// is the caller's to keep in step (see [`Board::shift`] and
    /// [`Board::swap_pieces`]).
    pub fn relocate(&mut self, id: PieceId, to: Position, motion: Motion) -> Animation {
        let columns = self.grid.columns();
        let to_cell = self.cell(to);
        let Some(piece) = self.pieces.get_mut(id.0 as usize).and_then(Option::as_mut) else {
            return crate::presenter::instant();
        };

        let from_cell = piece.row * columns + piece.column;
        piece.row = to.row;
        piece.column = to.column;
        if self.index[from_cell] == Some(id) {
            self.index[from_cell] = None;
        }
        self.index[to_cell] = Some(id);

        let target = self.view_position(to);
        match motion {
            Motion::Slide => self.presenter.slide(id, target),
            Motion::Fall => self.presenter.fall(id, target),
        }
    }

    /// Animate a piece towards a view point without changing its cell
    pub fn slide_to(&mut self, id: PieceId, to: ViewPoint) -> Animation {
        self.presenter.slide(id, to)
    }

    /// Move the type at `from` into the empty cell `to` and let its piece
    /// fall there. Returns `None` when no piece was bound to `from`.
    pub fn shift(&mut self, from: Position, to: Position) -> Option<Animation> {
        let kind = self.grid.type_at(from);
        self.grid.set_type(to, kind);
        self.grid.set_type(from, EMPTY);
        let id = self.index[self.cell(from)]?;
        Some(self.relocate(id, to, Motion::Fall))
    }

    /// Exchange two cells: types in the grid and the pieces bound to them.
    pub fn swap_pieces(&mut self, a: Position, b: Position) -> Vec<Animation> {
        let id_a = self.index[self.cell(a)];
        let id_b = self.index[self.cell(b)];
        self.grid.swap(a, b);

        let mut animations = Vec::with_capacity(2);
        if let Some(id) = id_a {
            animations.push(self.relocate(id, b, Motion::Slide));
        }
        if let Some(id) = id_b {
            animations.push(self.relocate(id, a, Motion::Slide));
        }
        animations
    }

    pub fn set_locked(&mut self, pos: Position, locked: bool) {
        let cell = self.cell(pos);
        if let Some(id) = self.index[cell] {
            if let Some(piece) = self.pieces[id.0 as usize].as_mut() {
                piece.locked = locked;
            }
        }
    }

    /// Board-wide input gate
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
        self.presenter.set_interactive(interactive);
    }

    /// Fill the empty top of every column with fresh common types.
    ///
    /// Only the grid changes; the caller creates the pieces. Returns the
    /// filled positions column by column, bottom to top.
    pub fn generate_refill(&mut self) -> Vec<Position> {
        generate_refill(&mut self.grid, self.catalog.common(), &mut self.rng)
    }

    // ---- popping ----

    /// Pop the piece at `pos` (and whatever its special trigger clears).
    ///
    /// Returns immediately with no records if the cell is empty or has no
    /// bound piece.
    pub async fn pop_at(
        &mut self,
        pos: Position,
        round: u32,
        caused_by_special: bool,
    ) -> Vec<PopRecord> {
        self.pop_many(&[pos], round, caused_by_special).await
    }

    /// Pop every position concurrently and wait for all removals.
    ///
    /// Duplicate and already-empty positions are skipped. Panics if a
    /// position lies outside the grid.
    pub async fn pop_many(
        &mut self,
        positions: &[Position],
        round: u32,
        caused_by_special: bool,
    ) -> Vec<PopRecord> {
        let mut records: Vec<PopRecord> = Vec::new();
        let mut wave: Vec<Position> = positions.to_vec();
        let mut caused = caused_by_special;
        let mut depth = 0usize;

        while !wave.is_empty() {
            let first = records.len();
            let mut animations = Vec::with_capacity(wave.len());
            for pos in wave.drain(..) {
                if let Some(record) = self.begin_pop(pos, round, caused) {
                    animations.push(self.presenter.pop(record.piece.id));
                    records.push(record);
                }
            }

            join_all(animations).await;
            self.dispose_pending();

            if depth == 0 || self.policy.recursive() {
                for record in &records[first..] {
                    if record.is_special {
                        let origin = record.piece.position();
                        wave.extend(self.policy.trigger(&self.grid, origin, record.piece.kind));
                    }
                }
                wave.sort_unstable();
                wave.dedup();
            }

            if !wave.is_empty() {
                trace!(depth, cells = wave.len(), "special trigger wave");
            }
            caused = true;
            depth += 1;
        }

        records
    }

    fn begin_pop(&mut self, pos: Position, round: u32, caused_by_special: bool) -> Option<PopRecord> {
        let kind = self.grid.type_at(pos);
        if kind == EMPTY {
            return None;
        }
        let cell = self.cell(pos);
        let id = self.index[cell]?;
        let piece = self.pieces[id.0 as usize].take()?;

        self.index[cell] = None;
        self.grid.set_type(pos, EMPTY);
        self.pending_dispose.push(id);

        let is_special = self.policy.is_special(kind);
        trace!(%pos, kind, round, is_special, caused_by_special, "pop");
        self.events.emit(Match3Event::Pop(PopEvent {
            piece,
            kind,
            round,
            is_special,
            caused_by_special,
        }));

        Some(PopRecord {
            piece,
            round,
            is_special,
            caused_by_special,
        })
    }

    fn dispose_pending(&mut self) {
        for id in self.pending_dispose.drain(..) {
            self.presenter.dispose(id);
            self.free.push(id);
        }
    }

    /// Bring the board back to rest after an aborted cascade: dispose pieces
    /// whose pop never finished and unlock every piece.
    pub fn settle(&mut self) {
        if !self.pending_dispose.is_empty() {
            debug!(count = self.pending_dispose.len(), "disposing interrupted pops");
        }
        self.dispose_pending();
        for piece in self.pieces.iter_mut().flatten() {
            piece.locked = false;
        }
    }

    // ---- events ----

    pub fn subscribe(&mut self) -> UnboundedReceiver<Match3Event> {
        self.events.subscribe()
    }

    pub fn emit(&mut self, event: Match3Event) {
        self.events.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SpecialEffect;
    use crate::grid::find_matches;
    use crate::presenter::{HeadlessPresenter, PresenterCall};
    use crate::special::CatalogSpecials;
    use crate::types::GameMode;
    use futures::future::{self, FutureExt};
    use tokio_test::assert_pending;

    fn config() -> Match3Config {
        Match3Config {
            mode: GameMode::Test,
            ..Match3Config::default()
        }
    }

    fn catalog() -> TypeCatalog {
        TypeCatalog::for_mode(GameMode::Test)
    }

    fn board_from(rows: Vec<Vec<TypeCode>>) -> Board {
        Board::from_grid(
            Grid::from_rows(rows),
            &config(),
            catalog(),
            Box::new(CatalogSpecials::new(catalog())),
            Box::new(HeadlessPresenter::new()),
            EventHub::new(),
        )
    }

    fn p(row: usize, column: usize) -> Position {
        Position::new(row, column)
    }

    /// Presenter whose pop animations never finish
    struct StuckPops;

    impl Presenter for StuckPops {
        fn spawn(&mut self, _piece: &Piece, _at: ViewPoint) {}
        fn slide(&mut self, _id: PieceId, _to: ViewPoint) -> Animation {
            crate::presenter::instant()
        }
        fn fall(&mut self, _id: PieceId, _to: ViewPoint) -> Animation {
            crate::presenter::instant()
        }
        fn pop(&mut self, _id: PieceId) -> Animation {
            future::pending().boxed()
        }
        fn dispose(&mut self, _id: PieceId) {}
    }

    #[test]
    fn test_new_board_has_one_piece_per_cell() {
        let cfg = config();
        let board = Board::new(
            &cfg,
            catalog(),
            Box::new(CatalogSpecials::new(catalog())),
            Box::new(HeadlessPresenter::new()),
            EventHub::new(),
        );

        assert_eq!(board.grid().rows(), cfg.rows);
        assert_eq!(board.grid().columns(), cfg.columns);
        assert_eq!(board.piece_count(), cfg.rows * cfg.columns);
        assert!(find_matches(board.grid(), None).is_empty());

        for pos in board.grid().positions() {
            let piece = board.piece_at(pos).expect("every cell has a piece");
            assert_eq!(piece.position(), pos);
            assert_eq!(piece.kind, board.grid().type_at(pos));
            assert!(!board.is_locked(pos));
        }
    }

    #[test]
    fn test_view_coordinates_are_centred() {
        let board = board_from(vec![vec![1, 2, 3], vec![2, 3, 1], vec![3, 1, 2]]);
        let tile = board.tile_size();

        assert_eq!(board.view_position(p(1, 1)), ViewPoint::new(0.0, 0.0));
        assert_eq!(board.view_position(p(0, 0)), ViewPoint::new(-tile, -tile));
        assert_eq!(board.spawn_point(2, 1), ViewPoint::new(tile, -2.0 * tile));

        for pos in board.grid().positions() {
            assert_eq!(board.grid_position(board.view_position(pos)), Some(pos));
        }
        let near = ViewPoint::new(tile * 0.4, -tile * 0.3);
        assert_eq!(board.grid_position(near), Some(p(1, 1)));
        assert_eq!(board.grid_position(ViewPoint::new(-2.0 * tile, 0.0)), None);
        assert_eq!(board.grid_position(ViewPoint::new(0.0, 2.0 * tile)), None);
    }

    #[test]
    fn test_piece_at_outside_grid_is_none() {
        let board = board_from(vec![vec![1, 2, 3]]);
        assert!(board.piece_at(p(0, 3)).is_none());
        assert!(board.piece_at(p(1, 0)).is_none());
    }

    #[test]
    #[should_panic(expected = "already holds a piece")]
    fn test_create_piece_on_occupied_cell_panics() {
        let mut board = board_from(vec![vec![1, 2, 3]]);
        board.create_piece(p(0, 1), 1);
    }

    #[test]
    fn test_pop_at_clears_cell_and_emits() {
        let mut board = board_from(vec![vec![1, 2, 3], vec![2, 3, 1]]);
        let mut rx = board.subscribe();
        let id = board.piece_at(p(0, 1)).unwrap().id;

        let records = tokio_test::block_on(board.pop_at(p(0, 1), 2, false));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].piece.id, id);
        assert_eq!(records[0].round, 2);
        assert_eq!(board.grid().type_at(p(0, 1)), EMPTY);
        assert!(board.piece_at(p(0, 1)).is_none());
        assert_eq!(board.piece_count(), 5);

        match rx.try_recv().unwrap() {
            Match3Event::Pop(event) => {
                assert_eq!(event.kind, 2);
                assert_eq!(event.round, 2);
                assert!(!event.is_special);
                assert!(!event.caused_by_special);
            }
            other => panic!("unexpected event {:?}", other),
        }

        // Popping an already-empty cell is a silent no-op.
        let again = tokio_test::block_on(board.pop_at(p(0, 1), 2, false));
        assert!(again.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_pop_many_skips_duplicates() {
        let mut board = board_from(vec![vec![1, 1, 1], vec![2, 3, 2]]);
        let records =
            tokio_test::block_on(board.pop_many(&[p(0, 0), p(0, 1), p(0, 0), p(0, 2)], 1, false));
        assert_eq!(records.len(), 3);
        assert_eq!(board.grid().to_rows(), vec![vec![0, 0, 0], vec![2, 3, 2]]);
    }

    #[test]
    fn test_special_trigger_forms_second_wave() {
        let row = catalog().special_code(SpecialEffect::Row);
        let mut board = board_from(vec![vec![1, 2, 3], vec![row, 1, 2], vec![2, 3, 1]]);

        let records = tokio_test::block_on(board.pop_at(p(1, 0), 1, false));
        assert_eq!(records.len(), 3);
        assert!(records[0].is_special);
        assert!(!records[0].caused_by_special);
        assert!(records[1..].iter().all(|r| r.caused_by_special));
        assert_eq!(board.grid().to_rows()[1], vec![0, 0, 0]);
    }

    #[test]
    fn test_triggered_specials_do_not_chain_by_default() {
        let row = catalog().special_code(SpecialEffect::Row);
        let column = catalog().special_code(SpecialEffect::Column);
        let rows = vec![vec![1, 2, 3], vec![row, column, 2], vec![2, 3, 1]];

        let mut single = board_from(rows.clone());
        let records = tokio_test::block_on(single.pop_at(p(1, 0), 1, false));
        assert_eq!(records.len(), 3);
        assert_eq!(single.grid().type_at(p(0, 1)), 2);

        let mut chained = Board::from_grid(
            Grid::from_rows(rows),
            &config(),
            catalog(),
            Box::new(CatalogSpecials::new(catalog()).with_recursion(true)),
            Box::new(HeadlessPresenter::new()),
            EventHub::new(),
        );
        let records = tokio_test::block_on(chained.pop_at(p(1, 0), 1, false));
        assert_eq!(records.len(), 5);
        assert_eq!(chained.grid().type_at(p(0, 1)), EMPTY);
        assert_eq!(chained.grid().type_at(p(2, 1)), EMPTY);
    }

    #[test]
    fn test_disposed_ids_are_reused() {
        let (presenter, journal) = HeadlessPresenter::with_journal();
        let mut board = Board::from_grid(
            Grid::from_rows(vec![vec![1, 2, 3]]),
            &config(),
            catalog(),
            Box::new(CatalogSpecials::new(catalog())),
            Box::new(presenter),
            EventHub::new(),
        );
        let popped = board.piece_at(p(0, 2)).unwrap().id;

        tokio_test::block_on(board.pop_at(p(0, 2), 0, false));
        assert!(journal
            .lock()
            .unwrap()
            .contains(&PresenterCall::Dispose { id: popped }));

        let created = board.create_piece(p(0, 2), 1);
        assert_eq!(created, popped);
        assert_eq!(board.grid().type_at(p(0, 2)), 1);
    }

    #[test]
    fn test_rebuild_disposes_old_pieces() {
        let (presenter, journal) = HeadlessPresenter::with_journal();
        let mut board = Board::from_grid(
            Grid::from_rows(vec![vec![1, 2, 3]]),
            &config(),
            catalog(),
            Box::new(CatalogSpecials::new(catalog())),
            Box::new(presenter),
            EventHub::new(),
        );
        let cfg = Match3Config {
            rows: 4,
            columns: 5,
            ..config()
        };
        board.rebuild(&cfg, catalog(), Box::new(CatalogSpecials::new(catalog())), None);

        let calls = journal.lock().unwrap();
        let disposed = calls
            .iter()
            .filter(|c| matches!(c, PresenterCall::Dispose { .. }))
            .count();
        assert_eq!(disposed, 3);
        assert_eq!(board.piece_count(), 20);
        assert_eq!(board.grid().rows(), 4);
        assert!(find_matches(board.grid(), None).is_empty());
    }

    #[test]
    fn test_shift_keeps_grid_and_pieces_in_step() {
        let mut board = board_from(vec![vec![1, 2], vec![0, 3]]);
        let id = board.piece_at(p(0, 0)).unwrap().id;

        assert!(board.shift(p(0, 0), p(1, 0)).is_some());
        assert_eq!(board.grid().to_rows(), vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(board.piece_at(p(1, 0)).unwrap().id, id);
        assert!(board.piece_at(p(0, 0)).is_none());
    }

    #[test]
    fn test_swap_pieces_exchanges_types_and_bindings() {
        let mut board = board_from(vec![vec![1, 2, 3]]);
        let a = board.piece_at(p(0, 0)).unwrap().id;
        let b = board.piece_at(p(0, 1)).unwrap().id;

        let animations = board.swap_pieces(p(0, 0), p(0, 1));
        assert_eq!(animations.len(), 2);
        tokio_test::block_on(join_all(animations));

        assert_eq!(board.grid().to_rows(), vec![vec![2, 1, 3]]);
        assert_eq!(board.piece_at(p(0, 0)).unwrap().id, b);
        assert_eq!(board.piece_at(p(0, 1)).unwrap().id, a);
        assert_eq!(board.piece(a).unwrap().position(), p(0, 1));
    }

    #[test]
    fn test_locks_and_interactivity() {
        let mut board = board_from(vec![vec![1, 2, 3]]);
        board.set_locked(p(0, 0), true);
        assert!(board.is_locked(p(0, 0)));
        assert!(!board.is_locked(p(0, 1)));

        board.set_interactive(false);
        assert!(board.is_locked(p(0, 1)));
        board.set_interactive(true);

        board.settle();
        assert!(!board.is_locked(p(0, 0)));
    }

    #[test]
    fn test_settle_disposes_interrupted_pops() {
        let mut board = Board::from_grid(
            Grid::from_rows(vec![vec![1, 1, 1], vec![2, 3, 2]]),
            &config(),
            catalog(),
            Box::new(CatalogSpecials::new(catalog())),
            Box::new(StuckPops),
            EventHub::new(),
        );

        {
            let positions = [p(0, 0), p(0, 1), p(0, 2)];
            let mut pop = tokio_test::task::spawn(board.pop_many(&positions, 1, false));
            assert_pending!(pop.poll());
        }

        // Cells were cleared before the animations started.
        assert_eq!(board.grid().to_rows()[0], vec![0, 0, 0]);
        assert_eq!(board.piece_count(), 3);

        board.settle();
        let reused = board.create_piece(p(0, 0), 2);
        assert!(reused.0 < 3);
        assert_eq!(board.piece_count(), 4);
    }
}
