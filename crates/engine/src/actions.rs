//! Player actions: swapping two pieces and tapping a special piece
//!
//! A swap is validated on a copy of the grid before anything moves. Legal
//! swaps are committed to the live grid and start a cascade; illegal ones
//! slide both pieces over and back, leaving the grid untouched.

use futures::future::join_all;
use tracing::debug;

use match3_core::grid::{swap_creates_match, Grid};
use match3_core::SpecialPolicy;
use match3_types::{Match3Event, MoveEvent, Position, EMPTY};

use crate::process::ProcessOutcome;
use crate::session::Match3;

/// Result of [`Match3::action_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not accepted: no piece moved and no event was emitted
    Rejected,
    /// Illegal swap: pieces went back, grid unchanged
    Reverted,
    /// Legal swap: grid updated and the cascade ran
    Committed,
}

/// Whether swapping `from` and `to` is a legal move on `grid`.
///
/// Free moves accept everything; a special piece on either cell is always
/// legal; otherwise the swap must create a match involving one of the two
/// cells. Pure: `grid` is never modified.
pub fn validate_move(
    grid: &Grid,
    from: Position,
    to: Position,
    free_moves: bool,
    policy: &dyn SpecialPolicy,
) -> bool {
    if free_moves {
        return true;
    }
    if policy.is_special(grid.type_at(from)) || policy.is_special(grid.type_at(to)) {
        return true;
    }
    swap_creates_match(grid, from, to)
}

impl Match3 {
    fn accepts_input(&self) -> bool {
        self.playing && !self.process.is_processing() && !self.is_paused()
    }

    /// Try to swap the pieces at `from` and `to`.
    ///
    /// Rejected without any effect when the session does not accept input,
    /// the cells are not adjacent or outside the grid, either cell is empty
    /// or its piece is locked. A committed swap resolves only after the
    /// cascade it started has finished.
    pub async fn action_move(&mut self, from: Position, to: Position) -> MoveOutcome {
        if !self.accepts_input() || !from.is_adjacent(to) {
            return MoveOutcome::Rejected;
        }
        let grid = self.board.grid();
        if !grid.contains(from) || !grid.contains(to) {
            return MoveOutcome::Rejected;
        }
        let (Some(piece_a), Some(piece_b)) = (
            self.board.piece_at(from).copied(),
            self.board.piece_at(to).copied(),
        ) else {
            return MoveOutcome::Rejected;
        };
        if self.board.is_locked(from) || self.board.is_locked(to) {
            return MoveOutcome::Rejected;
        }
        if grid.type_at(from) == EMPTY || grid.type_at(to) == EMPTY {
            return MoveOutcome::Rejected;
        }

        let valid = validate_move(
            self.board.grid(),
            from,
            to,
            self.config.free_moves,
            self.board.policy(),
        );
        debug!(%from, %to, valid, "swap");

        self.board.set_locked(from, true);
        self.board.set_locked(to, true);

        if valid {
            join_all(self.board.swap_pieces(from, to)).await;
        } else {
            let view_from = self.board.view_position(from);
            let view_to = self.board.view_position(to);
            join_all([
                self.board.slide_to(piece_a.id, view_to),
                self.board.slide_to(piece_b.id, view_from),
            ])
            .await;
            join_all([
                self.board.slide_to(piece_a.id, view_from),
                self.board.slide_to(piece_b.id, view_to),
            ])
            .await;
        }

        self.board.set_locked(from, false);
        self.board.set_locked(to, false);
        self.stats.register_move(valid);
        self.board
            .emit(Match3Event::Move(MoveEvent { from, to, valid }));

        if !valid {
            return MoveOutcome::Reverted;
        }
        self.last_move = Some((from, to));
        if self.start_process().await == ProcessOutcome::Ignored {
            self.last_move = None;
        }
        MoveOutcome::Committed
    }

    /// Tap the piece at `pos`. Only unlocked special pieces react: the piece
    /// pops (firing its special effect) and a cascade runs.
    ///
    /// Returns `false` when the tap was ignored.
    pub async fn action_tap(&mut self, pos: Position) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(piece) = self.board.piece_at(pos) else {
            return false;
        };
        if !self.board.policy().is_special(piece.kind) || self.board.is_locked(pos) {
            return false;
        }

        debug!(
            %pos,
            kind = piece.kind,
            name = self.board.catalog().name(piece.kind).unwrap_or("unknown"),
            "tap"
        );
        // Taps only land between cascades, so their pops are never part of a combo.
        let records = self.board.pop_at(pos, 0, false).await;
        self.register_pops(&records);
        self.start_process().await;
        true
    }
}
