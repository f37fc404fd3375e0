//! Cascade engine - the process round state machine
//!
//! After a player action the board is processed in *rounds* until it holds
//! neither a match nor an empty cell. Every round queues the same six steps:
//!
//! | Step | Effect |
//! |------|--------|
//! | `RoundStart` | lock input, announce the combo round |
//! | `BumpAndScan` | increment the round, count matches |
//! | `ResolveMatches` | pop every match group (and spawn specials) |
//! | `ApplyGravity` | drop pieces into the gaps |
//! | `Refill` | new pieces fall in from above the board |
//! | `Checkpoint` | queue another round, or finish |
//!
//! Steps run one at a time through a [`StepQueue`]; pausing takes effect
//! before the next step, resetting aborts the step in flight.

use futures::future::join_all;
use tracing::{debug, info};

use match3_core::grid::{compute_gravity_shifts, find_empty_positions, find_matches, MatchGroup};
use match3_core::{Motion, PopRecord};
use match3_types::{Match3Event, MatchedRoundEvent, Position, EMPTY, SUPER_MATCH_LEN};

use crate::queue::{QueueControl, StepQueue};
use crate::session::Match3;

/// One step of a process round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStep {
    RoundStart,
    BumpAndScan,
    ResolveMatches,
    ApplyGravity,
    Refill,
    Checkpoint,
}

impl ProcessStep {
    /// Steps of one round, in execution order
    pub const ROUND: [ProcessStep; 6] = [
        ProcessStep::RoundStart,
        ProcessStep::BumpAndScan,
        ProcessStep::ResolveMatches,
        ProcessStep::ApplyGravity,
        ProcessStep::Refill,
        ProcessStep::Checkpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStep::RoundStart => "round_start",
            ProcessStep::BumpAndScan => "bump_and_scan",
            ProcessStep::ResolveMatches => "resolve_matches",
            ProcessStep::ApplyGravity => "apply_gravity",
            ProcessStep::Refill => "refill",
            ProcessStep::Checkpoint => "checkpoint",
        }
    }
}

/// How a call to [`Match3::start_process`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Already processing, or the session is not playing
    Ignored,
    /// The board settled after `rounds` rounds
    Completed { rounds: u32 },
    /// A reset interrupted the cascade
    Aborted,
}

/// Cascade state: the step queue, the processing flag and the round counter
#[derive(Debug, Default)]
pub struct Process {
    queue: StepQueue<ProcessStep>,
    processing: bool,
    round: u32,
}

impl Process {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn queue(&self) -> &StepQueue<ProcessStep> {
        &self.queue
    }

    pub fn control(&self) -> &QueueControl {
        self.queue.control()
    }

    fn enqueue_round(&mut self) {
        self.queue.extend(ProcessStep::ROUND);
    }
}

impl Match3 {
    /// Process the board until it holds no match and no empty cell.
    ///
    /// No-op if a cascade is already running or the session is not playing.
    /// Resolves once the cascade completes or is reset.
    pub async fn start_process(&mut self) -> ProcessOutcome {
        if self.process.processing || !self.playing {
            return ProcessOutcome::Ignored;
        }
        self.process.processing = true;
        self.process.round = 0;
        let epoch = self.process.control().epoch();

        info!("processing start");
        self.board.emit(Match3Event::ProcessStart);
        self.process.enqueue_round();

        let control = self.process.control().clone();
        loop {
            if !control.wait_resumed(epoch).await {
                self.abort_process();
                return ProcessOutcome::Aborted;
            }
            let Some(step) = self.process.queue.take_next() else {
                break;
            };

            let finished = tokio::select! {
                biased;
                _ = control.cancelled(epoch) => false,
                _ = self.run_step(step) => true,
            };
            if !finished {
                self.abort_process();
                return ProcessOutcome::Aborted;
            }
            self.process.queue.complete_step();
        }

        ProcessOutcome::Completed {
            rounds: self.process.round,
        }
    }

    /// Drop pending steps and return to idle. Committed grid changes stay.
    pub(crate) fn abort_process(&mut self) {
        let was_processing = self.process.processing;
        self.process.queue.clear();
        self.process.processing = false;
        self.process.round = 0;
        self.last_move = None;
        self.board.settle();
        self.board.set_interactive(true);
        if was_processing {
            info!("processing reset");
        }
    }

    async fn run_step(&mut self, step: ProcessStep) {
        debug!(step = step.as_str(), round = self.process.round, "step");
        match step {
            ProcessStep::RoundStart => self.round_start(),
            ProcessStep::BumpAndScan => self.bump_and_scan(),
            ProcessStep::ResolveMatches => self.resolve_matches().await,
            ProcessStep::ApplyGravity => self.apply_gravity().await,
            ProcessStep::Refill => self.refill().await,
            ProcessStep::Checkpoint => self.checkpoint(),
        }
    }

    fn round_start(&mut self) {
        self.board.set_interactive(false);
        let is_super_special = find_matches(self.board.grid(), None)
            .iter()
            .any(|group| group.len() >= SUPER_MATCH_LEN);
        self.board.emit(Match3Event::MatchedRound(MatchedRoundEvent {
            round: self.process.round,
            is_super_special,
        }));
    }

    fn bump_and_scan(&mut self) {
        self.process.round += 1;
        self.stats.register_round(self.process.round);
        let matches = find_matches(self.board.grid(), None);
        self.stats.register_matches(matches.len());
        info!(round = self.process.round, matches = matches.len(), "round start");
    }

    async fn resolve_matches(&mut self) {
        let groups = find_matches(self.board.grid(), None);
        if groups.is_empty() {
            return;
        }

        // Groups never share a cell, so one pop call covers them all.
        let positions: Vec<Position> = groups
            .iter()
            .flat_map(|group| group.positions.iter().copied())
            .collect();
        let records = self
            .board
            .pop_many(&positions, self.process.round, false)
            .await;
        self.register_pops(&records);

        if self.config.special_spawns {
            self.spawn_specials(&groups);
        }
    }

    fn spawn_specials(&mut self, groups: &[MatchGroup]) {
        for group in groups {
            let Some(kind) = self.board.policy().spawn_for_group(group) else {
                continue;
            };
            let anchor = self.anchor_of(group);
            if self.board.grid().type_at(anchor) != EMPTY {
                continue;
            }
            debug!(%anchor, kind, size = group.len(), "special spawned");
            self.board.create_piece(anchor, kind);
        }
    }

    /// Cell of `group` that was part of the last move, else its middle cell
    fn anchor_of(&self, group: &MatchGroup) -> Position {
        if let Some((from, to)) = self.last_move {
            if group.contains(to) {
                return to;
            }
            if group.contains(from) {
                return from;
            }
        }
        group.positions[group.len() / 2]
    }

    pub(crate) fn register_pops(&mut self, records: &[PopRecord]) {
        for record in records {
            self.stats
                .register_pop(record.round, record.is_special, record.caused_by_special);
        }
    }

    async fn apply_gravity(&mut self) {
        let shifts = compute_gravity_shifts(self.board.grid());
        if shifts.is_empty() {
            return;
        }
        let animations: Vec<_> = shifts
            .iter()
            .filter_map(|&(from, to)| self.board.shift(from, to))
            .collect();
        debug!(moved = animations.len(), "gravity");
        join_all(animations).await;
    }

    async fn refill(&mut self) {
        let filled = self.board.generate_refill();
        if filled.is_empty() {
            return;
        }

        // The n-th newcomer of a column (bottom-up) starts n slots above the board.
        let mut per_column = vec![0usize; self.board.grid().columns()];
        let mut animations = Vec::with_capacity(filled.len());
        for pos in filled {
            per_column[pos.column] += 1;
            let kind = self.board.grid().type_at(pos);
            debug_assert!(self.board.catalog().is_common(kind), "refill drew {}", kind);
            let start = self.board.spawn_point(pos.column, per_column[pos.column]);
            let id = self.board.create_piece_from(pos, kind, start);
            animations.push(self.board.relocate(id, pos, Motion::Fall));
        }
        debug!(created = animations.len(), "refill");
        join_all(animations).await;
    }

    fn checkpoint(&mut self) {
        let matches = find_matches(self.board.grid(), None).len();
        let empty = find_empty_positions(self.board.grid()).len();
        debug!(round = self.process.round, matches, empty, "checkpoint");

        if matches > 0 || empty > 0 {
            self.process.enqueue_round();
            return;
        }

        self.process.processing = false;
        self.process.queue.clear();
        self.last_move = None;
        info!(
            rounds = self.process.round,
            pieces = self.board.piece_count(),
            "processing complete"
        );
        debug!("grid:\n{}", self.board.grid());
        self.board.emit(Match3Event::ProcessComplete);
        self.board.set_interactive(true);
    }
}
