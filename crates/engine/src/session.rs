//! Play session
//!
//! [`Match3`] ties one [`Board`] to the cascade engine, the player actions,
//! the stats and the event subscribers. Its behaviour is split over three
//! files: lifecycle and accessors here, the cascade in
//! [`process`](crate::process) and player actions in
//! [`actions`](crate::actions).

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use match3_core::grid::{find_possible_moves, Grid};
use match3_core::{
    Board, CatalogSpecials, EventHub, HeadlessPresenter, Presenter, SpecialPolicy, Stats,
    TypeCatalog,
};
use match3_types::{ConfigError, Match3Config, Match3Event, Position};

use crate::process::Process;
use crate::queue::QueueControl;

/// Builds the special-piece policy for a session's catalog
pub type PolicyFactory = Arc<dyn Fn(&TypeCatalog) -> Box<dyn SpecialPolicy> + Send + Sync>;

fn default_policy() -> PolicyFactory {
    Arc::new(|catalog: &TypeCatalog| Box::new(CatalogSpecials::new(catalog.clone())))
}

pub struct Match3 {
    pub(crate) config: Match3Config,
    pub(crate) board: Board,
    pub(crate) process: Process,
    pub(crate) stats: Stats,
    pub(crate) playing: bool,
    /// Cells of the last committed swap, used to anchor spawned specials
    pub(crate) last_move: Option<(Position, Position)>,
    policy: PolicyFactory,
}

impl std::fmt::Debug for Match3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match3")
            .field("config", &self.config)
            .field("board", &self.board)
            .field("process", &self.process)
            .field("stats", &self.stats)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}

impl Match3 {
    /// Validate `config` and set up a fresh board
    pub fn new<P>(config: Match3Config, presenter: P) -> Result<Self, ConfigError>
    where
        P: Presenter + 'static,
    {
        config.validate()?;
        let policy = default_policy();
        let catalog = TypeCatalog::for_mode(config.mode);
        let board = Board::new(
            &config,
            catalog.clone(),
            policy(&catalog),
            Box::new(presenter),
            EventHub::new(),
        );
        Ok(Self::assemble(config, board, policy))
    }

    /// Headless session with default config
    pub fn headless() -> Self {
        let config = Match3Config::default();
        let policy = default_policy();
        let catalog = TypeCatalog::for_mode(config.mode);
        let board = Board::new(
            &config,
            catalog.clone(),
            policy(&catalog),
            Box::new(HeadlessPresenter::new()),
            EventHub::new(),
        );
        Self::assemble(config, board, policy)
    }

    /// Session over a given grid. `rows`/`columns` are taken from the grid;
    /// every cell must be empty or a code of the configured mode's catalog.
    pub fn from_grid<P>(
        mut config: Match3Config,
        grid: Grid,
        presenter: P,
    ) -> Result<Self, ConfigError>
    where
        P: Presenter + 'static,
    {
        config.rows = grid.rows();
        config.columns = grid.columns();
        config.validate()?;
        let catalog = TypeCatalog::for_mode(config.mode);
        if let Some(position) = grid
            .positions()
            .find(|&pos| !catalog.is_valid(grid.type_at(pos)))
        {
            return Err(ConfigError::InvalidTypeCode {
                position,
                code: grid.type_at(position),
                mode: config.mode,
            });
        }
        let policy = default_policy();
        let board = Board::from_grid(
            grid,
            &config,
            catalog.clone(),
            policy(&catalog),
            Box::new(presenter),
            EventHub::new(),
        );
        Ok(Self::assemble(config, board, policy))
    }

    fn assemble(config: Match3Config, board: Board, policy: PolicyFactory) -> Self {
        Self {
            config,
            board,
            process: Process::new(),
            stats: Stats::new(),
            playing: false,
            last_move: None,
            policy,
        }
    }

    /// Swap in another special-piece policy.
    ///
    /// The current grid is kept; its pieces are laid out again.
    pub fn with_special_policy<F>(mut self, factory: F) -> Self
    where
        F: Fn(&TypeCatalog) -> Box<dyn SpecialPolicy> + Send + Sync + 'static,
    {
        self.policy = Arc::new(factory);
        let grid = self.board.grid().clone();
        self.rebuild(Some(grid));
        self
    }

    /// Start over with a new configuration: fresh board, stats and process.
    ///
    /// Subscribers stay registered. The session is left not playing.
    pub fn setup(&mut self, config: Match3Config) -> Result<(), ConfigError> {
        config.validate()?;
        self.reset();
        self.config = config;
        self.stats.reset();
        self.playing = false;
        self.rebuild(None);
        info!(
            rows = self.config.rows,
            columns = self.config.columns,
            mode = %self.config.mode,
            "session setup"
        );
        Ok(())
    }

    fn rebuild(&mut self, grid: Option<Grid>) {
        let catalog = TypeCatalog::for_mode(self.config.mode);
        let policy = (self.policy)(&catalog);
        self.board.rebuild(&self.config, catalog, policy, grid);
    }

    /// Register an observer. Every event from now on is delivered to it.
    pub fn subscribe(&mut self) -> UnboundedReceiver<Match3Event> {
        self.board.subscribe()
    }

    pub fn start_playing(&mut self) {
        self.playing = true;
        info!("playing");
    }

    pub fn stop_playing(&mut self) {
        self.playing = false;
        info!("stopped playing");
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Pause the cascade before its next step and stop accepting actions
    pub fn pause(&self) {
        self.process.control().pause();
    }

    pub fn resume(&self) {
        self.process.control().resume();
    }

    pub fn is_paused(&self) -> bool {
        self.process.control().is_paused()
    }

    /// Abort any cascade and return the engine to idle.
    ///
    /// Grid changes already made stay; pending steps are dropped.
    pub fn reset(&mut self) {
        self.process.control().reset();
        self.abort_process();
    }

    /// Handle for pausing or resetting a running cascade from another task
    pub fn process_control(&self) -> QueueControl {
        self.process.control().clone()
    }

    // ---- accessors ----

    pub fn config(&self) -> &Match3Config {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &Grid {
        self.board.grid()
    }

    pub fn catalog(&self) -> &TypeCatalog {
        self.board.catalog()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    /// Current process round (combo level)
    pub fn round(&self) -> u32 {
        self.process.round()
    }

    pub fn is_processing(&self) -> bool {
        self.process.is_processing()
    }

    /// A legal swap, if one exists
    pub fn hint(&self) -> Option<(Position, Position)> {
        self.possible_moves().into_iter().next()
    }

    pub fn has_possible_moves(&self) -> bool {
        self.hint().is_some()
    }

    /// Every legal swap on the current grid
    pub fn possible_moves(&self) -> Vec<(Position, Position)> {
        let policy = self.board.policy();
        find_possible_moves(self.board.grid(), |kind| policy.is_special(kind))
    }
}
