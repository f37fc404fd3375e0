//! Match-3 engine - play session, player actions and the cascade
//!
//! Builds on [`match3_core`] to run a game: a [`Match3`] session accepts
//! swaps and taps, then drives the board through process rounds until it is
//! stable again. All sequencing happens on one task; the only concurrency is
//! overlapping animations, awaited through the board's presenter.
//!
//! # Module Structure
//!
//! - [`session`]: the [`Match3`] session, its lifecycle and accessors
//! - [`actions`]: move validation, swaps and taps
//! - [`process`]: the process round state machine
//! - [`queue`]: the pausable FIFO step queue
//!
//! # Example
//!
//! ```
//! use match3_engine::{Match3, MoveOutcome};
//! use match3_core::HeadlessPresenter;
//! use match3_types::{GameMode, Match3Config};
//!
//! # tokio_test::block_on(async {
//! let config = Match3Config {
//!     mode: GameMode::Easy,
//!     ..Match3Config::default()
//! };
//! let mut game = Match3::new(config, HeadlessPresenter::new()).unwrap();
//! game.start_playing();
//!
//! if let Some((from, to)) = game.hint() {
//!     assert_eq!(game.action_move(from, to).await, MoveOutcome::Committed);
//!     assert!(game.stats().score > 0);
//! }
//! # });
//! ```

pub mod actions;
pub mod process;
pub mod queue;
pub mod session;

pub use actions::{validate_move, MoveOutcome};
pub use process::{Process, ProcessOutcome, ProcessStep};
pub use queue::{QueueControl, StepQueue};
pub use session::{Match3, PolicyFactory};
