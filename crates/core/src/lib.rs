//! Core match-3 logic - grid rules, board state and piece lifecycle
//!
//! This crate holds everything about a match-3 board that does not depend on
//! how a cascade is sequenced. It has **no rendering dependency**: visuals are
//! reached only through the [`Presenter`] trait, observers only through
//! [`Match3Event`](types::Match3Event) subscriptions.
//!
//! - **Deterministic**: all randomness flows from a seeded [`SimpleRng`]
//! - **Headless**: [`HeadlessPresenter`] finishes every animation instantly
//!
//! # Module Structure
//!
//! - [`grid`]: type array, match search, gravity and refill (pure functions)
//! - [`catalog`]: common and special type codes for each game mode
//! - [`special`]: which types are special and what they clear when popped
//! - [`board`]: grid ownership, piece pool, pops and relocation
//! - [`presenter`]: the animation capability the board drives
//! - [`events`]: fan-out of events to subscribers
//! - [`stats`]: score and counters
//! - [`rng`]: deterministic random source
//!
//! # Match Rules
//!
//! - A **match** is a straight run of 3 or more identical non-empty types
//! - Runs that share a cell (L, T and + shapes) form a single group
//! - A new grid never starts with a match
//! - Refills only ever draw common types
//!
//! # Example
//!
//! ```
//! use match3_core::grid::{find_matches, Grid};
//!
//! let grid = Grid::from_rows(vec![
//!     vec![1, 1, 2],
//!     vec![3, 1, 2],
//!     vec![3, 3, 2],
//! ]);
//! let groups = find_matches(&grid, None);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].kind, 2);
//! ```

pub mod board;
pub mod catalog;
pub mod events;
pub mod grid;
pub mod presenter;
pub mod rng;
pub mod special;
pub mod stats;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Motion, PopRecord};
pub use catalog::{SpecialEffect, TypeCatalog};
pub use events::EventHub;
pub use grid::{Grid, MatchGroup};
pub use presenter::{Animation, DelayPresenter, HeadlessPresenter, Presenter};
pub use rng::{RandomSource, SimpleRng};
pub use special::{CatalogSpecials, SpecialPolicy};
pub use stats::Stats;
