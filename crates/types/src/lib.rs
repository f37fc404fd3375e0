//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the match-3 engine.
//! All types are plain data with no behaviour beyond conversions, making them
//! usable in any context (rules engine, presentation layer, event consumers).
//!
//! # Grid Addressing
//!
//! A board is a `rows x columns` grid of [`TypeCode`]s:
//!
//! - **Rows** are indexed top to bottom, starting at 0
//! - **Columns** are indexed left to right, starting at 0
//! - Type code [`EMPTY`] (`0`) marks a cell without a piece
//!
//! # Default Session
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_ROWS` | 9 | Grid rows |
//! | `DEFAULT_COLUMNS` | 7 | Grid columns |
//! | `DEFAULT_TILE_SIZE` | 50.0 | Cell size in view units |
//! | `MIN_MATCH_LEN` | 3 | Shortest run that counts as a match |
//!
//! # Examples
//!
//! ```
//! use match3_types::{GameMode, Position, EMPTY};
//!
//! let a = Position::new(2, 3);
//! assert!(a.is_adjacent(Position::new(2, 4)));
//! assert!(!a.is_adjacent(Position::new(3, 4)));
//!
//! assert_eq!(GameMode::from_name("HARD"), Some(GameMode::Hard));
//! assert_eq!(EMPTY, 0);
//! ```

use serde::{Deserialize, Serialize};

pub mod config;
pub mod event;

pub use config::{ConfigError, Match3Config};
pub use event::{Match3Event, MatchedRoundEvent, MoveEvent, PopEvent};

/// Default grid rows
pub const DEFAULT_ROWS: usize = 9;

/// Default grid columns
pub const DEFAULT_COLUMNS: usize = 7;

/// Default cell size in view units
pub const DEFAULT_TILE_SIZE: f32 = 50.0;

/// Default RNG seed for a session
pub const DEFAULT_SEED: u32 = 1;

/// Smallest accepted grid dimension (a run of 3 must fit)
pub const MIN_DIMENSION: usize = 3;

/// Largest accepted grid dimension
pub const MAX_DIMENSION: usize = 32;

/// Shortest run of identical types that forms a match
pub const MIN_MATCH_LEN: usize = 3;

/// Group size from which a round counts as "super special"
pub const SUPER_MATCH_LEN: usize = 5;

/// Points per popped common piece at combo level 1
pub const POP_POINTS: u32 = 10;

/// Points per popped special piece
pub const SPECIAL_POP_POINTS: u32 = 50;

/// Piece type code. Positive values name a piece kind, `0` is empty.
pub type TypeCode = u8;

/// Type code of an empty cell
pub const EMPTY: TypeCode = 0;

/// Grid coordinates: `row` top to bottom, `column` left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// True when `other` shares an edge with this position
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column) == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Stable handle of a live piece inside the board's piece pool.
///
/// Handles are recycled: once a piece is disposed its id may be handed to a
/// newly created piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// A piece bound to one occupied grid cell.
///
/// `row`/`column` mirror the cell the piece currently occupies and are kept in
/// sync by every relocation. `locked` is true while an animation owns the
/// piece's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: PieceId,
    pub kind: TypeCode,
    pub row: usize,
    pub column: usize,
    pub locked: bool,
}

impl Piece {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }
}

/// A point in view (presentation) space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Game difficulty, selecting how many common piece types are in play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Three common types, for scripted checks
    Test,
    Easy,
    #[default]
    Normal,
    Hard,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Test,
        GameMode::Easy,
        GameMode::Normal,
        GameMode::Hard,
    ];

    /// Parse mode from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::GameMode;
    ///
    /// assert_eq!(GameMode::from_name("easy"), Some(GameMode::Easy));
    /// assert_eq!(GameMode::from_name("Normal"), Some(GameMode::Normal));
    /// assert_eq!(GameMode::from_name("extreme"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "test" => Some(GameMode::Test),
            "easy" => Some(GameMode::Easy),
            "normal" => Some(GameMode::Normal),
            "hard" => Some(GameMode::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Test => "test",
            GameMode::Easy => "easy",
            GameMode::Normal => "normal",
            GameMode::Hard => "hard",
        }
    }
}

impl std::str::FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::from_name(s).ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
