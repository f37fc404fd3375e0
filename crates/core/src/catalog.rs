//! Piece-type catalog
//!
//! Each game mode selects a set of *common* piece kinds (the ones that match
//! and refill) followed by the fixed set of *special* kinds. Codes are
//! assigned contiguously from 1: commons first, then specials, so the two
//! sets never overlap.
//!
//! | Mode | Common kinds |
//! |------|--------------|
//! | test | 3 |
//! | easy | 4 |
//! | normal | 5 |
//! | hard | 6 |

use crate::types::{GameMode, TypeCode, EMPTY};

const COMMON_NAMES: [&str; 6] = [
    "piece-red",
    "piece-green",
    "piece-blue",
    "piece-yellow",
    "piece-purple",
    "piece-orange",
];

const SPECIAL_PIECES: [(&str, SpecialEffect); 4] = [
    ("special-blast", SpecialEffect::Blast),
    ("special-row", SpecialEffect::Row),
    ("special-column", SpecialEffect::Column),
    ("special-colour", SpecialEffect::Colour),
];

/// What a special piece clears when it is popped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialEffect {
    /// 3x3 area around the piece
    Blast,
    /// The piece's whole row
    Row,
    /// The piece's whole column
    Column,
    /// Every piece of the most frequent common type
    Colour,
}

fn common_count(mode: GameMode) -> usize {
    match mode {
        GameMode::Test => 3,
        GameMode::Easy => 4,
        GameMode::Normal => 5,
        GameMode::Hard => 6,
    }
}

/// Type codes and names in play for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCatalog {
    mode: GameMode,
    /// Name of type code `i + 1` at index `i`
    names: Vec<&'static str>,
    common: Vec<TypeCode>,
    special: Vec<TypeCode>,
}

impl TypeCatalog {
    pub fn for_mode(mode: GameMode) -> Self {
        let count = common_count(mode);
        let mut names: Vec<&'static str> = COMMON_NAMES[..count].to_vec();
        names.extend(SPECIAL_PIECES.iter().map(|(name, _)| *name));

        let common = (1..=count as TypeCode).collect();
        let special = (count as TypeCode + 1..=names.len() as TypeCode).collect();

        Self {
            mode,
            names,
            common,
            special,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Types that initial grids and refills draw from
    pub fn common(&self) -> &[TypeCode] {
        &self.common
    }

    pub fn special(&self) -> &[TypeCode] {
        &self.special
    }

    pub fn name(&self, code: TypeCode) -> Option<&'static str> {
        if code == EMPTY {
            return None;
        }
        self.names.get(code as usize - 1).copied()
    }

    pub fn is_common(&self, code: TypeCode) -> bool {
        self.common.contains(&code)
    }

    pub fn is_special(&self, code: TypeCode) -> bool {
        self.special.contains(&code)
    }

    /// True for `EMPTY` and every code in the catalog
    pub fn is_valid(&self, code: TypeCode) -> bool {
        code == EMPTY || (code as usize) <= self.names.len()
    }

    pub fn effect(&self, code: TypeCode) -> Option<SpecialEffect> {
        let index = self.special.iter().position(|&c| c == code)?;
        Some(SPECIAL_PIECES[index].1)
    }

    pub fn special_code(&self, effect: SpecialEffect) -> TypeCode {
        let index = SPECIAL_PIECES
            .iter()
            .position(|(_, e)| *e == effect)
            .unwrap_or_default();
        self.special[index]
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::for_mode(GameMode::default())
    }
}
