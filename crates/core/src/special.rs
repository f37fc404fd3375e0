//! Special-piece policy
//!
//! Which type codes are special, what a special piece clears when popped, and
//! which matches turn into a new special piece. The board and the action
//! coordinator only go through [`SpecialPolicy`], so the behaviour can be
//! swapped per game.

use crate::catalog::{SpecialEffect, TypeCatalog};
use crate::grid::{Grid, MatchGroup};
use crate::types::{Position, TypeCode, EMPTY, SUPER_MATCH_LEN};

pub trait SpecialPolicy: Send {
    fn is_special(&self, kind: TypeCode) -> bool;

    /// Cells cleared when the special piece `kind` at `origin` pops.
    ///
    /// Called after `origin` itself has been cleared.
    fn trigger(&self, grid: &Grid, origin: Position, kind: TypeCode) -> Vec<Position>;

    /// Whether specials popped by a trigger fire their own trigger
    fn recursive(&self) -> bool {
        false
    }

    /// Special type to leave behind after `group` is popped, if any
    fn spawn_for_group(&self, _group: &MatchGroup) -> Option<TypeCode> {
        None
    }
}

/// Specials resolved through the session's [`TypeCatalog`]
#[derive(Debug, Clone)]
pub struct CatalogSpecials {
    catalog: TypeCatalog,
    recursive: bool,
}

impl CatalogSpecials {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            recursive: false,
        }
    }

    /// Let triggered specials chain into further triggers
    pub fn with_recursion(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Most frequent common type on the grid; ties go to the lowest code
    fn dominant_common(&self, grid: &Grid) -> Option<TypeCode> {
        let mut best: Option<(TypeCode, usize)> = None;
        for &kind in self.catalog.common() {
            let count = grid.cells().iter().filter(|&&c| c == kind).count();
            if count > 0 && best.map_or(true, |(_, n)| count > n) {
                best = Some((kind, count));
            }
        }
        best.map(|(kind, _)| kind)
    }
}

impl SpecialPolicy for CatalogSpecials {
    fn is_special(&self, kind: TypeCode) -> bool {
        self.catalog.is_special(kind)
    }

    fn trigger(&self, grid: &Grid, origin: Position, kind: TypeCode) -> Vec<Position> {
        let Some(effect) = self.catalog.effect(kind) else {
            return Vec::new();
        };

        let area: Vec<Position> = match effect {
            SpecialEffect::Blast => grid.area_around(origin).into_iter().collect(),
            SpecialEffect::Row => (0..grid.columns())
                .map(|column| Position::new(origin.row, column))
                .collect(),
            SpecialEffect::Column => (0..grid.rows())
                .map(|row| Position::new(row, origin.column))
                .collect(),
            SpecialEffect::Colour => match self.dominant_common(grid) {
                Some(target) => grid
                    .positions()
                    .filter(|&pos| grid.type_at(pos) == target)
                    .collect(),
                None => Vec::new(),
            },
        };

        area.into_iter()
            .filter(|&pos| pos != origin && grid.type_at(pos) != EMPTY)
            .collect()
    }

    fn recursive(&self) -> bool {
        self.recursive
    }

    fn spawn_for_group(&self, group: &MatchGroup) -> Option<TypeCode> {
        let effect = if group.spans_both_axes() {
            SpecialEffect::Blast
        } else if group.len() >= SUPER_MATCH_LEN {
            SpecialEffect::Colour
        } else if group.len() == 4 && group.horizontal {
            SpecialEffect::Row
        } else if group.len() == 4 && group.vertical {
            SpecialEffect::Column
        } else {
            return None;
        };
        Some(self.catalog.special_code(effect))
    }
}
