//! Session statistics and scoring
//!
//! Score per popped piece scales with the combo level (the process round):
//!
//! | Pop | Points |
//! |-----|--------|
//! | Common piece | `POP_POINTS * max(round, 1)` |
//! | Common piece cleared by a special | half of the above |
//! | Special piece | `SPECIAL_POP_POINTS` |

use crate::types::{POP_POINTS, SPECIAL_POP_POINTS};

/// Points awarded for one pop
pub fn pop_score(round: u32, is_special: bool, caused_by_special: bool) -> u32 {
    if is_special {
        return SPECIAL_POP_POINTS;
    }
    let base = POP_POINTS * round.max(1);
    if caused_by_special {
        base / 2
    } else {
        base
    }
}

/// Running totals for one play session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub score: u32,
    pub pops: u32,
    pub special_pops: u32,
    /// Match groups resolved
    pub matches: u32,
    /// Committed swaps
    pub moves: u32,
    /// Swaps that were attempted and reverted
    pub invalid_moves: u32,
    /// Highest round reached in any cascade
    pub best_combo: u32,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pop(&mut self, round: u32, is_special: bool, caused_by_special: bool) {
        self.pops += 1;
        if is_special {
            self.special_pops += 1;
        }
        self.score += pop_score(round, is_special, caused_by_special);
    }

    pub fn register_matches(&mut self, count: usize) {
        self.matches += count as u32;
    }

    pub fn register_move(&mut self, valid: bool) {
        if valid {
            self.moves += 1;
        } else {
            self.invalid_moves += 1;
        }
    }

    pub fn register_round(&mut self, round: u32) {
        self.best_combo = self.best_combo.max(round);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_score_table() {
        assert_eq!(pop_score(0, false, false), POP_POINTS);
        assert_eq!(pop_score(1, false, false), POP_POINTS);
        assert_eq!(pop_score(3, false, false), POP_POINTS * 3);
        assert_eq!(pop_score(2, false, true), POP_POINTS);
        assert_eq!(pop_score(4, true, false), SPECIAL_POP_POINTS);
        assert_eq!(pop_score(4, true, true), SPECIAL_POP_POINTS);
    }

    #[test]
    fn test_register_pop_accumulates() {
        let mut stats = Stats::new();
        stats.register_pop(1, false, false);
        stats.register_pop(2, false, false);
        stats.register_pop(2, true, false);

        assert_eq!(stats.pops, 3);
        assert_eq!(stats.special_pops, 1);
        assert_eq!(stats.score, POP_POINTS + POP_POINTS * 2 + SPECIAL_POP_POINTS);
    }

    #[test]
    fn test_moves_and_combo() {
        let mut stats = Stats::new();
        stats.register_move(true);
        stats.register_move(false);
        stats.register_move(false);
        stats.register_round(2);
        stats.register_round(1);

        assert_eq!(stats.moves, 1);
        assert_eq!(stats.invalid_moves, 2);
        assert_eq!(stats.best_combo, 2);

        stats.reset();
        assert_eq!(stats, Stats::default());
    }
}
