//! Grid module - the board's type array and the pure functions over it
//!
//! The grid is a `rows x columns` array of [`TypeCode`]s stored row-major in a
//! flat vector. Everything here is synchronous and free of pieces, animation
//! and events: the board and the cascade engine build on these functions.
//!
//! Out-of-bounds writes are programming errors and panic. Reads come in two
//! flavours: [`Grid::get`] returns `None` outside the grid, [`Grid::type_at`]
//! panics.

use std::fmt;

use arrayvec::ArrayVec;

use crate::rng::RandomSource;
use crate::types::{Position, TypeCode, EMPTY, MIN_MATCH_LEN};

/// Rectangular array of piece type codes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    columns: usize,
    /// Row-major (row * columns + column)
    cells: Vec<TypeCode>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![EMPTY; rows * columns],
        }
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<TypeCode>>) -> Self {
        let columns = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == columns),
            "grid rows must all have {} columns",
            columns
        );
        Self {
            rows: rows.len(),
            columns,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<TypeCode>> {
        self.cells
            .chunks(self.columns.max(1))
            .map(<[TypeCode]>::to_vec)
            .collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cells(&self) -> &[TypeCode] {
        &self.cells
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.rows || pos.column >= self.columns {
            return None;
        }
        Some(pos.row * self.columns + pos.column)
    }

    #[inline(always)]
    fn index_or_panic(&self, pos: Position) -> usize {
        match self.index(pos) {
            Some(idx) => idx,
            None => panic!(
                "position {} is outside the {}x{} grid",
                pos, self.rows, self.columns
            ),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Type at `pos`, or `None` outside the grid
    pub fn get(&self, pos: Position) -> Option<TypeCode> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Type at `pos`. Panics outside the grid.
    pub fn type_at(&self, pos: Position) -> TypeCode {
        self.cells[self.index_or_panic(pos)]
    }

    /// Set type at `pos`. Panics outside the grid.
    pub fn set_type(&mut self, pos: Position, kind: TypeCode) {
        let idx = self.index_or_panic(pos);
        self.cells[idx] = kind;
    }

    /// Exchange the types of two cells. Panics if either is outside the grid.
    pub fn swap(&mut self, a: Position, b: Position) {
        let ia = self.index_or_panic(a);
        let ib = self.index_or_panic(b);
        self.cells.swap(ia, ib);
    }

    /// All positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.columns).map(move |column| Position::new(row, column)))
    }

    /// The in-bounds cells of the 3x3 square centred on `pos` (including `pos`)
    pub fn area_around(&self, pos: Position) -> ArrayVec<Position, 9> {
        let mut out = ArrayVec::new();
        let rows = pos.row.saturating_sub(1)..=(pos.row + 1).min(self.rows.saturating_sub(1));
        for row in rows {
            let columns =
                pos.column.saturating_sub(1)..=(pos.column + 1).min(self.columns.saturating_sub(1));
            for column in columns {
                out.push(Position::new(row, column));
            }
        }
        out
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != EMPTY)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.columns.max(1)).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "|")?;
            for cell in row {
                if *cell == EMPTY {
                    write!(f, " .|")?;
                } else {
                    write!(f, "{:2}|", cell)?;
                }
            }
        }
        Ok(())
    }
}

/// One match: a set of same-type cells made of one or more crossing runs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchGroup {
    pub kind: TypeCode,
    /// Sorted and unique
    pub positions: Vec<Position>,
    /// Contains a horizontal run
    pub horizontal: bool,
    /// Contains a vertical run
    pub vertical: bool,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.binary_search(&pos).is_ok()
    }

    /// L, T and + shapes
    pub fn spans_both_axes(&self) -> bool {
        self.horizontal && self.vertical
    }
}

/// Build a grid with no pre-existing match.
///
/// Cells are filled row-major; a cell never takes the type that would
/// complete a run of three with its two left or its two upper neighbours.
/// With fewer than three allowed types a match-free grid may not exist, in
/// which case the excluded type is drawn anyway.
pub fn create_grid<R: RandomSource + ?Sized>(
    rows: usize,
    columns: usize,
    allowed: &[TypeCode],
    rng: &mut R,
) -> Grid {
    assert!(!allowed.is_empty(), "create_grid needs at least one type");

    let mut grid = Grid::new(rows, columns);
    let mut candidates: Vec<TypeCode> = Vec::with_capacity(allowed.len());

    for row in 0..rows {
        for column in 0..columns {
            let left = (column >= 2)
                .then(|| {
                    let a = grid.type_at(Position::new(row, column - 1));
                    let b = grid.type_at(Position::new(row, column - 2));
                    (a == b).then_some(a)
                })
                .flatten();
            let above = (row >= 2)
                .then(|| {
                    let a = grid.type_at(Position::new(row - 1, column));
                    let b = grid.type_at(Position::new(row - 2, column));
                    (a == b).then_some(a)
                })
                .flatten();

            candidates.clear();
            candidates.extend(
                allowed
                    .iter()
                    .copied()
                    .filter(|&t| Some(t) != left && Some(t) != above),
            );

            let kind = if candidates.is_empty() {
                pick_random_type(allowed, rng)
            } else {
                pick_random_type(&candidates, rng)
            };
            grid.set_type(Position::new(row, column), kind);
        }
    }

    grid
}

/// Uniform choice from `allowed`. Panics if `allowed` is empty.
pub fn pick_random_type<R: RandomSource + ?Sized>(allowed: &[TypeCode], rng: &mut R) -> TypeCode {
    assert!(!allowed.is_empty(), "pick_random_type needs at least one type");
    allowed[rng.next_range(allowed.len() as u32) as usize]
}

/// A maximal straight run, before merging
struct Run {
    kind: TypeCode,
    cells: Vec<Position>,
    horizontal: bool,
}

fn collect_runs(grid: &Grid, horizontal: bool, out: &mut Vec<Run>) {
    let (lines, len) = if horizontal {
        (grid.rows, grid.columns)
    } else {
        (grid.columns, grid.rows)
    };
    let at = |line: usize, i: usize| {
        if horizontal {
            Position::new(line, i)
        } else {
            Position::new(i, line)
        }
    };

    for line in 0..lines {
        let mut start = 0;
        while start < len {
            let kind = grid.type_at(at(line, start));
            let mut end = start + 1;
            while end < len && grid.type_at(at(line, end)) == kind {
                end += 1;
            }
            if kind != EMPTY && end - start >= MIN_MATCH_LEN {
                out.push(Run {
                    kind,
                    cells: (start..end).map(|i| at(line, i)).collect(),
                    horizontal,
                });
            }
            start = end;
        }
    }
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Find every match group in the grid.
///
/// Horizontal and vertical runs of at least [`MIN_MATCH_LEN`] identical
/// non-empty types are collected, then runs sharing a cell are merged, so an
/// L/T/+ junction yields one group and no cell appears in two groups.
///
/// With `touched`, only groups containing at least one touched position are
/// returned. Groups are ordered by their first (smallest) position.
pub fn find_matches(grid: &Grid, touched: Option<&[Position]>) -> Vec<MatchGroup> {
    let mut runs = Vec::new();
    collect_runs(grid, true, &mut runs);
    let horizontal_count = runs.len();
    collect_runs(grid, false, &mut runs);

    if runs.is_empty() {
        return Vec::new();
    }

    // Which horizontal run covers each cell; horizontal runs never overlap each other.
    let mut owner: Vec<Option<usize>> = vec![None; grid.cells.len()];
    for (i, run) in runs[..horizontal_count].iter().enumerate() {
        for &pos in &run.cells {
            owner[pos.row * grid.columns + pos.column] = Some(i);
        }
    }

    let mut parent: Vec<usize> = (0..runs.len()).collect();
    for (i, run) in runs.iter().enumerate().skip(horizontal_count) {
        for &pos in &run.cells {
            if let Some(h) = owner[pos.row * grid.columns + pos.column] {
                let a = find_root(&mut parent, i);
                let b = find_root(&mut parent, h);
                if a != b {
                    parent[a] = b;
                }
            }
        }
    }

    let mut groups: Vec<MatchGroup> = Vec::new();
    let mut group_of_root: Vec<Option<usize>> = vec![None; runs.len()];
    for i in 0..runs.len() {
        let root = find_root(&mut parent, i);
        let run = &runs[i];
        let slot = match group_of_root[root] {
            Some(slot) => slot,
            None => {
                groups.push(MatchGroup {
                    kind: run.kind,
                    positions: Vec::new(),
                    horizontal: false,
                    vertical: false,
                });
                group_of_root[root] = Some(groups.len() - 1);
                groups.len() - 1
            }
        };
        let group = &mut groups[slot];
        group.positions.extend_from_slice(&run.cells);
        if run.horizontal {
            group.horizontal = true;
        } else {
            group.vertical = true;
        }
    }

    for group in &mut groups {
        group.positions.sort_unstable();
        group.positions.dedup();
    }

    if let Some(touched) = touched {
        groups.retain(|g| touched.iter().any(|&p| g.contains(p)));
    }

    groups.sort_by(|a, b| a.positions[0].cmp(&b.positions[0]));
    groups
}

/// All empty cells, row-major
pub fn find_empty_positions(grid: &Grid) -> Vec<Position> {
    grid.positions()
        .filter(|&pos| grid.type_at(pos) == EMPTY)
        .collect()
}

/// Moves that compact every column downward.
///
/// Non-empty cells keep their relative order; only cells whose row changes
/// are reported. Shifts are listed column by column, bottom to top, so they
/// can be applied one after another without overwriting an unmoved cell.
pub fn compute_gravity_shifts(grid: &Grid) -> Vec<(Position, Position)> {
    let mut shifts = Vec::new();
    for column in 0..grid.columns {
        let mut write = grid.rows;
        for row in (0..grid.rows).rev() {
            if grid.type_at(Position::new(row, column)) == EMPTY {
                continue;
            }
            write -= 1;
            if write != row {
                shifts.push((Position::new(row, column), Position::new(write, column)));
            }
        }
    }
    shifts
}

/// Apply shifts from [`compute_gravity_shifts`] to the type array
pub fn apply_gravity_shifts(grid: &mut Grid, shifts: &[(Position, Position)]) {
    for &(from, to) in shifts {
        let kind = grid.type_at(from);
        grid.set_type(to, kind);
        grid.set_type(from, EMPTY);
    }
}

/// Fill the empty top of every column with fresh common types.
///
/// Only the empty cells above a column's first occupied cell are filled
/// (after gravity that is every empty cell). Returns the filled positions
/// column by column, bottom to top.
pub fn generate_refill<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    common: &[TypeCode],
    rng: &mut R,
) -> Vec<Position> {
    let mut filled = Vec::new();
    for column in 0..grid.columns {
        let first_occupied = (0..grid.rows)
            .find(|&row| grid.type_at(Position::new(row, column)) != EMPTY)
            .unwrap_or(grid.rows);
        for row in (0..first_occupied).rev() {
            let pos = Position::new(row, column);
            grid.set_type(pos, pick_random_type(common, rng));
            filled.push(pos);
        }
    }
    filled
}

/// Would swapping `a` and `b` create a match involving either cell?
///
/// Works on a copy; `grid` is left untouched.
pub fn swap_creates_match(grid: &Grid, a: Position, b: Position) -> bool {
    let mut scratch = grid.clone();
    scratch.swap(a, b);
    !find_matches(&scratch, Some(&[a, b])).is_empty()
}

/// Every adjacent swap that a player could legally make.
///
/// A swap is listed when both cells hold a piece and either one of them is
/// special or the swap creates a match. Each pair is reported once, with the
/// upper/left cell first.
pub fn find_possible_moves<F>(grid: &Grid, is_special: F) -> Vec<(Position, Position)>
where
    F: Fn(TypeCode) -> bool,
{
    let mut scratch = grid.clone();
    let mut moves = Vec::new();

    for from in grid.positions() {
        let candidates = [
            Position::new(from.row, from.column + 1),
            Position::new(from.row + 1, from.column),
        ];
        for to in candidates {
            let (Some(a), Some(b)) = (grid.get(from), grid.get(to)) else {
                continue;
            };
            if a == EMPTY || b == EMPTY || a == b {
                continue;
            }
            let legal = if is_special(a) || is_special(b) {
                true
            } else {
                scratch.swap(from, to);
                let found = !find_matches(&scratch, Some(&[from, to])).is_empty();
                scratch.swap(from, to);
                found
            };
            if legal {
                moves.push((from, to));
            }
        }
    }

    moves
}
