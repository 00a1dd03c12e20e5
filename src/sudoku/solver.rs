use crate::sat::clause::ClauseKind;
use crate::sat::clause_set::ClauseSet;
use crate::sat::error::{Error, Result};
use crate::sat::formula::RawClause;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Cell values by row, `0` for an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    /// Wraps rows of cell values.
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    /// The rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Value at 1-based `(col, row)`, `0` if empty or out of range.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> usize {
        self.0
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .copied()
            .unwrap_or(0)
    }
}

impl From<Vec<Vec<usize>>> for Board {
    fn from(board: Vec<Vec<usize>>) -> Self {
        Self::new(board)
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

impl<const N: usize> From<[[usize; N]; N]> for Board {
    fn from(board: [[usize; N]; N]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.0.len().to_string().len();
        for row in &self.0 {
            let line = row
                .iter()
                .map(|&v| {
                    if v == 0 {
                        format!("{:>width$}", ".")
                    } else {
                        format!("{v:>width$}")
                    }
                })
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// A 9x9 sample puzzle.
pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// A 16x16 sample puzzle.
pub const EXAMPLE_SIXTEEN: [[usize; 16]; 16] = [
    [0, 11, 0, 0, 0, 2, 3, 14, 0, 0, 9, 12, 0, 0, 0, 16],
    [15, 12, 0, 0, 0, 11, 0, 1, 13, 10, 0, 0, 0, 0, 7, 2],
    [0, 0, 10, 0, 0, 0, 0, 0, 16, 11, 0, 1, 6, 4, 12, 3],
    [0, 16, 14, 1, 0, 4, 0, 6, 0, 3, 0, 15, 0, 8, 0, 0],
    [1, 6, 5, 12, 0, 0, 11, 0, 0, 9, 8, 0, 0, 0, 0, 0],
    [0, 0, 0, 7, 14, 1, 8, 0, 0, 15, 6, 0, 13, 5, 0, 4],
    [4, 15, 8, 0, 9, 13, 0, 0, 0, 0, 7, 16, 3, 0, 0, 0],
    [0, 9, 13, 0, 0, 0, 0, 15, 10, 0, 0, 0, 7, 6, 0, 11],
    [14, 0, 6, 11, 0, 0, 0, 12, 7, 0, 0, 0, 0, 3, 13, 0],
    [0, 0, 0, 5, 8, 14, 0, 0, 0, 0, 13, 11, 0, 1, 2, 6],
    [13, 0, 16, 4, 0, 15, 5, 0, 0, 1, 12, 6, 8, 0, 0, 0],
    [0, 0, 0, 0, 0, 16, 10, 0, 0, 8, 0, 0, 11, 9, 4, 5],
    [0, 0, 11, 0, 1, 0, 14, 0, 5, 0, 3, 0, 15, 7, 16, 0],
    [5, 13, 15, 3, 16, 0, 4, 7, 0, 0, 0, 0, 0, 2, 0, 0],
    [16, 1, 0, 0, 0, 0, 12, 2, 14, 0, 15, 0, 0, 0, 3, 8],
    [9, 0, 0, 0, 13, 5, 0, 0, 8, 6, 16, 0, 0, 0, 10, 0],
];

/// A pipe-separated sample puzzle: one row per
/// segment, spaces for empty cells, trailing spaces omitted.
pub const EXAMPLE_PIPES: &str =
    " 3|   195|  8    6|8   6|4  8    1|    2| 6    28|   419  5|       7|";

/// Side length of a board.
#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    /// 2x2 blocks.
    Four = 4,
    /// 3x3 blocks.
    Nine = 9,
    /// 4x4 blocks.
    Sixteen = 16,
    /// 5x5 blocks.
    TwentyFive = 25,
}

impl TryFrom<usize> for Size {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            16 => Ok(Self::Sixteen),
            25 => Ok(Self::TwentyFive),
            _ => Err(Error::InvalidSudoku(format!(
                "a board has 4, 9, 16 or 25 rows, not {value}"
            ))),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

impl Size {
    /// Side length of one block.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
            Self::TwentyFive => 5,
        }
    }
}

/// Name of the variable meaning "cell `(col, row)` holds `value`", all
/// 1-based.
#[must_use]
pub fn var_name(col: usize, row: usize, value: usize) -> String {
    format!("{col}x{row}:{value}")
}

/// A validated puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    /// Cell values, `0` for empty.
    pub board: Board,
    /// Side length of the board.
    pub size: Size,
}

impl Sudoku {
    /// Validates the board shape and the givens.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSudoku`] for an unsupported row count, an overlong row or
    /// a value above the board size.
    pub fn new(board: Board) -> Result<Self> {
        let size = Size::try_from(board.0.len())?;
        let n = usize::from(size);
        for (r, row) in board.0.iter().enumerate() {
            if row.len() > n {
                return Err(Error::InvalidSudoku(format!(
                    "row {} has {} cells, the board is {n} wide",
                    r + 1,
                    row.len()
                )));
            }
            if let Some(&v) = row.iter().find(|&&v| v > n) {
                return Err(Error::InvalidSudoku(format!(
                    "value {v} in row {} exceeds {n}",
                    r + 1
                )));
            }
        }
        Ok(Self { board, size })
    }

    /// Every row, column and block as lists of 1-based `(col, row)` cells.
    fn units(&self) -> Vec<Vec<(usize, usize)>> {
        let n = usize::from(self.size);
        let b = self.size.block_size();
        let rows = (1..=n).map(|row| (1..=n).map(|col| (col, row)).collect());
        let cols = (1..=n).map(|col| (1..=n).map(|row| (col, row)).collect());
        let blocks = (0..n).map(|block| {
            let (bc, br) = ((block % b) * b, (block / b) * b);
            (0..n).map(|i| (bc + i % b + 1, br + i / b + 1)).collect()
        });
        rows.chain(cols).chain(blocks).collect()
    }

    /// The puzzle as clauses:
    ///
    /// 1. every cell holds at least one value,
    /// 2. no cell holds two values,
    /// 3. every row, column and block contains every value,
    /// 4. no value repeats within a row, column or block,
    /// 5. the givens hold.
    #[must_use]
    pub fn to_clauses(&self) -> Vec<RawClause> {
        let n = usize::from(self.size);
        let pos = |c, r, v| (var_name(c, r, v), true);
        let neg = |c, r, v| (var_name(c, r, v), false);
        let cells = (1..=n).cartesian_product(1..=n).collect_vec();
        let units = self.units();
        let mut clauses: Vec<RawClause> = Vec::new();

        for &(row, col) in &cells {
            clauses.push((1..=n).map(|v| pos(col, row, v)).collect());
        }
        for &(row, col) in &cells {
            for (v1, v2) in (1..=n).tuple_combinations() {
                clauses.push(vec![neg(col, row, v1), neg(col, row, v2)]);
            }
        }
        for v in 1..=n {
            for unit in &units {
                clauses.push(unit.iter().map(|&(c, r)| pos(c, r, v)).collect());
            }
        }
        for v in 1..=n {
            for unit in &units {
                for (&(c1, r1), &(c2, r2)) in unit.iter().tuple_combinations() {
                    clauses.push(vec![neg(c1, r1, v), neg(c2, r2, v)]);
                }
            }
        }
        for &(row, col) in &cells {
            let v = self.board.get(col, row);
            if v != 0 {
                clauses.push(vec![pos(col, row, v)]);
            }
        }
        clauses
    }

    /// # Errors
    ///
    /// Never fails for a validated board; the signature follows
    /// [`ClauseSet::from_clauses`].
    pub fn to_clause_set<C: ClauseKind>(&self) -> Result<ClauseSet<C>> {
        ClauseSet::from_clauses(self.to_clauses())
    }

    /// Reads the board back from a solved clause set. Cells without a true
    /// value variable stay `0`.
    #[must_use]
    pub fn decode<C: ClauseKind>(&self, cs: &ClauseSet<C>) -> Board {
        let n = usize::from(self.size);
        let board = (1..=n)
            .map(|row| {
                (1..=n)
                    .map(|col| {
                        (1..=n)
                            .find(|&v| {
                                cs.find_variable(&var_name(col, row, v))
                                    .and_then(|var| cs.value(var))
                                    == Some(true)
                            })
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect();
        Board::new(board)
    }

    /// Whether `board` is complete, obeys the rules and agrees with the givens.
    #[must_use]
    pub fn is_solution(&self, board: &Board) -> bool {
        let n = usize::from(self.size);
        let full = (1..=n).all(|row| (1..=n).all(|col| (1..=n).contains(&board.get(col, row))));
        let keeps_givens = (1..=n).all(|row| {
            (1..=n).all(|col| {
                let given = self.board.get(col, row);
                given == 0 || given == board.get(col, row)
            })
        });
        let distinct = self
            .units()
            .iter()
            .all(|unit| unit.iter().map(|&(c, r)| board.get(c, r)).all_unique());
        full && keeps_givens && distinct
    }
}

impl FromStr for Sudoku {
    type Err = Error;

    /// Parses the pipe format: each row ends with `|`, empty cells are
    /// spaces, trailing spaces may be left out. Values above 9 use letters
    /// (`a` = 10).
    fn from_str(s: &str) -> Result<Self> {
        let mut segments: Vec<&str> = s.trim_matches(['\n', '\r']).split('|').collect();
        if segments.last().is_some_and(|l| l.trim().is_empty()) {
            segments.pop();
        }

        let rows = segments
            .iter()
            .map(|segment| {
                segment
                    .chars()
                    .map(|ch| match ch {
                        ' ' => Ok(0),
                        _ => ch
                            .to_digit(36)
                            .map(|d| d as usize)
                            .ok_or_else(|| Error::InvalidSudoku(format!("unexpected character '{ch}'"))),
                    })
                    .collect::<Result<Vec<usize>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(Board::new(rows))
    }
}

impl TryFrom<Board> for Sudoku {
    type Error = Error;

    fn try_from(board: Board) -> Result<Self> {
        Self::new(board)
    }
}

impl From<Sudoku> for Board {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.board
    }
}
