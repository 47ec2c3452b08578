use super::matrix::{choose_origin, AlignmentMatrix, Cell, Origin};

/// Position of a cell in the alignment matrix
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The parts in which global and local alignment differ: boundary
/// initialization, the score floor, and where traceback starts and stops.
pub trait AlignmentSpan {
    const NAME: &'static str;

    /// Whether the fill pass tracks the highest scoring cell
    const TRACK_BEST: bool;

    /// Cell for the `index`-th position of row 0 (`origin == Left`) or
    /// column 0 (`origin == Up`). Index 0 is never passed.
    fn boundary(index: usize, gap_penalty: i32, origin: Origin) -> Cell;

    /// Turn the three candidate scores into the stored cell
    fn close_cell(diag: i32, up: i32, left: i32) -> Cell;

    fn traceback_start(matrix: &AlignmentMatrix, best: CellPos) -> CellPos;

    fn is_traceback_end(cell: Cell, pos: CellPos) -> bool;
}

/// Needleman-Wunsch: end-to-end alignment of both sequences
#[derive(Copy, Clone, Debug, Default)]
pub struct Global;

impl AlignmentSpan for Global {
    const NAME: &'static str = "global";
    const TRACK_BEST: bool = false;

    #[inline]
    fn boundary(index: usize, gap_penalty: i32, origin: Origin) -> Cell {
        Cell::new(index as i32 * gap_penalty, origin)
    }

    #[inline]
    fn close_cell(diag: i32, up: i32, left: i32) -> Cell {
        choose_origin(diag, up, left)
    }

    fn traceback_start(matrix: &AlignmentMatrix, _: CellPos) -> CellPos {
        CellPos::new(matrix.rows() - 1, matrix.cols() - 1)
    }

    #[inline]
    fn is_traceback_end(_: Cell, pos: CellPos) -> bool {
        pos.row == 0 && pos.col == 0
    }
}

/// Smith-Waterman: best scoring pair of substrings
#[derive(Copy, Clone, Debug, Default)]
pub struct Local;

impl AlignmentSpan for Local {
    const NAME: &'static str = "local";
    const TRACK_BEST: bool = true;

    #[inline]
    fn boundary(_: usize, _: i32, _: Origin) -> Cell {
        Cell::default()
    }

    #[inline]
    fn close_cell(diag: i32, up: i32, left: i32) -> Cell {
        let cell = choose_origin(diag, up, left);

        // All candidates <= 0: this cell is a restart point
        if cell.score <= 0 {
            Cell::default()
        } else {
            cell
        }
    }

    fn traceback_start(_: &AlignmentMatrix, best: CellPos) -> CellPos {
        best
    }

    #[inline]
    fn is_traceback_end(cell: Cell, _: CellPos) -> bool {
        cell.score == 0
    }
}
