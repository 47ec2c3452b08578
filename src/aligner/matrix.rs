use crate::errors::AlignError;

/// Which neighbour produced the optimal score of a cell.
///
/// The predecessor coordinates follow from the tag: `(i-1, j-1)` for
/// `Diagonal`, `(i-1, j)` for `Up` and `(i, j-1)` for `Left`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    /// Start of an alignment path
    #[default]
    None,

    /// Consumes a symbol of both sequences
    Diagonal,

    /// Consumes a symbol of the first sequence only
    Up,

    /// Consumes a symbol of the second sequence only
    Left,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub score: i32,
    pub origin: Origin,
}

impl Cell {
    pub fn new(score: i32, origin: Origin) -> Self {
        Self { score, origin }
    }
}

/// Pick the best of the three candidate scores.
///
/// Ties go to the diagonal first, then up, then left. This is a fixed
/// convention that keeps the output reproducible.
#[inline]
pub fn choose_origin(diag: i32, up: i32, left: i32) -> Cell {
    if diag >= up && diag >= left {
        Cell::new(diag, Origin::Diagonal)
    } else if up >= left {
        Cell::new(up, Origin::Up)
    } else {
        Cell::new(left, Origin::Left)
    }
}

/// Row-major `(len1 + 1) x (len2 + 1)` grid of cells.
pub struct AlignmentMatrix {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl AlignmentMatrix {
    pub fn new(len1: usize, len2: usize) -> Result<Self, AlignError> {
        let rows = len1 + 1;
        let cols = len2 + 1;
        let size = rows.checked_mul(cols)
            .ok_or(AlignError::SequenceTooLong(len1.max(len2)))?;

        Ok(Self {
            cells: vec![Cell::default(); size],
            rows,
            cols,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols, "({row}, {col}) out of bounds");
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let ix = self.index(row, col);
        self.cells[ix] = cell;
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.cols]
    }
}


#[cfg(test)]
mod tests {
    use super::{choose_origin, AlignmentMatrix, Cell, Origin};

    #[test]
    fn test_tie_break_order() {
        assert_eq!(choose_origin(1, 1, 1), Cell::new(1, Origin::Diagonal));
        assert_eq!(choose_origin(0, 1, 1), Cell::new(1, Origin::Up));
        assert_eq!(choose_origin(0, 0, 1), Cell::new(1, Origin::Left));
        assert_eq!(choose_origin(-3, -1, -1), Cell::new(-1, Origin::Up));
        assert_eq!(choose_origin(2, 3, -1), Cell::new(3, Origin::Up));
        assert_eq!(choose_origin(2, -3, 2), Cell::new(2, Origin::Diagonal));
    }

    #[test]
    fn test_matrix_layout() {
        let mut matrix = AlignmentMatrix::new(2, 3).unwrap();
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.cols(), 4);
        assert!(matrix.row(2).iter().all(|c| *c == Cell::default()));

        matrix.set(1, 2, Cell::new(7, Origin::Left));
        assert_eq!(matrix.get(1, 2), Cell::new(7, Origin::Left));
        assert_eq!(matrix.row(1)[2].score, 7);
        assert_eq!(matrix.get(2, 1), Cell::default());
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = AlignmentMatrix::new(0, 0).unwrap();
        assert_eq!(matrix.get(0, 0), Cell::default());
    }
}
