//! Selection cursor over a row-major grid of items

/// A navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// 2D cursor with wrap-around. The last row may be partially filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionGrid {
    columns: usize,
    item_count: usize,
    row: usize,
    col: usize,
}

impl SelectionGrid {
    /// A zero column count is treated as one column.
    pub fn new(columns: usize, item_count: usize) -> Self {
        Self {
            columns: columns.max(1),
            item_count,
            row: 0,
            col: 0,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Changes the item count. The cursor is left alone until the next read
    /// or move finds it out of range.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
    }

    /// `(row, col)`.
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn reset(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    /// Moves the cursor one step, wrapping at the edges of the current row or
    /// column. Does nothing when the grid is empty.
    pub fn navigate(&mut self, direction: Direction) {
        if self.item_count == 0 {
            return;
        }
        self.normalize();

        let max_row = (self.item_count - 1) / self.columns;
        match direction {
            Direction::Up => {
                self.row = if self.row == 0 { max_row } else { self.row - 1 };
                self.col = self.col.min(self.max_col(self.row));
            }
            Direction::Down => {
                self.row = if self.row >= max_row { 0 } else { self.row + 1 };
                self.col = self.col.min(self.max_col(self.row));
            }
            Direction::Left => {
                self.col = if self.col == 0 {
                    self.max_col(self.row)
                } else {
                    self.col - 1
                };
            }
            Direction::Right => {
                self.col = if self.col >= self.max_col(self.row) {
                    0
                } else {
                    self.col + 1
                };
            }
        }
    }

    /// Flat index of the cursor, `None` for an empty grid.
    ///
    /// A cursor left outside `[0, item_count)` by a shrinking item count is
    /// reset to `(0, 0)` first.
    pub fn index(&mut self) -> Option<usize> {
        if self.item_count == 0 {
            return None;
        }
        self.normalize();
        Some(self.flat_index())
    }

    fn flat_index(&self) -> usize {
        self.row * self.columns + self.col
    }

    fn normalize(&mut self) {
        if self.col >= self.columns || self.flat_index() >= self.item_count {
            self.reset();
        }
    }

    /// Last column of `row`. Requires a non-empty grid and `row <= max_row`.
    fn max_col(&self, row: usize) -> usize {
        (self.columns - 1).min(self.item_count - 1 - row * self.columns)
    }
}
