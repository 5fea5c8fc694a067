use serde::{Deserialize, Serialize};

/// One board square. Serialises flat as `{ "x": .., "y": .., ...state }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell<T> {
    pub x: usize,
    pub y: usize,
    #[serde(flatten)]
    pub state: T,
}

/// Rectangular board addressed by `(x, y)`, stored row-major.
///
/// Dimensions are fixed once built and every cell keeps the coordinate of
/// the slot it lives in: cells can be mutated but never moved or replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell<T>>>,
}

impl<T> Grid<T> {
    /// Builds a `width x height` grid, calling `init(x, y)` once per cell in
    /// row-major order. A non-positive dimension yields an empty grid.
    pub fn create<F>(width: i64, height: i64, mut init: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        if width <= 0 || height <= 0 {
            return Self {
                width: 0,
                height: 0,
                rows: Vec::new(),
            };
        }

        let (width, height) = (width as usize, height as usize);
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| Cell {
                        x,
                        y,
                        state: init(x, y),
                    })
                    .collect()
            })
            .collect();

        Self {
            width,
            height,
            rows,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn rows(&self) -> &[Vec<Cell<T>>] {
        &self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell<T>> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    /// Mutable access to a cell's state; the coordinate itself stays read-only
    pub fn state_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.rows
            .get_mut(y)
            .and_then(|row| row.get_mut(x))
            .map(|cell| &mut cell.state)
    }

    /// Visits every cell exactly once, row by row
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&Cell<T>),
    {
        self.rows.iter().flatten().for_each(|cell| visit(cell));
    }

    pub fn for_each_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(usize, usize, &mut T),
    {
        for cell in self.rows.iter_mut().flatten() {
            visit(cell.x, cell.y, &mut cell.state);
        }
    }
}

/// Maps a 1-based track position onto a serpentine board.
///
/// Position 1 sits in the bottom-left corner, odd rows (counting from the
/// bottom) run right-to-left. Returned `y` is the grid row with 0 at the top.
/// Boards too large to count in a `usize` accept every position.
pub fn track_cell(position: usize, width: usize, height: usize) -> Option<(usize, usize)> {
    if position == 0 || width == 0 || position > width.saturating_mul(height) {
        return None;
    }

    let tile = position - 1;
    let row_from_bottom = tile / width;
    let offset = tile % width;
    let x = if row_from_bottom % 2 == 0 {
        offset
    } else {
        width - 1 - offset
    };

    Some((x, height - 1 - row_from_bottom))
}
