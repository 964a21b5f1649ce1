//! Grid connectivity analysis
//!
//! Counts the "islands" of a captured memory-test grid: maximal groups of
//! occupied cells joined horizontally or vertically (never diagonally).

use crate::error::AnalysisError;
use crate::types::GridRound;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Row/column offsets of the four orthogonal neighbours
const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Rectangular grid of cells; 0 is empty, anything greater is occupied.
///
/// Rows are validated on construction, so every `Grid` is rectangular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// Build a grid from rows, failing if the rows differ in length
    pub fn new(rows: Vec<Vec<u32>>) -> Result<Self, AnalysisError> {
        let cols = rows.first().map_or(0, Vec::len);

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != cols)
        {
            return Err(AnalysisError::MalformedGrid {
                row,
                expected: cols,
                found,
            });
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a grid from active/inactive flags (visual memory boards)
    pub fn from_flags(rows: &[Vec<bool>]) -> Result<Self, AnalysisError> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|&active| u32::from(active)).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell value, or `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0).count()
    }

    /// Rows as nested vectors
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.cols).map(<[u32]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<u32>>> for Grid {
    type Error = AnalysisError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<Grid> for Vec<Vec<u32>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

/// Island sizes of a grid, largest first.
///
/// Flood fills an owned occupancy mask with an explicit stack, so neither the
/// grid nor the call stack depth depends on island size.
pub fn island_sizes(grid: &Grid) -> Vec<usize> {
    let (rows, cols) = (grid.rows, grid.cols);
    let mut unvisited: Vec<bool> = grid.cells.iter().map(|&c| c > 0).collect();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut islands = Vec::new();

    for start in 0..unvisited.len() {
        if !unvisited[start] {
            continue;
        }

        unvisited[start] = false;
        stack.push((start / cols, start % cols));
        let mut size = 0;

        while let Some((row, col)) = stack.pop() {
            size += 1;

            for (dr, dc) in NEIGHBOURS {
                let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc))
                else {
                    continue;
                };
                if r >= rows || c >= cols {
                    continue;
                }

                let idx = r * cols + c;
                if unvisited[idx] {
                    unvisited[idx] = false;
                    stack.push((r, c));
                }
            }
        }

        islands.push(size);
    }

    islands.sort_unstable_by(|a, b| b.cmp(a));
    debug!(rows, cols, islands = ?islands, "computed grid islands");
    islands
}

/// Island sizes of raw rows, validating that they form a rectangle
pub fn get_islands(rows: &[Vec<u32>]) -> Result<Vec<usize>, AnalysisError> {
    let grid = Grid::new(rows.to_vec())?;
    Ok(island_sizes(&grid))
}

impl GridRound {
    /// Pair a grid with its island sizes
    pub fn analyze(grid: Grid) -> Self {
        let islands = island_sizes(&grid);
        Self {
            grid: grid.to_rows(),
            islands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_documented_example() {
        let islands = get_islands(&[vec![1, 0, 1], vec![0, 1, 1], vec![1, 0, 0]]).unwrap();
        assert_eq!(islands, vec![3, 1, 1]);
    }

    #[test]
    fn test_empty_and_all_zero_grids() {
        assert!(get_islands(&[]).unwrap().is_empty());
        assert!(get_islands(&[vec![], vec![]]).unwrap().is_empty());
        assert!(get_islands(&[vec![0, 0], vec![0, 0]]).unwrap().is_empty());
    }

    #[test]
    fn test_fully_connected_grid() {
        let rows = vec![vec![7; 5]; 4];
        assert_eq!(get_islands(&rows).unwrap(), vec![20]);
    }

    #[test]
    fn test_diagonals_do_not_connect() {
        let rows = vec![vec![1, 0, 1], vec![0, 1, 0], vec![1, 0, 1]];
        assert_eq!(get_islands(&rows).unwrap(), vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_cell_numbers_count_as_occupied() {
        // Chimp grids carry the number shown in each cell
        let rows = vec![vec![0, 3, 4, 0], vec![0, 0, 12, 0], vec![9, 0, 0, 0]];
        assert_eq!(get_islands(&rows).unwrap(), vec![3, 1]);
    }

    #[test]
    fn test_winding_island() {
        let rows = vec![
            vec![1, 1, 1, 1, 1],
            vec![0, 0, 0, 0, 1],
            vec![1, 1, 1, 0, 1],
            vec![1, 0, 1, 1, 1],
            vec![1, 0, 0, 0, 0],
        ];
        assert_eq!(get_islands(&rows).unwrap(), vec![15]);
    }

    #[test]
    fn test_large_single_island_uses_no_recursion() {
        let rows = vec![vec![1; 400]; 400];
        assert_eq!(get_islands(&rows).unwrap(), vec![160_000]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let grid = Grid::new(vec![vec![1, 1], vec![0, 1]]).unwrap();
        let before = grid.clone();
        let _ = island_sizes(&grid);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_ragged_rows_fail_loudly() {
        let result = get_islands(&[vec![1, 0, 1], vec![1, 0]]);
        assert!(matches!(
            result,
            Err(AnalysisError::MalformedGrid {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_grid_round_trips_through_serde() {
        let grid: Grid = serde_json::from_str("[[0,1],[1,1]]").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.get(1, 0), Some(1));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(serde_json::to_string(&grid).unwrap(), "[[0,1],[1,1]]");

        assert!(serde_json::from_str::<Grid>("[[0,1],[1]]").is_err());
    }

    #[test]
    fn test_from_flags() {
        let grid = Grid::from_flags(&[vec![true, false], vec![true, true]]).unwrap();
        assert_eq!(grid.occupied_count(), 3);
        assert_eq!(island_sizes(&grid), vec![3]);
    }

    #[test]
    fn test_grid_round_analyze() {
        let round = GridRound::analyze(Grid::new(vec![vec![1, 0], vec![0, 2]]).unwrap());
        assert_eq!(round.grid, vec![vec![1, 0], vec![0, 2]]);
        assert_eq!(round.islands, vec![1, 1]);
    }

    proptest! {
        #[test]
        fn prop_island_sizes_sum_to_occupied_cells(
            rows in 0usize..12,
            cols in 1usize..12,
            seed in proptest::collection::vec(0u32..3, 144)
        ) {
            let cells: Vec<Vec<u32>> = (0..rows)
                .map(|r| (0..cols).map(|c| seed[r * cols + c]).collect())
                .collect();
            let grid = Grid::new(cells).unwrap();
            let islands = island_sizes(&grid);

            prop_assert_eq!(islands.iter().sum::<usize>(), grid.occupied_count());
            prop_assert!(islands.windows(2).all(|w| w[0] >= w[1]));
            prop_assert!(islands.iter().all(|&s| s > 0));
        }

        #[test]
        fn prop_clearing_a_cell_never_merges_islands(
            cols in 1usize..8,
            seed in proptest::collection::vec(0u32..2, 64),
            victim in 0usize..64
        ) {
            let rows = 8;
            let cells: Vec<Vec<u32>> = (0..rows)
                .map(|r| (0..cols).map(|c| seed[r * cols + c]).collect())
                .collect();
            let mut thinned = cells.clone();
            let (vr, vc) = ((victim / cols) % rows, victim % cols);
            thinned[vr][vc] = 0;

            // Removing an isolated cell is the only way the count can drop
            let isolated = cells[vr][vc] > 0
                && [(-1isize, 0isize), (1, 0), (0, -1), (0, 1)].iter().all(|(dr, dc)| {
                    let r = vr as isize + dr;
                    let c = vc as isize + dc;
                    r < 0 || c < 0 || r >= rows as isize || c >= cols as isize
                        || cells[r as usize][c as usize] == 0
                });

            let before = get_islands(&cells).unwrap().len();
            let after = get_islands(&thinned).unwrap().len();
            if isolated {
                prop_assert_eq!(after + 1, before);
            } else {
                prop_assert!(after >= before);
            }
        }
    }
}
