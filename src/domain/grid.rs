/// TileGrid: the rectangular world model.
///
/// ## Layers
///
/// The grid is the *effective* terrain: gameplay mutates it in place
/// (pickups consumed, vanishing ground removed). The session keeps a
/// pristine clone taken right after load and restores it wholesale on a
/// level reset, so nothing here needs to track a base layer.
///
/// ## Delayed vanish
///
/// Vanishing ground is not removed by an out-of-band timer. Scheduled
/// removals are stored as data (`PendingVanish`) and drained by
/// `tick_vanishes` from the main tick, which keeps every grid mutation on
/// the single update path. A pending entry only fires if the cell still
/// holds `VanishingGround`; replacing the grid on reset discards the queue.

use thiserror::Error;

use super::tile::Tile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelDataError {
    #[error("level data is empty")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
    #[error("row {row}, column {col}: non-numeric tile token {token:?}")]
    BadToken { row: usize, col: usize, token: String },
    #[error("row {row}, column {col}: unknown tile code {code}")]
    UnknownTile { row: usize, col: usize, code: u32 },
}

/// A scheduled removal of a vanishing-ground cell.
#[derive(Clone, Copy, Debug)]
struct PendingVanish {
    col: i32,
    row: i32,
    remaining_ms: f64,
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    /// Row-major: `cells[row][col]`, row 0 = topmost world row.
    cells: Vec<Vec<Tile>>,
    pub columns: usize,
    pub rows: usize,
    /// Edge length of a square cell in world units.
    pub cell_size: f64,
    pending_vanishes: Vec<PendingVanish>,
}

impl TileGrid {
    /// Parse row-major CSV level text: one row per line, comma-separated
    /// tile codes, row 0 topmost. Rejects ragged rows, non-numeric tokens
    /// and codes outside the tile taxonomy.
    pub fn load(text: &str, cell_size: f64) -> Result<TileGrid, LevelDataError> {
        let mut cells: Vec<Vec<Tile>> = Vec::new();
        let mut columns = 0usize;

        for (row_idx, line) in text.trim().lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::new();
            for (col_idx, token) in line.split(',').enumerate() {
                let token = token.trim();
                let code: u32 = token.parse().map_err(|_| LevelDataError::BadToken {
                    row: row_idx,
                    col: col_idx,
                    token: token.to_string(),
                })?;
                let tile = Tile::from_code(code).ok_or(LevelDataError::UnknownTile {
                    row: row_idx,
                    col: col_idx,
                    code,
                })?;
                row.push(tile);
            }
            if cells.is_empty() {
                columns = row.len();
            } else if row.len() != columns {
                return Err(LevelDataError::RaggedRow {
                    row: row_idx,
                    found: row.len(),
                    expected: columns,
                });
            }
            cells.push(row);
        }

        if cells.is_empty() || columns == 0 {
            return Err(LevelDataError::Empty);
        }

        let rows = cells.len();
        Ok(TileGrid {
            cells,
            columns,
            rows,
            cell_size,
            pending_vanishes: Vec::new(),
        })
    }

    /// Tile at (col, row). Out of bounds is always `Empty`, never an error.
    #[inline]
    pub fn get(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col as usize >= self.columns || row as usize >= self.rows {
            return Tile::Empty;
        }
        self.cells[row as usize][col as usize]
    }

    /// Overwrite a cell. Out of bounds is a no-op.
    #[inline]
    pub fn set(&mut self, col: i32, row: i32, tile: Tile) {
        if col < 0 || row < 0 || col as usize >= self.columns || row as usize >= self.rows {
            return;
        }
        self.cells[row as usize][col as usize] = tile;
    }

    /// World coordinate → cell index (floored; negative coordinates map to
    /// negative indices, which `get` treats as out of bounds).
    #[inline]
    pub fn world_to_cell(&self, w: f64) -> i32 {
        (w / self.cell_size).floor() as i32
    }

    /// World-space width/height of the whole grid.
    pub fn world_width(&self) -> f64 {
        self.columns as f64 * self.cell_size
    }

    pub fn world_height(&self) -> f64 {
        self.rows as f64 * self.cell_size
    }

    /// Schedule a vanishing-ground cell for removal after `delay_ms`.
    /// Idempotent: a cell already queued is not queued again, so repeated
    /// landings don't extend or duplicate the countdown.
    pub fn schedule_vanish(&mut self, col: i32, row: i32, delay_ms: f64) {
        if self.get(col, row) != Tile::VanishingGround {
            return;
        }
        if self.pending_vanishes.iter().any(|p| p.col == col && p.row == row) {
            return;
        }
        self.pending_vanishes.push(PendingVanish { col, row, remaining_ms: delay_ms });
    }

    /// Advance pending vanishes by `dt_ms` and apply the expired ones.
    /// An expired entry whose cell no longer holds `VanishingGround` is
    /// dropped silently.
    pub fn tick_vanishes(&mut self, dt_ms: f64) {
        let mut expired: Vec<(i32, i32)> = Vec::new();
        for p in self.pending_vanishes.iter_mut() {
            p.remaining_ms -= dt_ms;
            if p.remaining_ms <= 0.0 {
                expired.push((p.col, p.row));
            }
        }
        if expired.is_empty() {
            return;
        }
        self.pending_vanishes.retain(|p| p.remaining_ms > 0.0);
        for (col, row) in expired {
            if self.get(col, row) == Tile::VanishingGround {
                self.set(col, row, Tile::Empty);
            }
        }
    }

    #[cfg(test)]
    pub fn pending_vanish_count(&self) -> usize {
        self.pending_vanishes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: f64 = 40.0;

    fn grid(text: &str) -> TileGrid {
        TileGrid::load(text, CELL).unwrap()
    }

    #[test]
    fn load_round_trip() {
        let text = "7,0,8\n0,6,0\n1,2,3";
        let g = grid(text);
        assert_eq!(g.columns, 3);
        assert_eq!(g.rows, 3);
        let expected = [
            [Tile::Goal, Tile::Empty, Tile::CoinPickup],
            [Tile::Empty, Tile::VanishingGround, Tile::Empty],
            [Tile::Ground, Tile::Ice, Tile::Mud],
        ];
        for (row, tiles) in expected.iter().enumerate() {
            for (col, &tile) in tiles.iter().enumerate() {
                assert_eq!(g.get(col as i32, row as i32), tile);
            }
        }
    }

    #[test]
    fn load_tolerates_whitespace_and_blank_lines() {
        let g = grid(" 1 , 0 ,1 \n\n0,8,0\n");
        assert_eq!(g.rows, 2);
        assert_eq!(g.get(1, 1), Tile::CoinPickup);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = TileGrid::load("1,1,1\n0,0\n1,1,1", CELL).unwrap_err();
        assert_eq!(err, LevelDataError::RaggedRow { row: 1, found: 2, expected: 3 });
    }

    #[test]
    fn non_numeric_token_rejected() {
        let err = TileGrid::load("1,x,1", CELL).unwrap_err();
        assert!(matches!(err, LevelDataError::BadToken { row: 0, col: 1, .. }));
    }

    #[test]
    fn unknown_code_rejected() {
        let err = TileGrid::load("1,42,1", CELL).unwrap_err();
        assert_eq!(err, LevelDataError::UnknownTile { row: 0, col: 1, code: 42 });
    }

    #[test]
    fn empty_text_rejected() {
        assert_eq!(TileGrid::load("", CELL).unwrap_err(), LevelDataError::Empty);
        assert_eq!(TileGrid::load("  \n \n", CELL).unwrap_err(), LevelDataError::Empty);
    }

    #[test]
    fn out_of_bounds_get_is_empty() {
        let g = grid("1,1\n1,1");
        assert_eq!(g.get(-1, 0), Tile::Empty);
        assert_eq!(g.get(0, -1), Tile::Empty);
        assert_eq!(g.get(2, 0), Tile::Empty);
        assert_eq!(g.get(0, 2), Tile::Empty);
        assert_eq!(g.get(1000, 1000), Tile::Empty);
    }

    #[test]
    fn out_of_bounds_set_is_noop() {
        let mut g = grid("1,1\n1,1");
        g.set(-1, 0, Tile::Goal);
        g.set(5, 5, Tile::Goal);
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(g.get(col, row), Tile::Ground);
            }
        }
    }

    #[test]
    fn world_to_cell_floors() {
        let g = grid("1,1\n1,1");
        assert_eq!(g.world_to_cell(0.0), 0);
        assert_eq!(g.world_to_cell(39.9), 0);
        assert_eq!(g.world_to_cell(40.0), 1);
        assert_eq!(g.world_to_cell(-0.1), -1);
    }

    #[test]
    fn vanish_fires_after_delay() {
        let mut g = grid("6,1");
        g.schedule_vanish(0, 0, 1000.0);
        g.tick_vanishes(999.0);
        assert_eq!(g.get(0, 0), Tile::VanishingGround);
        g.tick_vanishes(2.0);
        assert_eq!(g.get(0, 0), Tile::Empty);
    }

    #[test]
    fn vanish_schedule_is_idempotent() {
        let mut g = grid("6,1");
        g.schedule_vanish(0, 0, 1000.0);
        g.tick_vanishes(600.0);
        // A second landing must not restart the countdown.
        g.schedule_vanish(0, 0, 1000.0);
        assert_eq!(g.pending_vanish_count(), 1);
        g.tick_vanishes(500.0);
        assert_eq!(g.get(0, 0), Tile::Empty);
    }

    #[test]
    fn vanish_noop_when_cell_changed() {
        let mut g = grid("6,1");
        g.schedule_vanish(0, 0, 100.0);
        g.set(0, 0, Tile::Ground);
        g.tick_vanishes(200.0);
        assert_eq!(g.get(0, 0), Tile::Ground);
    }

    #[test]
    fn vanish_ignores_non_vanishing_cells() {
        let mut g = grid("1,1");
        g.schedule_vanish(0, 0, 100.0);
        assert_eq!(g.pending_vanish_count(), 0);
    }
}
