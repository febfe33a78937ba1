/// Level sources.
///
/// ## Priority order
///   1. `levels/world-<w>-<l>.csv` under the configured levels directory
///   2. Built-in embedded levels
///
/// Level data is row-major CSV, one row per line, row 0 = topmost world
/// row; the tile-code vocabulary lives in `domain::tile`. Validation
/// happens in `TileGrid::load`, not here; this module only locates text.
///
/// A missing level is how the session detects the end of a world (it then
/// probes the next world's first level), so `None` is a normal outcome.

use std::path::Path;

/// Fetch the raw text for (world, level), both 1-based.
pub fn level_text(levels_dir: &Path, world: u32, level: u32) -> Option<String> {
    let path = levels_dir.join(format!("world-{world}-{level}.csv"));
    match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(_) => embedded_level(world, level).map(|s| s.to_string()),
    }
}

/// Built-in levels so the game runs with no data files on disk.
fn embedded_level(world: u32, level: u32) -> Option<&'static str> {
    match (world, level) {
        (1, 1) => Some(WORLD_1_1),
        (1, 2) => Some(WORLD_1_2),
        (2, 1) => Some(WORLD_2_1),
        _ => None,
    }
}

// Legend: 0 empty, 1 ground, 2 ice, 3 mud, 4 spring, 5 jetpack,
// 6 vanishing, 7 goal, 8 coin, 9 wings.

const WORLD_1_1: &str = "\
0,0,0,0,0,0,0,7,7,0,0,0,0,0,0,0
0,0,0,0,0,0,1,1,1,1,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,8,0,0,0,0,0,0,0,0,0,8,0,0,0
0,1,1,1,0,0,0,0,0,0,0,1,1,1,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,8,0,0,8,0,0,0,0,0,0,0
0,0,0,0,6,6,6,6,6,6,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,9,0,0,0,0,0,0,0,0,0,0,0,5,0,0
1,1,1,0,0,0,0,0,0,0,0,0,1,1,1,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,8,8,0,0,0,0,0,0,0,0
0,0,0,0,0,1,1,1,1,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,3,3,3,0,0,0,0,0,0,3,3,3,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,4,0,0,0,0,0,0,0,0
0,0,0,0,0,0,1,1,1,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,8,0,0,0,0,0,0,0,0,0,0,8,0,0
0,1,1,1,0,0,0,0,0,0,0,0,1,1,1,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1";

const WORLD_1_2: &str = "\
0,0,0,0,0,0,0,0,0,0,0,0,0,7,7,0
0,0,0,0,0,0,0,0,0,0,0,0,1,1,1,1
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,8,0,0,0,0,0,8,0,0,0,0,0,0,0,0
1,1,1,0,0,0,6,6,6,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,8,8,0,0,0
0,0,0,0,0,0,0,0,0,0,6,6,6,6,0,0
0,0,0,5,0,0,0,0,0,0,0,0,0,0,0,0
0,0,1,1,1,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,4,0,0,0,0,0,0,0
0,0,0,0,0,0,0,1,1,1,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,9,0,0
0,3,3,0,0,0,0,0,0,0,0,0,1,1,1,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,8,0,0,0,0,0,0,0,0,0,0,0
0,0,0,6,6,6,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,4,0,0,0,0,0,0
0,0,0,0,0,0,0,0,1,1,1,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,8,0,0,0,0,0,0,0,0,0,0,0,0,8,0
1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1";

const WORLD_2_1: &str = "\
0,0,0,0,0,0,0,7,7,0,0,0,0,0,0,0
0,0,0,0,0,0,2,2,2,2,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,8,0,0,0,0,0,0,0,0,0,8,0,0,0
0,2,2,2,0,0,0,0,0,0,0,2,2,2,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,8,8,0,0,0,0,0,0,0,0
0,0,0,0,0,6,6,6,6,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,9,0,0,0,0,0,0,0,0,5,0,0,0
0,0,2,2,2,0,0,0,0,0,0,2,2,2,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,0,4,0,0,0,0,0,0,0,0
0,0,0,0,0,0,2,2,2,0,0,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,8,0,0,0,0,0,0,0,0,0,0,0,0,8,0
2,2,2,0,0,0,0,0,0,0,0,0,0,2,2,2
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,0,0,0,8,0,0,8,0,0,0,0,0,0
0,0,0,0,0,2,2,0,0,2,2,0,0,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
0,0,0,4,0,0,0,0,0,0,0,0,4,0,0,0
0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0
2,2,2,2,2,2,2,2,1,1,2,2,2,2,2,2";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::TileGrid;
    use crate::domain::tile::Tile;
    use std::path::PathBuf;

    #[test]
    fn embedded_levels_are_valid() {
        for (world, level) in [(1, 1), (1, 2), (2, 1)] {
            let text = embedded_level(world, level).unwrap();
            let grid = TileGrid::load(text, 40.0)
                .unwrap_or_else(|e| panic!("world {world}-{level}: {e}"));
            assert_eq!(grid.columns, 16);
            assert_eq!(grid.rows, 24);
            // Every level needs a goal to be completable.
            let has_goal = (0..grid.rows as i32).any(|r| {
                (0..grid.columns as i32).any(|c| grid.get(c, r) == Tile::Goal)
            });
            assert!(has_goal, "world {world}-{level} has no goal tile");
            // And somewhere to stand in the spawn-scan window.
            let has_floor = (0..grid.columns as i32)
                .any(|c| grid.get(c, grid.rows as i32 - 1).is_standable());
            assert!(has_floor, "world {world}-{level} has no bottom floor");
        }
    }

    #[test]
    fn missing_level_is_none() {
        assert!(embedded_level(1, 3).is_none());
        assert!(embedded_level(2, 2).is_none());
        assert!(embedded_level(3, 1).is_none());
        // Nonexistent directory falls through to embedded, then None.
        let dir = PathBuf::from("/nonexistent/levels");
        assert!(level_text(&dir, 9, 9).is_none());
        assert!(level_text(&dir, 1, 1).is_some());
    }
}
