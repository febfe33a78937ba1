/// Domain types: the tile taxonomy, the world grid and the player
/// controller. Pure simulation, no terminal or I/O concerns.

pub mod grid;
pub mod player;
pub mod tile;
