/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// Numeric codes are fixed by the level-data format and must not change.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,           // 0
    Ground,          // 1
    Ice,             // 2: slippery surface
    Mud,             // 3: sticky surface, reduced jump
    Spring,          // 4: bounces the player upward
    JetpackPickup,   // 5
    VanishingGround, // 6: removed shortly after being landed on
    Goal,            // 7
    CoinPickup,      // 8
    WingsPickup,     // 9: grants double jump
}

impl Tile {
    /// Decode a level-data tile code. Codes outside the taxonomy are
    /// rejected at load time, not mapped to a default.
    pub fn from_code(code: u32) -> Option<Tile> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Ground),
            2 => Some(Tile::Ice),
            3 => Some(Tile::Mud),
            4 => Some(Tile::Spring),
            5 => Some(Tile::JetpackPickup),
            6 => Some(Tile::VanishingGround),
            7 => Some(Tile::Goal),
            8 => Some(Tile::CoinPickup),
            9 => Some(Tile::WingsPickup),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Tile::Empty => 0,
            Tile::Ground => 1,
            Tile::Ice => 2,
            Tile::Mud => 3,
            Tile::Spring => 4,
            Tile::JetpackPickup => 5,
            Tile::VanishingGround => 6,
            Tile::Goal => 7,
            Tile::CoinPickup => 8,
            Tile::WingsPickup => 9,
        }
    }

    /// Does this tile block movement (collision-resolved against)?
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            Tile::Ground | Tile::Ice | Tile::Mud | Tile::Spring | Tile::VanishingGround
        )
    }

    /// Can the player spawn standing on this tile?
    /// Vanishing ground is excluded so a fresh spawn doesn't immediately
    /// erode its own footing.
    pub fn is_standable(self) -> bool {
        matches!(self, Tile::Ground | Tile::Ice | Tile::Mud | Tile::Spring)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}
