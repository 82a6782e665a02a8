/// Cell types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum CellType {
    #[default]
    Empty,
    DestroyableStardust, // Removable by the player
    PermanentStardust,   // Solid only
    EntryPortal,         // Spawn marker, reset trigger
    ExitPortal,          // Reset trigger
    WarpPocket,
    PurpleStarWall,
    StarBlock,
    Fallwall,
    BlueStardust,        // Placed by the player
    GreenStardust,       // Raised platform
}

const ALL: [CellType; 11] = [
    CellType::Empty,
    CellType::DestroyableStardust,
    CellType::PermanentStardust,
    CellType::EntryPortal,
    CellType::ExitPortal,
    CellType::WarpPocket,
    CellType::PurpleStarWall,
    CellType::StarBlock,
    CellType::Fallwall,
    CellType::BlueStardust,
    CellType::GreenStardust,
];

impl CellType {
    /// Ordinal as used by the level file format.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(n: u32) -> Option<CellType> {
        ALL.get(n as usize).copied()
    }

    /// Decode a level-file character. Only ASCII decimal digits are valid.
    pub fn from_digit(ch: char) -> Option<CellType> {
        if !ch.is_ascii_digit() {
            return None;
        }
        ch.to_digit(10).and_then(CellType::from_ordinal)
    }

    /// Can the player occupy this cell by walking or falling into it?
    pub fn is_passable(self) -> bool {
        matches!(self, CellType::Empty)
    }

    /// Stepping onto a portal sends the player back to the level's reset point.
    pub fn is_portal(self) -> bool {
        matches!(self, CellType::EntryPortal | CellType::ExitPortal)
    }

    /// Can Place/Destroy clear this cell?
    pub fn is_removable(self) -> bool {
        matches!(
            self,
            CellType::BlueStardust | CellType::DestroyableStardust | CellType::GreenStardust
        )
    }

    pub fn all() -> &'static [CellType] {
        &ALL
    }
}
