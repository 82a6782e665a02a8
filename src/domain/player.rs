/// Player token: grid position and facing.
///
/// Hosts read it; only the rules in this crate move it.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    position: Position,
    facing_left: bool,
}

impl PlayerState {
    pub fn new(position: Position) -> Self {
        PlayerState { position, facing_left: false }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    /// Relocate without regard to the cell contents (portal reset, fall recovery).
    pub fn teleport_to(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_row(&mut self, row: usize) {
        self.position.row = row;
    }

    pub(crate) fn set_col(&mut self, col: usize) {
        self.position.col = col;
    }

    pub(crate) fn face(&mut self, left: bool) {
        self.facing_left = left;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_facing_right() {
        let p = PlayerState::new(Position::new(3, 5));
        assert_eq!(p.position(), Position::new(3, 5));
        assert!(!p.facing_left());
    }

    #[test]
    fn teleport_keeps_facing() {
        let mut p = PlayerState::new(Position::new(0, 0));
        p.face(true);
        p.teleport_to((2, 7).into());
        assert_eq!(p.position(), Position::new(2, 7));
        assert!(p.facing_left());
    }
}
