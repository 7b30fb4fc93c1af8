#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// The eight movement deltas, clockwise from north.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: one diagonal step covers both axes.
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn neighbors(&self) -> [Position; 8] {
        let mut out = [*self; 8];
        for (i, (dx, dy)) in DIRECTIONS.iter().enumerate() {
            out[i] = self.offset(*dx, *dy);
        }
        out
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self != other && self.distance(other) <= 1
    }

    pub fn delta_to(&self, other: &Position) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_distinct_and_adjacent() {
        let pos = Position::new(3, 3);
        for n in &pos.neighbors() {
            assert!(pos.is_adjacent(n));
        }
    }

    #[test]
    fn test_diagonal_distance_is_one() {
        assert_eq!(Position::new(0, 0).distance(&Position::new(1, 1)), 1);
        assert_eq!(Position::new(0, 0).distance(&Position::new(2, 1)), 2);
    }
}
