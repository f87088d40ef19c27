use glam::Vec2;

/// Walk heading of an animated peep.
///
/// The labels follow the sprite sheet order, but each heading actually moves
/// along the diagonal 45 degrees clockwise of its name: `North` walks up-right,
/// `East` down-right, `South` down-left, `West` up-left. Screen y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for `index % 4`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Unit-speed velocity sign pattern for this heading.
    pub fn unit_velocity(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(1.0, -1.0),
            Self::East => Vec2::new(1.0, 1.0),
            Self::South => Vec2::new(-1.0, 1.0),
            Self::West => Vec2::new(-1.0, -1.0),
        }
    }
}
