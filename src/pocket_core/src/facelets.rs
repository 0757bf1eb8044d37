//! Facelet colors of a cube state, as seen by a renderer.
//!
//! The faces are laid out in the order of the unfolded net:
//!
//! ```text
//!       +-----+
//!       | U U |
//!       | U U |
//! +-----+-----+-----+-----+
//! | L L | F F | R R | B B |
//! | L L | F F | R R | B B |
//! +-----+-----+-----+-----+
//!       | D D |
//!       | D D |
//!       +-----+
//! ```

use crate::state::{CORNER_COUNT, CubeState};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Green,
    Orange,
    Red,
    Blue,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Up,
    Left,
    Back,
    Front,
    Right,
    Down,
}

impl Face {
    pub const ALL: [Self; 6] = {
        use Face::*;
        let v = [Up, Left, Back, Front, Right, Down];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };
}

/// The four facelets of each face, indexed by [`Face`].
pub type FaceColors = [[Color; 4]; 6];

/// The `(face, facelet)` each of the three stickers of a slot projects to.
const SLOT_FACELETS: [[(Face, usize); 3]; CORNER_COUNT] = {
    use Face::*;
    [
        // top layer
        [(Up, 2), (Front, 0), (Left, 1)],
        [(Up, 3), (Right, 0), (Front, 1)],
        [(Up, 1), (Back, 0), (Right, 1)],
        [(Up, 0), (Left, 0), (Back, 1)],
        // bottom layer
        [(Down, 0), (Left, 3), (Front, 2)],
        [(Down, 1), (Front, 3), (Right, 2)],
        [(Down, 3), (Right, 3), (Back, 2)],
        [(Down, 2), (Back, 3), (Left, 2)],
    ]
};

/// The stickers of each corner in the order they appear on a solved cube.
const CORNER_COLORS: [[Color; 3]; CORNER_COUNT] = {
    use Color::*;
    [
        [White, Red, Green],
        [White, Blue, Red],
        [White, Orange, Blue],
        [White, Green, Orange],
        [Yellow, Green, Red],
        [Yellow, Red, Blue],
        [Yellow, Blue, Orange],
        [Yellow, Orange, Green],
    ]
};

impl Color {
    pub fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Green => 'G',
            Color::Orange => 'O',
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl CubeState {
    /// The color of every facelet.
    pub fn face_colors(&self) -> FaceColors {
        let mut faces = [[Color::White; 4]; 6];
        for ((&corner, &orientation), facelets) in self
            .positions()
            .iter()
            .zip(self.orientations())
            .zip(&SLOT_FACELETS)
        {
            let mut colors = CORNER_COLORS[usize::from(corner)];
            // A twist of one moves the last sticker to the front
            colors.rotate_right(usize::from(orientation));
            for (&(face, facelet), color) in facelets.iter().zip(colors) {
                faces[face as usize][facelet] = color;
            }
        }
        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use itertools::Itertools;

    #[test]
    fn solved_faces_are_uniform() {
        let faces = CubeState::SOLVED.face_colors();
        let expected = [
            Color::White,
            Color::Green,
            Color::Orange,
            Color::Red,
            Color::Blue,
            Color::Yellow,
        ];
        for (face, color) in Face::ALL.into_iter().zip(expected) {
            assert_eq!(faces[face as usize], [color; 4], "{face:?}");
        }
    }

    #[test]
    fn every_color_appears_four_times() {
        let state = CubeState::SOLVED.apply_all(&[
            Action::R,
            Action::UPrime,
            Action::F,
            Action::L,
            Action::D,
            Action::BPrime,
        ]);
        let counts = state.face_colors().into_iter().flatten().counts();
        assert_eq!(counts.len(), 6);
        assert!(counts.values().all(|&count| count == 4));
    }

    #[test]
    fn u_turn_keeps_top_and_bottom() {
        let faces = CubeState::SOLVED.apply(Action::U).face_colors();
        assert_eq!(faces[Face::Up as usize], [Color::White; 4]);
        assert_eq!(faces[Face::Down as usize], [Color::Yellow; 4]);
        assert_ne!(faces[Face::Front as usize], [Color::Red; 4]);
    }
}
