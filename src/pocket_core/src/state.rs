use crate::action::{ACTION_COUNT, Action};
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// The number of corner cubies, which is also the number of slots.
pub const CORNER_COUNT: usize = 8;

/// The one-hot oracle input: one row per corner, `3 * slot + orientation`
/// columns.
pub type Encoding = [[f32; 3 * CORNER_COUNT]; CORNER_COUNT];

/// A pocket cube state: which corner occupies each slot and how it is
/// twisted there. A solved cube in standard orientation (white up, red
/// front) has positions `0..8` and all orientations zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeState {
    positions: [u8; CORNER_COUNT],
    orientations: [u8; CORNER_COUNT],
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidState {
    #[error("Corner positions must be a permutation of 0 to 7, got {0:?}")]
    NotAPermutation([u8; CORNER_COUNT]),
    #[error("Invalid orientation, expected a value between 0 and 2 but got {actual} at slot {slot}")]
    OrientationOutOfRange { slot: usize, actual: u8 },
    #[error("Corner twists sum to {0} mod 3, which no sequence of turns can reach")]
    UnreachableTwist(u8),
}

/// Every orientation tuple of a solved cube, keyed to the position tuples
/// valid for it. Together these are the 24 rotations of the whole cube.
const SOLVED_CLASSES: [([u8; CORNER_COUNT], [[u8; CORNER_COUNT]; 8]); 3] = [
    (
        [0, 0, 0, 0, 0, 0, 0, 0],
        [
            [0, 1, 2, 3, 4, 5, 6, 7], // white up
            [1, 2, 3, 0, 5, 6, 7, 4],
            [2, 3, 0, 1, 6, 7, 4, 5],
            [3, 0, 1, 2, 7, 4, 5, 6],
            [4, 7, 6, 5, 0, 3, 2, 1], // yellow up
            [5, 4, 7, 6, 1, 0, 3, 2],
            [6, 5, 4, 7, 2, 1, 0, 3],
            [7, 6, 5, 4, 3, 2, 1, 0],
        ],
    ),
    (
        [1, 2, 1, 2, 2, 1, 2, 1],
        [
            [0, 3, 7, 4, 1, 2, 6, 5],
            [1, 0, 4, 5, 2, 3, 7, 6],
            [2, 1, 5, 6, 3, 0, 4, 7],
            [3, 2, 6, 7, 0, 1, 5, 4],
            [4, 5, 1, 0, 7, 6, 2, 3],
            [5, 6, 2, 1, 4, 7, 3, 0],
            [6, 7, 3, 2, 5, 4, 0, 1],
            [7, 4, 0, 3, 6, 5, 1, 2],
        ],
    ),
    (
        [2, 1, 2, 1, 1, 2, 1, 2],
        [
            [0, 4, 5, 1, 3, 7, 6, 2],
            [1, 5, 6, 2, 0, 4, 7, 3],
            [2, 6, 7, 3, 1, 5, 4, 0],
            [3, 7, 4, 0, 2, 6, 5, 1],
            [4, 0, 3, 7, 5, 1, 2, 6],
            [5, 1, 0, 4, 6, 2, 3, 7],
            [6, 2, 1, 5, 7, 3, 0, 4],
            [7, 3, 2, 6, 4, 0, 1, 5],
        ],
    ),
];

impl CubeState {
    /// The solved cube in standard orientation.
    pub const SOLVED: Self = Self {
        positions: [0, 1, 2, 3, 4, 5, 6, 7],
        orientations: [0; CORNER_COUNT],
    };

    /// Create a cube state from raw corner data, e.g. a scanned cube.
    ///
    /// # Errors
    ///
    /// If `positions` is not a permutation of `0..8`, an orientation is not
    /// in `0..3`, or the twists do not sum to zero mod 3.
    pub fn new(
        positions: [u8; CORNER_COUNT],
        orientations: [u8; CORNER_COUNT],
    ) -> Result<Self, InvalidState> {
        let mut seen = [false; CORNER_COUNT];
        for &corner in &positions {
            match seen.get_mut(usize::from(corner)) {
                Some(slot_seen) if !*slot_seen => *slot_seen = true,
                _ => return Err(InvalidState::NotAPermutation(positions)),
            }
        }
        if let Some((slot, &actual)) = orientations.iter().find_position(|&&o| o >= 3) {
            return Err(InvalidState::OrientationOutOfRange { slot, actual });
        }
        let twist = orientations.iter().fold(0, |acc, &o| (acc + o) % 3);
        if twist != 0 {
            return Err(InvalidState::UnreachableTwist(twist));
        }
        Ok(Self {
            positions,
            orientations,
        })
    }

    /// Which corner occupies each slot.
    pub fn positions(&self) -> &[u8; CORNER_COUNT] {
        &self.positions
    }

    /// The twist of the corner in each slot.
    pub fn orientations(&self) -> &[u8; CORNER_COUNT] {
        &self.orientations
    }

    /// The state reached by turning a face of this one.
    #[must_use]
    pub fn apply(&self, action: Action) -> Self {
        let mut positions = self.positions;
        let mut orientations = self.orientations;
        for &(src, dst) in action.slot_moves() {
            positions[dst] = self.positions[src];
            orientations[dst] = self.orientations[src];
        }
        for &(slot, delta) in action.twists() {
            orientations[slot] = (orientations[slot] + delta) % 3;
        }
        Self {
            positions,
            orientations,
        }
    }

    /// Apply every action of `actions` in order.
    #[must_use]
    pub fn apply_all<'a>(&self, actions: impl IntoIterator<Item = &'a Action>) -> Self {
        actions
            .into_iter()
            .fold(*self, |state, &action| state.apply(action))
    }

    /// The states reached by each catalog action, in catalog order.
    pub fn children(&self) -> [Self; ACTION_COUNT] {
        Action::ALL.map(|action| self.apply(action))
    }

    /// The children of this state together with whether each is solved.
    pub fn explore(&self) -> ([Self; ACTION_COUNT], [bool; ACTION_COUNT]) {
        let children = self.children();
        let solved = children.map(|child| child.is_solved());
        (children, solved)
    }

    /// Whether every face shows a single color. The orientation of the
    /// whole cube is irrelevant.
    pub fn is_solved(&self) -> bool {
        SOLVED_CLASSES
            .iter()
            .find(|(orientations, _)| *orientations == self.orientations)
            .is_some_and(|(_, positions)| positions.contains(&self.positions))
    }

    /// One-hot encode this state for the oracle. Cell
    /// `[corner][3 * slot + orientation]` is set for the slot each corner
    /// occupies.
    pub fn encode(&self) -> Encoding {
        let mut encoding = [[0.0; 3 * CORNER_COUNT]; CORNER_COUNT];
        self.encode_into(&mut encoding);
        encoding
    }

    /// Like [`CubeState::encode`], reusing a buffer.
    pub fn encode_into(&self, encoding: &mut Encoding) {
        for row in encoding.iter_mut() {
            row.fill(0.0);
        }
        for (slot, (&corner, &orientation)) in
            self.positions.iter().zip(&self.orientations).enumerate()
        {
            encoding[usize::from(corner)][3 * slot + usize::from(orientation)] = 1.0;
        }
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::SOLVED
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) ({})",
            self.positions.iter().join(" "),
            self.orientations.iter().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solved_classes_are_valid_states() {
        for (orientations, positions) in SOLVED_CLASSES {
            for positions in positions {
                let state = CubeState::new(positions, orientations).unwrap();
                assert!(state.is_solved());
            }
        }
    }

    #[test]
    fn new_rejects_invalid_data() {
        assert_eq!(
            CubeState::new([0, 0, 2, 3, 4, 5, 6, 7], [0; 8]),
            Err(InvalidState::NotAPermutation([0, 0, 2, 3, 4, 5, 6, 7]))
        );
        assert_eq!(
            CubeState::new([0, 1, 2, 3, 4, 5, 6, 8], [0; 8]),
            Err(InvalidState::NotAPermutation([0, 1, 2, 3, 4, 5, 6, 8]))
        );
        assert_eq!(
            CubeState::new([0, 1, 2, 3, 4, 5, 6, 7], [0, 0, 3, 0, 0, 0, 0, 0]),
            Err(InvalidState::OrientationOutOfRange { slot: 2, actual: 3 })
        );
        assert_eq!(
            CubeState::new([0, 1, 2, 3, 4, 5, 6, 7], [1, 0, 0, 0, 0, 0, 0, 0]),
            Err(InvalidState::UnreachableTwist(1))
        );
    }

    #[test]
    fn u_turn_only_permutes() {
        let state = CubeState::SOLVED.apply(Action::U);
        assert_eq!(state.positions(), &[1, 2, 3, 0, 4, 5, 6, 7]);
        assert_eq!(state.orientations(), &[0; 8]);
    }

    #[test]
    fn r_turn_twists() {
        let state = CubeState::SOLVED.apply(Action::R);
        assert_eq!(state.positions(), &[0, 5, 1, 3, 4, 6, 2, 7]);
        assert_eq!(state.orientations(), &[0, 2, 1, 0, 0, 1, 2, 0]);
    }

    #[test]
    fn solved_encoding() {
        let encoding = CubeState::SOLVED.encode();
        for (corner, row) in encoding.iter().enumerate() {
            for (column, &cell) in row.iter().enumerate() {
                let expected = if column == 3 * corner { 1.0 } else { 0.0 };
                assert!((cell - expected).abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn encoding_follows_corners() {
        let state = CubeState::SOLVED.apply(Action::R);
        let encoding = state.encode();
        // Corner 1 moved to slot 2 with twist 1
        assert!((encoding[1][3 * 2 + 1] - 1.0).abs() < f32::EPSILON);
        // Corner 5 moved to slot 1 with twist 2
        assert!((encoding[5][3 + 2] - 1.0).abs() < f32::EPSILON);
        for row in encoding {
            assert!((row.iter().sum::<f32>() - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn encode_into_clears_the_buffer() {
        let mut buf = [[1.0; 24]; 8];
        CubeState::SOLVED.encode_into(&mut buf);
        assert_eq!(buf, CubeState::SOLVED.encode());
    }
}
