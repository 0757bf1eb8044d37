use std::{fmt, str::FromStr};
use thiserror::Error;

/// The number of primitive quarter turns.
pub const ACTION_COUNT: usize = 12;

/// A clockwise (upper case) or counter-clockwise (lower case) quarter turn of
/// one of the six faces. The discriminants are the catalog indices used by
/// oracle policy rows and search statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    R,
    L,
    U,
    D,
    F,
    B,
    RPrime,
    LPrime,
    UPrime,
    DPrime,
    FPrime,
    BPrime,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    #[error("Action index out of range, expected a value between 0 and 11 but got {0}")]
    Index(usize),
    #[error("Unknown action identifier {0:?}, expected one of R L U D F B r l u d f b")]
    Identifier(String),
}

/// The permutation and twist of a single catalog entry.
struct ActionDef {
    /// `(source slot, destination slot)` pairs of the four cycled corners.
    moves: [(usize, usize); 4],
    /// `(slot, delta)` pairs added mod 3 after the corners were moved.
    twists: &'static [(usize, u8)],
}

const R_TWISTS: &[(usize, u8)] = &[(1, 2), (2, 1), (5, 1), (6, 2)];
const L_TWISTS: &[(usize, u8)] = &[(0, 1), (3, 2), (4, 2), (7, 1)];
const F_TWISTS: &[(usize, u8)] = &[(0, 2), (1, 1), (4, 1), (5, 2)];
const B_TWISTS: &[(usize, u8)] = &[(2, 2), (3, 1), (6, 1), (7, 2)];

const CATALOG: [ActionDef; ACTION_COUNT] = [
    // R
    ActionDef {
        moves: [(1, 2), (2, 6), (6, 5), (5, 1)],
        twists: R_TWISTS,
    },
    // L
    ActionDef {
        moves: [(3, 0), (7, 3), (0, 4), (4, 7)],
        twists: L_TWISTS,
    },
    // U
    ActionDef {
        moves: [(0, 3), (1, 0), (2, 1), (3, 2)],
        twists: &[],
    },
    // D
    ActionDef {
        moves: [(4, 5), (5, 6), (6, 7), (7, 4)],
        twists: &[],
    },
    // F
    ActionDef {
        moves: [(0, 1), (1, 5), (5, 4), (4, 0)],
        twists: F_TWISTS,
    },
    // B
    ActionDef {
        moves: [(2, 3), (3, 7), (7, 6), (6, 2)],
        twists: B_TWISTS,
    },
    // r
    ActionDef {
        moves: [(2, 1), (6, 2), (5, 6), (1, 5)],
        twists: R_TWISTS,
    },
    // l
    ActionDef {
        moves: [(0, 3), (3, 7), (4, 0), (7, 4)],
        twists: L_TWISTS,
    },
    // u
    ActionDef {
        moves: [(3, 0), (0, 1), (1, 2), (2, 3)],
        twists: &[],
    },
    // d
    ActionDef {
        moves: [(5, 4), (6, 5), (7, 6), (4, 7)],
        twists: &[],
    },
    // f
    ActionDef {
        moves: [(1, 0), (5, 1), (4, 5), (0, 4)],
        twists: F_TWISTS,
    },
    // b
    ActionDef {
        moves: [(3, 2), (7, 3), (6, 7), (2, 6)],
        twists: B_TWISTS,
    },
];

impl Action {
    pub const ALL: [Self; ACTION_COUNT] = {
        use Action::*;
        let v = [
            R, L, U, D, F, B, RPrime, LPrime, UPrime, DPrime, FPrime, BPrime,
        ];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    /// Look up an action by its catalog index.
    ///
    /// # Errors
    ///
    /// If `index` is not in `0..12`.
    pub fn from_index(index: usize) -> Result<Self, InvalidAction> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(InvalidAction::Index(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The action turning the same face in the opposite direction.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self::ALL[(self as usize + ACTION_COUNT / 2) % ACTION_COUNT]
    }

    /// Whether this is a clockwise turn.
    pub fn is_clockwise(self) -> bool {
        (self as usize) < ACTION_COUNT / 2
    }

    /// The clockwise action of the same face.
    #[must_use]
    pub fn clockwise(self) -> Self {
        if self.is_clockwise() {
            self
        } else {
            self.inverse()
        }
    }

    /// The `(source slot, destination slot)` pairs of the corners this
    /// action cycles.
    pub fn slot_moves(self) -> &'static [(usize, usize); 4] {
        &CATALOG[self as usize].moves
    }

    /// The `(slot, delta)` orientation changes this action applies after
    /// moving the corners. Empty for U and D turns.
    pub fn twists(self) -> &'static [(usize, u8)] {
        CATALOG[self as usize].twists
    }

    /// The single letter identifier of this action.
    pub fn letter(self) -> char {
        match self {
            Action::R => 'R',
            Action::L => 'L',
            Action::U => 'U',
            Action::D => 'D',
            Action::F => 'F',
            Action::B => 'B',
            Action::RPrime => 'r',
            Action::LPrime => 'l',
            Action::UPrime => 'u',
            Action::DPrime => 'd',
            Action::FPrime => 'f',
            Action::BPrime => 'b',
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = InvalidAction;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value.into())
    }
}

impl FromStr for Action {
    type Err = InvalidAction;

    /// Parses `R`, `r` and the prime spelling `R'` of every face.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R" => Ok(Action::R),
            "L" => Ok(Action::L),
            "U" => Ok(Action::U),
            "D" => Ok(Action::D),
            "F" => Ok(Action::F),
            "B" => Ok(Action::B),
            "r" | "R'" => Ok(Action::RPrime),
            "l" | "L'" => Ok(Action::LPrime),
            "u" | "U'" => Ok(Action::UPrime),
            "d" | "D'" => Ok(Action::DPrime),
            "f" | "F'" => Ok(Action::FPrime),
            "b" | "B'" => Ok(Action::BPrime),
            _ => Err(InvalidAction::Identifier(s.to_owned())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_pairs() {
        let pairs = [
            (Action::R, Action::RPrime),
            (Action::L, Action::LPrime),
            (Action::U, Action::UPrime),
            (Action::D, Action::DPrime),
            (Action::F, Action::FPrime),
            (Action::B, Action::BPrime),
        ];
        for (a, b) in pairs {
            assert_eq!(a.inverse(), b);
            assert_eq!(b.inverse(), a);
            assert_eq!(b.clockwise(), a);
        }
    }

    #[test]
    fn cycles_are_inverted() {
        for action in Action::ALL {
            let mut forward = action.slot_moves().to_vec();
            let mut backward = action
                .inverse()
                .slot_moves()
                .iter()
                .map(|&(src, dst)| (dst, src))
                .collect::<Vec<_>>();
            forward.sort_unstable();
            backward.sort_unstable();
            assert_eq!(forward, backward, "{action}");
        }
    }

    #[test]
    fn indices_round_trip() {
        for (i, action) in Action::ALL.into_iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Ok(action));
            assert_eq!(Action::try_from(u8::try_from(i).unwrap()), Ok(action));
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn invalid_actions_are_rejected() {
        assert_eq!(Action::from_index(12), Err(InvalidAction::Index(12)));
        assert_eq!(Action::try_from(200), Err(InvalidAction::Index(200)));
        assert_eq!(
            "X".parse::<Action>(),
            Err(InvalidAction::Identifier("X".to_owned()))
        );
        assert!("".parse::<Action>().is_err());
        assert!("R2".parse::<Action>().is_err());
    }

    #[test]
    fn prime_spelling() {
        assert_eq!("U'".parse::<Action>(), Ok(Action::UPrime));
        assert_eq!("b".parse::<Action>(), Ok(Action::BPrime));
    }
}
