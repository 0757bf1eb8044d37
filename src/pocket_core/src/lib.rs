//! The pocket cube as an exact combinatorial state space: the twelve quarter
//! turns, the corner permutation and orientation state they act on, and the
//! encodings other components consume.

pub mod action;
pub mod facelets;
pub mod notation;
pub mod scramble;
pub mod state;

pub use action::{ACTION_COUNT, Action, InvalidAction};
pub use state::{CubeState, Encoding, InvalidState};
