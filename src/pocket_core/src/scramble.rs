use crate::{action::Action, state::CubeState};

/// Face turn pairs that bring each color of a standard-orientation cube to
/// the up face, turning the cube as a whole.
const FACE_UP_ROTATIONS: [&[Action]; 6] = {
    use Action::*;
    [
        // white
        &[],
        // blue
        &[B, FPrime],
        // green
        &[BPrime, F],
        // red
        &[R, LPrime],
        // orange
        &[RPrime, L],
        // yellow
        &[R, R, LPrime, LPrime],
    ]
};

/// Turns of the whole cube around the vertical axis by 0, 90, 180 and 270
/// degrees.
const HORIZONTAL_ROTATIONS: [&[Action]; 4] = {
    use Action::*;
    [&[], &[D, UPrime], &[D, D, UPrime, UPrime], &[DPrime, U]]
};

/// Apply `depth` random actions to `state`, never following an action with
/// its inverse. Returns the scrambled state and the applied actions.
pub fn scramble(
    state: &CubeState,
    depth: usize,
    rng: &mut fastrand::Rng,
) -> (CubeState, Vec<Action>) {
    let mut actions = Vec::with_capacity(depth);
    let mut state = *state;
    let mut last: Option<Action> = None;
    for _ in 0..depth {
        let action = loop {
            let candidate = Action::ALL[rng.usize(..Action::ALL.len())];
            if last.is_none_or(|last| last.inverse() != candidate) {
                break candidate;
            }
        };
        state = state.apply(action);
        actions.push(action);
        last = Some(action);
    }
    (state, actions)
}

/// The face turns of a random whole-cube rotation into one of the 24
/// orientations.
pub fn random_rotation(rng: &mut fastrand::Rng) -> Vec<Action> {
    let up = FACE_UP_ROTATIONS[rng.usize(..FACE_UP_ROTATIONS.len())];
    let horizontal = HORIZONTAL_ROTATIONS[rng.usize(..HORIZONTAL_ROTATIONS.len())];
    up.iter().chain(horizontal).copied().collect()
}

/// Rotate the cube as a whole into one of its 24 orientations at random.
/// Solved states stay solved.
pub fn reorient(state: &CubeState, rng: &mut fastrand::Rng) -> CubeState {
    state.apply_all(&random_rotation(rng))
}

/// Every whole-cube rotation of `state`.
pub fn orientations(state: &CubeState) -> Vec<CubeState> {
    FACE_UP_ROTATIONS
        .iter()
        .flat_map(|up| {
            HORIZONTAL_ROTATIONS
                .iter()
                .map(move |horizontal| state.apply_all(up.iter().chain(horizontal.iter())))
        })
        .collect()
}
