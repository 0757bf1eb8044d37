//! Move sequence notation: whitespace separated action identifiers, where
//! `X2` denotes a half turn of face `X`.

use crate::action::{Action, InvalidAction};
use itertools::Itertools;

/// Parse a move sequence such as `"R U2 f"` into quarter turns. Half turns
/// expand into two clockwise quarter turns.
///
/// # Errors
///
/// If any identifier is not one of the 12 actions or their half turns.
pub fn parse_sequence(sequence: &str) -> Result<Vec<Action>, InvalidAction> {
    let mut actions = vec![];
    for name in sequence.split_whitespace() {
        match name.strip_suffix('2') {
            Some(face) => {
                let action = face
                    .parse::<Action>()
                    .ok()
                    .filter(|action| action.is_clockwise())
                    .ok_or_else(|| InvalidAction::Identifier(name.to_owned()))?;
                actions.extend([action, action]);
            }
            None => actions.push(name.parse()?),
        }
    }
    Ok(actions)
}

/// Format quarter turns in notation, merging two successive identical turns
/// into a half turn.
pub fn format_sequence(actions: &[Action]) -> String {
    actions
        .iter()
        .chunk_by(|&&action| action)
        .into_iter()
        .flat_map(|(action, group)| {
            let count = group.count();
            let halves = std::iter::repeat_n(format!("{}2", action.clockwise()), count / 2);
            let quarter = (count % 2 == 1).then(|| action.to_string());
            halves.chain(quarter)
        })
        .join(" ")
}
