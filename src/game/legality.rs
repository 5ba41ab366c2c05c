//! The legality predicate.
//!
//! `is_legal` is defined directly in terms of `enumerate::legal_actions`
//! rather than duplicating the enumeration's rules in a second, separately
//! maintained predicate. This makes legality-vs-enumeration consistency
//! hold by construction instead of by discipline.
//!
//! One narrow carve-out: `RollDice(Some(_))` forces a specific roll for
//! deterministic replay and tests, so it deliberately never appears in
//! the enumerated catalog (the catalog only ever offers `RollDice(None)`,
//! since real play never knows the roll in advance). Legality for a forced
//! roll is judged by whether rolling at all is legal right now, not by an
//! exact-match lookup that could never succeed.

use crate::game::action::Action;
use crate::game::enumerate::legal_actions;
use crate::game::state::GameState;

pub fn is_legal(state: &GameState, action: &Action) -> bool {
    if let Action::RollDice(Some(_)) = action {
        return legal_actions(state).contains(&Action::RollDice(None));
    }
    legal_actions(state).contains(action)
}
