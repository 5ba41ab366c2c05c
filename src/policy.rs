//! The `Policy` trait consumed by rollout workers, grounded in the
//! teacher's `players::BasePlayer`/`players::RandomPlayer`. Unlike the
//! teacher, whose `BasePlayer::decide` takes the mutable `Game` wrapper,
//! `Policy::select_action` takes an immutable `&GameState` plus the
//! already-enumerated legal actions, since this engine's state is an owned,
//! persistent value rather than something a player object reaches into.
//!
//! Real policies (MCTS, value-function, learned networks) live outside this
//! crate per the Non-goals; `RandomPolicy` is the only implementation here,
//! used for testing and as the rollout default.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::game::action::Action;
use crate::game::state::GameState;

pub trait Policy {
    fn select_action(&mut self, state: &GameState, legal: &[Action]) -> Action;
}

/// Uniform legal-move sampler.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, _state: &GameState, legal: &[Action]) -> Action {
        legal
            .choose(&mut self.rng)
            .cloned()
            .expect("legal_actions is never empty for a game that isn't done")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enumerate::legal_actions;
    use crate::game::state::GameConfig;

    #[test]
    fn random_policy_picks_a_legal_action() {
        let state = GameState::new(GameConfig::default());
        let legal = legal_actions(&state);
        let mut policy = RandomPolicy::new(7);
        let chosen = policy.select_action(&state, &legal);
        assert!(legal.contains(&chosen));
    }
}
