//! The simulation driver.
//!
//! `SimDriver` owns one game and a lazily-extended action catalog, mirroring
//! the teacher's `RustEnv` (`env/mod.rs`) but speaking the tagged-sum
//! `Action` type and the persistent-state `apply_action` transition instead
//! of the teacher's in-place `GameState::step`.

use std::collections::HashMap;

use crate::game::action::Action;
use crate::game::enumerate::{build_action_catalog, legal_actions};
use crate::game::state::{GameConfig, GameError, GameState, StepOutcome};
use crate::game::transition::apply_action;

#[derive(Debug, Clone)]
pub struct SimDriver {
    state: GameState,
    catalog: Vec<Action>,
    index: HashMap<Action, usize>,
}

impl SimDriver {
    pub fn new(config: GameConfig) -> Self {
        let state = GameState::new(config);
        Self::from_state(state)
    }

    fn from_state(state: GameState) -> Self {
        let catalog = build_action_catalog(&state);
        let index = catalog.iter().cloned().enumerate().map(|(i, a)| (a, i)).collect();
        Self { state, catalog, index }
    }

    /// Starts a fresh game, optionally overriding the configured seed.
    pub fn reset(&mut self, seed: Option<u64>) -> &GameState {
        let mut config = self.state.config.clone();
        if let Some(seed) = seed {
            config.seed = seed;
        }
        self.state = GameState::new(config);
        &self.state
    }

    /// Restores an exact state: the RNG rides inside the state, so
    /// replay from here is bit-exact.
    pub fn reset_to(&mut self, state: GameState) -> &GameState {
        self.state = state;
        &self.state
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        legal_actions(&self.state)
    }

    pub fn step(&mut self, action: &Action) -> Result<StepOutcome, GameError> {
        let (next, outcome) = apply_action(&self.state, action)?;
        self.state = next;
        self.register(action.clone());
        Ok(outcome)
    }

    fn register(&mut self, action: Action) {
        if !self.index.contains_key(&action) {
            self.index.insert(action.clone(), self.catalog.len());
            self.catalog.push(action);
        }
    }

    pub fn action_catalog(&self) -> &[Action] {
        &self.catalog
    }

    /// Idempotent: the catalog only ever grows, never reassigns an
    /// existing action's index.
    pub fn index_of(&mut self, action: &Action) -> usize {
        if let Some(&idx) = self.index.get(action) {
            return idx;
        }
        self.register(action.clone());
        self.catalog.len() - 1
    }

    /// A boolean vector the same length as the catalog, extending the
    /// catalog first for any legal action not yet observed.
    pub fn legal_actions_mask(&mut self) -> Vec<bool> {
        let legal = self.legal_actions();
        for action in &legal {
            self.register(action.clone());
        }
        let mut mask = vec![false; self.catalog.len()];
        for action in &legal {
            mask[self.index[action]] = true;
        }
        mask
    }

    /// Produces an independent driver sharing no mutable state.
    pub fn clone_driver(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Action;

    #[test]
    fn catalog_only_grows() {
        let mut driver = SimDriver::new(GameConfig::default());
        let initial_len = driver.action_catalog().len();
        let idx = driver.index_of(&Action::EndTurn);
        assert!(idx < driver.action_catalog().len());
        assert_eq!(driver.action_catalog().len(), initial_len.max(idx + 1));
        let idx_again = driver.index_of(&Action::EndTurn);
        assert_eq!(idx, idx_again);
    }

    #[test]
    fn mask_matches_legal_actions() {
        let mut driver = SimDriver::new(GameConfig::default());
        let legal = driver.legal_actions();
        let mask = driver.legal_actions_mask();
        assert_eq!(mask.iter().filter(|&&b| b).count(), legal.len());
    }
}
