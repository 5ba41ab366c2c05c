use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::{CatanMap, EdgeId, NodeId};
use crate::game::resources::{ResourceBundle, ResourceError};
use crate::rules;
use crate::types::{DevelopmentCard, Resource};

/// The per-player accounting record.
///
/// `victory_points` counts only hidden points from `VictoryPoint`
/// development cards. `title_points` is the longest-road/largest-army
/// bonus, maintained by `game::titles` as an explicit +2/-2 transfer on
/// ownership change rather than recomputed from the `has_longest_road`/
/// `has_largest_army` flags on every call — see DESIGN.md for why this
/// differs from a flat derived-bonus model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: usize,
    pub resources: ResourceBundle,
    /// Matured, playable development cards.
    pub dev_cards: Vec<DevelopmentCard>,
    /// Development cards bought this turn; not yet playable.
    pub fresh_dev_cards: Vec<DevelopmentCard>,
    /// Development cards already played, for the public record.
    pub played_dev_cards: HashMap<DevelopmentCard, u32>,
    pub roads: HashSet<EdgeId>,
    pub settlements: HashSet<NodeId>,
    pub cities: HashSet<NodeId>,
    pub victory_points: u32,
    pub title_points: u32,
    pub knights_played: u32,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
    pub has_rolled: bool,
    pub has_played_dev_card_this_turn: bool,
}

impl PlayerState {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            resources: ResourceBundle::zero(),
            dev_cards: Vec::new(),
            fresh_dev_cards: Vec::new(),
            played_dev_cards: HashMap::new(),
            roads: HashSet::new(),
            settlements: HashSet::new(),
            cities: HashSet::new(),
            victory_points: 0,
            title_points: 0,
            knights_played: 0,
            has_longest_road: false,
            has_largest_army: false,
            has_rolled: false,
            has_played_dev_card_this_turn: false,
        }
    }

    pub fn reset_for_new_turn(&mut self) {
        self.dev_cards.extend(self.fresh_dev_cards.drain(..));
        self.has_rolled = false;
        self.has_played_dev_card_this_turn = false;
    }

    pub fn add_resources(&mut self, bundle: &ResourceBundle) {
        self.resources.add_bundle(bundle);
    }

    pub fn remove_resources(&mut self, bundle: &ResourceBundle) -> Result<(), ResourceError> {
        self.resources.subtract_bundle(bundle)
    }

    pub fn add_dev_card(&mut self, card: DevelopmentCard) {
        self.fresh_dev_cards.push(card);
        if matches!(card, DevelopmentCard::VictoryPoint) {
            self.victory_points += 1;
        }
    }

    pub fn record_dev_card_play(&mut self, card: DevelopmentCard) {
        *self.played_dev_cards.entry(card).or_insert(0) += 1;
        if matches!(card, DevelopmentCard::Knight) {
            self.knights_played += 1;
        }
        self.has_played_dev_card_this_turn = true;
    }

    pub fn matured_dev_card_count(&self, card: DevelopmentCard) -> usize {
        self.dev_cards.iter().filter(|c| **c == card).count()
    }

    pub fn can_play_dev_card(&self, card: DevelopmentCard) -> bool {
        if self.has_played_dev_card_this_turn {
            return false;
        }
        self.matured_dev_card_count(card) > 0
    }

    pub fn consume_dev_card(&mut self, card: DevelopmentCard) -> bool {
        if let Some(pos) = self.dev_cards.iter().position(|c| *c == card) {
            self.dev_cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn settlement_limit_reached(&self) -> bool {
        self.settlements.len() >= rules::MAX_SETTLEMENTS
    }

    pub fn city_limit_reached(&self) -> bool {
        self.cities.len() >= rules::MAX_CITIES
    }

    pub fn road_limit_reached(&self) -> bool {
        self.roads.len() >= rules::MAX_ROADS
    }

    pub fn total_structures(&self) -> usize {
        self.settlements.len() + self.cities.len() + self.roads.len()
    }

    /// Hand size for the discard rule.
    pub fn hand_size(&self) -> u32 {
        self.resources.total()
    }

    pub fn owes_discard(&self) -> bool {
        self.hand_size() as usize > rules::DISCARD_THRESHOLD
    }

    /// Number of cards a player must give up on a 7: `⌊hand / 2⌋`.
    pub fn discard_count(&self) -> u32 {
        self.hand_size() / 2
    }

    pub fn total_points(&self) -> u32 {
        self.public_points() + self.victory_points
    }

    /// Points visible to an opponent: built structures plus title bonuses,
    /// excluding hidden victory-point development cards.
    pub fn public_points(&self) -> u32 {
        let settlement_points = self.settlements.len() as u32;
        let city_points = (self.cities.len() as u32) * 2;
        settlement_points + city_points + self.title_points
    }

    /// The kinds of port this player has access to, derived from their
    /// settlements/cities' node positions.
    pub fn port_kinds(&self, board: &CatanMap) -> HashSet<Option<Resource>> {
        let mut kinds = HashSet::new();
        for node in self.settlements.iter().chain(self.cities.iter()) {
            for (resource, nodes) in &board.port_nodes {
                if nodes.contains(node) {
                    kinds.insert(*resource);
                }
            }
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_count_is_floor_half_hand() {
        let mut player = PlayerState::new(0);
        player.add_resources(&ResourceBundle::from_counts([3, 3, 3, 1, 0]));
        assert_eq!(player.hand_size(), 10);
        assert!(player.owes_discard());
        assert_eq!(player.discard_count(), 5);
    }

    #[test]
    fn nine_cards_does_not_owe_discard() {
        let mut player = PlayerState::new(0);
        player.add_resources(&ResourceBundle::from_counts([3, 3, 3, 0, 0]));
        assert_eq!(player.hand_size(), 9);
        assert!(!player.owes_discard());
    }

    #[test]
    fn dev_card_bought_this_turn_is_not_playable() {
        let mut player = PlayerState::new(0);
        player.add_dev_card(DevelopmentCard::Knight);
        assert!(!player.can_play_dev_card(DevelopmentCard::Knight));
        player.reset_for_new_turn();
        assert!(player.can_play_dev_card(DevelopmentCard::Knight));
    }
}
