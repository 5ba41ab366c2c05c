use rand::seq::SliceRandom;

use crate::game::resources::{ResourceBundle, ResourceError};
use crate::rules::{self, resource_index};
use crate::types::{DevelopmentCard, Resource};

/// The shared resource stock and development-card deck.
///
/// Dice-roll production never blocks on bank stock: the bank is "unlimited"
/// for the purposes of distributing resources after a roll, so `produce`
/// saturates at zero rather than erroring. Trades and
/// development-card purchases do check the tracked stock, since those are
/// player-initiated and the bank can legitimately run dry for a single
/// resource while the variant's total card count is generous.
#[derive(Debug, Clone)]
pub struct Bank {
    resources: ResourceBundle,
    development_deck: Vec<DevelopmentCard>,
}

impl Bank {
    pub fn standard(rng: &mut impl rand::Rng) -> Self {
        let mut deck = build_development_deck();
        deck.shuffle(rng);
        Self {
            resources: ResourceBundle::from_counts([rules::BANK_STARTING_STOCK; 5]),
            development_deck: deck,
        }
    }

    pub fn resources(&self) -> &ResourceBundle {
        &self.resources
    }

    /// Distribute dice-roll production to a player's hand. Never fails:
    /// if the bank's tracked stock would go negative, it saturates at zero
    /// instead.
    pub fn produce(&mut self, resource: Resource, amount: u32) -> u32 {
        let idx = resource_index(resource);
        let mut counts = self.resources.counts();
        counts[idx] = counts[idx].saturating_sub(amount);
        self.resources = ResourceBundle::from_counts(counts);
        amount
    }

    pub fn receive(&mut self, bundle: &ResourceBundle) {
        let mut updated = self.resources;
        updated.add_bundle(bundle);
        self.resources = updated;
    }

    pub fn dispense(&mut self, bundle: &ResourceBundle) -> Result<(), ResourceError> {
        let mut updated = self.resources;
        updated.subtract_bundle(bundle)?;
        self.resources = updated;
        Ok(())
    }

    pub fn draw_development_card(&mut self) -> Option<DevelopmentCard> {
        self.development_deck.pop()
    }

    pub fn buy_development_card(
        &mut self,
        player_resources: &mut ResourceBundle,
    ) -> Result<Option<DevelopmentCard>, ResourceError> {
        let cost = ResourceBundle::from_counts(rules::COST_DEVELOPMENT);
        player_resources.subtract_bundle(&cost)?;
        self.resources.add_bundle(&cost);
        Ok(self.development_deck.pop())
    }

    pub fn available(&self, resource: Resource) -> u32 {
        self.resources.get(resource)
    }

    pub fn development_deck_len(&self) -> usize {
        self.development_deck.len()
    }

    pub fn development_deck(&self) -> &[DevelopmentCard] {
        &self.development_deck
    }

    /// Overwrites tracked stock and deck contents from a snapshot.
    pub fn restore(&mut self, resources: [u32; 5], development_deck: Vec<DevelopmentCard>) {
        self.resources = ResourceBundle::from_counts(resources);
        self.development_deck = development_deck;
    }
}

fn build_development_deck() -> Vec<DevelopmentCard> {
    use DevelopmentCard::*;
    let distribution: &[(DevelopmentCard, u32)] = &[
        (Knight, rules::DEV_DECK_KNIGHTS),
        (VictoryPoint, rules::DEV_DECK_VICTORY_POINTS),
        (RoadBuilding, rules::DEV_DECK_ROAD_BUILDING),
        (YearOfPlenty, rules::DEV_DECK_YEAR_OF_PLENTY),
        (Monopoly, rules::DEV_DECK_MONOPOLY),
    ];

    let mut deck = Vec::with_capacity(25);
    for (card, count) in distribution {
        for _ in 0..*count {
            deck.push(*card);
        }
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn production_never_errors_even_when_exhausted() {
        let mut bank = Bank::standard(&mut StdRng::seed_from_u64(1));
        let granted = bank.produce(Resource::Ore, 1000);
        assert_eq!(granted, 1000);
        assert_eq!(bank.available(Resource::Ore), 0);
    }

    #[test]
    fn deck_has_twenty_five_cards() {
        let bank = Bank::standard(&mut StdRng::seed_from_u64(7));
        assert_eq!(bank.development_deck_len(), 25);
    }
}
