//! JSON-friendly save/restore.
//!
//! `GameState` itself does not derive `Serialize`/`Deserialize`: `CatanMap`'s
//! adjacency tables are keyed by `CubeCoord`/`NodeRef`/`EdgeRef`/
//! `Option<Resource>`, none of which serde can turn into JSON object keys,
//! and `Arc<CatanMap>` would need serde's `rc` feature just to round-trip a
//! value that's fully determined by `config` anyway. Instead, `GameSnapshot`
//! is a separate, hand-built, fully portable struct — board geometry is
//! reconstructed from `config` rather than serialized, since the board never
//! changes after `GameState::new` builds it.
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::board::{CatanMap, EdgeId, NodeId};
use crate::game::bank::Bank;
use crate::game::player::PlayerState;
use crate::game::resources::ResourceBundle;
use crate::game::state::{GameConfig, GameState, PendingTrade};
use crate::types::{DevelopmentCard, Phase, Resource, SubPhase};

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: usize,
    pub resources: [u32; 5],
    pub dev_cards: Vec<DevelopmentCard>,
    pub fresh_dev_cards: Vec<DevelopmentCard>,
    pub played_dev_cards: Vec<(DevelopmentCard, u32)>,
    pub roads: Vec<EdgeId>,
    pub settlements: Vec<NodeId>,
    pub cities: Vec<NodeId>,
    pub victory_points: u32,
    pub title_points: u32,
    pub knights_played: u32,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
    pub has_rolled: bool,
    pub has_played_dev_card_this_turn: bool,
}

/// RNG state as an opaque typed blob rather than a bare `StdRng` field, so
/// the snapshot format can grow a second PRNG kind later without breaking
/// old saves: readers can check `rng_type` before trusting `state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngSnapshot {
    pub rng_type: String,
    pub state: StdRng,
}

impl RngSnapshot {
    fn from_rng(rng: StdRng) -> Self {
        Self { rng_type: "stdrng".to_string(), state: rng }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTradeSnapshot {
    pub offerer: usize,
    pub give: [u32; 5],
    pub receive: [u32; 5],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub schema_version: String,
    pub config: GameConfig,
    pub phase: Phase,
    pub sub_phase: SubPhase,
    pub current_player: usize,
    pub turn_number: u32,
    pub robber_tile: u16,
    pub last_dice_roll: Option<(u8, u8)>,
    pub dice_rolled_this_turn: bool,
    pub setup_cursor: usize,
    pub pending_discards: Vec<usize>,
    pub pending_trade: Option<PendingTradeSnapshot>,
    pub longest_road_owner: Option<usize>,
    pub longest_road_length: u32,
    pub largest_army_owner: Option<usize>,
    pub largest_army_size: u32,
    pub winner: Option<usize>,
    pub bank_resources: [u32; 5],
    pub dev_deck: Vec<DevelopmentCard>,
    pub rng_state: RngSnapshot,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported schema_version: {0}")]
    UnsupportedSchema(String),
    #[error("unsupported rng_type: {0}")]
    UnsupportedRng(String),
}

pub fn to_snapshot(state: &GameState) -> GameSnapshot {
    GameSnapshot {
        schema_version: SCHEMA_VERSION.to_string(),
        config: state.config.clone(),
        phase: state.phase,
        sub_phase: state.sub_phase,
        current_player: state.current_player,
        turn_number: state.turn_number,
        robber_tile: state.robber_tile,
        last_dice_roll: state.last_dice_roll,
        dice_rolled_this_turn: state.dice_rolled_this_turn,
        setup_cursor: state.setup_cursor,
        pending_discards: state.pending_discards.clone(),
        pending_trade: state.pending_trade.as_ref().map(|trade| PendingTradeSnapshot {
            offerer: trade.offerer,
            give: trade.give.counts(),
            receive: trade.receive.counts(),
        }),
        longest_road_owner: state.longest_road_owner,
        longest_road_length: state.longest_road_length,
        largest_army_owner: state.largest_army_owner,
        largest_army_size: state.largest_army_size,
        winner: state.winner,
        bank_resources: state.bank.resources().counts(),
        dev_deck: state.bank.development_deck().to_vec(),
        rng_state: RngSnapshot::from_rng(state.rng.clone()),
        players: state.players.iter().map(player_to_snapshot).collect(),
    }
}

fn player_to_snapshot(player: &PlayerState) -> PlayerSnapshot {
    PlayerSnapshot {
        id: player.id,
        resources: player.resources.counts(),
        dev_cards: player.dev_cards.clone(),
        fresh_dev_cards: player.fresh_dev_cards.clone(),
        played_dev_cards: player.played_dev_cards.iter().map(|(card, count)| (*card, *count)).collect(),
        roads: player.roads.iter().copied().collect(),
        settlements: player.settlements.iter().copied().collect(),
        cities: player.cities.iter().copied().collect(),
        victory_points: player.victory_points,
        title_points: player.title_points,
        knights_played: player.knights_played,
        has_longest_road: player.has_longest_road,
        has_largest_army: player.has_largest_army,
        has_rolled: player.has_rolled,
        has_played_dev_card_this_turn: player.has_played_dev_card_this_turn,
    }
}

pub fn from_snapshot(snapshot: GameSnapshot) -> Result<GameState, SnapshotError> {
    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedSchema(snapshot.schema_version));
    }
    if snapshot.rng_state.rng_type != "stdrng" {
        return Err(SnapshotError::UnsupportedRng(snapshot.rng_state.rng_type));
    }

    // The board is fully determined by `config`: it's built once, before any
    // other randomness is drawn, so replaying that same build reproduces the
    // original board exactly regardless of how many turns have elapsed since.
    let mut board_rng = StdRng::seed_from_u64(snapshot.config.seed);
    let board = Arc::new(CatanMap::build(snapshot.config.board_layout, &mut board_rng));

    let mut bank = Bank::standard(&mut StdRng::seed_from_u64(snapshot.config.seed));
    bank.restore(snapshot.bank_resources, snapshot.dev_deck);

    let players = snapshot.players.into_iter().map(player_from_snapshot).collect();

    Ok(GameState {
        config: snapshot.config,
        board,
        players,
        bank,
        phase: snapshot.phase,
        sub_phase: snapshot.sub_phase,
        current_player: snapshot.current_player,
        turn_number: snapshot.turn_number,
        robber_tile: snapshot.robber_tile,
        last_dice_roll: snapshot.last_dice_roll,
        dice_rolled_this_turn: snapshot.dice_rolled_this_turn,
        setup_cursor: snapshot.setup_cursor,
        pending_discards: snapshot.pending_discards,
        pending_trade: snapshot.pending_trade.map(|trade| PendingTrade {
            offerer: trade.offerer,
            give: ResourceBundle::from_counts(trade.give),
            receive: ResourceBundle::from_counts(trade.receive),
        }),
        longest_road_owner: snapshot.longest_road_owner,
        longest_road_length: snapshot.longest_road_length,
        largest_army_owner: snapshot.largest_army_owner,
        largest_army_size: snapshot.largest_army_size,
        winner: snapshot.winner,
        rng: snapshot.rng_state.state,
    })
}

fn player_from_snapshot(data: PlayerSnapshot) -> PlayerState {
    let mut player = PlayerState::new(data.id);
    player.resources = ResourceBundle::from_counts(data.resources);
    player.dev_cards = data.dev_cards;
    player.fresh_dev_cards = data.fresh_dev_cards;
    player.played_dev_cards = data.played_dev_cards.into_iter().collect();
    player.roads = data.roads.into_iter().collect();
    player.settlements = data.settlements.into_iter().collect();
    player.cities = data.cities.into_iter().collect();
    player.victory_points = data.victory_points;
    player.title_points = data.title_points;
    player.knights_played = data.knights_played;
    player.has_longest_road = data.has_longest_road;
    player.has_largest_army = data.has_largest_army;
    player.has_rolled = data.has_rolled;
    player.has_played_dev_card_this_turn = data.has_played_dev_card_this_turn;
    player
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let state = GameState::new(GameConfig::default());
        let snapshot = to_snapshot(&state);
        let json = serde_json::to_string(&snapshot).expect("snapshot serializes");
        let restored: GameSnapshot = serde_json::from_str(&json).expect("snapshot deserializes");
        let restored_state = from_snapshot(restored).expect("snapshot restores");
        assert_eq!(restored_state.phase, state.phase);
        assert_eq!(restored_state.current_player, state.current_player);
        assert_eq!(restored_state.robber_tile, state.robber_tile);
        assert_eq!(restored_state.players.len(), state.players.len());
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let mut snapshot = to_snapshot(&GameState::new(GameConfig::default()));
        snapshot.schema_version = "9.9.9".to_string();
        assert!(from_snapshot(snapshot).is_err());
    }
}
