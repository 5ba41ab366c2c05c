use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{BoardLayout, CatanMap, EdgeId, NodeId};
use crate::game::bank::Bank;
use crate::game::player::PlayerState;
use crate::game::resources::{ResourceBundle, ResourceError};
use crate::rules;
use crate::types::{DevelopmentCard, Phase, Resource};
pub use crate::types::SubPhase;

/// Configuration for a new game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub seed: u64,
    pub board_layout: BoardLayout,
    pub vps_to_win: u32,
    pub discard_threshold: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            board_layout: BoardLayout::Standard,
            vps_to_win: rules::VP_TO_WIN,
            discard_threshold: rules::DISCARD_THRESHOLD,
        }
    }
}

/// One step of the setup snake order: settlement then road, for each player,
/// forward then reversed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetupStep {
    pub player: usize,
    pub place_road: bool,
    pub second_round: bool,
}

pub fn setup_order(num_players: usize) -> Vec<SetupStep> {
    let mut steps = Vec::with_capacity(num_players * 4);
    for player in 0..num_players {
        steps.push(SetupStep { player, place_road: false, second_round: false });
        steps.push(SetupStep { player, place_road: true, second_round: false });
    }
    for player in (0..num_players).rev() {
        steps.push(SetupStep { player, place_road: false, second_round: true });
        steps.push(SetupStep { player, place_road: true, second_round: true });
    }
    steps
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTrade {
    pub offerer: usize,
    pub give: ResourceBundle,
    pub receive: ResourceBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    DiceRolled { player: usize, total: u8 },
    ResourcesDistributed { player: usize, resource: Resource, amount: u32 },
    SettlementBuilt { player: usize, node: NodeId },
    CityBuilt { player: usize, node: NodeId },
    RoadBuilt { player: usize, edge: EdgeId },
    DevelopmentCardBought { player: usize },
    DevelopmentCardPlayed { player: usize, card: DevelopmentCard },
    RobberMoved { tile_id: u16 },
    ResourceStolen { thief: usize, victim: usize, resource: Option<Resource> },
    CardsDiscarded { player: usize, count: u32 },
    BankTradeCompleted { player: usize, give: Resource, receive: Resource, amount: u32 },
    PlayerTradeOffered { offerer: usize },
    PlayerTradeCompleted { offerer: usize, responder: usize },
    PlayerTradeDeclined { offerer: usize, responder: usize },
    LongestRoadChanged { previous: Option<usize>, current: Option<usize>, length: u32 },
    LargestArmyChanged { previous: Option<usize>, current: Option<usize>, size: u32 },
    TurnEnded { player: usize, next_player: usize },
    GameWon { player: usize },
}

#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    pub rewards: Vec<f32>,
    pub done: bool,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("the game has already finished")]
    GameFinished,
    #[error("it is not this player's turn to act")]
    OutOfTurn,
    #[error("illegal action for the current phase")]
    IllegalAction,
    #[error("state is not valid for the requested operation")]
    IllegalState,
    #[error("resource error: {0}")]
    ExhaustedResource(#[from] ResourceError),
    #[error("no opponent is available")]
    NoOpponent,
    #[error("node {0} is already occupied")]
    NodeOccupied(NodeId),
    #[error("node {0} violates the distance rule")]
    DistanceRuleViolation(NodeId),
    #[error("building must connect to the player's road network")]
    MustConnectToNetwork,
    #[error("edge {0:?} does not exist on the board")]
    EdgeNotFound(EdgeId),
    #[error("edge {0:?} already has a road")]
    EdgeOccupied(EdgeId),
}

/// The full game aggregate.
///
/// `board` is wrapped in `Arc` so that cloning a `GameState` to produce a
/// fresh state per legal action never re-builds board adjacency tables;
/// only the small per-player and pending fields are actually copied.
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Arc<CatanMap>,
    pub players: Vec<PlayerState>,
    pub bank: Bank,
    pub phase: Phase,
    pub sub_phase: SubPhase,
    pub current_player: usize,
    pub turn_number: u32,
    pub robber_tile: u16,
    pub last_dice_roll: Option<(u8, u8)>,
    pub dice_rolled_this_turn: bool,
    pub setup_cursor: usize,
    pub pending_discards: Vec<usize>,
    pub pending_trade: Option<PendingTrade>,
    pub longest_road_owner: Option<usize>,
    pub longest_road_length: u32,
    pub largest_army_owner: Option<usize>,
    pub largest_army_size: u32,
    pub winner: Option<usize>,
    pub rng: StdRng,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let board = Arc::new(CatanMap::build(config.board_layout, &mut rng));
        let bank = Bank::standard(&mut rng);
        let desert_tile = board
            .tiles_by_id
            .values()
            .find(|tile| tile.resource.is_none())
            .map(|tile| tile.id)
            .unwrap_or(0);
        Self {
            players: vec![PlayerState::new(0), PlayerState::new(1)],
            phase: Phase::SetupRound1,
            sub_phase: SubPhase::Main,
            current_player: 0,
            turn_number: 0,
            robber_tile: desert_tile,
            last_dice_roll: None,
            dice_rolled_this_turn: false,
            setup_cursor: 0,
            pending_discards: Vec::new(),
            pending_trade: None,
            longest_road_owner: None,
            longest_road_length: 0,
            largest_army_owner: None,
            largest_army_size: 0,
            winner: None,
            rng,
            board,
            bank,
            config,
        }
    }

    pub fn is_done(&self) -> bool {
        self.winner.is_some()
    }

    pub fn other_player(&self, player: usize) -> usize {
        debug_assert_eq!(self.players.len(), 2, "1v1 engine assumes exactly two players");
        1 - player
    }

    pub fn current_setup_step(&self) -> Option<SetupStep> {
        setup_order(self.players.len()).get(self.setup_cursor).copied()
    }

    /// The player allowed to act right now, which is not always
    /// `current_player` (a discard or a trade response can require the
    /// other player to act out of turn order).
    pub fn acting_player(&self) -> usize {
        match self.sub_phase {
            SubPhase::RobberDiscard => *self.pending_discards.first().unwrap_or(&self.current_player),
            SubPhase::TradeResponse => self
                .pending_trade
                .as_ref()
                .map(|trade| self.other_player(trade.offerer))
                .unwrap_or(self.current_player),
            _ => self.current_player,
        }
    }

    pub fn node_occupant(&self, node: NodeId) -> Option<usize> {
        self.players
            .iter()
            .position(|player| player.settlements.contains(&node) || player.cities.contains(&node))
    }

    pub fn edge_occupant(&self, edge: EdgeId) -> Option<usize> {
        let edge = crate::board::normalize_edge(edge);
        self.players.iter().position(|player| player.roads.contains(&edge))
    }
}
