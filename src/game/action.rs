use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, NodeId};
use crate::game::resources::ResourceBundle;
use crate::types::Resource;

/// A single tagged-sum catalog of every move a player can make. Unlike
/// the teacher's `ActionType` + `ActionPayload` split (which exists because
/// its action log stores a flat `(type, payload)` pair for replay), this
/// crate has one finite, append-only catalog keyed by variant, so a
/// single enum with its own payload per arm is both the clearer model and
/// the one the catalog can enumerate directly.
///
/// There is no separate "initial placement" variant: `BuildSettlement` and
/// `BuildRoad` serve both the setup phase and the main phase, the way the
/// teacher's `GameState` dispatches the same action types through
/// `handle_setup_action` and `handle_play_action` depending on the current
/// phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    BuildSettlement(NodeId),
    BuildRoad(EdgeId),
    BuildCity(NodeId),
    /// `Some(dice)` forces a specific roll, for deterministic replay/tests;
    /// normal play always enumerates `RollDice(None)`.
    RollDice(Option<(u8, u8)>),
    MoveRobber {
        tile_id: u16,
        victim: Option<usize>,
    },
    /// The whole owed multiset discarded at once, not a one-card-at-a-time loop.
    DiscardResources(ResourceBundle),
    BuyDevelopmentCard,
    PlayKnight,
    PlayRoadBuilding(EdgeId, EdgeId),
    /// Exactly two resources total (possibly the same resource twice).
    PlayYearOfPlenty(ResourceBundle),
    PlayMonopoly(Resource),
    /// `amount` is the quantity of `give` spent; it must be a positive
    /// multiple of the actor's trade rate for that resource, and the actor
    /// receives `amount / rate` units of `receive` in return.
    TradeBank {
        give: Resource,
        receive: Resource,
        amount: u32,
    },
    OfferPlayerTrade {
        give: ResourceBundle,
        receive: ResourceBundle,
    },
    AcceptPlayerTrade,
    DeclinePlayerTrade,
    EndTurn,
}

impl Action {
    /// A stable, human-readable tag used for the action catalog and for
    /// logging, independent of the payload.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::BuildSettlement(_) => "BUILD_SETTLEMENT",
            Action::BuildRoad(_) => "BUILD_ROAD",
            Action::BuildCity(_) => "BUILD_CITY",
            Action::RollDice(_) => "ROLL_DICE",
            Action::MoveRobber { .. } => "MOVE_ROBBER",
            Action::DiscardResources(_) => "DISCARD_RESOURCES",
            Action::BuyDevelopmentCard => "BUY_DEVELOPMENT_CARD",
            Action::PlayKnight => "PLAY_KNIGHT",
            Action::PlayRoadBuilding(_, _) => "PLAY_ROAD_BUILDING",
            Action::PlayYearOfPlenty(_) => "PLAY_YEAR_OF_PLENTY",
            Action::PlayMonopoly(_) => "PLAY_MONOPOLY",
            Action::TradeBank { .. } => "TRADE_BANK",
            Action::OfferPlayerTrade { .. } => "OFFER_PLAYER_TRADE",
            Action::AcceptPlayerTrade => "ACCEPT_PLAYER_TRADE",
            Action::DeclinePlayerTrade => "DECLINE_PLAYER_TRADE",
            Action::EndTurn => "END_TURN",
        }
    }
}
