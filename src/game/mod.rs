pub mod action;
pub mod bank;
pub mod enumerate;
pub mod legality;
pub mod player;
pub mod resources;
pub mod snapshot;
pub mod state;
pub mod titles;
pub mod transition;

pub use action::Action;
pub use bank::Bank;
pub use enumerate::{build_action_catalog, legal_actions, trade_rate};
pub use legality::is_legal;
pub use player::PlayerState;
pub use resources::{ResourceBundle, ResourceError};
pub use snapshot::{GameSnapshot, SnapshotError, from_snapshot, to_snapshot};
pub use state::{
    GameConfig, GameError, GameEvent, GameState, PendingTrade, SetupStep, StepOutcome, SubPhase,
    setup_order,
};
pub use titles::recompute_titles;
pub use transition::apply_action;
