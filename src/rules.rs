//! Variant constants and cost tables.
//!
//! The 1v1 variant keeps the standard Catan cost tables and piece caps but
//! changes the victory threshold, the discard threshold, and the titled-road
//! / titled-army minimums relative to the 3-4 player game the teacher models.

use crate::types::Resource;

/// Victory points needed to win. Pinned to 15 for this 1v1 variant rather
/// than the standard 10.
pub const VP_TO_WIN: u32 = 15;

/// A player must discard down to this many cards when a 7 is rolled and
/// their hand exceeds it. Pinned to 9 for this 1v1 variant, not the
/// standard 4-player threshold of 7.
pub const DISCARD_THRESHOLD: usize = 9;

/// Minimum road-network length to hold the longest-road title.
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum knights played to hold the largest-army title.
pub const MIN_LARGEST_ARMY: u32 = 3;

/// Victory points awarded to the holder of each title.
pub const TITLE_BONUS_POINTS: u32 = 2;

pub const MAX_ROADS: usize = 15;
pub const MAX_SETTLEMENTS: usize = 5;
pub const MAX_CITIES: usize = 4;

/// Starting bank stock, per resource.
pub const BANK_STARTING_STOCK: u32 = 19;

/// Upper bound on a single bank-trade's give amount, used to keep the
/// state-independent action catalog finite. Resource conservation caps a
/// player's hand at the full starting stock of one resource, so no legal
/// trade can ever need more than this many units.
pub const MAX_BANK_TRADE_GIVE: u32 = BANK_STARTING_STOCK;

/// Resource costs, indexed by `Resource::ALL` order (Wood, Brick, Sheep, Wheat, Ore).
pub const COST_ROAD: [u32; 5] = [1, 1, 0, 0, 0];
pub const COST_SETTLEMENT: [u32; 5] = [1, 1, 1, 1, 0];
pub const COST_CITY: [u32; 5] = [0, 0, 0, 2, 3];
pub const COST_DEVELOPMENT: [u32; 5] = [0, 0, 1, 1, 1];

/// Bank-trade rate without a port.
pub const BANK_TRADE_RATE: u32 = 4;
/// Bank-trade rate at a resource-specific 2:1 port.
pub const SPECIFIC_PORT_TRADE_RATE: u32 = 2;
/// Bank-trade rate at a 3:1 "any" port.
pub const GENERIC_PORT_TRADE_RATE: u32 = 3;

/// Composition of the 25-card development deck.
pub const DEV_DECK_KNIGHTS: u32 = 14;
pub const DEV_DECK_VICTORY_POINTS: u32 = 5;
pub const DEV_DECK_ROAD_BUILDING: u32 = 2;
pub const DEV_DECK_YEAR_OF_PLENTY: u32 = 2;
pub const DEV_DECK_MONOPOLY: u32 = 2;

/// Alphabetical order of each resource's canonical name (BRICK, GRAIN,
/// LUMBER, ORE, WOOL), used only for the robber's deterministic steal
/// selection: the first resource in this order the victim holds a
/// positive count of is the one taken.
pub const STEAL_ORDER: [Resource; 5] = [
    Resource::Brick,
    Resource::Wheat,
    Resource::Wood,
    Resource::Ore,
    Resource::Sheep,
];

pub fn resource_index(resource: Resource) -> usize {
    Resource::ALL
        .iter()
        .position(|r| *r == resource)
        .expect("Resource::ALL is exhaustive")
}
