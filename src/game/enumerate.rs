//! Legal-action enumeration.

use crate::board::{EdgeId, NodeId, edge_contains_node, normalize_edge};
use crate::game::action::Action;
use crate::game::resources::ResourceBundle;
use crate::game::state::{GameState, SubPhase};
use crate::rules;
use crate::types::{DevelopmentCard, Phase, Resource};

pub fn legal_actions(state: &GameState) -> Vec<Action> {
    if state.is_done() {
        return Vec::new();
    }

    match state.phase {
        Phase::SetupRound1 | Phase::SetupRound2 => legal_setup_actions(state),
        Phase::Play => match state.sub_phase {
            SubPhase::RobberDiscard => legal_discard_actions(state),
            SubPhase::RobberMove => legal_move_robber_actions(state),
            SubPhase::TradeResponse => legal_trade_response_actions(state),
            SubPhase::Main => legal_main_phase_actions(state),
        },
    }
}

fn legal_setup_actions(state: &GameState) -> Vec<Action> {
    let Some(step) = state.current_setup_step() else {
        return Vec::new();
    };
    let player = step.player;

    if step.place_road {
        // The road must attach to the settlement just placed, i.e. to the
        // most recently added node for this player.
        let Some(&anchor) = state.players[player].settlements.iter().max() else {
            return Vec::new();
        };
        state
            .board
            .node_edges
            .get(&anchor)
            .into_iter()
            .flatten()
            .filter(|edge| state.edge_occupant(**edge).is_none())
            .map(|edge| Action::BuildRoad(normalize_edge(*edge)))
            .collect()
    } else {
        state
            .board
            .land_nodes
            .iter()
            .filter(|&&node| is_valid_settlement_site(state, node, false))
            .map(|&node| Action::BuildSettlement(node))
            .collect()
    }
}

fn legal_discard_actions(state: &GameState) -> Vec<Action> {
    let Some(&player) = state.pending_discards.first() else {
        return Vec::new();
    };
    let hand = &state.players[player].resources;
    let owed = state.players[player].discard_count();
    enumerate_discard_multisets(hand, owed)
        .into_iter()
        .map(Action::DiscardResources)
        .collect()
}

/// Backtrack over `Resource::ALL` to enumerate every multiset of exactly
/// `count` cards drawable from `hand`.
fn enumerate_discard_multisets(hand: &ResourceBundle, count: u32) -> Vec<ResourceBundle> {
    fn go(
        hand: &ResourceBundle,
        resources: &[Resource],
        remaining: u32,
        current: ResourceBundle,
        out: &mut Vec<ResourceBundle>,
    ) {
        if remaining == 0 {
            out.push(current);
            return;
        }
        let Some((&resource, rest)) = resources.split_first() else {
            return;
        };
        let max_take = hand.get(resource).min(remaining);
        for take in 0..=max_take {
            let mut next = current;
            if take > 0 {
                next.add(resource, take);
            }
            go(hand, rest, remaining - take, next, out);
        }
    }

    let mut out = Vec::new();
    go(hand, &Resource::ALL, count, ResourceBundle::zero(), &mut out);
    out
}

fn legal_move_robber_actions(state: &GameState) -> Vec<Action> {
    let mover = state.acting_player();
    let mut actions = Vec::new();
    for &tile_id in state.board.tiles_by_id.keys() {
        if tile_id == state.robber_tile {
            continue;
        }
        let tile = &state.board.tiles_by_id[&tile_id];
        let victims: Vec<usize> = state
            .players
            .iter()
            .enumerate()
            .filter(|(id, _)| *id != mover)
            .filter(|(_, p)| {
                tile.nodes.values().any(|n| p.settlements.contains(n) || p.cities.contains(n))
            })
            .filter(|(_, p)| p.resources.total() > 0)
            .map(|(id, _)| id)
            .collect();

        if victims.is_empty() {
            actions.push(Action::MoveRobber { tile_id, victim: None });
        } else {
            for victim in victims {
                actions.push(Action::MoveRobber { tile_id, victim: Some(victim) });
            }
        }
    }
    actions
}

fn legal_trade_response_actions(state: &GameState) -> Vec<Action> {
    let Some(trade) = &state.pending_trade else {
        return Vec::new();
    };
    let responder = state.other_player(trade.offerer);
    let mut actions = vec![Action::DeclinePlayerTrade];
    if state.players[responder].resources.can_afford(&trade.receive) {
        actions.push(Action::AcceptPlayerTrade);
    }
    actions
}

fn legal_main_phase_actions(state: &GameState) -> Vec<Action> {
    if !state.dice_rolled_this_turn {
        return vec![Action::RollDice(None)];
    }

    let player_id = state.current_player;
    let player = &state.players[player_id];
    let mut actions = vec![Action::EndTurn];

    if !player.road_limit_reached() {
        actions.extend(legal_road_actions(state, player_id, false));
    }

    if !player.settlement_limit_reached() {
        let cost = ResourceBundle::from_counts(rules::COST_SETTLEMENT);
        if player.resources.can_afford(&cost) {
            for &node in &state.board.land_nodes {
                if is_valid_settlement_site(state, node, true) {
                    actions.push(Action::BuildSettlement(node));
                }
            }
        }
    }

    if !player.city_limit_reached() {
        let cost = ResourceBundle::from_counts(rules::COST_CITY);
        if player.resources.can_afford(&cost) {
            for &node in &player.settlements {
                actions.push(Action::BuildCity(node));
            }
        }
    }

    if state.bank.development_deck_len() > 0 {
        let cost = ResourceBundle::from_counts(rules::COST_DEVELOPMENT);
        if player.resources.can_afford(&cost) {
            actions.push(Action::BuyDevelopmentCard);
        }
    }

    if player.can_play_dev_card(DevelopmentCard::Knight) {
        actions.push(Action::PlayKnight);
    }
    if player.can_play_dev_card(DevelopmentCard::RoadBuilding) && player.roads.len() + 2 <= rules::MAX_ROADS {
        for (a, b) in unordered_edge_pairs(state, player_id) {
            actions.push(Action::PlayRoadBuilding(a, b));
        }
    }
    if player.can_play_dev_card(DevelopmentCard::YearOfPlenty) {
        actions.extend(year_of_plenty_actions(state));
    }
    if player.can_play_dev_card(DevelopmentCard::Monopoly) {
        for resource in Resource::ALL {
            actions.push(Action::PlayMonopoly(resource));
        }
    }

    actions.extend(legal_bank_trades(state, player_id));
    actions.extend(legal_player_trade_offers(state, player_id));

    actions
}

fn legal_road_actions(state: &GameState, player_id: usize, free: bool) -> Vec<Action> {
    if !free {
        let cost = ResourceBundle::from_counts(rules::COST_ROAD);
        if !state.players[player_id].resources.can_afford(&cost) {
            return Vec::new();
        }
    }
    state
        .board
        .unique_edges()
        .into_iter()
        .filter(|&edge| state.edge_occupant(edge).is_none())
        .filter(|&edge| edge_touches_player(state, player_id, edge))
        .map(Action::BuildRoad)
        .collect()
}

/// Pairs of empty edges that are legal road placements *in sequence*: the
/// first must already touch the actor's network, and the second must touch
/// either the network or the first edge (the first placement may be what
/// makes the second one legal).
fn unordered_edge_pairs(state: &GameState, player_id: usize) -> Vec<(EdgeId, EdgeId)> {
    let empty: Vec<EdgeId> = state
        .board
        .unique_edges()
        .into_iter()
        .filter(|&edge| state.edge_occupant(edge).is_none())
        .collect();

    let mut pairs = Vec::new();
    for &first in &empty {
        if !edge_touches_player(state, player_id, first) {
            continue;
        }
        for &second in &empty {
            if second == first {
                continue;
            }
            let second_legal_after_first =
                edge_touches_player(state, player_id, second) || edges_share_node(first, second);
            if !second_legal_after_first {
                continue;
            }
            let pair = if first <= second { (first, second) } else { (second, first) };
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
    }
    pairs
}

fn edges_share_node(a: EdgeId, b: EdgeId) -> bool {
    a.0 == b.0 || a.0 == b.1 || a.1 == b.0 || a.1 == b.1
}

fn year_of_plenty_actions(state: &GameState) -> Vec<Action> {
    let mut actions = Vec::new();
    for i in 0..Resource::ALL.len() {
        for j in i..Resource::ALL.len() {
            let a = Resource::ALL[i];
            let b = Resource::ALL[j];
            let needed = if a == b {
                state.bank.available(a) >= 2
            } else {
                state.bank.available(a) >= 1 && state.bank.available(b) >= 1
            };
            if needed {
                let mut bundle = ResourceBundle::zero();
                bundle.add(a, 1);
                bundle.add(b, 1);
                actions.push(Action::PlayYearOfPlenty(bundle));
            }
        }
    }
    actions
}

fn legal_bank_trades(state: &GameState, player_id: usize) -> Vec<Action> {
    let player = &state.players[player_id];
    let mut actions = Vec::new();
    for give in Resource::ALL {
        let rate = trade_rate(state, player_id, give);
        let held = player.resources.get(give);
        if held < rate {
            continue;
        }
        for receive in Resource::ALL {
            if receive == give {
                continue;
            }
            let mut amount = rate;
            while amount <= held {
                let receive_amount = amount / rate;
                if state.bank.available(receive) >= receive_amount {
                    actions.push(Action::TradeBank { give, receive, amount });
                }
                amount += rate;
            }
        }
    }
    actions
}

pub fn trade_rate(state: &GameState, player_id: usize, resource: Resource) -> u32 {
    let ports = state.players[player_id].port_kinds(&state.board);
    if ports.contains(&Some(resource)) {
        rules::SPECIFIC_PORT_TRADE_RATE
    } else if ports.contains(&None) {
        rules::GENERIC_PORT_TRADE_RATE
    } else {
        rules::BANK_TRADE_RATE
    }
}

/// Single-unit-for-single-unit player trade offers, bounded for a finite
/// catalog: exact offer shapes are otherwise unconstrained, so this is the
/// simplification recorded in DESIGN.md.
fn legal_player_trade_offers(state: &GameState, player_id: usize) -> Vec<Action> {
    let player = &state.players[player_id];
    let mut actions = Vec::new();
    for give in Resource::ALL {
        if player.resources.get(give) == 0 {
            continue;
        }
        for receive in Resource::ALL {
            if receive == give {
                continue;
            }
            actions.push(Action::OfferPlayerTrade {
                give: ResourceBundle::single(give, 1),
                receive: ResourceBundle::single(receive, 1),
            });
        }
    }
    actions
}

fn is_valid_settlement_site(state: &GameState, node: NodeId, require_network: bool) -> bool {
    if state.node_occupant(node).is_some() {
        return false;
    }
    if let Some(neighbors) = state.board.node_neighbors.get(&node) {
        if neighbors.iter().any(|n| state.node_occupant(*n).is_some()) {
            return false;
        }
    }
    if require_network && !node_on_player_network(state, state.current_player, node) {
        return false;
    }
    true
}

fn node_on_player_network(state: &GameState, player_id: usize, node: NodeId) -> bool {
    state.players[player_id].roads.iter().any(|&edge| edge_contains_node(edge, node))
}

fn edge_touches_player(state: &GameState, player_id: usize, edge: EdgeId) -> bool {
    let player = &state.players[player_id];
    let touches_node = player.settlements.contains(&edge.0)
        || player.settlements.contains(&edge.1)
        || player.cities.contains(&edge.0)
        || player.cities.contains(&edge.1);
    let touches_road = player.roads.iter().any(|&r| edge_contains_node(r, edge.0) || edge_contains_node(r, edge.1));
    touches_node || touches_road
}

/// Action catalog support: a stable list of every action the engine can
/// ever produce, independent of any particular state, with payloads
/// enumerated in canonical order. Used for RL action-index stability and for
/// `legal_actions_mask`.
pub fn build_action_catalog(state: &GameState) -> Vec<Action> {
    let mut catalog = Vec::new();
    let edges = state.board.unique_edges();
    let nodes: Vec<NodeId> = {
        let mut n: Vec<NodeId> = state.board.land_nodes.iter().copied().collect();
        n.sort_unstable();
        n
    };

    catalog.push(Action::RollDice(None));
    catalog.push(Action::EndTurn);
    catalog.push(Action::BuyDevelopmentCard);
    catalog.push(Action::PlayKnight);
    catalog.push(Action::AcceptPlayerTrade);
    catalog.push(Action::DeclinePlayerTrade);

    for &node in &nodes {
        catalog.push(Action::BuildSettlement(node));
    }
    for &node in &nodes {
        catalog.push(Action::BuildCity(node));
    }
    for &edge in &edges {
        catalog.push(Action::BuildRoad(edge));
    }
    for resource in Resource::ALL {
        catalog.push(Action::PlayMonopoly(resource));
    }
    for i in 0..Resource::ALL.len() {
        for j in i..Resource::ALL.len() {
            let mut bundle = ResourceBundle::zero();
            bundle.add(Resource::ALL[i], 1);
            bundle.add(Resource::ALL[j], 1);
            catalog.push(Action::PlayYearOfPlenty(bundle));
        }
    }
    let mut tile_ids: Vec<u16> = state.board.tiles_by_id.keys().copied().collect();
    tile_ids.sort_unstable();
    for tile_id in tile_ids {
        catalog.push(Action::MoveRobber { tile_id, victim: None });
        catalog.push(Action::MoveRobber { tile_id, victim: Some(0) });
        catalog.push(Action::MoveRobber { tile_id, victim: Some(1) });
    }
    for give in Resource::ALL {
        for receive in Resource::ALL {
            if give == receive {
                continue;
            }
            // Every amount reachable at rate 4, 3, or 2 (a multiple of 2 or
            // 3 covers all three, since every multiple of 4 is also a
            // multiple of 2), capped at the largest hand resource
            // conservation ever allows.
            for amount in 1..=rules::MAX_BANK_TRADE_GIVE {
                if amount % rules::SPECIFIC_PORT_TRADE_RATE == 0 || amount % rules::GENERIC_PORT_TRADE_RATE == 0 {
                    catalog.push(Action::TradeBank { give, receive, amount });
                }
            }
            catalog.push(Action::OfferPlayerTrade {
                give: ResourceBundle::single(give, 1),
                receive: ResourceBundle::single(receive, 1),
            });
        }
    }
    for i in 0..edges.len() {
        for j in i..edges.len() {
            catalog.push(Action::PlayRoadBuilding(edges[i], edges[j]));
        }
    }

    catalog
}
