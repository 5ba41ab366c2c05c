//! The state-transition function.
//!
//! `apply_action` never mutates its input: it clones `state` (cheap, since
//! the board lives behind an `Arc`), mutates the clone, and returns it
//! alongside the events/rewards the transition produced. Every arm assumes
//! `action` has already passed `legality::is_legal` — that's checked once,
//! up front, rather than re-litigated per arm.

use rand::Rng;

use crate::board::{EdgeId, NodeId, normalize_edge};
use crate::game::action::Action;
use crate::game::enumerate::trade_rate;
use crate::game::legality::is_legal as is_action_legal;
use crate::game::resources::ResourceBundle;
use crate::game::state::{GameError, GameEvent, GameState, PendingTrade, StepOutcome, SubPhase};
use crate::game::titles;
use crate::rules;
use crate::types::{DevelopmentCard, Phase, Resource};

pub fn apply_action(state: &GameState, action: &Action) -> Result<(GameState, StepOutcome), GameError> {
    if state.is_done() {
        return Err(GameError::GameFinished);
    }
    if !is_action_legal(state, action) {
        return Err(GameError::IllegalAction);
    }

    let mut next = state.clone();
    let mut events = Vec::new();

    match action {
        Action::BuildSettlement(node) => build_settlement(&mut next, *node, &mut events)?,
        Action::BuildRoad(edge) => build_road(&mut next, *edge, &mut events)?,
        Action::BuildCity(node) => build_city(&mut next, *node, &mut events)?,
        Action::RollDice(forced) => roll_dice(&mut next, *forced, &mut events)?,
        Action::MoveRobber { tile_id, victim } => move_robber(&mut next, *tile_id, *victim, &mut events)?,
        Action::DiscardResources(bundle) => discard_resources(&mut next, bundle, &mut events)?,
        Action::BuyDevelopmentCard => buy_development_card(&mut next, &mut events)?,
        Action::PlayKnight => play_knight(&mut next, &mut events)?,
        Action::PlayRoadBuilding(a, b) => play_road_building(&mut next, *a, *b, &mut events)?,
        Action::PlayYearOfPlenty(bundle) => play_year_of_plenty(&mut next, bundle, &mut events)?,
        Action::PlayMonopoly(resource) => play_monopoly(&mut next, *resource, &mut events)?,
        Action::TradeBank { give, receive, amount } => trade_bank(&mut next, *give, *receive, *amount, &mut events)?,
        Action::OfferPlayerTrade { give, receive } => offer_player_trade(&mut next, give, receive, &mut events)?,
        Action::AcceptPlayerTrade => respond_to_trade(&mut next, true, &mut events)?,
        Action::DeclinePlayerTrade => respond_to_trade(&mut next, false, &mut events)?,
        Action::EndTurn => end_turn(&mut next, &mut events)?,
    }

    events.extend(titles::recompute_titles(&mut next));
    let rewards = check_victory(&mut next, &mut events);

    Ok((
        next,
        StepOutcome {
            done: next.is_done(),
            events,
            rewards,
        },
    ))
}

fn build_settlement(state: &mut GameState, node: NodeId, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.acting_player();
    match state.phase {
        Phase::SetupRound1 | Phase::SetupRound2 => {
            let second_round = matches!(state.phase, Phase::SetupRound2);
            state.players[player_id].settlements.insert(node);
            events.push(GameEvent::SettlementBuilt { player: player_id, node });
            if second_round {
                grant_starting_resources(state, player_id, node, events);
            }
            advance_setup_cursor(state, events);
        }
        Phase::Play => {
            let cost = ResourceBundle::from_counts(rules::COST_SETTLEMENT);
            state.players[player_id].remove_resources(&cost)?;
            state.bank.receive(&cost);
            state.players[player_id].settlements.insert(node);
            events.push(GameEvent::SettlementBuilt { player: player_id, node });
        }
    }
    Ok(())
}

fn build_road(state: &mut GameState, edge: EdgeId, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.acting_player();
    let edge = normalize_edge(edge);
    match state.phase {
        Phase::SetupRound1 | Phase::SetupRound2 => {
            state.players[player_id].roads.insert(edge);
            events.push(GameEvent::RoadBuilt { player: player_id, edge });
            advance_setup_cursor(state, events);
        }
        Phase::Play => {
            let cost = ResourceBundle::from_counts(rules::COST_ROAD);
            state.players[player_id].remove_resources(&cost)?;
            state.bank.receive(&cost);
            state.players[player_id].roads.insert(edge);
            events.push(GameEvent::RoadBuilt { player: player_id, edge });
        }
    }
    Ok(())
}

fn build_city(state: &mut GameState, node: NodeId, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    let cost = ResourceBundle::from_counts(rules::COST_CITY);
    state.players[player_id].remove_resources(&cost)?;
    state.bank.receive(&cost);
    state.players[player_id].settlements.remove(&node);
    state.players[player_id].cities.insert(node);
    events.push(GameEvent::CityBuilt { player: player_id, node });
    Ok(())
}

/// Starting resources for a second-round settlement: one of each non-desert
/// resource adjacent to the node.
fn grant_starting_resources(
    state: &mut GameState,
    player_id: usize,
    node: NodeId,
    events: &mut Vec<GameEvent>,
) {
    let Some(tile_ids) = state.board.adjacent_tiles.get(&node).cloned() else {
        return;
    };
    for tile_id in tile_ids {
        if let Some(tile) = state.board.tiles_by_id.get(&tile_id) {
            if let Some(resource) = tile.resource {
                let granted = state.bank.produce(resource, 1);
                state.players[player_id].resources.add(resource, granted);
                events.push(GameEvent::ResourcesDistributed { player: player_id, resource, amount: granted });
            }
        }
    }
}

fn advance_setup_cursor(state: &mut GameState, _events: &mut [GameEvent]) {
    state.setup_cursor += 1;
    match state.current_setup_step() {
        Some(step) => {
            state.current_player = step.player;
            state.phase = if step.second_round { Phase::SetupRound2 } else { Phase::SetupRound1 };
        }
        None => {
            state.phase = Phase::Play;
            state.sub_phase = SubPhase::Main;
            state.current_player = 0;
            state.dice_rolled_this_turn = false;
        }
    }
}

fn roll_dice(state: &mut GameState, forced: Option<(u8, u8)>, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    let (d1, d2) = forced.unwrap_or_else(|| (state.rng.gen_range(1..=6), state.rng.gen_range(1..=6)));
    let total = d1 + d2;
    state.last_dice_roll = Some((d1, d2));
    state.dice_rolled_this_turn = true;
    state.players[player_id].has_rolled = true;
    events.push(GameEvent::DiceRolled { player: player_id, total });

    if total == 7 {
        let mut owing: Vec<usize> = (0..state.players.len()).filter(|&p| state.players[p].owes_discard()).collect();
        owing.sort_unstable();
        if owing.is_empty() {
            state.sub_phase = SubPhase::RobberMove;
        } else {
            state.pending_discards = owing;
            state.sub_phase = SubPhase::RobberDiscard;
        }
    } else {
        distribute_resources(state, total, events);
    }
    Ok(())
}

fn distribute_resources(state: &mut GameState, total: u8, events: &mut Vec<GameEvent>) {
    let tile_ids: Vec<u16> = state
        .board
        .tiles_by_id
        .values()
        .filter(|tile| tile.number == Some(total) && tile.id != state.robber_tile)
        .map(|tile| tile.id)
        .collect();

    for tile_id in tile_ids {
        let tile = state.board.tiles_by_id[&tile_id].clone();
        let Some(resource) = tile.resource else { continue };
        for (player_id, player) in state.players.iter_mut().enumerate() {
            let multiplier = tile.nodes.values().filter(|node| player.settlements.contains(node)).count() as u32
                + 2 * tile.nodes.values().filter(|node| player.cities.contains(node)).count() as u32;
            if multiplier == 0 {
                continue;
            }
            let granted = state.bank.produce(resource, multiplier);
            player.resources.add(resource, granted);
            events.push(GameEvent::ResourcesDistributed { player: player_id, resource, amount: granted });
        }
    }
}

fn move_robber(
    state: &mut GameState,
    tile_id: u16,
    victim: Option<usize>,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let thief = state.acting_player();
    state.robber_tile = tile_id;
    events.push(GameEvent::RobberMoved { tile_id });

    if let Some(victim) = victim {
        let stolen = rules::STEAL_ORDER
            .into_iter()
            .find(|&resource| state.players[victim].resources.get(resource) > 0);
        if let Some(resource) = stolen {
            state.players[victim].resources.subtract(resource, 1)?;
            state.players[thief].resources.add(resource, 1);
        }
        events.push(GameEvent::ResourceStolen { thief, victim, resource: stolen });
    }
    state.sub_phase = SubPhase::Main;
    Ok(())
}

fn discard_resources(state: &mut GameState, bundle: &ResourceBundle, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let Some(&player_id) = state.pending_discards.first() else {
        return Err(GameError::IllegalState);
    };
    state.players[player_id].remove_resources(bundle)?;
    state.bank.receive(bundle);
    events.push(GameEvent::CardsDiscarded { player: player_id, count: bundle.total() });
    state.pending_discards.remove(0);
    if state.pending_discards.is_empty() {
        state.sub_phase = SubPhase::RobberMove;
    }
    Ok(())
}

fn buy_development_card(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    let card = {
        let GameState { bank, players, .. } = state;
        bank.buy_development_card(&mut players[player_id].resources)?
    };
    if let Some(card) = card {
        state.players[player_id].add_dev_card(card);
    }
    events.push(GameEvent::DevelopmentCardBought { player: player_id });
    Ok(())
}

fn play_knight(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    if !state.players[player_id].consume_dev_card(DevelopmentCard::Knight) {
        return Err(GameError::IllegalAction);
    }
    state.players[player_id].record_dev_card_play(DevelopmentCard::Knight);
    events.push(GameEvent::DevelopmentCardPlayed { player: player_id, card: DevelopmentCard::Knight });
    state.sub_phase = SubPhase::RobberMove;
    Ok(())
}

fn play_road_building(
    state: &mut GameState,
    a: EdgeId,
    b: EdgeId,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let player_id = state.current_player;
    if !state.players[player_id].consume_dev_card(DevelopmentCard::RoadBuilding) {
        return Err(GameError::IllegalAction);
    }
    state.players[player_id].record_dev_card_play(DevelopmentCard::RoadBuilding);
    events.push(GameEvent::DevelopmentCardPlayed { player: player_id, card: DevelopmentCard::RoadBuilding });
    for edge in [a, b] {
        let edge = normalize_edge(edge);
        state.players[player_id].roads.insert(edge);
        events.push(GameEvent::RoadBuilt { player: player_id, edge });
    }
    Ok(())
}

fn play_year_of_plenty(state: &mut GameState, bundle: &ResourceBundle, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    if !state.players[player_id].consume_dev_card(DevelopmentCard::YearOfPlenty) {
        return Err(GameError::IllegalAction);
    }
    state.players[player_id].record_dev_card_play(DevelopmentCard::YearOfPlenty);
    state.bank.dispense(bundle)?;
    state.players[player_id].add_resources(bundle);
    events.push(GameEvent::DevelopmentCardPlayed { player: player_id, card: DevelopmentCard::YearOfPlenty });
    Ok(())
}

fn play_monopoly(state: &mut GameState, resource: Resource, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    if !state.players[player_id].consume_dev_card(DevelopmentCard::Monopoly) {
        return Err(GameError::IllegalAction);
    }
    state.players[player_id].record_dev_card_play(DevelopmentCard::Monopoly);
    events.push(GameEvent::DevelopmentCardPlayed { player: player_id, card: DevelopmentCard::Monopoly });

    let mut total = 0;
    for opponent_id in 0..state.players.len() {
        if opponent_id == player_id {
            continue;
        }
        let amount = state.players[opponent_id].resources.get(resource);
        if amount == 0 {
            continue;
        }
        state.players[opponent_id].resources.subtract(resource, amount)?;
        total += amount;
        events.push(GameEvent::ResourceStolen { thief: player_id, victim: opponent_id, resource: Some(resource) });
    }
    state.players[player_id].resources.add(resource, total);
    Ok(())
}

fn trade_bank(
    state: &mut GameState,
    give: Resource,
    receive: Resource,
    amount: u32,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let player_id = state.current_player;
    let rate = trade_rate(state, player_id, give);
    let receive_amount = amount / rate;
    state.players[player_id].resources.subtract(give, amount)?;
    state.bank.receive(&ResourceBundle::single(give, amount));
    state.bank.dispense(&ResourceBundle::single(receive, receive_amount))?;
    state.players[player_id].resources.add(receive, receive_amount);
    events.push(GameEvent::BankTradeCompleted { player: player_id, give, receive, amount });
    Ok(())
}

fn offer_player_trade(
    state: &mut GameState,
    give: &ResourceBundle,
    receive: &ResourceBundle,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let offerer = state.current_player;
    state.pending_trade = Some(PendingTrade { offerer, give: *give, receive: *receive });
    state.sub_phase = SubPhase::TradeResponse;
    events.push(GameEvent::PlayerTradeOffered { offerer });
    Ok(())
}

fn respond_to_trade(state: &mut GameState, accept: bool, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let Some(trade) = state.pending_trade.take() else {
        return Err(GameError::IllegalState);
    };
    let responder = state.other_player(trade.offerer);
    if accept {
        state.players[responder].resources.subtract_bundle(&trade.receive)?;
        state.players[trade.offerer].resources.add_bundle(&trade.receive);
        state.players[trade.offerer].resources.subtract_bundle(&trade.give)?;
        state.players[responder].resources.add_bundle(&trade.give);
        events.push(GameEvent::PlayerTradeCompleted { offerer: trade.offerer, responder });
    } else {
        events.push(GameEvent::PlayerTradeDeclined { offerer: trade.offerer, responder });
    }
    state.sub_phase = SubPhase::Main;
    Ok(())
}

fn end_turn(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let player_id = state.current_player;
    state.players[player_id].reset_for_new_turn();
    let next_player = state.other_player(player_id);
    state.current_player = next_player;
    state.turn_number += 1;
    state.dice_rolled_this_turn = false;
    events.push(GameEvent::TurnEnded { player: player_id, next_player });
    Ok(())
}

/// Victory check: a player wins once their total points reach the
/// threshold. Ties are broken by lowest player id, so the winner is always
/// uniquely determined even in the rare case of a simultaneous tie.
fn check_victory(state: &mut GameState, events: &mut Vec<GameEvent>) -> Vec<f32> {
    let totals: Vec<u32> = state.players.iter().map(|p| p.total_points()).collect();
    let max_total = totals.iter().copied().max().unwrap_or(0);

    if state.winner.is_none() && max_total >= state.config.vps_to_win {
        let winner = totals.iter().position(|&t| t == max_total).expect("max exists");
        state.winner = Some(winner);
        events.push(GameEvent::GameWon { player: winner });
    }

    match state.winner {
        Some(winner) => state
            .players
            .iter()
            .map(|p| if p.id == winner { 1.0 } else { -1.0 })
            .collect(),
        None => vec![0.0; state.players.len()],
    }
}
