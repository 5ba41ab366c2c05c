//! End-to-end scenarios and cross-module invariants, grounded in the sibling
//! `Mohiiit-kopiatan` crate's `tests/integration_tests.rs` style: drive a
//! `GameState` through `apply_action` and assert on the resulting state and
//! event stream, rather than unit-testing individual helpers in isolation.

use catan_duel::game::action::Action;
use catan_duel::game::enumerate::legal_actions;
use catan_duel::game::legality::is_legal;
use catan_duel::game::player::PlayerState;
use catan_duel::game::resources::ResourceBundle;
use catan_duel::game::state::{GameEvent, GameState, SubPhase};
use catan_duel::game::transition::apply_action;
use catan_duel::types::{DevelopmentCard, Phase, Resource};
use catan_duel::{GameConfig, SimDriver};
use pretty_assertions::assert_eq;

fn new_game() -> GameState {
    GameState::new(GameConfig::default())
}

/// Drives the setup snake to completion using whatever the enumerator offers
/// first at each step; the snake order is deterministic so any legal choice
/// at each step still exercises the full cursor advance.
fn complete_setup(mut state: GameState) -> GameState {
    let mut guard = 0;
    while matches!(state.phase, Phase::SetupRound1 | Phase::SetupRound2) {
        guard += 1;
        assert!(guard < 100, "setup should finish well within 100 placements");
        let legal = legal_actions(&state);
        let action = legal.first().expect("setup always has a legal action").clone();
        state = apply_action(&state, &action).expect("legal action applies").0;
    }
    state
}

#[test]
fn setup_snake_completes_into_play() {
    let state = complete_setup(new_game());

    assert_eq!(state.phase, Phase::Play);
    assert_eq!(state.current_player, 0);
    for player in &state.players {
        assert_eq!(player.settlements.len(), 2);
        assert_eq!(player.roads.len(), 2);

        // Resources should equal the non-desert adjacency of the second-round
        // settlement (the higher-numbered one, since node ids are assigned
        // in placement order within `build_settlement`).
        let second_round_node = *player.settlements.iter().max().unwrap();
        let expected: u32 = state
            .board
            .adjacent_tiles
            .get(&second_round_node)
            .into_iter()
            .flatten()
            .filter(|&&tile_id| state.board.tiles_by_id[&tile_id].resource.is_some())
            .count() as u32;
        assert_eq!(player.resources.total(), expected);
    }
}

#[test]
fn seven_triggers_discard_then_robber_move() {
    let mut state = complete_setup(new_game());
    state.players[0].resources = ResourceBundle::from_counts([5, 2, 2, 2, 2]); // total 13
    state.players[1].resources = ResourceBundle::from_counts([2, 1, 1, 1, 0]); // total 5
    state.dice_rolled_this_turn = false;

    let (state, outcome) = apply_action(&state, &Action::RollDice(Some((3, 4)))).unwrap();
    assert_eq!(state.sub_phase, SubPhase::RobberDiscard);
    assert_eq!(state.pending_discards, vec![0]);
    assert_eq!(state.acting_player(), 0);
    assert!(outcome.events.iter().any(|e| matches!(e, GameEvent::DiceRolled { total: 7, .. })));

    let discard = ResourceBundle::from_counts([3, 2, 1, 0, 0]); // 6 cards: floor(13/2), affordable from hand
    assert!(is_legal(&state, &Action::DiscardResources(discard)));
    let bank_wood_before = state.bank.available(Resource::Wood);
    let (state, _) = apply_action(&state, &Action::DiscardResources(discard)).unwrap();

    assert_eq!(state.sub_phase, SubPhase::RobberMove);
    assert_eq!(state.acting_player(), 0);
    assert_eq!(state.players[0].resources.total(), 7);
    assert_eq!(state.bank.available(Resource::Wood), bank_wood_before + 3);
}

#[test]
fn monopoly_sweep_takes_every_opponent_card() {
    let mut state = complete_setup(new_game());
    state.current_player = 0;
    state.dice_rolled_this_turn = true;
    state.players[0].dev_cards.push(DevelopmentCard::Monopoly);
    state.players[1].resources = ResourceBundle::from_counts([0, 2, 0, 0, 1]); // 2 brick, 1 ore
    let brick_before = state.players[0].resources.get(Resource::Brick);

    let (state, _) = apply_action(&state, &Action::PlayMonopoly(Resource::Brick)).unwrap();

    assert_eq!(state.players[0].resources.get(Resource::Brick), brick_before + 2);
    assert_eq!(state.players[1].resources.get(Resource::Brick), 0);
    assert_eq!(state.players[1].resources.get(Resource::Ore), 1, "monopoly must not touch other resources");
}

#[test]
fn longest_road_transfers_to_the_new_leader() {
    let mut state = complete_setup(new_game());
    state.players[0].roads = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)].into_iter().collect();
    catan_duel::game::titles::recompute_titles(&mut state);
    assert_eq!(state.longest_road_owner, Some(0));
    assert_eq!(state.players[0].title_points, 2);

    // Player 1 edges out player 0 by one longer edge; the title transfers
    // along with its +/-2 VP, the same machinery `apply_action` runs after
    // every transition.
    state.players[1].roads =
        [(10, 11), (11, 12), (12, 13), (13, 14), (14, 15), (15, 16)].into_iter().collect();
    let events = catan_duel::game::titles::recompute_titles(&mut state);

    assert_eq!(state.longest_road_owner, Some(1));
    assert_eq!(state.players[1].title_points, 2);
    assert_eq!(state.players[0].title_points, 0);
    assert!(events.iter().any(|e| matches!(e, GameEvent::LongestRoadChanged { current: Some(1), length: 6, .. })));
}

#[test]
fn victory_at_threshold_ends_the_game() {
    let mut state = complete_setup(new_game());
    state.current_player = 0;
    state.dice_rolled_this_turn = true;
    let node = *state.players[0].settlements.iter().next().unwrap();
    state.players[0].resources = ResourceBundle::from_counts([0, 0, 0, 2, 3]); // city cost

    // Visible points before the build: 1 remaining settlement + 1 settlement about to
    // become a city (still worth 1 until BuildCity lands) = 2. Hidden VP cards make up
    // the rest so the build itself is what crosses the threshold: 2 + 12 + 1 (city bump) = 15.
    state.players[0].victory_points = 12;

    assert!(is_legal(&state, &Action::BuildCity(node)));
    let (state, outcome) = apply_action(&state, &Action::BuildCity(node)).unwrap();

    assert_eq!(state.players[0].total_points(), 15);
    assert!(state.is_done());
    assert_eq!(state.winner, Some(0));
    assert!(outcome.events.iter().any(|e| matches!(e, GameEvent::GameWon { player: 0 })));

    let err = apply_action(&state, &Action::RollDice(None)).unwrap_err();
    assert!(matches!(err, catan_duel::game::state::GameError::GameFinished));
}

#[test]
fn bank_trade_respects_port_rate() {
    let mut state = complete_setup(new_game());
    let sheep_port_node = *state
        .board
        .port_nodes
        .get(&Some(Resource::Sheep))
        .and_then(|nodes| nodes.iter().next())
        .expect("standard layout always has a sheep port");

    // Clear any settlement on that vertex's neighborhood so placement can't conflict.
    for player in &mut state.players {
        player.settlements.remove(&sheep_port_node);
    }
    state.players[0].settlements.insert(sheep_port_node);
    state.current_player = 0;
    state.dice_rolled_this_turn = true;
    state.players[0].resources = ResourceBundle::from_counts([0, 0, 2, 0, 0]);

    assert!(is_legal(
        &state,
        &Action::TradeBank { give: Resource::Sheep, receive: Resource::Brick, amount: 2 }
    ));
    // 3 sheep is not a multiple of the sheep port's 2:1 rate.
    state.players[0].resources = ResourceBundle::from_counts([0, 0, 3, 0, 0]);
    assert!(!is_legal(
        &state,
        &Action::TradeBank { give: Resource::Sheep, receive: Resource::Brick, amount: 3 }
    ));
    // No brick port, so brick still trades at the plain 4:1 rate; 2 is not enough.
    state.players[0].resources = ResourceBundle::from_counts([2, 0, 0, 0, 0]);
    assert!(!is_legal(
        &state,
        &Action::TradeBank { give: Resource::Brick, receive: Resource::Sheep, amount: 2 }
    ));
}

#[test]
fn legality_matches_enumeration_across_a_random_walk() {
    let mut driver = SimDriver::new(GameConfig::default());
    let mut policy = catan_duel::policy::RandomPolicy::new(99);

    for _ in 0..60 {
        let legal = driver.legal_actions();
        if legal.is_empty() {
            break;
        }
        for action in &legal {
            assert!(is_legal(driver.state(), action));
        }
        let chosen = policy.select_action(driver.state(), &legal);
        driver.step(&chosen).expect("enumerated action is always legal");
        if driver.state().is_done() {
            break;
        }
    }
}

#[test]
fn replay_is_deterministic_given_a_fixed_seed_and_action_sequence() {
    let run = |seed: u64| {
        let mut driver = SimDriver::new(GameConfig { seed, ..GameConfig::default() });
        let mut policy = catan_duel::policy::RandomPolicy::new(7);
        let mut trace = Vec::new();
        for _ in 0..40 {
            let legal = driver.legal_actions();
            if legal.is_empty() {
                break;
            }
            let action = policy.select_action(driver.state(), &legal);
            driver.step(&action).unwrap();
            trace.push((driver.state().phase, driver.state().current_player, driver.state().turn_number));
            if driver.state().is_done() {
                break;
            }
        }
        trace
    };

    assert_eq!(run(42), run(42));
}

#[test]
fn catalog_index_is_stable_across_unrelated_registrations() {
    let mut driver = SimDriver::new(GameConfig::default());
    let idx = driver.index_of(&Action::EndTurn);
    driver.index_of(&Action::BuyDevelopmentCard);
    driver.index_of(&Action::PlayKnight);
    assert_eq!(driver.index_of(&Action::EndTurn), idx);
}

#[test]
fn resource_conservation_holds_through_a_trade() {
    let mut state = complete_setup(new_game());
    state.current_player = 0;
    state.dice_rolled_this_turn = true;
    state.players[0].resources = ResourceBundle::from_counts([4, 0, 0, 0, 0]);

    let total_before = total_resources_in_play(&state);
    let (state, _) = apply_action(
        &state,
        &Action::TradeBank { give: Resource::Wood, receive: Resource::Brick, amount: 4 },
    )
    .unwrap();
    let total_before_again = total_resources_in_play(&state);

    assert_eq!(total_before, total_before_again);
}

fn total_resources_in_play(state: &GameState) -> [u32; 5] {
    let mut totals = state.bank.resources().counts();
    for player in &state.players {
        let counts = player.resources.counts();
        for (i, value) in counts.iter().enumerate() {
            totals[i] += value;
        }
    }
    totals
}

#[test]
fn player_state_starts_with_no_structures() {
    let player = PlayerState::new(0);
    assert_eq!(player.total_structures(), 0);
    assert_eq!(player.total_points(), 0);
}
