//! Longest-road / largest-army title tracking.
//!
//! Unlike a flat "recompute a boolean every tick" model, titles here are
//! explicit state (`GameState::longest_road_owner` / `largest_army_owner`)
//! with a +/- `TITLE_BONUS_POINTS` transfer applied only when ownership
//! actually changes. On a tie for best length/size, the incumbent keeps the
//! title if they are still among the tied leaders; otherwise it goes vacant
//! rather than defaulting to whichever player's index happens to sort first.

use std::collections::{HashMap, HashSet};

use crate::board::{EdgeId, NodeId};
use crate::game::state::{GameEvent, GameState};
use crate::rules;

pub fn recompute_titles(state: &mut GameState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    recompute_longest_road(state, &mut events);
    recompute_largest_army(state, &mut events);
    events
}

fn recompute_longest_road(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let lengths: Vec<u32> = (0..state.players.len())
        .map(|player| longest_road_length(state, player))
        .collect();
    let max_len = lengths.iter().copied().max().unwrap_or(0);
    let leaders: Vec<usize> = (0..lengths.len()).filter(|&i| lengths[i] == max_len).collect();

    let new_owner = if max_len < rules::MIN_LONGEST_ROAD {
        None
    } else if leaders.len() == 1 {
        Some(leaders[0])
    } else {
        match state.longest_road_owner {
            Some(incumbent) if leaders.contains(&incumbent) => Some(incumbent),
            _ => None,
        }
    };

    state.longest_road_length = max_len;

    if new_owner != state.longest_road_owner {
        transfer_title(state, state.longest_road_owner, new_owner, |p| &mut p.has_longest_road);
        events.push(GameEvent::LongestRoadChanged {
            previous: state.longest_road_owner,
            current: new_owner,
            length: max_len,
        });
        state.longest_road_owner = new_owner;
    }
}

fn recompute_largest_army(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let sizes: Vec<u32> = state.players.iter().map(|p| p.knights_played).collect();
    let max_size = sizes.iter().copied().max().unwrap_or(0);
    let leaders: Vec<usize> = (0..sizes.len()).filter(|&i| sizes[i] == max_size).collect();

    let new_owner = if max_size < rules::MIN_LARGEST_ARMY {
        None
    } else if leaders.len() == 1 {
        Some(leaders[0])
    } else {
        match state.largest_army_owner {
            Some(incumbent) if leaders.contains(&incumbent) => Some(incumbent),
            _ => None,
        }
    };

    state.largest_army_size = max_size;

    if new_owner != state.largest_army_owner {
        transfer_title(state, state.largest_army_owner, new_owner, |p| &mut p.has_largest_army);
        events.push(GameEvent::LargestArmyChanged {
            previous: state.largest_army_owner,
            current: new_owner,
            size: max_size,
        });
        state.largest_army_owner = new_owner;
    }
}

fn transfer_title(
    state: &mut GameState,
    previous: Option<usize>,
    current: Option<usize>,
    flag: impl Fn(&mut crate::game::player::PlayerState) -> &mut bool,
) {
    if let Some(prev) = previous {
        let player = &mut state.players[prev];
        *flag(player) = false;
        player.title_points = player.title_points.saturating_sub(rules::TITLE_BONUS_POINTS);
    }
    if let Some(new) = current {
        let player = &mut state.players[new];
        *flag(player) = true;
        player.title_points += rules::TITLE_BONUS_POINTS;
    }
}

/// Nodes occupied by a settlement or city belonging to anyone other than `player`.
/// A player's own road network may pass through their own buildings, but an
/// opponent's building cuts the road network there.
fn opponent_occupied_nodes(state: &GameState, player: usize) -> HashSet<NodeId> {
    state
        .players
        .iter()
        .enumerate()
        .filter(|(id, _)| *id != player)
        .flat_map(|(_, p)| p.settlements.iter().chain(p.cities.iter()).copied())
        .collect()
}

pub fn longest_road_length(state: &GameState, player: usize) -> u32 {
    let roads = &state.players[player].roads;
    if roads.is_empty() {
        return 0;
    }

    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &(a, b) in roads {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }
    let blocked = opponent_occupied_nodes(state, player);

    let mut best = 0;
    for &start in adjacency.keys() {
        let mut used_edges = HashSet::new();
        best = best.max(dfs_longest(start, &adjacency, &blocked, &mut used_edges));
    }
    best
}

fn dfs_longest(
    node: NodeId,
    adjacency: &HashMap<NodeId, Vec<NodeId>>,
    blocked: &HashSet<NodeId>,
    used_edges: &mut HashSet<EdgeId>,
) -> u32 {
    let mut best = 0;
    if let Some(neighbors) = adjacency.get(&node) {
        for &next in neighbors {
            let edge = crate::board::normalize_edge((node, next));
            if used_edges.contains(&edge) {
                continue;
            }
            used_edges.insert(edge);
            let mut length = 1;
            if !blocked.contains(&next) {
                length += dfs_longest(next, adjacency, blocked, used_edges);
            }
            best = best.max(length);
            used_edges.remove(&edge);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameConfig;

    #[test]
    fn tie_keeps_incumbent() {
        let mut state = GameState::new(GameConfig::default());
        // Player 0 builds a 6-edge road and takes the title outright.
        state.players[0].roads =
            [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6)].into_iter().collect();
        recompute_titles(&mut state);
        assert_eq!(state.longest_road_owner, Some(0));
        assert_eq!(state.players[0].title_points, rules::TITLE_BONUS_POINTS);

        // Player 1 catches up to the same length; the incumbent keeps the title on a tie.
        state.players[1].roads =
            [(10, 11), (11, 12), (12, 13), (13, 14), (14, 15), (15, 16)].into_iter().collect();
        recompute_titles(&mut state);
        assert_eq!(state.longest_road_owner, Some(0));
        assert_eq!(state.players[0].title_points, rules::TITLE_BONUS_POINTS);
        assert_eq!(state.players[1].title_points, 0);
    }
}
