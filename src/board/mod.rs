//! Static board geometry: 19 tiles, 54 vertices, 72 edges, 9 ports.
//!
//! The board is built once per game and shared by reference; the only thing
//! that changes over a game's lifetime is the robber's tile, which lives on
//! `GameState` as a per-state overlay rather than as a mutable flag on the
//! shared board (see DESIGN.md).

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::coords::{CubeCoord, Direction, UNIT_VECTORS, add};
use crate::types::{EdgeRef, NodeRef, Resource};

pub type NodeId = u16;
pub type EdgeId = (NodeId, NodeId);

type NodeMap = HashMap<NodeRef, NodeId>;
type EdgeMap = HashMap<EdgeRef, EdgeId>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandTile {
    pub id: u16,
    /// `None` is the desert.
    pub resource: Option<Resource>,
    /// The pip number in `[2, 12] \ {7}`; `None` for the desert.
    pub number: Option<u8>,
    pub nodes: NodeMap,
    pub edges: EdgeMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: u16,
    /// `None` is an ANY-kind port (3:1); `Some` is a resource-specific port (2:1).
    pub resource: Option<Resource>,
    pub direction: Direction,
    pub nodes: NodeMap,
    pub edges: EdgeMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Water {
    pub nodes: NodeMap,
    pub edges: EdgeMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Tile {
    Land(LandTile),
    Port(Port),
    Water(Water),
}

impl Tile {
    fn nodes(&self) -> &NodeMap {
        match self {
            Tile::Land(tile) => &tile.nodes,
            Tile::Port(port) => &port.nodes,
            Tile::Water(water) => &water.nodes,
        }
    }

    fn edges(&self) -> &EdgeMap {
        match self {
            Tile::Land(tile) => &tile.edges,
            Tile::Port(port) => &port.edges,
            Tile::Water(water) => &water.edges,
        }
    }
}

#[derive(Debug, Clone)]
enum TileTemplate {
    Land,
    Water,
    Port(Direction),
}

/// Whether the board is the fixed canonical arrangement or a seed-shuffled
/// variant. Both preserve the resource/pip multiset and port multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardLayout {
    Standard,
    Randomized,
}

impl Default for BoardLayout {
    fn default() -> Self {
        BoardLayout::Standard
    }
}

#[derive(Debug, Clone)]
pub struct CatanMap {
    pub tiles: HashMap<CubeCoord, Tile>,
    pub land_tiles: HashMap<CubeCoord, LandTile>,
    pub port_nodes: HashMap<Option<Resource>, HashSet<NodeId>>,
    pub land_nodes: HashSet<NodeId>,
    pub adjacent_tiles: HashMap<NodeId, Vec<u16>>,
    pub node_neighbors: HashMap<NodeId, HashSet<NodeId>>,
    pub node_edges: HashMap<NodeId, Vec<EdgeId>>,
    pub tiles_by_id: HashMap<u16, LandTile>,
    pub ports_by_id: HashMap<u16, Port>,
}

impl CatanMap {
    pub fn build(layout: BoardLayout, rng: &mut impl rand::Rng) -> Self {
        let (numbers, port_resources, tile_resources) = match layout {
            BoardLayout::Standard => (
                STANDARD_NUMBERS.clone(),
                STANDARD_PORT_RESOURCES.clone(),
                STANDARD_TILE_RESOURCES.clone(),
            ),
            BoardLayout::Randomized => {
                let mut numbers = STANDARD_NUMBERS.clone();
                let mut ports = STANDARD_PORT_RESOURCES.clone();
                let mut tiles = STANDARD_TILE_RESOURCES.clone();
                numbers.shuffle(rng);
                ports.shuffle(rng);
                tiles.shuffle(rng);
                (numbers, ports, tiles)
            }
        };
        let tiles = initialize_tiles(numbers, port_resources, tile_resources);
        Self::from_tiles(tiles)
    }

    fn from_tiles(tiles: HashMap<CubeCoord, Tile>) -> Self {
        let land_tiles: HashMap<CubeCoord, LandTile> = tiles
            .iter()
            .filter_map(|(coord, tile)| match tile {
                Tile::Land(land) => Some((*coord, land.clone())),
                _ => None,
            })
            .collect();

        let tiles_by_id: HashMap<u16, LandTile> = land_tiles
            .values()
            .map(|tile| (tile.id, tile.clone()))
            .collect();

        let mut port_nodes: HashMap<Option<Resource>, HashSet<NodeId>> = HashMap::new();
        for tile in tiles.values() {
            if let Tile::Port(port) = tile {
                let (first_ref, second_ref) = PORT_DIRECTION_TO_NODE_REFS
                    .get(&port.direction)
                    .expect("missing port direction mapping");
                port_nodes
                    .entry(port.resource)
                    .or_default()
                    .insert(*port.nodes.get(first_ref).expect("node missing"));
                port_nodes
                    .entry(port.resource)
                    .or_default()
                    .insert(*port.nodes.get(second_ref).expect("node missing"));
            }
        }

        let land_nodes: HashSet<NodeId> = land_tiles
            .values()
            .flat_map(|tile| tile.nodes.values().copied())
            .collect();

        let mut adjacent_tiles: HashMap<NodeId, Vec<u16>> = HashMap::new();
        for tile in land_tiles.values() {
            for node_id in tile.nodes.values() {
                adjacent_tiles.entry(*node_id).or_default().push(tile.id);
            }
        }

        let mut node_neighbors: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();
        let mut node_edges: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
        for tile in tiles.values() {
            for edge in tile.edges().values() {
                let (a, b) = *edge;
                node_neighbors.entry(a).or_default().insert(b);
                node_neighbors.entry(b).or_default().insert(a);
                node_edges.entry(a).or_default().push(*edge);
                node_edges.entry(b).or_default().push(*edge);
            }
        }

        let ports_by_id = tiles
            .values()
            .filter_map(|tile| match tile {
                Tile::Port(port) => Some((port.id, port.clone())),
                _ => None,
            })
            .collect();

        Self {
            tiles,
            land_tiles,
            port_nodes,
            land_nodes,
            adjacent_tiles,
            node_edges,
            node_neighbors,
            tiles_by_id,
            ports_by_id,
        }
    }

    /// All edges in the graph, each normalized so `(a, b)` has `a <= b`.
    pub fn unique_edges(&self) -> Vec<EdgeId> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for list in self.node_edges.values() {
            for edge in list {
                let normalized = normalize_edge(*edge);
                if seen.insert(normalized) {
                    edges.push(normalized);
                }
            }
        }
        edges
    }

    pub fn edge_exists(&self, edge: EdgeId) -> bool {
        let normalized = normalize_edge(edge);
        self.node_neighbors
            .get(&normalized.0)
            .map_or(false, |neighbors| neighbors.contains(&normalized.1))
    }
}

pub fn normalize_edge(edge: EdgeId) -> EdgeId {
    if edge.0 <= edge.1 { edge } else { (edge.1, edge.0) }
}

pub fn edge_contains_node(edge: EdgeId, node: NodeId) -> bool {
    edge.0 == node || edge.1 == node
}

fn initialize_tiles(
    mut numbers: Vec<u8>,
    mut port_resources: Vec<Option<Resource>>,
    mut tile_resources: Vec<Option<Resource>>,
) -> HashMap<CubeCoord, Tile> {
    let mut tiles: HashMap<CubeCoord, Tile> = HashMap::new();
    let mut node_autoinc: NodeId = 0;
    let mut land_autoinc: u16 = 0;
    let mut port_autoinc: u16 = 0;

    for (coord, template_kind) in base_topology() {
        let (nodes, edges, next_autoinc) = get_nodes_and_edges(&tiles, coord, node_autoinc);
        node_autoinc = next_autoinc;

        match template_kind {
            TileTemplate::Land => {
                let resource = tile_resources.pop().expect("not enough tile resources");
                let number = resource.map(|_| numbers.pop().expect("not enough numbers"));
                tiles.insert(
                    coord,
                    Tile::Land(LandTile {
                        id: land_autoinc,
                        resource,
                        number,
                        nodes,
                        edges,
                    }),
                );
                land_autoinc += 1;
            }
            TileTemplate::Water => {
                tiles.insert(coord, Tile::Water(Water { nodes, edges }));
            }
            TileTemplate::Port(direction) => {
                let resource = port_resources.pop().expect("not enough port resources");
                tiles.insert(
                    coord,
                    Tile::Port(Port {
                        id: port_autoinc,
                        resource,
                        direction,
                        nodes,
                        edges,
                    }),
                );
                port_autoinc += 1;
            }
        }
    }

    tiles
}

fn get_nodes_and_edges(
    tiles: &HashMap<CubeCoord, Tile>,
    coordinate: CubeCoord,
    mut node_autoinc: NodeId,
) -> (NodeMap, EdgeMap, NodeId) {
    let mut nodes: HashMap<NodeRef, Option<NodeId>> = NodeRef::iter().map(|n| (n, None)).collect();
    let mut edges: HashMap<EdgeRef, Option<EdgeId>> = EdgeRef::iter().map(|e| (e, None)).collect();

    for direction in Direction::iter() {
        let offset = UNIT_VECTORS
            .get(&direction)
            .copied()
            .expect("unit vector missing");
        let neighbor_coord = add(coordinate, offset);
        if let Some(neighbor) = tiles.get(&neighbor_coord) {
            match direction {
                Direction::East => {
                    nodes.insert(
                        NodeRef::NorthEast,
                        neighbor.nodes().get(&NodeRef::NorthWest).copied(),
                    );
                    nodes.insert(
                        NodeRef::SouthEast,
                        neighbor.nodes().get(&NodeRef::SouthWest).copied(),
                    );
                    edges.insert(EdgeRef::East, neighbor.edges().get(&EdgeRef::West).copied());
                }
                Direction::SouthEast => {
                    nodes.insert(
                        NodeRef::South,
                        neighbor.nodes().get(&NodeRef::NorthWest).copied(),
                    );
                    nodes.insert(
                        NodeRef::SouthEast,
                        neighbor.nodes().get(&NodeRef::North).copied(),
                    );
                    edges.insert(
                        EdgeRef::SouthEast,
                        neighbor.edges().get(&EdgeRef::NorthWest).copied(),
                    );
                }
                Direction::SouthWest => {
                    nodes.insert(
                        NodeRef::South,
                        neighbor.nodes().get(&NodeRef::NorthEast).copied(),
                    );
                    nodes.insert(
                        NodeRef::SouthWest,
                        neighbor.nodes().get(&NodeRef::North).copied(),
                    );
                    edges.insert(
                        EdgeRef::SouthWest,
                        neighbor.edges().get(&EdgeRef::NorthEast).copied(),
                    );
                }
                Direction::West => {
                    nodes.insert(
                        NodeRef::NorthWest,
                        neighbor.nodes().get(&NodeRef::NorthEast).copied(),
                    );
                    nodes.insert(
                        NodeRef::SouthWest,
                        neighbor.nodes().get(&NodeRef::SouthEast).copied(),
                    );
                    edges.insert(EdgeRef::West, neighbor.edges().get(&EdgeRef::East).copied());
                }
                Direction::NorthWest => {
                    nodes.insert(
                        NodeRef::North,
                        neighbor.nodes().get(&NodeRef::SouthEast).copied(),
                    );
                    nodes.insert(
                        NodeRef::NorthWest,
                        neighbor.nodes().get(&NodeRef::South).copied(),
                    );
                    edges.insert(
                        EdgeRef::NorthWest,
                        neighbor.edges().get(&EdgeRef::SouthEast).copied(),
                    );
                }
                Direction::NorthEast => {
                    nodes.insert(
                        NodeRef::North,
                        neighbor.nodes().get(&NodeRef::SouthWest).copied(),
                    );
                    nodes.insert(
                        NodeRef::NorthEast,
                        neighbor.nodes().get(&NodeRef::South).copied(),
                    );
                    edges.insert(
                        EdgeRef::NorthEast,
                        neighbor.edges().get(&EdgeRef::SouthWest).copied(),
                    );
                }
            }
        }
    }

    for node_entry in nodes.values_mut() {
        if node_entry.is_none() {
            *node_entry = Some(node_autoinc);
            node_autoinc += 1;
        }
    }

    for (edge_ref, value) in edges.iter_mut() {
        if value.is_none() {
            let (a_ref, b_ref) = get_edge_nodes(*edge_ref);
            let a = nodes
                .get(&a_ref)
                .and_then(|x| *x)
                .expect("node missing during edge construction");
            let b = nodes
                .get(&b_ref)
                .and_then(|x| *x)
                .expect("node missing during edge construction");
            *value = Some((a, b));
        }
    }

    let finalized_nodes = nodes
        .into_iter()
        .map(|(k, v)| (k, v.expect("node missing")))
        .collect();
    let finalized_edges = edges
        .into_iter()
        .map(|(k, v)| (k, v.expect("edge missing")))
        .collect();

    (finalized_nodes, finalized_edges, node_autoinc)
}

fn get_edge_nodes(edge_ref: EdgeRef) -> (NodeRef, NodeRef) {
    match edge_ref {
        EdgeRef::East => (NodeRef::NorthEast, NodeRef::SouthEast),
        EdgeRef::SouthEast => (NodeRef::SouthEast, NodeRef::South),
        EdgeRef::SouthWest => (NodeRef::South, NodeRef::SouthWest),
        EdgeRef::West => (NodeRef::SouthWest, NodeRef::NorthWest),
        EdgeRef::NorthWest => (NodeRef::NorthWest, NodeRef::North),
        EdgeRef::NorthEast => (NodeRef::North, NodeRef::NorthEast),
    }
}

static PORT_DIRECTION_TO_NODE_REFS: Lazy<HashMap<Direction, (NodeRef, NodeRef)>> = Lazy::new(|| {
    HashMap::from([
        (Direction::West, (NodeRef::NorthWest, NodeRef::SouthWest)),
        (Direction::NorthWest, (NodeRef::North, NodeRef::NorthWest)),
        (Direction::NorthEast, (NodeRef::NorthEast, NodeRef::North)),
        (Direction::East, (NodeRef::SouthEast, NodeRef::NorthEast)),
        (Direction::SouthEast, (NodeRef::South, NodeRef::SouthEast)),
        (Direction::SouthWest, (NodeRef::SouthWest, NodeRef::South)),
    ])
});

static STANDARD_NUMBERS: Lazy<Vec<u8>> =
    Lazy::new(|| vec![11, 6, 3, 8, 4, 8, 10, 9, 11, 12, 5, 10, 6, 3, 9, 4, 5, 2]);

static STANDARD_PORT_RESOURCES: Lazy<Vec<Option<Resource>>> = Lazy::new(|| {
    vec![
        Some(Resource::Wood),
        Some(Resource::Brick),
        Some(Resource::Sheep),
        Some(Resource::Wheat),
        Some(Resource::Ore),
        None,
        None,
        None,
        None,
    ]
});

static STANDARD_TILE_RESOURCES: Lazy<Vec<Option<Resource>>> = Lazy::new(|| {
    vec![
        Some(Resource::Ore),
        Some(Resource::Sheep),
        Some(Resource::Wood),
        Some(Resource::Wheat),
        Some(Resource::Brick),
        Some(Resource::Sheep),
        Some(Resource::Wood),
        Some(Resource::Wood),
        None,
        Some(Resource::Wheat),
        Some(Resource::Wood),
        Some(Resource::Ore),
        Some(Resource::Sheep),
        Some(Resource::Brick),
        Some(Resource::Wheat),
        Some(Resource::Wheat),
        Some(Resource::Sheep),
        Some(Resource::Brick),
        Some(Resource::Ore),
    ]
});

fn base_topology() -> Vec<(CubeCoord, TileTemplate)> {
    use TileTemplate::*;
    vec![
        (CubeCoord::new(0, 0, 0), Land),
        (CubeCoord::new(1, -1, 0), Land),
        (CubeCoord::new(0, -1, 1), Land),
        (CubeCoord::new(-1, 0, 1), Land),
        (CubeCoord::new(-1, 1, 0), Land),
        (CubeCoord::new(0, 1, -1), Land),
        (CubeCoord::new(1, 0, -1), Land),
        (CubeCoord::new(2, -2, 0), Land),
        (CubeCoord::new(1, -2, 1), Land),
        (CubeCoord::new(0, -2, 2), Land),
        (CubeCoord::new(-1, -1, 2), Land),
        (CubeCoord::new(-2, 0, 2), Land),
        (CubeCoord::new(-2, 1, 1), Land),
        (CubeCoord::new(-2, 2, 0), Land),
        (CubeCoord::new(-1, 2, -1), Land),
        (CubeCoord::new(0, 2, -2), Land),
        (CubeCoord::new(1, 1, -2), Land),
        (CubeCoord::new(2, 0, -2), Land),
        (CubeCoord::new(2, -1, -1), Land),
        (CubeCoord::new(3, -3, 0), Port(Direction::West)),
        (CubeCoord::new(2, -3, 1), Water),
        (CubeCoord::new(1, -3, 2), Port(Direction::NorthWest)),
        (CubeCoord::new(0, -3, 3), Water),
        (CubeCoord::new(-1, -2, 3), Port(Direction::NorthWest)),
        (CubeCoord::new(-2, -1, 3), Water),
        (CubeCoord::new(-3, 0, 3), Port(Direction::NorthEast)),
        (CubeCoord::new(-3, 1, 2), Water),
        (CubeCoord::new(-3, 2, 1), Port(Direction::East)),
        (CubeCoord::new(-3, 3, 0), Water),
        (CubeCoord::new(-2, 3, -1), Port(Direction::East)),
        (CubeCoord::new(-1, 3, -2), Water),
        (CubeCoord::new(0, 3, -3), Port(Direction::SouthEast)),
        (CubeCoord::new(1, 2, -3), Water),
        (CubeCoord::new(2, 1, -3), Port(Direction::SouthWest)),
        (CubeCoord::new(3, 0, -3), Water),
        (CubeCoord::new(3, -1, -2), Port(Direction::SouthWest)),
        (CubeCoord::new(3, -2, -1), Water),
    ]
}
