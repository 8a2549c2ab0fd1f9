// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-engine runtime state.
//!
//! Everything a running project mutates lives here, keyed off node or
//! resource identity: loop cursors, gate flags, timers, pending waits,
//! the RNG stream, maps, entities, registries. It is owned by one engine
//! instance, cleared when that instance is dropped, and never serialized
//! as part of the graph document (save games are a separate artifact).

use crate::events::Signal;
use crate::value::{EntityId, MapId, SceneNodeId, Value};
use crate::world::{FactionTable, World};
use glyphplay_graph::{GraphId, NodeId, PortId};
use glyphplay_procgen::{GameMap, RoomTemplate};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A traversal paused by a `Wait` node, resumed when the countdown hits
/// zero.
#[derive(Debug, Clone)]
pub(crate) struct PendingWait {
    pub graph: GraphId,
    pub node: NodeId,
    pub remaining: i64,
}

/// A persistence request completing on the next tick
#[derive(Debug, Clone)]
pub(crate) enum PendingOp {
    Save { slot: String, ok: bool },
    Load { slot: String },
}

/// Dialogue runtime state
#[derive(Debug, Clone, Default)]
pub(crate) struct DialogueState {
    pub active: bool,
    pub speaker: String,
    pub queue: VecDeque<String>,
    pub last_choice: i64,
}

/// Battle runtime state
#[derive(Debug, Clone, Default)]
pub(crate) struct BattleState {
    pub active: bool,
    pub order: Vec<EntityId>,
}

/// Overworld runtime state, persisted into save slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverworldState {
    /// Overworld name, once created
    pub name: Option<String>,
    /// Known locations, in creation order
    pub locations: Vec<String>,
    /// The location the party is currently inside
    pub current: Option<String>,
}

/// One node in the scene tree
#[derive(Debug, Clone)]
pub(crate) struct SceneNodeData {
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub properties: IndexMap<String, String>,
}

/// A minimal scene tree: named nodes with properties, rooted at "root"
#[derive(Debug, Clone)]
pub(crate) struct SceneTree {
    nodes: IndexMap<SceneNodeId, SceneNodeData>,
    next_id: u64,
}

impl SceneTree {
    pub const ROOT: SceneNodeId = SceneNodeId(0);

    pub fn new() -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(
            Self::ROOT,
            SceneNodeData {
                name: "root".to_owned(),
                parent: None,
                properties: IndexMap::new(),
            },
        );
        Self { nodes, next_id: 0 }
    }

    pub fn add(&mut self, parent: SceneNodeId, name: impl Into<String>) -> SceneNodeId {
        self.next_id += 1;
        let id = SceneNodeId(self.next_id);
        let parent = if self.nodes.contains_key(&parent) {
            parent
        } else {
            Self::ROOT
        };
        self.nodes.insert(
            id,
            SceneNodeData {
                name: name.into(),
                parent: Some(parent),
                properties: IndexMap::new(),
            },
        );
        id
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == Self::ROOT {
            return;
        }
        let mut doomed = vec![id];
        while let Some(next) = doomed.pop() {
            self.nodes.shift_remove(&next);
            doomed.extend(
                self.nodes
                    .iter()
                    .filter(|(_, d)| d.parent == Some(next))
                    .map(|(k, _)| *k),
            );
        }
    }

    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNodeData> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNodeData> {
        self.nodes.get_mut(&id)
    }

    /// Look a node up by slash-separated path from the root, e.g.
    /// `root/ui/health` or `ui/health`.
    pub fn by_path(&self, path: &str) -> Option<SceneNodeId> {
        let mut current = Self::ROOT;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if part == "root" && current == Self::ROOT {
                continue;
            }
            current = self
                .nodes
                .iter()
                .find(|(_, d)| d.parent == Some(current) && d.name == part)
                .map(|(k, _)| *k)?;
        }
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NetRole {
    Host,
    Client,
}

/// All mutable state owned by one engine instance
pub(crate) struct EngineState {
    pub tick: u64,
    pub rng: StdRng,
    pub active_graph: GraphId,
    pub next_graph: Option<GraphId>,

    // Outputs computed this tick, keyed by producing node and port
    pub outputs: HashMap<(NodeId, PortId), Value>,

    // Identity-keyed node state
    pub gates: HashMap<NodeId, bool>,
    pub waits: Vec<PendingWait>,

    pub variables: IndexMap<String, Value>,
    pub store: IndexMap<String, String>,
    pub slots: IndexMap<String, String>,
    pub pending_ops: Vec<PendingOp>,

    pub maps: IndexMap<MapId, GameMap>,
    pub next_map: u64,
    pub active_map: Option<MapId>,
    pub map_touched: bool,
    pub procgen_result: Option<MapId>,

    pub world: World,
    pub sprites: IndexMap<String, char>,
    pub templates: IndexMap<String, RoomTemplate>,
    pub factions: FactionTable,

    pub timers: IndexMap<String, i64>,
    pub clock_minutes: i64,

    pub dialogue: DialogueState,
    pub battle: BattleState,
    pub overworld: OverworldState,
    pub scene: SceneTree,
    pub net_role: Option<NetRole>,

    pub queued: VecDeque<Signal>,
    pub log: Vec<String>,
    pub status_line: Option<String>,
    pub call_depth: u32,
    pub missing_resources: HashSet<String>,
}

impl EngineState {
    pub fn new(seed: u64, active_graph: GraphId) -> Self {
        Self {
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
            active_graph,
            next_graph: None,
            outputs: HashMap::new(),
            gates: HashMap::new(),
            waits: Vec::new(),
            variables: IndexMap::new(),
            store: IndexMap::new(),
            slots: IndexMap::new(),
            pending_ops: Vec::new(),
            maps: IndexMap::new(),
            next_map: 0,
            active_map: None,
            map_touched: false,
            procgen_result: None,
            world: World::default(),
            sprites: IndexMap::new(),
            templates: IndexMap::new(),
            factions: FactionTable::default(),
            timers: IndexMap::new(),
            clock_minutes: 8 * 60,
            dialogue: DialogueState::default(),
            battle: BattleState::default(),
            overworld: OverworldState::default(),
            scene: SceneTree::new(),
            net_role: None,
            queued: VecDeque::new(),
            log: Vec::new(),
            status_line: None,
            call_depth: 0,
            missing_resources: HashSet::new(),
        }
    }

    /// Allocate a fresh map in the arena and make it active
    pub fn create_map(&mut self, map: GameMap) -> MapId {
        self.next_map += 1;
        let id = MapId(self.next_map);
        self.maps.insert(id, map);
        self.active_map = Some(id);
        self.map_touched = true;
        id
    }

    /// Resolve a map input: the given handle, else the active map
    pub fn map_or_active(&self, id: Option<MapId>) -> Option<MapId> {
        id.filter(|m| self.maps.contains_key(m)).or(self.active_map)
    }

    /// Append a user-visible log line
    pub fn log_line(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Log a degradation once per distinct resource key, so a loop
    /// hitting the same missing sprite does not flood the log.
    pub fn warn_missing(&mut self, what: &str, name: &str) {
        let key = format!("{what}:{name}");
        if self.missing_resources.insert(key) {
            tracing::warn!(%what, %name, "missing named resource");
            self.log.push(format!("warning: unknown {what} '{name}'"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_tree_paths() {
        let mut tree = SceneTree::new();
        let ui = tree.add(SceneTree::ROOT, "ui");
        let health = tree.add(ui, "health");
        assert_eq!(tree.by_path("ui/health"), Some(health));
        assert_eq!(tree.by_path("root/ui"), Some(ui));
        assert_eq!(tree.by_path("ui/mana"), None);
    }

    #[test]
    fn scene_tree_remove_takes_subtree() {
        let mut tree = SceneTree::new();
        let ui = tree.add(SceneTree::ROOT, "ui");
        let health = tree.add(ui, "health");
        tree.remove(ui);
        assert!(tree.get(ui).is_none());
        assert!(tree.get(health).is_none());
        assert!(tree.get(SceneTree::ROOT).is_some());
    }
}
