// SPDX-License-Identifier: MIT OR Apache-2.0
//! The entity world and faction table owned by the engine.

use crate::value::EntityId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A game entity on the active map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable handle
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Render glyph
    pub glyph: char,
    /// Cell x
    pub x: i32,
    /// Cell y
    pub y: i32,
    /// Current hit points
    pub hp: i64,
    /// Maximum hit points
    pub max_hp: i64,
    /// Whether the entity is alive
    pub alive: bool,
    /// Whether this is the player entity
    pub player: bool,
    /// Assigned faction, if any
    pub faction: Option<String>,
    /// Named stats
    pub stats: IndexMap<String, i64>,
    /// Inventory: item name to count
    pub inventory: IndexMap<String, i64>,
}

/// All live entities, in spawn order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    entities: IndexMap<EntityId, Entity>,
    next_id: u64,
}

impl World {
    /// Spawn a new entity and return its handle
    pub fn spawn(&mut self, name: impl Into<String>, glyph: char, x: i32, y: i32, player: bool) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            Entity {
                id,
                name: name.into(),
                glyph,
                x,
                y,
                hp: 10,
                max_hp: 10,
                alive: true,
                player,
                faction: None,
                stats: IndexMap::new(),
                inventory: IndexMap::new(),
            },
        );
        id
    }

    /// Remove an entity
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.shift_remove(&id)
    }

    /// Get an entity by handle
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable entity by handle
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// All entities, in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Handles of living entities, in spawn order
    pub fn living(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.values().filter(|e| e.alive).map(|e| e.id)
    }

    /// The player entity, if one was spawned
    pub fn player(&self) -> Option<&Entity> {
        self.entities.values().find(|e| e.player)
    }

    /// The first living entity standing on a cell
    pub fn at_cell(&self, x: i32, y: i32) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.alive && e.x == x && e.y == y)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Replace the whole population. Used when loading a save slot.
    pub fn restore(entities: Vec<Entity>, next_id: u64) -> Self {
        Self {
            entities: entities.into_iter().map(|e| (e.id, e)).collect(),
            next_id,
        }
    }

    /// Snapshot the population for a save slot
    pub fn snapshot(&self) -> (Vec<Entity>, u64) {
        (self.entities.values().cloned().collect(), self.next_id)
    }
}

/// Faction names and their pairwise relations.
///
/// Relations are symmetric and keyed by the sorted name pair; unknown
/// pairs read as neutral (0). Negative is hostile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionTable {
    names: Vec<String>,
    relations: IndexMap<String, i64>,
}

impl FactionTable {
    fn key(a: &str, b: &str) -> String {
        if a <= b {
            format!("{a}/{b}")
        } else {
            format!("{b}/{a}")
        }
    }

    /// Register a faction name
    pub fn define(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// Whether a faction is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Set the relation between two factions
    pub fn set_relation(&mut self, a: &str, b: &str, relation: i64) {
        self.relations.insert(Self::key(a, b), relation);
    }

    /// Relation between two factions; unknown pairs are neutral
    pub fn relation(&self, a: &str, b: &str) -> i64 {
        self.relations.get(&Self::key(a, b)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_order_is_stable_and_ids_are_unique() {
        let mut world = World::default();
        let a = world.spawn("a", 'a', 0, 0, false);
        let b = world.spawn("b", 'b', 1, 0, false);
        assert_ne!(a, b);
        let names: Vec<_> = world.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn relations_are_symmetric() {
        let mut factions = FactionTable::default();
        factions.define("elves");
        factions.define("orcs");
        factions.set_relation("orcs", "elves", -50);
        assert_eq!(factions.relation("elves", "orcs"), -50);
        assert_eq!(factions.relation("orcs", "elves"), -50);
        assert_eq!(factions.relation("elves", "dwarves"), 0);
    }

    #[test]
    fn restore_preserves_handles() {
        let mut world = World::default();
        world.spawn("a", 'a', 0, 0, true);
        let (entities, next) = world.snapshot();
        let rebuilt = World::restore(entities, next);
        assert_eq!(world, rebuilt);
        // New spawns keep advancing past restored ids
        let mut rebuilt = rebuilt;
        let new = rebuilt.spawn("b", 'b', 0, 0, false);
        assert_eq!(new, EntityId(2));
    }
}
