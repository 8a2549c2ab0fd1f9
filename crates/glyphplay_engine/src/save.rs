// SPDX-License-Identifier: MIT OR Apache-2.0
//! The save-game artifact.
//!
//! A save slot is a RON document capturing the durable world: entities,
//! overworld state, faction relations, entity-faction assignments and
//! the global persistent key/value store. It is distinct from the graph
//! document; graphs are never written into a slot.

use crate::state::OverworldState;
use crate::world::{Entity, FactionTable, World};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current save format version
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// One save slot's contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    /// Format version for forward migration
    pub version: u32,
    /// All entities, in spawn order
    pub entities: Vec<Entity>,
    /// Next entity id, so restored worlds keep minting fresh handles
    pub next_entity: u64,
    /// Overworld state
    pub overworld: OverworldState,
    /// Faction names and relations
    pub factions: FactionTable,
    /// Entity-faction assignments, entity name to faction
    pub assignments: IndexMap<String, String>,
    /// Global persistent key/value store
    pub store: IndexMap<String, String>,
}

impl SaveGame {
    /// Capture a save game from the live world
    pub fn capture(
        world: &World,
        overworld: &OverworldState,
        factions: &FactionTable,
        store: &IndexMap<String, String>,
    ) -> Self {
        let (entities, next_entity) = world.snapshot();
        let assignments = entities
            .iter()
            .filter_map(|e| e.faction.clone().map(|f| (e.name.clone(), f)))
            .collect();
        Self {
            version: SAVE_FORMAT_VERSION,
            entities,
            next_entity,
            overworld: overworld.clone(),
            factions: factions.clone(),
            assignments,
            store: store.clone(),
        }
    }

    /// Serialize to a RON slot document
    pub fn encode(&self) -> Result<String, SaveError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Deserialize from a RON slot document
    pub fn decode(text: &str) -> Result<Self, SaveError> {
        Ok(ron::from_str(text)?)
    }

    /// Rebuild a world from this save
    pub fn restore_world(&self) -> World {
        World::restore(self.entities.clone(), self.next_entity)
    }
}

/// Error while encoding or decoding a save slot
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Serialization failed
    #[error("failed to encode save: {0}")]
    Encode(#[from] ron::Error),

    /// The slot document is malformed
    #[error("failed to decode save: {0}")]
    Decode(#[from] ron::error::SpannedError),

    /// The requested slot does not exist
    #[error("no such save slot: {0}")]
    MissingSlot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_round_trips() {
        let mut world = World::default();
        let hero = world.spawn("Hero", '@', 3, 4, true);
        world.get_mut(hero).unwrap().faction = Some("guild".to_owned());

        let mut factions = FactionTable::default();
        factions.define("guild");
        factions.set_relation("guild", "bandits", -10);

        let mut store = IndexMap::new();
        store.insert("quest.main".to_owned(), "act2".to_owned());

        let overworld = OverworldState {
            name: Some("Aldern".to_owned()),
            locations: vec!["village".to_owned()],
            current: Some("village".to_owned()),
        };

        let save = SaveGame::capture(&world, &overworld, &factions, &store);
        let loaded = SaveGame::decode(&save.encode().unwrap()).unwrap();
        assert_eq!(save, loaded);
        assert_eq!(loaded.restore_world(), world);
        assert_eq!(loaded.assignments.get("Hero").map(String::as_str), Some("guild"));
    }
}
