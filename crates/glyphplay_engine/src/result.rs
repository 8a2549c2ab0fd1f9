// SPDX-License-Identifier: MIT OR Apache-2.0
//! The per-tick snapshot handed to the host.

use crate::value::EntityId;
use glyphplay_procgen::GameMap;

/// Snapshot of one entity for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// Entity handle
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
}

/// Everything the host needs to render one tick.
///
/// The host reads this snapshot and never reaches into engine state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    /// The current map, present when any node touched a map this tick
    pub map: Option<GameMap>,
    /// Living entities, in spawn order
    pub entities: Vec<EntitySnapshot>,
    /// Log lines produced this tick, in order
    pub log: Vec<String>,
}
