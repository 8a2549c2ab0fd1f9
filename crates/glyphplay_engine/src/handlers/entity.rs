// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sprites and the entity population.

use super::{HandlerCtx, Inputs, Outcome};
use crate::events::Signal;
use crate::value::{EntityId, Value};
use glyphplay_graph::{Node, NodeKind};
use glyphplay_procgen::Tile;

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::DefineSprite => {
            let glyph = inputs.str("Glyph").chars().next().unwrap_or('@');
            state.sprites.insert(inputs.str("Name"), glyph);
            Outcome::then()
        }
        NodeKind::SpawnEntity => {
            let sprite = inputs.str("Sprite");
            let glyph = match state.sprites.get(&sprite) {
                Some(&g) => g,
                None => {
                    state.warn_missing("sprite", &sprite);
                    '?'
                }
            };
            let (x, y) = inputs.cell("Cell");
            let player = node
                .property("Player")
                .is_some_and(|p| matches!(p, "true" | "True" | "1"))
                && state.world.player().is_none();
            let id = state.world.spawn(inputs.str("Name"), glyph, x, y, player);
            Outcome::then().output("Entity", Value::Entity(id))
        }
        NodeKind::DestroyEntity => {
            if let Some(id) = inputs.entity("Entity") {
                state.world.remove(id);
            }
            Outcome::then()
        }
        NodeKind::MoveEntity => {
            let moved = inputs
                .entity("Entity")
                .is_some_and(|id| try_move(state, id, inputs.int("Dx"), inputs.int("Dy")));
            Outcome::then().output("Moved", Value::Bool(moved))
        }
        NodeKind::TeleportEntity => {
            let (x, y) = inputs.cell("Cell");
            if let Some(id) = inputs.entity("Entity") {
                if let Some(entity) = state.world.get_mut(id) {
                    entity.x = x;
                    entity.y = y;
                    state.queued.push_back(Signal::EnterTile(id, x, y));
                    state.map_touched = true;
                }
            }
            Outcome::then()
        }
        NodeKind::GetEntityCell => {
            let (x, y) = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .map_or((0, 0), |e| (e.x, e.y));
            Outcome::new().output("Cell", Value::Cell(x, y))
        }
        NodeKind::EntityAtCell => {
            let (x, y) = inputs.cell("Cell");
            let found = state.world.at_cell(x, y).map(|e| e.id);
            Outcome::new()
                .output("Entity", Value::Entity(found.unwrap_or(EntityId::NONE)))
                .output("Found", Value::Bool(found.is_some()))
        }
        NodeKind::GetPlayer => {
            let id = state.world.player().map_or(EntityId::NONE, |e| e.id);
            Outcome::new().output("Entity", Value::Entity(id))
        }
        NodeKind::SetEntitySprite => {
            let sprite = inputs.str("Sprite");
            match state.sprites.get(&sprite).copied() {
                Some(glyph) => {
                    if let Some(entity) =
                        inputs.entity("Entity").and_then(|id| state.world.get_mut(id))
                    {
                        entity.glyph = glyph;
                        state.map_touched = true;
                    }
                }
                None => state.warn_missing("sprite", &sprite),
            }
            Outcome::then()
        }
        NodeKind::GetEntityName => {
            let name = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .map(|e| e.name.clone())
                .unwrap_or_default();
            Outcome::new().output("Name", Value::Str(name))
        }
        // EntityExists
        _ => {
            let exists = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .is_some_and(|e| e.alive);
            Outcome::new().output("Exists", Value::Bool(exists))
        }
    }
}

/// Step an entity by a delta. Fails against walls on the active map and
/// against cells already occupied by a living entity.
fn try_move(state: &mut crate::state::EngineState, id: EntityId, dx: i64, dy: i64) -> bool {
    let Some(entity) = state.world.get(id) else {
        return false;
    };
    let (x, y) = (
        entity.x.saturating_add(dx as i32),
        entity.y.saturating_add(dy as i32),
    );
    let blocked_by_wall = state
        .active_map
        .and_then(|m| state.maps.get(&m))
        .is_some_and(|map| map.get(x, y) == Tile::Wall);
    if blocked_by_wall || state.world.at_cell(x, y).is_some() {
        return false;
    }
    if let Some(entity) = state.world.get_mut(id) {
        entity.x = x;
        entity.y = y;
    }
    state.queued.push_back(Signal::EnterTile(id, x, y));
    state.map_touched = true;
    true
}
