// SPDX-License-Identifier: MIT OR Apache-2.0
//! Map creation, procedural generators and cell editing.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::{MapId, Value};
use glyphplay_graph::{Node, NodeKind};
use glyphplay_procgen::{
    carve_bsp_rooms, carve_cave, carve_drunkard_walk, GameMap, RoomTemplate, Tile,
};
use rand::seq::SliceRandom;

const MAX_MAP_DIM: i64 = 512;

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::CreateMap => {
            let width = inputs.int("Width").clamp(1, MAX_MAP_DIM) as u32;
            let height = inputs.int("Height").clamp(1, MAX_MAP_DIM) as u32;
            let id = state.create_map(GameMap::new(width, height, Tile::Floor));
            Outcome::then().output("Map", Value::Map(id))
        }
        NodeKind::GenerateCaveCellular => {
            let Some((id, mut map)) = take_map(ctx, inputs) else {
                return Outcome::then();
            };
            let fill = inputs.float("FillRatio").clamp(0.0, 1.0);
            let iterations = inputs.int("Iterations").clamp(0, 32) as u32;
            carve_cave(&mut map, fill, iterations, &mut ctx.state.rng);
            put_map(ctx, id, map);
            Outcome::then().output("Map", Value::Map(id))
        }
        NodeKind::GenerateBspRooms => {
            let Some((id, mut map)) = take_map(ctx, inputs) else {
                return Outcome::then();
            };
            let min = inputs.int("MinRoomSize").clamp(2, MAX_MAP_DIM) as i32;
            let max = inputs.int("MaxRoomSize").max(min as i64) as i32;
            carve_bsp_rooms(&mut map, min, max, &mut ctx.state.rng);
            put_map(ctx, id, map);
            Outcome::then().output("Map", Value::Map(id))
        }
        NodeKind::GenerateDrunkardWalk => {
            let Some((id, mut map)) = take_map(ctx, inputs) else {
                return Outcome::then();
            };
            let steps = inputs.int("Steps").clamp(0, 1_000_000) as u32;
            carve_drunkard_walk(&mut map, steps, &mut ctx.state.rng);
            put_map(ctx, id, map);
            Outcome::then().output("Map", Value::Map(id))
        }
        NodeKind::FillRegion => {
            let tile = Tile::parse(&inputs.str("Tile"));
            let (x, y) = (inputs.int("X") as i32, inputs.int("Y") as i32);
            let (w, h) = (inputs.int("Width") as i32, inputs.int("Height") as i32);
            if let Some(map) = target_map_mut(state, inputs) {
                map.fill_region(x, y, w, h, tile);
                state.map_touched = true;
            }
            Outcome::then()
        }
        NodeKind::SetCell => {
            let tile = Tile::parse(&inputs.str("Tile"));
            let (x, y) = inputs.cell("Cell");
            if let Some(map) = target_map_mut(state, inputs) {
                map.set(x, y, tile);
                state.map_touched = true;
            }
            Outcome::then()
        }
        NodeKind::GetCell => {
            let (x, y) = inputs.cell("Cell");
            let tile = target_map(state, inputs).map_or(Tile::Wall, |m| m.get(x, y));
            let name = match tile {
                Tile::Wall => "Wall",
                Tile::Floor => "Floor",
            };
            Outcome::new().output("Tile", Value::Str(name.to_owned()))
        }
        NodeKind::DefineRoomTemplate => {
            let name = inputs.str("Name");
            let template = RoomTemplate::parse(&inputs.str("Layout"));
            state.templates.insert(name, template);
            Outcome::then()
        }
        NodeKind::PlaceRoomTemplate => {
            let name = inputs.str("Name");
            let (x, y) = inputs.cell("Cell");
            match state.templates.get(&name).cloned() {
                Some(template) => {
                    if let Some(map) = target_map_mut(state, inputs) {
                        template.stamp(map, x, y);
                        state.map_touched = true;
                    }
                }
                None => state.warn_missing("room template", &name),
            }
            Outcome::then()
        }
        NodeKind::RenderMap => {
            // Make the map current so it lands in this tick's snapshot
            if let Some(id) = state.map_or_active(inputs.map("Map")) {
                state.active_map = Some(id);
                state.map_touched = true;
            } else {
                state.warn_missing("map", "render target");
            }
            Outcome::then()
        }
        NodeKind::MapSize => {
            let (w, h) = target_map(state, inputs).map_or((0, 0), |m| (m.width(), m.height()));
            Outcome::new()
                .output("Width", Value::Int(i64::from(w)))
                .output("Height", Value::Int(i64::from(h)))
        }
        NodeKind::FindOpenCell => {
            let cells: Vec<(i32, i32)> = target_map(state, inputs)
                .map(|m| m.floor_cells().collect())
                .unwrap_or_default();
            match cells.choose(&mut state.rng) {
                Some(&(x, y)) => Outcome::new()
                    .output("Cell", Value::Cell(x, y))
                    .output("Found", Value::Bool(true)),
                None => Outcome::new()
                    .output("Cell", Value::Cell(0, 0))
                    .output("Found", Value::Bool(false)),
            }
        }
        // CustomProcgenOutput: publish the finished map to the caller
        _ => {
            state.procgen_result = state.map_or_active(inputs.map("Map"));
            Outcome::then()
        }
    }
}

/// Resolve the `Map` input (falling back to the active map) and pull the
/// map out of the arena for mutation alongside the RNG.
fn take_map(ctx: &mut HandlerCtx<'_>, inputs: &Inputs) -> Option<(MapId, GameMap)> {
    match ctx.state.map_or_active(inputs.map("Map")) {
        Some(id) => {
            let map = ctx.state.maps.get(&id).cloned()?;
            Some((id, map))
        }
        None => {
            ctx.state.warn_missing("map", "generator target");
            None
        }
    }
}

fn put_map(ctx: &mut HandlerCtx<'_>, id: MapId, map: GameMap) {
    ctx.state.maps.insert(id, map);
    ctx.state.map_touched = true;
}

fn target_map<'s>(
    state: &'s crate::state::EngineState,
    inputs: &Inputs,
) -> Option<&'s GameMap> {
    let id = state.map_or_active(inputs.map("Map"))?;
    state.maps.get(&id)
}

fn target_map_mut<'s>(
    state: &'s mut crate::state::EngineState,
    inputs: &Inputs,
) -> Option<&'s mut GameMap> {
    let id = state.map_or_active(inputs.map("Map"))?;
    state.maps.get_mut(&id)
}
