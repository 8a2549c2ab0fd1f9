// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inventory and stats.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::AddItem => {
            let count = inputs.int("Count").max(0);
            if let Some(entity) = inputs.entity("Entity").and_then(|id| state.world.get_mut(id))
            {
                *entity.inventory.entry(inputs.str("Item")).or_insert(0) += count;
            }
            Outcome::then()
        }
        NodeKind::RemoveItem => {
            let count = inputs.int("Count").max(0);
            let item = inputs.str("Item");
            let mut removed = false;
            if let Some(entity) = inputs.entity("Entity").and_then(|id| state.world.get_mut(id))
            {
                if let Some(held) = entity.inventory.get_mut(&item) {
                    if *held >= count {
                        *held -= count;
                        removed = true;
                        if *held == 0 {
                            entity.inventory.shift_remove(&item);
                        }
                    }
                }
            }
            Outcome::then().output("Removed", Value::Bool(removed))
        }
        NodeKind::HasItem => {
            let count = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .and_then(|e| e.inventory.get(&inputs.str("Item")).copied())
                .unwrap_or(0);
            Outcome::new()
                .output("Has", Value::Bool(count > 0))
                .output("Count", Value::Int(count))
        }
        NodeKind::GetStat => {
            let value = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .and_then(|e| e.stats.get(&inputs.str("Stat")).copied())
                .unwrap_or(0);
            Outcome::new().output("Value", Value::Int(value))
        }
        // SetStat
        _ => {
            if let Some(entity) = inputs.entity("Entity").and_then(|id| state.world.get_mut(id))
            {
                entity.stats.insert(inputs.str("Stat"), inputs.int("Value"));
            }
            Outcome::then()
        }
    }
}
