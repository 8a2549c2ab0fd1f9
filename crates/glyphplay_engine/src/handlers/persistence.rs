// SPDX-License-Identifier: MIT OR Apache-2.0
//! Save slots and the persistent key/value store.

use super::{HandlerCtx, Inputs, Outcome};
use crate::save::SaveGame;
use crate::state::PendingOp;
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::SaveGame => {
            let slot = inputs.str("Slot");
            let save = SaveGame::capture(
                &state.world,
                &state.overworld,
                &state.factions,
                &state.store,
            );
            // The snapshot is taken now; the completion event lands next
            // tick so the current traversal finishes undisturbed.
            let ok = match save.encode() {
                Ok(text) => {
                    state.slots.insert(slot.clone(), text);
                    true
                }
                Err(err) => {
                    tracing::warn!(%slot, %err, "save encode failed");
                    false
                }
            };
            state.pending_ops.push(PendingOp::Save { slot, ok });
            Outcome::then()
        }
        NodeKind::LoadGame => {
            state.pending_ops.push(PendingOp::Load {
                slot: inputs.str("Slot"),
            });
            Outcome::then()
        }
        NodeKind::StoreValue => {
            state.store.insert(inputs.str("Key"), inputs.str("Value"));
            Outcome::then()
        }
        NodeKind::FetchValue => {
            let value = state.store.get(&inputs.str("Key")).cloned();
            Outcome::new()
                .output("Value", Value::Str(value.clone().unwrap_or_default()))
                .output("Found", Value::Bool(value.is_some()))
        }
        NodeKind::HasValue => {
            let found = state.store.contains_key(&inputs.str("Key"));
            Outcome::new().output("Found", Value::Bool(found))
        }
        // DeleteValue
        _ => {
            state.store.shift_remove(&inputs.str("Key"));
            Outcome::then()
        }
    }
}
