// SPDX-License-Identifier: MIT OR Apache-2.0
//! Faction registry and entity assignments.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::DefineFaction => {
            state.factions.define(inputs.str("Name"));
            Outcome::then()
        }
        NodeKind::SetFactionRelation => {
            state
                .factions
                .set_relation(&inputs.str("A"), &inputs.str("B"), inputs.int("Relation"));
            Outcome::then()
        }
        NodeKind::GetFactionRelation => {
            let relation = state.factions.relation(&inputs.str("A"), &inputs.str("B"));
            Outcome::new().output("Relation", Value::Int(relation))
        }
        NodeKind::AssignFaction => {
            let faction = inputs.str("Faction");
            if state.factions.is_defined(&faction) {
                if let Some(entity) =
                    inputs.entity("Entity").and_then(|id| state.world.get_mut(id))
                {
                    entity.faction = Some(faction);
                }
            } else {
                state.warn_missing("faction", &faction);
            }
            Outcome::then()
        }
        NodeKind::GetEntityFaction => {
            let faction = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .and_then(|e| e.faction.clone())
                .unwrap_or_default();
            Outcome::new().output("Faction", Value::Str(faction))
        }
        // IsHostile: hostile when both sides have factions whose relation
        // is negative
        _ => {
            let faction_of = |name: &str| {
                inputs
                    .entity(name)
                    .and_then(|id| state.world.get(id))
                    .and_then(|e| e.faction.clone())
            };
            let hostile = match (faction_of("A"), faction_of("B")) {
                (Some(a), Some(b)) => state.factions.relation(&a, &b) < 0,
                _ => false,
            };
            Outcome::new().output("Hostile", Value::Bool(hostile))
        }
    }
}
