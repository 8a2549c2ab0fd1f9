// SPDX-License-Identifier: MIT OR Apache-2.0
//! Battle flow, dice and damage.

use super::{HandlerCtx, Inputs, Outcome};
use crate::events::Signal;
use crate::value::{EntityId, Value};
use glyphplay_graph::{Node, NodeKind};
use rand::seq::SliceRandom;
use rand::Rng;

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::StartBattle => {
            state.battle.active = true;
            state.battle.order.clear();
            Outcome::then()
        }
        NodeKind::EndBattle => {
            state.battle.active = false;
            state.battle.order.clear();
            state.queued.push_back(Signal::BattleEnded {
                winner: inputs.entity("Winner").unwrap_or(EntityId::NONE),
            });
            Outcome::then()
        }
        NodeKind::RollDice => {
            let sides = inputs.int("Sides").max(1);
            let count = inputs.int("Count").clamp(0, 100);
            let total: i64 = (0..count).map(|_| state.rng.gen_range(1..=sides)).sum();
            Outcome::new().output("Total", Value::Int(total))
        }
        NodeKind::RollInitiative => {
            let mut order: Vec<EntityId> = state.world.living().collect();
            order.shuffle(&mut state.rng);
            let first = order.first().copied().unwrap_or(EntityId::NONE);
            state.battle.order = order;
            Outcome::then().output("First", Value::Entity(first))
        }
        NodeKind::DealDamage => {
            let amount = inputs.int("Amount").max(0);
            let mut killed = false;
            if let Some(id) = inputs.entity("Target") {
                if let Some(entity) = state.world.get_mut(id) {
                    entity.hp = entity.hp.saturating_sub(amount);
                    if entity.alive && entity.hp <= 0 {
                        entity.alive = false;
                        killed = true;
                        if entity.player {
                            state.queued.push_back(Signal::PlayerDeath(id));
                        }
                        if state.battle.active {
                            state.battle.order.retain(|&e| e != id);
                        }
                        state.map_touched = true;
                    }
                }
            }
            Outcome::then().output("Killed", Value::Bool(killed))
        }
        NodeKind::Heal => {
            let amount = inputs.int("Amount").max(0);
            if let Some(entity) = inputs.entity("Target").and_then(|id| state.world.get_mut(id))
            {
                entity.hp = entity.max_hp.min(entity.hp.saturating_add(amount));
            }
            Outcome::then()
        }
        // GetHealth
        _ => {
            let (hp, max) = inputs
                .entity("Entity")
                .and_then(|id| state.world.get(id))
                .map_or((0, 0), |e| (e.hp, e.max_hp));
            Outcome::new()
                .output("Health", Value::Int(hp))
                .output("Max", Value::Int(max))
        }
    }
}
