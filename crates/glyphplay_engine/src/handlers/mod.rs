// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-kind node behavior.
//!
//! The interpreter resolves a node's data inputs, then hands the node to
//! [`dispatch`] with the engine context; the handler returns computed
//! output values and the Exec outputs to activate, in declaration order.
//! Control-flow kinds (loops, branch, wait, gate) never reach dispatch;
//! the interpreter drives those directly.

mod battle;
mod dialogue;
mod entity;
mod faction;
mod mapgen;
mod net;
mod overworld;
mod persistence;
mod rpg;
mod scene;
mod time;
mod ui;
mod variables;

use crate::state::EngineState;
use crate::session::SessionLink;
use crate::value::{EntityId, MapId, Value};
use glyphplay_graph::{Node, NodeKind};
use indexmap::IndexMap;

/// Resolved data inputs for one node invocation, keyed by port name
#[derive(Debug, Default)]
pub(crate) struct Inputs {
    values: IndexMap<String, Value>,
}

impl Inputs {
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn value(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Int(0))
    }

    pub fn int(&self, name: &str) -> i64 {
        self.values.get(name).map_or(0, Value::as_int)
    }

    pub fn float(&self, name: &str) -> f64 {
        self.values.get(name).map_or(0.0, Value::as_float)
    }

    pub fn bool(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(Value::as_bool)
    }

    pub fn str(&self, name: &str) -> String {
        self.values.get(name).map(Value::as_str).unwrap_or_default()
    }

    pub fn cell(&self, name: &str) -> (i32, i32) {
        self.values.get(name).map_or((0, 0), Value::as_cell)
    }

    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.values.get(name).and_then(Value::as_entity)
    }

    pub fn map(&self, name: &str) -> Option<MapId> {
        self.values.get(name).and_then(Value::as_map)
    }
}

/// What one node invocation produced
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    /// Computed output values, by port name
    pub outputs: Vec<(&'static str, Value)>,
    /// Exec outputs to activate, in order
    pub exec: Vec<&'static str>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outcome that just activates `Then`
    pub fn then() -> Self {
        Self::new().follow("Then")
    }

    pub fn output(mut self, name: &'static str, value: Value) -> Self {
        self.outputs.push((name, value));
        self
    }

    pub fn follow(mut self, name: &'static str) -> Self {
        self.exec.push(name);
        self
    }
}

/// Engine context handed to handlers
pub(crate) struct HandlerCtx<'a> {
    pub state: &'a mut EngineState,
    pub session: &'a mut dyn SessionLink,
}

/// Invoke the handler for an ordinary node kind.
///
/// Kinds the interpreter drives itself (entry, event and control-flow
/// nodes) fall through to a pass-through outcome so a miswired graph
/// degrades instead of crashing.
pub(crate) fn dispatch(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    use NodeKind as K;
    match node.kind {
        K::IntValue
        | K::FloatValue
        | K::StringValue
        | K::BoolValue
        | K::SetVariable
        | K::GetVariable
        | K::RandomInt
        | K::InlineExpression => variables::run(node, inputs, ctx),

        K::Add
        | K::Subtract
        | K::Multiply
        | K::Divide
        | K::Modulo
        | K::Negate
        | K::Abs
        | K::Min
        | K::Max
        | K::Clamp
        | K::IntToFloat
        | K::FloatToInt => math(node.kind, inputs),

        K::And
        | K::Or
        | K::Not
        | K::Equals
        | K::NotEquals
        | K::GreaterThan
        | K::LessThan
        | K::Compare => logic(node, inputs),

        K::CreateMap
        | K::GenerateCaveCellular
        | K::GenerateBspRooms
        | K::GenerateDrunkardWalk
        | K::FillRegion
        | K::SetCell
        | K::GetCell
        | K::DefineRoomTemplate
        | K::PlaceRoomTemplate
        | K::RenderMap
        | K::MapSize
        | K::FindOpenCell
        | K::CustomProcgenOutput => mapgen::run(node, inputs, ctx),

        K::DefineSprite
        | K::SpawnEntity
        | K::DestroyEntity
        | K::MoveEntity
        | K::TeleportEntity
        | K::GetEntityCell
        | K::EntityAtCell
        | K::GetPlayer
        | K::SetEntitySprite
        | K::GetEntityName
        | K::EntityExists => entity::run(node, inputs, ctx),

        K::PrintLog | K::ShowMessage | K::ShowChoice | K::ClearLog | K::SetStatusLine
        | K::DrawText => ui::run(node, inputs, ctx),

        K::SaveGame | K::LoadGame | K::StoreValue | K::FetchValue | K::HasValue
        | K::DeleteValue => persistence::run(node, inputs, ctx),

        K::StartDialogue
        | K::DialogueLine
        | K::DialogueChoice
        | K::AdvanceDialogue
        | K::EndDialogue
        | K::IsDialogueActive => dialogue::run(node, inputs, ctx),

        K::DefineFaction
        | K::SetFactionRelation
        | K::GetFactionRelation
        | K::AssignFaction
        | K::GetEntityFaction
        | K::IsHostile => faction::run(node, inputs, ctx),

        K::GetTick | K::StartTimer | K::StopTimer | K::GetTimeOfDay | K::AdvanceTime => {
            time::run(node, inputs, ctx)
        }

        K::GetSceneNode
        | K::AddSceneNode
        | K::RemoveSceneNode
        | K::SetSceneNodeProperty
        | K::GetSceneNodeProperty => scene::run(node, inputs, ctx),

        K::CreateOverworld | K::EnterLocation | K::LeaveLocation | K::CurrentLocation => {
            overworld::run(node, inputs, ctx)
        }

        K::HostSession
        | K::JoinSession
        | K::LeaveSession
        | K::SendMessage
        | K::BroadcastMessage
        | K::IsHost
        | K::PlayerCount => net::run(node, inputs, ctx),

        K::StartBattle
        | K::EndBattle
        | K::RollDice
        | K::RollInitiative
        | K::DealDamage
        | K::Heal
        | K::GetHealth => battle::run(node, inputs, ctx),

        K::AddItem | K::RemoveItem | K::HasItem | K::GetStat | K::SetStat => {
            rpg::run(node, inputs, ctx)
        }

        // Interpreter-driven kinds; reaching here means a degraded graph
        _ => Outcome::then(),
    }
}

fn math(kind: NodeKind, inputs: &Inputs) -> Outcome {
    use NodeKind as K;
    let result = match kind {
        K::Add => Value::Int(inputs.int("A").wrapping_add(inputs.int("B"))),
        K::Subtract => Value::Int(inputs.int("A").wrapping_sub(inputs.int("B"))),
        K::Multiply => Value::Int(inputs.int("A").wrapping_mul(inputs.int("B"))),
        // Division and modulo by zero yield zero rather than halting
        K::Divide => Value::Int(inputs.int("A").checked_div(inputs.int("B")).unwrap_or(0)),
        K::Modulo => Value::Int(inputs.int("A").checked_rem(inputs.int("B")).unwrap_or(0)),
        K::Negate => Value::Int(inputs.int("Value").wrapping_neg()),
        K::Abs => Value::Int(inputs.int("Value").wrapping_abs()),
        K::Min => Value::Int(inputs.int("A").min(inputs.int("B"))),
        K::Max => Value::Int(inputs.int("A").max(inputs.int("B"))),
        K::Clamp => {
            let (min, max) = (inputs.int("Min"), inputs.int("Max"));
            Value::Int(inputs.int("Value").clamp(min, max.max(min)))
        }
        K::IntToFloat => Value::Float(inputs.int("Value") as f64),
        K::FloatToInt => Value::Int(inputs.float("Value") as i64),
        _ => Value::Int(0),
    };
    Outcome::new().output("Result", result)
}

fn logic(node: &Node, inputs: &Inputs) -> Outcome {
    use NodeKind as K;
    let result = match node.kind {
        K::And => inputs.bool("A") && inputs.bool("B"),
        K::Or => inputs.bool("A") || inputs.bool("B"),
        K::Not => !inputs.bool("Value"),
        K::Equals => inputs.value("A").loose_eq(&inputs.value("B")),
        K::NotEquals => !inputs.value("A").loose_eq(&inputs.value("B")),
        K::GreaterThan => inputs.int("A") > inputs.int("B"),
        K::LessThan => inputs.int("A") < inputs.int("B"),
        K::Compare => {
            let (a, b) = (inputs.value("A"), inputs.value("B"));
            match node.property("Op").unwrap_or("==") {
                "!=" => !a.loose_eq(&b),
                "<" => a.as_float() < b.as_float(),
                "<=" => a.as_float() <= b.as_float(),
                ">" => a.as_float() > b.as_float(),
                ">=" => a.as_float() >= b.as_float(),
                _ => a.loose_eq(&b),
            }
        }
        _ => false,
    };
    Outcome::new().output("Result", Value::Bool(result))
}
