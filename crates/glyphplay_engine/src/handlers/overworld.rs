// SPDX-License-Identifier: MIT OR Apache-2.0
//! Overworld and location tracking.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let overworld = &mut ctx.state.overworld;
    match node.kind {
        NodeKind::CreateOverworld => {
            let name = inputs.str("Name");
            overworld.name = Some(name.clone());
            Outcome::then().output("Overworld", Value::Overworld(name))
        }
        NodeKind::EnterLocation => {
            let name = inputs.str("Name");
            if !overworld.locations.contains(&name) {
                overworld.locations.push(name.clone());
            }
            overworld.current = Some(name.clone());
            Outcome::then().output("Location", Value::Location(name))
        }
        NodeKind::LeaveLocation => {
            overworld.current = None;
            Outcome::then()
        }
        // CurrentLocation
        _ => {
            let name = overworld.current.clone().unwrap_or_default();
            Outcome::new()
                .output("Location", Value::Location(name.clone()))
                .output("Name", Value::Str(name))
        }
    }
}
