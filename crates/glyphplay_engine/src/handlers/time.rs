// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ticks, timers and the in-world clock.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::GetTick => Outcome::new().output("Tick", Value::Int(state.tick as i64)),
        NodeKind::StartTimer => {
            state
                .timers
                .insert(inputs.str("Name"), inputs.int("Ticks").max(1));
            Outcome::then()
        }
        NodeKind::StopTimer => {
            state.timers.shift_remove(&inputs.str("Name"));
            Outcome::then()
        }
        NodeKind::GetTimeOfDay => {
            let minutes = state.clock_minutes.rem_euclid(24 * 60);
            let (hour, minute) = (minutes / 60, minutes % 60);
            let label = match hour {
                5..=11 => "morning",
                12..=17 => "afternoon",
                18..=21 => "evening",
                _ => "night",
            };
            Outcome::new()
                .output("Hour", Value::Int(hour))
                .output("Minute", Value::Int(minute))
                .output("Label", Value::Str(label.to_owned()))
        }
        // AdvanceTime
        _ => {
            state.clock_minutes = state
                .clock_minutes
                .saturating_add(inputs.int("Minutes").max(0));
            Outcome::then()
        }
    }
}
