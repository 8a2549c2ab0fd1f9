// SPDX-License-Identifier: MIT OR Apache-2.0
//! Log and status output.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let state = &mut *ctx.state;
    match node.kind {
        NodeKind::PrintLog => {
            state.log_line(inputs.str("Text"));
            Outcome::then()
        }
        NodeKind::ShowMessage => {
            state.log_line(format!("* {}", inputs.str("Text")));
            Outcome::then()
        }
        NodeKind::ShowChoice => {
            // Options are pipe-separated; the host answers via
            // `Engine::choose` before the tick that reads `Choice`.
            for (i, option) in inputs.str("Options").split('|').enumerate() {
                state.log_line(format!("  {}) {}", i + 1, option.trim()));
            }
            Outcome::then().output("Choice", Value::Int(state.dialogue.last_choice))
        }
        NodeKind::ClearLog => {
            state.log.clear();
            Outcome::then()
        }
        NodeKind::SetStatusLine => {
            state.status_line = Some(inputs.str("Text"));
            Outcome::then()
        }
        // DrawText: overlay glyphs on the map without changing tiles
        _ => {
            let (x, y) = inputs.cell("Cell");
            if let Some(id) = state.map_or_active(inputs.map("Map")) {
                if let Some(map) = state.maps.get_mut(&id) {
                    for (i, glyph) in inputs.str("Text").chars().enumerate() {
                        map.set_glyph(x + i as i32, y, glyph);
                    }
                }
                state.map_touched = true;
            }
            Outcome::then()
        }
    }
}
