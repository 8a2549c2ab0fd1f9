// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dialogue sequencing.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let dialogue = &mut ctx.state.dialogue;
    match node.kind {
        NodeKind::StartDialogue => {
            dialogue.active = true;
            dialogue.speaker = inputs.str("Speaker");
            dialogue.queue.clear();
            Outcome::then()
        }
        NodeKind::DialogueLine => {
            dialogue.queue.push_back(inputs.str("Text"));
            Outcome::then()
        }
        NodeKind::DialogueChoice => {
            let choice = dialogue.last_choice;
            for (i, option) in inputs.str("Options").split('|').enumerate() {
                ctx.state.log_line(format!("  {}) {}", i + 1, option.trim()));
            }
            Outcome::then().output("Choice", Value::Int(choice))
        }
        NodeKind::AdvanceDialogue => {
            let line = dialogue.queue.pop_front();
            let done = dialogue.queue.is_empty();
            if let Some(line) = line {
                let speaker = ctx.state.dialogue.speaker.clone();
                ctx.state.log_line(format!("{speaker}: {line}"));
            }
            Outcome::then().output("Done", Value::Bool(done))
        }
        NodeKind::EndDialogue => {
            dialogue.active = false;
            dialogue.speaker.clear();
            dialogue.queue.clear();
            Outcome::then()
        }
        // IsDialogueActive
        _ => Outcome::new()
            .output("Active", Value::Bool(dialogue.active))
            .output("Speaker", Value::Str(dialogue.speaker.clone())),
    }
}
