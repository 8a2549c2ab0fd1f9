// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal values, named variables and random numbers.

use super::{HandlerCtx, Inputs, Outcome};
use crate::value::Value;
use glyphplay_graph::{DataType, Node, NodeKind};
use rand::Rng;

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    match node.kind {
        NodeKind::IntValue => literal(node, DataType::Int),
        NodeKind::FloatValue => literal(node, DataType::Float),
        NodeKind::StringValue => literal(node, DataType::String),
        NodeKind::BoolValue => literal(node, DataType::Bool),
        NodeKind::SetVariable => {
            let name = inputs.str("Name");
            ctx.state.variables.insert(name, inputs.value("Value"));
            Outcome::then()
        }
        NodeKind::GetVariable => {
            let value = ctx
                .state
                .variables
                .get(&inputs.str("Name"))
                .cloned()
                .unwrap_or(Value::Int(0));
            Outcome::new().output("Value", value)
        }
        NodeKind::RandomInt => {
            let (min, max) = (inputs.int("Min"), inputs.int("Max"));
            let (lo, hi) = (min.min(max), min.max(max));
            let value = ctx.state.rng.gen_range(lo..=hi);
            Outcome::new().output("Value", Value::Int(value))
        }
        // InlineExpression, also the degradation target for unknown tags:
        // pass the input through unchanged
        _ => Outcome::then().output("Value", inputs.value("Value")),
    }
}

/// Read a literal node's value from its `Value` property
fn literal(node: &Node, data_type: DataType) -> Outcome {
    let value = node
        .property("Value")
        .map_or_else(|| Value::zero(data_type), |text| Value::parse(data_type, text));
    Outcome::new().output("Value", value)
}
