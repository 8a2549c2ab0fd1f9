// SPDX-License-Identifier: MIT OR Apache-2.0
//! Multiplayer session nodes, routed through the [`SessionLink`].
//!
//! [`SessionLink`]: crate::session::SessionLink

use super::{HandlerCtx, Inputs, Outcome};
use crate::session::{MessageScope, OutgoingMessage};
use crate::state::NetRole;
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    match node.kind {
        NodeKind::HostSession => {
            ctx.state.net_role = Some(NetRole::Host);
            Outcome::then()
                .output("Session", Value::Session)
                .output("Ok", Value::Bool(true))
        }
        NodeKind::JoinSession => {
            ctx.state.net_role = Some(NetRole::Client);
            tracing::debug!(address = %inputs.str("Address"), "joining session");
            Outcome::then()
                .output("Session", Value::Session)
                .output("Ok", Value::Bool(true))
        }
        NodeKind::LeaveSession => {
            ctx.state.net_role = None;
            Outcome::then()
        }
        NodeKind::SendMessage => {
            let ok = deliver(ctx, MessageScope::Direct(inputs.str("Peer")), inputs);
            Outcome::then().output("Ok", Value::Bool(ok))
        }
        NodeKind::BroadcastMessage => {
            let ok = deliver(ctx, MessageScope::Broadcast, inputs);
            Outcome::then().output("Ok", Value::Bool(ok))
        }
        NodeKind::IsHost => Outcome::new().output(
            "Host",
            Value::Bool(ctx.state.net_role == Some(NetRole::Host)),
        ),
        // PlayerCount
        _ => Outcome::new().output(
            "Count",
            Value::Int(i64::from(ctx.session.peer_count())),
        ),
    }
}

fn deliver(ctx: &mut HandlerCtx<'_>, scope: MessageScope, inputs: &Inputs) -> bool {
    if ctx.state.net_role.is_none() {
        return false;
    }
    let message = OutgoingMessage {
        scope,
        message_type: inputs.str("Type"),
        payload: inputs.str("Payload"),
    };
    match ctx.session.send(message) {
        Ok(()) => true,
        Err(fault) => {
            tracing::debug!(%fault, "send rejected by transport");
            false
        }
    }
}
