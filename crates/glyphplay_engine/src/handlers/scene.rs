// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene tree queries and edits.

use super::{HandlerCtx, Inputs, Outcome};
use crate::state::SceneTree;
use crate::value::Value;
use glyphplay_graph::{Node, NodeKind};

pub(super) fn run(node: &Node, inputs: &Inputs, ctx: &mut HandlerCtx<'_>) -> Outcome {
    let scene = &mut ctx.state.scene;
    match node.kind {
        NodeKind::GetSceneNode => {
            let found = scene.by_path(&inputs.str("Path"));
            Outcome::new()
                .output(
                    "Node",
                    Value::SceneNode(found.unwrap_or(SceneTree::ROOT)),
                )
                .output("Found", Value::Bool(found.is_some()))
        }
        NodeKind::AddSceneNode => {
            let parent = inputs
                .value("Parent")
                .as_scene_node()
                .unwrap_or(SceneTree::ROOT);
            let id = scene.add(parent, inputs.str("Name"));
            Outcome::then().output("Node", Value::SceneNode(id))
        }
        NodeKind::RemoveSceneNode => {
            if let Some(id) = inputs.value("Node").as_scene_node() {
                scene.remove(id);
            }
            Outcome::then()
        }
        NodeKind::SetSceneNodeProperty => {
            if let Some(data) = inputs
                .value("Node")
                .as_scene_node()
                .and_then(|id| scene.get_mut(id))
            {
                data.properties.insert(inputs.str("Key"), inputs.str("Value"));
            }
            Outcome::then()
        }
        // GetSceneNodeProperty
        _ => {
            let value = inputs
                .value("Node")
                .as_scene_node()
                .and_then(|id| scene.get(id))
                .and_then(|d| d.properties.get(&inputs.str("Key")).cloned())
                .unwrap_or_default();
            Outcome::new().output("Value", Value::Str(value))
        }
    }
}
