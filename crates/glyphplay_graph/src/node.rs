// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instances in a script graph.

use crate::port::{Port, PortDirection, PortId};
use crate::registry::NodeKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind tag
    pub kind: NodeKind,
    /// Display title (can be customized by the designer)
    pub title: String,
    /// Position in the editor canvas; persisted, irrelevant to execution
    pub position: [f32; 2],
    /// Input ports, in declaration order
    pub inputs: Vec<Port>,
    /// Output ports, in declaration order
    pub outputs: Vec<Port>,
    /// String-encoded property values, used when a data input is unwired
    pub properties: IndexMap<String, String>,
}

impl Node {
    /// Create a new node with ports instantiated from the kind's descriptor
    pub fn new(kind: NodeKind) -> Self {
        let desc = kind.descriptor();
        let make = |spec: &crate::registry::PortSpec, dir: PortDirection| {
            let port = match dir {
                PortDirection::Input => Port::input(spec.name, spec.data_type),
                PortDirection::Output => Port::output(spec.name, spec.data_type),
            };
            match spec.default {
                Some(value) => port.with_default(value),
                None => port,
            }
        };
        Self {
            id: NodeId::new(),
            kind,
            title: desc.name.to_owned(),
            position: [0.0, 0.0],
            inputs: desc
                .inputs
                .iter()
                .map(|s| make(s, PortDirection::Input))
                .collect(),
            outputs: desc
                .outputs
                .iter()
                .map(|s| make(s, PortDirection::Output))
                .collect(),
            properties: IndexMap::new(),
        }
    }

    /// Rebuild a node with explicit identity and ports. Used by the
    /// persistence codec; the editor uses [`Node::new`].
    pub fn restore(
        id: NodeId,
        kind: NodeKind,
        title: impl Into<String>,
        position: [f32; 2],
        inputs: Vec<Port>,
        outputs: Vec<Port>,
        properties: IndexMap<String, String>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            position,
            inputs,
            outputs,
            properties,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set a property value
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Get a property value
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Get an input port by name
    pub fn input_named(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Get an output port by name
    pub fn output_named(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Get a port (input or output) by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.inputs
            .iter()
            .find(|p| p.id == port_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == port_id))
    }

    /// All ports, inputs first
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::DataType;

    #[test]
    fn new_node_instantiates_descriptor_ports() {
        let node = Node::new(NodeKind::Branch);
        assert_eq!(node.title, "Branch");
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.outputs.len(), 2);
        assert_eq!(node.input_named("Condition").unwrap().data_type, DataType::Bool);
        assert_eq!(
            node.input_named("Condition").unwrap().default.as_deref(),
            Some("false")
        );
        assert_eq!(node.output_named("True").unwrap().data_type, DataType::Exec);
    }

    #[test]
    fn restore_keeps_identity() {
        let original = Node::new(NodeKind::Add).with_property("A", "3");
        let rebuilt = Node::restore(
            original.id,
            original.kind,
            original.title.clone(),
            original.position,
            original.inputs.clone(),
            original.outputs.clone(),
            original.properties.clone(),
        );
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn port_ids_are_unique_within_a_node() {
        let node = Node::new(NodeKind::Clamp);
        let mut seen = std::collections::HashSet::new();
        for port in node.ports() {
            assert!(seen.insert(port.id));
        }
    }
}
