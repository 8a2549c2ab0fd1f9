// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph document persistence codec.
//!
//! The interchange format is JSON over explicit raw-document structs
//! rather than direct serde on the model. Identities are written and
//! resolved verbatim, node kinds and data types travel as string tags,
//! and decoding rebuilds the model through the `restore` constructors so
//! that `decode(encode(p)) == p` holds for every id, port, property and
//! connection.
//!
//! Degradation policy: an unknown node kind tag falls back to
//! `InlineExpression` and an unknown data type tag to `Any`, each with a
//! warning; the rest of the document loads. Structural damage (duplicate
//! ids, dangling connection endpoints) is fatal.

use crate::connection::{Connection, ConnectionId};
use crate::graph::{Graph, GraphId, Project};
use crate::node::{Node, NodeId};
use crate::port::{DataType, Port, PortDirection, PortId};
use crate::registry::NodeKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Error while encoding or decoding a graph document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document is not valid JSON
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two graphs share an id
    #[error("duplicate graph id: {0}")]
    DuplicateGraph(Uuid),

    /// Two nodes share an id within one graph
    #[error("duplicate node id: {0}")]
    DuplicateNode(Uuid),

    /// Two ports share an id within one node
    #[error("duplicate port id on node {node}: {port}")]
    DuplicatePort {
        /// Owning node id
        node: Uuid,
        /// Duplicated port id
        port: Uuid,
    },

    /// Two connections share an id within one graph
    #[error("duplicate connection id: {0}")]
    DuplicateConnection(Uuid),

    /// A connection references a missing node or port
    #[error("connection {id} is invalid: {reason}")]
    InvalidConnection {
        /// Offending connection id
        id: Uuid,
        /// Underlying graph error
        #[source]
        reason: crate::graph::GraphError,
    },

    /// The designated start graph id is not in the document
    #[error("start graph {0} is not in the document")]
    StartGraphMissing(Uuid),
}

#[derive(Serialize, Deserialize)]
struct RawProject {
    name: String,
    display_size: [u32; 2],
    start_graph: Option<Uuid>,
    graphs: Vec<RawGraph>,
}

#[derive(Serialize, Deserialize)]
struct RawGraph {
    id: Uuid,
    name: String,
    nodes: Vec<RawNode>,
    connections: Vec<RawConnection>,
}

#[derive(Serialize, Deserialize)]
struct RawNode {
    id: Uuid,
    kind: String,
    title: String,
    position: [f32; 2],
    inputs: Vec<RawPort>,
    outputs: Vec<RawPort>,
    #[serde(default)]
    properties: IndexMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct RawPort {
    id: Uuid,
    name: String,
    data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct RawConnection {
    id: Uuid,
    from_node: Uuid,
    from_port: Uuid,
    to_node: Uuid,
    to_port: Uuid,
}

/// Serialize a project to a JSON document
pub fn encode(project: &Project) -> Result<String, DocumentError> {
    let raw = RawProject {
        name: project.name.clone(),
        display_size: project.display_size,
        start_graph: project.start_graph.map(|g| g.0),
        graphs: project.graphs().map(encode_graph).collect(),
    };
    Ok(serde_json::to_string_pretty(&raw)?)
}

fn encode_graph(graph: &Graph) -> RawGraph {
    RawGraph {
        id: graph.id.0,
        name: graph.name.clone(),
        nodes: graph.nodes().map(encode_node).collect(),
        connections: graph
            .connections()
            .map(|c| RawConnection {
                id: c.id.0,
                from_node: c.from_node.0,
                from_port: c.from_port.0,
                to_node: c.to_node.0,
                to_port: c.to_port.0,
            })
            .collect(),
    }
}

fn encode_node(node: &Node) -> RawNode {
    let port = |p: &Port| RawPort {
        id: p.id.0,
        name: p.name.clone(),
        data_type: p.data_type.tag().to_owned(),
        default: p.default.clone(),
    };
    RawNode {
        id: node.id.0,
        kind: node.kind.tag(),
        title: node.title.clone(),
        position: node.position,
        inputs: node.inputs.iter().map(port).collect(),
        outputs: node.outputs.iter().map(port).collect(),
        properties: node.properties.clone(),
    }
}

/// Deserialize a project from a JSON document
pub fn decode(text: &str) -> Result<Project, DocumentError> {
    let raw: RawProject = serde_json::from_str(text)?;

    let mut project = Project::new(raw.name);
    project.display_size = raw.display_size;

    let mut graph_ids = std::collections::HashSet::new();
    for raw_graph in raw.graphs {
        if !graph_ids.insert(raw_graph.id) {
            return Err(DocumentError::DuplicateGraph(raw_graph.id));
        }
        let graph = decode_graph(raw_graph)?;
        project.add_graph(graph);
    }

    match raw.start_graph {
        Some(id) => {
            let id = GraphId(id);
            if project.graph(id).is_none() {
                return Err(DocumentError::StartGraphMissing(id.0));
            }
            project.start_graph = Some(id);
        }
        None => project.start_graph = None,
    }
    Ok(project)
}

fn decode_graph(raw: RawGraph) -> Result<Graph, DocumentError> {
    let mut graph = Graph::restore(GraphId(raw.id), raw.name);

    for raw_node in raw.nodes {
        if graph.node(NodeId(raw_node.id)).is_some() {
            return Err(DocumentError::DuplicateNode(raw_node.id));
        }
        graph.add_node(decode_node(raw_node)?);
    }

    let mut connection_ids = std::collections::HashSet::new();
    for raw_conn in raw.connections {
        if !connection_ids.insert(raw_conn.id) {
            return Err(DocumentError::DuplicateConnection(raw_conn.id));
        }
        let connection = Connection::restore(
            ConnectionId(raw_conn.id),
            NodeId(raw_conn.from_node),
            PortId(raw_conn.from_port),
            NodeId(raw_conn.to_node),
            PortId(raw_conn.to_port),
        );
        graph
            .insert_connection(connection)
            .map_err(|reason| DocumentError::InvalidConnection {
                id: raw_conn.id,
                reason,
            })?;
    }
    Ok(graph)
}

fn decode_node(raw: RawNode) -> Result<Node, DocumentError> {
    let kind = match NodeKind::from_tag(&raw.kind) {
        Some(kind) => kind,
        None => {
            warn!(tag = %raw.kind, node = %raw.id, "unknown node kind, degrading to InlineExpression");
            NodeKind::InlineExpression
        }
    };

    let node_id = raw.id;
    let mut port_ids = std::collections::HashSet::new();
    let mut decode_ports = |raw_ports: Vec<RawPort>,
                            direction: PortDirection|
     -> Result<Vec<Port>, DocumentError> {
        raw_ports
            .into_iter()
            .map(|p| {
                if !port_ids.insert(p.id) {
                    return Err(DocumentError::DuplicatePort {
                        node: node_id,
                        port: p.id,
                    });
                }
                let data_type = DataType::from_tag(&p.data_type).unwrap_or_else(|| {
                    warn!(tag = %p.data_type, node = %node_id, "unknown data type, degrading to Any");
                    DataType::Any
                });
                Ok(Port::restore(
                    PortId(p.id),
                    p.name,
                    direction,
                    data_type,
                    p.default,
                ))
            })
            .collect()
    };

    let inputs = decode_ports(raw.inputs, PortDirection::Input)?;
    let outputs = decode_ports(raw.outputs, PortDirection::Output)?;

    Ok(Node::restore(
        NodeId(raw.id),
        kind,
        raw.title,
        raw.position,
        inputs,
        outputs,
        raw.properties,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortDirection;

    fn sample_project() -> Project {
        let mut graph = Graph::new("main");
        let start = Node::new(NodeKind::Start).with_position(10.0, 20.0);
        let log = Node::new(NodeKind::PrintLog).with_property("Text", "hello");
        let count = Node::new(NodeKind::ForLoop).with_property("Count", "3");

        let s_out = start.output_named("Then").unwrap().id;
        let l_in = log.input_named("In").unwrap().id;
        let (s, l) = (graph.add_node(start), graph.add_node(log));
        graph.add_node(count);
        graph.connect(s, s_out, l, l_in).unwrap();

        let mut project = Project::new("demo");
        project.display_size = [60, 20];
        project.add_graph(graph);
        project
    }

    #[test]
    fn round_trip_preserves_everything() {
        let project = sample_project();
        let text = encode(&project).unwrap();
        let loaded = decode(&text).unwrap();
        assert_eq!(project, loaded);
    }

    #[test]
    fn node_order_does_not_affect_connections() {
        let project = sample_project();
        let mut value: serde_json::Value = serde_json::from_str(&encode(&project).unwrap()).unwrap();

        // Reverse the node array in the document
        let nodes = value["graphs"][0]["nodes"].as_array_mut().unwrap();
        nodes.reverse();

        let loaded = decode(&serde_json::to_string(&value).unwrap()).unwrap();
        let graph = loaded.graphs().next().unwrap();
        assert_eq!(graph.connection_count(), 1);
        // Connections still resolve by id
        let conn = graph.connections().next().unwrap();
        assert_eq!(graph.node(conn.from_node).unwrap().kind, NodeKind::Start);
        assert_eq!(graph.node(conn.to_node).unwrap().kind, NodeKind::PrintLog);
    }

    #[test]
    fn unknown_kind_degrades_to_inline_expression() {
        let project = sample_project();
        let mut value: serde_json::Value = serde_json::from_str(&encode(&project).unwrap()).unwrap();
        value["graphs"][0]["nodes"][2]["kind"] = "FancyNewNode".into();

        let loaded = decode(&serde_json::to_string(&value).unwrap()).unwrap();
        let graph = loaded.graphs().next().unwrap();
        let degraded = graph
            .nodes()
            .find(|n| n.kind == NodeKind::InlineExpression)
            .expect("degraded node");
        // Ports and properties survive the degrade
        assert_eq!(degraded.property("Count"), Some("3"));
        assert!(degraded.input_named("Count").is_some());
    }

    #[test]
    fn unknown_data_type_degrades_to_any() {
        let project = sample_project();
        let mut value: serde_json::Value = serde_json::from_str(&encode(&project).unwrap()).unwrap();
        value["graphs"][0]["nodes"][1]["inputs"][1]["data_type"] = "Texture".into();

        let loaded = decode(&serde_json::to_string(&value).unwrap()).unwrap();
        let graph = loaded.graphs().next().unwrap();
        let log = graph.nodes().find(|n| n.kind == NodeKind::PrintLog).unwrap();
        assert_eq!(log.input_named("Text").unwrap().data_type, DataType::Any);
    }

    #[test]
    fn duplicate_node_id_is_fatal() {
        let project = sample_project();
        let mut value: serde_json::Value = serde_json::from_str(&encode(&project).unwrap()).unwrap();
        let nodes = value["graphs"][0]["nodes"].as_array_mut().unwrap();
        let dup = nodes[0].clone();
        nodes.push(dup);

        let err = decode(&serde_json::to_string(&value).unwrap()).unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateNode(_)));
    }

    #[test]
    fn dangling_connection_is_fatal() {
        let project = sample_project();
        let mut value: serde_json::Value = serde_json::from_str(&encode(&project).unwrap()).unwrap();
        value["graphs"][0]["connections"][0]["to_node"] =
            Uuid::new_v4().to_string().into();

        let err = decode(&serde_json::to_string(&value).unwrap()).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidConnection { .. }));
    }

    #[test]
    fn ports_keep_direction_through_the_codec() {
        let project = sample_project();
        let loaded = decode(&encode(&project).unwrap()).unwrap();
        for graph in loaded.graphs() {
            for node in graph.nodes() {
                assert!(node
                    .inputs
                    .iter()
                    .all(|p| p.direction == PortDirection::Input));
                assert!(node
                    .outputs
                    .iter()
                    .all(|p| p.direction == PortDirection::Output));
            }
        }
    }
}
