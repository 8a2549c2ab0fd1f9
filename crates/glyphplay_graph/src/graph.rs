// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph and project containers.
//!
//! A [`Graph`] owns its nodes and connections; [`Graph::connect`] is the
//! only way to add an edge and enforces the type and single-producer
//! rules, so a graph that loads is a graph whose edges are well-formed.
//! Declaration order of nodes and connections is semantically meaningful
//! (it is the traversal tie-break order), which is why both collections
//! are `IndexMap`s.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::port::{DataType, PortDirection, PortId};
use crate::registry::Role;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(pub Uuid);

impl GraphId {
    /// Create a new random graph ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

/// A script graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Unique graph ID
    pub id: GraphId,
    /// Graph name
    pub name: String,
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GraphId::new(),
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Create an empty graph with an explicit identity. Used by the
    /// persistence codec.
    pub fn restore(id: GraphId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes, in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs, in declaration order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect an output port to an input port.
    ///
    /// Rejected (with a [`GraphError`]) when an endpoint is missing, the
    /// directions are wrong, the types are incompatible, the target is a
    /// non-`Exec` input that already has a producer, or the edge would be
    /// a self-loop. `Exec` inputs accept any number of incoming edges.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, GraphError> {
        let connection = Connection::new(from_node, from_port, to_node, to_port);
        self.insert_connection(connection)
    }

    /// Add a pre-built connection, running the same validation as
    /// [`Graph::connect`]. Used by the persistence codec to preserve
    /// connection identity.
    pub fn insert_connection(&mut self, connection: Connection) -> Result<ConnectionId, GraphError> {
        let source_node = self
            .nodes
            .get(&connection.from_node)
            .ok_or(GraphError::NodeNotFound(connection.from_node))?;
        let target_node = self
            .nodes
            .get(&connection.to_node)
            .ok_or(GraphError::NodeNotFound(connection.to_node))?;

        let source_port = source_node
            .port(connection.from_port)
            .ok_or(GraphError::PortNotFound(connection.from_port))?;
        let target_port = target_node
            .port(connection.to_port)
            .ok_or(GraphError::PortNotFound(connection.to_port))?;

        if source_port.direction != PortDirection::Output {
            return Err(GraphError::NotAnOutput(connection.from_port));
        }
        if target_port.direction != PortDirection::Input {
            return Err(GraphError::NotAnInput(connection.to_port));
        }
        if !source_port.data_type.can_connect_to(target_port.data_type) {
            return Err(GraphError::IncompatibleTypes {
                from: source_port.data_type,
                to: target_port.data_type,
            });
        }
        if connection.from_node == connection.to_node {
            return Err(GraphError::SelfLoop);
        }
        // A value has exactly one producer; Exec fan-in is fine.
        if target_port.data_type != DataType::Exec
            && self
                .connections
                .values()
                .any(|c| c.to_port == connection.to_port)
        {
            return Err(GraphError::InputAlreadyConnected(connection.to_port));
        }

        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// All connections, in declaration order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Connections leaving a specific port, in declaration order
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_port == port_id)
    }

    /// The connection feeding a specific input port, if any
    pub fn connection_to(&self, port_id: PortId) -> Option<&Connection> {
        self.connections.values().find(|c| c.to_port == port_id)
    }

    /// Connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The unique entry node of this graph.
    ///
    /// A graph with zero or more than one entry node fails validation
    /// before any tick runs.
    pub fn entry_node(&self) -> Result<NodeId, ValidationError> {
        let mut entries = self
            .nodes
            .values()
            .filter(|n| matches!(n.kind.descriptor().role, Role::Entry));
        let first = entries.next();
        let extra = entries.count();
        match (first, extra) {
            (Some(node), 0) => Ok(node.id),
            (None, _) => Err(ValidationError::NoEntryNode {
                graph: self.name.clone(),
            }),
            (Some(_), n) => Err(ValidationError::MultipleEntryNodes {
                graph: self.name.clone(),
                count: n + 1,
            }),
        }
    }

    /// Event-source nodes of a given kind, in declaration order
    pub fn event_nodes(
        &self,
        event: crate::registry::EventKind,
    ) -> impl Iterator<Item = &Node> + '_ {
        self.nodes
            .values()
            .filter(move |n| n.kind.descriptor().role == Role::Event(event))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// A project: metadata plus a collection of graphs, one of which is the
/// designated start graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub name: String,
    /// Display size in character cells (columns, rows)
    pub display_size: [u32; 2],
    /// The graph executed at engine start
    pub start_graph: Option<GraphId>,
    graphs: IndexMap<GraphId, Graph>,
}

impl Project {
    /// Create a new empty project
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_size: [80, 25],
            start_graph: None,
            graphs: IndexMap::new(),
        }
    }

    /// Add a graph. The first graph added becomes the start graph.
    pub fn add_graph(&mut self, graph: Graph) -> GraphId {
        let id = graph.id;
        self.graphs.insert(id, graph);
        if self.start_graph.is_none() {
            self.start_graph = Some(id);
        }
        id
    }

    /// Remove a graph
    pub fn remove_graph(&mut self, graph_id: GraphId) -> Option<Graph> {
        if self.start_graph == Some(graph_id) {
            self.start_graph = None;
        }
        self.graphs.shift_remove(&graph_id)
    }

    /// Get a graph by ID
    pub fn graph(&self, graph_id: GraphId) -> Option<&Graph> {
        self.graphs.get(&graph_id)
    }

    /// Get a mutable graph by ID
    pub fn graph_mut(&mut self, graph_id: GraphId) -> Option<&mut Graph> {
        self.graphs.get_mut(&graph_id)
    }

    /// Find a graph by name
    pub fn graph_named(&self, name: &str) -> Option<&Graph> {
        self.graphs.values().find(|g| g.name == name)
    }

    /// All graphs, in declaration order
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    /// Number of graphs
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Validate the project: a start graph is designated and exists, and
    /// every graph has exactly one entry node.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let start = self.start_graph.ok_or(ValidationError::NoStartGraph)?;
        if !self.graphs.contains_key(&start) {
            return Err(ValidationError::StartGraphMissing);
        }
        for graph in self.graphs.values() {
            graph.entry_node()?;
        }
        Ok(())
    }
}

/// Error when building a connection. Surfaced to the editor; a running
/// graph never sees these.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Endpoint node does not exist
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Endpoint port does not exist
    #[error("port not found: {0:?}")]
    PortNotFound(PortId),

    /// Connection source is not an output port
    #[error("source port is not an output: {0:?}")]
    NotAnOutput(PortId),

    /// Connection target is not an input port
    #[error("target port is not an input: {0:?}")]
    NotAnInput(PortId),

    /// Port data types are incompatible
    #[error("incompatible port types: {from:?} -> {to:?}")]
    IncompatibleTypes {
        /// Source port type
        from: DataType,
        /// Target port type
        to: DataType,
    },

    /// Non-Exec input already has a producer
    #[error("input already connected: {0:?}")]
    InputAlreadyConnected(PortId),

    /// Self-loop not allowed
    #[error("self-loop not allowed")]
    SelfLoop,
}

/// Error when validating a project before execution
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Graph has no entry node
    #[error("graph '{graph}' has no entry node")]
    NoEntryNode {
        /// Offending graph name
        graph: String,
    },

    /// Graph has more than one entry node
    #[error("graph '{graph}' has {count} entry nodes, expected exactly one")]
    MultipleEntryNodes {
        /// Offending graph name
        graph: String,
        /// Number of entry nodes found
        count: usize,
    },

    /// Project has no designated start graph
    #[error("project has no designated start graph")]
    NoStartGraph,

    /// Designated start graph is not in the project
    #[error("designated start graph is not in the project")]
    StartGraphMissing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeKind;

    fn port_id(node: &Node, name: &str, dir: PortDirection) -> PortId {
        match dir {
            PortDirection::Input => node.input_named(name).unwrap().id,
            PortDirection::Output => node.output_named(name).unwrap().id,
        }
    }

    #[test]
    fn connect_validates_types() {
        let mut graph = Graph::new("test");
        let a = Node::new(NodeKind::IntValue);
        let b = Node::new(NodeKind::Not);
        let a_out = port_id(&a, "Value", PortDirection::Output);
        let b_in = port_id(&b, "Value", PortDirection::Input);
        let (a, b) = (graph.add_node(a), graph.add_node(b));

        // Int output into Bool input is rejected
        let err = graph.connect(a, a_out, b, b_in).unwrap_err();
        assert!(matches!(err, GraphError::IncompatibleTypes { .. }));
    }

    #[test]
    fn int_does_not_widen_to_float() {
        let mut graph = Graph::new("test");
        let a = Node::new(NodeKind::IntValue);
        let b = Node::new(NodeKind::FloatToInt);
        let a_out = port_id(&a, "Value", PortDirection::Output);
        let b_in = port_id(&b, "Value", PortDirection::Input);
        let (a, b) = (graph.add_node(a), graph.add_node(b));

        assert!(graph.connect(a, a_out, b, b_in).is_err());
    }

    #[test]
    fn value_input_has_a_single_producer() {
        let mut graph = Graph::new("test");
        let a = Node::new(NodeKind::IntValue);
        let b = Node::new(NodeKind::IntValue);
        let c = Node::new(NodeKind::Negate);
        let a_out = port_id(&a, "Value", PortDirection::Output);
        let b_out = port_id(&b, "Value", PortDirection::Output);
        let c_in = port_id(&c, "Value", PortDirection::Input);
        let (a, b, c) = (graph.add_node(a), graph.add_node(b), graph.add_node(c));

        graph.connect(a, a_out, c, c_in).unwrap();
        let err = graph.connect(b, b_out, c, c_in).unwrap_err();
        assert!(matches!(err, GraphError::InputAlreadyConnected(_)));
    }

    #[test]
    fn exec_input_accepts_fan_in() {
        let mut graph = Graph::new("test");
        let start = Node::new(NodeKind::Start);
        let tick = Node::new(NodeKind::OnTick);
        let log = Node::new(NodeKind::PrintLog);
        let s_out = port_id(&start, "Then", PortDirection::Output);
        let t_out = port_id(&tick, "Then", PortDirection::Output);
        let l_in = port_id(&log, "In", PortDirection::Input);
        let (s, t, l) = (
            graph.add_node(start),
            graph.add_node(tick),
            graph.add_node(log),
        );

        graph.connect(s, s_out, l, l_in).unwrap();
        graph.connect(t, t_out, l, l_in).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn value_output_fans_out() {
        let mut graph = Graph::new("test");
        let a = Node::new(NodeKind::IntValue);
        let b = Node::new(NodeKind::Negate);
        let c = Node::new(NodeKind::Abs);
        let a_out = port_id(&a, "Value", PortDirection::Output);
        let b_in = port_id(&b, "Value", PortDirection::Input);
        let c_in = port_id(&c, "Value", PortDirection::Input);
        let (a, b, c) = (graph.add_node(a), graph.add_node(b), graph.add_node(c));

        graph.connect(a, a_out, b, b_in).unwrap();
        graph.connect(a, a_out, c, c_in).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn entry_node_invariant() {
        let mut graph = Graph::new("test");
        assert!(matches!(
            graph.entry_node(),
            Err(ValidationError::NoEntryNode { .. })
        ));

        let start = graph.add_node(Node::new(NodeKind::Start));
        assert_eq!(graph.entry_node().unwrap(), start);

        graph.add_node(Node::new(NodeKind::CustomProcgenStart));
        assert!(matches!(
            graph.entry_node(),
            Err(ValidationError::MultipleEntryNodes { count: 2, .. })
        ));
    }

    #[test]
    fn project_validation_requires_start_graph() {
        let mut project = Project::new("demo");
        assert!(matches!(
            project.validate(),
            Err(ValidationError::NoStartGraph)
        ));

        let mut graph = Graph::new("main");
        graph.add_node(Node::new(NodeKind::Start));
        project.add_graph(graph);
        project.validate().unwrap();
    }

    #[test]
    fn remove_node_drops_its_connections() {
        let mut graph = Graph::new("test");
        let start = Node::new(NodeKind::Start);
        let log = Node::new(NodeKind::PrintLog);
        let s_out = port_id(&start, "Then", PortDirection::Output);
        let l_in = port_id(&log, "In", PortDirection::Input);
        let (s, l) = (graph.add_node(start), graph.add_node(log));

        graph.connect(s, s_out, l, l_in).unwrap();
        graph.remove_node(l);
        assert_eq!(graph.connection_count(), 0);
    }
}
