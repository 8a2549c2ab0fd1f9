// SPDX-License-Identifier: MIT OR Apache-2.0
//! Script graph model for `GlyphPlay`.
//!
//! This crate provides the data model behind the visual scripting system:
//! - Typed input/output ports with an `Exec` control-flow type
//! - Graphs of nodes and validated connections
//! - A closed registry of node kinds with per-kind port templates
//! - A JSON persistence codec with exact identity round-trips
//!
//! ## Architecture
//!
//! A [`Project`] holds one or more [`Graph`]s; each graph holds [`Node`]s
//! and [`Connection`]s. Control flow and data flow share one identity
//! space: `Exec`-typed ports carry activation, every other [`DataType`]
//! carries a value. The execution engine lives in `glyphplay_engine` and
//! consumes this model read-only.

pub mod connection;
pub mod document;
pub mod graph;
pub mod node;
pub mod port;
pub mod registry;

pub use connection::{Connection, ConnectionId};
pub use document::{decode, encode, DocumentError};
pub use graph::{Graph, GraphError, GraphId, Project, ValidationError};
pub use node::{Node, NodeId};
pub use port::{DataType, Port, PortDirection, PortId};
pub use registry::{EventKind, Invocation, NodeCategory, NodeDescriptor, NodeKind, PortSpec, Role};
