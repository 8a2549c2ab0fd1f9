// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type that can flow through ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Execution flow (activation, not a value)
    Exec,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// Boolean value
    Bool,
    /// Any value type (for generic nodes)
    Any,
    /// Game map reference
    Map,
    /// Map cell coordinate
    Cell,
    /// Entity reference
    Entity,
    /// Overworld location reference
    Location,
    /// Overworld reference
    Overworld,
    /// Multiplayer session reference
    Session,
    /// Scene tree node reference
    SceneNode,
}

impl DataType {
    /// All data type tags, in declaration order.
    pub const ALL: [DataType; 13] = [
        DataType::Exec,
        DataType::Int,
        DataType::Float,
        DataType::String,
        DataType::Bool,
        DataType::Any,
        DataType::Map,
        DataType::Cell,
        DataType::Entity,
        DataType::Location,
        DataType::Overworld,
        DataType::Session,
        DataType::SceneNode,
    ];

    /// Whether this type carries a value (everything except `Exec`)
    pub fn is_value(self) -> bool {
        self != DataType::Exec
    }

    /// Check if an output of this type can connect to an input of `other`.
    ///
    /// `Exec` only matches `Exec`. `Any` matches every value type in both
    /// directions. Value types otherwise match only themselves; in
    /// particular there is no implicit `Int` <-> `Float` widening.
    pub fn can_connect_to(self, other: DataType) -> bool {
        if self == DataType::Exec || other == DataType::Exec {
            return self == other;
        }
        if self == DataType::Any || other == DataType::Any {
            return true;
        }
        self == other
    }

    /// Document tag for this type
    pub fn tag(self) -> &'static str {
        match self {
            DataType::Exec => "Exec",
            DataType::Int => "Int",
            DataType::Float => "Float",
            DataType::String => "String",
            DataType::Bool => "Bool",
            DataType::Any => "Any",
            DataType::Map => "Map",
            DataType::Cell => "Cell",
            DataType::Entity => "Entity",
            DataType::Location => "Location",
            DataType::Overworld => "Overworld",
            DataType::Session => "Session",
            DataType::SceneNode => "SceneNode",
        }
    }

    /// Parse a document tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<DataType> {
        DataType::ALL.iter().copied().find(|t| t.tag() == tag)
    }
}

/// A port on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub data_type: DataType,
    /// String-encoded default, used only for unconnected data inputs
    pub default: Option<String>,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Input,
            data_type,
            default: None,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Output,
            data_type,
            default: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Rebuild a port with an explicit identity. Used by the persistence
    /// codec; editor code uses [`Port::input`]/[`Port::output`] instead.
    pub fn restore(
        id: PortId,
        name: impl Into<String>,
        direction: PortDirection,
        data_type: DataType,
        default: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            direction,
            data_type,
            default,
        }
    }

    /// Check if a connection from this port to `other` is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        self.direction == PortDirection::Output
            && other.direction == PortDirection::Input
            && self.data_type.can_connect_to(other.data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_value_type() {
        for t in DataType::ALL {
            if t.is_value() {
                assert!(DataType::Any.can_connect_to(t), "{t:?}");
                assert!(t.can_connect_to(DataType::Any), "{t:?}");
            }
        }
    }

    #[test]
    fn exec_is_disjoint_from_values() {
        assert!(DataType::Exec.can_connect_to(DataType::Exec));
        for t in DataType::ALL {
            if t.is_value() {
                assert!(!DataType::Exec.can_connect_to(t), "{t:?}");
                assert!(!t.can_connect_to(DataType::Exec), "{t:?}");
            }
        }
        // Any does not bridge into Exec either
        assert!(!DataType::Any.can_connect_to(DataType::Exec));
    }

    #[test]
    fn no_numeric_widening() {
        assert!(!DataType::Int.can_connect_to(DataType::Float));
        assert!(!DataType::Float.can_connect_to(DataType::Int));
        assert!(DataType::Int.can_connect_to(DataType::Int));
    }

    #[test]
    fn tags_round_trip() {
        for t in DataType::ALL {
            assert_eq!(DataType::from_tag(t.tag()), Some(t));
        }
        assert_eq!(DataType::from_tag("Texture"), None);
    }

    #[test]
    fn direction_gates_connections() {
        let out = Port::output("Value", DataType::Int);
        let inp = Port::input("Value", DataType::Int);
        assert!(out.can_connect(&inp));
        assert!(!inp.can_connect(&out));
        assert!(!out.can_connect(&out));
    }
}
