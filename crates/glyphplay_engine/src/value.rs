// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime values flowing through data ports.

use glyphplay_graph::DataType;
use serde::{Deserialize, Serialize};

/// Handle to a live entity. Id `0` is the null entity and never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null entity handle
    pub const NONE: EntityId = EntityId(0);
}

/// Handle to a map in the engine's map arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapId(pub u64);

/// Handle to a scene tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneNodeId(pub u64);

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Boolean
    Bool(bool),
    /// Map cell coordinate
    Cell(i32, i32),
    /// Entity handle
    Entity(EntityId),
    /// Map handle
    Map(MapId),
    /// Overworld location, by name
    Location(String),
    /// Overworld, by name
    Overworld(String),
    /// The multiplayer session
    Session,
    /// Scene tree node handle
    SceneNode(SceneNodeId),
}

impl Value {
    /// The zero value for a data type, used when an input is unwired and
    /// has no usable default.
    pub fn zero(data_type: DataType) -> Value {
        match data_type {
            DataType::Float => Value::Float(0.0),
            DataType::String => Value::Str(String::new()),
            DataType::Bool => Value::Bool(false),
            DataType::Cell => Value::Cell(0, 0),
            DataType::Entity => Value::Entity(EntityId::NONE),
            DataType::Map => Value::Map(MapId(0)),
            DataType::Location => Value::Location(String::new()),
            DataType::Overworld => Value::Overworld(String::new()),
            DataType::Session => Value::Session,
            DataType::SceneNode => Value::SceneNode(SceneNodeId(0)),
            // Int, Any, Exec (never resolved as data)
            _ => Value::Int(0),
        }
    }

    /// Parse a string-encoded property into a typed value. Numeric parse
    /// failures yield the type's zero value.
    pub fn parse(data_type: DataType, text: &str) -> Value {
        let text = text.trim();
        match data_type {
            DataType::Int => Value::Int(text.parse().unwrap_or(0)),
            DataType::Float => Value::Float(text.parse().unwrap_or(0.0)),
            DataType::Bool => Value::Bool(matches!(text, "true" | "True" | "1")),
            DataType::Cell => {
                let mut parts = text.split(',').map(|p| p.trim().parse::<i32>());
                match (parts.next(), parts.next()) {
                    (Some(Ok(x)), Some(Ok(y))) => Value::Cell(x, y),
                    _ => Value::Cell(0, 0),
                }
            }
            DataType::Entity => Value::Entity(EntityId(text.parse().unwrap_or(0))),
            DataType::Location => Value::Location(text.to_owned()),
            DataType::Overworld => Value::Overworld(text.to_owned()),
            DataType::String | DataType::Any => Value::Str(text.to_owned()),
            _ => Value::zero(data_type),
        }
    }

    /// Integer view of the value
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::Float(v) => *v as i64,
            Value::Bool(v) => i64::from(*v),
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Float view of the value
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
            Value::Bool(v) => f64::from(u8::from(*v)),
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Boolean view of the value
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Entity(e) => *e != EntityId::NONE,
            _ => false,
        }
    }

    /// String view of the value
    pub fn as_str(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Cell(x, y) => format!("{x},{y}"),
            Value::Entity(e) => e.0.to_string(),
            Value::Map(m) => m.0.to_string(),
            Value::Location(n) | Value::Overworld(n) => n.clone(),
            Value::Session => "session".to_owned(),
            Value::SceneNode(n) => n.0.to_string(),
        }
    }

    /// Cell view of the value
    pub fn as_cell(&self) -> (i32, i32) {
        match self {
            Value::Cell(x, y) => (*x, *y),
            _ => (0, 0),
        }
    }

    /// Entity handle, if this value carries one
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Value::Entity(e) if *e != EntityId::NONE => Some(*e),
            _ => None,
        }
    }

    /// Map handle, if this value carries one
    pub fn as_map(&self) -> Option<MapId> {
        match self {
            Value::Map(m) if m.0 != 0 => Some(*m),
            _ => None,
        }
    }

    /// Scene node handle, if this value carries one
    pub fn as_scene_node(&self) -> Option<SceneNodeId> {
        match self {
            Value::SceneNode(n) => Some(*n),
            _ => None,
        }
    }

    /// Loose equality: numeric kinds compare numerically, everything else
    /// by string form. Used by `Equals`/`Compare` which accept `Any`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(_) | Value::Float(_) | Value::Bool(_), Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
                self.as_float() == other.as_float()
            }
            _ => self.as_str() == other.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_parse_failure_defaults_to_zero() {
        assert_eq!(Value::parse(DataType::Int, "banana"), Value::Int(0));
        assert_eq!(Value::parse(DataType::Float, ""), Value::Float(0.0));
        assert_eq!(Value::parse(DataType::Cell, "3;4"), Value::Cell(0, 0));
    }

    #[test]
    fn parse_round_trips_simple_values() {
        assert_eq!(Value::parse(DataType::Int, " 42 "), Value::Int(42));
        assert_eq!(Value::parse(DataType::Bool, "true"), Value::Bool(true));
        assert_eq!(Value::parse(DataType::Cell, "3, 4"), Value::Cell(3, 4));
    }

    #[test]
    fn loose_equality_bridges_numeric_kinds() {
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(Value::Int(1).loose_eq(&Value::Bool(true)));
        assert!(Value::Str("7".into()).loose_eq(&Value::Int(7)));
        assert!(!Value::Int(2).loose_eq(&Value::Int(3)));
    }
}
