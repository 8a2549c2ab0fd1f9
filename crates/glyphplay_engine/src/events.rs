// SPDX-License-Identifier: MIT OR Apache-2.0
//! External event injections and internal signals.

use crate::session::IncomingMessage;
use crate::value::EntityId;

/// An event the host injects between ticks
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key was pressed, by key identifier
    KeyPress(String),
    /// An entity stepped onto a cell
    EntityEnterTile {
        /// The entity that moved
        entity: EntityId,
        /// Cell x
        x: i32,
        /// Cell y
        y: i32,
    },
}

/// A signal that fires event-source nodes. Host injections become
/// signals, and handlers queue more of them mid-tick (deaths, battle
/// end, save completions); all are drained in FIFO order within the
/// tick.
#[derive(Debug, Clone)]
pub(crate) enum Signal {
    Key(String),
    EnterTile(EntityId, i32, i32),
    PlayerDeath(EntityId),
    TimerTimeout(String),
    Message(IncomingMessage),
    SaveCompleted {
        slot: String,
        op: &'static str,
        ok: bool,
    },
    BattleEnded {
        winner: EntityId,
    },
}
