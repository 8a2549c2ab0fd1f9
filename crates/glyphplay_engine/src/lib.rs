// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tick-driven execution engine for GlyphPlay script graphs.
//!
//! The engine owns all runtime state for one running project: the entity
//! world, the map arena, variables, timers, dialogue, factions and the
//! seeded RNG stream. Hosts drive it through a small surface: build an
//! [`Engine`] from a validated [`Project`](glyphplay_graph::Project),
//! call [`Engine::start`] once, then [`Engine::tick`] repeatedly,
//! injecting [`InputEvent`]s between ticks and rendering each
//! [`ExecutionResult`].
//!
//! Scripts degrade rather than fail: division by zero reads as zero,
//! missing named resources log a warning once, out-of-range map access
//! is clamped. The only hard errors are project validation before the
//! first tick and save-slot codec failures.

mod engine;
mod events;
mod handlers;
mod result;
mod save;
mod session;
mod state;
mod value;
mod world;

pub use engine::Engine;
pub use events::InputEvent;
pub use result::{EntitySnapshot, ExecutionResult};
pub use save::{SaveError, SaveGame, SAVE_FORMAT_VERSION};
pub use session::{
    IncomingMessage, LoopbackSession, MessageScope, NullSession, OutgoingMessage, SessionLink,
    TransportFault,
};
pub use state::OverworldState;
pub use value::{EntityId, MapId, SceneNodeId, Value};
pub use world::{Entity, FactionTable, World};
