// SPDX-License-Identifier: MIT OR Apache-2.0
//! Procedural map generation for `GlyphPlay`.
//!
//! A [`GameMap`] is a rectangular grid of wall/floor tiles with optional
//! per-cell glyph overrides. The generators all mutate a map in place and
//! draw randomness from a caller-supplied `Rng`, so the execution engine
//! can keep every roll on its single seeded stream:
//!
//! - [`carve_cave`] — cellular-automata caves
//! - [`carve_bsp_rooms`] — recursive BSP rooms and corridors
//! - [`carve_drunkard_walk`] — random-walk tunnels
//! - [`RoomTemplate`] — hand-authored rectangular stamps

pub mod bsp;
pub mod cellular;
pub mod drunkard;
pub mod map;
pub mod template;

pub use bsp::{carve_bsp_rooms, Rect};
pub use cellular::carve_cave;
pub use drunkard::carve_drunkard_walk;
pub use map::{GameMap, Tile};
pub use template::RoomTemplate;
