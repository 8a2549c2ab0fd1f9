// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hand-authored room templates.
//!
//! A template is a rectangular text block: `#` is wall, `.` is floor, and
//! a space is transparent (no write). Stamping writes only the opaque
//! cells, so later placements overwrite earlier ones cell by cell.

use crate::map::{GameMap, Tile};
use serde::{Deserialize, Serialize};

/// A named rectangular ASCII pattern for stamping onto a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    rows: Vec<Vec<Option<Tile>>>,
    width: u32,
}

impl RoomTemplate {
    /// Parse a template from its text layout. Short rows are padded with
    /// transparent cells; unknown characters read as transparent.
    pub fn parse(layout: &str) -> Self {
        let rows: Vec<Vec<Option<Tile>>> = layout
            .lines()
            .map(|line| {
                line.chars()
                    .map(|c| match c {
                        '#' => Some(Tile::Wall),
                        '.' => Some(Tile::Floor),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        Self { rows, width }
    }

    /// Template width in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Template height in cells
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Stamp the template onto `map` with its top-left corner at
    /// `(x, y)`. Transparent cells leave the map untouched; cells falling
    /// outside the map are silently skipped.
    pub fn stamp(&self, map: &mut GameMap, x: i32, y: i32) {
        for (dy, row) in self.rows.iter().enumerate() {
            for (dx, cell) in row.iter().enumerate() {
                if let Some(tile) = cell {
                    map.set(x + dx as i32, y + dy as i32, *tile);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_measures_the_block() {
        let t = RoomTemplate::parse("###\n#.#\n###");
        assert_eq!(t.width(), 3);
        assert_eq!(t.height(), 3);
    }

    #[test]
    fn stamp_writes_opaque_cells_only() {
        let mut map = GameMap::new(5, 5, Tile::Floor);
        let t = RoomTemplate::parse("# #\n...");
        t.stamp(&mut map, 1, 1);

        assert_eq!(map.get(1, 1), Tile::Wall);
        assert_eq!(map.get(2, 1), Tile::Floor); // transparent, untouched
        assert_eq!(map.get(3, 1), Tile::Wall);
        assert_eq!(map.get(1, 2), Tile::Floor);
    }

    #[test]
    fn later_stamps_overwrite_earlier_ones() {
        let mut map = GameMap::new(4, 4, Tile::Floor);
        RoomTemplate::parse("##\n##").stamp(&mut map, 0, 0);
        RoomTemplate::parse("..").stamp(&mut map, 0, 0);
        assert_eq!(map.get(0, 0), Tile::Floor);
        assert_eq!(map.get(1, 0), Tile::Floor);
        assert_eq!(map.get(0, 1), Tile::Wall);
    }

    #[test]
    fn stamp_clips_at_map_edge() {
        let mut map = GameMap::new(3, 3, Tile::Floor);
        RoomTemplate::parse("###\n###").stamp(&mut map, 2, 2);
        assert_eq!(map.get(2, 2), Tile::Wall);
        // Everything past the edge was skipped without panicking
        assert_eq!(map.get(0, 0), Tile::Floor);
    }
}
