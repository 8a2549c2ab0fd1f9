// SPDX-License-Identifier: MIT OR Apache-2.0
//! The tile grid the generators carve into.

use serde::{Deserialize, Serialize};

/// One map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Impassable wall
    Wall,
    /// Walkable floor
    Floor,
}

impl Tile {
    /// ASCII glyph for this tile
    pub fn glyph(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '.',
        }
    }

    /// Parse a tile name ("Wall"/"Floor", case-insensitive). Anything
    /// unrecognized reads as wall.
    pub fn parse(name: &str) -> Tile {
        if name.eq_ignore_ascii_case("floor") || name == "." {
            Tile::Floor
        } else {
            Tile::Wall
        }
    }
}

/// A rectangular ASCII game map.
///
/// All cell accessors take signed coordinates and silently clamp or no-op
/// outside the grid; a script poking past the border degrades instead of
/// failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    glyphs: Vec<Option<char>>,
}

impl GameMap {
    /// Create a map filled with `fill`
    pub fn new(width: u32, height: u32, fill: Tile) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            tiles: vec![fill; len],
            glyphs: vec![None; len],
        }
    }

    /// Map width in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in cells
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a coordinate is inside the grid
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Whether a coordinate is on the outer border
    pub fn on_border(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y)
            && (x == 0
                || y == 0
                || x as u32 == self.width.saturating_sub(1)
                || y as u32 == self.height.saturating_sub(1))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    /// Read a cell. Out of bounds reads as wall.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::Wall, |i| self.tiles[i])
    }

    /// Write a cell. Out of bounds is a no-op.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    /// Override the rendered glyph for a cell. Out of bounds is a no-op.
    pub fn set_glyph(&mut self, x: i32, y: i32, glyph: char) {
        if let Some(i) = self.index(x, y) {
            self.glyphs[i] = Some(glyph);
        }
    }

    /// The rendered glyph for a cell: the override if set, else the tile
    pub fn glyph_at(&self, x: i32, y: i32) -> char {
        self.index(x, y)
            .and_then(|i| self.glyphs[i])
            .unwrap_or_else(|| self.get(x, y).glyph())
    }

    /// Fill a rectangular region, clamped to the grid
    pub fn fill_region(&mut self, x: i32, y: i32, width: i32, height: i32, tile: Tile) {
        for cy in y..y.saturating_add(height.max(0)) {
            for cx in x..x.saturating_add(width.max(0)) {
                self.set(cx, cy, tile);
            }
        }
    }

    /// Fill every cell
    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// Set every border cell to wall
    pub fn wall_border(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.set(x, 0, Tile::Wall);
            self.set(x, h - 1, Tile::Wall);
        }
        for y in 0..h {
            self.set(0, y, Tile::Wall);
            self.set(w - 1, y, Tile::Wall);
        }
    }

    /// Count wall cells in the 8-neighborhood of a cell. Cells beyond the
    /// grid count as wall.
    pub fn wall_neighbors(&self, x: i32, y: i32) -> u32 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) == (0, 0) {
                    continue;
                }
                if self.get(x + dx, y + dy) == Tile::Wall {
                    count += 1;
                }
            }
        }
        count
    }

    /// Floor cells in row-major order
    pub fn floor_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let w = self.width as i32;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Tile::Floor)
            .map(move |(i, _)| ((i as i32) % w, (i as i32) / w))
    }

    /// Render the map to newline-separated rows of glyphs
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                out.push(self.glyph_at(x, y));
            }
            if y + 1 < self.height as i32 {
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_access_degrades() {
        let mut map = GameMap::new(4, 3, Tile::Floor);
        assert_eq!(map.get(-1, 0), Tile::Wall);
        assert_eq!(map.get(4, 0), Tile::Wall);
        map.set(99, 99, Tile::Floor); // no-op, no panic
        assert_eq!(map.get(99, 99), Tile::Wall);
    }

    #[test]
    fn fill_region_clamps_to_grid() {
        let mut map = GameMap::new(5, 5, Tile::Floor);
        map.fill_region(3, 3, 10, 10, Tile::Wall);
        assert_eq!(map.get(3, 3), Tile::Wall);
        assert_eq!(map.get(4, 4), Tile::Wall);
        assert_eq!(map.get(2, 2), Tile::Floor);
    }

    #[test]
    fn render_shows_glyph_overrides() {
        let mut map = GameMap::new(3, 1, Tile::Floor);
        map.set_glyph(1, 0, '@');
        assert_eq!(map.render(), ".@.");
    }

    #[test]
    fn border_walls() {
        let mut map = GameMap::new(4, 4, Tile::Floor);
        map.wall_border();
        assert_eq!(map.get(0, 0), Tile::Wall);
        assert_eq!(map.get(3, 2), Tile::Wall);
        assert_eq!(map.get(1, 1), Tile::Floor);
    }

    #[test]
    fn neighbor_counting_treats_outside_as_wall() {
        let map = GameMap::new(3, 3, Tile::Floor);
        // Corner cell: 5 of its 8 neighbors are off-grid
        assert_eq!(map.wall_neighbors(0, 0), 5);
        assert_eq!(map.wall_neighbors(1, 1), 0);
    }
}
