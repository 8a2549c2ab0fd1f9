// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drunkard-walk tunnel carving.

use crate::map::{GameMap, Tile};
use rand::Rng;

/// Carve a winding tunnel system by random walk.
///
/// The walker starts at the map center; for `steps` iterations it carves
/// the current cell to floor and staggers to a uniformly random orthogonal
/// neighbor, clamped to the interior so the border stays wall.
pub fn carve_drunkard_walk(map: &mut GameMap, steps: u32, rng: &mut impl Rng) {
    let (w, h) = (map.width() as i32, map.height() as i32);
    if w < 3 || h < 3 {
        return;
    }

    let mut x = w / 2;
    let mut y = h / 2;
    for _ in 0..steps {
        map.set(x, y, Tile::Floor);
        let (dx, dy) = match rng.gen_range(0..4) {
            0 => (1, 0),
            1 => (-1, 0),
            2 => (0, 1),
            _ => (0, -1),
        };
        x = (x + dx).clamp(1, w - 2);
        y = (y + dy).clamp(1, h - 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn carves_from_center_and_respects_border() {
        let mut map = GameMap::new(21, 11, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(5);
        carve_drunkard_walk(&mut map, 400, &mut rng);

        assert_eq!(map.get(10, 5), Tile::Floor);
        for x in 0..21 {
            assert_eq!(map.get(x, 0), Tile::Wall);
            assert_eq!(map.get(x, 10), Tile::Wall);
        }
        for y in 0..11 {
            assert_eq!(map.get(0, y), Tile::Wall);
            assert_eq!(map.get(20, y), Tile::Wall);
        }
    }

    #[test]
    fn zero_steps_carves_nothing() {
        let mut map = GameMap::new(9, 9, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(5);
        carve_drunkard_walk(&mut map, 0, &mut rng);
        assert!(map.floor_cells().next().is_none());
    }

    #[test]
    fn tiny_maps_are_left_alone() {
        let mut map = GameMap::new(2, 2, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(5);
        carve_drunkard_walk(&mut map, 100, &mut rng);
        assert!(map.floor_cells().next().is_none());
    }
}
