// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cellular-automata cave generation.

use crate::map::{GameMap, Tile};
use rand::Rng;

/// Wall count in the 8-neighborhood above which a cell solidifies.
const MAJORITY: u32 = 4;

/// Carve a cave into `map`.
///
/// The interior is seeded with walls at probability `fill_ratio` (the rest
/// floor), then smoothed for `iterations` passes: a cell becomes wall when
/// more than [`MAJORITY`] of its 8 neighbors are wall, else floor. Border
/// cells are always wall. `fill_ratio = 0.0` with zero iterations yields an
/// all-floor interior.
pub fn carve_cave(map: &mut GameMap, fill_ratio: f64, iterations: u32, rng: &mut impl Rng) {
    let (w, h) = (map.width() as i32, map.height() as i32);

    for y in 0..h {
        for x in 0..w {
            let tile = if fill_ratio > 0.0 && rng.gen_bool(fill_ratio.min(1.0)) {
                Tile::Wall
            } else {
                Tile::Floor
            };
            map.set(x, y, tile);
        }
    }
    map.wall_border();

    for _ in 0..iterations {
        let prev = map.clone();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let tile = if prev.wall_neighbors(x, y) > MAJORITY {
                    Tile::Wall
                } else {
                    Tile::Floor
                };
                map.set(x, y, tile);
            }
        }
        map.wall_border();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_fill_zero_iterations_is_open_room() {
        let mut map = GameMap::new(10, 5, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(1);
        carve_cave(&mut map, 0.0, 0, &mut rng);

        for y in 0..5 {
            for x in 0..10 {
                let expected = if map.on_border(x, y) {
                    Tile::Wall
                } else {
                    Tile::Floor
                };
                assert_eq!(map.get(x, y), expected, "at ({x},{y})");
            }
        }
    }

    #[test]
    fn border_survives_smoothing() {
        let mut map = GameMap::new(20, 12, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(7);
        carve_cave(&mut map, 0.45, 5, &mut rng);

        for x in 0..20 {
            assert_eq!(map.get(x, 0), Tile::Wall);
            assert_eq!(map.get(x, 11), Tile::Wall);
        }
        for y in 0..12 {
            assert_eq!(map.get(0, y), Tile::Wall);
            assert_eq!(map.get(19, y), Tile::Wall);
        }
    }

    #[test]
    fn same_seed_same_cave() {
        let mut a = GameMap::new(30, 15, Tile::Wall);
        let mut b = GameMap::new(30, 15, Tile::Wall);
        carve_cave(&mut a, 0.45, 4, &mut StdRng::seed_from_u64(99));
        carve_cave(&mut b, 0.45, 4, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn full_fill_is_solid() {
        let mut map = GameMap::new(8, 8, Tile::Floor);
        let mut rng = StdRng::seed_from_u64(3);
        carve_cave(&mut map, 1.0, 0, &mut rng);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(map.get(x, y), Tile::Wall);
            }
        }
    }
}
