// SPDX-License-Identifier: MIT OR Apache-2.0
//! BSP room-and-corridor generation.

use crate::map::{GameMap, Tile};
use rand::Rng;

/// An axis-aligned rectangle in cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in cells
    pub w: i32,
    /// Height in cells
    pub h: i32,
}

impl Rect {
    /// Center cell of the rectangle
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Whether two rectangles share any cell
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Carve BSP rooms and connecting corridors into `map`.
///
/// The map rectangle is recursively partitioned until partitions can no
/// longer be split while keeping room for a `[min_room, max_room]` room
/// plus a one-cell wall margin. Each leaf gets one rectangular room;
/// sibling partitions are connected with a straight or L-shaped corridor
/// between room centers, in partition order. Returns the carved rooms.
pub fn carve_bsp_rooms(
    map: &mut GameMap,
    min_room: i32,
    max_room: i32,
    rng: &mut impl Rng,
) -> Vec<Rect> {
    let min_room = min_room.max(1);
    let max_room = max_room.max(min_room);

    map.fill(Tile::Wall);
    let region = Rect {
        x: 0,
        y: 0,
        w: map.width() as i32,
        h: map.height() as i32,
    };
    // Too small for even one room
    if region.w < min_room + 2 || region.h < min_room + 2 {
        return Vec::new();
    }

    let mut rooms = Vec::new();
    split(map, region, min_room, max_room, rng, &mut rooms);
    map.wall_border();
    rooms
}

fn split(
    map: &mut GameMap,
    region: Rect,
    min_room: i32,
    max_room: i32,
    rng: &mut impl Rng,
    rooms: &mut Vec<Rect>,
) {
    // A partition must keep both halves at least min_room + 2 cells wide
    let min_part = min_room + 2;
    let can_split_w = region.w >= 2 * min_part;
    let can_split_h = region.h >= 2 * min_part;
    let oversize = region.w > max_room + 2 || region.h > max_room + 2;

    if oversize && (can_split_w || can_split_h) {
        // Prefer cutting the longer axis
        let vertical = if can_split_w && can_split_h {
            region.w >= region.h
        } else {
            can_split_w
        };

        let (left, right) = if vertical {
            let cut = rng.gen_range(min_part..=region.w - min_part);
            (
                Rect { w: cut, ..region },
                Rect {
                    x: region.x + cut,
                    w: region.w - cut,
                    ..region
                },
            )
        } else {
            let cut = rng.gen_range(min_part..=region.h - min_part);
            (
                Rect { h: cut, ..region },
                Rect {
                    y: region.y + cut,
                    h: region.h - cut,
                    ..region
                },
            )
        };

        let before = rooms.len();
        split(map, left, min_room, max_room, rng, rooms);
        let mid = rooms.len();
        split(map, right, min_room, max_room, rng, rooms);

        // Connect the two halves through their nearest carved rooms
        if before < mid && mid < rooms.len() {
            let a = rooms[mid - 1].center();
            let b = rooms[mid].center();
            carve_corridor(map, a, b);
        }
        return;
    }

    // Leaf: carve one room inside the partition, keeping a wall margin
    let max_w = max_room.min(region.w - 2);
    let max_h = max_room.min(region.h - 2);
    let w = rng.gen_range(min_room..=max_w);
    let h = rng.gen_range(min_room..=max_h);
    let x = region.x + rng.gen_range(1..=region.w - w - 1);
    let y = region.y + rng.gen_range(1..=region.h - h - 1);

    let room = Rect { x, y, w, h };
    map.fill_region(room.x, room.y, room.w, room.h, Tile::Floor);
    rooms.push(room);
}

fn carve_corridor(map: &mut GameMap, (ax, ay): (i32, i32), (bx, by): (i32, i32)) {
    // Horizontal leg then vertical leg; degenerates to a straight line
    // when the centers share a row or column.
    for x in ax.min(bx)..=ax.max(bx) {
        map.set(x, ay, Tile::Floor);
    }
    for y in ay.min(by)..=ay.max(by) {
        map.set(bx, y, Tile::Floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rooms_are_in_range_and_disjoint() {
        for seed in 0..20 {
            let mut map = GameMap::new(60, 30, Tile::Wall);
            let mut rng = StdRng::seed_from_u64(seed);
            let rooms = carve_bsp_rooms(&mut map, 4, 10, &mut rng);

            assert!(!rooms.is_empty(), "seed {seed}");
            for room in &rooms {
                assert!((4..=10).contains(&room.w), "seed {seed}: {room:?}");
                assert!((4..=10).contains(&room.h), "seed {seed}: {room:?}");
            }
            for (i, a) in rooms.iter().enumerate() {
                for b in &rooms[i + 1..] {
                    assert!(!a.intersects(b), "seed {seed}: {a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn rooms_are_carved_to_floor() {
        let mut map = GameMap::new(40, 20, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(11);
        let rooms = carve_bsp_rooms(&mut map, 3, 8, &mut rng);
        for room in &rooms {
            for y in room.y..room.y + room.h {
                for x in room.x..room.x + room.w {
                    assert_eq!(map.get(x, y), Tile::Floor);
                }
            }
        }
    }

    #[test]
    fn border_is_wall() {
        let mut map = GameMap::new(40, 20, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(2);
        carve_bsp_rooms(&mut map, 4, 9, &mut rng);
        for x in 0..40 {
            assert_eq!(map.get(x, 0), Tile::Wall);
            assert_eq!(map.get(x, 19), Tile::Wall);
        }
    }

    #[test]
    fn undersized_map_yields_no_rooms() {
        let mut map = GameMap::new(4, 4, Tile::Wall);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(carve_bsp_rooms(&mut map, 4, 10, &mut rng).is_empty());
    }
}
