#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* route search over the tile grid.
//!
//! The search is 4-connected with a uniform step cost and a Manhattan
//! heuristic, so the first time the goal is popped from the open set the route
//! is optimal. Equal priorities are served in discovery order.

use std::{cmp::Reverse, collections::BinaryHeap};

use crop_rivals_core::{GridSize, Side, TileCoord, TileIndex};
use crop_rivals_world::{motion::Arena, tiles::TileGrid};

/// Finds the shortest route between two tiles, inclusive of both ends.
///
/// Only tiles accepted by `is_admissible` are expanded; the start tile itself
/// is never tested. Returns an empty route when either index lies outside the
/// grid or the goal cannot be reached, and `[start]` when both ends coincide.
#[must_use]
pub fn find_path<F>(
    size: GridSize,
    start: TileIndex,
    goal: TileIndex,
    mut is_admissible: F,
) -> Vec<TileIndex>
where
    F: FnMut(TileIndex) -> bool,
{
    let (Some(_), Some(goal_coord)) = (size.coord_of(start), size.coord_of(goal)) else {
        return Vec::new();
    };
    if start == goal {
        return vec![start];
    }

    let tile_count = size.tile_count();
    let mut cost = vec![u32::MAX; tile_count];
    let mut came_from: Vec<Option<TileIndex>> = vec![None; tile_count];
    let mut closed = vec![false; tile_count];
    let mut open = BinaryHeap::new();
    let mut discovered: u64 = 0;

    let heuristic = |index: TileIndex| {
        size.coord_of(index)
            .map_or(u32::MAX, |coord| coord.manhattan_distance(goal_coord))
    };

    cost[start.slot()] = 0;
    open.push(Reverse((heuristic(start), discovered, start)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == goal {
            return reconstruct(&came_from, start, goal);
        }
        if closed[current.slot()] {
            continue;
        }
        closed[current.slot()] = true;

        let Some(coord) = size.coord_of(current) else {
            continue;
        };
        let next_cost = cost[current.slot()].saturating_add(1);

        for neighbor in neighbors(coord, size) {
            let Some(index) = size.index_of(neighbor) else {
                continue;
            };
            if closed[index.slot()] || next_cost >= cost[index.slot()] {
                continue;
            }
            if !is_admissible(index) {
                continue;
            }

            cost[index.slot()] = next_cost;
            came_from[index.slot()] = Some(current);
            discovered += 1;
            open.push(Reverse((
                next_cost.saturating_add(heuristic(index)),
                discovered,
                index,
            )));
        }
    }

    Vec::new()
}

/// Builds the admissibility predicate keeping a side's routes on its own half.
///
/// A tile is admissible when it is walkable, its center lies strictly on the
/// side's half of the partition (right of the band for the AI, left of it for
/// the player), and the side's agent can stand on that center. The last check
/// keeps routes away from edge tiles narrower than the agent and from columns
/// hugging the partition, whose waypoints could never be reached.
pub fn admissible_for<'a>(
    grid: &'a TileGrid,
    arena: &'a Arena,
    side: Side,
) -> impl Fn(TileIndex) -> bool + 'a {
    let partition = arena.partition();
    move |index| {
        if !grid.is_walkable(index) {
            return false;
        }
        let Some(center) = grid.tile_center(index) else {
            return false;
        };
        let on_own_half = match side {
            Side::Player => center.x < partition.left(),
            Side::Ai => center.x > partition.right(),
        };
        on_own_half && arena.admits(side, center)
    }
}

fn reconstruct(came_from: &[Option<TileIndex>], start: TileIndex, goal: TileIndex) -> Vec<TileIndex> {
    let mut route = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(previous) = came_from.get(current.slot()).copied().flatten() else {
            return Vec::new();
        };
        route.push(previous);
        current = previous;
    }
    route.reverse();
    route
}

fn neighbors(coord: TileCoord, size: GridSize) -> impl Iterator<Item = TileCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = coord.row().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(coord.column(), row));
        count += 1;
    }

    if let Some(column) = coord.column().checked_add(1) {
        if column < size.columns() {
            candidates[count] = Some(TileCoord::new(column, coord.row()));
            count += 1;
        }
    }

    if let Some(row) = coord.row().checked_add(1) {
        if row < size.rows() {
            candidates[count] = Some(TileCoord::new(coord.column(), row));
            count += 1;
        }
    }

    if let Some(column) = coord.column().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(column, coord.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
