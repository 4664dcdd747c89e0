//! Breadth-first path planner over the tile grid.

use std::collections::VecDeque;

use battlepath_core::{Field, Pathplanner, TileIndex, Vector2D};

use crate::field::TileField;

/// Fraction of a tile length between line-of-sight samples.
const SIGHT_SAMPLES_PER_TILE: f32 = 8.0;

/// Planner that floods distances from the goal tile and walks the gradient back.
///
/// The resulting tile-centre route is shortened by dropping every waypoint
/// that can be skipped with an unobstructed straight line, so open terrain
/// yields a single waypoint at the goal.
#[derive(Clone, Debug)]
pub struct GridPlanner {
    field: TileField,
}

impl GridPlanner {
    /// Captures the traversability of the provided field.
    #[must_use]
    pub fn new(field: &TileField) -> Self {
        Self {
            field: field.clone(),
        }
    }

    fn is_blocked(&self, tile: TileIndex) -> bool {
        self.field
            .value(tile)
            .map_or(true, |value| !value.is_traversable())
    }

    fn distances_from(&self, goal: TileIndex) -> Vec<u32> {
        let width = usize::try_from(self.field.columns()).unwrap_or(0);
        let height = usize::try_from(self.field.rows()).unwrap_or(0);
        let mut distances = vec![u32::MAX; width.saturating_mul(height)];

        let Some(goal_index) = index(width, goal) else {
            return distances;
        };
        distances[goal_index] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(goal);

        while let Some(tile) = queue.pop_front() {
            let Some(current_index) = index(width, tile) else {
                continue;
            };
            let next_distance = distances[current_index].saturating_add(1);

            for neighbor in neighbors(tile, self.field.columns(), self.field.rows()) {
                if self.is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = index(width, neighbor) else {
                    continue;
                };
                if distances[neighbor_index] <= next_distance {
                    continue;
                }
                distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        distances
    }

    fn descend(&self, start: TileIndex, distances: &[u32]) -> Option<Vec<TileIndex>> {
        let width = usize::try_from(self.field.columns()).ok()?;
        let mut current = start;
        let mut current_distance = distances.get(index(width, start)?).copied()?;
        if current_distance == u32::MAX {
            return None;
        }

        let mut route = Vec::new();
        while current_distance > 0 {
            let next = neighbors(current, self.field.columns(), self.field.rows())
                .filter_map(|neighbor| {
                    let distance = distances.get(index(width, neighbor)?).copied()?;
                    (distance < current_distance).then_some((distance, neighbor))
                })
                .min()?;
            current_distance = next.0;
            current = next.1;
            route.push(current);
        }

        Some(route)
    }

    fn line_of_sight(&self, from: Vector2D, to: Vector2D) -> bool {
        let length = from.distance(to);
        let step = self.field.tile_length() / SIGHT_SAMPLES_PER_TILE;
        if step <= 0.0 {
            return false;
        }

        let samples = (length / step).ceil() as u32;
        (0..=samples).all(|sample| {
            let t = if samples == 0 {
                1.0
            } else {
                sample as f32 / samples as f32
            };
            self.field.is_traversable(from.lerp(to, t))
        })
    }

    fn shorten(&self, start: Vector2D, route: Vec<Vector2D>) -> Vec<Vector2D> {
        let mut shortened = Vec::with_capacity(route.len());
        let mut anchor = start;
        let mut cursor = 0;

        while cursor < route.len() {
            let mut furthest = cursor;
            for candidate in (cursor..route.len()).rev() {
                if self.line_of_sight(anchor, route[candidate]) {
                    furthest = candidate;
                    break;
                }
            }
            anchor = route[furthest];
            shortened.push(anchor);
            cursor = furthest + 1;
        }

        shortened
    }
}

impl Pathplanner for GridPlanner {
    fn plan(&self, start: Vector2D, goal: Vector2D) -> Vec<Vector2D> {
        let (Some(start_tile), Some(goal_tile)) = (
            self.field.tile_index_at(start),
            self.field.tile_index_at(goal),
        ) else {
            return Vec::new();
        };
        if self.is_blocked(goal_tile) {
            return Vec::new();
        }

        let distances = self.distances_from(goal_tile);
        let Some(tiles) = self.descend(start_tile, &distances) else {
            return Vec::new();
        };

        let mut route: Vec<Vector2D> = tiles
            .into_iter()
            .map(|tile| self.field.tile_center(tile))
            .collect();
        match route.last_mut() {
            Some(last) => *last = goal,
            None => route.push(goal),
        }

        self.shorten(start, route)
    }
}

fn neighbors(tile: TileIndex, columns: u32, rows: u32) -> impl Iterator<Item = TileIndex> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = tile.row().checked_sub(1) {
        candidates[count] = Some(TileIndex::new(tile.column(), row));
        count += 1;
    }

    if let Some(column) = tile.column().checked_add(1) {
        if column < columns {
            candidates[count] = Some(TileIndex::new(column, tile.row()));
            count += 1;
        }
    }

    if let Some(row) = tile.row().checked_add(1) {
        if row < rows {
            candidates[count] = Some(TileIndex::new(tile.column(), row));
            count += 1;
        }
    }

    if let Some(column) = tile.column().checked_sub(1) {
        candidates[count] = Some(TileIndex::new(column, tile.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, tile: TileIndex) -> Option<usize> {
    let column = usize::try_from(tile.column()).ok()?;
    let row = usize::try_from(tile.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MapLayout;
    use battlepath_core::TileValue;

    #[test]
    fn open_terrain_yields_single_waypoint() {
        let planner = GridPlanner::new(&TileField::open(16, 4, 1.0));

        let path = planner.plan(Vector2D::new(0.0, 0.0), Vector2D::new(10.0, 0.0));

        assert_eq!(path, vec![Vector2D::new(10.0, 0.0)]);
    }

    #[test]
    fn same_tile_goal_is_reached_directly() {
        let planner = GridPlanner::new(&TileField::open(4, 4, 1.0));
        let goal = Vector2D::new(1.8, 1.2);

        assert_eq!(planner.plan(Vector2D::new(1.1, 1.1), goal), vec![goal]);
    }

    #[test]
    fn route_bends_around_walls() {
        let layout = MapLayout::parse(
            "\
.....
.###.
.....
",
            1.0,
        )
        .expect("map parses");
        let planner = GridPlanner::new(&layout.field);
        let start = Vector2D::new(2.5, 0.5);
        let goal = Vector2D::new(2.5, 2.5);

        let path = planner.plan(start, goal);

        assert!(path.len() >= 2, "expected a detour, got {path:?}");
        assert_eq!(path.last().copied(), Some(goal));
        let mut previous = start;
        for waypoint in &path {
            assert!(planner.line_of_sight(previous, *waypoint));
            previous = *waypoint;
        }
    }

    #[test]
    fn unreachable_or_blocked_goals_yield_empty_plans() {
        let layout = MapLayout::parse(
            "\
..#..
..#..
",
            1.0,
        )
        .expect("map parses");
        let planner = GridPlanner::new(&layout.field);

        assert!(planner
            .plan(Vector2D::new(0.5, 0.5), Vector2D::new(4.5, 0.5))
            .is_empty());
        assert!(planner
            .plan(Vector2D::new(0.5, 0.5), Vector2D::new(2.5, 0.5))
            .is_empty());
        assert!(planner
            .plan(Vector2D::new(0.5, 0.5), Vector2D::new(40.0, 0.5))
            .is_empty());
    }

    #[test]
    fn distances_respect_walls() {
        let mut field = TileField::open(3, 4, 1.0);
        let wall = TileIndex::new(1, 1);
        field.set(wall, TileValue::WALL);
        let planner = GridPlanner::new(&field);

        let distances = planner.distances_from(TileIndex::new(1, 2));

        assert_eq!(distances[index(3, TileIndex::new(1, 2)).unwrap_or(0)], 0);
        assert_eq!(distances[index(3, wall).unwrap_or(0)], u32::MAX);
        assert_eq!(distances[index(3, TileIndex::new(1, 0)).unwrap_or(0)], 4);
        assert_eq!(distances[index(3, TileIndex::new(0, 1)).unwrap_or(0)], 2);
    }
}
