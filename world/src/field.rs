//! Tile grid backing collision queries and path planning.

use battlepath_core::{Field, TileIndex, TileValue, Vector2D};
use thiserror::Error;

/// Errors reported while parsing an ASCII map.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The map contained no tiles.
    #[error("map contains no tiles")]
    Empty,
    /// A row's width differed from the first row.
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character outside the map alphabet was found.
    #[error("unknown tile '{symbol}' at column {column}, row {row}")]
    UnknownTile {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Character that could not be interpreted.
        symbol: char,
    },
}

/// Dense row-major grid of square tiles anchored at the world origin.
///
/// Tile `(column, row)` covers `[column, column + 1) x [row, row + 1)` scaled
/// by the tile length.
#[derive(Clone, Debug, PartialEq)]
pub struct TileField {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<TileValue>,
}

impl TileField {
    /// Creates a fully open grid with the provided dimensions.
    #[must_use]
    pub fn open(columns: u32, rows: u32, tile_length: f32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tile_length,
            tiles: vec![TileValue::OPEN; capacity],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Overwrites the value of a tile; out-of-range tiles are ignored.
    pub fn set(&mut self, tile: TileIndex, value: TileValue) {
        if let Some(index) = self.index(tile) {
            self.tiles[index] = value;
        }
    }

    /// Value stored for a tile, `None` when out of range.
    #[must_use]
    pub fn value(&self, tile: TileIndex) -> Option<TileValue> {
        self.index(tile).map(|index| self.tiles[index])
    }

    /// World position at the centre of a tile.
    #[must_use]
    pub fn tile_center(&self, tile: TileIndex) -> Vector2D {
        Vector2D::new(
            (tile.column() as f32 + 0.5) * self.tile_length,
            (tile.row() as f32 + 0.5) * self.tile_length,
        )
    }

    /// Centre of the first open tile in row-major order.
    #[must_use]
    pub fn find_start_position(&self) -> Option<Vector2D> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| TileIndex::new(column, row)))
            .find(|tile| self.value(*tile).is_some_and(|value| value.is_traversable()))
            .map(|tile| self.tile_center(tile))
    }

    fn index(&self, tile: TileIndex) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            let row = usize::try_from(tile.row()).ok()?;
            let column = usize::try_from(tile.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl Field for TileField {
    fn tile_index_at(&self, position: Vector2D) -> Option<TileIndex> {
        if !(position.x.is_finite() && position.y.is_finite()) || self.tile_length <= 0.0 {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / self.tile_length).floor();
        let row = (position.y / self.tile_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(TileIndex::new(column as u32, row as u32))
    }

    fn tile_value_at(&self, position: Vector2D) -> Option<TileValue> {
        self.tile_index_at(position).and_then(|tile| self.value(tile))
    }
}

/// Field and initial entity placements parsed from an ASCII map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayout {
    /// Traversability grid.
    pub field: TileField,
    /// Centres of tiles marked `U`.
    pub units: Vec<Vector2D>,
    /// Centres of tiles marked `T`.
    pub towers: Vec<Vector2D>,
}

impl MapLayout {
    /// Parses a map where `.` is open ground, `#` a wall, `U` a unit and `T` a tower.
    ///
    /// The first non-empty line is row zero. Units and towers stand on open
    /// ground.
    pub fn parse(source: &str, tile_length: f32) -> Result<Self, FieldError> {
        let lines: Vec<&str> = source
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(FieldError::Empty);
        };

        let expected = first.chars().count();
        let columns = u32::try_from(expected).map_err(|_| FieldError::Empty)?;
        let rows = u32::try_from(lines.len()).map_err(|_| FieldError::Empty)?;
        let mut field = TileField::open(columns, rows, tile_length);
        let mut units = Vec::new();
        let mut towers = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(FieldError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }

            for (column, symbol) in line.chars().enumerate() {
                let tile = TileIndex::new(column as u32, row as u32);
                match symbol {
                    '.' => {}
                    '#' => field.set(tile, TileValue::WALL),
                    'U' => units.push(field.tile_center(tile)),
                    'T' => towers.push(field.tile_center(tile)),
                    other => {
                        return Err(FieldError::UnknownTile {
                            row,
                            column,
                            symbol: other,
                        })
                    }
                }
            }
        }

        Ok(Self {
            field,
            units,
            towers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_map_onto_tiles() {
        let field = TileField::open(4, 3, 2.0);

        assert_eq!(
            field.tile_index_at(Vector2D::new(0.0, 0.0)),
            Some(TileIndex::new(0, 0))
        );
        assert_eq!(
            field.tile_index_at(Vector2D::new(7.9, 5.9)),
            Some(TileIndex::new(3, 2))
        );
        assert_eq!(field.tile_index_at(Vector2D::new(8.0, 1.0)), None);
        assert_eq!(field.tile_index_at(Vector2D::new(-0.1, 1.0)), None);
        assert_eq!(field.tile_index_at(Vector2D::new(f32::NAN, 1.0)), None);
    }

    #[test]
    fn walls_block_traversal() {
        let mut field = TileField::open(3, 1, 1.0);
        field.set(TileIndex::new(1, 0), TileValue::WALL);

        assert!(field.is_traversable(Vector2D::new(0.5, 0.5)));
        assert!(!field.is_traversable(Vector2D::new(1.5, 0.5)));
        assert_eq!(
            field.tile_value_at(Vector2D::new(1.5, 0.5)),
            Some(TileValue::WALL)
        );
    }

    #[test]
    fn start_position_skips_walls() {
        let layout = MapLayout::parse("##.\n...\n", 1.0).expect("map parses");
        assert_eq!(
            layout.field.find_start_position(),
            Some(Vector2D::new(2.5, 0.5))
        );
    }

    #[test]
    fn parse_collects_entities() {
        let layout = MapLayout::parse("U.#\n..T\n", 2.0).expect("map parses");

        assert_eq!(layout.field.columns(), 3);
        assert_eq!(layout.field.rows(), 2);
        assert_eq!(layout.units, vec![Vector2D::new(1.0, 1.0)]);
        assert_eq!(layout.towers, vec![Vector2D::new(5.0, 3.0)]);
        assert_eq!(
            layout.field.value(TileIndex::new(2, 0)),
            Some(TileValue::WALL)
        );
    }

    #[test]
    fn parse_rejects_malformed_maps() {
        assert_eq!(MapLayout::parse("\n\n", 1.0), Err(FieldError::Empty));
        assert_eq!(
            MapLayout::parse("...\n..\n", 1.0),
            Err(FieldError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2,
            })
        );
        assert_eq!(
            MapLayout::parse(".x.\n", 1.0),
            Err(FieldError::UnknownTile {
                row: 0,
                column: 1,
                symbol: 'x',
            })
        );
    }
}
