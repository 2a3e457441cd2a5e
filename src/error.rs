use thiserror::Error;

/// Construction-time failures for grids and searches. Reaching the goal or running out of
/// open cells are search statuses, not errors.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },
    #[error("obstacle density {0} is outside [0, 1]")]
    DensityOutOfRange(f64),
    #[error("({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error("unknown tile {tile:?} on row {row}")]
    UnknownTile { tile: char, row: usize },
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layout contains no rows")]
    EmptyLayout,
}
