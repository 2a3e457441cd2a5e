//! # astar_stepper
//!
//! A step-wise [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) search on an
//! 8-connected grid with randomly placed obstacles. Instead of running to completion in one
//! call, the search is advanced a caller-chosen number of expansions at a time so the open
//! set, the closed set and the current best path can be observed as they grow.
//!
//! Moves cost their Euclidean length (1 straight, √2 diagonal) and the same distance is the
//! estimate to the goal. Open-set selection is a linear scan where ties on `f` go to the
//! cell that was discovered first, which makes the chosen path fully deterministic.
//!
//! ```
//! use astar_stepper::{Grid, SearchEngine, SearchStatus};
//!
//! let grid = Grid::generate(25, 25, 0.3, 7);
//! let mut engine = SearchEngine::new(&grid, grid.start(), grid.goal());
//! while !engine.advance(5).status.is_terminal() {
//!     let _frontier = engine.open_points();
//! }
//! if engine.status() == SearchStatus::Found {
//!     assert_eq!(engine.path().unwrap()[0], grid.start());
//! }
//! ```
pub mod config;
pub mod error;
pub mod grid;
pub mod search;
pub mod simulation;

pub use config::SearchConfig;
pub use error::GridError;
pub use grid::{Cell, Grid};
pub use search::{Node, SearchEngine, SearchState, SearchStatus, StepResult};
pub use simulation::Simulation;

use grid_util::point::Point;
use itertools::Itertools;

/// Euclidean distance between two grid positions. Serves both as the cost of moving between
/// adjacent cells and as the admissible estimate of the remaining distance to the goal.
pub fn heuristic(a: &Point, b: &Point) -> f64 {
    ((a.x - b.x) as f64).hypot((a.y - b.y) as f64)
}

/// Total cost of walking `path` cell by cell.
pub fn path_cost(path: &[Point]) -> f64 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| heuristic(a, b))
        .sum()
}
