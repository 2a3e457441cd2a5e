use crate::error::GridError;
use core::fmt;
use grid_util::point::Point;
use itertools::iproduct;
use log::debug;
use petgraph::unionfind::UnionFind;
use rand::prelude::*;
use smallvec::SmallVec;
use std::str::FromStr;

/// Offsets of the Moore neighbourhood in the order neighbours are stored and expanded.
/// Expansion order decides which of several equal-cost paths wins, so it must stay fixed.
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A single grid position together with its fixed topology. Search scores are kept
/// separately in [SearchState](crate::search::SearchState).
#[derive(Clone, Debug)]
pub struct Cell {
    point: Point,
    obstacle: bool,
    neighbours: SmallVec<[usize; 8]>,
}

impl Cell {
    pub fn point(&self) -> Point {
        self.point
    }
    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }
    /// Arena indices of the in-bounds cells around this one, obstacles included.
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }
}

/// [Grid] owns a `width` x `height` arena of [Cell]s addressed by `y * width + x`. The
/// obstacle layout and neighbour lists are fixed at construction; connected components
/// are computed once with a [UnionFind] so reachability can be answered without searching.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    components: UnionFind<usize>,
}

fn point_in_bounds(width: usize, height: usize, point: &Point) -> bool {
    point.x >= 0 && point.y >= 0 && (point.x as usize) < width && (point.y as usize) < height
}

impl Grid {
    /// Generates a grid where every cell except the start `(0, 0)` and the goal
    /// `(width - 1, height - 1)` is an obstacle with probability `density`. Panics on
    /// empty dimensions or a density outside `[0, 1]`; see [try_generate](Self::try_generate).
    pub fn generate(width: usize, height: usize, density: f64, seed: u64) -> Grid {
        Grid::try_generate(width, height, density, seed).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_generate(
        width: usize,
        height: usize,
        density: f64,
        seed: u64,
    ) -> Result<Grid, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        if !(0.0..=1.0).contains(&density) {
            return Err(GridError::DensityOutOfRange(density));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut blocked = (0..width * height)
            .map(|_| rng.gen_bool(density))
            .collect::<Vec<bool>>();
        blocked[0] = false;
        blocked[width * height - 1] = false;
        let grid = Grid::build(width, height, blocked);
        debug!(
            "Generated {}x{} grid with {} obstacles (density {}, seed {})",
            width,
            height,
            grid.obstacle_count(),
            density,
            seed
        );
        Ok(grid)
    }

    /// Builds a grid with exactly the given obstacles. Start and goal are not forced open.
    pub fn from_obstacles<I>(width: usize, height: usize, obstacles: I) -> Result<Grid, GridError>
    where
        I: IntoIterator<Item = Point>,
    {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        let mut blocked = vec![false; width * height];
        for p in obstacles {
            if !point_in_bounds(width, height, &p) {
                return Err(GridError::OutOfBounds {
                    x: p.x,
                    y: p.y,
                    width,
                    height,
                });
            }
            blocked[p.y as usize * width + p.x as usize] = true;
        }
        Ok(Grid::build(width, height, blocked))
    }

    fn build(width: usize, height: usize, blocked: Vec<bool>) -> Grid {
        debug_assert_eq!(blocked.len(), width * height);
        let cells = iproduct!(0..height, 0..width)
            .zip(blocked)
            .map(|((y, x), obstacle)| {
                let point = Point::new(x as i32, y as i32);
                let neighbours = MOORE_OFFSETS
                    .iter()
                    .map(|&(dx, dy)| Point::new(point.x + dx, point.y + dy))
                    .filter(|p| point_in_bounds(width, height, p))
                    .map(|p| p.y as usize * width + p.x as usize)
                    .collect::<SmallVec<[usize; 8]>>();
                Cell {
                    point,
                    obstacle,
                    neighbours,
                }
            })
            .collect::<Vec<Cell>>();
        let components = Grid::generate_components(&cells);
        Grid {
            width,
            height,
            cells,
            components,
        }
    }

    /// Links every passable cell to its passable neighbours.
    fn generate_components(cells: &[Cell]) -> UnionFind<usize> {
        let mut components = UnionFind::new(cells.len());
        for (ix, cell) in cells.iter().enumerate().filter(|(_, c)| !c.obstacle) {
            for &n in cell.neighbours.iter().filter(|&&n| !cells[n].obstacle) {
                components.union(ix, n);
            }
        }
        components
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn start(&self) -> Point {
        Point::new(0, 0)
    }
    pub fn goal(&self) -> Point {
        Point::new(self.width as i32 - 1, self.height as i32 - 1)
    }
    pub fn in_bounds(&self, point: Point) -> bool {
        point_in_bounds(self.width, self.height, &point)
    }
    pub fn index(&self, point: Point) -> Option<usize> {
        self.in_bounds(point)
            .then(|| point.y as usize * self.width + point.x as usize)
    }
    /// Inverse of [index](Self::index). Panics if `ix` is not a cell of this grid.
    pub fn point(&self, ix: usize) -> Point {
        self.cells[ix].point
    }
    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.index(point).map(|ix| &self.cells[ix])
    }
    pub fn cell_at(&self, ix: usize) -> &Cell {
        &self.cells[ix]
    }
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
    /// Positions outside the grid count as blocked.
    pub fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.cell(Point::new(x, y)).map_or(true, Cell::is_obstacle)
    }
    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|c| c.obstacle).count()
    }
    /// The in-bounds Moore neighbourhood of `point`, in expansion order.
    pub fn neighbours(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        self.cell(point)
            .into_iter()
            .flat_map(move |c| c.neighbours.iter().map(move |&ix| self.point(ix)))
    }
    /// Retrieves the component id of a passable [Point].
    pub fn component(&self, point: Point) -> Option<usize> {
        self.index(point)
            .filter(|&ix| !self.cells[ix].obstacle)
            .map(|ix| self.components.find(ix))
    }
    /// Checks if both points are passable and on the same connected component.
    pub fn reachable(&self, a: Point, b: Point) -> bool {
        match (self.component(a), self.component(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line = row
                .iter()
                .map(|c| if c.obstacle { '#' } else { '.' })
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Parses rows of `#` (obstacle) and `.`, `S` or `G` (passable). Blank lines and
/// surrounding whitespace are ignored.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<&str>>();
        let width = rows.first().ok_or(GridError::EmptyLayout)?.chars().count();
        let mut blocked = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for tile in line.chars() {
                blocked.push(match tile {
                    '#' => true,
                    '.' | 'S' | 'G' => false,
                    tile => return Err(GridError::UnknownTile { tile, row }),
                });
            }
        }
        Ok(Grid::build(width, rows.len(), blocked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_cells_have_fewer_neighbours() {
        let grid = Grid::from_obstacles(3, 3, std::iter::empty()).unwrap();
        assert_eq!(grid.cell(Point::new(0, 0)).unwrap().neighbours().len(), 3);
        assert_eq!(grid.cell(Point::new(1, 0)).unwrap().neighbours().len(), 5);
        assert_eq!(grid.cell(Point::new(1, 1)).unwrap().neighbours().len(), 8);
        assert_eq!(grid.cell(Point::new(2, 2)).unwrap().neighbours().len(), 3);
    }

    /// Corner cells must not list any neighbour twice.
    #[test]
    fn neighbours_are_unique_and_ordered() {
        let grid = Grid::from_obstacles(4, 3, std::iter::empty()).unwrap();
        for cell in grid.cells() {
            let mut seen = cell.neighbours().to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), cell.neighbours().len());
        }
        let around_center = grid.neighbours(Point::new(1, 1)).collect::<Vec<Point>>();
        assert_eq!(
            around_center,
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(2, 0),
                Point::new(0, 1),
                Point::new(2, 1),
                Point::new(0, 2),
                Point::new(1, 2),
                Point::new(2, 2),
            ]
        );
        let corner = grid.neighbours(Point::new(3, 0)).collect::<Vec<Point>>();
        assert_eq!(
            corner,
            vec![Point::new(2, 0), Point::new(2, 1), Point::new(3, 1)]
        );
    }

    #[test]
    fn generation_keeps_start_and_goal_open() {
        for seed in 0..20 {
            let grid = Grid::generate(6, 4, 1.0, seed);
            assert!(!grid.is_obstacle(0, 0));
            assert!(!grid.is_obstacle(5, 3));
            assert_eq!(grid.obstacle_count(), 6 * 4 - 2);
        }
        let open = Grid::generate(6, 4, 0.0, 7);
        assert_eq!(open.obstacle_count(), 0);
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = Grid::generate(12, 9, 0.3, 42);
        let b = Grid::generate(12, 9, 0.3, 42);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn invalid_construction_is_rejected() {
        assert_eq!(
            Grid::try_generate(0, 4, 0.2, 0).unwrap_err(),
            GridError::EmptyDimensions {
                width: 0,
                height: 4
            }
        );
        assert_eq!(
            Grid::try_generate(4, 4, 1.5, 0).unwrap_err(),
            GridError::DensityOutOfRange(1.5)
        );
        assert!(matches!(
            Grid::from_obstacles(2, 2, [Point::new(2, 0)]),
            Err(GridError::OutOfBounds { x: 2, y: 0, .. })
        ));
    }

    #[test]
    #[should_panic]
    fn generate_fails_fast_on_empty_grid() {
        Grid::generate(0, 0, 0.3, 0);
    }

    #[test]
    fn out_of_bounds_counts_as_obstacle() {
        let grid = Grid::from_obstacles(2, 2, std::iter::empty()).unwrap();
        assert!(grid.is_obstacle(-1, 0));
        assert!(grid.is_obstacle(0, 2));
        assert!(grid.cell(Point::new(5, 5)).is_none());
        assert_eq!(grid.neighbours(Point::new(5, 5)).count(), 0);
    }

    #[test]
    fn parse_and_display() {
        let layout = "S.#\n.#.\n#.G\n";
        let grid: Grid = layout.parse().unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert!(grid.is_obstacle(2, 0));
        assert!(grid.is_obstacle(1, 1));
        assert!(grid.is_obstacle(0, 2));
        assert_eq!(grid.to_string(), "..#\n.#.\n#..\n");
        assert_eq!(
            "..\n...".parse::<Grid>().unwrap_err(),
            GridError::RaggedRow {
                row: 1,
                expected: 2,
                found: 3
            }
        );
        assert_eq!(
            ".x".parse::<Grid>().unwrap_err(),
            GridError::UnknownTile { tile: 'x', row: 0 }
        );
        assert_eq!("\n  \n".parse::<Grid>().unwrap_err(), GridError::EmptyLayout);
    }

    /// Tests whether points are correctly mapped to different connected components.
    #[test]
    fn test_component_generation() {
        // Corresponds to the following grid:
        //  ___
        // |.#.|
        // |.#.|
        //  ___
        let grid: Grid = ".#.\n.#.".parse().unwrap();
        assert!(grid.reachable(Point::new(0, 0), Point::new(0, 1)));
        assert!(!grid.reachable(Point::new(0, 0), Point::new(2, 0)));
        assert!(!grid.reachable(Point::new(0, 0), Point::new(1, 0)));
        assert_eq!(grid.component(Point::new(1, 1)), None);
    }

    /// Diagonal moves may squeeze between two blocked orthogonal cells.
    #[test]
    fn diagonal_corner_cutting_connects() {
        //  __
        // |.#|
        // |#.|
        //  __
        let grid: Grid = ".#\n#.".parse().unwrap();
        assert!(grid.reachable(Point::new(0, 0), Point::new(1, 1)));
    }
}
