use crate::error::GridError;
use crate::grid::Grid;
use crate::heuristic;
use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, info};

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Per-cell search scores. `previous` is the arena index of the predecessor on the best
/// known path; the links always form a tree rooted at the start.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Node {
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub previous: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    Searching,
    /// The goal has been selected for expansion.
    Found,
    /// The open set ran empty before the goal was selected: no path exists.
    Exhausted,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        self != SearchStatus::Searching
    }
}

/// What an observer gets back after each [step](SearchState::step) or
/// [advance](SearchState::advance).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepResult {
    pub status: SearchStatus,
    /// The most recently expanded cell, the current best candidate.
    pub current: Option<Point>,
}

/// The mutable side of an A* run over a [Grid]: scores for every cell, the open and
/// closed sets, the current best candidate and the run status.
///
/// The state does not hold on to the grid; every operation that needs topology takes it
/// as an argument, so a controller can own both side by side. A state must only ever be
/// used with the grid it was created for.
#[derive(Clone, Debug)]
pub struct SearchState {
    start: usize,
    goal: usize,
    nodes: Vec<Node>,
    open: FxIndexSet<usize>,
    closed: FxIndexSet<usize>,
    current: Option<usize>,
    status: SearchStatus,
    steps: usize,
}

impl SearchState {
    /// Starts a search from `start` to `goal`. Panics if either lies outside the grid.
    pub fn new(grid: &Grid, start: Point, goal: Point) -> SearchState {
        SearchState::try_new(grid, start, goal).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(grid: &Grid, start: Point, goal: Point) -> Result<SearchState, GridError> {
        let out_of_bounds = |p: Point| GridError::OutOfBounds {
            x: p.x,
            y: p.y,
            width: grid.width(),
            height: grid.height(),
        };
        let start_ix = grid.index(start).ok_or_else(|| out_of_bounds(start))?;
        let goal_ix = grid.index(goal).ok_or_else(|| out_of_bounds(goal))?;
        let mut state = SearchState {
            start: start_ix,
            goal: goal_ix,
            nodes: vec![Node::default(); grid.len()],
            open: FxIndexSet::default(),
            closed: FxIndexSet::default(),
            current: None,
            status: SearchStatus::Searching,
            steps: 0,
        };
        state.initialize();
        Ok(state)
    }

    fn initialize(&mut self) {
        self.open.clear();
        self.closed.clear();
        self.nodes[self.start] = Node::default();
        self.open.insert(self.start);
        self.current = None;
        self.status = SearchStatus::Searching;
        self.steps = 0;
    }

    /// Clears all scores and predecessor links and restarts the search on the same map.
    pub fn reset(&mut self) {
        debug!("Resetting search state ({} expansions discarded)", self.steps);
        self.nodes.fill(Node::default());
        self.initialize();
    }

    /// Expands the open cell with the lowest `f`. Equal `f` values go to the cell that
    /// entered the open set first.
    pub fn step(&mut self, grid: &Grid) -> StepResult {
        debug_assert_eq!(
            grid.len(),
            self.nodes.len(),
            "search state used with a different grid"
        );
        if self.status.is_terminal() {
            return self.result(grid);
        }
        let best = self
            .open
            .iter()
            .position_min_by(|&&a, &&b| self.nodes[a].f.total_cmp(&self.nodes[b].f));
        let Some(current) = best.and_then(|pos| self.open.shift_remove_index(pos)) else {
            self.status = SearchStatus::Exhausted;
            info!(
                "No path from {:?} to {:?}: open set exhausted after {} expansions",
                grid.point(self.start),
                grid.point(self.goal),
                self.steps
            );
            return self.result(grid);
        };
        self.steps += 1;
        self.closed.insert(current);
        self.current = Some(current);
        if current == self.goal {
            self.status = SearchStatus::Found;
            info!(
                "Found path to {:?} with cost {:.3} after {} expansions",
                grid.point(self.goal),
                self.nodes[current].g,
                self.steps
            );
            return self.result(grid);
        }

        let current_point = grid.point(current);
        let current_g = self.nodes[current].g;
        let goal_point = grid.point(self.goal);
        for &n in grid.cell_at(current).neighbours() {
            // Closed cells are never reopened; edge costs are fixed so this keeps optimality.
            if self.closed.contains(&n) {
                continue;
            }
            let n_point = grid.point(n);
            let tentative_g = current_g + heuristic(&n_point, &current_point);
            if !self.open.contains(&n) {
                if grid.cell_at(n).is_obstacle() {
                    continue;
                }
                let h = heuristic(&n_point, &goal_point);
                self.nodes[n] = Node {
                    g: tentative_g,
                    h,
                    f: tentative_g + h,
                    previous: Some(current),
                };
                self.open.insert(n);
            } else if tentative_g < self.nodes[n].g {
                let node = &mut self.nodes[n];
                node.g = tentative_g;
                node.f = tentative_g + node.h;
                node.previous = Some(current);
            }
        }
        self.result(grid)
    }

    /// Runs up to `max_steps` steps, stopping early once the search is terminal.
    pub fn advance(&mut self, grid: &Grid, max_steps: usize) -> StepResult {
        for _ in 0..max_steps {
            if self.status.is_terminal() {
                break;
            }
            self.step(grid);
        }
        self.result(grid)
    }

    pub fn result(&self, grid: &Grid) -> StepResult {
        StepResult {
            status: self.status,
            current: self.current.map(|ix| grid.point(ix)),
        }
    }

    /// Follows predecessor links from `point`, returning cells in goal-to-start order. A
    /// cell that was never linked yields just itself; a point off the grid yields nothing.
    pub fn reconstruct_path(&self, grid: &Grid, point: Point) -> Vec<Point> {
        std::iter::successors(grid.index(point), |&ix| self.nodes[ix].previous)
            .map(|ix| grid.point(ix))
            .collect()
    }

    /// The best path known so far, ending at the current candidate.
    pub fn current_path(&self, grid: &Grid) -> Vec<Point> {
        self.current
            .map(|ix| self.reconstruct_path(grid, grid.point(ix)))
            .unwrap_or_default()
    }

    /// The final path in start-to-goal order, once the goal has been found.
    pub fn path(&self, grid: &Grid) -> Option<Vec<Point>> {
        (self.status == SearchStatus::Found).then(|| {
            let mut path = self.reconstruct_path(grid, grid.point(self.goal));
            path.reverse();
            path
        })
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }
    /// Number of cells expanded so far.
    pub fn steps(&self) -> usize {
        self.steps
    }
    pub fn start(&self) -> usize {
        self.start
    }
    pub fn goal(&self) -> usize {
        self.goal
    }
    pub fn current(&self) -> Option<usize> {
        self.current
    }
    pub fn node(&self, ix: usize) -> &Node {
        &self.nodes[ix]
    }
    /// Open cells in insertion order.
    pub fn open(&self) -> impl Iterator<Item = usize> + '_ {
        self.open.iter().copied()
    }
    /// Closed cells in expansion order.
    pub fn closed(&self) -> impl Iterator<Item = usize> + '_ {
        self.closed.iter().copied()
    }
    pub fn is_open(&self, ix: usize) -> bool {
        self.open.contains(&ix)
    }
    pub fn is_closed(&self, ix: usize) -> bool {
        self.closed.contains(&ix)
    }
    pub fn open_len(&self) -> usize {
        self.open.len()
    }
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }
}

/// A [SearchState] bundled with the [Grid] it runs on, addressed by [Point]s.
#[derive(Clone, Debug)]
pub struct SearchEngine<'g> {
    grid: &'g Grid,
    state: SearchState,
}

impl<'g> SearchEngine<'g> {
    pub fn new(grid: &'g Grid, start: Point, goal: Point) -> SearchEngine<'g> {
        SearchEngine {
            grid,
            state: SearchState::new(grid, start, goal),
        }
    }
    pub fn try_new(grid: &'g Grid, start: Point, goal: Point) -> Result<SearchEngine<'g>, GridError> {
        Ok(SearchEngine {
            grid,
            state: SearchState::try_new(grid, start, goal)?,
        })
    }
    pub fn step(&mut self) -> StepResult {
        self.state.step(self.grid)
    }
    pub fn advance(&mut self, max_steps: usize) -> StepResult {
        self.state.advance(self.grid, max_steps)
    }
    pub fn reset(&mut self) {
        self.state.reset();
    }
    pub fn status(&self) -> SearchStatus {
        self.state.status()
    }
    pub fn steps(&self) -> usize {
        self.state.steps()
    }
    pub fn current(&self) -> Option<Point> {
        self.state.current().map(|ix| self.grid.point(ix))
    }
    pub fn reconstruct_path(&self, point: Point) -> Vec<Point> {
        self.state.reconstruct_path(self.grid, point)
    }
    pub fn current_path(&self) -> Vec<Point> {
        self.state.current_path(self.grid)
    }
    pub fn path(&self) -> Option<Vec<Point>> {
        self.state.path(self.grid)
    }
    pub fn node(&self, point: Point) -> Option<&Node> {
        self.grid.index(point).map(|ix| self.state.node(ix))
    }
    pub fn open_points(&self) -> Vec<Point> {
        self.state.open().map(|ix| self.grid.point(ix)).collect()
    }
    pub fn closed_points(&self) -> Vec<Point> {
        self.state.closed().map(|ix| self.grid.point(ix)).collect()
    }
    pub fn is_open(&self, point: Point) -> bool {
        self.grid.index(point).is_some_and(|ix| self.state.is_open(ix))
    }
    pub fn is_closed(&self, point: Point) -> bool {
        self.grid.index(point).is_some_and(|ix| self.state.is_closed(ix))
    }
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }
    pub fn state(&self) -> &SearchState {
        &self.state
    }
    pub fn into_state(self) -> SearchState {
        self.state
    }
}
