use crate::config::{clamp_density, clamp_steps, speed_to_steps, SearchConfig};
use crate::error::GridError;
use crate::grid::Grid;
use crate::search::{SearchState, SearchStatus, StepResult};
use grid_util::point::Point;
use log::debug;
use rand::prelude::*;

/// Owns a generated [Grid] and the [SearchState] running on it from the top-left to the
/// bottom-right corner. This is the surface a renderer drives: one [tick](Self::tick)
/// per frame, [restart](Self::restart) for a new map.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SearchConfig,
    rng: StdRng,
    grid: Grid,
    state: SearchState,
}

impl Simulation {
    /// Every map of this simulation is derived from `seed`, so the same seed and the same
    /// sequence of calls replay identically.
    pub fn new(config: SearchConfig, seed: u64) -> Result<Simulation, GridError> {
        let config = config.clamped();
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = Grid::try_generate(config.width, config.height, config.density, rng.gen())?;
        let state = SearchState::try_new(&grid, grid.start(), grid.goal())?;
        Ok(Simulation {
            config,
            rng,
            grid,
            state,
        })
    }

    /// Advances the search by the configured number of steps.
    pub fn tick(&mut self) -> StepResult {
        self.state.advance(&self.grid, self.config.steps_per_tick)
    }

    /// Generates a new obstacle layout and starts a fresh search on it.
    pub fn restart(&mut self) {
        let seed: u64 = self.rng.gen();
        debug!("Restarting with a new map (seed {})", seed);
        self.grid = Grid::generate(
            self.config.width,
            self.config.height,
            self.config.density,
            seed,
        );
        self.state = SearchState::new(&self.grid, self.grid.start(), self.grid.goal());
    }

    /// Starts a fresh search on the current map.
    pub fn rerun(&mut self) {
        self.state.reset();
    }

    /// Changing the density only takes effect on a new map, so this restarts.
    pub fn set_density(&mut self, density: f64) {
        self.config.density = clamp_density(density);
        self.restart();
    }

    pub fn set_steps_per_tick(&mut self, steps: usize) {
        self.config.steps_per_tick = clamp_steps(steps);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.config.steps_per_tick = speed_to_steps(speed);
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn state(&self) -> &SearchState {
        &self.state
    }
    pub fn status(&self) -> SearchStatus {
        self.state.status()
    }
    pub fn current_path(&self) -> Vec<Point> {
        self.state.current_path(&self.grid)
    }
}
