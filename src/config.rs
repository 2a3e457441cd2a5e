/// Settings a controller feeds into grid generation and per-tick stepping.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    pub width: usize,
    pub height: usize,
    /// Probability that a cell other than start or goal is an obstacle.
    pub density: f64,
    pub steps_per_tick: usize,
}

pub const DEFAULT_WIDTH: usize = 25;
pub const DEFAULT_HEIGHT: usize = 25;
pub const DEFAULT_DENSITY: f64 = 0.3;
/// Densities above this leave almost no solvable maps.
pub const MAX_DENSITY: f64 = 0.8;
pub const MIN_STEPS_PER_TICK: usize = 1;
pub const MAX_STEPS_PER_TICK: usize = 10;

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            density: DEFAULT_DENSITY,
            steps_per_tick: MIN_STEPS_PER_TICK,
        }
    }
}

pub(crate) fn clamp_density(density: f64) -> f64 {
    if density.is_nan() {
        0.0
    } else {
        density.clamp(0.0, MAX_DENSITY)
    }
}

pub(crate) fn clamp_steps(steps: usize) -> usize {
    steps.clamp(MIN_STEPS_PER_TICK, MAX_STEPS_PER_TICK)
}

/// Maps a speed control in `[0, 1]` linearly onto the allowed steps per tick.
pub(crate) fn speed_to_steps(speed: f64) -> usize {
    let speed = if speed.is_nan() { 0.0 } else { speed.clamp(0.0, 1.0) };
    let span = (MAX_STEPS_PER_TICK - MIN_STEPS_PER_TICK) as f64;
    MIN_STEPS_PER_TICK + (speed * span).round() as usize
}

impl SearchConfig {
    pub fn new(width: usize, height: usize) -> SearchConfig {
        SearchConfig {
            width,
            height,
            ..SearchConfig::default()
        }
    }
    pub fn with_density(mut self, density: f64) -> SearchConfig {
        self.density = clamp_density(density);
        self
    }
    pub fn with_steps_per_tick(mut self, steps: usize) -> SearchConfig {
        self.steps_per_tick = clamp_steps(steps);
        self
    }
    pub fn with_speed(mut self, speed: f64) -> SearchConfig {
        self.steps_per_tick = speed_to_steps(speed);
        self
    }
    /// Brings density and steps per tick back into their recognised ranges. Dimensions are
    /// left alone; empty ones are rejected when the grid is built.
    pub fn clamped(self) -> SearchConfig {
        SearchConfig {
            density: clamp_density(self.density),
            steps_per_tick: clamp_steps(self.steps_per_tick),
            ..self
        }
    }
}
