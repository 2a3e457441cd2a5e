use astar_stepper::{SearchConfig, SearchStatus, Simulation};
use grid_util::point::Point;

// Runs a search on a random 25x25 map and prints every tenth frame:
// S start, G goal, # obstacle, * current best path, o open, x closed.
fn draw(sim: &Simulation) {
    let grid = sim.grid();
    let state = sim.state();
    let path = sim.current_path();
    for y in 0..grid.height() as i32 {
        let row = (0..grid.width() as i32)
            .map(|x| {
                let p = Point::new(x, y);
                if p == grid.start() {
                    'S'
                } else if p == grid.goal() {
                    'G'
                } else if grid.is_obstacle(x, y) {
                    '#'
                } else if path.contains(&p) {
                    '*'
                } else if grid.index(p).is_some_and(|ix| state.is_open(ix)) {
                    'o'
                } else if grid.index(p).is_some_and(|ix| state.is_closed(ix)) {
                    'x'
                } else {
                    '.'
                }
            })
            .collect::<String>();
        println!("{}", row);
    }
    println!();
}

fn main() {
    let config = SearchConfig::default().with_speed(0.3);
    let mut sim = match Simulation::new(config, 2024) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Could not set up the search: {e}");
            return;
        }
    };
    let mut tick = 0;
    loop {
        let result = sim.tick();
        tick += 1;
        if tick % 10 == 0 || result.status.is_terminal() {
            println!("Tick {tick}, {} expansions", sim.state().steps());
            draw(&sim);
        }
        match result.status {
            SearchStatus::Searching => continue,
            SearchStatus::Found => println!("Path found!"),
            SearchStatus::Exhausted => println!("No solution!"),
        }
        break;
    }
}
