//! Headless run of a monster hunting a wandering player
//!
//! Usage: `tilehunt [config.ron|config.json]`

use tilehunt::prelude::*;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match WorldConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };

    let mut sim = match Simulation::new(&config, SimConfig::default()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Simulation error: {e}");
            std::process::exit(1);
        }
    };

    match sim.run() {
        Ok(stats) => log::info!("Finished: {}", stats.format_stats()),
        Err(e) => {
            eprintln!("Simulation error: {e}");
            std::process::exit(1);
        }
    }
}
