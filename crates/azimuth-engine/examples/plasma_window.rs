//! Uniform plasma on open boundaries under a moving window.
//!
//! Demonstrates: configure → build → attach window and diagnostic → step
//! with a progress bar → read metrics. Run with `RUST_LOG=debug` to see
//! the exchange and injection traffic.

use azimuth_core::Boundaries;
use azimuth_domain::WindowConfig;
use azimuth_engine::{FieldEnergyProbe, Phase, Simulation, SimulationConfig, StepOptions};
use azimuth_test_utils::FrozenSolver;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = SimulationConfig::default();
    config.plasma.n_e = 4e24;
    config.plasma.p_zmax = config.grid.zmax;
    config.domain.boundaries = Boundaries::Open;
    config.domain.n_guard = Some(24);
    config.domain.n_damp = 8;
    config.verbosity = 2;

    let mut sim = match Simulation::new(config, Box::new(FrozenSolver)) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("setup failed: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = sim.set_moving_window(&WindowConfig::default()) {
        log::error!("moving window rejected: {e}");
        std::process::exit(1);
    }

    let probe = FieldEnergyProbe::new(50).unwrap();
    let history = probe.history();
    sim.add_diagnostic(Box::new(probe));

    let metrics = sim.step(300, &StepOptions::default()).unwrap();

    println!("\n=== Run summary ===");
    println!("iterations:        {}", sim.iteration());
    println!("particle exchanges {}", metrics.particle_exchanges);
    println!("cells moved:       {}", metrics.cells_moved);
    println!(
        "electrons:         {}",
        sim.species_named("electrons").map_or(0, |s| s.arrays().len())
    );
    for phase in [Phase::Exchange, Phase::Deposit, Phase::Push, Phase::FieldSolve] {
        println!("{:<18} {} us", format!("{phase}:"), metrics.phase(phase));
    }
    for sample in history.samples() {
        println!("energy @ {:>4}: {:.3e}", sample.iteration.0, sample.energy);
    }
}
