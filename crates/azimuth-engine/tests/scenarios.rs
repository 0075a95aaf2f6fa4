//! Integration test: whole simulations built from configuration, with
//! real fields and communicators and a solver that leaves the spectral
//! fields alone.

use std::thread;

use azimuth_core::constants::C;
use azimuth_core::{Boundaries, ConfigError, StencilOrder};
use azimuth_domain::{ChannelTransport, WindowConfig};
use azimuth_engine::{FieldEnergyProbe, Frame, Phase, Simulation, StepOptions};
use azimuth_test_utils::fixtures::{open_boundary_config, uniform_plasma_config};
use azimuth_test_utils::FrozenSolver;

fn quiet() -> StepOptions {
    StepOptions {
        show_progress: false,
        ..StepOptions::default()
    }
}

#[test]
fn empty_plasma_stays_field_free() {
    let mut sim = Simulation::new(uniform_plasma_config(0.0), Box::new(FrozenSolver)).unwrap();
    let probe = FieldEnergyProbe::new(2).unwrap();
    let history = probe.history();
    sim.add_diagnostic(Box::new(probe));

    let metrics = sim.step(10, &quiet()).unwrap();

    assert_eq!(sim.iteration().0, 10);
    assert!((sim.time() - 10.0 * sim.dt()).abs() < 1e-12 * sim.time());
    assert!(sim.fields().interp().iter().all(|g| g.is_zero()));
    assert_eq!(metrics.steps, 10);
    assert_eq!(metrics.particle_exchanges, 10);

    let samples = history.samples();
    let its: Vec<u64> = samples.iter().map(|s| s.iteration.0).collect();
    assert_eq!(its, vec![0, 2, 4, 6, 8]);
    assert!(samples.iter().all(|s| s.energy == 0.0));
}

#[test]
fn open_boundaries_exchange_every_88_steps() {
    let sim = Simulation::new(open_boundary_config(), Box::new(FrozenSolver)).unwrap();
    assert_eq!(sim.exchange_period(), 88);
    assert_eq!(sim.comm().boundaries(), Boundaries::Open);
    assert_eq!(sim.setup_info().exchange_period, 88);
}

#[test]
fn guard_region_too_small_for_the_timestep() {
    let mut config = open_boundary_config();
    // 3 cells are reserved for the particle shape.
    config.domain.n_guard = Some(3);
    match Simulation::new(config, Box::new(FrozenSolver)) {
        Err(ConfigError::GuardRegionTooSmall { .. }) => {}
        Err(other) => panic!("expected GuardRegionTooSmall, got {other:?}"),
        Ok(_) => panic!("expected GuardRegionTooSmall"),
    }
}

#[test]
fn requested_period_overrides_derivation() {
    let mut config = open_boundary_config();
    config.domain.exchange_period = Some(5);
    let sim = Simulation::new(config, Box::new(FrozenSolver)).unwrap();
    assert_eq!(sim.exchange_period(), 5);
}

#[test]
fn galilean_frame_drifts_grid_boundaries() {
    let v = -0.5 * C;
    let mut config = uniform_plasma_config(0.0);
    config.solver.v_comoving = Some(v);
    config.solver.use_galilean = true;
    let mut sim = Simulation::new(config, Box::new(FrozenSolver)).unwrap();
    assert_eq!(sim.frame(), Frame::Galilean { v });

    let zmin0 = sim.fields().interp()[0].zmin();
    let zmax0 = sim.fields().interp()[0].zmax();
    let z0: Vec<Vec<f64>> = sim.fields().interp().iter().map(|g| g.z().to_vec()).collect();
    sim.step(4, &quiet()).unwrap();

    let shift = 4.0 * v * sim.dt();
    for (grid, z0) in sim.fields().interp().iter().zip(&z0) {
        let tol = 1e-9 * grid.dz();
        assert!((grid.zmin() - (zmin0 + shift)).abs() < tol, "zmin {}", grid.zmin());
        assert!((grid.zmax() - (zmax0 + shift)).abs() < tol, "zmax {}", grid.zmax());
        assert_eq!(grid.z().len(), z0.len());
        for (k, (&z, &z_start)) in grid.z().iter().zip(z0).enumerate() {
            assert!((z - (z_start + shift)).abs() < tol, "z[{k}] = {z}");
        }
    }
}

#[test]
fn galilean_grid_follows_the_window_once() {
    let mut config = open_boundary_config();
    config.solver.v_comoving = Some(0.5 * C);
    config.solver.use_galilean = true;
    config.domain.exchange_period = Some(10);
    let mut sim = Simulation::new(config, Box::new(FrozenSolver)).unwrap();
    sim.set_moving_window(&WindowConfig::default()).unwrap();

    let zmin0 = sim.fields().interp()[0].zmin();
    let dz = sim.fields().interp()[0].dz();
    let metrics = sim.step(200, &quiet()).unwrap();

    // The window travels at c; half of that is the frame's own drift.
    let travelled = C * 200.0 * sim.dt();
    let moved = sim.fields().interp()[0].zmin() - zmin0;
    assert!(
        (moved - travelled).abs() < dz,
        "grid moved {} cells, window {} cells",
        moved / dz,
        travelled / dz
    );
    let by_window = metrics.cells_moved as f64;
    assert!((by_window - 0.5 * travelled / dz).abs() <= 1.0, "window shifted {by_window} cells");
}

#[test]
fn comoving_without_galilean_keeps_grid_fixed() {
    let mut config = uniform_plasma_config(0.0);
    config.solver.v_comoving = Some(0.9 * C);
    let mut sim = Simulation::new(config, Box::new(FrozenSolver)).unwrap();
    assert_eq!(sim.frame(), Frame::Comoving { v: 0.9 * C });
    let zmin0 = sim.fields().interp()[0].zmin();
    sim.step(3, &quiet()).unwrap();
    assert_eq!(sim.fields().interp()[0].zmin(), zmin0);
}

#[test]
fn moving_window_needs_open_boundaries() {
    let mut sim = Simulation::new(uniform_plasma_config(0.0), Box::new(FrozenSolver)).unwrap();
    assert_eq!(
        sim.set_moving_window(&WindowConfig::default()),
        Err(ConfigError::WindowRequiresOpenBoundaries)
    );
}

#[test]
fn window_injection_pending_until_particle_exchange() {
    let mut sim = Simulation::new(open_boundary_config(), Box::new(FrozenSolver)).unwrap();
    sim.set_moving_window(&WindowConfig::default()).unwrap();

    // 88 steps: the window moves, but only iteration 0 exchanged.
    sim.step(88, &quiet()).unwrap();
    let window = sim.comm().moving_window().unwrap();
    assert!(window.cells_moved() > 0);
    assert_eq!(window.nz_inject() as u64, window.cells_moved());

    // Iteration 88 is on the period: everything exposed gets refilled.
    let metrics = sim.step(1, &quiet()).unwrap();
    assert_eq!(metrics.particle_exchanges, 1);
    assert_eq!(sim.comm().moving_window().unwrap().nz_inject(), 0);
}

#[test]
fn window_refills_within_a_single_call() {
    let mut sim = Simulation::new(open_boundary_config(), Box::new(FrozenSolver)).unwrap();
    sim.set_moving_window(&WindowConfig::default()).unwrap();
    let metrics = sim.step(89, &quiet()).unwrap();
    assert_eq!(metrics.particle_exchanges, 2);
    assert_eq!(metrics.cells_moved, sim.comm().moving_window().unwrap().cells_moved());
    assert_eq!(sim.comm().moving_window().unwrap().nz_inject(), 0);
}

#[test]
fn decomposed_ranks_conserve_particles() {
    const RANKS: usize = 2;
    let handles: Vec<_> = ChannelTransport::cluster(RANKS)
        .into_iter()
        .map(|t| {
            thread::spawn(move || {
                let mut config = uniform_plasma_config(1e24);
                config.solver.stencil = StencilOrder::Finite(8);
                config.domain.n_guard = Some(8);
                let mut sim = Simulation::with_transport(config, Box::new(FrozenSolver), t)
                    .unwrap();
                let before = sim.species_named("electrons").unwrap().arrays().len();
                sim.step(6, &quiet()).unwrap();
                let after = sim.species_named("electrons").unwrap().arrays().len();
                (sim.comm().rank(), sim.comm().size(), before, after, sim.iteration().0)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let total_before: usize = results.iter().map(|r| r.2).sum();
    let total_after: usize = results.iter().map(|r| r.3).sum();
    assert!(total_before > 0);
    assert_eq!(total_before, total_after);
    let mut ranks: Vec<usize> = results.iter().map(|r| r.0).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (0..RANKS).collect::<Vec<_>>());
    assert!(results.iter().all(|r| r.1 == RANKS && r.4 == 6));
}

#[test]
fn only_device_runs_record_staging() {
    let mut config = uniform_plasma_config(0.0);
    config.use_device = true;
    let mut sim = Simulation::new(config, Box::new(FrozenSolver)).unwrap();
    let metrics = sim.step(2, &quiet()).unwrap();
    assert_eq!(sim.iteration().0, 2);
    assert!(metrics.phase_us.contains_key(&Phase::Staging));

    let mut host = Simulation::new(uniform_plasma_config(0.0), Box::new(FrozenSolver)).unwrap();
    let metrics = host.step(2, &quiet()).unwrap();
    assert!(!metrics.phase_us.contains_key(&Phase::Staging));
    assert!(metrics.phase_us.contains_key(&Phase::FieldSolve));
}
