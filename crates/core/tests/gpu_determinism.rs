//! GPU Determinism Validation Suite
//!
//! Compares the GPU stencil against the CPU stencil and checks that repeated
//! GPU runs agree bit for bit. Every test passes trivially when no GPU is
//! available (graceful degradation).

#![cfg(feature = "gpu")]

use heated_plate_core::solver::{GpuContext, GpuInitResult};
use heated_plate_core::{
    create_stencil_solver, solve, Backend, CpuStencilSolver, GpuStencilSolver, PlateConfig,
    PlateGrid, StencilSolver,
};

/// Tolerance for CPU/GPU cell comparison
///
/// Both backends evaluate the same single-precision expression, but shader
/// compilers are free to contract or reorder float math.
const CELL_TOLERANCE: f32 = 1e-3;

/// Extended scenario iteration count
const EXTENDED_ITERATIONS: u32 = 100;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn gpu_solver(initial: &PlateGrid) -> Option<GpuStencilSolver> {
    match GpuContext::new() {
        GpuInitResult::Success(context) => Some(GpuStencilSolver::new(context, initial).unwrap()),
        _ => None,
    }
}

fn compare_grids(cpu: &[f32], gpu: &[f32], tolerance: f32) {
    assert_eq!(cpu.len(), gpu.len(), "grid sizes differ");
    let mut max_error = 0.0_f32;
    for (i, (c, g)) in cpu.iter().zip(gpu.iter()).enumerate() {
        let error = (c - g).abs();
        assert!(
            error <= tolerance,
            "cell {i} differs: cpu={c} gpu={g} (error {error})"
        );
        max_error = max_error.max(error);
    }
    println!("max CPU/GPU difference: {max_error:e}");
}

#[test]
fn test_gpu_cpu_basic_comparison() {
    let initial = PlateGrid::initialized(&PlateConfig::new(64, 48, 10)).unwrap();
    let Some(mut gpu) = gpu_solver(&initial) else {
        return;
    };
    let mut cpu = CpuStencilSolver::new(initial).unwrap();

    gpu.run(10).unwrap();
    cpu.run(10).unwrap();

    compare_grids(&cpu.read_grid().unwrap(), &gpu.read_grid().unwrap(), CELL_TOLERANCE);
}

#[test]
fn test_extended_scenario_100_iterations() {
    let initial = PlateGrid::initialized(&PlateConfig::new(100, 75, EXTENDED_ITERATIONS)).unwrap();
    let Some(mut gpu) = gpu_solver(&initial) else {
        return;
    };
    let ring = initial.boundary_ring();
    let mut cpu = CpuStencilSolver::new(initial).unwrap();

    gpu.run(EXTENDED_ITERATIONS).unwrap();
    cpu.run(EXTENDED_ITERATIONS).unwrap();

    let gpu_grid = gpu.snapshot_grid().unwrap();
    assert_eq!(gpu_grid.boundary_ring(), ring, "GPU wrote to the boundary ring");
    compare_grids(cpu.buffer(cpu.current_buffer()).as_slice(), gpu_grid.as_slice(), CELL_TOLERANCE);
}

#[test]
fn test_gpu_repeat_runs_identical() {
    let initial = PlateGrid::initialized(&PlateConfig::new(50, 50, 20)).unwrap();
    let (Some(mut first), Some(mut second)) = (gpu_solver(&initial), gpu_solver(&initial)) else {
        return;
    };

    first.run(20).unwrap();
    second.run(20).unwrap();

    let a = first.read_grid().unwrap();
    let b = second.read_grid().unwrap();
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert_eq!(x.to_bits(), y.to_bits(), "determinism failure at index {i}");
    }
}

#[test]
fn test_auto_backend_matches_cpu_backend() {
    let auto = solve(PlateConfig::new(30, 30, 15)).unwrap();
    let cpu = solve(PlateConfig::new(30, 30, 15).with_backend(Backend::Cpu)).unwrap();

    assert_eq!(auto.final_buffer, cpu.final_buffer);
    compare_grids(
        cpu.final_grid.as_slice(),
        auto.final_grid.as_slice(),
        CELL_TOLERANCE,
    );
}

#[test]
fn test_explicit_gpu_request() {
    let grid = PlateGrid::initialized(&PlateConfig::new(16, 16, 0)).unwrap();
    match create_stencil_solver(grid, Backend::Gpu) {
        Ok(solver) => assert!(solver.is_gpu_accelerated()),
        Err(e) => assert!(e.is_fatal(), "unexpected non-fatal error: {e}"),
    }
}
