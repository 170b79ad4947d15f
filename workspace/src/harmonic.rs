use std::{ fs::File, path::PathBuf, str::FromStr };
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use num_complex::Complex64 as C64;
use rotgpe::{
    Grid,
    Params,
    Quadrature,
    config::Checkpoints,
    hamiltonian::Hamiltonian,
    observables::density,
    state::gaussian,
    timedep,
    utils::{ Fft2, Transform, fft_shift, fft_shift2, wf_dot, wf_normalized },
};

/// Relax a wide Gaussian in a non-rotating, non-interacting trap and
/// compare against the analytic ground state.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// log level filter (off, error, warn, info, debug, trace)
    #[arg(short, long)]
    verbosity: Option<String>,

    /// output directory
    #[arg(short, long, default_value = "output")]
    outdir: PathBuf,

    /// maximum internal sub-step
    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    /// total imaginary time
    #[arg(long, default_value_t = 10.0)]
    time: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(LevelFilter::from_str(
            args.verbosity.as_deref().unwrap_or("info"))?)
        .init();

    let params = Params {
        extent: 8.0,
        g: 0.0,
        rotation: 0.0,
        dt: args.dt,
        checkpoints: Checkpoints { start: 0.0, step: args.time / 10.0, stop: args.time },
        ..Params::default()
    };
    params.validate()?;
    let quad: Quadrature = params.quadrature;
    let grid = Grid::new(params.extent, params.nx, params.ny)?;
    let h = Hamiltonian::new(&grid, &params)?;
    let q0 = gaussian(&grid, [0.0; 2], [2.0, 2.0], [0.0; 2], quad)?;
    let evol = timedep::imaginary_time(&q0, h, &params.checkpoints.times(), params.dt)?;

    let m = params.mass;
    let exact: nd::Array2<C64>
        = wf_normalized(
            &grid.map(|x, y| {
                C64::from(
                    (-0.5 * m * (params.omega_x * x * x + params.omega_y * y * y)).exp()
                )
            }),
            &grid,
            quad,
        )?;
    let overlap = wf_dot(&exact, evol.last(), &grid, quad).norm();
    let e_exact = 0.5 * (params.omega_x + params.omega_y);
    let e_final = evol.energy[evol.len() - 1];
    log::info!("|⟨exact|final⟩| = {overlap:.12}");
    log::info!("E = {e_final:.10} (exact {e_exact:.10}; error {:.3e})", e_final - e_exact);

    let mut fft = Fft2::new(&grid);
    let mut p = evol.last().clone();
    fft.forward(&mut p, Transform::XY);
    let rho_k = fft_shift2(&p.mapv(|pk| pk.norm_sqr()));

    std::fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating {}", args.outdir.display()))?;
    let outfile = args.outdir.join("harmonic.npz");
    let mut npz = NpzWriter::new(File::create(&outfile)?);
    npz.add_array("x", &grid.x.coords)?;
    npz.add_array("y", &grid.y.coords)?;
    npz.add_array("t", &evol.t)?;
    npz.add_array("energy", &evol.energy)?;
    npz.add_array("deltas", &evol.deltas(&grid, quad))?;
    npz.add_array("density", &density(evol.last(), &grid, quad))?;
    npz.add_array("exact", &density(&exact, &grid, quad))?;
    npz.add_array("kx", &fft_shift(&grid.x.wavenumbers))?;
    npz.add_array("ky", &fft_shift(&grid.y.wavenumbers))?;
    npz.add_array("density_k", &rho_k)?;
    npz.finish()?;
    log::info!("wrote {}", outfile.display());
    Ok(())
}
