use std::{ fs::File, path::PathBuf, str::FromStr };
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use rotgpe::{
    DEF_SAMPLES,
    Params,
    observables::{ density, find_vortices, loop_winding, phase },
    timedep,
};

/// Relax an imprinted multiply charged vortex in a rotating, slightly
/// anisotropic trap and record the state at every checkpoint.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// path to a toml parameter file; defaults are used for missing keys
    #[arg(short, long)]
    toml: Option<PathBuf>,

    /// log level filter (off, error, warn, info, debug, trace)
    #[arg(short, long)]
    verbosity: Option<String>,

    /// output directory
    #[arg(short, long, default_value = "output")]
    outdir: PathBuf,

    /// minimum physical density at which phase singularities are counted
    #[arg(long, default_value_t = 1e-3)]
    min_density: f64,
}

fn stack_frames<I>(frames: I) -> Result<nd::Array3<f64>, nd::ShapeError>
where I: Iterator<Item = nd::Array2<f64>>
{
    let frames: Vec<nd::Array2<f64>> = frames.collect();
    let views: Vec<nd::ArrayView2<f64>>
        = frames.iter().map(|a| a.view()).collect();
    nd::stack(nd::Axis(0), &views)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(LevelFilter::from_str(
            args.verbosity.as_deref().unwrap_or("info"))?)
        .init();

    let params: Params
        = match args.toml.as_ref() {
            Some(path) => Params::load(path)?,
            None => Params::default(),
        };
    log::info!("{params:?}");

    let (grid, evol) = timedep::run(&params)?;
    let quad = params.quadrature;
    let last = evol.last();

    let winding = loop_winding(last, &grid, grid.centre(), 0.3 * params.extent, DEF_SAMPLES);
    log::info!("winding about the centre at r = {}: {}", 0.3 * params.extent, winding);
    let vortices = find_vortices(last, &grid, quad, args.min_density);
    log::info!("found {} phase singularities", vortices.len());
    vortices.iter()
        .for_each(|v| {
            log::info!(
                "  charge {:+} at ({:+.3}, {:+.3})",
                v.charge, v.position[0], v.position[1],
            );
        });

    let rho = stack_frames(evol.q.iter().map(|qk| density(qk, &grid, quad)))?;
    let arg = stack_frames(evol.q.iter().map(phase))?;

    std::fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating {}", args.outdir.display()))?;
    let outfile = args.outdir.join("vortex.npz");
    let mut npz = NpzWriter::new(File::create(&outfile)?);
    npz.add_array("x", &grid.x.coords)?;
    npz.add_array("y", &grid.y.coords)?;
    npz.add_array("t", &evol.t)?;
    npz.add_array("density", &rho)?;
    npz.add_array("phase", &arg)?;
    npz.add_array("energy", &evol.energy)?;
    npz.add_array("mu", &evol.mu)?;
    npz.finish()?;
    log::info!("wrote {}", outfile.display());
    Ok(())
}
