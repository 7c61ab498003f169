// std
use std::path::PathBuf;
// others
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
// pbrt
use rs_mlt::core::film::Film;
use rs_mlt::core::paramset::ParamSet;
use rs_mlt::core::rng::Rng;
use rs_mlt::core::scene::Scene;
use rs_mlt::integrators::Renderer;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render a JSON scene description with a fixed path length renderer.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// use specified number of threads for rendering
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: usize,
    /// seed of the random number generator
    #[arg(long = "seed", default_value_t = 0)]
    seed: u64,
    /// image file to write (overrides the film's filename)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
    /// The path to the file to read
    path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    // handle command line options
    let args = Cli::parse();
    info!(
        "rs_mlt version {} [Detected {} cores]",
        VERSION,
        num_cpus::get()
    );
    let params = ParamSet::from_file(&args.path)
        .with_context(|| format!("cannot load scene description {}", args.path.display()))?;
    let mut film = match params.child("film") {
        Some(film_params) => Film::create(film_params),
        None => Film::create(&ParamSet::new("film")),
    };
    let scene_params = params.child("scene").unwrap_or(&params);
    let scene = Scene::create(scene_params, film.aspect()).context("cannot build scene")?;
    let renderer_params = params
        .child("renderer")
        .context("scene description has no 'renderer' section")?;
    let renderer = Renderer::create(renderer_params).context("cannot create renderer")?;
    params.report_unused();
    let mut rng = Rng::with_seed(args.seed);
    let summary = renderer
        .render(&scene, &mut rng, &mut film, args.nthreads)
        .context("rendering failed")?;
    info!(
        "Rendered {} sample(s) with {} thread(s)",
        summary.num_samples, summary.num_threads
    );
    if let Some(b) = summary.normalization {
        info!("Normalization factor {}", b);
    }
    let output: PathBuf = args
        .output
        .unwrap_or_else(|| PathBuf::from(&film.filename));
    film.save(&output)
        .with_context(|| format!("cannot write image {}", output.display()))?;
    info!("Wrote {}", output.display());
    Ok(())
}
