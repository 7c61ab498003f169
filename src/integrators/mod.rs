//! **Renderer** is the closed set of light transport algorithms which
//! estimate the image for paths of exactly `num_vertices` vertices:
//!
//! - BDPTFixedRenderer
//! - MLTFixedRenderer
//!
//! ## Bidirectional Path Tracing (BDPT)
//!
//! Bidirectional path tracing constructs paths that start from the
//! sensor on one end, from a light on the other end, and connects them
//! in the middle with a visibility ray. All strategies producing a path
//! of the requested length are combined with multiple importance
//! sampling (power heuristic).
//!
//! ## Metropolis Light Transport (MLT)
//!
//! Every worker runs a Markov chain over the space of paths with the
//! requested length. The chain is mutated with bidirectional
//! mutations, lens, caustic and multi-chain perturbations, and the
//! image is scaled by a normalization factor estimated from plain path
//! traced seed samples.

// others
use log::info;
use thiserror::Error;
// pbrt
use crate::core::film::{Film, FilmError};
use crate::core::paramset::{FromParam, ParamSet};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::integrators::bdpt::BDPTFixedRenderer;
use crate::integrators::mlt::{ChainStats, MLTFixedRenderer};

pub mod bdpt;
pub mod mlt;
pub mod path;
#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("missing renderer parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("invalid renderer parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("unknown renderer type '{0}'")]
    UnknownRenderer(String),
    #[error("no path with non-zero contribution found in {0} attempt(s)")]
    InitialStateNotFound(u64),
    #[error("cannot write sampled paths to {path}")]
    Dump {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Film(#[from] FilmError),
}

/// What a finished render reports back.
#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub num_threads: usize,
    pub num_samples: u64,
    /// MLT only
    pub normalization: Option<Float>,
    /// MLT only, merged over all chains
    pub stats: Option<ChainStats>,
}

pub enum Renderer {
    BDPTFixed(BDPTFixedRenderer),
    MLTFixed(MLTFixedRenderer),
}

impl Renderer {
    pub fn create(params: &ParamSet) -> Result<Renderer, RenderError> {
        let renderer_type: String = required_param(params, "type")?;
        match renderer_type.as_str() {
            "bdptfixed" => Ok(Renderer::BDPTFixed(BDPTFixedRenderer::initialize(params)?)),
            "mltfixed" => Ok(Renderer::MLTFixed(MLTFixedRenderer::initialize(params)?)),
            _ => Err(RenderError::UnknownRenderer(renderer_type)),
        }
    }
    /// Renders into `film`. A thread count of 0 uses all cores.
    pub fn render(
        &self,
        scene: &Scene,
        init_rng: &mut Rng,
        film: &mut Film,
        num_threads: usize,
    ) -> Result<RenderSummary, RenderError> {
        let num_threads: usize = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads
        };
        match self {
            Renderer::BDPTFixed(renderer) => renderer.render(scene, init_rng, film, num_threads),
            Renderer::MLTFixed(renderer) => renderer.render(scene, init_rng, film, num_threads),
        }
    }
}

/// Reads a parameter which must be present and well formed.
pub fn required_param<T: FromParam>(params: &ParamSet, name: &'static str) -> Result<T, RenderError> {
    if !params.has(name) {
        return Err(RenderError::MissingParameter(name));
    }
    params
        .find_required(name)
        .ok_or_else(|| RenderError::InvalidParameter {
            name,
            reason: String::from("value cannot be parsed"),
        })
}

/// Reads a parameter which may be absent but must be well formed when
/// present.
pub fn optional_param<T: FromParam>(params: &ParamSet, name: &'static str) -> Result<Option<T>, RenderError> {
    if !params.has(name) {
        return Ok(None);
    }
    required_param(params, name).map(Some)
}

/// Replaces the content of `film` by the sum of the worker films,
/// scaled to the per pixel estimate for `num_samples` samples.
pub fn accumulate_films(film: &mut Film, worker_films: &[&Film], num_samples: u64) -> Result<(), RenderError> {
    film.clear();
    for worker_film in worker_films {
        film.accumulate(worker_film)?;
    }
    if num_samples > 0 {
        film.rescale((film.width * film.height) as Float / num_samples as Float);
    }
    info!("Accumulated {} film(s)", worker_films.len());
    Ok(())
}
