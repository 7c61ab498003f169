//! Metropolis light transport restricted to paths of a fixed number of
//! vertices.
//!
//! Every worker runs its own Markov chain over path space. A chain
//! starts from a path traced from the sensor and is then mutated with
//! one of several strategies:
//!
//! - **Bidirectional**: deletes a range of vertices and regrows it from
//!   both sides.
//! - **Lens**: regenerates the eye segment (sensor, specular vertices,
//!   first diffuse or glossy vertex).
//! - **Caustic**: the same from the light endpoint.
//! - **MultiChain**: like **Lens** but through two specular chains.
//! - **Identity**: proposes the current state.
//!
//! After each step the current state is splatted with weight `b /
//! luminance(f)`, where `b` is the normalization factor of the image.

// std
use std::fs;
// others
use log::{debug, info, warn};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};
// pbrt
use crate::core::film::Film;
use crate::core::interaction::{has_type, SurfaceInteractionType, TransportDirection};
use crate::core::parallel::parallel_for;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{clamp_t, Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampling::{Distribution1D, TwoTailedGeometricDist};
use crate::core::scene::Scene;
use crate::integrators::bdpt::{connect_subpaths, Path, Subpath};
use crate::integrators::path::sample_path_by_path_tracing;
use crate::integrators::{accumulate_films, optional_param, required_param, RenderError, RenderSummary};

/// States of the first chain written by `dump_sampled_paths`.
pub const NUM_DUMPED_PATHS: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString, EnumCountMacro)]
pub enum MutationStrategy {
    #[strum(serialize = "bidir")]
    Bidirectional,
    #[strum(serialize = "lens")]
    Lens,
    #[strum(serialize = "caustic")]
    Caustic,
    #[strum(serialize = "multichain")]
    MultiChain,
    #[strum(serialize = "identity")]
    Identity,
}

impl MutationStrategy {
    /// All strategies in declaration order, indexed like the weights.
    pub const ALL: [MutationStrategy; MutationStrategy::COUNT] = [
        MutationStrategy::Bidirectional,
        MutationStrategy::Lens,
        MutationStrategy::Caustic,
        MutationStrategy::MultiChain,
        MutationStrategy::Identity,
    ];
    fn default_weight(&self) -> Float {
        match self {
            MutationStrategy::Identity => 0.0 as Float,
            _ => 1.0 as Float,
        }
    }
}

/// A mutated path together with what is needed to evaluate the
/// transition densities in both directions.
#[derive(Debug, Clone)]
pub struct Proposal<'a> {
    pub path: Path<'a>,
    pub strategy: MutationStrategy,
    /// bidirectional: number of deleted vertices; perturbations: length
    /// of the regenerated segment
    pub kd: usize,
    /// bidirectional: first deleted vertex
    pub dl: usize,
}

/// `min(1, Q(y->x) / Q(x->y))`, or 0 when either direction cannot be
/// evaluated.
pub fn acceptance_ratio(q_xy: Float, q_yx: Float) -> Float {
    if !(q_xy > 0.0 as Float && q_xy.is_finite()) || !(q_yx > 0.0 as Float && q_yx.is_finite()) {
        return 0.0 as Float;
    }
    (q_yx / q_xy).min(1.0 as Float)
}

/// Length of the perturbed segment: from the endpoint on the
/// `trans_dir` side up to and including the `num_chains`-th vertex
/// which is not specular. The other endpoint is never part of it.
pub fn perturbation_segment_length(
    path: &Path,
    trans_dir: TransportDirection,
    num_chains: usize,
) -> Option<usize> {
    let n: usize = path.len();
    let mut found: usize = 0;
    for i in 1..n.saturating_sub(1) {
        if !has_type(path.vertex_from(trans_dir, i).ty, SurfaceInteractionType::S) {
            found += 1;
            if found == num_chains {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Deletes `[dl, dl + kd)` and regrows `kd` vertices from both sides.
pub fn mutate_bidirectional<'a>(
    scene: &'a Scene,
    rng: &mut Rng,
    x: &Path<'a>,
) -> Option<Proposal<'a>> {
    let n: usize = x.len();
    if n < 2 {
        return None;
    }
    // number of deleted vertices
    let mut removed_dist: TwoTailedGeometricDist = TwoTailedGeometricDist::new(2.0 as Float);
    removed_dist.configure(1, 1, n as i32);
    let kd: usize = removed_dist.sample(rng.uniform_float()) as usize;
    // deleted range [dl, dm]
    let dl: usize = clamp_t(
        (rng.uniform_float() * (n - kd + 1) as Float) as usize,
        0,
        n - kd,
    );
    let dm: usize = dl + kd - 1;
    // vertices added from each side
    let al: usize = clamp_t((rng.uniform_float() * (kd + 1) as Float) as usize, 0, kd);
    let am: usize = kd - al;
    let mut subpath_l: Subpath<'a> = Subpath {
        vertices: x.vertices[..dl].to_vec(),
    };
    if subpath_l.sample_subpath_from_endpoint(scene, rng, TransportDirection::LightToEye, al) != al {
        return None;
    }
    let mut subpath_e: Subpath<'a> = Subpath {
        vertices: x.vertices[(dm + 1)..].iter().rev().cloned().collect(),
    };
    if subpath_e.sample_subpath_from_endpoint(scene, rng, TransportDirection::EyeToLight, am) != am {
        return None;
    }
    let path: Path<'a> =
        connect_subpaths(scene, &subpath_l, &subpath_e, subpath_l.len(), subpath_e.len()).ok()?;
    if path.evaluate_f(dl + al).is_black() {
        return None;
    }
    Some(Proposal {
        path,
        strategy: MutationStrategy::Bidirectional,
        kd,
        dl,
    })
}

/// Regenerates the segment found by `perturbation_segment_length`,
/// starting from the same endpoint vertex, and reconnects it with the
/// rest of the path. The new segment must have the same length.
pub fn mutate_perturbation<'a>(
    scene: &'a Scene,
    rng: &mut Rng,
    x: &Path<'a>,
    strategy: MutationStrategy,
    trans_dir: TransportDirection,
    num_chains: usize,
) -> Option<Proposal<'a>> {
    let n: usize = x.len();
    let k: usize = perturbation_segment_length(x, trans_dir, num_chains)?;
    let mut segment: Subpath<'a> = Subpath {
        vertices: vec![*x.vertex_from(trans_dir, 0)],
    };
    let mut found: usize = 0;
    while segment.len() < k {
        if segment.sample_subpath_from_endpoint(scene, rng, trans_dir, 1) == 0 {
            return None;
        }
        if !has_type(segment.vertices[segment.len() - 1].ty, SurfaceInteractionType::S) {
            found += 1;
            if found == num_chains {
                break;
            }
        }
    }
    if segment.len() != k || found != num_chains {
        return None;
    }
    let (subpath_l, subpath_e) = match trans_dir {
        TransportDirection::EyeToLight => (x.split(n - k).0, segment),
        TransportDirection::LightToEye => (segment, x.split(k).1),
    };
    let s: usize = subpath_l.len();
    let path: Path<'a> = connect_subpaths(scene, &subpath_l, &subpath_e, s, subpath_e.len()).ok()?;
    if path.evaluate_f(s).is_black() {
        return None;
    }
    Some(Proposal {
        path,
        strategy,
        kd: k,
        dl: 0,
    })
}

/// Transition function evaluated at the destination `path` of a move
/// described by `proposal`.
pub fn evaluate_q(scene: &Scene, path: &Path, proposal: &Proposal) -> Float {
    let n: usize = path.len();
    match proposal.strategy {
        MutationStrategy::Bidirectional => {
            let mut sum: Float = 0.0 as Float;
            for i in 0..=proposal.kd {
                let s: usize = proposal.dl + i;
                let f: Spectrum = path.evaluate_f(s);
                if f.is_black() {
                    continue;
                }
                let pdf: Float = path.evaluate_path_pdf(scene, s);
                if pdf == 0.0 as Float {
                    continue;
                }
                sum += pdf / f.y();
            }
            sum
        }
        MutationStrategy::Lens | MutationStrategy::MultiChain => {
            let k: usize = proposal.kd;
            let f: Spectrum = path.evaluate_f(n - k);
            if f.is_black() {
                return 0.0 as Float;
            }
            path.evaluate_subpath_pdf(scene, TransportDirection::EyeToLight, k) / f.y()
        }
        MutationStrategy::Caustic => {
            let k: usize = proposal.kd;
            let f: Spectrum = path.evaluate_f(k);
            if f.is_black() {
                return 0.0 as Float;
            }
            path.evaluate_subpath_pdf(scene, TransportDirection::LightToEye, k) / f.y()
        }
        MutationStrategy::Identity => 1.0 as Float,
    }
}

pub fn propose<'a>(
    strategy: MutationStrategy,
    scene: &'a Scene,
    rng: &mut Rng,
    x: &Path<'a>,
) -> Option<Proposal<'a>> {
    match strategy {
        MutationStrategy::Bidirectional => mutate_bidirectional(scene, rng, x),
        MutationStrategy::Lens => {
            mutate_perturbation(scene, rng, x, strategy, TransportDirection::EyeToLight, 1)
        }
        MutationStrategy::Caustic => {
            mutate_perturbation(scene, rng, x, strategy, TransportDirection::LightToEye, 1)
        }
        MutationStrategy::MultiChain => {
            mutate_perturbation(scene, rng, x, strategy, TransportDirection::EyeToLight, 2)
        }
        MutationStrategy::Identity => Some(Proposal {
            path: x.clone(),
            strategy,
            kd: 0,
            dl: 0,
        }),
    }
}

/// Per chain diagnostics, merged after all workers are done.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChainStats {
    pub accepted: u64,
    pub rejected: u64,
    pub longest_rejection_streak: u64,
    current_rejection_streak: u64,
    /// indexed by `MutationStrategy as usize`
    pub proposed: [u64; MutationStrategy::COUNT],
    pub strategy_accepted: [u64; MutationStrategy::COUNT],
}

impl ChainStats {
    pub fn record(&mut self, strategy: MutationStrategy, accepted: bool) {
        self.proposed[strategy as usize] += 1;
        if accepted {
            self.accepted += 1;
            self.strategy_accepted[strategy as usize] += 1;
            self.current_rejection_streak = 0;
        } else {
            self.rejected += 1;
            self.current_rejection_streak += 1;
            self.longest_rejection_streak = self
                .longest_rejection_streak
                .max(self.current_rejection_streak);
        }
    }
    pub fn merge(&mut self, other: &ChainStats) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.longest_rejection_streak = self
            .longest_rejection_streak
            .max(other.longest_rejection_streak);
        for i in 0..MutationStrategy::COUNT {
            self.proposed[i] += other.proposed[i];
            self.strategy_accepted[i] += other.strategy_accepted[i];
        }
    }
    pub fn acceptance_rate(&self) -> Float {
        let total: u64 = self.accepted + self.rejected;
        if total == 0 {
            return 0.0 as Float;
        }
        self.accepted as Float / total as Float
    }
    fn log(&self) {
        info!(
            "Acceptance rate {:.4} ({} accepted, {} rejected, longest rejection streak {})",
            self.acceptance_rate(),
            self.accepted,
            self.rejected,
            self.longest_rejection_streak
        );
        for strategy in MutationStrategy::iter() {
            let i: usize = strategy as usize;
            if self.proposed[i] > 0 {
                debug!(
                    "  {:<10} {} of {} accepted",
                    strategy.to_string(),
                    self.strategy_accepted[i],
                    self.proposed[i]
                );
            }
        }
    }
}

struct SeedContext {
    rng: Rng,
    sum: f64,
}

struct MLTContext<'a> {
    rng: Rng,
    film: Film,
    current: Path<'a>,
    stats: ChainStats,
    /// vertex positions of visited states, first chain only
    sampled_paths: Vec<String>,
}

pub struct MLTFixedRenderer {
    pub num_vertices: usize,
    pub num_mutations: u64,
    pub num_seed_samples: u64,
    /// constant normalization factor replacing the estimate
    pub normalization: Option<Float>,
    /// indexed by `MutationStrategy as usize`
    pub strategy_weights: Vec<Float>,
    pub max_initial_attempts: u64,
    pub dump_sampled_paths: Option<String>,
}

impl MLTFixedRenderer {
    pub fn initialize(params: &ParamSet) -> Result<Self, RenderError> {
        let num_vertices: usize = required_param(params, "num_vertices")?;
        if num_vertices < 2 {
            return Err(RenderError::InvalidParameter {
                name: "num_vertices",
                reason: format!("a path needs at least two vertices, got {}", num_vertices),
            });
        }
        let num_mutations: u64 = required_param(params, "num_mutations")?;
        let normalization: Option<Float> = optional_param(params, "normalization")?;
        let num_seed_samples: u64 = match normalization {
            Some(_) => optional_param(params, "num_seed_samples")?.unwrap_or(0),
            None => required_param(params, "num_seed_samples")?,
        };
        let strategy_weights: Vec<Float> = match params.child("strategy_weights") {
            Some(weights) => MutationStrategy::iter()
                .map(|strategy| weights.find_one(&strategy.to_string(), strategy.default_weight()))
                .collect(),
            None => MutationStrategy::iter()
                .map(|strategy| strategy.default_weight())
                .collect(),
        };
        if strategy_weights.iter().any(|w| *w < 0.0 as Float || !w.is_finite()) {
            return Err(RenderError::InvalidParameter {
                name: "strategy_weights",
                reason: String::from("weights must be finite and non-negative"),
            });
        }
        if strategy_weights.iter().all(|w| *w == 0.0 as Float) {
            return Err(RenderError::InvalidParameter {
                name: "strategy_weights",
                reason: String::from("at least one mutation strategy needs a positive weight"),
            });
        }
        let max_initial_attempts: u64 = optional_param(params, "max_initial_attempts")?.unwrap_or(1_000_000);
        let dump_sampled_paths: Option<String> = optional_param(params, "dump_sampled_paths")?;
        Ok(MLTFixedRenderer {
            num_vertices,
            num_mutations,
            num_seed_samples,
            normalization,
            strategy_weights,
            max_initial_attempts,
            dump_sampled_paths,
        })
    }
    /// Mean luminance of `f / p` over plain path traced seed samples;
    /// failed samples count as 0. The samples are split over
    /// `num_threads` workers with their own RNG and partial sum.
    pub fn estimate_normalization(&self, scene: &Scene, init_rng: &mut Rng, num_threads: usize) -> Float {
        if self.num_seed_samples == 0 {
            return 0.0 as Float;
        }
        let mut contexts: Vec<SeedContext> = (0..num_threads.max(1))
            .map(|_| SeedContext {
                rng: Rng::with_seed(init_rng.uniform_uint32() as u64),
                sum: 0.0,
            })
            .collect();
        parallel_for(self.num_seed_samples, &mut contexts, |_index, _thread_id, ctx| {
            if let Ok(path) = sample_path_by_path_tracing(scene, &mut ctx.rng, self.num_vertices) {
                ctx.sum += path.evaluate_unweight_contribution(scene, 0).y() as f64;
            }
        });
        let sum: f64 = contexts.iter().map(|ctx| ctx.sum).sum();
        (sum / self.num_seed_samples as f64) as Float
    }
    /// Traces paths until one has a non-zero contribution.
    pub fn initial_state<'a>(&self, scene: &'a Scene, rng: &mut Rng) -> Result<Path<'a>, RenderError> {
        for attempt in 0..self.max_initial_attempts {
            let path: Path<'a> = match sample_path_by_path_tracing(scene, rng, self.num_vertices) {
                Ok(path) => path,
                Err(_) => continue,
            };
            let f: Spectrum = path.evaluate_f(0);
            if !f.is_black() && f.is_valid() && path.raster_position().is_some() {
                debug!("Found initial state after {} attempt(s)", attempt + 1);
                return Ok(path);
            }
        }
        Err(RenderError::InitialStateNotFound(self.max_initial_attempts))
    }
    fn step<'a>(
        &self,
        scene: &'a Scene,
        strategy_distr: &Distribution1D,
        b: Float,
        ctx: &mut MLTContext<'a>,
    ) {
        let strategy: MutationStrategy =
            MutationStrategy::ALL[strategy_distr.sample_discrete(ctx.rng.uniform_float())];
        let accepted: bool = match propose(strategy, scene, &mut ctx.rng, &ctx.current) {
            Some(proposal) => {
                let q_xy: Float = evaluate_q(scene, &proposal.path, &proposal);
                let q_yx: Float = evaluate_q(scene, &ctx.current, &proposal);
                let a: Float = acceptance_ratio(q_xy, q_yx);
                if ctx.rng.uniform_float() < a {
                    ctx.current = proposal.path;
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        ctx.stats.record(strategy, accepted);
        // accumulate the current state
        let f: Spectrum = ctx.current.evaluate_f(0);
        let lum: Float = f.y();
        if lum > 0.0 as Float {
            if let Some(raster) = ctx.current.raster_position() {
                ctx.film.splat(&raster, &(f * (b / lum)));
            }
        }
    }
    pub fn render(
        &self,
        scene: &Scene,
        init_rng: &mut Rng,
        film: &mut Film,
        num_threads: usize,
    ) -> Result<RenderSummary, RenderError> {
        // normalization factor
        let b: Float = match self.normalization {
            Some(b) => b,
            None => {
                info!(
                    "Estimating normalization factor from {} seed sample(s) ...",
                    self.num_seed_samples
                );
                self.estimate_normalization(scene, init_rng, num_threads)
            }
        };
        info!("Normalization factor {}", b);
        if b == 0.0 as Float {
            warn!("Normalization factor is zero, the image will be black");
        }
        let strategy_distr: Distribution1D = Distribution1D::new(self.strategy_weights.clone());
        // initial states
        let mut contexts: Vec<MLTContext> = Vec::with_capacity(num_threads);
        for _ in 0..num_threads {
            let mut rng: Rng = Rng::with_seed(init_rng.uniform_uint32() as u64);
            let current: Path = self.initial_state(scene, &mut rng)?;
            let mut worker_film: Film = film.clone();
            worker_film.clear();
            contexts.push(MLTContext {
                rng,
                film: worker_film,
                current,
                stats: ChainStats::default(),
                sampled_paths: Vec::new(),
            });
        }
        info!(
            "Rendering {} mutation(s) of paths with {} vertices with {} thread(s) ...",
            self.num_mutations, self.num_vertices, num_threads
        );
        let dump: bool = self.dump_sampled_paths.is_some();
        parallel_for(self.num_mutations, &mut contexts, |_index, thread_id, ctx| {
            self.step(scene, &strategy_distr, b, ctx);
            if dump && thread_id == 0 && ctx.sampled_paths.len() < NUM_DUMPED_PATHS {
                let line: Vec<String> = ctx
                    .current
                    .vertices
                    .iter()
                    .map(|v| format!("{} {} {}", v.geom.p.x, v.geom.p.y, v.geom.p.z))
                    .collect();
                ctx.sampled_paths.push(line.join(" "));
            }
        });
        // statistics
        let mut stats: ChainStats = ChainStats::default();
        for ctx in &contexts {
            stats.merge(&ctx.stats);
        }
        stats.log();
        if let (Some(path), Some(ctx)) = (&self.dump_sampled_paths, contexts.first()) {
            info!("Writing {} sampled path(s) to {:?}", ctx.sampled_paths.len(), path);
            let mut text: String = ctx.sampled_paths.join("\n");
            text.push('\n');
            fs::write(path, text).map_err(|source| RenderError::Dump {
                path: path.clone(),
                source,
            })?;
        }
        let worker_films: Vec<&Film> = contexts.iter().map(|ctx| &ctx.film).collect();
        accumulate_films(film, &worker_films, self.num_mutations)?;
        Ok(RenderSummary {
            num_threads,
            num_samples: self.num_mutations,
            normalization: Some(b),
            stats: Some(stats),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::reflection::{Bsdf, FresnelBsdf, MirrorBsdf};
    use crate::integrators::testing::{box_scene, box_scene_with_sphere, quad_light_scene};
    use serde_json::json;
    use std::str::FromStr;

    fn initial_paths<'a>(scene: &'a Scene, n: usize, count: usize, seed: u64) -> Vec<Path<'a>> {
        let mut rng = Rng::with_seed(seed);
        let mut paths: Vec<Path<'a>> = Vec::new();
        for _ in 0..(count * 1000) {
            if paths.len() == count {
                break;
            }
            if let Ok(path) = sample_path_by_path_tracing(scene, &mut rng, n) {
                if !path.evaluate_f(0).is_black() {
                    paths.push(path);
                }
            }
        }
        paths
    }

    #[test]
    fn acceptance_ratio_bounds() {
        assert_eq!(acceptance_ratio(1.0, 2.0), 1.0);
        assert_eq!(acceptance_ratio(2.0, 1.0), 0.5);
        assert_eq!(acceptance_ratio(0.0, 1.0), 0.0);
        assert_eq!(acceptance_ratio(1.0, 0.0), 0.0);
        assert_eq!(acceptance_ratio(-1.0, 1.0), 0.0);
        assert_eq!(acceptance_ratio(Float::NAN, 1.0), 0.0);
        assert_eq!(acceptance_ratio(1.0, Float::INFINITY), 0.0);
        let mut rng = Rng::with_seed(5);
        for _ in 0..1000 {
            let a = acceptance_ratio(rng.uniform_float() * 10.0, rng.uniform_float() * 10.0);
            assert!(a >= 0.0 && a <= 1.0);
        }
    }

    #[test]
    fn strategy_names() {
        assert_eq!(MutationStrategy::Bidirectional.to_string(), "bidir");
        assert_eq!(MutationStrategy::from_str("multichain").unwrap(), MutationStrategy::MultiChain);
        assert_eq!(MutationStrategy::COUNT, 5);
        let order: Vec<MutationStrategy> = MutationStrategy::iter().collect();
        assert_eq!(order[0], MutationStrategy::Bidirectional);
        assert_eq!(order[4], MutationStrategy::Identity);
    }

    #[test]
    fn strategy_table_matches_weight_order() {
        for (i, strategy) in MutationStrategy::iter().enumerate() {
            assert_eq!(MutationStrategy::ALL[i], strategy);
            assert_eq!(strategy as usize, i);
        }
        // a single positive weight always selects its strategy
        let mut weights: Vec<Float> = vec![0.0; MutationStrategy::COUNT];
        weights[MutationStrategy::Caustic as usize] = 1.0;
        let distr = Distribution1D::new(weights);
        let mut rng = Rng::with_seed(3);
        for _ in 0..100 {
            let strategy = MutationStrategy::ALL[distr.sample_discrete(rng.uniform_float())];
            assert_eq!(strategy, MutationStrategy::Caustic);
        }
    }

    #[test]
    fn normalization_does_not_depend_on_the_thread_count() {
        // the light covers 1/16 of the image
        let scene = quad_light_scene();
        let params = ParamSet::from_json(
            "renderer",
            &json!({ "num_vertices": 2, "num_mutations": 10, "num_seed_samples": 40000 }),
        );
        let renderer = MLTFixedRenderer::initialize(&params).unwrap();
        let mut rng = Rng::with_seed(17);
        let b1 = renderer.estimate_normalization(&scene, &mut rng, 1);
        let b4 = renderer.estimate_normalization(&scene, &mut rng, 4);
        assert!((b1 - 1.0 / 16.0).abs() < 0.01, "b1 {}", b1);
        assert!((b4 - 1.0 / 16.0).abs() < 0.01, "b4 {}", b4);
        assert!((b1 - b4).abs() < 0.01);
    }

    #[test]
    fn initialize_reads_weights() {
        let params = ParamSet::from_json(
            "renderer",
            &json!({ "num_vertices": 3, "num_mutations": 100, "num_seed_samples": 10 }),
        );
        let renderer = MLTFixedRenderer::initialize(&params).unwrap();
        assert_eq!(renderer.strategy_weights, vec![1.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(renderer.max_initial_attempts, 1_000_000);
        assert!(renderer.normalization.is_none());
        let params = ParamSet::from_json(
            "renderer",
            &json!({
                "num_vertices": 3,
                "num_mutations": 100,
                "normalization": 2.5,
                "strategy_weights": { "bidir": 0, "lens": 0, "caustic": 0, "multichain": 0, "identity": 0 }
            }),
        );
        assert!(matches!(
            MLTFixedRenderer::initialize(&params),
            Err(RenderError::InvalidParameter { name: "strategy_weights", .. })
        ));
        let params = ParamSet::from_json(
            "renderer",
            &json!({ "num_vertices": 3, "num_mutations": 100 }),
        );
        assert!(matches!(
            MLTFixedRenderer::initialize(&params),
            Err(RenderError::MissingParameter("num_seed_samples"))
        ));
    }

    #[test]
    fn chain_stats_merge() {
        let mut a = ChainStats::default();
        a.record(MutationStrategy::Lens, false);
        a.record(MutationStrategy::Lens, false);
        a.record(MutationStrategy::Bidirectional, true);
        let mut b = ChainStats::default();
        b.record(MutationStrategy::Lens, false);
        b.record(MutationStrategy::Lens, false);
        b.record(MutationStrategy::Lens, false);
        a.merge(&b);
        assert_eq!(a.accepted, 1);
        assert_eq!(a.rejected, 5);
        assert_eq!(a.longest_rejection_streak, 3);
        assert_eq!(a.proposed[MutationStrategy::Lens as usize], 5);
        assert_eq!(a.strategy_accepted[MutationStrategy::Bidirectional as usize], 1);
        assert!((a.acceptance_rate() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn bidirectional_proposals_keep_the_length() {
        let scene = box_scene();
        let mut rng = Rng::with_seed(13);
        for n in 2..=4 {
            let mut num_proposals = 0;
            for x in initial_paths(&scene, n, 10, 7 + n as u64) {
                for _ in 0..20 {
                    if let Some(proposal) = mutate_bidirectional(&scene, &mut rng, &x) {
                        assert_eq!(proposal.path.len(), n);
                        assert!(proposal.kd >= 1 && proposal.kd <= n);
                        assert!(proposal.dl + proposal.kd <= n);
                        assert!(!proposal.path.evaluate_f(0).is_black());
                        let q_xy = evaluate_q(&scene, &proposal.path, &proposal);
                        let q_yx = evaluate_q(&scene, &x, &proposal);
                        assert!(q_xy > 0.0 && q_yx > 0.0);
                        num_proposals += 1;
                    }
                }
            }
            assert!(num_proposals > 0);
        }
    }

    #[test]
    fn lens_perturbation_regrows_the_eye_segment() {
        let scene = box_scene_with_sphere(Bsdf::Mirror(MirrorBsdf::new(Spectrum::new(0.9))));
        let mut rng = Rng::with_seed(23);
        let mut num_proposals = 0;
        for x in initial_paths(&scene, 4, 40, 3) {
            let k = match perturbation_segment_length(&x, TransportDirection::EyeToLight, 1) {
                Some(k) => k,
                None => continue,
            };
            for _ in 0..10 {
                if let Some(proposal) =
                    propose(MutationStrategy::Lens, &scene, &mut rng, &x)
                {
                    let y = &proposal.path;
                    assert_eq!(proposal.kd, k);
                    assert_eq!(
                        perturbation_segment_length(y, TransportDirection::EyeToLight, 1),
                        Some(k)
                    );
                    // the light prefix is kept
                    for i in 0..(4 - k) {
                        assert_eq!(y.vertices[i].geom.p, x.vertices[i].geom.p);
                    }
                    assert!(evaluate_q(&scene, y, &proposal) > 0.0);
                    num_proposals += 1;
                }
            }
        }
        assert!(num_proposals > 0);
    }

    #[test]
    fn caustic_perturbation_keeps_the_eye_suffix() {
        let glass = Bsdf::Fresnel(FresnelBsdf::new(Spectrum::new(1.0), 1.0, 1.5));
        let scene = box_scene_with_sphere(glass);
        let mut rng = Rng::with_seed(31);
        let mut num_proposals = 0;
        for x in initial_paths(&scene, 3, 40, 8) {
            let k = match perturbation_segment_length(&x, TransportDirection::LightToEye, 1) {
                Some(k) => k,
                None => continue,
            };
            for _ in 0..10 {
                if let Some(proposal) =
                    propose(MutationStrategy::Caustic, &scene, &mut rng, &x)
                {
                    let y = &proposal.path;
                    assert_eq!(y.len(), x.len());
                    for i in k..x.len() {
                        assert_eq!(y.vertices[i].geom.p, x.vertices[i].geom.p);
                    }
                    // same light endpoint
                    assert_eq!(y.vertices[0].geom.p, x.vertices[0].geom.p);
                    num_proposals += 1;
                }
            }
        }
        assert!(num_proposals > 0);
    }

    #[test]
    fn segment_lengths() {
        let scene = box_scene();
        for x in initial_paths(&scene, 4, 10, 19) {
            // no specular vertices: segments end at the first inner vertex
            assert_eq!(perturbation_segment_length(&x, TransportDirection::EyeToLight, 1), Some(2));
            assert_eq!(perturbation_segment_length(&x, TransportDirection::LightToEye, 1), Some(2));
            assert_eq!(perturbation_segment_length(&x, TransportDirection::EyeToLight, 2), Some(3));
            assert_eq!(perturbation_segment_length(&x, TransportDirection::EyeToLight, 3), None);
        }
        for x in initial_paths(&scene, 2, 3, 19) {
            assert_eq!(perturbation_segment_length(&x, TransportDirection::EyeToLight, 1), None);
        }
    }

    #[test]
    fn identity_proposal_is_always_accepted() {
        let scene = box_scene();
        let mut rng = Rng::with_seed(1);
        for x in initial_paths(&scene, 3, 5, 2) {
            let proposal = propose(MutationStrategy::Identity, &scene, &mut rng, &x).unwrap();
            let a = acceptance_ratio(
                evaluate_q(&scene, &proposal.path, &proposal),
                evaluate_q(&scene, &x, &proposal),
            );
            assert_eq!(a, 1.0);
        }
    }

    #[test]
    fn burn_in_gives_up() {
        let scene = box_scene();
        let params = ParamSet::from_json(
            "renderer",
            &json!({
                "num_vertices": 3,
                "num_mutations": 10,
                "normalization": 1.0,
                "max_initial_attempts": 0
            }),
        );
        let renderer = MLTFixedRenderer::initialize(&params).unwrap();
        let mut rng = Rng::with_seed(1);
        assert!(matches!(
            renderer.initial_state(&scene, &mut rng),
            Err(RenderError::InitialStateNotFound(0))
        ));
        let mut film = Film::new(4, 4, "test.png");
        assert!(renderer.render(&scene, &mut rng, &mut film, 1).is_err());
    }

    #[test]
    fn dumps_sampled_paths() {
        let scene = box_scene();
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("paths.txt");
        let params = ParamSet::from_json(
            "renderer",
            &json!({
                "num_vertices": 3,
                "num_mutations": 500,
                "normalization": 1.0,
                "dump_sampled_paths": dump.display().to_string()
            }),
        );
        let renderer = MLTFixedRenderer::initialize(&params).unwrap();
        let mut rng = Rng::with_seed(3);
        let mut film = Film::new(8, 8, "test.png");
        let summary = renderer.render(&scene, &mut rng, &mut film, 1).unwrap();
        assert_eq!(summary.normalization, Some(1.0));
        let text = fs::read_to_string(&dump).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), NUM_DUMPED_PATHS);
        // three vertices with three coordinates each
        assert!(lines.iter().all(|l| l.split_whitespace().count() == 9));
    }
}
