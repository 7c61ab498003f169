//! Path space representation and fixed length bidirectional path
//! tracing.
//!
//! A **Subpath** is a sequence of vertices rooted at an endpoint (a
//! light for `LightToEye`, the sensor for `EyeToLight`). A **Path** of
//! `n` vertices is built by connecting the first `s` vertices of a
//! light subpath with the first `t` vertices of an eye subpath (`s + t
//! == n`); index 0 is always the light endpoint and index `n - 1` the
//! eye endpoint.
//!
//! All quantities are expressed in the area product measure: the
//! measurement contribution `f` collects emission, BSDFs, sensor
//! importance and geometry terms, and the path density for strategy
//! `(s, t)` collects the area densities of the vertices sampled from
//! either endpoint.
//!
//! The **BDPTFixedRenderer** only accumulates paths of exactly
//! `num_vertices` vertices, combining the strategies with the power
//! heuristic.

// std
use std::cmp::{max, min};
// others
use log::info;
use thiserror::Error;
// pbrt
use crate::core::film::Film;
use crate::core::geometry::{Point2f, Ray, Vector3f};
use crate::core::interaction::{geometry_term, has_type, type_char};
use crate::core::interaction::{SurfaceGeometry, SurfaceInteractionType, TransportDirection};
use crate::core::parallel::parallel_for;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum, SHADOW_EPSILON};
use crate::core::primitive::Primitive;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::integrators::{accumulate_films, optional_param, required_param, RenderError, RenderSummary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot take {s} light and {t} eye vertices from subpaths of length {num_light} and {num_eye}")]
    SliceOutOfRange {
        s: usize,
        t: usize,
        num_light: usize,
        num_eye: usize,
    },
    #[error("a path needs at least two vertices, got {0}")]
    TooShort(usize),
    #[error("connecting edge is occluded")]
    Occluded,
    #[error("cannot connect at a vertex with a delta direction")]
    DeltaConnection,
    #[error("endpoint cannot emit or sense")]
    InvalidEndpoint,
    #[error("sampled subpath has {0} of {1} vertices")]
    IncompleteSubpath(usize, usize),
}

#[derive(Debug, Copy, Clone)]
pub struct PathVertex<'a> {
    /// interaction type (L, E, D, G or S)
    pub ty: u8,
    pub geom: SurfaceGeometry,
    pub primitive: &'a Primitive,
}

impl<'a> PathVertex<'a> {
    fn direction_to(&self, other: &PathVertex) -> Vector3f {
        (other.geom.p - self.geom.p).normalize()
    }
}

fn to_neighbor(v: &PathVertex, neighbor: Option<&PathVertex>) -> Vector3f {
    match neighbor {
        Some(neighbor) => v.direction_to(neighbor),
        None => Vector3f::default(),
    }
}

#[derive(Debug, Default, Clone)]
pub struct Subpath<'a> {
    pub vertices: Vec<PathVertex<'a>>,
}

impl<'a> Subpath<'a> {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
    /// Extends the subpath by up to `max_vertices` vertices and returns
    /// the number of vertices added. An empty subpath starts with an
    /// emitter endpoint sampled from the scene.
    pub fn sample_subpath_from_endpoint(
        &mut self,
        scene: &'a Scene,
        rng: &mut Rng,
        trans_dir: TransportDirection,
        max_vertices: usize,
    ) -> usize {
        let mut num_added: usize = 0;
        if max_vertices == 0 {
            return num_added;
        }
        if self.vertices.is_empty() {
            // sample the endpoint
            let ty: u8 = match trans_dir {
                TransportDirection::LightToEye => SurfaceInteractionType::L as u8,
                TransportDirection::EyeToLight => SurfaceInteractionType::E as u8,
            };
            let emitter: &'a Primitive = match scene.sample_emitter(ty, rng.uniform_float()) {
                Some(emitter) => emitter,
                None => return num_added,
            };
            let geom: SurfaceGeometry = match emitter.sample_position(&rng.uniform_point2f()) {
                Some(geom) => geom,
                None => return num_added,
            };
            self.vertices.push(PathVertex {
                ty,
                geom,
                primitive: emitter,
            });
            num_added += 1;
        }
        while num_added < max_vertices {
            let num_vertices: usize = self.vertices.len();
            let pv: PathVertex<'a> = self.vertices[num_vertices - 1];
            let ppv: Option<&PathVertex> = if num_vertices > 1 {
                Some(&self.vertices[num_vertices - 2])
            } else {
                None
            };
            let wi: Vector3f = to_neighbor(&pv, ppv);
            let u: Point2f = rng.uniform_point2f();
            let u_comp: Float = rng.uniform_float();
            let wo: Vector3f = match pv.primitive.sample_direction(&u, u_comp, pv.ty, &pv.geom, &wi) {
                Some(wo) => wo,
                None => break,
            };
            let f: Spectrum = pv
                .primitive
                .evaluate_direction(&pv.geom, pv.ty, &wi, &wo, trans_dir, true);
            if f.is_black() {
                break;
            }
            let ray: Ray = Ray::new(pv.geom.p, wo, SHADOW_EPSILON, Float::INFINITY);
            let (geom, primitive) = match scene.intersect(&ray) {
                Some(hit) => hit,
                None => break,
            };
            self.vertices.push(PathVertex {
                ty: primitive.bsdf_type(),
                geom,
                primitive,
            });
            num_added += 1;
        }
        num_added
    }
}

#[derive(Debug, Default, Clone)]
pub struct Path<'a> {
    pub vertices: Vec<PathVertex<'a>>,
}

/// Builds the path `L[0..s]` followed by `E[0..t]` reversed.
pub fn connect_subpaths<'a>(
    scene: &Scene,
    subpath_l: &Subpath<'a>,
    subpath_e: &Subpath<'a>,
    s: usize,
    t: usize,
) -> Result<Path<'a>, PathError> {
    if s > subpath_l.len() || t > subpath_e.len() {
        return Err(PathError::SliceOutOfRange {
            s,
            t,
            num_light: subpath_l.len(),
            num_eye: subpath_e.len(),
        });
    }
    let n: usize = s + t;
    if n < 2 {
        return Err(PathError::TooShort(n));
    }
    let mut vertices: Vec<PathVertex<'a>> = Vec::with_capacity(n);
    vertices.extend_from_slice(&subpath_l.vertices[..s]);
    vertices.extend(subpath_e.vertices[..t].iter().rev().cloned());
    if s == 0 {
        // the eye subpath hit a light
        let v: &mut PathVertex<'a> = &mut vertices[0];
        let ty: u8 = SurfaceInteractionType::L as u8;
        if !has_type(v.primitive.get_type(), SurfaceInteractionType::L)
            || v.primitive.is_delta_position(ty)
        {
            return Err(PathError::InvalidEndpoint);
        }
        v.ty = ty;
    } else if t == 0 {
        // the light subpath hit the sensor
        let v: &mut PathVertex<'a> = &mut vertices[n - 1];
        let ty: u8 = SurfaceInteractionType::E as u8;
        if !has_type(v.primitive.get_type(), SurfaceInteractionType::E)
            || v.primitive.is_delta_position(ty)
        {
            return Err(PathError::InvalidEndpoint);
        }
        v.ty = ty;
    } else {
        let vl: &PathVertex = &vertices[s - 1];
        let ve: &PathVertex = &vertices[s];
        if vl.primitive.is_delta_direction(vl.ty) || ve.primitive.is_delta_direction(ve.ty) {
            return Err(PathError::DeltaConnection);
        }
        if !scene.visible(&vl.geom, &ve.geom) {
            return Err(PathError::Occluded);
        }
    }
    Ok(Path { vertices })
}

impl<'a> Path<'a> {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
    /// The `i`-th vertex counted from the endpoint where subpaths with
    /// the given transport direction start.
    pub fn vertex_from(&self, trans_dir: TransportDirection, i: usize) -> &PathVertex<'a> {
        match trans_dir {
            TransportDirection::LightToEye => &self.vertices[i],
            TransportDirection::EyeToLight => &self.vertices[self.vertices.len() - 1 - i],
        }
    }
    fn neighbor_from(&self, trans_dir: TransportDirection, i: isize) -> Option<&PathVertex<'a>> {
        if i < 0 || i as usize >= self.vertices.len() {
            return None;
        }
        Some(self.vertex_from(trans_dir, i as usize))
    }
    /// Product of emission (or importance), BSDFs and geometry terms of
    /// the first `k` vertices seen from one endpoint, up to but
    /// excluding the connection. Delta components are included.
    fn evaluate_subpath_f(&self, trans_dir: TransportDirection, k: usize) -> Spectrum {
        let mut f: Spectrum = Spectrum::new(1.0 as Float);
        if k == 0 {
            return f;
        }
        let v0: &PathVertex = self.vertex_from(trans_dir, 0);
        f *= v0.primitive.evaluate_position(&v0.geom, true);
        for i in 0..(k - 1) {
            let v: &PathVertex = self.vertex_from(trans_dir, i);
            let vn: &PathVertex = self.vertex_from(trans_dir, i + 1);
            let wi: Vector3f = to_neighbor(v, self.neighbor_from(trans_dir, i as isize - 1));
            let wo: Vector3f = v.direction_to(vn);
            f *= v
                .primitive
                .evaluate_direction(&v.geom, v.ty, &wi, &wo, trans_dir, true);
            f *= geometry_term(&v.geom, &vn.geom);
        }
        f
    }
    /// Measurement contribution evaluated with `s` light and `n - s` eye
    /// vertices. The value does not depend on `s` as long as the path
    /// can be connected there.
    pub fn evaluate_f(&self, s: usize) -> Spectrum {
        let n: usize = self.len();
        if s > n || n < 2 {
            return Spectrum::default();
        }
        let t: usize = n - s;
        let f_l: Spectrum = self.evaluate_subpath_f(TransportDirection::LightToEye, s);
        if f_l.is_black() {
            return Spectrum::default();
        }
        let f_e: Spectrum = self.evaluate_subpath_f(TransportDirection::EyeToLight, t);
        if f_e.is_black() {
            return Spectrum::default();
        }
        f_l * self.evaluate_cst(s) * f_e
    }
    /// Connection term of the strategy with `s` light vertices, without
    /// delta components.
    pub fn evaluate_cst(&self, s: usize) -> Spectrum {
        let n: usize = self.len();
        if s > n || n < 2 {
            return Spectrum::default();
        }
        let t: usize = n - s;
        if s == 0 {
            let v: &PathVertex = &self.vertices[0];
            let vn: &PathVertex = &self.vertices[1];
            v.primitive.evaluate_position(&v.geom, false)
                * v.primitive.evaluate_direction(
                    &v.geom,
                    v.ty,
                    &Vector3f::default(),
                    &v.direction_to(vn),
                    TransportDirection::LightToEye,
                    false,
                )
        } else if t == 0 {
            let v: &PathVertex = &self.vertices[n - 1];
            let vp: &PathVertex = &self.vertices[n - 2];
            v.primitive.evaluate_position(&v.geom, false)
                * v.primitive.evaluate_direction(
                    &v.geom,
                    v.ty,
                    &Vector3f::default(),
                    &v.direction_to(vp),
                    TransportDirection::EyeToLight,
                    false,
                )
        } else {
            let vl: &PathVertex = &self.vertices[s - 1];
            let ve: &PathVertex = &self.vertices[s];
            let wi_l: Vector3f = if s > 1 {
                vl.direction_to(&self.vertices[s - 2])
            } else {
                Vector3f::default()
            };
            let wi_e: Vector3f = if t > 1 {
                ve.direction_to(&self.vertices[s + 1])
            } else {
                Vector3f::default()
            };
            let fs_l: Spectrum = vl.primitive.evaluate_direction(
                &vl.geom,
                vl.ty,
                &wi_l,
                &vl.direction_to(ve),
                TransportDirection::LightToEye,
                false,
            );
            if fs_l.is_black() {
                return Spectrum::default();
            }
            let fs_e: Spectrum = ve.primitive.evaluate_direction(
                &ve.geom,
                ve.ty,
                &wi_e,
                &ve.direction_to(vl),
                TransportDirection::EyeToLight,
                false,
            );
            fs_l * geometry_term(&vl.geom, &ve.geom) * fs_e
        }
    }
    /// Area product density of the first `k` vertices sampled from the
    /// endpoint on the `trans_dir` side, including emitter selection.
    pub fn evaluate_subpath_pdf(
        &self,
        scene: &Scene,
        trans_dir: TransportDirection,
        k: usize,
    ) -> Float {
        if k == 0 {
            return 1.0 as Float;
        }
        let v0: &PathVertex = self.vertex_from(trans_dir, 0);
        let mut pdf: Float = v0.primitive.evaluate_position_pdf(&v0.geom, true)
            * scene.evaluate_emitter_pdf(v0.primitive);
        for i in 0..(k - 1) {
            let v: &PathVertex = self.vertex_from(trans_dir, i);
            let vn: &PathVertex = self.vertex_from(trans_dir, i + 1);
            let wi: Vector3f = to_neighbor(v, self.neighbor_from(trans_dir, i as isize - 1));
            pdf *= v
                .primitive
                .evaluate_direction_pdf(&v.geom, v.ty, &wi, &v.direction_to(vn), true)
                * geometry_term(&v.geom, &vn.geom);
        }
        pdf
    }
    /// Density of sampling the path with `s` light and `n - s` eye
    /// vertices; 0 if that strategy cannot generate it.
    pub fn evaluate_path_pdf(&self, scene: &Scene, s: usize) -> Float {
        let n: usize = self.len();
        if s > n || n < 2 {
            return 0.0 as Float;
        }
        let t: usize = n - s;
        if s == 0 {
            let v: &PathVertex = &self.vertices[0];
            if v.primitive.is_delta_position(v.ty) {
                return 0.0 as Float;
            }
        } else if t == 0 {
            let v: &PathVertex = &self.vertices[n - 1];
            if v.primitive.is_delta_position(v.ty) {
                return 0.0 as Float;
            }
        } else {
            let vl: &PathVertex = &self.vertices[s - 1];
            let ve: &PathVertex = &self.vertices[s];
            if vl.primitive.is_delta_direction(vl.ty) || ve.primitive.is_delta_direction(ve.ty) {
                return 0.0 as Float;
            }
        }
        self.evaluate_subpath_pdf(scene, TransportDirection::LightToEye, s)
            * self.evaluate_subpath_pdf(scene, TransportDirection::EyeToLight, t)
    }
    /// `f / p` for the strategy with `s` light vertices, or black when
    /// the estimate is undefined.
    pub fn evaluate_unweight_contribution(&self, scene: &Scene, s: usize) -> Spectrum {
        let f: Spectrum = self.evaluate_f(s);
        if f.is_black() {
            return Spectrum::default();
        }
        let pdf: Float = self.evaluate_path_pdf(scene, s);
        if pdf == 0.0 as Float {
            return Spectrum::default();
        }
        let c: Spectrum = f / pdf;
        if !c.is_valid() {
            return Spectrum::default();
        }
        c
    }
    /// Power heuristic weight of strategy `s` among the strategies
    /// `t = 1..=n` (`s = n - t`).
    pub fn evaluate_mis_weight(&self, scene: &Scene, s: usize) -> Float {
        let ps: Float = self.evaluate_path_pdf(scene, s);
        if ps == 0.0 as Float {
            return 0.0 as Float;
        }
        let n: usize = self.len();
        let mut inv_weight: Float = 0.0 as Float;
        for t_i in 1..=n {
            let pi: Float = self.evaluate_path_pdf(scene, n - t_i);
            if pi == 0.0 as Float {
                continue;
            }
            let r: Float = pi / ps;
            inv_weight += r * r;
        }
        1.0 as Float / inv_weight
    }
    /// Normalized raster position seen from the eye endpoint.
    pub fn raster_position(&self) -> Option<Point2f> {
        let n: usize = self.len();
        if n < 2 {
            return None;
        }
        let v: &PathVertex = &self.vertices[n - 1];
        let vp: &PathVertex = &self.vertices[n - 2];
        v.primitive.raster_position(&v.direction_to(vp), &v.geom)
    }
    /// Type string read from the light endpoint, e.g. `"LDSE"`.
    pub fn path_type(&self) -> String {
        self.vertices.iter().map(|v| type_char(v.ty)).collect()
    }
    /// An empty pattern matches every path.
    pub fn is_path_type(&self, pattern: &str) -> bool {
        pattern.is_empty() || self.path_type() == pattern
    }
    /// Splits into a light subpath of `s` vertices and an eye subpath of
    /// the remaining ones (starting at the eye endpoint).
    pub fn split(&self, s: usize) -> (Subpath<'a>, Subpath<'a>) {
        let s: usize = min(s, self.len());
        let subpath_l = Subpath {
            vertices: self.vertices[..s].to_vec(),
        };
        let subpath_e = Subpath {
            vertices: self.vertices[s..].iter().rev().cloned().collect(),
        };
        (subpath_l, subpath_e)
    }
}

struct BDPTContext {
    rng: Rng,
    film: Film,
}

pub struct BDPTFixedRenderer {
    pub num_vertices: usize,
    pub num_mutations: u64,
    /// only paths of this type contribute (e.g. "LDSE"), empty for all
    pub path_type: String,
}

impl BDPTFixedRenderer {
    pub fn initialize(params: &ParamSet) -> Result<Self, RenderError> {
        let num_vertices: usize = required_param(params, "num_vertices")?;
        if num_vertices < 2 {
            return Err(RenderError::InvalidParameter {
                name: "num_vertices",
                reason: format!("a path needs at least two vertices, got {}", num_vertices),
            });
        }
        let num_mutations: u64 = required_param(params, "num_mutations")?;
        let path_type: String = optional_param(params, "path_type")?.unwrap_or_default();
        Ok(BDPTFixedRenderer {
            num_vertices,
            num_mutations,
            path_type,
        })
    }
    fn sample(&self, scene: &Scene, ctx: &mut BDPTContext) {
        let n: usize = self.num_vertices;
        let mut subpath_e: Subpath = Subpath::default();
        subpath_e.sample_subpath_from_endpoint(scene, &mut ctx.rng, TransportDirection::EyeToLight, n);
        let mut subpath_l: Subpath = Subpath::default();
        subpath_l.sample_subpath_from_endpoint(scene, &mut ctx.rng, TransportDirection::LightToEye, n);
        let n_l: usize = subpath_l.len();
        let n_e: usize = subpath_e.len();
        for t in 1..=n_e {
            if t > n {
                break;
            }
            let min_s: usize = max(2_usize.saturating_sub(t), n - t);
            let max_s: usize = min(n_l, n - t);
            for s in min_s..=max_s {
                if s + t != n {
                    continue;
                }
                let path: Path = match connect_subpaths(scene, &subpath_l, &subpath_e, s, t) {
                    Ok(path) => path,
                    Err(_) => continue,
                };
                if !path.is_path_type(&self.path_type) {
                    continue;
                }
                let c_star: Spectrum = path.evaluate_unweight_contribution(scene, s);
                if c_star.is_black() {
                    continue;
                }
                let w: Float = path.evaluate_mis_weight(scene, s);
                if let Some(raster) = path.raster_position() {
                    ctx.film.splat(&raster, &(c_star * w));
                }
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
        info!(
            "Rendering {} sample(s) of length {} with {} thread(s) ...",
            self.num_mutations, self.num_vertices, num_threads
        );
        let mut contexts: Vec<BDPTContext> = (0..num_threads)
            .map(|_| {
                let mut worker_film: Film = film.clone();
                worker_film.clear();
                BDPTContext {
                    rng: Rng::with_seed(init_rng.uniform_uint32() as u64),
                    film: worker_film,
                }
            })
            .collect();
        parallel_for(self.num_mutations, &mut contexts, |_index, _thread_id, ctx| {
            self.sample(scene, ctx);
        });
        let worker_films: Vec<&Film> = contexts.iter().map(|ctx| &ctx.film).collect();
        accumulate_films(film, &worker_films, self.num_mutations)?;
        Ok(RenderSummary {
            num_threads,
            num_samples: self.num_mutations,
            normalization: None,
            stats: None,
        })
    }
}
