//! The scene: a flat list of primitives, the emitter selection
//! distribution and the sensor.
//!
//! Intersection is a linear scan; scenes are small and acceleration
//! structures are out of scope.

// others
use log::info;
use thiserror::Error;
// pbrt
use crate::core::camera::PinholeCamera;
use crate::core::geometry::{Point3f, Ray, Vector3f};
use crate::core::interaction::{has_type, SurfaceGeometry, SurfaceInteractionType};
use crate::core::light::DiffuseAreaLight;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum, SHADOW_EPSILON};
use crate::core::primitive::{Emitter, Primitive};
use crate::core::reflection::{Bsdf, DiffuseBsdf, FresnelBsdf, GlossyBsdf, MirrorBsdf};
use crate::core::sampling::Distribution1D;
use crate::core::shape::{Quad, Shape, Sphere};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown {kind} type '{name}'")]
    UnknownType { kind: &'static str, name: String },
    #[error("primitive {0} has no shape")]
    MissingShape(usize),
    #[error("scene has no light")]
    NoLight,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    lights: Vec<usize>,
    light_distr: Distribution1D,
    sensor: usize,
}

impl Scene {
    /// Builds a scene from the sensor and surface primitives. Indices
    /// are reassigned; the sensor becomes the last primitive.
    pub fn new(camera: PinholeCamera, mut primitives: Vec<Primitive>) -> Result<Scene, SceneError> {
        primitives.push(Primitive {
            index: 0,
            shape: None,
            bsdf: None,
            emitter: Some(Emitter::Pinhole(camera)),
        });
        for (i, primitive) in primitives.iter_mut().enumerate() {
            primitive.index = i;
        }
        let lights: Vec<usize> = primitives
            .iter()
            .filter(|p| has_type(p.get_type(), SurfaceInteractionType::L))
            .map(|p| p.index)
            .collect();
        if lights.is_empty() {
            return Err(SceneError::NoLight);
        }
        let light_distr = Distribution1D::new(vec![1.0 as Float; lights.len()]);
        let sensor = primitives.len() - 1;
        Ok(Scene {
            primitives,
            lights,
            light_distr,
            sensor,
        })
    }
    pub fn create(params: &ParamSet, aspect: Float) -> Result<Scene, SceneError> {
        let camera = match params.child("camera") {
            Some(camera_params) => create_camera(camera_params, aspect),
            None => create_camera(&ParamSet::new("camera"), aspect),
        };
        let mut primitives: Vec<Primitive> = Vec::new();
        for (i, prim_params) in params.children("primitives").into_iter().enumerate() {
            primitives.push(create_primitive(i, prim_params)?);
        }
        info!("Scene with {} primitive(s)", primitives.len());
        Scene::new(camera, primitives)
    }
    pub fn sensor(&self) -> &Primitive {
        &self.primitives[self.sensor]
    }
    pub fn num_lights(&self) -> usize {
        self.lights.len()
    }
    /// Closest surface hit along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<(SurfaceGeometry, &Primitive)> {
        let mut closest: Option<(SurfaceGeometry, &Primitive)> = None;
        let mut r = *ray;
        for primitive in &self.primitives {
            if let Some((t, geom)) = primitive.intersect(&r) {
                r.t_max = t;
                closest = Some((geom, primitive));
            }
        }
        closest
    }
    /// Whether the segment between two surface points is unoccluded.
    pub fn visible(&self, geom1: &SurfaceGeometry, geom2: &SurfaceGeometry) -> bool {
        let ray = Ray::new(
            geom1.p,
            geom2.p - geom1.p,
            SHADOW_EPSILON,
            1.0 as Float - SHADOW_EPSILON,
        );
        !self.primitives.iter().any(|p| p.intersect(&ray).is_some())
    }
    /// Selects an emitter of the given type (L or E).
    pub fn sample_emitter(&self, query_type: u8, u: Float) -> Option<&Primitive> {
        if has_type(query_type, SurfaceInteractionType::E) {
            return Some(self.sensor());
        }
        if self.lights.is_empty() {
            return None;
        }
        let i = self.light_distr.sample_discrete(u);
        Some(&self.primitives[self.lights[i]])
    }
    /// Selection probability of `primitive` through `sample_emitter`.
    pub fn evaluate_emitter_pdf(&self, primitive: &Primitive) -> Float {
        if primitive.index == self.sensor {
            return 1.0 as Float;
        }
        match self.lights.iter().position(|i| *i == primitive.index) {
            Some(i) => self.light_distr.discrete_pdf(i),
            None => 0.0 as Float,
        }
    }
}

fn create_camera(params: &ParamSet, aspect: Float) -> PinholeCamera {
    let eye: Point3f = params.find_one("eye", Point3f::new(0.0, 0.0, 1.0));
    let look_at: Point3f = params.find_one("look_at", Point3f::new(0.0, 0.0, 0.0));
    let up: Vector3f = params.find_one("up", Vector3f::new(0.0, 1.0, 0.0));
    let fov: Float = params.find_one("fov", 45.0 as Float);
    PinholeCamera::new(eye, look_at, up, fov, aspect)
}

fn create_shape(index: usize, params: Option<&ParamSet>) -> Result<Shape, SceneError> {
    let params = params.ok_or(SceneError::MissingShape(index))?;
    let kind: String = params.find_one("type", String::from("quad"));
    match kind.as_str() {
        "quad" => Ok(Shape::Quad(Quad::new(
            params.find_one("p", Point3f::new(0.0, 0.0, 0.0)),
            params.find_one("e1", Vector3f::new(1.0, 0.0, 0.0)),
            params.find_one("e2", Vector3f::new(0.0, 1.0, 0.0)),
        ))),
        "sphere" => Ok(Shape::Sphere(Sphere::new(
            params.find_one("center", Point3f::new(0.0, 0.0, 0.0)),
            params.find_one("radius", 1.0 as Float),
        ))),
        _ => Err(SceneError::UnknownType {
            kind: "shape",
            name: kind,
        }),
    }
}

fn create_bsdf(params: &ParamSet) -> Result<Bsdf, SceneError> {
    let kind: String = params.find_one("type", String::from("diffuse"));
    let r: Spectrum = params.find_one("R", Spectrum::new(1.0 as Float));
    match kind.as_str() {
        "diffuse" => Ok(Bsdf::Diffuse(DiffuseBsdf::new(r))),
        "glossy" => Ok(Bsdf::Glossy(GlossyBsdf::new(
            r,
            params.find_one("exponent", 32.0 as Float),
        ))),
        "mirror" => Ok(Bsdf::Mirror(MirrorBsdf::new(r))),
        "fresnel" => Ok(Bsdf::Fresnel(FresnelBsdf::new(
            r,
            params.find_one("eta1", 1.0 as Float),
            params.find_one("eta2", 1.5 as Float),
        ))),
        _ => Err(SceneError::UnknownType {
            kind: "bsdf",
            name: kind,
        }),
    }
}

fn create_primitive(index: usize, params: &ParamSet) -> Result<Primitive, SceneError> {
    let shape = create_shape(index, params.child("shape"))?;
    let emitter = params.child("light").map(|light_params| {
        Emitter::AreaLight(DiffuseAreaLight::new(
            light_params.find_one("Le", Spectrum::new(1.0 as Float)),
        ))
    });
    let bsdf = match params.child("bsdf") {
        Some(bsdf_params) => create_bsdf(bsdf_params)?,
        // lights without a surface description absorb everything
        None if emitter.is_some() => Bsdf::Diffuse(DiffuseBsdf::new(Spectrum::default())),
        None => Bsdf::Diffuse(DiffuseBsdf::new(Spectrum::new(0.8 as Float))),
    };
    Ok(Primitive {
        index,
        shape: Some(shape),
        bsdf: Some(bsdf),
        emitter,
    })
}
