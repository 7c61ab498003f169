//! Scene primitives.
//!
//! A primitive bundles an optional shape, an optional BSDF and an
//! optional emitter (area light or sensor). Path vertices talk to
//! their primitive through one generalized interface; the query type
//! of the vertex (L/E for endpoints, D/G/S for surface interactions)
//! decides whether the emitter or the BSDF answers.

// pbrt
use crate::core::camera::PinholeCamera;
use crate::core::geometry::{Point2f, Ray, Vector3f};
use crate::core::interaction::{has_type, SurfaceGeometry, SurfaceInteractionType, TransportDirection};
use crate::core::light::DiffuseAreaLight;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::reflection::Bsdf;
use crate::core::shape::Shape;

#[derive(Debug, Clone)]
pub enum Emitter {
    AreaLight(DiffuseAreaLight),
    Pinhole(PinholeCamera),
}

impl Emitter {
    pub fn get_type(&self) -> u8 {
        match self {
            Emitter::AreaLight(_) => SurfaceInteractionType::L as u8,
            Emitter::Pinhole(_) => SurfaceInteractionType::E as u8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    /// position in the scene's primitive list
    pub index: usize,
    pub shape: Option<Shape>,
    pub bsdf: Option<Bsdf>,
    pub emitter: Option<Emitter>,
}

fn is_emitter_query(query_type: u8) -> bool {
    has_type(query_type, SurfaceInteractionType::Emitter)
}

impl Primitive {
    /// Union of the BSDF and emitter interaction types.
    pub fn get_type(&self) -> u8 {
        let bsdf_type = self.bsdf.as_ref().map_or(0, |b| b.get_type());
        let emitter_type = self.emitter.as_ref().map_or(0, |e| e.get_type());
        bsdf_type | emitter_type
    }
    pub fn bsdf_type(&self) -> u8 {
        self.bsdf
            .as_ref()
            .map_or(SurfaceInteractionType::None as u8, |b| b.get_type())
    }
    pub fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceGeometry)> {
        self.shape.as_ref().and_then(|shape| shape.intersect(ray))
    }
    pub fn sample_position(&self, u: &Point2f) -> Option<SurfaceGeometry> {
        match (&self.emitter, &self.shape) {
            (Some(Emitter::AreaLight(light)), Some(shape)) => Some(light.sample_position(shape, u)),
            (Some(Emitter::Pinhole(camera)), _) => Some(camera.sample_position()),
            _ => None,
        }
    }
    /// Area density of `sample_position`. A delta position reports 1
    /// when delta components are requested, 0 otherwise.
    pub fn evaluate_position_pdf(&self, _geom: &SurfaceGeometry, eval_delta: bool) -> Float {
        match (&self.emitter, &self.shape) {
            (Some(Emitter::AreaLight(light)), Some(shape)) => light.evaluate_position_pdf(shape),
            (Some(Emitter::Pinhole(_)), _) if eval_delta => 1.0 as Float,
            _ => 0.0 as Float,
        }
    }
    pub fn evaluate_position(&self, _geom: &SurfaceGeometry, eval_delta: bool) -> Spectrum {
        match &self.emitter {
            Some(Emitter::AreaLight(light)) => light.evaluate_position(),
            Some(Emitter::Pinhole(_)) if eval_delta => Spectrum::new(1.0 as Float),
            _ => Spectrum::default(),
        }
    }
    pub fn sample_direction(
        &self,
        u: &Point2f,
        u_comp: Float,
        query_type: u8,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        if is_emitter_query(query_type) {
            return match &self.emitter {
                Some(Emitter::AreaLight(light)) => light.sample_direction(u, geom),
                Some(Emitter::Pinhole(camera)) => Some(camera.sample_direction(u)),
                None => None,
            };
        }
        self.bsdf
            .as_ref()
            .and_then(|bsdf| bsdf.sample_direction(u, u_comp, geom, wi))
    }
    /// Projected solid angle density of `sample_direction`.
    pub fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        query_type: u8,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        if is_emitter_query(query_type) {
            return match &self.emitter {
                Some(Emitter::AreaLight(light)) => light.evaluate_direction_pdf(geom, wo),
                Some(Emitter::Pinhole(camera)) => camera.evaluate_direction_pdf(wo),
                None => 0.0 as Float,
            };
        }
        self.bsdf.as_ref().map_or(0.0 as Float, |bsdf| {
            bsdf.evaluate_direction_pdf(geom, wi, wo, eval_delta)
        })
    }
    pub fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        query_type: u8,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum {
        if is_emitter_query(query_type) {
            return match &self.emitter {
                Some(Emitter::AreaLight(light)) => light.evaluate_direction(geom, wo),
                Some(Emitter::Pinhole(camera)) => camera.evaluate_direction(wo),
                None => Spectrum::default(),
            };
        }
        self.bsdf.as_ref().map_or(Spectrum::default(), |bsdf| {
            bsdf.evaluate_direction(geom, wi, wo, trans_dir, eval_delta)
        })
    }
    pub fn is_delta_position(&self, query_type: u8) -> bool {
        is_emitter_query(query_type) && matches!(self.emitter, Some(Emitter::Pinhole(_)))
    }
    pub fn is_delta_direction(&self, query_type: u8) -> bool {
        if is_emitter_query(query_type) {
            return false;
        }
        self.bsdf.as_ref().map_or(false, |bsdf| bsdf.is_delta_direction())
    }
    /// Raster position of a sensor seeing direction `wo`.
    pub fn raster_position(&self, wo: &Vector3f, _geom: &SurfaceGeometry) -> Option<Point2f> {
        match &self.emitter {
            Some(Emitter::Pinhole(camera)) => camera.raster_position(wo),
            _ => None,
        }
    }
}
