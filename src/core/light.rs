//! Diffuse area light attached to a shape.
//!
//! Emitted radiance is split into a positional part `Le0 = Le` and a
//! directional part `Le1 = 1` on the front side of the surface, so the
//! product is the constant radiance `Le`.

// pbrt
use crate::core::geometry::{vec3_dot_nrmf, Point2f, Vector3f};
use crate::core::interaction::SurfaceGeometry;
use crate::core::pbrt::{Float, Spectrum, INV_PI};
use crate::core::sampling::cosine_sample_hemisphere;
use crate::core::shape::Shape;

#[derive(Debug, Clone)]
pub struct DiffuseAreaLight {
    pub l_emit: Spectrum,
}

impl DiffuseAreaLight {
    pub fn new(l_emit: Spectrum) -> Self {
        DiffuseAreaLight { l_emit }
    }
    pub fn sample_position(&self, shape: &Shape, u: &Point2f) -> SurfaceGeometry {
        shape.sample(u)
    }
    pub fn evaluate_position_pdf(&self, shape: &Shape) -> Float {
        1.0 as Float / shape.area()
    }
    pub fn evaluate_position(&self) -> Spectrum {
        self.l_emit
    }
    /// Cosine-weighted direction on the front side.
    pub fn sample_direction(&self, u: &Point2f, geom: &SurfaceGeometry) -> Option<Vector3f> {
        let local = cosine_sample_hemisphere(u);
        if local.z == 0.0 as Float {
            return None;
        }
        Some(geom.to_world(&local))
    }
    pub fn evaluate_direction_pdf(&self, geom: &SurfaceGeometry, wo: &Vector3f) -> Float {
        if vec3_dot_nrmf(wo, &geom.gn) <= 0.0 as Float {
            return 0.0 as Float;
        }
        INV_PI
    }
    pub fn evaluate_direction(&self, geom: &SurfaceGeometry, wo: &Vector3f) -> Spectrum {
        if vec3_dot_nrmf(wo, &geom.gn) <= 0.0 as Float {
            return Spectrum::default();
        }
        Spectrum::new(1.0 as Float)
    }
}
