//! Local surface geometry at a path vertex and the vocabulary used to
//! talk about how light interacts there.

// pbrt
use crate::core::geometry::{vec3_coordinate_system, vec3_dot_nrmf, vec3_dot_vec3f};
use crate::core::geometry::{Normal3f, Point3f, Vector3f};
use crate::core::pbrt::Float;

/// Interaction types as bit flags. A primitive may combine several
/// (e.g. an area light with a diffuse surface is `L | D`).
#[repr(u8)]
pub enum SurfaceInteractionType {
    None = 0,
    D = 1,
    G = 2,
    S = 4,
    L = 8,
    E = 16,
    Bsdf = 1 | 2 | 4,
    Emitter = 8 | 16,
}

pub fn has_type(ty: u8, flags: SurfaceInteractionType) -> bool {
    ty & flags as u8 != 0
}

/// Single character per interaction type, e.g. `L`, `D`, `S`, `E`.
pub fn type_char(ty: u8) -> char {
    if has_type(ty, SurfaceInteractionType::L) {
        'L'
    } else if has_type(ty, SurfaceInteractionType::E) {
        'E'
    } else if has_type(ty, SurfaceInteractionType::S) {
        'S'
    } else if has_type(ty, SurfaceInteractionType::G) {
        'G'
    } else if has_type(ty, SurfaceInteractionType::D) {
        'D'
    } else {
        '-'
    }
}

/// Direction in which a subpath carries its quantity: radiance flows
/// from lights to the eye, importance the other way round.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportDirection {
    LightToEye,
    EyeToLight,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct SurfaceGeometry {
    /// point-like endpoint without a surface (pinhole); cosines are 1
    pub degenerated: bool,
    pub p: Point3f,
    /// geometric normal
    pub gn: Normal3f,
    /// shading normal
    pub sn: Normal3f,
    /// tangent frame around the shading normal
    pub dpdu: Vector3f,
    pub dpdv: Vector3f,
}

impl SurfaceGeometry {
    pub fn new(p: Point3f, n: Normal3f) -> Self {
        let (dpdu, dpdv) = vec3_coordinate_system(&Vector3f::from(n));
        SurfaceGeometry {
            degenerated: false,
            p,
            gn: n,
            sn: n,
            dpdu,
            dpdv,
        }
    }
    pub fn point(p: Point3f) -> Self {
        SurfaceGeometry {
            degenerated: true,
            p,
            ..Default::default()
        }
    }
    pub fn to_local(&self, w: &Vector3f) -> Vector3f {
        Vector3f {
            x: vec3_dot_vec3f(w, &self.dpdu),
            y: vec3_dot_vec3f(w, &self.dpdv),
            z: vec3_dot_nrmf(w, &self.sn),
        }
    }
    pub fn to_world(&self, w: &Vector3f) -> Vector3f {
        self.dpdu * w.x + self.dpdv * w.y + Vector3f::from(self.sn) * w.z
    }
    /// Cosine against the shading normal.
    pub fn cos_theta(&self, w: &Vector3f) -> Float {
        vec3_dot_nrmf(w, &self.sn)
    }
}

/// `G(x, y) = |cos_x| |cos_y| / |x - y|^2` with cosines against the
/// geometric normals.
pub fn geometry_term(geom1: &SurfaceGeometry, geom2: &SurfaceGeometry) -> Float {
    let p1p2: Vector3f = geom2.p - geom1.p;
    let dist2: Float = p1p2.length_squared();
    if dist2 == 0.0 as Float {
        return 0.0 as Float;
    }
    let d: Vector3f = p1p2 / dist2.sqrt();
    let dot1: Float = if geom1.degenerated {
        1.0 as Float
    } else {
        vec3_dot_nrmf(&d, &geom1.gn).abs()
    };
    let dot2: Float = if geom2.degenerated {
        1.0 as Float
    } else {
        vec3_dot_nrmf(&-d, &geom2.gn).abs()
    };
    dot1 * dot2 / dist2
}

/// Projected solid angle density at `from` converted to area density
/// at `to`.
pub fn convert_to_area(pdf_proj: Float, from: &SurfaceGeometry, to: &SurfaceGeometry) -> Float {
    pdf_proj * geometry_term(from, to)
}

/// Factor compensating for shading normals when importance is
/// transported. Zero when a direction lies on opposite sides of the
/// shading and geometric normals.
pub fn shading_normal_correction(
    geom: &SurfaceGeometry,
    wi: &Vector3f,
    wo: &Vector3f,
    trans_dir: TransportDirection,
) -> Float {
    let wi_dot_ng: Float = vec3_dot_nrmf(wi, &geom.gn);
    let wo_dot_ng: Float = vec3_dot_nrmf(wo, &geom.gn);
    let wi_dot_ns: Float = geom.cos_theta(wi);
    let wo_dot_ns: Float = geom.cos_theta(wo);
    if wi_dot_ng * wi_dot_ns <= 0.0 as Float || wo_dot_ng * wo_dot_ns <= 0.0 as Float {
        return 0.0 as Float;
    }
    if trans_dir == TransportDirection::LightToEye {
        return wi_dot_ns * wo_dot_ng / (wo_dot_ns * wi_dot_ng);
    }
    1.0 as Float
}
