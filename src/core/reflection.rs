//! Surface reflection and transmission.
//!
//! All densities are expressed in the projected solid angle measure and
//! all BSDF values are the plain BSDF `f_s(wi, wo)` (the cosines live in
//! the geometry term of the path). Specular lobes are Dirac deltas: they
//! report their discrete lobe weight only when the caller asks for delta
//! components (`eval_delta`), and zero otherwise.
//!
//! - DiffuseBsdf
//! - GlossyBsdf
//! - MirrorBsdf
//! - FresnelBsdf

// std
use std::f32::consts::PI;
// pbrt
use crate::core::geometry::{vec3_coordinate_system, vec3_dot_vec3f, vec3_reflect};
use crate::core::geometry::{Point2f, Vector3f};
use crate::core::interaction::{shading_normal_correction, SurfaceGeometry};
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::pbrt::{clamp_t, Float, Spectrum, INV_PI};
use crate::core::sampling::cosine_sample_hemisphere;

#[derive(Debug, Clone)]
pub enum Bsdf {
    Diffuse(DiffuseBsdf),
    Glossy(GlossyBsdf),
    Mirror(MirrorBsdf),
    Fresnel(FresnelBsdf),
}

impl Bsdf {
    pub fn get_type(&self) -> u8 {
        match self {
            Bsdf::Diffuse(_) => SurfaceInteractionType::D as u8,
            Bsdf::Glossy(_) => SurfaceInteractionType::G as u8,
            Bsdf::Mirror(_) | Bsdf::Fresnel(_) => SurfaceInteractionType::S as u8,
        }
    }
    pub fn is_delta_direction(&self) -> bool {
        match self {
            Bsdf::Diffuse(_) | Bsdf::Glossy(_) => false,
            Bsdf::Mirror(_) | Bsdf::Fresnel(_) => true,
        }
    }
    /// Samples an outgoing direction given the direction `wi` towards the
    /// previous vertex. `u_comp` selects between lobes.
    pub fn sample_direction(
        &self,
        u: &Point2f,
        u_comp: Float,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        match self {
            Bsdf::Diffuse(bsdf) => bsdf.sample_direction(u, geom, wi),
            Bsdf::Glossy(bsdf) => bsdf.sample_direction(u, geom, wi),
            Bsdf::Mirror(bsdf) => bsdf.sample_direction(geom, wi),
            Bsdf::Fresnel(bsdf) => bsdf.sample_direction(u_comp, geom, wi),
        }
    }
    pub fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        match self {
            Bsdf::Diffuse(bsdf) => bsdf.evaluate_direction_pdf(geom, wi, wo),
            Bsdf::Glossy(bsdf) => bsdf.evaluate_direction_pdf(geom, wi, wo),
            Bsdf::Mirror(bsdf) => bsdf.evaluate_direction_pdf(geom, wi, wo, eval_delta),
            Bsdf::Fresnel(bsdf) => bsdf.evaluate_direction_pdf(geom, wi, wo, eval_delta),
        }
    }
    pub fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum {
        match self {
            Bsdf::Diffuse(bsdf) => bsdf.evaluate_direction(geom, wi, wo, trans_dir),
            Bsdf::Glossy(bsdf) => bsdf.evaluate_direction(geom, wi, wo, trans_dir),
            Bsdf::Mirror(bsdf) => bsdf.evaluate_direction(geom, wi, wo, trans_dir, eval_delta),
            Bsdf::Fresnel(bsdf) => bsdf.evaluate_direction(geom, wi, wo, trans_dir, eval_delta),
        }
    }
}

fn same_hemisphere(geom: &SurfaceGeometry, wi: &Vector3f, wo: &Vector3f) -> bool {
    geom.cos_theta(wi) * geom.cos_theta(wo) > 0.0 as Float
}

/// Lambertian reflection on both sides of the surface.
#[derive(Debug, Clone)]
pub struct DiffuseBsdf {
    pub r: Spectrum,
}

impl DiffuseBsdf {
    pub fn new(r: Spectrum) -> Self {
        DiffuseBsdf { r }
    }
    fn sample_direction(
        &self,
        u: &Point2f,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        let mut local = cosine_sample_hemisphere(u);
        if local.z == 0.0 as Float {
            return None;
        }
        if geom.cos_theta(wi) < 0.0 as Float {
            local.z = -local.z;
        }
        Some(geom.to_world(&local))
    }
    fn evaluate_direction_pdf(&self, geom: &SurfaceGeometry, wi: &Vector3f, wo: &Vector3f) -> Float {
        if !same_hemisphere(geom, wi, wo) {
            return 0.0 as Float;
        }
        INV_PI
    }
    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
    ) -> Spectrum {
        if !same_hemisphere(geom, wi, wo) {
            return Spectrum::default();
        }
        self.r * INV_PI * shading_normal_correction(geom, wi, wo, trans_dir)
    }
}

/// Energy-normalized Phong lobe around the mirror direction.
#[derive(Debug, Clone)]
pub struct GlossyBsdf {
    pub r: Spectrum,
    pub exponent: Float,
}

impl GlossyBsdf {
    pub fn new(r: Spectrum, exponent: Float) -> Self {
        GlossyBsdf { r, exponent }
    }
    fn lobe_cos(&self, geom: &SurfaceGeometry, wi: &Vector3f, wo: &Vector3f) -> Float {
        let r = vec3_reflect(wi, &geom.sn);
        vec3_dot_vec3f(&r, wo).max(0.0 as Float)
    }
    fn sample_direction(
        &self,
        u: &Point2f,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        let r = vec3_reflect(wi, &geom.sn);
        let (s, t) = vec3_coordinate_system(&r);
        let cos_alpha = u.x.powf(1.0 as Float / (self.exponent + 1.0 as Float));
        let sin_alpha = (0.0 as Float).max(1.0 as Float - cos_alpha * cos_alpha).sqrt();
        let phi = 2.0 as Float * PI * u.y;
        let wo = s * (sin_alpha * phi.cos()) + t * (sin_alpha * phi.sin()) + r * cos_alpha;
        if !same_hemisphere(geom, wi, &wo) {
            return None;
        }
        Some(wo)
    }
    fn evaluate_direction_pdf(&self, geom: &SurfaceGeometry, wi: &Vector3f, wo: &Vector3f) -> Float {
        if !same_hemisphere(geom, wi, wo) {
            return 0.0 as Float;
        }
        let cos_alpha = self.lobe_cos(geom, wi, wo);
        let pdf_sa = (self.exponent + 1.0 as Float) / (2.0 as Float * PI) * cos_alpha.powf(self.exponent);
        pdf_sa / geom.cos_theta(wo).abs()
    }
    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
    ) -> Spectrum {
        if !same_hemisphere(geom, wi, wo) {
            return Spectrum::default();
        }
        let cos_alpha = self.lobe_cos(geom, wi, wo);
        self.r
            * ((self.exponent + 2.0 as Float) / (2.0 as Float * PI) * cos_alpha.powf(self.exponent))
            * shading_normal_correction(geom, wi, wo, trans_dir)
    }
}

/// Perfect specular reflection.
#[derive(Debug, Clone)]
pub struct MirrorBsdf {
    pub r: Spectrum,
}

impl MirrorBsdf {
    pub fn new(r: Spectrum) -> Self {
        MirrorBsdf { r }
    }
    fn sample_direction(&self, geom: &SurfaceGeometry, wi: &Vector3f) -> Option<Vector3f> {
        if geom.cos_theta(wi) == 0.0 as Float {
            return None;
        }
        Some(vec3_reflect(wi, &geom.sn))
    }
    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        if !eval_delta || !same_hemisphere(geom, wi, wo) {
            return 0.0 as Float;
        }
        1.0 as Float
    }
    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum {
        if !eval_delta || !same_hemisphere(geom, wi, wo) {
            return Spectrum::default();
        }
        self.r * shading_normal_correction(geom, wi, wo, trans_dir)
    }
}

/// Smooth dielectric interface. `eta1` is the index of refraction on
/// the side the normal points to, `eta2` the one behind the surface.
#[derive(Debug, Clone)]
pub struct FresnelBsdf {
    pub r: Spectrum,
    pub eta1: Float,
    pub eta2: Float,
}

impl FresnelBsdf {
    pub fn new(r: Spectrum, eta1: Float, eta2: Float) -> Self {
        FresnelBsdf { r, eta1, eta2 }
    }
    fn eta_of_side(&self, geom: &SurfaceGeometry, w: &Vector3f) -> Float {
        if geom.cos_theta(w) > 0.0 as Float {
            self.eta1
        } else {
            self.eta2
        }
    }
    fn sample_direction(
        &self,
        u_comp: Float,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        let cos_theta_i = geom.cos_theta(wi);
        if cos_theta_i == 0.0 as Float {
            return None;
        }
        let fr = fr_dielectric(cos_theta_i, self.eta1, self.eta2);
        if u_comp <= fr {
            return Some(vec3_reflect(wi, &geom.sn));
        }
        let entering = cos_theta_i > 0.0 as Float;
        let eta = if entering {
            self.eta1 / self.eta2
        } else {
            self.eta2 / self.eta1
        };
        let cos_theta_t2 = 1.0 as Float - eta * eta * (1.0 as Float - cos_theta_i * cos_theta_i);
        if cos_theta_t2 <= 0.0 as Float {
            return None;
        }
        let cos_theta_t = if entering {
            -cos_theta_t2.sqrt()
        } else {
            cos_theta_t2.sqrt()
        };
        let n = Vector3f::from(geom.sn);
        Some((-*wi * eta + n * (eta * cos_theta_i + cos_theta_t)).normalize())
    }
    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        if !eval_delta {
            return 0.0 as Float;
        }
        let fr = fr_dielectric(geom.cos_theta(wi), self.eta1, self.eta2);
        if same_hemisphere(geom, wi, wo) {
            fr
        } else {
            1.0 as Float - fr
        }
    }
    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum {
        if !eval_delta {
            return Spectrum::default();
        }
        let fr = fr_dielectric(geom.cos_theta(wi), self.eta1, self.eta2);
        if same_hemisphere(geom, wi, wo) {
            return self.r * fr;
        }
        // radiance is compressed by (eta_eye / eta_light)^2 whichever
        // way the path was sampled
        let (w_eye, w_light) = match trans_dir {
            TransportDirection::EyeToLight => (wi, wo),
            TransportDirection::LightToEye => (wo, wi),
        };
        let eta = self.eta_of_side(geom, w_eye) / self.eta_of_side(geom, w_light);
        self.r * ((1.0 as Float - fr) * eta * eta)
    }
}

/// Computes the Fresnel reflection formula for dielectric materials
/// and unpolarized light.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp_t(cos_theta_i, -1.0, 1.0);
    // potentially swap indices of refraction
    let entering: bool = cos_theta_i > 0.0;
    let mut local_eta_i = eta_i;
    let mut local_eta_t = eta_t;
    if !entering {
        std::mem::swap(&mut local_eta_i, &mut local_eta_t);
        cos_theta_i = cos_theta_i.abs();
    }
    // compute _cos_theta_t_ using Snell's law
    let sin_theta_i: Float = (0.0 as Float)
        .max(1.0 as Float - cos_theta_i * cos_theta_i)
        .sqrt();
    let sin_theta_t: Float = local_eta_i / local_eta_t * sin_theta_i;
    // handle total internal reflection
    if sin_theta_t >= 1.0 as Float {
        return 1.0 as Float;
    }
    let cos_theta_t: Float = (0.0 as Float)
        .max(1.0 as Float - sin_theta_t * sin_theta_t)
        .sqrt();
    let r_parl: Float = ((local_eta_t * cos_theta_i) - (local_eta_i * cos_theta_t))
        / ((local_eta_t * cos_theta_i) + (local_eta_i * cos_theta_t));
    let r_perp: Float = ((local_eta_i * cos_theta_i) - (local_eta_t * cos_theta_t))
        / ((local_eta_i * cos_theta_i) + (local_eta_t * cos_theta_t));
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::{Normal3f, Point3f};
    use crate::core::rng::Rng;

    fn floor() -> SurfaceGeometry {
        SurfaceGeometry::new(
            Point3f::default(),
            Normal3f {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
        )
    }

    #[test]
    fn diffuse_is_two_sided_and_reciprocal() {
        let geom = floor();
        let bsdf = Bsdf::Diffuse(DiffuseBsdf::new(Spectrum::new(0.5)));
        let wi = Vector3f::new(0.3, 0.0, 0.9).normalize();
        let mut rng = Rng::with_seed(5);
        for _ in 0..100 {
            let wo = bsdf
                .sample_direction(&rng.uniform_point2f(), rng.uniform_float(), &geom, &wi)
                .unwrap();
            assert!(geom.cos_theta(&wo) > 0.0);
            let f = bsdf.evaluate_direction(&geom, &wi, &wo, TransportDirection::EyeToLight, false);
            let f_rev = bsdf.evaluate_direction(&geom, &wo, &wi, TransportDirection::LightToEye, false);
            assert!((f.y() - f_rev.y()).abs() < 1e-6);
            assert!((bsdf.evaluate_direction_pdf(&geom, &wi, &wo, false) - INV_PI).abs() < 1e-6);
        }
        let below = -wi;
        let wo = bsdf
            .sample_direction(&Point2f { x: 0.2, y: 0.4 }, 0.0, &geom, &below)
            .unwrap();
        assert!(geom.cos_theta(&wo) < 0.0);
    }

    #[test]
    fn specular_lobes_vanish_without_delta() {
        let geom = floor();
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let mirror = Bsdf::Mirror(MirrorBsdf::new(Spectrum::new(1.0)));
        let wo = mirror
            .sample_direction(&Point2f::default(), 0.0, &geom, &wi)
            .unwrap();
        assert!((wo.y + 0.6).abs() < 1e-6 && (wo.z - 0.8).abs() < 1e-6);
        assert_eq!(mirror.evaluate_direction_pdf(&geom, &wi, &wo, false), 0.0);
        assert_eq!(mirror.evaluate_direction_pdf(&geom, &wi, &wo, true), 1.0);
        assert!(mirror
            .evaluate_direction(&geom, &wi, &wo, TransportDirection::EyeToLight, false)
            .is_black());
        assert!(mirror.is_delta_direction());
    }

    #[test]
    fn fresnel_lobe_weights_match_their_densities() {
        let geom = floor();
        let glass = Bsdf::Fresnel(FresnelBsdf::new(Spectrum::new(1.0), 1.0, 1.5));
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let fr = fr_dielectric(0.8, 1.0, 1.5);
        let reflected = glass.sample_direction(&Point2f::default(), 0.0, &geom, &wi).unwrap();
        let refracted = glass.sample_direction(&Point2f::default(), 0.999, &geom, &wi).unwrap();
        assert!(geom.cos_theta(&reflected) > 0.0);
        assert!(geom.cos_theta(&refracted) < 0.0);
        // Snell: sin_t = sin_i / 1.5
        assert!((refracted.y.abs() - 0.6 / 1.5).abs() < 1e-5);
        assert!((glass.evaluate_direction_pdf(&geom, &wi, &reflected, true) - fr).abs() < 1e-6);
        assert!((glass.evaluate_direction_pdf(&geom, &wi, &refracted, true) - (1.0 - fr)).abs() < 1e-6);
        // eye outside, light inside: radiance gains (1 / 1.5)^2
        let f = glass.evaluate_direction(&geom, &wi, &refracted, TransportDirection::EyeToLight, true);
        assert!((f.y() - (1.0 - fr) / 2.25).abs() < 1e-5);
        // same physical path evaluated from the light side
        let f_rev = glass.evaluate_direction(&geom, &refracted, &wi, TransportDirection::LightToEye, true);
        assert!((f_rev.y() - f.y()).abs() < 1e-4);
    }

    #[test]
    fn glossy_sampling_is_consistent_with_its_density() {
        let geom = floor();
        let glossy = Bsdf::Glossy(GlossyBsdf::new(Spectrum::new(0.8), 20.0));
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let mut rng = Rng::with_seed(9);
        let mut found = 0;
        for _ in 0..100 {
            if let Some(wo) =
                glossy.sample_direction(&rng.uniform_point2f(), 0.0, &geom, &wi)
            {
                found += 1;
                assert!(glossy.evaluate_direction_pdf(&geom, &wi, &wo, false) > 0.0);
                let f = glossy.evaluate_direction(&geom, &wi, &wo, TransportDirection::EyeToLight, false);
                assert!(f.y() > 0.0);
            }
        }
        assert!(found > 50);
        assert!(!glossy.is_delta_direction());
    }
}
