//! Geometric shapes. Only the two shapes the renderers need are
//! provided, a parallelogram (**Quad**) and a **Sphere**; both offer ray
//! intersection and uniform area sampling so they can carry an area
//! light.
//!
//! ## Quads
//!
//! A quad is given by a corner `p` and two edge vectors `e1` and `e2`;
//! its normal is `normalize(e1 x e2)`.
//!
//! ## Spheres
//!
//! Spheres are a special case of a general type of surfaces called
//! quadrics. Their normal points outwards.

// std
use std::f32::consts::PI;
// pbrt
use crate::core::geometry::{vec3_cross_vec3, vec3_dot_vec3f};
use crate::core::geometry::{Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::interaction::SurfaceGeometry;
use crate::core::pbrt::{quadratic, Float};
use crate::core::sampling::uniform_sample_sphere;

#[derive(Debug, Clone)]
pub struct Quad {
    pub p: Point3f,
    pub e1: Vector3f,
    pub e2: Vector3f,
    n: Normal3f,
    area: Float,
}

impl Quad {
    pub fn new(p: Point3f, e1: Vector3f, e2: Vector3f) -> Self {
        let c = vec3_cross_vec3(&e1, &e2);
        let area = c.length();
        Quad {
            p,
            e1,
            e2,
            n: Normal3f::from(c / area),
            area,
        }
    }
    pub fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceGeometry)> {
        // Moeller-Trumbore on the parallelogram spanned by e1 and e2
        let pvec = vec3_cross_vec3(&ray.d, &self.e2);
        let det = vec3_dot_vec3f(&self.e1, &pvec);
        if det.abs() < 1e-12 as Float {
            return None;
        }
        let inv_det = 1.0 as Float / det;
        let tvec = ray.o - self.p;
        let u = vec3_dot_vec3f(&tvec, &pvec) * inv_det;
        if u < 0.0 as Float || u > 1.0 as Float {
            return None;
        }
        let qvec = vec3_cross_vec3(&tvec, &self.e1);
        let v = vec3_dot_vec3f(&ray.d, &qvec) * inv_det;
        if v < 0.0 as Float || v > 1.0 as Float {
            return None;
        }
        let t = vec3_dot_vec3f(&self.e2, &qvec) * inv_det;
        if t <= ray.t_min || t >= ray.t_max {
            return None;
        }
        Some((t, SurfaceGeometry::new(self.p + self.e1 * u + self.e2 * v, self.n)))
    }
    pub fn sample(&self, u: &Point2f) -> SurfaceGeometry {
        SurfaceGeometry::new(self.p + self.e1 * u.x + self.e2 * u.y, self.n)
    }
    pub fn area(&self) -> Float {
        self.area
    }
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point3f,
    pub radius: Float,
}

impl Sphere {
    pub fn new(center: Point3f, radius: Float) -> Self {
        Sphere { center, radius }
    }
    pub fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceGeometry)> {
        // compute quadratic sphere coefficients
        let oc = ray.o - self.center;
        let a = ray.d.length_squared();
        let b = 2.0 as Float * vec3_dot_vec3f(&oc, &ray.d);
        let c = oc.length_squared() - self.radius * self.radius;
        let (t0, t1) = quadratic(a, b, c)?;
        // check quadric shape _t0_ and _t1_ for nearest intersection
        let t = if t0 > ray.t_min && t0 < ray.t_max {
            t0
        } else if t1 > ray.t_min && t1 < ray.t_max {
            t1
        } else {
            return None;
        };
        let p_hit = ray.position(t);
        let n = Normal3f::from((p_hit - self.center) / self.radius);
        Some((t, SurfaceGeometry::new(p_hit, n)))
    }
    pub fn sample(&self, u: &Point2f) -> SurfaceGeometry {
        let d = uniform_sample_sphere(u);
        SurfaceGeometry::new(self.center + d * self.radius, Normal3f::from(d))
    }
    pub fn area(&self) -> Float {
        4.0 as Float * PI * self.radius * self.radius
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    Quad(Quad),
    Sphere(Sphere),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceGeometry)> {
        match self {
            Shape::Quad(shape) => shape.intersect(ray),
            Shape::Sphere(shape) => shape.intersect(ray),
        }
    }
    /// Uniform position on the surface; density `1 / area()`.
    pub fn sample(&self, u: &Point2f) -> SurfaceGeometry {
        match self {
            Shape::Quad(shape) => shape.sample(u),
            Shape::Sphere(shape) => shape.sample(u),
        }
    }
    pub fn area(&self) -> Float {
        match self {
            Shape::Quad(shape) => shape.area(),
            Shape::Sphere(shape) => shape.area(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_quad() -> Quad {
        Quad::new(
            Point3f::new(-0.5, -0.5, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn quad_hit_and_miss() {
        let quad = unit_quad();
        assert!((quad.area() - 1.0).abs() < 1e-6);
        let ray = Ray::new(
            Point3f::new(0.1, 0.2, 2.0),
            Vector3f::new(0.0, 0.0, -1.0),
            1e-4,
            Float::INFINITY,
        );
        let (t, geom) = quad.intersect(&ray).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
        assert!((geom.p.x - 0.1).abs() < 1e-5);
        assert!((geom.gn.z - 1.0).abs() < 1e-6);
        let miss = Ray::new(
            Point3f::new(0.6, 0.0, 2.0),
            Vector3f::new(0.0, 0.0, -1.0),
            1e-4,
            Float::INFINITY,
        );
        assert!(quad.intersect(&miss).is_none());
        // segment ending before the plane
        let short = Ray::new(ray.o, ray.d, 1e-4, 1.5);
        assert!(quad.intersect(&short).is_none());
    }

    #[test]
    fn sphere_hit_from_inside_and_outside() {
        let sphere = Sphere::new(Point3f::default(), 1.0);
        let outside = Ray::new(
            Point3f::new(0.0, 0.0, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            1e-4,
            Float::INFINITY,
        );
        let (t, geom) = sphere.intersect(&outside).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
        assert!((geom.gn.z - 1.0).abs() < 1e-5);
        let inside = Ray::new(
            Point3f::default(),
            Vector3f::new(1.0, 0.0, 0.0),
            1e-4,
            Float::INFINITY,
        );
        let (t, _) = sphere.intersect(&inside).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn samples_lie_on_the_surface() {
        let sphere = Shape::Sphere(Sphere::new(Point3f::new(1.0, 2.0, 3.0), 0.5));
        let geom = sphere.sample(&Point2f { x: 0.3, y: 0.7 });
        let d = geom.p - Point3f::new(1.0, 2.0, 3.0);
        assert!((d.length() - 0.5).abs() < 1e-5);
        let quad = Shape::Quad(unit_quad());
        let geom = quad.sample(&Point2f { x: 0.25, y: 0.75 });
        assert!((geom.p.x + 0.25).abs() < 1e-6);
        assert!((geom.p.y - 0.25).abs() < 1e-6);
    }
}
