//! Points, vectors, normals and rays.
//!
//! A **point** is a location, a **vector** a direction (or an offset
//! between two points) and a **normal** is perpendicular to a surface
//! at a particular position. The three share a representation but not
//! the set of operations they allow, which keeps code like `p + v`
//! (a point) and `p1 - p2` (a vector) honest.
//!
//! ```rust
//! use rs_mlt::core::geometry::{Point3f, Vector3f};
//!
//!     let origin = Point3f::default();
//!     let up = Vector3f { x: 0.0, y: 1.0, z: 0.0 };
//!     let p = origin + up * 2.0;
//!
//!     assert_eq!((p - origin).length(), 2.0);
//! ```

// std
use std::ops;
use std::ops::{Index, Neg};
// pbrt
use crate::core::pbrt::Float;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point2f {
    pub x: Float,
    pub y: Float,
}

impl Index<usize> for Point2f {
    type Output = Float;
    fn index(&self, index: usize) -> &Float {
        match index {
            0 => &self.x,
            _ => &self.y,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Vector3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Vector3f { x, y, z }
    }
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    /// Compute a new vector pointing in the same direction but with unit
    /// length.
    pub fn normalize(&self) -> Vector3f {
        *self / self.length()
    }
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 as Float && self.y == 0.0 as Float && self.z == 0.0 as Float
    }
}

impl Neg for Vector3f {
    type Output = Vector3f;
    fn neg(self) -> Vector3f {
        Vector3f {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl From<Normal3f> for Vector3f {
    fn from(n: Normal3f) -> Self {
        Vector3f {
            x: n.x,
            y: n.y,
            z: n.z,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Point3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Point3f { x, y, z }
    }
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Normal3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Normal3f {
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    /// Compute a new normal pointing in the same direction but with unit
    /// length.
    pub fn normalize(&self) -> Normal3f {
        *self / self.length()
    }
}

impl Neg for Normal3f {
    type Output = Normal3f;
    fn neg(self) -> Normal3f {
        Normal3f {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl From<Vector3f> for Normal3f {
    fn from(v: Vector3f) -> Self {
        Normal3f {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl_op_ex!(+|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(-|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(+|a: &Point3f, b: &Vector3f| -> Point3f {
    Point3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(-|a: &Point3f, b: &Vector3f| -> Point3f {
    Point3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(-|a: &Point3f, b: &Point3f| -> Vector3f {
    Vector3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(*|a: &Vector3f, b: Float| -> Vector3f {
    Vector3f {
        x: a.x * b,
        y: a.y * b,
        z: a.z * b,
    }
});

impl_op_ex!(*|a: &Normal3f, b: Float| -> Normal3f {
    Normal3f {
        x: a.x * b,
        y: a.y * b,
        z: a.z * b,
    }
});

impl_op_ex!(/|a: &Vector3f, b: Float| -> Vector3f {
    let inv: Float = 1.0 as Float / b;
    Vector3f {
        x: a.x * inv,
        y: a.y * inv,
        z: a.z * inv,
    }
});

impl_op_ex!(/|a: &Normal3f, b: Float| -> Normal3f {
    let inv: Float = 1.0 as Float / b;
    Normal3f {
        x: a.x * inv,
        y: a.y * inv,
        z: a.z * inv,
    }
});

/// Product of the Euclidean magnitudes of the two vectors and the
/// cosine of the angle between them.
pub fn vec3_dot_vec3f(v1: &Vector3f, v2: &Vector3f) -> Float {
    v1.x * v2.x + v1.y * v2.y + v1.z * v2.z
}

/// Dot product of a vector and a normal.
pub fn vec3_dot_nrmf(v1: &Vector3f, n2: &Normal3f) -> Float {
    v1.x * n2.x + v1.y * n2.y + v1.z * n2.z
}

/// Given two vectors in 3D, the cross product is a vector that is
/// perpendicular to both of them.
pub fn vec3_cross_vec3(v1: &Vector3f, v2: &Vector3f) -> Vector3f {
    let v1x: f64 = v1.x as f64;
    let v1y: f64 = v1.y as f64;
    let v1z: f64 = v1.z as f64;
    let v2x: f64 = v2.x as f64;
    let v2y: f64 = v2.y as f64;
    let v2z: f64 = v2.z as f64;
    Vector3f {
        x: ((v1y * v2z) - (v1z * v2y)) as Float,
        y: ((v1z * v2x) - (v1x * v2z)) as Float,
        z: ((v1x * v2y) - (v1y * v2x)) as Float,
    }
}

/// Construct a local coordinate system given only a single 3D vector.
pub fn vec3_coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3f {
            x: -v1.z,
            y: 0.0 as Float,
            z: v1.x,
        } / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f {
            x: 0.0 as Float,
            y: v1.z,
            z: -v1.y,
        } / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = vec3_cross_vec3(v1, &v2);
    (v2, v3)
}

/// Mirror *w* about the normal *n*; both point away from the surface.
pub fn vec3_reflect(w: &Vector3f, n: &Normal3f) -> Vector3f {
    let nv = Vector3f::from(*n);
    nv * (2.0 as Float * vec3_dot_nrmf(w, n)) - *w
}

pub fn pnt3_distance_squaredf(p1: &Point3f, p2: &Point3f) -> Float {
    (*p1 - *p2).length_squared()
}

/// Semi-infinite line given by origin and direction, restricted to the
/// parametric segment `[t_min, t_max]`.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    /// origin
    pub o: Point3f,
    /// direction
    pub d: Vector3f,
    pub t_min: Float,
    pub t_max: Float,
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f, t_min: Float, t_max: Float) -> Self {
        Ray { o, d, t_min, t_max }
    }
    pub fn position(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coordinate_system_is_orthonormal() {
        let v = Vector3f::new(0.3, -0.5, 0.8).normalize();
        let (s, t) = vec3_coordinate_system(&v);
        assert!(vec3_dot_vec3f(&v, &s).abs() < 1e-5);
        assert!(vec3_dot_vec3f(&v, &t).abs() < 1e-5);
        assert!(vec3_dot_vec3f(&s, &t).abs() < 1e-5);
        assert!((s.length() - 1.0).abs() < 1e-5);
        assert!((t.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn point_and_vector_arithmetic() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        let v = Vector3f::new(0.5, -1.0, 2.0);
        let q = p + v;
        assert_eq!(q, Point3f::new(1.5, 1.0, 5.0));
        assert_eq!(q - p, v);
        assert_eq!(q - v, p);
        assert_eq!(&v + &v, v * 2.0);
        assert_eq!(v - v, Vector3f::default());
        assert_eq!((v * 4.0) / 2.0, v * 2.0);
        assert_eq!(-v, Vector3f::new(-0.5, 1.0, -2.0));
        let n = Normal3f {
            x: 0.0,
            y: 2.0,
            z: 0.0,
        };
        assert_eq!((n * 0.5).y, 1.0);
        assert_eq!((n / 2.0).y, 1.0);
    }

    #[test]
    fn reflect_keeps_the_normal_component() {
        let n = Normal3f {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        };
        let w = Vector3f::new(1.0, 0.0, 1.0).normalize();
        let r = vec3_reflect(&w, &n);
        assert!((r.x + w.x).abs() < 1e-6);
        assert!((r.z - w.z).abs() < 1e-6);
    }
}
