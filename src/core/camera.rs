//! Pinhole sensor.
//!
//! The pinhole is a point (delta position), so its vertices are
//! degenerated and contribute a cosine of 1 to the geometry term. Its
//! directional importance equals its direction density: rays are
//! generated uniformly over the image plane at distance 1, which has
//! solid angle density `1 / (A cos^3)`.

// pbrt
use crate::core::geometry::{vec3_cross_vec3, vec3_dot_vec3f};
use crate::core::geometry::{Point2f, Point3f, Vector3f};
use crate::core::interaction::SurfaceGeometry;
use crate::core::pbrt::{radians, Float, Spectrum};

#[derive(Debug, Clone)]
pub struct PinholeCamera {
    pub position: Point3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    /// image plane extent at distance 1
    plane_width: Float,
    plane_height: Float,
}

impl PinholeCamera {
    /// `fov` is the vertical field of view in degrees, `aspect` is
    /// width over height of the film.
    pub fn new(position: Point3f, look_at: Point3f, up: Vector3f, fov: Float, aspect: Float) -> Self {
        let forward = (look_at - position).normalize();
        let right = vec3_cross_vec3(&forward, &up).normalize();
        let up = vec3_cross_vec3(&right, &forward);
        let plane_height = 2.0 as Float * (radians(fov) * 0.5 as Float).tan();
        PinholeCamera {
            position,
            forward,
            right,
            up,
            plane_width: plane_height * aspect,
            plane_height,
        }
    }
    pub fn sample_position(&self) -> SurfaceGeometry {
        SurfaceGeometry::point(self.position)
    }
    /// Direction through the normalized raster position `u`, with raster
    /// y pointing down.
    pub fn sample_direction(&self, u: &Point2f) -> Vector3f {
        let x = (u.x - 0.5 as Float) * self.plane_width;
        let y = (0.5 as Float - u.y) * self.plane_height;
        (self.forward + self.right * x + self.up * y).normalize()
    }
    /// Normalized raster position in `[0,1]^2` seen along `wo`, if any.
    pub fn raster_position(&self, wo: &Vector3f) -> Option<Point2f> {
        let cos_theta = vec3_dot_vec3f(wo, &self.forward);
        if cos_theta <= 0.0 as Float {
            return None;
        }
        let on_plane = *wo / cos_theta;
        let x = vec3_dot_vec3f(&on_plane, &self.right) / self.plane_width + 0.5 as Float;
        let y = 0.5 as Float - vec3_dot_vec3f(&on_plane, &self.up) / self.plane_height;
        if x < 0.0 as Float || x > 1.0 as Float || y < 0.0 as Float || y > 1.0 as Float {
            return None;
        }
        Some(Point2f { x, y })
    }
    pub fn evaluate_direction_pdf(&self, wo: &Vector3f) -> Float {
        if self.raster_position(wo).is_none() {
            return 0.0 as Float;
        }
        let cos_theta = vec3_dot_vec3f(wo, &self.forward);
        1.0 as Float / (self.plane_width * self.plane_height * cos_theta * cos_theta * cos_theta)
    }
    pub fn evaluate_direction(&self, wo: &Vector3f) -> Spectrum {
        Spectrum::new(self.evaluate_direction_pdf(wo))
    }
}
