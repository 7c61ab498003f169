//! Small scenes shared by the unit tests.

// pbrt
use crate::core::camera::PinholeCamera;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::light::DiffuseAreaLight;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::primitive::{Emitter, Primitive};
use crate::core::reflection::{Bsdf, DiffuseBsdf};
use crate::core::scene::Scene;
use crate::core::shape::{Quad, Shape, Sphere};

fn quad(p: Point3f, e1: Vector3f, e2: Vector3f, bsdf: Bsdf) -> Primitive {
    Primitive {
        index: 0,
        shape: Some(Shape::Quad(Quad::new(p, e1, e2))),
        bsdf: Some(bsdf),
        emitter: None,
    }
}

fn light(p: Point3f, e1: Vector3f, e2: Vector3f, le: Spectrum) -> Primitive {
    Primitive {
        emitter: Some(Emitter::AreaLight(DiffuseAreaLight::new(le))),
        ..quad(p, e1, e2, Bsdf::Diffuse(DiffuseBsdf::new(Spectrum::default())))
    }
}

fn diffuse(r: Float) -> Bsdf {
    Bsdf::Diffuse(DiffuseBsdf::new(Spectrum::new(r)))
}

fn box_primitives() -> Vec<Primitive> {
    vec![
        // floor
        quad(
            Point3f::new(-2.0, 0.0, -2.0),
            Vector3f::new(0.0, 0.0, 4.0),
            Vector3f::new(4.0, 0.0, 0.0),
            diffuse(0.8),
        ),
        // back wall
        quad(
            Point3f::new(-2.0, 0.0, -2.0),
            Vector3f::new(4.0, 0.0, 0.0),
            Vector3f::new(0.0, 4.0, 0.0),
            diffuse(0.8),
        ),
        light(
            Point3f::new(-0.5, 2.0, -0.5),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Spectrum::new(4.0),
        ),
    ]
}

fn box_camera() -> PinholeCamera {
    PinholeCamera::new(
        Point3f::new(0.0, 1.0, 3.0),
        Point3f::new(0.0, 1.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
        60.0,
        1.0,
    )
}

/// A unit light quad at the origin facing a sensor at distance 2 with a
/// 90 degree field of view. The light covers the central quarter of the
/// image extent in both axes. A diffuse wall sits behind the sensor.
pub fn quad_light_scene() -> Scene {
    let camera = PinholeCamera::new(
        Point3f::new(0.0, 0.0, 2.0),
        Point3f::new(0.0, 0.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
        90.0,
        1.0,
    );
    let primitives = vec![
        light(
            Point3f::new(-0.5, -0.5, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Spectrum::new(1.0),
        ),
        quad(
            Point3f::new(-2.0, -2.0, 3.0),
            Vector3f::new(0.0, 4.0, 0.0),
            Vector3f::new(4.0, 0.0, 0.0),
            diffuse(0.5),
        ),
    ];
    Scene::new(camera, primitives).unwrap()
}

/// Floor, back wall and a small ceiling light; the floor is primitive 0.
pub fn box_scene() -> Scene {
    Scene::new(box_camera(), box_primitives()).unwrap()
}

/// `box_scene` with a sphere of radius 0.5 resting on the floor.
pub fn box_scene_with_sphere(bsdf: Bsdf) -> Scene {
    let mut primitives = box_primitives();
    primitives.push(Primitive {
        index: 0,
        shape: Some(Shape::Sphere(Sphere::new(Point3f::new(0.0, 0.5, 0.0), 0.5))),
        bsdf: Some(bsdf),
        emitter: None,
    });
    Scene::new(box_camera(), primitives).unwrap()
}
