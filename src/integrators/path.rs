//! Path tracing of fixed length paths.
//!
//! Samples a path of exactly `n` vertices from the sensor and uses it
//! as is when the last vertex lies on a light (the `s == 0` strategy).
//! The Metropolis renderer draws its seed samples and initial states
//! this way.

// pbrt
use crate::core::interaction::TransportDirection;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::integrators::bdpt::{connect_subpaths, Path, PathError, Subpath};

pub fn sample_path_by_path_tracing<'a>(
    scene: &'a Scene,
    rng: &mut Rng,
    num_vertices: usize,
) -> Result<Path<'a>, PathError> {
    let mut subpath_e: Subpath<'a> = Subpath::default();
    let num_sampled: usize = subpath_e.sample_subpath_from_endpoint(
        scene,
        rng,
        TransportDirection::EyeToLight,
        num_vertices,
    );
    if num_sampled != num_vertices {
        return Err(PathError::IncompleteSubpath(num_sampled, num_vertices));
    }
    connect_subpaths(scene, &Subpath::default(), &subpath_e, 0, num_vertices)
}
