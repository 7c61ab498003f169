//! Photon storage with radius queries.

// pbrt
use crate::core::geometry::{pnt3_distance_squaredf, Point3f, Vector3f};
use crate::core::pbrt::{Float, Spectrum};

#[derive(Debug, Default, Copy, Clone)]
pub struct Photon {
    pub p: Point3f,
    /// throughput of the light subpath which deposited the photon
    pub throughput: Spectrum,
    /// direction towards the previous vertex
    pub wi: Vector3f,
    pub num_vertices: usize,
}

/// Keeps all photons in a list and answers queries by a linear scan.
#[derive(Debug, Default, Clone)]
pub struct NaivePhotonMap {
    photons: Vec<Photon>,
}

impl NaivePhotonMap {
    pub fn build(&mut self, photons: Vec<Photon>) {
        self.photons = photons;
    }
    pub fn len(&self) -> usize {
        self.photons.len()
    }
    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }
    /// Calls `collect` for every photon strictly closer than `radius`.
    pub fn collect_photons<F>(&self, p: &Point3f, radius: Float, mut collect: F)
    where
        F: FnMut(&Photon),
    {
        let radius2: Float = radius * radius;
        for photon in &self.photons {
            if pnt3_distance_squaredf(&photon.p, p) < radius2 {
                collect(photon);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn photon(x: Float) -> Photon {
        Photon {
            p: Point3f::new(x, 0.0, 0.0),
            throughput: Spectrum::new(1.0),
            ..Default::default()
        }
    }

    #[test]
    fn collects_within_radius() {
        let mut map = NaivePhotonMap::default();
        assert!(map.is_empty());
        map.build((0..10).map(|i| photon(i as Float * 0.5)).collect());
        assert_eq!(map.len(), 10);
        let mut found: Vec<Float> = Vec::new();
        map.collect_photons(&Point3f::new(1.0, 0.0, 0.0), 0.6, |ph| found.push(ph.p.x));
        assert_eq!(found, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn boundary_is_exclusive() {
        let mut map = NaivePhotonMap::default();
        map.build(vec![photon(1.0)]);
        let mut count = 0;
        map.collect_photons(&Point3f::new(0.0, 0.0, 0.0), 1.0, |_| count += 1);
        assert_eq!(count, 0);
        map.collect_photons(&Point3f::new(0.0, 0.0, 0.0), 1.001, |_| count += 1);
        assert_eq!(count, 1);
    }
}
