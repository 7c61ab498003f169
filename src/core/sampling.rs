//! Sampling of directions, positions and discrete events.

// pbrt
use crate::core::geometry::{Point2f, Vector3f};
use crate::core::pbrt::clamp_t;
use crate::core::pbrt::{Float, INV_PI, PI_OVER_2, PI_OVER_4};

// see sampling.h

/// Piecewise-constant 1D function, used here only for its discrete
/// sampling routines (emitter selection, mutation strategy selection).
#[derive(Debug, Default, Clone)]
pub struct Distribution1D {
    pub func: Vec<Float>,
    pub cdf: Vec<Float>,
    pub func_int: Float,
}

impl Distribution1D {
    pub fn new(f: Vec<Float>) -> Self {
        let n: usize = f.len();
        // compute integral of step function at $x_i$
        let mut cdf: Vec<Float> = Vec::with_capacity(n + 1);
        cdf.push(0.0 as Float);
        for i in 1..(n + 1) {
            let previous: Float = cdf[i - 1];
            cdf.push(previous + f[i - 1] / n as Float);
        }
        // transform step function integral into CDF
        let func_int: Float = cdf[n];
        if func_int == 0.0 as Float {
            for (i, c) in cdf.iter_mut().enumerate().skip(1) {
                *c = i as Float / n as Float;
            }
        } else {
            for c in cdf.iter_mut().skip(1) {
                *c /= func_int;
            }
        }
        Distribution1D { func: f, cdf, func_int }
    }
    pub fn count(&self) -> usize {
        self.func.len()
    }
    pub fn sample_discrete(&self, u: Float) -> usize {
        // see pbrt.h (int FindInterval(int size, const Predicate &pred) {...})
        let mut first: usize = 0;
        let mut len: usize = self.cdf.len();
        while len > 0 as usize {
            let half: usize = len >> 1;
            let middle: usize = first + half;
            // bisect range based on value of _pred_ at _middle_
            if self.cdf[middle] <= u {
                first = middle + 1;
                len -= half + 1;
            } else {
                len = half;
            }
        }
        clamp_t(
            first as isize - 1_isize,
            0 as isize,
            self.cdf.len() as isize - 2_isize,
        ) as usize
    }
    pub fn discrete_pdf(&self, index: usize) -> Float {
        if index >= self.func.len() || self.func_int == 0.0 as Float {
            return 0.0 as Float;
        }
        self.func[index] / (self.func_int * self.func.len() as Float)
    }
}

/// Discrete distribution over the integers whose probabilities fall off
/// geometrically on both sides of a center, restricted to `[start, end]`.
#[derive(Debug, Clone)]
pub struct TwoTailedGeometricDist {
    base: Float,
    inv_base_log: Float,
    center: i32,
    start: i32,
    end: i32,
    offset: Float,
    normalization: Float,
}

impl TwoTailedGeometricDist {
    pub fn new(base: Float) -> Self {
        TwoTailedGeometricDist {
            base,
            inv_base_log: 1.0 as Float / base.ln(),
            center: 0,
            start: 0,
            end: 0,
            offset: 0.0 as Float,
            normalization: 1.0 as Float,
        }
    }
    pub fn configure(&mut self, center: i32, start: i32, end: i32) {
        self.center = center;
        self.start = start - center;
        self.end = end - center;
        self.offset = self.r_cdf((self.start - 1) as Float);
        self.normalization = self.r_cdf(self.end as Float) - self.offset;
    }
    pub fn evaluate(&self, x: i32) -> Float {
        let x = x - self.center;
        if x < self.start || x > self.end {
            return 0.0 as Float;
        }
        self.r_pmf(x as Float) / self.normalization
    }
    pub fn evaluate_cdf(&self, x: i32) -> Float {
        let mut x = x - self.center;
        if x < self.start {
            return 0.0 as Float;
        } else if x > self.end {
            x = self.end;
        }
        (self.r_cdf(x as Float) - self.offset) / self.normalization
    }
    pub fn sample(&self, u: Float) -> i32 {
        let x = self.r_cdf_inv(u * self.normalization + self.offset).ceil() as i32;
        clamp_t(x, self.start, self.end) + self.center
    }
    fn r_pmf(&self, x: Float) -> Float {
        (self.base - 1.0 as Float) / (self.base + 1.0 as Float) * self.base.powf(-x.abs())
    }
    fn r_cdf(&self, x: Float) -> Float {
        if x <= 0.0 as Float {
            self.base.powf(x + 1.0 as Float) / (self.base + 1.0 as Float)
        } else {
            1.0 as Float - self.base.powf(-x) / (self.base + 1.0 as Float)
        }
    }
    fn r_cdf_inv(&self, x: Float) -> Float {
        if x < self.base / (self.base + 1.0 as Float) {
            ((self.base + 1.0 as Float) * x).ln() * self.inv_base_log - 1.0 as Float
        } else {
            -((1.0 as Float - x) * (self.base + 1.0 as Float)).ln() * self.inv_base_log
        }
    }
}

/// Uniformly distribute samples over a unit disk.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // map uniform random numbers to $[-1,1]^2$
    let u_offset = Point2f {
        x: u.x * 2.0 as Float - 1.0 as Float,
        y: u.y * 2.0 as Float - 1.0 as Float,
    };
    // handle degeneracy at the origin
    if u_offset.x == 0.0 as Float && u_offset.y == 0.0 as Float {
        return Point2f::default();
    }
    // apply concentric mapping to point
    let theta: Float;
    let r: Float;
    if u_offset.x.abs() > u_offset.y.abs() {
        r = u_offset.x;
        theta = PI_OVER_4 * (u_offset.y / u_offset.x);
    } else {
        r = u_offset.y;
        theta = PI_OVER_2 - PI_OVER_4 * (u_offset.x / u_offset.y);
    }
    Point2f {
        x: theta.cos() * r,
        y: theta.sin() * r,
    }
}

/// Cosine-weighted direction around +z; density `cos_theta / PI`.
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d: Point2f = concentric_sample_disk(u);
    let z: Float = (0.0 as Float)
        .max(1.0 as Float - d.x * d.x - d.y * d.y)
        .sqrt();
    Vector3f { x: d.x, y: d.y, z }
}

/// Returns a weight of cos_theta / PI.
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z: Float = 1.0 as Float - 2.0 as Float * u[0];
    let r: Float = (0.0 as Float).max(1.0 as Float - z * z).sqrt();
    let phi: Float = 2.0 as Float * std::f32::consts::PI * u[1];
    Vector3f {
        x: r * phi.cos(),
        y: r * phi.sin(),
        z,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::rng::Rng;

    #[test]
    fn two_tailed_geometric_sums_to_one() {
        let mut dist = TwoTailedGeometricDist::new(2.0);
        dist.configure(1, 1, 5);
        let total: Float = (1..=5).map(|x| dist.evaluate(x)).sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert_eq!(dist.evaluate(0), 0.0);
        assert_eq!(dist.evaluate(6), 0.0);
        assert!((dist.evaluate_cdf(5) - 1.0).abs() < 1e-5);
        // mass falls off away from the center
        assert!(dist.evaluate(1) > dist.evaluate(2));
        assert!(dist.evaluate(2) > dist.evaluate(3));
    }

    #[test]
    fn two_tailed_geometric_samples_follow_pmf() {
        let mut dist = TwoTailedGeometricDist::new(2.0);
        dist.configure(1, 1, 4);
        let mut rng = Rng::with_seed(3);
        let mut counts = [0_u32; 5];
        let n = 100_000;
        for _ in 0..n {
            let x = dist.sample(rng.uniform_float());
            assert!((1..=4).contains(&x));
            counts[x as usize] += 1;
        }
        for x in 1..=4 {
            let freq = counts[x] as Float / n as Float;
            assert!((freq - dist.evaluate(x as i32)).abs() < 0.01);
        }
    }

    #[test]
    fn discrete_sampling_skips_zero_weights() {
        let distr = Distribution1D::new(vec![0.0, 2.0, 0.0, 2.0]);
        let mut rng = Rng::with_seed(11);
        for _ in 0..1000 {
            let i = distr.sample_discrete(rng.uniform_float());
            assert!(i == 1 || i == 3);
        }
        assert!((distr.discrete_pdf(1) - 0.5).abs() < 1e-6);
        assert_eq!(distr.discrete_pdf(2), 0.0);
        assert_eq!(distr.discrete_pdf(7), 0.0);
    }
}
