//! The film accumulates splatted path contributions.
//!
//! Every worker renders into its own copy (`Film` is `Clone`); copies
//! are merged single-threaded with `accumulate` after all workers have
//! finished, so a film is never shared between threads.

// std
use std::path::Path;
// others
use log::info;
use num::Zero;
use thiserror::Error;
// pbrt
use crate::core::geometry::Point2f;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{clamp_t, gamma_correct, Float, Spectrum};

#[derive(Debug, Error)]
pub enum FilmError {
    #[error("cannot accumulate a {0}x{1} film into a {2}x{3} film")]
    SizeMismatch(u32, u32, u32, u32),
    #[error("cannot write image {path}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone)]
pub struct Film {
    pub width: u32,
    pub height: u32,
    pub filename: String,
    pixels: Vec<Spectrum>,
}

impl Film {
    pub fn new(width: u32, height: u32, filename: &str) -> Self {
        Film {
            width,
            height,
            filename: filename.to_string(),
            pixels: vec![Spectrum::zero(); (width * height) as usize],
        }
    }
    pub fn create(params: &ParamSet) -> Film {
        let width: u32 = params.find_one("width", 640_u32).max(1);
        let height: u32 = params.find_one("height", 480_u32).max(1);
        let filename: String = params.find_one("filename", String::from("rs_mlt.png"));
        Film::new(width, height, &filename)
    }
    pub fn aspect(&self) -> Float {
        self.width as Float / self.height as Float
    }
    pub fn clear(&mut self) {
        for p in self.pixels.iter_mut() {
            *p = Spectrum::zero();
        }
    }
    /// Adds `v` to the pixel containing the normalized raster position
    /// `p` (in `[0,1]^2`). NaN, infinite or negative values are dropped.
    pub fn splat(&mut self, p: &Point2f, v: &Spectrum) {
        if !v.is_valid() || v.y() < 0.0 as Float {
            return;
        }
        if !(p.x >= 0.0 as Float && p.x <= 1.0 as Float && p.y >= 0.0 as Float && p.y <= 1.0 as Float) {
            return;
        }
        let x = clamp_t((p.x * self.width as Float) as u32, 0, self.width - 1);
        let y = clamp_t((p.y * self.height as Float) as u32, 0, self.height - 1);
        self.pixels[(y * self.width + x) as usize] += *v;
    }
    pub fn accumulate(&mut self, other: &Film) -> Result<(), FilmError> {
        if other.width != self.width || other.height != self.height {
            return Err(FilmError::SizeMismatch(
                other.width,
                other.height,
                self.width,
                self.height,
            ));
        }
        for (p, o) in self.pixels.iter_mut().zip(other.pixels.iter()) {
            *p += *o;
        }
        Ok(())
    }
    pub fn rescale(&mut self, factor: Float) {
        for p in self.pixels.iter_mut() {
            *p *= factor;
        }
    }
    pub fn pixel(&self, x: u32, y: u32) -> Spectrum {
        self.pixels[(y * self.width + x) as usize]
    }
    /// Writes an 8-bit, gamma corrected image; the format follows from
    /// the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FilmError> {
        let path = path.as_ref();
        info!("Writing image {:?} ({}x{})", path, self.width, self.height);
        let mut buffer: Vec<u8> = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            for c in 0..3 {
                buffer.push(clamp_t(
                    255.0 as Float * gamma_correct(p[c]) + 0.5,
                    0.0 as Float,
                    255.0 as Float,
                ) as u8);
            }
        }
        image::save_buffer(
            path,
            &buffer,
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )
        .map_err(|source| FilmError::Image {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn splat_maps_raster_positions_to_pixels() {
        let mut film = Film::new(4, 2, "test.png");
        film.splat(&Point2f { x: 0.0, y: 0.0 }, &Spectrum::new(1.0));
        film.splat(&Point2f { x: 1.0, y: 1.0 }, &Spectrum::new(2.0));
        film.splat(&Point2f { x: 0.6, y: 0.2 }, &Spectrum::new(3.0));
        assert_eq!(film.pixel(0, 0), Spectrum::new(1.0));
        assert_eq!(film.pixel(3, 1), Spectrum::new(2.0));
        assert_eq!(film.pixel(2, 0), Spectrum::new(3.0));
    }

    #[test]
    fn invalid_splats_are_ignored() {
        let mut film = Film::new(2, 2, "test.png");
        film.splat(&Point2f { x: 0.5, y: 0.5 }, &Spectrum::new(Float::NAN));
        film.splat(&Point2f { x: 0.5, y: 0.5 }, &Spectrum::new(Float::INFINITY));
        film.splat(&Point2f { x: 0.5, y: 0.5 }, &Spectrum::new(-1.0));
        film.splat(&Point2f { x: 1.5, y: 0.5 }, &Spectrum::new(1.0));
        for y in 0..2 {
            for x in 0..2 {
                assert!(film.pixel(x, y).is_black());
            }
        }
    }

    #[test]
    fn accumulating_a_cleared_film_changes_nothing() {
        let mut film = Film::new(3, 3, "test.png");
        film.splat(&Point2f { x: 0.5, y: 0.5 }, &Spectrum::new(2.0));
        let mut other = film.clone();
        other.clear();
        film.accumulate(&other).unwrap();
        assert_eq!(film.pixel(1, 1), Spectrum::new(2.0));
        film.rescale(0.5);
        assert_eq!(film.pixel(1, 1), Spectrum::new(1.0));
        let small = Film::new(2, 2, "test.png");
        assert!(film.accumulate(&small).is_err());
    }

    #[test]
    fn save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("film.png");
        let mut film = Film::new(8, 4, "unused.png");
        film.splat(&Point2f { x: 0.1, y: 0.1 }, &Spectrum::new(0.5));
        film.save(&path).unwrap();
        assert!(path.exists());
    }
}
