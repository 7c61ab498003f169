//! The collaborators of the light transport algorithms.
//!
//! ## Geometry and Sampling
//!
//! Points, vectors, normals and rays (**geometry**), the PCG32 random
//! number generator (**rng**) and discrete and continuous sampling
//! routines (**sampling**).
//!
//! ## Surfaces
//!
//! Shapes (quads and spheres), BSDFs, area lights and the pinhole
//! sensor are combined into a **Primitive**. Every path vertex refers
//! to one primitive and talks to it through the generalized sampling
//! and evaluation interface, dispatched on the interaction type.
//!
//! ## Scene Description
//!
//! A **ParamSet** holds the JSON scene description as a property tree.
//! The **Scene** and the **Film** are created from it.

pub mod camera;
pub mod film;
pub mod geometry;
pub mod interaction;
pub mod light;
pub mod parallel;
pub mod paramset;
pub mod pbrt;
pub mod photonmap;
pub mod primitive;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod shape;
pub mod spectrum;
