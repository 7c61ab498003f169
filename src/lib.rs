//! # rs_mlt
//!
//! Fixed path length light transport. Every renderer of this crate only
//! estimates the contribution of light paths with exactly `n` vertices,
//! which makes it easy to compare different sampling techniques on the
//! same path space:
//!
//! 1. [bidirectional path tracing][render_bdpt]
//! 2. [Metropolis Light Transport][render_mlt] with bidirectional
//!    mutations and lens, caustic and multi-chain perturbations
//!
//! Scenes, film and renderer are described in a JSON file which is read
//! into a [ParamSet][paramset].
//!
//! [render_bdpt]: integrators/bdpt/struct.BDPTFixedRenderer.html#method.render
//! [render_mlt]: integrators/mlt/struct.MLTFixedRenderer.html#method.render
//! [paramset]: core/paramset/struct.ParamSet.html

#[macro_use]
extern crate impl_ops;

pub mod core;
pub mod integrators;
