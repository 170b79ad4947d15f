#![allow(non_snake_case)]

//! Provides functions and higher-level constructs for finding ground states of
//! the two-dimensional, rotating Gross-Pitaevskii equation (GPE) for a trapped
//! Bose-Einstein condensate via imaginary-time propagation with the split-step
//! pseudo-spectral method.
//!
//! The pipeline is strictly sequential:
//! - [`grid`]: periodic real-space and reciprocal-space lattices
//! - [`hamiltonian`]: kinetic, trap, rotation and interaction terms, plus the
//!   [`Evaluator`][hamiltonian::Evaluator] that renormalizes the state and
//!   refreshes the density-dependent term before every sub-step
//! - [`state`]: Gaussian wavepackets with an imprinted phase vortex
//! - [`timedep`]: checkpointed split-step propagation in imaginary (or real)
//!   time
//! - [`observables`]: energies, winding numbers and vortex detection
//!
//! Wavefunctions are plain [`ndarray::Array2`]s of shape `(nx, ny)` whose
//! element `[i, j]` samples *ψ*(*x*\[i\], *y*\[j\]).
//!
//! See [`docs`] for theoretical background.

pub mod config;
pub mod error;
pub mod grid;
pub mod hamiltonian;
pub mod observables;
pub mod operator;
pub mod state;
pub mod timedep;
pub mod utils;

pub mod docs;

/// Default number of sample points for loop winding numbers.
pub const DEF_SAMPLES: usize = 720;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;

pub use config::{ Params, Quadrature };
pub use grid::{ Axis, Grid };
