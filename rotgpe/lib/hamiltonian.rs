//! Construction of the rotating-frame GPE Hamiltonian and the per-step
//! dynamic evaluator.
//!
//! With *ħ* = 1 the Hamiltonian is
//! ```text
//!     p_x² + p_y²   m                                             2
//! H = ----------- + - (ω_x² x² + ω_y² y²) + Ω (x p_y - y p_x) + g |ψ|
//!         2 m       2
//! ```
//! Each term is diagonal in some representation: the trap and interaction in
//! position space, the kinetic energy in momentum space, `Ω x p_y` in the mixed
//! `(x, k_y)` representation and `-Ω y p_x` in the mixed `(k_x, y)`
//! representation.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr2,
    config::{ Params, Quadrature },
    error::{ ConfigError, NormError },
    grid::Grid,
    operator::Operator,
    utils::{ Fft2, Transform, wf_renormalize },
};

/// Position operator `x`, broadcast along y.
pub fn position_x(grid: &Grid) -> nd::Array2<f64> { grid.map(|x, _| x) }

/// Position operator `y`, broadcast along x.
pub fn position_y(grid: &Grid) -> nd::Array2<f64> { grid.map(|_, y| y) }

/// Momentum operator `p_x` in momentum space (FFT order), broadcast along
/// `k_y`.
pub fn momentum_x(grid: &Grid) -> nd::Array2<f64> { grid.map_k(|kx, _| kx) }

/// Momentum operator `p_y` in momentum space (FFT order), broadcast along
/// `k_x`.
pub fn momentum_y(grid: &Grid) -> nd::Array2<f64> { grid.map_k(|_, ky| ky) }

/// Kinetic energy `(p_x² + p_y²) / 2m` in momentum space.
pub fn kinetic(grid: &Grid, mass: f64) -> nd::Array2<f64> {
    grid.map_k(|kx, ky| (kx * kx + ky * ky) / (2.0 * mass))
}

/// Harmonic trap `m (ω_x² x² + ω_y² y²) / 2` in position space.
pub fn harmonic(grid: &Grid, mass: f64, omega_x: f64, omega_y: f64)
    -> nd::Array2<f64>
{
    grid.map(|x, y| {
        0.5 * mass * (omega_x.powi(2) * x * x + omega_y.powi(2) * y * y)
    })
}

/// Rotation cores `[Ω x k_y, -Ω y k_x]`.
///
/// The first is diagonal after transforming along y only, the second after
/// transforming along x only; their sum is `Ω L_z = Ω (x p_y - y p_x)`.
pub fn rotation(grid: &Grid, omega: f64) -> [nd::Array2<f64>; 2] {
    let x = &grid.x.coords;
    let y = &grid.y.coords;
    let kx = &grid.x.wavenumbers;
    let ky = &grid.y.wavenumbers;
    [
        nd::Array2::from_shape_fn(grid.dim(), |(i, j)| omega * x[i] * ky[j]),
        nd::Array2::from_shape_fn(grid.dim(), |(i, j)| -omega * y[j] * kx[i]),
    ]
}

/// Static parts of the Hamiltonian plus the coupling constants needed to build
/// the density-dependent term.
#[derive(Clone, Debug)]
pub struct Hamiltonian {
    pub grid: Grid,
    pub quadrature: Quadrature,
    pub g: f64,
    pub omega: f64,
    pub harmonic: nd::Array2<f64>,
    pub rotation: [nd::Array2<f64>; 2],
    pub kinetic: nd::Array2<f64>,
}

impl Hamiltonian {
    /// Build all static terms for `params` on `grid`.
    pub fn new(grid: &Grid, params: &Params) -> Result<Self, ConfigError> {
        ConfigError::check_mass(params.mass)?;
        ConfigError::check_finite("omega_x", params.omega_x)?;
        ConfigError::check_finite("omega_y", params.omega_y)?;
        ConfigError::check_finite("rotation", params.rotation)?;
        ConfigError::check_finite("g", params.g)?;
        Ok(Self {
            grid: grid.clone(),
            quadrature: params.quadrature,
            g: params.g,
            omega: params.rotation,
            harmonic: harmonic(grid, params.mass, params.omega_x, params.omega_y),
            rotation: rotation(grid, params.rotation),
            kinetic: kinetic(grid, params.mass),
        })
    }

    /// Overwrite `buf` with the interaction term `g |ψ|²` for the physical
    /// density of `q`.
    pub fn fill_nonlinear<S, T>(&self, q: &Arr2<S>, buf: &mut Arr2<T>)
    where
        S: nd::Data<Elem = C64>,
        T: nd::DataMut<Elem = f64>,
    {
        let scale
            = self.g
            * self.quadrature.density_scale(self.grid.x.dx, self.grid.y.dx);
        nd::Zip::from(buf).and(q)
            .for_each(|vk, qk| { *vk = scale * qk.norm_sqr(); });
    }

    /// Like [`Self::fill_nonlinear`], but allocate a new array.
    pub fn nonlinear<S>(&self, q: &Arr2<S>) -> nd::Array2<f64>
    where S: nd::Data<Elem = C64>
    {
        let mut buf = nd::Array2::zeros(q.raw_dim());
        self.fill_nonlinear(q, &mut buf);
        buf
    }

    /// Terms that do not depend on the state, in splitting order:
    /// trap, rotation (if `Ω ≠ 0`), kinetic.
    pub fn static_terms(&self) -> Vec<Operator<'_>> {
        let mut terms = vec![Operator::Diagonal(self.harmonic.view())];
        terms.extend(self.rotation_terms());
        terms.push(
            Operator::Composite {
                transform: Transform::XY,
                core: self.kinetic.view(),
            }
        );
        terms
    }

    /// The rotation terms alone; empty when `Ω = 0`.
    pub fn rotation_terms(&self) -> Vec<Operator<'_>> {
        if self.omega == 0.0 { return Vec::new(); }
        vec![
            Operator::Composite {
                transform: Transform::Y,
                core: self.rotation[0].view(),
            },
            Operator::Composite {
                transform: Transform::X,
                core: self.rotation[1].view(),
            },
        ]
    }

    /// Assemble the full Hamiltonian around a given interaction term.
    ///
    /// Terms are ordered trap, interaction, rotation, kinetic, so that Strang
    /// splitting of the sum takes position-space half steps outermost and a
    /// single full kinetic step in the middle.
    pub fn operator<'a>(&'a self, nonlinear: nd::ArrayView2<'a, f64>)
        -> Operator<'a>
    {
        let mut terms = self.static_terms();
        terms.insert(1, Operator::Diagonal(nonlinear));
        Operator::Sum(terms)
    }
}

/// Time-stepping generator returned by the [`Evaluator`].
///
/// The state is advanced as `q ← exp(-i · factor · H · dt) q`, so
/// `factor = -i` gives the imaginary-time step `exp(-H dt)` and `factor = 1`
/// gives the ordinary real-time step.
#[derive(Clone, Debug)]
pub struct Generator<'a> {
    pub factor: C64,
    pub op: Operator<'a>,
}

impl<'a> Generator<'a> {
    /// Advance `q` in place by `dt` with one symmetric split step.
    pub fn step<S>(&self, q: &mut Arr2<S>, dt: f64, fft: &mut Fft2)
    where S: nd::DataMut<Elem = C64>
    {
        let z = -C64::i() * self.factor * dt;
        self.op.exp_apply(q, z, fft);
    }
}

/// Direction of time in which the evaluator's generator propagates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// `t → -iτ`; damps excited components toward the ground state.
    ImaginaryTime,
    /// Ordinary unitary evolution.
    RealTime,
}

impl Mode {
    pub fn factor(self) -> C64 {
        match self {
            Self::ImaginaryTime => -C64::i(),
            Self::RealTime => C64::new(1.0, 0.0),
        }
    }
}

/// Per-step dynamic Hamiltonian.
///
/// Owns the only mutable copy of the interaction term; nothing else writes to
/// it.
#[derive(Clone, Debug)]
pub struct Evaluator {
    hamiltonian: Hamiltonian,
    nonlinear: nd::Array2<f64>,
    mode: Mode,
}

impl Evaluator {
    pub fn new(hamiltonian: Hamiltonian, mode: Mode) -> Self {
        let nonlinear = nd::Array2::zeros(hamiltonian.grid.dim());
        Self { hamiltonian, nonlinear, mode }
    }

    /// Evaluator for imaginary-time propagation.
    pub fn imaginary_time(hamiltonian: Hamiltonian) -> Self {
        Self::new(hamiltonian, Mode::ImaginaryTime)
    }

    /// Evaluator for real-time propagation.
    pub fn real_time(hamiltonian: Hamiltonian) -> Self {
        Self::new(hamiltonian, Mode::RealTime)
    }

    pub fn hamiltonian(&self) -> &Hamiltonian { &self.hamiltonian }

    pub fn mode(&self) -> Mode { self.mode }

    /// Interaction term computed by the most recent call to
    /// [`Self::evaluate`].
    pub fn nonlinear(&self) -> nd::ArrayView2<'_, f64> { self.nonlinear.view() }

    /// Renormalize `q` in place, refresh the interaction term from it, and
    /// return the generator for the next sub-step.
    ///
    /// The two mutations always happen in this order since the interaction
    /// term depends on the renormalized state.
    pub fn evaluate<S>(&mut self, q: &mut Arr2<S>)
        -> Result<Generator<'_>, NormError>
    where S: nd::DataMut<Elem = C64>
    {
        let h = &self.hamiltonian;
        wf_renormalize(q, &h.grid, h.quadrature)?;
        h.fill_nonlinear(q, &mut self.nonlinear);
        Ok(Generator {
            factor: self.mode.factor(),
            op: self.hamiltonian.operator(self.nonlinear.view()),
        })
    }
}
