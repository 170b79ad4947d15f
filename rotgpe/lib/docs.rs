//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Split-step propagation](#split-step-propagation)
//! - [Rotation](#rotation)
//! - [Normalization](#normalization)
//! - [Vortices](#vortices)
//!
//! # Background
//! A dilute Bose-Einstein condensate in a frame rotating about the *z* axis at
//! angular frequency Ω is described, in the mean-field limit and with tight
//! confinement along *z*, by the two-dimensional Gross-Pitaevskii equation
//! ```text
//!   ∂ψ
//! i -- = [ K + V(x, y) + Ω L_z + g |ψ|² ] ψ
//!   ∂t
//! ```
//! with *ħ* = 1 throughout, so that momenta are wavenumbers. The terms are
//! ```text
//!     p_x² + p_y²
//! K = -----------
//!         2 m
//!
//!     m
//! V = - (ω_x² x² + ω_y² y²)
//!     2
//!
//! L_z = x p_y - y p_x
//! ```
//! and *g* is the effective two-dimensional contact coupling. Stationary
//! states minimize the energy functional
//! ```text
//!        ⌠               g
//! E[ψ] = ⎮ ψ* [ K + V + Ω L_z + - |ψ|² ] ψ dx dy
//!        ⌡               2
//! ```
//! subject to unit norm, with the chemical potential *μ* as the associated
//! Lagrange multiplier; note the factor 1/2 on the interaction energy, which is
//! absent from *μ*.
//!
//! Replacing *t* → -*i τ* turns the Schrödinger-like equation into a diffusion
//! equation whose solution
//! ```text
//! ψ(τ) = Σ c_n exp(-E_n τ) φ_n
//! ```
//! decays toward the lowest state reachable from the initial condition. With
//! the state renormalized after every step (the evolution is no longer
//! unitary), the relative weight of every excited component decays as
//! exp(-(*E_n* - *E*₀) *τ*). Symmetry matters here: imaginary time conserves
//! every symmetry shared by *H* and the initial state, which is why an
//! imprinted phase winding selects a vortex state rather than the vortex-free
//! ground state.
//!
//! # Split-step propagation
//! All wavefunctions live on a periodic lattice
//! ```text
//! x[i] = -r + i δx, δx = 2 r / N_x, i ∊ {0, ..., N_x - 1}
//! ```
//! (likewise for *y*), and the reciprocal lattice is given by the discrete
//! Fourier transform in the usual FFT ordering,
//! ```text
//! k[i] = 2π i / (N δx)        for i < N/2
//! k[i] = 2π (i - N) / (N δx)  otherwise
//! ```
//! Every term of *H* is diagonal in some representation reachable by FFTs, so
//! for a small step *δt* each factor exp(*z* *H_j*) is applied exactly by
//! transforming, multiplying pointwise, and transforming back. The factors are
//! combined by symmetric (Strang) splitting,
//! ```text
//! exp(z (A + B + C)) = exp(z A/2) exp(z B/2) exp(z C) exp(z B/2) exp(z A/2)
//!                      + O(z³)
//! ```
//! with the trap and interaction (position space) outermost and a single full
//! kinetic step (momentum space) in the middle[^1]. The interaction term is
//! re-evaluated from the current density before every sub-step.
//!
//! Between checkpoints, intervals are subdivided into equal sub-steps no longer
//! than a configured maximum, so the propagator never oversteps a requested
//! sampling time.
//!
//! # Rotation
//! The angular momentum operator couples position and momentum along different
//! axes and so is diagonal in neither position nor momentum space. It is,
//! however, a sum of two terms that are each diagonal in a *mixed*
//! representation[^2]:
//! ```text
//! Ω x p_y   is diagonal in (x, k_y), reached by an FFT along y only
//! -Ω y p_x  is diagonal in (k_x, y), reached by an FFT along x only
//! ```
//! Each is therefore applied exactly as one pair of one-dimensional FFTs, and
//! enters the Strang splitting as two additional terms. For Ω = 0 the two terms
//! are omitted entirely.
//!
//! # Normalization
//! Two conventions for the discrete norm are supported, selected by
//! [`Quadrature`][crate::Quadrature]:
//! - `Integral` (default): the lattice amplitudes sample the continuum
//!   wavefunction, Σ |ψ\[i, j\]|² *δx* *δy* = 1, and the interaction term is
//!   *g* |ψ|².
//! - `Sum`: the amplitudes are normalized as a plain vector, Σ |ψ\[i, j\]|² = 1,
//!   and the interaction term is *g* |ψ|² / (*δx* *δy*).
//!
//! The two describe the same physical density |ψ|²/(*δx* *δy*) resp. |ψ|², so
//! they produce identical physics for identical *g*; only the scale of the
//! stored amplitudes differs.
//!
//! # Vortices
//! A quantized vortex is a zero of ψ around which the phase winds by 2π *j* for
//! integer charge *j*. The initial state of a run is a Gaussian multiplied by
//! the phase mask
//! ```text
//! exp(i j atan2(x - x_c, y - y_c))
//! ```
//! whose angle is measured from the +*y* axis toward +*x*, i.e. clockwise in
//! the usual orientation. All charges and winding numbers reported by
//! [`observables`][crate::observables] use this same orientation, so a mask of
//! winding *j* is detected with charge +*j*. In this orientation the mask is an
//! eigenfunction of *L_z* with eigenvalue -*j*, and a rotation term +Ω *L_z*
//! lowers its energy by Ω *j* per particle.
//!
//! A multiply charged vortex (|*j*| > 1) is energetically unstable: under
//! imaginary-time evolution in a slightly anisotropic trap it separates into
//! |*j*| singly charged vortices of the same sign, which then settle at a
//! finite distance from the trap centre set by the balance between rotation
//! and the trap.
//!
//! Vortices are located numerically as lattice plaquettes around which the
//! wrapped phase differences sum to a non-zero multiple of 2π; plaquettes in
//! the essentially empty region outside the condensate are skipped, since the
//! phase there is dominated by noise.
//!
//! [^1]: W. Bao, D. Jaksch, P. A. Markowich, "Numerical solution of the
//! Gross-Pitaevskii equation for Bose-Einstein condensation." J. Comput. Phys.
//! **187** 318 (2003).
//!
//! [^2]: W. Bao, Q. Du, Y. Zhang, "Dynamics of rotating Bose-Einstein
//! condensates and its efficient and accurate numerical computation." SIAM J.
//! Appl. Math. **66** 758 (2006).
