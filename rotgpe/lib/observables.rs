//! Quantities derived from a wavefunction: densities and phases for plotting,
//! energies, and vortex diagnostics.
//!
//! Winding numbers and vortex charges are reported in the orientation of
//! [`vortex_mask`][crate::state::vortex_mask], i.e. the phase accumulated
//! along a loop traversed with increasing mask angle (clockwise in the usual
//! `(x, y)` orientation). A mask of winding `j` therefore yields charge `+j`.

use std::f64::consts::TAU;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr2,
    config::Quadrature,
    grid::Grid,
    hamiltonian::Hamiltonian,
    operator::Operator,
    utils::{ Fft2, wf_norm },
};

// wrap a phase difference into (-π, π]
fn wrap(d: f64) -> f64 { d - TAU * (d / TAU).round() }

/// Physical density on the lattice.
pub fn density<S>(q: &Arr2<S>, grid: &Grid, quad: Quadrature) -> nd::Array2<f64>
where S: nd::Data<Elem = C64>
{
    let scale = quad.density_scale(grid.x.dx, grid.y.dx);
    q.mapv(|qk| scale * qk.norm_sqr())
}

/// Pointwise phase `arg ψ` in `(-π, π]`.
pub fn phase<S>(q: &Arr2<S>) -> nd::Array2<f64>
where S: nd::Data<Elem = C64>
{
    q.mapv(|qk| qk.arg())
}

// ⟨ψ|H_static|ψ⟩ and ⟨ψ|g|ψ|²|ψ⟩, both divided by ⟨ψ|ψ⟩
fn energy_parts<S>(h: &Hamiltonian, q: &Arr2<S>, fft: &mut Fft2) -> (f64, f64)
where S: nd::Data<Elem = C64>
{
    let grid = &h.grid;
    let weight = h.quadrature.weight(grid.x.dx, grid.y.dx);
    let norm = wf_norm(q, grid, h.quadrature);
    let e_static
        = Operator::Sum(h.static_terms())
        .expectation(q, weight, fft)
        .re;
    let nonlinear = h.nonlinear(q);
    let e_int
        = Operator::Diagonal(nonlinear.view())
        .expectation(q, weight, fft)
        .re;
    (e_static / norm, e_int / norm)
}

/// Energy per particle of the GPE functional,
/// ```text
/// E[ψ] = ⟨ψ| K + V + Ω L_z + (g/2) |ψ|² |ψ⟩
/// ```
/// for a state of any norm.
pub fn energy<S>(h: &Hamiltonian, q: &Arr2<S>, fft: &mut Fft2) -> f64
where S: nd::Data<Elem = C64>
{
    let (e_static, e_int) = energy_parts(h, q, fft);
    e_static + 0.5 * e_int
}

/// Chemical potential `μ = ⟨ψ| K + V + Ω L_z + g |ψ|² |ψ⟩`.
pub fn chemical_potential<S>(h: &Hamiltonian, q: &Arr2<S>, fft: &mut Fft2)
    -> f64
where S: nd::Data<Elem = C64>
{
    let (e_static, e_int) = energy_parts(h, q, fft);
    e_static + e_int
}

/// Winding number of the phase of `q` along a circle of `radius` about
/// `centre`, sampled at `samples` points (nearest lattice site per point).
///
/// Meaningful only if the density does not vanish on the circle and the
/// sampling resolves the phase (increments well below π).
pub fn loop_winding<S>(
    q: &Arr2<S>,
    grid: &Grid,
    centre: [f64; 2],
    radius: f64,
    samples: usize,
) -> i32
where S: nd::Data<Elem = C64>
{
    let samples = samples.max(3);
    let phases: Vec<f64>
        = (0..samples)
        .map(|k| {
            let a = TAU * k as f64 / samples as f64;
            // mask angle is measured from +y toward +x
            let x = centre[0] + radius * a.sin();
            let y = centre[1] + radius * a.cos();
            q[[grid.x.nearest(x), grid.y.nearest(y)]].arg()
        })
        .collect();
    let total: f64
        = phases.iter().zip(phases.iter().cycle().skip(1))
        .map(|(a, b)| wrap(b - a))
        .sum();
    (total / TAU).round() as i32
}

/// A phase singularity located on the lattice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vortex {
    /// Centre of the plaquette enclosing the singularity.
    pub position: [f64; 2],
    /// Winding of the phase around the plaquette.
    pub charge: i32,
}

impl Vortex {
    /// Distance from `point`.
    pub fn distance(&self, point: [f64; 2]) -> f64 {
        (self.position[0] - point[0]).hypot(self.position[1] - point[1])
    }
}

/// Locate vortices as lattice plaquettes with non-zero phase circulation.
///
/// Plaquettes whose 4×4 neighbourhood never reaches `min_density` (physical
/// density) are skipped, which rejects the phase noise of the essentially
/// empty region outside the condensate.
pub fn find_vortices<S>(
    q: &Arr2<S>,
    grid: &Grid,
    quad: Quadrature,
    min_density: f64,
) -> Vec<Vortex>
where S: nd::Data<Elem = C64>
{
    let (nx, ny) = q.dim();
    let rho = density(q, grid, quad);
    let ph = phase(q);
    let mut vortices: Vec<Vortex> = Vec::new();
    for i in 0..nx.saturating_sub(1) {
        for j in 0..ny.saturating_sub(1) {
            let local_max
                = rho.slice(nd::s![
                    i.saturating_sub(1)..(i + 3).min(nx),
                    j.saturating_sub(1)..(j + 3).min(ny),
                ])
                .fold(0.0_f64, |acc, r| acc.max(*r));
            if local_max < min_density { continue; }
            // counterclockwise in (x, y)
            let corners = [
                ph[[i, j]],
                ph[[i + 1, j]],
                ph[[i + 1, j + 1]],
                ph[[i, j + 1]],
            ];
            let circ: f64
                = corners.iter().zip(corners.iter().cycle().skip(1))
                .map(|(a, b)| wrap(b - a))
                .sum();
            let charge_ccw = (circ / TAU).round() as i32;
            if charge_ccw != 0 {
                vortices.push(Vortex {
                    position: [
                        grid.x.coords[i] + 0.5 * grid.x.dx,
                        grid.y.coords[j] + 0.5 * grid.y.dx,
                    ],
                    charge: -charge_ccw,
                });
            }
        }
    }
    vortices
}
