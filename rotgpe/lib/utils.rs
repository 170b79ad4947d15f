//! Miscellaneous tools: lattice quadrature for wavefunctions and planned
//! two-dimensional FFTs.

use std::sync::Arc;
use ndarray::{ self as nd, Ix1, concatenate };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use rustfft::{ Fft, FftPlanner };
use crate::{
    Arr2,
    config::Quadrature,
    error::NormError,
    grid::Grid,
};

/// Calculate the squared norm of a wavefunction under a quadrature
/// convention.
pub fn wf_norm<S>(q: &Arr2<S>, grid: &Grid, quad: Quadrature) -> f64
where S: nd::Data<Elem = C64>
{
    quad.weight(grid.x.dx, grid.y.dx)
        * q.iter().map(|qk| qk.norm_sqr()).sum::<f64>()
}

/// Calculate the inner product `⟨q|p⟩` of two wavefunctions.
pub fn wf_dot<S, T>(q: &Arr2<S>, p: &Arr2<T>, grid: &Grid, quad: Quadrature)
    -> C64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    let acc: C64
        = nd::Zip::from(q).and(p)
        .fold(C64::zero(), |acc, qk, pk| acc + qk.conj() * *pk);
    acc * quad.weight(grid.x.dx, grid.y.dx)
}

/// Renormalize a wavefunction in place, returning its norm before
/// renormalization.
pub fn wf_renormalize<S>(q: &mut Arr2<S>, grid: &Grid, quad: Quadrature)
    -> Result<f64, NormError>
where S: nd::DataMut<Elem = C64>
{
    let norm = wf_norm(q, grid, quad).sqrt();
    NormError::check(norm)?;
    q.map_inplace(|qk| { *qk /= norm; });
    Ok(norm)
}

/// Return a normalized copy of a wavefunction.
pub fn wf_normalized<S>(q: &Arr2<S>, grid: &Grid, quad: Quadrature)
    -> Result<nd::Array2<C64>, NormError>
where S: nd::Data<Elem = C64>
{
    let norm = wf_norm(q, grid, quad).sqrt();
    NormError::check(norm)?;
    Ok(q.mapv(|qk| qk / norm))
}

/// L2 distance `‖q - p‖` between two wavefunctions.
pub fn wf_distance<S, T>(q: &Arr2<S>, p: &Arr2<T>, grid: &Grid, quad: Quadrature)
    -> f64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    let acc: f64
        = nd::Zip::from(q).and(p)
        .fold(0.0, |acc, qk, pk| acc + (qk - pk).norm_sqr());
    (acc * quad.weight(grid.x.dx, grid.y.dx)).sqrt()
}

/// Return `true` if every element of `q` is finite.
pub fn all_finite<S>(q: &Arr2<S>) -> bool
where S: nd::Data<Elem = C64>
{
    q.iter().all(|qk| qk.re.is_finite() && qk.im.is_finite())
}

/// Flatten a wavefunction into the row-major sequence `k = i * ny + j`.
pub fn flatten<S>(q: &Arr2<S>) -> Vec<C64>
where S: nd::Data<Elem = C64>
{
    q.iter().copied().collect()
}

/// Inverse of [`flatten`]; fails if `flat.len() != nx * ny`.
pub fn unflatten(flat: Vec<C64>, grid: &Grid)
    -> Result<nd::Array2<C64>, nd::ShapeError>
{
    nd::Array2::from_shape_vec(grid.dim(), flat)
}

/// Generate an array of frequency-space coordinates to accompany a FFT of `n`
/// points for sampling interval `dt`.
pub fn fft_freq(n: usize, dt: f64) -> nd::Array1<f64> {
    if n % 2 == 0 {
        let fp: nd::Array1<f64>
            = (0..n / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..n / 2 + 1).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    } else {
        let fp: nd::Array1<f64>
            = (0..(n + 1) / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..(n + 1) / 2).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    }
}

/// Return a copy of `x` with indices shifted to map super-Nyquist frequency
/// components to negative frequencies.
pub fn fft_shift<S, A>(x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Clone,
{
    let n = x.len();
    let (p, m)
        = if n % 2 == 0 {
            x.view().split_at(nd::Axis(0), n / 2)
        } else {
            x.view().split_at(nd::Axis(0), n / 2 + 1)
        };
    concatenate!(nd::Axis(0), m.into_owned(), p.into_owned())
}

/// Like [`fft_shift`], but applied along both axes of a 2D array.
pub fn fft_shift2<S, A>(x: &Arr2<S>) -> nd::Array2<A>
where
    S: nd::Data<Elem = A>,
    A: Clone,
{
    let (nx, ny) = x.dim();
    let (sx, sy) = (nx - nx / 2, ny - ny / 2);
    nd::Array2::from_shape_fn((nx, ny), |(i, j)| {
        x[[(i + sx) % nx, (j + sy) % ny]].clone()
    })
}

/// Axes over which a transform acts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// 1D transform along the x axis (axis 0) only.
    X,
    /// 1D transform along the y axis (axis 1) only.
    Y,
    /// Full 2D transform.
    XY,
}

/// Planned forward and inverse FFTs for a fixed `(nx, ny)` shape.
///
/// The forward transform is unnormalized and the inverse carries the `1/n`
/// factor, so that `ifft(fft(q)) == q`.
pub struct Fft2 {
    fwd: [Arc<dyn Fft<f64>>; 2],
    inv: [Arc<dyn Fft<f64>>; 2],
    lane: Vec<C64>,
    scratch: Vec<C64>,
    dim: (usize, usize),
}

impl std::fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft2").field("dim", &self.dim).finish()
    }
}

impl Fft2 {
    /// Plan transforms for wavefunctions on `grid`.
    pub fn new(grid: &Grid) -> Self {
        let (nx, ny) = grid.dim();
        let mut planner = FftPlanner::new();
        let fwd = [planner.plan_fft_forward(nx), planner.plan_fft_forward(ny)];
        let inv = [planner.plan_fft_inverse(nx), planner.plan_fft_inverse(ny)];
        let scratch_len
            = fwd.iter().chain(inv.iter())
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        Self {
            fwd,
            inv,
            lane: vec![C64::zero(); nx.max(ny)],
            scratch: vec![C64::zero(); scratch_len],
            dim: (nx, ny),
        }
    }

    /// Shape the transforms were planned for.
    pub fn dim(&self) -> (usize, usize) { self.dim }

    // run a planned 1D transform over every lane along `axis`, copying each
    // lane through a contiguous buffer
    fn process_axis<S>(&mut self, q: &mut Arr2<S>, axis: usize, inverse: bool)
    where S: nd::DataMut<Elem = C64>
    {
        let plan = if inverse { &self.inv[axis] } else { &self.fwd[axis] };
        let n = q.len_of(nd::Axis(axis));
        let lane = &mut self.lane[..n];
        let scale = (n as f64).recip();
        for mut qlane in q.lanes_mut(nd::Axis(axis)) {
            lane.iter_mut().zip(qlane.iter())
                .for_each(|(lk, qk)| { *lk = *qk; });
            plan.process_with_scratch(lane, &mut self.scratch);
            if inverse {
                qlane.iter_mut().zip(lane.iter())
                    .for_each(|(qk, lk)| { *qk = *lk * scale; });
            } else {
                qlane.iter_mut().zip(lane.iter())
                    .for_each(|(qk, lk)| { *qk = *lk; });
            }
        }
    }

    /// Forward transform in place over the axes named by `t`.
    pub fn forward<S>(&mut self, q: &mut Arr2<S>, t: Transform)
    where S: nd::DataMut<Elem = C64>
    {
        match t {
            Transform::X => self.process_axis(q, 0, false),
            Transform::Y => self.process_axis(q, 1, false),
            Transform::XY => {
                self.process_axis(q, 0, false);
                self.process_axis(q, 1, false);
            },
        }
    }

    /// Inverse transform in place over the axes named by `t`.
    pub fn inverse<S>(&mut self, q: &mut Arr2<S>, t: Transform)
    where S: nd::DataMut<Elem = C64>
    {
        match t {
            Transform::X => self.process_axis(q, 0, true),
            Transform::Y => self.process_axis(q, 1, true),
            Transform::XY => {
                self.process_axis(q, 1, true);
                self.process_axis(q, 0, true);
            },
        }
    }
}
