//! Periodic real-space lattices and their discrete Fourier duals.
//!
//! An [`Axis`] samples `[-r, r)` at `n` points with spacing `dx = 2r / n`; the
//! point at `+r` is the periodic image of the point at `-r` and is therefore
//! omitted. The reciprocal axis holds the angular wavenumbers of the DFT in FFT
//! order, `0, dk, ..., (n/2 - 1) dk, -(n/2) dk, ..., -dk`, with
//! `dk = 2π / (n dx)`, so that `n * dx * dk = 2π` exactly.

use std::f64::consts::TAU;
use ndarray as nd;
use crate::{ error::ConfigError, utils::fft_freq };

/// A single uniformly sampled, periodic spatial axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    /// Half-width of the sampled interval.
    pub extent: f64,
    /// Number of points.
    pub n: usize,
    /// Real-space spacing.
    pub dx: f64,
    /// Reciprocal-space spacing.
    pub dk: f64,
    /// Real-space coordinates.
    pub coords: nd::Array1<f64>,
    /// Angular wavenumbers in FFT order.
    pub wavenumbers: nd::Array1<f64>,
}

impl Axis {
    /// Construct an axis covering `[-extent, extent)` with `n` points.
    pub fn new(extent: f64, n: usize) -> Result<Self, ConfigError> {
        ConfigError::check_extent(extent)?;
        ConfigError::check_points(n)?;
        let dx = 2.0 * extent / n as f64;
        let dk = TAU / (n as f64 * dx);
        let coords: nd::Array1<f64>
            = (0..n).map(|k| -extent + k as f64 * dx).collect();
        let wavenumbers = fft_freq(n, dx).mapv(|f| TAU * f);
        Ok(Self { extent, n, dx, dk, coords, wavenumbers })
    }

    /// Midpoint of the sampled interval.
    pub fn centre(&self) -> f64 { 0.0 }

    /// Index of the sample nearest to `x`, wrapped periodically.
    pub fn nearest(&self, x: f64) -> usize {
        let k = ((x + self.extent) / self.dx).round() as isize;
        k.rem_euclid(self.n as isize) as usize
    }
}

/// A two-dimensional rectangular lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub x: Axis,
    pub y: Axis,
}

impl Grid {
    /// Construct a square-extent grid `[-r, r) × [-r, r)`.
    pub fn new(extent: f64, nx: usize, ny: usize) -> Result<Self, ConfigError> {
        Self::new2([extent, extent], [nx, ny])
    }

    /// Construct a grid with independent extents per axis.
    pub fn new2(extent: [f64; 2], n: [usize; 2]) -> Result<Self, ConfigError> {
        let x = Axis::new(extent[0], n[0])?;
        let y = Axis::new(extent[1], n[1])?;
        Ok(Self { x, y })
    }

    /// Array shape `(nx, ny)` of wavefunctions on this grid.
    pub fn dim(&self) -> (usize, usize) { (self.x.n, self.y.n) }

    /// Area of one lattice cell.
    pub fn cell_area(&self) -> f64 { self.x.dx * self.y.dx }

    /// Coordinates of the grid centre.
    pub fn centre(&self) -> [f64; 2] { [self.x.centre(), self.y.centre()] }

    /// Coordinates of lattice site `[i, j]`.
    pub fn point(&self, index: [usize; 2]) -> [f64; 2] {
        [self.x.coords[index[0]], self.y.coords[index[1]]]
    }

    /// Lattice site of flat index `k` under the row-major mapping
    /// `k = i * ny + j`.
    pub fn unravel(&self, k: usize) -> [usize; 2] {
        [k / self.y.n, k % self.y.n]
    }

    /// Flat index of lattice site `[i, j]`.
    pub fn ravel(&self, index: [usize; 2]) -> usize {
        index[0] * self.y.n + index[1]
    }

    /// Evaluate `f(x, y)` at every lattice site.
    pub fn map<F, A>(&self, mut f: F) -> nd::Array2<A>
    where F: FnMut(f64, f64) -> A
    {
        nd::Array2::from_shape_fn(self.dim(), |(i, j)| {
            f(self.x.coords[i], self.y.coords[j])
        })
    }

    /// Evaluate `f(kx, ky)` at every reciprocal lattice site, in FFT order.
    pub fn map_k<F, A>(&self, mut f: F) -> nd::Array2<A>
    where F: FnMut(f64, f64) -> A
    {
        nd::Array2::from_shape_fn(self.dim(), |(i, j)| {
            f(self.x.wavenumbers[i], self.y.wavenumbers[j])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nyquist_consistency() {
        for &(r, nx, ny) in &[(5.0, 64, 64), (1.0, 7, 16), (12.5, 128, 33)] {
            let grid = Grid::new(r, nx, ny).unwrap();
            for ax in [&grid.x, &grid.y] {
                assert!((ax.n as f64 * ax.dx * ax.dk - TAU).abs() < 1e-12);
                assert!((ax.dk - TAU / (2.0 * r)).abs() < 1e-12);
                assert_eq!(ax.coords.len(), ax.n);
                assert_eq!(ax.wavenumbers.len(), ax.n);
                assert_eq!(ax.wavenumbers[0], 0.0);
                assert!((ax.wavenumbers[1] - ax.dk).abs() < 1e-12);
                assert!((ax.wavenumbers[ax.n - 1] + ax.dk).abs() < 1e-12);
                assert!((ax.coords[0] + r).abs() < 1e-12);
                assert!((ax.coords[ax.n - 1] + ax.dx - r).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn even_grid_contains_origin() {
        let grid = Grid::new(5.0, 64, 64).unwrap();
        assert!(grid.x.coords[32].abs() < 1e-12);
        assert_eq!(grid.x.nearest(0.0), 32);
        assert_eq!(grid.x.nearest(5.0), 0);
    }

    #[test]
    fn flat_index_mapping() {
        let grid = Grid::new(1.0, 3, 5).unwrap();
        let a = grid.map(|x, y| (x, y));
        let flat: Vec<(f64, f64)> = a.iter().copied().collect();
        for (k, xy) in flat.iter().enumerate() {
            let ij = grid.unravel(k);
            assert_eq!(grid.ravel(ij), k);
            let p = grid.point(ij);
            assert_eq!((p[0], p[1]), *xy);
        }
    }

    #[test]
    fn invalid_grids_rejected() {
        assert!(Grid::new(0.0, 8, 8).is_err());
        assert!(Grid::new(-1.0, 8, 8).is_err());
        assert!(Grid::new(1.0, 0, 8).is_err());
        assert!(Grid::new(1.0, 8, 1).is_err());
        assert!(Grid::new(f64::NAN, 8, 8).is_err());
    }
}
