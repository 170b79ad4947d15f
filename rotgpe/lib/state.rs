//! Initial states: Gaussian wavepackets with an imprinted phase vortex.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr2,
    config::{ Params, Quadrature },
    error::{ ConfigError, StateError },
    grid::Grid,
    utils::wf_renormalize,
};

/// Azimuth of `(x, y)` about `centre`, measured from the +y axis toward +x.
///
/// This is the angle used by [`vortex_mask`]; it increases clockwise in the
/// usual `(x, y)` orientation.
pub fn mask_angle(x: f64, y: f64, centre: [f64; 2]) -> f64 {
    (x - centre[0]).atan2(y - centre[1])
}

/// Separable Gaussian wavepacket
/// ```text
/// exp(-(x - x0)² / 4σx² + i p1 x) exp(-(y - y0)² / 4σy² + i p2 y)
/// ```
/// whose density has standard deviations `(σx, σy)`, normalized under `quad`.
pub fn gaussian(
    grid: &Grid,
    momentum: [f64; 2],
    sigma: [f64; 2],
    centre: [f64; 2],
    quad: Quadrature,
) -> Result<nd::Array2<C64>, StateError>
{
    ConfigError::check_width(sigma[0])?;
    ConfigError::check_width(sigma[1])?;
    let [p1, p2] = momentum;
    let [sx, sy] = sigma;
    let [x0, y0] = centre;
    let mut q = grid.map(|x, y| {
        let env
            = -(x - x0).powi(2) / (4.0 * sx * sx)
            - (y - y0).powi(2) / (4.0 * sy * sy);
        C64::new(env, p1 * x + p2 * y).exp()
    });
    wf_renormalize(&mut q, grid, quad)?;
    Ok(q)
}

/// Unit-modulus phase mask `exp(i j atan2(x - cx, y - cy))`.
pub fn vortex_mask(grid: &Grid, winding: i32, centre: [f64; 2])
    -> nd::Array2<C64>
{
    let j = f64::from(winding);
    grid.map(|x, y| C64::cis(j * mask_angle(x, y, centre)))
}

/// Multiply `q` pointwise by [`vortex_mask`] in place.
///
/// The density is unchanged; `winding = 0` is a no-op.
pub fn imprint_vortex<S>(q: &mut Arr2<S>, grid: &Grid, winding: i32, centre: [f64; 2])
where S: nd::DataMut<Elem = C64>
{
    if winding == 0 { return; }
    let j = f64::from(winding);
    let x = &grid.x.coords;
    let y = &grid.y.coords;
    q.indexed_iter_mut()
        .for_each(|((i, k), qik)| {
            *qik *= C64::cis(j * mask_angle(x[i], y[k], centre));
        });
}

/// Build the initial state described by `params`: a normalized Gaussian with a
/// vortex of the configured winding imprinted at the grid centre.
pub fn prepare(grid: &Grid, params: &Params)
    -> Result<nd::Array2<C64>, StateError>
{
    let packet = &params.packet;
    let mut q = gaussian(
        grid,
        packet.momentum,
        packet.sigma,
        packet.centre,
        params.quadrature,
    )?;
    imprint_vortex(&mut q, grid, params.winding, grid.centre());
    log::debug!(
        "prepared gaussian (sigma = {:?}, p = {:?}) with winding {}",
        packet.sigma, packet.momentum, params.winding,
    );
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ observables::loop_winding, utils::wf_norm };

    fn grid() -> Grid { Grid::new(5.0, 64, 64).unwrap() }

    #[test]
    fn gaussian_is_normalized() {
        let grid = grid();
        for quad in [Quadrature::Integral, Quadrature::Sum] {
            let q = gaussian(&grid, [0.5, -1.0], [1.0, 0.7], [0.3, 0.0], quad)
                .unwrap();
            assert!((wf_norm(&q, &grid, quad) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn gaussian_width_is_density_sigma() {
        let grid = Grid::new(10.0, 128, 128).unwrap();
        let q = gaussian(&grid, [0.0, 0.0], [1.0, 1.5], [0.0, 0.0], Quadrature::Integral)
            .unwrap();
        let da = grid.cell_area();
        let (mut vx, mut vy) = (0.0, 0.0);
        for ((i, j), qij) in q.indexed_iter() {
            let [x, y] = grid.point([i, j]);
            vx += x * x * qij.norm_sqr() * da;
            vy += y * y * qij.norm_sqr() * da;
        }
        assert!((vx.sqrt() - 1.0).abs() < 1e-6);
        assert!((vy.sqrt() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn bad_width_rejected() {
        let grid = grid();
        assert!(matches!(
            gaussian(&grid, [0.0; 2], [0.0, 1.0], [0.0; 2], Quadrature::Integral),
            Err(StateError::Config(ConfigError::BadWidth(_))),
        ));
    }

    #[test]
    fn mask_winding() {
        let grid = grid();
        let q0 = gaussian(&grid, [0.0; 2], [1.5, 1.5], [0.0; 2], Quadrature::Integral)
            .unwrap();
        assert_eq!(loop_winding(&q0, &grid, grid.centre(), 2.0, crate::DEF_SAMPLES), 0);
        for j in [-3, -1, 1, 2, 4] {
            let mut q = q0.clone();
            imprint_vortex(&mut q, &grid, j, grid.centre());
            assert_eq!(loop_winding(&q, &grid, grid.centre(), 2.0, crate::DEF_SAMPLES), j);
            assert_eq!(loop_winding(&q, &grid, grid.centre(), 3.3, crate::DEF_SAMPLES), j);
            q.iter().zip(&q0)
                .for_each(|(a, b)| assert!((a.norm() - b.norm()).abs() < 1e-12));
            assert!((wf_norm(&q, &grid, Quadrature::Integral) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_winding_leaves_state() {
        let params = Params { winding: 0, ..Params::default() };
        let grid = grid();
        let q = prepare(&grid, &params).unwrap();
        let q0 = gaussian(
            &grid,
            params.packet.momentum,
            params.packet.sigma,
            params.packet.centre,
            params.quadrature,
        ).unwrap();
        assert_eq!(q, q0);
        assert!(q.iter().all(|qk| qk.im == 0.0 && qk.re > 0.0));
        let m = vortex_mask(&grid, 0, grid.centre());
        assert!(m.iter().all(|mk| *mk == C64::new(1.0, 0.0)));
    }
}
