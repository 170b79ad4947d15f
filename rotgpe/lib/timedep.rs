//! Checkpointed split-step propagation of the GPE.
//!
//! In all 3D arrays, the first (or zero-th) axis indexes checkpoints.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr1,
    Arr2,
    config::Params,
    error::{ ConfigError, PropError, ShapeError },
    grid::Grid,
    hamiltonian::{ Evaluator, Hamiltonian, Mode },
    observables::{ chemical_potential, energy },
    utils::{ Fft2, all_finite, wf_distance, wf_renormalize },
};

pub type PResult<T> = Result<T, PropError>;

/// States sampled at each checkpoint, with per-checkpoint energetics.
#[derive(Clone, Debug)]
pub struct Evolution {
    /// Checkpoint times.
    pub t: nd::Array1<f64>,
    /// Normalized states; `q[k]` is sampled at `t[k]`.
    pub q: Vec<nd::Array2<C64>>,
    /// Energy per particle at each checkpoint.
    pub energy: nd::Array1<f64>,
    /// Chemical potential at each checkpoint.
    pub mu: nd::Array1<f64>,
}

impl Evolution {
    /// Number of checkpoints.
    pub fn len(&self) -> usize { self.q.len() }

    /// Always false for a completed propagation.
    pub fn is_empty(&self) -> bool { self.q.is_empty() }

    /// State at the final checkpoint.
    pub fn last(&self) -> &nd::Array2<C64> {
        // at least one checkpoint is guaranteed by `check_checkpoints`
        &self.q[self.q.len() - 1]
    }

    /// L2 distances between successive checkpoint states.
    pub fn deltas(&self, grid: &Grid, quad: crate::Quadrature) -> nd::Array1<f64> {
        self.q.iter().zip(self.q.iter().skip(1))
            .map(|(a, b)| wf_distance(a, b, grid, quad))
            .collect()
    }

    /// Stack all checkpoint states into a single `(nt, nx, ny)` array.
    pub fn stacked(&self) -> Result<nd::Array3<C64>, nd::ShapeError> {
        let views: Vec<nd::ArrayView2<C64>>
            = self.q.iter().map(|qk| qk.view()).collect();
        nd::stack(nd::Axis(0), &views)
    }
}

fn check_checkpoints<S>(t: &Arr1<S>) -> Result<(), ConfigError>
where S: nd::Data<Elem = f64>
{
    if t.is_empty() {
        return Err(ConfigError::BadCheckpoints("no checkpoints".into()));
    }
    if let Some(bad) = t.iter().find(|tk| !tk.is_finite() || **tk < 0.0) {
        return Err(ConfigError::BadCheckpoints(
            format!("checkpoint times must be finite and non-negative; got {bad}")));
    }
    if t.iter().zip(t.iter().skip(1)).any(|(a, b)| b <= a) {
        return Err(ConfigError::BadCheckpoints(
            "checkpoint times must be strictly increasing".into()));
    }
    Ok(())
}

/// Propagate `q0` through the checkpoint times `t`, subdividing each interval
/// into equal sub-steps no longer than `dt_max`.
///
/// Every sub-step calls [`Evaluator::evaluate`] (renormalize, refresh the
/// interaction term) and then advances by one symmetric split step. The
/// returned states are renormalized at every checkpoint; `q[0]` is the
/// renormalized `q0`, sampled at `t[0]`.
///
/// Fails if a non-finite amplitude appears or if the state cannot be
/// renormalized; the error names the checkpoint being approached.
pub fn propagate<S, T>(
    q0: &Arr2<S>,
    evaluator: &mut Evaluator,
    t: &Arr1<T>,
    dt_max: f64,
) -> PResult<Evolution>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    ConfigError::check_time_step(dt_max)?;
    check_checkpoints(t)?;
    let grid = evaluator.hamiltonian().grid.clone();
    let quad = evaluator.hamiltonian().quadrature;
    if q0.dim() != grid.dim() {
        return Err(ShapeError(q0.dim(), grid.dim()).into());
    }
    let mut fft = Fft2::new(&grid);

    let nt = t.len();
    let mut q: Vec<nd::Array2<C64>> = Vec::with_capacity(nt);
    let mut energies: Vec<f64> = Vec::with_capacity(nt);
    let mut mus: Vec<f64> = Vec::with_capacity(nt);

    let mut q_temp: nd::Array2<C64> = q0.to_owned();
    wf_renormalize(&mut q_temp, &grid, quad).map_err(PropError::norm(0))?;
    if !all_finite(&q_temp) {
        return Err(PropError::Divergence { checkpoint: 0, time: t[0] });
    }

    energies.push(energy(evaluator.hamiltonian(), &q_temp, &mut fft));
    mus.push(chemical_potential(evaluator.hamiltonian(), &q_temp, &mut fft));
    q.push(q_temp.clone());

    log::info!(
        "{:>8} {:>10} {:>18} {:>18} {:>14} {:>10}",
        "step", "t", "energy", "mu", "delta", "time_sec",
    );
    log::info!(
        "{:>8} {:>10.4} {:>18.10} {:>18.10} {:>14} {:>10}",
        format!("0/{}", nt - 1), t[0], energies[0], mus[0], "-", "-",
    );

    let total_time = std::time::Instant::now();
    for k in 1..nt {
        let step_time = std::time::Instant::now();
        let interval = t[k] - t[k - 1];
        let substeps = (interval / dt_max).ceil().max(1.0) as usize;
        let dt = interval / substeps as f64;
        for s in 0..substeps {
            let generator
                = evaluator.evaluate(&mut q_temp)
                .map_err(PropError::norm(k))?;
            generator.step(&mut q_temp, dt, &mut fft);
            if !all_finite(&q_temp) {
                let time = t[k - 1] + (s + 1) as f64 * dt;
                return Err(PropError::Divergence { checkpoint: k, time });
            }
            log::trace!("checkpoint {k}: sub-step {}/{substeps}", s + 1);
        }
        wf_renormalize(&mut q_temp, &grid, quad).map_err(PropError::norm(k))?;
        energies.push(energy(evaluator.hamiltonian(), &q_temp, &mut fft));
        mus.push(chemical_potential(evaluator.hamiltonian(), &q_temp, &mut fft));
        let delta = wf_distance(&q_temp, &q[k - 1], &grid, quad);
        q.push(q_temp.clone());
        log::info!(
            "{:>8} {:>10.4} {:>18.10} {:>18.10} {:>14.6e} {:>10.4}",
            format!("{}/{}", k, nt - 1),
            t[k],
            energies[k],
            mus[k],
            delta,
            step_time.elapsed().as_secs_f32(),
        );
    }
    log::info!("total propagation time: {:?}", total_time.elapsed());

    Ok(Evolution {
        t: t.to_owned(),
        q,
        energy: nd::Array1::from_vec(energies),
        mu: nd::Array1::from_vec(mus),
    })
}

/// Propagate a state in imaginary time toward the ground state of the static
/// Hamiltonian plus interaction.
///
/// See also [`propagate`].
pub fn imaginary_time<S, T>(
    q0: &Arr2<S>,
    hamiltonian: Hamiltonian,
    t: &Arr1<T>,
    dt_max: f64,
) -> PResult<Evolution>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let mut evaluator = Evaluator::new(hamiltonian, Mode::ImaginaryTime);
    propagate(q0, &mut evaluator, t, dt_max)
}

/// Propagate a state in real time.
///
/// See also [`propagate`].
pub fn real_time<S, T>(
    q0: &Arr2<S>,
    hamiltonian: Hamiltonian,
    t: &Arr1<T>,
    dt_max: f64,
) -> PResult<Evolution>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let mut evaluator = Evaluator::new(hamiltonian, Mode::RealTime);
    propagate(q0, &mut evaluator, t, dt_max)
}

/// Run the full pipeline described by `params`: build the grid and
/// Hamiltonian, prepare the initial state, and propagate it in imaginary time
/// through the configured checkpoints.
pub fn run(params: &Params) -> PResult<(Grid, Evolution)> {
    params.validate()?;
    let grid = Grid::new2(
        [params.extent, params.extent], [params.nx, params.ny])?;
    let hamiltonian = Hamiltonian::new(&grid, params)?;
    let q0 = crate::state::prepare(&grid, params)?;
    log::debug!(
        "grid {}x{} on [-{r}, {r})², dx = {:.5}, dk = {:.5}",
        grid.x.n, grid.y.n, grid.x.dx, grid.x.dk, r = params.extent,
    );
    let t = params.checkpoints.times();
    let evolution = imaginary_time(&q0, hamiltonian, &t, params.dt)?;
    Ok((grid, evolution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Quadrature,
        state::gaussian,
        utils::{ wf_dot, wf_norm },
    };

    fn small() -> (Grid, Params) {
        let p = Params { nx: 32, ny: 32, ..Params::default() };
        (Grid::new(p.extent, p.nx, p.ny).unwrap(), p)
    }

    #[test]
    fn checkpoints_validated() {
        let (grid, p) = small();
        let h = Hamiltonian::new(&grid, &p).unwrap();
        let q0 = gaussian(&grid, [0.0; 2], [1.0; 2], [0.0; 2], p.quadrature).unwrap();
        let bad: [nd::Array1<f64>; 3] = [
            nd::array![],
            nd::array![0.0, 0.5, 0.5],
            nd::array![-1.0, 0.0],
        ];
        for t in bad.iter() {
            assert!(matches!(
                imaginary_time(&q0, h.clone(), t, 0.01),
                Err(PropError::Config(ConfigError::BadCheckpoints(_))),
            ));
        }
        assert!(matches!(
            imaginary_time(&q0, h.clone(), &nd::array![0.0, 1.0], 0.0),
            Err(PropError::Config(ConfigError::BadTimeStep(_))),
        ));
        let wrong: nd::Array2<C64> = nd::Array2::zeros((4, 4));
        assert!(matches!(
            imaginary_time(&wrong, h, &nd::array![0.0, 1.0], 0.01),
            Err(PropError::Shape(_)),
        ));
    }

    #[test]
    fn preparation_failure_is_state_error() {
        use crate::error::{ NormError, StateError };
        let (_, p) = small();
        // a packet far narrower than the lattice spacing, centred between
        // sites, underflows to zero everywhere
        let mut p = p;
        p.packet.sigma = [1e-100, 1e-100];
        p.packet.centre = [0.01, 0.0];
        assert!(matches!(
            run(&p),
            Err(PropError::State(StateError::Norm(NormError::Zero))),
        ));
        p.packet.sigma = [0.0, 1.0];
        assert!(matches!(
            run(&p),
            Err(PropError::Config(ConfigError::BadWidth(_))),
        ));
    }

    #[test]
    fn zero_state_is_norm_error() {
        let (grid, p) = small();
        let h = Hamiltonian::new(&grid, &p).unwrap();
        let q0: nd::Array2<C64> = nd::Array2::zeros(grid.dim());
        assert!(matches!(
            imaginary_time(&q0, h, &nd::array![0.0, 0.1], 0.01),
            Err(PropError::Norm { checkpoint: 0, .. }),
        ));
    }

    #[test]
    fn divergence_is_reported() {
        // an oversized imaginary-time step amplifies the rotation term's
        // negative modes, exp(-dt Ω x k_y), past f64 range
        let (grid, p) = small();
        let p = Params { g: 0.0, rotation: 10.0, ..p };
        let h = Hamiltonian::new(&grid, &p).unwrap();
        let q0 = crate::state::prepare(&grid, &p).unwrap();
        let mut ev = Evaluator::imaginary_time(h);
        assert!(matches!(
            propagate(&q0, &mut ev, &nd::array![0.0, 20.0], 20.0),
            Err(PropError::Divergence { checkpoint: 1, .. }),
        ));
        let nan = q0.mapv(|qk| qk * f64::NAN);
        assert!(matches!(
            propagate(&nan, &mut ev, &nd::array![0.0, 0.1], 0.01),
            Err(PropError::Norm { checkpoint: 0, .. }),
        ));
    }

    #[test]
    fn checkpoints_sampled_and_normalized() {
        let (grid, p) = small();
        let h = Hamiltonian::new(&grid, &p).unwrap();
        let q0 = crate::state::prepare(&grid, &p).unwrap();
        let t = nd::array![0.0, 0.05, 0.1, 0.3];
        let evol = imaginary_time(&q0, h, &t, 0.01).unwrap();
        assert_eq!(evol.len(), 4);
        assert_eq!(evol.t, t);
        evol.q.iter()
            .for_each(|qk| {
                assert!(all_finite(qk));
                assert!((wf_norm(qk, &grid, p.quadrature) - 1.0).abs() < 1e-9);
            });
        assert!(evol.energy[3] < evol.energy[0]);
        assert_eq!(evol.deltas(&grid, p.quadrature).len(), 3);
        assert_eq!(evol.stacked().unwrap().dim(), (4, 32, 32));
    }

    #[test]
    fn real_time_preserves_ground_state() {
        let grid = Grid::new(8.0, 64, 64).unwrap();
        let p = Params { g: 0.0, rotation: 0.0, omega_y: 1.0, ..Params::default() };
        let h = Hamiltonian::new(&grid, &p).unwrap();
        let sigma = (0.5_f64).sqrt();
        let q0 = gaussian(&grid, [0.0; 2], [sigma; 2], [0.0; 2], p.quadrature).unwrap();
        let evol = real_time(&q0, h, &nd::array![0.0, 1.0], 0.01).unwrap();
        // stationary up to the global phase exp(-i E t), E = 1
        let overlap = wf_dot(&q0, evol.last(), &grid, p.quadrature);
        assert!((overlap.norm() - 1.0).abs() < 1e-6);
        assert!((overlap.arg() + 1.0).abs() < 1e-3, "{}", overlap.arg());
    }

    #[test]
    fn quadrature_conventions_agree() {
        let (grid, p) = small();
        let t = nd::array![0.0, 0.2];
        let relax = |quad: Quadrature| {
            let p = Params { quadrature: quad, ..p.clone() };
            let h = Hamiltonian::new(&grid, &p).unwrap();
            let q0 = crate::state::prepare(&grid, &p).unwrap();
            let evol = imaginary_time(&q0, h, &t, 0.01).unwrap();
            crate::observables::density(evol.last(), &grid, quad)
        };
        let a = relax(Quadrature::Integral);
        let b = relax(Quadrature::Sum);
        let scale = a.fold(0.0_f64, |acc, v| acc.max(*v));
        a.iter().zip(&b)
            .for_each(|(x, y)| assert!((x - y).abs() < 1e-9 * scale));
    }
}
