use ndarray as nd;
use num_complex::Complex64 as C64;
use rotgpe::{
    Grid,
    Params,
    Quadrature,
    hamiltonian::Hamiltonian,
    state::gaussian,
    timedep,
    utils::{ all_finite, wf_dot, wf_norm, wf_normalized },
};

fn trap_params() -> Params {
    Params { extent: 8.0, g: 0.0, rotation: 0.0, ..Params::default() }
}

fn exact_ground(grid: &Grid, p: &Params, quad: Quadrature) -> nd::Array2<C64> {
    let q = grid.map(|x, y| {
        C64::from((-0.5 * p.mass * (p.omega_x * x * x + p.omega_y * y * y)).exp())
    });
    wf_normalized(&q, grid, quad).unwrap()
}

#[test]
fn relaxes_to_analytic_ground_state() {
    let p = trap_params();
    let grid = Grid::new(p.extent, p.nx, p.ny).unwrap();
    for quad in [Quadrature::Integral, Quadrature::Sum] {
        let h = Hamiltonian::new(&grid, &Params { quadrature: quad, ..p.clone() }).unwrap();
        let q0 = gaussian(&grid, [0.0; 2], [2.0, 2.0], [0.0; 2], quad).unwrap();
        let t = nd::Array1::linspace(0.0, 10.0, 11);
        let evol = timedep::imaginary_time(&q0, h, &t, 0.01).unwrap();

        let last = evol.last();
        assert!(all_finite(last));
        assert!((wf_norm(last, &grid, quad) - 1.0).abs() < 1e-10);

        let overlap = wf_dot(&exact_ground(&grid, &p, quad), last, &grid, quad).norm();
        assert!(overlap > 0.9999, "overlap {overlap}");

        let e_exact = 0.5 * (p.omega_x + p.omega_y);
        let e_final = evol.energy[evol.len() - 1];
        assert!((e_final - e_exact).abs() < 1e-3, "E = {e_final}");
        assert!((evol.mu[evol.len() - 1] - e_final).abs() < 1e-12);

        // energy never increases in imaginary time
        evol.energy.iter().zip(evol.energy.iter().skip(1))
            .for_each(|(a, b)| assert!(b <= &(a + 1e-7), "{a} -> {b}"));
        let deltas = evol.deltas(&grid, quad);
        assert!(deltas[deltas.len() - 1] < 1e-4 * deltas[0]);
    }
}

#[test]
fn ground_state_is_stationary_under_relaxation() {
    let p = trap_params();
    let grid = Grid::new(p.extent, p.nx, p.ny).unwrap();
    let quad = p.quadrature;
    let q0 = exact_ground(&grid, &p, quad);
    let h = Hamiltonian::new(&grid, &p).unwrap();
    let evol = timedep::imaginary_time(&q0, h, &nd::array![0.0, 1.0, 2.0], 0.005).unwrap();
    let overlap = wf_dot(&q0, evol.last(), &grid, quad).norm();
    assert!(overlap > 1.0 - 1e-7, "overlap {overlap}");
}
