//! Linear operators that are diagonal in position space, in momentum space, or
//! in one of the two mixed representations, together with their sums.
//!
//! An [`Operator`] never materializes a dense matrix: a [`Composite`] term is
//! the lazy product `T⁻¹ · diag(core) · T` for a transform `T` over one or both
//! axes, so e.g. `x · p_y` is a single composite term whose core is `x · k_y`
//! in the `(x, k_y)` representation.
//!
//! [`Composite`]: Operator::Composite

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr2,
    error::ShapeError,
    utils::{ Fft2, Transform },
};

/// A real-diagonal operator, or a sum of such operators, acting on
/// wavefunctions of a fixed shape.
#[derive(Clone, Debug)]
pub enum Operator<'a> {
    /// Pointwise multiplication in position space.
    Diagonal(nd::ArrayView2<'a, f64>),
    /// Pointwise multiplication in the representation reached by `transform`.
    Composite {
        transform: Transform,
        core: nd::ArrayView2<'a, f64>,
    },
    /// Sum of terms.
    Sum(Vec<Operator<'a>>),
}

impl<'a> Operator<'a> {
    /// Check that every core matches the shape `dim`.
    pub fn check_dim(&self, dim: (usize, usize)) -> Result<(), ShapeError> {
        match self {
            Self::Diagonal(core) | Self::Composite { core, .. } => {
                (core.dim() == dim).then_some(())
                    .ok_or(ShapeError(core.dim(), dim))
            },
            Self::Sum(terms) => {
                terms.iter().try_for_each(|term| term.check_dim(dim))
            },
        }
    }

    /// Number of non-sum terms.
    pub fn num_terms(&self) -> usize {
        match self {
            Self::Sum(terms) => terms.iter().map(Self::num_terms).sum(),
            _ => 1,
        }
    }

    /// Compute the action `Op q`.
    pub fn apply<S>(&self, q: &Arr2<S>, fft: &mut Fft2) -> nd::Array2<C64>
    where S: nd::Data<Elem = C64>
    {
        match self {
            Self::Diagonal(core) => {
                nd::Zip::from(q).and(core)
                    .map_collect(|qk, vk| *qk * *vk)
            },
            Self::Composite { transform, core } => {
                let mut p = q.to_owned();
                fft.forward(&mut p, *transform);
                p.zip_mut_with(core, |pk, vk| { *pk *= *vk; });
                fft.inverse(&mut p, *transform);
                p
            },
            Self::Sum(terms) => {
                let mut acc: nd::Array2<C64> = nd::Array2::zeros(q.raw_dim());
                terms.iter()
                    .for_each(|term| { acc += &term.apply(q, fft); });
                acc
            },
        }
    }

    /// Apply `exp(z Op)` to `q` in place.
    ///
    /// This is exact for a single diagonal or composite term. For a sum, terms
    /// are applied by symmetric (Strang) splitting: a half step for every term
    /// but the last, a full step for the last, then the half steps again in
    /// reverse order; the splitting error is *O*(*z*³) per step.
    pub fn exp_apply<S>(&self, q: &mut Arr2<S>, z: C64, fft: &mut Fft2)
    where S: nd::DataMut<Elem = C64>
    {
        match self {
            Self::Diagonal(core) => {
                q.zip_mut_with(core, |qk, vk| { *qk *= (z * *vk).exp(); });
            },
            Self::Composite { transform, core } => {
                fft.forward(q, *transform);
                q.zip_mut_with(core, |qk, vk| { *qk *= (z * *vk).exp(); });
                fft.inverse(q, *transform);
            },
            Self::Sum(terms) => {
                if let Some((last, rest)) = terms.split_last() {
                    let zh = 0.5 * z;
                    rest.iter()
                        .for_each(|term| term.exp_apply(q, zh, fft));
                    last.exp_apply(q, z, fft);
                    rest.iter().rev()
                        .for_each(|term| term.exp_apply(q, zh, fft));
                }
            },
        }
    }

    /// Compute the expectation value `⟨q|Op|q⟩` weighted by `weight`.
    pub fn expectation<S>(&self, q: &Arr2<S>, weight: f64, fft: &mut Fft2)
        -> C64
    where S: nd::Data<Elem = C64>
    {
        let p = self.apply(q, fft);
        let acc: C64
            = nd::Zip::from(q).and(&p)
            .fold(C64::new(0.0, 0.0), |acc, qk, pk| acc + qk.conj() * *pk);
        acc * weight
    }
}
