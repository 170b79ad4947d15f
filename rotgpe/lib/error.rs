//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use thiserror::Error;

/// Returned when an operation requiring arrays of equal shape encounters
/// arrays with unequal shape.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible shapes; got {0:?} and {1:?}")]
pub struct ShapeError(pub (usize, usize), pub (usize, usize));

/// Returned when a wavefunction cannot be normalized.
#[derive(Debug, Error)]
pub enum NormError {
    /// The state is identically zero (to within underflow).
    #[error("cannot normalize a state with zero norm")]
    Zero,

    /// The norm is NaN or infinite.
    #[error("cannot normalize a state with non-finite norm {0}")]
    NonFinite(f64),
}

impl NormError {
    pub(crate) fn check(norm: f64) -> Result<(), Self> {
        if !norm.is_finite() {
            Err(Self::NonFinite(norm))
        } else if norm <= 0.0 {
            Err(Self::Zero)
        } else {
            Ok(())
        }
    }
}

/// Returned when grid or physical parameters are invalid, or when a
/// configuration file cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a non-positive or non-finite spatial extent is
    /// encountered.
    #[error("grid extent must be positive and finite; got {0}")]
    BadExtent(f64),

    /// Returned when an axis would have fewer than two points.
    #[error("grid axes need at least 2 points; got {0}")]
    BadPoints(usize),

    /// Returned when a non-positive or non-finite wavepacket width is
    /// encountered.
    #[error("wavepacket widths must be positive and finite; got {0}")]
    BadWidth(f64),

    /// Returned when a non-positive or non-finite mass is encountered.
    #[error("mass must be positive and finite; got {0}")]
    BadMass(f64),

    /// Returned when a non-positive or non-finite time step is encountered.
    #[error("time step must be positive and finite; got {0}")]
    BadTimeStep(f64),

    /// Returned when the checkpoint sequence is empty, negative, or not
    /// strictly increasing.
    #[error("invalid checkpoint sequence: {0}")]
    BadCheckpoints(String),

    /// Returned when a physical parameter is NaN or infinite.
    #[error("parameter `{0}` must be finite; got {1}")]
    NonFinite(&'static str, f64),

    /// Returned when a configuration file cannot be read.
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Returned when a configuration file cannot be parsed.
    #[error("unable to parse config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub(crate) fn check_extent(extent: f64) -> Result<(), Self> {
        (extent.is_finite() && extent > 0.0)
            .then_some(()).ok_or(Self::BadExtent(extent))
    }

    pub(crate) fn check_points(n: usize) -> Result<(), Self> {
        (n >= 2).then_some(()).ok_or(Self::BadPoints(n))
    }

    pub(crate) fn check_width(sigma: f64) -> Result<(), Self> {
        (sigma.is_finite() && sigma > 0.0)
            .then_some(()).ok_or(Self::BadWidth(sigma))
    }

    pub(crate) fn check_mass(mass: f64) -> Result<(), Self> {
        (mass.is_finite() && mass > 0.0)
            .then_some(()).ok_or(Self::BadMass(mass))
    }

    pub(crate) fn check_time_step(dt: f64) -> Result<(), Self> {
        (dt.is_finite() && dt > 0.0)
            .then_some(()).ok_or(Self::BadTimeStep(dt))
    }

    pub(crate) fn check_finite(name: &'static str, val: f64)
        -> Result<(), Self>
    {
        val.is_finite().then_some(()).ok_or(Self::NonFinite(name, val))
    }
}

/// Returned when an initial state cannot be built.
#[derive(Debug, Error)]
pub enum StateError {
    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// [`NormError`]
    #[error("normalization error: {0}")]
    Norm(#[from] NormError),
}

/// Returned from time-dependent propagation functions.
#[derive(Debug, Error)]
pub enum PropError {
    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// [`ShapeError`]
    #[error("array shape error: {0}")]
    Shape(#[from] ShapeError),

    /// [`StateError`], raised while preparing the initial state.
    #[error("initial state error: {0}")]
    State(#[from] StateError),

    /// Returned when the state cannot be renormalized while advancing toward
    /// checkpoint `checkpoint`.
    #[error("normalization failed while advancing to checkpoint {checkpoint}: {source}")]
    Norm {
        checkpoint: usize,
        #[source]
        source: NormError,
    },

    /// Returned when a non-finite amplitude appears while advancing toward
    /// checkpoint `checkpoint`; usually indicates an unstable step size.
    #[error("numerical divergence while advancing to checkpoint {checkpoint} (t = {time})")]
    Divergence { checkpoint: usize, time: f64 },
}

impl PropError {
    pub(crate) fn norm(checkpoint: usize) -> impl FnOnce(NormError) -> Self {
        move |source| Self::Norm { checkpoint, source }
    }
}
