//! Immutable simulation parameters.
//!
//! Every field has a default equal to the reference rotating-condensate
//! scenario, so a configuration file only needs to name the fields it changes:
//! ```toml
//! rotation = 0.4
//! winding = 1
//!
//! [checkpoints]
//! stop = 8.0
//! ```

use std::path::Path;
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::error::ConfigError;

/// Discrete normalization convention for wavefunction samples.
///
/// See [`docs/normalization`][crate::docs#normalization].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrature {
    /// `Σ |ψ|² dx dy = 1`; samples are continuum amplitudes.
    #[default]
    Integral,
    /// `Σ |ψ|² = 1`; samples are amplitudes per lattice site.
    Sum,
}

impl Quadrature {
    /// Weight applied to a lattice sum to approximate an integral over the
    /// plane.
    pub fn weight(self, dx: f64, dy: f64) -> f64 {
        match self {
            Self::Integral => dx * dy,
            Self::Sum => 1.0,
        }
    }

    /// Factor converting `|ψ|²` to a physical density.
    pub fn density_scale(self, dx: f64, dy: f64) -> f64 {
        match self {
            Self::Integral => 1.0,
            Self::Sum => (dx * dy).recip(),
        }
    }
}

/// Initial Gaussian wavepacket.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Packet {
    /// Centre momenta `(p1, p2)`.
    pub momentum: [f64; 2],
    /// Density standard deviations `(σx, σy)`.
    pub sigma: [f64; 2],
    /// Centre position.
    pub centre: [f64; 2],
}

impl Default for Packet {
    fn default() -> Self {
        Self { momentum: [0.0, 0.0], sigma: [3.0, 3.0], centre: [0.0, 0.0] }
    }
}

/// Arithmetic progression of checkpoint times from `start` to `stop`.
///
/// If `step` does not divide `stop - start`, the progression is cut at the
/// last multiple below `stop` and `stop` itself is appended as the final
/// checkpoint, so no checkpoint ever lies past `stop`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Checkpoints {
    pub start: f64,
    pub step: f64,
    pub stop: f64,
}

impl Default for Checkpoints {
    fn default() -> Self { Self { start: 0.0, step: 0.42, stop: 4.0 } }
}

impl Checkpoints {
    /// Materialize the checkpoint times.
    ///
    /// Times are computed as `start + k * step` rather than by repeated
    /// addition. Steps landing within `1e-9 * step` of `stop` count as
    /// reaching it.
    pub fn times(&self) -> nd::Array1<f64> {
        let Self { start, step, stop } = *self;
        let tol = 1e-9 * step;
        let n = ((stop - start + tol) / step).floor() as usize;
        let mut t: Vec<f64>
            = (0..=n)
            .map(|k| (start + k as f64 * step).min(stop))
            .collect();
        if t[n] < stop - tol { t.push(stop); }
        nd::Array1::from_vec(t)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let Self { start, step, stop } = *self;
        if !(start.is_finite() && step.is_finite() && stop.is_finite()) {
            return Err(ConfigError::BadCheckpoints(
                format!("non-finite bounds ({start}, {step}, {stop})")));
        }
        if start < 0.0 {
            return Err(ConfigError::BadCheckpoints(
                format!("start must be non-negative; got {start}")));
        }
        if step <= 0.0 {
            return Err(ConfigError::BadCheckpoints(
                format!("step must be positive; got {step}")));
        }
        if stop < start {
            return Err(ConfigError::BadCheckpoints(
                format!("stop ({stop}) precedes start ({start})")));
        }
        Ok(())
    }
}

/// All scalar parameters of a run.
///
/// Units are natural trap units with *ħ* = 1.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Params {
    /// Half-width *r* of the (square) simulation box.
    pub extent: f64,
    pub nx: usize,
    pub ny: usize,
    pub mass: f64,
    pub omega_x: f64,
    /// Deliberately offset from `omega_x` to break rotational symmetry.
    pub omega_y: f64,
    /// Angular velocity *Ω* of the rotating frame.
    pub rotation: f64,
    /// Interaction strength *g*.
    pub g: f64,
    pub packet: Packet,
    /// Vortex winding number imprinted on the initial state.
    pub winding: i32,
    pub checkpoints: Checkpoints,
    /// Maximum internal sub-step between checkpoints.
    pub dt: f64,
    pub quadrature: Quadrature,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            extent: 5.0,
            nx: 64,
            ny: 64,
            mass: 1.0,
            omega_x: 1.0,
            omega_y: 1.0 * (1.0 + 1e-3),
            rotation: 0.6,
            g: 100.0,
            packet: Packet::default(),
            winding: 2,
            checkpoints: Checkpoints::default(),
            dt: 0.005,
            quadrature: Quadrature::Integral,
        }
    }
}

impl Params {
    /// Check the full configuration-error taxonomy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_extent(self.extent)?;
        ConfigError::check_points(self.nx)?;
        ConfigError::check_points(self.ny)?;
        ConfigError::check_mass(self.mass)?;
        ConfigError::check_finite("omega_x", self.omega_x)?;
        ConfigError::check_finite("omega_y", self.omega_y)?;
        ConfigError::check_finite("rotation", self.rotation)?;
        ConfigError::check_finite("g", self.g)?;
        ConfigError::check_width(self.packet.sigma[0])?;
        ConfigError::check_width(self.packet.sigma[1])?;
        self.packet.momentum.iter()
            .chain(self.packet.centre.iter())
            .try_for_each(|v| ConfigError::check_finite("packet", *v))?;
        ConfigError::check_time_step(self.dt)?;
        self.checkpoints.validate()?;
        Ok(())
    }

    /// Parse parameters from a TOML string and validate them.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(contents)
            .map_err(|source| ConfigError::Parse { source })?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a TOML file and validate them.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_reference_scenario() {
        let p = Params::default();
        p.validate().unwrap();
        assert_eq!(p.nx, 64);
        assert_eq!(p.winding, 2);
        assert!((p.omega_y / p.omega_x - 1.001).abs() < 1e-12);
        let t = p.checkpoints.times();
        assert_eq!(t.len(), 11);
        assert_eq!(t[0], 0.0);
        assert!((t[10] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let p = Params::from_toml_str(
            "g = 0.0\nrotation = 0.0\nquadrature = \"sum\"\n\n[checkpoints]\nstop = 2.0\n"
        ).unwrap();
        assert_eq!(p.g, 0.0);
        assert_eq!(p.quadrature, Quadrature::Sum);
        assert_eq!(p.checkpoints.times().len(), 6);
        assert_eq!(p.extent, 5.0);
    }

    #[test]
    fn checkpoints_end_at_stop() {
        let t = Checkpoints { start: 0.0, step: 0.42, stop: 4.0 }.times();
        assert_eq!(t.len(), 11);
        assert!((t[9] - 3.78).abs() < 1e-12);
        assert_eq!(t[10], 4.0);
        assert!(t.windows(2).into_iter().all(|w| w[0] < w[1]));

        let t = Checkpoints { start: 1.0, step: 0.1, stop: 2.0 }.times();
        assert_eq!(t.len(), 11);
        assert!(t[10] <= 2.0 && (t[10] - 2.0).abs() < 1e-12);

        let t = Checkpoints { start: 0.5, step: 1.0, stop: 0.5 }.times();
        assert_eq!(t, nd::array![0.5]);

        let t = Checkpoints { start: 0.0, step: 10.0, stop: 3.0 }.times();
        assert_eq!(t, nd::array![0.0, 3.0]);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let bad = |f: fn(&mut Params)| {
            let mut p = Params::default();
            f(&mut p);
            p.validate().is_err()
        };
        assert!(bad(|p| p.extent = 0.0));
        assert!(bad(|p| p.extent = -1.0));
        assert!(bad(|p| p.nx = 0));
        assert!(bad(|p| p.packet.sigma[1] = 0.0));
        assert!(bad(|p| p.mass = -1.0));
        assert!(bad(|p| p.dt = 0.0));
        assert!(bad(|p| p.g = f64::NAN));
        assert!(bad(|p| p.checkpoints.step = 0.0));
        assert!(bad(|p| p.checkpoints.start = -0.5));
        assert!(matches!(
            Params::from_toml_str("extent = \"wide\""),
            Err(ConfigError::Parse { .. }),
        ));
    }

    #[test]
    fn config_errors_keep_their_source() {
        use std::error::Error;
        let err = Params::from_toml_str("extent = \"wide\"").unwrap_err();
        assert!(err.source().is_some_and(|e| e.is::<toml::de::Error>()));
        let err = Params::load("/nonexistent/rotgpe/params.toml").unwrap_err();
        match &err {
            ConfigError::Read { path, source } => {
                assert!(path.ends_with("params.toml"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            },
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.source().is_some_and(|e| e.is::<std::io::Error>()));
    }
}
