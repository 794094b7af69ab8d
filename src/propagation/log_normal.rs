//! Log-distance path loss with additive log-normal shadowing.
//!
//! # Formula
//!
//! ```text
//! P_rx = P_tx - PL(d₀) - 10 × n × log₁₀(d / d₀) - X
//! ```
//!
//! Where `PL(d₀)` is the reference loss, `n` the path loss exponent and `X`
//! one sample of the shadowing source (normal with mean 0, variance 4 by
//! default). Inside the reference radius (`d <= d₀`) no attenuation is applied
//! and no sample is drawn.

use std::fmt;

use super::PropagationLossModel;
use super::config::{ConfigError, LogNormalConfig, validate_reference_distance};
use super::random::RandomVariableSource;
use super::signal_calculations::{effective_distance, log_distance_path_loss};

/// Log-distance propagation loss model with a stochastic shadowing term.
///
/// The model exclusively owns its random source. Computing a received power
/// advances that source, hence `&mut self`; two threads can never share one
/// generator, and reseeding can't race a computation.
pub struct LogNormalShadowingModel {
    exponent: f64,
    reference_distance: f64,
    reference_loss: f64,
    random: Box<dyn RandomVariableSource>,
}

impl LogNormalShadowingModel {
    /// Build a model from a validated configuration.
    pub fn from_config(config: &LogNormalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let random = config.random_variable.build()?;
        Ok(Self::assemble(config, random))
    }

    /// Build a model that draws shadowing from a caller-supplied source.
    ///
    /// `config.random_variable` is ignored.
    pub fn with_random_source(config: &LogNormalConfig, random: Box<dyn RandomVariableSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, random))
    }

    fn assemble(config: &LogNormalConfig, random: Box<dyn RandomVariableSource>) -> Self {
        Self {
            exponent: config.exponent,
            reference_distance: config.reference_distance,
            reference_loss: config.reference_loss,
            random,
        }
    }

    pub fn set_path_loss_exponent(&mut self, n: f64) {
        self.exponent = n;
    }

    pub fn path_loss_exponent(&self) -> f64 {
        self.exponent
    }

    /// Set the reference distance and loss together.
    ///
    /// A distance that is not finite and positive is rejected and neither
    /// field changes.
    pub fn set_reference(&mut self, distance: f64, loss: f64) -> Result<(), ConfigError> {
        validate_reference_distance(distance)?;
        self.reference_distance = distance;
        self.reference_loss = loss;
        Ok(())
    }

    pub fn reference_distance(&self) -> f64 {
        self.reference_distance
    }

    pub fn reference_loss(&self) -> f64 {
        self.reference_loss
    }

    /// Reseed the shadowing source onto `stream`. Returns the number of
    /// streams consumed (always 1).
    pub fn seed_random_source(&mut self, stream: i64) -> i64 {
        self.random.set_stream(stream)
    }

    /// Received power for a transmission over `distance` meters.
    ///
    /// Draws exactly one shadowing sample when `distance > reference_distance`
    /// and none otherwise. A NaN input yields NaN without drawing.
    pub fn compute_received_power(&mut self, tx_power: f64, distance: f64) -> f64 {
        if tx_power.is_nan() || distance.is_nan() {
            log::warn!("NaN input to loss model (tx_power={}, distance={})", tx_power, distance);
            return f64::NAN;
        }
        if distance <= self.reference_distance {
            return tx_power;
        }

        let path_loss_db = log_distance_path_loss(distance, self.exponent, self.reference_distance) + self.random.sample();
        let gain = -self.reference_loss - path_loss_db;
        log::debug!(
            "distance={}m, reference-attenuation={}dB, attenuation coefficient={}dB",
            distance,
            -self.reference_loss,
            gain
        );
        tx_power + gain
    }

    /// Received power with the shadowing term pinned to zero. Never draws.
    pub fn deterministic_received_power(&self, tx_power: f64, distance: f64) -> f64 {
        if distance.is_nan() {
            return f64::NAN;
        }
        if distance <= self.reference_distance {
            return tx_power;
        }
        tx_power - self.reference_loss - log_distance_path_loss(distance, self.exponent, self.reference_distance)
    }

    /// Largest distance at which the deterministic received power still
    /// reaches `sensitivity` (dBm).
    ///
    /// Receivers inside the reference radius always get `tx_power`, so the
    /// result is never smaller than the reference distance.
    pub fn effective_distance(&self, tx_power: f64, sensitivity: f64) -> f64 {
        let budget = tx_power - sensitivity - self.reference_loss;
        effective_distance(budget, self.exponent, self.reference_distance)
    }
}

impl Default for LogNormalShadowingModel {
    fn default() -> Self {
        let config = LogNormalConfig::default();
        let random = config.random_variable.build().expect("default shadowing distribution is valid");
        Self::assemble(&config, random)
    }
}

impl fmt::Debug for LogNormalShadowingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogNormalShadowingModel")
            .field("exponent", &self.exponent)
            .field("reference_distance", &self.reference_distance)
            .field("reference_loss", &self.reference_loss)
            .field("random", &self.random)
            .finish()
    }
}

impl PropagationLossModel for LogNormalShadowingModel {
    fn calc_rx_power(&mut self, tx_power: f64, distance: f64) -> f64 {
        self.compute_received_power(tx_power, distance)
    }

    fn assign_streams(&mut self, stream: i64) -> i64 {
        self.seed_random_source(stream)
    }
}
