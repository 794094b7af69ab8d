//! Radio propagation loss modeling.
//!
//! This module provides the loss model a host simulator consults once per
//! transmission/reception event. It integrates:
//! - A log-distance path loss law with additive log-normal shadowing
//! - Seedable, stream-indexed random sources for reproducible experiments
//! - Configuration with documented defaults
//!
//! ## Module Organization
//!
//! - `log_normal`: The shadowing loss model
//! - `random`: Random variable sources and their configuration spec
//! - `config`: Model configuration and validation errors
//! - `geometry`: Positions and distances
//! - `signal_calculations`: Path loss formulas and power unit conversions

pub mod config;
pub mod geometry;
pub mod log_normal;
pub mod random;
pub mod signal_calculations;

pub use config::{ConfigError, LogNormalConfig};
pub use geometry::Position;
pub use log_normal::LogNormalShadowingModel;
pub use random::{ConstantRandomVariable, NormalRandomVariable, RandomVariableSource, RandomVariableSpec};

use std::fmt;

/// The seam a host simulator calls to turn transmit power into received power.
pub trait PropagationLossModel: Send + fmt::Debug {
    /// Received power for a transmission over `distance` meters.
    fn calc_rx_power(&mut self, tx_power: f64, distance: f64) -> f64;

    /// Received power between two positions.
    fn calc_rx_power_between(&mut self, tx_power: f64, a: &Position, b: &Position) -> f64 {
        self.calc_rx_power(tx_power, a.distance_to(b))
    }

    /// Seed the model's random sources starting at `stream`.
    ///
    /// Returns the number of stream indices consumed.
    fn assign_streams(&mut self, stream: i64) -> i64;
}

/// Seed every model with disjoint stream indices, starting at `first_stream`.
///
/// Returns the total number of streams consumed, so the caller can continue
/// numbering other components after `first_stream + returned`.
pub fn assign_streams(models: &mut [Box<dyn PropagationLossModel>], first_stream: i64) -> i64 {
    let mut next = first_stream;
    for model in models.iter_mut() {
        next += model.assign_streams(next);
    }
    log::debug!("Assigned streams {}..{} to {} loss models", first_stream, next, models.len());
    next - first_stream
}
