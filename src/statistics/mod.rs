//! Statistical infrastructure for adaptive measurement.
//!
//! This module provides:
//! - A running sample window with accumulators that stay exactly
//!   consistent under retroactive removal
//! - Exponentially-weighted trailing statistics for outlier
//!   classification

mod ewma;
mod running;

pub use ewma::EwmaStats;
pub use running::SampleWindow;
