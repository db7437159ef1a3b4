//! MafaFX market bias engine.
//!
//! Ingests intraday price series for a primary asset and a dollar-strength
//! proxy, an optional bond-yield series and a macro calendar, derives
//! indicators, scores them into a discrete bias and alerts on bias changes.

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod services;
pub mod signals;

pub use error::{EngineError, Feed};
