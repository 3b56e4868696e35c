//! HeatUp
//!
//! Estimates how long a kitchen liquid takes to reach its target temperature
//! and samples the projected temperature curve. The estimator itself is pure;
//! everything else in this crate is a front end around it.

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod estimator;
pub mod history;
pub mod logging;
pub mod models;
pub mod parse;
pub mod render;
pub mod session;

pub use error::{Error, EstimateError, Result};
pub use estimator::{EstimateSummary, estimate_duration, generate_trajectory};
pub use models::{
    Direction, HeatIntensity, HeatingRequest, HeatingResult, LiquidProfile, Mode, Trajectory,
    TrajectoryModel, TrajectoryPoint,
};
