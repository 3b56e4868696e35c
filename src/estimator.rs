//! Heating time estimator
//!
//! A heuristic, not a thermodynamic simulation: the duration scales with
//! volume and temperature rise, divided by a fixed calibration constant.

use tracing::debug;

use crate::error::EstimateError;
use crate::models::{
    Direction, HeatingRequest, HeatingResult, Mode, Trajectory, TrajectoryModel, TrajectoryPoint,
};

/// Empirical calibration constant, ml·°C per minute.
pub const CALIBRATION_DIVISOR: f64 = 8000.0;

/// Shortest duration ever reported, in minutes.
pub const MIN_ESTIMATED_MINUTES: f64 = 0.01;

/// Start temperature assumed in basic mode.
pub const DEFAULT_ROOM_TEMPERATURE_C: f64 = 25.0;

/// Samples per trajectory unless configured otherwise.
pub const DEFAULT_SAMPLE_COUNT: usize = 60;

/// Most samples a trajectory ever holds.
pub const MAX_SAMPLE_COUNT: usize = 10_000;

/// Longest duration the estimator reports, in minutes (about 1.9 million years).
pub const MAX_ESTIMATED_MINUTES: f64 = 1e12;

/// Residual fraction of the temperature gap left by the exponential model at the nominal duration.
const EXPONENTIAL_RESIDUAL: f64 = 0.01;

/// Estimate how long the liquid takes to reach its target temperature
///
/// Fails when the quantity is not a positive number, or so large that the
/// duration exceeds [`MAX_ESTIMATED_MINUTES`]. A start temperature above the
/// target is treated as a cooling run of the same magnitude.
pub fn estimate_duration(request: &HeatingRequest) -> Result<HeatingResult, EstimateError> {
    if !(request.volume_ml.is_finite() && request.volume_ml > 0.0) {
        return Err(EstimateError::InvalidInput(
            "quantity must be greater than zero".to_string(),
        ));
    }
    if !request.initial_temperature_c.is_finite() {
        return Err(EstimateError::InvalidInput(
            "start temperature must be a finite number".to_string(),
        ));
    }

    let delta = request.target_temperature_c() - request.initial_temperature_c;
    let base_minutes = request.volume_ml * delta.abs() / CALIBRATION_DIVISOR;
    let factor = effective_factor(request);
    let estimated_minutes = (base_minutes * factor).max(MIN_ESTIMATED_MINUTES);
    if !estimated_minutes.is_finite() || estimated_minutes > MAX_ESTIMATED_MINUTES {
        return Err(EstimateError::InvalidInput("quantity is too large".to_string()));
    }

    let direction = if delta > 0.0 {
        Direction::Heating
    } else if delta < 0.0 {
        Direction::Cooling
    } else {
        Direction::Steady
    };

    debug!(
        liquid = %request.liquid.name,
        volume_ml = request.volume_ml,
        base_minutes,
        factor,
        estimated_minutes,
        "estimated heating duration"
    );

    Ok(HeatingResult {
        estimated_minutes,
        direction,
    })
}

/// Time factor actually applied: the intensity's in basic mode, 1.0 in advanced mode.
pub fn effective_factor(request: &HeatingRequest) -> f64 {
    match request.mode {
        Mode::Basic => request.intensity.map_or(1.0, |i| i.time_factor()),
        Mode::Advanced => 1.0,
    }
}

impl TrajectoryModel {
    /// Temperature `time_s` seconds into a run lasting `total_s` seconds
    pub fn temperature_at(&self, time_s: f64, initial_c: f64, target_c: f64, total_s: f64) -> f64 {
        match self {
            TrajectoryModel::Linear => initial_c + (time_s / total_s) * (target_c - initial_c),
            TrajectoryModel::Exponential => {
                let k = -EXPONENTIAL_RESIDUAL.ln() / total_s;
                target_c - (target_c - initial_c) * (-k * time_s).exp()
            }
        }
    }
}

/// Sample the projected temperature curve
///
/// `sample_count` points are spread evenly over `[0, total]` inclusive, the
/// way `linspace` does: zero samples give an empty curve, one sample gives
/// only the start point. Counts above [`MAX_SAMPLE_COUNT`] are capped.
pub fn generate_trajectory(
    result: &HeatingResult,
    request: &HeatingRequest,
    model: TrajectoryModel,
    sample_count: usize,
) -> Trajectory {
    let total_s = result.total_seconds();
    let initial = request.initial_temperature_c;
    let target = request.target_temperature_c();
    let sample_count = sample_count.min(MAX_SAMPLE_COUNT);

    let mut points = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let time_s = if i + 1 == sample_count && sample_count > 1 {
            total_s // Pin the endpoint, no float drift
        } else if sample_count > 1 {
            total_s * i as f64 / (sample_count - 1) as f64
        } else {
            0.0
        };
        points.push(TrajectoryPoint {
            time_s,
            temperature_c: model.temperature_at(time_s, initial, target, total_s),
        });
    }

    Trajectory::new(points)
}

/// A request paired with its result, for display
#[derive(Debug, Clone)]
pub struct EstimateSummary {
    pub request: HeatingRequest,
    pub result: HeatingResult,
}

impl EstimateSummary {
    pub fn new(request: HeatingRequest, result: HeatingResult) -> Self {
        Self { request, result }
    }
}

impl std::fmt::Display for EstimateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let request = &self.request;
        let setting = match (request.mode, request.intensity) {
            (Mode::Basic, Some(intensity)) => format!("{} heat", intensity),
            (Mode::Basic, None) => "medium heat".to_string(),
            (Mode::Advanced, _) => "advanced".to_string(),
        };
        write!(
            f,
            "{}, {:.0} ml, {:.1} °C → {:.1} °C ({}): {}",
            request.liquid.name,
            request.volume_ml,
            request.initial_temperature_c,
            request.target_temperature_c(),
            setting,
            self.result
        )?;
        if self.result.direction == Direction::Cooling {
            write!(f, " (cooling)")?;
        }
        Ok(())
    }
}
