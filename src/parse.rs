//! Parsing of user-typed quantities, temperatures and choices
//!
//! Accepts the loose forms people type into a kitchen calculator: "250",
//! "250ml", "0.5 L", "1 cup", "77°F".

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{HeatIntensity, Mode, TrajectoryModel};
use crate::render::Theme;

// Pattern: number, optional unit word ("250", "0.5 L", "2 cups")
const QUANTITY_PATTERN: &str = r"(?i)^\s*([+-]?(?:\d+(?:[.,]\d*)?|[.,]\d+))\s*([a-z]*)\s*$";

// Pattern: number, optional degree sign, optional scale letter ("25", "77°F")
const TEMPERATURE_PATTERN: &str =
    r"(?i)^\s*([+-]?(?:\d+(?:[.,]\d*)?|[.,]\d+))\s*(?:°|º|deg)?\s*([cfk]?)\s*$";

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}

/// Quantity in millilitres. A bare number is taken as millilitres.
///
/// Zero and negative quantities parse fine; rejecting them is the estimator's job.
pub fn parse_volume(input: &str) -> Result<f64> {
    let quantity_re = Regex::new(QUANTITY_PATTERN)?;
    let caps = quantity_re
        .captures(input)
        .ok_or_else(|| Error::parse("quantity", input))?;
    let value = parse_number(&caps[1]).ok_or_else(|| Error::parse("quantity", input))?;

    let ml_per_unit = match caps[2].to_lowercase().as_str() {
        "" | "ml" => 1.0,
        "cl" => 10.0,
        "dl" => 100.0,
        "l" | "lt" | "liter" | "liters" | "litre" | "litres" | "litro" | "litros" => 1000.0,
        "cup" | "cups" | "taza" | "tazas" => 240.0,
        "tbsp" | "tablespoon" | "tablespoons" => 15.0,
        "tsp" | "teaspoon" | "teaspoons" => 5.0,
        _ => return Err(Error::parse("quantity", input)),
    };

    Ok(value * ml_per_unit)
}

/// Temperature in degrees Celsius. A bare number is taken as Celsius.
pub fn parse_temperature(input: &str) -> Result<f64> {
    let temperature_re = Regex::new(TEMPERATURE_PATTERN)?;
    let caps = temperature_re
        .captures(input)
        .ok_or_else(|| Error::parse("temperature", input))?;
    let value = parse_number(&caps[1]).ok_or_else(|| Error::parse("temperature", input))?;

    let celsius = match caps[2].to_lowercase().as_str() {
        "" | "c" => value,
        "f" => (value - 32.0) * 5.0 / 9.0,
        "k" => value - 273.15,
        _ => return Err(Error::parse("temperature", input)),
    };
    Ok(celsius)
}

pub fn parse_intensity(input: &str) -> Result<HeatIntensity> {
    match input.trim().to_lowercase().as_str() {
        "low" | "l" | "bajo" => Ok(HeatIntensity::Low),
        "medium" | "med" | "m" | "medio" => Ok(HeatIntensity::Medium),
        "high" | "h" | "alto" => Ok(HeatIntensity::High),
        _ => Err(Error::parse("heat intensity", input)),
    }
}

pub fn parse_model(input: &str) -> Result<TrajectoryModel> {
    match input.trim().to_lowercase().as_str() {
        "linear" | "lin" | "simple" => Ok(TrajectoryModel::Linear),
        "exponential" | "exp" | "newton" | "newtonian" => Ok(TrajectoryModel::Exponential),
        _ => Err(Error::parse("trajectory model", input)),
    }
}

pub fn parse_mode(input: &str) -> Result<Mode> {
    match input.trim().to_lowercase().as_str() {
        "basic" | "simple" | "basico" | "básico" => Ok(Mode::Basic),
        "advanced" | "adv" | "avanzado" => Ok(Mode::Advanced),
        _ => Err(Error::parse("mode", input)),
    }
}

pub fn parse_theme(input: &str) -> Result<Theme> {
    match input.trim().to_lowercase().as_str() {
        "light" | "claro" => Ok(Theme::Light),
        "dark" | "oscuro" => Ok(Theme::Dark),
        "plain" | "none" | "no-color" => Ok(Theme::Plain),
        _ => Err(Error::parse("theme", input)),
    }
}
