//! Data models for liquids, heating requests and temperature curves

/// Reference data for a liquid the calculator knows how to heat
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidProfile {
    pub name: String,
    pub target_temperature_c: f64,
    pub aliases: Vec<String>,
}

impl LiquidProfile {
    pub fn new(name: impl Into<String>, target_temperature_c: f64) -> Self {
        Self {
            name: name.into(),
            target_temperature_c,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// Burner setting in basic mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeatIntensity {
    Low,
    Medium,
    High,
}

impl HeatIntensity {
    pub const ALL: [HeatIntensity; 3] = [
        HeatIntensity::Low,
        HeatIntensity::Medium,
        HeatIntensity::High,
    ];

    /// Multiplier applied to the base duration. Always positive.
    pub fn time_factor(&self) -> f64 {
        match self {
            HeatIntensity::Low => 1.6,
            HeatIntensity::Medium => 1.0,
            HeatIntensity::High => 0.7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HeatIntensity::Low => "low",
            HeatIntensity::Medium => "medium",
            HeatIntensity::High => "high",
        }
    }
}

impl std::fmt::Display for HeatIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Calculator mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Intensity drives the time factor, start temperature is the room temperature.
    #[default]
    Basic,
    /// Explicit start temperature, time factor fixed at 1.0.
    Advanced,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Input to one calculation
#[derive(Debug, Clone, PartialEq)]
pub struct HeatingRequest {
    pub liquid: LiquidProfile,
    pub volume_ml: f64,
    pub initial_temperature_c: f64,
    pub intensity: Option<HeatIntensity>, // Ignored in advanced mode
    pub mode: Mode,
}

impl HeatingRequest {
    /// Basic-mode request starting from `room_temperature_c`
    pub fn basic(
        liquid: LiquidProfile,
        volume_ml: f64,
        intensity: HeatIntensity,
        room_temperature_c: f64,
    ) -> Self {
        Self {
            liquid,
            volume_ml,
            initial_temperature_c: room_temperature_c,
            intensity: Some(intensity),
            mode: Mode::Basic,
        }
    }

    /// Advanced-mode request with an explicit start temperature
    pub fn advanced(liquid: LiquidProfile, volume_ml: f64, initial_temperature_c: f64) -> Self {
        Self {
            liquid,
            volume_ml,
            initial_temperature_c,
            intensity: None,
            mode: Mode::Advanced,
        }
    }

    pub fn target_temperature_c(&self) -> f64 {
        self.liquid.target_temperature_c
    }
}

/// Which way the liquid's temperature moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Heating,
    Cooling,
    Steady,
}

/// Outcome of a duration estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatingResult {
    pub estimated_minutes: f64,
    pub direction: Direction,
}

impl HeatingResult {
    /// Whole minutes and remainder seconds, with a rounded 60 s carried over.
    pub fn minutes_seconds(&self) -> (u64, u64) {
        let minutes = self.estimated_minutes.floor();
        let seconds = ((self.estimated_minutes - minutes) * 60.0).round();
        let (minutes, seconds) = (minutes as u64, seconds as u64);
        if seconds >= 60 {
            (minutes + 1, seconds - 60)
        } else {
            (minutes, seconds)
        }
    }

    pub fn total_seconds(&self) -> f64 {
        (self.estimated_minutes * 60.0).max(1.0)
    }
}

impl std::fmt::Display for HeatingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (minutes, seconds) = self.minutes_seconds();
        write!(f, "{} min {} s", minutes, seconds)
    }
}

/// Shape of the projected temperature curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrajectoryModel {
    #[default]
    Linear,
    /// Newton-style decelerating approach, within 1% of target at the nominal duration
    Exponential,
}

impl TrajectoryModel {
    pub fn name(&self) -> &'static str {
        match self {
            TrajectoryModel::Linear => "linear",
            TrajectoryModel::Exponential => "exponential",
        }
    }
}

impl std::fmt::Display for TrajectoryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub time_s: f64,
    pub temperature_c: f64,
}

/// Sampled temperature curve, ordered by time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new(points: Vec<TrajectoryPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// First time the curve reaches `threshold`, linearly interpolated between samples.
    ///
    /// Works for both rising and falling curves. Returns `None` if the
    /// threshold is never reached.
    pub fn time_to_reach(&self, threshold: f64) -> Option<f64> {
        let first = self.points.first()?;
        let rising = self
            .points
            .last()
            .is_none_or(|last| last.temperature_c >= first.temperature_c);
        let reached = |t: f64| if rising { t >= threshold } else { t <= threshold };

        if reached(first.temperature_c) {
            return Some(first.time_s);
        }
        for pair in self.points.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if reached(curr.temperature_c) {
                let frac = (threshold - prev.temperature_c)
                    / (curr.temperature_c - prev.temperature_c);
                return Some(prev.time_s + frac * (curr.time_s - prev.time_s));
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time_s: f64, temperature_c: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            time_s,
            temperature_c,
        }
    }

    fn result(minutes: f64) -> HeatingResult {
        HeatingResult {
            estimated_minutes: minutes,
            direction: Direction::Heating,
        }
    }

    #[test]
    fn test_minutes_seconds_split() {
        assert_eq!(result(2.34375).minutes_seconds(), (2, 21));
        assert_eq!(result(3.75).minutes_seconds(), (3, 45));
        assert_eq!(result(4.6875).minutes_seconds(), (4, 41));
    }

    #[test]
    fn test_rounded_seconds_carry_into_minutes() {
        assert_eq!(result(1.999).minutes_seconds(), (2, 0));
        assert_eq!(result(1.999).to_string(), "2 min 0 s");
    }

    #[test]
    fn test_total_seconds_has_floor() {
        assert_eq!(result(0.01).total_seconds(), 1.0);
        assert_eq!(result(2.0).total_seconds(), 120.0);
    }

    #[test]
    fn test_intensity_factors_ordered() {
        assert!(HeatIntensity::Low.time_factor() > HeatIntensity::Medium.time_factor());
        assert!(HeatIntensity::Medium.time_factor() > HeatIntensity::High.time_factor());
        assert!(HeatIntensity::ALL.iter().all(|i| i.time_factor() > 0.0));
    }

    #[test]
    fn test_time_to_reach_interpolates() {
        let curve = Trajectory::new(vec![point(0.0, 20.0), point(10.0, 40.0), point(20.0, 60.0)]);
        assert_eq!(curve.time_to_reach(50.0), Some(15.0));
        assert_eq!(curve.time_to_reach(20.0), Some(0.0));
        assert_eq!(curve.time_to_reach(61.0), None);
    }

    #[test]
    fn test_time_to_reach_on_falling_curve() {
        let curve = Trajectory::new(vec![point(0.0, 90.0), point(60.0, 30.0)]);
        assert_eq!(curve.time_to_reach(60.0), Some(30.0));
    }

    #[test]
    fn test_empty_trajectory() {
        let curve = Trajectory::default();
        assert!(curve.is_empty());
        assert_eq!(curve.time_to_reach(10.0), None);
    }
}
