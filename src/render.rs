//! Terminal front ends
//!
//! Every renderer draws the same two things: an estimate summary and a
//! temperature curve. Colour themes and the paced reveal live here too, so
//! the estimator never has to know how its output is shown.

use std::io::{IsTerminal, Write};
use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::estimator::EstimateSummary;
use crate::models::{Direction, Trajectory, TrajectoryPoint};

/// ANSI escape codes used by the themes.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    /// Warm pink accent for dark terminals.
    pub const PINK: &str = "\x1b[38;5;211m";
    /// Near-white text for dark terminals.
    pub const SNOW: &str = "\x1b[38;5;255m";
    /// Brown accent for light terminals.
    pub const BROWN: &str = "\x1b[38;5;94m";
    /// Dark brown text for light terminals.
    pub const DARK_BROWN: &str = "\x1b[38;5;52m";
    pub const GRAY: &str = "\x1b[90m";
    pub const RED: &str = "\x1b[31m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// No escape codes at all
    Plain,
}

impl Theme {
    /// Default theme when stdout can show colour, otherwise [`Theme::Plain`]
    pub fn detect() -> Self {
        if supports_color() {
            Theme::default()
        } else {
            Theme::Plain
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Plain => "plain",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                reset: colors::RESET,
                title: colors::BOLD,
                accent: colors::BROWN,
                text: colors::DARK_BROWN,
                muted: colors::GRAY,
                error: colors::RED,
            },
            Theme::Dark => Palette {
                reset: colors::RESET,
                title: colors::BOLD,
                accent: colors::PINK,
                text: colors::SNOW,
                muted: colors::GRAY,
                error: colors::RED,
            },
            Theme::Plain => Palette::plain(),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether ANSI colour should be written to stdout
///
/// Honours `NO_COLOR` (<https://no-color.org/>) and `TERM=dumb`, and never
/// colours output that is redirected to a file or pipe.
pub fn supports_color() -> bool {
    color_allowed(
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("TERM").ok().as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn color_allowed(no_color: bool, term: Option<&str>, is_terminal: bool) -> bool {
    if no_color || !is_terminal {
        return false;
    }
    !term.is_some_and(|t| t.eq_ignore_ascii_case("dumb"))
}

/// Resolved colour codes, empty strings when colour is off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub reset: &'static str,
    pub title: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub error: &'static str,
}

impl Palette {
    pub const fn plain() -> Self {
        Self {
            reset: "",
            title: "",
            accent: "",
            text: "",
            muted: "",
            error: "",
        }
    }
}

/// A way of showing estimates and curves
pub trait Renderer {
    fn render_result(&self, summary: &EstimateSummary) -> Result<String>;
    fn render_trajectory(&self, trajectory: &Trajectory) -> Result<String>;
}

/// Summary line plus an ASCII chart
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub palette: Palette,
    pub width: usize,
    pub height: usize,
}

impl TextRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: theme.palette(),
            width: 60,
            height: 15,
        }
    }
}

impl Renderer for TextRenderer {
    fn render_result(&self, summary: &EstimateSummary) -> Result<String> {
        let p = &self.palette;
        let (minutes, seconds) = summary.result.minutes_seconds();
        let verb = match summary.result.direction {
            Direction::Cooling => "Estimated cooling time",
            _ => "Estimated time",
        };
        let mut out = String::new();
        out.push_str(&format!(
            "{}{}{}: {}{} min {} s{} ({:.1} minutes)\n",
            p.title,
            verb,
            p.reset,
            p.accent,
            minutes,
            seconds,
            p.reset,
            summary.result.estimated_minutes
        ));
        out.push_str(&format!("{}{}{}\n", p.muted, summary, p.reset));
        Ok(out)
    }

    fn render_trajectory(&self, trajectory: &Trajectory) -> Result<String> {
        Ok(render_chart(trajectory.points(), self.width, self.height, &self.palette))
    }
}

/// Time/temperature table
#[derive(Debug, Clone)]
pub struct TableRenderer {
    pub palette: Palette,
    /// Print every n-th sample; the last sample is always printed.
    pub every: usize,
}

impl TableRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: theme.palette(),
            every: 1,
        }
    }

    pub fn with_every(mut self, every: usize) -> Self {
        self.every = every;
        self
    }
}

impl Renderer for TableRenderer {
    fn render_result(&self, summary: &EstimateSummary) -> Result<String> {
        Ok(format!("{}\n", summary))
    }

    fn render_trajectory(&self, trajectory: &Trajectory) -> Result<String> {
        let p = &self.palette;
        let mut out = format!("{}{:>10} {:>10}{}\n", p.title, "Time (s)", "Temp (°C)", p.reset);
        out.push_str(&format!("{}{}{}\n", p.muted, "-".repeat(21), p.reset));
        let every = self.every.max(1);
        let last = trajectory.len().saturating_sub(1);
        for (i, point) in trajectory.iter().enumerate() {
            if i % every == 0 || i == last {
                out.push_str(&format!("{:>10.1} {:>10.2}\n", point.time_s, point.temperature_c));
            }
        }
        Ok(out)
    }
}

#[derive(Serialize)]
struct CsvSample {
    time_s: f64,
    temperature_c: f64,
}

#[derive(Serialize)]
struct CsvEstimate<'a> {
    liquid: &'a str,
    volume_ml: f64,
    initial_temp_c: f64,
    target_temp_c: f64,
    estimated_minutes: f64,
}

/// Machine-readable output
#[derive(Debug, Clone, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render_result(&self, summary: &EstimateSummary) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(CsvEstimate {
            liquid: &summary.request.liquid.name,
            volume_ml: summary.request.volume_ml,
            initial_temp_c: summary.request.initial_temperature_c,
            target_temp_c: summary.request.target_temperature_c(),
            estimated_minutes: summary.result.estimated_minutes,
        })?;
        finish_csv(writer)
    }

    fn render_trajectory(&self, trajectory: &Trajectory) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if trajectory.is_empty() {
            writer.write_record(["time_s", "temperature_c"])?;
        }
        for point in trajectory {
            writer.serialize(CsvSample {
                time_s: point.time_s,
                temperature_c: point.temperature_c,
            })?;
        }
        finish_csv(writer)
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Plot points on a character grid, °C up the side, seconds along the bottom
pub fn render_chart(
    points: &[TrajectoryPoint],
    width: usize,
    height: usize,
    palette: &Palette,
) -> String {
    if points.is_empty() || width < 2 || height < 2 {
        return format!("{}(no data){}\n", palette.muted, palette.reset);
    }

    let t_max = points.iter().map(|p| p.time_s).fold(f64::MIN, f64::max);
    let t_min = points.iter().map(|p| p.time_s).fold(f64::MAX, f64::min);
    let temp_top = points.iter().map(|p| p.temperature_c).fold(f64::MIN, f64::max);
    let temp_bot = points.iter().map(|p| p.temperature_c).fold(f64::MAX, f64::min);
    let t_range = t_max - t_min;
    let temp_range = temp_top - temp_bot;

    let mut grid = vec![vec![' '; width]; height];
    for point in points {
        let col = if t_range.abs() < 1e-9 {
            0
        } else {
            (((point.time_s - t_min) / t_range) * (width - 1) as f64).round() as usize
        };
        let row = if temp_range.abs() < 1e-9 {
            height / 2
        } else {
            (((point.temperature_c - temp_bot) / temp_range) * (height - 1) as f64).round() as usize
        };
        grid[height - 1 - row.min(height - 1)][col.min(width - 1)] = '*';
    }

    let top_label = format!("{:.1}", temp_top);
    let bot_label = format!("{:.1}", temp_bot);
    let label_width = top_label.len().max(bot_label.len());

    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        let label = if i == 0 {
            top_label.as_str()
        } else if i == height - 1 {
            bot_label.as_str()
        } else {
            ""
        };
        let line: String = row.iter().collect();
        out.push_str(&format!(
            "{}{:>lw$}{} |{}{}{}\n",
            palette.text,
            label,
            palette.reset,
            palette.accent,
            line.trim_end(),
            palette.reset,
            lw = label_width
        ));
    }
    out.push_str(&format!(
        "{}{:>lw$} +{}{}\n",
        palette.muted,
        "°C",
        "-".repeat(width),
        palette.reset,
        lw = label_width
    ));
    let end_label = format!("{:.0} s", t_max);
    let gap = width.saturating_sub(end_label.len() + 1);
    out.push_str(&format!(
        "{}{:>lw$}  {:.0}{}{}{}\n",
        palette.muted,
        "",
        t_min,
        " ".repeat(gap),
        end_label,
        palette.reset,
        lw = label_width
    ));
    out
}

/// Frame-by-frame reveal of a finished curve
///
/// The curve is already complete; this only paces how fast it is printed so
/// the whole reveal takes at most `max_total`.
#[derive(Debug, Clone, Copy)]
pub struct Reveal {
    pub max_total: Duration,
    pub palette: Palette,
}

impl Reveal {
    pub fn new(max_total: Duration, theme: Theme) -> Self {
        Self {
            max_total,
            palette: theme.palette(),
        }
    }

    pub fn frame_delay(&self, frames: usize) -> Duration {
        if frames == 0 {
            return Duration::ZERO;
        }
        self.max_total / frames as u32
    }

    pub fn play<W: Write>(&self, trajectory: &Trajectory, writer: &mut W) -> Result<()> {
        self.play_with(trajectory, writer, std::thread::sleep)
    }

    /// Same as [`Reveal::play`] with an injectable sleep
    pub fn play_with<W, S>(
        &self,
        trajectory: &Trajectory,
        writer: &mut W,
        mut sleep: S,
    ) -> Result<()>
    where
        W: Write,
        S: FnMut(Duration),
    {
        let delay = self.frame_delay(trajectory.len());
        let (lo, hi) = trajectory.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
            (lo.min(p.temperature_c), hi.max(p.temperature_c))
        });
        let span = (hi - lo).max(1e-9);
        let p = &self.palette;

        for point in trajectory {
            let bar = (((point.temperature_c - lo) / span) * 40.0).round() as usize;
            writeln!(
                writer,
                "{}{:>8.1} s{} {:>6.1} °C {}{}{}",
                p.muted,
                point.time_s,
                p.reset,
                point.temperature_c,
                p.accent,
                "#".repeat(bar),
                p.reset
            )?;
            writer.flush()?;
            sleep(delay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{estimate_duration, generate_trajectory};
    use crate::models::{HeatIntensity, HeatingRequest, LiquidProfile, TrajectoryModel};

    fn sample() -> (EstimateSummary, Trajectory) {
        let request = HeatingRequest::basic(
            LiquidProfile::new("Water", 100.0),
            250.0,
            HeatIntensity::Medium,
            25.0,
        );
        let result = estimate_duration(&request).unwrap();
        let curve = generate_trajectory(&result, &request, TrajectoryModel::Linear, 5);
        (EstimateSummary::new(request, result), curve)
    }

    #[test]
    fn test_plain_theme_has_no_escapes() {
        let (summary, curve) = sample();
        let renderer = TextRenderer::new(Theme::Plain);
        let text = renderer.render_result(&summary).unwrap();
        assert!(!text.contains('\x1b'));
        assert!(text.starts_with("Estimated time: 2 min 21 s"));
        assert!(!renderer.render_trajectory(&curve).unwrap().contains('\x1b'));
    }

    #[test]
    fn test_color_detection_rules() {
        assert!(color_allowed(false, Some("xterm-256color"), true));
        assert!(color_allowed(false, None, true));
        assert!(!color_allowed(true, Some("xterm-256color"), true));
        assert!(!color_allowed(false, Some("dumb"), true));
        assert!(!color_allowed(false, Some("DUMB"), true));
        assert!(!color_allowed(false, Some("xterm"), false));
    }

    #[test]
    fn test_dark_theme_uses_accent() {
        let (summary, _) = sample();
        let text = TextRenderer::new(Theme::Dark).render_result(&summary).unwrap();
        assert!(text.contains(colors::PINK));
    }

    #[test]
    fn test_chart_shape() {
        let (_, curve) = sample();
        let chart = render_chart(curve.points(), 20, 5, &Palette::plain());
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("100.0 |"));
        assert!(lines[0].ends_with('*'));
        assert!(lines[4].starts_with(" 25.0 |*"));
        assert!(lines[6].trim_end().ends_with("141 s"));
    }

    #[test]
    fn test_chart_without_data() {
        assert_eq!(render_chart(&[], 20, 5, &Palette::plain()), "(no data)\n");
    }

    #[test]
    fn test_table_renderer() {
        let (_, curve) = sample();
        let table = TableRenderer::new(Theme::Plain).render_trajectory(&curve).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + 5);
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), vec!["0.0", "25.00"]);
        assert_eq!(lines[6].split_whitespace().collect::<Vec<_>>(), vec!["140.6", "100.00"]);
    }

    #[test]
    fn test_table_renderer_thins_rows() {
        let (_, curve) = sample();
        let table = TableRenderer::new(Theme::Plain)
            .with_every(3)
            .render_trajectory(&curve)
            .unwrap();
        let times: Vec<&str> = table
            .lines()
            .skip(2)
            .filter_map(|l| l.split_whitespace().next())
            .collect();
        assert_eq!(times, vec!["0.0", "105.5", "140.6"]);
    }

    #[test]
    fn test_csv_renderer() {
        let (summary, curve) = sample();
        let csv = CsvRenderer.render_trajectory(&curve).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("time_s,temperature_c"));
        assert_eq!(lines.next(), Some("0.0,25.0"));
        assert_eq!(csv.lines().count(), 6);

        let result = CsvRenderer.render_result(&summary).unwrap();
        assert!(result.starts_with(
            "liquid,volume_ml,initial_temp_c,target_temp_c,estimated_minutes\n"
        ));
        assert!(result.contains("Water,250.0,25.0,100.0,2.34375"));
    }

    #[test]
    fn test_reveal_is_capped() {
        let (_, curve) = sample();
        let reveal = Reveal::new(Duration::from_millis(500), Theme::Plain);
        let mut out = Vec::new();
        let mut slept = Duration::ZERO;
        let mut frames = 0;
        reveal
            .play_with(&curve, &mut out, |d| {
                slept += d;
                frames += 1;
            })
            .unwrap();
        assert_eq!(frames, curve.len());
        assert!(slept <= Duration::from_millis(500));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), curve.len());
    }
}
