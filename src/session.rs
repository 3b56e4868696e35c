//! Session context and interactive loop
//!
//! Everything that belongs to one user session (theme, mode, history, the
//! last result) lives on [`SessionContext`]. The estimator only ever sees the
//! request built from it.

use std::io::{BufRead, Write};
use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::catalog;
use crate::config::Settings;
use crate::db;
use crate::error::{Error, Result};
use crate::estimator::{EstimateSummary, estimate_duration, generate_trajectory};
use crate::history::{self, HistoryEntry};
use crate::models::{
    Direction, HeatIntensity, HeatingRequest, LiquidProfile, Mode, Trajectory, TrajectoryModel,
};
use crate::parse;
use crate::render::{CsvRenderer, Renderer, TableRenderer, TextRenderer, Theme};

const HELP: &str = "\
Commands:
  calc <liquid> <quantity> [intensity]    basic mode (intensity: low, medium, high)
  calc <liquid> <quantity> <start temp>   advanced mode
                                          (liquid names may contain spaces)
  curve [linear|exponential] [chart|table|csv]
                                          curve for the last calculation
  mode [basic|advanced]                   show or switch mode
  theme [light|dark|plain]                show or switch theme
  liquids                                 list known liquids
  history                                 past calculations, newest first
  history clear                           forget past calculations
  export <file.csv>                       save history as CSV
  help                                    this text
  quit                                    leave
";

/// What the loop should do after a line
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
}

pub struct SessionContext {
    conn: Connection,
    settings: Settings,
    theme: Theme,
    mode: Mode,
    last: Option<EstimateSummary>,
}

impl SessionContext {
    /// Open a fresh session store and load the catalog
    pub fn new(settings: Settings) -> Result<Self> {
        let conn = db::open_session_store()?;
        catalog::seed_catalog(&conn, &settings.liquids)?;
        Ok(Self {
            conn,
            theme: settings.theme(),
            settings,
            mode: Mode::Basic,
            last: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn last(&self) -> Option<&EstimateSummary> {
        self.last.as_ref()
    }

    /// Basic-mode request from the room temperature
    pub fn basic_request(
        &self,
        liquid: &str,
        volume_ml: f64,
        intensity: HeatIntensity,
    ) -> Result<HeatingRequest> {
        let liquid = catalog::find_liquid(&self.conn, liquid)?;
        Ok(HeatingRequest::basic(
            liquid,
            volume_ml,
            intensity,
            self.settings.room_temperature_c,
        ))
    }

    pub fn advanced_request(
        &self,
        liquid: &str,
        volume_ml: f64,
        initial_temperature_c: f64,
    ) -> Result<HeatingRequest> {
        let liquid = catalog::find_liquid(&self.conn, liquid)?;
        Ok(HeatingRequest::advanced(liquid, volume_ml, initial_temperature_c))
    }

    /// Run the estimator and record the result in the history
    ///
    /// Invalid requests are not recorded and leave the last result untouched.
    pub fn calculate(&mut self, request: HeatingRequest) -> Result<EstimateSummary> {
        let result = estimate_duration(&request)?;
        history::record(&self.conn, &request, &result, self.settings.history_limit)?;
        info!(
            liquid = %request.liquid.name,
            mode = %request.mode,
            estimated_minutes = result.estimated_minutes,
            "calculation recorded"
        );
        let summary = EstimateSummary::new(request, result);
        self.last = Some(summary.clone());
        Ok(summary)
    }

    pub fn trajectory(&self, summary: &EstimateSummary, model: TrajectoryModel) -> Trajectory {
        generate_trajectory(
            &summary.result,
            &summary.request,
            model,
            self.settings.sample_count,
        )
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        history::recent(&self.conn, self.settings.history_limit)
    }

    pub fn export_history(&self, path: &Path) -> Result<usize> {
        let entries = self.history()?;
        history::export_csv_to_path(&entries, path)?;
        Ok(entries.len())
    }

    pub fn clear_history(&self) -> Result<usize> {
        history::clear(&self.conn)
    }

    pub fn liquids(&self) -> Result<Vec<LiquidProfile>> {
        catalog::list_liquids(&self.conn)
    }

    /// Execute one line of REPL input
    pub fn handle_line(&mut self, line: &str) -> Result<Reply> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, args)) = words.split_first() else {
            return Ok(Reply::Output(String::new()));
        };

        match command.to_lowercase().as_str() {
            "calc" | "c" => self.cmd_calc(args),
            "curve" => self.cmd_curve(args),
            "mode" => {
                if let Some(name) = args.first() {
                    self.set_mode(parse::parse_mode(name)?);
                }
                Ok(Reply::Output(format!("mode: {}\n", self.mode())))
            }
            "theme" => {
                if let Some(name) = args.first() {
                    self.set_theme(parse::parse_theme(name)?);
                }
                Ok(Reply::Output(format!("theme: {}\n", self.theme())))
            }
            "liquids" => Ok(Reply::Output(format_liquids(&self.liquids()?))),
            "history" => match args.first() {
                Some(arg) if arg.eq_ignore_ascii_case("clear") => {
                    let count = self.clear_history()?;
                    Ok(Reply::Output(format!("cleared {} entries\n", count)))
                }
                _ => Ok(Reply::Output(format_history(&self.history()?))),
            },
            "export" => {
                let path = args.join(" ");
                if path.is_empty() {
                    return Err(Error::parse("file name", ""));
                }
                let count = self.export_history(Path::new(&path))?;
                Ok(Reply::Output(format!("exported {} entries to {}\n", count, path)))
            }
            "help" | "?" => Ok(Reply::Output(HELP.to_string())),
            "quit" | "exit" | "q" => Ok(Reply::Quit),
            other => Ok(Reply::Output(format!(
                "unknown command '{}', type 'help' for a list\n",
                other
            ))),
        }
    }

    fn cmd_calc(&mut self, args: &[&str]) -> Result<Reply> {
        let Some((liquid, quantity, extra)) = split_calc_args(args) else {
            return Ok(Reply::Output(HELP.to_string()));
        };
        let volume_ml = parse::parse_volume(quantity)?;
        let liquid = liquid.as_str();

        let request = match self.mode {
            Mode::Basic => {
                let intensity = match extra {
                    Some(raw) => parse::parse_intensity(raw)?,
                    None => HeatIntensity::Medium,
                };
                self.basic_request(liquid, volume_ml, intensity)?
            }
            Mode::Advanced => {
                let initial = match extra {
                    Some(raw) => parse::parse_temperature(raw)?,
                    None => self.settings.room_temperature_c,
                };
                self.advanced_request(liquid, volume_ml, initial)?
            }
        };

        let summary = self.calculate(request)?;
        let renderer = TextRenderer::new(self.theme);
        Ok(Reply::Output(renderer.render_result(&summary)?))
    }

    fn cmd_curve(&mut self, args: &[&str]) -> Result<Reply> {
        let Some(summary) = self.last.clone() else {
            return Ok(Reply::Output("nothing calculated yet, try 'calc water 250'\n".to_string()));
        };

        let mut model = self.settings.model;
        let mut format = "chart";
        for arg in args {
            match arg.to_lowercase().as_str() {
                "chart" => format = "chart",
                "table" => format = "table",
                "csv" => format = "csv",
                other => model = parse::parse_model(other)?,
            }
        }

        let trajectory = self.trajectory(&summary, model);
        let mut output = match format {
            "table" => TableRenderer::new(self.theme).render_trajectory(&trajectory)?,
            "csv" => return Ok(Reply::Output(CsvRenderer.render_trajectory(&trajectory)?)),
            _ => TextRenderer::new(self.theme).render_trajectory(&trajectory)?,
        };
        if let Some(note) = near_target_note(&summary, &trajectory) {
            output.push_str(&note);
        }
        Ok(Reply::Output(output))
    }

    /// Read commands until `quit` or end of input
    ///
    /// A failing command prints its error and the loop carries on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        writeln!(output, "HeatUp: heating time calculator. Type 'help' for commands.")?;
        write!(output, "heatup> ")?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            match self.handle_line(&line) {
                Ok(Reply::Output(text)) => write!(output, "{}", text)?,
                Ok(Reply::Quit) => return Ok(()),
                Err(err) => {
                    let p = self.theme.palette();
                    writeln!(output, "{}error:{} {}", p.error, p.reset, err)?;
                }
            }
            write!(output, "heatup> ")?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }
}

/// Liquid, quantity and optional extra argument of a `calc` line
///
/// The liquid is every word before the first one that reads as a quantity,
/// so "hot chocolate 250 high" works. Surrounding quotes are dropped.
fn split_calc_args<'a>(args: &[&'a str]) -> Option<(String, &'a str, Option<&'a str>)> {
    if args.len() < 2 {
        return None;
    }
    let at = (1..args.len())
        .find(|&i| parse::parse_volume(args[i]).is_ok())
        .unwrap_or(1);
    let extra = match &args[at + 1..] {
        [] => None,
        [extra] => Some(*extra),
        _ => return None,
    };
    let liquid = args[..at].join(" ").trim_matches(['"', '\'']).to_string();
    Some((liquid, args[at], extra))
}

/// Degrees from the target that count as "there"
const NEAR_TARGET_C: f64 = 1.0;

/// When the curve first gets within a degree of the target
pub fn near_target_note(summary: &EstimateSummary, trajectory: &Trajectory) -> Option<String> {
    let target = summary.request.target_temperature_c();
    let threshold = match summary.result.direction {
        Direction::Heating => target - NEAR_TARGET_C,
        Direction::Cooling => target + NEAR_TARGET_C,
        Direction::Steady => return None,
    };
    if (summary.request.initial_temperature_c - target).abs() <= NEAR_TARGET_C {
        return None;
    }
    let time_s = trajectory.time_to_reach(threshold)?;
    Some(format!(
        "Within {:.0} °C of {:.1} °C after {:.0} s\n",
        NEAR_TARGET_C, target, time_s
    ))
}

/// Catalog listing, one liquid per line
pub fn format_liquids(liquids: &[LiquidProfile]) -> String {
    let mut out = format!("{:<12} {:>10}  {}\n", "Liquid", "Target °C", "Also known as");
    out.push_str(&format!("{}\n", "-".repeat(50)));
    for liquid in liquids {
        out.push_str(&format!(
            "{:<12} {:>10.1}  {}\n",
            liquid.name,
            liquid.target_temperature_c,
            liquid.aliases.join(", ")
        ));
    }
    out
}

pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "no calculations yet\n".to_string();
    }
    let mut out = format!(
        "{:<21} {:<12} {:>8} {:>8} {:<9} {:>9}\n",
        "Time", "Liquid", "ml", "Start °C", "Heat", "Minutes"
    );
    out.push_str(&format!("{}\n", "-".repeat(72)));
    for entry in entries {
        out.push_str(&format!(
            "{:<21} {:<12} {:>8.0} {:>8.1} {:<9} {:>9.2}\n",
            entry.timestamp,
            entry.liquid,
            entry.volume_ml,
            entry.initial_temp_c,
            entry.intensity.as_deref().unwrap_or("-"),
            entry.estimated_minutes
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> SessionContext {
        let settings = Settings {
            theme: Some(Theme::Plain),
            history_limit: 3,
            ..Settings::default()
        };
        SessionContext::new(settings).unwrap()
    }

    fn output(reply: Reply) -> String {
        match reply {
            Reply::Output(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_basic_calc() {
        let mut s = session();
        let text = output(s.handle_line("calc water 250 medium").unwrap());
        assert!(text.contains("2 min 21 s"), "{}", text);
        let text = output(s.handle_line("calc agua 250ml bajo").unwrap());
        assert!(text.contains("3 min 45 s"), "{}", text);
    }

    #[test]
    fn test_advanced_mode_uses_start_temperature() {
        let mut s = session();
        s.handle_line("mode advanced").unwrap();
        let text = output(s.handle_line("calc chocolate 500 10C").unwrap());
        assert!(text.contains("4 min 41 s"), "{}", text);
        assert_eq!(s.last().unwrap().request.intensity, None);
    }

    #[test]
    fn test_invalid_volume_not_recorded() {
        let mut s = session();
        s.handle_line("calc water 250").unwrap();
        let err = s.handle_line("calc water 0").unwrap_err();
        assert!(matches!(err, Error::Estimate(_)));
        assert_eq!(s.history().unwrap().len(), 1);
        assert_eq!(s.last().unwrap().request.volume_ml, 250.0);
    }

    #[test]
    fn test_history_capped() {
        let mut s = session();
        for volume in [100, 200, 300, 400, 500] {
            s.handle_line(&format!("calc milk {}", volume)).unwrap();
        }
        let history = s.history().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].volume_ml, 500.0);
        assert_eq!(history[2].volume_ml, 300.0);
    }

    #[test]
    fn test_curve_needs_a_calculation() {
        let mut s = session();
        let text = output(s.handle_line("curve").unwrap());
        assert!(text.starts_with("nothing calculated yet"));

        s.handle_line("calc soup 300 high").unwrap();
        let csv = output(s.handle_line("curve exponential csv").unwrap());
        assert_eq!(csv.lines().count(), 1 + s.settings().sample_count);
        assert!(s.handle_line("curve cubic").is_err());
    }

    #[test]
    fn test_export_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        let mut s = session();
        s.handle_line("calc coffee 200").unwrap();
        let text = output(s.handle_line(&format!("export {}", path.display())).unwrap());
        assert!(text.starts_with("exported 1 entries"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(",Coffee,200.0,25.0,medium,basic,"));
    }

    #[test]
    fn test_run_keeps_going_after_errors() {
        let mut s = session();
        let input = "calc lava 100\ncalc water 250\nquit\ncalc milk 100\n";
        let mut out = Vec::new();
        s.run(input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error: unknown liquid: lava"));
        assert!(text.contains("2 min 21 s"));
        assert_eq!(s.history().unwrap().len(), 1);
    }

    #[test]
    fn test_liquid_names_with_spaces() {
        let mut s = session();
        let text = output(s.handle_line("calc Hot chocolate 250 high").unwrap());
        assert!(text.contains("Chocolate, 250 ml"), "{}", text);
        assert_eq!(s.last().unwrap().request.intensity, Some(HeatIntensity::High));

        s.handle_line("calc Caldo / Sopa 1cup").unwrap();
        assert_eq!(s.last().unwrap().request.liquid.name, "Soup");
        assert_eq!(s.last().unwrap().request.volume_ml, 240.0);

        s.handle_line("calc \"Chocolate caliente\" 100").unwrap();
        assert_eq!(s.last().unwrap().request.liquid.name, "Chocolate");
    }

    #[test]
    fn test_calc_argument_errors() {
        let mut s = session();
        assert!(matches!(
            s.handle_line("calc water lots"),
            Err(Error::Parse { kind: "quantity", .. })
        ));
        for line in ["calc water", "calc water 250 high extra"] {
            assert!(output(s.handle_line(line).unwrap()).starts_with("Commands:"));
        }
    }

    #[test]
    fn test_history_clear() {
        let mut s = session();
        s.handle_line("calc water 250").unwrap();
        s.handle_line("calc milk 250").unwrap();
        assert_eq!(output(s.handle_line("history clear").unwrap()), "cleared 2 entries\n");
        assert_eq!(output(s.handle_line("history").unwrap()), "no calculations yet\n");
    }

    #[test]
    fn test_curve_reports_time_near_target() {
        let mut s = session();
        s.handle_line("calc water 250").unwrap();
        // Linear: 140.625 s * 74/75
        let text = output(s.handle_line("curve").unwrap());
        assert!(text.contains("Within 1 °C of 100.0 °C after 139 s"), "{}", text);

        s.handle_line("mode advanced").unwrap();
        s.handle_line("calc coffee 400 95").unwrap();
        // Cooling 60 s over 20 °C, 19 °C down
        let text = output(s.handle_line("curve table").unwrap());
        assert!(text.contains("Within 1 °C of 75.0 °C after 57 s"), "{}", text);
    }

    #[test]
    fn test_theme_and_unknown_commands() {
        let mut s = session();
        assert_eq!(output(s.handle_line("theme dark").unwrap()), "theme: dark\n");
        assert_eq!(s.theme(), Theme::Dark);
        assert!(output(s.handle_line("boil").unwrap()).starts_with("unknown command"));
        assert_eq!(s.handle_line("quit").unwrap(), Reply::Quit);
        assert_eq!(output(s.handle_line("   ").unwrap()), "");
    }
}
