//! HeatUp
//!
//! Heating time calculator for common kitchen liquids.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use heatup::config;
use heatup::dataset;
use heatup::estimator::MAX_SAMPLE_COUNT;
use heatup::logging::{LoggingConfig, init_logging};
use heatup::models::{HeatIntensity, HeatingRequest};
use heatup::parse;
use heatup::render::{
    CsvRenderer, Renderer, Reveal, TableRenderer, TextRenderer, Theme, render_chart,
};
use heatup::session::{SessionContext, format_liquids, near_target_note};

#[derive(Parser)]
#[command(name = "heatup", version)]
#[command(about = "Estimate how long a kitchen liquid takes to heat up")]
struct Cli {
    /// Path to a heatup.toml configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Colour theme: light, dark or plain
    #[arg(long)]
    theme: Option<String>,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Chart,
    Table,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate heating time from the burner setting (basic mode)
    Calc {
        /// Liquid (e.g. "water", "milk", "leche")
        liquid: String,

        /// Quantity, e.g. "250", "250ml", "0.5l", "1cup"
        #[arg(short = 'q', long, default_value = "250ml", allow_hyphen_values = true)]
        volume: String,

        /// Burner setting: low, medium or high
        #[arg(short, long, default_value = "medium")]
        intensity: String,
    },

    /// Estimate heating time from an explicit start temperature
    Advanced {
        liquid: String,

        #[arg(short = 'q', long, default_value = "250ml", allow_hyphen_values = true)]
        volume: String,

        /// Start temperature, e.g. "10", "4C", "40F"
        #[arg(short = 't', long, allow_hyphen_values = true)]
        initial: String,
    },

    /// Show the projected temperature curve
    Curve {
        liquid: String,

        #[arg(short = 'q', long, default_value = "250ml", allow_hyphen_values = true)]
        volume: String,

        /// Burner setting (basic mode)
        #[arg(short, long, conflicts_with = "initial")]
        intensity: Option<String>,

        /// Start temperature (advanced mode)
        #[arg(short = 't', long, allow_hyphen_values = true)]
        initial: Option<String>,

        /// Curve shape: linear or exponential
        #[arg(short, long)]
        model: Option<String>,

        /// Number of samples
        #[arg(short, long)]
        samples: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Chart)]
        format: OutputFormat,

        /// Table format: print every n-th sample (the last one is always shown)
        #[arg(long, default_value_t = 1)]
        every: usize,

        /// Print the curve point by point
        #[arg(long)]
        animate: bool,
    },

    /// List known liquids
    Liquids,

    /// Summarise a reference dataset (CSV file or directory of CSV files)
    Dataset {
        path: PathBuf,
    },

    /// Interactive session reading commands from stdin
    Session,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    init_logging(&if cli.verbose { logging.verbose() } else { logging });

    let mut settings = config::load_settings(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(theme) = &cli.theme {
        settings.theme = Some(parse::parse_theme(theme)?);
    }

    match cli.command {
        Commands::Calc {
            liquid,
            volume,
            intensity,
        } => {
            let mut session = SessionContext::new(settings)?;
            let volume_ml = parse::parse_volume(&volume)?;
            let intensity = parse::parse_intensity(&intensity)?;
            let request = session.basic_request(&liquid, volume_ml, intensity)?;
            let summary = session.calculate(request)?;
            print!("{}", TextRenderer::new(session.theme()).render_result(&summary)?);
        }

        Commands::Advanced {
            liquid,
            volume,
            initial,
        } => {
            let mut session = SessionContext::new(settings)?;
            let volume_ml = parse::parse_volume(&volume)?;
            let initial = parse::parse_temperature(&initial)?;
            let request = session.advanced_request(&liquid, volume_ml, initial)?;
            let summary = session.calculate(request)?;
            print!("{}", TextRenderer::new(session.theme()).render_result(&summary)?);
        }

        Commands::Curve {
            liquid,
            volume,
            intensity,
            initial,
            model,
            samples,
            format,
            every,
            animate,
        } => {
            if let Some(samples) = samples {
                if !(2..=MAX_SAMPLE_COUNT).contains(&samples) {
                    bail!("--samples must be between 2 and {}", MAX_SAMPLE_COUNT);
                }
                settings.sample_count = samples;
            }
            if let Some(model) = &model {
                settings.model = parse::parse_model(model)?;
            }
            let model = settings.model;
            let reveal = Reveal::new(settings.reveal, settings.theme());
            let mut session = SessionContext::new(settings)?;

            let request = build_request(&session, &liquid, &volume, intensity, initial)?;
            let summary = session.calculate(request)?;
            let trajectory = session.trajectory(&summary, model);
            let note = near_target_note(&summary, &trajectory).unwrap_or_default();

            match format {
                OutputFormat::Csv => print!("{}", CsvRenderer.render_trajectory(&trajectory)?),
                OutputFormat::Table => {
                    let renderer = TableRenderer::new(session.theme()).with_every(every);
                    print!("{}", renderer.render_result(&summary)?);
                    print!("{}", renderer.render_trajectory(&trajectory)?);
                    print!("{}", note);
                }
                OutputFormat::Chart => {
                    let renderer = TextRenderer::new(session.theme());
                    print!("{}", renderer.render_result(&summary)?);
                    if animate {
                        reveal.play(&trajectory, &mut io::stdout().lock())?;
                    } else {
                        print!("{}", renderer.render_trajectory(&trajectory)?);
                    }
                    print!("{}", note);
                }
            }
        }

        Commands::Liquids => {
            let session = SessionContext::new(settings)?;
            print!("{}", format_liquids(&session.liquids()?));
        }

        Commands::Dataset { path } => show_dataset(&path, settings.theme()),

        Commands::Session => {
            let mut session = SessionContext::new(settings)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            session.run(stdin.lock(), &mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Basic mode unless a start temperature was given
fn build_request(
    session: &SessionContext,
    liquid: &str,
    volume: &str,
    intensity: Option<String>,
    initial: Option<String>,
) -> Result<HeatingRequest> {
    let volume_ml = parse::parse_volume(volume)?;
    let request = match initial {
        Some(initial) => {
            let initial = parse::parse_temperature(&initial)?;
            session.advanced_request(liquid, volume_ml, initial)?
        }
        None => {
            let intensity = match intensity {
                Some(raw) => parse::parse_intensity(&raw)?,
                None => HeatIntensity::Medium,
            };
            session.basic_request(liquid, volume_ml, intensity)?
        }
    };
    Ok(request)
}

/// Dataset problems never fail the command, they show as an empty dataset
fn show_dataset(path: &Path, theme: Theme) {
    let dataset = dataset::load_dataset_or_empty(path);
    match dataset.summary() {
        Some(summary) => {
            print!("{}", summary);
            println!();
            print!("{}", render_chart(dataset.series().points(), 60, 15, &theme.palette()));
        }
        None => println!("No reference data available at {}", path.display()),
    }
}
