//! Reference dataset loading
//!
//! Historical heating records kept in CSV files, shown next to estimates for
//! comparison. The first column is elapsed time in seconds and the second is
//! the measured temperature in °C; extra columns are ignored.
//!
//! Nothing in here feeds the estimator. A broken dataset only ever means an
//! empty chart.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::models::{Trajectory, TrajectoryPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    pub time_s: f64,
    pub temperature_c: f64,
    pub source: PathBuf,
}

/// All records loaded from one file or directory
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    records: Vec<ReferenceRecord>,
    files: Vec<PathBuf>,
}

/// Count, time span and temperature range of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// Record count per file, in load order
    pub files: Vec<(PathBuf, usize)>,
    pub records: usize,
    pub min_time_s: f64,
    pub max_time_s: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
}

impl ReferenceDataset {
    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records as a time-ordered curve for charting
    pub fn series(&self) -> Trajectory {
        let mut points: Vec<TrajectoryPoint> = self
            .records
            .iter()
            .map(|r| TrajectoryPoint {
                time_s: r.time_s,
                temperature_c: r.temperature_c,
            })
            .collect();
        points.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        Trajectory::new(points)
    }

    pub fn summary(&self) -> Option<DatasetSummary> {
        if self.records.is_empty() {
            return None;
        }
        let files = self
            .files
            .iter()
            .map(|file| {
                let count = self.records.iter().filter(|r| &r.source == file).count();
                (file.clone(), count)
            })
            .collect();
        let mut summary = DatasetSummary {
            files,
            records: self.records.len(),
            min_time_s: f64::MAX,
            max_time_s: f64::MIN,
            min_temperature_c: f64::MAX,
            max_temperature_c: f64::MIN,
        };
        for record in &self.records {
            summary.min_time_s = summary.min_time_s.min(record.time_s);
            summary.max_time_s = summary.max_time_s.max(record.time_s);
            summary.min_temperature_c = summary.min_temperature_c.min(record.temperature_c);
            summary.max_temperature_c = summary.max_temperature_c.max(record.temperature_c);
        }
        Some(summary)
    }
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Reference Dataset ===")?;
        writeln!(f, "Files:       {}", self.files.len())?;
        writeln!(f, "Records:     {}", self.records)?;
        writeln!(
            f,
            "Time span:   {:.0} - {:.0} s",
            self.min_time_s, self.max_time_s
        )?;
        writeln!(
            f,
            "Temperature: {:.1} - {:.1} °C",
            self.min_temperature_c, self.max_temperature_c
        )?;
        if self.files.len() > 1 {
            for (file, count) in &self.files {
                writeln!(f, "  {}: {} records", file.display(), count)?;
            }
        }
        Ok(())
    }
}

/// Find all *.csv files under `dir`, sorted by path
pub fn find_dataset_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    files
}

/// Load a dataset from a CSV file or a directory of CSV files
pub fn load_dataset(path: &Path) -> Result<ReferenceDataset> {
    if !path.exists() {
        return Err(Error::Dataset {
            path: path.to_path_buf(),
            message: "no such file or directory".to_string(),
        });
    }

    let files = if path.is_dir() {
        find_dataset_files(path)
    } else {
        vec![path.to_path_buf()]
    };
    if files.is_empty() {
        return Err(Error::Dataset {
            path: path.to_path_buf(),
            message: "no CSV files found".to_string(),
        });
    }

    let mut dataset = ReferenceDataset::default();
    for file in &files {
        let handle = fs::File::open(file)?;
        let records = read_records(handle, file)?;
        debug!(file = %file.display(), records = records.len(), "loaded reference file");
        dataset.records.extend(records);
    }
    dataset.files = files;
    Ok(dataset)
}

/// Load a dataset, falling back to an empty one on any failure
pub fn load_dataset_or_empty(path: &Path) -> ReferenceDataset {
    match load_dataset(path) {
        Ok(dataset) => dataset,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "reference dataset unavailable");
            ReferenceDataset::default()
        }
    }
}

/// Parse records from CSV text with a header row
pub fn read_records<R: Read>(reader: R, source: &Path) -> Result<Vec<ReferenceRecord>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(Error::Dataset {
            path: source.to_path_buf(),
            message: format!("expected at least 2 columns, found {}", headers.len()),
        });
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let field = |idx: usize| -> Result<f64> {
            let raw = row.get(idx).unwrap_or("");
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(Error::Dataset {
                    path: source.to_path_buf(),
                    message: format!("line {}: '{}' is not a finite number", line, raw),
                }),
            }
        };
        records.push(ReferenceRecord {
            time_s: field(0)?,
            temperature_c: field(1)?,
            source: source.to_path_buf(),
        });
    }
    Ok(records)
}
