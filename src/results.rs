//! Reading the episode logs written by [`Monitor`](crate::monitor::Monitor).
use crate::monitor::MONITOR_EXT;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One completed episode as recorded in a monitor file.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    /// Cumulative episode reward.
    pub reward: f64,
    /// Episode length in steps.
    pub length: u64,
    /// Wall-clock seconds from monitor start to episode completion.
    pub wall_time: f64,
}

/// Error reading episode logs.
#[derive(Error, Debug)]
pub enum LogReadError {
    #[error("cannot read log directory `{}`", .path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("no monitor files found in `{}`", .path.display())]
    NoMonitorFiles { path: PathBuf },
    #[error("cannot read monitor file `{}`", .path.display())]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("malformed monitor file `{}`: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

fn malformed(path: &Path, reason: impl Into<String>) -> LogReadError {
    LogReadError::Malformed {
        path: path.to_owned(),
        reason: reason.into(),
    }
}

/// Load all episode records found under `dir`, in completion order.
///
/// Scans `dir` for `*.monitor.csv` files, parses each, and merges the records
/// ordered by wall-clock completion time. A monitor file containing only its
/// headers yields no records; that is not an error. A directory containing no
/// monitor files at all is an error.
pub fn load_results(dir: impl AsRef<Path>) -> Result<Vec<EpisodeRecord>, LogReadError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| LogReadError::ReadDir {
        path: dir.to_owned(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|name| name.to_string_lossy().ends_with(MONITOR_EXT))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(LogReadError::NoMonitorFiles {
            path: dir.to_owned(),
        });
    }

    let mut records = Vec::new();
    for path in &files {
        read_monitor_file(path, &mut records)?;
    }
    records.sort_by(|a, b| {
        a.wall_time
            .partial_cmp(&b.wall_time)
            .unwrap_or(Ordering::Equal)
    });
    Ok(records)
}

/// Cumulative (step-index, reward) pairs for a sequence of episode records.
///
/// The step index of an episode is the total number of environment steps
/// taken up to and including its completion.
pub fn episode_timesteps(records: &[EpisodeRecord]) -> Vec<(u64, f64)> {
    let mut total_steps = 0;
    records
        .iter()
        .map(|record| {
            total_steps += record.length;
            (total_steps, record.reward)
        })
        .collect()
}

fn read_monitor_file(path: &Path, records: &mut Vec<EpisodeRecord>) -> Result<(), LogReadError> {
    let file = File::open(path).map_err(|source| LogReadError::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut header_line = String::new();
    reader
        .read_line(&mut header_line)
        .map_err(|source| LogReadError::ReadFile {
            path: path.to_owned(),
            source,
        })?;
    if !header_line.starts_with('#') {
        return Err(malformed(path, "missing `#` header line"));
    }
    let _: serde_json::Value = serde_json::from_str(&header_line[1..])
        .map_err(|error| malformed(path, format!("invalid header JSON: {}", error)))?;

    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|error| malformed(path, error.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| malformed(path, format!("missing column `{}`", name)))
    };
    let reward_col = column("r")?;
    let length_col = column("l")?;
    let time_col = column("t")?;

    for row in csv_reader.records() {
        let row = row.map_err(|error| malformed(path, error.to_string()))?;
        let field = |col: usize, name: &str| {
            row.get(col)
                .ok_or_else(|| malformed(path, format!("row missing column `{}`", name)))
        };
        records.push(EpisodeRecord {
            reward: field(reward_col, "r")?
                .parse()
                .map_err(|_| malformed(path, "invalid reward value"))?,
            length: field(length_col, "l")?
                .parse()
                .map_err(|_| malformed(path, "invalid length value"))?,
            wall_time: field(time_col, "t")?
                .parse()
                .map_err(|_| malformed(path, "invalid time value"))?,
        });
    }
    Ok(())
}
