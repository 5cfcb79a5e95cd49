//! Error types
use crate::agents::BuildAgentError;
use crate::envs::BuildEnvError;
use crate::results::LogReadError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error from a training run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("error building agent")]
    BuildAgent(#[from] BuildAgentError),
    #[error("error building environment")]
    BuildEnv(#[from] BuildEnvError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    LogRead(#[from] LogReadError),
}

/// Failure to create or write an on-disk artifact.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to create directory `{}`", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to create file `{}`", .path.display())]
    CreateFile { path: PathBuf, source: io::Error },
    #[error("failed to write `{}`", .path.display())]
    WriteFile { path: PathBuf, source: io::Error },
    #[error("failed to read `{}`", .path.display())]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to write record to `{}`", .path.display())]
    WriteRecord { path: PathBuf, source: csv::Error },
    #[error("failed to serialize state")]
    Serialize(#[from] serde_json::Error),
}
