//! A reinforcement learning training harness with best-model checkpointing.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)]
pub mod agents;
pub mod checkpoint;
pub mod config;
pub mod envs;
mod error;
pub mod hooks;
pub mod logging;
pub mod monitor;
pub mod results;
pub mod simulation;
pub mod spaces;

pub use agents::{Actor, Agent, AgentBuilder, ModelStore, Step};
pub use checkpoint::{BestModelCheckpointer, Verbosity};
pub use config::RunConfig;
pub use envs::{BuildEnv, EnvStructure, Environment, StructuredEnvironment};
pub use error::{RunError, StorageError};
pub use hooks::{StepStatus, TrainingHook};
pub use monitor::Monitor;
pub use results::{load_results, EpisodeRecord, LogReadError};
pub use simulation::{evaluate, learn};
