//! Small utilities shared by every crate in the workspace: logging setup, timing long-running
//! phases, and pretty-printing.

#[macro_use]
extern crate log;

pub mod logger;
mod time;
mod utils;

pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::prettyprint_usize;

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.2;
