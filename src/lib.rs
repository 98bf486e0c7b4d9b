pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod text_layout;
pub mod util;

pub use error::{ErrorKind, Result, SplitError};
pub use pipeline::{run_split, Pipeline, RunOptions};
pub use report::RunResult;
