//! What the binary prints and the status it exits with.

pub mod exit_code;
pub mod format;
pub mod output;

pub use exit_code::ExitCode;
pub use format::{ErrorDetails, JsonResponse, OutputFormat, ResponseMeta};
pub use output::{BatchReport, FileReport, OutputManager};
