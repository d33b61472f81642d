//! CLI Module
//!
//! Provides command-line interface functionality including:
//! - Exit codes for automation
//! - Pipe support for stdout

pub mod exit_codes;
pub mod pipe;

pub use exit_codes::{exit_code_description, print_exit_codes, CliResult, ExitCodes};
pub use pipe::{write_bytes, BytesFormat, ConsoleWriter, OutputFormat, PipeMode};
