//! CLI Exit Codes
//!
//! Standard exit codes for CLI operations and automation.

use std::process::ExitCode;

use crate::config::ConfigError;
use crate::core::logger::LogError;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// File not found
    pub const FILE_NOT_FOUND: u8 = 6;

    /// Permission denied
    pub const PERMISSION_DENIED: u8 = 7;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 8;

    /// Internal error
    pub const INTERNAL_ERROR: u8 = 127;

    /// All codes, in table order
    pub const ALL: [u8; 7] = [
        Self::SUCCESS,
        Self::ERROR,
        Self::INVALID_ARGS,
        Self::FILE_NOT_FOUND,
        Self::PERMISSION_DENIED,
        Self::CONFIG_ERROR,
        Self::INTERNAL_ERROR,
    ];
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// Plain success
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// Error with an exit code
    pub fn error(code: u8, msg: impl Into<String>) -> Self {
        Self::Error(code, msg.into())
    }

    /// Invalid command line
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::Error(ExitCodes::INVALID_ARGS, msg.into())
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) | Self::Error(_, msg) => Some(msg),
            Self::Success(None) => None,
        }
    }

    /// Convert to ExitCode
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

fn io_exit_code(err: &std::io::Error) -> u8 {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::NotFound => ExitCodes::FILE_NOT_FOUND,
        ErrorKind::PermissionDenied => ExitCodes::PERMISSION_DENIED,
        _ => ExitCodes::ERROR,
    }
}

impl From<std::io::Error> for CliResult {
    fn from(err: std::io::Error) -> Self {
        Self::Error(io_exit_code(&err), err.to_string())
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Read { source, .. } => io_exit_code(source),
        _ => ExitCodes::CONFIG_ERROR,
    }
}

fn log_exit_code(err: &LogError) -> u8 {
    match err {
        LogError::Open { source, .. } | LogError::Io(source) => io_exit_code(source),
    }
}

impl From<ConfigError> for CliResult {
    fn from(err: ConfigError) -> Self {
        Self::Error(config_exit_code(&err), err.to_string())
    }
}

impl From<LogError> for CliResult {
    fn from(err: LogError) -> Self {
        Self::Error(log_exit_code(&err), err.to_string())
    }
}

impl From<anyhow::Error> for CliResult {
    fn from(err: anyhow::Error) -> Self {
        let code = if let Some(e) = err.downcast_ref::<ConfigError>() {
            config_exit_code(e)
        } else if let Some(e) = err.downcast_ref::<LogError>() {
            log_exit_code(e)
        } else if let Some(e) = err.downcast_ref::<std::io::Error>() {
            io_exit_code(e)
        } else {
            ExitCodes::ERROR
        };
        Self::Error(code, format!("{err:#}"))
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        6 => "File not found",
        7 => "Permission denied",
        8 => "Configuration error",
        127 => "Internal error",
        _ => "Unknown error",
    }
}

/// Print exit code table
pub fn print_exit_codes() {
    println!("Exit Codes:");
    for code in ExitCodes::ALL {
        println!("  {:>3}  {}", code, exit_code_description(code));
    }
}
