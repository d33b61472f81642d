//! Byteterm CLI - Command-line interface
//!
//! Headless front end for the data pipeline: encode escape sequences and
//! monitor a byte stream from stdin.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use byteterm_core::cli::{self, BytesFormat, CliResult, ConsoleWriter, ExitCodes, PipeMode};
use byteterm_core::config::{self as settings, AppConfig};
use byteterm_core::core::codec::SendEncoding;
use byteterm_core::core::console::{Console, ConsoleQuery, RunLoop};
use byteterm_core::core::display::DisplayConfig;
use byteterm_core::core::fragment::ColorClass;
use byteterm_core::core::logger::{generate_log_filename, FileLogSink, LogMode};
use byteterm_core::core::session::TerminalSession;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::AsyncReadExt;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const READ_BUFFER_SIZE: usize = 4096;

/// Line ending style
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LineEnding {
    /// No line ending
    None,
    /// CR only
    Cr,
    /// LF only
    Lf,
    /// CR+LF
    Crlf,
}

impl From<LineEnding> for settings::LineEnding {
    fn from(value: LineEnding) -> Self {
        match value {
            LineEnding::None => Self::None,
            LineEnding::Cr => Self::Cr,
            LineEnding::Lf => Self::Lf,
            LineEnding::Crlf => Self::CrLf,
        }
    }
}

/// Encoded bytes output
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodeFormat {
    /// Uppercase hex pairs
    Hex,
    /// Raw bytes
    Raw,
}

/// Console output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MonitorFormat {
    /// ANSI-coloured text
    Ansi,
    /// Text only
    Plain,
    /// JSON lines of fragments
    Json,
}

impl From<MonitorFormat> for cli::OutputFormat {
    fn from(value: MonitorFormat) -> Self {
        match value {
            MonitorFormat::Ansi => Self::Ansi,
            MonitorFormat::Plain => Self::Plain,
            MonitorFormat::Json => Self::Json,
        }
    }
}

/// What gets logged
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogModeArg {
    /// Text as shown in the console
    Displayed,
    /// Received bytes, unmodified
    Raw,
}

impl From<LogModeArg> for LogMode {
    fn from(value: LogModeArg) -> Self {
        match value {
            LogModeArg::Displayed => Self::AsDisplayed,
            LogModeArg::Raw => Self::Raw,
        }
    }
}

/// Byteterm CLI
#[derive(Parser, Debug)]
#[command(
    name = "byteterm",
    author = "Byteterm Team",
    version,
    about = "Byte stream terminal: escape encoding, hex/text formatting and console rendering",
    long_about = None
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "BYTETERM_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode text with escape sequences (\n, \r, \t, \0, \\, \HH)
    Encode {
        /// Text to encode
        text: String,

        /// Send the text as is
        #[arg(long)]
        raw: bool,

        /// Line ending appended after encoding
        #[arg(long, value_enum, default_value_t = LineEnding::None)]
        line_ending: LineEnding,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = EncodeFormat::Hex)]
        format: EncodeFormat,
    },

    /// Format bytes read from stdin as received data
    Monitor {
        #[command(flatten)]
        display: DisplayArgs,

        /// Log file path (a directory gets a generated file name)
        #[arg(short = 'l', long)]
        log: Option<PathBuf>,

        /// Log to a generated file in the configured log directory
        #[arg(long, conflicts_with = "log")]
        log_auto: bool,

        /// What gets written to the log
        #[arg(long, value_enum)]
        log_mode: Option<LogModeArg>,

        /// Output format (ANSI when stdout is a terminal)
        #[arg(short, long, value_enum)]
        format: Option<MonitorFormat>,

        /// Characters per line before wrapping
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        width: Option<u16>,
    },

    /// Print the effective configuration
    Config,

    /// Print the exit code table
    ExitCodes,
}

/// Display overrides
#[derive(Args, Debug)]
struct DisplayArgs {
    /// Render every byte as hex
    #[arg(long)]
    hex: bool,

    /// Prefix lines with timestamps
    #[arg(long)]
    timestamps: bool,

    /// Timestamp received data mid-line too, not only at line starts
    #[arg(long)]
    timestamp_any_position: bool,

    /// Minimum milliseconds between timestamps
    #[arg(long)]
    timestamp_limit_ms: Option<u64>,

    /// Show CR and LF as hex
    #[arg(long)]
    show_crlf_hex: bool,

    /// Do not start a new line on LF
    #[arg(long)]
    no_crlf_newline: bool,

    /// Show control characters as hex
    #[arg(long)]
    hex_special: bool,
}

impl DisplayArgs {
    fn apply(&self, config: &mut DisplayConfig) {
        config.hex_mode |= self.hex;
        config.timestamps_enabled |= self.timestamps;
        config.show_crlf_hex |= self.show_crlf_hex;
        config.hex_for_special_chars |= self.hex_special;
        if self.no_crlf_newline {
            config.crlf_as_newline = false;
        }
        if self.timestamp_any_position {
            config.timestamp_after_newline_only = false;
        }
        if let Some(limit) = self.timestamp_limit_ms {
            config.timestamp_time_limit_ms = limit;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match run(&cli).await {
        Ok(()) => CliResult::success(),
        Err(err) => err,
    };

    if let Some(msg) = result.message() {
        if !result.is_success() {
            eprintln!("Error: {msg}");
        }
    }
    result.to_exit_code()
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig, CliResult> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

async fn run(cli: &Cli) -> Result<(), CliResult> {
    match &cli.command {
        Commands::Encode {
            text,
            raw,
            line_ending,
            format,
        } => encode(text, *raw, *line_ending, *format)?,
        Commands::Monitor {
            display,
            log,
            log_auto,
            log_mode,
            format,
            width,
        } => {
            let mut config = load_config(cli)?;
            display.apply(&mut config.display);
            if let Some(mode) = log_mode {
                config.logging.mode = (*mode).into();
            }
            let log = if *log_auto {
                let dir = config
                    .logging
                    .directory()
                    .ok_or_else(|| CliResult::error(ExitCodes::CONFIG_ERROR, "No log directory"))?;
                std::fs::create_dir_all(&dir)?;
                Some(dir)
            } else {
                log.clone()
            };
            let options = MonitorOptions {
                log,
                format: format.map_or_else(|| cli::OutputFormat::for_mode(PipeMode::detect()), Into::into),
                width: width.map(usize::from),
                quiet: cli.quiet,
            };
            monitor(&config, options).await?;
        }
        Commands::Config => {
            let config = load_config(cli)?;
            print!("{}", config.to_toml_string()?);
        }
        Commands::ExitCodes => cli::print_exit_codes(),
    }
    Ok(())
}

fn encode(text: &str, raw: bool, line_ending: LineEnding, format: EncodeFormat) -> io::Result<()> {
    let mut data = SendEncoding::from_flag(!raw).encode(text.as_bytes()).to_vec();
    data.extend_from_slice(settings::LineEnding::from(line_ending).bytes());

    let format = match format {
        EncodeFormat::Hex => BytesFormat::Hex,
        EncodeFormat::Raw => BytesFormat::Raw,
    };
    cli::write_bytes(&data, format, &mut io::stdout().lock())
}

struct MonitorOptions {
    log: Option<PathBuf>,
    format: cli::OutputFormat,
    width: Option<usize>,
    quiet: bool,
}

async fn monitor(config: &AppConfig, options: MonitorOptions) -> anyhow::Result<()> {
    let run_loop = RunLoop::new();
    let console = Console::new(run_loop.handle(), config.console.metrics());
    console.set_auto_scroll(config.console.auto_scroll);
    if let Some(width) = options.width {
        console.on_resize(width);
    }

    let mut session = TerminalSession::new(console, config.display.clone());
    session.set_line_ending(config.sending.line_ending);
    session.set_auto_reply(&config.auto_reply);

    if let Some(path) = &options.log {
        let path = if path.is_dir() {
            path.join(generate_log_filename("byteterm"))
        } else {
            path.clone()
        };
        let sink = FileLogSink::open(&path).context("Starting log")?;
        session.start_log(Box::new(sink), config.logging.mode);
    }

    let mut writer = ConsoleWriter::new(options.format);
    let mut stdin = tokio::io::stdin();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    tracing::debug!(format = ?writer.format(), "Monitoring stdin");

    loop {
        let n = stdin.read(&mut buffer).await.context("Reading stdin")?;
        if n == 0 {
            break;
        }

        for reply in session.receive(&buffer[..n]) {
            // stdin has no write side
            tracing::info!(reply = %hex::encode_upper(&reply), "Auto-reply not sent");
        }

        run_loop.run_until_idle();
        writer.write_new(&session.console().renderer(), &mut io::stdout().lock())?;
    }

    if !options.quiet {
        let message = if session.console().last_added_was_newline() {
            "[stdin] End of input"
        } else {
            "\n[stdin] End of input"
        };
        session.print(message, ColorClass::Meta);
    }
    session.stop_log();
    if let Some(status) = session.log_status() {
        tracing::warn!(status, "Log incomplete");
    }

    run_loop.run_until_idle();
    writer.write_new(&session.console().renderer(), &mut io::stdout().lock())?;

    let counters = session.counters();
    tracing::debug!(rx = counters.rx, tx = counters.tx, "Monitor finished");
    io::stdout().flush()?;
    Ok(())
}
