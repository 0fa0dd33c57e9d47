use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tabconv::{
    ConversionWorker, ConvertError, Converter, ConverterConfig, Format, OutputSink, WriterSink,
};

/// Rotated log files kept next to the active one
const LOG_BACKUPS: usize = 2;

const LOG_TIME_FORMAT: &str = "Date: %d-%m-%Y Time: %H:%M:%S";

/// Convert tabular data files between CSV, XML, JSON and Markdown
#[derive(Parser)]
#[command(name = "tabconv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file path (TOML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append log records to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Rotate the log file once it reaches this size
    #[arg(long, global = true, value_name = "BYTES", default_value_t = 25 * 1024 * 1024)]
    log_max_bytes: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file; formats are taken from the file extensions
    Convert {
        /// Input file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Read a file and print it as a table
    Preview {
        /// Input file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// List the supported conversions
    Formats,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref(), cli.log_max_bytes)?;

    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else {
        ConverterConfig::default()
    };
    let converter = Converter::with_config(config);

    match cli.command {
        Commands::Convert { input, output } => convert_command(converter, input, output, cli.quiet),
        Commands::Preview { input } => preview_command(&converter, &input),
        Commands::Formats => {
            formats_command(&converter);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Exit status for a failed conversion: 2 when the request itself was
/// wrong, 1 when reading or writing the data failed
fn failure_code(err: &ConvertError) -> ExitCode {
    if err.is_request_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Set up logging based on verbosity flags
///
/// `RUST_LOG` still overrides the level chosen here. With a log file the
/// records go to a size-rotated file instead of stderr.
fn setup_logging(
    verbose: bool,
    quiet: bool,
    log_file: Option<&Path>,
    max_bytes: usize,
) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else if log_file.is_some() {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {} {}",
                Local::now().format(LOG_TIME_FORMAT),
                record.target(),
                record.level(),
                record.args()
            )
        });

    if let Some(path) = log_file {
        if max_bytes == 0 {
            anyhow::bail!("--log-max-bytes must be greater than zero");
        }
        let file = FileRotate::new(
            path,
            AppendCount::new(LOG_BACKUPS),
            ContentLimit::Bytes(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialise logging")?;
    Ok(())
}

/// Load configuration from a file
fn load_config(path: &Path) -> Result<ConverterConfig> {
    let config = ConverterConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration: {}", path.display()))?;
    log::debug!("loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}

/// Execute the convert command on the background worker
///
/// Conversion errors reach the user once: through the output messages, or
/// through the error log when `--quiet` hides those.
fn convert_command(
    converter: Converter,
    input: PathBuf,
    output: PathBuf,
    quiet: bool,
) -> Result<ExitCode> {
    let description = format!("Converting {} to {}", input.display(), output.display());
    let worker = ConversionWorker::new(converter);
    let ticket = worker.submit(input, output)?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(description);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut sink = WriterSink::new(std::io::stdout());
    loop {
        match ticket.messages().recv_timeout(Duration::from_millis(50)) {
            Ok(message) => {
                if !quiet {
                    spinner.suspend(|| sink.append(&message));
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    spinner.finish_and_clear();

    match ticket.join() {
        Ok(report) => {
            log::debug!(
                "wrote {} bytes ({} rows x {} columns) to {}",
                report.bytes_written,
                report.rows,
                report.columns,
                report.output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ConvertError::WorkerPanicked) => {
            Err(ConvertError::WorkerPanicked).context("Conversion failed")
        }
        Err(e) => {
            if quiet {
                log::error!("{}", e);
            }
            Ok(failure_code(&e))
        }
    }
}

/// Execute the preview command
fn preview_command(converter: &Converter, input: &Path) -> Result<ExitCode> {
    let mut sink = WriterSink::new(std::io::stdout());
    match converter.preview(input, &mut sink) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(failure_code(&e)),
    }
}

/// Execute the formats command
fn formats_command(converter: &Converter) {
    println!("=== Supported Conversions ===\n");
    for (from, to) in converter.supported_conversions() {
        println!("  {:<4} -> {}", from.extension(), to.extension());
    }

    println!("\n--- Formats ---");
    for format in Format::ALL {
        println!("  .{:<4} {}", format.extension(), format.description());
    }
}
