//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use portal_pptx::DeckOutline;
use portal_records::{MemoryRecordStore, RecordStore};
use portal_report::{parse_range, DriveSettings, GeneratedReport, ReportCompiler, UploadOutcome};
use portal_server::state::{open_drive, open_store};
use portal_server::ServerConfig;

/// Output format for `inspect`
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "portal")]
#[command(author, version, about = "Department activity reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP report service
    Serve {
        /// Configuration file (defaults to ./portal.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overriding config and PORTAL_ADDR
        #[arg(long)]
        addr: Option<String>,
    },

    /// Generate a report offline
    Generate {
        /// First day of the period (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        start: String,

        /// Last day of the period, inclusive
        #[arg(long)]
        end: String,

        /// JSON fixture to read records from instead of the configured store
        #[arg(short, long)]
        records: Option<PathBuf>,

        /// Output file (defaults to the report file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also upload to Google Drive
        #[arg(long)]
        upload: bool,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the slide outline of a PPTX file
    Inspect {
        /// Input PPTX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// Loads `.env`, sets up logging, then dispatches to the chosen command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is normal
    let _ = dotenvy::dotenv();
    init_tracing();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match cli.command {
        Commands::Serve { config, addr } => runtime.block_on(serve_command(config.as_deref(), addr))?,
        Commands::Generate {
            start,
            end,
            records,
            output,
            upload,
            config,
        } => {
            let config = ServerConfig::resolve(config.as_deref()).context("Failed to load configuration")?;
            let report = runtime.block_on(generate_command(
                &config,
                &start,
                &end,
                records.as_deref(),
                upload,
            ))?;
            let output = output.unwrap_or_else(|| PathBuf::from(&report.file_name));
            write_report(&report, &output)?;
        }
        Commands::Inspect { input, format } => {
            inspect_command(&input, format)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` filter, `info` by default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Already installed when called twice (tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Execute the serve command
pub async fn serve_command(config: Option<&Path>, addr: Option<String>) -> Result<()> {
    let mut config = ServerConfig::resolve(config).context("Failed to load configuration")?;
    if let Some(addr) = addr {
        config.server.addr = addr;
    }

    portal_server::serve(config).await.context("Report service failed")
}

/// Execute the generate command
///
/// Without `upload` the drive step is disabled and reported as such.
pub async fn generate_command(
    config: &ServerConfig,
    start: &str,
    end: &str,
    records: Option<&Path>,
    upload: bool,
) -> Result<GeneratedReport> {
    let range = parse_range(Some(start), Some(end)).context("Invalid report period")?;
    info!(start, end, upload, "Generating report");

    let store: Arc<dyn RecordStore> = match records {
        Some(path) => Arc::new(
            MemoryRecordStore::from_json_file(path)
                .with_context(|| format!("Failed to load records: {}", path.display()))?,
        ),
        None => open_store(config).await.context("Failed to open record store")?,
    };

    let mut compiler = ReportCompiler::new(store, config.report_config());
    if upload {
        compiler = compiler.with_drive_settings(config.drive.settings());
        if let Some(drive) = open_drive(config) {
            compiler = compiler.with_drive(drive);
        }
    } else {
        compiler = compiler.with_drive_settings(DriveSettings::disabled());
    }

    let report = compiler.generate(&range).await.context("Failed to generate report")?;
    info!(
        file = %report.file_name,
        bytes = report.bytes.len(),
        total_items = report.summary.total_items,
        "Report generated"
    );
    match &report.upload {
        UploadOutcome::Success(result) => info!(file_id = %result.file_id, "Report uploaded"),
        UploadOutcome::Failed { error } if upload => warn!(%error, "Report not uploaded"),
        UploadOutcome::Failed { .. } => {}
    }
    Ok(report)
}

/// Write the deck and print the summary
pub fn write_report(report: &GeneratedReport, output: &Path) -> Result<()> {
    fs::write(output, &report.bytes)
        .with_context(|| format!("Failed to write report: {}", output.display()))?;

    println!("Wrote {} ({} bytes)", output.display(), report.bytes.len());
    println!("Summary: {}", report.summary.to_header_json());
    match &report.upload {
        UploadOutcome::Success(result) => {
            println!("Uploaded: {} ({})", result.file_id, result.web_view_link);
        }
        UploadOutcome::Failed { error } => println!("Upload: {}", error),
    }
    Ok(())
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, format: OutputFormat) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let outline = DeckOutline::from_file(input)
        .with_context(|| format!("Failed to read PPTX file: {}", input.display()))?;
    print!("{}", render_outline(&outline, format)?);
    Ok(())
}

/// Format an outline for printing
pub fn render_outline(outline: &DeckOutline, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(outline).context("Failed to serialize outline to JSON")?;
            Ok(format!("{}\n", json))
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for slide in &outline.slides {
                out.push_str(&format!(
                    "Slide {}: {}\n",
                    slide.number,
                    slide.title.as_deref().unwrap_or("(untitled)")
                ));
                if let Some(subtitle) = &slide.subtitle {
                    out.push_str(&format!("  {}\n", subtitle));
                }
                for paragraph in &slide.paragraphs {
                    out.push_str(&format!("  - {}\n", paragraph));
                }
                for table in &slide.tables {
                    for row in table {
                        out.push_str(&format!("  | {} |\n", row.join(" | ")));
                    }
                }
            }
            Ok(out)
        }
    }
}
