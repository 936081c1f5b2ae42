use analyzer::{AnalysisRequest, Analyzer};
use anyhow::Context;
use api_client::YahooClient;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{AnalysisOverrides, Config, load_config};
use reporter::{DisplayTable, SummaryTable, correlation_table, info_table};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The main entry point for the Vantage portfolio analyzer.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(config, args).await,
        Commands::Serve(args) => handle_serve(config, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Portfolio performance statistics for a list of equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices, compute metrics, and write the Excel report and charts.
    Report(ReportArgs),
    /// Serve the interactive analysis page.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    analysis: AnalysisOverrides,

    /// Where to write the Excel workbook.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for the SVG charts.
    #[arg(long)]
    chart_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to listen on (e.g., "127.0.0.1:8080").
    #[arg(long)]
    bind: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn build_analyzer(config: &Config) -> anyhow::Result<Analyzer> {
    let client = Arc::new(
        YahooClient::new(&config.price_source).context("failed to build the HTTP client")?,
    );
    Ok(Analyzer::new(client.clone(), client))
}

/// Runs one batch analysis and writes every artifact.
async fn handle_report(mut config: Config, args: ReportArgs) -> anyhow::Result<()> {
    config.analysis.apply(&args.analysis);
    let workbook_path = args.output.unwrap_or(config.report.workbook_path.clone());
    let chart_dir = args.chart_dir.unwrap_or(config.report.chart_dir.clone());

    let request = AnalysisRequest::from_settings(&config.analysis)?;
    log_report_started(&request);
    println!(
        "Analyzing {} from {} to {}",
        request.symbols.join(", "),
        request.start,
        request.end
    );

    let analyzer = build_analyzer(&config)?.with_progress(true);
    let analysis = analyzer.run(&request).await?;

    reporter::write_workbook(&analysis, &workbook_path)
        .with_context(|| format!("failed to write {}", workbook_path.display()))?;
    let charts = reporter::write_charts(&analysis.report, &chart_dir)
        .with_context(|| format!("failed to write charts to {}", chart_dir.display()))?;

    println!("\nPerformance Summary");
    println!("{}", render(&SummaryTable::from_report(&analysis.report).to_display()));
    println!("\nCorrelation Matrix");
    println!("{}", render(&correlation_table(&analysis.report.correlation)));
    println!("\nStock Info");
    println!("{}", render(&info_table(&analysis.metadata)));

    for warning in &analysis.warnings {
        println!("Warning: {warning}");
    }
    log_report_finished(&workbook_path, charts.len(), analysis.warnings.len());
    println!("\nExcel report generated: {}", workbook_path.display());
    for chart in charts {
        println!("Chart written: {}", chart.display());
    }
    Ok(())
}

async fn handle_serve(config: Config, args: ServeArgs) -> anyhow::Result<()> {
    let addr = args.bind.unwrap_or(config.server.bind_address);
    tracing::info!(%addr, "Starting the analysis web server.");
    let analyzer = build_analyzer(&config)?;
    web_server::run_server(addr, analyzer).await
}

fn log_report_started(request: &AnalysisRequest) {
    tracing::info!(
        symbols = ?request.symbols,
        start = %request.start,
        end = %request.end,
        "Starting batch report."
    );
}

fn log_report_finished(workbook_path: &Path, charts: usize, warnings: usize) {
    tracing::info!(
        workbook = %workbook_path.display(),
        charts,
        warnings,
        "Batch report complete."
    );
}

fn render(table: &DisplayTable) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.headers.clone());
    for row in &table.rows {
        out.add_row(row.clone());
    }
    out
}
