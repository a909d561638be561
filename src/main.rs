// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use trade_dashboard::{dollar_scaled, overview, short_usd, DashboardConfig, Dataset, Measure, OverviewQuery, Unit};

#[derive(Parser)]
#[command(name = "trade-dashboard", version, about = "US trade flows by partner and product")]
struct Cli {
    /// JSON config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal dashboard (default)
    Ui,
    /// Print the overview page for one year
    Summary {
        /// Year to summarize (latest year when omitted)
        #[arg(short, long)]
        year: Option<i32>,

        /// Export, Import or "Trade Balance"
        #[arg(short, long, default_value = "Export")]
        measure: Measure,

        /// Emit the full view as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // stdout belongs to the dashboard; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref())?;
    let dataset = Dataset::load(&config)?;

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => run_ui_mode(dataset, &config),
        Command::Summary { year, measure, json } => run_summary(&dataset, &config, year, measure, json),
    }
}

fn run_summary(dataset: &Dataset, config: &DashboardConfig, year: Option<i32>, measure: Measure, json: bool) -> Result<()> {
    let years = dataset.years();
    let year = match year.or_else(|| years.last().copied()) {
        Some(y) => y,
        None => bail!("dataset has no trade rows"),
    };
    if !years.contains(&year) {
        bail!("no trade rows for year {} (available: {:?})", year, years);
    }

    let view = overview(
        dataset,
        &OverviewQuery {
            year,
            measure,
            top_n: config.top_n,
            wrap_width: config.wrap_width,
        },
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("🌎 US Trade {} - {}", view.year, view.measure);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📊 Summary ({} USD)", view.summary.unit.suffix());
    for bar in &view.summary.bars {
        println!("   {:<14} {:>10.2}", bar.category, bar.value);
    }

    println!("\n🏆 {}", view.top_partners_title);
    for row in &view.top_partners {
        println!(
            "   {:>2}. {:<28} {:>12}",
            row.rank,
            row.label,
            short_usd(row.display_value, Unit::Billions, 2)
        );
    }

    println!("\n📦 {}", view.products_title);
    for tile in view.products.iter().take(config.top_n) {
        println!("   {:<40} {:>8.1} B  {:>6.2}%", tile.label, tile.value, tile.share * 100.0);
    }

    let total: f64 = view.choropleth.values.iter().map(|v| v.value).sum();
    println!("\n✓ {} partners, {} total", view.choropleth.values.len(), dollar_scaled(total, 9));
    if !dataset.skipped.is_empty() {
        println!("⚠️  {} rows skipped while loading", dataset.skipped.len());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(dataset: Dataset, config: &DashboardConfig) -> Result<()> {
    let mut app = ui::App::new(dataset, config);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_dataset: Dataset, _config: &DashboardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the summary subcommand / trade-server --features server");
    std::process::exit(1);
}
