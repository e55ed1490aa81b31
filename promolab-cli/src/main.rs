//! PromoLab CLI: analyze, describe, and synth commands.
//!
//! Commands:
//! - `analyze`: run the full promotion analysis on a campaign CSV
//! - `describe`: print the descriptive tables only
//! - `synth`: write a seeded synthetic campaign CSV

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use promolab_core::data::{generate_campaign, SyntheticConfig};
use promolab_core::describe::{describe, Description};
use promolab_core::{load_csv, save_csv, Promotion, SignificanceLevel};
use promolab_runner::{
    export_group_summary_csv, run_analysis, save_report, AnalysisConfig, GatingMode,
    ReportFormat,
};

#[derive(Parser)]
#[command(
    name = "promolab",
    about = "PromoLab CLI: promotion A/B test analysis"
)]
struct Cli {
    /// Enable trace-level logging on stderr.
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run normality, variance, and group comparison checks on a campaign CSV.
    Analyze {
        /// Campaign CSV. Falls back to `data` in the config file.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Path to a TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Significance level, overrides the config.
        #[arg(long)]
        alpha: Option<f64>,

        /// Gating mode, overrides the config.
        #[arg(long, value_enum)]
        gating: Option<GatingArg>,

        /// Report format.
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,

        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip pairwise post-hoc comparisons.
        #[arg(long, default_value_t = false)]
        no_posthoc: bool,
    },
    /// Print descriptive tables for a campaign CSV.
    Describe {
        #[arg(long)]
        data: PathBuf,

        /// Also write the sales-by-promotion summary as CSV.
        #[arg(long)]
        summary_csv: Option<PathBuf>,
    },
    /// Generate a synthetic campaign CSV.
    Synth {
        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 10)]
        markets: u32,

        /// Additive sales effect for a promotion, e.g. `1=5.0`. Repeatable.
        #[arg(long = "effect", value_parser = parse_effect)]
        effects: Vec<(Promotion, f64)>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GatingArg {
    Advisory,
    Enforced,
}

impl From<GatingArg> for GatingMode {
    fn from(arg: GatingArg) -> Self {
        match arg {
            GatingArg::Advisory => GatingMode::Advisory,
            GatingArg::Enforced => GatingMode::Enforced,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Markdown,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn parse_effect(s: &str) -> Result<(Promotion, f64), String> {
    let (p, delta) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PROMOTION=DELTA, got '{s}'"))?;
    let p: u8 = p
        .trim()
        .parse()
        .map_err(|e| format!("invalid promotion '{p}': {e}"))?;
    let delta: f64 = delta
        .trim()
        .parse()
        .map_err(|e| format!("invalid effect '{delta}': {e}"))?;
    Ok((Promotion(p), delta))
}

/// Initialize the stderr subscriber. `RUST_LOG` applies unless `--debug`
/// forces trace level.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Analyze {
            data,
            config,
            alpha,
            gating,
            format,
            output,
            no_posthoc,
        } => run_analyze(data, config, alpha, gating, format, output, no_posthoc),
        Commands::Describe { data, summary_csv } => run_describe(&data, summary_csv.as_deref()),
        Commands::Synth {
            output,
            seed,
            markets,
            effects,
        } => run_synth(&output, seed, markets, effects),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    data: Option<PathBuf>,
    config_path: Option<PathBuf>,
    alpha: Option<f64>,
    gating: Option<GatingArg>,
    format: FormatArg,
    output: Option<PathBuf>,
    no_posthoc: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_file(&path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(alpha) = alpha {
        config.alpha = SignificanceLevel::new(alpha)?;
    }
    if let Some(gating) = gating {
        config.gating = gating.into();
    }
    if no_posthoc {
        config.posthoc = false;
    }

    let Some(data_path) = data.or_else(|| config.data.clone()) else {
        bail!("no input: pass --data or set `data` in the config file");
    };
    let dataset = load_csv(&data_path)
        .with_context(|| format!("failed to load campaign data from {}", data_path.display()))?;
    let report = run_analysis(&dataset, &config)?;

    let format = ReportFormat::from(format);
    match output {
        Some(path) => {
            save_report(&report, format, &path)?;
            println!("Report saved to: {}", path.display());
        }
        None => print!("{}", format.render(&report)?),
    }
    Ok(())
}

fn print_description(d: &Description) {
    println!("Rows: {}", d.rows);
    println!();
    println!(
        "{:<18} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for c in &d.columns {
        let std = c.std.map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
        println!(
            "{:<18} {:>6} {:>9.3} {:>9} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
            c.column, c.count, c.mean, std, c.min, c.q25, c.median, c.q75, c.max
        );
    }

    println!();
    println!("Sales by promotion");
    for g in &d.by_promotion {
        println!(
            "  {}: count = {}, mean = {:.2}, sum = {:.2}",
            g.promotion, g.count, g.mean, g.sum
        );
    }

    println!();
    println!("Sales by market size and promotion");
    for g in &d.by_market_size_and_promotion {
        let size = g.market_size.map_or("-", |m| m.as_str());
        println!(
            "  {:<6} {}: count = {}, mean = {:.2}, sum = {:.2}",
            size, g.promotion, g.count, g.mean, g.sum
        );
    }

    for (title, counts) in [
        ("MarketSize", &d.market_size_counts),
        ("AgeOfStore", &d.age_of_store_counts),
        ("Promotion", &d.promotion_counts),
    ] {
        println!();
        println!("{title} counts");
        for v in counts {
            println!("  {:<8} {}", v.value, v.count);
        }
    }

    println!();
    println!("Sum of MarketID by promotion x market size");
    let header: Vec<String> = d
        .market_id_pivot
        .columns
        .iter()
        .map(|m| format!("{:>8}", m.as_str()))
        .collect();
    println!("  {:<9} {}", "promotion", header.join(" "));
    for (promotion, row) in &d.market_id_pivot.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|c| c.map_or_else(|| format!("{:>8}", "-"), |v| format!("{v:>8}")))
            .collect();
        println!("  {:<9} {}", promotion, cells.join(" "));
    }
}

fn run_describe(data: &Path, summary_csv: Option<&Path>) -> Result<()> {
    let dataset = load_csv(data)
        .with_context(|| format!("failed to load campaign data from {}", data.display()))?;
    let description = describe(dataset.observations());
    print_description(&description);

    if let Some(path) = summary_csv {
        let csv = export_group_summary_csv(&description.by_promotion)?;
        std::fs::write(path, csv)
            .with_context(|| format!("failed to write summary CSV: {}", path.display()))?;
        println!();
        println!("Summary saved to: {}", path.display());
    }
    Ok(())
}

fn run_synth(output: &Path, seed: u64, markets: u32, effects: Vec<(Promotion, f64)>) -> Result<()> {
    if markets == 0 {
        bail!("--markets must be at least 1");
    }
    let mut config = SyntheticConfig {
        seed,
        markets,
        ..SyntheticConfig::default()
    };
    for (promotion, delta) in effects {
        config = config.with_effect(promotion, delta);
    }
    let observations = generate_campaign(&config);
    save_csv(output, &observations)?;
    println!(
        "Wrote {} observations ({} markets, seed {}) to {}",
        observations.len(),
        markets,
        seed,
        output.display()
    );
    Ok(())
}
