// src/main.rs

use anyhow::{Context, Result};
use assortment_planner::config::AppConfig;
use assortment_planner::generator::{generate_candidates, select_top_candidates, GenerationParams};
use assortment_planner::io::{
    catalog_rows, read_candidates, write_candidates, write_catalog, write_result_json,
};
use assortment_planner::logging::{self, Verbosity};
use assortment_planner::model::promote_candidates;
use assortment_planner::planning::{
    rank_by_margin, OptimizationResult, OptimizerConfig, PurchaseOrderOptimizer,
};
use assortment_planner::solver::{CancelToken, SolverEngine};
use assortment_planner::Cancelled;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Exit code for a run interrupted with Ctrl+C.
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "assortment-planner")]
#[command(about = "Generate product candidates and plan purchase orders", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file with rule tables and defaults
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate plausible product candidates and write them to CSV
    #[command(alias = "g")]
    Generate(GenerateArgs),

    /// Plan purchase orders for candidates read from CSV
    #[command(alias = "o")]
    Optimize(OptimizeArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Filter preset (full, medium, aggressive, or one from the config file)
    #[arg(long, default_value = "aggressive")]
    preset: String,

    /// Keep only the N candidates with the highest profit potential (0 keeps all)
    #[arg(long, value_name = "N", conflicts_with = "no_cap")]
    max_candidates: Option<usize>,

    /// Keep every accepted candidate (bounded by generation.materialize_limit)
    #[arg(long)]
    no_cap: bool,

    #[arg(short, long, default_value = "candidates.csv")]
    output: PathBuf,
}

#[derive(Args)]
struct OptimizeArgs {
    /// Candidates CSV produced by `generate`
    candidates: PathBuf,

    /// Rows shown in the console ranking and written to the catalog
    #[arg(long, value_name = "N", default_value_t = 20)]
    top_n: usize,

    /// Optimize only the N candidates with the highest profit potential
    #[arg(long, value_name = "N")]
    prefilter: Option<usize>,

    #[arg(long)]
    budget: Option<f64>,

    #[arg(long, value_name = "M3")]
    warehouse_capacity: Option<f64>,

    #[arg(long, value_name = "MONTHS")]
    planning_months: Option<u32>,

    #[arg(long)]
    demand_multiplier: Option<f64>,

    /// Solver engine: microlp or highs
    #[arg(long)]
    solver: Option<SolverEngine>,

    /// Solver wall-clock limit in seconds
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<u64>,

    /// Write the ranked product catalog as CSV
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Write the full result as JSON
    #[arg(long, value_name = "PATH")]
    results: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };
    logging::init(verbosity);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Generate(args) => generate(&config, args),
        Commands::Optimize(args) => optimize(&config, args),
    }
}

fn generate(config: &AppConfig, args: GenerateArgs) -> Result<ExitCode> {
    let rules = config.business_rules()?;
    let preset = config.presets.get(&args.preset)?;

    let params = GenerationParams {
        max_candidates: if args.no_cap {
            None
        } else {
            Some(args.max_candidates.unwrap_or(config.generation.max_candidates))
        },
        materialize_limit: config.generation.materialize_limit,
        ..GenerationParams::from_preset(preset)
    };
    info!(preset = %args.preset, description = %preset.description, "generating candidates");

    let outcome = generate_candidates(&params, &rules).context("Candidate generation failed")?;
    write_candidates(&args.output, &outcome.candidates)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("=== Candidate Generation ===");
    println!("Combinations evaluated: {}", outcome.total_combinations);
    println!("Passed realism filter:  {}", outcome.accepted);
    println!("Written:                {}", outcome.candidates.len());
    println!("Output:                 {}", args.output.display());
    Ok(ExitCode::SUCCESS)
}

fn optimizer_config(config: &AppConfig, args: &OptimizeArgs) -> OptimizerConfig {
    let mut opt = config.optimizer_config();
    if let Some(budget) = args.budget {
        opt.budget_per_month = budget;
    }
    if let Some(capacity) = args.warehouse_capacity {
        opt.warehouse_capacity_m3 = capacity;
    }
    if let Some(months) = args.planning_months {
        opt.planning_months = months;
    }
    if let Some(multiplier) = args.demand_multiplier {
        opt.demand_multiplier = multiplier;
    }
    if let Some(engine) = args.solver {
        opt.solver = engine;
    }
    if let Some(seconds) = args.time_limit {
        opt.solver_time_limit_seconds = seconds;
    }
    opt
}

fn optimize(config: &AppConfig, args: OptimizeArgs) -> Result<ExitCode> {
    let mut candidates = read_candidates(&args.candidates)
        .with_context(|| format!("Failed to read {}", args.candidates.display()))?;
    if let Some(n) = args.prefilter {
        let before = candidates.len();
        candidates = select_top_candidates(candidates, n);
        info!(before, kept = candidates.len(), "prefiltered by profit potential");
    }
    let products = promote_candidates(
        &candidates,
        config.seasonal_factors(),
        config.forecast_defaults(),
    );

    let opt_config = optimizer_config(config, &args);
    opt_config.validate()?;

    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || handle.cancel()).context("Failed to set Ctrl+C handler")?;

    let optimizer = PurchaseOrderOptimizer::new(opt_config);
    let result = match optimizer.optimize(&products, &cancel) {
        Ok(result) => result,
        Err(Cancelled) => {
            eprintln!("Optimization cancelled; no results written.");
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }
    };

    print_summary(&result, args.top_n);

    if !result.status.has_solution() {
        warn!(status = %result.status, "no purchase plan to export");
        return Ok(ExitCode::FAILURE);
    }
    if let Some(path) = &args.catalog {
        let rows = catalog_rows(&result, &products, Some(args.top_n));
        write_catalog(path, &rows).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = &args.results {
        write_result_json(path, &result)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(result: &OptimizationResult, top_n: usize) {
    println!("=== Purchase Order Optimization ===");
    println!("Status: {}", result.status);
    if let Some(message) = &result.message {
        println!("Message: {}", message);
    }
    println!(
        "Model: {} variables, {} constraints, {:.2}s on {}",
        result.stats.variables,
        result.stats.constraints,
        result.stats.elapsed.as_secs_f64(),
        result.stats.engine
    );
    if !result.status.has_solution() {
        return;
    }
    println!("Net profit: ${:.2}", result.objective_value);

    println!("\n=== Monthly Breakdown ===");
    for (month, breakdown) in &result.monthly_breakdown {
        println!(
            "Month {}: {} items, cost ${:.2}, revenue ${:.2}, shipping ${:.2}, customs ${:.2}, net ${:.2}",
            month,
            breakdown.items_ordered,
            breakdown.product_cost,
            breakdown.product_revenue,
            breakdown.weight_shipping + breakdown.volume_shipping,
            breakdown.customs_duty,
            breakdown.net_profit
        );
    }

    println!("\n=== Top Products by Margin ===");
    for ranked in rank_by_margin(result, Some(top_n)) {
        println!(
            "{} {}: {} units, margin ${:.2}",
            ranked.id, ranked.total.name, ranked.total.total_quantity, ranked.total.total_margin
        );
    }
}
