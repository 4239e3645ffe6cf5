//! Plan Projection CLI
//!
//! Command-line interface for projecting a business plan document

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use plan_projection::plan::load_plan;
use plan_projection::projection::{IrrConfig, ProjectCalendar};
use plan_projection::scenario::KpiSubset;
use plan_projection::valuation::InsightThresholds;
use plan_projection::{
    BusinessPlan, ProjectionConfig, ProjectionEngine, ProjectionResult, SensitivityRequest,
    SensitivityRunner,
};

#[derive(Parser)]
#[command(
    name = "plan-projection",
    version,
    about = "Multi-year projection and valuation of a business plan"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a plan and print statements, KPIs and insights
    Run {
        /// Assumption document (JSON)
        plan: PathBuf,

        /// Directory for income_statement.csv, cash_flow.csv and monthly.csv
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Perturb one numeric assumption by +/- a percentage
    Sensitivity {
        /// Assumption document (JSON)
        plan: PathBuf,

        /// Path to the varied field, e.g. recoverableClients[0].priorRevenue
        #[arg(long)]
        path: String,

        /// Variation in percent
        #[arg(long, default_value_t = 10.0)]
        variation: f64,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Write the demo plan document
    Sample {
        /// Destination file, stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Args)]
struct TuningArgs {
    /// Convergence tolerance of the IRR solver
    #[arg(long, default_value_t = 1e-7)]
    irr_tolerance: f64,

    /// Iteration budget of the IRR solver
    #[arg(long, default_value_t = 100)]
    irr_max_iterations: u32,

    /// Straight-line amortization window for investments, in years
    #[arg(long, default_value_t = 5)]
    amortization_years: u32,

    /// Collection minus payment days that triggers the cash-cycle insight
    #[arg(long, default_value_t = 30.0)]
    cash_cycle_gap_days: f64,

    /// Personnel share of revenue (percent) that triggers the cost-structure insight
    #[arg(long, default_value_t = 50.0)]
    personnel_cost_ratio: f64,
}

impl TuningArgs {
    fn config(&self) -> ProjectionConfig {
        ProjectionConfig {
            amortization_years: self.amortization_years,
            irr: IrrConfig {
                tolerance: self.irr_tolerance,
                max_iterations: self.irr_max_iterations,
                ..Default::default()
            },
            insights: InsightThresholds {
                cash_cycle_gap_days: self.cash_cycle_gap_days,
                personnel_cost_ratio: self.personnel_cost_ratio / 100.0,
            },
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { plan, csv_dir, tuning } => {
            let document = load_plan(&plan)
                .with_context(|| format!("Failed to load plan {}", plan.display()))?;
            let currency = document.general.currency.clone();
            let calendar = ProjectCalendar::new(&document.general);
            let result = ProjectionEngine::new(document, tuning.config())
                .run()
                .context("Projection failed")?;

            match cli.output {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => print_projection(&result, &calendar, &currency),
            }

            if let Some(dir) = csv_dir {
                write_csv(&dir, &result)?;
                println!("\nCSV files written to {}", dir.display());
            }
        }
        Commands::Sensitivity { plan, path, variation, tuning } => {
            let document = load_plan(&plan)
                .with_context(|| format!("Failed to load plan {}", plan.display()))?;
            let request = SensitivityRequest {
                path,
                variation_percent: variation,
            };
            let result = SensitivityRunner::new(tuning.config())
                .run(&document, &request)
                .with_context(|| format!("Sensitivity on {} failed", request.path))?;

            match cli.output {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => {
                    println!(
                        "Sensitivity: {} = {} (+/-{}%)",
                        result.path, result.base_value, result.variation_percent
                    );
                    println!(
                        "{:<12} {:>12} {:>16} {:>10} {:>16} {:>10}",
                        "Scenario", "Value", "EV", "IRR", "Peak funding", "Payback"
                    );
                    println!("{}", "-".repeat(81));
                    for (name, value, subset) in [
                        ("Pessimistic", result.pessimistic_value, &result.pessimistic),
                        ("Base", result.base_value, &result.base),
                        ("Optimistic", result.optimistic_value, &result.optimistic),
                    ] {
                        print_subset(name, value, subset);
                    }
                }
            }
        }
        Commands::Sample { out } => {
            let json = serde_json::to_string_pretty(&BusinessPlan::sample())?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Unable to write {}", path.display()))?;
                    println!("Sample plan written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

fn print_projection(result: &ProjectionResult, calendar: &ProjectCalendar, currency: &str) {
    let starts: Vec<String> = calendar
        .fiscal_years()
        .iter()
        .map(|year| calendar.label(year.first_month))
        .collect();

    println!("Income statement ({}):", currency);
    println!(
        "{:>4} {:>8} {:>14} {:>14} {:>14} {:>14} {:>12} {:>14}",
        "Year", "Starts", "Revenue", "Costs", "EBITDA", "EBIT", "Taxes", "Net profit"
    );
    println!("{}", "-".repeat(101));
    for row in &result.income_statement {
        let start = (row.year as usize)
            .checked_sub(1)
            .and_then(|i| starts.get(i))
            .map_or("", String::as_str);
        println!(
            "{:>4} {:>8} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>12.2} {:>14.2}",
            row.year,
            start,
            row.total_revenue,
            row.total_costs(),
            row.ebitda,
            row.ebit,
            row.taxes,
            row.net_profit,
        );
    }

    println!("\nCash flow ({}):", currency);
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Year", "Operating", "Investing", "Financing", "Net", "Ending cash"
    );
    println!("{}", "-".repeat(79));
    for row in &result.cash_flow {
        println!(
            "{:>4} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            row.year,
            row.operating_cash_flow,
            row.investing_cash_flow,
            row.financing_cash_flow,
            row.net_cash_flow,
            row.ending_cash,
        );
    }

    let kpis = &result.kpis;
    println!("\nKPIs:");
    println!("  Enterprise value:     {}", fmt_amount(kpis.enterprise_value));
    println!("  IRR:                  {}", fmt_rate(kpis.irr));
    println!("  NPV:                  {}", fmt_amount(kpis.npv));
    println!("  Peak funding:         {:.2}", kpis.peak_funding_requirement);
    match &kpis.lowest_cash {
        Some(low) => println!("  Lowest cash:          {:.2} (month {})", low.value, low.month),
        None => println!("  Lowest cash:          n/a"),
    }
    match kpis.break_even_month {
        Some(month) => println!("  Break-even month:     {}", month),
        None => println!("  Break-even month:     n/a"),
    }
    match kpis.payback_period_years {
        Some(years) => println!("  Payback period:       {:.2} years", years),
        None => println!("  Payback period:       n/a"),
    }

    if !result.insights.is_empty() {
        println!("\nInsights:");
        for insight in &result.insights {
            println!(
                "  [{:?}] {}: {}",
                insight.severity, insight.title, insight.description
            );
        }
    }
}

fn print_subset(name: &str, value: f64, subset: &KpiSubset) {
    println!(
        "{:<12} {:>12} {:>16} {:>10} {:>16} {:>10}",
        name,
        value,
        fmt_amount(subset.enterprise_value),
        fmt_rate(subset.irr),
        fmt_amount(subset.peak_funding_requirement),
        subset.payback_period_years.map_or("n/a".to_string(), |y| format!("{:.2}y", y)),
    );
}

fn fmt_amount(value: Option<f64>) -> String {
    value.map_or("n/a".to_string(), |v| format!("{:.2}", v))
}

fn fmt_rate(value: Option<f64>) -> String {
    value.map_or("n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn write_csv(dir: &Path, result: &ProjectionResult) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Unable to create {}", dir.display()))?;

    write_rows(&dir.join("income_statement.csv"), &result.income_statement)?;
    write_rows(&dir.join("cash_flow.csv"), &result.cash_flow)?;
    write_rows(&dir.join("monthly.csv"), &result.monthly)?;
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
