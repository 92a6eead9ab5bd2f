//! # awardbook-cli
//!
//! Command-line interface for exploring government contract award
//! workbooks: summary metrics, filtered table views, CSV export, filter
//! option lists, and aggregate chart generation.

use anyhow::{Context, Result};
use awardbook_explorer::{explore_bytes, FilterSpec, MergedTable};
use awardbook_viz::{top_naics, vendors_by_domain, vendors_by_pool, TOP_NAICS_DEFAULT};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// awardbook - search, filter, and visualize contract award workbooks
#[derive(Parser)]
#[command(name = "awardbook")]
#[command(author, version, about = "Explore contract award workbooks", long_about = None)]
struct Cli {
    /// Workbook file (.xlsx) to load
    #[arg(value_name = "WORKBOOK")]
    workbook: PathBuf,

    /// Substring search over vendor, UEI, and contract number
    #[arg(short, long)]
    search: Option<String>,

    /// Restrict to a pool (repeatable)
    #[arg(long = "pool", value_name = "POOL")]
    pools: Vec<String>,

    /// Restrict to a domain (repeatable)
    #[arg(long = "domain", value_name = "DOMAIN")]
    domains: Vec<String>,

    /// Restrict to a NAICS code (repeatable)
    #[arg(long = "naics", value_name = "NAICS")]
    naics: Vec<String>,

    /// Restrict to a SIN (repeatable)
    #[arg(long = "sin", value_name = "SIN")]
    sins: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print headline metrics for the filtered table
    Summary,
    /// Print the filtered table
    Table {
        /// Maximum number of rows to print
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Write the filtered table as CSV
    Export {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Write the aggregate charts as HTML files
    Charts {
        /// Output directory
        #[arg(long, value_name = "DIR", default_value = "charts")]
        out_dir: PathBuf,

        /// Number of NAICS codes in the top-NAICS chart
        #[arg(long, default_value_t = TOP_NAICS_DEFAULT)]
        top_naics: usize,
    },
    /// Print the filter option lists
    Options,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let bytes = std::fs::read(&cli.workbook)
        .with_context(|| format!("Failed to read workbook: {}", cli.workbook.display()))?;
    // Schema and parse errors surface verbatim; nothing renders on failure
    let table = explore_bytes(&bytes)
        .with_context(|| format!("Failed to load workbook: {}", cli.workbook.display()))?;

    let spec = FilterSpec {
        search: cli.search.clone(),
        pools: cli.pools.clone(),
        domains: cli.domains.clone(),
        naics: cli.naics.clone(),
        sins: cli.sins.clone(),
    };
    let filtered = table.filter(&spec);
    tracing::debug!(
        total = table.row_count(),
        filtered = filtered.row_count(),
        "workbook loaded"
    );

    match cli.command {
        Command::Summary => print_summary(&filtered),
        Command::Table { limit } => print_table(&filtered, limit),
        Command::Export { out } => {
            std::fs::write(&out, filtered.to_csv_string())
                .with_context(|| format!("Failed to write CSV: {}", out.display()))?;
            println!("Wrote {} rows to {}", filtered.row_count(), out.display());
        }
        Command::Charts { out_dir, top_naics: n } => {
            write_charts(&filtered, &out_dir, n)?;
        }
        Command::Options => print_options(&table),
    }

    Ok(())
}

/// Print the headline metric tiles.
fn print_summary(table: &MergedTable) {
    let summary = table.summary();
    println!("{}: {}", "Rows".cyan().bold(), summary.rows);
    println!("{}: {}", "Unique Vendors".cyan().bold(), summary.unique_vendors);
    println!("{}: {}", "Unique NAICS Codes".cyan().bold(), summary.unique_naics);
    println!("{}: {}", "Pools".cyan().bold(), summary.unique_pools);
}

/// Print the display-column view, padded per column.
fn print_table(table: &MergedTable, limit: usize) {
    let view = table.display_view();
    let Some(names) = view.column_names() else {
        println!("(empty table)");
        return;
    };

    let shown = view.row_count().min(limit);
    let mut widths: Vec<usize> = names.iter().map(String::len).collect();
    for row in view.rows().take(shown) {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.as_str().len());
            }
        }
    }

    let header: Vec<String> = names
        .iter()
        .zip(widths.iter().copied())
        .map(|(name, w)| format!("{name:w$}"))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in view.rows().take(shown) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, w)| format!("{:w$}", cell.as_str()))
            .collect();
        println!("{}", cells.join("  "));
    }

    if view.row_count() > shown {
        println!("... {} more rows", view.row_count() - shown);
    }
}

/// Write the three aggregate charts into a directory.
fn write_charts(table: &MergedTable, out_dir: &Path, naics_count: usize) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;

    let charts = [
        ("vendors_per_pool.html", vendors_by_pool(table)),
        ("top_naics.html", top_naics(table, naics_count)),
        ("domains.html", vendors_by_domain(table)),
    ];
    for (file_name, chart) in charts {
        let path = out_dir.join(file_name);
        std::fs::write(&path, chart.to_html())
            .with_context(|| format!("Failed to write chart: {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Print the distinct values backing each filter facet.
fn print_options(table: &MergedTable) {
    for facet in ["Pool", "Domain", "NAICS", "SIN"] {
        let values = table.distinct_values(facet);
        println!("{} ({}):", facet.cyan().bold(), values.len());
        for value in values {
            println!("  {value}");
        }
    }
}
