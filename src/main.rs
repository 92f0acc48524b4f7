use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;
use tracing::info;

use ipes_registry::entity::{extract_dba, is_excluded_filer, normalize};
use ipes_registry::environment::{get_env_var_as_vec, get_env_var_or};
use ipes_registry::filing::{FilterStats, MalformedPolicy};
use ipes_registry::pipeline::{self, ExtractionMeta, PipelineConfig, RunStats, StructureStats};
use ipes_registry::TARGET_PIPELINE;

#[derive(Parser)]
#[command(author, version, about = "Build canonical IPES company records from ECFS filings", long_about = None)]
struct Cli {
    /// Data directory holding raw/ and processed/ (default: $IPES_DATA_DIR or "data")
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Count and skip malformed input lines instead of aborting
    #[arg(long, global = true)]
    skip_malformed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge and dedup query result files into raw/filings_raw.jsonl
    Extract {
        /// Query result file (JSON lines); repeat in query order
        #[arg(short, long = "query")]
        queries: Vec<PathBuf>,
    },

    /// Keep numbering-related filings
    Filter,

    /// Group filings into company records
    Structure,

    /// Run extract, filter and structure in order
    Run {
        /// Query result file (JSON lines); repeat in query order
        #[arg(short, long = "query")]
        queries: Vec<PathBuf>,
    },

    /// Write the document download manifest from companies.json
    Manifest,

    /// Show the equivalence key for one or more filer names
    Normalize {
        /// Filer names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn query_files(queries: Vec<PathBuf>) -> Vec<PathBuf> {
    if !queries.is_empty() {
        return queries;
    }
    get_env_var_as_vec("IPES_QUERY_FILES", ';')
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

fn heading(title: &str) {
    println!("\n{}", "═".repeat(60).bright_blue());
    println!("{}", title.bright_blue());
    println!("{}", "═".repeat(60).bright_blue());
}

fn counter_table(rows: &[(&str, usize)]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Counter"), Cell::new("Value")]));
    for (label, value) in rows {
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&value.to_string()),
        ]));
    }
    table
}

fn print_extraction(meta: &ExtractionMeta) {
    heading("EXTRACTION");
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Query"),
        Cell::new("Fetched"),
        Cell::new("New unique"),
        Cell::new("No submission id"),
    ]));
    for query in &meta.queries {
        table.add_row(Row::new(vec![
            Cell::new(&query.query),
            Cell::new(&query.fetched.to_string()),
            Cell::new(&query.new_unique.to_string()),
            Cell::new(&query.missing_submission_id.to_string()),
        ]));
    }
    table.printstd();
    println!(
        "{} unique filings written to {}",
        meta.total_unique_filings.to_string().bright_green(),
        meta.output_file
    );
}

fn print_filter(stats: &FilterStats) {
    heading("RELEVANCE FILTER");
    counter_table(&[
        ("total_input", stats.total_input),
        ("kept", stats.kept),
        ("dropped", stats.dropped),
    ])
    .printstd();

    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Submission type"), Cell::new("Kept")]));
    for entry in &stats.by_submission_type {
        table.add_row(Row::new(vec![
            Cell::new(&entry.submission_type),
            Cell::new(&entry.count.to_string()),
        ]));
    }
    table.printstd();
}

fn print_structure(stats: &StructureStats) {
    heading("COMPANIES");
    counter_table(&[
        ("total_filings", stats.aggregation.total_filings),
        ("excluded_govt", stats.aggregation.excluded_govt),
        ("excluded_no_filer", stats.aggregation.excluded_no_filer),
        ("missing_submission_type", stats.aggregation.missing_submission_type),
        ("dropped_no_application", stats.aggregation.dropped_no_application),
        ("unique_companies", stats.unique_companies),
        ("companies_with_multiple_apps", stats.companies_with_multiple_apps),
        ("total_documents", stats.total_documents),
    ])
    .printstd();
}

fn print_run(stats: &RunStats) {
    heading("RUN STATISTICS");
    counter_table(&[
        ("total_fetched", stats.total_fetched),
        ("unique_filings", stats.unique_filings),
        ("missing_submission_id", stats.missing_submission_id),
        ("malformed_lines", stats.malformed_lines),
        ("relevant_filings", stats.relevant_filings),
        ("dropped_by_classifier", stats.dropped_by_classifier),
    ])
    .printstd();
    print_structure(&stats.structure);
}

fn print_normalized(names: &[String]) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Name"),
        Cell::new("Equivalence key"),
        Cell::new("DBA"),
        Cell::new("Government"),
    ]));
    for name in names {
        let (_, dba) = extract_dba(name);
        table.add_row(Row::new(vec![
            Cell::new(name),
            Cell::new(&normalize(name)),
            Cell::new(dba.as_deref().unwrap_or("")),
            Cell::new(if is_excluded_filer(name) { "yes" } else { "no" }),
        ]));
    }
    table.printstd();
}

impl Commands {
    /// Pipeline stages log and read the data directory; `normalize` does neither.
    fn is_pipeline_stage(&self) -> bool {
        !matches!(self, Commands::Normalize { .. })
    }
}

fn pipeline_config(data_dir: Option<PathBuf>, skip_malformed: bool) -> PipelineConfig {
    let data_dir =
        data_dir.unwrap_or_else(|| PathBuf::from(get_env_var_or("IPES_DATA_DIR", "data")));
    let policy = if skip_malformed {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Abort
    };
    PipelineConfig::new(data_dir).with_malformed_policy(policy)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = pipeline_config(cli.data_dir, cli.skip_malformed);

    if cli.command.is_pipeline_stage() {
        ipes_registry::logging::configure_logging();
        info!(
            target: TARGET_PIPELINE,
            "Using data directory {}",
            config.data_dir.display()
        );
    }

    match cli.command {
        Commands::Extract { queries } => {
            config.query_files = query_files(queries);
            let (_, meta) = pipeline::extract(&config).context("Extraction failed")?;
            print_extraction(&meta);
        }

        Commands::Filter => {
            let stats = pipeline::filter_from_disk(&config).context("Filtering failed")?;
            print_filter(&stats);
        }

        Commands::Structure => {
            let stats =
                pipeline::structure_from_disk(&config).context("Structuring failed")?;
            print_structure(&stats);
        }

        Commands::Run { queries } => {
            config.query_files = query_files(queries);
            let stats = pipeline::run(&config).context("Pipeline run failed")?;
            print_run(&stats);
            println!(
                "\nCompanies written to {}",
                config.companies_path().display().to_string().bright_green()
            );
        }

        Commands::Manifest => {
            let downloads = pipeline::manifest(&config).context("Manifest failed")?;
            println!(
                "{} documents listed in {}",
                downloads.len().to_string().bright_green(),
                config.manifest_path().display()
            );
        }

        Commands::Normalize { names } => print_normalized(&names),
    }

    Ok(())
}
