use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use wonder_registry::catalog;
use wonder_registry::error::WonderError;
use wonder_registry::harvest::{self, HarvestOptions, HarvestSummary};
use wonder_registry::output::{JsonOutput, OutputMode};
use wonder_registry::probe::WonderHttpClient;
use wonder_registry::progress::TracingSink;
use wonder_registry::report;
use wonder_registry::scan::{self, ScanOptions};
use wonder_registry::store::Store;

#[derive(Parser)]
#[command(name = "wonder-registry")]
#[command(about = "Registry builder for CDC WONDER datasets (scan endpoints, classify topics, harvest links)")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Probe controller endpoints and write the dataset map")]
    Scan(ScanArgs),
    #[command(about = "Classify mapped datasets into health topics")]
    Catalog,
    #[command(about = "Crawl the static pages and harvest dataset links")]
    Harvest(HarvestArgs),
    #[command(about = "Show the stored classification grouped by topic")]
    Report,
}

#[derive(Args)]
struct ScanArgs {
    #[arg(long, default_value_t = 1)]
    start: u32,

    #[arg(long, default_value_t = 200)]
    end: u32,

    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct HarvestArgs {
    #[arg(long, default_value_t = 120)]
    max_pages: usize,

    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(wonder) = report.downcast_ref::<WonderError>() {
            return ExitCode::from(map_exit_code(wonder));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &WonderError) -> u8 {
    match error {
        WonderError::MissingDatasetMap(_)
        | WonderError::MissingTaxonomy(_)
        | WonderError::MissingTopicsMapping(_)
        | WonderError::StoreRead { .. }
        | WonderError::StoreParse { .. }
        | WonderError::InvalidDatasetId(_) => 2,
        WonderError::WonderHttp(_) | WonderError::TooManyRedirects(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let store = Store::new().into_diagnostic()?;

    match cli.command {
        Some(Commands::Scan(args)) => run_scan(args, store, output_mode),
        Some(Commands::Catalog) => run_catalog(store, output_mode),
        Some(Commands::Harvest(args)) => run_harvest(args, store, output_mode),
        Some(Commands::Report) => run_report(store, output_mode),
        None => Err(miette::Report::msg(
            "command required (try `wonder-registry --help`)",
        )),
    }
}

fn run_scan(args: ScanArgs, store: Store, output_mode: OutputMode) -> miette::Result<()> {
    if args.start < 1 || args.end < args.start {
        return Err(miette::Report::msg(
            "scan range must satisfy 1 <= start <= end",
        ));
    }
    let options = ScanOptions {
        start: args.start,
        end: args.end,
        ..ScanOptions::default()
    };
    let out_path = args.out.unwrap_or_else(|| store.dataset_map_path());

    let client = WonderHttpClient::new().into_diagnostic()?;
    let rows = match output_mode {
        OutputMode::NonInteractive => scan::map_range(&client, &options, &JsonOutput),
        OutputMode::Interactive => scan::map_range(&client, &options, &TracingSink),
    };
    Store::write_dataset_map(&out_path, &rows).into_diagnostic()?;

    let summary = scan::summarize(&rows, out_path.to_string());
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_scan(&summary).into_diagnostic(),
        OutputMode::Interactive => {
            println!(
                "Wrote {} rows to {}",
                summary.probed, summary.dataset_map_path
            );
            println!(
                "{} resolved to static pages, {} errors",
                summary.resolved, summary.errors
            );
            Ok(())
        }
    }
}

fn run_catalog(store: Store, output_mode: OutputMode) -> miette::Result<()> {
    let rows = Store::read_dataset_map(&store.dataset_map_path()).into_diagnostic()?;
    let taxonomy = Store::read_taxonomy(&store.taxonomy_path()).into_diagnostic()?;

    let (mappings, unmapped) = catalog::catalog_datasets(&rows, &taxonomy);
    let summary_text = report::render_summary(&mappings, &unmapped);
    let document = report::build_topics_mapping(mappings, unmapped);
    Store::write_topics_mapping(&store.topics_mapping_path(), &document).into_diagnostic()?;

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_catalog(&document).into_diagnostic(),
        OutputMode::Interactive => {
            print!("{summary_text}");
            print!("{}", report::render_by_topic(&document));
            Ok(())
        }
    }
}

fn run_harvest(args: HarvestArgs, store: Store, output_mode: OutputMode) -> miette::Result<()> {
    let options = HarvestOptions {
        max_pages: args.max_pages,
        ..HarvestOptions::default()
    };
    let out_path = args.out.unwrap_or_else(|| store.link_harvest_path());

    let client = WonderHttpClient::new().into_diagnostic()?;
    let (links, visited) = match output_mode {
        OutputMode::NonInteractive => harvest::crawl(&client, &options, &JsonOutput),
        OutputMode::Interactive => harvest::crawl(&client, &options, &TracingSink),
    };

    if !links.is_empty() {
        Store::write_link_harvest(&out_path, &links).into_diagnostic()?;
    }

    let summary = HarvestSummary {
        pages_visited: visited,
        links_recorded: links.len(),
        link_harvest_path: out_path.to_string(),
    };
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_harvest(&summary).into_diagnostic(),
        OutputMode::Interactive => {
            if links.is_empty() {
                println!("No rows to write.");
            } else {
                println!(
                    "Wrote {} rows to {}",
                    summary.links_recorded, summary.link_harvest_path
                );
            }
            Ok(())
        }
    }
}

fn run_report(store: Store, output_mode: OutputMode) -> miette::Result<()> {
    let document = Store::read_topics_mapping(&store.topics_mapping_path()).into_diagnostic()?;

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_report(&document).into_diagnostic(),
        OutputMode::Interactive => {
            print!("{}", report::render_by_topic(&document));
            Ok(())
        }
    }
}
