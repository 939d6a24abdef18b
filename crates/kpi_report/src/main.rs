mod config;
mod render;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use chrono::Local;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use kpi_engine::aggregator::KpiAggregator;
use kpi_engine::period::ReportingPeriod;
use record_store::assignment::assign_batch;
use record_store::assignment::technician_roster;
use record_store::extractor::Document;
use record_store::extractor::extract_batch;
use record_store::extractor::plan_assignments;
use record_store::generative::GenerativeExtractor;
use record_store::sheet::SheetClient;
use record_store::snapshot::SnapshotStore;
use record_store::store::RecordStore;
use record_store::store::fetch_snapshots;
use serde::Serialize;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use work_order_records::history::HistoryRecord;
use work_order_records::history::Uploader;
use work_order_records::search::search;
use work_order_records::technician::BoardViewer;
use work_order_records::technician::technician_board;
use work_order_records::work_order::PlanningRecord;
use work_order_records::work_order::retain_valid_planning;

use crate::config::API_KEY_VARIABLE;
use crate::config::ReportConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Maintenance work-order indicators")]
struct Cli
{
    /// JSON file with `kpi`, `store` and `extractor` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command
{
    /// Aggregate the planning and history sheets for a reporting period.
    Report(ReportArgs),
    /// Read scanned work orders and turn them into assignment drafts.
    Extract(ExtractArgs),
    /// Planned orders a supervisor or technician has on their board.
    Board(BoardArgs),
    /// Free-text search over the planning and history sheets.
    Search(SearchArgs),
}

/// Where the sheets come from: the spreadsheet script or exported JSON files.
#[derive(Args, Debug)]
struct SourceArgs
{
    /// URL of the spreadsheet script. Overrides the config file.
    #[arg(long, conflicts_with_all = ["planning", "history", "users"])]
    endpoint: Option<String>,

    /// Exported planning sheet.
    #[arg(long, requires = "history")]
    planning: Option<PathBuf>,

    /// Exported history sheet.
    #[arg(long, requires = "planning")]
    history: Option<PathBuf>,

    /// Exported users sheet, used to match extracted technician names.
    #[arg(long, requires = "planning")]
    users: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs
{
    #[command(flatten)]
    source: SourceArgs,

    /// this_week, this_month, last_month, this_year or all.
    #[arg(long, default_value = "this_month")]
    period: ReportingPeriod,

    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ExtractArgs
{
    #[command(flatten)]
    source: SourceArgs,

    /// PDFs or photographs of work orders.
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Send every complete draft to the planning sheet.
    #[arg(long)]
    assign: bool,

    /// Also log each document as a history entry registered by this user.
    #[arg(long, value_name = "NAME")]
    log_as: Option<String>,
}

#[derive(Args, Debug)]
struct BoardArgs
{
    #[command(flatten)]
    source: SourceArgs,

    /// Show this technician's board instead of the supervisor's.
    #[arg(long, value_name = "NAME")]
    technician: Option<String>,

    /// Order numbers to hide. Repeatable.
    #[arg(long, value_name = "ORDER")]
    archived: Vec<String>,

    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct SearchArgs
{
    #[command(flatten)]
    source: SourceArgs,

    query: String,

    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct SearchResults<'a>
{
    planning: Vec<&'a PlanningRecord>,
    history: Vec<&'a HistoryRecord>,
}

#[derive(Debug, ValueEnum, Clone, Copy, Eq, PartialEq)]
enum OutputFormat
{
    Human,
    Json,
}

fn main() -> Result<()>
{
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReportConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ReportConfig::default(),
    };

    match cli.command {
        Command::Report(args) => report(&config, args),
        Command::Extract(args) => extract(&config, args),
        Command::Board(args) => board(&config, args),
        Command::Search(args) => search_sheets(&config, args),
    }
}

fn open_store(config: &ReportConfig, source: &SourceArgs) -> Result<Box<dyn RecordStore>>
{
    if let (Some(planning), Some(history)) = (&source.planning, &source.history) {
        let mut store = SnapshotStore::from_files(planning, history);
        if let Some(users) = &source.users {
            store = store.with_users_file(users);
        }
        return Ok(Box::new(store));
    }

    let Some(store_config) = config.store_config(source.endpoint.as_deref()) else {
        bail!("no record store: pass --endpoint, --planning with --history, or a `store` section in --config");
    };
    let client = SheetClient::new(&store_config)?;
    info!(endpoint = %client.endpoint(), "Using spreadsheet script");

    Ok(Box::new(client))
}

fn report(config: &ReportConfig, args: ReportArgs) -> Result<()>
{
    let store = open_store(config, &args.source)?;
    let snapshots = fetch_snapshots(store.as_ref());
    let planning = retain_valid_planning(snapshots.planning);
    info!(planning = planning.len(), history = snapshots.history.len(), period = %args.period, "Aggregating");

    let report = KpiAggregator::new(config.kpi.clone()).aggregate(&planning, &snapshots.history, args.period, Local::now().date_naive());

    match args.format {
        OutputFormat::Human => print!("{}", render::human(&report, args.period)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn extract(config: &ReportConfig, args: ExtractArgs) -> Result<()>
{
    let Some(extractor_config) = config.extractor_config(std::env::var(API_KEY_VARIABLE).ok()) else {
        bail!("no extractor: add an `extractor` section to --config or set {API_KEY_VARIABLE}");
    };
    let extractor = GenerativeExtractor::new(&extractor_config)?;

    let documents = args
        .documents
        .iter()
        .map(|path| Document::from_path(path).with_context(|| format!("reading {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let store = open_store(config, &args.source)?;
    let roster = technician_roster(&store.fetch_users());
    if roster.is_empty() {
        warn!("No technician accounts found, every draft will need a technician");
    }

    let extracted = extract_batch(&extractor, &documents);
    let drafts = plan_assignments(&extracted, &roster);
    println!("{}", serde_json::to_string_pretty(&drafts)?);

    let today = Local::now().date_naive();

    if args.assign {
        let statuses = assign_batch(store.as_ref(), &drafts, today);
        for (draft, status) in drafts.iter().zip(&statuses) {
            println!("{:<16} {status:?}", draft.order_number);
        }
    }

    if let Some(name) = args.log_as {
        let uploader = Uploader {
            username: name.clone(),
            display_name: name,
        };
        for fields in &extracted {
            let outcome = store.log_history(&HistoryRecord::from_extraction(fields, None, &uploader, today));
            if !outcome.is_dispatched() {
                warn!(order = %fields.order_number, ?outcome, "History entry was not sent");
            }
        }
    }

    Ok(())
}

fn board(config: &ReportConfig, args: BoardArgs) -> Result<()>
{
    let store = open_store(config, &args.source)?;
    let planning = retain_valid_planning(store.fetch_planning());

    let viewer = match args.technician {
        Some(name) => BoardViewer::Technician(name),
        None => BoardViewer::Supervisor,
    };
    let archived: HashSet<String> = args.archived.into_iter().collect();
    let rows = technician_board(&planning, &viewer, &archived);

    match args.format {
        OutputFormat::Human => print!("{}", render::board(&rows)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }

    Ok(())
}

fn search_sheets(config: &ReportConfig, args: SearchArgs) -> Result<()>
{
    let store = open_store(config, &args.source)?;
    let snapshots = fetch_snapshots(store.as_ref());
    let planning = retain_valid_planning(snapshots.planning);

    let results = SearchResults {
        planning: search(&planning, &args.query),
        history: search(&snapshots.history, &args.query),
    };

    match args.format {
        OutputFormat::Human => print!("{}", render::search_results(&results.planning, &results.history)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }

    Ok(())
}
