use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use application_tracker::config::{Config, ConfigOverrides};
use application_tracker::notes::{render_notes, IMPORTANT_NOTES};
use application_tracker::output::csv::{export_csv, records_to_csv};
use application_tracker::output::render_json;
use application_tracker::output::table::{
    render_checklist_table, render_stats_table, render_university_progress_table,
    render_university_table,
};
use application_tracker::progress::{
    overall_progress, university_progress, ChecklistState, LoadedProgress, ProgressStore,
    Requirement, SaveAck, UniversityProgress,
};
use application_tracker::university::{
    load_universities, unique_categories, unique_programs, ApplicationStats, BuiltinSource,
    Category, CsvFileSource, RecordFilter, UniversityRecord,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "application-tracker",
    about = "Track graduate school applications and requirements"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// CSV file to read universities from instead of the built-in table
    #[arg(short, long)]
    data: Option<String>,
    /// Progress snapshot location
    #[arg(long)]
    progress: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(flatten)]
    filter: FilterArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct FilterArgs {
    /// Categories to show, e.g. `self-apply,idp`
    #[arg(long = "category", value_delimiter = ',', global = true)]
    categories: Vec<String>,
    /// Programs to show, e.g. `MS CS`
    #[arg(long = "program", value_delimiter = ',', global = true)]
    programs: Vec<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<RecordFilter> {
        let mut categories = Vec::new();
        for raw in self.categories.iter().filter(|c| !c.trim().is_empty()) {
            let category = Category::from_str(raw)?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        let programs = self
            .programs
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Ok(RecordFilter::new(categories, programs))
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List universities in the filtered view
    Universities,
    /// Show the generic requirements checklist
    Checklist,
    /// Mark a generic requirement as done and save
    Check { key: String },
    /// Mark a generic requirement as not done and save
    Uncheck { key: String },
    /// Set a university-specific stage and save
    Mark {
        university: String,
        field: String,
        #[arg(long)]
        unset: bool,
    },
    /// Show per-university progress for the filtered view
    Progress,
    Stats,
    /// Write the filtered view to a CSV file
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rewrite the progress snapshot from the current state
    Save,
    Notes,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Serialize)]
struct ChecklistReport<'a> {
    requirements_checked: &'a ChecklistState,
    overall_progress: f64,
    last_updated: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UniversityProgressReport<'a> {
    university: &'a str,
    #[serde(flatten)]
    progress: UniversityProgress,
    progress_ratio: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        progress_path: cli.progress.clone(),
        data_source: cli.data.clone(),
    });

    let store = ProgressStore::new(config.resolved_progress_path());

    match &cli.command {
        Commands::Universities => {
            let view = load_view(&cli.filter, &config)?;
            print_universities(&view.all, &view.visible, cli.output)?;
        }
        Commands::Checklist => {
            let loaded = open_progress(&store);
            print_checklist(&loaded.state, loaded.last_updated.as_deref(), cli.output)?;
        }
        Commands::Check { key } | Commands::Uncheck { key } => {
            let value = matches!(cli.command, Commands::Check { .. });
            let requirement = Requirement::from_str(key)?;
            let mut loaded = open_progress(&store);
            loaded.state.set(requirement, value);
            let ack = save_progress(&store, &loaded.state)?;
            print_checklist(&loaded.state, Some(ack.last_updated.as_str()), cli.output)?;
        }
        Commands::Mark {
            university,
            field,
            unset,
        } => {
            let view = load_view(&cli.filter, &config)?;
            let record = find_university(&view.all, university)?;
            let mut loaded = open_progress(&store);
            loaded.state.ensure_university(&record.university);
            loaded
                .state
                .set_university_field(&record.university, field, !unset)?;
            let ack = save_progress(&store, &loaded.state)?;
            print_university_progress(
                &loaded.state,
                std::slice::from_ref(record),
                Some(ack.last_updated.as_str()),
                cli.output,
            )?;
        }
        Commands::Progress => {
            let view = load_view(&cli.filter, &config)?;
            let mut loaded = open_progress(&store);
            for record in &view.visible {
                loaded.state.ensure_university(&record.university);
            }
            print_university_progress(
                &loaded.state,
                &view.visible,
                loaded.last_updated.as_deref(),
                cli.output,
            )?;
        }
        Commands::Stats => {
            let view = load_view(&cli.filter, &config)?;
            print_stats(&ApplicationStats::compute(&view.visible), cli.output)?;
        }
        Commands::Export { out } => {
            let view = load_view(&cli.filter, &config)?;
            let path = out
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            let written = export_csv(&view.visible, &path)?;
            println!(
                "Exported {} universities to {}",
                view.visible.len(),
                written.display()
            );
        }
        Commands::Save => {
            let loaded = open_progress(&store);
            save_progress(&store, &loaded.state)?;
        }
        Commands::Notes => print_notes(cli.output)?,
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

/// Every loaded university plus the rows the category/program filter keeps.
struct UniversityView {
    all: Vec<UniversityRecord>,
    visible: Vec<UniversityRecord>,
}

fn load_view(filter_args: &FilterArgs, config: &Config) -> Result<UniversityView> {
    let filter = filter_args.to_filter()?;
    let all = load_records(config);
    let visible = filter.apply(&all);
    if !filter.is_empty() {
        debug!("filter kept {} of {} universities", visible.len(), all.len());
    }
    Ok(UniversityView { all, visible })
}

fn load_records(config: &Config) -> Vec<UniversityRecord> {
    let result = match config.resolved_data_source() {
        Some(path) => load_universities(&CsvFileSource::new(path)),
        None => load_universities(&BuiltinSource),
    };
    result.unwrap_or_else(|err| {
        warn!("{err}; showing an empty university table");
        Vec::new()
    })
}

fn open_progress(store: &ProgressStore) -> LoadedProgress {
    let loaded = store.initialize();
    if let Some(err) = &loaded.error {
        eprintln!("Warning: {err}. Starting from an empty checklist.");
    }
    loaded
}

fn save_progress(store: &ProgressStore, state: &ChecklistState) -> Result<SaveAck> {
    let ack = store.save(state).context("failed saving progress")?;
    eprintln!(
        "Progress saved to {} at {}",
        ack.path.display(),
        ack.last_updated
    );
    Ok(ack)
}

fn find_university<'a>(records: &'a [UniversityRecord], name: &str) -> Result<&'a UniversityRecord> {
    let wanted = name.trim();
    records
        .iter()
        .find(|r| r.university == wanted)
        .or_else(|| {
            records
                .iter()
                .find(|r| r.university.eq_ignore_ascii_case(wanted))
        })
        .ok_or_else(|| anyhow!("unknown university: {name}"))
}

fn print_universities(
    all: &[UniversityRecord],
    visible: &[UniversityRecord],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_university_table(visible));
            let categories = unique_categories(all)
                .iter()
                .map(|c| c.as_slug())
                .collect::<Vec<_>>()
                .join(", ");
            let programs = unique_programs(all).join(", ");
            println!(
                "Showing {} of {} universities. Categories: {categories}. Programs: {programs}.",
                visible.len(),
                all.len()
            );
        }
        OutputFormat::Json => println!("{}", render_json(visible)?),
        OutputFormat::Csv => print!("{}", records_to_csv(visible)?),
    }
    Ok(())
}

fn print_checklist(
    state: &ChecklistState,
    last_updated: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let report = ChecklistReport {
        requirements_checked: state,
        overall_progress: overall_progress(state),
        last_updated,
    };
    match format {
        OutputFormat::Table => println!("{}", render_checklist_table(state, last_updated)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
        OutputFormat::Csv => {
            warn!("CSV output for checklist not implemented, using JSON");
            println!("{}", render_json(&report)?);
        }
    }
    Ok(())
}

fn print_university_progress(
    state: &ChecklistState,
    records: &[UniversityRecord],
    last_updated: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let rows = records
        .iter()
        .map(|record| {
            let progress = state
                .university(&record.university)
                .copied()
                .unwrap_or_default();
            UniversityProgressReport {
                university: &record.university,
                progress,
                progress_ratio: university_progress(&progress),
            }
        })
        .collect::<Vec<_>>();
    match format {
        OutputFormat::Table => println!(
            "{}",
            render_university_progress_table(state, records, last_updated)
        ),
        OutputFormat::Json => println!("{}", render_json(&rows)?),
        OutputFormat::Csv => {
            warn!("CSV output for progress not implemented, using JSON");
            println!("{}", render_json(&rows)?);
        }
    }
    Ok(())
}

fn print_stats(stats: &ApplicationStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_stats_table(stats)),
        OutputFormat::Json => println!("{}", render_json(stats)?),
        OutputFormat::Csv => {
            warn!("CSV output for stats not implemented, using JSON");
            println!("{}", render_json(stats)?);
        }
    }
    Ok(())
}

fn print_notes(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", render_json(&IMPORTANT_NOTES)?),
        OutputFormat::Table | OutputFormat::Csv => println!("{}", render_notes()),
    }
    Ok(())
}
