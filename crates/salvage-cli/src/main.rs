mod commands;
mod logging;
mod menu;
mod progress;
mod render;

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, CompareWith, RecoverCommand};
use dotenv::dotenv;
use menu::Menu;
use progress::CliReporter;
use salvage_core::analysis::{build_conflict_groups, build_content_groups, build_presence_table};
use salvage_core::config::load_configuration;
use salvage_core::report::{
    write_conflicts, write_duplicates, write_merge_audit, write_presence, write_report_file,
    CONFLICTS_CSV, DUPLICATES_CSV, PRESENCE_CSV,
};
use salvage_core::snapshot::{recover_file, recover_folder, recover_named, RecoveryReport};
use salvage_core::{
    merge_directories, scan_locations, AppConfig, FileFilter, Inventory, MergeRequest,
    TimestampSource,
};
use tracing::{debug, error, info, warn};

const CONFLICT_SAMPLE: usize = 10;

fn main() {
    dotenv().ok();

    let guard = logging::init_logger();

    let args = Cli::parse();

    let config = match load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };
    debug!("config: {:?}", config);

    let result = match args.command {
        Some(Commands::Scan { extension, out_dir }) => run_scan(&config, extension, out_dir),
        Some(Commands::List) => run_list(&config),
        Some(Commands::Merge {
            primary,
            secondary,
            destination,
            compare_with,
            extension,
            report,
        }) => run_merge(
            &config,
            MergeRequest::new(primary, secondary, destination),
            compare_with,
            extension,
            report,
        ),
        Some(Commands::Recover(command)) => run_recover(&config, command),
        Some(Commands::Interactive) => run_interactive(&config),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => Cli::command().print_long_help().map_err(Into::into),
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        drop(guard);
        process::exit(1);
    }
}

fn scan_filter(config: &AppConfig, extension: Option<&str>) -> FileFilter {
    let extension = extension.or(config.extension_filter());
    FileFilter::new(extension, &config.ignore_patterns)
}

fn scan(config: &AppConfig, filter: &FileFilter) -> anyhow::Result<Inventory> {
    if config.locations.is_empty() {
        bail!("No locations configured; add [[locations]] entries to Config.toml");
    }
    let reporter = CliReporter::new();
    let inventory = scan_locations(&config.locations, filter, &reporter);
    for missing in &inventory.missing_locations {
        println!("{} location '{}' does not exist", "Skipped".yellow(), missing);
    }
    Ok(inventory)
}

fn run_scan(
    config: &AppConfig,
    extension: Option<String>,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let filter = scan_filter(config, extension.as_deref());
    let inventory = scan(config, &filter)?;

    let duplicates = build_content_groups(&inventory.records);
    let conflicts = build_conflict_groups(&inventory.records);

    let out_dir = out_dir.unwrap_or_else(|| config.out_dir.clone());
    let duplicates_path = out_dir.join(DUPLICATES_CSV);
    write_report_file(&duplicates_path, |file| write_duplicates(&duplicates, file))
        .with_context(|| format!("writing {}", duplicates_path.display()))?;
    let conflicts_path = out_dir.join(CONFLICTS_CSV);
    write_report_file(&conflicts_path, |file| write_conflicts(&conflicts, file))
        .with_context(|| format!("writing {}", conflicts_path.display()))?;

    println!();
    info!(
        "{} files in {:.2}s: {} duplicate groups, {} path conflicts",
        format!("{}", inventory.records.len()).green(),
        inventory.scan_duration.as_secs_f64(),
        format!("{}", duplicates.len()).cyan(),
        format!("{}", conflicts.len()).red(),
    );

    let mut stdout = io::stdout().lock();
    render::conflict_sample(&mut stdout, &conflicts, CONFLICT_SAMPLE)?;
    render::issues(&mut stdout, &inventory.issues)?;
    println!(
        "Reports written to {} and {}",
        duplicates_path.display(),
        conflicts_path.display()
    );
    Ok(())
}

fn run_list(config: &AppConfig) -> anyhow::Result<()> {
    let filter = scan_filter(config, None);
    let inventory = scan(config, &filter)?;
    let rows = build_presence_table(&config.locations, &inventory);

    let mut stdout = io::stdout().lock();
    render::presence_table(&mut stdout, &config.locations, &rows, None)?;
    render::issues(&mut stdout, &inventory.issues)?;

    let path = config.out_dir.join(PRESENCE_CSV);
    write_report_file(&path, |file| write_presence(&config.locations, &rows, file))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Comparison list written to {}", path.display());
    Ok(())
}

fn run_merge(
    config: &AppConfig,
    request: MergeRequest,
    compare_with: Option<CompareWith>,
    extension: Option<String>,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let timestamp_source = compare_with
        .map(TimestampSource::from)
        .unwrap_or(config.merge.compare_with);
    let request = request
        .with_filter(FileFilter::new(extension.as_deref(), &config.ignore_patterns))
        .with_timestamp_source(timestamp_source);
    info!(
        "Merging {} and {} into {} (secondary compared with {})",
        request.primary.display(),
        request.secondary.display(),
        request.destination.display(),
        timestamp_source.as_str()
    );

    let reporter = CliReporter::new();
    let report = merge_directories(&request, &reporter)?;

    let mut stdout = io::stdout().lock();
    render::merge_audit(&mut stdout, &report.entries)?;
    render::merge_summary(&mut stdout, &report.summary())?;
    render::issues(&mut stdout, &report.issues)?;

    if let Some(path) = report_path {
        write_report_file(&path, |file| write_merge_audit(&report, file))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Merge audit written to {}", path.display());
    }
    Ok(())
}

fn run_recover(config: &AppConfig, command: RecoverCommand) -> anyhow::Result<()> {
    let report = match command {
        RecoverCommand::File { snapshot, output } => {
            let recovered = recover_file(&snapshot, &output)
                .map_err(salvage_core::Error::File)
                .with_context(|| format!("recovering {}", snapshot.display()))?;
            RecoveryReport {
                recovered: vec![recovered],
                issues: Vec::new(),
            }
        }
        RecoverCommand::Folder {
            source,
            destination,
            extension,
        } => {
            let extension = extension
                .as_deref()
                .or(config.extension_filter())
                .unwrap_or("swift")
                .to_string();
            recover_folder(&source, &destination, &extension)?
        }
        RecoverCommand::Latest { destination, names } => {
            if config.recover.cache_dirs.is_empty() {
                bail!("No snapshot caches configured; set recover.cache_dirs");
            }
            let names = if names.is_empty() {
                config.recover.critical_files.clone()
            } else {
                names
            };
            if names.is_empty() {
                bail!("No file names given and recover.critical_files is empty");
            }
            recover_named(&config.recover.cache_dirs, &names, &destination)
        }
    };
    print_recovery(&report)
}

fn print_recovery(report: &RecoveryReport) -> anyhow::Result<()> {
    for recovered in &report.recovered {
        println!(
            "{} {} ({} bytes, {:?})",
            "Recovered:".green(),
            display_relative(&recovered.output),
            recovered.bytes,
            recovered.form
        );
    }
    if report.recovered.is_empty() {
        warn!("Nothing was recovered");
    }
    render::issues(&mut io::stdout().lock(), &report.issues)?;
    info!(
        "{} files recovered, {} skipped",
        format!("{}", report.recovered.len()).green(),
        format!("{}", report.issues.len()).red(),
    );
    Ok(())
}

fn display_relative(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

fn run_interactive(config: &AppConfig) -> anyhow::Result<()> {
    if config.locations.is_empty() {
        bail!("No locations configured; add [[locations]] entries to Config.toml");
    }
    let stdin = io::stdin();
    Menu::new(config, stdin.lock(), io::stdout()).run()?;
    Ok(())
}
