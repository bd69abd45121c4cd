use crate::{
    config::Config,
    poll::{ScanSupervisor, SystemClock, Tick},
    quarantine,
    report::ScanRunReport,
    service::{HttpScanService, ScanService, ScanType},
    store::ResultStore,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "scanwatch")]
#[command(about = "Console client for the antivirus scan service (scans, results, quarantine)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./scanwatch.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the backend is reachable and healthy.
    Doctor {},
    /// Start a directory scan and watch it to completion.
    Scan {
        /// Directory path on the backend host to scan.
        #[arg(long)]
        dir: String,
        /// quick, full or custom; defaults to [scan].default_type.
        #[arg(long)]
        scan_type: Option<String>,
        /// Start the scan and print its id without polling.
        #[arg(long)]
        no_watch: bool,
    },
    /// One-shot status query for a scan.
    Status {
        #[arg(long)]
        scan_id: String,
    },
    /// Fetch the result entries of a completed scan.
    Results {
        #[arg(long)]
        scan_id: String,
    },
    /// List past scans.
    History {},
    /// Show dashboard statistics.
    Stats {},
    /// Manage quarantined files.
    Quarantine {
        #[command(subcommand)]
        cmd: QuarantineCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuarantineCommand {
    List {},
    Restore {
        #[arg(long)]
        id: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg).as_deref())?;

    let service = HttpScanService::new(&cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&service),
        Command::Scan {
            dir,
            scan_type,
            no_watch,
        } => scan(&cfg, &service, dir, scan_type.as_deref(), *no_watch),
        Command::Status { scan_id } => status(&service, scan_id),
        Command::Results { scan_id } => results(&service, scan_id),
        Command::History {} => history(&service),
        Command::Stats {} => stats(&service),
        Command::Quarantine { cmd } => match cmd {
            QuarantineCommand::List {} => quarantine_list(&service),
            QuarantineCommand::Restore { id } => quarantine_restore(&service, id),
            QuarantineCommand::Delete { id } => quarantine_delete(&service, id),
        },
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("scanwatch.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("scanwatch.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("scanwatch.log"))
}

fn doctor(service: &HttpScanService) -> Result<()> {
    let health = service.health().with_context(|| "backend health check")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "base_url": service.base_url(),
            "health": health,
        }))?
    );
    Ok(())
}

fn scan(
    cfg: &Config,
    service: &HttpScanService,
    dir: &str,
    scan_type: Option<&str>,
    no_watch: bool,
) -> Result<()> {
    let raw_type = scan_type.unwrap_or(cfg.scan.default_type.as_str());
    let scan_type =
        ScanType::parse(raw_type).ok_or_else(|| anyhow!("unknown scan type: {raw_type}"))?;

    let started = service
        .start_scan(dir, scan_type)
        .with_context(|| format!("starting scan of {dir}"))?;
    info!("scan started id={} dir={dir}", started.scan_id);

    if no_watch {
        println!("{}", serde_json::to_string_pretty(&started)?);
        return Ok(());
    }

    let mut store = ResultStore::new();
    let mut supervisor = ScanSupervisor::new();
    let mut poll = supervisor.activate(service, &cfg.polling, &started.scan_id);

    match poll.run(&mut store, &SystemClock) {
        Tick::Finished(terminal) => {
            let report = ScanRunReport::from_terminal(&terminal, store.results(), poll.polls_issued());

            if cfg.output.write_report_json {
                let path = report_path(cfg, &report.scan_id);
                if let Some(parent) = path.parent() {
                    ensure_dir(parent)?;
                }
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)
                    .with_context(|| format!("writing report: {}", path.display()))?;
                info!("report written to {}", path.display());
            }

            if cfg.output.print_summary {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            if !terminal.completed() {
                return Err(anyhow!("scan {} failed on the server", report.scan_id));
            }
            Ok(())
        }
        Tick::Aborted(err) => Err(err).with_context(|| "polling aborted"),
        Tick::Cancelled => Err(anyhow!("scan polling was cancelled")),
        Tick::Pending(_) | Tick::Deferred(_) | Tick::Settled => {
            Err(anyhow!("poll loop stopped without a terminal outcome"))
        }
    }
}

fn report_path(cfg: &Config, scan_id: &str) -> PathBuf {
    if !cfg.output.report_path.is_empty() {
        return PathBuf::from(&cfg.output.report_path);
    }
    PathBuf::from(format!("scan-{scan_id}.json"))
}

fn status(service: &HttpScanService, scan_id: &str) -> Result<()> {
    let job = service
        .scan_status(scan_id)
        .with_context(|| format!("status of scan {scan_id}"))?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

fn results(service: &HttpScanService, scan_id: &str) -> Result<()> {
    let entries = service
        .scan_results(scan_id)
        .with_context(|| format!("results of scan {scan_id}"))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "scan_id": scan_id,
            "count": entries.len(),
            "results": entries,
        }))?
    );
    Ok(())
}

fn history(service: &HttpScanService) -> Result<()> {
    let scans = service.scan_history().with_context(|| "scan history")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "scans": scans }))?
    );
    Ok(())
}

fn stats(service: &HttpScanService) -> Result<()> {
    let stats = service
        .dashboard_stats()
        .with_context(|| "dashboard stats")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn quarantine_list(service: &HttpScanService) -> Result<()> {
    let items = service.quarantine_list().with_context(|| "quarantine list")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "count": items.len(),
            "quarantine_items": items,
        }))?
    );
    Ok(())
}

fn quarantine_restore(service: &HttpScanService, id: &str) -> Result<()> {
    let mut store = ResultStore::new();
    let report = quarantine::restore(service, &mut store, id)
        .with_context(|| format!("restoring quarantine entry {id}"))?;
    print_action(&report, "restored", &store)
}

fn quarantine_delete(service: &HttpScanService, id: &str) -> Result<()> {
    let mut store = ResultStore::new();
    let report = quarantine::delete(service, &mut store, id)
        .with_context(|| format!("deleting quarantine entry {id}"))?;
    print_action(&report, "deleted", &store)
}

fn print_action(
    report: &quarantine::ActionReport,
    action: &str,
    store: &ResultStore,
) -> Result<()> {
    let refresh_failures: Vec<String> = report
        .refresh_errors
        .iter()
        .map(|(section, err)| format!("{}: {err}", section.name()))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "quarantine_id": report.quarantine_id,
            "action": action,
            "quarantine_remaining": store.quarantine().len(),
            "refresh_failures": refresh_failures,
        }))?
    );
    Ok(())
}
