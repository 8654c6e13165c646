//! `hound` command-line front end.
//!
//! Results and per-site progress go to stdout; tracing output goes to
//! stderr (`RUST_LOG` overrides the default filter).

use std::path::PathBuf;

use anyhow::{Context, bail};
use hound::{HoundApp, HoundConfig};
use hound_search::{CategoryFilter, HoundEvent, SourceState, SourceStatus};
use tokio::sync::broadcast::error::RecvError;

/// Parsed command line.
struct Args {
    command: Command,
    config: Option<PathBuf>,
}

enum Command {
    Search { query: String, filter: CategoryFilter },
    Sync,
    Sites { filter: CategoryFilter },
    Help,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hound=info,hound_search=info")),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(HoundConfig::default_config_path);
    let config = HoundConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match args.command {
        Command::Search { query, filter } => run_search(&config, &query, filter).await,
        Command::Sync => run_sync(&config).await,
        Command::Sites { filter } => run_sites(&config, &filter),
        Command::Help => {
            print_usage();
            Ok(())
        }
    }
}

fn parse_args(raw: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut config = None;
    let mut filter = CategoryFilter::All;
    let mut positional: Vec<String> = Vec::new();

    let mut raw = raw.peekable();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--category" | "-c" => {
                let value = raw.next().context("--category requires a value")?;
                filter = value.parse()?;
            }
            "--config" => {
                let value = raw.next().context("--config requires a path")?;
                config = Some(PathBuf::from(value));
            }
            "--help" | "-h" => positional.insert(0, "help".into()),
            _ => positional.push(arg),
        }
    }

    let Some((subcommand, rest)) = positional.split_first() else {
        return Ok(Args {
            command: Command::Help,
            config,
        });
    };
    let command = match subcommand.as_str() {
        "search" => {
            let query = rest.join(" ");
            if query.trim().is_empty() {
                bail!("search requires a query");
            }
            Command::Search { query, filter }
        }
        "sync" => Command::Sync,
        "sites" => Command::Sites { filter },
        "help" => Command::Help,
        other => bail!("unknown subcommand `{other}` (use search|sync|sites|help)"),
    };
    Ok(Args { command, config })
}

async fn run_search(config: &HoundConfig, query: &str, filter: CategoryFilter) -> anyhow::Result<()> {
    let app = HoundApp::start(config).await?;
    let mut events = app.subscribe();
    let handle = app.search(query, filter)?;
    println!("searching {} sites ({filter})", handle.sources);

    let mut found = 0usize;
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "output fell behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        if event.generation() != Some(handle.generation) {
            continue;
        }
        match event {
            HoundEvent::SourceSettled {
                status, appended, ..
            } => {
                println!("{}", status_line(&status));
                for result in appended {
                    found += 1;
                    println!("    {}  {}", result.title, result.link);
                }
            }
            HoundEvent::QueryFinished { settled, total, .. } => {
                println!("done: {found} results, {settled}/{total} sites answered");
                break;
            }
            HoundEvent::QueryStarted { .. } | HoundEvent::RegistryReplaced { .. } => {}
        }
    }
    Ok(())
}

async fn run_sync(config: &HoundConfig) -> anyhow::Result<()> {
    let app = HoundApp::new(config)?;
    let report = app.sync_sites().await?;
    println!(
        "registry: {} -> {} sites ({} discovered){}",
        report.before,
        report.after,
        report.discovered,
        if report.persisted { "" } else { ", NOT saved" }
    );
    Ok(())
}

fn run_sites(config: &HoundConfig, filter: &CategoryFilter) -> anyhow::Result<()> {
    let app = HoundApp::new(config)?;
    let sites = app.sites(filter);
    if sites.is_empty() {
        println!("no sites for {filter}");
        return Ok(());
    }
    for site in sites {
        let categories: Vec<&str> = site.categories.iter().map(|c| c.name()).collect();
        println!("{}\t{}\t{}", site.name, site.address, categories.join(","));
    }
    Ok(())
}

fn status_line(status: &SourceStatus) -> String {
    let marker = match status.state {
        SourceState::Loading => "..",
        SourceState::Success => "ok",
        SourceState::Idle => "--",
        SourceState::Blocked => "!!",
        SourceState::Error => "xx",
    };
    match (&status.message, status.state) {
        (Some(message), _) => format!("[{marker}] {} {message}", status.name),
        (None, SourceState::Success) => format!("[{marker}] {} ({})", status.name, status.count),
        (None, _) => format!("[{marker}] {}", status.name),
    }
}

fn print_usage() {
    println!(
        "usage: hound [--config <path>] <command>\n\
         \n\
         commands:\n\
         \x20 search <query> [--category <c>]  search every active site\n\
         \x20 sync                             refresh site addresses from hubs\n\
         \x20 sites [--category <c>]           list known sites\n\
         \x20 help                             show this message\n\
         \n\
         categories: all, international, indian, anime, korean"
    );
}
