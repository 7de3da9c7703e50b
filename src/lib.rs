// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod reload;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::build::{BuildOutcome, BuildRequest, BuildTrigger, ProcessBuildTrigger};
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::ConfigFile;
use crate::engine::{LoopEvent, WatchOrchestrator, WatchSession};
use crate::errors::{ReplugError, Result};
use crate::reload::{ReloadClient, ReloadNotifier};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - watch session resolution
/// - build trigger + reload client
/// - the watch orchestrator
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let project_dir = config_root_dir(&config_path);

    if args.dry_run {
        let session = WatchSession::resolve(&project_dir, &cfg)?;
        print_dry_run(&cfg, &session);
        return Ok(());
    }

    let request = BuildRequest::new(project_dir.clone(), cfg.build.args.clone());
    let builder = ProcessBuildTrigger::new(cfg.build.command.clone());
    let notifier = Arc::new(ReloadClient::new(&cfg.server)?);
    let target = cfg.plugin.name.clone();

    if args.once {
        return run_once(builder, notifier, &target, &request).await;
    }

    let session = WatchSession::resolve(&project_dir, &cfg)?;

    // Loop event channel: one deferred change-set plus a shutdown request.
    let (loop_tx, loop_rx) = mpsc::channel::<LoopEvent>(2);

    // Ctrl-C → graceful shutdown.
    {
        let tx = loop_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(LoopEvent::ShutdownRequested).await;
        });
    }

    let orchestrator = WatchOrchestrator::new(session, request, target, builder, notifier);
    orchestrator.run(loop_tx, loop_rx).await
}

/// Single-shot mode: initialize, build once, reload once, exit.
///
/// Unlike the watch loop, a failed build here fails the process: there is
/// no further edit coming to fix it.
async fn run_once<B: BuildTrigger, N: ReloadNotifier>(
    mut builder: B,
    notifier: Arc<N>,
    target: &str,
    request: &BuildRequest,
) -> Result<()> {
    if let Err(err) = notifier.initialize().await {
        warn!(error = %err, "initialize request failed");
    }

    match builder.run(request).await? {
        BuildOutcome::Success => {
            if let Err(err) = notifier.reload(target).await {
                warn!(target = %target, error = %err, "reload notification failed");
            }
            info!(target = %target, "single-shot build and reload finished");
            Ok(())
        }
        BuildOutcome::Failed(code) => Err(ReplugError::BuildFailed(code)),
    }
}

/// Figure out a sensible project root for watching and building.
///
/// - If the config path has a non-empty parent (e.g. "configs/Replug.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Replug.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print the resolved session and build invocation.
fn print_dry_run(cfg: &ConfigFile, session: &WatchSession) {
    println!("replug dry-run");
    println!("  server.url = {}", cfg.server.url);
    println!("  plugin.name = {}", cfg.plugin.name);
    println!("  build: {} {:?}", cfg.build.command, cfg.build.args);
    println!(
        "  poll_interval = {:?}, quiet_period = {:?}, fingerprint = {}",
        session.poll_interval, session.quiet_period, session.fingerprint
    );
    println!();

    println!("watch roots ({}):", session.roots.len());
    for root in &session.roots {
        println!("  - {}", root.display());
    }

    println!("effective excludes ({}):", session.filter.patterns().len());
    for pattern in session.filter.patterns() {
        println!("  - {pattern}");
    }
}
