// tests/run_modes.rs

//! Single-shot and dry-run entry points, end to end against a stub reload
//! endpoint and real (trivial) build commands.

mod common;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use replug::cli::CliArgs;
use replug::errors::ReplugError;

type TestResult = Result<(), Box<dyn Error>>;

/// Minimal HTTP endpoint answering 200 to everything; records request lines
/// so tests can assert which notifications were attempted, and in what
/// order.
async fn spawn_stub_server() -> Result<(String, Arc<Mutex<Vec<String>>>), Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let mut reader = BufReader::new(read_half);
                loop {
                    let mut request_line = String::new();
                    match reader.read_line(&mut request_line).await {
                        Ok(0) | Err(_) => return,
                        Ok(_) => {}
                    }
                    // Drain headers; the notification requests carry no body.
                    loop {
                        let mut header = String::new();
                        match reader.read_line(&mut header).await {
                            Ok(0) | Err(_) => return,
                            Ok(_) if header == "\r\n" || header == "\n" => break,
                            Ok(_) => {}
                        }
                    }
                    log.lock().unwrap().push(request_line.trim().to_string());
                    if write_half
                        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            });
        }
    });

    Ok((base_url, requests))
}

fn write_config(dir: &Path, url: &str, command: &str) -> std::io::Result<PathBuf> {
    let path = dir.join("Replug.toml");
    fs::write(
        &path,
        format!(
            "[server]\nurl = \"{url}\"\n\n\
             [plugin]\nname = \"demo-plugin\"\n\n\
             [build]\ncommand = \"{command}\"\nargs = []\n"
        ),
    )?;
    Ok(path)
}

fn single_shot_args(config: &Path) -> CliArgs {
    CliArgs {
        config: config.to_string_lossy().into_owned(),
        once: true,
        log_level: None,
        dry_run: false,
    }
}

#[tokio::test]
async fn single_shot_success_initializes_builds_and_reloads() -> TestResult {
    common::init_tracing();

    let (url, requests) = spawn_stub_server().await?;
    let project = tempfile::tempdir()?;
    let config = write_config(project.path(), &url, "true")?;

    replug::run(single_shot_args(&config)).await?;

    let seen = requests.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            "POST /apis/api.console.halo.run/v1alpha1/system/initialize HTTP/1.1".to_string(),
            "POST /apis/api.console.halo.run/v1alpha1/plugins/demo-plugin/reload HTTP/1.1"
                .to_string(),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn single_shot_build_failure_is_a_process_failure() -> TestResult {
    common::init_tracing();

    let (url, requests) = spawn_stub_server().await?;
    let project = tempfile::tempdir()?;
    let config = write_config(project.path(), &url, "false")?;

    match replug::run(single_shot_args(&config)).await {
        Err(ReplugError::BuildFailed(code)) => assert_ne!(code, 0),
        other => panic!("expected BuildFailed, got {other:?}"),
    }

    // Initialize was attempted; the reload was not.
    let seen = requests.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("/system/initialize"));

    Ok(())
}

#[tokio::test]
async fn dry_run_resolves_without_building_or_notifying() -> TestResult {
    common::init_tracing();

    let (url, requests) = spawn_stub_server().await?;
    let project = tempfile::tempdir()?;
    fs::create_dir_all(project.path().join("src/main"))?;
    let config = write_config(project.path(), &url, "false")?;

    let mut args = single_shot_args(&config);
    args.once = false;
    args.dry_run = true;
    replug::run(args).await?;

    assert!(requests.lock().unwrap().is_empty());

    Ok(())
}

#[test]
fn config_path_defaults_to_replug_toml() -> TestResult {
    let args = CliArgs::try_parse_from(["replug"])?;
    assert_eq!(args.config, "Replug.toml");
    assert!(!args.once);
    assert!(!args.dry_run);

    Ok(())
}
