// src/build/trigger.rs

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::Result;

/// Everything needed to invoke one build.
///
/// Immutable once constructed. The argument list is fixed per session:
/// every triggered build is a full rebuild of the same target, never
/// parameterized by which files changed. The environment is snapshotted at
/// construction so the build always sees the environment the watcher was
/// started with.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project_dir: PathBuf,
    pub args: Vec<String>,
    pub environment: Vec<(String, String)>,
}

impl BuildRequest {
    pub fn new(project_dir: PathBuf, args: Vec<String>) -> Self {
        Self {
            project_dir,
            args,
            environment: std::env::vars().collect(),
        }
    }
}

/// Outcome of one build invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failed(i32),
}

impl BuildOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, BuildOutcome::Success)
    }
}

/// Trait abstracting how a build is run.
///
/// Production code uses [`ProcessBuildTrigger`]; tests can provide their own
/// implementation that doesn't spawn real processes.
///
/// Implementations are stateless with respect to serialization: the
/// orchestrator guarantees `run` is never called again while a previous
/// call has not returned.
pub trait BuildTrigger: Send {
    fn run<'a>(
        &'a mut self,
        request: &'a BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + 'a>>;
}

/// Real build trigger used in production: spawns the configured build
/// program and blocks until it exits.
#[derive(Debug, Clone)]
pub struct ProcessBuildTrigger {
    program: String,
}

impl ProcessBuildTrigger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run_inner(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        info!(
            program = %self.program,
            args = ?request.args,
            dir = ?request.project_dir,
            "starting build"
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&request.args)
            .current_dir(&request.project_dir)
            .env_clear()
            .envs(request.environment.iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning build process '{}'", self.program))?;

        // Stream build output through the logs; stderr at debug so a
        // chatty build tool doesn't drown the watcher's own output.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let reader = BufReader::new(stdout);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!("build: {}", line);
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("build stderr: {}", line);
                }
            });
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for build process '{}'", self.program))?;

        let code = status.code().unwrap_or(-1);
        let outcome = if status.success() {
            BuildOutcome::Success
        } else {
            BuildOutcome::Failed(code)
        };

        info!(exit_code = code, success = status.success(), "build finished");
        Ok(outcome)
    }
}

impl BuildTrigger for ProcessBuildTrigger {
    fn run<'a>(
        &'a mut self,
        request: &'a BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + 'a>> {
        Box::pin(self.run_inner(request))
    }
}
