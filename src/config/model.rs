// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// url = "http://localhost:8090"
/// username = "admin"
/// password = "admin"
///
/// [plugin]
/// name = "my-plugin"
///
/// [build]
/// command = "./gradlew"
/// args = ["build"]
///
/// [watch]
/// poll_interval_ms = 2000
/// quiet_period_ms = 500
///
/// [[watch.target]]
/// name = "java-source"
/// dirs = ["src/main"]
/// exclude = ["**/src/main/resources/console/**"]
/// ```
///
/// Everything except `[plugin]` is optional and has reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Target service connection from `[server]`.
    #[serde(default)]
    pub server: ServerSection,

    /// The plugin being developed, from `[plugin]`.
    pub plugin: PluginSection,

    /// Build invocation from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Watcher behaviour and targets from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[server]` section: where the running target service lives and how to
/// authenticate against its API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_server_url")]
    pub url: String,

    #[serde(default = "default_credential")]
    pub username: String,

    #[serde(default = "default_credential")]
    pub password: String,
}

fn default_server_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_credential() -> String {
    "admin".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            username: default_credential(),
            password: default_credential(),
        }
    }
}

/// `[plugin]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginSection {
    /// Logical name of the plugin whose reload is requested after each
    /// successful build. Stable for the lifetime of a watch session.
    pub name: String,
}

/// `[build]` section.
///
/// The argument list is fixed: every triggered build is a full rebuild of
/// the same target, regardless of which files changed.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_build_command")]
    pub command: String,

    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

fn default_build_command() -> String {
    "./gradlew".to_string()
}

fn default_build_args() -> Vec<String> {
    vec!["build".to_string()]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            command: default_build_command(),
            args: default_build_args(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Time between poll snapshots, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Quiet time without further changes required before a rebuild, in
    /// milliseconds.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// Compare blake3 content fingerprints instead of mtime+size, so that
    /// touching a file without changing it does not trigger a rebuild.
    #[serde(default)]
    pub fingerprint: bool,

    /// Named watch targets from `[[watch.target]]`.
    ///
    /// When empty, a default target covering `src/main` (minus the
    /// generated console assets) is synthesized at session resolution.
    #[serde(default, rename = "target")]
    pub targets: Vec<WatchTargetConfig>,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_quiet_period_ms() -> u64 {
    500
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            quiet_period_ms: default_quiet_period_ms(),
            fingerprint: false,
            targets: Vec::new(),
        }
    }
}

/// One `[[watch.target]]` entry: a named set of root directories plus
/// exclude patterns.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchTargetConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Directories to watch, relative to the project root.
    pub dirs: Vec<String>,

    /// Glob patterns excluded from watching, matched relative to a watch
    /// root. The default exclude set is always added on top of these.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl WatchTargetConfig {
    /// The target synthesized when the config declares no `[[watch.target]]`:
    /// the main source tree, minus the generated console assets subtree.
    pub fn default_target() -> Self {
        Self {
            name: Some("source".to_string()),
            dirs: vec!["src/main".to_string()],
            exclude: vec!["**/src/main/resources/console/**".to_string()],
        }
    }
}
