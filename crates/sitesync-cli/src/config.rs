//! Environment-driven configuration.
//!
//! Behavior is fully determined by the environment (optionally seeded from
//! a `.env` file) plus the state of the build output and mirror
//! directories; there are no interactive flags.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sitesync_remote::RemoteConfig;
use sitesync_sync::{RetryPolicy, SyncOptions};

/// Settings handed to the notification collaborator.
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub from: String,
    pub to: String,
    pub subject: String,
}

/// Full run configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Present once `REMOTE_HOST` is set. Commands that never connect
    /// (such as a dry run) work without it.
    pub remote: Option<RemoteConfig>,
    /// Checkout the pull/install/build steps run in.
    pub repo_dir: PathBuf,
    /// Build output tree to deploy.
    pub build_dir: PathBuf,
    /// Mirror of the last successful deployment.
    pub mirror_dir: PathBuf,
    pub pull_command: String,
    pub install_command: String,
    pub build_command: String,
    pub sync: SyncOptions,
    pub notify: Option<NotifyConfig>,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Once `REMOTE_HOST` is set, `REMOTE_USER` and `REMOTE_PASSWORD` are
    /// required too; everything else has a default. Whether remote
    /// settings must be present at all is the command's call, via
    /// [`Config::require_remote`].
    pub fn from_env() -> Result<Self> {
        let repo_dir = PathBuf::from(var_or("REPO_DIR", "./repo"));
        let build_dir = var("BUILD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| repo_dir.join("public"));

        let remote = match var("REMOTE_HOST") {
            Some(host) => Some(RemoteConfig {
                host,
                port: parsed("REMOTE_PORT", 21)?,
                user: required("REMOTE_USER")?,
                password: required("REMOTE_PASSWORD")?,
                secure: bool_var("REMOTE_SECURE")?,
                root: var_or("REMOTE_ROOT", ""),
            }),
            None => None,
        };

        let sync = SyncOptions {
            max_in_flight: parsed("SYNC_MAX_IN_FLIGHT", 4)?,
            op_timeout: Duration::from_secs(parsed("SYNC_OP_TIMEOUT_SECS", 30)?),
            retry: RetryPolicy {
                max_attempts: parsed("SYNC_RETRY_ATTEMPTS", 3)?,
                ..RetryPolicy::default()
            },
        };

        let notify = match (var("NOTIFY_FROM"), var("NOTIFY_TO")) {
            (Some(from), Some(to)) => Some(NotifyConfig {
                from,
                to,
                subject: var_or("NOTIFY_SUBJECT", "sitesync deployment"),
            }),
            _ => None,
        };

        Ok(Self {
            remote,
            repo_dir,
            build_dir,
            mirror_dir: PathBuf::from(var_or("MIRROR_DIR", "./mirror")),
            pull_command: var_or("PULL_COMMAND", "git pull"),
            install_command: var_or("INSTALL_COMMAND", "npm install"),
            build_command: var_or("BUILD_COMMAND", "npx gatsby build"),
            sync,
            notify,
        })
    }

    /// Remote settings for commands that open a connection.
    pub fn require_remote(&self) -> Result<&RemoteConfig> {
        self.remote.as_ref().context("REMOTE_HOST must be set")
    }
}

/// A set, non-empty environment variable.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

fn required(key: &str) -> Result<String> {
    var(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn bool_var(key: &str) -> Result<bool> {
    match var(key).as_deref() {
        None => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => bail!("{key} must be a boolean, got {other:?}"),
    }
}
