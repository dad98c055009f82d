use std::time::Duration;

use reqwest::Url;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use crate::{
    models::args::{AppArgs, Command},
    remote::retry::RetryPolicy,
    utils::errors::{StateInfoError, StateResult},
};

pub const ENV_HOSTNAME: &str = "TFE_HOSTNAME";
pub const ENV_TOKEN: &str = "TFE_TOKEN";
pub const ENV_ORG_NAME: &str = "TFE_ORG_NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    Normal,
    Debug,
}

impl Verbosity {
    pub fn from_args(args: &AppArgs) -> Self {
        if args.debug {
            Self::Debug
        } else if args.silent {
            Self::Silent
        } else {
            Self::Normal
        }
    }

    pub fn level(&self) -> LevelFilter {
        match self {
            Self::Silent => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Where bulk downloads are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempDirPolicy {
    /// Straight into the working directory.
    Disabled,
    /// A fresh temporary directory for every statefile.
    PerFile,
    /// One temporary directory for the whole run.
    Shared,
}

/// Raw values read from the environment, not yet validated.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    pub hostname: Option<String>,
    pub token: Option<String>,
    pub org: Option<String>,
}

impl EnvSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            hostname: lookup(ENV_HOSTNAME),
            token: lookup(ENV_TOKEN),
            org: lookup(ENV_ORG_NAME),
        }
    }
}

/// Everything a run needs, resolved once up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub address: Url,
    pub token: String,
    pub org: Option<String>,
    pub cleanup: bool,
    pub temp_dir: TempDirPolicy,
    pub verbosity: Verbosity,
    pub retry: RetryPolicy,
}

impl RunConfig {
    pub fn new(settings: EnvSettings, args: &AppArgs) -> StateResult<Self> {
        let hostname = Self::required(ENV_HOSTNAME, settings.hostname)?;
        let token = Self::required(ENV_TOKEN, settings.token)?;
        let address = Self::parse_address(&hostname)?;

        let org = settings.org.filter(|org| !org.is_empty());
        if args.command.needs_org() && org.is_none() {
            return Err(StateInfoError::config(format!(
                "No ENV value for {ENV_ORG_NAME}"
            )));
        }

        let (cleanup, temp_dir) = match &args.command {
            Command::AllStatefilesSize {
                cleanup,
                totmpdir,
                shared_tmpdir,
            } => {
                let policy = match (*totmpdir, *shared_tmpdir) {
                    (false, _) => TempDirPolicy::Disabled,
                    (true, false) => TempDirPolicy::PerFile,
                    (true, true) => TempDirPolicy::Shared,
                };
                (*cleanup, policy)
            }
            _ => (false, TempDirPolicy::Disabled),
        };

        Ok(Self {
            address,
            token,
            org,
            cleanup,
            temp_dir,
            verbosity: Verbosity::from_args(args),
            retry: RetryPolicy::new(args.retries, Duration::from_millis(args.retry_delay_ms)),
        })
    }

    /// Only visible once the logger is installed.
    pub fn log_resolved(&self) {
        debug!(
            "Resolved config for {} (cleanup: {}, temp dir: {:?}, retries: {})",
            self.address, self.cleanup, self.temp_dir, self.retry.max_retries
        );
    }

    pub fn org(&self) -> StateResult<&str> {
        self.org
            .as_deref()
            .ok_or_else(|| StateInfoError::config(format!("No ENV value for {ENV_ORG_NAME}")))
    }

    fn required(key: &str, value: Option<String>) -> StateResult<String> {
        match value {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
            _ => Err(StateInfoError::config(format!("No ENV value for {key}"))),
        }
    }

    fn parse_address(hostname: &str) -> StateResult<Url> {
        let host = hostname
            .strip_prefix("https://")
            .unwrap_or(hostname)
            .trim_end_matches('/');

        let url = Url::parse(&format!("https://{host}"))
            .map_err(|e| StateInfoError::config(format!("Invalid {ENV_HOSTNAME} '{hostname}': {e}")))?;

        if url.host_str().is_none_or(str::is_empty) || url.path() != "/" {
            return Err(StateInfoError::config(format!(
                "Invalid {ENV_HOSTNAME} '{hostname}': expected a bare host name"
            )));
        }

        Ok(url)
    }
}
