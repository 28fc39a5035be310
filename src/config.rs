use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Built-in fallback port, matching the original `PORT:-8000` default.
const DEFAULT_PORT: &str = "8000";
/// Built-in fallback for extra backend server arguments.
const DEFAULT_EXTRA_ARGS: &str = "--timeout 180";

const DEFAULT_BACKEND_PROGRAM: &str = "gunicorn";
const DEFAULT_BACKEND_APP_MODULE: &str = "paypal_project.wsgi:application";
const DEFAULT_FRONTEND_PROGRAM: &str = "streamlit";
const DEFAULT_FRONTEND_ENTRY_FILE: &str = "streamlit_chatbot.py";

/// Which of the two long-running processes the launcher starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Backend,
    Frontend,
}

impl LaunchTarget {
    /// Resolve the target from the raw selector value.
    ///
    /// Exactly `"frontend"` selects the dashboard; unset, empty, or any
    /// other value selects the backend. Never an error.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("frontend") => LaunchTarget::Frontend,
            _ => LaunchTarget::Backend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchTarget::Backend => "backend",
            LaunchTarget::Frontend => "frontend",
        }
    }
}

impl std::fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment inputs, captured once at startup.
///
/// Resolution functions take this snapshot instead of reading the process
/// environment directly so tests never have to mutate env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub run_target: Option<String>,
    pub port: Option<String>,
    pub gunicorn_cmd_args: Option<String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            run_target: std::env::var("RUN_TARGET").ok(),
            port: std::env::var("PORT").ok(),
            gunicorn_cmd_args: std::env::var("GUNICORN_CMD_ARGS").ok(),
        }
    }
}

/// CLI-level overrides. Flags beat environment variables, which beat the
/// config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target: Option<String>,
    pub port: Option<String>,
    pub gunicorn_args: Option<String>,
    pub default_port: Option<String>,
}

/// Backend (WSGI server) command shape.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct BackendSection {
    pub program: Option<String>,
    pub app_module: Option<String>,
    pub default_extra_args: Option<String>,
}

/// Frontend (dashboard) command shape.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct FrontendSection {
    pub program: Option<String>,
    pub entry_file: Option<String>,
}

/// Raw TOML file structure for `~/.config/runway/config.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Fallback port used when neither `--port` nor `PORT` is set.
    /// The original startup scripts shipped in two variants defaulting to
    /// 8000 and 8080; this option covers both.
    pub default_port: Option<String>,
    pub backend: Option<BackendSection>,
    pub frontend: Option<FrontendSection>,
}

/// Fully resolved launcher configuration.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub target: LaunchTarget,
    /// Forwarded verbatim into the bind address; never parsed or validated.
    pub port: String,
    /// Raw extra server arguments, split by shell rules at launch time.
    pub extra_args: String,
    pub backend_program: String,
    pub backend_app_module: String,
    pub frontend_program: String,
    pub frontend_entry_file: String,
}

/// Default config file location.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("runway").join("config.toml"))
}

impl LauncherConfig {
    /// Load configuration from file, environment, and CLI overrides.
    ///
    /// A missing config file is not an error; an existing but unreadable or
    /// unparseable one is.
    pub fn load(config_path: Option<&PathBuf>, overrides: &Overrides) -> Result<Self> {
        let path = config_path.cloned().or_else(default_config_path);

        let file_config = match path {
            Some(ref p) if p.exists() => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config: {}", p.display()))?;
                toml::from_str::<ConfigFile>(&content)
                    .with_context(|| format!("failed to parse config: {}", p.display()))?
            }
            _ => ConfigFile::default(),
        };

        Ok(Self::build(file_config, &EnvSnapshot::capture(), overrides))
    }

    /// Build config from parsed file values, an environment snapshot, and
    /// CLI overrides. Total: every field has a default.
    pub fn build(file: ConfigFile, env: &EnvSnapshot, overrides: &Overrides) -> Self {
        let backend = file.backend.unwrap_or_default();
        let frontend = file.frontend.unwrap_or_default();

        let target = LaunchTarget::resolve(
            overrides.target.as_deref().or(env.run_target.as_deref()),
        );

        let default_port = overrides
            .default_port
            .clone()
            .or(file.default_port)
            .unwrap_or_else(|| DEFAULT_PORT.to_string());

        let port = overrides
            .port
            .clone()
            .or_else(|| env.port.clone())
            .unwrap_or(default_port);

        let extra_args = overrides
            .gunicorn_args
            .clone()
            .or_else(|| env.gunicorn_cmd_args.clone())
            .or(backend.default_extra_args)
            .unwrap_or_else(|| DEFAULT_EXTRA_ARGS.to_string());

        Self {
            target,
            port,
            extra_args,
            backend_program: backend
                .program
                .unwrap_or_else(|| DEFAULT_BACKEND_PROGRAM.to_string()),
            backend_app_module: backend
                .app_module
                .unwrap_or_else(|| DEFAULT_BACKEND_APP_MODULE.to_string()),
            frontend_program: frontend
                .program
                .unwrap_or_else(|| DEFAULT_FRONTEND_PROGRAM.to_string()),
            frontend_entry_file: frontend
                .entry_file
                .unwrap_or_else(|| DEFAULT_FRONTEND_ENTRY_FILE.to_string()),
        }
    }
}
