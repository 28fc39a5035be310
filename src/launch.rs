//! Launch plan construction and process handoff.
//!
//! Builds the exact command line for the selected target and replaces the
//! launcher process with it. There is no supervision: after a successful
//! exec the launcher no longer exists, and the child receives host process
//! signals directly.

use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::config::{LaunchTarget, LauncherConfig};

/// The fully resolved command the launcher will hand off to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchPlan {
    /// Build the command line for the configured target.
    ///
    /// Extra server arguments apply only on the backend path and are split
    /// by shell quoting rules; malformed quoting fails here, before any
    /// process starts.
    pub fn build(config: &LauncherConfig) -> Result<Self> {
        match config.target {
            LaunchTarget::Backend => {
                let mut args = vec![
                    config.backend_app_module.clone(),
                    "--bind".to_string(),
                    format!("0.0.0.0:{}", config.port),
                ];
                args.extend(split_extra_args(&config.extra_args)?);
                Ok(Self {
                    program: config.backend_program.clone(),
                    args,
                })
            }
            LaunchTarget::Frontend => Ok(Self {
                program: config.frontend_program.clone(),
                args: vec![
                    "run".to_string(),
                    config.frontend_entry_file.clone(),
                    "--server.port".to_string(),
                    config.port.clone(),
                    "--server.address".to_string(),
                    "0.0.0.0".to_string(),
                ],
            }),
        }
    }

    /// Single-line shell-quoted rendering, used for the startup diagnostic
    /// and `--dry-run` output.
    pub fn rendered(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(words).unwrap_or_else(|_| self.program.clone())
    }

    /// Replace the current process with the planned command.
    ///
    /// On Unix this only returns if the exec itself failed (for example the
    /// executable is missing); success never returns. On other platforms the
    /// child is spawned and waited on, and the launcher exits with the
    /// child's status.
    pub fn exec(&self) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            let err = Command::new(&self.program).args(&self.args).exec();
            Err(err).with_context(|| format!("failed to exec {}", self.program))
        }

        #[cfg(not(unix))]
        {
            let status = Command::new(&self.program)
                .args(&self.args)
                .status()
                .with_context(|| format!("failed to start {}", self.program))?;
            std::process::exit(status.code().unwrap_or(1));
        }
    }
}

/// Split a raw extra-argument string into argv entries by shell rules.
fn split_extra_args(raw: &str) -> Result<Vec<String>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    match shlex::split(raw) {
        Some(words) => Ok(words),
        None => bail!("malformed quoting in extra server arguments: {raw}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, EnvSnapshot, Overrides};

    fn config_for(target: Option<&str>, port: Option<&str>, args: Option<&str>) -> LauncherConfig {
        let env = EnvSnapshot {
            run_target: target.map(str::to_string),
            port: port.map(str::to_string),
            gunicorn_cmd_args: args.map(str::to_string),
        };
        LauncherConfig::build(ConfigFile::default(), &env, &Overrides::default())
    }

    #[test]
    fn test_backend_plan_with_default_args() {
        let plan = LaunchPlan::build(&config_for(None, Some("8000"), None)).unwrap();
        assert_eq!(plan.program, "gunicorn");
        assert_eq!(
            plan.args,
            vec![
                "paypal_project.wsgi:application",
                "--bind",
                "0.0.0.0:8000",
                "--timeout",
                "180",
            ]
        );
    }

    #[test]
    fn test_frontend_plan() {
        let plan = LaunchPlan::build(&config_for(Some("frontend"), Some("9000"), None)).unwrap();
        assert_eq!(plan.program, "streamlit");
        assert_eq!(
            plan.args,
            vec![
                "run",
                "streamlit_chatbot.py",
                "--server.port",
                "9000",
                "--server.address",
                "0.0.0.0",
            ]
        );
    }

    #[test]
    fn test_frontend_plan_ignores_extra_args() {
        let plan =
            LaunchPlan::build(&config_for(Some("frontend"), None, Some("--workers 4"))).unwrap();
        assert!(!plan.args.iter().any(|a| a.contains("workers")));
    }

    #[test]
    fn test_backend_plan_splits_quoted_args() {
        let plan = LaunchPlan::build(&config_for(
            None,
            Some("8000"),
            Some(r#"--access-logfile - --env DJANGO_SETTINGS_MODULE="paypal_project.settings""#),
        ))
        .unwrap();
        assert!(plan.args.contains(&"--access-logfile".to_string()));
        assert!(plan.args.contains(&"-".to_string()));
        assert!(plan
            .args
            .contains(&"DJANGO_SETTINGS_MODULE=paypal_project.settings".to_string()));
    }

    #[test]
    fn test_backend_plan_empty_extra_args() {
        let env = EnvSnapshot {
            gunicorn_cmd_args: Some(String::new()),
            ..EnvSnapshot::default()
        };
        let config = LauncherConfig::build(ConfigFile::default(), &env, &Overrides::default());
        let plan = LaunchPlan::build(&config).unwrap();
        assert_eq!(plan.args.last().unwrap(), "0.0.0.0:8000");
    }

    #[test]
    fn test_backend_plan_malformed_quoting_errors() {
        let err = LaunchPlan::build(&config_for(None, None, Some(r#"--env "unclosed"#)))
            .unwrap_err();
        assert!(err.to_string().contains("malformed quoting"));
    }

    #[test]
    fn test_port_forwarded_verbatim_into_bind() {
        let plan = LaunchPlan::build(&config_for(None, Some("not-a-port"), None)).unwrap();
        assert!(plan.args.contains(&"0.0.0.0:not-a-port".to_string()));
    }

    #[test]
    fn test_rendered_quotes_args_with_spaces() {
        let plan = LaunchPlan {
            program: "gunicorn".to_string(),
            args: vec!["--env".to_string(), "A=b c".to_string()],
        };
        assert_eq!(plan.rendered(), r#"gunicorn --env "A=b c""#);
    }
}
