//! Starting the Vault container.

use std::path::{Path, PathBuf};

use crate::error::{OnboardError, Result};
use crate::shell::{execute, find_on_path, CommandResult};

/// Something that can bring a Vault server up.
pub trait ServiceManager {
    /// Short description for messages.
    fn describe(&self) -> String;

    /// Fail with [`OnboardError::MissingPrerequisite`] when the tooling is absent.
    fn check_available(&self) -> Result<()>;

    /// Start `service` in the background.
    fn start(&self, service: &str) -> Result<CommandResult>;
}

/// How compose is invoked on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeFlavor {
    /// `docker compose` (v2 plugin).
    Plugin,
    /// Standalone `docker-compose`.
    Standalone,
}

/// Docker Compose with a project compose file.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    compose_file: PathBuf,
    project_root: PathBuf,
}

impl DockerCompose {
    pub fn new(compose_file: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            compose_file: compose_file.into(),
            project_root: project_root.into(),
        }
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    /// Find a working compose command.
    pub fn detect_flavor(&self) -> Result<ComposeFlavor> {
        if find_on_path("docker").is_none() {
            return Err(OnboardError::MissingPrerequisite {
                tool: "docker".to_string(),
                message: "install Docker Desktop or Docker Engine".to_string(),
            });
        }

        let plugin = execute("docker", &["compose", "version"], None)?;
        if plugin.success {
            return Ok(ComposeFlavor::Plugin);
        }
        if find_on_path("docker-compose").is_some() {
            return Ok(ComposeFlavor::Standalone);
        }

        Err(OnboardError::MissingPrerequisite {
            tool: "docker compose".to_string(),
            message: "install the Docker Compose plugin".to_string(),
        })
    }

    /// Program and arguments for `up -d <service>`.
    pub fn up_args(&self, flavor: ComposeFlavor, service: &str) -> (String, Vec<String>) {
        let file = self.compose_file.to_string_lossy().to_string();
        let mut args = Vec::new();
        let program = match flavor {
            ComposeFlavor::Plugin => {
                args.push("compose".to_string());
                "docker"
            }
            ComposeFlavor::Standalone => "docker-compose",
        };
        args.extend(["-f".to_string(), file, "up".to_string(), "-d".to_string()]);
        args.push(service.to_string());
        (program.to_string(), args)
    }
}

impl ServiceManager for DockerCompose {
    fn describe(&self) -> String {
        format!("docker compose ({})", self.compose_file.display())
    }

    fn check_available(&self) -> Result<()> {
        self.detect_flavor().map(|_| ())
    }

    fn start(&self, service: &str) -> Result<CommandResult> {
        if !self.compose_file.exists() {
            return Err(OnboardError::ConfigNotFound {
                path: self.compose_file.clone(),
            });
        }

        let flavor = self.detect_flavor()?;
        let (program, args) = self.up_args(flavor, service);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let result = execute(&program, &args, Some(&self.project_root))?;
        if !result.success {
            tracing::debug!("compose stderr: {}", result.stderr.trim());
        }
        Ok(result)
    }
}
