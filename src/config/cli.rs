use crate::config::toml_config::{ResourceConfig, TomlConfig};
use crate::core::{ConfigProvider, Resource};
use crate::finance::ProjectionKind;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://finance-platform-b8b7.onrender.com";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;

#[derive(Debug, Clone, Parser)]
#[command(name = "finance-client")]
#[command(about = "Fetch and render data from the Finance Platform API")]
pub struct CliConfig {
    #[arg(long, env = "FINANCE_BASE_URL", global = true, help = "Service base URL [default: https://finance-platform-b8b7.onrender.com]")]
    pub base_url: Option<String>,

    #[arg(long, help = "Load settings from a TOML file; explicit flags override it", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for rendered files [default: ./output]")]
    pub output_dir: Option<String>,

    #[arg(long, help = "Print rendered output to stdout instead of files", global = true)]
    pub stdout: bool,

    #[arg(
        long = "resource",
        value_name = "NAME:PATH[:TARGET]",
        help = "Resource to render (repeatable); defaults to corporate and personal",
        global = true
    )]
    pub resources: Vec<Resource>,

    #[arg(long, global = true, help = "Maximum requests in flight [default: 5]")]
    pub concurrent_requests: Option<usize>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output", global = true)]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines", global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch resources and render them into their targets
    Fetch {
        /// Resource names; all configured resources when empty
        names: Vec<String>,
    },
    /// Check the service health endpoint
    Health,
    /// Show the service's API index
    Index,
    /// Run a corporate projection
    Project {
        #[arg(value_enum)]
        kind: ProjectionKind,

        /// JSON file with the projection input
        #[arg(long)]
        input: PathBuf,

        /// Ask the service instead of computing locally
        #[arg(long)]
        remote: bool,
    },
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Fetch { names: Vec::new() })
    }
}

impl CliConfig {
    /// Applies the flags given on the command line over a configuration
    /// file. Returns the names of the overridden settings.
    pub fn merge_into(&self, config: &mut TomlConfig) -> Vec<&'static str> {
        let mut overridden = Vec::new();

        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
            overridden.push("base_url");
        }
        if let Some(timeout) = self.timeout_seconds {
            config.service.timeout_seconds = Some(timeout);
            overridden.push("timeout_seconds");
        }
        if let Some(concurrent) = self.concurrent_requests {
            config.service.concurrent_requests = Some(concurrent);
            overridden.push("concurrent_requests");
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
            overridden.push("output_dir");
        }
        if self.stdout {
            config.output.stdout = true;
            overridden.push("stdout");
        }
        if !self.resources.is_empty() {
            config.resources = self
                .resources
                .iter()
                .map(|r| ResourceConfig {
                    name: r.name.clone(),
                    path: r.path.clone(),
                    target: Some(r.target.clone()),
                })
                .collect();
            overridden.push("resources");
        }

        overridden
    }
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn resources(&self) -> Vec<Resource> {
        if self.resources.is_empty() {
            Resource::defaults()
        } else {
            self.resources.clone()
        }
    }

    fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)
    }

    fn write_to_stdout(&self) -> bool {
        self.stdout
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", self.base_url())?;
        validation::validate_path("output_dir", self.output_dir())?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests(), 1)?;
        validation::validate_resources("resource", &self.resources())?;
        Ok(())
    }
}
