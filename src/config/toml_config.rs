use crate::core::{ConfigProvider, Resource};
use crate::utils::error::{FinanceClientError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default)]
    pub stdout: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            stdout: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub path: String,
    pub target: Option<String>,
}

impl From<&ResourceConfig> for Resource {
    fn from(config: &ResourceConfig) -> Self {
        let target = config
            .target
            .clone()
            .unwrap_or_else(|| Resource::default_target(&config.name));
        Resource::new(config.name.clone(), config.path.clone(), target)
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern compiles"))
}

impl TomlConfig {
    /// Loads a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FinanceClientError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| FinanceClientError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.service.base_url
    }

    fn resources(&self) -> Vec<Resource> {
        if self.resources.is_empty() {
            Resource::defaults()
        } else {
            self.resources.iter().map(Resource::from).collect()
        }
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn write_to_stdout(&self) -> bool {
        self.output.stdout
    }

    fn concurrent_requests(&self) -> usize {
        self.service.concurrent_requests.unwrap_or(5)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.service.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("service.base_url", &self.service.base_url)?;
        validation::validate_path("output.dir", &self.output.dir)?;
        validation::validate_positive_number(
            "service.concurrent_requests",
            self.concurrent_requests(),
            1,
        )?;
        validation::validate_resources("resources", &self.resources())?;
        Ok(())
    }
}
