use crate::utils::error::{FinanceClientError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A service path together with the output target its JSON is rendered into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub path: String,
    pub target: String,
}

impl Resource {
    pub fn new(name: impl Into<String>, path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            target: target.into(),
        }
    }

    /// `<name>-output`, the target used when none is given.
    pub fn default_target(name: &str) -> String {
        format!("{}-output", name)
    }

    pub fn corporate() -> Self {
        Self::new("corporate", "/corporate", "corporate-output")
    }

    pub fn personal() -> Self {
        Self::new("personal", "/personal", "personal-output")
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::corporate(), Self::personal()]
    }
}

/// Parses `name:path[:target]`.
impl FromStr for Resource {
    type Err = FinanceClientError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let invalid = |reason: &str| FinanceClientError::InvalidConfigValue {
            field: "resource".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        match parts.as_slice() {
            [name, path] | [name, path, ""] if !name.is_empty() && !path.is_empty() => {
                Ok(Self::new(*name, *path, Self::default_target(name)))
            }
            [name, path, target] if !name.is_empty() && !path.is_empty() => {
                Ok(Self::new(*name, *path, *target))
            }
            _ => Err(invalid("expected name:path or name:path:target")),
        }
    }
}

/// What was written to a target after a successful fetch.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedOutput {
    pub resource: String,
    pub target: String,
    pub url: String,
    pub text: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ResourceOutcome {
    pub resource: String,
    pub target: String,
    pub result: Result<RenderedOutput>,
}

impl ResourceOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a multi-resource refresh, in configured resource order.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<ResourceOutcome>,
}

impl RefreshReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, resource: &str) -> Option<&ResourceOutcome> {
        self.outcomes.iter().find(|o| o.resource == resource)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &FinanceClientError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.resource.as_str(), e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Payload of the service root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiIndex {
    pub message: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}
