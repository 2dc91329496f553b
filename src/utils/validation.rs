use crate::domain::model::Resource;
use crate::utils::error::{FinanceClientError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> FinanceClientError {
    FinanceClientError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Resources need distinct names and distinct targets so that one refresh
/// can never overwrite another resource's output.
pub fn validate_resources(field_name: &str, resources: &[Resource]) -> Result<()> {
    if resources.is_empty() {
        return Err(invalid(field_name, "", "At least one resource is required"));
    }

    let mut names = HashSet::new();
    let mut targets = HashSet::new();
    for resource in resources {
        validate_non_empty_string(&format!("{}.name", field_name), &resource.name)?;
        validate_non_empty_string(&format!("{}.target", field_name), &resource.target)?;

        if !names.insert(resource.name.as_str()) {
            return Err(invalid(field_name, &resource.name, "Duplicate resource name"));
        }
        if !targets.insert(resource.target.as_str()) {
            return Err(invalid(
                field_name,
                &resource.target,
                "Duplicate output target",
            ));
        }
    }

    Ok(())
}
