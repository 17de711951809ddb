use crate::utils::error::{PipelineError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PipelineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: crate::utils::redact::redact_url_str(url_str),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: crate::utils::redact::redact_url_str(url_str),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 檢查是否還有未替換的 `${VAR}` 佔位符
pub fn validate_no_unresolved_env(field_name: &str, value: &str) -> Result<()> {
    if let Some(start) = value.find("${") {
        let name = value[start + 2..]
            .split('}')
            .next()
            .unwrap_or_default()
            .to_string();
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("${{{}}}", name),
            reason: format!("Environment variable {} is not set", name),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
