use crate::core::etl::DEFAULT_MAX_RESPONSE_BYTES;
use crate::core::ConfigProvider;
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 單次請求的預設逾時 (毫秒)
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
/// 允許設定的逾時上限 (毫秒)
pub const MAX_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    pub request: RequestInfo,
    pub source: SourceConfig,
    pub response: Option<ResponseConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_ms: Option<u64>,
    pub args: Option<Vec<String>>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    pub max_bytes: Option<usize>,
}

impl RequestConfig {
    /// 只有 URL 的最小配置，其餘使用預設值
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            request: RequestInfo {
                name: "adhoc".to_string(),
                description: None,
            },
            source: SourceConfig {
                url: url.into(),
                timeout_ms: None,
                args: None,
                headers: None,
            },
            response: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PipelineError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BRIDGE_ACCESS_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            PipelineError::ConfigError {
                message: format!("Invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("request.name", &self.request.name)?;

        // 秘密資訊必須已由環境變數替換
        validate_no_unresolved_env("source.url", &self.source.url)?;
        if let Some(headers) = &self.source.headers {
            for (key, value) in headers {
                validate_no_unresolved_env(&format!("source.headers.{}", key), value)?;
            }
        }

        // 代入參數後再檢查 URL 結構
        let probe = crate::core::fetcher::build_endpoint(&self.source.url, self.args())?;
        validate_url("source.url", probe.as_str())?;

        if let Some(timeout) = self.source.timeout_ms {
            validate_positive_number("source.timeout_ms", timeout, 1)?;
            validate_range("source.timeout_ms", timeout, 1, MAX_TIMEOUT_MS)?;
        }

        validate_range(
            "response.max_bytes",
            self.max_response_bytes(),
            crate::abi::WORD_SIZE,
            1 << 20,
        )?;

        Ok(())
    }

    pub fn args(&self) -> &[String] {
        self.source.args.as_deref().unwrap_or(&[])
    }

    pub fn timeout_ms(&self) -> u64 {
        self.source.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn max_response_bytes(&self) -> usize {
        self.response
            .as_ref()
            .and_then(|r| r.max_bytes)
            .unwrap_or(DEFAULT_MAX_RESPONSE_BYTES)
    }
}

impl ConfigProvider for RequestConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.url
    }

    fn args(&self) -> &[String] {
        RequestConfig::args(self)
    }

    fn headers(&self) -> Option<&HashMap<String, String>> {
        self.source.headers.as_ref()
    }

    fn timeout_ms(&self) -> u64 {
        RequestConfig::timeout_ms(self)
    }

    fn max_response_bytes(&self) -> usize {
        RequestConfig::max_response_bytes(self)
    }
}

impl Validate for RequestConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
